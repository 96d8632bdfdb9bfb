//! DOLFIN XML mesh format.
//!
//! ```xml
//! <dolfin>
//!   <mesh celltype="triangle" dim="2">
//!     <vertices size="4">
//!       <vertex index="0" x="0.0" y="0.0"/>
//!       ...
//!     </vertices>
//!     <cells size="2">
//!       <triangle index="0" v0="0" v1="1" v2="3"/>
//!       ...
//!     </cells>
//!   </mesh>
//! </dolfin>
//! ```

use super::{coordinates::VertexCoords, Cell, TriangleMesh};
use crate::{
  io::{attr, opt_attr, parse_xml, read_to_string, write_file},
  Error, Result,
};

use std::{fmt::Write as _, path::Path};

pub fn read_mesh(path: impl AsRef<Path>) -> Result<TriangleMesh> {
  let path = path.as_ref();
  let text = read_to_string(path)?;
  parse_mesh(&text, path)
}

/// Parses a mesh from xml text. `path` is only used for error reporting.
pub fn parse_mesh(text: &str, path: &Path) -> Result<TriangleMesh> {
  let doc = parse_xml(text, path)?;
  let mesh = doc
    .descendants()
    .find(|n| n.has_tag_name("mesh"))
    .ok_or_else(|| Error::format(path, "no <mesh> element"))?;

  let celltype: String = attr(mesh, "celltype", path)?;
  if celltype != "triangle" {
    return Err(Error::format(
      path,
      format!("unsupported celltype `{celltype}`"),
    ));
  }
  if let Some(dim) = opt_attr::<usize>(mesh, "dim", path)? {
    if dim != 2 {
      return Err(Error::format(path, format!("unsupported dimension {dim}")));
    }
  }

  let vertices = mesh
    .children()
    .find(|n| n.has_tag_name("vertices"))
    .ok_or_else(|| Error::format(path, "no <vertices> element"))?;
  let vertex_nodes: Vec<_> = vertices
    .children()
    .filter(|n| n.has_tag_name("vertex"))
    .collect();
  let nvertices = opt_attr(vertices, "size", path)?.unwrap_or(vertex_nodes.len());
  if nvertices != vertex_nodes.len() {
    return Err(Error::format(
      path,
      format!(
        "declared {nvertices} vertices, but found {}",
        vertex_nodes.len()
      ),
    ));
  }

  let mut coords = na::Matrix2xX::zeros(nvertices);
  let mut seen = vec![false; nvertices];
  for node in vertex_nodes {
    let index: usize = attr(node, "index", path)?;
    if index >= nvertices || seen[index] {
      return Err(Error::format(
        path,
        format!("invalid or duplicate vertex index {index}"),
      ));
    }
    seen[index] = true;
    coords[(0, index)] = attr(node, "x", path)?;
    coords[(1, index)] = attr(node, "y", path)?;
  }

  let cells_node = mesh
    .children()
    .find(|n| n.has_tag_name("cells"))
    .ok_or_else(|| Error::format(path, "no <cells> element"))?;
  let cell_nodes: Vec<_> = cells_node
    .children()
    .filter(|n| n.has_tag_name("triangle"))
    .collect();
  let ncells = opt_attr(cells_node, "size", path)?.unwrap_or(cell_nodes.len());
  if ncells != cell_nodes.len() {
    return Err(Error::format(
      path,
      format!("declared {ncells} cells, but found {}", cell_nodes.len()),
    ));
  }

  let mut cells: Vec<Option<Cell>> = vec![None; ncells];
  for node in cell_nodes {
    let index: usize = attr(node, "index", path)?;
    if index >= ncells || cells[index].is_some() {
      return Err(Error::format(
        path,
        format!("invalid or duplicate cell index {index}"),
      ));
    }
    cells[index] = Some([
      attr(node, "v0", path)?,
      attr(node, "v1", path)?,
      attr(node, "v2", path)?,
    ]);
  }
  // every slot is filled, since indices are unique and in range
  let cells = cells.into_iter().flatten().collect();

  TriangleMesh::new(cells, VertexCoords::new(coords))
}

pub fn mesh_to_xml(mesh: &TriangleMesh) -> String {
  let mut xml = String::new();
  xml.push_str("<?xml version=\"1.0\"?>\n");
  xml.push_str("<dolfin xmlns:dolfin=\"http://fenicsproject.org\">\n");
  xml.push_str("  <mesh celltype=\"triangle\" dim=\"2\">\n");

  let _ = writeln!(xml, "    <vertices size=\"{}\">", mesh.nvertices());
  for (ivertex, coord) in mesh.vertex_coords().matrix().column_iter().enumerate() {
    let _ = writeln!(
      xml,
      "      <vertex index=\"{ivertex}\" x=\"{:.16e}\" y=\"{:.16e}\" />",
      coord[0], coord[1]
    );
  }
  xml.push_str("    </vertices>\n");

  let _ = writeln!(xml, "    <cells size=\"{}\">", mesh.ncells());
  for (icell, [v0, v1, v2]) in mesh.cells().iter().enumerate() {
    let _ = writeln!(
      xml,
      "      <triangle index=\"{icell}\" v0=\"{v0}\" v1=\"{v1}\" v2=\"{v2}\" />"
    );
  }
  xml.push_str("    </cells>\n");

  xml.push_str("  </mesh>\n");
  xml.push_str("</dolfin>\n");
  xml
}

pub fn write_mesh(mesh: &TriangleMesh, path: impl AsRef<Path>) -> Result<()> {
  write_file(path.as_ref(), mesh_to_xml(mesh).as_bytes())
}

#[cfg(test)]
mod test {
  use super::{mesh_to_xml, parse_mesh, read_mesh, write_mesh};
  use crate::{mesh::unit_square::RectangleMesh, Error};

  use std::path::Path;

  const TWO_TRIANGLES: &str = r#"<?xml version="1.0"?>
<dolfin xmlns:dolfin="http://fenicsproject.org">
  <mesh celltype="triangle" dim="2">
    <vertices size="4">
      <vertex index="0" x="0" y="0"/>
      <vertex index="1" x="1" y="0"/>
      <vertex index="3" x="1" y="1"/>
      <vertex index="2" x="0" y="1"/>
    </vertices>
    <cells size="2">
      <triangle index="1" v0="0" v1="2" v2="3"/>
      <triangle index="0" v0="0" v1="1" v2="3"/>
    </cells>
  </mesh>
</dolfin>
"#;

  #[test]
  fn parse_handwritten_mesh() {
    let mesh = parse_mesh(TWO_TRIANGLES, Path::new("two.xml")).unwrap();
    assert_eq!(mesh.nvertices(), 4);
    assert_eq!(mesh.cells(), &[[0, 1, 3], [0, 2, 3]]);
    assert_eq!(mesh.vertex_coords().coord(2), na::Vector2::new(0.0, 1.0));
  }

  #[test]
  fn xml_roundtrip_is_exact() {
    let mesh = RectangleMesh::new_unit_square(3).to_mesh();
    let parsed = parse_mesh(&mesh_to_xml(&mesh), Path::new("mem.xml")).unwrap();
    assert_eq!(parsed.cells(), mesh.cells());
    assert_eq!(parsed.vertex_coords(), mesh.vertex_coords());
  }

  #[test]
  fn file_roundtrip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("Meshes").join("mesh_0.xml");
    let mesh = RectangleMesh::new_unit_square(2).to_mesh();
    write_mesh(&mesh, &path).unwrap();
    let loaded = read_mesh(&path).unwrap();
    assert_eq!(loaded.cells(), mesh.cells());
  }

  #[test]
  fn missing_file_is_not_found() {
    let dir = tempfile::tempdir().unwrap();
    let err = read_mesh(dir.path().join("nope.xml")).unwrap_err();
    assert!(err.is_not_found());
  }

  #[test]
  fn rejects_wrong_celltype() {
    let text = TWO_TRIANGLES.replace("triangle\" dim", "tetrahedron\" dim");
    let err = parse_mesh(&text, Path::new("tet.xml")).unwrap_err();
    assert!(matches!(err, Error::Format { .. }));
  }

  #[test]
  fn rejects_missing_vertex() {
    let text = TWO_TRIANGLES.replace("<vertex index=\"2\" x=\"0\" y=\"1\"/>", "");
    let err = parse_mesh(&text, Path::new("short.xml")).unwrap_err();
    assert!(matches!(err, Error::Format { .. }));
  }

  #[test]
  fn rejects_malformed_xml() {
    let err = parse_mesh("<dolfin><mesh>", Path::new("bad.xml")).unwrap_err();
    assert!(matches!(err, Error::Xml { .. }));
  }
}
