//! DOLFIN XML function format.
//!
//! ```xml
//! <dolfin>
//!   <function_data size="4">
//!     <dof index="0" value="0.5" cell_index="0" cell_dof_index="0"/>
//!     ...
//!   </function_data>
//! </dolfin>
//! ```
//!
//! A value belongs to vertex `cell_dof_index` of cell `cell_index`.
//! Files without these attributes are read with `index` as the vertex index.

use super::{attr, opt_attr, parse_xml, read_to_string, write_file};
use crate::{
  space::{FeFunction, FeSpace},
  Error, Result,
};

use std::{fmt::Write as _, path::Path, rc::Rc};

pub fn load_function(path: impl AsRef<Path>, space: Rc<FeSpace>) -> Result<FeFunction> {
  let path = path.as_ref();
  let text = read_to_string(path)?;
  parse_function(&text, path, space)
}

/// Parses function data on the given space. `path` is only used for error reporting.
pub fn parse_function(text: &str, path: &Path, space: Rc<FeSpace>) -> Result<FeFunction> {
  let doc = parse_xml(text, path)?;
  let data = doc
    .descendants()
    .find(|n| n.has_tag_name("function_data"))
    .ok_or_else(|| Error::format(path, "no <function_data> element"))?;

  let mesh = space.mesh();
  let ndofs = space.ndofs();
  let dof_nodes: Vec<_> = data.children().filter(|n| n.has_tag_name("dof")).collect();
  let size = opt_attr(data, "size", path)?.unwrap_or(dof_nodes.len());
  if size != ndofs || dof_nodes.len() != ndofs {
    return Err(Error::format(
      path,
      format!(
        "function has {} values (declared {size}), but the space has {ndofs} dofs",
        dof_nodes.len()
      ),
    ));
  }

  let mut coeffs = na::DVector::zeros(ndofs);
  let mut seen = vec![false; ndofs];
  for node in dof_nodes {
    let index: usize = attr(node, "index", path)?;
    let value: f64 = attr(node, "value", path)?;
    let cell_index: Option<usize> = opt_attr(node, "cell_index", path)?;
    let cell_dof_index: Option<usize> = opt_attr(node, "cell_dof_index", path)?;

    let ivertex = match (cell_index, cell_dof_index) {
      (Some(icell), Some(ilocal)) => {
        if icell >= mesh.ncells() || ilocal >= 3 {
          return Err(Error::format(
            path,
            format!("dof {index} refers to missing cell dof ({icell}, {ilocal})"),
          ));
        }
        mesh.cell(icell)[ilocal]
      }
      _ => index,
    };
    if ivertex >= ndofs || seen[ivertex] {
      return Err(Error::format(
        path,
        format!("dof {index} maps to invalid or duplicate vertex {ivertex}"),
      ));
    }
    seen[ivertex] = true;
    coeffs[ivertex] = value;
  }

  Ok(FeFunction::new(space, coeffs))
}

pub fn function_to_xml(u: &FeFunction) -> String {
  let space = u.space();
  let mesh = space.mesh();

  // first cell dof of every vertex
  let mut cell_dofs = vec![None; space.ndofs()];
  for (icell, cell) in mesh.cells().iter().enumerate() {
    for (ilocal, &ivertex) in cell.iter().enumerate() {
      cell_dofs[ivertex].get_or_insert((icell, ilocal));
    }
  }

  let mut xml = String::new();
  xml.push_str("<?xml version=\"1.0\"?>\n");
  xml.push_str("<dolfin xmlns:dolfin=\"http://fenicsproject.org\">\n");
  let _ = writeln!(xml, "  <function_data size=\"{}\">", space.ndofs());
  for (idof, value) in u.coeffs().iter().enumerate() {
    let _ = write!(xml, "    <dof index=\"{idof}\" value=\"{value:.16e}\"");
    if let Some((icell, ilocal)) = cell_dofs[idof] {
      let _ = write!(xml, " cell_index=\"{icell}\" cell_dof_index=\"{ilocal}\"");
    }
    xml.push_str(" />\n");
  }
  xml.push_str("  </function_data>\n");
  xml.push_str("</dolfin>\n");
  xml
}

pub fn save_function(u: &FeFunction, path: impl AsRef<Path>) -> Result<()> {
  write_file(path.as_ref(), function_to_xml(u).as_bytes())
}

#[cfg(test)]
mod test {
  use super::{function_to_xml, load_function, parse_function, save_function};
  use crate::{
    mesh::unit_square::RectangleMesh,
    space::{FeFunction, FeSpace},
    Error,
  };

  use std::{path::Path, rc::Rc};

  fn unit_square_space(n: usize) -> Rc<FeSpace> {
    Rc::new(FeSpace::new(Rc::new(RectangleMesh::new_unit_square(n).to_mesh())))
  }

  #[test]
  fn cell_dofs_take_precedence_over_index() {
    // one cell [0, 1, 3], one cell [0, 2, 3]
    let space = unit_square_space(1);
    let text = r#"<dolfin>
      <function_data size="4">
        <dof index="0" value="3.0" cell_index="0" cell_dof_index="2"/>
        <dof index="1" value="1.0" cell_index="0" cell_dof_index="1"/>
        <dof index="2" value="0.5" cell_index="1" cell_dof_index="0"/>
        <dof index="3" value="2.0" cell_index="1" cell_dof_index="1"/>
      </function_data>
    </dolfin>"#;
    let u = parse_function(text, Path::new("data.xml"), space).unwrap();
    assert_eq!(u.coeffs().as_slice(), &[0.5, 1.0, 2.0, 3.0]);
  }

  #[test]
  fn index_is_vertex_without_cell_dofs() {
    let space = unit_square_space(1);
    let text = r#"<dolfin><function_data size="4">
      <dof index="3" value="4"/><dof index="1" value="2"/>
      <dof index="0" value="1"/><dof index="2" value="3"/>
    </function_data></dolfin>"#;
    let u = parse_function(text, Path::new("data.xml"), space).unwrap();
    assert_eq!(u.coeffs().as_slice(), &[1.0, 2.0, 3.0, 4.0]);
  }

  #[test]
  fn roundtrip_is_exact() {
    let space = unit_square_space(4);
    let u = FeFunction::interpolate(space.clone(), |p| (3.0 * p.x).sin() * p.y.exp() / 7.0);
    let parsed = parse_function(&function_to_xml(&u), Path::new("mem.xml"), space).unwrap();
    assert_eq!(parsed.coeffs(), u.coeffs());
  }

  #[test]
  fn file_roundtrip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("Data").join("data_3.xml");
    let space = unit_square_space(2);
    let u = FeFunction::interpolate(space.clone(), |p| p.x - p.y);
    save_function(&u, &path).unwrap();
    let loaded = load_function(&path, space).unwrap();
    assert_eq!(loaded.coeffs(), u.coeffs());
  }

  #[test]
  fn size_mismatch_is_rejected() {
    let u = FeFunction::zero(unit_square_space(2));
    let err = parse_function(&function_to_xml(&u), Path::new("mem.xml"), unit_square_space(3))
      .unwrap_err();
    assert!(matches!(err, Error::Format { .. }));
  }

  #[test]
  fn missing_file_is_not_found() {
    let dir = tempfile::tempdir().unwrap();
    let err = load_function(dir.path().join("data_0.xml"), unit_square_space(1)).unwrap_err();
    assert!(err.is_not_found());
  }
}
