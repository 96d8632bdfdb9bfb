use super::{coordinates::VertexCoords, Cell, Point, TriangleMesh};
use crate::{Error, Result};

use tracing::warn;

/// Load Gmsh `.msh` file (version 4.1).
///
/// Only the triangles of the file become cells; the z-coordinate is dropped.
/// Node tags are assumed to be contiguous and to start at 1.
pub fn gmsh2mesh(bytes: &[u8]) -> Result<TriangleMesh> {
  let msh = mshio::parse_msh_bytes(bytes).map_err(|e| Error::Gmsh(format!("{e:?}")))?;

  let nodes = msh
    .data
    .nodes
    .ok_or_else(|| Error::Gmsh("file contains no nodes".into()))?;
  let points: Vec<_> = nodes
    .node_blocks
    .iter()
    .flat_map(|block| block.nodes.iter())
    .map(|node| {
      if node.z != 0.0 {
        warn!("dropping nonzero z-coordinate {} of gmsh node", node.z);
      }
      Point::new(node.x, node.y)
    })
    .collect();
  let nvertices = points.len();

  let elements = msh
    .data
    .elements
    .ok_or_else(|| Error::Gmsh("file contains no elements".into()))?;

  let mut cells: Vec<Cell> = Vec::new();
  for block in elements.element_blocks {
    type ElType = mshio::ElementType;
    match block.element_type {
      ElType::Tri3 => {}
      ElType::Pnt | ElType::Lin2 => continue,
      _ => {
        warn!("unsupported gmsh ElementType: {:?}", block.element_type);
        continue;
      }
    }
    for e in block.elements {
      let mut cell = [0; 3];
      for (local, &tag) in e.nodes.iter().take(3).enumerate() {
        let ivertex = (tag as usize)
          .checked_sub(1)
          .filter(|&v| v < nvertices)
          .ok_or_else(|| Error::Gmsh(format!("invalid node tag {tag}")))?;
        cell[local] = ivertex;
      }
      cells.push(cell);
    }
  }

  if cells.is_empty() {
    return Err(Error::Gmsh("file contains no triangles".into()));
  }
  TriangleMesh::new(cells, VertexCoords::from_points(&points))
}
