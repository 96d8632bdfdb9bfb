//! A mesh plays the role of a container of mesh entities (cells, edges, vertices).
//! It provides a global numbering for unique identification of the entities
//! and stores the mesh geometry in the form of vertex coordinates.
//!
//! Only triangle meshes of planar domains are supported.

pub mod boundary;
pub mod coordinates;
pub mod dolfin;
pub mod gmsh;
pub mod unit_square;

use crate::{Error, Result};
use coordinates::{CoordTriangle, VertexCoords};

use std::path::Path;

pub type VertexIdx = usize;
pub type CellIdx = usize;

/// The vertices of a triangle.
pub type Cell = [VertexIdx; 3];

pub type Point = na::Vector2<f64>;

#[derive(Debug, Clone)]
pub struct TriangleMesh {
  /// topology
  cells: Vec<Cell>,
  /// geometry
  vertex_coords: VertexCoords,
}

// constructors
impl TriangleMesh {
  pub fn new(cells: Vec<Cell>, vertex_coords: VertexCoords) -> Result<Self> {
    if cells.is_empty() {
      return Err(Error::InvalidMesh("mesh has no cells".into()));
    }
    let nvertices = vertex_coords.nvertices();
    for (icell, cell) in cells.iter().enumerate() {
      if let Some(&ivertex) = cell.iter().find(|&&v| v >= nvertices) {
        return Err(Error::InvalidMesh(format!(
          "cell {icell} references vertex {ivertex}, but there are only {nvertices} vertices"
        )));
      }
      if cell[0] == cell[1] || cell[1] == cell[2] || cell[0] == cell[2] {
        return Err(Error::InvalidMesh(format!(
          "cell {icell} has repeated vertices {cell:?}"
        )));
      }
      if vertex_coords.coord_triangle(cell).vol() == 0.0 {
        return Err(Error::InvalidMesh(format!("cell {icell} is degenerate")));
      }
    }

    Ok(Self {
      cells,
      vertex_coords,
    })
  }

  pub fn into_parts(self) -> (Vec<Cell>, VertexCoords) {
    (self.cells, self.vertex_coords)
  }
}

// getters
impl TriangleMesh {
  pub fn nvertices(&self) -> usize {
    self.vertex_coords.nvertices()
  }
  pub fn ncells(&self) -> usize {
    self.cells.len()
  }
  pub fn cells(&self) -> &[Cell] {
    &self.cells
  }
  pub fn cell(&self, icell: CellIdx) -> &Cell {
    &self.cells[icell]
  }
  pub fn vertex_coords(&self) -> &VertexCoords {
    &self.vertex_coords
  }
  pub fn coord_triangle(&self, icell: CellIdx) -> CoordTriangle {
    self.vertex_coords.coord_triangle(&self.cells[icell])
  }
  pub fn coord_triangles(&self) -> impl Iterator<Item = CoordTriangle> + '_ {
    self
      .cells
      .iter()
      .map(|cell| self.vertex_coords.coord_triangle(cell))
  }

  /// The mesh width $h$, which is the largest diameter of all cells.
  pub fn mesh_width(&self) -> f64 {
    self
      .coord_triangles()
      .map(|t| t.diameter())
      .fold(0.0, f64::max)
  }

  /// The total area of the domain.
  pub fn vol(&self) -> f64 {
    self.coord_triangles().map(|t| t.vol()).sum()
  }

  /// Vertices that no cell references, in ascending order.
  pub fn isolated_vertices(&self) -> Vec<VertexIdx> {
    let mut referenced = vec![false; self.nvertices()];
    self.cells.iter().flatten().for_each(|&v| referenced[v] = true);
    (0..self.nvertices()).filter(|&v| !referenced[v]).collect()
  }
}

/// Loads a mesh from disk, choosing the reader by file extension.
///
/// `.msh` files are read as Gmsh meshes, everything else as DOLFIN XML.
pub fn read_mesh(path: impl AsRef<Path>) -> Result<TriangleMesh> {
  let path = path.as_ref();
  match path.extension().and_then(|e| e.to_str()) {
    Some("msh") => {
      let bytes = std::fs::read(path).map_err(|e| Error::io(path, e))?;
      gmsh::gmsh2mesh(&bytes)
    }
    _ => dolfin::read_mesh(path),
  }
}

#[cfg(test)]
mod test {
  use super::{coordinates::VertexCoords, unit_square::RectangleMesh, TriangleMesh};
  use crate::Error;

  use approx::assert_relative_eq;

  #[test]
  fn rejects_out_of_range_vertex() {
    let coords = VertexCoords::new(na::Matrix2xX::from_column_slice(&[
      0.0, 0.0, 1.0, 0.0, 0.0, 1.0,
    ]));
    let err = TriangleMesh::new(vec![[0, 1, 3]], coords).unwrap_err();
    assert!(matches!(err, Error::InvalidMesh(_)));
  }

  #[test]
  fn rejects_degenerate_cell() {
    let coords = VertexCoords::new(na::Matrix2xX::from_column_slice(&[
      0.0, 0.0, 1.0, 1.0, 2.0, 2.0,
    ]));
    let err = TriangleMesh::new(vec![[0, 1, 2]], coords).unwrap_err();
    assert!(matches!(err, Error::InvalidMesh(_)));
  }

  #[test]
  fn isolated_vertices_are_found() {
    let coords = VertexCoords::new(na::Matrix2xX::from_column_slice(&[
      0.0, 0.0, 0.5, 0.5, 1.0, 0.0, 0.0, 1.0,
    ]));
    let mesh = TriangleMesh::new(vec![[0, 2, 3]], coords).unwrap();
    assert_eq!(mesh.isolated_vertices(), vec![1]);
    assert!(RectangleMesh::new_unit_square(3).to_mesh().isolated_vertices().is_empty());
  }

  #[test]
  fn unit_square_measures() {
    let mesh = RectangleMesh::new_unit_square(4).to_mesh();
    assert_relative_eq!(mesh.vol(), 1.0, epsilon = 1e-14);
    assert_relative_eq!(mesh.mesh_width(), 0.25 * 2f64.sqrt(), epsilon = 1e-14);
  }
}
