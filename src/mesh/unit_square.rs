use super::{coordinates::VertexCoords, Cell, Point, TriangleMesh, VertexIdx};

/// Structured triangle mesh of an axis-aligned rectangle.
///
/// Vertices are numbered lexicographically, row by row starting at the lower
/// left corner. Every rectangle is split along its "right" diagonal
/// (lower-left to upper-right) into two cells, in the same numbering DOLFIN's
/// `UnitSquareMesh` uses. Data files defined on such a mesh rely on this
/// numbering.
pub struct RectangleMesh {
  min: Point,
  max: Point,
  ncells_x: usize,
  ncells_y: usize,
}

// constructors
impl RectangleMesh {
  pub fn new(min: Point, max: Point, ncells_x: usize, ncells_y: usize) -> Self {
    assert!(ncells_x > 0 && ncells_y > 0, "rectangle mesh needs cells");
    assert!(min.x < max.x && min.y < max.y, "empty rectangle");
    Self {
      min,
      max,
      ncells_x,
      ncells_y,
    }
  }

  pub fn new_unit_square(ncells_axis: usize) -> Self {
    Self::new(Point::zeros(), Point::new(1.0, 1.0), ncells_axis, ncells_axis)
  }
}

// getters
impl RectangleMesh {
  pub fn nvertices_x(&self) -> usize {
    self.ncells_x + 1
  }
  pub fn nvertices_y(&self) -> usize {
    self.ncells_y + 1
  }
  pub fn nvertices(&self) -> usize {
    self.nvertices_x() * self.nvertices_y()
  }
  pub fn ncells(&self) -> usize {
    2 * self.ncells_x * self.ncells_y
  }

  pub fn vertex_idx(&self, ix: usize, iy: usize) -> VertexIdx {
    iy * self.nvertices_x() + ix
  }
}

impl RectangleMesh {
  pub fn vertex_coords(&self) -> VertexCoords {
    let hx = (self.max.x - self.min.x) / self.ncells_x as f64;
    let hy = (self.max.y - self.min.y) / self.ncells_y as f64;

    let mut points = Vec::with_capacity(self.nvertices());
    for iy in 0..self.nvertices_y() {
      let y = if iy == self.ncells_y {
        self.max.y
      } else {
        self.min.y + iy as f64 * hy
      };
      for ix in 0..self.nvertices_x() {
        let x = if ix == self.ncells_x {
          self.max.x
        } else {
          self.min.x + ix as f64 * hx
        };
        points.push(Point::new(x, y));
      }
    }
    VertexCoords::from_points(&points)
  }

  pub fn cells(&self) -> Vec<Cell> {
    let mut cells = Vec::with_capacity(self.ncells());
    for iy in 0..self.ncells_y {
      for ix in 0..self.ncells_x {
        let v0 = self.vertex_idx(ix, iy);
        let v1 = v0 + 1;
        let v2 = v0 + self.nvertices_x();
        let v3 = v1 + self.nvertices_x();
        cells.push([v0, v1, v3]);
        cells.push([v0, v2, v3]);
      }
    }
    cells
  }

  pub fn to_mesh(&self) -> TriangleMesh {
    TriangleMesh {
      cells: self.cells(),
      vertex_coords: self.vertex_coords(),
    }
  }
}
