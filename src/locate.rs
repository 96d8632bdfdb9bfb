//! Point location through a bounding-box tree of the mesh cells.
//!
//! Candidates are found through an R-tree of (slightly padded) cell bounding
//! boxes and then tested exactly against the triangles.

use crate::mesh::{coordinates::CoordTriangle, CellIdx, Point, TriangleMesh};

use rstar::{PointDistance, RTree, RTreeObject, AABB};

/// Tolerance in barycentric coordinates, below which a point still counts as
/// colliding with a cell.
pub const COLLISION_TOL: f64 = 1e-12;

struct CellEnvelope {
  icell: CellIdx,
  triangle: CoordTriangle,
  min: [f64; 2],
  max: [f64; 2],
}
impl CellEnvelope {
  fn new(icell: CellIdx, triangle: CoordTriangle) -> Self {
    let vertices = triangle.vertices();
    let pad = COLLISION_TOL * triangle.diameter();
    let min = [vertices.row(0).min() - pad, vertices.row(1).min() - pad];
    let max = [vertices.row(0).max() + pad, vertices.row(1).max() + pad];
    Self {
      icell,
      triangle,
      min,
      max,
    }
  }
}

impl RTreeObject for CellEnvelope {
  type Envelope = AABB<[f64; 2]>;

  fn envelope(&self) -> Self::Envelope {
    AABB::from_corners(self.min, self.max)
  }
}

impl PointDistance for CellEnvelope {
  fn distance_2(&self, point: &[f64; 2]) -> f64 {
    let dx = (self.min[0] - point[0]).max(point[0] - self.max[0]).max(0.0);
    let dy = (self.min[1] - point[1]).max(point[1] - self.max[1]).max(0.0);
    dx * dx + dy * dy
  }

  fn contains_point(&self, point: &[f64; 2]) -> bool {
    point[0] >= self.min[0]
      && point[0] <= self.max[0]
      && point[1] >= self.min[1]
      && point[1] <= self.max[1]
  }
}

pub struct BoundingBoxTree {
  tree: RTree<CellEnvelope>,
  ncells: usize,
}
impl BoundingBoxTree {
  pub fn new(mesh: &TriangleMesh) -> Self {
    let envelopes = mesh
      .coord_triangles()
      .enumerate()
      .map(|(icell, triangle)| CellEnvelope::new(icell, triangle))
      .collect();
    Self {
      tree: RTree::bulk_load(envelopes),
      ncells: mesh.ncells(),
    }
  }

  pub fn ncells(&self) -> usize {
    self.ncells
  }

  /// All cells whose bounding box contains the point, in ascending order.
  pub fn compute_collisions(&self, p: &Point) -> Vec<CellIdx> {
    let mut cells: Vec<_> = self
      .tree
      .locate_all_at_point(&[p.x, p.y])
      .map(|e| e.icell)
      .collect();
    cells.sort_unstable();
    cells
  }

  /// The cell of smallest index containing the point, up to `tol` in
  /// barycentric coordinates.
  pub fn first_entity_collision_tol(&self, p: &Point, tol: f64) -> Option<CellIdx> {
    self
      .tree
      .locate_all_at_point(&[p.x, p.y])
      .filter(|e| e.triangle.contains(p, tol))
      .map(|e| e.icell)
      .min()
  }

  /// The cell of smallest index containing the point.
  pub fn compute_first_entity_collision(&self, p: &Point) -> Option<CellIdx> {
    self.first_entity_collision_tol(p, COLLISION_TOL)
  }
}
