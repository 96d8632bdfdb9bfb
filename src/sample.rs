//! Sampling of FE functions at the cell centers of a regular grid over the
//! unit square.

use crate::{mesh::Point, space::FeFunction};

use tracing::{debug, warn};

/// Values of a function at the cell centers of a `resolution × resolution`
/// grid on the unit square.
///
/// Entry `(j, i)` belongs to the point `x = h/2 + i h`,
/// `y = h/2 + (resolution - 1 - j) h` with `h = 1 / resolution`,
/// so rows run from top to bottom and `(0, 0)` is the top-left point.
#[derive(Debug, Clone, PartialEq)]
pub struct SampledGrid {
  values: na::DMatrix<f64>,
  nmissing: usize,
  nfallback: usize,
}
impl SampledGrid {
  pub fn resolution(&self) -> usize {
    self.values.nrows()
  }
  pub fn values(&self) -> &na::DMatrix<f64> {
    &self.values
  }
  pub fn into_values(self) -> na::DMatrix<f64> {
    self.values
  }

  /// Number of points for which no containing cell was found. Their value is zero.
  pub fn nmissing(&self) -> usize {
    self.nmissing
  }
  /// Number of points that were evaluated at a vertex of their cell instead.
  pub fn nfallback(&self) -> usize {
    self.nfallback
  }
}

/// The sample point of grid entry `(j, i)`.
pub fn grid_point(resolution: usize, j: usize, i: usize) -> Point {
  let h = 1.0 / resolution as f64;
  Point::new(
    h / 2.0 + i as f64 * h,
    h / 2.0 + (resolution - 1 - j) as f64 * h,
  )
}

/// Samples `u` on the grid of the given resolution.
///
/// Each point is located through the bounding-box tree of the mesh.
/// If the point lies in the located cell only up to the collision tolerance,
/// direct evaluation fails and the value at the first vertex of that cell is
/// used instead. Points outside of the mesh are left at zero.
pub fn sample_on_grid(u: &FeFunction, resolution: usize) -> SampledGrid {
  assert!(resolution > 0, "grid needs a positive resolution");

  let space = u.space();
  let tree = space.bbox_tree();
  let mut values = na::DMatrix::zeros(resolution, resolution);
  let mut nmissing = 0;
  let mut nfallback = 0;

  for j in 0..resolution {
    for i in 0..resolution {
      let p = grid_point(resolution, j, i);
      let Some(icell) = tree.compute_first_entity_collision(&p) else {
        nmissing += 1;
        continue;
      };
      values[(j, i)] = match u.eval(&p) {
        Ok(v) => v,
        Err(_) => {
          nfallback += 1;
          let ivertex = space.mesh().cell(icell)[0];
          debug!("sample point ({}, {}) falls back to vertex {ivertex}", p.x, p.y);
          u.vertex_value(ivertex)
        }
      };
    }
  }

  if nmissing > 0 {
    warn!("{nmissing} of {} sample points lie outside of the mesh and are set to zero", resolution * resolution);
  }

  SampledGrid {
    values,
    nmissing,
    nfallback,
  }
}
