use crate::{
  locate::BoundingBoxTree,
  mesh::{CellIdx, Point, TriangleMesh, VertexIdx},
  quadrature::QUAD_DEGREE2,
  Error, Result,
};

use itertools::Itertools;
use once_cell::unsync::OnceCell;
use std::rc::Rc;
use tracing::warn;

pub type DofIdx = usize;

/// Barycentric tolerance for direct point evaluation of FE functions.
///
/// Stricter than the collision tolerance of the bounding-box tree, so a point
/// can be located in a cell and still fail to evaluate.
pub const EVAL_TOL: f64 = 1e2 * f64::EPSILON;

/// A Finite Element Space of piecewise-linear Lagrangian functions.
///
/// There is exactly one DOF per mesh vertex and DOF indices coincide
/// with vertex indices.
pub struct FeSpace {
  /// The underlying mesh of the space.
  mesh: Rc<TriangleMesh>,
  /// Degrees-of-Freedom handler
  dof_handler: DofHandler,
  bbox_tree: OnceCell<BoundingBoxTree>,
}

pub struct DofHandler {
  local2global_idx: Vec<[DofIdx; 3]>,
}
impl DofHandler {
  pub fn new(mesh: &TriangleMesh) -> Self {
    let local2global_idx = mesh.cells().to_vec();
    Self { local2global_idx }
  }

  pub fn local2global(&self, icell: CellIdx) -> &[DofIdx; 3] {
    &self.local2global_idx[icell]
  }
}

impl FeSpace {
  pub fn new(mesh: Rc<TriangleMesh>) -> Self {
    let nisolated = mesh.isolated_vertices().len();
    if nisolated > 0 {
      warn!("mesh has {nisolated} vertices without cells, their dofs are fixed to zero");
    }
    let dof_handler = DofHandler::new(&mesh);
    Self {
      mesh,
      dof_handler,
      bbox_tree: OnceCell::new(),
    }
  }

  pub fn mesh(&self) -> &Rc<TriangleMesh> {
    &self.mesh
  }

  pub fn ndofs(&self) -> usize {
    self.mesh.nvertices()
  }

  pub fn dof_handler(&self) -> &DofHandler {
    &self.dof_handler
  }

  /// The DOFs on the boundary of the mesh, in ascending order.
  pub fn boundary_dofs(&self) -> Vec<DofIdx> {
    self.mesh.boundary_vertices()
  }

  /// The DOFs of vertices that belong to no cell.
  ///
  /// No basis function is supported there, so these DOFs only appear as
  /// empty rows of Galerkin matrices.
  pub fn isolated_dofs(&self) -> Vec<DofIdx> {
    self.mesh.isolated_vertices()
  }

  /// The DOFs fixed by homogeneous Dirichlet conditions: boundary and
  /// isolated DOFs, in ascending order.
  pub fn fixed_dofs(&self) -> Vec<DofIdx> {
    self
      .boundary_dofs()
      .into_iter()
      .merge(self.isolated_dofs())
      .collect()
  }

  /// Bounding-box tree of the mesh, built on first use.
  pub fn bbox_tree(&self) -> &BoundingBoxTree {
    self.bbox_tree.get_or_init(|| BoundingBoxTree::new(&self.mesh))
  }
}

/// A function of a finite element space given through its DOF coefficients.
#[derive(Clone)]
pub struct FeFunction {
  space: Rc<FeSpace>,
  coeffs: na::DVector<f64>,
}
impl FeFunction {
  pub fn new(space: Rc<FeSpace>, coeffs: na::DVector<f64>) -> Self {
    assert_eq!(
      space.ndofs(),
      coeffs.len(),
      "coefficients don't match the space"
    );
    Self { space, coeffs }
  }

  pub fn zero(space: Rc<FeSpace>) -> Self {
    let ndofs = space.ndofs();
    Self::new(space, na::DVector::zeros(ndofs))
  }

  /// Nodal interpolation of a coordinate function.
  pub fn interpolate<F>(space: Rc<FeSpace>, f: F) -> Self
  where
    F: FnMut(Point) -> f64,
  {
    let coeffs = space.mesh().vertex_coords().eval_coord_fn(f);
    Self::new(space, coeffs)
  }

  pub fn space(&self) -> &Rc<FeSpace> {
    &self.space
  }
  pub fn coeffs(&self) -> &na::DVector<f64> {
    &self.coeffs
  }
  pub fn coeffs_mut(&mut self) -> &mut na::DVector<f64> {
    &mut self.coeffs
  }
  pub fn into_coeffs(self) -> na::DVector<f64> {
    self.coeffs
  }

  pub fn vertex_value(&self, ivertex: VertexIdx) -> f64 {
    self.coeffs[ivertex]
  }

  /// The local coefficients on a cell.
  pub fn cell_coeffs(&self, icell: CellIdx) -> na::Vector3<f64> {
    let dofs = self.space.dof_handler().local2global(icell);
    na::Vector3::new(self.coeffs[dofs[0]], self.coeffs[dofs[1]], self.coeffs[dofs[2]])
  }

  /// Evaluates the function at a point using the given cell,
  /// extrapolating linearly if the point is outside of it.
  pub fn eval_in_cell(&self, icell: CellIdx, p: &Point) -> f64 {
    let barys = self.space.mesh().coord_triangle(icell).barycentric_coords(p);
    self.cell_coeffs(icell).dot(&barys)
  }

  /// The constant gradient on a cell.
  pub fn grad_in_cell(&self, icell: CellIdx) -> na::Vector2<f64> {
    self.space.mesh().coord_triangle(icell).difbarys() * self.cell_coeffs(icell)
  }

  /// Evaluates the function at a point of the domain.
  ///
  /// Fails if no cell contains the point within [`EVAL_TOL`].
  pub fn eval(&self, p: &Point) -> Result<f64> {
    let icell = self
      .space
      .bbox_tree()
      .first_entity_collision_tol(p, EVAL_TOL)
      .ok_or(Error::PointOutsideMesh { x: p.x, y: p.y })?;
    Ok(self.eval_in_cell(icell, p))
  }

  pub fn min(&self) -> f64 {
    self.coeffs.min()
  }
  pub fn max(&self) -> f64 {
    self.coeffs.max()
  }

  pub fn l2_norm(&self) -> f64 {
    let mesh = self.space.mesh();
    (0..mesh.ncells())
      .map(|icell| {
        let triangle = mesh.coord_triangle(icell);
        QUAD_DEGREE2.apply(|p| self.eval_in_cell(icell, &p).powi(2), &triangle)
      })
      .sum::<f64>()
      .sqrt()
  }

  pub fn h1_seminorm(&self) -> f64 {
    let mesh = self.space.mesh();
    (0..mesh.ncells())
      .map(|icell| mesh.coord_triangle(icell).vol() * self.grad_in_cell(icell).norm_squared())
      .sum::<f64>()
      .sqrt()
  }
}

impl std::fmt::Debug for FeFunction {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("FeFunction")
      .field("ncells", &self.space.mesh().ncells())
      .field("coeffs", &self.coeffs.as_slice())
      .finish()
  }
}

#[cfg(test)]
mod test {
  use super::{FeFunction, FeSpace};
  use crate::{
    mesh::{unit_square::RectangleMesh, Point},
    Error,
  };

  use approx::assert_relative_eq;
  use std::rc::Rc;

  fn unit_square_space(n: usize) -> Rc<FeSpace> {
    Rc::new(FeSpace::new(Rc::new(RectangleMesh::new_unit_square(n).to_mesh())))
  }

  #[test]
  fn linear_functions_are_reproduced() {
    let space = unit_square_space(4);
    let f = |p: Point| 2.0 * p.x - 3.0 * p.y + 0.5;
    let fe = FeFunction::interpolate(space, f);
    for p in [Point::new(0.13, 0.77), Point::new(0.5, 0.5), Point::new(1.0, 0.0)] {
      assert_relative_eq!(fe.eval(&p).unwrap(), f(p), epsilon = 1e-13);
    }
    for icell in 0..fe.space().mesh().ncells() {
      assert_relative_eq!(fe.grad_in_cell(icell), na::Vector2::new(2.0, -3.0), epsilon = 1e-12);
    }
  }

  #[test]
  fn eval_outside_fails() {
    let space = unit_square_space(2);
    let fe = FeFunction::zero(space);
    let err = fe.eval(&Point::new(1.2, 0.5)).unwrap_err();
    assert!(matches!(err, Error::PointOutsideMesh { .. }));
  }

  #[test]
  fn norms_of_linear_function() {
    let space = unit_square_space(8);
    let fe = FeFunction::interpolate(space, |p| p.x);
    // int_0^1 x^2 = 1/3, |grad x|^2 = 1
    assert_relative_eq!(fe.l2_norm(), (1.0f64 / 3.0).sqrt(), epsilon = 1e-12);
    assert_relative_eq!(fe.h1_seminorm(), 1.0, epsilon = 1e-12);
    assert_relative_eq!(fe.min(), 0.0);
    assert_relative_eq!(fe.max(), 1.0);
  }

  #[test]
  fn boundary_dofs_of_unit_square() {
    let space = unit_square_space(2);
    assert_eq!(space.boundary_dofs(), vec![0, 1, 2, 3, 5, 6, 7, 8]);
    assert!(space.isolated_dofs().is_empty());
    assert_eq!(space.fixed_dofs(), space.boundary_dofs());
  }
}
