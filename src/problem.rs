//! The nonlinear Poisson problem
//! $div(q(u) grad u) = f$ in the domain, $u = 0$ on the boundary,
//! with $q(u) = 1 + u^2$.
//!
//! Weak form: $F(u; v) = integral q(u) grad u dot grad v + integral f v = 0$.

use crate::{
  assemble::{assemble_galmat, assemble_galvec},
  fe::{ElMat, ElVec, LoadElvec},
  linalg::SparseMatrix,
  mesh::{coordinates::CoordTriangle, CellIdx},
  newton::{NewtonConfig, NewtonReport, NewtonSolver, NonlinearProblem},
  quadrature::{QUAD_DEGREE2, REF_VOL},
  space::{FeFunction, FeSpace},
  Result,
};

use std::rc::Rc;

/// Diffusion coefficient.
pub fn q(u: f64) -> f64 {
  1.0 + u * u
}

/// Derivative of the diffusion coefficient.
pub fn dq(u: f64) -> f64 {
  2.0 * u
}

pub struct NonlinearPoisson {
  space: Rc<FeSpace>,
  source: FeFunction,
}
impl NonlinearPoisson {
  /// The source must live on the problem space.
  pub fn new(source: FeFunction) -> Self {
    let space = source.space().clone();
    Self { space, source }
  }

  pub fn source(&self) -> &FeFunction {
    &self.source
  }

  /// Values of `u` at the quadrature nodes of a cell.
  ///
  /// `u` is linear on the cell, so the degree 2 rule integrates all forms
  /// below exactly.
  fn quad_values(u: &FeFunction, icell: CellIdx) -> na::DVector<f64> {
    QUAD_DEGREE2.node_barys().tr_mul(&u.cell_coeffs(icell))
  }
}

impl NonlinearProblem for NonlinearPoisson {
  fn space(&self) -> &FeSpace {
    &self.space
  }

  fn residual(&self, u: &FeFunction) -> na::DVector<f64> {
    let form = |icell: CellIdx, triangle: &CoordTriangle| -> ElVec {
      let scale = triangle.vol() / REF_VOL;
      let qint: f64 = Self::quad_values(u, icell)
        .iter()
        .zip(QUAD_DEGREE2.weights().iter())
        .map(|(&uq, &w)| scale * w * q(uq))
        .sum();

      let difbarys = triangle.difbarys();
      let grad_u = difbarys * u.cell_coeffs(icell);
      qint * difbarys.tr_mul(&grad_u)
    };
    let diffusion = assemble_galvec(&self.space, form);
    let load = assemble_galvec(
      &self.space,
      LoadElvec::new(self.source.coeffs(), self.space.mesh().cells()),
    );
    diffusion + load
  }

  fn jacobian(&self, u: &FeFunction) -> SparseMatrix {
    let barys = QUAD_DEGREE2.node_barys();
    let form = |icell: CellIdx, triangle: &CoordTriangle| -> ElMat {
      let scale = triangle.vol() / REF_VOL;
      let uq = Self::quad_values(u, icell);

      let mut qint = 0.0;
      // $integral q'(u) phi_j$
      let mut dq_phi = na::Vector3::<f64>::zeros();
      for (k, &w) in QUAD_DEGREE2.weights().iter().enumerate() {
        let w = scale * w;
        qint += w * q(uq[k]);
        dq_phi += barys.column(k) * (w * dq(uq[k]));
      }

      let difbarys = triangle.difbarys();
      let grad_u = difbarys * u.cell_coeffs(icell);
      let diffusion = qint * difbarys.transpose() * difbarys;
      let linearized = difbarys.tr_mul(&grad_u) * dq_phi.transpose();
      diffusion + linearized
    };
    assemble_galmat(&self.space, form)
  }
}

/// Solves the nonlinear Poisson problem on the space of `source`,
/// starting from the zero function.
pub fn solve(source: FeFunction, config: NewtonConfig) -> Result<(FeFunction, NewtonReport)> {
  let problem = NonlinearPoisson::new(source);
  let u0 = FeFunction::zero(problem.space.clone());
  NewtonSolver::new(config).solve(&problem, u0)
}

#[cfg(test)]
mod test {
  use super::{solve, NonlinearPoisson};
  use crate::{
    assemble::{assemble_galmat, enforce_homogeneous_dirichlet_bc},
    fe::{laplacian_elmat, mass_elmat},
    linalg::FaerLu,
    mesh::unit_square::RectangleMesh,
    newton::{NewtonConfig, NonlinearProblem},
    space::{FeFunction, FeSpace},
  };

  use approx::assert_relative_eq;
  use std::rc::Rc;

  fn unit_square_space(n: usize) -> Rc<FeSpace> {
    Rc::new(FeSpace::new(Rc::new(RectangleMesh::new_unit_square(n).to_mesh())))
  }

  fn bump(space: Rc<FeSpace>, amplitude: f64) -> FeFunction {
    FeFunction::interpolate(space, |p| {
      amplitude * (1.0 + (p.x - 0.5).powi(2) + (p.y - 0.3).powi(2))
    })
  }

  #[test]
  fn zero_source_gives_zero_solution() {
    let source = FeFunction::zero(unit_square_space(5));
    let (u, report) = solve(source, NewtonConfig::default()).unwrap();
    assert!(report.converged);
    assert_eq!(report.iterations, 0);
    assert!(u.coeffs().iter().all(|&v| v == 0.0));
  }

  /// For small sources $u^2$ is negligible and the linear Poisson problem
  /// $integral grad u dot grad v = -integral f v$ is recovered.
  #[test]
  fn small_source_matches_linear_poisson() {
    let space = unit_square_space(8);
    let source = bump(space.clone(), 1e-4);

    let mut galmat = assemble_galmat(&space, laplacian_elmat);
    let mut galvec = -assemble_galmat(&space, mass_elmat).mul_vec(source.coeffs());
    enforce_homogeneous_dirichlet_bc(&space, &mut galmat, &mut galvec);
    let linear = FaerLu::new(&galmat).unwrap().solve(&galvec);

    let (u, report) = solve(source, NewtonConfig::default()).unwrap();
    assert!(report.converged);
    assert!(u.max() <= 0.0);
    assert_relative_eq!(u.coeffs(), &linear, epsilon = 1e-12);
  }

  #[test]
  fn jacobian_matches_finite_differences() {
    let space = unit_square_space(4);
    let problem = NonlinearPoisson::new(bump(space.clone(), -3.0));
    let u = FeFunction::interpolate(space.clone(), |p| {
      (p.x * (1.0 - p.x) * p.y * (1.0 - p.y)).sqrt() + 0.3 * p.x
    });
    let dir = na::DVector::from_fn(space.ndofs(), |i, _| ((i * 13) % 7) as f64 / 7.0 - 0.5);

    let eps = 1e-6;
    let shifted = |s: f64| {
      let mut v = u.clone();
      v.coeffs_mut().axpy(s, &dir, 1.0);
      problem.residual(&v)
    };
    let fd = (shifted(eps) - shifted(-eps)) / (2.0 * eps);
    let jd = problem.jacobian(&u).mul_vec(&dir);
    assert_relative_eq!(jd, fd, epsilon = 1e-7);
  }

  #[test]
  fn strong_source_converges_fast() {
    let space = unit_square_space(10);
    let source = bump(space, -10.0);
    let (u, report) = solve(source, NewtonConfig::default()).unwrap();
    assert!(report.converged);
    assert!(report.iterations <= 10);
    // negative source yields a positive solution
    assert!(u.min() > -1e-12);
    assert!(u.max() > 0.1);

    // the last steps each gain at least two digits
    assert!(report.iterations >= 2);
    assert!(report.history.windows(2).rev().take(2).all(|w| w[1] < 1e-2 * w[0]));
  }
}
