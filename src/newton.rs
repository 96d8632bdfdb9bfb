//! Newton's method for nonlinear variational problems with homogeneous
//! Dirichlet boundary conditions.

use crate::{
  assemble::fix_dofs_zero,
  linalg::{FaerLu, SparseMatrix},
  space::{FeFunction, FeSpace},
  Error, Result,
};

use tracing::{debug, info, warn};

/// A nonlinear problem $F(u; v) = 0 forall v$ on a FE space.
pub trait NonlinearProblem {
  fn space(&self) -> &FeSpace;

  /// The residual vector $F(u; phi_i)$ without boundary conditions applied.
  fn residual(&self, u: &FeFunction) -> na::DVector<f64>;

  /// The Jacobian $dif F(u; phi_j, phi_i)$ without boundary conditions applied.
  fn jacobian(&self, u: &FeFunction) -> SparseMatrix;
}

#[derive(Debug, Clone)]
pub struct NewtonConfig {
  pub absolute_tolerance: f64,
  pub relative_tolerance: f64,
  pub maximum_iterations: usize,
  pub relaxation: f64,
  pub error_on_nonconvergence: bool,
}
impl Default for NewtonConfig {
  fn default() -> Self {
    Self {
      absolute_tolerance: 1e-10,
      relative_tolerance: 1e-9,
      maximum_iterations: 50,
      relaxation: 1.0,
      error_on_nonconvergence: true,
    }
  }
}

#[derive(Debug, Clone)]
pub struct NewtonReport {
  /// Number of Newton steps taken.
  pub iterations: usize,
  /// Residual norm of the returned iterate.
  pub residual_norm: f64,
  pub converged: bool,
  /// Residual norms of all iterates, starting with the initial guess.
  pub history: Vec<f64>,
}

pub struct NewtonSolver {
  config: NewtonConfig,
}
impl NewtonSolver {
  pub fn new(config: NewtonConfig) -> Self {
    Self { config }
  }

  pub fn config(&self) -> &NewtonConfig {
    &self.config
  }

  /// Solves the problem starting from `u`.
  ///
  /// The coefficients of the fixed DOFs (boundary and isolated vertices) of
  /// the initial guess are set to zero and every update vanishes there.
  pub fn solve<P: NonlinearProblem>(
    &self,
    problem: &P,
    mut u: FeFunction,
  ) -> Result<(FeFunction, NewtonReport)> {
    let fixed_dofs = problem.space().fixed_dofs();
    for &idof in &fixed_dofs {
      u.coeffs_mut()[idof] = 0.0;
    }

    let residual = |u: &FeFunction| {
      let mut r = problem.residual(u);
      for &idof in &fixed_dofs {
        r[idof] = 0.0;
      }
      r
    };

    let mut r = residual(&u);
    let r0 = r.norm();
    let mut history = vec![r0];
    let mut iterations = 0;
    let mut converged = self.is_converged(r0, r0);
    debug!("newton iteration {iterations}: residual norm {r0:e}");

    while !converged && iterations < self.config.maximum_iterations {
      let mut jacobian = problem.jacobian(&u);
      let mut rhs = -r;
      fix_dofs_zero(&fixed_dofs, &mut jacobian, &mut rhs);
      let du = FaerLu::new(&jacobian)?.solve(&rhs);
      if du.iter().any(|v| !v.is_finite()) {
        return Err(Error::LinearSolve(
          "newton update is not finite, jacobian is probably singular".into(),
        ));
      }
      u.coeffs_mut().axpy(self.config.relaxation, &du, 1.0);
      iterations += 1;

      r = residual(&u);
      let norm = r.norm();
      history.push(norm);
      converged = self.is_converged(norm, r0);
      debug!(
        "newton iteration {iterations}: residual norm {norm:e} (relative {:e})",
        norm / r0
      );
    }

    let residual_norm = *history.last().unwrap_or(&r0);
    if converged {
      info!("newton solver converged in {iterations} iterations");
    } else if self.config.error_on_nonconvergence {
      return Err(Error::NewtonDiverged {
        iterations,
        residual_norm,
      });
    } else {
      warn!(
        "newton solver did not converge after {iterations} iterations (residual norm {residual_norm:e})"
      );
    }

    let report = NewtonReport {
      iterations,
      residual_norm,
      converged,
      history,
    };
    Ok((u, report))
  }

  fn is_converged(&self, norm: f64, initial_norm: f64) -> bool {
    norm < self.config.absolute_tolerance
      || (initial_norm > 0.0 && norm / initial_norm < self.config.relative_tolerance)
  }
}
