use crate::{
  fe::{ElMatProvider, ElVecProvider},
  linalg::SparseMatrix,
  space::{DofIdx, FeSpace},
  util,
};

/// Assembly algorithm for the Galerkin Matrix.
///
/// Cells are visited in ascending order, so the result is deterministic.
pub fn assemble_galmat(space: &FeSpace, elmat: impl ElMatProvider) -> SparseMatrix {
  let mesh = space.mesh();
  let ndofs = space.ndofs();
  let mut galmat = SparseMatrix::zeros(ndofs, ndofs);
  for icell in 0..mesh.ncells() {
    let triangle = mesh.coord_triangle(icell);
    let elmat = elmat.eval(icell, &triangle);
    let dofs = space.dof_handler().local2global(icell);
    for (ilocal, &iglobal) in dofs.iter().enumerate() {
      for (jlocal, &jglobal) in dofs.iter().enumerate() {
        galmat.push(iglobal, jglobal, elmat[(ilocal, jlocal)]);
      }
    }
  }
  galmat
}

/// Assembly algorithm for the Galerkin Vector.
pub fn assemble_galvec(space: &FeSpace, elvec: impl ElVecProvider) -> na::DVector<f64> {
  let mesh = space.mesh();
  let mut galvec = na::DVector::zeros(space.ndofs());
  for icell in 0..mesh.ncells() {
    let triangle = mesh.coord_triangle(icell);
    let elvec = elvec.eval(icell, &triangle);
    let dofs = space.dof_handler().local2global(icell);
    for (ilocal, &iglobal) in dofs.iter().enumerate() {
      galvec[iglobal] += elvec[ilocal];
    }
  }
  galvec
}

/// Fixes the boundary DOFs, and the DOFs of vertices without cells, to zero.
pub fn enforce_homogeneous_dirichlet_bc(
  space: &FeSpace,
  galmat: &mut SparseMatrix,
  galvec: &mut na::DVector<f64>,
) {
  fix_dofs_zero(&space.fixed_dofs(), galmat, galvec);
}

/// Replaces the rows and columns of `dofs` by identity rows and columns
/// and zeroes the corresponding entries of `galvec`.
pub fn fix_dofs_zero(dofs: &[DofIdx], galmat: &mut SparseMatrix, galvec: &mut na::DVector<f64>) {
  let ndofs = galmat.nrows();
  let dof_flags = util::indicies_to_flags(dofs, ndofs);
  galmat.set_zero(|i, j| dof_flags[i] || dof_flags[j]);
  for &idof in dofs {
    galmat.push(idof, idof, 1.0);
    galvec[idof] = 0.0;
  }
}
