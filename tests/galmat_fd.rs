//! Verify the P1 Galerkin matrix of the negative Laplacian on structured
//! unit-square meshes by comparing to finite differences.
//!
//! Mesh nodes are ordered lexicographically.

// On meshes with "right" diagonals the diagonal edges carry no stiffness,
// so the FE matrix is the tensor product of 1D Neumann FD Laplacians
// with trapezoidal weights: $A = D_y times.circle L_x + L_y times.circle D_x$.

extern crate nalgebra as na;

use nlpoisson::{
  assemble, fe, linalg::assert_mat_eq, mesh::unit_square::RectangleMesh, space::FeSpace,
};

use std::rc::Rc;

#[test]
fn fe_vs_fd() {
  for ncells_per_axis in 1..=6 {
    let mesh = Rc::new(RectangleMesh::new_unit_square(ncells_per_axis).to_mesh());
    let space = FeSpace::new(mesh);
    let fe_laplacian = assemble::assemble_galmat(&space, fe::laplacian_elmat).to_nalgebra_dense();

    let nnodes = ncells_per_axis + 1;
    let lapl = laplacian_1d_neumann(nnodes);
    let weights = trapezoidal_weights(nnodes);
    let fd_laplacian = weights.kronecker(&lapl) + lapl.kronecker(&weights);

    println!("FE:\n{fe_laplacian:.3}");
    println!("FD:\n{fd_laplacian:.3}");
    assert_mat_eq(&fe_laplacian, &fd_laplacian);
  }
}

#[test]
fn galmat_paper_and_pen() {
  // single square, cells [0, 1, 3] and [0, 2, 3]
  #[rustfmt::skip]
  let expected = na::DMatrix::from_row_slice(4, 4, &[
     2, -1, -1,  0,
    -1,  2,  0, -1,
    -1,  0,  2, -1,
     0, -1, -1,  2,
  ]).cast::<f64>() / 2.0;

  let mesh = Rc::new(RectangleMesh::new_unit_square(1).to_mesh());
  let space = FeSpace::new(mesh);
  let computed = assemble::assemble_galmat(&space, fe::laplacian_elmat).to_nalgebra_dense();
  assert_mat_eq(&computed, &expected);
}

/// Mesh width independent FD Laplacian with natural boundary rows.
fn laplacian_1d_neumann(size: usize) -> na::DMatrix<f64> {
  let mut laplacian = na::DMatrix::zeros(size, size);
  for i in 0..size - 1 {
    laplacian[(i, i)] += 1.0;
    laplacian[(i + 1, i + 1)] += 1.0;
    laplacian[(i, i + 1)] -= 1.0;
    laplacian[(i + 1, i)] -= 1.0;
  }
  laplacian
}

fn trapezoidal_weights(size: usize) -> na::DMatrix<f64> {
  let mut weights = na::DMatrix::identity(size, size);
  weights[(0, 0)] = 0.5;
  weights[(size - 1, size - 1)] = 0.5;
  weights
}
