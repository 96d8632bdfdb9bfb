//! Element matrix and element vector providers for piecewise-linear
//! Lagrangian finite elements on triangles.

use crate::mesh::{coordinates::CoordTriangle, CellIdx};

pub type ElMat = na::Matrix3<f64>;
pub type ElVec = na::Vector3<f64>;

pub trait ElMatProvider {
  fn eval(&self, icell: CellIdx, triangle: &CoordTriangle) -> ElMat;
}
impl<F> ElMatProvider for F
where
  F: Fn(CellIdx, &CoordTriangle) -> ElMat,
{
  fn eval(&self, icell: CellIdx, triangle: &CoordTriangle) -> ElMat {
    self(icell, triangle)
  }
}

pub trait ElVecProvider {
  fn eval(&self, icell: CellIdx, triangle: &CoordTriangle) -> ElVec;
}
impl<F> ElVecProvider for F
where
  F: Fn(CellIdx, &CoordTriangle) -> ElVec,
{
  fn eval(&self, icell: CellIdx, triangle: &CoordTriangle) -> ElVec {
    self(icell, triangle)
  }
}

/// Exact Element Matrix Provider for the (negative) Laplacian.
///
/// $A = [(grad lambda_j, grad lambda_i)_(L^2 (K))]_(i,j)$
pub fn laplacian_elmat(_icell: CellIdx, triangle: &CoordTriangle) -> ElMat {
  let difbarys = triangle.difbarys();
  triangle.vol() * difbarys.transpose() * difbarys
}

/// Exact Element Matrix Provider for mass bilinear form.
pub fn mass_elmat(_icell: CellIdx, triangle: &CoordTriangle) -> ElMat {
  let v = triangle.vol() / 12.0;
  let mut elmat = ElMat::from_element(v);
  elmat.fill_diagonal(2.0 * v);
  elmat
}

/// Element Vector Provider for a piecewise-linear load function.
///
/// The load is given through its vertex values and integrated exactly
/// against the mass matrix.
pub struct LoadElvec<'a> {
  dof_data: &'a na::DVector<f64>,
  cells: &'a [[usize; 3]],
}
impl<'a> LoadElvec<'a> {
  pub fn new(dof_data: &'a na::DVector<f64>, cells: &'a [[usize; 3]]) -> Self {
    Self { dof_data, cells }
  }
}
impl ElVecProvider for LoadElvec<'_> {
  fn eval(&self, icell: CellIdx, triangle: &CoordTriangle) -> ElVec {
    let cell = &self.cells[icell];
    let local = ElVec::new(
      self.dof_data[cell[0]],
      self.dof_data[cell[1]],
      self.dof_data[cell[2]],
    );
    mass_elmat(icell, triangle) * local
  }
}

#[cfg(test)]
mod test {
  use super::{laplacian_elmat, mass_elmat, ElMat, ElVecProvider, LoadElvec};
  use crate::mesh::coordinates::CoordTriangle;

  use approx::assert_relative_eq;

  fn refcell() -> CoordTriangle {
    CoordTriangle::new(na::Matrix2x3::new(0.0, 1.0, 0.0, 0.0, 0.0, 1.0))
  }

  #[test]
  fn laplacian_elmat_refcell() {
    // This expected element matrix has been verified over and over.
    #[rustfmt::skip]
    let expected = 0.5 * ElMat::new(
       2.0, -1.0, -1.0,
      -1.0,  1.0,  0.0,
      -1.0,  0.0,  1.0,
    );
    assert_relative_eq!(laplacian_elmat(0, &refcell()), expected, epsilon = 1e-14);
  }

  #[test]
  fn laplacian_elmat_annihilates_constants() {
    let t = CoordTriangle::new(na::Matrix2x3::new(0.3, 1.7, 0.9, -0.2, 0.4, 1.5));
    let elmat = laplacian_elmat(0, &t);
    assert_relative_eq!(elmat * na::Vector3::from_element(1.0), na::Vector3::zeros(), epsilon = 1e-13);
    assert_relative_eq!(elmat, elmat.transpose());
  }

  #[test]
  fn mass_elmat_sums_to_area() {
    let t = CoordTriangle::new(na::Matrix2x3::new(0.0, 2.0, 0.0, 0.0, 0.0, 3.0));
    assert_relative_eq!(mass_elmat(0, &t).sum(), 3.0, epsilon = 1e-14);
  }

  #[test]
  fn load_elvec_of_constant() {
    let data = na::DVector::from_element(3, 2.0);
    let cells = [[0, 1, 2]];
    let elvec = LoadElvec::new(&data, &cells).eval(0, &refcell());
    // int_K 2 lambda_i = 2 * |K| / 3
    assert_relative_eq!(elvec, na::Vector3::from_element(1.0 / 3.0), epsilon = 1e-14);
  }
}
