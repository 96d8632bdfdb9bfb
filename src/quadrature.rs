use crate::mesh::{coordinates::CoordTriangle, Point};

use once_cell::sync::Lazy;

/// Area of the reference triangle.
pub const REF_VOL: f64 = 0.5;

/// Strang-Fix rule with 3 interior nodes. Exact for quadratic polynomials.
pub static QUAD_DEGREE2: Lazy<QuadRule> = Lazy::new(|| {
  let nodes = na::Matrix2xX::from_column_slice(&[
    1.0 / 6.0,
    1.0 / 6.0,
    2.0 / 3.0,
    1.0 / 6.0,
    1.0 / 6.0,
    2.0 / 3.0,
  ]);
  let weights = na::DVector::from_element(3, REF_VOL / 3.0);
  QuadRule::new(nodes, weights)
});

/// Dunavant rule with 6 nodes. Exact for polynomials of degree 4.
pub static QUAD_DEGREE4: Lazy<QuadRule> = Lazy::new(|| {
  const A: f64 = 0.445_948_490_915_965;
  const B: f64 = 0.091_576_213_509_771;
  const WA: f64 = 0.223_381_589_678_011;
  const WB: f64 = 0.109_951_743_655_322;
  #[rustfmt::skip]
  let nodes = na::Matrix2xX::from_column_slice(&[
    A, A,
    1.0 - 2.0 * A, A,
    A, 1.0 - 2.0 * A,
    B, B,
    1.0 - 2.0 * B, B,
    B, 1.0 - 2.0 * B,
  ]);
  let weights = REF_VOL * na::DVector::from_column_slice(&[WA, WA, WA, WB, WB, WB]);
  QuadRule::new(nodes, weights)
});

/// A quadrature rule defined on the reference triangle.
pub struct QuadRule {
  nodes: na::Matrix2xX<f64>,
  weights: na::DVector<f64>,
}
impl QuadRule {
  pub fn new(nodes: na::Matrix2xX<f64>, weights: na::DVector<f64>) -> Self {
    assert_eq!(nodes.ncols(), weights.len());
    Self { nodes, weights }
  }

  pub fn npoints(&self) -> usize {
    self.weights.len()
  }
  pub fn nodes(&self) -> &na::Matrix2xX<f64> {
    &self.nodes
  }
  pub fn weights(&self) -> &na::DVector<f64> {
    &self.weights
  }

  /// Barycentric coordinates of the nodes, one per column.
  pub fn node_barys(&self) -> na::Matrix3xX<f64> {
    let mut barys = na::Matrix3xX::zeros(self.npoints());
    for (i, n) in self.nodes.column_iter().enumerate() {
      barys[(0, i)] = 1.0 - n[0] - n[1];
      barys[(1, i)] = n[0];
      barys[(2, i)] = n[1];
    }
    barys
  }

  pub fn apply_ref<F>(&self, f: F) -> f64
  where
    F: Fn(Point) -> f64,
  {
    self
      .nodes
      .column_iter()
      .zip(self.weights.iter())
      .map(|(n, w)| w * f(n.into_owned()))
      .sum()
  }

  /// Integrates `f` over the given triangle.
  pub fn apply<F>(&self, f: F, triangle: &CoordTriangle) -> f64
  where
    F: Fn(Point) -> f64,
  {
    triangle.vol() / REF_VOL
      * self
        .nodes
        .column_iter()
        .zip(self.weights.iter())
        .map(|(n, w)| w * f(triangle.apply_reference_transform(&n.into_owned())))
        .sum::<f64>()
  }

  /// The nodes mapped to the given triangle together with their scaled weights.
  pub fn transformed(&self, triangle: &CoordTriangle) -> impl Iterator<Item = (Point, f64)> + '_ {
    let scale = triangle.vol() / REF_VOL;
    let triangle = triangle.clone();
    self
      .nodes
      .column_iter()
      .zip(self.weights.iter())
      .map(move |(n, &w)| (triangle.apply_reference_transform(&n.into_owned()), scale * w))
  }
}

#[cfg(test)]
mod test {
  use super::{QuadRule, QUAD_DEGREE2, QUAD_DEGREE4, REF_VOL};
  use crate::mesh::coordinates::CoordTriangle;

  use approx::assert_relative_eq;

  /// $int_K x^a y^b dif x = a! b! / (a + b + 2)!$ on the reference triangle.
  fn ref_monomial_integral(a: u32, b: u32) -> f64 {
    let fac = |n: u32| (1..=n).product::<u32>() as f64;
    fac(a) * fac(b) / fac(a + b + 2)
  }

  fn check_exactness(rule: &QuadRule, degree: u32) {
    assert_relative_eq!(rule.weights().sum(), REF_VOL, epsilon = 1e-14);
    for a in 0..=degree {
      for b in 0..=(degree - a) {
        let computed = rule.apply_ref(|p| p.x.powi(a as i32) * p.y.powi(b as i32));
        assert_relative_eq!(computed, ref_monomial_integral(a, b), epsilon = 1e-12);
      }
    }
  }

  #[test]
  fn degree2_exactness() {
    check_exactness(&QUAD_DEGREE2, 2);
  }

  #[test]
  fn degree4_exactness() {
    check_exactness(&QUAD_DEGREE4, 4);
  }

  #[test]
  fn integrate_on_physical_triangle() {
    let t = CoordTriangle::new(na::Matrix2x3::new(1.0, 3.0, 1.0, 1.0, 1.0, 2.0));
    assert_relative_eq!(QUAD_DEGREE2.apply(|_| 1.0, &t), 1.0, epsilon = 1e-14);
    // the centroid of this triangle is (5/3, 4/3)
    assert_relative_eq!(QUAD_DEGREE2.apply(|p| p.x, &t), 5.0 / 3.0, epsilon = 1e-14);
    let sum: f64 = QUAD_DEGREE4.transformed(&t).map(|(p, w)| w * p.y).sum();
    assert_relative_eq!(sum, 4.0 / 3.0, epsilon = 1e-14);
  }
}
