use super::{Cell, Point, VertexIdx};

#[derive(Debug, Clone, PartialEq)]
pub struct VertexCoords {
  /// The vertex coordinates in the columns of a matrix.
  matrix: na::Matrix2xX<f64>,
}
impl VertexCoords {
  pub fn new(matrix: na::Matrix2xX<f64>) -> Self {
    Self { matrix }
  }

  pub fn from_points(points: &[Point]) -> Self {
    Self::new(na::Matrix2xX::from_columns(points))
  }

  pub fn nvertices(&self) -> usize {
    self.matrix.ncols()
  }

  pub fn coord(&self, ivertex: VertexIdx) -> Point {
    self.matrix.column(ivertex).into_owned()
  }

  pub fn matrix(&self) -> &na::Matrix2xX<f64> {
    &self.matrix
  }
  pub fn into_matrix(self) -> na::Matrix2xX<f64> {
    self.matrix
  }

  pub fn coord_triangle(&self, cell: &Cell) -> CoordTriangle {
    let mut vertices = na::Matrix2x3::zeros();
    for (i, &v) in cell.iter().enumerate() {
      vertices.set_column(i, &self.matrix.column(v));
    }
    CoordTriangle::new(vertices)
  }

  pub fn eval_coord_fn<F>(&self, mut f: F) -> na::DVector<f64>
  where
    F: FnMut(Point) -> f64,
  {
    na::DVector::from_iterator(
      self.nvertices(),
      self.matrix.column_iter().map(|c| f(c.into_owned())),
    )
  }

  /// Axis-aligned bounding box as `(min, max)` corners.
  pub fn bounding_box(&self) -> (Point, Point) {
    let min = Point::new(self.matrix.row(0).min(), self.matrix.row(1).min());
    let max = Point::new(self.matrix.row(0).max(), self.matrix.row(1).max());
    (min, max)
  }
}

/// A triangle given through the coordinates of its vertices.
#[derive(Debug, Clone, PartialEq)]
pub struct CoordTriangle {
  vertices: na::Matrix2x3<f64>,
}
impl CoordTriangle {
  pub fn new(vertices: na::Matrix2x3<f64>) -> Self {
    Self { vertices }
  }

  pub fn vertices(&self) -> &na::Matrix2x3<f64> {
    &self.vertices
  }
  pub fn vertex(&self, ivertex: usize) -> Point {
    self.vertices.column(ivertex).into_owned()
  }

  /// The edge vectors emanating from the first vertex.
  pub fn spanning_vectors(&self) -> na::Matrix2<f64> {
    let v0 = self.vertices.column(0);
    let mut mat = na::Matrix2::zeros();
    mat.set_column(0, &(self.vertices.column(1) - v0));
    mat.set_column(1, &(self.vertices.column(2) - v0));
    mat
  }

  /// The determinant of the affine map from the reference triangle.
  pub fn det(&self) -> f64 {
    self.spanning_vectors().determinant()
  }
  /// The area of the triangle.
  pub fn vol(&self) -> f64 {
    0.5 * self.det().abs()
  }

  /// The largest distance between two points of the triangle.
  pub fn diameter(&self) -> f64 {
    let e01 = (self.vertex(1) - self.vertex(0)).norm();
    let e02 = (self.vertex(2) - self.vertex(0)).norm();
    let e12 = (self.vertex(2) - self.vertex(1)).norm();
    e01.max(e02).max(e12)
  }

  pub fn barycenter(&self) -> Point {
    self.vertices.column_mean()
  }

  /// Maps a point of the reference triangle to this triangle.
  pub fn apply_reference_transform(&self, ref_point: &na::Vector2<f64>) -> Point {
    self.vertex(0) + self.spanning_vectors() * ref_point
  }

  /// Barycentric coordinates of a point with respect to this triangle.
  ///
  /// Components are negative for points outside of the triangle.
  pub fn barycentric_coords(&self, p: &Point) -> na::Vector3<f64> {
    let b = self.spanning_vectors();
    let det = self.det();
    let d = p - self.vertex(0);
    let l1 = (d.x * b[(1, 1)] - d.y * b[(0, 1)]) / det;
    let l2 = (b[(0, 0)] * d.y - b[(1, 0)] * d.x) / det;
    na::Vector3::new(1.0 - l1 - l2, l1, l2)
  }

  /// Whether the point lies inside the triangle, allowing barycentric
  /// coordinates down to `-tol`.
  pub fn contains(&self, p: &Point, tol: f64) -> bool {
    self.barycentric_coords(p).min() >= -tol
  }

  /// The constant gradients of the barycentric coordinate functions,
  /// one per column.
  pub fn difbarys(&self) -> na::Matrix2x3<f64> {
    let b = self.spanning_vectors();
    let inv_transpose = na::Matrix2::new(b[(1, 1)], -b[(1, 0)], -b[(0, 1)], b[(0, 0)]) / self.det();
    inv_transpose * ref_difbarys()
  }
}

/// The constant gradients of the reference barycentric coordinate functions.
pub fn ref_difbarys() -> na::Matrix2x3<f64> {
  na::Matrix2x3::new(-1.0, 1.0, 0.0, -1.0, 0.0, 1.0)
}
