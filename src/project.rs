use crate::{
  assemble::{assemble_galmat, assemble_galvec, fix_dofs_zero},
  fe::{mass_elmat, ElVec},
  linalg::FaerCholesky,
  mesh::{coordinates::CoordTriangle, CellIdx},
  quadrature::{QUAD_DEGREE4, REF_VOL},
  space::{FeFunction, FeSpace},
  Result,
};

use std::rc::Rc;

/// L2 projection of a FE function onto another FE space.
///
/// Solves $M f_h = b$ with $b_i = integral f phi_i dif x$, where the
/// right-hand side is integrated with a degree 4 rule and `source` is
/// evaluated by point location in its own mesh.
/// Fails if a quadrature point lies outside of the source mesh.
/// Vertices of the target without cells get the coefficient zero.
pub fn l2_project(source: &FeFunction, target: Rc<FeSpace>) -> Result<FeFunction> {
  let qr = &*QUAD_DEGREE4;
  let npoints = qr.npoints();
  let barys = qr.node_barys();

  let source_values = target
    .mesh()
    .coord_triangles()
    .flat_map(|triangle| qr.transformed(&triangle))
    .map(|(p, _)| source.eval(&p))
    .collect::<Result<Vec<f64>>>()?;

  let mut galvec = assemble_galvec(&target, |icell: CellIdx, triangle: &CoordTriangle| {
    let scale = triangle.vol() / REF_VOL;
    let values = &source_values[icell * npoints..(icell + 1) * npoints];
    let mut elvec = ElVec::zeros();
    for (q, (&w, &v)) in qr.weights().iter().zip(values).enumerate() {
      elvec += barys.column(q) * (scale * w * v);
    }
    elvec
  });

  let mut galmat = assemble_galmat(&target, mass_elmat);
  fix_dofs_zero(&target.isolated_dofs(), &mut galmat, &mut galvec);
  let coeffs = FaerCholesky::new(&galmat)?.solve(&galvec);
  Ok(FeFunction::new(target, coeffs))
}
