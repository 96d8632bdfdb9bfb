//! Generates a few meshes and source fields in a temporary directory
//! and runs a batch of solves on them.

extern crate nalgebra as na;

use nlpoisson::{
  driver::{DataLayout, Driver},
  io::{read_npy, save_function},
  mesh::{dolfin::write_mesh, unit_square::RectangleMesh},
  space::{FeFunction, FeSpace},
};

use std::rc::Rc;

fn main() -> nlpoisson::Result<()> {
  tracing_subscriber::fmt::init();

  let resolution = 32;
  let nsamples = 4;

  let dir = tempfile::tempdir().map_err(|e| nlpoisson::Error::io(".", e))?;
  let layout = DataLayout::new(dir.path());

  let reference_mesh = RectangleMesh::new_unit_square(resolution - 1).to_mesh();
  let reference_space = Rc::new(FeSpace::new(Rc::new(reference_mesh)));

  for id in 0..nsamples {
    let mesh = RectangleMesh::new_unit_square(8 + 4 * id).to_mesh();
    write_mesh(&mesh, layout.mesh_path(id, false))?;

    let center = na::Vector2::new(0.3 + 0.1 * id as f64, 0.6 - 0.05 * id as f64);
    let data = FeFunction::interpolate(reference_space.clone(), |p| {
      -10.0 * (id + 1) as f64 * (-15.0 * (p - center).norm_squared()).exp()
    });
    save_function(&data, layout.data_path(id))?;
  }

  let driver = Driver::new(layout.clone());
  let report = driver.run_batch(0, nsamples, resolution, resolution, true, false)?;

  for (id, duration) in &report.durations {
    let grid = read_npy(layout.solution_path(*id, false))?;
    println!(
      "solution {id}: max {:.4} after {:.1}ms",
      grid.max(),
      duration.as_secs_f64() * 1e3
    );
  }
  println!("total: {:.1}ms", report.total().as_secs_f64() * 1e3);

  Ok(())
}
