//! File layout, the solve-and-sample procedure and the batch driver.
//!
//! All files live below a root directory:
//! - `Meshes/{coarse_}mesh_<id>.xml` (or `.msh`)
//! - `Data/data_<id>.xml`, source data on the reference unit-square mesh
//! - `Solutions/{coarse_}solution_<id>.npy`

use crate::{
  io::{load_function, save_function, write_npy},
  mesh::{read_mesh, unit_square::RectangleMesh},
  newton::{NewtonConfig, NewtonReport},
  problem,
  project::l2_project,
  sample::{sample_on_grid, SampledGrid},
  space::FeSpace,
  Error, Result,
};

use std::{
  path::{Path, PathBuf},
  rc::Rc,
  time::{Duration, Instant},
};
use tracing::{debug, info};

#[derive(Debug, Clone)]
pub struct DataLayout {
  root: PathBuf,
}
impl Default for DataLayout {
  fn default() -> Self {
    Self::new(".")
  }
}
impl DataLayout {
  pub fn new(root: impl Into<PathBuf>) -> Self {
    Self { root: root.into() }
  }

  pub fn root(&self) -> &Path {
    &self.root
  }

  fn prefix(coarse: bool) -> &'static str {
    if coarse {
      "coarse_"
    } else {
      ""
    }
  }

  pub fn mesh_path(&self, id: usize, coarse: bool) -> PathBuf {
    self
      .root
      .join("Meshes")
      .join(format!("{}mesh_{id}.xml", Self::prefix(coarse)))
  }

  /// The mesh file to read: the DOLFIN XML mesh, or the Gmsh mesh of the
  /// same name if only that one exists.
  pub fn find_mesh(&self, id: usize, coarse: bool) -> PathBuf {
    let xml = self.mesh_path(id, coarse);
    let msh = xml.with_extension("msh");
    if !xml.exists() && msh.exists() {
      msh
    } else {
      xml
    }
  }

  pub fn data_path(&self, id: usize) -> PathBuf {
    self.root.join("Data").join(format!("data_{id}.xml"))
  }

  pub fn solution_path(&self, id: usize, coarse: bool) -> PathBuf {
    self
      .root
      .join("Solutions")
      .join(format!("{}solution_{id}.npy", Self::prefix(coarse)))
  }

  pub fn solution_function_path(&self, id: usize) -> PathBuf {
    self.root.join("Solutions").join(format!("solution_{id}.xml"))
  }
}

/// Parameters of a single solve.
#[derive(Debug, Clone)]
pub struct SolveParams {
  /// Grid resolution. The reference mesh has `resolution - 1` cells per side.
  pub resolution: usize,
  /// Resolution of the mesh generator, only recorded.
  pub reference_resolution: usize,
  pub mesh_id: usize,
  pub data_id: usize,
  /// Write the sampled grid to the solutions directory.
  pub save: bool,
  /// Use the coarse mesh and coarse solution file names.
  pub coarse: bool,
}
impl SolveParams {
  pub fn new(resolution: usize, id: usize) -> Self {
    Self {
      resolution,
      reference_resolution: resolution,
      mesh_id: id,
      data_id: id,
      save: false,
      coarse: false,
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Diagnostics {
  pub l2_norm: f64,
  pub h1_seminorm: f64,
  pub min: f64,
  pub max: f64,
}

#[derive(Debug, Clone)]
pub struct SolveOutput {
  pub grid: SampledGrid,
  pub newton: NewtonReport,
  pub diagnostics: Diagnostics,
}

#[derive(Debug, Clone, Default)]
pub struct BatchReport {
  /// Wall-clock duration of every solve, by id.
  pub durations: Vec<(usize, Duration)>,
}
impl BatchReport {
  pub fn nsolves(&self) -> usize {
    self.durations.len()
  }
  pub fn total(&self) -> Duration {
    self.durations.iter().map(|(_, d)| *d).sum()
  }
}

#[derive(Debug, Clone, Default)]
pub struct Driver {
  layout: DataLayout,
  newton: NewtonConfig,
  export_function: bool,
}
impl Driver {
  pub fn new(layout: DataLayout) -> Self {
    Self {
      layout,
      ..Default::default()
    }
  }

  pub fn with_newton_config(mut self, newton: NewtonConfig) -> Self {
    self.newton = newton;
    self
  }

  /// Additionally save the solution as DOLFIN XML function whenever the grid is saved.
  pub fn with_function_export(mut self, export: bool) -> Self {
    self.export_function = export;
    self
  }

  pub fn layout(&self) -> &DataLayout {
    &self.layout
  }
  pub fn newton_config(&self) -> &NewtonConfig {
    &self.newton
  }

  /// Solves the problem for the given mesh and data and samples the solution.
  pub fn solve_and_sample(&self, params: &SolveParams) -> Result<SampledGrid> {
    self.solve(params).map(|output| output.grid)
  }

  /// Like [`Driver::solve_and_sample`], also returning solver and solution diagnostics.
  pub fn solve(&self, params: &SolveParams) -> Result<SolveOutput> {
    if params.resolution < 2 {
      return Err(Error::InvalidParameter(format!(
        "resolution must be at least 2, got {}",
        params.resolution
      )));
    }
    debug!(
      "solving mesh {} with data {} (resolution {}, reference resolution {})",
      params.mesh_id, params.data_id, params.resolution, params.reference_resolution
    );

    let mesh = read_mesh(self.layout.find_mesh(params.mesh_id, params.coarse))?;
    let space = Rc::new(FeSpace::new(Rc::new(mesh)));

    let reference_mesh = RectangleMesh::new_unit_square(params.resolution - 1).to_mesh();
    let reference_space = Rc::new(FeSpace::new(Rc::new(reference_mesh)));

    let data = load_function(self.layout.data_path(params.data_id), reference_space)?;
    let source = l2_project(&data, space)?;

    let (u, newton) = problem::solve(source, self.newton.clone())?;

    let diagnostics = Diagnostics {
      l2_norm: u.l2_norm(),
      h1_seminorm: u.h1_seminorm(),
      min: u.min(),
      max: u.max(),
    };
    debug!(
      "solution {}: L2 norm {:e}, H1 seminorm {:e}, range [{:e}, {:e}]",
      params.data_id, diagnostics.l2_norm, diagnostics.h1_seminorm, diagnostics.min, diagnostics.max
    );

    let grid = sample_on_grid(&u, params.resolution);

    if params.save {
      let path = self.layout.solution_path(params.data_id, params.coarse);
      write_npy(grid.values(), &path)?;
      debug!("wrote {}", path.display());
      if self.export_function {
        save_function(&u, self.layout.solution_function_path(params.data_id))?;
      }
    }

    Ok(SolveOutput {
      grid,
      newton,
      diagnostics,
    })
  }

  /// Solves for every id in `current_data..current_data + total_count`,
  /// using the same id for mesh and data. Stops at the first error.
  pub fn run_batch(
    &self,
    current_data: usize,
    total_count: usize,
    resolution: usize,
    reference_resolution: usize,
    save: bool,
    coarse: bool,
  ) -> Result<BatchReport> {
    let mut report = BatchReport::default();
    for id in current_data..current_data + total_count {
      let params = SolveParams {
        resolution,
        reference_resolution,
        mesh_id: id,
        data_id: id,
        save,
        coarse,
      };
      let start = Instant::now();
      let output = self.solve(&params)?;
      let elapsed = start.elapsed();
      info!(
        "solved {id} in {:.3}s ({} newton iterations)",
        elapsed.as_secs_f64(),
        output.newton.iterations
      );
      report.durations.push((id, elapsed));
    }
    info!(
      "batch of {} solves took {:.3}s",
      report.nsolves(),
      report.total().as_secs_f64()
    );
    Ok(report)
  }
}
