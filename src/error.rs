use std::path::PathBuf;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
  #[error("failed to access `{}`", path.display())]
  Io {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },

  #[error("malformed xml in `{}`", path.display())]
  Xml {
    path: PathBuf,
    #[source]
    source: roxmltree::Error,
  },

  #[error("invalid contents of `{}`: {reason}", path.display())]
  Format { path: PathBuf, reason: String },

  #[error("invalid mesh: {0}")]
  InvalidMesh(String),

  #[error("failed to parse gmsh file: {0}")]
  Gmsh(String),

  #[error("invalid npy data: {0}")]
  Npy(String),

  #[error("linear solver failed: {0}")]
  LinearSolve(String),

  #[error("newton solver did not converge after {iterations} iterations (residual norm {residual_norm:e})")]
  NewtonDiverged {
    iterations: usize,
    residual_norm: f64,
  },

  #[error("invalid parameter: {0}")]
  InvalidParameter(String),

  #[error("point ({x}, {y}) lies outside of the mesh")]
  PointOutsideMesh { x: f64, y: f64 },
}

impl Error {
  pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
    Self::Io {
      path: path.into(),
      source,
    }
  }

  pub fn format(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
    Self::Format {
      path: path.into(),
      reason: reason.into(),
    }
  }

  /// Whether this error stems from a file that does not exist.
  pub fn is_not_found(&self) -> bool {
    matches!(self, Self::Io { source, .. } if source.kind() == std::io::ErrorKind::NotFound)
  }
}
