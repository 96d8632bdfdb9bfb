extern crate nalgebra as na;
extern crate nalgebra_sparse as nas;

pub mod assemble;
pub mod driver;
pub mod error;
pub mod fe;
pub mod io;
pub mod linalg;
pub mod locate;
pub mod mesh;
pub mod newton;
pub mod problem;
pub mod project;
pub mod quadrature;
pub mod sample;
pub mod space;
pub mod util;

pub use error::{Error, Result};
