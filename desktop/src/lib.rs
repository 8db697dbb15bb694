pub mod animation;
pub mod cli;
pub mod convert;
pub mod error;
pub mod output;
pub mod raster;
pub mod source;

pub use error::{Error, Result};
