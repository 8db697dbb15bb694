use std::path::PathBuf;

use oledpack_core::{ConfigError, FrameError, PipelineError, SettingsError};

/// Failures by stage: acquisition, decomposition, conversion, output.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("failed to load {path}: {source}")]
    Load {
        path: PathBuf,
        source: image::ImageError,
    },
    #[error("{path}: {source}")]
    Frame { path: PathBuf, source: FrameError },
    #[error("failed to decode frame {index} of {path}: {source}")]
    Decode {
        path: PathBuf,
        index: usize,
        source: image::ImageError,
    },
    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to save image {path}: {source}")]
    Save {
        path: PathBuf,
        source: image::ImageError,
    },
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("{path}: {source}")]
    Settings {
        path: PathBuf,
        source: SettingsError,
    },
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("conversion failed: {0}")]
    Pipeline(#[from] PipelineError),
    #[error("preview window: {0}")]
    Window(#[from] minifb::Error),
    #[error("conversion worker panicked")]
    Worker,
    #[error("no input images")]
    NoInput,
    #[error("{failed} of {total} images failed")]
    Incomplete { failed: usize, total: usize },
}

pub type Result<T> = core::result::Result<T, Error>;
