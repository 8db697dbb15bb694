#![no_std]

pub mod binarize;
pub mod config;
pub mod emit;
pub mod frame;
pub mod pack;
pub mod pipeline;
pub mod playback;
pub mod settings;

#[cfg(test)]
mod tests;

extern crate alloc;

pub use binarize::{BinaryMask, binarize};
pub use config::{ConfigError, ConversionConfig, ExportOptions};
pub use emit::{ExportDocument, NamedBitmap, emit};
pub use frame::{FrameError, NearestNeighbor, Pixels, RasterFrame, Resize};
pub use pack::{Layout, PackedBitmap, pack};
pub use pipeline::{BatchPipeline, PipelineError, Progress};
pub use settings::{Settings, SettingsError};
