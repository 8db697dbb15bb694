use alloc::{format, string::String, vec::Vec};
use core::sync::atomic::{AtomicBool, Ordering};

use log::{debug, info, warn};

use crate::{
    binarize::binarize,
    config::{ConfigError, ConversionConfig, ExportOptions},
    emit::{ExportDocument, NamedBitmap},
    frame::{FrameError, RasterFrame, Resize},
    pack::{PackedBitmap, pack},
};

/// Reported after every converted frame.
#[derive(Debug, Clone, PartialEq)]
pub struct Progress {
    pub index: usize,
    pub total: usize,
    /// Cumulative, `0.0..=1.0`.
    pub fraction: f32,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PipelineError {
    Config(ConfigError),
    Frame {
        index: usize,
        source: Option<String>,
        error: FrameError,
    },
    Cancelled {
        completed: usize,
    },
}

impl core::fmt::Display for PipelineError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            PipelineError::Config(err) => write!(f, "invalid configuration: {err}"),
            PipelineError::Frame {
                index,
                source,
                error,
            } => match source {
                Some(source) => write!(f, "frame {index} ({source}): {error}"),
                None => write!(f, "frame {index}: {error}"),
            },
            PipelineError::Cancelled { completed } => {
                write!(f, "cancelled after {completed} frames")
            }
        }
    }
}

impl core::error::Error for PipelineError {}

impl From<ConfigError> for PipelineError {
    fn from(err: ConfigError) -> Self {
        PipelineError::Config(err)
    }
}

/// Resize (if configured), binarize and pack a single frame.
///
/// A frame with a zero side after resizing is rejected with [`FrameError::Empty`].
pub fn convert_frame(
    frame: &RasterFrame,
    config: &ConversionConfig,
    resizer: &impl Resize,
) -> Result<PackedBitmap, FrameError> {
    let resized;
    let frame = match config.resize {
        Some((width, height)) if (width, height) != (frame.width(), frame.height()) => {
            resized = resizer.resize(frame, width, height)?;
            &resized
        }
        _ => frame,
    };
    if frame.width() == 0 || frame.height() == 0 {
        return Err(FrameError::Empty {
            width: frame.width(),
            height: frame.height(),
        });
    }
    let mask = binarize(frame, config.threshold, config.invert);
    debug_assert_eq!(
        (mask.width(), mask.height()),
        (frame.width(), frame.height())
    );
    Ok(pack(&mask, config.layout))
}

/// Runs an ordered batch of frames through resize, binarize and pack.
///
/// Frames are processed strictly in order; identifiers and table positions
/// follow input order. The optional cancel flag is checked before each frame.
pub struct BatchPipeline<'a, R> {
    config: &'a ConversionConfig,
    export: &'a ExportOptions,
    resizer: R,
    cancel: Option<&'a AtomicBool>,
}

impl<'a, R: Resize> BatchPipeline<'a, R> {
    pub fn new(config: &'a ConversionConfig, export: &'a ExportOptions, resizer: R) -> Self {
        Self {
            config,
            export,
            resizer,
            cancel: None,
        }
    }

    pub fn with_cancel(mut self, cancel: &'a AtomicBool) -> Self {
        self.cancel = Some(cancel);
        self
    }

    fn cancelled(&self) -> bool {
        self.cancel.is_some_and(|flag| flag.load(Ordering::Relaxed))
    }

    pub fn run<I, F>(&self, frames: I, mut progress: F) -> Result<ExportDocument, PipelineError>
    where
        I: IntoIterator<Item = RasterFrame>,
        I::IntoIter: ExactSizeIterator,
        F: FnMut(Progress),
    {
        self.config.validate()?;

        let frames = frames.into_iter();
        let total = frames.len();
        info!(
            "Converting {} frames: {} layout, threshold {}, invert {}, resize {:?}",
            total, self.config.layout, self.config.threshold, self.config.invert, self.config.resize
        );

        let mut bitmaps = Vec::with_capacity(total);
        for (index, frame) in frames.enumerate() {
            if self.cancelled() {
                warn!("Conversion cancelled after {index}/{total} frames");
                return Err(PipelineError::Cancelled { completed: index });
            }

            let bitmap = match convert_frame(&frame, self.config, &self.resizer) {
                Ok(bitmap) => bitmap,
                Err(error) => {
                    return Err(PipelineError::Frame {
                        index,
                        source: frame.source().map(String::from),
                        error,
                    });
                }
            };
            let identifier = self.config.identifier(index);
            let label = format!(
                "Converted {}/{}: {}",
                index + 1,
                total,
                frame.source().unwrap_or(identifier.as_str())
            );
            debug!(
                "{identifier}: {}x{} -> {} bytes",
                bitmap.width(),
                bitmap.height(),
                bitmap.bytes().len()
            );

            bitmaps.push(NamedBitmap {
                identifier,
                source: frame.source().map(String::from),
                bitmap,
            });
            progress(Progress {
                index,
                total,
                fraction: (index + 1) as f32 / total as f32,
                label,
            });
        }

        Ok(ExportDocument {
            name: self.export.name.clone(),
            timestamp: self.export.timestamp.clone(),
            bitmaps,
            emit_header: self.export.emit_header,
            emit_pointer_table: self.export.emit_pointer_table,
            frame_delay_ms: self.export.frame_delay_ms,
        })
    }
}
