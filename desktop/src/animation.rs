//! GIF decomposition into an ordered, single-pass frame sequence.

use std::{
    fs::File,
    io::BufReader,
    path::{Path, PathBuf},
};

use image::{AnimationDecoder, DynamicImage, Frames, codecs::gif::GifDecoder};
use log::{debug, info, warn};
use oledpack_core::{RasterFrame, Resize};

use crate::{
    Error, Result,
    raster::{LanczosResize, frame_from_image, prebinarize},
    source::file_name,
};

/// Used when the container does not declare a delay.
pub const DEFAULT_FRAME_DELAY_MS: u32 = 100;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GifOptions {
    /// Resample every frame to this size.
    pub resize: Option<(u32, u32)>,
    /// Threshold every frame to black/white before handing it on.
    pub prebinarize: Option<u8>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnimationInfo {
    pub frame_count: usize,
    /// Nominal per-frame duration (the first frame's).
    pub duration_ms: u32,
}

/// Lazy frame sequence over one GIF.
///
/// Consumes the decoder as it goes; it cannot be restarted. After a decode
/// error the sequence ends.
pub struct GifFrames {
    path: PathBuf,
    name: String,
    frames: Frames<'static>,
    options: GifOptions,
    yielded: usize,
    duration_ms: Option<u32>,
    finished: bool,
}

pub fn decompose(path: &Path, options: GifOptions) -> Result<GifFrames> {
    let file = File::open(path).map_err(|source| Error::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let decoder = GifDecoder::new(BufReader::new(file)).map_err(|source| Error::Load {
        path: path.to_path_buf(),
        source,
    })?;
    info!("Decomposing {} with {:?}", path.display(), options);
    Ok(GifFrames {
        path: path.to_path_buf(),
        name: file_name(path),
        frames: decoder.into_frames(),
        options,
        yielded: 0,
        duration_ms: None,
        finished: false,
    })
}

impl GifFrames {
    /// Frames produced so far and the nominal duration.
    pub fn info(&self) -> AnimationInfo {
        AnimationInfo {
            frame_count: self.yielded,
            duration_ms: self.duration_ms.unwrap_or(DEFAULT_FRAME_DELAY_MS),
        }
    }

    fn next_frame(&mut self) -> Option<Result<RasterFrame>> {
        let index = self.yielded;
        let frame = match self.frames.next()? {
            Ok(frame) => frame,
            Err(source) => {
                return Some(Err(Error::Decode {
                    path: self.path.clone(),
                    index,
                    source,
                }));
            }
        };

        let (numer, denom) = frame.delay().numer_denom_ms();
        let declared = if denom == 0 { 0 } else { numer / denom };
        let duration_ms = if declared == 0 {
            DEFAULT_FRAME_DELAY_MS
        } else {
            declared
        };
        self.duration_ms.get_or_insert(duration_ms);

        let image = DynamicImage::ImageRgba8(frame.into_buffer());
        Some(self.finish_frame(image, index, duration_ms))
    }

    fn finish_frame(
        &self,
        image: DynamicImage,
        index: usize,
        duration_ms: u32,
    ) -> Result<RasterFrame> {
        let frame_error = |source| Error::Frame {
            path: self.path.clone(),
            source,
        };
        let mut frame = frame_from_image(image)
            .map_err(frame_error)?
            .with_duration(duration_ms)
            .with_source(format!("{} frame {index:03}", self.name));
        if let Some((width, height)) = self.options.resize {
            frame = LanczosResize
                .resize(&frame, width, height)
                .map_err(frame_error)?;
        }
        if let Some(threshold) = self.options.prebinarize {
            frame = prebinarize(&frame, threshold).map_err(frame_error)?;
        }
        debug!(
            "Frame {index}: {}x{}, {duration_ms}ms",
            frame.width(),
            frame.height()
        );
        Ok(frame)
    }
}

impl Iterator for GifFrames {
    type Item = Result<RasterFrame>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }
        match self.next_frame() {
            Some(Ok(frame)) => {
                self.yielded += 1;
                Some(Ok(frame))
            }
            Some(Err(err)) => {
                warn!("{err}");
                self.finished = true;
                Some(Err(err))
            }
            None => {
                self.finished = true;
                info!(
                    "{}: {} frames, {}ms per frame",
                    self.name,
                    self.yielded,
                    self.info().duration_ms
                );
                None
            }
        }
    }
}

impl std::iter::FusedIterator for GifFrames {}

#[derive(Debug)]
pub struct Decomposition {
    pub frames: Vec<RasterFrame>,
    pub info: AnimationInfo,
}

/// A decomposition that stopped early; the frames before the failure are kept.
#[derive(Debug)]
pub struct PartialDecomposition {
    pub decomposition: Decomposition,
    pub error: Error,
}

/// Drain a GIF into memory, reporting each frame as it arrives.
pub fn decompose_all(
    path: &Path,
    options: GifOptions,
    mut progress: impl FnMut(usize, &RasterFrame),
) -> std::result::Result<Decomposition, PartialDecomposition> {
    let mut sequence = match decompose(path, options) {
        Ok(sequence) => sequence,
        Err(error) => {
            return Err(PartialDecomposition {
                decomposition: Decomposition {
                    frames: Vec::new(),
                    info: AnimationInfo {
                        frame_count: 0,
                        duration_ms: DEFAULT_FRAME_DELAY_MS,
                    },
                },
                error,
            });
        }
    };

    let mut frames = Vec::new();
    let mut failure = None;
    for item in sequence.by_ref() {
        match item {
            Ok(frame) => {
                progress(frames.len(), &frame);
                frames.push(frame);
            }
            Err(error) => failure = Some(error),
        }
    }

    let decomposition = Decomposition {
        frames,
        info: sequence.info(),
    };
    match failure {
        None => Ok(decomposition),
        Some(error) => Err(PartialDecomposition {
            decomposition,
            error,
        }),
    }
}
