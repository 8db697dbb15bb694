use alloc::{string::String, vec, vec::Vec};

/// Emitted dimension tables are `uint16_t`.
pub const MAX_DIMENSION: u32 = u16::MAX as u32;

/// Raw 8-bit samples, row-major, no padding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Pixels {
    Luma(Vec<u8>),
    Rgb(Vec<u8>),
}

impl Pixels {
    pub fn channels(&self) -> usize {
        match self {
            Pixels::Luma(_) => 1,
            Pixels::Rgb(_) => 3,
        }
    }

    fn len(&self) -> usize {
        match self {
            Pixels::Luma(samples) | Pixels::Rgb(samples) => samples.len(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameError {
    SampleCount { expected: usize, actual: usize },
    TooLarge { width: u32, height: u32 },
    /// A side is zero; nothing can be packed or emitted for it.
    Empty { width: u32, height: u32 },
}

impl core::fmt::Display for FrameError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            FrameError::SampleCount { expected, actual } => {
                write!(f, "expected {expected} samples, got {actual}")
            }
            FrameError::TooLarge { width, height } => write!(
                f,
                "{width}x{height} exceeds the maximum of {MAX_DIMENSION}x{MAX_DIMENSION}"
            ),
            FrameError::Empty { width, height } => {
                write!(f, "{width}x{height} has no pixels to convert")
            }
        }
    }
}

impl core::error::Error for FrameError {}

/// One decoded source image or animation frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RasterFrame {
    width: u32,
    height: u32,
    pixels: Pixels,
    duration_ms: Option<u32>,
    source: Option<String>,
}

impl RasterFrame {
    pub fn new(width: u32, height: u32, pixels: Pixels) -> Result<Self, FrameError> {
        if width > MAX_DIMENSION || height > MAX_DIMENSION {
            return Err(FrameError::TooLarge { width, height });
        }
        let expected = width as usize * height as usize * pixels.channels();
        if pixels.len() != expected {
            return Err(FrameError::SampleCount {
                expected,
                actual: pixels.len(),
            });
        }
        Ok(Self {
            width,
            height,
            pixels,
            duration_ms: None,
            source: None,
        })
    }

    pub fn from_luma(width: u32, height: u32, samples: Vec<u8>) -> Result<Self, FrameError> {
        Self::new(width, height, Pixels::Luma(samples))
    }

    pub fn from_rgb(width: u32, height: u32, samples: Vec<u8>) -> Result<Self, FrameError> {
        Self::new(width, height, Pixels::Rgb(samples))
    }

    pub fn with_duration(mut self, duration_ms: u32) -> Self {
        self.duration_ms = Some(duration_ms);
        self
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Build a frame with new samples that keeps this frame's duration and source.
    pub fn with_pixels(&self, width: u32, height: u32, pixels: Pixels) -> Result<Self, FrameError> {
        let mut frame = Self::new(width, height, pixels)?;
        frame.duration_ms = self.duration_ms;
        frame.source = self.source.clone();
        Ok(frame)
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn pixels(&self) -> &Pixels {
        &self.pixels
    }

    pub fn duration_ms(&self) -> Option<u32> {
        self.duration_ms
    }

    pub fn source(&self) -> Option<&str> {
        self.source.as_deref()
    }

    pub fn is_grayscale(&self) -> bool {
        matches!(self.pixels, Pixels::Luma(_))
    }

    /// Single-channel view of the frame, converting RGB with [`luma`].
    pub fn to_luma(&self) -> Vec<u8> {
        match &self.pixels {
            Pixels::Luma(samples) => samples.clone(),
            Pixels::Rgb(samples) => samples
                .chunks_exact(3)
                .map(|rgb| luma(rgb[0], rgb[1], rgb[2]))
                .collect(),
        }
    }
}

/// ITU-R 601 luma in 16-bit fixed point.
pub fn luma(r: u8, g: u8, b: u8) -> u8 {
    ((r as u32 * 19595 + g as u32 * 38470 + b as u32 * 7471 + 0x8000) >> 16) as u8
}

/// Resampling step applied before binarization when a target size is configured.
pub trait Resize {
    fn resize(
        &self,
        frame: &RasterFrame,
        width: u32,
        height: u32,
    ) -> Result<RasterFrame, FrameError>;
}

impl<T: Resize + ?Sized> Resize for &T {
    fn resize(
        &self,
        frame: &RasterFrame,
        width: u32,
        height: u32,
    ) -> Result<RasterFrame, FrameError> {
        (**self).resize(frame, width, height)
    }
}

/// Nearest-neighbour resampling; no interpolation, no allocation beyond the output.
#[derive(Debug, Clone, Copy, Default)]
pub struct NearestNeighbor;

impl Resize for NearestNeighbor {
    fn resize(
        &self,
        frame: &RasterFrame,
        width: u32,
        height: u32,
    ) -> Result<RasterFrame, FrameError> {
        let channels = frame.pixels.channels();
        let (src, src_w, src_h) = match &frame.pixels {
            Pixels::Luma(samples) | Pixels::Rgb(samples) => {
                (samples, frame.width as usize, frame.height as usize)
            }
        };
        let mut out = vec![0u8; width as usize * height as usize * channels];
        if src_w != 0 && src_h != 0 {
            for y in 0..height as usize {
                let sy = y * src_h / height as usize;
                for x in 0..width as usize {
                    let sx = x * src_w / width as usize;
                    let from = (sy * src_w + sx) * channels;
                    let to = (y * width as usize + x) * channels;
                    out[to..to + channels].copy_from_slice(&src[from..from + channels]);
                }
            }
        }
        let pixels = match frame.pixels {
            Pixels::Luma(_) => Pixels::Luma(out),
            Pixels::Rgb(_) => Pixels::Rgb(out),
        };
        frame.with_pixels(width, height, pixels)
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use super::*;

    #[test]
    fn rejects_wrong_sample_count() {
        let err = RasterFrame::from_rgb(2, 2, vec![0; 11]).unwrap_err();
        assert_eq!(
            err,
            FrameError::SampleCount {
                expected: 12,
                actual: 11,
            }
        );
    }

    #[test]
    fn rejects_oversized_frames() {
        let err = RasterFrame::from_luma(70_000, 0, Vec::new()).unwrap_err();
        assert_eq!(
            err,
            FrameError::TooLarge {
                width: 70_000,
                height: 0,
            }
        );
    }

    #[test]
    fn empty_frames_are_valid() {
        let frame = RasterFrame::from_luma(0, 5, Vec::new()).unwrap();
        assert_eq!(frame.height(), 5);
        assert!(frame.to_luma().is_empty());
    }

    #[test]
    fn luma_of_gray_is_identity() {
        for v in 0..=255u8 {
            assert_eq!(luma(v, v, v), v);
        }
        assert_eq!(luma(255, 0, 0), 76);
        assert_eq!(luma(0, 255, 0), 150);
        assert_eq!(luma(0, 0, 255), 29);
    }

    #[test]
    fn nearest_neighbor_keeps_metadata() {
        let frame = RasterFrame::from_luma(2, 1, vec![10, 200])
            .unwrap()
            .with_duration(80)
            .with_source("a.png");
        let resized = NearestNeighbor.resize(&frame, 4, 2).unwrap();
        let expected = Pixels::Luma(vec![10, 10, 200, 200, 10, 10, 200, 200]);
        assert_eq!(resized.pixels(), &expected);
        assert_eq!(resized.duration_ms(), Some(80));
        assert_eq!(resized.source(), Some("a.png"));
    }

    #[test]
    fn nearest_neighbor_from_empty_source() {
        let frame = RasterFrame::from_rgb(0, 0, Vec::new()).unwrap();
        let resized = NearestNeighbor.resize(&frame, 2, 2).unwrap();
        assert_eq!(resized.pixels(), &Pixels::Rgb(vec![0; 12]));
    }
}
