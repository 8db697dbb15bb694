use image::{DynamicImage, GrayImage, Luma, Rgb, RgbImage, imageops::FilterType};
use oledpack_core::{BinaryMask, FrameError, NearestNeighbor, Pixels, RasterFrame, Resize, binarize};

/// Grayscale images stay single channel, everything else becomes RGB. Alpha is dropped.
pub fn frame_from_image(image: DynamicImage) -> Result<RasterFrame, FrameError> {
    let (width, height) = (image.width(), image.height());
    if image.color().has_color() {
        RasterFrame::from_rgb(width, height, image.into_rgb8().into_raw())
    } else {
        RasterFrame::from_luma(width, height, image.into_luma8().into_raw())
    }
}

pub fn frame_to_image(frame: &RasterFrame) -> DynamicImage {
    let (width, height) = (frame.width(), frame.height());
    match frame.pixels() {
        Pixels::Luma(samples) => {
            let image = GrayImage::from_fn(width, height, |x, y| {
                Luma([samples[(y * width + x) as usize]])
            });
            DynamicImage::ImageLuma8(image)
        }
        Pixels::Rgb(samples) => {
            let image = RgbImage::from_fn(width, height, |x, y| {
                let i = (y * width + x) as usize * 3;
                Rgb([samples[i], samples[i + 1], samples[i + 2]])
            });
            DynamicImage::ImageRgb8(image)
        }
    }
}

/// Lit pixels white, the rest black.
pub fn mask_to_image(mask: &BinaryMask) -> GrayImage {
    GrayImage::from_fn(mask.width(), mask.height(), |x, y| {
        Luma([if mask.get(x, y) { 255 } else { 0 }])
    })
}

/// Threshold a frame and keep it as a 0/255 grayscale frame.
pub fn prebinarize(frame: &RasterFrame, threshold: u8) -> Result<RasterFrame, FrameError> {
    let mask = binarize(frame, threshold, false);
    let samples = mask_to_image(&mask).into_raw();
    frame.with_pixels(frame.width(), frame.height(), Pixels::Luma(samples))
}

/// Lanczos3 resampling through the `image` crate.
#[derive(Debug, Clone, Copy, Default)]
pub struct LanczosResize;

impl Resize for LanczosResize {
    fn resize(
        &self,
        frame: &RasterFrame,
        width: u32,
        height: u32,
    ) -> Result<RasterFrame, FrameError> {
        if frame.width() == 0 || frame.height() == 0 {
            return NearestNeighbor.resize(frame, width, height);
        }
        let resized = frame_to_image(frame).resize_exact(width, height, FilterType::Lanczos3);
        let pixels = match frame.pixels() {
            Pixels::Luma(_) => Pixels::Luma(resized.into_luma8().into_raw()),
            Pixels::Rgb(_) => Pixels::Rgb(resized.into_rgb8().into_raw()),
        };
        frame.with_pixels(width, height, pixels)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grayscale_stays_single_channel() {
        let image = DynamicImage::ImageLuma8(GrayImage::from_pixel(3, 2, Luma([77])));
        let frame = frame_from_image(image).unwrap();
        assert!(frame.is_grayscale());
        assert_eq!(frame.to_luma(), vec![77; 6]);
    }

    #[test]
    fn color_round_trips_through_image() {
        let frame = RasterFrame::from_rgb(2, 1, vec![1, 2, 3, 4, 5, 6]).unwrap();
        let back = frame_from_image(frame_to_image(&frame)).unwrap();
        assert_eq!(back.pixels(), frame.pixels());
    }

    #[test]
    fn lanczos_resizes_and_keeps_metadata() {
        let frame = RasterFrame::from_luma(40, 20, vec![200; 800])
            .unwrap()
            .with_duration(120)
            .with_source("big.png");
        let resized = LanczosResize.resize(&frame, 8, 4).unwrap();
        assert_eq!((resized.width(), resized.height()), (8, 4));
        assert_eq!(resized.duration_ms(), Some(120));
        assert_eq!(resized.source(), Some("big.png"));
        // flat input stays flat
        assert!(resized.to_luma().iter().all(|&v| v.abs_diff(200) <= 1));
    }

    #[test]
    fn prebinarize_uses_inclusive_threshold() {
        let frame = RasterFrame::from_luma(3, 1, vec![99, 100, 101]).unwrap();
        let binary = prebinarize(&frame, 100).unwrap();
        assert_eq!(binary.to_luma(), vec![0, 255, 255]);
    }
}
