use alloc::{vec, vec::Vec};

use embedded_graphics::{
    Pixel,
    pixelcolor::BinaryColor,
    prelude::{DrawTarget, OriginDimensions, Size},
};

use crate::frame::RasterFrame;

/// One bit per pixel, row-major, same dimensions as the frame it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BinaryMask {
    width: u32,
    height: u32,
    bits: Vec<bool>,
}

impl BinaryMask {
    /// All pixels off.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            bits: vec![false; width as usize * height as usize],
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn get(&self, x: u32, y: u32) -> bool {
        x < self.width && y < self.height && self.bits[self.index(x, y)]
    }

    pub fn set(&mut self, x: u32, y: u32, on: bool) {
        if x < self.width && y < self.height {
            let index = self.index(x, y);
            self.bits[index] = on;
        }
    }

    pub fn color(&self, x: u32, y: u32) -> BinaryColor {
        BinaryColor::from(self.get(x, y))
    }

    pub fn invert(&mut self) {
        self.bits.iter_mut().for_each(|bit| *bit = !*bit);
    }

    pub fn count_on(&self) -> usize {
        self.bits.iter().filter(|&&bit| bit).count()
    }

    fn index(&self, x: u32, y: u32) -> usize {
        y as usize * self.width as usize + x as usize
    }
}

impl OriginDimensions for BinaryMask {
    fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }
}

impl DrawTarget for BinaryMask {
    type Color = BinaryColor;
    type Error = core::convert::Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for Pixel(coord, color) in pixels {
            if coord.x < 0 || coord.y < 0 {
                continue;
            }
            self.set(coord.x as u32, coord.y as u32, color.is_on());
        }
        Ok(())
    }
}

/// Threshold a frame into a mask.
///
/// A sample is on when `sample >= threshold`; `invert` flips every pixel
/// afterwards. RGB frames are reduced to luma first.
pub fn binarize(frame: &RasterFrame, threshold: u8, invert: bool) -> BinaryMask {
    let bits = frame
        .to_luma()
        .into_iter()
        .map(|sample| (sample >= threshold) != invert)
        .collect();
    BinaryMask {
        width: frame.width(),
        height: frame.height(),
        bits,
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use embedded_graphics::{
        Drawable,
        prelude::{Point, Primitive},
        primitives::{PrimitiveStyle, Rectangle},
    };

    use super::*;

    fn ramp() -> RasterFrame {
        RasterFrame::from_luma(16, 16, (0..=255u8).collect()).unwrap()
    }

    #[test]
    fn threshold_is_inclusive() {
        let frame = ramp();
        for threshold in [0u8, 1, 127, 128, 254, 255] {
            let mask = binarize(&frame, threshold, false);
            for v in 0..=255u32 {
                let on = mask.get(v % 16, v / 16);
                assert_eq!(on, v >= threshold as u32, "v={v} t={threshold}");
            }
        }
    }

    #[test]
    fn invert_flips_every_pixel() {
        let frame = ramp();
        let plain = binarize(&frame, 100, false);
        let inverted = binarize(&frame, 100, true);
        assert_eq!(plain.count_on() + inverted.count_on(), 256);
        for y in 0..16 {
            for x in 0..16 {
                assert_ne!(plain.get(x, y), inverted.get(x, y));
            }
        }
        let mut twice = inverted.clone();
        twice.invert();
        assert_eq!(twice, plain);
    }

    #[test]
    fn rgb_uses_luma() {
        let frame = RasterFrame::from_rgb(2, 1, vec![255, 0, 0, 0, 255, 0]).unwrap();
        let mask = binarize(&frame, 100, false);
        assert!(!mask.get(0, 0));
        assert!(mask.get(1, 0));
    }

    #[test]
    fn out_of_bounds_reads_are_off() {
        let mask = binarize(&ramp(), 0, false);
        assert!(mask.get(15, 15));
        assert!(!mask.get(16, 0));
        assert!(!mask.get(0, 16));
    }

    #[test]
    fn draw_into_mask() {
        let mut mask = BinaryMask::new(8, 8);
        Rectangle::new(Point::new(2, 2), Size::new(3, 2))
            .into_styled(PrimitiveStyle::with_fill(BinaryColor::On))
            .draw(&mut mask)
            .unwrap();
        assert_eq!(mask.count_on(), 6);
        assert!(mask.get(2, 2) && mask.get(4, 3));
        assert!(!mask.get(5, 3));
        assert_eq!(mask.color(3, 3), BinaryColor::On);
    }
}
