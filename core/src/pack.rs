use alloc::{vec, vec::Vec};

use crate::binarize::BinaryMask;

/// Byte-plane layout of a packed bitmap.
///
/// The layouts differ in bit order as well as scan direction.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Default,
    strum_macros::Display,
    strum_macros::EnumString,
    strum_macros::EnumIter,
)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Layout {
    /// Row-major, 8 horizontal pixels per byte, MSB first.
    #[default]
    Horizontal,
    /// Column-major, 8 vertical pixels per byte, LSB first (SSD1306 pages).
    Vertical,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackedBitmap {
    bytes: Vec<u8>,
    width: u32,
    height: u32,
    layout: Layout,
}

impl PackedBitmap {
    pub fn expected_len(width: u32, height: u32, layout: Layout) -> usize {
        match layout {
            Layout::Horizontal => height as usize * (width as usize).div_ceil(8),
            Layout::Vertical => width as usize * (height as usize).div_ceil(8),
        }
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn layout(&self) -> Layout {
        self.layout
    }

    /// Read back a single pixel; out of range is off.
    pub fn get(&self, x: u32, y: u32) -> bool {
        if x >= self.width || y >= self.height {
            return false;
        }
        let (x, y) = (x as usize, y as usize);
        match self.layout {
            Layout::Horizontal => {
                let stride = (self.width as usize).div_ceil(8);
                self.bytes[y * stride + x / 8] & (0x80 >> (x % 8)) != 0
            }
            Layout::Vertical => {
                let stride = (self.height as usize).div_ceil(8);
                self.bytes[x * stride + y / 8] & (1 << (y % 8)) != 0
            }
        }
    }

    pub fn to_mask(&self) -> BinaryMask {
        let mut mask = BinaryMask::new(self.width, self.height);
        for y in 0..self.height {
            for x in 0..self.width {
                mask.set(x, y, self.get(x, y));
            }
        }
        mask
    }
}

/// Serialize a mask into bytes. Padding bits past the edge are always zero.
pub fn pack(mask: &BinaryMask, layout: Layout) -> PackedBitmap {
    let width = mask.width() as usize;
    let height = mask.height() as usize;
    let mut bytes = vec![0u8; PackedBitmap::expected_len(mask.width(), mask.height(), layout)];

    match layout {
        Layout::Horizontal => {
            let stride = width.div_ceil(8);
            for y in 0..height {
                for byte_col in 0..stride {
                    let mut byte = 0u8;
                    for bit in 0..8 {
                        let x = byte_col * 8 + bit;
                        if x < width && mask.get(x as u32, y as u32) {
                            byte |= 0x80 >> bit;
                        }
                    }
                    bytes[y * stride + byte_col] = byte;
                }
            }
        }
        Layout::Vertical => {
            let stride = height.div_ceil(8);
            for x in 0..width {
                for byte_row in 0..stride {
                    let mut byte = 0u8;
                    for bit in 0..8 {
                        let y = byte_row * 8 + bit;
                        if y < height && mask.get(x as u32, y as u32) {
                            byte |= 1 << bit;
                        }
                    }
                    bytes[x * stride + byte_row] = byte;
                }
            }
        }
    }

    PackedBitmap {
        bytes,
        width: mask.width(),
        height: mask.height(),
        layout,
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use alloc::string::ToString;
    use core::str::FromStr;

    use strum::IntoEnumIterator;

    use super::*;

    fn filled(width: u32, height: u32) -> BinaryMask {
        let mut mask = BinaryMask::new(width, height);
        mask.invert();
        mask
    }

    #[test]
    fn horizontal_is_msb_first() {
        assert_eq!(pack(&filled(8, 1), Layout::Horizontal).bytes(), &[0xFF]);
        let packed = pack(&filled(9, 1), Layout::Horizontal);
        assert_eq!(packed.bytes(), &[0xFF, 0x80]);
    }

    #[test]
    fn vertical_is_lsb_first() {
        assert_eq!(pack(&filled(1, 8), Layout::Vertical).bytes(), &[0xFF]);
        assert_eq!(pack(&filled(1, 9), Layout::Vertical).bytes(), &[0xFF, 0x01]);
    }

    #[test]
    fn single_pixel_positions() {
        let mut mask = BinaryMask::new(10, 10);
        mask.set(1, 0, true);
        let horizontal = pack(&mask, Layout::Horizontal);
        assert_eq!(horizontal.bytes()[0], 0x40);
        let vertical = pack(&mask, Layout::Vertical);
        // column 1, first page
        assert_eq!(vertical.bytes()[2], 0x01);

        let mut mask = BinaryMask::new(10, 10);
        mask.set(0, 9, true);
        let vertical = pack(&mask, Layout::Vertical);
        assert_eq!(vertical.bytes().len(), 20);
        assert_eq!(&vertical.bytes()[..2], &[0x00, 0x02]);
        assert!(vertical.bytes()[2..].iter().all(|&b| b == 0));
    }

    #[test]
    fn lengths_match_layout() {
        for (w, h) in [(0, 0), (0, 7), (7, 0), (1, 1), (9, 3), (128, 64), (13, 17)] {
            let len = |layout| PackedBitmap::expected_len(w, h, layout);
            for layout in Layout::iter() {
                let packed = pack(&BinaryMask::new(w, h), layout);
                assert_eq!(packed.bytes().len(), len(layout));
            }
            assert_eq!(len(Layout::Horizontal), (h * w.div_ceil(8)) as usize);
            assert_eq!(len(Layout::Vertical), (w * h.div_ceil(8)) as usize);
        }
    }

    #[test]
    fn padding_stays_zero() {
        let packed = pack(&filled(3, 3), Layout::Horizontal);
        assert_eq!(packed.bytes(), &[0xE0, 0xE0, 0xE0]);
        let packed = pack(&filled(3, 3), Layout::Vertical);
        assert_eq!(packed.bytes(), &[0x07, 0x07, 0x07]);
    }

    #[test]
    fn unpack_restores_mask() {
        let mut mask = BinaryMask::new(11, 5);
        for (x, y) in [(0, 0), (10, 4), (3, 2), (8, 1), (7, 3)] {
            mask.set(x, y, true);
        }
        for layout in Layout::iter() {
            assert_eq!(pack(&mask, layout).to_mask(), mask);
        }
    }

    #[test]
    fn layout_names() {
        assert_eq!(Layout::Horizontal.to_string(), "horizontal");
        assert_eq!(Layout::from_str("Vertical"), Ok(Layout::Vertical));
        assert!(Layout::from_str("diagonal").is_err());
    }
}
