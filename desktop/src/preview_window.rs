use embedded_graphics::{
    mono_font::{MonoTextStyle, ascii::FONT_6X10},
    pixelcolor::BinaryColor,
    prelude::*,
    text::{Baseline, Text},
};
use log::info;
use minifb::{Key, KeyRepeat, Scale, Window, WindowOptions};
use oledpack_core::PackedBitmap;

const ON: u32 = 0x00FF_FFFF;
const OFF: u32 = 0x0000_0000;
const STATUS_HEIGHT: usize = 12;
const MIN_WIDTH: usize = 132;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    TogglePlay,
    StepBack,
    StepForward,
    Faster,
    Slower,
}

/// Monochrome canvas shown in a minifb window: the bitmap on top, a status
/// line underneath.
pub struct PreviewWindow {
    buffer: Vec<u32>,
    width: usize,
    height: usize,
    window: Window,
}

impl PreviewWindow {
    pub fn new(title: &str, bitmap_width: u32, bitmap_height: u32) -> Result<Self, minifb::Error> {
        let width = (bitmap_width as usize).max(MIN_WIDTH);
        let height = bitmap_height as usize + STATUS_HEIGHT;
        let scale = match width {
            0..=256 => Scale::X4,
            257..=512 => Scale::X2,
            _ => Scale::X1,
        };
        let options = WindowOptions {
            borderless: false,
            title: true,
            resize: false,
            scale,
            ..WindowOptions::default()
        };
        let mut window = Window::new(title, width, height, options)?;
        window.set_target_fps(60);
        info!("Preview window {width}x{height}");
        Ok(Self {
            buffer: vec![OFF; width * height],
            width,
            height,
            window,
        })
    }

    pub fn is_open(&self) -> bool {
        self.window.is_open() && !self.window.is_key_down(Key::Escape)
    }

    /// Keys pressed since the last call.
    pub fn commands(&self) -> Vec<Command> {
        [
            (Key::Space, Command::TogglePlay),
            (Key::Left, Command::StepBack),
            (Key::Right, Command::StepForward),
            (Key::Up, Command::Faster),
            (Key::Down, Command::Slower),
        ]
        .into_iter()
        .filter(|(key, _)| self.window.is_key_pressed(*key, KeyRepeat::Yes))
        .map(|(_, command)| command)
        .collect()
    }

    pub fn draw(&mut self, bitmap: &PackedBitmap, status: &str) {
        self.buffer.fill(OFF);
        for y in 0..bitmap.height() {
            for x in 0..bitmap.width() {
                if bitmap.get(x, y) {
                    self.buffer[y as usize * self.width + x as usize] = ON;
                }
            }
        }
        let style = MonoTextStyle::new(&FONT_6X10, BinaryColor::On);
        let origin = Point::new(1, (self.height - STATUS_HEIGHT + 1) as i32);
        Text::with_baseline(status, origin, style, Baseline::Top)
            .draw(self)
            .ok();
    }

    /// Push the canvas to the screen and poll input.
    pub fn present(&mut self) -> Result<(), minifb::Error> {
        self.window
            .update_with_buffer(&self.buffer, self.width, self.height)
    }

    /// Poll input without redrawing.
    pub fn update(&mut self) {
        self.window.update();
    }
}

impl OriginDimensions for PreviewWindow {
    fn size(&self) -> Size {
        Size::new(self.width as u32, self.height as u32)
    }
}

impl DrawTarget for PreviewWindow {
    type Color = BinaryColor;
    type Error = core::convert::Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for Pixel(coord, color) in pixels {
            let (Ok(x), Ok(y)) = (usize::try_from(coord.x), usize::try_from(coord.y)) else {
                continue;
            };
            if x < self.width && y < self.height {
                self.buffer[y * self.width + x] = if color.is_on() { ON } else { OFF };
            }
        }
        Ok(())
    }
}
