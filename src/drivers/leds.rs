// LED strip front end with Manual/Auto refresh
//
// Auto: every mutating call is followed by exactly one hardware refresh.
// Manual: changes stay in the strip buffer until `show()`.
// `show()` always refreshes; changing the mode never does.

use log::debug;
use smart_leds::RGB8;

use crate::error::Error;

pub const DEFAULT_BRIGHTNESS: u8 = 40;

// hue span used by show_rainbow, degrees
const RAINBOW_START_HUE: u16 = 1;
const RAINBOW_END_HUE: u16 = 360;

/// Pixel buffer collaborator. Only `show` touches hardware.
pub trait PixelStrip {
    fn len(&self) -> usize;
    fn set_pixel_color(&mut self, index: usize, color: RGB8);
    fn set_all(&mut self, color: RGB8);
    fn clear(&mut self);
    fn set_brightness(&mut self, brightness: u8);
    fn show_rainbow(&mut self, start_hue: u16, end_hue: u16);
    fn rotate(&mut self, offset: usize);
    fn shift(&mut self, offset: usize);
    fn show(&mut self) -> Result<(), Error>;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum UpdateMode {
    Manual,
    #[default]
    Auto,
}

/// Pack 8-bit channels into 0xRRGGBB; each input is masked to 8 bits.
pub const fn convert_rgb(r: u32, g: u32, b: u32) -> u32 {
    ((r & 0xFF) << 16) | ((g & 0xFF) << 8) | (b & 0xFF)
}

pub const fn rgb_from_u32(rgb: u32) -> RGB8 {
    RGB8 {
        r: (rgb >> 16) as u8,
        g: (rgb >> 8) as u8,
        b: rgb as u8,
    }
}

pub const fn rgb_to_u32(color: RGB8) -> u32 {
    convert_rgb(color.r as u32, color.g as u32, color.b as u32)
}

pub struct Leds<S> {
    strip: S,
    mode: UpdateMode,
}

impl<S: PixelStrip> Leds<S> {
    /// Takes a freshly created strip and sets the default brightness.
    /// Nothing is sent to the LEDs yet.
    pub fn new(mut strip: S) -> Self {
        strip.set_brightness(DEFAULT_BRIGHTNESS);
        Self {
            strip,
            mode: UpdateMode::default(),
        }
    }

    pub fn set_all(&mut self, color: RGB8) -> Result<(), Error> {
        self.strip.set_all(color);
        self.update()
    }

    pub fn clear(&mut self) -> Result<(), Error> {
        self.strip.clear();
        self.update()
    }

    /// Indices past the end of the strip are ignored.
    pub fn set_pixel(&mut self, index: usize, color: RGB8) -> Result<(), Error> {
        self.strip.set_pixel_color(index, color);
        self.update()
    }

    pub fn set_brightness(&mut self, brightness: u8) -> Result<(), Error> {
        self.strip.set_brightness(brightness);
        self.update()
    }

    pub fn show_rainbow(&mut self) -> Result<(), Error> {
        self.strip.show_rainbow(RAINBOW_START_HUE, RAINBOW_END_HUE);
        self.update()
    }

    /// Move every pixel one place along; the last wraps to the first.
    pub fn rotate(&mut self) -> Result<(), Error> {
        self.strip.rotate(1);
        self.update()
    }

    /// Move every pixel one place along; the first goes dark.
    pub fn shift(&mut self) -> Result<(), Error> {
        self.strip.shift(1);
        self.update()
    }

    pub fn show(&mut self) -> Result<(), Error> {
        self.strip.show()
    }

    pub fn set_update_mode(&mut self, mode: UpdateMode) {
        debug!("leds: update mode {:?}", mode);
        self.mode = mode;
    }

    #[inline]
    pub fn update_mode(&self) -> UpdateMode {
        self.mode
    }

    pub fn strip(&self) -> &S {
        &self.strip
    }

    pub fn release(self) -> S {
        self.strip
    }

    fn update(&mut self) -> Result<(), Error> {
        match self.mode {
            UpdateMode::Auto => self.strip.show(),
            UpdateMode::Manual => Ok(()),
        }
    }
}
