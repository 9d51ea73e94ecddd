// WS2812 pixel buffer
//
// Colours are kept at full scale in RAM; brightness is applied on the way
// out so that dimming and re-brightening is lossless. Only `show` talks to
// the wire. Any `SmartLedsWrite` sink works (SPI, RMT, bit-bang).

use log::{trace, warn};
use smart_leds::hsv::{Hsv, hsv2rgb};
use smart_leds::{RGB8, SmartLedsWrite, brightness};

use super::leds::PixelStrip;
use crate::error::Error;

pub const OFF: RGB8 = RGB8 { r: 0, g: 0, b: 0 };

/// Degrees (0..360) onto the 0..=255 hue wheel used by `hsv2rgb`.
#[inline]
const fn hue_byte(degrees: u16) -> u8 {
    ((degrees % 360) as u32 * 256 / 360) as u8
}

pub struct NeoPixels<W, const N: usize> {
    writer: W,
    buffer: [RGB8; N],
    brightness: u8,
}

impl<W, const N: usize> NeoPixels<W, N>
where
    W: SmartLedsWrite<Color = RGB8>,
    W::Error: core::fmt::Debug,
{
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            buffer: [OFF; N],
            brightness: 255,
        }
    }

    pub fn pixel(&self, index: usize) -> Option<RGB8> {
        self.buffer.get(index).copied()
    }

    pub fn pixels(&self) -> &[RGB8; N] {
        &self.buffer
    }

    pub fn brightness(&self) -> u8 {
        self.brightness
    }

    pub fn writer(&self) -> &W {
        &self.writer
    }
}

impl<W, const N: usize> PixelStrip for NeoPixels<W, N>
where
    W: SmartLedsWrite<Color = RGB8>,
    W::Error: core::fmt::Debug,
{
    fn len(&self) -> usize {
        N
    }

    fn set_pixel_color(&mut self, index: usize, color: RGB8) {
        if let Some(px) = self.buffer.get_mut(index) {
            *px = color;
        }
    }

    fn set_all(&mut self, color: RGB8) {
        self.buffer.fill(color);
    }

    fn clear(&mut self) {
        self.buffer.fill(OFF);
    }

    fn set_brightness(&mut self, brightness: u8) {
        self.brightness = brightness;
    }

    // Evenly spaced hues from start to end, full saturation and value.
    fn show_rainbow(&mut self, start_hue: u16, end_hue: u16) {
        if N == 0 {
            return;
        }
        let step = end_hue.saturating_sub(start_hue) as usize / N;
        for (i, px) in self.buffer.iter_mut().enumerate() {
            let degrees = start_hue as usize + i * step;
            *px = hsv2rgb(Hsv {
                hue: hue_byte(degrees as u16),
                sat: 255,
                val: 255,
            });
        }
    }

    fn rotate(&mut self, offset: usize) {
        if N > 0 {
            self.buffer.rotate_right(offset % N);
        }
    }

    fn shift(&mut self, offset: usize) {
        let offset = offset.min(N);
        self.buffer.copy_within(..N - offset, offset);
        self.buffer[..offset].fill(OFF);
    }

    fn show(&mut self) -> Result<(), Error> {
        trace!("pixels: show {} at {}", N, self.brightness);
        self.writer
            .write(brightness(self.buffer.iter().copied(), self.brightness))
            .map_err(|e| {
                warn!("pixels: write failed: {:?}", e);
                Error::Strip
            })
    }
}
