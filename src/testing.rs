// Recording fakes for the collaborator traits, host tests only.

use std::collections::VecDeque;

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{self, ErrorType, InputPin, OutputPin};
use embedded_hal::i2c::{self, I2c, Operation};
use smart_leds::{RGB8, SmartLedsWrite};

use crate::drivers::leds::PixelStrip;
use crate::drivers::motors::{DrivePwm, MotorPin};
use crate::drivers::sonar::EchoPin;

/// I2C bus that logs every write and serves reads from a queue.
#[derive(Default)]
pub struct FakeI2c {
    pub writes: Vec<(u8, Vec<u8>)>,
    pub reads: VecDeque<u8>,
    pub fail: bool,
}

impl FakeI2c {
    pub fn new() -> Self {
        Self::default()
    }

    /// Writes to one device address, in order.
    pub fn writes_to(&self, address: u8) -> Vec<Vec<u8>> {
        self.writes
            .iter()
            .filter(|(a, _)| *a == address)
            .map(|(_, b)| b.clone())
            .collect()
    }
}

impl i2c::ErrorType for FakeI2c {
    type Error = i2c::ErrorKind;
}

impl I2c for FakeI2c {
    fn transaction(
        &mut self,
        address: u8,
        operations: &mut [Operation<'_>],
    ) -> Result<(), Self::Error> {
        if self.fail {
            return Err(i2c::ErrorKind::NoAcknowledge(
                i2c::NoAcknowledgeSource::Address,
            ));
        }
        for op in operations.iter_mut() {
            match op {
                Operation::Write(bytes) => self.writes.push((address, bytes.to_vec())),
                Operation::Read(buf) => {
                    for b in buf.iter_mut() {
                        *b = self.reads.pop_front().unwrap_or(0);
                    }
                }
            }
        }
        Ok(())
    }
}

/// Delay that only tallies what was asked of it.
#[derive(Default)]
pub struct FakeDelay {
    pub calls_ns: Vec<u32>,
}

impl FakeDelay {
    pub fn total_ns(&self) -> u64 {
        self.calls_ns.iter().map(|&ns| ns as u64).sum()
    }
}

impl DelayNs for FakeDelay {
    fn delay_ns(&mut self, ns: u32) {
        self.calls_ns.push(ns);
    }
}

/// Digital pin: records driven levels, replays scripted input levels and
/// falls back to `idle` once the script runs out.
#[derive(Default)]
pub struct FakePin {
    pub driven: Vec<bool>,
    pub levels: VecDeque<bool>,
    pub idle: bool,
    pub reads: usize,
    pub floated: usize,
    pub pulses: VecDeque<u32>,
    pub pulse_timeouts: Vec<u32>,
}

impl FakePin {
    pub fn with_levels(levels: impl IntoIterator<Item = bool>, idle: bool) -> Self {
        Self {
            levels: levels.into_iter().collect(),
            idle,
            ..Self::default()
        }
    }

    pub fn with_pulses(pulses: impl IntoIterator<Item = u32>) -> Self {
        Self {
            pulses: pulses.into_iter().collect(),
            ..Self::default()
        }
    }

    fn next_level(&mut self) -> bool {
        self.reads += 1;
        self.levels.pop_front().unwrap_or(self.idle)
    }
}

impl ErrorType for FakePin {
    type Error = digital::ErrorKind;
}

impl OutputPin for FakePin {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.driven.push(false);
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        self.driven.push(true);
        Ok(())
    }
}

impl InputPin for FakePin {
    fn is_high(&mut self) -> Result<bool, Self::Error> {
        Ok(self.next_level())
    }

    fn is_low(&mut self) -> Result<bool, Self::Error> {
        Ok(!self.next_level())
    }
}

impl EchoPin for FakePin {
    fn set_floating(&mut self) -> Result<(), Self::Error> {
        self.floated += 1;
        Ok(())
    }

    fn pulse_in_high(&mut self, timeout_us: u32) -> Result<u32, Self::Error> {
        self.pulse_timeouts.push(timeout_us);
        Ok(self.pulses.pop_front().unwrap_or(0))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriveOp {
    Period(u32),
    Duty(MotorPin, u16),
    Level(MotorPin, bool),
}

/// Motor port that records every period, duty and level write.
#[derive(Default)]
pub struct FakeDrive {
    pub ops: Vec<DriveOp>,
}

impl FakeDrive {
    pub fn duties(&self) -> Vec<(MotorPin, u16)> {
        self.ops
            .iter()
            .filter_map(|op| match *op {
                DriveOp::Duty(pin, duty) => Some((pin, duty)),
                _ => None,
            })
            .collect()
    }
}

impl DrivePwm for FakeDrive {
    type Error = ();

    fn set_period_us(&mut self, period_us: u32) -> Result<(), Self::Error> {
        self.ops.push(DriveOp::Period(period_us));
        Ok(())
    }

    fn set_duty(&mut self, pin: MotorPin, duty: u16) -> Result<(), Self::Error> {
        self.ops.push(DriveOp::Duty(pin, duty));
        Ok(())
    }

    fn set_level(&mut self, pin: MotorPin, high: bool) -> Result<(), Self::Error> {
        self.ops.push(DriveOp::Level(pin, high));
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StripOp {
    Pixel(usize, RGB8),
    All(RGB8),
    Clear,
    Brightness(u8),
    Rainbow(u16, u16),
    Rotate(usize),
    Shift(usize),
    Show,
}

/// Pixel strip that records calls instead of buffering pixels.
#[derive(Default)]
pub struct FakeStrip {
    pub ops: Vec<StripOp>,
}

impl FakeStrip {
    pub fn shows(&self) -> usize {
        self.ops.iter().filter(|op| **op == StripOp::Show).count()
    }
}

impl PixelStrip for FakeStrip {
    fn len(&self) -> usize {
        4
    }

    fn set_pixel_color(&mut self, index: usize, color: RGB8) {
        self.ops.push(StripOp::Pixel(index, color));
    }

    fn set_all(&mut self, color: RGB8) {
        self.ops.push(StripOp::All(color));
    }

    fn clear(&mut self) {
        self.ops.push(StripOp::Clear);
    }

    fn set_brightness(&mut self, brightness: u8) {
        self.ops.push(StripOp::Brightness(brightness));
    }

    fn show_rainbow(&mut self, start_hue: u16, end_hue: u16) {
        self.ops.push(StripOp::Rainbow(start_hue, end_hue));
    }

    fn rotate(&mut self, offset: usize) {
        self.ops.push(StripOp::Rotate(offset));
    }

    fn shift(&mut self, offset: usize) {
        self.ops.push(StripOp::Shift(offset));
    }

    fn show(&mut self) -> Result<(), crate::Error> {
        self.ops.push(StripOp::Show);
        Ok(())
    }
}

/// `SmartLedsWrite` sink keeping every frame written.
#[derive(Default)]
pub struct FakeWriter {
    pub frames: Vec<Vec<RGB8>>,
}

impl SmartLedsWrite for FakeWriter {
    type Error = ();
    type Color = RGB8;

    fn write<T, I>(&mut self, iterator: T) -> Result<(), Self::Error>
    where
        T: IntoIterator<Item = I>,
        I: Into<Self::Color>,
    {
        self.frames.push(iterator.into_iter().map(Into::into).collect());
        Ok(())
    }
}
