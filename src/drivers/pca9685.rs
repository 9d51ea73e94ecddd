// PCA9685 16-channel servo driver with per-channel trim
//
// The chip runs a ~60 Hz frame at 12-bit resolution. Each channel's pulse
// starts at tick 0 (ON registers, written once) and ends at its stop tick
// (OFF registers). Chip setup and loading of the trim table happen lazily
// on first servo use; `init()` may also be called up front.
//
// Every register write is a separate two-byte I2C write [reg, value].

use embedded_hal::i2c::I2c;
use log::{debug, info};

use super::calibration::CalibrationStore;
use crate::error::Error;

pub const ADDRESS: u8 = 0x40;
pub const CHANNELS: usize = 16;

pub const MIN_ANGLE: i32 = -90;
pub const MAX_ANGLE: i32 = 90;

// stop tick at 0 degrees, and ticks per 90 degrees, at 60 Hz
const CENTRE_TICKS: i32 = 369;
const TICKS_PER_90: i32 = 223;
const MAX_TICKS: i32 = 0x0FFF;

const PRESCALE_60HZ: u8 = 101;

mod reg {
    pub const MODE1: u8 = 0x00;
    pub const PRESCALE: u8 = 0xFE;
    pub const LED0_ON_L: u8 = 0x06;
    pub const CHANNEL_STRIDE: u8 = 4;
    // offsets inside a channel block
    pub const ON_L: u8 = 0;
    pub const ON_H: u8 = 1;
    pub const OFF_L: u8 = 2;
    pub const OFF_H: u8 = 3;
}

mod mode1 {
    pub const SLEEP: u8 = 0x10;
    pub const RESTART_ALLCALL: u8 = 0x81;
}

/// Stop tick for `angle` plus `offset` degrees.
///
/// The angle is clamped to [-90, 90] before the trim is added; the result is
/// clamped to the chip's 12-bit range. Division truncates toward zero.
pub fn pulse_width(angle: i32, offset: i8) -> u16 {
    let angle = angle.clamp(MIN_ANGLE, MAX_ANGLE);
    let stop = CENTRE_TICKS + (angle + offset as i32) * TICKS_PER_90 / 90;
    stop.clamp(0, MAX_TICKS) as u16
}

#[inline]
fn channel_reg(channel: u8, field: u8) -> u8 {
    reg::LED0_ON_L + channel * reg::CHANNEL_STRIDE + field
}

pub struct Servos<I2C, S> {
    i2c: I2C,
    store: S,
    offsets: [i8; CHANNELS],
    initialized: bool,
}

impl<I2C, S> Servos<I2C, S>
where
    I2C: I2c,
    S: CalibrationStore,
{
    /// No bus traffic until the first servo operation or `init()`.
    pub fn new(i2c: I2C, store: S) -> Self {
        Self {
            i2c,
            store,
            offsets: [0; CHANNELS],
            initialized: false,
        }
    }

    /// Sleep, set the 60 Hz prescaler, wake, zero every start register and
    /// load the trim table. Re-runs the whole sequence when called again.
    pub fn init(&mut self) -> Result<(), Error> {
        info!("pca9685: init, 60 Hz frame");

        self.write_reg(reg::MODE1, mode1::SLEEP)?;
        self.write_reg(reg::PRESCALE, PRESCALE_60HZ)?;
        self.write_reg(reg::MODE1, mode1::RESTART_ALLCALL)?;

        for ch in 0..CHANNELS as u8 {
            self.write_reg(channel_reg(ch, reg::ON_L), 0x00)?;
            self.write_reg(channel_reg(ch, reg::ON_H), 0x00)?;
        }

        for (index, offset) in self.offsets.iter_mut().enumerate() {
            *offset = self.store.read(index as u8)?;
        }
        debug!("pca9685: offsets {:?}", self.offsets);

        self.initialized = true;
        Ok(())
    }

    #[inline]
    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Move `channel` to `angle` degrees (clamped to [-90, 90]).
    pub fn set_servo(&mut self, channel: u8, angle: i32) -> Result<(), Error> {
        check_channel(channel)?;
        self.ensure_init()?;

        let stop = pulse_width(angle, self.offsets[channel as usize]);
        let [lo, hi] = stop.to_le_bytes();
        self.write_reg(channel_reg(channel, reg::OFF_L), lo)?;
        self.write_reg(channel_reg(channel, reg::OFF_H), hi)?;

        debug!("pca9685: ch{} {}deg -> stop {}", channel, angle, stop);
        Ok(())
    }

    /// Replace the trim for `channel` and re-centre it.
    ///
    /// The offset is kept in RAM only; `save_offset` persists it.
    pub fn set_offset(&mut self, channel: u8, offset: i8) -> Result<(), Error> {
        check_channel(channel)?;
        // load the table first so it cannot overwrite the new value
        self.ensure_init()?;
        self.offsets[channel as usize] = offset;
        self.set_servo(channel, 0)
    }

    /// Centre all sixteen channels, lowest index first.
    pub fn zero_all(&mut self) -> Result<(), Error> {
        for ch in 0..CHANNELS as u8 {
            self.set_servo(ch, 0)?;
        }
        Ok(())
    }

    pub fn offset(&self, channel: u8) -> Result<i8, Error> {
        check_channel(channel)?;
        Ok(self.offsets[channel as usize])
    }

    pub fn offsets(&self) -> &[i8; CHANNELS] {
        &self.offsets
    }

    /// Write the current trim of `channel` to the calibration store.
    pub fn save_offset(&mut self, channel: u8) -> Result<(), Error> {
        check_channel(channel)?;
        // an unloaded table would persist zeros over the stored trim
        self.ensure_init()?;
        self.store.write(channel, self.offsets[channel as usize])
    }

    /// Raw byte from the calibration store; the live table is untouched.
    pub fn read_calibration(&mut self, index: u8) -> Result<i8, Error> {
        self.store.read(index)
    }

    pub fn write_calibration(&mut self, index: u8, value: i8) -> Result<(), Error> {
        self.store.write(index, value)
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    pub fn release(self) -> (I2C, S) {
        (self.i2c, self.store)
    }

    fn ensure_init(&mut self) -> Result<(), Error> {
        if !self.initialized {
            self.init()?;
        }
        Ok(())
    }

    fn write_reg(&mut self, reg: u8, value: u8) -> Result<(), Error> {
        self.i2c.write(ADDRESS, &[reg, value]).map_err(Error::i2c)
    }
}

#[inline]
fn check_channel(channel: u8) -> Result<(), Error> {
    if (channel as usize) < CHANNELS {
        Ok(())
    } else {
        Err(Error::ChannelOutOfRange(channel))
    }
}
