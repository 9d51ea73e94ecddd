// Per-servo trim storage
//
// One signed byte per servo index. NullStore stands in when no EEPROM is
// fitted: every read is 0 and writes are dropped. Eeprom drives a 24-series
// part at 0x50: two-byte big-endian cell address, one data byte, then the
// part's internal write cycle before it ACKs again.

use embedded_hal::delay::DelayNs;
use embedded_hal::i2c::I2c;
use log::debug;

use crate::error::Error;

pub const EEPROM_ADDRESS: u8 = 0x50;

// 24Cxx t_WR is 5ms max
const WRITE_CYCLE_MS: u32 = 5;

/// Byte store keyed by servo index.
pub trait CalibrationStore {
    fn read(&mut self, index: u8) -> Result<i8, Error>;
    fn write(&mut self, index: u8, value: i8) -> Result<(), Error>;
}

/// Store with no backing memory.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullStore;

impl CalibrationStore for NullStore {
    fn read(&mut self, _index: u8) -> Result<i8, Error> {
        Ok(0)
    }

    fn write(&mut self, _index: u8, _value: i8) -> Result<(), Error> {
        Ok(())
    }
}

pub struct Eeprom<I2C, D> {
    i2c: I2C,
    delay: D,
    address: u8,
}

impl<I2C, D> Eeprom<I2C, D>
where
    I2C: I2c,
    D: DelayNs,
{
    pub fn new(i2c: I2C, delay: D) -> Self {
        Self::with_address(i2c, delay, EEPROM_ADDRESS)
    }

    pub fn with_address(i2c: I2C, delay: D, address: u8) -> Self {
        Self {
            i2c,
            delay,
            address,
        }
    }

    pub fn release(self) -> (I2C, D) {
        (self.i2c, self.delay)
    }

    #[inline]
    fn cell(index: u8) -> [u8; 2] {
        (index as u16).to_be_bytes()
    }
}

impl<I2C, D> CalibrationStore for Eeprom<I2C, D>
where
    I2C: I2c,
    D: DelayNs,
{
    fn read(&mut self, index: u8) -> Result<i8, Error> {
        let mut data = [0u8; 1];
        self.i2c
            .write_read(self.address, &Self::cell(index), &mut data)
            .map_err(Error::i2c)?;
        Ok(data[0] as i8)
    }

    fn write(&mut self, index: u8, value: i8) -> Result<(), Error> {
        let [hi, lo] = Self::cell(index);
        self.i2c
            .write(self.address, &[hi, lo, value as u8])
            .map_err(Error::i2c)?;
        self.delay.delay_ms(WRITE_CYCLE_MS);
        debug!("eeprom: cell {} <- {}", index, value);
        Ok(())
    }
}
