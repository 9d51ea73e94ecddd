// Single-pin ultrasonic ranger (HC-SR04 style, trigger and echo tied)
//
// The pin is released (no pull) before use. Each attempt sends a 10us
// trigger pulse and times the echo high pulse; a zero reading means the echo
// never arrived inside the timeout. The first non-zero reading wins.
//
// Round trip at ~343 m/s: 58us per cm, 148us per inch.

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::OutputPin;
use log::{debug, warn};

use crate::error::Error;

const TRIGGER_SETUP_US: u32 = 2;
const TRIGGER_PULSE_US: u32 = 10;

pub const US_PER_CM: u32 = 58;
pub const US_PER_INCH: u32 = 148;

/// Half-duplex trigger/echo pin.
pub trait EchoPin: OutputPin {
    /// Disable output and pulls so the sensor can drive the line.
    fn set_floating(&mut self) -> Result<(), Self::Error>;

    /// Length of the next high pulse in microseconds, or 0 if none started
    /// and finished within `timeout_us`.
    fn pulse_in_high(&mut self, timeout_us: u32) -> Result<u32, Self::Error>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Unit {
    Centimeters,
    Inches,
    MicroSeconds,
}

impl Unit {
    pub const fn convert(self, raw_us: u32) -> u32 {
        match self {
            Unit::Centimeters => raw_us / US_PER_CM,
            Unit::Inches => raw_us / US_PER_INCH,
            Unit::MicroSeconds => raw_us,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct SonarConfig {
    pub attempts: u8,
    pub max_distance_cm: u32,
}

impl Default for SonarConfig {
    fn default() -> Self {
        Self {
            attempts: 10,
            max_distance_cm: 500,
        }
    }
}

impl SonarConfig {
    #[inline]
    pub const fn timeout_us(&self) -> u32 {
        self.max_distance_cm * US_PER_CM
    }
}

pub struct Sonar<P, D> {
    pin: P,
    delay: D,
    config: SonarConfig,
}

impl<P, D> Sonar<P, D>
where
    P: EchoPin,
    D: DelayNs,
{
    pub fn new(pin: P, delay: D) -> Self {
        Self::with_config(pin, delay, SonarConfig::default())
    }

    pub fn with_config(pin: P, delay: D, config: SonarConfig) -> Self {
        Self { pin, delay, config }
    }

    /// Distance in `unit`. `SonarTimeout` when no attempt saw an echo; a
    /// genuine echo shorter than one unit reads as 0.
    pub fn read(&mut self, unit: Unit) -> Result<u32, Error> {
        let raw = self.read_raw()?;
        Ok(unit.convert(raw))
    }

    /// Echo pulse width in microseconds.
    pub fn read_raw(&mut self) -> Result<u32, Error> {
        self.pin.set_floating().map_err(Error::pin)?;

        let timeout = self.config.timeout_us();
        for attempt in 1..=self.config.attempts {
            self.trigger()?;
            let raw = self.pin.pulse_in_high(timeout).map_err(Error::pin)?;
            if raw > 0 {
                debug!("sonar: {}us (attempt {})", raw, attempt);
                return Ok(raw);
            }
        }

        warn!("sonar: no echo after {} attempts", self.config.attempts);
        Err(Error::SonarTimeout)
    }

    pub fn config(&self) -> SonarConfig {
        self.config
    }

    pub fn release(self) -> (P, D) {
        (self.pin, self.delay)
    }

    fn trigger(&mut self) -> Result<(), Error> {
        self.pin.set_low().map_err(Error::pin)?;
        self.delay.delay_us(TRIGGER_SETUP_US);
        self.pin.set_high().map_err(Error::pin)?;
        self.delay.delay_us(TRIGGER_PULSE_US);
        self.pin.set_low().map_err(Error::pin)
    }
}
