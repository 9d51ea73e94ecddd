// One error type for every driver.
//
// Collaborator errors (bus, pin, PWM, LED writer) are folded into a kind at
// the driver boundary. Range clamping (angle, speed, brightness) is never an
// error; only conditions a caller can act on are reported.

use core::fmt;

use embedded_hal::{digital, i2c};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// Servo channel outside 0..=15.
    ChannelOutOfRange(u8),
    /// Every sonar attempt timed out without an echo.
    SonarTimeout,
    /// Keypad handshake stalled or only noise frames arrived.
    KeypadReadTimeout,
    I2c(i2c::ErrorKind),
    Pin(digital::ErrorKind),
    Pwm,
    Strip,
}

impl Error {
    pub(crate) fn i2c<E: i2c::Error>(e: E) -> Self {
        Error::I2c(e.kind())
    }

    pub(crate) fn pin<E: digital::Error>(e: E) -> Self {
        Error::Pin(e.kind())
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::ChannelOutOfRange(ch) => write!(f, "servo channel {ch} out of range"),
            Error::SonarTimeout => f.write_str("sonar: no echo"),
            Error::KeypadReadTimeout => f.write_str("keypad: read timed out"),
            Error::I2c(kind) => write!(f, "i2c: {kind:?}"),
            Error::Pin(kind) => write!(f, "pin: {kind:?}"),
            Error::Pwm => f.write_str("pwm output failed"),
            Error::Strip => f.write_str("led strip write failed"),
        }
    }
}
