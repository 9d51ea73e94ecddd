//! Rover Board Support Package (BSP)
//!
//! Maps the carrier board onto named subsystems so that the firmware loop
//! never sees GPIO numbers or peripheral details. `pins` and `action` are
//! plain data and build anywhere; everything touching esp-hal sits behind
//! the `esp32c3` feature.

pub mod action;
pub mod pins;

#[cfg(feature = "esp32c3")]
pub mod motor_pwm;
#[cfg(feature = "esp32c3")]
mod rover;
#[cfg(feature = "esp32c3")]
pub mod sonar_pin;

pub use action::{Action, KeyMapper};

#[cfg(feature = "esp32c3")]
pub use rover::{
    I2cBus, RoverKeypad, RoverLeds, RoverMotors, RoverServos, RoverSonar, SharedI2c,
    Rover, Strip,
};
