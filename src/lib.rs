// Hardware control layer for a servo/motor rover on ESP32-C3
//
// drivers/ is board independent and builds on the host; board/ binds the
// drivers to esp-hal peripherals behind the "esp32c3" feature.

#![cfg_attr(not(test), no_std)]

pub mod board;
pub mod drivers;
pub mod error;

#[cfg(test)]
pub(crate) mod testing;

pub use error::Error;
