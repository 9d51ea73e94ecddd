//! Half-duplex sonar pin on an esp-hal `Flex` GPIO.
//!
//! The ranger shares one wire for trigger and echo: we drive it for the
//! trigger pulse, then release it and time the echo with the system timer.

use core::convert::Infallible;

use esp_hal::gpio::{Flex, InputConfig, OutputConfig, Pin, Pull};
use esp_hal::time::{Duration, Instant};

use crate::drivers::sonar::EchoPin;

pub struct SonarPin {
    pin: Flex<'static>,
}

impl SonarPin {
    pub fn new(pin: impl Pin + 'static) -> Self {
        let mut pin = Flex::new(pin);
        pin.apply_output_config(&OutputConfig::default());
        pin.apply_input_config(&InputConfig::default().with_pull(Pull::None));
        pin.set_input_enable(true);
        pin.set_output_enable(false);
        Self { pin }
    }

    // busy-wait while the line sits at `high`; false on timeout
    fn wait_while(&self, high: bool, since: Instant, timeout: Duration) -> bool {
        while self.pin.is_high() == high {
            if since.elapsed() > timeout {
                return false;
            }
        }
        true
    }
}

impl embedded_hal::digital::ErrorType for SonarPin {
    type Error = Infallible;
}

impl embedded_hal::digital::OutputPin for SonarPin {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.pin.set_low();
        self.pin.set_output_enable(true);
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        self.pin.set_high();
        self.pin.set_output_enable(true);
        Ok(())
    }
}

impl EchoPin for SonarPin {
    fn set_floating(&mut self) -> Result<(), Self::Error> {
        self.pin.set_output_enable(false);
        self.pin.apply_input_config(&InputConfig::default().with_pull(Pull::None));
        Ok(())
    }

    fn pulse_in_high(&mut self, timeout_us: u32) -> Result<u32, Self::Error> {
        self.pin.set_output_enable(false);
        let timeout = Duration::from_micros(timeout_us as u64);

        let start = Instant::now();
        if !self.wait_while(false, start, timeout) {
            return Ok(0);
        }
        let rise = Instant::now();
        if !self.wait_while(true, rise, timeout) {
            return Ok(0);
        }
        Ok(rise.elapsed().as_micros() as u32)
    }
}
