//! LEDC backing for the motor `DrivePwm` port.
//!
//! LEDC channels cannot change their own frequency, so one low-speed timer
//! is configured per period tier and the four motor channels are rebound to
//! the timer for the requested period. Rebinding only happens when the tier
//! changes; it resets duty, which the motor driver rewrites straight after.

use embedded_hal::pwm::SetDutyCycle;
use esp_hal::gpio::DriveMode;
use esp_hal::ledc::channel::{self, ChannelIFace};
use esp_hal::ledc::timer::{self, TimerIFace};
use esp_hal::ledc::{Ledc, LowSpeed};
use esp_hal::time::Rate;
use log::debug;

use crate::drivers::motors::{DrivePwm, MAX_SPEED, MotorPin, pwm_frequency_hz};

/// Periods the motor driver asks for, slowest first.
pub const TIER_PERIODS_US: [u32; 3] = [60_000, 40_000, 30_000];

const DUTY_RESOLUTION: timer::config::Duty = timer::config::Duty::Duty14Bit;

pub type MotorTimers = [timer::Timer<'static, LowSpeed>; 3];

#[derive(Debug)]
pub enum MotorPwmError {
    Timer(timer::Error),
    Channel(channel::Error),
    /// Period with no configured timer.
    Period(u32),
    Duty,
}

/// One timer per period tier, in `TIER_PERIODS_US` order.
pub fn init_timers(ledc: &'static Ledc<'static>) -> Result<MotorTimers, MotorPwmError> {
    let mut timers = [
        ledc.timer::<LowSpeed>(timer::Number::Timer0),
        ledc.timer::<LowSpeed>(timer::Number::Timer1),
        ledc.timer::<LowSpeed>(timer::Number::Timer2),
    ];
    for (timer, period_us) in timers.iter_mut().zip(TIER_PERIODS_US) {
        timer
            .configure(timer::config::Config {
                duty: DUTY_RESOLUTION,
                clock_source: timer::LSClockSource::APBClk,
                frequency: Rate::from_hz(pwm_frequency_hz(period_us)),
            })
            .map_err(MotorPwmError::Timer)?;
    }
    Ok(timers)
}

pub struct MotorPwm {
    timers: &'static MotorTimers,
    // indexed like MotorPin::ALL
    channels: [channel::Channel<'static, LowSpeed>; 4],
    tier: usize,
}

impl MotorPwm {
    /// Binds every channel to the slowest timer with zero duty.
    pub fn new(
        timers: &'static MotorTimers,
        channels: [channel::Channel<'static, LowSpeed>; 4],
    ) -> Result<Self, MotorPwmError> {
        let mut pwm = Self {
            timers,
            channels,
            tier: 0,
        };
        pwm.bind(0)?;
        Ok(pwm)
    }

    fn bind(&mut self, tier: usize) -> Result<(), MotorPwmError> {
        let timers = self.timers;
        for ch in self.channels.iter_mut() {
            ch.configure(channel::config::Config {
                timer: &timers[tier],
                duty_pct: 0,
                drive_mode: DriveMode::PushPull,
            })
            .map_err(MotorPwmError::Channel)?;
        }
        self.tier = tier;
        Ok(())
    }

    fn channel(&mut self, pin: MotorPin) -> &mut channel::Channel<'static, LowSpeed> {
        let index = match pin {
            MotorPin::LeftForward => 0,
            MotorPin::LeftReverse => 1,
            MotorPin::RightForward => 2,
            MotorPin::RightReverse => 3,
        };
        &mut self.channels[index]
    }
}

impl DrivePwm for MotorPwm {
    type Error = MotorPwmError;

    fn set_period_us(&mut self, period_us: u32) -> Result<(), Self::Error> {
        let tier = TIER_PERIODS_US
            .iter()
            .position(|&p| p == period_us)
            .ok_or(MotorPwmError::Period(period_us))?;
        if tier != self.tier {
            debug!("motor pwm: period {}us", period_us);
            self.bind(tier)?;
        }
        Ok(())
    }

    fn set_duty(&mut self, pin: MotorPin, duty: u16) -> Result<(), Self::Error> {
        self.channel(pin)
            .set_duty_cycle_fraction(duty, MAX_SPEED as u16)
            .map_err(|_| MotorPwmError::Duty)
    }

    fn set_level(&mut self, pin: MotorPin, high: bool) -> Result<(), Self::Error> {
        let ch = self.channel(pin);
        let res = if high {
            ch.set_duty_cycle_fully_on()
        } else {
            ch.set_duty_cycle_fully_off()
        };
        res.map_err(|_| MotorPwmError::Duty)
    }
}
