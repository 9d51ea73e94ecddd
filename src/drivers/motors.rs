// Dual brushed DC motor drive
//
// Each motor sits on two PWM pins (forward, reverse); exactly one of the pair
// carries duty at a time. All four pins share one PWM timer, so the period is
// a chassis-wide setting. It is lowered at low speed, where a slower PWM
// gives brushed motors more torque per duty cycle.
//
// Speeds are in analog-write units, -1023..=1023.

use embedded_hal::delay::DelayNs;
use log::{debug, warn};

use crate::error::Error;

pub const MAX_SPEED: i16 = 1023;

// (speed below, period in us); anything faster uses FAST_PERIOD_US
const PERIOD_TIERS: &[(u16, u32)] = &[(200, 60_000), (300, 40_000)];
const FAST_PERIOD_US: u32 = 30_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MotorPin {
    LeftForward,
    LeftReverse,
    RightForward,
    RightReverse,
}

impl MotorPin {
    pub const ALL: [MotorPin; 4] = [
        MotorPin::LeftForward,
        MotorPin::LeftReverse,
        MotorPin::RightForward,
        MotorPin::RightReverse,
    ];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Motor {
    Left,
    Right,
    Both,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopMode {
    /// All pins low: the motors freewheel.
    Coast,
    /// All pins high: the H-bridge shorts the windings.
    Brake,
}

/// The PWM side of the register I/O port.
///
/// `set_duty` takes 0..=1023 on the pin's full scale; `set_level` forces a
/// pin fully on or off.
pub trait DrivePwm {
    type Error: core::fmt::Debug;

    fn set_period_us(&mut self, period_us: u32) -> Result<(), Self::Error>;
    fn set_duty(&mut self, pin: MotorPin, duty: u16) -> Result<(), Self::Error>;
    fn set_level(&mut self, pin: MotorPin, high: bool) -> Result<(), Self::Error>;
}

/// PWM period for a speed magnitude.
pub fn pwm_period_us(abs_speed: u16) -> u32 {
    PERIOD_TIERS
        .iter()
        .find(|&&(below, _)| abs_speed < below)
        .map_or(FAST_PERIOD_US, |&(_, period)| period)
}

/// Timer frequency for a PWM period, rounded to the nearest hertz.
pub const fn pwm_frequency_hz(period_us: u32) -> u32 {
    (1_000_000 + period_us / 2) / period_us
}

/// (forward, reverse) duty for a signed speed, clamped to +-1023.
pub fn duties(speed: i16) -> (u16, u16) {
    let speed = speed.clamp(-MAX_SPEED, MAX_SPEED);
    if speed > 0 {
        (speed as u16, 0)
    } else {
        (0, speed.unsigned_abs())
    }
}

pub struct Motors<P, D> {
    port: P,
    delay: D,
}

impl<P, D> Motors<P, D>
where
    P: DrivePwm,
    D: DelayNs,
{
    pub fn new(port: P, delay: D) -> Self {
        Self { port, delay }
    }

    /// Both motors at `speed`.
    pub fn drive(&mut self, speed: i16) -> Result<(), Error> {
        self.motor(Motor::Both, speed)
    }

    /// Drive for `duration_ms`, then coast. Blocks the caller throughout.
    pub fn drive_for(&mut self, speed: i16, duration_ms: u32) -> Result<(), Error> {
        self.drive(speed)?;
        self.delay.delay_ms(duration_ms);
        self.stop(StopMode::Coast)
    }

    pub fn motor(&mut self, target: Motor, speed: i16) -> Result<(), Error> {
        let (forward, reverse) = duties(speed);
        let period = pwm_period_us(forward.max(reverse));
        self.port.set_period_us(period).map_err(pwm_err)?;

        if matches!(target, Motor::Left | Motor::Both) {
            self.set_pair(MotorPin::LeftForward, MotorPin::LeftReverse, forward, reverse)?;
        }
        if matches!(target, Motor::Right | Motor::Both) {
            self.set_pair(MotorPin::RightForward, MotorPin::RightReverse, forward, reverse)?;
        }

        debug!("motors: {:?} {} (period {}us)", target, speed, period);
        Ok(())
    }

    /// Turn on the spot: left runs at `speed`, right at `-speed`.
    pub fn spin(&mut self, speed: i16) -> Result<(), Error> {
        self.motor(Motor::Left, speed)?;
        self.motor(Motor::Right, speed.saturating_neg())
    }

    pub fn stop(&mut self, mode: StopMode) -> Result<(), Error> {
        let high = mode == StopMode::Brake;
        for pin in MotorPin::ALL {
            self.port.set_level(pin, high).map_err(pwm_err)?;
        }
        debug!("motors: stop {:?}", mode);
        Ok(())
    }

    pub fn release(self) -> (P, D) {
        (self.port, self.delay)
    }

    fn set_pair(
        &mut self,
        fwd: MotorPin,
        rev: MotorPin,
        forward: u16,
        reverse: u16,
    ) -> Result<(), Error> {
        self.port.set_duty(fwd, forward).map_err(pwm_err)?;
        self.port.set_duty(rev, reverse).map_err(pwm_err)
    }
}

fn pwm_err<E: core::fmt::Debug>(e: E) -> Error {
    warn!("motors: pwm error {:?}", e);
    Error::Pwm
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{DriveOp, FakeDelay, FakeDrive};

    fn motors() -> Motors<FakeDrive, FakeDelay> {
        Motors::new(FakeDrive::default(), FakeDelay::default())
    }

    #[test]
    fn period_tiers_have_exact_boundaries() {
        assert_eq!(pwm_period_us(0), 60_000);
        assert_eq!(pwm_period_us(199), 60_000);
        assert_eq!(pwm_period_us(200), 40_000);
        assert_eq!(pwm_period_us(299), 40_000);
        assert_eq!(pwm_period_us(300), 30_000);
        assert_eq!(pwm_period_us(1023), 30_000);
    }

    #[test]
    fn tier_periods_round_to_nearest_hertz() {
        assert_eq!(pwm_frequency_hz(pwm_period_us(0)), 17);
        assert_eq!(pwm_frequency_hz(pwm_period_us(250)), 25);
        assert_eq!(pwm_frequency_hz(pwm_period_us(1023)), 33);
    }

    #[test]
    fn signed_speed_splits_into_one_active_pin() {
        assert_eq!(duties(600), (600, 0));
        assert_eq!(duties(-250), (0, 250));
        assert_eq!(duties(0), (0, 0));
        assert_eq!(duties(5000), (1023, 0));
        assert_eq!(duties(i16::MIN), (0, 1023));
    }

    #[test]
    fn period_is_set_before_any_duty() {
        let mut m = motors();
        m.drive(-250).unwrap();

        let (port, _) = m.release();
        assert_eq!(
            port.ops,
            vec![
                DriveOp::Period(40_000),
                DriveOp::Duty(MotorPin::LeftForward, 0),
                DriveOp::Duty(MotorPin::LeftReverse, 250),
                DriveOp::Duty(MotorPin::RightForward, 0),
                DriveOp::Duty(MotorPin::RightReverse, 250),
            ]
        );
    }

    #[test]
    fn both_matches_left_and_right_separately() {
        for speed in [-1023, -300, -1, 0, 150, 299, 1023] {
            let mut both = motors();
            both.motor(Motor::Both, speed).unwrap();

            let mut split = motors();
            split.motor(Motor::Left, speed).unwrap();
            split.motor(Motor::Right, speed).unwrap();

            assert_eq!(both.release().0.duties(), split.release().0.duties(), "{speed}");
        }
    }

    #[test]
    fn single_motor_leaves_other_pair_alone() {
        let mut m = motors();
        m.motor(Motor::Right, 700).unwrap();
        assert_eq!(
            m.release().0.duties(),
            vec![(MotorPin::RightForward, 700), (MotorPin::RightReverse, 0)]
        );
    }

    #[test]
    fn stop_drives_all_four_pins_to_one_level() {
        let mut m = motors();
        m.stop(StopMode::Brake).unwrap();
        m.stop(StopMode::Coast).unwrap();

        let ops = m.release().0.ops;
        let brake: Vec<_> = MotorPin::ALL.iter().map(|&p| DriveOp::Level(p, true)).collect();
        let coast: Vec<_> = MotorPin::ALL.iter().map(|&p| DriveOp::Level(p, false)).collect();
        assert_eq!(ops[..4], brake[..]);
        assert_eq!(ops[4..], coast[..]);
    }

    #[test]
    fn drive_for_waits_then_coasts() {
        let mut m = motors();
        m.drive_for(600, 400).unwrap();

        let (port, delay) = m.release();
        assert_eq!(delay.total_ns(), 400_000_000);
        assert_eq!(port.ops[0], DriveOp::Period(30_000));
        assert_eq!(port.ops[4], DriveOp::Duty(MotorPin::RightReverse, 0));
        assert!(port.ops[5..].iter().all(|op| matches!(op, DriveOp::Level(_, false))));
        assert_eq!(port.ops.len(), 9);
    }

    #[test]
    fn spin_runs_motors_in_opposite_directions() {
        let mut m = motors();
        m.spin(500).unwrap();
        assert_eq!(
            m.release().0.duties(),
            vec![
                (MotorPin::LeftForward, 500),
                (MotorPin::LeftReverse, 0),
                (MotorPin::RightForward, 0),
                (MotorPin::RightReverse, 500),
            ]
        );
    }
}
