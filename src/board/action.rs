// Semantic rover actions decoupled from keypad keys.
//
// The firmware loop matches on Action, never on Key. KeyMapper holds the
// tunables (drive speed, steering lock, mast step) so the same keypad can
// drive a slow indoor profile or a fast outdoor one.

use crate::drivers::keypad::{Key, KeyCode};
use crate::drivers::motors::{MAX_SPEED, StopMode};

/// Wheel angle used while spinning on the spot, degrees.
pub const SPIN_WHEEL_ANGLE: i32 = 45;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Wheels straight, both motors at this speed.
    Drive(i16),
    /// Front wheels at `angle`, rear wheels mirrored, both motors at `speed`.
    Steer { angle: i32, speed: i16 },
    /// Wheels toed in, motors opposed. Positive turns clockwise.
    Spin(i16),
    Stop(StopMode),
    /// Nudge the mast by this many degrees.
    Mast(i32),
    /// Read the sonar and show the distance on the LEDs.
    Range,
    /// Toggle the rainbow light show.
    Lights,
    /// Persist every servo trim to the EEPROM.
    SaveTrim,
    /// Reload trims from the EEPROM and re-centre.
    LoadTrim,
}

/// Angles for `[front-left, front-right, rear-left, rear-right]`.
pub fn wheel_angles(action: Action) -> Option<[i32; 4]> {
    match action {
        Action::Drive(_) => Some([0; 4]),
        Action::Steer { angle, .. } => Some([angle, angle, -angle, -angle]),
        Action::Spin(_) => Some([
            SPIN_WHEEL_ANGLE,
            -SPIN_WHEEL_ANGLE,
            -SPIN_WHEEL_ANGLE,
            SPIN_WHEEL_ANGLE,
        ]),
        _ => None,
    }
}

/// Translates decoded keypad codes into `Action`s.
pub struct KeyMapper {
    speed: i16,
    steer_angle: i32,
    mast_step: i32,
}

impl Default for KeyMapper {
    fn default() -> Self {
        Self::new()
    }
}

impl KeyMapper {
    pub const fn new() -> Self {
        Self {
            speed: 600,
            steer_angle: 30,
            mast_step: 15,
        }
    }

    /// Drive speed, clamped to the motor range.
    pub fn set_speed(&mut self, speed: i16) {
        self.speed = speed.clamp(0, MAX_SPEED);
    }

    pub fn speed(&self) -> i16 {
        self.speed
    }

    pub fn set_steer_angle(&mut self, degrees: i32) {
        self.steer_angle = degrees.clamp(0, 90);
    }

    /// `None` for chords and codes that are not a single key.
    pub fn map(&self, code: KeyCode) -> Option<Action> {
        code.key().map(|key| self.map_key(key))
    }

    pub fn map_key(&self, key: Key) -> Action {
        let (speed, angle) = (self.speed, self.steer_angle);
        match key {
            Key::Stop => Action::Stop(StopMode::Coast),
            Key::Cross => Action::Stop(StopMode::Brake),
            Key::Forward => Action::Drive(speed),
            Key::Reverse => Action::Drive(-speed),
            Key::ForwardLeft => Action::Steer { angle: -angle, speed },
            Key::ForwardRight => Action::Steer { angle, speed },
            // reversing with the wheels turned swings the tail the other way
            Key::ReverseLeft => Action::Steer {
                angle,
                speed: -speed,
            },
            Key::ReverseRight => Action::Steer {
                angle: -angle,
                speed: -speed,
            },
            Key::SpinLeft => Action::Spin(-speed),
            Key::SpinRight => Action::Spin(speed),
            Key::MastLeft => Action::Mast(-self.mast_step),
            Key::MastRight => Action::Mast(self.mast_step),
            Key::Tick => Action::Range,
            Key::Pause => Action::Lights,
            Key::Save => Action::SaveTrim,
            Key::Load => Action::LoadTrim,
        }
    }
}
