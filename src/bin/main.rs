// rover-os entry point and control loop
//
// Boot sequence: logger -> hardware -> centre servos -> LEDs idle colour
// Main loop: block on the keypad -> map key to Action -> apply
//
// Every hardware call is blocking and runs on this one thread. Driver
// errors are logged and the loop carries on; a stuck keypad just times out
// and we go round again.

#![no_std]
#![no_main]

use esp_backtrace as _;
use esp_hal::clock::CpuClock;
use log::{info, warn};
use smart_leds::colors::{BLUE, GREEN, ORANGE, RED};

use rover_os::Error;
use rover_os::board::action::{Action, KeyMapper, wheel_angles};
use rover_os::board::pins::{SERVO_MAST, STRIP_LEN, WHEEL_SERVOS};
use rover_os::board::Rover;
use rover_os::drivers::leds::UpdateMode;
use rover_os::drivers::pca9685::{CHANNELS, MAX_ANGLE, MIN_ANGLE};
use rover_os::drivers::sonar::Unit;

esp_bootloader_esp_idf::esp_app_desc!();

// distance shown as one lit pixel per RANGE_STEP_CM
const RANGE_STEP_CM: u32 = 20;

struct State {
    mast: i32,
    rainbow: bool,
}

#[esp_hal::main]
fn main() -> ! {
    esp_println::logger::init_logger_from_env();
    let config = esp_hal::Config::default().with_cpu_clock(CpuClock::max());
    let peripherals = esp_hal::init(config);

    info!("booting...");

    let mut rover = Rover::init(peripherals);
    info!("hardware initialized.");

    if let Err(e) = rover.servos.zero_all() {
        warn!("servos: centre failed: {}", e);
    }
    if let Err(e) = rover.leds.set_all(BLUE) {
        warn!("leds: {}", e);
    }

    let mapper = KeyMapper::new();
    let mut state = State {
        mast: 0,
        rainbow: false,
    };
    info!("rover ready.");

    loop {
        let code = match rover.keypad.wait_for_keypress() {
            Ok(code) => code,
            Err(Error::KeypadReadTimeout) => continue,
            Err(e) => {
                warn!("keypad: {}", e);
                continue;
            }
        };

        let Some(action) = mapper.map(code) else {
            info!("keypad: ignoring {:#06x}", code.bits());
            continue;
        };

        if let Err(e) = apply(&mut rover, &mut state, action) {
            warn!("{:?} failed: {}", action, e);
        }
    }
}

fn apply(rover: &mut Rover, state: &mut State, action: Action) -> Result<(), Error> {
    if let Some(angles) = wheel_angles(action) {
        for (channel, angle) in WHEEL_SERVOS.into_iter().zip(angles) {
            rover.servos.set_servo(channel, angle)?;
        }
    }

    match action {
        Action::Drive(speed) | Action::Steer { speed, .. } => rover.motors.drive(speed),
        Action::Spin(speed) => rover.motors.spin(speed),
        Action::Stop(mode) => rover.motors.stop(mode),
        Action::Mast(step) => {
            state.mast = (state.mast + step).clamp(MIN_ANGLE, MAX_ANGLE);
            rover.servos.set_servo(SERVO_MAST, state.mast)
        }
        Action::Range => show_range(rover),
        Action::Lights => {
            state.rainbow = !state.rainbow;
            if state.rainbow {
                rover.leds.show_rainbow()
            } else {
                rover.leds.set_all(BLUE)
            }
        }
        Action::SaveTrim => {
            for channel in 0..CHANNELS as u8 {
                rover.servos.save_offset(channel)?;
            }
            info!("trim saved: {:?}", rover.servos.offsets());
            rover.leds.set_all(GREEN)
        }
        Action::LoadTrim => {
            rover.servos.init()?;
            rover.servos.zero_all()?;
            state.mast = 0;
            info!("trim loaded: {:?}", rover.servos.offsets());
            rover.leds.set_all(ORANGE)
        }
    }
}

/// Bar graph of the sonar distance, red when nothing echoes back.
fn show_range(rover: &mut Rover) -> Result<(), Error> {
    let lit = match rover.sonar.read(Unit::Centimeters) {
        Ok(cm) => {
            info!("sonar: {} cm", cm);
            (cm / RANGE_STEP_CM + 1).min(STRIP_LEN as u32) as usize
        }
        Err(Error::SonarTimeout) => return rover.leds.set_all(RED),
        Err(e) => return Err(e),
    };

    // batch the pixel writes into one refresh
    rover.leds.set_update_mode(UpdateMode::Manual);
    rover.leds.clear()?;
    for index in 0..lit {
        rover.leds.set_pixel(index, GREEN)?;
    }
    let shown = rover.leds.show();
    rover.leds.set_update_mode(UpdateMode::Auto);
    shown
}
