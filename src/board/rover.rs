// Rover context: every driver bound to its ESP32-C3 peripheral.
//
// The I2C bus is shared by the servo chip and the calibration EEPROM through
// embedded-hal-bus RefCellDevices; the firmware is single threaded, so a
// RefCell is enough. A second execution context would need
// CriticalSectionDevice instead.

use core::cell::RefCell;

use embedded_hal_bus::i2c::RefCellDevice;
use esp_hal::{
    Blocking,
    delay::Delay,
    gpio::{Input, InputConfig, Level, Output, OutputConfig, Pull},
    i2c::master::{self as i2c, I2c},
    ledc::{LSGlobalClkSource, Ledc, LowSpeed, channel},
    peripherals::Peripherals,
    spi,
    time::Rate,
};
use log::info;
use static_cell::StaticCell;
use ws2812_spi::Ws2812;

use super::motor_pwm::{self, MotorPwm, MotorTimers};
use super::pins::{I2C_FREQ_KHZ, LED_SPI_FREQ_KHZ, STRIP_LEN};
use super::sonar_pin::SonarPin;
use crate::drivers::calibration::Eeprom;
use crate::drivers::keypad::Keypad;
use crate::drivers::leds::Leds;
use crate::drivers::motors::Motors;
use crate::drivers::pca9685::Servos;
use crate::drivers::pixels::NeoPixels;
use crate::drivers::sonar::Sonar;

// Type Aliases
pub type I2cBus = I2c<'static, Blocking>;
pub type SharedI2c = RefCellDevice<'static, I2cBus>;
pub type SpiBus = spi::master::Spi<'static, Blocking>;
pub type Strip = NeoPixels<Ws2812<SpiBus>, STRIP_LEN>;

pub type RoverServos = Servos<SharedI2c, Eeprom<SharedI2c, Delay>>;
pub type RoverMotors = Motors<MotorPwm, Delay>;
pub type RoverSonar = Sonar<SonarPin, Delay>;
pub type RoverKeypad = Keypad<Output<'static>, Input<'static>, Delay>;
pub type RoverLeds = Leds<Strip>;

static I2C_BUS: StaticCell<RefCell<I2cBus>> = StaticCell::new();
static LEDC: StaticCell<Ledc<'static>> = StaticCell::new();
static MOTOR_TIMERS: StaticCell<MotorTimers> = StaticCell::new();

/// Complete board, every driver ready for use.
pub struct Rover {
    pub servos: RoverServos,
    pub motors: RoverMotors,
    pub sonar: RoverSonar,
    pub keypad: RoverKeypad,
    pub leds: RoverLeds,
}

impl Rover {
    pub fn init(p: Peripherals) -> Self {
        // I2C: servo chip + EEPROM
        let i2c_cfg = i2c::Config::default().with_frequency(Rate::from_khz(I2C_FREQ_KHZ));
        let i2c = I2c::new(p.I2C0, i2c_cfg)
            .unwrap()
            .with_sda(p.GPIO8)
            .with_scl(p.GPIO9);
        let bus: &'static RefCell<I2cBus> = I2C_BUS.init(RefCell::new(i2c));
        let store = Eeprom::new(RefCellDevice::new(bus), Delay::new());
        let servos = Servos::new(RefCellDevice::new(bus), store);
        info!("i2c ready ({} kHz)", I2C_FREQ_KHZ);

        // Motors: LEDC, one timer per period tier
        let mut ledc = Ledc::new(p.LEDC);
        ledc.set_global_slow_clock(LSGlobalClkSource::APBClk);
        let ledc: &'static Ledc<'static> = LEDC.init(ledc);
        let timers = MOTOR_TIMERS.init(motor_pwm::init_timers(ledc).unwrap());
        let channels = [
            ledc.channel::<LowSpeed>(channel::Number::Channel0, p.GPIO4),
            ledc.channel::<LowSpeed>(channel::Number::Channel1, p.GPIO5),
            ledc.channel::<LowSpeed>(channel::Number::Channel2, p.GPIO6),
            ledc.channel::<LowSpeed>(channel::Number::Channel3, p.GPIO7),
        ];
        let motors = Motors::new(MotorPwm::new(timers, channels).unwrap(), Delay::new());
        info!("motors ready.");

        let sonar = Sonar::new(SonarPin::new(p.GPIO3), Delay::new());

        let clk = Output::new(p.GPIO1, Level::High, OutputConfig::default());
        let data = Input::new(p.GPIO0, InputConfig::default().with_pull(Pull::Up));
        let keypad = Keypad::new(clk, data, Delay::new());

        // WS2812 over SPI MOSI
        let spi_cfg = spi::master::Config::default()
            .with_frequency(Rate::from_khz(LED_SPI_FREQ_KHZ))
            .with_mode(spi::Mode::_0);
        let spi_bus = spi::master::Spi::new(p.SPI2, spi_cfg)
            .unwrap()
            .with_mosi(p.GPIO10);
        let leds = Leds::new(NeoPixels::new(Ws2812::new(spi_bus)));
        info!("leds ready ({} pixels).", STRIP_LEN);

        Rover {
            servos,
            motors,
            sonar,
            keypad,
            leds,
        }
    }
}
