//! Rover pin map (ESP32-C3 carrier, edge connector names in brackets)
//!
//! GPIO |     Function      |      Notes
//! -----+-------------------+----------------------------------
//!  0   | Keypad DATA [P15] | Input, pull-up; keypad pulls low
//!  1   | Keypad CLK  [P16] | Output, idles high
//!  3   | Sonar       [P13] | Trigger and echo on one pin
//!  4   | Left fwd    [P1]  | LEDC channel 0
//!  5   | Left rev    [P12] | LEDC channel 1
//!  6   | Right fwd   [P8]  | LEDC channel 2
//!  7   | Right rev   [P0]  | LEDC channel 3
//!  8   | I2C SDA           | Shared: PCA9685 (0x40), EEPROM (0x50)
//!  9   | I2C SCL           | 100 kHz
//! 10   | LED data    [P2]  | SPI2 MOSI driving WS2812 at 3.2 MHz

// ----- Motors -----
pub const MOTOR_LEFT_FWD: u8 = 4;
pub const MOTOR_LEFT_REV: u8 = 5;
pub const MOTOR_RIGHT_FWD: u8 = 6;
pub const MOTOR_RIGHT_REV: u8 = 7;

// ----- Sonar -----
pub const SONAR: u8 = 3;

// ----- Keypad -----
pub const KEYPAD_CLK: u8 = 1;
pub const KEYPAD_DATA: u8 = 0;

// ----- I2C Bus (shared: servo chip + EEPROM) -----
pub const I2C_SDA: u8 = 8;
pub const I2C_SCL: u8 = 9;
pub const I2C_FREQ_KHZ: u32 = 100;

// ----- LED strip -----
pub const LED_DATA: u8 = 10;
pub const LED_SPI_FREQ_KHZ: u32 = 3_200;
pub const STRIP_LEN: usize = 4;

// ----- Servo channels on the PCA9685 -----
pub const SERVO_MAST: u8 = 0;
pub const SERVO_FRONT_LEFT: u8 = 9;
pub const SERVO_REAR_LEFT: u8 = 11;
pub const SERVO_REAR_RIGHT: u8 = 13;
pub const SERVO_FRONT_RIGHT: u8 = 15;

/// Wheel steering servos, front pair first.
pub const WHEEL_SERVOS: [u8; 4] = [
    SERVO_FRONT_LEFT,
    SERVO_FRONT_RIGHT,
    SERVO_REAR_LEFT,
    SERVO_REAR_RIGHT,
];
