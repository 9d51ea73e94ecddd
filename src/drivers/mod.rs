// Hardware drivers, chip-level and protocol-level, board-independent.
//
// Each module is generic over embedded-hal traits or a small collaborator
// trait; pin assignments and bus wiring live in board/.

pub mod calibration;
pub mod keypad;
pub mod leds;
pub mod motors;
pub mod pca9685;
pub mod pixels;
pub mod sonar;
