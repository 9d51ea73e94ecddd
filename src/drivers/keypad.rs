// Bit-banged serial keypad (16 keys, clocked shift-out, active low)
//
// Frame: host holds CLK high; the keypad pulls DATA low to announce a frame,
// releases it high when data is ready; after a 10us settle the host clocks
// 16 bits MSB first (CLK low, 2us, sample DATA, CLK high, 2us). Pressed keys
// read as 0, so the code is the complement of the shifted value.
//
// An all-released frame (code 0) is treated as line noise and re-read. Both
// handshake waits and the number of re-reads are bounded.

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{InputPin, OutputPin};
use log::{debug, warn};

use crate::error::Error;

const FRAME_BITS: u32 = 16;
const SETTLE_US: u32 = 10;
const HALF_CLOCK_US: u32 = 2;
const POLL_US: u32 = 1;

/// Raw 16-bit key code; one bit per key, set when pressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeyCode(pub u16);

impl KeyCode {
    /// Inverts a raw active-low frame.
    #[inline]
    pub const fn from_raw(raw: u16) -> Self {
        KeyCode(u16::MAX - raw)
    }

    #[inline]
    pub const fn bits(self) -> u16 {
        self.0
    }

    /// The single key this code stands for, if exactly one is down.
    pub fn key(self) -> Option<Key> {
        Key::ALL.iter().copied().find(|k| k.code() == self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Stop,
    Forward,
    Reverse,
    ForwardLeft,
    ForwardRight,
    ReverseLeft,
    ReverseRight,
    SpinLeft,
    SpinRight,
    MastLeft,
    MastRight,
    Cross,
    Tick,
    Pause,
    Save,
    Load,
}

impl Key {
    pub const ALL: [Key; 16] = [
        Key::Stop,
        Key::Forward,
        Key::Reverse,
        Key::ForwardLeft,
        Key::ForwardRight,
        Key::ReverseLeft,
        Key::ReverseRight,
        Key::SpinLeft,
        Key::SpinRight,
        Key::MastLeft,
        Key::MastRight,
        Key::Cross,
        Key::Tick,
        Key::Pause,
        Key::Save,
        Key::Load,
    ];

    pub const fn code(self) -> u16 {
        match self {
            Key::Pause => 1 << 0,
            Key::Tick => 1 << 1,
            Key::Cross => 1 << 2,
            Key::ReverseLeft => 1 << 3,
            Key::Reverse => 1 << 4,
            Key::ReverseRight => 1 << 5,
            Key::SpinLeft => 1 << 6,
            Key::Stop => 1 << 7,
            Key::SpinRight => 1 << 8,
            Key::ForwardLeft => 1 << 9,
            Key::Forward => 1 << 10,
            Key::ForwardRight => 1 << 11,
            Key::Load => 1 << 12,
            Key::Save => 1 << 13,
            Key::MastRight => 1 << 14,
            Key::MastLeft => 1 << 15,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            Key::Stop => "stop",
            Key::Forward => "forward",
            Key::Reverse => "reverse",
            Key::ForwardLeft => "forward left",
            Key::ForwardRight => "forward right",
            Key::ReverseLeft => "reverse left",
            Key::ReverseRight => "reverse right",
            Key::SpinLeft => "spin left",
            Key::SpinRight => "spin right",
            Key::MastLeft => "mast left",
            Key::MastRight => "mast right",
            Key::Cross => "cross",
            Key::Tick => "tick",
            Key::Pause => "pause",
            Key::Save => "save",
            Key::Load => "load",
        }
    }
}

impl core::fmt::Display for Key {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, Copy)]
pub struct KeypadConfig {
    /// Longest wait for each handshake edge.
    pub handshake_timeout_us: u32,
    /// Frames read before giving up on a non-zero code.
    pub max_attempts: u32,
}

impl Default for KeypadConfig {
    fn default() -> Self {
        Self {
            handshake_timeout_us: 100_000,
            max_attempts: 10_000,
        }
    }
}

pub struct Keypad<CLK, DATA, D> {
    clk: CLK,
    data: DATA,
    delay: D,
    config: KeypadConfig,
}

impl<CLK, DATA, D> Keypad<CLK, DATA, D>
where
    CLK: OutputPin,
    DATA: InputPin,
    D: DelayNs,
{
    pub fn new(clk: CLK, data: DATA, delay: D) -> Self {
        Self::with_config(clk, data, delay, KeypadConfig::default())
    }

    pub fn with_config(clk: CLK, data: DATA, delay: D, config: KeypadConfig) -> Self {
        Self {
            clk,
            data,
            delay,
            config,
        }
    }

    /// Block until a frame with at least one key down arrives.
    pub fn wait_for_keypress(&mut self) -> Result<KeyCode, Error> {
        for _ in 0..self.config.max_attempts {
            let code = self.read_frame()?;
            if code.bits() != 0 {
                debug!("keypad: {:#06x}", code.bits());
                return Ok(code);
            }
        }
        warn!("keypad: {} empty frames", self.config.max_attempts);
        Err(Error::KeypadReadTimeout)
    }

    /// One handshake plus 16 clocked bits.
    pub fn read_frame(&mut self) -> Result<KeyCode, Error> {
        self.clk.set_high().map_err(Error::pin)?;

        // frame start: DATA falls, then rises when the first bit is ready
        self.wait_while(true)?;
        self.wait_while(false)?;
        self.delay.delay_us(SETTLE_US);

        let mut raw: u16 = 0;
        for _ in 0..FRAME_BITS {
            self.clk.set_low().map_err(Error::pin)?;
            self.delay.delay_us(HALF_CLOCK_US);
            let bit = self.data.is_high().map_err(Error::pin)?;
            raw = (raw << 1) | bit as u16;
            self.clk.set_high().map_err(Error::pin)?;
            self.delay.delay_us(HALF_CLOCK_US);
        }

        Ok(KeyCode::from_raw(raw))
    }

    pub fn release(self) -> (CLK, DATA, D) {
        (self.clk, self.data, self.delay)
    }

    fn wait_while(&mut self, high: bool) -> Result<(), Error> {
        let mut waited = 0;
        while self.data.is_high().map_err(Error::pin)? == high {
            if waited >= self.config.handshake_timeout_us {
                return Err(Error::KeypadReadTimeout);
            }
            self.delay.delay_us(POLL_US);
            waited += POLL_US;
        }
        Ok(())
    }
}
