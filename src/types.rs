//! Pin state enumerations and numeric limits
//!
//! Wire values and bounds follow the pigpio contract; both backends share
//! them, so a value validated here is valid on either transport.

use crate::error::Error;

/// Highest GPIO number accepted for mode/pull/read/write operations.
pub const MAX_GPIO: u32 = 53;

/// Highest GPIO number accepted for PWM and servo operations.
pub const MAX_USER_GPIO: u32 = 31;

/// Servo pulse width bounds in microseconds. 0 switches pulses off.
pub const SERVO_MIN_PULSEWIDTH: u32 = 500;
pub const SERVO_MAX_PULSEWIDTH: u32 = 2500;

/// Software PWM range bounds and the power-on default.
pub const PWM_MIN_RANGE: u32 = 25;
pub const PWM_MAX_RANGE: u32 = 40_000;
pub const PWM_DEFAULT_RANGE: u32 = 255;

/// Hardware PWM limits: frequency in Hz, duty in millionths.
pub const HW_PWM_MAX_FREQ: u32 = 125_000_000;
pub const HW_PWM_RANGE: u32 = 1_000_000;

/// SPI limits. Channels 0-1 on the main bus, 0-2 on the auxiliary bus.
pub const SPI_MAX_CHANNEL: u32 = 2;
pub const SPI_MIN_BAUD: u32 = 32_000;
pub const SPI_MAX_BAUD: u32 = 125_000_000;
/// Defined SPI open flag bits occupy the low 22 bits.
pub const SPI_FLAGS_MASK: u32 = (1 << 22) - 1;
/// Largest single SPI read/write/transfer in bytes.
pub const SPI_MAX_TRANSFER: usize = 65_536;

/// I2C limits. Addresses are 7-bit; block transfers cap at 32 bytes.
pub const I2C_MAX_ADDR: u32 = 0x7f;
pub const I2C_MAX_BLOCK: usize = 32;

/// GPIO pin mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Input (high impedance)
    Input,
    /// Output (push-pull)
    Output,
    /// Alternate function 0
    Alt0,
    /// Alternate function 1
    Alt1,
    /// Alternate function 2
    Alt2,
    /// Alternate function 3
    Alt3,
    /// Alternate function 4
    Alt4,
    /// Alternate function 5
    Alt5,
}

impl Mode {
    /// Wire value understood by both backends.
    pub fn to_raw(self) -> u32 {
        match self {
            Mode::Input => 0,
            Mode::Output => 1,
            Mode::Alt5 => 2,
            Mode::Alt4 => 3,
            Mode::Alt0 => 4,
            Mode::Alt1 => 5,
            Mode::Alt2 => 6,
            Mode::Alt3 => 7,
        }
    }

    pub fn from_raw(raw: u32) -> Result<Mode, Error> {
        match raw {
            0 => Ok(Mode::Input),
            1 => Ok(Mode::Output),
            2 => Ok(Mode::Alt5),
            3 => Ok(Mode::Alt4),
            4 => Ok(Mode::Alt0),
            5 => Ok(Mode::Alt1),
            6 => Ok(Mode::Alt2),
            7 => Ok(Mode::Alt3),
            _ => Err(Error::BadMode),
        }
    }
}

/// GPIO level
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Low,
    High,
}

impl Level {
    pub fn to_raw(self) -> u32 {
        match self {
            Level::Low => 0,
            Level::High => 1,
        }
    }

    pub fn from_raw(raw: u32) -> Result<Level, Error> {
        match raw {
            0 => Ok(Level::Low),
            1 => Ok(Level::High),
            _ => Err(Error::BadLevel),
        }
    }
}

impl From<bool> for Level {
    fn from(high: bool) -> Self {
        if high {
            Level::High
        } else {
            Level::Low
        }
    }
}

/// GPIO pull-up/down state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pull {
    Off,
    Down,
    Up,
}

impl Pull {
    pub fn to_raw(self) -> u32 {
        match self {
            Pull::Off => 0,
            Pull::Down => 1,
            Pull::Up => 2,
        }
    }

    pub fn from_raw(raw: u32) -> Result<Pull, Error> {
        match raw {
            0 => Ok(Pull::Off),
            1 => Ok(Pull::Down),
            2 => Ok(Pull::Up),
            _ => Err(Error::BadPud),
        }
    }
}
