//! Error types
//!
//! Both backends report failures through the same closed [`Error`]
//! enumeration. The local controller and the daemon both speak the
//! pigpio status convention (non-negative success, negative error code);
//! [`check`] is the single point where a raw status becomes a typed error.

use std::io;

/// Result type for peripheral operations
pub type Result<T> = std::result::Result<T, Error>;

/// Peripheral access errors
///
/// Every operation on either backend resolves to one of these variants.
/// Raw controller status codes are never surfaced to callers; a code with
/// no named mapping becomes [`Error::Unknown`] carrying the raw value.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("controller initialisation failed")]
    InitFailed,

    #[error("controller not initialised")]
    NotInitialised,

    #[error("not connected to the daemon")]
    NotConnected,

    #[error("connection to daemon failed: {0}")]
    ConnectFailed(String),

    #[error("GPIO not in the valid range 0-53")]
    BadGpio,

    #[error("GPIO not in the user range 0-31")]
    BadUserGpio,

    #[error("bad GPIO mode")]
    BadMode,

    #[error("bad GPIO level")]
    BadLevel,

    #[error("bad pull-up/down setting")]
    BadPud,

    #[error("servo pulse width not 0 or 500-2500")]
    BadPulsewidth,

    #[error("PWM duty cycle exceeds the configured range")]
    BadDutycycle,

    #[error("PWM range not in 25-40000")]
    BadDutyRange,

    #[error("unknown or closed handle")]
    BadHandle,

    #[error("no handle available")]
    NoHandle,

    #[error("bad SPI channel")]
    BadSpiChannel,

    #[error("SPI baud rate not in 32000-125000000")]
    BadSpiSpeed,

    #[error("bad SPI transfer count")]
    BadSpiCount,

    #[error("bad open flags")]
    BadFlags,

    #[error("SPI open failed")]
    SpiOpenFailed,

    #[error("SPI transfer failed")]
    SpiTransferFailed,

    #[error("auxiliary SPI is not available")]
    NoAuxSpi,

    #[error("bad I2C bus")]
    BadI2cBus,

    #[error("I2C address not in 0x00-0x7f")]
    BadI2cAddr,

    #[error("I2C open failed")]
    I2cOpenFailed,

    #[error("I2C write failed")]
    I2cWriteFailed,

    #[error("I2C read failed")]
    I2cReadFailed,

    #[error("bad parameter")]
    BadParam,

    #[error("GPIO is not capable of PWM")]
    NotPwmGpio,

    #[error("GPIO is not capable of hardware PWM")]
    NotHpwmGpio,

    #[error("hardware PWM frequency not in 1-125000000")]
    BadHpwmFreq,

    #[error("hardware PWM duty cycle not in 0-1000000")]
    BadHpwmDuty,

    #[error("illegal hardware PWM combination")]
    HpwmIllegal,

    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("daemon protocol error: {0}")]
    Protocol(String),

    #[error("unrecognised controller status {0}")]
    Unknown(i32),
}

/// Raw status codes shared by the local controller and the daemon.
///
/// `LocalController` implementations must draw their negative returns from
/// this table; it mirrors the pigpio error code contract.
pub mod codes {
    pub const PI_INIT_FAILED: i32 = -1;
    pub const PI_BAD_USER_GPIO: i32 = -2;
    pub const PI_BAD_GPIO: i32 = -3;
    pub const PI_BAD_MODE: i32 = -4;
    pub const PI_BAD_LEVEL: i32 = -5;
    pub const PI_BAD_PUD: i32 = -6;
    pub const PI_BAD_PULSEWIDTH: i32 = -7;
    pub const PI_BAD_DUTYCYCLE: i32 = -8;
    pub const PI_BAD_DUTYRANGE: i32 = -21;
    pub const PI_NO_HANDLE: i32 = -24;
    pub const PI_BAD_HANDLE: i32 = -25;
    pub const PI_NOT_INITIALISED: i32 = -31;
    pub const PI_SOCK_READ_FAILED: i32 = -59;
    pub const PI_SOCK_WRIT_FAILED: i32 = -60;
    pub const PI_I2C_OPEN_FAILED: i32 = -71;
    pub const PI_SPI_OPEN_FAILED: i32 = -73;
    pub const PI_BAD_I2C_BUS: i32 = -74;
    pub const PI_BAD_I2C_ADDR: i32 = -75;
    pub const PI_BAD_SPI_CHANNEL: i32 = -76;
    pub const PI_BAD_FLAGS: i32 = -77;
    pub const PI_BAD_SPI_SPEED: i32 = -78;
    pub const PI_BAD_PARAM: i32 = -81;
    pub const PI_I2C_WRITE_FAILED: i32 = -82;
    pub const PI_I2C_READ_FAILED: i32 = -83;
    pub const PI_BAD_SPI_COUNT: i32 = -84;
    pub const PI_SPI_XFER_FAILED: i32 = -89;
    pub const PI_NO_AUX_SPI: i32 = -91;
    pub const PI_NOT_PWM_GPIO: i32 = -92;
    pub const PI_NOT_HPWM_GPIO: i32 = -95;
    pub const PI_BAD_HPWM_FREQ: i32 = -96;
    pub const PI_BAD_HPWM_DUTY: i32 = -97;
    pub const PI_HPWM_ILLEGAL: i32 = -98;
}

impl Error {
    /// Map a raw negative status code to the named error it stands for.
    pub(crate) fn from_code(code: i32) -> Error {
        use codes::*;
        match code {
            PI_INIT_FAILED => Error::InitFailed,
            PI_BAD_USER_GPIO => Error::BadUserGpio,
            PI_BAD_GPIO => Error::BadGpio,
            PI_BAD_MODE => Error::BadMode,
            PI_BAD_LEVEL => Error::BadLevel,
            PI_BAD_PUD => Error::BadPud,
            PI_BAD_PULSEWIDTH => Error::BadPulsewidth,
            PI_BAD_DUTYCYCLE => Error::BadDutycycle,
            PI_BAD_DUTYRANGE => Error::BadDutyRange,
            PI_NO_HANDLE => Error::NoHandle,
            PI_BAD_HANDLE => Error::BadHandle,
            PI_NOT_INITIALISED => Error::NotInitialised,
            PI_SOCK_READ_FAILED => Error::Protocol("daemon socket read failed".into()),
            PI_SOCK_WRIT_FAILED => Error::Protocol("daemon socket write failed".into()),
            PI_I2C_OPEN_FAILED => Error::I2cOpenFailed,
            PI_SPI_OPEN_FAILED => Error::SpiOpenFailed,
            PI_BAD_I2C_BUS => Error::BadI2cBus,
            PI_BAD_I2C_ADDR => Error::BadI2cAddr,
            PI_BAD_SPI_CHANNEL => Error::BadSpiChannel,
            PI_BAD_FLAGS => Error::BadFlags,
            PI_BAD_SPI_SPEED => Error::BadSpiSpeed,
            PI_BAD_PARAM => Error::BadParam,
            PI_I2C_WRITE_FAILED => Error::I2cWriteFailed,
            PI_I2C_READ_FAILED => Error::I2cReadFailed,
            PI_BAD_SPI_COUNT => Error::BadSpiCount,
            PI_SPI_XFER_FAILED => Error::SpiTransferFailed,
            PI_NO_AUX_SPI => Error::NoAuxSpi,
            PI_NOT_PWM_GPIO => Error::NotPwmGpio,
            PI_NOT_HPWM_GPIO => Error::NotHpwmGpio,
            PI_BAD_HPWM_FREQ => Error::BadHpwmFreq,
            PI_BAD_HPWM_DUTY => Error::BadHpwmDuty,
            PI_HPWM_ILLEGAL => Error::HpwmIllegal,
            other => Error::Unknown(other),
        }
    }
}

/// Normalize a raw controller status.
///
/// Negative statuses become typed errors; non-negative statuses are the
/// success value (a level, a mode, a byte count, ...).
pub(crate) fn check(status: i32) -> Result<u32> {
    if status < 0 {
        Err(Error::from_code(status))
    } else {
        Ok(status as u32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn check_passes_non_negative_values() {
        assert_eq!(check(0).unwrap(), 0);
        assert_eq!(check(42).unwrap(), 42);
    }

    #[test]
    fn check_maps_named_codes() {
        assert!(matches!(check(codes::PI_BAD_HANDLE), Err(Error::BadHandle)));
        assert!(matches!(
            check(codes::PI_SPI_XFER_FAILED),
            Err(Error::SpiTransferFailed)
        ));
        assert!(matches!(check(codes::PI_INIT_FAILED), Err(Error::InitFailed)));
    }

    #[test]
    fn check_keeps_unknown_codes_interpreted() {
        assert!(matches!(check(-9999), Err(Error::Unknown(-9999))));
    }
}
