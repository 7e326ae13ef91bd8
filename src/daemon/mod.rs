//! Daemon transport interface
//!
//! The daemon backend turns every logical operation into one synchronous
//! request/response exchange with a remote controller process. This module
//! defines that exchange: a [`Request`] carries a command with two `u32`
//! parameters plus an extension byte buffer (third numeric arguments and
//! outgoing data travel in the extension), and a [`Reply`] is strictly a
//! status code with an optional byte payload. Anything below that — socket
//! framing, retries at the wire level — belongs to the transport
//! implementation.

pub mod tcp;

use crate::error::Result;

pub use tcp::TcpTransport;

/// Command identifiers of the daemon socket protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum Cmd {
    SetMode = 0,
    GetMode = 1,
    SetPull = 2,
    GpioRead = 3,
    GpioWrite = 4,
    SetPwmDuty = 5,
    SetPwmRange = 6,
    SetPwmFreq = 7,
    ServoPulsewidth = 8,
    GetPwmRange = 22,
    GetPwmFreq = 23,
    GetPwmRealRange = 24,
    I2cOpen = 54,
    I2cClose = 55,
    I2cReadDevice = 56,
    I2cWriteDevice = 57,
    I2cReadByte = 59,
    I2cWriteByte = 60,
    I2cReadByteData = 61,
    I2cWriteByteData = 62,
    I2cReadWordData = 63,
    I2cWriteWordData = 64,
    I2cReadBlockData = 65,
    I2cWriteBlockData = 66,
    I2cReadI2cBlockData = 67,
    I2cWriteI2cBlockData = 68,
    SpiOpen = 71,
    SpiClose = 72,
    SpiRead = 73,
    SpiWrite = 74,
    SpiXfer = 75,
    GetPwmDuty = 83,
    GetServoPulsewidth = 84,
    HardwarePwm = 86,
}

impl Cmd {
    /// Whether a successful reply carries `status` payload bytes after the
    /// header.
    pub fn carries_payload(self) -> bool {
        matches!(
            self,
            Cmd::I2cReadDevice
                | Cmd::I2cReadBlockData
                | Cmd::I2cReadI2cBlockData
                | Cmd::SpiRead
                | Cmd::SpiXfer
        )
    }
}

/// One daemon request.
#[derive(Debug)]
pub struct Request<'a> {
    pub cmd: Cmd,
    pub p1: u32,
    pub p2: u32,
    /// Extension bytes. The wire header's third word is this length.
    pub ext: &'a [u8],
}

impl<'a> Request<'a> {
    pub fn new(cmd: Cmd, p1: u32, p2: u32) -> Request<'a> {
        Request {
            cmd,
            p1,
            p2,
            ext: &[],
        }
    }

    pub fn with_ext(cmd: Cmd, p1: u32, p2: u32, ext: &'a [u8]) -> Request<'a> {
        Request { cmd, p1, p2, ext }
    }
}

/// One daemon reply: a status code and, for data-bearing commands, a
/// payload of `status` bytes.
#[derive(Debug)]
pub struct Reply {
    pub status: i32,
    pub payload: Vec<u8>,
}

/// A synchronous connection to a remote controller daemon.
///
/// One logical operation maps to one `request` call. Implementations may
/// block on I/O; they never retry a failed exchange.
pub trait DaemonTransport: Send {
    /// Issue one request and wait for its reply.
    fn request(&mut self, req: Request<'_>) -> Result<Reply>;

    /// Tear down the connection. Called once, at session end.
    fn shutdown(&mut self) {}
}
