//! Daemon backend
//!
//! Behavioural twin of the direct backend, reached over a daemon
//! transport. Each operation becomes one request; the reply's status is
//! normalized exactly like a local controller status, so callers cannot
//! tell the backends apart by anything but latency.

use tracing::debug;

use crate::daemon::{Cmd, DaemonTransport, Reply, Request};
use crate::error::{check, Error, Result};
use crate::types::{Level, Mode, Pull};

pub(crate) struct DaemonBackend {
    transport: Box<dyn DaemonTransport>,
}

impl DaemonBackend {
    pub(crate) fn new(transport: Box<dyn DaemonTransport>) -> DaemonBackend {
        DaemonBackend { transport }
    }

    pub(crate) fn shutdown(&mut self) {
        self.transport.shutdown();
        debug!("daemon transport shut down");
    }

    /// Issue a request and normalize the reply status.
    fn call(&mut self, req: Request<'_>) -> Result<u32> {
        let reply = self.transport.request(req)?;
        check(reply.status)
    }

    /// Issue a request expected to return exactly `count` payload bytes.
    fn call_read(&mut self, req: Request<'_>, count: usize, on_short: Error) -> Result<Vec<u8>> {
        let Reply { status, payload } = self.transport.request(req)?;
        let n = check(status)? as usize;
        if n != count || payload.len() != count {
            return Err(on_short);
        }
        Ok(payload)
    }

    pub(crate) fn set_mode(&mut self, gpio: u32, mode: Mode) -> Result<()> {
        self.call(Request::new(Cmd::SetMode, gpio, mode.to_raw()))
            .map(drop)
    }

    pub(crate) fn get_mode(&mut self, gpio: u32) -> Result<Mode> {
        Mode::from_raw(self.call(Request::new(Cmd::GetMode, gpio, 0))?)
    }

    pub(crate) fn set_pull_up_down(&mut self, gpio: u32, pull: Pull) -> Result<()> {
        self.call(Request::new(Cmd::SetPull, gpio, pull.to_raw()))
            .map(drop)
    }

    pub(crate) fn read(&mut self, gpio: u32) -> Result<Level> {
        Level::from_raw(self.call(Request::new(Cmd::GpioRead, gpio, 0))?)
    }

    pub(crate) fn write(&mut self, gpio: u32, level: Level) -> Result<()> {
        self.call(Request::new(Cmd::GpioWrite, gpio, level.to_raw()))
            .map(drop)
    }

    pub(crate) fn set_pwm_dutycycle(&mut self, gpio: u32, duty: u32) -> Result<()> {
        self.call(Request::new(Cmd::SetPwmDuty, gpio, duty)).map(drop)
    }

    pub(crate) fn get_pwm_dutycycle(&mut self, gpio: u32) -> Result<u32> {
        self.call(Request::new(Cmd::GetPwmDuty, gpio, 0))
    }

    pub(crate) fn set_pwm_frequency(&mut self, gpio: u32, frequency: u32) -> Result<u32> {
        self.call(Request::new(Cmd::SetPwmFreq, gpio, frequency))
    }

    pub(crate) fn get_pwm_frequency(&mut self, gpio: u32) -> Result<u32> {
        self.call(Request::new(Cmd::GetPwmFreq, gpio, 0))
    }

    pub(crate) fn set_pwm_range(&mut self, gpio: u32, range: u32) -> Result<u32> {
        self.call(Request::new(Cmd::SetPwmRange, gpio, range))
    }

    pub(crate) fn get_pwm_range(&mut self, gpio: u32) -> Result<u32> {
        self.call(Request::new(Cmd::GetPwmRange, gpio, 0))
    }

    pub(crate) fn get_pwm_real_range(&mut self, gpio: u32) -> Result<u32> {
        self.call(Request::new(Cmd::GetPwmRealRange, gpio, 0))
    }

    pub(crate) fn hardware_pwm(&mut self, gpio: u32, frequency: u32, duty: u32) -> Result<()> {
        // The duty travels in the extension; the header only seats two
        // parameters.
        let ext = duty.to_le_bytes();
        self.call(Request::with_ext(Cmd::HardwarePwm, gpio, frequency, &ext))
            .map(drop)
    }

    pub(crate) fn set_servo_pulsewidth(&mut self, gpio: u32, pulsewidth: u32) -> Result<()> {
        self.call(Request::new(Cmd::ServoPulsewidth, gpio, pulsewidth))
            .map(drop)
    }

    pub(crate) fn get_servo_pulsewidth(&mut self, gpio: u32) -> Result<u32> {
        self.call(Request::new(Cmd::GetServoPulsewidth, gpio, 0))
    }

    pub(crate) fn spi_open(&mut self, channel: u32, baud: u32, flags: u32) -> Result<u32> {
        let ext = flags.to_le_bytes();
        self.call(Request::with_ext(Cmd::SpiOpen, channel, baud, &ext))
    }

    pub(crate) fn spi_close(&mut self, handle: u32) -> Result<()> {
        self.call(Request::new(Cmd::SpiClose, handle, 0)).map(drop)
    }

    pub(crate) fn spi_read(&mut self, handle: u32, count: usize) -> Result<Vec<u8>> {
        self.call_read(
            Request::new(Cmd::SpiRead, handle, count as u32),
            count,
            Error::SpiTransferFailed,
        )
    }

    pub(crate) fn spi_write(&mut self, handle: u32, data: &[u8]) -> Result<()> {
        // The daemon reports the transferred byte count in the status.
        let n = self.call(Request::with_ext(Cmd::SpiWrite, handle, 0, data))?;
        if n as usize != data.len() {
            return Err(Error::SpiTransferFailed);
        }
        Ok(())
    }

    pub(crate) fn spi_xfer(&mut self, handle: u32, tx: &[u8]) -> Result<Vec<u8>> {
        self.call_read(
            Request::with_ext(Cmd::SpiXfer, handle, 0, tx),
            tx.len(),
            Error::SpiTransferFailed,
        )
    }

    pub(crate) fn i2c_open(&mut self, bus: u32, addr: u32, flags: u32) -> Result<u32> {
        let ext = flags.to_le_bytes();
        self.call(Request::with_ext(Cmd::I2cOpen, bus, addr, &ext))
    }

    pub(crate) fn i2c_close(&mut self, handle: u32) -> Result<()> {
        self.call(Request::new(Cmd::I2cClose, handle, 0)).map(drop)
    }

    pub(crate) fn i2c_read_device(&mut self, handle: u32, count: usize) -> Result<Vec<u8>> {
        self.call_read(
            Request::new(Cmd::I2cReadDevice, handle, count as u32),
            count,
            Error::I2cReadFailed,
        )
    }

    pub(crate) fn i2c_write_device(&mut self, handle: u32, data: &[u8]) -> Result<()> {
        self.call(Request::with_ext(Cmd::I2cWriteDevice, handle, 0, data))
            .map(drop)
    }

    pub(crate) fn i2c_read_byte(&mut self, handle: u32) -> Result<u8> {
        Ok(self.call(Request::new(Cmd::I2cReadByte, handle, 0))? as u8)
    }

    pub(crate) fn i2c_write_byte(&mut self, handle: u32, value: u8) -> Result<()> {
        self.call(Request::new(Cmd::I2cWriteByte, handle, value as u32))
            .map(drop)
    }

    pub(crate) fn i2c_read_byte_data(&mut self, handle: u32, reg: u32) -> Result<u8> {
        Ok(self.call(Request::new(Cmd::I2cReadByteData, handle, reg))? as u8)
    }

    pub(crate) fn i2c_write_byte_data(&mut self, handle: u32, reg: u32, value: u8) -> Result<()> {
        let ext = (value as u32).to_le_bytes();
        self.call(Request::with_ext(Cmd::I2cWriteByteData, handle, reg, &ext))
            .map(drop)
    }

    pub(crate) fn i2c_read_word_data(&mut self, handle: u32, reg: u32) -> Result<u16> {
        Ok(self.call(Request::new(Cmd::I2cReadWordData, handle, reg))? as u16)
    }

    pub(crate) fn i2c_write_word_data(&mut self, handle: u32, reg: u32, value: u16) -> Result<()> {
        let ext = (value as u32).to_le_bytes();
        self.call(Request::with_ext(Cmd::I2cWriteWordData, handle, reg, &ext))
            .map(drop)
    }

    pub(crate) fn i2c_read_block_data(&mut self, handle: u32, reg: u32) -> Result<Vec<u8>> {
        // The device decides the length, so a short payload is legal here;
        // the reply just has to be self-consistent.
        let Reply { status, payload } = self
            .transport
            .request(Request::new(Cmd::I2cReadBlockData, handle, reg))?;
        let n = check(status)? as usize;
        if n > crate::types::I2C_MAX_BLOCK || payload.len() != n {
            return Err(Error::I2cReadFailed);
        }
        Ok(payload)
    }

    pub(crate) fn i2c_write_block_data(&mut self, handle: u32, reg: u32, data: &[u8]) -> Result<()> {
        self.call(Request::with_ext(Cmd::I2cWriteBlockData, handle, reg, data))
            .map(drop)
    }

    pub(crate) fn i2c_read_i2c_block_data(
        &mut self,
        handle: u32,
        reg: u32,
        count: usize,
    ) -> Result<Vec<u8>> {
        let ext = (count as u32).to_le_bytes();
        self.call_read(
            Request::with_ext(Cmd::I2cReadI2cBlockData, handle, reg, &ext),
            count,
            Error::I2cReadFailed,
        )
    }

    pub(crate) fn i2c_write_i2c_block_data(
        &mut self,
        handle: u32,
        reg: u32,
        data: &[u8],
    ) -> Result<()> {
        self.call(Request::with_ext(Cmd::I2cWriteI2cBlockData, handle, reg, data))
            .map(drop)
    }
}
