//! Backend dispatch
//!
//! The two transports are a tagged variant rather than a trait object:
//! the backend is chosen once, at session construction, and each variant
//! carries exactly the state its transport needs.

pub(crate) mod daemon;
pub(crate) mod direct;

use crate::error::Result;
use crate::types::{Level, Mode, Pull};

pub(crate) use daemon::DaemonBackend;
pub(crate) use direct::DirectBackend;

pub(crate) enum Backend {
    Direct(DirectBackend),
    Daemon(DaemonBackend),
}

/// Forward one call to whichever variant is live.
macro_rules! dispatch {
    ($self:ident, $b:ident => $call:expr) => {
        match $self {
            Backend::Direct($b) => $call,
            Backend::Daemon($b) => $call,
        }
    };
}

impl Backend {
    pub(crate) fn is_daemon(&self) -> bool {
        matches!(self, Backend::Daemon(_))
    }

    pub(crate) fn shutdown(&mut self) {
        dispatch!(self, b => b.shutdown())
    }

    pub(crate) fn set_mode(&mut self, gpio: u32, mode: Mode) -> Result<()> {
        dispatch!(self, b => b.set_mode(gpio, mode))
    }

    pub(crate) fn get_mode(&mut self, gpio: u32) -> Result<Mode> {
        dispatch!(self, b => b.get_mode(gpio))
    }

    pub(crate) fn set_pull_up_down(&mut self, gpio: u32, pull: Pull) -> Result<()> {
        dispatch!(self, b => b.set_pull_up_down(gpio, pull))
    }

    pub(crate) fn read(&mut self, gpio: u32) -> Result<Level> {
        dispatch!(self, b => b.read(gpio))
    }

    pub(crate) fn write(&mut self, gpio: u32, level: Level) -> Result<()> {
        dispatch!(self, b => b.write(gpio, level))
    }

    pub(crate) fn set_pwm_dutycycle(&mut self, gpio: u32, duty: u32) -> Result<()> {
        dispatch!(self, b => b.set_pwm_dutycycle(gpio, duty))
    }

    pub(crate) fn get_pwm_dutycycle(&mut self, gpio: u32) -> Result<u32> {
        dispatch!(self, b => b.get_pwm_dutycycle(gpio))
    }

    pub(crate) fn set_pwm_frequency(&mut self, gpio: u32, frequency: u32) -> Result<u32> {
        dispatch!(self, b => b.set_pwm_frequency(gpio, frequency))
    }

    pub(crate) fn get_pwm_frequency(&mut self, gpio: u32) -> Result<u32> {
        dispatch!(self, b => b.get_pwm_frequency(gpio))
    }

    pub(crate) fn set_pwm_range(&mut self, gpio: u32, range: u32) -> Result<u32> {
        dispatch!(self, b => b.set_pwm_range(gpio, range))
    }

    pub(crate) fn get_pwm_range(&mut self, gpio: u32) -> Result<u32> {
        dispatch!(self, b => b.get_pwm_range(gpio))
    }

    pub(crate) fn get_pwm_real_range(&mut self, gpio: u32) -> Result<u32> {
        dispatch!(self, b => b.get_pwm_real_range(gpio))
    }

    pub(crate) fn hardware_pwm(&mut self, gpio: u32, frequency: u32, duty: u32) -> Result<()> {
        dispatch!(self, b => b.hardware_pwm(gpio, frequency, duty))
    }

    pub(crate) fn set_servo_pulsewidth(&mut self, gpio: u32, pulsewidth: u32) -> Result<()> {
        dispatch!(self, b => b.set_servo_pulsewidth(gpio, pulsewidth))
    }

    pub(crate) fn get_servo_pulsewidth(&mut self, gpio: u32) -> Result<u32> {
        dispatch!(self, b => b.get_servo_pulsewidth(gpio))
    }

    pub(crate) fn spi_open(&mut self, channel: u32, baud: u32, flags: u32) -> Result<u32> {
        dispatch!(self, b => b.spi_open(channel, baud, flags))
    }

    pub(crate) fn spi_close(&mut self, handle: u32) -> Result<()> {
        dispatch!(self, b => b.spi_close(handle))
    }

    pub(crate) fn spi_read(&mut self, handle: u32, count: usize) -> Result<Vec<u8>> {
        dispatch!(self, b => b.spi_read(handle, count))
    }

    pub(crate) fn spi_write(&mut self, handle: u32, data: &[u8]) -> Result<()> {
        dispatch!(self, b => b.spi_write(handle, data))
    }

    pub(crate) fn spi_xfer(&mut self, handle: u32, tx: &[u8]) -> Result<Vec<u8>> {
        dispatch!(self, b => b.spi_xfer(handle, tx))
    }

    pub(crate) fn i2c_open(&mut self, bus: u32, addr: u32, flags: u32) -> Result<u32> {
        dispatch!(self, b => b.i2c_open(bus, addr, flags))
    }

    pub(crate) fn i2c_close(&mut self, handle: u32) -> Result<()> {
        dispatch!(self, b => b.i2c_close(handle))
    }

    pub(crate) fn i2c_read_device(&mut self, handle: u32, count: usize) -> Result<Vec<u8>> {
        dispatch!(self, b => b.i2c_read_device(handle, count))
    }

    pub(crate) fn i2c_write_device(&mut self, handle: u32, data: &[u8]) -> Result<()> {
        dispatch!(self, b => b.i2c_write_device(handle, data))
    }

    pub(crate) fn i2c_read_byte(&mut self, handle: u32) -> Result<u8> {
        dispatch!(self, b => b.i2c_read_byte(handle))
    }

    pub(crate) fn i2c_write_byte(&mut self, handle: u32, value: u8) -> Result<()> {
        dispatch!(self, b => b.i2c_write_byte(handle, value))
    }

    pub(crate) fn i2c_read_byte_data(&mut self, handle: u32, reg: u32) -> Result<u8> {
        dispatch!(self, b => b.i2c_read_byte_data(handle, reg))
    }

    pub(crate) fn i2c_write_byte_data(&mut self, handle: u32, reg: u32, value: u8) -> Result<()> {
        dispatch!(self, b => b.i2c_write_byte_data(handle, reg, value))
    }

    pub(crate) fn i2c_read_word_data(&mut self, handle: u32, reg: u32) -> Result<u16> {
        dispatch!(self, b => b.i2c_read_word_data(handle, reg))
    }

    pub(crate) fn i2c_write_word_data(&mut self, handle: u32, reg: u32, value: u16) -> Result<()> {
        dispatch!(self, b => b.i2c_write_word_data(handle, reg, value))
    }

    pub(crate) fn i2c_read_block_data(&mut self, handle: u32, reg: u32) -> Result<Vec<u8>> {
        dispatch!(self, b => b.i2c_read_block_data(handle, reg))
    }

    pub(crate) fn i2c_write_block_data(&mut self, handle: u32, reg: u32, data: &[u8]) -> Result<()> {
        dispatch!(self, b => b.i2c_write_block_data(handle, reg, data))
    }

    pub(crate) fn i2c_read_i2c_block_data(
        &mut self,
        handle: u32,
        reg: u32,
        count: usize,
    ) -> Result<Vec<u8>> {
        dispatch!(self, b => b.i2c_read_i2c_block_data(handle, reg, count))
    }

    pub(crate) fn i2c_write_i2c_block_data(
        &mut self,
        handle: u32,
        reg: u32,
        data: &[u8],
    ) -> Result<()> {
        dispatch!(self, b => b.i2c_write_i2c_block_data(handle, reg, data))
    }
}
