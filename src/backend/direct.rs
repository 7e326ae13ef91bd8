//! Direct backend
//!
//! Executes operations against the local peripheral controller, in
//! process. All the work here is marshaling: typed arguments down to the
//! controller's raw call shapes, raw statuses up into typed results.

use tracing::{debug, warn};

use crate::controller::LocalController;
use crate::error::{check, Error, Result};
use crate::types::{Level, Mode, Pull};

pub(crate) struct DirectBackend {
    controller: Box<dyn LocalController>,
}

impl DirectBackend {
    /// Initialise the controller. A negative initialise status maps to
    /// [`Error::InitFailed`] and the backend is not constructed.
    pub(crate) fn new(mut controller: Box<dyn LocalController>) -> Result<DirectBackend> {
        let status = controller.gpio_initialise();
        if status < 0 {
            warn!(status, "controller initialisation failed");
            return Err(Error::InitFailed);
        }
        debug!("local controller initialised");
        Ok(DirectBackend { controller })
    }

    pub(crate) fn shutdown(&mut self) {
        self.controller.gpio_terminate();
        debug!("local controller terminated");
    }

    pub(crate) fn set_mode(&mut self, gpio: u32, mode: Mode) -> Result<()> {
        check(self.controller.gpio_set_mode(gpio, mode.to_raw())).map(drop)
    }

    pub(crate) fn get_mode(&mut self, gpio: u32) -> Result<Mode> {
        Mode::from_raw(check(self.controller.gpio_get_mode(gpio))?)
    }

    pub(crate) fn set_pull_up_down(&mut self, gpio: u32, pull: Pull) -> Result<()> {
        check(self.controller.gpio_set_pull(gpio, pull.to_raw())).map(drop)
    }

    pub(crate) fn read(&mut self, gpio: u32) -> Result<Level> {
        Level::from_raw(check(self.controller.gpio_read(gpio))?)
    }

    pub(crate) fn write(&mut self, gpio: u32, level: Level) -> Result<()> {
        check(self.controller.gpio_write(gpio, level.to_raw())).map(drop)
    }

    pub(crate) fn set_pwm_dutycycle(&mut self, gpio: u32, duty: u32) -> Result<()> {
        check(self.controller.pwm_set_dutycycle(gpio, duty)).map(drop)
    }

    pub(crate) fn get_pwm_dutycycle(&mut self, gpio: u32) -> Result<u32> {
        check(self.controller.pwm_get_dutycycle(gpio))
    }

    pub(crate) fn set_pwm_frequency(&mut self, gpio: u32, frequency: u32) -> Result<u32> {
        check(self.controller.pwm_set_frequency(gpio, frequency))
    }

    pub(crate) fn get_pwm_frequency(&mut self, gpio: u32) -> Result<u32> {
        check(self.controller.pwm_get_frequency(gpio))
    }

    pub(crate) fn set_pwm_range(&mut self, gpio: u32, range: u32) -> Result<u32> {
        check(self.controller.pwm_set_range(gpio, range))
    }

    pub(crate) fn get_pwm_range(&mut self, gpio: u32) -> Result<u32> {
        check(self.controller.pwm_get_range(gpio))
    }

    pub(crate) fn get_pwm_real_range(&mut self, gpio: u32) -> Result<u32> {
        check(self.controller.pwm_get_real_range(gpio))
    }

    pub(crate) fn hardware_pwm(&mut self, gpio: u32, frequency: u32, duty: u32) -> Result<()> {
        check(self.controller.hardware_pwm(gpio, frequency, duty)).map(drop)
    }

    pub(crate) fn set_servo_pulsewidth(&mut self, gpio: u32, pulsewidth: u32) -> Result<()> {
        check(self.controller.servo_set_pulsewidth(gpio, pulsewidth)).map(drop)
    }

    pub(crate) fn get_servo_pulsewidth(&mut self, gpio: u32) -> Result<u32> {
        check(self.controller.servo_get_pulsewidth(gpio))
    }

    pub(crate) fn spi_open(&mut self, channel: u32, baud: u32, flags: u32) -> Result<u32> {
        check(self.controller.spi_open(channel, baud, flags))
    }

    pub(crate) fn spi_close(&mut self, handle: u32) -> Result<()> {
        check(self.controller.spi_close(handle)).map(drop)
    }

    pub(crate) fn spi_read(&mut self, handle: u32, count: usize) -> Result<Vec<u8>> {
        let mut buf = vec![0u8; count];
        let n = check(self.controller.spi_read(handle, &mut buf))? as usize;
        if n != count {
            return Err(Error::SpiTransferFailed);
        }
        Ok(buf)
    }

    pub(crate) fn spi_write(&mut self, handle: u32, data: &[u8]) -> Result<()> {
        let n = check(self.controller.spi_write(handle, data))? as usize;
        if n != data.len() {
            return Err(Error::SpiTransferFailed);
        }
        Ok(())
    }

    pub(crate) fn spi_xfer(&mut self, handle: u32, tx: &[u8]) -> Result<Vec<u8>> {
        let mut rx = vec![0u8; tx.len()];
        let n = check(self.controller.spi_xfer(handle, tx, &mut rx))? as usize;
        if n != tx.len() {
            return Err(Error::SpiTransferFailed);
        }
        Ok(rx)
    }

    pub(crate) fn i2c_open(&mut self, bus: u32, addr: u32, flags: u32) -> Result<u32> {
        check(self.controller.i2c_open(bus, addr, flags))
    }

    pub(crate) fn i2c_close(&mut self, handle: u32) -> Result<()> {
        check(self.controller.i2c_close(handle)).map(drop)
    }

    pub(crate) fn i2c_read_device(&mut self, handle: u32, count: usize) -> Result<Vec<u8>> {
        let mut buf = vec![0u8; count];
        let n = check(self.controller.i2c_read_device(handle, &mut buf))? as usize;
        if n != count {
            return Err(Error::I2cReadFailed);
        }
        Ok(buf)
    }

    pub(crate) fn i2c_write_device(&mut self, handle: u32, data: &[u8]) -> Result<()> {
        let n = check(self.controller.i2c_write_device(handle, data))? as usize;
        if n != data.len() {
            return Err(Error::I2cWriteFailed);
        }
        Ok(())
    }

    pub(crate) fn i2c_read_byte(&mut self, handle: u32) -> Result<u8> {
        Ok(check(self.controller.i2c_read_byte(handle))? as u8)
    }

    pub(crate) fn i2c_write_byte(&mut self, handle: u32, value: u8) -> Result<()> {
        check(self.controller.i2c_write_byte(handle, value as u32)).map(drop)
    }

    pub(crate) fn i2c_read_byte_data(&mut self, handle: u32, reg: u32) -> Result<u8> {
        Ok(check(self.controller.i2c_read_byte_data(handle, reg))? as u8)
    }

    pub(crate) fn i2c_write_byte_data(&mut self, handle: u32, reg: u32, value: u8) -> Result<()> {
        check(self.controller.i2c_write_byte_data(handle, reg, value as u32)).map(drop)
    }

    pub(crate) fn i2c_read_word_data(&mut self, handle: u32, reg: u32) -> Result<u16> {
        Ok(check(self.controller.i2c_read_word_data(handle, reg))? as u16)
    }

    pub(crate) fn i2c_write_word_data(&mut self, handle: u32, reg: u32, value: u16) -> Result<()> {
        check(self.controller.i2c_write_word_data(handle, reg, value as u32)).map(drop)
    }

    pub(crate) fn i2c_read_block_data(&mut self, handle: u32, reg: u32) -> Result<Vec<u8>> {
        let mut buf = vec![0u8; crate::types::I2C_MAX_BLOCK];
        let n = check(self.controller.i2c_read_block_data(handle, reg, &mut buf))? as usize;
        if n > buf.len() {
            return Err(Error::I2cReadFailed);
        }
        buf.truncate(n);
        Ok(buf)
    }

    pub(crate) fn i2c_write_block_data(&mut self, handle: u32, reg: u32, data: &[u8]) -> Result<()> {
        check(self.controller.i2c_write_block_data(handle, reg, data)).map(drop)
    }

    pub(crate) fn i2c_read_i2c_block_data(
        &mut self,
        handle: u32,
        reg: u32,
        count: usize,
    ) -> Result<Vec<u8>> {
        let mut buf = vec![0u8; count];
        let n = check(self.controller.i2c_read_i2c_block_data(handle, reg, &mut buf))? as usize;
        if n != count {
            return Err(Error::I2cReadFailed);
        }
        Ok(buf)
    }

    pub(crate) fn i2c_write_i2c_block_data(
        &mut self,
        handle: u32,
        reg: u32,
        data: &[u8],
    ) -> Result<()> {
        check(self.controller.i2c_write_i2c_block_data(handle, reg, data)).map(drop)
    }
}
