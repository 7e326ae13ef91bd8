//! Mock daemon transport
//!
//! Decodes each request the way the daemon would and applies it to an
//! in-memory [`MockController`], so the daemon backend's parameter and
//! payload marshaling is exercised without a socket. Keep a clone of the
//! controller to programme and inspect the simulated hardware.

use crate::controller::LocalController;
use crate::daemon::{Cmd, DaemonTransport, Reply, Request};
use crate::error::{Error, Result};
use crate::mock::MockController;

pub struct MockTransport {
    ctrl: MockController,
}

impl MockTransport {
    /// Wrap a controller. The daemon side of a connection is always
    /// initialised, so the controller is initialised here.
    pub fn new(ctrl: MockController) -> MockTransport {
        let mut transport = MockTransport { ctrl };
        transport.ctrl.gpio_initialise();
        transport
    }
}

fn ext_u32(ext: &[u8]) -> Result<u32> {
    let bytes: [u8; 4] = ext
        .try_into()
        .map_err(|_| Error::Protocol(format!("expected 4 extension bytes, got {}", ext.len())))?;
    Ok(u32::from_le_bytes(bytes))
}

fn ack(status: i32) -> Reply {
    Reply {
        status,
        payload: Vec::new(),
    }
}

fn data(status: i32, payload: Vec<u8>) -> Reply {
    if status < 0 {
        ack(status)
    } else {
        Reply { status, payload }
    }
}

impl DaemonTransport for MockTransport {
    fn request(&mut self, req: Request<'_>) -> Result<Reply> {
        let Request { cmd, p1, p2, ext } = req;
        let ctrl = &mut self.ctrl;
        let reply = match cmd {
            Cmd::SetMode => ack(ctrl.gpio_set_mode(p1, p2)),
            Cmd::GetMode => ack(ctrl.gpio_get_mode(p1)),
            Cmd::SetPull => ack(ctrl.gpio_set_pull(p1, p2)),
            Cmd::GpioRead => ack(ctrl.gpio_read(p1)),
            Cmd::GpioWrite => ack(ctrl.gpio_write(p1, p2)),
            Cmd::SetPwmDuty => ack(ctrl.pwm_set_dutycycle(p1, p2)),
            Cmd::SetPwmRange => ack(ctrl.pwm_set_range(p1, p2)),
            Cmd::SetPwmFreq => ack(ctrl.pwm_set_frequency(p1, p2)),
            Cmd::ServoPulsewidth => ack(ctrl.servo_set_pulsewidth(p1, p2)),
            Cmd::GetPwmRange => ack(ctrl.pwm_get_range(p1)),
            Cmd::GetPwmFreq => ack(ctrl.pwm_get_frequency(p1)),
            Cmd::GetPwmRealRange => ack(ctrl.pwm_get_real_range(p1)),
            Cmd::GetPwmDuty => ack(ctrl.pwm_get_dutycycle(p1)),
            Cmd::GetServoPulsewidth => ack(ctrl.servo_get_pulsewidth(p1)),
            Cmd::HardwarePwm => ack(ctrl.hardware_pwm(p1, p2, ext_u32(ext)?)),
            Cmd::SpiOpen => ack(ctrl.spi_open(p1, p2, ext_u32(ext)?)),
            Cmd::SpiClose => ack(ctrl.spi_close(p1)),
            Cmd::SpiRead => {
                let mut buf = vec![0u8; p2 as usize];
                data(ctrl.spi_read(p1, &mut buf), buf)
            }
            Cmd::SpiWrite => ack(ctrl.spi_write(p1, ext)),
            Cmd::SpiXfer => {
                let mut rx = vec![0u8; ext.len()];
                data(ctrl.spi_xfer(p1, ext, &mut rx), rx)
            }
            Cmd::I2cOpen => ack(ctrl.i2c_open(p1, p2, ext_u32(ext)?)),
            Cmd::I2cClose => ack(ctrl.i2c_close(p1)),
            Cmd::I2cReadDevice => {
                let mut buf = vec![0u8; p2 as usize];
                data(ctrl.i2c_read_device(p1, &mut buf), buf)
            }
            Cmd::I2cWriteDevice => ack(ctrl.i2c_write_device(p1, ext)),
            Cmd::I2cReadByte => ack(ctrl.i2c_read_byte(p1)),
            Cmd::I2cWriteByte => ack(ctrl.i2c_write_byte(p1, p2)),
            Cmd::I2cReadByteData => ack(ctrl.i2c_read_byte_data(p1, p2)),
            Cmd::I2cWriteByteData => ack(ctrl.i2c_write_byte_data(p1, p2, ext_u32(ext)?)),
            Cmd::I2cReadWordData => ack(ctrl.i2c_read_word_data(p1, p2)),
            Cmd::I2cWriteWordData => ack(ctrl.i2c_write_word_data(p1, p2, ext_u32(ext)?)),
            Cmd::I2cReadBlockData => {
                let mut buf = vec![0u8; crate::types::I2C_MAX_BLOCK];
                let status = ctrl.i2c_read_block_data(p1, p2, &mut buf);
                if status >= 0 {
                    buf.truncate(status as usize);
                }
                data(status, buf)
            }
            Cmd::I2cWriteBlockData => ack(ctrl.i2c_write_block_data(p1, p2, ext)),
            Cmd::I2cReadI2cBlockData => {
                let count = ext_u32(ext)? as usize;
                let mut buf = vec![0u8; count];
                data(ctrl.i2c_read_i2c_block_data(p1, p2, &mut buf), buf)
            }
            Cmd::I2cWriteI2cBlockData => ack(ctrl.i2c_write_i2c_block_data(p1, p2, ext)),
        };
        Ok(reply)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_extension_arguments() {
        let ctrl = MockController::new();
        let probe = ctrl.clone();
        let mut t = MockTransport::new(ctrl);

        let duty = 250_000u32.to_le_bytes();
        let reply = t
            .request(Request::with_ext(Cmd::HardwarePwm, 18, 5000, &duty))
            .unwrap();
        assert_eq!(reply.status, 0);
        assert_eq!(probe.hardware_pwm_state(18), Some((5000, 250_000)));
    }

    #[test]
    fn spi_xfer_reply_carries_payload() {
        let ctrl = MockController::new();
        let probe = ctrl.clone();
        let mut t = MockTransport::new(ctrl);

        let open = t
            .request(Request::with_ext(Cmd::SpiOpen, 0, 50_000, &0u32.to_le_bytes()))
            .unwrap();
        assert!(open.status >= 0);
        probe.push_spi_read_data(0, &[9, 8, 7]);
        let reply = t
            .request(Request::with_ext(Cmd::SpiXfer, open.status as u32, 0, &[1, 2, 3]))
            .unwrap();
        assert_eq!(reply.status, 3);
        assert_eq!(reply.payload, vec![9, 8, 7]);
    }

    #[test]
    fn malformed_extension_is_a_protocol_error() {
        let mut t = MockTransport::new(MockController::new());
        let err = t
            .request(Request::with_ext(Cmd::HardwarePwm, 18, 5000, &[1, 2]))
            .unwrap_err();
        assert!(matches!(err, Error::Protocol(_)));
    }
}
