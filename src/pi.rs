//! Unified peripheral façade
//!
//! [`Pi`] is the caller-facing surface. It binds to one backend at
//! construction, validates pins, handles, and numeric ranges before
//! anything reaches a transport, and owns the handle registries that keep
//! SPI/I2C resources scoped to the session that opened them.

use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::backend::{Backend, DaemonBackend, DirectBackend};
use crate::controller::LocalController;
use crate::daemon::{DaemonTransport, TcpTransport};
use crate::error::{Error, Result};
use crate::registry::{Handle, HandleRegistry};
use crate::types::*;

/// Daemon connection settings.
///
/// Empty address/port fields fall back to the `PIGPIO_ADDR`/`PIGPIO_PORT`
/// environment variables, then to `localhost:8888`. The timeout, when
/// set, bounds connect and every request on the socket.
#[derive(Debug, Clone, Default)]
pub struct DaemonConfig {
    pub address: String,
    pub port: String,
    pub timeout: Option<Duration>,
}

/// SPI resource record: the backend-native handle plus the open
/// parameters, kept for diagnostics.
struct SpiDevice {
    raw: u32,
    channel: u32,
}

/// I2C resource record.
struct I2cDevice {
    raw: u32,
    bus: u32,
    addr: u32,
}

struct Inner {
    backend: Backend,
    open: bool,
    spi: HandleRegistry<SpiDevice>,
    i2c: HandleRegistry<I2cDevice>,
}

/// Handle to the peripheral controller, direct or daemon.
///
/// All operations are synchronous and blocking. `Pi` is `Send + Sync`;
/// concurrent callers are serialized internally, so operations on
/// distinct pins or handles never corrupt each other. Call ordering on a
/// *single* handle remains the caller's contract.
///
/// Dropping a `Pi` shuts the session down; [`Pi::disconnect`] does the
/// same explicitly and is idempotent.
pub struct Pi {
    inner: Mutex<Inner>,
}

impl Pi {
    /// Bind to an in-process controller, initialising it.
    pub fn direct(controller: Box<dyn LocalController>) -> Result<Pi> {
        let backend = Backend::Direct(DirectBackend::new(controller)?);
        info!("session open (direct backend)");
        Ok(Pi::bind(backend))
    }

    /// Connect to a remote daemon.
    pub fn connect(config: DaemonConfig) -> Result<Pi> {
        let transport = TcpTransport::connect(&config.address, &config.port, config.timeout)?;
        info!(address = %config.address, port = %config.port, "session open (daemon backend)");
        Ok(Pi::bind(Backend::Daemon(DaemonBackend::new(Box::new(transport)))))
    }

    /// Bind to an already-established daemon transport.
    pub fn with_transport(transport: Box<dyn DaemonTransport>) -> Pi {
        Pi::bind(Backend::Daemon(DaemonBackend::new(transport)))
    }

    fn bind(backend: Backend) -> Pi {
        Pi {
            inner: Mutex::new(Inner {
                backend,
                open: true,
                spi: HandleRegistry::new(),
                i2c: HandleRegistry::new(),
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// End the session.
    ///
    /// Invalidates every handle opened through this `Pi`, closing the
    /// underlying resources best-effort, then releases the backend.
    /// Calling it again is a no-op.
    pub fn disconnect(&self) -> Result<()> {
        let mut inner = self.lock();
        if !inner.open {
            return Ok(());
        }
        inner.open = false;
        let spi = inner.spi.drain();
        let i2c = inner.i2c.drain();
        for dev in spi {
            if let Err(e) = inner.backend.spi_close(dev.raw) {
                warn!(channel = dev.channel, error = %e, "SPI close failed during disconnect");
            }
        }
        for dev in i2c {
            if let Err(e) = inner.backend.i2c_close(dev.raw) {
                warn!(bus = dev.bus, addr = dev.addr, error = %e, "I2C close failed during disconnect");
            }
        }
        inner.backend.shutdown();
        info!("session closed");
        Ok(())
    }
}

impl Drop for Pi {
    fn drop(&mut self) {
        let _ = self.disconnect();
    }
}

impl Inner {
    fn ensure_open(&self) -> Result<()> {
        if self.open {
            Ok(())
        } else if self.backend.is_daemon() {
            Err(Error::NotConnected)
        } else {
            Err(Error::NotInitialised)
        }
    }
}

fn check_gpio(gpio: u32) -> Result<()> {
    if gpio > MAX_GPIO {
        return Err(Error::BadGpio);
    }
    Ok(())
}

fn check_user_gpio(gpio: u32) -> Result<()> {
    if gpio > MAX_USER_GPIO {
        return Err(Error::BadUserGpio);
    }
    Ok(())
}

fn check_block_len(len: usize) -> Result<()> {
    if len == 0 || len > I2C_MAX_BLOCK {
        return Err(Error::BadParam);
    }
    Ok(())
}

fn check_spi_count(count: usize) -> Result<()> {
    if count == 0 || count > SPI_MAX_TRANSFER {
        return Err(Error::BadSpiCount);
    }
    Ok(())
}

// Pin operations
impl Pi {
    /// Set the mode of a GPIO pin.
    pub fn set_mode(&self, gpio: u32, mode: Mode) -> Result<()> {
        check_gpio(gpio)?;
        let mut inner = self.lock();
        inner.ensure_open()?;
        inner.backend.set_mode(gpio, mode)
    }

    /// Read back the mode of a GPIO pin.
    pub fn get_mode(&self, gpio: u32) -> Result<Mode> {
        check_gpio(gpio)?;
        let mut inner = self.lock();
        inner.ensure_open()?;
        inner.backend.get_mode(gpio)
    }

    /// Set or clear the pull-up/down resistor on a pin.
    pub fn set_pull_up_down(&self, gpio: u32, pull: Pull) -> Result<()> {
        check_gpio(gpio)?;
        let mut inner = self.lock();
        inner.ensure_open()?;
        inner.backend.set_pull_up_down(gpio, pull)
    }

    /// Read the level of a pin.
    pub fn read(&self, gpio: u32) -> Result<Level> {
        check_gpio(gpio)?;
        let mut inner = self.lock();
        inner.ensure_open()?;
        inner.backend.read(gpio)
    }

    /// Drive a pin high or low.
    pub fn write(&self, gpio: u32, level: Level) -> Result<()> {
        check_gpio(gpio)?;
        let mut inner = self.lock();
        inner.ensure_open()?;
        inner.backend.write(gpio, level)
    }

    /// Invert the pin's level; returns the level written. The read and
    /// write happen under one lock, so concurrent toggles never lose an
    /// inversion.
    pub fn toggle(&self, gpio: u32) -> Result<Level> {
        check_gpio(gpio)?;
        let mut inner = self.lock();
        inner.ensure_open()?;
        let level = match inner.backend.read(gpio)? {
            Level::Low => Level::High,
            Level::High => Level::Low,
        };
        inner.backend.write(gpio, level)?;
        Ok(level)
    }
}

// PWM and servo operations
impl Pi {
    /// Start (non-zero duty) or stop software PWM on a user GPIO. The
    /// duty is measured against the pin's configured range.
    pub fn set_pwm_dutycycle(&self, gpio: u32, duty: u32) -> Result<()> {
        check_user_gpio(gpio)?;
        if duty > PWM_MAX_RANGE {
            return Err(Error::BadDutycycle);
        }
        let mut inner = self.lock();
        inner.ensure_open()?;
        inner.backend.set_pwm_dutycycle(gpio, duty)
    }

    /// Duty cycle currently set on the pin.
    pub fn get_pwm_dutycycle(&self, gpio: u32) -> Result<u32> {
        check_user_gpio(gpio)?;
        let mut inner = self.lock();
        inner.ensure_open()?;
        inner.backend.get_pwm_dutycycle(gpio)
    }

    /// Request a PWM frequency; returns the frequency actually selected.
    /// Leaves the duty cycle and range alone.
    pub fn set_pwm_frequency(&self, gpio: u32, frequency: u32) -> Result<u32> {
        check_user_gpio(gpio)?;
        let mut inner = self.lock();
        inner.ensure_open()?;
        inner.backend.set_pwm_frequency(gpio, frequency)
    }

    pub fn get_pwm_frequency(&self, gpio: u32) -> Result<u32> {
        check_user_gpio(gpio)?;
        let mut inner = self.lock();
        inner.ensure_open()?;
        inner.backend.get_pwm_frequency(gpio)
    }

    /// Set the duty cycle range (25-40000); returns the real underlying
    /// range. The current duty is re-scaled against the new range by the
    /// controller on both backends.
    pub fn set_pwm_range(&self, gpio: u32, range: u32) -> Result<u32> {
        check_user_gpio(gpio)?;
        if !(PWM_MIN_RANGE..=PWM_MAX_RANGE).contains(&range) {
            return Err(Error::BadDutyRange);
        }
        let mut inner = self.lock();
        inner.ensure_open()?;
        inner.backend.set_pwm_range(gpio, range)
    }

    pub fn get_pwm_range(&self, gpio: u32) -> Result<u32> {
        check_user_gpio(gpio)?;
        let mut inner = self.lock();
        inner.ensure_open()?;
        inner.backend.get_pwm_range(gpio)
    }

    /// Real resolution behind the configured range at the current
    /// frequency.
    pub fn get_pwm_real_range(&self, gpio: u32) -> Result<u32> {
        check_user_gpio(gpio)?;
        let mut inner = self.lock();
        inner.ensure_open()?;
        inner.backend.get_pwm_real_range(gpio)
    }

    /// Start hardware PWM on a capable pin: frequency in Hz (0 stops),
    /// duty in millionths (0-1000000).
    pub fn hardware_pwm(&self, gpio: u32, frequency: u32, duty: u32) -> Result<()> {
        check_gpio(gpio)?;
        if frequency > HW_PWM_MAX_FREQ {
            return Err(Error::BadHpwmFreq);
        }
        if duty > HW_PWM_RANGE {
            return Err(Error::BadHpwmDuty);
        }
        let mut inner = self.lock();
        inner.ensure_open()?;
        inner.backend.hardware_pwm(gpio, frequency, duty)
    }

    /// Start (500-2500 µs) or stop (0) servo pulses on a user GPIO.
    pub fn set_servo_pulsewidth(&self, gpio: u32, pulsewidth: u32) -> Result<()> {
        check_user_gpio(gpio)?;
        if pulsewidth != 0
            && !(SERVO_MIN_PULSEWIDTH..=SERVO_MAX_PULSEWIDTH).contains(&pulsewidth)
        {
            return Err(Error::BadPulsewidth);
        }
        let mut inner = self.lock();
        inner.ensure_open()?;
        inner.backend.set_servo_pulsewidth(gpio, pulsewidth)
    }

    pub fn get_servo_pulsewidth(&self, gpio: u32) -> Result<u32> {
        check_user_gpio(gpio)?;
        let mut inner = self.lock();
        inner.ensure_open()?;
        inner.backend.get_servo_pulsewidth(gpio)
    }
}

// SPI operations
impl Pi {
    /// Open an SPI channel at the given baud rate.
    pub fn spi_open(&self, channel: u32, baud: u32, flags: u32) -> Result<Handle> {
        if channel > SPI_MAX_CHANNEL {
            return Err(Error::BadSpiChannel);
        }
        if !(SPI_MIN_BAUD..=SPI_MAX_BAUD).contains(&baud) {
            return Err(Error::BadSpiSpeed);
        }
        if flags & !SPI_FLAGS_MASK != 0 {
            return Err(Error::BadFlags);
        }
        let mut inner = self.lock();
        inner.ensure_open()?;
        let raw = inner.backend.spi_open(channel, baud, flags)?;
        let handle = inner.spi.insert(SpiDevice { raw, channel })?;
        debug!(channel, baud, %handle, "SPI open");
        Ok(handle)
    }

    /// Close an SPI handle. The handle is invalid afterwards.
    pub fn spi_close(&self, handle: Handle) -> Result<()> {
        let mut inner = self.lock();
        inner.ensure_open()?;
        let raw = inner.spi.get(handle)?.raw;
        inner.backend.spi_close(raw)?;
        inner.spi.remove(handle)?;
        debug!(%handle, "SPI close");
        Ok(())
    }

    /// Read exactly `count` bytes from the device.
    pub fn spi_read(&self, handle: Handle, count: usize) -> Result<Vec<u8>> {
        check_spi_count(count)?;
        let mut inner = self.lock();
        inner.ensure_open()?;
        let raw = inner.spi.get(handle)?.raw;
        inner.backend.spi_read(raw, count)
    }

    /// Write the whole buffer to the device.
    pub fn spi_write(&self, handle: Handle, data: &[u8]) -> Result<()> {
        check_spi_count(data.len())?;
        let mut inner = self.lock();
        inner.ensure_open()?;
        let raw = inner.spi.get(handle)?.raw;
        inner.backend.spi_write(raw, data)
    }

    /// Full-duplex transfer. The returned buffer has exactly `tx.len()`
    /// bytes.
    pub fn spi_xfer(&self, handle: Handle, tx: &[u8]) -> Result<Vec<u8>> {
        check_spi_count(tx.len())?;
        let mut inner = self.lock();
        inner.ensure_open()?;
        let raw = inner.spi.get(handle)?.raw;
        inner.backend.spi_xfer(raw, tx)
    }
}

// I2C operations
impl Pi {
    /// Open the device at `addr` on an I2C bus.
    pub fn i2c_open(&self, bus: u32, addr: u32, flags: u32) -> Result<Handle> {
        if addr > I2C_MAX_ADDR {
            return Err(Error::BadI2cAddr);
        }
        // No additional open flags are defined.
        if flags != 0 {
            return Err(Error::BadFlags);
        }
        let mut inner = self.lock();
        inner.ensure_open()?;
        let raw = inner.backend.i2c_open(bus, addr, flags)?;
        let handle = inner.i2c.insert(I2cDevice { raw, bus, addr })?;
        debug!(bus, addr, %handle, "I2C open");
        Ok(handle)
    }

    /// Close an I2C handle. The handle is invalid afterwards.
    pub fn i2c_close(&self, handle: Handle) -> Result<()> {
        let mut inner = self.lock();
        inner.ensure_open()?;
        let raw = inner.i2c.get(handle)?.raw;
        inner.backend.i2c_close(raw)?;
        inner.i2c.remove(handle)?;
        debug!(%handle, "I2C close");
        Ok(())
    }

    /// Raw read of exactly `count` bytes from the device.
    pub fn i2c_read_device(&self, handle: Handle, count: usize) -> Result<Vec<u8>> {
        if count == 0 {
            return Err(Error::BadParam);
        }
        let mut inner = self.lock();
        inner.ensure_open()?;
        let raw = inner.i2c.get(handle)?.raw;
        inner.backend.i2c_read_device(raw, count)
    }

    /// Raw write of the whole buffer to the device.
    pub fn i2c_write_device(&self, handle: Handle, data: &[u8]) -> Result<()> {
        if data.is_empty() {
            return Err(Error::BadParam);
        }
        let mut inner = self.lock();
        inner.ensure_open()?;
        let raw = inner.i2c.get(handle)?.raw;
        inner.backend.i2c_write_device(raw, data)
    }

    /// SMBus receive byte.
    pub fn i2c_read_byte(&self, handle: Handle) -> Result<u8> {
        let mut inner = self.lock();
        inner.ensure_open()?;
        let raw = inner.i2c.get(handle)?.raw;
        inner.backend.i2c_read_byte(raw)
    }

    /// SMBus send byte.
    pub fn i2c_write_byte(&self, handle: Handle, value: u8) -> Result<()> {
        let mut inner = self.lock();
        inner.ensure_open()?;
        let raw = inner.i2c.get(handle)?.raw;
        inner.backend.i2c_write_byte(raw, value)
    }

    /// Read one byte from register `reg`.
    pub fn i2c_read_byte_data(&self, handle: Handle, reg: u32) -> Result<u8> {
        check_i2c_reg(reg)?;
        let mut inner = self.lock();
        inner.ensure_open()?;
        let raw = inner.i2c.get(handle)?.raw;
        inner.backend.i2c_read_byte_data(raw, reg)
    }

    /// Write one byte to register `reg`.
    pub fn i2c_write_byte_data(&self, handle: Handle, reg: u32, value: u8) -> Result<()> {
        check_i2c_reg(reg)?;
        let mut inner = self.lock();
        inner.ensure_open()?;
        let raw = inner.i2c.get(handle)?.raw;
        inner.backend.i2c_write_byte_data(raw, reg, value)
    }

    /// Read one little-endian word from register `reg`.
    pub fn i2c_read_word_data(&self, handle: Handle, reg: u32) -> Result<u16> {
        check_i2c_reg(reg)?;
        let mut inner = self.lock();
        inner.ensure_open()?;
        let raw = inner.i2c.get(handle)?.raw;
        inner.backend.i2c_read_word_data(raw, reg)
    }

    /// Write one little-endian word to register `reg`.
    pub fn i2c_write_word_data(&self, handle: Handle, reg: u32, value: u16) -> Result<()> {
        check_i2c_reg(reg)?;
        let mut inner = self.lock();
        inner.ensure_open()?;
        let raw = inner.i2c.get(handle)?.raw;
        inner.backend.i2c_write_word_data(raw, reg, value)
    }

    /// SMBus block read from register `reg`; the device picks the length
    /// (at most 32 bytes).
    pub fn i2c_read_block_data(&self, handle: Handle, reg: u32) -> Result<Vec<u8>> {
        check_i2c_reg(reg)?;
        let mut inner = self.lock();
        inner.ensure_open()?;
        let raw = inner.i2c.get(handle)?.raw;
        inner.backend.i2c_read_block_data(raw, reg)
    }

    /// SMBus block write (1-32 bytes) to register `reg`.
    pub fn i2c_write_block_data(&self, handle: Handle, reg: u32, data: &[u8]) -> Result<()> {
        check_i2c_reg(reg)?;
        check_block_len(data.len())?;
        let mut inner = self.lock();
        inner.ensure_open()?;
        let raw = inner.i2c.get(handle)?.raw;
        inner.backend.i2c_write_block_data(raw, reg, data)
    }

    /// Read exactly `count` bytes (1-32) starting at register `reg`.
    pub fn i2c_read_i2c_block_data(&self, handle: Handle, reg: u32, count: usize) -> Result<Vec<u8>> {
        check_i2c_reg(reg)?;
        check_block_len(count)?;
        let mut inner = self.lock();
        inner.ensure_open()?;
        let raw = inner.i2c.get(handle)?.raw;
        inner.backend.i2c_read_i2c_block_data(raw, reg, count)
    }

    /// Write 1-32 bytes starting at register `reg`.
    pub fn i2c_write_i2c_block_data(&self, handle: Handle, reg: u32, data: &[u8]) -> Result<()> {
        check_i2c_reg(reg)?;
        check_block_len(data.len())?;
        let mut inner = self.lock();
        inner.ensure_open()?;
        let raw = inner.i2c.get(handle)?.raw;
        inner.backend.i2c_write_i2c_block_data(raw, reg, data)
    }
}

fn check_i2c_reg(reg: u32) -> Result<()> {
    if reg > 0xff {
        return Err(Error::BadParam);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockController;
    use test_case::test_case;

    fn pi() -> Pi {
        Pi::direct(Box::new(MockController::new())).unwrap()
    }

    #[test_case(54)]
    #[test_case(u32::MAX)]
    fn mode_rejects_out_of_range_pins(gpio: u32) {
        assert!(matches!(pi().set_mode(gpio, Mode::Output), Err(Error::BadGpio)));
    }

    #[test_case(32)]
    #[test_case(53)]
    fn pwm_rejects_non_user_pins(gpio: u32) {
        assert!(matches!(
            pi().set_pwm_dutycycle(gpio, 128),
            Err(Error::BadUserGpio)
        ));
    }

    #[test_case(1 => matches Err(Error::BadPulsewidth); "below off")]
    #[test_case(499 => matches Err(Error::BadPulsewidth); "below range")]
    #[test_case(2501 => matches Err(Error::BadPulsewidth); "above range")]
    #[test_case(0 => matches Ok(()); "off")]
    #[test_case(1500 => matches Ok(()); "centre")]
    fn servo_pulsewidth_bounds(width: u32) -> Result<()> {
        pi().set_servo_pulsewidth(17, width)
    }

    #[test]
    fn pwm_range_bounds() {
        let pi = pi();
        assert!(matches!(pi.set_pwm_range(17, 24), Err(Error::BadDutyRange)));
        assert!(matches!(
            pi.set_pwm_range(17, 40_001),
            Err(Error::BadDutyRange)
        ));
        assert!(pi.set_pwm_range(17, 100).is_ok());
    }

    #[test]
    fn spi_open_bounds() {
        let pi = pi();
        assert!(matches!(
            pi.spi_open(3, 50_000, 0),
            Err(Error::BadSpiChannel)
        ));
        assert!(matches!(pi.spi_open(0, 31_999, 0), Err(Error::BadSpiSpeed)));
        assert!(matches!(
            pi.spi_open(0, 50_000, 1 << 22),
            Err(Error::BadFlags)
        ));
    }

    #[test]
    fn i2c_open_bounds() {
        let pi = pi();
        assert!(matches!(pi.i2c_open(1, 0x80, 0), Err(Error::BadI2cAddr)));
        assert!(matches!(pi.i2c_open(1, 0x20, 1), Err(Error::BadFlags)));
    }

    #[test]
    fn handles_do_not_cross_sessions() {
        let a = pi();
        let b = pi();
        let h = a.spi_open(0, 50_000, 0).unwrap();
        // Same numeric value resolves only on the session that issued it.
        assert!(a.spi_read(h, 1).is_ok());
        assert!(matches!(b.spi_read(h, 1), Err(Error::BadHandle)));
    }

    #[test]
    fn operations_after_disconnect_fail() {
        let pi = pi();
        pi.set_mode(17, Mode::Output).unwrap();
        pi.disconnect().unwrap();
        assert!(matches!(
            pi.write(17, Level::High),
            Err(Error::NotInitialised)
        ));
        // Disconnect is idempotent.
        pi.disconnect().unwrap();
    }
}
