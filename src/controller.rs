//! Local peripheral controller interface
//!
//! The direct backend drives an in-process controller through this trait.
//! The trait mirrors the controller's native call shapes: raw `u32`
//! parameters, caller-provided byte buffers, and `i32` statuses where a
//! negative value is a code from [`crate::error::codes`] and a
//! non-negative value carries the result. Typed arguments, range checks,
//! and status normalization are the backend's job, not the
//! implementation's; an implementation only has to touch the hardware.
//!
//! How the controller reaches the hardware (memory-mapped registers,
//! a kernel driver, simulated state) is outside this crate's concern.
//!
//! # Safety Invariants
//!
//! - [`gpio_initialise`](LocalController::gpio_initialise) must succeed
//!   before any other call is made.
//! - Calls are serialized by the owning backend; implementations do not
//!   need internal locking.
//! - `spi_xfer` receives equal-length transmit and receive buffers.

/// Synchronous local controller primitives.
pub trait LocalController: Send {
    /// Initialise the controller. Negative statuses abort construction.
    fn gpio_initialise(&mut self) -> i32;

    /// Release the controller. Called at most once, after initialise.
    fn gpio_terminate(&mut self);

    fn gpio_set_mode(&mut self, gpio: u32, mode: u32) -> i32;

    /// Returns the mode wire value for the pin.
    fn gpio_get_mode(&mut self, gpio: u32) -> i32;

    fn gpio_set_pull(&mut self, gpio: u32, pud: u32) -> i32;

    /// Returns 0 (low) or 1 (high).
    fn gpio_read(&mut self, gpio: u32) -> i32;

    fn gpio_write(&mut self, gpio: u32, level: u32) -> i32;

    fn pwm_set_dutycycle(&mut self, gpio: u32, duty: u32) -> i32;

    fn pwm_get_dutycycle(&mut self, gpio: u32) -> i32;

    /// Set the PWM frequency; returns the frequency actually selected
    /// (the numerically closest the controller supports).
    fn pwm_set_frequency(&mut self, gpio: u32, frequency: u32) -> i32;

    fn pwm_get_frequency(&mut self, gpio: u32) -> i32;

    /// Set the duty cycle range; returns the real underlying range.
    fn pwm_set_range(&mut self, gpio: u32, range: u32) -> i32;

    fn pwm_get_range(&mut self, gpio: u32) -> i32;

    fn pwm_get_real_range(&mut self, gpio: u32) -> i32;

    /// Start hardware PWM. Frequency 0 switches it off.
    fn hardware_pwm(&mut self, gpio: u32, frequency: u32, duty: u32) -> i32;

    /// Start (500-2500) or stop (0) servo pulses.
    fn servo_set_pulsewidth(&mut self, gpio: u32, pulsewidth: u32) -> i32;

    fn servo_get_pulsewidth(&mut self, gpio: u32) -> i32;

    /// Open an SPI channel; returns a controller-scoped handle.
    fn spi_open(&mut self, channel: u32, baud: u32, flags: u32) -> i32;

    fn spi_close(&mut self, handle: u32) -> i32;

    /// Fill `buf` from the device; returns the byte count read.
    fn spi_read(&mut self, handle: u32, buf: &mut [u8]) -> i32;

    /// Send `data`; returns the byte count written.
    fn spi_write(&mut self, handle: u32, data: &[u8]) -> i32;

    /// Full-duplex transfer; returns the byte count transferred.
    fn spi_xfer(&mut self, handle: u32, tx: &[u8], rx: &mut [u8]) -> i32;

    /// Open a device on an I2C bus; returns a controller-scoped handle.
    fn i2c_open(&mut self, bus: u32, addr: u32, flags: u32) -> i32;

    fn i2c_close(&mut self, handle: u32) -> i32;

    /// Raw read from the device; returns the byte count read.
    fn i2c_read_device(&mut self, handle: u32, buf: &mut [u8]) -> i32;

    /// Raw write to the device; returns the byte count written.
    fn i2c_write_device(&mut self, handle: u32, data: &[u8]) -> i32;

    /// SMBus receive byte.
    fn i2c_read_byte(&mut self, handle: u32) -> i32;

    /// SMBus send byte.
    fn i2c_write_byte(&mut self, handle: u32, value: u32) -> i32;

    /// SMBus read byte from a register.
    fn i2c_read_byte_data(&mut self, handle: u32, reg: u32) -> i32;

    /// SMBus write byte to a register.
    fn i2c_write_byte_data(&mut self, handle: u32, reg: u32, value: u32) -> i32;

    /// SMBus read word (little-endian) from a register.
    fn i2c_read_word_data(&mut self, handle: u32, reg: u32) -> i32;

    /// SMBus write word (little-endian) to a register.
    fn i2c_write_word_data(&mut self, handle: u32, reg: u32, value: u32) -> i32;

    /// SMBus block read; the device picks the length (at most 32).
    /// Returns the byte count placed in `buf`.
    fn i2c_read_block_data(&mut self, handle: u32, reg: u32, buf: &mut [u8]) -> i32;

    /// SMBus block write, at most 32 bytes.
    fn i2c_write_block_data(&mut self, handle: u32, reg: u32, data: &[u8]) -> i32;

    /// I2C block read of exactly `buf.len()` bytes (at most 32).
    fn i2c_read_i2c_block_data(&mut self, handle: u32, reg: u32, buf: &mut [u8]) -> i32;

    /// I2C block write, at most 32 bytes.
    fn i2c_write_i2c_block_data(&mut self, handle: u32, reg: u32, data: &[u8]) -> i32;
}
