//! Mock local controller

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::controller::LocalController;
use crate::error::codes::*;
use crate::types::{
    HW_PWM_MAX_FREQ, HW_PWM_RANGE, I2C_MAX_ADDR, I2C_MAX_BLOCK, MAX_GPIO, MAX_USER_GPIO,
    PWM_DEFAULT_RANGE, PWM_MAX_RANGE, PWM_MIN_RANGE, SERVO_MAX_PULSEWIDTH, SERVO_MIN_PULSEWIDTH,
    SPI_FLAGS_MASK, SPI_MAX_BAUD, SPI_MAX_CHANNEL, SPI_MIN_BAUD,
};

/// Pins that support hardware PWM on a stock 40-pin header.
const HW_PWM_PINS: [u32; 4] = [12, 13, 18, 19];

/// Software PWM frequencies available at the default 5 µs sample rate.
const PWM_FREQS: [u32; 18] = [
    8000, 4000, 2000, 1600, 1000, 800, 500, 400, 320, 250, 200, 160, 100, 80, 50, 40, 20, 10,
];

#[derive(Default, Clone, Copy)]
struct PinState {
    mode: u32,
    level: u32,
    pull: u32,
}

#[derive(Clone, Copy)]
struct PwmState {
    duty: u32,
    frequency: u32,
    range: u32,
}

impl Default for PwmState {
    fn default() -> Self {
        PwmState {
            duty: 0,
            frequency: 800,
            range: PWM_DEFAULT_RANGE,
        }
    }
}

#[derive(Default)]
struct State {
    initialised: bool,
    fail_initialise: bool,
    short_transfers: bool,
    pins: HashMap<u32, PinState>,
    pwm: HashMap<u32, PwmState>,
    servo: HashMap<u32, u32>,
    hw_pwm: HashMap<u32, (u32, u32)>,
    spi_ports: HashMap<u32, u32>, // handle -> channel
    next_spi_handle: u32,
    spi_read_data: HashMap<u32, VecDeque<u8>>, // channel -> pending bytes
    spi_written: HashMap<u32, Vec<Vec<u8>>>,   // channel -> writes
    i2c_ports: HashMap<u32, (u32, u32)>, // handle -> (bus, addr)
    next_i2c_handle: u32,
    i2c_regs: HashMap<(u32, u32), [u8; 256]>,
    i2c_blocks: HashMap<(u32, u32, u32), Vec<u8>>,
    i2c_device_data: HashMap<(u32, u32), VecDeque<u8>>,
    i2c_written: HashMap<(u32, u32), Vec<Vec<u8>>>,
}

/// In-memory local controller.
///
/// Simulates an idealised board: all 54 GPIOs present, SPI channels 0-2,
/// any I2C bus. SPI reads drain bytes pre-programmed per channel (zero
/// padded); I2C register ops work against a per-device register file.
#[derive(Clone, Default)]
pub struct MockController {
    state: Arc<Mutex<State>>,
}

impl MockController {
    pub fn new() -> MockController {
        MockController::default()
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Make the next initialise fail, for error-path tests.
    /// Make every bulk SPI/I2C transfer report one byte fewer than
    /// requested, simulating a collaborator that stops mid-transfer.
    pub fn short_transfers(&self) {
        self.lock().short_transfers = true;
    }

    pub fn fail_initialise(&self) {
        self.lock().fail_initialise = true;
    }

    /// Drive a (simulated) external signal on a pin.
    pub fn set_input_level(&self, gpio: u32, high: bool) {
        self.lock().pins.entry(gpio).or_default().level = high as u32;
    }

    /// Current mode wire value of a pin.
    pub fn pin_mode(&self, gpio: u32) -> u32 {
        self.lock().pins.get(&gpio).copied().unwrap_or_default().mode
    }

    /// Current level of a pin.
    pub fn pin_level(&self, gpio: u32) -> u32 {
        self.lock().pins.get(&gpio).copied().unwrap_or_default().level
    }

    /// Current pull setting of a pin.
    pub fn pin_pull(&self, gpio: u32) -> u32 {
        self.lock().pins.get(&gpio).copied().unwrap_or_default().pull
    }

    /// Last hardware PWM (frequency, duty) programmed on a pin.
    pub fn hardware_pwm_state(&self, gpio: u32) -> Option<(u32, u32)> {
        self.lock().hw_pwm.get(&gpio).copied()
    }

    /// Queue bytes to be returned by SPI reads/transfers on a channel.
    pub fn push_spi_read_data(&self, channel: u32, data: &[u8]) {
        self.lock()
            .spi_read_data
            .entry(channel)
            .or_default()
            .extend(data);
    }

    /// Everything written (writes and transfer tx) on an SPI channel.
    pub fn spi_written(&self, channel: u32) -> Vec<Vec<u8>> {
        self.lock().spi_written.get(&channel).cloned().unwrap_or_default()
    }

    /// Set a register on a simulated I2C device.
    pub fn set_i2c_register(&self, bus: u32, addr: u32, reg: u8, value: u8) {
        self.lock().i2c_regs.entry((bus, addr)).or_insert([0; 256])[reg as usize] = value;
    }

    /// Read a register on a simulated I2C device.
    pub fn i2c_register(&self, bus: u32, addr: u32, reg: u8) -> u8 {
        self.lock()
            .i2c_regs
            .get(&(bus, addr))
            .map(|regs| regs[reg as usize])
            .unwrap_or_default()
    }

    /// Programme the block returned by an SMBus block read of `reg`.
    pub fn set_i2c_block(&self, bus: u32, addr: u32, reg: u8, data: &[u8]) {
        self.lock()
            .i2c_blocks
            .insert((bus, addr, reg as u32), data.to_vec());
    }

    /// Queue bytes returned by raw reads from a simulated I2C device.
    pub fn push_i2c_device_data(&self, bus: u32, addr: u32, data: &[u8]) {
        self.lock()
            .i2c_device_data
            .entry((bus, addr))
            .or_default()
            .extend(data);
    }

    /// Raw writes issued to a simulated I2C device.
    pub fn i2c_device_written(&self, bus: u32, addr: u32) -> Vec<Vec<u8>> {
        self.lock()
            .i2c_written
            .get(&(bus, addr))
            .cloned()
            .unwrap_or_default()
    }
}

impl State {
    fn ready(&self) -> Result<(), i32> {
        if self.initialised {
            Ok(())
        } else {
            Err(PI_NOT_INITIALISED)
        }
    }

    fn spi_channel(&self, handle: u32) -> Result<u32, i32> {
        self.spi_ports.get(&handle).copied().ok_or(PI_BAD_HANDLE)
    }

    fn i2c_device(&self, handle: u32) -> Result<(u32, u32), i32> {
        self.i2c_ports.get(&handle).copied().ok_or(PI_BAD_HANDLE)
    }

    fn real_range(frequency: u32) -> u32 {
        1_000_000 / (5 * frequency)
    }

    /// Count a bulk transfer would report for `len` requested bytes.
    fn reported(&self, len: usize) -> u32 {
        if self.short_transfers {
            len.saturating_sub(1) as u32
        } else {
            len as u32
        }
    }

    fn fill_spi_read(&mut self, channel: u32, buf: &mut [u8]) {
        let queue = self.spi_read_data.entry(channel).or_default();
        for byte in buf.iter_mut() {
            *byte = queue.pop_front().unwrap_or(0);
        }
    }
}

/// Collapse a `Result<u32-ish, code>` body into the raw status convention.
macro_rules! status {
    ($body:expr) => {
        match $body {
            Ok(v) => v as i32,
            Err(code) => code,
        }
    };
}

impl LocalController for MockController {
    fn gpio_initialise(&mut self) -> i32 {
        let mut s = self.lock();
        if s.fail_initialise {
            return PI_INIT_FAILED;
        }
        s.initialised = true;
        0
    }

    fn gpio_terminate(&mut self) {
        self.lock().initialised = false;
    }

    fn gpio_set_mode(&mut self, gpio: u32, mode: u32) -> i32 {
        let mut s = self.lock();
        status!((|| {
            s.ready()?;
            if gpio > MAX_GPIO {
                return Err(PI_BAD_GPIO);
            }
            if mode > 7 {
                return Err(PI_BAD_MODE);
            }
            s.pins.entry(gpio).or_default().mode = mode;
            Ok(0u32)
        })())
    }

    fn gpio_get_mode(&mut self, gpio: u32) -> i32 {
        let s = self.lock();
        status!((|| {
            s.ready()?;
            if gpio > MAX_GPIO {
                return Err(PI_BAD_GPIO);
            }
            Ok(s.pins.get(&gpio).copied().unwrap_or_default().mode)
        })())
    }

    fn gpio_set_pull(&mut self, gpio: u32, pud: u32) -> i32 {
        let mut s = self.lock();
        status!((|| {
            s.ready()?;
            if gpio > MAX_GPIO {
                return Err(PI_BAD_GPIO);
            }
            if pud > 2 {
                return Err(PI_BAD_PUD);
            }
            s.pins.entry(gpio).or_default().pull = pud;
            Ok(0u32)
        })())
    }

    fn gpio_read(&mut self, gpio: u32) -> i32 {
        let s = self.lock();
        status!((|| {
            s.ready()?;
            if gpio > MAX_GPIO {
                return Err(PI_BAD_GPIO);
            }
            Ok(s.pins.get(&gpio).copied().unwrap_or_default().level)
        })())
    }

    fn gpio_write(&mut self, gpio: u32, level: u32) -> i32 {
        let mut s = self.lock();
        status!((|| {
            s.ready()?;
            if gpio > MAX_GPIO {
                return Err(PI_BAD_GPIO);
            }
            if level > 1 {
                return Err(PI_BAD_LEVEL);
            }
            let pin = s.pins.entry(gpio).or_default();
            // Writing drives the pin, switching it to output.
            pin.mode = 1;
            pin.level = level;
            Ok(0u32)
        })())
    }

    fn pwm_set_dutycycle(&mut self, gpio: u32, duty: u32) -> i32 {
        let mut s = self.lock();
        status!((|| {
            s.ready()?;
            if gpio > MAX_USER_GPIO {
                return Err(PI_BAD_USER_GPIO);
            }
            let range = s.pwm.entry(gpio).or_default().range;
            if duty > range {
                return Err(PI_BAD_DUTYCYCLE);
            }
            s.pwm.entry(gpio).or_default().duty = duty;
            s.pins.entry(gpio).or_default().mode = 1;
            Ok(0u32)
        })())
    }

    fn pwm_get_dutycycle(&mut self, gpio: u32) -> i32 {
        let s = self.lock();
        status!((|| {
            s.ready()?;
            if gpio > MAX_USER_GPIO {
                return Err(PI_BAD_USER_GPIO);
            }
            Ok(s.pwm.get(&gpio).copied().unwrap_or_default().duty)
        })())
    }

    fn pwm_set_frequency(&mut self, gpio: u32, frequency: u32) -> i32 {
        let mut s = self.lock();
        status!((|| {
            s.ready()?;
            if gpio > MAX_USER_GPIO {
                return Err(PI_BAD_USER_GPIO);
            }
            // Snap to the numerically closest supported frequency.
            let selected = PWM_FREQS
                .iter()
                .copied()
                .min_by_key(|f| f.abs_diff(frequency))
                .unwrap_or(800);
            s.pwm.entry(gpio).or_default().frequency = selected;
            Ok(selected)
        })())
    }

    fn pwm_get_frequency(&mut self, gpio: u32) -> i32 {
        let s = self.lock();
        status!((|| {
            s.ready()?;
            if gpio > MAX_USER_GPIO {
                return Err(PI_BAD_USER_GPIO);
            }
            Ok(s.pwm.get(&gpio).copied().unwrap_or_default().frequency)
        })())
    }

    fn pwm_set_range(&mut self, gpio: u32, range: u32) -> i32 {
        let mut s = self.lock();
        status!((|| {
            s.ready()?;
            if gpio > MAX_USER_GPIO {
                return Err(PI_BAD_USER_GPIO);
            }
            if !(PWM_MIN_RANGE..=PWM_MAX_RANGE).contains(&range) {
                return Err(PI_BAD_DUTYRANGE);
            }
            let pwm = s.pwm.entry(gpio).or_default();
            // Keep the duty fraction when the denominator changes.
            pwm.duty = (pwm.duty as u64 * range as u64 / pwm.range as u64) as u32;
            pwm.range = range;
            Ok(State::real_range(pwm.frequency))
        })())
    }

    fn pwm_get_range(&mut self, gpio: u32) -> i32 {
        let s = self.lock();
        status!((|| {
            s.ready()?;
            if gpio > MAX_USER_GPIO {
                return Err(PI_BAD_USER_GPIO);
            }
            Ok(s.pwm.get(&gpio).copied().unwrap_or_default().range)
        })())
    }

    fn pwm_get_real_range(&mut self, gpio: u32) -> i32 {
        let s = self.lock();
        status!((|| {
            s.ready()?;
            if gpio > MAX_USER_GPIO {
                return Err(PI_BAD_USER_GPIO);
            }
            Ok(State::real_range(
                s.pwm.get(&gpio).copied().unwrap_or_default().frequency,
            ))
        })())
    }

    fn hardware_pwm(&mut self, gpio: u32, frequency: u32, duty: u32) -> i32 {
        let mut s = self.lock();
        status!((|| {
            s.ready()?;
            if !HW_PWM_PINS.contains(&gpio) {
                return Err(PI_NOT_HPWM_GPIO);
            }
            if frequency > HW_PWM_MAX_FREQ {
                return Err(PI_BAD_HPWM_FREQ);
            }
            if duty > HW_PWM_RANGE {
                return Err(PI_BAD_HPWM_DUTY);
            }
            s.hw_pwm.insert(gpio, (frequency, duty));
            Ok(0u32)
        })())
    }

    fn servo_set_pulsewidth(&mut self, gpio: u32, pulsewidth: u32) -> i32 {
        let mut s = self.lock();
        status!((|| {
            s.ready()?;
            if gpio > MAX_USER_GPIO {
                return Err(PI_BAD_USER_GPIO);
            }
            if pulsewidth != 0
                && !(SERVO_MIN_PULSEWIDTH..=SERVO_MAX_PULSEWIDTH).contains(&pulsewidth)
            {
                return Err(PI_BAD_PULSEWIDTH);
            }
            s.servo.insert(gpio, pulsewidth);
            Ok(0u32)
        })())
    }

    fn servo_get_pulsewidth(&mut self, gpio: u32) -> i32 {
        let s = self.lock();
        status!((|| {
            s.ready()?;
            if gpio > MAX_USER_GPIO {
                return Err(PI_BAD_USER_GPIO);
            }
            Ok(s.servo.get(&gpio).copied().unwrap_or(0))
        })())
    }

    fn spi_open(&mut self, channel: u32, baud: u32, flags: u32) -> i32 {
        let mut s = self.lock();
        status!((|| {
            s.ready()?;
            if channel > SPI_MAX_CHANNEL {
                return Err(PI_BAD_SPI_CHANNEL);
            }
            if !(SPI_MIN_BAUD..=SPI_MAX_BAUD).contains(&baud) {
                return Err(PI_BAD_SPI_SPEED);
            }
            if flags & !SPI_FLAGS_MASK != 0 {
                return Err(PI_BAD_FLAGS);
            }
            let handle = s.next_spi_handle;
            s.next_spi_handle += 1;
            s.spi_ports.insert(handle, channel);
            Ok(handle)
        })())
    }

    fn spi_close(&mut self, handle: u32) -> i32 {
        let mut s = self.lock();
        status!((|| {
            s.ready()?;
            s.spi_ports.remove(&handle).ok_or(PI_BAD_HANDLE)?;
            Ok(0u32)
        })())
    }

    fn spi_read(&mut self, handle: u32, buf: &mut [u8]) -> i32 {
        let mut s = self.lock();
        status!((|| {
            s.ready()?;
            let channel = s.spi_channel(handle)?;
            s.fill_spi_read(channel, buf);
            Ok(s.reported(buf.len()))
        })())
    }

    fn spi_write(&mut self, handle: u32, data: &[u8]) -> i32 {
        let mut s = self.lock();
        status!((|| {
            s.ready()?;
            let channel = s.spi_channel(handle)?;
            s.spi_written.entry(channel).or_default().push(data.to_vec());
            Ok(s.reported(data.len()))
        })())
    }

    fn spi_xfer(&mut self, handle: u32, tx: &[u8], rx: &mut [u8]) -> i32 {
        let mut s = self.lock();
        status!((|| {
            s.ready()?;
            let channel = s.spi_channel(handle)?;
            s.spi_written.entry(channel).or_default().push(tx.to_vec());
            s.fill_spi_read(channel, rx);
            Ok(s.reported(tx.len()))
        })())
    }

    fn i2c_open(&mut self, bus: u32, addr: u32, flags: u32) -> i32 {
        let mut s = self.lock();
        status!((|| {
            s.ready()?;
            if addr > I2C_MAX_ADDR {
                return Err(PI_BAD_I2C_ADDR);
            }
            if flags != 0 {
                return Err(PI_BAD_FLAGS);
            }
            let handle = s.next_i2c_handle;
            s.next_i2c_handle += 1;
            s.i2c_ports.insert(handle, (bus, addr));
            Ok(handle)
        })())
    }

    fn i2c_close(&mut self, handle: u32) -> i32 {
        let mut s = self.lock();
        status!((|| {
            s.ready()?;
            s.i2c_ports.remove(&handle).ok_or(PI_BAD_HANDLE)?;
            Ok(0u32)
        })())
    }

    fn i2c_read_device(&mut self, handle: u32, buf: &mut [u8]) -> i32 {
        let mut s = self.lock();
        status!((|| {
            s.ready()?;
            let dev = s.i2c_device(handle)?;
            let queue = s.i2c_device_data.entry(dev).or_default();
            for byte in buf.iter_mut() {
                *byte = queue.pop_front().unwrap_or(0);
            }
            Ok(s.reported(buf.len()))
        })())
    }

    fn i2c_write_device(&mut self, handle: u32, data: &[u8]) -> i32 {
        let mut s = self.lock();
        status!((|| {
            s.ready()?;
            let dev = s.i2c_device(handle)?;
            s.i2c_written.entry(dev).or_default().push(data.to_vec());
            Ok(s.reported(data.len()))
        })())
    }

    fn i2c_read_byte(&mut self, handle: u32) -> i32 {
        let mut s = self.lock();
        status!((|| {
            s.ready()?;
            let dev = s.i2c_device(handle)?;
            let byte = s
                .i2c_device_data
                .entry(dev)
                .or_default()
                .pop_front()
                .unwrap_or(0);
            Ok(byte as u32)
        })())
    }

    fn i2c_write_byte(&mut self, handle: u32, value: u32) -> i32 {
        let mut s = self.lock();
        status!((|| {
            s.ready()?;
            let dev = s.i2c_device(handle)?;
            s.i2c_written.entry(dev).or_default().push(vec![value as u8]);
            Ok(0u32)
        })())
    }

    fn i2c_read_byte_data(&mut self, handle: u32, reg: u32) -> i32 {
        let mut s = self.lock();
        status!((|| {
            s.ready()?;
            if reg > 0xff {
                return Err(PI_BAD_PARAM);
            }
            let dev = s.i2c_device(handle)?;
            Ok(s.i2c_regs.entry(dev).or_insert([0; 256])[reg as usize] as u32)
        })())
    }

    fn i2c_write_byte_data(&mut self, handle: u32, reg: u32, value: u32) -> i32 {
        let mut s = self.lock();
        status!((|| {
            s.ready()?;
            if reg > 0xff || value > 0xff {
                return Err(PI_BAD_PARAM);
            }
            let dev = s.i2c_device(handle)?;
            s.i2c_regs.entry(dev).or_insert([0; 256])[reg as usize] = value as u8;
            Ok(0u32)
        })())
    }

    fn i2c_read_word_data(&mut self, handle: u32, reg: u32) -> i32 {
        let mut s = self.lock();
        status!((|| {
            s.ready()?;
            if reg > 0xff {
                return Err(PI_BAD_PARAM);
            }
            let dev = s.i2c_device(handle)?;
            let regs = s.i2c_regs.entry(dev).or_insert([0; 256]);
            let lo = regs[reg as usize] as u32;
            let hi = regs[(reg as usize + 1) % 256] as u32;
            Ok(lo | hi << 8)
        })())
    }

    fn i2c_write_word_data(&mut self, handle: u32, reg: u32, value: u32) -> i32 {
        let mut s = self.lock();
        status!((|| {
            s.ready()?;
            if reg > 0xff || value > 0xffff {
                return Err(PI_BAD_PARAM);
            }
            let dev = s.i2c_device(handle)?;
            let regs = s.i2c_regs.entry(dev).or_insert([0; 256]);
            regs[reg as usize] = value as u8;
            regs[(reg as usize + 1) % 256] = (value >> 8) as u8;
            Ok(0u32)
        })())
    }

    fn i2c_read_block_data(&mut self, handle: u32, reg: u32, buf: &mut [u8]) -> i32 {
        let s = self.lock();
        status!((|| {
            s.ready()?;
            if reg > 0xff {
                return Err(PI_BAD_PARAM);
            }
            let dev = s.i2c_device(handle)?;
            let block = s
                .i2c_blocks
                .get(&(dev.0, dev.1, reg))
                .ok_or(PI_I2C_READ_FAILED)?;
            let n = block.len().min(buf.len());
            buf[..n].copy_from_slice(&block[..n]);
            Ok(n as u32)
        })())
    }

    fn i2c_write_block_data(&mut self, handle: u32, reg: u32, data: &[u8]) -> i32 {
        let mut s = self.lock();
        status!((|| {
            s.ready()?;
            if reg > 0xff || data.is_empty() || data.len() > I2C_MAX_BLOCK {
                return Err(PI_BAD_PARAM);
            }
            let dev = s.i2c_device(handle)?;
            s.i2c_blocks.insert((dev.0, dev.1, reg), data.to_vec());
            Ok(0u32)
        })())
    }

    fn i2c_read_i2c_block_data(&mut self, handle: u32, reg: u32, buf: &mut [u8]) -> i32 {
        let mut s = self.lock();
        status!((|| {
            s.ready()?;
            if reg > 0xff || buf.is_empty() || buf.len() > I2C_MAX_BLOCK {
                return Err(PI_BAD_PARAM);
            }
            let dev = s.i2c_device(handle)?;
            let regs = s.i2c_regs.entry(dev).or_insert([0; 256]);
            for (i, byte) in buf.iter_mut().enumerate() {
                *byte = regs[(reg as usize + i) % 256];
            }
            Ok(buf.len() as u32)
        })())
    }

    fn i2c_write_i2c_block_data(&mut self, handle: u32, reg: u32, data: &[u8]) -> i32 {
        let mut s = self.lock();
        status!((|| {
            s.ready()?;
            if reg > 0xff || data.is_empty() || data.len() > I2C_MAX_BLOCK {
                return Err(PI_BAD_PARAM);
            }
            let dev = s.i2c_device(handle)?;
            let regs = s.i2c_regs.entry(dev).or_insert([0; 256]);
            for (i, byte) in data.iter().enumerate() {
                regs[(reg as usize + i) % 256] = *byte;
            }
            Ok(0u32)
        })())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ready() -> MockController {
        let mut ctrl = MockController::new();
        assert_eq!(ctrl.gpio_initialise(), 0);
        ctrl
    }

    #[test]
    fn rejects_calls_before_initialise() {
        let mut ctrl = MockController::new();
        assert_eq!(ctrl.gpio_set_mode(17, 1), PI_NOT_INITIALISED);
    }

    #[test]
    fn initialise_can_be_made_to_fail() {
        let mut ctrl = MockController::new();
        ctrl.fail_initialise();
        assert_eq!(ctrl.gpio_initialise(), PI_INIT_FAILED);
    }

    #[test]
    fn mode_round_trips() {
        let mut ctrl = ready();
        assert_eq!(ctrl.gpio_set_mode(17, 1), 0);
        assert_eq!(ctrl.gpio_get_mode(17), 1);
        assert_eq!(ctrl.gpio_set_mode(54, 1), PI_BAD_GPIO);
        assert_eq!(ctrl.gpio_set_mode(17, 8), PI_BAD_MODE);
    }

    #[test]
    fn write_drives_pin_to_output() {
        let mut ctrl = ready();
        assert_eq!(ctrl.gpio_write(22, 1), 0);
        assert_eq!(ctrl.pin_mode(22), 1);
        assert_eq!(ctrl.pin_level(22), 1);
    }

    #[test]
    fn pwm_frequency_snaps_to_supported_value() {
        let mut ctrl = ready();
        assert_eq!(ctrl.pwm_set_frequency(17, 900), 800);
        assert_eq!(ctrl.pwm_get_frequency(17), 800);
        // Real range at 800 Hz with the 5 µs sample rate.
        assert_eq!(ctrl.pwm_get_real_range(17), 250);
    }

    #[test]
    fn pwm_range_rescales_duty() {
        let mut ctrl = ready();
        assert_eq!(ctrl.pwm_set_dutycycle(17, 128), 0);
        ctrl.pwm_set_range(17, 1000);
        // 128/255 scaled into a 0-1000 range.
        assert_eq!(ctrl.pwm_get_dutycycle(17), 501);
        assert_eq!(ctrl.pwm_get_range(17), 1000);
    }

    #[test]
    fn duty_above_range_is_rejected() {
        let mut ctrl = ready();
        assert_eq!(ctrl.pwm_set_dutycycle(17, 256), PI_BAD_DUTYCYCLE);
    }

    #[test]
    fn hardware_pwm_needs_a_capable_pin() {
        let mut ctrl = ready();
        assert_eq!(ctrl.hardware_pwm(17, 1000, 500_000), PI_NOT_HPWM_GPIO);
        assert_eq!(ctrl.hardware_pwm(18, 1000, 500_000), 0);
        assert_eq!(ctrl.hardware_pwm_state(18), Some((1000, 500_000)));
    }

    #[test]
    fn spi_loopback() {
        let mut ctrl = ready();
        let h = ctrl.spi_open(0, 50_000, 0);
        assert!(h >= 0);
        ctrl.push_spi_read_data(0, &[0xaa, 0xbb]);
        let mut rx = [0u8; 2];
        assert_eq!(ctrl.spi_xfer(h as u32, &[1, 2], &mut rx), 2);
        assert_eq!(rx, [0xaa, 0xbb]);
        assert_eq!(ctrl.spi_written(0), vec![vec![1, 2]]);
    }

    #[test]
    fn i2c_word_is_little_endian() {
        let mut ctrl = ready();
        let h = ctrl.i2c_open(1, 0x20, 0) as u32;
        assert_eq!(ctrl.i2c_write_word_data(h, 0x10, 0xbeef), 0);
        assert_eq!(ctrl.i2c_register(1, 0x20, 0x10), 0xef);
        assert_eq!(ctrl.i2c_register(1, 0x20, 0x11), 0xbe);
        assert_eq!(ctrl.i2c_read_word_data(h, 0x10), 0xbeef);
    }
}
