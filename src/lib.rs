//! rpi-periph - unified peripheral access for Raspberry Pi class boards
//!
//! One operation set for digital I/O, PWM/servo, SPI, and I2C, usable over
//! two interchangeable transports: a local in-process controller, or a
//! pigpiod-compatible daemon reached over TCP. Both backends share the
//! same numeric semantics, error taxonomy, and handle lifecycle, so code
//! written against [`Pi`] runs unchanged on either.
//!
//! ```no_run
//! use rpi_periph::{DaemonConfig, Level, Mode, Pi};
//!
//! # fn main() -> rpi_periph::Result<()> {
//! let pi = Pi::connect(DaemonConfig::default())?;
//! pi.set_mode(17, Mode::Output)?;
//! pi.write(17, Level::High)?;
//!
//! let spi = pi.spi_open(0, 50_000, 0)?;
//! let rx = pi.spi_xfer(spi, &[0x01, 0x02])?;
//! assert_eq!(rx.len(), 2);
//! pi.spi_close(spi)?;
//! pi.disconnect()?;
//! # Ok(())
//! # }
//! ```

pub mod controller;
pub mod daemon;
pub mod error;
pub mod mock;
pub mod pi;
pub mod registry;
pub mod types;

mod backend;

pub use controller::LocalController;
pub use daemon::{Cmd, DaemonTransport, Reply, Request, TcpTransport};
pub use error::{Error, Result};
pub use mock::{MockController, MockTransport};
pub use pi::{DaemonConfig, Pi};
pub use registry::Handle;
pub use types::{Level, Mode, Pull};
