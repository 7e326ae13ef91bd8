//! Mock collaborators for testing
//!
//! [`MockController`] is an in-memory [`LocalController`]: it tracks pin,
//! PWM, servo, SPI, and I2C state, lets tests pre-programme read data, and
//! records what was written. [`MockTransport`] is an in-memory daemon
//! speaking the request/reply contract against a `MockController`, so the
//! daemon backend's marshaling is exercised end to end without a socket.
//!
//! Both are cheaply cloneable probes over shared state: keep a clone to
//! inspect or programme the collaborator after handing it to
//! [`Pi`](crate::Pi).
//!
//! [`LocalController`]: crate::controller::LocalController

mod controller;
mod transport;

pub use controller::MockController;
pub use transport::MockTransport;
