//! TCP transport to a pigpiod-compatible daemon
//!
//! Wire format: a request is four little-endian `u32` words
//! `[cmd, p1, p2, ext_len]` followed by `ext_len` extension bytes. The
//! reply echoes the first three words and carries the status in the
//! fourth; data-bearing commands append `status` payload bytes.

use std::io::{self, Read, Write};
use std::net::{Shutdown, TcpStream, ToSocketAddrs};
use std::time::Duration;

use tracing::{debug, trace};

use crate::daemon::{DaemonTransport, Reply, Request};
use crate::error::{Error, Result};

/// Default daemon endpoint, overridable via `PIGPIO_ADDR`/`PIGPIO_PORT`.
pub const DEFAULT_ADDR: &str = "localhost";
pub const DEFAULT_PORT: &str = "8888";

const HEADER_LEN: usize = 16;

/// Blocking TCP connection to the daemon.
pub struct TcpTransport {
    stream: TcpStream,
}

impl TcpTransport {
    /// Connect to `addr:port`.
    ///
    /// An empty `addr` falls back to the `PIGPIO_ADDR` environment
    /// variable, then `localhost`; an empty `port` to `PIGPIO_PORT`, then
    /// `8888`. A supplied `timeout` bounds the connect and every
    /// subsequent read and write.
    pub fn connect(addr: &str, port: &str, timeout: Option<Duration>) -> Result<TcpTransport> {
        let addr = resolve(addr, "PIGPIO_ADDR", DEFAULT_ADDR);
        let port = resolve(port, "PIGPIO_PORT", DEFAULT_PORT);
        let endpoint = format!("{addr}:{port}");

        let stream = match timeout {
            Some(limit) => connect_with_timeout(&endpoint, limit)?,
            None => TcpStream::connect(&endpoint)
                .map_err(|e| Error::ConnectFailed(format!("{endpoint}: {e}")))?,
        };

        stream.set_nodelay(true)?;
        stream.set_read_timeout(timeout)?;
        stream.set_write_timeout(timeout)?;
        debug!(%endpoint, "connected to daemon");
        Ok(TcpTransport { stream })
    }
}

/// Try every address the endpoint resolves to; a name like `localhost`
/// commonly yields both an IPv6 and an IPv4 address and the daemon may
/// listen on only one of them.
fn connect_with_timeout(endpoint: &str, limit: Duration) -> Result<TcpStream> {
    let mut last: Option<io::Error> = None;
    for addr in endpoint
        .to_socket_addrs()
        .map_err(|e| Error::ConnectFailed(format!("{endpoint}: {e}")))?
    {
        match TcpStream::connect_timeout(&addr, limit) {
            Ok(stream) => return Ok(stream),
            Err(e) => last = Some(e),
        }
    }
    Err(match last {
        Some(e) => Error::ConnectFailed(format!("{endpoint}: {e}")),
        None => Error::ConnectFailed(format!("{endpoint}: no address")),
    })
}

fn resolve(value: &str, env_var: &str, default: &str) -> String {
    if !value.is_empty() {
        return value.to_string();
    }
    match std::env::var(env_var) {
        Ok(v) if !v.is_empty() => v,
        _ => default.to_string(),
    }
}

impl DaemonTransport for TcpTransport {
    fn request(&mut self, req: Request<'_>) -> Result<Reply> {
        trace!(cmd = ?req.cmd, p1 = req.p1, p2 = req.p2, ext_len = req.ext.len(), "request");

        let mut frame = Vec::with_capacity(HEADER_LEN + req.ext.len());
        frame.extend_from_slice(&(req.cmd as u32).to_le_bytes());
        frame.extend_from_slice(&req.p1.to_le_bytes());
        frame.extend_from_slice(&req.p2.to_le_bytes());
        frame.extend_from_slice(&(req.ext.len() as u32).to_le_bytes());
        frame.extend_from_slice(req.ext);
        self.stream.write_all(&frame)?;

        let mut header = [0u8; HEADER_LEN];
        self.stream.read_exact(&mut header)?;
        let echoed = u32::from_le_bytes(header[0..4].try_into().unwrap());
        if echoed != req.cmd as u32 {
            return Err(Error::Protocol(format!(
                "reply command {echoed} does not match request {:?}",
                req.cmd
            )));
        }
        let status = i32::from_le_bytes(header[12..16].try_into().unwrap());

        let mut payload = Vec::new();
        if status > 0 && req.cmd.carries_payload() {
            payload = vec![0u8; status as usize];
            self.stream.read_exact(&mut payload)?;
        }
        trace!(cmd = ?req.cmd, status, payload_len = payload.len(), "reply");
        Ok(Reply { status, payload })
    }

    fn shutdown(&mut self) {
        let _ = self.stream.shutdown(Shutdown::Both);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Each test owns a distinct variable name; the process environment is
    // shared across the test binary.

    #[test]
    fn explicit_value_beats_environment() {
        std::env::set_var("RPI_PERIPH_TEST_ADDR_A", "daemon.local");
        assert_eq!(
            resolve("10.0.0.2", "RPI_PERIPH_TEST_ADDR_A", DEFAULT_ADDR),
            "10.0.0.2"
        );
        std::env::remove_var("RPI_PERIPH_TEST_ADDR_A");
    }

    #[test]
    fn environment_beats_default() {
        std::env::set_var("RPI_PERIPH_TEST_ADDR_B", "10.0.0.9");
        assert_eq!(resolve("", "RPI_PERIPH_TEST_ADDR_B", DEFAULT_ADDR), "10.0.0.9");
        std::env::remove_var("RPI_PERIPH_TEST_ADDR_B");
    }

    #[test]
    fn empty_environment_value_is_ignored() {
        std::env::set_var("RPI_PERIPH_TEST_PORT_C", "");
        assert_eq!(resolve("", "RPI_PERIPH_TEST_PORT_C", DEFAULT_PORT), DEFAULT_PORT);
        std::env::remove_var("RPI_PERIPH_TEST_PORT_C");
    }

    #[test]
    fn unset_environment_falls_back_to_default() {
        assert_eq!(resolve("", "RPI_PERIPH_TEST_ADDR_D", DEFAULT_ADDR), DEFAULT_ADDR);
    }
}
