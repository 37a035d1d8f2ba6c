//! Upstream TCP dialer
//!
//! Dials the real SOCKS5 server once per accepted client connection.

use super::SocketOpts;
use crate::error::RelayError;
use anyhow::{Context, Result};
use std::future::Future;
use std::io;
use std::time::Duration;
use tokio::net::TcpStream;

/// Dialer for the upstream SOCKS5 server
#[derive(Debug, Clone)]
pub struct TcpDialer {
    /// Upstream address, resolved on every dial
    addr: String,
    /// Socket options to apply to connections
    socket_opts: SocketOpts,
    /// Connection timeout
    connect_timeout: Duration,
}

impl TcpDialer {
    /// Create a dialer with default options
    pub fn new(addr: impl Into<String>) -> Self {
        TcpDialer {
            addr: addr.into(),
            socket_opts: SocketOpts::default(),
            connect_timeout: Duration::from_secs(5),
        }
    }

    /// Set socket options
    pub fn with_socket_opts(mut self, opts: SocketOpts) -> Self {
        self.socket_opts = opts;
        self
    }

    /// Set connection timeout
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Upstream address
    pub fn addr(&self) -> &str {
        &self.addr
    }

    /// Connect to the upstream server
    pub async fn connect(&self) -> Result<TcpStream> {
        let stream = dial_within(
            &self.addr,
            self.connect_timeout,
            TcpStream::connect(&self.addr),
        )
        .await
        .with_context(|| format!("Failed to connect to {}", self.addr))?;

        self.socket_opts.hint(&stream);

        tracing::debug!("Upstream connection established to {}", self.addr);

        Ok(stream)
    }
}

/// Bound a pending dial by `timeout`
async fn dial_within<F>(addr: &str, timeout: Duration, dial: F) -> Result<TcpStream, RelayError>
where
    F: Future<Output = io::Result<TcpStream>>,
{
    match tokio::time::timeout(timeout, dial).await {
        Ok(stream) => Ok(stream?),
        Err(_) => Err(RelayError::Timeout(format!(
            "no connection to {} within {:?}",
            addr, timeout
        ))),
    }
}
