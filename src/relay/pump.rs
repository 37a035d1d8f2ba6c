//! Bidirectional data pump
//!
//! After the control phases the relay is a plain byte pipe. Both copy
//! directions run concurrently and the first one to finish ends the session.

use anyhow::{Context, Result};
use std::fmt;
use tokio::io::{AsyncRead, AsyncWrite};
use tracing::debug;

/// Copy direction, labelled from the relay's point of view
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Client to upstream server
    ClientToServer,
    /// Upstream server to client
    ServerToClient,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::ClientToServer => write!(f, "client→server"),
            Direction::ServerToClient => write!(f, "server→client"),
        }
    }
}

/// Which direction ended the session, after a clean end of stream
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PumpEnd {
    /// Direction whose source reached EOF first
    pub direction: Direction,
    /// Bytes copied in that direction
    pub bytes: u64,
}

/// Pump bytes between client and server until either direction ends
///
/// The direction still in flight is dropped, not awaited. Both streams are
/// consumed and closed when this returns.
pub async fn pump<C, S>(client: C, server: S) -> Result<PumpEnd>
where
    C: AsyncRead + AsyncWrite + Unpin,
    S: AsyncRead + AsyncWrite + Unpin,
{
    let (mut client_read, mut client_write) = tokio::io::split(client);
    let (mut server_read, mut server_write) = tokio::io::split(server);

    let client_to_server = tokio::io::copy(&mut client_read, &mut server_write);
    let server_to_client = tokio::io::copy(&mut server_read, &mut client_write);

    let (direction, result) = tokio::select! {
        result = client_to_server => (Direction::ClientToServer, result),
        result = server_to_client => (Direction::ServerToClient, result),
    };

    let bytes = result.with_context(|| format!("could not copy {}", direction))?;
    debug!("{} finished: {} bytes", direction, bytes);

    Ok(PumpEnd { direction, bytes })
}
