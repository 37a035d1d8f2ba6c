//! Username/password sub-negotiation relay
//!
//! Forwards the RFC 1929 exchange between client and upstream server.

use crate::error::Socks5Error;
use crate::relay::consts::{MAX_AUTH_REQUEST_LEN, SOCKS5_AUTH_STATUS_SUCCESS};
use anyhow::{Context, Result};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tracing::debug;

/// Username/password authentication handler
pub struct PasswordAuth;

impl PasswordAuth {
    /// Relay username/password authentication
    ///
    /// # Protocol
    ///
    /// Client sends:
    /// ```text
    /// +----+------+----------+------+----------+
    /// |VER | ULEN |  UNAME   | PLEN |  PASSWD  |
    /// +----+------+----------+------+----------+
    /// | 1  |  1   | 0 to 255 |  1   | 0 to 255 |
    /// +----+------+----------+------+----------+
    /// ```
    ///
    /// Server responds:
    /// ```text
    /// +----+--------+
    /// |VER | STATUS |
    /// +----+--------+
    /// | 1  |   1    |
    /// +----+--------+
    /// ```
    ///
    /// The request goes upstream as one contiguous write. The status reply is
    /// relayed to the client before a non-zero status is turned into
    /// [`Socks5Error::AuthFailed`].
    pub async fn relay<C, S>(client: &mut C, server: &mut S) -> Result<()>
    where
        C: AsyncRead + AsyncWrite + Unpin,
        S: AsyncRead + AsyncWrite + Unpin,
    {
        // ULEN and PLEN are single bytes, so every slice below ends at or
        // before MAX_AUTH_REQUEST_LEN.
        let mut buf = [0u8; MAX_AUTH_REQUEST_LEN];

        client
            .read_exact(&mut buf[..2])
            .await
            .context("could not read auth header (version + username length) from the client")?;
        let username_end = 2 + buf[1] as usize;

        // Username plus the password length byte that follows it
        client
            .read_exact(&mut buf[2..username_end + 1])
            .await
            .context("could not read username from the client")?;
        let password_len = buf[username_end] as usize;
        let request_len = username_end + 1 + password_len;

        client
            .read_exact(&mut buf[username_end + 1..request_len])
            .await
            .context("could not read password from the client")?;

        server
            .write_all(&buf[..request_len])
            .await
            .context("could not write credentials to the server")?;
        server
            .flush()
            .await
            .context("could not flush credentials to the server")?;

        let mut reply = [0u8; 2];
        server
            .read_exact(&mut reply)
            .await
            .context("could not read auth reply from the server")?;
        client
            .write_all(&reply)
            .await
            .context("could not write auth reply to the client")?;
        client
            .flush()
            .await
            .context("could not flush auth reply to the client")?;

        let username = String::from_utf8_lossy(&buf[2..username_end]);
        let status = reply[1];
        if status != SOCKS5_AUTH_STATUS_SUCCESS {
            debug!("Upstream rejected user {:?} with status {}", username, status);
            return Err(Socks5Error::AuthFailed(status).into());
        }

        debug!("Upstream accepted user {:?}", username);
        Ok(())
    }
}
