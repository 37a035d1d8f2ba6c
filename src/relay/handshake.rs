//! Handshake relay
//!
//! Forwards the version/method negotiation verbatim in both directions.

use anyhow::{Context, Result};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

/// Relay the method negotiation and return the method the server selected
///
/// ```text
/// client -> server: |VER | NMETHODS | METHODS  |
///                   | 1  |    1     | 1 to 255 |
/// server -> client: |VER | METHOD |
///                   | 1  |   1    |
/// ```
///
/// Nothing is validated; exactly `2 + NMETHODS` bytes are taken from the
/// client and exactly 2 from the server.
pub async fn relay_handshake<C, S>(client: &mut C, server: &mut S) -> Result<u8>
where
    C: AsyncRead + AsyncWrite + Unpin,
    S: AsyncRead + AsyncWrite + Unpin,
{
    let mut header = [0u8; 2];
    client
        .read_exact(&mut header)
        .await
        .context("could not read handshake header (socks_version + n_methods) from the client")?;
    server
        .write_all(&header)
        .await
        .context("could not write handshake header (socks_version + n_methods) to the server")?;

    let mut methods = [0u8; u8::MAX as usize];
    let methods = &mut methods[..header[1] as usize];
    client
        .read_exact(methods)
        .await
        .context("could not read methods from the client")?;
    server
        .write_all(methods)
        .await
        .context("could not write methods to the server")?;
    server
        .flush()
        .await
        .context("could not flush methods to the server")?;

    let mut reply = [0u8; 2];
    server
        .read_exact(&mut reply)
        .await
        .context("could not read handshake reply from the server")?;
    client
        .write_all(&reply)
        .await
        .context("could not write handshake reply to the client")?;
    client
        .flush()
        .await
        .context("could not flush handshake reply to the client")?;

    tracing::debug!(
        "Handshake relayed: {} method(s) offered, server selected {:#04x}",
        header[1],
        reply[1]
    );

    Ok(reply[1])
}
