//! Session sequencing
//!
//! Runs the phases of one relayed connection in order. Every phase starts
//! reading exactly where the previous one stopped, so any failure ends the
//! session.

use super::auth::AuthHandler;
use super::handshake::relay_handshake;
use super::pump::{pump, PumpEnd};
use super::request::relay_request;
use super::resolver::{Resolve, SystemResolver};
use crate::config::AddressFamily;
use anyhow::{Context, Result};
use std::sync::Arc;
use tokio::io::{AsyncRead, AsyncWrite};
use tracing::debug;

/// Per-session settings shared by every connection of a relay
#[derive(Debug, Clone)]
pub struct SessionOptions {
    /// Resolver for domain requests
    pub resolver: Arc<dyn Resolve>,
    /// Address selection for domain requests
    pub address_family: AddressFamily,
}

impl Default for SessionOptions {
    fn default() -> Self {
        SessionOptions {
            resolver: Arc::new(SystemResolver::default()),
            address_family: AddressFamily::default(),
        }
    }
}

/// Relay one client connection through its upstream connection
///
/// # Protocol Flow
///
/// 1. Handshake relay
/// 2. Auth handler lookup from the server's selected method
/// 3. Sub-negotiation relay
/// 4. Request relay (domain requests rewritten to resolved addresses)
/// 5. Data pump until either side closes
///
/// Both streams are owned and closed by the time this returns.
pub async fn handle_connection<C, S>(
    mut client: C,
    mut server: S,
    options: &SessionOptions,
) -> Result<PumpEnd>
where
    C: AsyncRead + AsyncWrite + Unpin,
    S: AsyncRead + AsyncWrite + Unpin,
{
    let method = relay_handshake(&mut client, &mut server)
        .await
        .context("handshake failed")?;

    let handler = AuthHandler::for_method(method).context("auth dispatch failed")?;
    handler
        .handle(&mut client, &mut server)
        .await
        .with_context(|| format!("{} authentication failed", handler))?;
    debug!(
        "Authentication relayed with method: {} ({:#04x})",
        handler,
        handler.method()
    );

    relay_request(
        &mut client,
        &mut server,
        options.resolver.as_ref(),
        options.address_family,
    )
    .await
    .context("request relay failed")?;

    pump(client, server).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Socks5Error;
    use crate::relay::consts::*;
    use std::time::Duration;
    use tokio::io::{duplex, AsyncReadExt, AsyncWriteExt};
    use tokio_test::io::Builder;

    #[tokio::test]
    async fn test_handle_connection_no_auth_ipv4() {
        let handshake = [SOCKS5_VERSION, 1, SOCKS5_AUTH_METHOD_NONE];
        let request = [0x05, 0x01, 0x00, 0x01, 10, 1, 2, 3, 0x00, 0x50];

        let (mut client_peer, client) = duplex(1024);
        let (server, mut server_peer) = duplex(1024);

        client_peer.write_all(&handshake).await.unwrap();
        client_peer.write_all(&request).await.unwrap();
        server_peer
            .write_all(&[SOCKS5_VERSION, SOCKS5_AUTH_METHOD_NONE])
            .await
            .unwrap();

        let session = tokio::spawn(async move {
            handle_connection(client, server, &SessionOptions::default()).await
        });

        let mut upstream = [0u8; 13];
        server_peer.read_exact(&mut upstream).await.unwrap();
        assert_eq!(&upstream[..3], &handshake);
        assert_eq!(&upstream[3..], &request);

        let mut reply = [0u8; 2];
        client_peer.read_exact(&mut reply).await.unwrap();
        assert_eq!(reply, [SOCKS5_VERSION, SOCKS5_AUTH_METHOD_NONE]);

        // Pump phase: upstream's CONNECT reply and data go straight through
        server_peer.write_all(b"reply+data").await.unwrap();
        let mut data = [0u8; 10];
        client_peer.read_exact(&mut data).await.unwrap();
        assert_eq!(&data, b"reply+data");

        drop(server_peer);
        let end = tokio::time::timeout(Duration::from_secs(1), session)
            .await
            .unwrap()
            .unwrap()
            .unwrap();
        assert_eq!(end.direction, crate::relay::Direction::ServerToClient);

        let mut rest = Vec::new();
        client_peer.read_to_end(&mut rest).await.unwrap();
        assert!(rest.is_empty());
    }

    #[tokio::test]
    async fn test_handle_connection_unsupported_method() {
        for method in [SOCKS5_AUTH_METHOD_GSSAPI, SOCKS5_AUTH_METHOD_NOT_ACCEPTABLE] {
            // Auth bytes follow the handshake but must never be consumed
            let client = Builder::new()
                .read(&[SOCKS5_VERSION, 1, method])
                .write(&[SOCKS5_VERSION, method])
                .build();
            let server = Builder::new()
                .write(&[SOCKS5_VERSION, 1, method])
                .read(&[SOCKS5_VERSION, method])
                .build();

            let err = handle_connection(client, server, &SessionOptions::default())
                .await
                .unwrap_err();
            assert_eq!(err.to_string(), "auth dispatch failed");
            assert_eq!(
                err.downcast_ref::<Socks5Error>(),
                Some(&Socks5Error::UnsupportedAuthMethod(method))
            );
        }
    }

    #[tokio::test]
    async fn test_handle_connection_auth_rejected() {
        let client = Builder::new()
            .read(&[SOCKS5_VERSION, 1, SOCKS5_AUTH_METHOD_PASSWORD])
            .write(&[SOCKS5_VERSION, SOCKS5_AUTH_METHOD_PASSWORD])
            .read(&[SOCKS5_AUTH_VERSION, 1, b'u', 1, b'p'])
            .write(&[SOCKS5_AUTH_VERSION, 0x01])
            .build();
        let server = Builder::new()
            .write(&[SOCKS5_VERSION, 1, SOCKS5_AUTH_METHOD_PASSWORD])
            .read(&[SOCKS5_VERSION, SOCKS5_AUTH_METHOD_PASSWORD])
            .write(&[SOCKS5_AUTH_VERSION, 1, b'u', 1, b'p'])
            .read(&[SOCKS5_AUTH_VERSION, 0x01])
            .build();

        let err = handle_connection(client, server, &SessionOptions::default())
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "username/password authentication failed");
        assert_eq!(
            err.downcast_ref::<Socks5Error>(),
            Some(&Socks5Error::AuthFailed(0x01))
        );
    }

    #[tokio::test]
    async fn test_handle_connection_invalid_address_type() {
        let client = Builder::new()
            .read(&[SOCKS5_VERSION, 1, SOCKS5_AUTH_METHOD_NONE])
            .write(&[SOCKS5_VERSION, SOCKS5_AUTH_METHOD_NONE])
            .read(&[0x05, 0x01, 0x00, 0x09])
            .build();
        let server = Builder::new()
            .write(&[SOCKS5_VERSION, 1, SOCKS5_AUTH_METHOD_NONE])
            .read(&[SOCKS5_VERSION, SOCKS5_AUTH_METHOD_NONE])
            .build();

        let err = handle_connection(client, server, &SessionOptions::default())
            .await
            .unwrap_err();
        assert!(format!("{:#}", err).starts_with("request relay failed"));
        assert_eq!(
            err.downcast_ref::<Socks5Error>(),
            Some(&Socks5Error::InvalidAddressType(0x09))
        );
    }
}
