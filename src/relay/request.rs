//! CONNECT request relay
//!
//! Forwards the request header, destination address and port to the
//! upstream server. Domain destinations are resolved here and forwarded as
//! IPv4 or IPv6 requests; the raw name never reaches the server.

use super::consts::*;
use super::resolver::{select_address, Resolve};
use crate::config::AddressFamily;
use crate::error::Socks5Error;
use anyhow::{Context, Result};
use std::net::IpAddr;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tracing::debug;

/// Relay a SOCKS5 request from the client to the upstream server
///
/// # SOCKS5 Request Format
///
/// ```text
/// +----+-----+-------+------+----------+----------+
/// |VER | CMD |  RSV  | ATYP | DST.ADDR | DST.PORT |
/// +----+-----+-------+------+----------+----------+
/// | 1  |  1  | X'00' |  1   | Variable |    2     |
/// +----+-----+-------+------+----------+----------+
/// ```
///
/// An unknown ATYP fails before anything is written upstream or any
/// address byte is consumed from the client.
pub async fn relay_request<C, S>(
    client: &mut C,
    server: &mut S,
    resolver: &dyn Resolve,
    family: AddressFamily,
) -> Result<()>
where
    C: AsyncRead + AsyncWrite + Unpin,
    S: AsyncRead + AsyncWrite + Unpin,
{
    let mut header = [0u8; 4];
    client
        .read_exact(&mut header)
        .await
        .context("could not read request header from the client")?;

    match header[3] {
        SOCKS5_ADDR_TYPE_DOMAIN => {
            server
                .write_all(&header[..3])
                .await
                .context("could not write request header to the server")?;

            let domain = read_domain(client).await?;
            let candidates = resolver
                .lookup(&domain)
                .await
                .context("could not resolve the destination")?;
            let ip = select_address(&candidates, family)
                .ok_or_else(|| Socks5Error::ResolveFailed(domain.clone()))?;
            debug!("Resolved {} to {}", domain, ip);

            write_resolved(server, ip).await?;
        }
        SOCKS5_ADDR_TYPE_IPV4 => {
            relay_fixed_address::<C, S, IPV4_ADDR_LEN>(client, server, &header).await?;
        }
        SOCKS5_ADDR_TYPE_IPV6 => {
            relay_fixed_address::<C, S, IPV6_ADDR_LEN>(client, server, &header).await?;
        }
        other => return Err(Socks5Error::InvalidAddressType(other).into()),
    }

    let mut port = [0u8; PORT_LEN];
    client
        .read_exact(&mut port)
        .await
        .context("could not read the destination port from the client")?;
    server
        .write_all(&port)
        .await
        .context("could not write the destination port to the server")?;
    server
        .flush()
        .await
        .context("could not flush the request to the server")?;

    debug!(
        "Request relayed: cmd {:#04x}, port {}",
        header[1],
        u16::from_be_bytes(port)
    );

    Ok(())
}

/// Forward the header untouched followed by an `N` byte address
async fn relay_fixed_address<C, S, const N: usize>(
    client: &mut C,
    server: &mut S,
    header: &[u8; 4],
) -> Result<()>
where
    C: AsyncRead + Unpin,
    S: AsyncWrite + Unpin,
{
    server
        .write_all(header)
        .await
        .context("could not write request header to the server")?;

    let mut addr = [0u8; N];
    client
        .read_exact(&mut addr)
        .await
        .context("could not read destination address from the client")?;
    server
        .write_all(&addr)
        .await
        .context("could not write destination address to the server")?;

    Ok(())
}

/// Consume a length-prefixed domain name from the client
///
/// Names that are not valid UTF-8 cannot be looked up as sent and fail.
async fn read_domain<C>(client: &mut C) -> Result<String>
where
    C: AsyncRead + Unpin,
{
    let mut len = [0u8; 1];
    client
        .read_exact(&mut len)
        .await
        .context("could not read the length of the domain name from the client")?;

    let mut name = [0u8; MAX_FIELD_LEN];
    let name = &mut name[..len[0] as usize];
    client
        .read_exact(name)
        .await
        .context("could not read the domain name from the client")?;

    match std::str::from_utf8(name) {
        Ok(domain) => Ok(domain.to_string()),
        Err(_) => {
            let lossy = String::from_utf8_lossy(name).into_owned();
            Err(Socks5Error::ResolveFailed(lossy).into())
        }
    }
}

/// Write ATYP and the resolved address in place of the domain
async fn write_resolved<S>(server: &mut S, ip: IpAddr) -> Result<()>
where
    S: AsyncWrite + Unpin,
{
    let mut buf = [0u8; 1 + IPV6_ADDR_LEN];
    let len = match ip {
        IpAddr::V4(v4) => {
            buf[0] = SOCKS5_ADDR_TYPE_IPV4;
            buf[1..1 + IPV4_ADDR_LEN].copy_from_slice(&v4.octets());
            1 + IPV4_ADDR_LEN
        }
        IpAddr::V6(v6) => {
            buf[0] = SOCKS5_ADDR_TYPE_IPV6;
            buf[1..].copy_from_slice(&v6.octets());
            1 + IPV6_ADDR_LEN
        }
    };

    server
        .write_all(&buf[..len])
        .await
        .context("could not write the resolved address to the server")?;
    Ok(())
}
