//! Domain resolution for rewritten requests
//!
//! The upstream server only ever sees resolved addresses, so domain requests
//! are looked up locally before the request is forwarded.

use crate::config::AddressFamily;
use crate::error::Socks5Error;
use async_trait::async_trait;
use std::fmt::Debug;
use std::future::Future;
use std::io;
use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

/// Name resolution used by the request relay
#[async_trait]
pub trait Resolve: Debug + Send + Sync {
    /// Resolve a domain name to its addresses, in resolver order
    ///
    /// Must fail rather than return an empty list.
    async fn lookup(&self, domain: &str) -> Result<Vec<IpAddr>, Socks5Error>;
}

/// Resolver backed by the operating system (`getaddrinfo`)
#[derive(Debug, Clone)]
pub struct SystemResolver {
    timeout: Duration,
}

impl SystemResolver {
    /// Create a resolver whose lookups give up after `timeout`
    pub fn new(timeout: Duration) -> Self {
        SystemResolver { timeout }
    }
}

impl Default for SystemResolver {
    fn default() -> Self {
        SystemResolver::new(Duration::from_secs(10))
    }
}

#[async_trait]
impl Resolve for SystemResolver {
    async fn lookup(&self, domain: &str) -> Result<Vec<IpAddr>, Socks5Error> {
        lookup_within(domain, self.timeout, tokio::net::lookup_host((domain, 0u16))).await
    }
}

/// Bound a pending lookup by `timeout`, collecting the resolved addresses
async fn lookup_within<F, I>(
    domain: &str,
    timeout: Duration,
    lookup: F,
) -> Result<Vec<IpAddr>, Socks5Error>
where
    F: Future<Output = io::Result<I>>,
    I: Iterator<Item = SocketAddr>,
{
    let failed = || Socks5Error::ResolveFailed(domain.to_string());

    let addrs = match tokio::time::timeout(timeout, lookup).await {
        Ok(Ok(addrs)) => addrs,
        Ok(Err(e)) => {
            tracing::debug!("Lookup of {} failed: {}", domain, e);
            return Err(failed());
        }
        Err(_) => {
            tracing::debug!("Lookup of {} timed out after {:?}", domain, timeout);
            return Err(failed());
        }
    };

    let ips: Vec<IpAddr> = addrs.map(|addr| addr.ip()).collect();
    if ips.is_empty() {
        return Err(failed());
    }
    Ok(ips)
}

/// Pick the address a domain request is rewritten to
///
/// IPv4-mapped IPv6 results count as IPv4 and are returned unmapped.
pub fn select_address(candidates: &[IpAddr], family: AddressFamily) -> Option<IpAddr> {
    let preferred = match family {
        AddressFamily::First => None,
        AddressFamily::V4First => candidates.iter().find(|ip| ipv4_form(ip).is_some()),
        AddressFamily::V6First => candidates.iter().find(|ip| ipv4_form(ip).is_none()),
    };

    preferred
        .or_else(|| candidates.first())
        .map(|ip| match ipv4_form(ip) {
            Some(v4) => IpAddr::V4(v4),
            None => *ip,
        })
}

fn ipv4_form(ip: &IpAddr) -> Option<std::net::Ipv4Addr> {
    match ip {
        IpAddr::V4(v4) => Some(*v4),
        IpAddr::V6(v6) => v6.to_ipv4_mapped(),
    }
}
