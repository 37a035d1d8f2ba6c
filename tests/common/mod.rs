//! Test utilities for Sockrelay
//!
//! Provides a running relay in front of a scripted upstream listener and
//! helpers to build SOCKS5 client messages.

#![allow(dead_code)]

use sockrelay::Relay;
use std::net::SocketAddr;
use std::time::Duration;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::broadcast;

/// Upper bound for any single step of a test
pub const STEP_TIMEOUT: Duration = Duration::from_secs(5);

/// Create a test TCP listener on an available port
pub async fn create_test_listener() -> (TcpListener, SocketAddr) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    (listener, addr)
}

/// A relay running on a loopback port
pub struct TestRelay {
    /// Address clients connect to
    pub addr: SocketAddr,
    /// Dropping or firing this stops the accept loop
    pub shutdown_tx: broadcast::Sender<bool>,
}

impl TestRelay {
    /// Start a relay forwarding to `upstream`
    pub async fn start(upstream: SocketAddr) -> Self {
        Self::start_relay(Relay::new("127.0.0.1:0", upstream.to_string())).await
    }

    /// Start an already configured relay on a fresh loopback port
    pub async fn start_relay(relay: Relay) -> Self {
        let (listener, addr) = create_test_listener().await;
        let (shutdown_tx, shutdown_rx) = broadcast::channel(1);
        tokio::spawn(relay.serve_listener(listener, shutdown_rx));
        TestRelay { addr, shutdown_tx }
    }

    /// Open a client connection to the relay
    pub async fn connect(&self) -> TcpStream {
        TcpStream::connect(self.addr).await.unwrap()
    }
}

/// Accept the relay's upstream connection
pub async fn accept_upstream(listener: &TcpListener) -> TcpStream {
    let (stream, _) = tokio::time::timeout(STEP_TIMEOUT, listener.accept())
        .await
        .expect("relay never dialed upstream")
        .unwrap();
    stream
}

/// Mock SOCKS5 client messages
pub mod socks5_mock {
    use sockrelay::relay::*;

    /// Create a method selection request offering the given methods
    pub fn create_handshake(methods: &[u8]) -> Vec<u8> {
        let mut request = vec![SOCKS5_VERSION, methods.len() as u8];
        request.extend_from_slice(methods);
        request
    }

    /// Create a username/password sub-negotiation request
    pub fn create_auth_request(username: &str, password: &str) -> Vec<u8> {
        let mut request = vec![SOCKS5_AUTH_VERSION, username.len() as u8];
        request.extend_from_slice(username.as_bytes());
        request.push(password.len() as u8);
        request.extend_from_slice(password.as_bytes());
        request
    }

    /// Create a connect command to IPv4 address
    pub fn create_connect_ipv4(ip: [u8; 4], port: u16) -> Vec<u8> {
        let mut cmd = vec![
            SOCKS5_VERSION,
            SOCKS5_CMD_TCP_CONNECT,
            SOCKS5_RESERVED,
            SOCKS5_ADDR_TYPE_IPV4,
        ];
        cmd.extend_from_slice(&ip);
        cmd.extend_from_slice(&port.to_be_bytes());
        cmd
    }

    /// Create a connect command to domain
    pub fn create_connect_domain(domain: &str, port: u16) -> Vec<u8> {
        let mut cmd = vec![
            SOCKS5_VERSION,
            SOCKS5_CMD_TCP_CONNECT,
            SOCKS5_RESERVED,
            SOCKS5_ADDR_TYPE_DOMAIN,
            domain.len() as u8,
        ];
        cmd.extend_from_slice(domain.as_bytes());
        cmd.extend_from_slice(&port.to_be_bytes());
        cmd
    }
}
