//! Relay server
//!
//! Accepts client connections, dials the upstream SOCKS5 server once per
//! client and hands the pair to [`handle_connection`].

use crate::config::RelayConfig;
use crate::relay::{handle_connection, SessionOptions, SystemResolver};
use crate::transport::{SocketOpts, TcpDialer};
use anyhow::{Context, Result};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::broadcast;
use tracing::{debug, error, info, warn};

/// SOCKS5 relay in front of a single upstream server
#[derive(Debug, Clone)]
pub struct Relay {
    /// Relay configuration
    config: RelayConfig,
    /// Upstream dialer
    dialer: TcpDialer,
    /// Options shared by every session
    options: SessionOptions,
}

impl Relay {
    /// Create a relay with default timeouts
    pub fn new(bind_addr: impl Into<String>, server_addr: impl Into<String>) -> Self {
        Self::from_config(RelayConfig::new(bind_addr, server_addr))
    }

    /// Create a relay from configuration
    pub fn from_config(config: RelayConfig) -> Self {
        let dialer = TcpDialer::new(config.server_addr.clone())
            .with_socket_opts(SocketOpts::from_tcp_config(&config.tcp))
            .with_connect_timeout(config.connect_timeout());
        let options = SessionOptions {
            resolver: Arc::new(SystemResolver::new(config.resolve_timeout())),
            address_family: config.address_family,
        };

        Relay {
            config,
            dialer,
            options,
        }
    }

    /// Get a reference to the configuration
    pub fn config(&self) -> &RelayConfig {
        &self.config
    }

    /// Accept connections until the listener fails
    pub async fn serve(self) -> Result<()> {
        // Never fires; the sender lives as long as the accept loop.
        let (_shutdown_tx, shutdown_rx) = broadcast::channel(1);
        self.serve_with_shutdown(shutdown_rx).await
    }

    /// Accept connections until the listener fails or shutdown is signalled
    pub async fn serve_with_shutdown(self, shutdown_rx: broadcast::Receiver<bool>) -> Result<()> {
        let listener = TcpListener::bind(&self.config.bind_addr)
            .await
            .with_context(|| format!("could not listen on {}", self.config.bind_addr))?;

        self.serve_listener(listener, shutdown_rx).await
    }

    /// Accept connections on an already bound listener
    pub async fn serve_listener(
        self,
        listener: TcpListener,
        mut shutdown_rx: broadcast::Receiver<bool>,
    ) -> Result<()> {
        info!("Serving on {}", listener.local_addr()?);
        info!("Upstream server address is {}", self.dialer.addr());

        let socket_opts = SocketOpts::from_tcp_config(&self.config.tcp);

        loop {
            tokio::select! {
                accepted = listener.accept() => {
                    let (client, peer) = match accepted {
                        Ok(conn) => conn,
                        Err(e) => {
                            error!("Accept failed: {}", e);
                            return Err(e).context("could not accept connections");
                        }
                    };
                    socket_opts.hint(&client);

                    let dialer = self.dialer.clone();
                    let options = self.options.clone();
                    tokio::spawn(async move {
                        if let Err(e) = run_session(client, peer, &dialer, &options).await {
                            warn!("Connection from {} failed: {:#}", peer, e);
                        }
                    });
                }
                _ = shutdown_rx.recv() => {
                    info!("Shutdown signal received, stopping relay");
                    return Ok(());
                }
            }
        }
    }
}

/// Dial upstream and relay one client until either side is done
async fn run_session(
    client: TcpStream,
    peer: SocketAddr,
    dialer: &TcpDialer,
    options: &SessionOptions,
) -> Result<()> {
    debug!("Accepted connection from {}", peer);

    let server = dialer
        .connect()
        .await
        .context("could not establish server connection")?;

    let end = handle_connection(client, server, options)
        .await
        .context("connection failed")?;

    debug!(
        "Connection from {} closed after {} ended ({} bytes)",
        peer, end.direction, end.bytes
    );
    Ok(())
}
