//! # Sockrelay - Transparent SOCKS5 Relay
//!
//! Sockrelay sits between a SOCKS5 client and a real SOCKS5 server. It
//! forwards the control exchanges byte-for-byte, understanding just enough
//! of the wire format to relay the authentication sub-negotiation and to
//! resolve domain-name requests locally before the server sees them. After
//! the CONNECT request has been relayed it becomes a plain byte pipe.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use sockrelay::Relay;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     Relay::new("127.0.0.1:1080", "10.0.0.2:1080").serve().await
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! SOCKS5 Client -> Sockrelay -> SOCKS5 Server -> Target
//! ```
//!
//! Each accepted client gets its own task and its own upstream connection.
//! Within a session the phases run strictly in order: handshake, auth
//! sub-negotiation, request, then the bidirectional pump.

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

pub mod config;
pub mod error;
pub mod relay;
pub mod server;
pub mod transport;

// Re-export commonly used items
pub use config::{load_config, Config, RelayConfig};
pub use error::{RelayError, Socks5Error};
pub use server::Relay;

/// Version of the Sockrelay library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Name of the application
pub const NAME: &str = env!("CARGO_PKG_NAME");
