//! Error types for Sockrelay
//!
//! Protocol-level failures are typed so callers (and tests) can tell them
//! apart; every phase attaches a human-readable context on top via `anyhow`.

use std::io;
use thiserror::Error;

/// Main error type for relay operations outside the SOCKS5 byte stream
#[derive(Error, Debug)]
pub enum RelayError {
    /// IO error while dialing the upstream server
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Timeout error
    #[error("Timeout: {0}")]
    Timeout(String),
}

/// SOCKS5 errors raised while relaying the control phases
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Socks5Error {
    /// The upstream server selected a method the relay has no handler for
    #[error("unsupported auth method: {0}")]
    UnsupportedAuthMethod(u8),

    /// The request header carried an unknown address type
    #[error("invalid address type -> ({0}) <-")]
    InvalidAddressType(u8),

    /// A domain request could not be turned into an address
    #[error("could not resolve the domain name ({0})")]
    ResolveFailed(String),

    /// The upstream server answered the sub-negotiation with a non-zero status
    #[error("username/password authentication failed (status {0})")]
    AuthFailed(u8),
}
