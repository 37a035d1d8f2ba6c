//! SOCKS5 authentication dispatch
//!
//! Maps the method the upstream server selected during the handshake to the
//! handler that relays its sub-negotiation.

mod none;
mod password;

pub use none::NoAuth;
pub use password::PasswordAuth;

use super::consts::*;
use crate::error::Socks5Error;
use anyhow::Result;
use std::fmt;
use tokio::io::{AsyncRead, AsyncWrite};

/// Authentication handlers the relay knows how to forward
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthHandler {
    /// No authentication required
    NoAuth,
    /// Username/password authentication
    UsernamePassword,
}

impl AuthHandler {
    /// Look up the handler for a method code
    ///
    /// GSSAPI and "no acceptable methods" are valid protocol values but have
    /// no handler, so they fail like any other unknown code.
    pub fn for_method(method: u8) -> Result<Self, Socks5Error> {
        match method {
            SOCKS5_AUTH_METHOD_NONE => Ok(AuthHandler::NoAuth),
            SOCKS5_AUTH_METHOD_PASSWORD => Ok(AuthHandler::UsernamePassword),
            other => Err(Socks5Error::UnsupportedAuthMethod(other)),
        }
    }

    /// SOCKS5 method byte served by this handler
    pub fn method(self) -> u8 {
        match self {
            AuthHandler::NoAuth => SOCKS5_AUTH_METHOD_NONE,
            AuthHandler::UsernamePassword => SOCKS5_AUTH_METHOD_PASSWORD,
        }
    }

    /// Run the sub-negotiation between client and upstream server
    pub async fn handle<C, S>(self, client: &mut C, server: &mut S) -> Result<()>
    where
        C: AsyncRead + AsyncWrite + Unpin,
        S: AsyncRead + AsyncWrite + Unpin,
    {
        match self {
            AuthHandler::NoAuth => NoAuth::relay(client, server).await,
            AuthHandler::UsernamePassword => PasswordAuth::relay(client, server).await,
        }
    }
}

impl fmt::Display for AuthHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthHandler::NoAuth => write!(f, "no-auth"),
            AuthHandler::UsernamePassword => write!(f, "username/password"),
        }
    }
}
