//! Relay configuration types
//!
//! Defines the main configuration structures for the Sockrelay server.

use super::TcpConfig;
use crate::error::RelayError;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default upstream dial timeout in seconds
fn default_connect_timeout() -> u64 {
    5
}

/// Default domain resolution timeout in seconds
fn default_resolve_timeout() -> u64 {
    10
}

/// Root configuration structure
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Config {
    /// Relay configuration
    pub relay: RelayConfig,
}

/// Which resolved address a domain request is rewritten to
#[derive(Debug, Serialize, Deserialize, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AddressFamily {
    /// Whatever the resolver returned first
    #[default]
    First,
    /// First IPv4 candidate, falling back to the first result
    V4First,
    /// First IPv6 candidate, falling back to the first result
    V6First,
}

/// Relay configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct RelayConfig {
    /// Local address clients connect to (e.g., "127.0.0.1:1080")
    pub bind_addr: String,

    /// Upstream SOCKS5 server address (e.g., "10.0.0.2:1080")
    pub server_addr: String,

    /// Upstream dial timeout in seconds
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout: u64,

    /// Domain resolution timeout in seconds
    #[serde(default = "default_resolve_timeout")]
    pub resolve_timeout: u64,

    /// Address selection for domain requests
    #[serde(default)]
    pub address_family: AddressFamily,

    /// Socket options
    #[serde(default)]
    pub tcp: TcpConfig,
}

impl RelayConfig {
    /// Create a configuration with default timeouts for the given addresses
    pub fn new(bind_addr: impl Into<String>, server_addr: impl Into<String>) -> Self {
        RelayConfig {
            bind_addr: bind_addr.into(),
            server_addr: server_addr.into(),
            connect_timeout: default_connect_timeout(),
            resolve_timeout: default_resolve_timeout(),
            address_family: AddressFamily::default(),
            tcp: TcpConfig::default(),
        }
    }

    /// Upstream dial timeout
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout)
    }

    /// Domain resolution timeout
    pub fn resolve_timeout(&self) -> Duration {
        Duration::from_secs(self.resolve_timeout)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), RelayError> {
        if self.bind_addr.trim().is_empty() {
            return Err(RelayError::Config("bind_addr must not be empty".to_string()));
        }
        if self.server_addr.trim().is_empty() {
            return Err(RelayError::Config(
                "server_addr must not be empty".to_string(),
            ));
        }
        if self.connect_timeout == 0 {
            return Err(RelayError::Config(
                "connect_timeout must be at least 1 second".to_string(),
            ));
        }
        if self.resolve_timeout == 0 {
            return Err(RelayError::Config(
                "resolve_timeout must be at least 1 second".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_relay_config_new_defaults() {
        let config = RelayConfig::new("127.0.0.1:1080", "10.0.0.2:1080");
        assert_eq!(config.connect_timeout(), Duration::from_secs(5));
        assert_eq!(config.resolve_timeout(), Duration::from_secs(10));
        assert_eq!(config.address_family, AddressFamily::First);
        assert_eq!(config.tcp, TcpConfig::default());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_relay_config_validate() {
        let config = RelayConfig::new("", "10.0.0.2:1080");
        assert!(matches!(config.validate(), Err(RelayError::Config(_))));

        let config = RelayConfig::new("127.0.0.1:1080", "  ");
        assert!(matches!(config.validate(), Err(RelayError::Config(_))));

        let config = RelayConfig {
            connect_timeout: 0,
            ..RelayConfig::new("127.0.0.1:1080", "10.0.0.2:1080")
        };
        assert!(config
            .validate()
            .unwrap_err()
            .to_string()
            .contains("connect_timeout"));

        let config = RelayConfig {
            resolve_timeout: 0,
            ..RelayConfig::new("127.0.0.1:1080", "10.0.0.2:1080")
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_address_family_serde_names() {
        #[derive(Deserialize)]
        struct Wrapper {
            family: AddressFamily,
        }

        let w: Wrapper = toml::from_str("family = \"v6_first\"").unwrap();
        assert_eq!(w.family, AddressFamily::V6First);
        let w: Wrapper = toml::from_str("family = \"first\"").unwrap();
        assert_eq!(w.family, AddressFamily::First);
    }
}
