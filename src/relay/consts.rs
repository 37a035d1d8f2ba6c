//! SOCKS5 protocol constants
//!
//! Only the values the relay has to recognize to keep both channels
//! byte-aligned, plus the few a client needs to build requests.

/// SOCKS5 protocol version
pub const SOCKS5_VERSION: u8 = 0x05;

/// SOCKS5 authentication sub-negotiation version
pub const SOCKS5_AUTH_VERSION: u8 = 0x01;

/// Sub-negotiation status for accepted credentials
pub const SOCKS5_AUTH_STATUS_SUCCESS: u8 = 0x00;

// Authentication methods
/// No authentication required
pub const SOCKS5_AUTH_METHOD_NONE: u8 = 0x00;
/// GSSAPI authentication (recognized, no handler)
pub const SOCKS5_AUTH_METHOD_GSSAPI: u8 = 0x01;
/// Username/password authentication
pub const SOCKS5_AUTH_METHOD_PASSWORD: u8 = 0x02;
/// No acceptable methods
pub const SOCKS5_AUTH_METHOD_NOT_ACCEPTABLE: u8 = 0xFF;

/// TCP CONNECT command
pub const SOCKS5_CMD_TCP_CONNECT: u8 = 0x01;

/// Reserved byte value (always 0x00)
pub const SOCKS5_RESERVED: u8 = 0x00;

// Address types
/// IPv4 address
pub const SOCKS5_ADDR_TYPE_IPV4: u8 = 0x01;
/// Domain name
pub const SOCKS5_ADDR_TYPE_DOMAIN: u8 = 0x03;
/// IPv6 address
pub const SOCKS5_ADDR_TYPE_IPV6: u8 = 0x04;

// Field widths
/// IPv4 address length
pub const IPV4_ADDR_LEN: usize = 4;
/// IPv6 address length
pub const IPV6_ADDR_LEN: usize = 16;
/// Destination port length
pub const PORT_LEN: usize = 2;
/// Largest value a one-byte length field can carry
pub const MAX_FIELD_LEN: usize = u8::MAX as usize;
/// VER + ULEN + UNAME + PLEN + PASSWD at maximum field widths
pub const MAX_AUTH_REQUEST_LEN: usize = 3 + MAX_FIELD_LEN + MAX_FIELD_LEN;
