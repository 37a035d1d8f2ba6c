//! SOCKS5 relay core
//!
//! Forwards the SOCKS5 control exchanges between a client and a real SOCKS5
//! server byte-for-byte, rewriting only domain requests into resolved
//! addresses, then pumps raw bytes in both directions.

mod auth;
mod consts;
mod handshake;
mod pump;
mod request;
mod resolver;
mod session;

pub use auth::{AuthHandler, NoAuth, PasswordAuth};
pub use consts::*;
pub use handshake::relay_handshake;
pub use pump::{pump, Direction, PumpEnd};
pub use request::relay_request;
pub use resolver::{select_address, Resolve, SystemResolver};
pub use session::{handle_connection, SessionOptions};
