//! No authentication handler
//!
//! Used when the upstream server selected the no-authentication method.

use anyhow::Result;
use tokio::io::{AsyncRead, AsyncWrite};

/// No authentication handler
///
/// The upstream server requires nothing before the request phase, so
/// neither channel is touched.
pub struct NoAuth;

impl NoAuth {
    /// Relay the (empty) sub-negotiation
    pub async fn relay<C, S>(_client: &mut C, _server: &mut S) -> Result<()>
    where
        C: AsyncRead + AsyncWrite + Unpin,
        S: AsyncRead + AsyncWrite + Unpin,
    {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio_test::io::Builder;

    #[tokio::test]
    async fn test_no_auth_touches_nothing() {
        // Unscripted mocks: any write fails, any read sees EOF.
        let mut client = Builder::new().build();
        let mut server = Builder::new().build();
        let result = NoAuth::relay(&mut client, &mut server).await;
        assert!(result.is_ok());
    }
}
