//! HTTP server settings read from environment variables.

use std::net::SocketAddr;

use crate::errors::{Error, Result};

const DEFAULT_BIND_ADDRESS: &str = "0.0.0.0:8000";

/// Settings for the REST listener
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Socket the API listens on (`BIND_ADDRESS`)
    pub bind_address: SocketAddr,
}

impl ServerConfig {
    /// Reads `BIND_ADDRESS` from the environment, defaulting to `0.0.0.0:8000`.
    ///
    /// # Errors
    /// Returns `Error::Config` when the variable is set but is not a socket address.
    pub fn from_env() -> Result<Self> {
        let raw =
            std::env::var("BIND_ADDRESS").unwrap_or_else(|_| DEFAULT_BIND_ADDRESS.to_string());
        Self::parse(&raw)
    }

    fn parse(raw: &str) -> Result<Self> {
        let bind_address = raw.parse().map_err(|e| Error::Config {
            message: format!("Invalid BIND_ADDRESS '{raw}': {e}"),
        })?;
        Ok(Self { bind_address })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_bind_address() {
        let config = ServerConfig::parse("127.0.0.1:9000");
        assert!(config.is_ok_and(|c| c.bind_address.port() == 9000));
    }

    #[test]
    fn test_parse_invalid_bind_address() {
        assert!(matches!(
            ServerConfig::parse("not-an-address"),
            Err(Error::Config { .. })
        ));
    }
}
