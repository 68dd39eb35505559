//! Server configuration.

use std::net::SocketAddr;

use super::parse::env_or;
use super::ConfigError;

/// Server configuration loaded from environment.
#[derive(Clone, Debug)]
pub struct ServerConfig {
    /// Listen address (default: 0.0.0.0:8080).
    pub listen_addr: SocketAddr,
}

impl ServerConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        let value = env_or("LISTEN_ADDR", "0.0.0.0:8080");
        let listen_addr: SocketAddr = value.parse().map_err(|e| ConfigError::Parse {
            key: "LISTEN_ADDR".into(),
            value: value.clone(),
            error: format!("{}", e),
        })?;

        Ok(Self { listen_addr })
    }
}
