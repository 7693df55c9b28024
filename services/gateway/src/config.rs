//! Server configuration

use anyhow::Result;
use std::{env, net::SocketAddr};
use tracing::warn;

/// Which credential store backs the service
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    Postgres,
    Memory,
}

/// HTTP server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Send the token cookie with the `Secure` attribute
    pub cookie_secure: bool,
    pub store_backend: StoreBackend,
}

impl ServerConfig {
    /// Create a new ServerConfig from environment variables
    ///
    /// # Environment Variables
    /// - `HOST`: Bind address (default: "0.0.0.0")
    /// - `PORT`: Bind port (default: 8080)
    /// - `COOKIE_SECURE`: Mark the token cookie Secure (default: false)
    /// - `STORE_BACKEND`: "postgres" or "memory" (default: "postgres")
    pub fn from_env() -> Result<Self> {
        let host = env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());

        let port = match env::var("PORT") {
            Ok(port) => port
                .parse()
                .map_err(|e| anyhow::anyhow!("Invalid PORT value {}: {}", port, e))?,
            Err(_) => 8080,
        };

        let cookie_secure = env::var("COOKIE_SECURE")
            .map(|v| matches!(v.trim().to_lowercase().as_str(), "true" | "1" | "yes"))
            .unwrap_or(false);

        let store_backend = match env::var("STORE_BACKEND")
            .unwrap_or_default()
            .trim()
            .to_lowercase()
            .as_str()
        {
            "" | "postgres" => StoreBackend::Postgres,
            "memory" => {
                warn!("Using in-memory credential store; accounts will not survive a restart");
                StoreBackend::Memory
            }
            other => anyhow::bail!("Unknown STORE_BACKEND: {}", other),
        };

        Ok(ServerConfig {
            host,
            port,
            cookie_secure,
            store_backend,
        })
    }

    pub fn bind_address(&self) -> Result<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|e| anyhow::anyhow!("Invalid bind address: {}", e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    fn clear() {
        unsafe {
            env::remove_var("HOST");
            env::remove_var("PORT");
            env::remove_var("COOKIE_SECURE");
            env::remove_var("STORE_BACKEND");
        }
    }

    #[test]
    #[serial]
    fn test_server_config_defaults() {
        clear();

        let config = ServerConfig::from_env().unwrap();
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 8080);
        assert!(!config.cookie_secure);
        assert_eq!(config.store_backend, StoreBackend::Postgres);
        assert_eq!(config.bind_address().unwrap().port(), 8080);
    }

    #[test]
    #[serial]
    fn test_server_config_custom_values() {
        clear();
        unsafe {
            env::set_var("HOST", "127.0.0.1");
            env::set_var("PORT", "3000");
            env::set_var("COOKIE_SECURE", "true");
            env::set_var("STORE_BACKEND", "Memory");
        }

        let config = ServerConfig::from_env().unwrap();
        assert_eq!(config.bind_address().unwrap().to_string(), "127.0.0.1:3000");
        assert!(config.cookie_secure);
        assert_eq!(config.store_backend, StoreBackend::Memory);

        clear();
    }

    #[test]
    #[serial]
    fn test_server_config_rejects_bad_values() {
        clear();
        unsafe {
            env::set_var("PORT", "eighty");
        }
        assert!(ServerConfig::from_env().is_err());

        clear();
        unsafe {
            env::set_var("STORE_BACKEND", "mongo");
        }
        assert!(ServerConfig::from_env().is_err());

        clear();
    }
}
