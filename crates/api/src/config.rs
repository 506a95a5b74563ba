//! Server configuration.

use std::env;
use std::net::SocketAddr;

use thiserror::Error;

pub const DEFAULT_ADDR: &str = "0.0.0.0:8000";
pub const DEFAULT_CORS_ORIGIN: &str = "http://localhost:3000";

/// Errors that prevent the server from starting.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid API_ADDR '{0}'")]
    InvalidAddr(String),

    #[error("invalid CORS_ORIGIN '{0}'")]
    InvalidOrigin(String),
}

/// Server settings read from the environment.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Listen address.
    pub addr: SocketAddr,
    /// Bearer token required on `/ask`; unset disables auth.
    pub api_token: Option<String>,
    /// Front-end origin allowed by CORS.
    pub cors_origin: String,
}

impl ApiConfig {
    /// Read `API_ADDR`, `API_TOKEN` and `CORS_ORIGIN`.
    pub fn from_env() -> Result<Self, ConfigError> {
        let raw_addr = env::var("API_ADDR").unwrap_or_else(|_| DEFAULT_ADDR.to_string());
        let addr = raw_addr
            .parse()
            .map_err(|_| ConfigError::InvalidAddr(raw_addr.clone()))?;

        let api_token = env::var("API_TOKEN")
            .ok()
            .filter(|token| !token.trim().is_empty());

        let cors_origin = env::var("CORS_ORIGIN")
            .ok()
            .filter(|origin| !origin.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_CORS_ORIGIN.to_string());

        Ok(Self {
            addr,
            api_token,
            cors_origin,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    static ENV_LOCK: Mutex<()> = Mutex::new(());

    fn clear_all_api_vars() {
        env::remove_var("API_ADDR");
        env::remove_var("API_TOKEN");
        env::remove_var("CORS_ORIGIN");
    }

    #[test]
    fn test_defaults() {
        let _guard = ENV_LOCK.lock().unwrap();
        clear_all_api_vars();

        let config = ApiConfig::from_env().unwrap();
        assert_eq!(config.addr.to_string(), "0.0.0.0:8000");
        assert!(config.api_token.is_none());
        assert_eq!(config.cors_origin, "http://localhost:3000");
    }

    #[test]
    fn test_overrides_and_invalid_addr() {
        let _guard = ENV_LOCK.lock().unwrap();
        clear_all_api_vars();

        env::set_var("API_ADDR", "127.0.0.1:9000");
        env::set_var("API_TOKEN", "secret");
        env::set_var("CORS_ORIGIN", "https://charts.example.org");
        let config = ApiConfig::from_env().unwrap();
        assert_eq!(config.addr.port(), 9000);
        assert_eq!(config.api_token.as_deref(), Some("secret"));
        assert_eq!(config.cors_origin, "https://charts.example.org");

        env::set_var("API_ADDR", "not-an-address");
        assert!(matches!(ApiConfig::from_env(), Err(ConfigError::InvalidAddr(_))));

        clear_all_api_vars();
    }
}
