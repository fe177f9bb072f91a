//! Configuration module for the employee registration service.
//!
//! All configuration is loaded from environment variables with sensible defaults.

use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use crate::errors::AppError;

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Path to the SQLite file backing local storage
    pub db_path: PathBuf,
    /// JSON file served and written by the mirror endpoint
    pub mirror_file: PathBuf,
    /// Address to bind the mirror endpoint to
    pub bind_addr: SocketAddr,
    /// Full URL of the remote owners document, if clients should mirror to one
    pub mirror_url: Option<String>,
    /// Timeout for a single mirror request
    pub mirror_timeout: Duration,
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, AppError> {
        dotenvy::dotenv().ok();

        let db_path = env::var("EMPREG_DB_PATH")
            .unwrap_or_else(|_| "./data/local.sqlite".to_string())
            .into();

        let mirror_file = env::var("EMPREG_MIRROR_FILE")
            .unwrap_or_else(|_| "./public/data/owners.json".to_string())
            .into();

        let bind_addr = env::var("EMPREG_BIND_ADDR")
            .unwrap_or_else(|_| "127.0.0.1:5173".to_string())
            .parse()
            .map_err(|e| AppError::Config(format!("Invalid EMPREG_BIND_ADDR: {}", e)))?;

        let mirror_url = env::var("EMPREG_MIRROR_URL")
            .ok()
            .filter(|url| !url.trim().is_empty());

        let mirror_timeout = match env::var("EMPREG_MIRROR_TIMEOUT_MS") {
            Ok(ms) => Duration::from_millis(ms.parse().map_err(|e| {
                AppError::Config(format!("Invalid EMPREG_MIRROR_TIMEOUT_MS: {}", e))
            })?),
            Err(_) => Duration::from_millis(5000),
        };

        let log_level = env::var("EMPREG_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        Ok(Self {
            db_path,
            mirror_file,
            bind_addr,
            mirror_url,
            mirror_timeout,
            log_level,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        // Clear any existing env vars
        env::remove_var("EMPREG_DB_PATH");
        env::remove_var("EMPREG_MIRROR_FILE");
        env::remove_var("EMPREG_BIND_ADDR");
        env::remove_var("EMPREG_MIRROR_URL");
        env::remove_var("EMPREG_MIRROR_TIMEOUT_MS");
        env::remove_var("EMPREG_LOG_LEVEL");

        let config = Config::from_env().unwrap();

        assert_eq!(config.db_path, PathBuf::from("./data/local.sqlite"));
        assert_eq!(config.mirror_file, PathBuf::from("./public/data/owners.json"));
        assert_eq!(config.bind_addr.to_string(), "127.0.0.1:5173");
        assert!(config.mirror_url.is_none());
        assert_eq!(config.mirror_timeout, Duration::from_millis(5000));
        assert_eq!(config.log_level, "info");
    }
}
