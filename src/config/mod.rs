//! Configuration module for the favorites engine.
//!
//! All configuration is loaded from environment variables with sensible defaults.

use std::env;
use std::path::PathBuf;

/// Engine configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the LifeHacks API (favorites and tip-lookup endpoints)
    pub api_base_url: String,
    /// Directory for durable local state (the anonymous favorites file)
    pub data_dir: PathBuf,
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let api_base_url = env::var("LIFEHACKS_API_URL")
            .unwrap_or_else(|_| "http://127.0.0.1:8080/api".to_string());

        let data_dir = env::var("LIFEHACKS_DATA_DIR")
            .unwrap_or_else(|_| "./data".to_string())
            .into();

        let log_level = env::var("LIFEHACKS_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        Self {
            api_base_url,
            data_dir,
            log_level,
        }
    }
}
