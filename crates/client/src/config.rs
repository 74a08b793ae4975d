//! Client configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `TUNDA_API_BASE_URL` - Base URL of the Tunda REST API
//!   (e.g., `https://api.tunda.co.ke/api`)
//!
//! ## Optional
//! - `TUNDA_STORAGE_PATH` - Path of the durable storage file
//!   (default: `.tunda/storage.json`)
//! - `TUNDA_HTTP_TIMEOUT_SECS` - Per-request timeout in seconds (default: 30)

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;
use url::Url;

const DEFAULT_STORAGE_PATH: &str = ".tunda/storage.json";
const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Tunda client configuration.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL all API paths are resolved against.
    pub api_base_url: Url,
    /// Path of the durable storage file (tokens, guest cart).
    pub storage_path: PathBuf,
    /// Per-request timeout. The transport enforces this explicitly; there is
    /// no retry backoff anywhere in the client beyond the gateway's single
    /// refresh-and-retry.
    pub http_timeout: Duration,
}

impl ClientConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from a `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let api_base_url = get_required_env("TUNDA_API_BASE_URL")?
            .parse::<Url>()
            .map_err(|e| {
                ConfigError::InvalidEnvVar("TUNDA_API_BASE_URL".to_string(), e.to_string())
            })?;

        let storage_path =
            PathBuf::from(get_env_or_default("TUNDA_STORAGE_PATH", DEFAULT_STORAGE_PATH));

        let timeout_secs = get_env_or_default(
            "TUNDA_HTTP_TIMEOUT_SECS",
            &DEFAULT_HTTP_TIMEOUT_SECS.to_string(),
        )
        .parse::<u64>()
        .map_err(|e| {
            ConfigError::InvalidEnvVar("TUNDA_HTTP_TIMEOUT_SECS".to_string(), e.to_string())
        })?;

        Ok(Self {
            api_base_url,
            storage_path,
            http_timeout: Duration::from_secs(timeout_secs),
        })
    }

    /// Build a configuration directly, using defaults for storage and timeout.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if `api_base_url` is not a valid URL.
    pub fn new(api_base_url: &str) -> Result<Self, ConfigError> {
        let api_base_url = api_base_url.parse::<Url>().map_err(|e| {
            ConfigError::InvalidEnvVar("TUNDA_API_BASE_URL".to_string(), e.to_string())
        })?;

        Ok(Self {
            api_base_url,
            storage_path: PathBuf::from(DEFAULT_STORAGE_PATH),
            http_timeout: Duration::from_secs(DEFAULT_HTTP_TIMEOUT_SECS),
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}
