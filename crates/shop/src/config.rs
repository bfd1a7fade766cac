//! Shop client configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `EZFOOD_API_BASE_URL` - Base URL of the cafeteria server
//!
//! ## Optional
//! - `EZFOOD_SESSION_COOKIE` - Value of the server's `sessionid` cookie
//!   (required by the server for authenticated endpoints)
//! - `EZFOOD_CSRF_TOKEN` - Bootstrap value for the `csrftoken` cookie; when
//!   absent, the token must arrive via `Set-Cookie` before any mutating call
//! - `EZFOOD_DATA_DIR` - Directory for locally persisted cart/history
//!   (default: data)
//! - `EZFOOD_REQUEST_TIMEOUT_SECS` - Per-request HTTP timeout (default: 10)
//! - `EZFOOD_CHECKOUT_COOLDOWN_MS` - Cooldown after a checkout attempt
//!   before another is accepted (default: 300)

use std::path::PathBuf;
use std::time::Duration;

use secrecy::SecretString;
use thiserror::Error;
use url::Url;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Shop client configuration.
#[derive(Debug, Clone)]
pub struct ShopConfig {
    /// Base URL of the cafeteria server (e.g. `https://cafe.example.edu/`)
    pub api_base_url: Url,
    /// Session cookie for authenticated endpoints
    pub session_cookie: Option<SecretString>,
    /// Bootstrap CSRF token for mutating requests
    pub csrf_token: Option<SecretString>,
    /// Directory holding the persisted cart and order history
    pub data_dir: PathBuf,
    /// Timeout applied to every HTTP request
    pub request_timeout: Duration,
    /// Cooldown after a checkout attempt before accepting another
    pub checkout_cooldown: Duration,
}

impl ShopConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let mut api_base_url = get_required_env("EZFOOD_API_BASE_URL")?
            .parse::<Url>()
            .map_err(|e| {
                ConfigError::InvalidEnvVar("EZFOOD_API_BASE_URL".to_string(), e.to_string())
            })?;
        // Url::join treats a base without a trailing slash as a file path
        // and drops its last segment.
        if !api_base_url.path().ends_with('/') {
            let path = format!("{}/", api_base_url.path());
            api_base_url.set_path(&path);
        }
        let session_cookie = get_optional_env("EZFOOD_SESSION_COOKIE").map(SecretString::from);
        let csrf_token = get_optional_env("EZFOOD_CSRF_TOKEN").map(SecretString::from);
        let data_dir = PathBuf::from(get_env_or_default("EZFOOD_DATA_DIR", "data"));
        let request_timeout = Duration::from_secs(
            get_env_or_default("EZFOOD_REQUEST_TIMEOUT_SECS", "10")
                .parse::<u64>()
                .map_err(|e| {
                    ConfigError::InvalidEnvVar(
                        "EZFOOD_REQUEST_TIMEOUT_SECS".to_string(),
                        e.to_string(),
                    )
                })?,
        );
        let checkout_cooldown = Duration::from_millis(
            get_env_or_default("EZFOOD_CHECKOUT_COOLDOWN_MS", "300")
                .parse::<u64>()
                .map_err(|e| {
                    ConfigError::InvalidEnvVar(
                        "EZFOOD_CHECKOUT_COOLDOWN_MS".to_string(),
                        e.to_string(),
                    )
                })?,
        );

        Ok(Self {
            api_base_url,
            session_cookie,
            csrf_token,
            data_dir,
            request_timeout,
            checkout_cooldown,
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

/// Get an optional environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}
