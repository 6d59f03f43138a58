//! Site configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `BACKEND_API_BASE` - Base URL of the hosted backend
//! - `BACKEND_PROJECT` - Project slug on the hosted backend
//! - `BACKEND_API_KEY` - Project API key
//!
//! ## Optional
//! - `SITE_HOST` - Bind address (default: 127.0.0.1)
//! - `SITE_PORT` - Listen port (default: 3000)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment label

use std::net::{IpAddr, SocketAddr};

use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;
use url::Url;

use readymix_backend::http::BackendConfig;

/// Blocklist of common placeholder patterns (case-insensitive)
const PLACEHOLDER_PATTERNS: &[&str] = &[
    "your-", "changeme", "replace", "placeholder", "example", "xxx", "todo", "fixme",
];

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
    #[error("Insecure secret in {0}: {1}")]
    InsecureSecret(String, String),
}

/// Public site configuration.
#[derive(Debug, Clone)]
pub struct SiteConfig {
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Hosted backend connection settings
    pub backend: BackendConfig,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment label
    pub sentry_environment: Option<String>,
}

impl SiteConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid,
    /// or if the API key looks like an unset placeholder.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let host = get_env_or_default("SITE_HOST", "127.0.0.1")
            .parse::<IpAddr>()
            .map_err(|e| ConfigError::InvalidEnvVar("SITE_HOST".to_string(), e.to_string()))?;
        let port = get_env_or_default("SITE_PORT", "3000")
            .parse::<u16>()
            .map_err(|e| ConfigError::InvalidEnvVar("SITE_PORT".to_string(), e.to_string()))?;

        let backend = backend_from_env()?;
        let sentry_dsn = get_optional_env("SENTRY_DSN");
        let sentry_environment = get_optional_env("SENTRY_ENVIRONMENT");

        Ok(Self {
            host,
            port,
            backend,
            sentry_dsn,
            sentry_environment,
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

/// Load the hosted-backend settings shared by every binary.
pub fn backend_from_env() -> Result<BackendConfig, ConfigError> {
    let api_base = get_required_env("BACKEND_API_BASE")?;
    let api_base = Url::parse(&api_base)
        .map_err(|e| ConfigError::InvalidEnvVar("BACKEND_API_BASE".to_string(), e.to_string()))?;
    let project = get_required_env("BACKEND_PROJECT")?;
    let api_key = SecretString::from(get_required_env("BACKEND_API_KEY")?);
    validate_secret(&api_key, "BACKEND_API_KEY")?;

    Ok(BackendConfig {
        api_base,
        project,
        api_key,
    })
}

fn get_required_env(name: &str) -> Result<String, ConfigError> {
    std::env::var(name).map_err(|_| ConfigError::MissingEnvVar(name.to_string()))
}

fn get_env_or_default(name: &str, default: &str) -> String {
    std::env::var(name).unwrap_or_else(|_| default.to_string())
}

fn get_optional_env(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.is_empty())
}

/// Reject secrets that are obviously unset placeholders.
fn validate_secret(secret: &SecretString, name: &str) -> Result<(), ConfigError> {
    let value = secret.expose_secret().to_lowercase();
    for pattern in PLACEHOLDER_PATTERNS {
        if value.contains(pattern) {
            return Err(ConfigError::InsecureSecret(
                name.to_string(),
                format!("looks like a placeholder (contains '{pattern}')"),
            ));
        }
    }
    Ok(())
}
