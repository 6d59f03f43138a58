//! Environment helpers shared by the commands.

use secrecy::SecretString;
use thiserror::Error;
use url::Url;

use readymix_backend::http::BackendConfig;

/// Errors loading CLI settings.
#[derive(Debug, Error)]
pub enum EnvError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
    #[error("Missing required value: pass it as a flag or set {0}")]
    MissingValue(String),
}

/// Load the hosted-backend settings from the environment.
///
/// # Errors
///
/// Returns `EnvError` when a required variable is missing or malformed.
pub fn backend_config() -> Result<BackendConfig, EnvError> {
    let _ = dotenvy::dotenv();

    let api_base = required("BACKEND_API_BASE")?;
    let api_base = Url::parse(&api_base)
        .map_err(|e| EnvError::InvalidEnvVar("BACKEND_API_BASE".into(), e.to_string()))?;
    let project = required("BACKEND_PROJECT")?;
    let api_key = SecretString::from(required("BACKEND_API_KEY")?);

    Ok(BackendConfig {
        api_base,
        project,
        api_key,
    })
}

/// Use the flag value when given, otherwise fall back to an env var.
///
/// # Errors
///
/// Returns `EnvError::MissingValue` when neither is set.
pub fn or_env(flag: Option<String>, var: &str) -> Result<String, EnvError> {
    flag.or_else(|| std::env::var(var).ok())
        .filter(|v| !v.is_empty())
        .ok_or_else(|| EnvError::MissingValue(var.to_string()))
}

fn required(name: &str) -> Result<String, EnvError> {
    std::env::var(name).map_err(|_| EnvError::MissingEnvVar(name.to_string()))
}
