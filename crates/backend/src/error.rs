//! Error type for backend operations.

use thiserror::Error;

/// Errors that can occur when talking to the hosted backend.
#[derive(Debug, Error)]
pub enum BackendError {
    /// HTTP transport failed (connect, timeout, TLS).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The service rejected the request.
    #[error("backend error: {status} - {message}")]
    Api { status: u16, message: String },

    /// The service denied the operation for the current principal.
    #[error("permission denied: {0}")]
    PermissionDenied(String),

    /// Sign-in failed because the credentials are wrong.
    ///
    /// Distinct from [`BackendError::Api`] so callers can treat a typo'd
    /// password differently from a service outage.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// The addressed document does not exist.
    #[error("document not found: {collection}/{id}")]
    NotFound { collection: String, id: String },

    /// The service returned a payload we could not interpret.
    #[error("parse error: {0}")]
    Parse(String),
}

impl BackendError {
    /// Build an error from a non-success HTTP response status and body.
    #[must_use]
    pub fn from_status(status: u16, message: String) -> Self {
        match status {
            401 => Self::InvalidCredentials,
            403 => Self::PermissionDenied(message),
            _ => Self::Api { status, message },
        }
    }
}
