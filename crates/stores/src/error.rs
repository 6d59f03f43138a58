//! Store error taxonomy.

use thiserror::Error;

use readymix_backend::BackendError;
use readymix_core::EmailError;

/// Caller-supplied data failed a local precondition.
///
/// Raised before any backend call is made; never retried.
#[derive(Debug, Error, Clone)]
pub enum ValidationError {
    /// A required text field is empty.
    #[error("{field} is required")]
    MissingField {
        /// Name of the offending field.
        field: &'static str,
    },

    /// The email address is malformed.
    #[error("invalid email address: {0}")]
    InvalidEmail(#[from] EmailError),
}

/// Errors surfaced by the session, inquiry, and order stores.
///
/// Every failed operation maps to exactly one of these; the stores never
/// swallow a fault silently.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Local precondition failure - raised before any backend call.
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationError),

    /// The operation requires a signed-in identity and none is present.
    /// Raised before any backend call; the service re-validates
    /// independently either way.
    #[error("authentication required")]
    AuthRequired,

    /// The backend rejected or failed the call. Propagated with the
    /// service message and also recorded in the store's passive error
    /// field.
    #[error("backend fault: {0}")]
    Backend(#[from] BackendError),
}

impl StoreError {
    /// Whether this is a local validation failure.
    #[must_use]
    pub const fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    /// Whether this is the missing-identity failure.
    #[must_use]
    pub const fn is_auth_required(&self) -> bool {
        matches!(self, Self::AuthRequired)
    }
}
