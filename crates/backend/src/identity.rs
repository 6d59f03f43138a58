//! The identity-provider port.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::watch;

use readymix_core::PrincipalId;

use crate::error::BackendError;

/// The authenticated principal as reported by the identity provider.
///
/// This is the provider's record only; the session store merges it with the
/// optional profile document to build the application identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    /// Provider-assigned unique identifier.
    pub id: PrincipalId,
    /// Sign-in email address.
    pub email: String,
    /// Display name, when the provider has one on file.
    pub display_name: Option<String>,
    /// Avatar URL, when the provider has one on file.
    pub avatar_url: Option<String>,
}

/// Port for the hosted backend's identity provider.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Sign in with email and password.
    ///
    /// # Errors
    ///
    /// [`BackendError::InvalidCredentials`] when the email/password pair is
    /// wrong; other variants for transport or service failures.
    async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Principal, BackendError>;

    /// Sign the current principal out.
    async fn sign_out(&self) -> Result<(), BackendError>;

    /// Auth-state channel.
    ///
    /// The receiver holds the current principal (or `None`) at
    /// registration time and observes every subsequent transition - the
    /// watch-channel rendering of a provider callback that fires once at
    /// startup and on every change.
    fn auth_state(&self) -> watch::Receiver<Option<Principal>>;
}
