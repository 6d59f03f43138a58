//! In-memory identity provider.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use tokio::sync::watch;
use uuid::Uuid;

use readymix_core::PrincipalId;

use crate::error::BackendError;
use crate::identity::{IdentityProvider, Principal};

struct MemoryAccount {
    password: String,
    principal: Principal,
}

/// In-memory [`IdentityProvider`] implementation.
///
/// Accounts are registered up front; sign-in checks the password verbatim.
/// Good enough for tests and seeding - this never guards real data.
pub struct MemoryIdentityProvider {
    accounts: Mutex<HashMap<String, MemoryAccount>>,
    state: watch::Sender<Option<Principal>>,
    failure: Mutex<Option<String>>,
}

impl MemoryIdentityProvider {
    #[must_use]
    pub fn new() -> Self {
        let (state, _) = watch::channel(None);
        Self {
            accounts: Mutex::new(HashMap::new()),
            state,
            failure: Mutex::new(None),
        }
    }

    /// Register an account and return its principal.
    pub fn register(
        &self,
        email: impl Into<String>,
        password: impl Into<String>,
        display_name: Option<&str>,
    ) -> Principal {
        let email = email.into();
        let principal = Principal {
            id: PrincipalId::new(Uuid::new_v4().simple().to_string()),
            email: email.clone(),
            display_name: display_name.map(str::to_owned),
            avatar_url: None,
        };
        let mut accounts = self
            .accounts
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        accounts.insert(
            email,
            MemoryAccount {
                password: password.into(),
                principal: principal.clone(),
            },
        );
        principal
    }

    /// Make every subsequent call fail with the given message until
    /// [`clear_failure`](Self::clear_failure) is called.
    pub fn inject_failure(&self, message: impl Into<String>) {
        if let Ok(mut guard) = self.failure.lock() {
            *guard = Some(message.into());
        }
    }

    /// Stop failing calls.
    pub fn clear_failure(&self) {
        if let Ok(mut guard) = self.failure.lock() {
            *guard = None;
        }
    }

    fn check_failure(&self) -> Result<(), BackendError> {
        let guard = self
            .failure
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        match guard.as_ref() {
            Some(message) => Err(BackendError::Api {
                status: 503,
                message: message.clone(),
            }),
            None => Ok(()),
        }
    }
}

impl Default for MemoryIdentityProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl IdentityProvider for MemoryIdentityProvider {
    async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Principal, BackendError> {
        self.check_failure()?;

        let principal = {
            let accounts = self
                .accounts
                .lock()
                .unwrap_or_else(std::sync::PoisonError::into_inner);
            let account = accounts.get(email).ok_or(BackendError::InvalidCredentials)?;
            if account.password != password {
                return Err(BackendError::InvalidCredentials);
            }
            account.principal.clone()
        };

        self.state.send_replace(Some(principal.clone()));
        Ok(principal)
    }

    async fn sign_out(&self) -> Result<(), BackendError> {
        self.check_failure()?;
        self.state.send_replace(None);
        Ok(())
    }

    fn auth_state(&self) -> watch::Receiver<Option<Principal>> {
        self.state.subscribe()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_sign_in_success_updates_auth_state() {
        let provider = MemoryIdentityProvider::new();
        let registered = provider.register("ops@readymix.example", "s3cret", Some("Ops"));

        let state = provider.auth_state();
        assert!(state.borrow().is_none());

        let principal = provider
            .sign_in_with_password("ops@readymix.example", "s3cret")
            .await
            .unwrap();
        assert_eq!(principal, registered);
        assert_eq!(state.borrow().as_ref(), Some(&principal));
    }

    #[tokio::test]
    async fn test_wrong_password_is_invalid_credentials() {
        let provider = MemoryIdentityProvider::new();
        provider.register("ops@readymix.example", "s3cret", None);

        let err = provider
            .sign_in_with_password("ops@readymix.example", "wrong")
            .await
            .unwrap_err();
        assert!(matches!(err, BackendError::InvalidCredentials));
        assert!(provider.auth_state().borrow().is_none());
    }

    #[tokio::test]
    async fn test_unknown_account_is_invalid_credentials() {
        let provider = MemoryIdentityProvider::new();
        let err = provider
            .sign_in_with_password("nobody@readymix.example", "pw")
            .await
            .unwrap_err();
        assert!(matches!(err, BackendError::InvalidCredentials));
    }

    #[tokio::test]
    async fn test_sign_out_clears_auth_state() {
        let provider = MemoryIdentityProvider::new();
        provider.register("ops@readymix.example", "s3cret", None);
        provider
            .sign_in_with_password("ops@readymix.example", "s3cret")
            .await
            .unwrap();

        provider.sign_out().await.unwrap();
        assert!(provider.auth_state().borrow().is_none());
    }

    #[tokio::test]
    async fn test_injected_failure_is_a_transport_fault() {
        let provider = MemoryIdentityProvider::new();
        provider.register("ops@readymix.example", "s3cret", None);
        provider.inject_failure("upstream outage");

        let err = provider
            .sign_in_with_password("ops@readymix.example", "s3cret")
            .await
            .unwrap_err();
        assert!(matches!(err, BackendError::Api { status: 503, .. }));
    }
}
