//! The session store.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{info, instrument, warn};

use readymix_backend::{BackendError, DocumentStore, IdentityProvider, Principal};

use crate::error::StoreError;
use crate::models::identity::{Identity, PROFILES_COLLECTION};

/// Session lifecycle.
///
/// `Initializing` lasts until the identity provider's first notification;
/// afterwards the store moves between `Unauthenticated` and
/// `Authenticated` for the life of the process.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum SessionState {
    #[default]
    Initializing,
    Unauthenticated,
    Authenticated(Identity),
}

impl SessionState {
    /// The signed-in identity, when there is one.
    #[must_use]
    pub const fn identity(&self) -> Option<&Identity> {
        match self {
            Self::Authenticated(identity) => Some(identity),
            _ => None,
        }
    }

    /// Whether an identity is present.
    #[must_use]
    pub const fn is_authenticated(&self) -> bool {
        matches!(self, Self::Authenticated(_))
    }
}

/// Single source of truth for "who is signed in".
///
/// Bridges the identity provider's auth-state channel to application
/// state: on every provider notification the optional profile document is
/// fetched and merged into an [`Identity`]. A profile fetch failure is
/// deliberately downgraded to "no profile" - the session still becomes
/// authenticated with provider fields and role `admin`.
pub struct SessionStore {
    provider: Arc<dyn IdentityProvider>,
    state: Arc<watch::Sender<SessionState>>,
    loading: Arc<AtomicBool>,
    task: JoinHandle<()>,
}

impl SessionStore {
    /// Build the store and start bridging provider notifications.
    ///
    /// The provider's current state is processed immediately, so a
    /// provider that already knows "signed out" moves the store to
    /// `Unauthenticated` without any sign-in attempt.
    #[must_use]
    pub fn new(provider: Arc<dyn IdentityProvider>, documents: Arc<dyn DocumentStore>) -> Self {
        let state = Arc::new(watch::channel(SessionState::Initializing).0);
        let loading = Arc::new(AtomicBool::new(true));

        let task = {
            let state = Arc::clone(&state);
            let loading = Arc::clone(&loading);
            let mut auth_rx = provider.auth_state();
            tokio::spawn(async move {
                loop {
                    let principal = auth_rx.borrow_and_update().clone();
                    let next = match principal {
                        Some(principal) => {
                            loading.store(true, Ordering::SeqCst);
                            let identity =
                                resolve_identity(documents.as_ref(), principal).await;
                            info!(identity = %identity.id, role = %identity.role, "session authenticated");
                            SessionState::Authenticated(identity)
                        }
                        None => SessionState::Unauthenticated,
                    };
                    state.send_replace(next);
                    loading.store(false, Ordering::SeqCst);

                    if auth_rx.changed().await.is_err() {
                        break;
                    }
                }
            })
        };

        Self {
            provider,
            state,
            loading,
            task,
        }
    }

    /// Sign in with email and password.
    ///
    /// Returns `Ok(true)` on success (the identity lands via the provider
    /// notification), `Ok(false)` on invalid credentials with prior state
    /// untouched.
    ///
    /// # Errors
    ///
    /// `StoreError::Backend` on transport or service failure.
    #[instrument(skip(self, password), fields(email = %email))]
    pub async fn sign_in(&self, email: &str, password: &str) -> Result<bool, StoreError> {
        self.loading.store(true, Ordering::SeqCst);
        match self.provider.sign_in_with_password(email, password).await {
            Ok(_) => Ok(true),
            Err(BackendError::InvalidCredentials) => {
                self.loading.store(false, Ordering::SeqCst);
                Ok(false)
            }
            Err(err) => {
                self.loading.store(false, Ordering::SeqCst);
                Err(StoreError::Backend(err))
            }
        }
    }

    /// Sign out. The local identity clears on the provider's notification.
    ///
    /// # Errors
    ///
    /// `StoreError::Backend` on transport or service failure.
    #[instrument(skip(self))]
    pub async fn sign_out(&self) -> Result<(), StoreError> {
        self.provider.sign_out().await.map_err(StoreError::Backend)
    }

    /// The current identity, if any.
    #[must_use]
    pub fn identity(&self) -> Option<Identity> {
        self.state.borrow().identity().cloned()
    }

    /// The current session state.
    #[must_use]
    pub fn state(&self) -> SessionState {
        self.state.borrow().clone()
    }

    /// Whether the store is still resolving the session.
    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.loading.load(Ordering::SeqCst)
    }

    /// Channel the collection stores (and UI) watch for state changes.
    #[must_use]
    pub fn watch(&self) -> watch::Receiver<SessionState> {
        self.state.subscribe()
    }
}

impl Drop for SessionStore {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// Fetch the optional profile document and merge it with the principal.
async fn resolve_identity(documents: &dyn DocumentStore, principal: Principal) -> Identity {
    match documents.get(PROFILES_COLLECTION, principal.id.as_str()).await {
        Ok(profile) => Identity::from_parts(principal, profile.as_ref()),
        Err(err) => {
            warn!(principal = %principal.id, error = %err, "profile fetch failed; using provider fields");
            Identity::from_parts(principal, None)
        }
    }
}
