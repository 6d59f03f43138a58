//! Application state shared across handlers.

use std::sync::Arc;

use readymix_backend::http::HttpBackend;
use readymix_stores::{InquiryStore, SessionStore};

use crate::config::SiteConfig;

/// Application state shared across all handlers.
///
/// Cheaply cloneable via `Arc`. The public site never signs in, so the
/// session store it owns stays unauthenticated and the inquiry store's
/// live subscription never opens; only the public submit path is used.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: SiteConfig,
    backend: HttpBackend,
    session: Arc<SessionStore>,
    inquiries: Arc<InquiryStore>,
}

impl AppState {
    /// Wire the backend clients and stores from configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend HTTP client fails to build.
    pub fn new(config: SiteConfig) -> Result<Self, readymix_backend::BackendError> {
        let backend = HttpBackend::connect(&config.backend)?;
        let session = Arc::new(SessionStore::new(backend.identity(), backend.documents()));
        let inquiries = Arc::new(InquiryStore::new(backend.documents(), &session));

        Ok(Self {
            inner: Arc::new(AppStateInner {
                config,
                backend,
                session,
                inquiries,
            }),
        })
    }

    /// Get a reference to the site configuration.
    #[must_use]
    pub fn config(&self) -> &SiteConfig {
        &self.inner.config
    }

    /// Get a reference to the hosted backend clients.
    #[must_use]
    pub fn backend(&self) -> &HttpBackend {
        &self.inner.backend
    }

    /// Get a reference to the session store.
    #[must_use]
    pub fn session(&self) -> &SessionStore {
        &self.inner.session
    }

    /// Get a reference to the inquiry store.
    #[must_use]
    pub fn inquiries(&self) -> &InquiryStore {
        &self.inner.inquiries
    }
}
