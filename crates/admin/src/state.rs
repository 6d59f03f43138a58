//! Application state shared across handlers.

use std::sync::Arc;

use readymix_backend::http::HttpBackend;
use readymix_stores::{InquiryStore, OrderStore, SessionStore};

use crate::config::AdminConfig;

/// Application state shared across all handlers.
///
/// Cheaply cloneable via `Arc`. One session store gates both collection
/// stores: their live subscriptions open when staff sign in and tear down
/// when the session ends.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: AdminConfig,
    backend: HttpBackend,
    session: Arc<SessionStore>,
    inquiries: Arc<InquiryStore>,
    orders: Arc<OrderStore>,
}

impl AppState {
    /// Wire the backend clients and stores from configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend HTTP client fails to build.
    pub fn new(config: AdminConfig) -> Result<Self, readymix_backend::BackendError> {
        let backend = HttpBackend::connect(&config.backend)?;
        let session = Arc::new(SessionStore::new(backend.identity(), backend.documents()));
        let inquiries = Arc::new(InquiryStore::new(backend.documents(), &session));
        let orders = Arc::new(OrderStore::new(backend.documents(), &session));

        Ok(Self {
            inner: Arc::new(AppStateInner {
                config,
                backend,
                session,
                inquiries,
                orders,
            }),
        })
    }

    /// Get a reference to the admin configuration.
    #[must_use]
    pub fn config(&self) -> &AdminConfig {
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

    /// Get a reference to the order store.
    #[must_use]
    pub fn orders(&self) -> &OrderStore {
        &self.inner.orders
    }
}
