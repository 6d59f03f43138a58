//! Shared helpers for store tests.

use std::sync::Arc;
use std::time::Duration;

use readymix_backend::memory::{MemoryDocumentStore, MemoryIdentityProvider};
use readymix_backend::{DocumentStore, IdentityProvider};

use crate::session::SessionStore;

/// Poll `condition` until it holds, panicking after ~2 seconds.
pub(crate) async fn wait_for(mut condition: impl FnMut() -> bool) {
    for _ in 0..400 {
        if condition() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    panic!("condition not met within timeout");
}

/// Memory-backed stack: provider, document store, and a session store
/// wired to both, with one staff account registered.
pub(crate) struct Stack {
    pub provider: Arc<MemoryIdentityProvider>,
    pub documents: MemoryDocumentStore,
    pub session: Arc<SessionStore>,
}

pub(crate) const STAFF_EMAIL: &str = "ops@readymix.example";
pub(crate) const STAFF_PASSWORD: &str = "pour-it-right";

impl Stack {
    pub(crate) fn new() -> Self {
        let provider = Arc::new(MemoryIdentityProvider::new());
        provider.register(STAFF_EMAIL, STAFF_PASSWORD, Some("Ops"));
        let documents = MemoryDocumentStore::new();
        let session = Arc::new(SessionStore::new(
            Arc::clone(&provider) as Arc<dyn IdentityProvider>,
            Arc::new(documents.clone()) as Arc<dyn DocumentStore>,
        ));
        Self {
            provider,
            documents,
            session,
        }
    }

    pub(crate) fn shared_documents(&self) -> Arc<dyn DocumentStore> {
        Arc::new(self.documents.clone())
    }

    pub(crate) async fn sign_in(&self) {
        self.session
            .sign_in(STAFF_EMAIL, STAFF_PASSWORD)
            .await
            .expect("sign-in should not fault");
        wait_for(|| self.session.identity().is_some()).await;
    }

    pub(crate) async fn sign_out(&self) {
        self.session.sign_out().await.expect("sign-out should not fault");
        wait_for(|| self.session.identity().is_none()).await;
    }
}
