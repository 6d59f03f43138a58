//! The inquiry store.

use std::sync::{Arc, Mutex};

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{info, instrument, warn};

use readymix_backend::{CollectionQuery, Document, DocumentStore, OrderDirection};
use readymix_core::InquiryId;

use crate::error::StoreError;
use crate::models::inquiry::{Inquiry, InquiryPatch, NewInquiry};
use crate::observers::{ObserverRegistry, StoreSubscription};
use crate::session::{SessionState, SessionStore};
use crate::sync::{
    CollectionState, convert_documents, lock_state, publish_snapshot, spawn_collection_sync,
};

/// Backend collection holding customer inquiries.
pub const INQUIRIES_COLLECTION: &str = "inquiries";

/// Reactive store over the inquiry collection.
///
/// Submission is the one public operation - the contact form runs with no
/// session. Everything else requires the injected session store to hold an
/// identity, and the exposed list is live only while it does.
pub struct InquiryStore {
    documents: Arc<dyn DocumentStore>,
    session: watch::Receiver<SessionState>,
    state: Arc<Mutex<CollectionState<Inquiry>>>,
    observers: Arc<ObserverRegistry<Vec<Inquiry>>>,
    task: JoinHandle<()>,
}

impl InquiryStore {
    /// Ordered view the store exposes: newest first.
    fn query() -> CollectionQuery {
        CollectionQuery::new(
            INQUIRIES_COLLECTION,
            "created_at",
            OrderDirection::Descending,
        )
    }

    fn convert(document: Document) -> Option<Inquiry> {
        let id = document.id.clone();
        match Inquiry::from_document(document) {
            Ok(inquiry) => Some(inquiry),
            Err(err) => {
                warn!(collection = INQUIRIES_COLLECTION, id = %id, error = %err, "skipping undecodable document");
                None
            }
        }
    }

    /// Build the store and start the identity-gated sync task.
    #[must_use]
    pub fn new(documents: Arc<dyn DocumentStore>, session: &SessionStore) -> Self {
        let state = Arc::new(Mutex::new(CollectionState::default()));
        let observers = ObserverRegistry::new();

        let task = spawn_collection_sync(
            Arc::clone(&documents),
            session.watch(),
            Self::query(),
            Self::convert,
            Arc::clone(&state),
            Arc::clone(&observers),
        );

        Self {
            documents,
            session: session.watch(),
            state,
            observers,
            task,
        }
    }

    fn require_identity(&self) -> Result<(), StoreError> {
        if self.session.borrow().is_authenticated() {
            Ok(())
        } else {
            Err(StoreError::AuthRequired)
        }
    }

    fn record_error(&self, message: &str) {
        lock_state(&self.state).error = Some(message.to_owned());
    }

    /// Submit a new inquiry. Public - callable with no active session.
    ///
    /// # Errors
    ///
    /// `StoreError::Validation` before any backend call when name or
    /// message is empty or the email is malformed; `StoreError::Backend`
    /// when the service rejects the create.
    #[instrument(skip(self, new_inquiry), fields(email = %new_inquiry.email))]
    pub async fn submit(&self, new_inquiry: NewInquiry) -> Result<InquiryId, StoreError> {
        new_inquiry.validate()?;

        match self
            .documents
            .create(INQUIRIES_COLLECTION, new_inquiry.into_fields())
            .await
        {
            Ok(id) => {
                info!(id = %id, "inquiry submitted");
                Ok(InquiryId::new(id))
            }
            Err(err) => {
                self.record_error(&err.to_string());
                Err(err.into())
            }
        }
    }

    /// Merge a partial update into an inquiry. Staff only.
    ///
    /// # Errors
    ///
    /// `StoreError::AuthRequired` before any backend call when no identity
    /// is present; `StoreError::Backend` when the service rejects it.
    #[instrument(skip(self, patch), fields(id = %id))]
    pub async fn update(&self, id: &InquiryId, patch: InquiryPatch) -> Result<(), StoreError> {
        self.require_identity()?;

        match self
            .documents
            .update(INQUIRIES_COLLECTION, id.as_str(), patch.into_fields())
            .await
        {
            Ok(()) => Ok(()),
            Err(err) => {
                self.record_error(&err.to_string());
                Err(err.into())
            }
        }
    }

    /// Delete an inquiry. Staff only.
    ///
    /// # Errors
    ///
    /// `StoreError::AuthRequired` before any backend call when no identity
    /// is present; `StoreError::Backend` when the service rejects it.
    #[instrument(skip(self), fields(id = %id))]
    pub async fn remove(&self, id: &InquiryId) -> Result<(), StoreError> {
        self.require_identity()?;

        match self.documents.delete(INQUIRIES_COLLECTION, id.as_str()).await {
            Ok(()) => Ok(()),
            Err(err) => {
                self.record_error(&err.to_string());
                Err(err.into())
            }
        }
    }

    /// One-shot re-fetch of the list.
    ///
    /// A no-op without an identity: the listing is staff-gated at the
    /// service, so there is nothing a signed-out caller could fetch.
    ///
    /// # Errors
    ///
    /// `StoreError::Backend` when the fetch fails; the message is also
    /// recorded in the passive error field.
    #[instrument(skip(self))]
    pub async fn refresh(&self) -> Result<(), StoreError> {
        if !self.session.borrow().is_authenticated() {
            return Ok(());
        }

        lock_state(&self.state).loading = true;
        match self.documents.list(&Self::query()).await {
            Ok(documents) => {
                let items = convert_documents(INQUIRIES_COLLECTION, documents, Self::convert);
                publish_snapshot(&self.state, &self.observers, items);
                Ok(())
            }
            Err(err) => {
                {
                    let mut guard = lock_state(&self.state);
                    guard.loading = false;
                    guard.error = Some(err.to_string());
                }
                Err(err.into())
            }
        }
    }

    /// Current snapshot, newest first.
    #[must_use]
    pub fn inquiries(&self) -> Vec<Inquiry> {
        lock_state(&self.state).items.clone()
    }

    /// Whether the store is waiting on its first snapshot or a refresh.
    #[must_use]
    pub fn is_loading(&self) -> bool {
        lock_state(&self.state).loading
    }

    /// Message of the most recent failure, for passive display.
    #[must_use]
    pub fn last_error(&self) -> Option<String> {
        lock_state(&self.state).error.clone()
    }

    /// Observe every published snapshot. The handle's teardown is
    /// idempotent; dropping it unsubscribes.
    pub fn subscribe(
        &self,
        callback: impl Fn(&[Inquiry]) + Send + Sync + 'static,
    ) -> StoreSubscription<Vec<Inquiry>> {
        self.observers
            .subscribe(move |items: &Vec<Inquiry>| callback(items))
    }
}

impl Drop for InquiryStore {
    fn drop(&mut self) {
        self.task.abort();
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use readymix_core::{InquiryStatus, Priority};

    use crate::testutil::{Stack, wait_for};

    fn new_inquiry(name: &str) -> NewInquiry {
        NewInquiry {
            name: name.into(),
            email: "ann@builders.example".into(),
            phone: None,
            message: "Need M25 for a raft foundation.".into(),
        }
    }

    fn store_for(stack: &Stack) -> InquiryStore {
        InquiryStore::new(stack.shared_documents(), &stack.session)
    }

    #[tokio::test]
    async fn test_submit_is_public_and_forces_defaults() {
        let stack = Stack::new();
        let store = store_for(&stack);

        // No sign-in at all: the public path.
        let id = store.submit(new_inquiry("Ann")).await.unwrap();

        let doc = stack
            .documents
            .get(INQUIRIES_COLLECTION, id.as_str())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(doc.fields["status"], serde_json::json!("not_contacted"));
        assert_eq!(doc.fields["priority"], serde_json::json!("medium"));
        assert!(doc.created_at().is_some());
    }

    #[tokio::test]
    async fn test_submit_validation_failures_make_no_backend_calls() {
        let stack = Stack::new();
        let store = store_for(&stack);

        let mut blank_name = new_inquiry("");
        blank_name.message = "hi".into();
        assert!(store.submit(blank_name).await.unwrap_err().is_validation());

        let mut bad_email = new_inquiry("Ann");
        bad_email.email = "not-an-email".into();
        assert!(store.submit(bad_email).await.unwrap_err().is_validation());

        let mut blank_message = new_inquiry("Ann");
        blank_message.message = String::new();
        assert!(store.submit(blank_message).await.unwrap_err().is_validation());

        assert_eq!(stack.documents.op_count(), 0);
    }

    #[tokio::test]
    async fn test_update_and_remove_require_identity() {
        let stack = Stack::new();
        let store = store_for(&stack);
        let id = InquiryId::new("whatever");

        let err = store
            .update(&id, InquiryPatch::default())
            .await
            .unwrap_err();
        assert!(err.is_auth_required());

        let err = store.remove(&id).await.unwrap_err();
        assert!(err.is_auth_required());

        assert_eq!(stack.documents.op_count(), 0);
    }

    #[tokio::test]
    async fn test_live_sync_reflects_remote_changes() {
        let stack = Stack::new();
        let store = store_for(&stack);
        stack.sign_in().await;
        wait_for(|| !store.is_loading()).await;

        // A submission from "another session" (directly via the backend).
        store.submit(new_inquiry("Ann")).await.unwrap();
        wait_for(|| store.inquiries().len() == 1).await;

        let inquiry = &store.inquiries()[0];
        assert_eq!(inquiry.name, "Ann");
        assert_eq!(inquiry.status, InquiryStatus::NotContacted);
        assert_eq!(inquiry.priority, Priority::Medium);
    }

    #[tokio::test]
    async fn test_list_is_ordered_newest_first() {
        let stack = Stack::new();
        let store = store_for(&stack);
        stack.sign_in().await;

        for name in ["first", "second", "third"] {
            store.submit(new_inquiry(name)).await.unwrap();
        }
        wait_for(|| store.inquiries().len() == 3).await;

        let names: Vec<_> = store.inquiries().iter().map(|i| i.name.clone()).collect();
        assert_eq!(names, ["third", "second", "first"]);
    }

    #[tokio::test]
    async fn test_sign_out_clears_list_and_tears_down_once() {
        let stack = Stack::new();
        let store = store_for(&stack);
        stack.sign_in().await;

        store.submit(new_inquiry("Ann")).await.unwrap();
        wait_for(|| store.inquiries().len() == 1).await;
        assert_eq!(stack.documents.listener_count(), 1);

        stack.sign_out().await;
        wait_for(|| store.inquiries().is_empty()).await;
        wait_for(|| stack.documents.listener_count() == 0).await;
        assert_eq!(stack.documents.teardown_count(), 1);

        // Nothing arrives after teardown.
        store.submit(new_inquiry("Late")).await.unwrap();
        tokio::time::sleep(std::time::Duration::from_millis(50)).await;
        assert!(store.inquiries().is_empty());
    }

    #[tokio::test]
    async fn test_repeated_identical_update_is_idempotent() {
        let stack = Stack::new();
        let store = store_for(&stack);
        stack.sign_in().await;

        let id = store.submit(new_inquiry("Ann")).await.unwrap();
        wait_for(|| store.inquiries().len() == 1).await;

        let patch = InquiryPatch {
            status: Some(InquiryStatus::Completed),
            ..InquiryPatch::default()
        };
        store.update(&id, patch.clone()).await.unwrap();
        wait_for(|| store.inquiries()[0].status == InquiryStatus::Completed).await;
        let first_updated_at = store.inquiries()[0].updated_at;

        store.update(&id, patch).await.unwrap();
        wait_for(|| store.inquiries()[0].updated_at > first_updated_at).await;

        let after = store.inquiries();
        assert_eq!(after.len(), 1);
        assert_eq!(after[0].status, InquiryStatus::Completed);
        assert_eq!(after[0].name, "Ann");
    }

    #[tokio::test]
    async fn test_mutations_do_not_write_the_list_directly() {
        let stack = Stack::new();
        let store = store_for(&stack);
        stack.sign_in().await;

        let id = store.submit(new_inquiry("Ann")).await.unwrap();
        wait_for(|| store.inquiries().len() == 1).await;

        stack.sign_out().await;
        wait_for(|| stack.documents.listener_count() == 0).await;
        stack.sign_in().await;
        wait_for(|| store.inquiries().len() == 1).await;

        // With the subscription as sole writer, a remove only empties the
        // list once the next snapshot lands - which it does here.
        store.remove(&id).await.unwrap();
        wait_for(|| store.inquiries().is_empty()).await;
    }

    #[tokio::test]
    async fn test_refresh_without_identity_is_a_noop() {
        let stack = Stack::new();
        let store = store_for(&stack);

        store.refresh().await.unwrap();
        assert_eq!(stack.documents.op_count(), 0);
        assert!(store.inquiries().is_empty());
    }

    #[tokio::test]
    async fn test_refresh_fetches_once_signed_in() {
        let stack = Stack::new();
        let store = store_for(&stack);
        stack.sign_in().await;

        store.submit(new_inquiry("Ann")).await.unwrap();
        store.refresh().await.unwrap();
        assert_eq!(store.inquiries().len(), 1);
        assert!(!store.is_loading());
    }

    #[tokio::test]
    async fn test_backend_fault_is_recorded_and_propagated() {
        let stack = Stack::new();
        let store = store_for(&stack);

        stack.documents.inject_failure("quota exceeded");
        let err = store.submit(new_inquiry("Ann")).await.unwrap_err();
        assert!(matches!(err, StoreError::Backend(_)));
        assert!(store.last_error().unwrap().contains("quota exceeded"));
    }

    #[tokio::test]
    async fn test_observers_see_snapshots_until_unsubscribed() {
        let stack = Stack::new();
        let store = store_for(&stack);
        stack.sign_in().await;

        let seen = Arc::new(AtomicUsize::new(0));
        let sink = Arc::clone(&seen);
        let mut subscription = store.subscribe(move |items| {
            sink.store(items.len(), Ordering::SeqCst);
        });

        store.submit(new_inquiry("Ann")).await.unwrap();
        wait_for(|| seen.load(Ordering::SeqCst) == 1).await;

        subscription.unsubscribe();
        subscription.unsubscribe();

        store.submit(new_inquiry("Ben")).await.unwrap();
        wait_for(|| store.inquiries().len() == 2).await;
        assert_eq!(seen.load(Ordering::SeqCst), 1);
    }
}
