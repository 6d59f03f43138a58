//! The document-store port.

use async_trait::async_trait;
use serde_json::{Map, Value};

use crate::document::{CollectionQuery, Document};
use crate::error::BackendError;
use crate::listener::{ErrorCallback, ListenerHandle, SnapshotCallback};

/// Port for the hosted backend's document collections.
///
/// The service owns durable storage, identifier assignment, and timestamp
/// stamping: `create` sets `created_at` and `updated_at` to server time,
/// and every `update` merges the supplied fields and refreshes
/// `updated_at`. Clients never send their own clock.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Create a document and return its assigned identifier.
    async fn create(
        &self,
        collection: &str,
        fields: Map<String, Value>,
    ) -> Result<String, BackendError>;

    /// One-shot ordered listing of a collection.
    async fn list(&self, query: &CollectionQuery) -> Result<Vec<Document>, BackendError>;

    /// Fetch a single document, `None` when absent.
    async fn get(&self, collection: &str, id: &str) -> Result<Option<Document>, BackendError>;

    /// Merge `fields` into an existing document.
    ///
    /// Fails with [`BackendError::NotFound`] when the document is absent.
    async fn update(
        &self,
        collection: &str,
        id: &str,
        fields: Map<String, Value>,
    ) -> Result<(), BackendError>;

    /// Delete a document.
    async fn delete(&self, collection: &str, id: &str) -> Result<(), BackendError>;

    /// Open a live subscription over an ordered collection view.
    ///
    /// `on_snapshot` receives the full ordered snapshot immediately and
    /// again after every remote change, whoever made it. `on_error` fires
    /// on transport or permission failure, after which no further
    /// snapshots are delivered. The returned handle tears the
    /// subscription down idempotently (see [`ListenerHandle`]).
    fn subscribe(
        &self,
        query: CollectionQuery,
        on_snapshot: SnapshotCallback,
        on_error: ErrorCallback,
    ) -> ListenerHandle;
}
