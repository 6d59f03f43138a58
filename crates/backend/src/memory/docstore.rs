//! In-memory document store.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use serde_json::{Map, Value};
use tokio::sync::broadcast;
use uuid::Uuid;

use readymix_core::timestamp;

use crate::document::{CollectionQuery, Document, OrderDirection, compare_wire_values, fields};
use crate::error::BackendError;
use crate::listener::{ErrorCallback, ListenerHandle, SnapshotCallback};
use crate::store::DocumentStore;

/// In-memory [`DocumentStore`] implementation.
///
/// Cheaply cloneable; clones share the same collections, so a test can
/// hand one clone to the code under test and keep another for assertions.
#[derive(Clone)]
pub struct MemoryDocumentStore {
    inner: Arc<MemoryInner>,
}

struct MemoryInner {
    collections: Mutex<HashMap<String, Vec<Document>>>,
    /// Server clock: strictly increasing so creation order is total.
    last_stamp: Mutex<DateTime<Utc>>,
    /// Collection names that changed, fanned out to live subscriptions.
    changes: broadcast::Sender<String>,
    /// Count of create/list/get/update/delete calls, for call-gating tests.
    ops: AtomicUsize,
    active_listeners: AtomicUsize,
    teardowns: AtomicUsize,
    failure: Mutex<Option<String>>,
}

impl MemoryDocumentStore {
    #[must_use]
    pub fn new() -> Self {
        let (changes, _) = broadcast::channel(64);
        Self {
            inner: Arc::new(MemoryInner {
                collections: Mutex::new(HashMap::new()),
                last_stamp: Mutex::new(DateTime::<Utc>::MIN_UTC),
                changes,
                ops: AtomicUsize::new(0),
                active_listeners: AtomicUsize::new(0),
                teardowns: AtomicUsize::new(0),
                failure: Mutex::new(None),
            }),
        }
    }

    /// Total number of document operations performed so far.
    #[must_use]
    pub fn op_count(&self) -> usize {
        self.inner.ops.load(Ordering::SeqCst)
    }

    /// Number of currently live subscriptions.
    #[must_use]
    pub fn listener_count(&self) -> usize {
        self.inner.active_listeners.load(Ordering::SeqCst)
    }

    /// Number of subscriptions torn down since creation.
    #[must_use]
    pub fn teardown_count(&self) -> usize {
        self.inner.teardowns.load(Ordering::SeqCst)
    }

    /// Make every subsequent operation fail with the given message until
    /// [`clear_failure`](Self::clear_failure) is called.
    pub fn inject_failure(&self, message: impl Into<String>) {
        if let Ok(mut guard) = self.inner.failure.lock() {
            *guard = Some(message.into());
        }
    }

    /// Stop failing operations.
    pub fn clear_failure(&self) {
        if let Ok(mut guard) = self.inner.failure.lock() {
            *guard = None;
        }
    }

    /// Upsert a document under a caller-chosen identifier.
    ///
    /// Provisioning helper for documents the service keys externally (e.g.
    /// staff profiles keyed by principal ID). Does not count as a document
    /// operation.
    pub fn insert_with_id(&self, collection: &str, id: &str, fields_in: Map<String, Value>) {
        let now = timestamp::to_wire(self.server_now());
        let mut stored = fields_in;
        stored.insert(fields::CREATED_AT.to_owned(), Value::String(now.clone()));
        stored.insert(fields::UPDATED_AT.to_owned(), Value::String(now));

        {
            let mut collections = self
                .inner
                .collections
                .lock()
                .unwrap_or_else(std::sync::PoisonError::into_inner);
            let documents = collections.entry(collection.to_owned()).or_default();
            documents.retain(|d| d.id != id);
            documents.push(Document {
                id: id.to_owned(),
                fields: stored,
            });
        }
        self.notify(collection);
    }

    fn check_failure(&self) -> Result<(), BackendError> {
        let guard = self
            .inner
            .failure
            .lock()
            .map_err(|_| BackendError::Parse("poisoned failure lock".into()))?;
        match guard.as_ref() {
            Some(message) => Err(BackendError::Api {
                status: 503,
                message: message.clone(),
            }),
            None => Ok(()),
        }
    }

    fn count_op(&self) {
        self.inner.ops.fetch_add(1, Ordering::SeqCst);
    }

    /// Next server timestamp, strictly after every previously issued one.
    fn server_now(&self) -> DateTime<Utc> {
        let mut last = self
            .inner
            .last_stamp
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        let mut now = Utc::now();
        if now <= *last {
            now = *last + Duration::milliseconds(1);
        }
        *last = now;
        now
    }

    fn notify(&self, collection: &str) {
        // No receivers is fine: nothing is subscribed yet.
        let _ = self.inner.changes.send(collection.to_owned());
    }

    fn ordered_snapshot(inner: &MemoryInner, query: &CollectionQuery) -> Vec<Document> {
        let collections = inner
            .collections
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        let mut documents = collections
            .get(&query.collection)
            .cloned()
            .unwrap_or_default();
        documents.sort_by(|a, b| {
            let ordering =
                compare_wire_values(a.fields.get(&query.order_by), b.fields.get(&query.order_by));
            match query.direction {
                OrderDirection::Ascending => ordering,
                OrderDirection::Descending => ordering.reverse(),
            }
        });
        documents
    }
}

impl Default for MemoryDocumentStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DocumentStore for MemoryDocumentStore {
    async fn create(
        &self,
        collection: &str,
        fields_in: Map<String, Value>,
    ) -> Result<String, BackendError> {
        self.count_op();
        self.check_failure()?;

        let now = timestamp::to_wire(self.server_now());
        let mut stored = fields_in;
        stored.insert(fields::CREATED_AT.to_owned(), Value::String(now.clone()));
        stored.insert(fields::UPDATED_AT.to_owned(), Value::String(now));

        let id = Uuid::new_v4().simple().to_string();
        {
            let mut collections = self
                .inner
                .collections
                .lock()
                .unwrap_or_else(std::sync::PoisonError::into_inner);
            collections
                .entry(collection.to_owned())
                .or_default()
                .push(Document {
                    id: id.clone(),
                    fields: stored,
                });
        }
        self.notify(collection);
        Ok(id)
    }

    async fn list(&self, query: &CollectionQuery) -> Result<Vec<Document>, BackendError> {
        self.count_op();
        self.check_failure()?;
        Ok(Self::ordered_snapshot(&self.inner, query))
    }

    async fn get(&self, collection: &str, id: &str) -> Result<Option<Document>, BackendError> {
        self.count_op();
        self.check_failure()?;

        let collections = self
            .inner
            .collections
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        Ok(collections
            .get(collection)
            .and_then(|docs| docs.iter().find(|d| d.id == id))
            .cloned())
    }

    async fn update(
        &self,
        collection: &str,
        id: &str,
        fields_in: Map<String, Value>,
    ) -> Result<(), BackendError> {
        self.count_op();
        self.check_failure()?;

        let now = timestamp::to_wire(self.server_now());
        {
            let mut collections = self
                .inner
                .collections
                .lock()
                .unwrap_or_else(std::sync::PoisonError::into_inner);
            let document = collections
                .get_mut(collection)
                .and_then(|docs| docs.iter_mut().find(|d| d.id == id))
                .ok_or_else(|| BackendError::NotFound {
                    collection: collection.to_owned(),
                    id: id.to_owned(),
                })?;

            for (key, value) in fields_in {
                document.fields.insert(key, value);
            }
            document
                .fields
                .insert(fields::UPDATED_AT.to_owned(), Value::String(now));
        }
        self.notify(collection);
        Ok(())
    }

    async fn delete(&self, collection: &str, id: &str) -> Result<(), BackendError> {
        self.count_op();
        self.check_failure()?;

        {
            let mut collections = self
                .inner
                .collections
                .lock()
                .unwrap_or_else(std::sync::PoisonError::into_inner);
            let documents =
                collections
                    .get_mut(collection)
                    .ok_or_else(|| BackendError::NotFound {
                        collection: collection.to_owned(),
                        id: id.to_owned(),
                    })?;
            let before = documents.len();
            documents.retain(|d| d.id != id);
            if documents.len() == before {
                return Err(BackendError::NotFound {
                    collection: collection.to_owned(),
                    id: id.to_owned(),
                });
            }
        }
        self.notify(collection);
        Ok(())
    }

    fn subscribe(
        &self,
        query: CollectionQuery,
        on_snapshot: SnapshotCallback,
        on_error: ErrorCallback,
    ) -> ListenerHandle {
        let stopped = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&stopped);
        let inner = Arc::clone(&self.inner);
        let mut changes = self.inner.changes.subscribe();

        self.inner.active_listeners.fetch_add(1, Ordering::SeqCst);

        let failure = self.check_failure().err();
        let task = tokio::spawn(async move {
            if let Some(err) = failure {
                if !flag.load(Ordering::SeqCst) {
                    on_error(err);
                }
                return;
            }

            // Initial snapshot, then one per change to this collection.
            if flag.load(Ordering::SeqCst) {
                return;
            }
            on_snapshot(Self::ordered_snapshot(&inner, &query));

            loop {
                match changes.recv().await {
                    Ok(collection) if collection == query.collection => {
                        if flag.load(Ordering::SeqCst) {
                            break;
                        }
                        on_snapshot(Self::ordered_snapshot(&inner, &query));
                    }
                    Ok(_) => {}
                    // Lagged receivers just re-publish the current state.
                    Err(broadcast::error::RecvError::Lagged(_)) => {
                        if flag.load(Ordering::SeqCst) {
                            break;
                        }
                        on_snapshot(Self::ordered_snapshot(&inner, &query));
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        });

        let teardown_inner = Arc::clone(&self.inner);
        ListenerHandle::new(
            stopped,
            task.abort_handle(),
            Some(Box::new(move || {
                teardown_inner.active_listeners.fetch_sub(1, Ordering::SeqCst);
                teardown_inner.teardowns.fetch_add(1, Ordering::SeqCst);
            })),
        )
    }
}
