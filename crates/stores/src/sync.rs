//! Identity-gated live synchronization shared by the collection stores.

use std::sync::{Arc, Mutex};

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use readymix_backend::{
    CollectionQuery, Document, DocumentStore, ErrorCallback, ListenerHandle, SnapshotCallback,
};

use crate::observers::ObserverRegistry;
use crate::session::SessionState;

/// Passive state exposed by a collection store.
pub(crate) struct CollectionState<T> {
    pub items: Vec<T>,
    pub loading: bool,
    pub error: Option<String>,
}

impl<T> Default for CollectionState<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            loading: true,
            error: None,
        }
    }
}

pub(crate) fn lock_state<T>(state: &Mutex<CollectionState<T>>) -> std::sync::MutexGuard<'_, CollectionState<T>> {
    state.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
}

/// Replace the exposed list with a fresh snapshot and notify observers.
pub(crate) fn publish_snapshot<T: Clone>(
    state: &Mutex<CollectionState<T>>,
    observers: &ObserverRegistry<Vec<T>>,
    items: Vec<T>,
) {
    {
        let mut guard = lock_state(state);
        guard.items.clone_from(&items);
        guard.loading = false;
        guard.error = None;
    }
    observers.notify(&items);
}

/// Spawn the task that keeps one collection store in sync with the session.
///
/// While an identity is present a live subscription feeds the exposed
/// list; the moment it goes absent the subscription is torn down (exactly
/// once - the handle is idempotent) and the list cleared. The subscription
/// callback is the sole writer of the list; mutation calls never touch it.
pub(crate) fn spawn_collection_sync<T>(
    documents: Arc<dyn DocumentStore>,
    mut session: watch::Receiver<SessionState>,
    query: CollectionQuery,
    convert: fn(Document) -> Option<T>,
    state: Arc<Mutex<CollectionState<T>>>,
    observers: Arc<ObserverRegistry<Vec<T>>>,
) -> JoinHandle<()>
where
    T: Clone + Send + Sync + 'static,
{
    tokio::spawn(async move {
        let mut listener: Option<ListenerHandle> = None;

        loop {
            let authenticated = session.borrow_and_update().identity().is_some();

            if authenticated {
                if listener.is_none() {
                    debug!(collection = %query.collection, "opening live subscription");
                    lock_state(&state).loading = true;
                    listener = Some(open_listener(
                        documents.as_ref(),
                        query.clone(),
                        convert,
                        Arc::clone(&state),
                        Arc::clone(&observers),
                    ));
                }
            } else {
                if let Some(mut handle) = listener.take() {
                    debug!(collection = %query.collection, "tearing down live subscription");
                    handle.stop();
                }
                publish_snapshot(&state, &observers, Vec::new());
            }

            if session.changed().await.is_err() {
                break;
            }
        }
        // Task exit drops any remaining listener, which stops it.
    })
}

fn open_listener<T>(
    documents: &dyn DocumentStore,
    query: CollectionQuery,
    convert: fn(Document) -> Option<T>,
    state: Arc<Mutex<CollectionState<T>>>,
    observers: Arc<ObserverRegistry<Vec<T>>>,
) -> ListenerHandle
where
    T: Clone + Send + Sync + 'static,
{
    let collection = query.collection.clone();

    let snapshot_state = Arc::clone(&state);
    let on_snapshot: SnapshotCallback = Arc::new(move |documents: Vec<Document>| {
        let items = convert_documents(&collection, documents, convert);
        publish_snapshot(&snapshot_state, &observers, items);
    });

    let error_collection = query.collection.clone();
    let on_error: ErrorCallback = Arc::new(move |err| {
        warn!(collection = %error_collection, error = %err, "live subscription failed");
        let mut guard = lock_state(&state);
        guard.loading = false;
        guard.error = Some(err.to_string());
    });

    documents.subscribe(query, on_snapshot, on_error)
}

/// Convert a raw snapshot, skipping documents that do not parse.
pub(crate) fn convert_documents<T>(
    collection: &str,
    documents: Vec<Document>,
    convert: fn(Document) -> Option<T>,
) -> Vec<T> {
    let total = documents.len();
    let items: Vec<T> = documents.into_iter().filter_map(convert).collect();
    if items.len() < total {
        warn!(
            collection = %collection,
            skipped = total - items.len(),
            "snapshot contained undecodable documents"
        );
    }
    items
}
