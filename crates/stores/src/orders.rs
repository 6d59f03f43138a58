//! The order store.

use std::sync::{Arc, Mutex};

use rust_decimal::Decimal;
use serde::Serialize;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{info, instrument, warn};

use readymix_backend::{CollectionQuery, Document, DocumentStore, OrderDirection};
use readymix_core::{OrderId, OrderStatus};

use crate::error::StoreError;
use crate::models::order::{NewOrder, Order, OrderPatch};
use crate::observers::{ObserverRegistry, StoreSubscription};
use crate::session::{SessionState, SessionStore};
use crate::sync::{
    CollectionState, convert_documents, lock_state, publish_snapshot, spawn_collection_sync,
};

/// Backend collection holding sales orders.
pub const ORDERS_COLLECTION: &str = "orders";

/// Counts by status over the current order snapshot.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct OrderStats {
    pub total: usize,
    pub pending: usize,
    pub processing: usize,
    pub completed: usize,
    pub cancelled: usize,
}

/// Reactive store over the order collection.
///
/// Symmetric to the inquiry store but with no public path: creating an
/// order requires an identity just like mutating one. The aggregate views
/// are plain computations over the exposed list and recompute with it.
pub struct OrderStore {
    documents: Arc<dyn DocumentStore>,
    session: watch::Receiver<SessionState>,
    state: Arc<Mutex<CollectionState<Order>>>,
    observers: Arc<ObserverRegistry<Vec<Order>>>,
    task: JoinHandle<()>,
}

impl OrderStore {
    /// Ordered view the store exposes: newest first.
    fn query() -> CollectionQuery {
        CollectionQuery::new(ORDERS_COLLECTION, "created_at", OrderDirection::Descending)
    }

    fn convert(document: Document) -> Option<Order> {
        let id = document.id.clone();
        match Order::from_document(document) {
            Ok(order) => Some(order),
            Err(err) => {
                warn!(collection = ORDERS_COLLECTION, id = %id, error = %err, "skipping undecodable document");
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

    /// Create an order. Staff only - there is no public path.
    ///
    /// # Errors
    ///
    /// `StoreError::AuthRequired` before any backend call when no identity
    /// is present; `StoreError::Validation` when required fields are empty
    /// or the email is malformed; `StoreError::Backend` when the service
    /// rejects the create.
    #[instrument(skip(self, new_order), fields(customer = %new_order.customer_name))]
    pub async fn add(&self, new_order: NewOrder) -> Result<OrderId, StoreError> {
        self.require_identity()?;
        new_order.validate()?;

        match self
            .documents
            .create(ORDERS_COLLECTION, new_order.into_fields())
            .await
        {
            Ok(id) => {
                info!(id = %id, "order created");
                Ok(OrderId::new(id))
            }
            Err(err) => {
                self.record_error(&err.to_string());
                Err(err.into())
            }
        }
    }

    /// Merge a partial update into an order. Staff only.
    ///
    /// # Errors
    ///
    /// `StoreError::AuthRequired` before any backend call when no identity
    /// is present; `StoreError::Backend` when the service rejects it.
    #[instrument(skip(self, patch), fields(id = %id))]
    pub async fn update(&self, id: &OrderId, patch: OrderPatch) -> Result<(), StoreError> {
        self.require_identity()?;

        match self
            .documents
            .update(ORDERS_COLLECTION, id.as_str(), patch.into_fields())
            .await
        {
            Ok(()) => Ok(()),
            Err(err) => {
                self.record_error(&err.to_string());
                Err(err.into())
            }
        }
    }

    /// Delete an order. Staff only.
    ///
    /// # Errors
    ///
    /// `StoreError::AuthRequired` before any backend call when no identity
    /// is present; `StoreError::Backend` when the service rejects it.
    #[instrument(skip(self), fields(id = %id))]
    pub async fn remove(&self, id: &OrderId) -> Result<(), StoreError> {
        self.require_identity()?;

        match self.documents.delete(ORDERS_COLLECTION, id.as_str()).await {
            Ok(()) => Ok(()),
            Err(err) => {
                self.record_error(&err.to_string());
                Err(err.into())
            }
        }
    }

    /// One-shot re-fetch of the list. A no-op without an identity.
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
                let items = convert_documents(ORDERS_COLLECTION, documents, Self::convert);
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
    pub fn orders(&self) -> Vec<Order> {
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
        callback: impl Fn(&[Order]) + Send + Sync + 'static,
    ) -> StoreSubscription<Vec<Order>> {
        self.observers
            .subscribe(move |items: &Vec<Order>| callback(items))
    }

    /// Counts by status over the current snapshot.
    #[must_use]
    pub fn stats(&self) -> OrderStats {
        let guard = lock_state(&self.state);
        let mut stats = OrderStats {
            total: guard.items.len(),
            ..OrderStats::default()
        };
        for order in &guard.items {
            match order.status {
                OrderStatus::Pending => stats.pending += 1,
                OrderStatus::Processing => stats.processing += 1,
                OrderStatus::Completed => stats.completed += 1,
                OrderStatus::Cancelled => stats.cancelled += 1,
            }
        }
        stats
    }

    /// The newest `limit` orders.
    #[must_use]
    pub fn recent(&self, limit: usize) -> Vec<Order> {
        let guard = lock_state(&self.state);
        guard.items.iter().take(limit).cloned().collect()
    }

    /// Sum of `estimated_value` over completed orders.
    #[must_use]
    pub fn completed_revenue(&self) -> Decimal {
        self.revenue_where(|status| status == OrderStatus::Completed)
    }

    /// Sum of `estimated_value` over pending and processing orders.
    #[must_use]
    pub fn pending_revenue(&self) -> Decimal {
        self.revenue_where(|status| {
            matches!(status, OrderStatus::Pending | OrderStatus::Processing)
        })
    }

    fn revenue_where(&self, include: impl Fn(OrderStatus) -> bool) -> Decimal {
        let guard = lock_state(&self.state);
        guard
            .items
            .iter()
            .filter(|order| include(order.status))
            .filter_map(|order| order.estimated_value)
            .sum()
    }
}

impl Drop for OrderStore {
    fn drop(&mut self) {
        self.task.abort();
    }
}
