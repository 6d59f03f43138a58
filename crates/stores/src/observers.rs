//! Observer registration for store snapshots.
//!
//! The explicit Rust rendering of the subscribe-and-re-render pattern:
//! callers register a callback and get back a handle whose teardown is
//! idempotent and exactly-once.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, Weak};

type Callback<T> = Arc<dyn Fn(&T) + Send + Sync>;

/// Registry of snapshot observers for one store.
pub(crate) struct ObserverRegistry<T> {
    callbacks: Mutex<HashMap<u64, Callback<T>>>,
    next_id: AtomicU64,
}

impl<T> ObserverRegistry<T> {
    pub(crate) fn new() -> Arc<Self> {
        Arc::new(Self {
            callbacks: Mutex::new(HashMap::new()),
            next_id: AtomicU64::new(1),
        })
    }

    /// Register a callback and return its teardown handle.
    pub(crate) fn subscribe(
        self: &Arc<Self>,
        callback: impl Fn(&T) + Send + Sync + 'static,
    ) -> StoreSubscription<T> {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let mut callbacks = self
            .callbacks
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        callbacks.insert(id, Arc::new(callback));
        StoreSubscription {
            registry: Arc::downgrade(self),
            id,
            active: true,
        }
    }

    /// Invoke every registered callback with the given snapshot.
    ///
    /// Callbacks run outside the registry lock, so an observer may
    /// unsubscribe (or register new observers) from within its callback.
    pub(crate) fn notify(&self, value: &T) {
        let callbacks: Vec<Callback<T>> = {
            let guard = self
                .callbacks
                .lock()
                .unwrap_or_else(std::sync::PoisonError::into_inner);
            guard.values().cloned().collect()
        };
        for callback in callbacks {
            callback(value);
        }
    }

    fn remove(&self, id: u64) {
        let mut callbacks = self
            .callbacks
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        callbacks.remove(&id);
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.callbacks
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .len()
    }
}

/// Handle to one registered observer.
///
/// [`unsubscribe`](Self::unsubscribe) is idempotent; dropping the handle
/// unsubscribes as well. After teardown the callback is never invoked
/// again.
pub struct StoreSubscription<T> {
    registry: Weak<ObserverRegistry<T>>,
    id: u64,
    active: bool,
}

impl<T> StoreSubscription<T> {
    /// Remove the observer. Safe to call any number of times.
    pub fn unsubscribe(&mut self) {
        if !self.active {
            return;
        }
        self.active = false;
        if let Some(registry) = self.registry.upgrade() {
            registry.remove(self.id);
        }
    }

    /// Whether the observer is still registered.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.active
    }
}

impl<T> Drop for StoreSubscription<T> {
    fn drop(&mut self) {
        self.unsubscribe();
    }
}
