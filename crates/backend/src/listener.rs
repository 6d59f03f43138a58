//! Live-subscription listener handles.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tokio::task::AbortHandle;

use crate::document::Document;
use crate::error::BackendError;

/// Callback invoked with the full ordered snapshot on every remote change.
pub type SnapshotCallback = Arc<dyn Fn(Vec<Document>) + Send + Sync>;

/// Callback invoked when the subscription fails (transport or permission).
pub type ErrorCallback = Arc<dyn Fn(BackendError) + Send + Sync>;

/// Handle to a live subscription.
///
/// Teardown is idempotent and exactly-once: however many times [`stop`] is
/// called (including the implicit call on drop), the underlying pump task is
/// aborted once and no callback fires after the first `stop` returns.
///
/// [`stop`]: ListenerHandle::stop
pub struct ListenerHandle {
    stopped: Arc<AtomicBool>,
    abort: AbortHandle,
    on_stop: Option<Box<dyn FnOnce() + Send>>,
}

impl ListenerHandle {
    /// Build a handle around a spawned pump task.
    ///
    /// `stopped` must be the same flag the pump task checks before invoking
    /// its callbacks. `on_stop` runs exactly once, on the first teardown.
    pub(crate) fn new(
        stopped: Arc<AtomicBool>,
        abort: AbortHandle,
        on_stop: Option<Box<dyn FnOnce() + Send>>,
    ) -> Self {
        Self {
            stopped,
            abort,
            on_stop,
        }
    }

    /// Tear the subscription down.
    ///
    /// Safe to call any number of times; only the first call has an effect.
    pub fn stop(&mut self) {
        if self.stopped.swap(true, Ordering::SeqCst) {
            return;
        }
        self.abort.abort();
        if let Some(on_stop) = self.on_stop.take() {
            on_stop();
        }
    }

    /// Whether the subscription has been torn down.
    #[must_use]
    pub fn is_stopped(&self) -> bool {
        self.stopped.load(Ordering::SeqCst)
    }
}

impl Drop for ListenerHandle {
    fn drop(&mut self) {
        self.stop();
    }
}

impl std::fmt::Debug for ListenerHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ListenerHandle")
            .field("stopped", &self.is_stopped())
            .finish_non_exhaustive()
    }
}
