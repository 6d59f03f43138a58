//! In-memory adapters for the backend ports.
//!
//! Used by unit tests, offline development, and the seed tooling. Behavior
//! mirrors the hosted service where it matters to callers: server-assigned
//! IDs and strictly increasing server timestamps, ordered snapshots pushed
//! to live subscriptions on every change, and injectable failures so error
//! paths can be exercised.

mod docstore;
mod identity;

pub use docstore::MemoryDocumentStore;
pub use identity::MemoryIdentityProvider;
