//! ReadyMix Backend - client for the hosted document backend.
//!
//! All persistence, authentication, and live change notification are
//! delegated to an external managed service. This crate wraps that service
//! behind two ports:
//!
//! - [`DocumentStore`] - create/list/get/update/delete plus live
//!   subscriptions over named collections of JSON documents
//! - [`IdentityProvider`] - email/password sign-in, sign-out, and an
//!   auth-state channel
//!
//! # Implementations
//!
//! - [`http`] - the production client over the service's REST surface
//! - [`memory`] - in-memory adapters for tests, offline development, and
//!   seeding
//!
//! The access-control contract (unauthenticated callers may only create
//! inquiry documents; everything else requires a signed-in principal) is
//! enforced by the service itself. Client-side checks in the store layer
//! are a convenience short-circuit, never the enforcement point.

#![cfg_attr(not(test), forbid(unsafe_code))]

mod document;
mod error;
mod identity;
mod listener;
mod store;

pub mod http;
pub mod memory;

pub use document::{CollectionQuery, Document, OrderDirection, compare_wire_values};
pub use error::BackendError;
pub use identity::{IdentityProvider, Principal};
pub use listener::{ErrorCallback, ListenerHandle, SnapshotCallback};
pub use store::DocumentStore;
