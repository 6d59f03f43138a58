//! ReadyMix Core - Shared types library.
//!
//! This crate provides common types used across all ReadyMix components:
//! - `site` - Public marketing site
//! - `admin` - Internal back-office (staff-only)
//! - `stores` - Reactive session/inquiry/order stores
//! - `backend` - Hosted document backend client
//! - `cli` - Command-line tools for seeding and diagnostics
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no HTTP clients, no backend
//! access. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe IDs, emails, and statuses
//! - [`timestamp`] - Timestamp normalization at the backend boundary

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod timestamp;
pub mod types;

pub use types::*;
