//! ReadyMix Stores - reactive state over the hosted backend.
//!
//! Three long-lived stores make up the application core:
//!
//! - [`SessionStore`] - single source of truth for "who is signed in",
//!   bridging the identity provider's notifications to application state
//! - [`InquiryStore`] - the customer-inquiry collection: public submission,
//!   staff-gated mutation, live sync while a session is active
//! - [`OrderStore`] - the sales-order collection: fully staff-gated, live
//!   sync, plus derived dashboard aggregates
//!
//! The session store is constructed first and injected into the collection
//! stores; its identity channel gates their live subscriptions. Mutations
//! never touch the exposed lists directly - the subscription snapshot (or a
//! manual refresh) is the only writer, so a caller may briefly observe
//! pre-mutation state until the next snapshot lands.

#![cfg_attr(not(test), forbid(unsafe_code))]

mod error;
mod inquiries;
mod models;
mod observers;
mod orders;
mod session;
mod sync;

#[cfg(test)]
pub(crate) mod testutil;

pub use error::{StoreError, ValidationError};
pub use inquiries::{INQUIRIES_COLLECTION, InquiryStore};
pub use models::identity::{Identity, PROFILES_COLLECTION};
pub use models::inquiry::{Inquiry, InquiryPatch, NewInquiry};
pub use models::order::{NewOrder, Order, OrderPatch};
pub use observers::StoreSubscription;
pub use orders::{ORDERS_COLLECTION, OrderStats, OrderStore};
pub use session::{SessionState, SessionStore};
