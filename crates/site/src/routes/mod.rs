//! HTTP route handlers for the public site.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health        - Liveness check
//! GET  /health/ready  - Readiness check (probes the hosted backend)
//! POST /contact       - Submit a customer inquiry (public)
//! ```

pub mod contact;

use axum::{Router, routing::post};

use crate::state::AppState;

/// Create the public site router.
pub fn routes() -> Router<AppState> {
    Router::new().route("/contact", post(contact::submit))
}
