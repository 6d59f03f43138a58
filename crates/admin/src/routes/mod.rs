//! HTTP route handlers for the admin back-office.
//!
//! # Route Structure
//!
//! ```text
//! GET    /health               - Liveness check
//! GET    /health/ready         - Readiness check (probes the hosted backend)
//!
//! # Auth
//! POST   /auth/login           - Sign in with email/password
//! POST   /auth/logout          - Sign out
//! GET    /auth/me              - Current identity
//!
//! # Inquiries
//! GET    /inquiries            - Live inquiry list (newest first)
//! POST   /inquiries/refresh    - One-shot re-fetch
//! PATCH  /inquiries/{id}       - Merge a partial update
//! DELETE /inquiries/{id}       - Delete an inquiry
//!
//! # Orders
//! GET    /orders               - Live order list (newest first)
//! POST   /orders               - Create an order
//! POST   /orders/refresh       - One-shot re-fetch
//! PATCH  /orders/{id}          - Merge a partial update
//! DELETE /orders/{id}          - Delete an order
//!
//! # Dashboard
//! GET    /dashboard/stats      - Status counts, revenue, recent activity
//! ```
//!
//! Auth gating happens in the stores: any staff operation without a
//! signed-in identity comes back 401 before the backend is contacted, and
//! the service re-checks its own rules regardless.

pub mod auth;
pub mod dashboard;
pub mod inquiries;
pub mod orders;

use axum::{
    Router,
    routing::{get, patch, post},
};

use crate::state::AppState;

/// Create the admin router.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/auth/login", post(auth::login))
        .route("/auth/logout", post(auth::logout))
        .route("/auth/me", get(auth::me))
        .route("/inquiries", get(inquiries::list))
        .route("/inquiries/refresh", post(inquiries::refresh))
        .route(
            "/inquiries/{id}",
            patch(inquiries::update).delete(inquiries::remove),
        )
        .route("/orders", get(orders::list).post(orders::create))
        .route("/orders/refresh", post(orders::refresh))
        .route("/orders/{id}", patch(orders::update).delete(orders::remove))
        .route("/dashboard/stats", get(dashboard::stats))
}
