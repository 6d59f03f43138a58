//! Dashboard route handlers.

use axum::{Json, extract::State, response::IntoResponse};
use chrono::Utc;
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::instrument;

use readymix_stores::{Inquiry, Order, OrderStats, StoreError};

use crate::error::{AppError, Result};
use crate::state::AppState;
use crate::time::relative_age;

/// How many recent items the dashboard shows.
const RECENT_LIMIT: usize = 5;

/// An order row for the recent-activity panel.
#[derive(Debug, Serialize)]
pub struct RecentOrder {
    #[serde(flatten)]
    pub order: Order,
    /// Human-readable age, e.g. "12 minutes ago".
    pub age: String,
}

/// Aggregated dashboard payload.
///
/// Everything here is recomputed from the stores' current snapshots; the
/// numbers move as live updates land.
#[derive(Debug, Serialize)]
pub struct DashboardStats {
    pub orders: OrderStats,
    pub completed_revenue: Decimal,
    pub pending_revenue: Decimal,
    pub recent_orders: Vec<RecentOrder>,
    pub open_inquiries: usize,
    pub recent_inquiries: Vec<Inquiry>,
}

/// Dashboard statistics.
///
/// GET /dashboard/stats
#[instrument(skip(state))]
pub async fn stats(State(state): State<AppState>) -> Result<impl IntoResponse> {
    if state.session().identity().is_none() {
        return Err(AppError::Store(StoreError::AuthRequired));
    }

    let orders = state.orders();
    let inquiries = state.inquiries();
    let now = Utc::now();

    let recent_orders = orders
        .recent(RECENT_LIMIT)
        .into_iter()
        .map(|order| {
            let age = relative_age(order.created_at, now);
            RecentOrder { order, age }
        })
        .collect();

    let inquiry_list = inquiries.inquiries();
    let open_inquiries = inquiry_list
        .iter()
        .filter(|inquiry| inquiry.status != readymix_core::InquiryStatus::Completed)
        .count();

    Ok(Json(DashboardStats {
        orders: orders.stats(),
        completed_revenue: orders.completed_revenue(),
        pending_revenue: orders.pending_revenue(),
        recent_orders,
        open_inquiries,
        recent_inquiries: inquiry_list.into_iter().take(RECENT_LIMIT).collect(),
    }))
}
