//! Order management route handlers.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::Serialize;
use tracing::instrument;

use readymix_core::OrderId;
use readymix_stores::{NewOrder, Order, OrderPatch};

use crate::error::Result;
use crate::state::AppState;

/// Order listing with the store's passive flags.
#[derive(Debug, Serialize)]
pub struct OrderListing {
    pub orders: Vec<Order>,
    pub loading: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Response for order creation.
#[derive(Debug, Serialize)]
pub struct OrderCreated {
    pub id: OrderId,
}

/// Live order list, newest first.
///
/// GET /orders
#[instrument(skip(state))]
pub async fn list(State(state): State<AppState>) -> impl IntoResponse {
    let store = state.orders();
    Json(OrderListing {
        orders: store.orders(),
        loading: store.is_loading(),
        error: store.last_error(),
    })
}

/// Create an order.
///
/// POST /orders
///
/// Requires a signed-in session (there is no public order path). The
/// persisted order always starts `pending` / `medium` whatever the
/// payload carried.
#[instrument(skip(state, new_order), fields(customer = %new_order.customer_name))]
pub async fn create(
    State(state): State<AppState>,
    Json(new_order): Json<NewOrder>,
) -> Result<impl IntoResponse> {
    let id = state.orders().add(new_order).await?;
    Ok((StatusCode::CREATED, Json(OrderCreated { id })))
}

/// One-shot re-fetch of the order list.
///
/// POST /orders/refresh
#[instrument(skip(state))]
pub async fn refresh(State(state): State<AppState>) -> Result<StatusCode> {
    state.orders().refresh().await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Merge a partial update into an order.
///
/// PATCH /orders/{id}
#[instrument(skip(state, patch), fields(id = %id))]
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(patch): Json<OrderPatch>,
) -> Result<StatusCode> {
    state.orders().update(&OrderId::new(id), patch).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Delete an order.
///
/// DELETE /orders/{id}
///
/// Destructive: the dashboard confirms with the operator before calling
/// this; the handler itself deletes unconditionally.
#[instrument(skip(state), fields(id = %id))]
pub async fn remove(State(state): State<AppState>, Path(id): Path<String>) -> Result<StatusCode> {
    state.orders().remove(&OrderId::new(id)).await?;
    Ok(StatusCode::NO_CONTENT)
}
