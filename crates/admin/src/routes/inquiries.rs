//! Inquiry management route handlers.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::Serialize;
use tracing::instrument;

use readymix_core::InquiryId;
use readymix_stores::{Inquiry, InquiryPatch};

use crate::error::Result;
use crate::state::AppState;

/// Inquiry listing with the store's passive flags.
#[derive(Debug, Serialize)]
pub struct InquiryListing {
    pub inquiries: Vec<Inquiry>,
    pub loading: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Live inquiry list, newest first.
///
/// GET /inquiries
///
/// Reads the store snapshot; while a session is active the live
/// subscription keeps it current without polling the backend.
#[instrument(skip(state))]
pub async fn list(State(state): State<AppState>) -> impl IntoResponse {
    let store = state.inquiries();
    Json(InquiryListing {
        inquiries: store.inquiries(),
        loading: store.is_loading(),
        error: store.last_error(),
    })
}

/// One-shot re-fetch of the inquiry list.
///
/// POST /inquiries/refresh
#[instrument(skip(state))]
pub async fn refresh(State(state): State<AppState>) -> Result<StatusCode> {
    state.inquiries().refresh().await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Merge a partial update into an inquiry.
///
/// PATCH /inquiries/{id}
#[instrument(skip(state, patch), fields(id = %id))]
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(patch): Json<InquiryPatch>,
) -> Result<StatusCode> {
    state
        .inquiries()
        .update(&InquiryId::new(id), patch)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Delete an inquiry.
///
/// DELETE /inquiries/{id}
///
/// Destructive: the dashboard confirms with the operator before calling
/// this; the handler itself deletes unconditionally.
#[instrument(skip(state), fields(id = %id))]
pub async fn remove(State(state): State<AppState>, Path(id): Path<String>) -> Result<StatusCode> {
    state.inquiries().remove(&InquiryId::new(id)).await?;
    Ok(StatusCode::NO_CONTENT)
}
