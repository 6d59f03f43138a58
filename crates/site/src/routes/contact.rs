//! Contact form route handlers.
//!
//! The one public write path: submissions go through the inquiry store,
//! which enforces the create-side invariants before calling the backend.

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use readymix_stores::{NewInquiry, StoreError};

use crate::state::AppState;

/// Contact form data.
#[derive(Debug, Deserialize)]
pub struct ContactForm {
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    pub message: String,
}

/// Response for form submission.
#[derive(Debug, Serialize)]
pub struct ContactResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inquiry_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Submit a customer inquiry.
///
/// POST /contact
///
/// Persists the inquiry through the store (forced `not_contacted` /
/// `medium` defaults) and returns the assigned identifier so the page can
/// show a reference number.
#[instrument(skip(state, form), fields(email = %form.email))]
pub async fn submit(
    State(state): State<AppState>,
    Json(form): Json<ContactForm>,
) -> impl IntoResponse {
    let submission = NewInquiry {
        name: form.name,
        email: form.email,
        phone: form.phone,
        message: form.message,
    };

    match state.inquiries().submit(submission).await {
        Ok(id) => {
            tracing::info!(inquiry_id = %id, "contact form submitted");
            (
                StatusCode::OK,
                Json(ContactResponse {
                    success: true,
                    inquiry_id: Some(id.into_inner()),
                    message: None,
                }),
            )
        }
        Err(StoreError::Validation(err)) => (
            StatusCode::BAD_REQUEST,
            Json(ContactResponse {
                success: false,
                inquiry_id: None,
                message: Some(err.to_string()),
            }),
        ),
        Err(err) => {
            tracing::error!(error = %err, "contact form submission failed");
            sentry::capture_error(&err);
            (
                StatusCode::BAD_GATEWAY,
                Json(ContactResponse {
                    success: false,
                    inquiry_id: None,
                    message: Some("Something went wrong. Please try again.".to_string()),
                }),
            )
        }
    }
}
