//! Authentication route handlers.

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use readymix_stores::Identity;

use crate::error::Result;
use crate::state::AppState;

/// Login form data.
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

/// Login response.
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub identity: Option<Identity>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Sign in with email and password.
///
/// POST /auth/login
///
/// Invalid credentials are a 401 with `success: false`, not a fault; the
/// session state is untouched. The identity in the response may lag the
/// provider notification by a beat, so clients should treat `GET /auth/me`
/// as the source of truth.
#[instrument(skip(state, form), fields(email = %form.email))]
pub async fn login(
    State(state): State<AppState>,
    Json(form): Json<LoginForm>,
) -> Result<impl IntoResponse> {
    let signed_in = state.session().sign_in(&form.email, &form.password).await?;

    if signed_in {
        Ok((
            StatusCode::OK,
            Json(LoginResponse {
                success: true,
                identity: state.session().identity(),
                message: None,
            }),
        ))
    } else {
        Ok((
            StatusCode::UNAUTHORIZED,
            Json(LoginResponse {
                success: false,
                identity: None,
                message: Some("Invalid email or password".to_string()),
            }),
        ))
    }
}

/// Sign out.
///
/// POST /auth/logout
#[instrument(skip(state))]
pub async fn logout(State(state): State<AppState>) -> Result<StatusCode> {
    state.session().sign_out().await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Current identity.
///
/// GET /auth/me
#[instrument(skip(state))]
pub async fn me(State(state): State<AppState>) -> impl IntoResponse {
    match state.session().identity() {
        Some(identity) => (StatusCode::OK, Json(serde_json::json!(identity))),
        None => (
            StatusCode::UNAUTHORIZED,
            Json(serde_json::json!({ "error": "Not signed in" })),
        ),
    }
}
