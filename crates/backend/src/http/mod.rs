//! HTTP client for the hosted backend's REST surface.
//!
//! One [`HttpBackend`] owns the reqwest client and the shared session
//! token; the document store attaches the token (when present) so the
//! service can evaluate its access rules per principal.

mod docstore;
mod identity;

pub use docstore::HttpDocumentStore;
pub use identity::HttpIdentityProvider;

use std::sync::{Arc, RwLock};

use reqwest::header::{HeaderMap, HeaderValue};
use secrecy::{ExposeSecret, SecretString};
use url::Url;

use crate::error::BackendError;

/// Connection settings for the hosted backend.
///
/// Implements `Debug` manually to redact the API key.
#[derive(Clone)]
pub struct BackendConfig {
    /// Service base URL, e.g. `https://data.example-cloud.dev`.
    pub api_base: Url,
    /// Project (tenant) slug all collection paths are scoped under.
    pub project: String,
    /// Project API key sent with every request.
    pub api_key: SecretString,
}

impl std::fmt::Debug for BackendConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BackendConfig")
            .field("api_base", &self.api_base.as_str())
            .field("project", &self.project)
            .field("api_key", &"[REDACTED]")
            .finish()
    }
}

/// Current session token, shared between the identity provider (writer)
/// and the document store (reader).
#[derive(Debug, Default, Clone)]
pub(crate) struct TokenCell(Arc<RwLock<Option<String>>>);

impl TokenCell {
    pub(crate) fn set(&self, token: Option<String>) {
        if let Ok(mut guard) = self.0.write() {
            *guard = token;
        }
    }

    pub(crate) fn get(&self) -> Option<String> {
        self.0.read().ok().and_then(|guard| guard.clone())
    }
}

/// The connected pair of HTTP clients.
pub struct HttpBackend {
    documents: Arc<HttpDocumentStore>,
    identity: Arc<HttpIdentityProvider>,
}

impl HttpBackend {
    /// Build the document-store and identity clients from one config.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying HTTP client fails to build.
    pub fn connect(config: &BackendConfig) -> Result<Self, BackendError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            "x-api-key",
            HeaderValue::from_str(config.api_key.expose_secret())
                .map_err(|e| BackendError::Parse(format!("invalid API key format: {e}")))?,
        );
        headers.insert("Content-Type", HeaderValue::from_static("application/json"));

        let client = reqwest::Client::builder().default_headers(headers).build()?;

        let token = TokenCell::default();
        let documents = Arc::new(HttpDocumentStore::new(
            client.clone(),
            config,
            token.clone(),
        ));
        let identity = Arc::new(HttpIdentityProvider::new(client, config, token));

        Ok(Self {
            documents,
            identity,
        })
    }

    /// The document-store client.
    #[must_use]
    pub fn documents(&self) -> Arc<HttpDocumentStore> {
        Arc::clone(&self.documents)
    }

    /// The identity-provider client.
    #[must_use]
    pub fn identity(&self) -> Arc<HttpIdentityProvider> {
        Arc::clone(&self.identity)
    }

    /// Probe the service's health endpoint.
    ///
    /// # Errors
    ///
    /// Returns the transport or service error when the backend is not
    /// reachable or unhealthy.
    pub async fn ping(&self) -> Result<(), BackendError> {
        self.documents.ping().await
    }
}

/// Read an error response body, preferring the service's structured
/// `{"error": {"message": ...}}` shape and falling back to raw text.
pub(crate) async fn error_message(response: reqwest::Response) -> String {
    let text = response.text().await.unwrap_or_default();
    serde_json::from_str::<serde_json::Value>(&text)
        .ok()
        .and_then(|v| {
            v.get("error")
                .and_then(|e| e.get("message"))
                .and_then(|m| m.as_str())
                .map(str::to_owned)
        })
        .unwrap_or(text)
}
