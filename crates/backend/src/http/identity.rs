//! Identity-provider client over the service's REST surface.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use tokio::sync::watch;
use tracing::{info, instrument};
use url::Url;

use readymix_core::PrincipalId;

use crate::error::BackendError;
use crate::http::{BackendConfig, TokenCell, error_message};
use crate::identity::{IdentityProvider, Principal};

/// REST client for the hosted backend's identity provider.
///
/// Sessions are not persisted across process restarts, so the auth-state
/// channel starts at `None` and moves on successful sign-in/sign-out.
pub struct HttpIdentityProvider {
    inner: Arc<IdentityInner>,
}

struct IdentityInner {
    client: reqwest::Client,
    api_base: Url,
    project: String,
    token: TokenCell,
    state: watch::Sender<Option<Principal>>,
}

#[derive(Debug, Deserialize)]
struct SignInResponse {
    id: String,
    email: String,
    display_name: Option<String>,
    avatar_url: Option<String>,
    session_token: String,
}

impl HttpIdentityProvider {
    pub(crate) fn new(client: reqwest::Client, config: &BackendConfig, token: TokenCell) -> Self {
        let (state, _) = watch::channel(None);
        Self {
            inner: Arc::new(IdentityInner {
                client,
                api_base: config.api_base.clone(),
                project: config.project.clone(),
                token,
                state,
            }),
        }
    }

    fn auth_url(&self, action: &str) -> String {
        format!(
            "{}v1/projects/{}/auth/{action}",
            self.inner.api_base, self.inner.project
        )
    }
}

#[async_trait]
impl IdentityProvider for HttpIdentityProvider {
    #[instrument(skip(self, password), fields(email = %email))]
    async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Principal, BackendError> {
        let body = serde_json::json!({ "email": email, "password": password });
        let response = self
            .inner
            .client
            .post(self.auth_url("sign-in"))
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(BackendError::from_status(
                status.as_u16(),
                error_message(response).await,
            ));
        }

        let signed_in: SignInResponse = response
            .json()
            .await
            .map_err(|e| BackendError::Parse(e.to_string()))?;

        let principal = Principal {
            id: PrincipalId::new(signed_in.id),
            email: signed_in.email,
            display_name: signed_in.display_name,
            avatar_url: signed_in.avatar_url,
        };

        self.inner.token.set(Some(signed_in.session_token));
        self.inner.state.send_replace(Some(principal.clone()));
        info!(principal = %principal.id, "signed in");
        Ok(principal)
    }

    #[instrument(skip(self))]
    async fn sign_out(&self) -> Result<(), BackendError> {
        let request = self.inner.client.post(self.auth_url("sign-out"));
        let request = match self.inner.token.get() {
            Some(token) => request.bearer_auth(token),
            None => request,
        };

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(BackendError::from_status(
                status.as_u16(),
                error_message(response).await,
            ));
        }

        self.inner.token.set(None);
        self.inner.state.send_replace(None);
        info!("signed out");
        Ok(())
    }

    fn auth_state(&self) -> watch::Receiver<Option<Principal>> {
        self.inner.state.subscribe()
    }
}
