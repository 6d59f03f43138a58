//! Document-store client over the service's REST surface.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::{debug, instrument};
use url::Url;

use crate::document::{CollectionQuery, Document};
use crate::error::BackendError;
use crate::http::{BackendConfig, TokenCell, error_message};
use crate::listener::{ErrorCallback, ListenerHandle, SnapshotCallback};
use crate::store::DocumentStore;

/// REST client for the hosted backend's document collections.
///
/// Live subscriptions use the service's long-poll watch endpoint: each
/// round trip blocks until the collection version moves past the supplied
/// cursor (or the server's hold timeout lapses), then returns the full
/// ordered snapshot.
#[derive(Clone)]
pub struct HttpDocumentStore {
    inner: Arc<DocStoreInner>,
}

struct DocStoreInner {
    client: reqwest::Client,
    api_base: Url,
    project: String,
    token: TokenCell,
}

#[derive(Debug, Deserialize)]
struct CreateResponse {
    id: String,
}

#[derive(Debug, Deserialize)]
struct ListResponse {
    documents: Vec<Document>,
}

#[derive(Debug, Deserialize)]
struct WatchResponse {
    version: u64,
    documents: Vec<Document>,
}

impl HttpDocumentStore {
    pub(crate) fn new(client: reqwest::Client, config: &BackendConfig, token: TokenCell) -> Self {
        Self {
            inner: Arc::new(DocStoreInner {
                client,
                api_base: config.api_base.clone(),
                project: config.project.clone(),
                token,
            }),
        }
    }

    fn collection_url(&self, collection: &str) -> String {
        format!(
            "{}v1/projects/{}/collections/{}/documents",
            self.inner.api_base, self.inner.project, collection
        )
    }

    fn document_url(&self, collection: &str, id: &str) -> String {
        format!("{}/{id}", self.collection_url(collection))
    }

    /// Attach the session token when a principal is signed in.
    fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match self.inner.token.get() {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    /// Probe the service's health endpoint.
    pub(crate) async fn ping(&self) -> Result<(), BackendError> {
        let url = format!("{}v1/health", self.inner.api_base);
        let response = self.inner.client.get(&url).send().await?;
        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(BackendError::from_status(
                status.as_u16(),
                error_message(response).await,
            ))
        }
    }

    /// One long-poll round trip of the watch endpoint.
    async fn watch_once(
        &self,
        query: &CollectionQuery,
        cursor: u64,
    ) -> Result<WatchResponse, BackendError> {
        let url = format!("{}:watch", self.collection_url(&query.collection));
        let request = self
            .inner
            .client
            .get(&url)
            .query(&[
                ("order_by", query.order_by.as_str()),
                ("direction", query.direction.as_str()),
                ("cursor", &cursor.to_string()),
            ]);

        let response = self.authorize(request).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(BackendError::from_status(
                status.as_u16(),
                error_message(response).await,
            ));
        }

        response
            .json::<WatchResponse>()
            .await
            .map_err(|e| BackendError::Parse(e.to_string()))
    }
}

#[async_trait]
impl DocumentStore for HttpDocumentStore {
    #[instrument(skip(self, new_fields), fields(collection = %collection))]
    async fn create(
        &self,
        collection: &str,
        new_fields: Map<String, Value>,
    ) -> Result<String, BackendError> {
        let body = serde_json::json!({ "fields": new_fields });
        let request = self.inner.client.post(self.collection_url(collection)).json(&body);

        let response = self.authorize(request).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(BackendError::from_status(
                status.as_u16(),
                error_message(response).await,
            ));
        }

        let created: CreateResponse = response
            .json()
            .await
            .map_err(|e| BackendError::Parse(e.to_string()))?;
        debug!(id = %created.id, "document created");
        Ok(created.id)
    }

    #[instrument(skip(self), fields(collection = %query.collection))]
    async fn list(&self, query: &CollectionQuery) -> Result<Vec<Document>, BackendError> {
        let request = self
            .inner
            .client
            .get(self.collection_url(&query.collection))
            .query(&[
                ("order_by", query.order_by.as_str()),
                ("direction", query.direction.as_str()),
            ]);

        let response = self.authorize(request).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(BackendError::from_status(
                status.as_u16(),
                error_message(response).await,
            ));
        }

        let listing: ListResponse = response
            .json()
            .await
            .map_err(|e| BackendError::Parse(e.to_string()))?;
        Ok(listing.documents)
    }

    #[instrument(skip(self), fields(collection = %collection, id = %id))]
    async fn get(&self, collection: &str, id: &str) -> Result<Option<Document>, BackendError> {
        let request = self.inner.client.get(self.document_url(collection, id));

        let response = self.authorize(request).send().await?;
        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !status.is_success() {
            return Err(BackendError::from_status(
                status.as_u16(),
                error_message(response).await,
            ));
        }

        let document: Document = response
            .json()
            .await
            .map_err(|e| BackendError::Parse(e.to_string()))?;
        Ok(Some(document))
    }

    #[instrument(skip(self, new_fields), fields(collection = %collection, id = %id))]
    async fn update(
        &self,
        collection: &str,
        id: &str,
        new_fields: Map<String, Value>,
    ) -> Result<(), BackendError> {
        let body = serde_json::json!({ "fields": new_fields });
        let request = self
            .inner
            .client
            .patch(self.document_url(collection, id))
            .json(&body);

        let response = self.authorize(request).send().await?;
        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(BackendError::NotFound {
                collection: collection.to_owned(),
                id: id.to_owned(),
            });
        }
        if !status.is_success() {
            return Err(BackendError::from_status(
                status.as_u16(),
                error_message(response).await,
            ));
        }
        Ok(())
    }

    #[instrument(skip(self), fields(collection = %collection, id = %id))]
    async fn delete(&self, collection: &str, id: &str) -> Result<(), BackendError> {
        let request = self.inner.client.delete(self.document_url(collection, id));

        let response = self.authorize(request).send().await?;
        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(BackendError::NotFound {
                collection: collection.to_owned(),
                id: id.to_owned(),
            });
        }
        if !status.is_success() {
            return Err(BackendError::from_status(
                status.as_u16(),
                error_message(response).await,
            ));
        }
        Ok(())
    }

    fn subscribe(
        &self,
        query: CollectionQuery,
        on_snapshot: SnapshotCallback,
        on_error: ErrorCallback,
    ) -> ListenerHandle {
        let stopped = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&stopped);
        let store = self.clone();

        let task = tokio::spawn(async move {
            let mut cursor = 0u64;
            loop {
                if flag.load(Ordering::SeqCst) {
                    break;
                }
                match store.watch_once(&query, cursor).await {
                    Ok(watched) => {
                        // The hold timeout lapsing returns the same version;
                        // only a moved cursor is a change worth publishing.
                        if watched.version != cursor {
                            cursor = watched.version;
                            if flag.load(Ordering::SeqCst) {
                                break;
                            }
                            on_snapshot(watched.documents);
                        }
                    }
                    Err(err) => {
                        if !flag.load(Ordering::SeqCst) {
                            on_error(err);
                        }
                        break;
                    }
                }
            }
        });

        ListenerHandle::new(stopped, task.abort_handle(), None)
    }
}
