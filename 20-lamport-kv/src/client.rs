//! Typed HTTP client for a node's API.
//!
//! Used by the `put`/`get`/`status` CLI commands, by peers for `/replicate` and
//! `/sync`, and by the integration tests.

use std::time::Duration;

use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::error::ClientError;
use crate::message::{
    GetResponse, PutRequest, PutResponse, ReplicateRequest, ReplicateResponse, StatusResponse,
    SyncResponse,
};

#[derive(Debug, Clone)]
pub struct NodeClient {
    http: reqwest::Client,
    base_url: String,
    timeout: Duration,
}

impl NodeClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Self {
        Self::with_http(reqwest::Client::new(), base_url, timeout)
    }

    /// Builds a client that shares `http`'s connection pool.
    pub fn with_http(http: reqwest::Client, base_url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            timeout,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub async fn put(&self, key: &str, value: Value) -> Result<PutResponse, ClientError> {
        let body = PutRequest {
            key: key.to_string(),
            value,
        };
        self.post_json("/put", &body).await
    }

    /// Returns `None` when the node has no entry for `key`.
    pub async fn get(&self, key: &str) -> Result<Option<GetResponse>, ClientError> {
        let url = self.url("/get");
        let response = self
            .http
            .get(&url)
            .query(&[("key", key)])
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|source| ClientError::Transport {
                url: url.clone(),
                source,
            })?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        decode(url, response).await.map(Some)
    }

    pub async fn status(&self) -> Result<StatusResponse, ClientError> {
        self.get_json("/status").await
    }

    pub async fn sync(&self) -> Result<SyncResponse, ClientError> {
        self.get_json("/sync").await
    }

    pub async fn replicate(
        &self,
        request: &ReplicateRequest,
    ) -> Result<ReplicateResponse, ClientError> {
        self.post_json("/replicate", request).await
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ClientError> {
        let url = self.url(path);
        let response = self
            .http
            .get(&url)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|source| ClientError::Transport {
                url: url.clone(),
                source,
            })?;
        decode(url, response).await
    }

    async fn post_json<B, T>(&self, path: &str, body: &B) -> Result<T, ClientError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = self.url(path);
        let response = self
            .http
            .post(&url)
            .json(body)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|source| ClientError::Transport {
                url: url.clone(),
                source,
            })?;
        decode(url, response).await
    }
}

async fn decode<T: DeserializeOwned>(
    url: String,
    response: reqwest::Response,
) -> Result<T, ClientError> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(ClientError::Status { url, status, body });
    }
    response
        .json()
        .await
        .map_err(|source| ClientError::Transport { url, source })
}
