//! HTTP client for the email API
//!
//! Used by the `mailer-client` binary and the integration tests.

use crate::api::types::{BatchRequest, BatchResponse, HealthResponse, SendResponse};
use crate::api::API_KEY_HEADER;
use crate::email::EmailKind;
use crate::service::RenderedEmail;
use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;
use tracing::debug;

/// Default API base URL
pub const DEFAULT_API_URL: &str = "http://localhost:8000/api";

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("API error ({status}): {detail}")]
    Api { status: u16, detail: String },

    #[error("Connection error: {0}")]
    Http(#[from] reqwest::Error),
}

pub struct EmailApiClient {
    base_url: String,
    api_key: Option<String>,
    client: reqwest::Client,
}

impl EmailApiClient {
    /// `base_url` points at the API prefix, e.g. `http://localhost:8000/api`
    pub fn new(base_url: impl Into<String>, api_key: Option<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.filter(|key| !key.is_empty()),
            client: reqwest::Client::new(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// `GET /health`, served at the root rather than under the API prefix
    pub async fn health(&self) -> Result<HealthResponse, ClientError> {
        let root = self.base_url.strip_suffix("/api").unwrap_or(&self.base_url);
        let url = format!("{}/health", root);
        debug!("Checking API health: {}", url);

        let response = self.client.get(&url).send().await?;
        Self::handle_response(response).await
    }

    /// Send a single email of `kind`; `body` is the matching request type
    pub async fn send<B>(&self, kind: EmailKind, body: &B) -> Result<SendResponse, ClientError>
    where
        B: Serialize + ?Sized,
    {
        self.post(kind.as_str(), body).await
    }

    pub async fn send_batch(&self, body: &BatchRequest) -> Result<BatchResponse, ClientError> {
        self.post("batch", body).await
    }

    pub async fn preview(&self, body: &BatchRequest) -> Result<RenderedEmail, ClientError> {
        self.post("preview", body).await
    }

    async fn post<B, T>(&self, path: &str, body: &B) -> Result<T, ClientError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = format!("{}/emails/{}", self.base_url, path);
        debug!("POST {}", url);

        let mut request = self.client.post(&url).json(body);
        if let Some(key) = &self.api_key {
            request = request.header(API_KEY_HEADER, key);
        }

        let response = request.send().await?;
        Self::handle_response(response).await
    }

    async fn handle_response<T: DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, ClientError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response.json().await?);
        }

        let text = response.text().await.unwrap_or_default();
        Err(ClientError::Api {
            status: status.as_u16(),
            detail: error_detail(&text),
        })
    }
}

/// The `error` (or `detail`) field of a JSON error body, else the raw text
fn error_detail(text: &str) -> String {
    serde_json::from_str::<serde_json::Value>(text)
        .ok()
        .and_then(|body| {
            body.get("error")
                .or_else(|| body.get("detail"))
                .and_then(|v| v.as_str())
                .map(str::to_string)
        })
        .unwrap_or_else(|| text.to_string())
}
