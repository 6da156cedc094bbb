//! Resend HTTP API client
//!
//! `POST {base_url}/emails` with a bearer token; the answer carries the id of
//! the accepted message.

use super::{EmailProvider, OutgoingEmail, ProviderReceipt};
use crate::error::{MailerError, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

pub struct ResendProvider {
    api_key: String,
    base_url: String,
    client: reqwest::Client,
}

/// Request body of `POST /emails`
#[derive(Debug, Serialize)]
struct ResendEmailRequest {
    from: String,
    to: Vec<String>,
    subject: String,
    html: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    cc: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    bcc: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct ResendEmailResponse {
    id: String,
}

impl From<&OutgoingEmail> for ResendEmailRequest {
    fn from(email: &OutgoingEmail) -> Self {
        Self {
            from: email.from.to_string(),
            to: email.to.iter().map(ToString::to_string).collect(),
            subject: email.subject.clone(),
            html: email.html.clone(),
            cc: email.cc.iter().map(ToString::to_string).collect(),
            bcc: email.bcc.iter().map(ToString::to_string).collect(),
        }
    }
}

impl ResendProvider {
    pub fn new(api_key: String, base_url: String, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(Self {
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        })
    }
}

#[async_trait]
impl EmailProvider for ResendProvider {
    async fn send(&self, email: &OutgoingEmail) -> Result<ProviderReceipt> {
        let request = ResendEmailRequest::from(email);
        let url = format!("{}/emails", self.base_url);

        debug!("Resend: sending '{}' to {} recipient(s)", request.subject, request.to.len());

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!("Resend: request failed with status {}: {}", status, body);
            return Err(MailerError::Provider {
                status: status.as_u16(),
                body,
            });
        }

        let ResendEmailResponse { id } = response.json().await?;
        debug!("Resend: accepted message {}", id);

        Ok(ProviderReceipt { id })
    }

    fn name(&self) -> &'static str {
        "resend"
    }
}
