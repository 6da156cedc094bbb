//! Provider that never leaves the process

use super::{EmailProvider, OutgoingEmail, ProviderReceipt};
use crate::error::Result;
use async_trait::async_trait;
use tracing::info;
use uuid::Uuid;

/// Logs each message and answers with a synthetic id
#[derive(Debug, Default, Clone)]
pub struct DryRunProvider;

impl DryRunProvider {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl EmailProvider for DryRunProvider {
    async fn send(&self, email: &OutgoingEmail) -> Result<ProviderReceipt> {
        let id = format!("dry-run-{}", Uuid::new_v4());

        let to: Vec<String> = email.to.iter().map(ToString::to_string).collect();
        info!(
            id = %id,
            from = %email.from,
            to = %to.join(", "),
            subject = %email.subject,
            html_bytes = email.html.len(),
            "Dry run: email not sent"
        );

        Ok(ProviderReceipt { id })
    }

    fn name(&self) -> &'static str {
        "dry_run"
    }
}
