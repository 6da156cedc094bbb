//! Transactional email provider abstraction

use crate::config::{ProviderConfig, ProviderKind};
use crate::email::EmailAddress;
use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

pub mod dry_run;
pub mod resend;

pub use dry_run::DryRunProvider;
pub use resend::ResendProvider;

/// A rendered message ready to hand to a provider
#[derive(Debug, Clone, PartialEq)]
pub struct OutgoingEmail {
    pub from: EmailAddress,
    pub to: Vec<EmailAddress>,
    pub cc: Vec<EmailAddress>,
    pub bcc: Vec<EmailAddress>,
    pub subject: String,
    pub html: String,
}

/// Provider acknowledgement for an accepted message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderReceipt {
    /// Provider message id
    pub id: String,
}

/// Email delivery backend
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EmailProvider: Send + Sync {
    /// Submit one message, addressed to every recipient in `email.to`
    async fn send(&self, email: &OutgoingEmail) -> Result<ProviderReceipt>;

    /// Provider name
    fn name(&self) -> &'static str;
}

/// Build the provider selected in the configuration
pub fn build_provider(config: &ProviderConfig) -> Result<Arc<dyn EmailProvider>> {
    match config.kind {
        ProviderKind::Resend => Ok(Arc::new(ResendProvider::new(
            config.api_key.clone(),
            config.base_url.clone(),
            Duration::from_secs(config.timeout_seconds),
        )?)),
        ProviderKind::DryRun => Ok(Arc::new(DryRunProvider::new())),
    }
}
