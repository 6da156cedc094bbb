//! Email service: validate, render and hand messages to the provider

use crate::email::{Email, EmailAddress};
use crate::error::{MailerError, Result};
use crate::provider::{EmailProvider, OutgoingEmail, ProviderReceipt};
use crate::templates::TemplateRenderer;
use crate::utils::{sanitize_email, validate_email};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info, warn};

/// One entry of a batch recipient list; entries without an address are skipped
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchRecipient {
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
}

impl BatchRecipient {
    pub fn new(email: impl Into<String>, name: Option<String>) -> Self {
        Self {
            email: Some(email.into()),
            name,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeliveryStatus {
    Sent,
    Failed,
}

/// Outcome for one recipient
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecipientResult {
    pub email: String,
    pub status: DeliveryStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl RecipientResult {
    fn sent(email: String, receipt: ProviderReceipt) -> Self {
        Self {
            email,
            status: DeliveryStatus::Sent,
            message_id: Some(receipt.id),
            error: None,
        }
    }

    fn failed(email: String, err: &MailerError) -> Self {
        Self {
            email,
            status: DeliveryStatus::Failed,
            message_id: None,
            error: Some(err.to_string()),
        }
    }

    pub fn is_sent(&self) -> bool {
        self.status == DeliveryStatus::Sent
    }
}

/// Summary of a batch send
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchReport {
    pub sent: usize,
    pub failed: usize,
    /// Processed entries; skipped entries are not counted
    pub total: usize,
    pub results: Vec<RecipientResult>,
}

impl BatchReport {
    fn from_results(results: Vec<RecipientResult>) -> Self {
        let sent = results.iter().filter(|r| r.is_sent()).count();
        Self {
            sent,
            failed: results.len() - sent,
            total: results.len(),
            results,
        }
    }
}

/// A message rendered for inspection, never sent
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderedEmail {
    pub subject: String,
    pub html: String,
}

pub struct EmailService {
    provider: Arc<dyn EmailProvider>,
    default_from: EmailAddress,
}

impl EmailService {
    pub fn new(provider: Arc<dyn EmailProvider>, default_from: EmailAddress) -> Self {
        Self {
            provider,
            default_from,
        }
    }

    pub fn provider_name(&self) -> &'static str {
        self.provider.name()
    }

    /// Send one message addressed to every recipient in `to`.
    ///
    /// The template is rendered once for the primary recipient of `email`.
    pub async fn send(
        &self,
        email: &Email,
        to: &[EmailAddress],
        subject: Option<&str>,
        from: Option<EmailAddress>,
        cc: Vec<EmailAddress>,
        bcc: Vec<EmailAddress>,
    ) -> Result<ProviderReceipt> {
        email.validate()?;

        if to.is_empty() {
            return Err(MailerError::Validation("No recipients provided".to_string()));
        }
        for address in to.iter().chain(&cc).chain(&bcc) {
            validate_email(&address.email)?;
        }

        let html = TemplateRenderer::render(email)?;
        let outgoing = OutgoingEmail {
            from: from.unwrap_or_else(|| self.default_from.clone()),
            to: to.to_vec(),
            cc,
            bcc,
            subject: resolve_subject(email, subject),
            html,
        };

        info!(
            "Sending {} email to {} recipient(s)",
            email.kind(),
            outgoing.to.len()
        );

        let receipt = self.provider.send(&outgoing).await.map_err(|e| {
            error!("Failed to send {} email: {}", email.kind(), e);
            e
        })?;

        info!("Email accepted by provider: {}", receipt.id);
        Ok(receipt)
    }

    /// Send a separately rendered message to each recipient.
    ///
    /// A failure for one recipient is recorded and the loop continues.
    pub async fn send_personalized(
        &self,
        email: &Email,
        to: &[EmailAddress],
        subject: Option<&str>,
    ) -> Result<Vec<RecipientResult>> {
        email.validate()?;

        let mut results = Vec::with_capacity(to.len());
        for recipient in to {
            let personal = email.for_recipient(recipient.clone());
            let result = match self.deliver(&personal, subject).await {
                Ok(receipt) => RecipientResult::sent(recipient.email.clone(), receipt),
                Err(e) => {
                    warn!("Failed to send personalized email to {}: {}", recipient.email, e);
                    RecipientResult::failed(recipient.email.clone(), &e)
                }
            };
            results.push(result);
        }

        Ok(results)
    }

    /// Send a personalized message to every entry of `recipients`
    pub async fn send_batch(
        &self,
        email: &Email,
        recipients: &[BatchRecipient],
        subject: Option<&str>,
    ) -> Result<BatchReport> {
        email.validate()?;

        if recipients.is_empty() {
            return Err(MailerError::Validation("No recipients provided".to_string()));
        }

        let mut results = Vec::with_capacity(recipients.len());
        for entry in recipients {
            let address = match entry.email.as_deref().map(sanitize_email) {
                Some(address) if !address.is_empty() => address,
                _ => {
                    warn!("Skipping batch recipient without email");
                    continue;
                }
            };

            let recipient =
                EmailAddress::with_name(address.clone(), entry.name.clone().unwrap_or_default());
            let personal = email.for_recipient(recipient);

            let result = match self.deliver(&personal, subject).await {
                Ok(receipt) => RecipientResult::sent(address, receipt),
                Err(e) => {
                    warn!("Failed to send batch email to {}: {}", address, e);
                    RecipientResult::failed(address, &e)
                }
            };
            results.push(result);
        }

        let report = BatchReport::from_results(results);
        info!(
            sent = report.sent,
            failed = report.failed,
            "Batch send completed"
        );

        Ok(report)
    }

    /// Render `email` without sending it
    pub fn preview(&self, email: &Email, subject: Option<&str>) -> Result<RenderedEmail> {
        email.validate()?;

        Ok(RenderedEmail {
            subject: resolve_subject(email, subject),
            html: TemplateRenderer::render(email)?,
        })
    }

    /// Render and send `email` to its own recipient only
    async fn deliver(&self, email: &Email, subject: Option<&str>) -> Result<ProviderReceipt> {
        validate_email(&email.recipient.email)?;

        let outgoing = OutgoingEmail {
            from: self.default_from.clone(),
            to: vec![email.recipient.clone()],
            cc: Vec::new(),
            bcc: Vec::new(),
            subject: resolve_subject(email, subject),
            html: TemplateRenderer::render(email)?,
        };

        info!("Sending {} email to {}", email.kind(), email.recipient.email);
        self.provider.send(&outgoing).await
    }
}

fn resolve_subject(email: &Email, subject: Option<&str>) -> String {
    subject
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| email.default_subject())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::email::{Company, EmailContent};
    use crate::provider::MockEmailProvider;
    use std::collections::BTreeMap;

    fn company() -> Company {
        Company {
            name: "Acme".to_string(),
            address: "1 Road".to_string(),
            support_email: "help@acme.test".to_string(),
            website: "https://acme.test".to_string(),
            social_media: BTreeMap::new(),
            logo_url: None,
        }
    }

    fn welcome() -> Email {
        Email::new(
            company(),
            EmailAddress::with_name("ana@example.com", "Ana"),
            EmailContent::Welcome {
                dashboard_url: "https://acme.test/dashboard".to_string(),
            },
        )
    }

    fn service(provider: MockEmailProvider) -> EmailService {
        EmailService::new(
            Arc::new(provider),
            EmailAddress::with_name("no-reply@acme.test", "Acme"),
        )
    }

    #[tokio::test]
    async fn test_send_addresses_all_recipients_in_one_call() {
        let mut provider = MockEmailProvider::new();
        provider
            .expect_send()
            .withf(|email: &OutgoingEmail| {
                email.to.len() == 2
                    && email.subject == "Welcome to Acme!"
                    && email.from.email == "no-reply@acme.test"
                    && email.html.contains("Welcome, Ana!")
            })
            .times(1)
            .returning(|_| {
                Ok(ProviderReceipt {
                    id: "msg-1".to_string(),
                })
            });

        let to = vec![
            EmailAddress::with_name("ana@example.com", "Ana"),
            EmailAddress::new("bob@example.com"),
        ];
        let receipt = service(provider)
            .send(&welcome(), &to, None, None, vec![], vec![])
            .await
            .unwrap();

        assert_eq!(receipt.id, "msg-1");
    }

    #[tokio::test]
    async fn test_send_uses_explicit_subject_and_sender() {
        let mut provider = MockEmailProvider::new();
        provider
            .expect_send()
            .withf(|email: &OutgoingEmail| {
                email.subject == "Hello there"
                    && email.from.email == "team@acme.test"
                    && email.cc.len() == 1
            })
            .times(1)
            .returning(|_| {
                Ok(ProviderReceipt {
                    id: "msg-2".to_string(),
                })
            });

        let result = service(provider)
            .send(
                &welcome(),
                &[EmailAddress::new("ana@example.com")],
                Some("Hello there"),
                Some(EmailAddress::new("team@acme.test")),
                vec![EmailAddress::new("boss@acme.test")],
                vec![],
            )
            .await;

        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_send_rejects_invalid_email_without_calling_provider() {
        let mut provider = MockEmailProvider::new();
        provider.expect_send().never();

        let mut email = welcome();
        email.content = EmailContent::Welcome {
            dashboard_url: String::new(),
        };

        let result = service(provider)
            .send(&email, &[EmailAddress::new("ana@example.com")], None, None, vec![], vec![])
            .await;

        assert!(matches!(result, Err(MailerError::Validation(_))));
    }

    #[tokio::test]
    async fn test_send_requires_recipients() {
        let mut provider = MockEmailProvider::new();
        provider.expect_send().never();

        let result = service(provider)
            .send(&welcome(), &[], None, None, vec![], vec![])
            .await;

        assert!(matches!(result, Err(MailerError::Validation(_))));
    }

    #[tokio::test]
    async fn test_send_propagates_provider_error() {
        let mut provider = MockEmailProvider::new();
        provider.expect_send().times(1).returning(|_| {
            Err(MailerError::Provider {
                status: 422,
                body: "invalid from".to_string(),
            })
        });

        let result = service(provider)
            .send(&welcome(), &[EmailAddress::new("ana@example.com")], None, None, vec![], vec![])
            .await;

        assert!(matches!(result, Err(MailerError::Provider { status: 422, .. })));
    }

    #[tokio::test]
    async fn test_send_personalized_continues_after_failure() {
        let mut provider = MockEmailProvider::new();
        provider.expect_send().times(2).returning(|email| {
            if email.to[0].email == "bob@example.com" {
                Err(MailerError::Provider {
                    status: 500,
                    body: "boom".to_string(),
                })
            } else {
                Ok(ProviderReceipt {
                    id: format!("id-{}", email.to[0].email),
                })
            }
        });

        let to = vec![
            EmailAddress::new("bob@example.com"),
            EmailAddress::with_name("carol@example.com", "Carol"),
        ];
        let results = service(provider)
            .send_personalized(&welcome(), &to, None)
            .await
            .unwrap();

        assert_eq!(results.len(), 2);
        assert_eq!(results[0].status, DeliveryStatus::Failed);
        assert_eq!(results[1].status, DeliveryStatus::Sent);
        assert_eq!(results[1].message_id.as_deref(), Some("id-carol@example.com"));
    }

    #[tokio::test]
    async fn test_send_batch_counts_and_personalizes() {
        let mut provider = MockEmailProvider::new();
        provider
            .expect_send()
            .withf(|email: &OutgoingEmail| {
                email.to.len() == 1
                    && (email.html.contains("Welcome, Bob!")
                        || email.html.contains("Welcome, User!"))
            })
            .times(2)
            .returning(|email| {
                Ok(ProviderReceipt {
                    id: format!("id-{}", email.to[0].email),
                })
            });

        let recipients = vec![
            BatchRecipient::new("bob@example.com", Some("Bob".to_string())),
            BatchRecipient::default(),
            BatchRecipient::new("not-an-email", None),
            BatchRecipient::new("carol@example.com", None),
        ];

        let report = service(provider)
            .send_batch(&welcome(), &recipients, None)
            .await
            .unwrap();

        assert_eq!(report.sent, 2);
        assert_eq!(report.failed, 1);
        assert_eq!(report.total, 3);
        assert_eq!(report.results[1].email, "not-an-email");
        assert!(report.results[1].error.is_some());
    }

    #[tokio::test]
    async fn test_send_batch_requires_recipients() {
        let mut provider = MockEmailProvider::new();
        provider.expect_send().never();

        let result = service(provider).send_batch(&welcome(), &[], None).await;
        assert!(matches!(result, Err(MailerError::Validation(_))));
    }

    #[tokio::test]
    async fn test_send_batch_records_provider_failures() {
        let mut provider = MockEmailProvider::new();
        provider.expect_send().times(2).returning(|_| {
            Err(MailerError::Provider {
                status: 503,
                body: "unavailable".to_string(),
            })
        });

        let recipients = vec![
            BatchRecipient::new("a@example.com", None),
            BatchRecipient::new("b@example.com", None),
        ];
        let report = service(provider)
            .send_batch(&welcome(), &recipients, None)
            .await
            .unwrap();

        assert_eq!(report.sent, 0);
        assert_eq!(report.failed, 2);
        assert!(report.results.iter().all(|r| !r.is_sent()));
    }

    #[test]
    fn test_preview_does_not_send() {
        let mut provider = MockEmailProvider::new();
        provider.expect_send().never();

        let rendered = service(provider).preview(&welcome(), None).unwrap();
        assert_eq!(rendered.subject, "Welcome to Acme!");
        assert!(rendered.html.contains("Welcome, Ana!"));
    }

    #[test]
    fn test_batch_report_serialization() {
        let report = BatchReport::from_results(vec![RecipientResult::sent(
            "a@example.com".to_string(),
            ProviderReceipt {
                id: "id-1".to_string(),
            },
        )]);

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["sent"], 1);
        assert_eq!(json["results"][0]["status"], "sent");
        assert!(json["results"][0].get("error").is_none());
    }
}
