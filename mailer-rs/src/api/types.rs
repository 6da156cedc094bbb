//! Request and response bodies of the email API

use crate::email::{
    Alert, Company, Email, EmailAddress, EmailContent, EmailKind, Notification, Order,
    DEFAULT_RESET_EXPIRY_HOURS,
};
use crate::error::{MailerError, Result};
use crate::service::{BatchRecipient, RecipientResult};
use crate::utils::validate_email;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Recipient(s) of a single-send request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum UserInput {
    Single {
        email: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        name: Option<String>,
    },
    Multiple {
        emails: Vec<String>,
        /// Matched to `emails` by position
        #[serde(default, skip_serializing_if = "Option::is_none")]
        names: Option<Vec<String>>,
    },
}

impl UserInput {
    pub fn addresses(&self) -> Vec<EmailAddress> {
        match self {
            UserInput::Single { email, name } => {
                vec![EmailAddress::with_name(email.clone(), name.clone().unwrap_or_default())]
            }
            UserInput::Multiple { emails, names } => emails
                .iter()
                .enumerate()
                .map(|(i, email)| {
                    let name = names
                        .as_ref()
                        .and_then(|names| names.get(i))
                        .cloned()
                        .unwrap_or_default();
                    EmailAddress::with_name(email.clone(), name)
                })
                .collect(),
        }
    }

    /// All addresses; the first one is the primary user of the template
    pub fn recipients(&self) -> Result<(EmailAddress, Vec<EmailAddress>)> {
        let addresses = self.addresses();
        for address in &addresses {
            validate_email(&address.email)?;
        }
        let primary = addresses
            .first()
            .cloned()
            .ok_or_else(|| MailerError::Validation("user must contain at least one email".to_string()))?;
        Ok((primary, addresses))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WelcomeQuery {
    pub dashboard_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PasswordResetQuery {
    pub reset_url: String,
    #[serde(default = "default_expires_in")]
    pub expires_in: i64,
}

fn default_expires_in() -> i64 {
    DEFAULT_RESET_EXPIRY_HOURS
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NotificationQuery {
    #[serde(default)]
    pub preferences_url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WelcomeRequest {
    pub company: Company,
    pub user: UserInput,
    pub query: WelcomeQuery,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PasswordResetRequest {
    pub company: Company,
    pub user: UserInput,
    pub query: PasswordResetQuery,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationRequest {
    pub company: Company,
    pub user: UserInput,
    pub notification: Notification,
    #[serde(default)]
    pub query: Option<NotificationQuery>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlertRequest {
    pub company: Company,
    pub user: UserInput,
    pub alert: Alert,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderConfirmationRequest {
    pub company: Company,
    pub user: UserInput,
    pub order: Order,
}

/// Body of `/batch` and `/preview`.
///
/// Fields are optional so that missing ones are reported as 400 with a message
/// naming the field instead of a generic deserialization failure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BatchRequest {
    #[serde(default)]
    pub email_type: Option<String>,
    #[serde(default)]
    pub company: Option<Company>,
    #[serde(default)]
    pub recipients: Vec<BatchRecipient>,
    /// Kind-specific values: `dashboard_url`, `reset_url`/`expires_in`, or the
    /// notification fields plus `preferences_url`
    #[serde(default)]
    pub query: Option<Map<String, Value>>,
    #[serde(default)]
    pub alert: Option<Alert>,
    #[serde(default)]
    pub order: Option<Order>,
    #[serde(default)]
    pub subject: Option<String>,
}

impl BatchRequest {
    /// Build the template email, addressed to the first usable recipient
    pub fn to_email(&self) -> Result<Email> {
        let kind: EmailKind = self
            .email_type
            .as_deref()
            .filter(|t| !t.is_empty())
            .ok_or_else(|| MailerError::Validation("email_type is required".to_string()))?
            .parse()?;

        let company = self
            .company
            .clone()
            .ok_or_else(|| MailerError::Validation("company is required".to_string()))?;

        if self.recipients.is_empty() {
            return Err(MailerError::Validation("recipients is required".to_string()));
        }

        let content = self.content(kind)?;
        Ok(Email::new(company, self.primary_recipient()?, content))
    }

    /// First recipient with a valid address, else the first with any address
    fn primary_recipient(&self) -> Result<EmailAddress> {
        let with_email: Vec<&BatchRecipient> = self
            .recipients
            .iter()
            .filter(|r| r.email.as_deref().is_some_and(|e| !e.trim().is_empty()))
            .collect();

        let chosen = with_email
            .iter()
            .find(|r| r.email.as_deref().is_some_and(|e| validate_email(e.trim()).is_ok()))
            .or(with_email.first())
            .ok_or_else(|| {
                MailerError::Validation("recipients must contain at least one email".to_string())
            })?;

        Ok(EmailAddress::with_name(
            chosen.email.as_deref().unwrap_or_default().trim(),
            chosen.name.clone().unwrap_or_default(),
        ))
    }

    fn content(&self, kind: EmailKind) -> Result<EmailContent> {
        let query = self.query.as_ref().filter(|q| !q.is_empty());

        match kind {
            EmailKind::Welcome => Ok(EmailContent::Welcome {
                dashboard_url: query_str(query, "dashboard_url")
                    .ok_or_else(|| MailerError::Validation("dashboard_url is required".to_string()))?,
            }),
            EmailKind::PasswordReset => Ok(EmailContent::PasswordReset {
                reset_url: query_str(query, "reset_url")
                    .ok_or_else(|| MailerError::Validation("reset_url is required".to_string()))?,
                expires_in: match query.and_then(|q| q.get("expires_in")) {
                    None => DEFAULT_RESET_EXPIRY_HOURS,
                    Some(value) => value.as_i64().ok_or_else(|| {
                        MailerError::Validation(
                            "expires_in must be an integer number of hours".to_string(),
                        )
                    })?,
                },
            }),
            EmailKind::Notification => {
                let query = query.ok_or_else(|| {
                    MailerError::Validation("query with the notification data is required".to_string())
                })?;
                let notification: Notification =
                    serde_json::from_value(Value::Object(query.clone())).map_err(|e| {
                        MailerError::Validation(format!("Invalid notification data: {}", e))
                    })?;
                Ok(EmailContent::Notification {
                    notification,
                    preferences_url: query_str(Some(query), "preferences_url"),
                })
            }
            EmailKind::Alert => Ok(EmailContent::Alert {
                alert: self
                    .alert
                    .clone()
                    .ok_or_else(|| MailerError::Validation("alert is required".to_string()))?,
            }),
            EmailKind::OrderConfirmation => Ok(EmailContent::OrderConfirmation {
                order: self
                    .order
                    .clone()
                    .ok_or_else(|| MailerError::Validation("order is required".to_string()))?,
            }),
        }
    }
}

fn query_str(query: Option<&Map<String, Value>>, key: &str) -> Option<String> {
    query
        .and_then(|q| q.get(key))
        .and_then(Value::as_str)
        .filter(|s| !s.trim().is_empty())
        .map(str::to_string)
}

/// Answer of the single-send endpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SendResponse {
    pub status: String,
    pub message_id: String,
}

/// Answer of `/batch`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchResponse {
    pub status: String,
    pub sent: usize,
    pub failed: usize,
    pub total: usize,
    pub results: Vec<RecipientResult>,
}

/// Answer of `/health`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub service: String,
    pub version: String,
    pub provider: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn company_json() -> Value {
        json!({
            "name": "Acme",
            "address": "1 Road",
            "support_email": "help@acme.test",
            "website": "https://acme.test"
        })
    }

    #[test]
    fn test_user_input_single() {
        let user: UserInput =
            serde_json::from_value(json!({"email": "ana@example.com", "name": "Ana"})).unwrap();
        let (primary, all) = user.recipients().unwrap();
        assert_eq!(primary.name.as_deref(), Some("Ana"));
        assert_eq!(all.len(), 1);
    }

    #[test]
    fn test_user_input_multiple_with_short_names() {
        let user: UserInput = serde_json::from_value(json!({
            "emails": ["ana@example.com", "bob@example.com"],
            "names": ["Ana"]
        }))
        .unwrap();

        let (primary, all) = user.recipients().unwrap();
        assert_eq!(primary.email, "ana@example.com");
        assert_eq!(all[1].email, "bob@example.com");
        assert!(all[1].name.is_none());
    }

    #[test]
    fn test_user_input_rejects_invalid_and_empty() {
        let user: UserInput =
            serde_json::from_value(json!({"emails": ["ana@example.com", "nope"]})).unwrap();
        assert!(matches!(user.recipients(), Err(MailerError::InvalidEmail(_))));

        let user: UserInput = serde_json::from_value(json!({"emails": []})).unwrap();
        assert!(matches!(user.recipients(), Err(MailerError::Validation(_))));
    }

    #[test]
    fn test_batch_request_welcome() {
        let request: BatchRequest = serde_json::from_value(json!({
            "email_type": "welcome",
            "company": company_json(),
            "recipients": [{"name": "Nobody"}, {"email": "ana@example.com", "name": "Ana"}],
            "query": {"dashboard_url": "https://acme.test/dashboard"}
        }))
        .unwrap();

        let email = request.to_email().unwrap();
        assert_eq!(email.kind(), EmailKind::Welcome);
        assert_eq!(email.recipient.email, "ana@example.com");
    }

    #[test]
    fn test_batch_request_missing_fields() {
        let missing = |body: Value| {
            let request: BatchRequest = serde_json::from_value(body).unwrap();
            match request.to_email() {
                Err(MailerError::Validation(msg)) => msg,
                other => panic!("expected validation error, got {:?}", other),
            }
        };

        assert!(missing(json!({})).contains("email_type"));
        assert!(missing(json!({"email_type": "welcome"})).contains("company"));
        assert!(missing(json!({"email_type": "welcome", "company": company_json()}))
            .contains("recipients"));
        assert!(missing(json!({
            "email_type": "welcome",
            "company": company_json(),
            "recipients": [{"email": "ana@example.com"}]
        }))
        .contains("dashboard_url"));
        assert!(missing(json!({
            "email_type": "alert",
            "company": company_json(),
            "recipients": [{"email": "ana@example.com"}]
        }))
        .contains("alert"));
        assert!(missing(json!({
            "email_type": "newsletter",
            "company": company_json(),
            "recipients": [{"email": "ana@example.com"}]
        }))
        .contains("Invalid email type"));
    }

    #[test]
    fn test_batch_request_notification_from_query() {
        let request: BatchRequest = serde_json::from_value(json!({
            "email_type": "notification",
            "company": company_json(),
            "recipients": [{"email": "ana@example.com"}],
            "query": {
                "title": "Maintenance",
                "message": "Tonight at 22:00",
                "type": "warning",
                "preferences_url": "https://acme.test/prefs"
            }
        }))
        .unwrap();

        let email = request.to_email().unwrap();
        assert_eq!(email.default_subject(), "Maintenance");
        match email.content {
            EmailContent::Notification {
                notification,
                preferences_url,
            } => {
                assert_eq!(notification.level, crate::email::NotificationLevel::Warning);
                assert_eq!(preferences_url.as_deref(), Some("https://acme.test/prefs"));
            }
            other => panic!("unexpected content {:?}", other),
        }
    }

    #[test]
    fn test_batch_request_password_reset_default_expiry() {
        let request: BatchRequest = serde_json::from_value(json!({
            "email_type": "password-reset",
            "company": company_json(),
            "recipients": [{"email": "ana@example.com"}],
            "query": {"reset_url": "https://acme.test/reset"}
        }))
        .unwrap();

        match request.to_email().unwrap().content {
            EmailContent::PasswordReset { expires_in, .. } => {
                assert_eq!(expires_in, DEFAULT_RESET_EXPIRY_HOURS)
            }
            other => panic!("unexpected content {:?}", other),
        }
    }

    #[test]
    fn test_batch_request_password_reset_rejects_non_integer_expiry() {
        for expires_in in [json!("2"), json!(2.5), json!(null)] {
            let request: BatchRequest = serde_json::from_value(json!({
                "email_type": "password-reset",
                "company": company_json(),
                "recipients": [{"email": "ana@example.com"}],
                "query": {"reset_url": "https://acme.test/reset", "expires_in": expires_in}
            }))
            .unwrap();

            match request.to_email() {
                Err(MailerError::Validation(msg)) => assert!(msg.contains("expires_in")),
                other => panic!("expected validation error, got {:?}", other),
            }
        }

        let request: BatchRequest = serde_json::from_value(json!({
            "email_type": "password-reset",
            "company": company_json(),
            "recipients": [{"email": "ana@example.com"}],
            "query": {"reset_url": "https://acme.test/reset", "expires_in": 2}
        }))
        .unwrap();
        match request.to_email().unwrap().content {
            EmailContent::PasswordReset { expires_in, .. } => assert_eq!(expires_in, 2),
            other => panic!("unexpected content {:?}", other),
        }
    }

    #[test]
    fn test_batch_request_order_confirmation() {
        let request: BatchRequest = serde_json::from_value(json!({
            "email_type": "order-confirmation",
            "company": company_json(),
            "recipients": [{"email": "ana@example.com", "name": "Ana"}],
            "order": {
                "number": "A-1001",
                "items": [{"name": "Mug", "quantity": 2, "price": 7.5}],
                "shipping_address": "1 Road, Springfield"
            }
        }))
        .unwrap();

        let email = request.to_email().unwrap();
        assert_eq!(email.kind(), EmailKind::OrderConfirmation);
        assert_eq!(email.default_subject(), "Order confirmation #A-1001");
        match email.content {
            EmailContent::OrderConfirmation { order } => assert_eq!(order.total(), 15.0),
            other => panic!("unexpected content {:?}", other),
        }
    }

    #[test]
    fn test_batch_request_order_confirmation_requires_order() {
        let request: BatchRequest = serde_json::from_value(json!({
            "email_type": "order-confirmation",
            "company": company_json(),
            "recipients": [{"email": "ana@example.com"}]
        }))
        .unwrap();

        match request.to_email() {
            Err(MailerError::Validation(msg)) => assert_eq!(msg, "order is required"),
            other => panic!("expected validation error, got {:?}", other),
        }
    }
}
