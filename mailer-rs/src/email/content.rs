//! Email kinds and their per-kind payloads

use crate::email::types::{Alert, Company, EmailAddress, Notification, Order};
use crate::error::{MailerError, Result};
use crate::utils::validate_email;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Greeting name for users who did not give one
pub const DEFAULT_USER_NAME: &str = "User";
/// Greeting name for order recipients who did not give one
pub const DEFAULT_CUSTOMER_NAME: &str = "Customer";
/// Password reset link lifetime in hours
pub const DEFAULT_RESET_EXPIRY_HOURS: i64 = 24;

/// The fixed set of emails this service can send
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EmailKind {
    Welcome,
    PasswordReset,
    Notification,
    Alert,
    OrderConfirmation,
}

impl EmailKind {
    pub const ALL: [EmailKind; 5] = [
        EmailKind::Welcome,
        EmailKind::PasswordReset,
        EmailKind::Notification,
        EmailKind::Alert,
        EmailKind::OrderConfirmation,
    ];

    /// URL slug, also accepted as `email_type` in batch requests
    pub fn as_str(&self) -> &'static str {
        match self {
            EmailKind::Welcome => "welcome",
            EmailKind::PasswordReset => "password-reset",
            EmailKind::Notification => "notification",
            EmailKind::Alert => "alert",
            EmailKind::OrderConfirmation => "order-confirmation",
        }
    }
}

impl fmt::Display for EmailKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EmailKind {
    type Err = MailerError;

    fn from_str(s: &str) -> Result<Self> {
        EmailKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| MailerError::Validation(format!("Invalid email type: {}", s)))
    }
}

/// Data specific to each email kind
#[derive(Debug, Clone, PartialEq)]
pub enum EmailContent {
    Welcome {
        dashboard_url: String,
    },
    PasswordReset {
        reset_url: String,
        /// Hours until the link expires
        expires_in: i64,
    },
    Notification {
        notification: Notification,
        preferences_url: Option<String>,
    },
    Alert {
        alert: Alert,
    },
    OrderConfirmation {
        order: Order,
    },
}

/// A fully described email: who it is for, who sends it and what it says
#[derive(Debug, Clone, PartialEq)]
pub struct Email {
    pub company: Company,
    /// Primary recipient; their name is used in the greeting
    pub recipient: EmailAddress,
    pub content: EmailContent,
}

impl Email {
    pub fn new(company: Company, recipient: EmailAddress, content: EmailContent) -> Self {
        Self {
            company,
            recipient,
            content,
        }
    }

    pub fn kind(&self) -> EmailKind {
        match self.content {
            EmailContent::Welcome { .. } => EmailKind::Welcome,
            EmailContent::PasswordReset { .. } => EmailKind::PasswordReset,
            EmailContent::Notification { .. } => EmailKind::Notification,
            EmailContent::Alert { .. } => EmailKind::Alert,
            EmailContent::OrderConfirmation { .. } => EmailKind::OrderConfirmation,
        }
    }

    /// Check that every field the template needs is present and well-formed
    pub fn validate(&self) -> Result<()> {
        validate_email(&self.recipient.email)?;
        validate_email(&self.company.support_email).map_err(|_| {
            MailerError::Validation(format!(
                "Invalid company support email: {}",
                self.company.support_email
            ))
        })?;

        match &self.content {
            EmailContent::Welcome { dashboard_url } => {
                require(dashboard_url, "dashboard_url is required for the welcome email")?;
            }
            EmailContent::PasswordReset {
                reset_url,
                expires_in,
            } => {
                require(reset_url, "reset_url is required for the password reset email")?;
                if *expires_in <= 0 {
                    return Err(MailerError::Validation(
                        "expires_in must be a positive number of hours".to_string(),
                    ));
                }
            }
            EmailContent::Notification { notification, .. } => {
                if notification.title.trim().is_empty() || notification.message.trim().is_empty() {
                    return Err(MailerError::Validation(
                        "title and message are required for the notification email".to_string(),
                    ));
                }
            }
            EmailContent::Alert { alert } => {
                if alert.title.trim().is_empty() || alert.message.trim().is_empty() {
                    return Err(MailerError::Validation(
                        "title and message are required for the alert email".to_string(),
                    ));
                }
            }
            EmailContent::OrderConfirmation { order } => {
                require(&order.number, "order number is required")?;
                if order.items.is_empty() {
                    return Err(MailerError::Validation(
                        "order must contain at least one item".to_string(),
                    ));
                }
                require(&order.shipping_address, "shipping address is required")?;
            }
        }

        Ok(())
    }

    /// Subject used when the caller does not supply one
    pub fn default_subject(&self) -> String {
        match &self.content {
            EmailContent::Welcome { .. } => format!("Welcome to {}!", self.company.name),
            EmailContent::PasswordReset { .. } => "Password reset".to_string(),
            EmailContent::Notification { notification, .. } => notification.title.clone(),
            EmailContent::Alert { alert } if alert.title.trim().is_empty() => "Alert".to_string(),
            EmailContent::Alert { alert } => alert.title.clone(),
            EmailContent::OrderConfirmation { order } => {
                format!("Order confirmation #{}", order.number)
            }
        }
    }

    /// Name shown in the greeting
    pub fn recipient_name(&self) -> &str {
        let fallback = match self.content {
            EmailContent::OrderConfirmation { .. } => DEFAULT_CUSTOMER_NAME,
            _ => DEFAULT_USER_NAME,
        };
        self.recipient.name_or(fallback)
    }

    /// Same email addressed to someone else.
    ///
    /// The greeting follows the new recipient; a recipient without a name gets
    /// the default greeting rather than the previous recipient's name.
    pub fn for_recipient(&self, recipient: EmailAddress) -> Email {
        Email {
            company: self.company.clone(),
            recipient,
            content: self.content.clone(),
        }
    }
}

fn require(value: &str, message: &str) -> Result<()> {
    if value.trim().is_empty() {
        Err(MailerError::Validation(message.to_string()))
    } else {
        Ok(())
    }
}
