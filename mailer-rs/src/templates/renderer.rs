//! Renders an [`Email`] into its HTML body

use crate::email::{Email, EmailContent};
use crate::error::Result;
use crate::templates::types::{
    alert_accent, format_amount, notification_accent, CompanyView, ProductRow,
};
use askama::Template;
use chrono::{Datelike, Local};

const DEFAULT_ACTION_TEXT: &str = "View details";

#[derive(Template)]
#[template(path = "welcome.html")]
struct WelcomeTemplate<'a> {
    company: CompanyView,
    year: i32,
    user_name: &'a str,
    user_email: &'a str,
    dashboard_url: &'a str,
}

#[derive(Template)]
#[template(path = "password_reset.html")]
struct PasswordResetTemplate<'a> {
    company: CompanyView,
    year: i32,
    user_name: &'a str,
    reset_url: &'a str,
    expires_in: i64,
}

#[derive(Template)]
#[template(path = "notification.html")]
struct NotificationTemplate<'a> {
    company: CompanyView,
    year: i32,
    user_name: &'a str,
    title: &'a str,
    message: &'a str,
    accent: &'static str,
    icon: &'a str,
    action_url: &'a str,
    action_text: &'a str,
    additional_info: &'a str,
    preferences_url: &'a str,
}

#[derive(Template)]
#[template(path = "alert.html")]
struct AlertTemplate<'a> {
    company: CompanyView,
    year: i32,
    user_name: &'a str,
    title: &'a str,
    message: &'a str,
    level: &'static str,
    accent: &'static str,
    steps: &'a [String],
    action_url: &'a str,
    action_text: &'a str,
    contact_support: bool,
}

#[derive(Template)]
#[template(path = "order_confirmation.html")]
struct OrderConfirmationTemplate<'a> {
    company: CompanyView,
    year: i32,
    customer_name: &'a str,
    order_number: &'a str,
    created_at: String,
    products: Vec<ProductRow>,
    items_count: u32,
    total: String,
    shipping_address: &'a str,
    delivery_estimate: &'a str,
}

/// Renders the compiled-in HTML templates
pub struct TemplateRenderer;

impl TemplateRenderer {
    /// Render the HTML body of `email` for its primary recipient.
    ///
    /// Values are HTML-escaped by the template engine.
    pub fn render(email: &Email) -> Result<String> {
        let company = CompanyView::from(&email.company);
        let now = Local::now();
        let year = now.year();
        let name = email.recipient_name();

        let html = match &email.content {
            EmailContent::Welcome { dashboard_url } => WelcomeTemplate {
                company,
                year,
                user_name: name,
                user_email: &email.recipient.email,
                dashboard_url,
            }
            .render()?,

            EmailContent::PasswordReset {
                reset_url,
                expires_in,
            } => PasswordResetTemplate {
                company,
                year,
                user_name: name,
                reset_url,
                expires_in: *expires_in,
            }
            .render()?,

            EmailContent::Notification {
                notification,
                preferences_url,
            } => NotificationTemplate {
                company,
                year,
                user_name: name,
                title: &notification.title,
                message: &notification.message,
                accent: notification_accent(notification.level),
                icon: notification.icon.as_deref().unwrap_or_default(),
                action_url: notification.action_url.as_deref().unwrap_or_default(),
                action_text: notification
                    .action_text
                    .as_deref()
                    .unwrap_or(DEFAULT_ACTION_TEXT),
                additional_info: notification.additional_info.as_deref().unwrap_or_default(),
                preferences_url: preferences_url.as_deref().unwrap_or_default(),
            }
            .render()?,

            EmailContent::Alert { alert } => AlertTemplate {
                company,
                year,
                user_name: name,
                title: &alert.title,
                message: &alert.message,
                level: alert.level.as_str(),
                accent: alert_accent(alert.level),
                steps: alert.steps.as_deref().unwrap_or_default(),
                action_url: alert.action_url.as_deref().unwrap_or_default(),
                action_text: alert.action_text.as_deref().unwrap_or(DEFAULT_ACTION_TEXT),
                contact_support: alert.contact_support,
            }
            .render()?,

            EmailContent::OrderConfirmation { order } => OrderConfirmationTemplate {
                company,
                year,
                customer_name: name,
                order_number: &order.number,
                created_at: now.format("%d/%m/%Y %H:%M").to_string(),
                products: order.items.iter().map(ProductRow::from).collect(),
                items_count: order.items_count(),
                total: format_amount(order.total()),
                shipping_address: &order.shipping_address,
                delivery_estimate: &order.delivery_estimate,
            }
            .render()?,
        };

        Ok(html)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::email::{
        Alert, AlertLevel, Company, EmailAddress, Notification, NotificationLevel, Order,
        OrderItem,
    };
    use std::collections::BTreeMap;

    fn company() -> Company {
        Company {
            name: "Acme".to_string(),
            address: "1 Road, Springfield".to_string(),
            support_email: "help@acme.test".to_string(),
            website: "https://acme.test".to_string(),
            social_media: BTreeMap::from([(
                "twitter".to_string(),
                "https://twitter.com/acme".to_string(),
            )]),
            logo_url: None,
        }
    }

    fn render(recipient: EmailAddress, content: EmailContent) -> String {
        TemplateRenderer::render(&Email::new(company(), recipient, content)).unwrap()
    }

    #[test]
    fn test_render_welcome() {
        let html = render(
            EmailAddress::with_name("ana@example.com", "Ana"),
            EmailContent::Welcome {
                dashboard_url: "https://acme.test/dashboard".to_string(),
            },
        );

        assert!(html.contains("Welcome, Ana!"));
        assert!(html.contains("ana@example.com"));
        assert!(html.contains("help@acme.test"));
        assert!(html.contains("Twitter"));
        assert!(html.contains(&Local::now().year().to_string()));
    }

    #[test]
    fn test_render_default_name() {
        let html = render(
            EmailAddress::new("ana@example.com"),
            EmailContent::Welcome {
                dashboard_url: "https://acme.test/dashboard".to_string(),
            },
        );
        assert!(html.contains("Welcome, User!"));
    }

    #[test]
    fn test_render_escapes_values() {
        let html = render(
            EmailAddress::with_name("ana@example.com", "<script>alert(1)</script>"),
            EmailContent::Welcome {
                dashboard_url: "https://acme.test/dashboard".to_string(),
            },
        );

        assert!(!html.contains("<script>"));
        assert!(html.contains("&lt;script&gt;"));
    }

    #[test]
    fn test_render_password_reset() {
        let html = render(
            EmailAddress::with_name("ana@example.com", "Ana"),
            EmailContent::PasswordReset {
                reset_url: "https://acme.test/reset?token=abc123".to_string(),
                expires_in: 12,
            },
        );

        assert!(html.contains("token=abc123"));
        assert!(html.contains("expires in 12 hours"));
    }

    #[test]
    fn test_render_notification() {
        let html = render(
            EmailAddress::new("ana@example.com"),
            EmailContent::Notification {
                notification: Notification {
                    title: "Backup finished".to_string(),
                    message: "All files were saved".to_string(),
                    level: NotificationLevel::Success,
                    icon: None,
                    action_url: Some("https://acme.test/backups".to_string()),
                    action_text: None,
                    additional_info: Some("Took 3 minutes".to_string()),
                },
                preferences_url: None,
            },
        );

        assert!(html.contains("Backup finished"));
        assert!(html.contains("#2e7d32"));
        assert!(html.contains(DEFAULT_ACTION_TEXT));
        assert!(html.contains("Took 3 minutes"));
        assert!(!html.contains("Manage notification preferences"));
    }

    #[test]
    fn test_render_alert_steps() {
        let html = render(
            EmailAddress::new("ana@example.com"),
            EmailContent::Alert {
                alert: Alert {
                    title: "Disk almost full".to_string(),
                    message: "Usage is at 95%".to_string(),
                    level: AlertLevel::Warning,
                    steps: Some(vec![
                        "Remove old logs".to_string(),
                        "Resize the volume".to_string(),
                    ]),
                    action_url: None,
                    action_text: None,
                    contact_support: false,
                },
            },
        );

        assert!(html.contains("<li style=\"margin:0 0 4px 0;\">Remove old logs</li>"));
        assert!(html.contains("Resize the volume"));
        assert!(html.contains("warning"));
        assert!(!html.contains("Need help?"));
    }

    #[test]
    fn test_render_order_confirmation() {
        let html = render(
            EmailAddress::new("ana@example.com"),
            EmailContent::OrderConfirmation {
                order: Order {
                    number: "A-1001".to_string(),
                    items: vec![
                        OrderItem {
                            name: "Mug".to_string(),
                            quantity: 2,
                            price: 7.5,
                            sku: Some("MUG-1".to_string()),
                        },
                        OrderItem {
                            name: "Poster".to_string(),
                            quantity: 1,
                            price: 12.0,
                            sku: None,
                        },
                    ],
                    shipping_address: "1 Road, Springfield".to_string(),
                    delivery_estimate: "3-5 days".to_string(),
                },
            },
        );

        assert!(html.contains("Thank you for your order, Customer!"));
        assert!(html.contains("#A-1001"));
        assert!(html.contains("15.00"));
        assert!(html.contains("27.00"));
        assert!(html.contains("N/A"));
        assert!(html.contains("3 item(s)"));
        assert!(html.contains("3-5 days"));

        let now = Local::now();
        let placed_on = html
            .split("was placed on ")
            .nth(1)
            .and_then(|rest| rest.split('.').next())
            .unwrap();
        assert!(placed_on.contains(&now.year().to_string()));
        assert!(html.contains(&format!("&copy; {}", now.year())));
    }
}
