//! Flattened view data handed to the HTML templates
//!
//! Templates only see plain strings, numbers and lists; optional values are
//! mapped to empty strings so the markup can test them with `is_empty()`.

use crate::email::{AlertLevel, Company, NotificationLevel, OrderItem};

/// Company block shared by every template header and footer
#[derive(Debug, Clone)]
pub struct CompanyView {
    pub name: String,
    pub address: String,
    pub website: String,
    pub support_email: String,
    pub logo_url: String,
    pub social_links: Vec<SocialLink>,
}

#[derive(Debug, Clone)]
pub struct SocialLink {
    /// Network name with its first letter capitalized
    pub name: String,
    pub url: String,
}

impl From<&Company> for CompanyView {
    fn from(company: &Company) -> Self {
        let social_links = company
            .social_media
            .iter()
            .filter(|(_, url)| !url.trim().is_empty())
            .map(|(name, url)| SocialLink {
                name: capitalize(name),
                url: url.clone(),
            })
            .collect();

        Self {
            name: company.name.clone(),
            address: company.address.clone(),
            website: company.website.clone(),
            support_email: company.support_email.clone(),
            logo_url: company.logo_url().unwrap_or_default().to_string(),
            social_links,
        }
    }
}

/// One line of the order table, amounts already formatted
#[derive(Debug, Clone)]
pub struct ProductRow {
    pub name: String,
    pub sku: String,
    pub quantity: u32,
    pub price: String,
    pub total: String,
}

impl From<&OrderItem> for ProductRow {
    fn from(item: &OrderItem) -> Self {
        Self {
            name: item.name.clone(),
            sku: item
                .sku
                .clone()
                .filter(|sku| !sku.trim().is_empty())
                .unwrap_or_else(|| "N/A".to_string()),
            quantity: item.quantity,
            price: format_amount(item.price),
            total: format_amount(item.total()),
        }
    }
}

/// Two decimal places, no currency symbol
pub fn format_amount(amount: f64) -> String {
    format!("{:.2}", amount)
}

/// Accent color for a notification level
pub fn notification_accent(level: NotificationLevel) -> &'static str {
    match level {
        NotificationLevel::Success => "#2e7d32",
        NotificationLevel::Warning => "#ed6c02",
        NotificationLevel::Error => "#d32f2f",
        NotificationLevel::Info => "#0288d1",
    }
}

/// Accent color for an alert level
pub fn alert_accent(level: AlertLevel) -> &'static str {
    match level {
        AlertLevel::Info => "#0288d1",
        AlertLevel::Warning => "#ed6c02",
        AlertLevel::Error => "#d32f2f",
    }
}

fn capitalize(value: &str) -> String {
    let mut chars = value.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
