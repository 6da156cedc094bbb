//! Email domain model
//!
//! Addresses, company details, the per-kind payloads and the validation each
//! kind requires before it may be rendered.

pub mod content;
pub mod types;

pub use content::{
    Email, EmailContent, EmailKind, DEFAULT_CUSTOMER_NAME, DEFAULT_RESET_EXPIRY_HOURS,
    DEFAULT_USER_NAME,
};
pub use types::{
    Alert, AlertLevel, Company, EmailAddress, Notification, NotificationLevel, Order, OrderItem,
};
