//! Utility modules
//!
//! - [`email`]: Email address validation and recipient list parsing

pub mod email;

pub use email::{parse_recipients, sanitize_email, validate_email, validate_emails};
