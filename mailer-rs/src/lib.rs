//! mailer-rs: Transactional email API
//!
//! Accepts JSON requests describing a company, one or more recipients and
//! kind-specific data, renders the matching HTML template and hands the
//! message to a delivery provider.
//!
//! # Example
//!
//! ```no_run
//! use mailer_rs::config::Config;
//! use mailer_rs::provider::build_provider;
//! use mailer_rs::service::EmailService;
//! use mailer_rs::api::ApiServer;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::load(None)?;
//!     let provider = build_provider(&config.provider)?;
//!     let service = Arc::new(EmailService::new(provider, config.default_from()));
//!
//!     ApiServer::new(&config, service).run().await?;
//!     Ok(())
//! }
//! ```
//!
//! # Modules
//!
//! - [`config`]: Configuration management
//! - [`error`]: Error types and handling
//! - [`email`]: Email kinds, payloads and validation
//! - [`templates`]: HTML rendering
//! - [`provider`]: Delivery backends
//! - [`service`]: Send, batch and preview operations
//! - [`api`]: HTTP API
//! - [`client`]: HTTP client for the API
//! - [`utils`]: Address validation and recipient list parsing

pub mod api;
pub mod client;
pub mod config;
pub mod email;
pub mod error;
pub mod logging;
pub mod provider;
pub mod service;
pub mod templates;
pub mod utils;

// Re-export commonly used types
pub use config::Config;
pub use error::{MailerError, Result};
