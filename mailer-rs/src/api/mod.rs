//! REST API module for mailer-rs
//!
//! Exposes one endpoint per email kind plus batch and preview, all guarded by
//! the `X-API-Key` header.

pub mod handlers;
pub mod server;
pub mod types;

pub use server::{ApiServer, API_KEY_HEADER};
