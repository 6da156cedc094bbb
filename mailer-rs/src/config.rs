//! Configuration for mailer-rs
//!
//! Values are layered: built-in defaults, then an optional TOML file, then
//! `MAILER_`-prefixed environment variables (`MAILER_PROVIDER__API_KEY`), then
//! the flat legacy variables (`RESEND_API_KEY`, `API_KEY`, `TESTING`, ...).

use crate::email::EmailAddress;
use crate::error::{MailerError, Result};
use crate::utils::validate_email;
use config::{Environment, File, FileFormat};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::Path;

/// Config file read from the working directory when no path is given
pub const DEFAULT_CONFIG_FILE: &str = "config.toml";

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub security: SecurityConfig,
    pub provider: ProviderConfig,
    pub sender: SenderConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerConfig {
    pub listen_addr: String,
}

/// API access control
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct SecurityConfig {
    /// Value expected in the `X-API-Key` header. Empty rejects every request.
    pub api_key: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderKind {
    /// Resend transactional email API
    Resend,
    /// Render and log only, nothing leaves the process
    DryRun,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ProviderConfig {
    pub kind: ProviderKind,
    pub api_key: String,
    pub base_url: String,
    pub timeout_seconds: u64,
}

/// Default sender used when a request does not name one
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SenderConfig {
    pub from_email: String,
    pub from_name: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Pretty,
    Json,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: "0.0.0.0:8000".to_string(),
        }
    }
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            kind: ProviderKind::Resend,
            api_key: String::new(),
            base_url: "https://api.resend.com".to_string(),
            timeout_seconds: 30,
        }
    }
}

impl Default for SenderConfig {
    fn default() -> Self {
        Self {
            from_email: "no-reply@example.com".to_string(),
            from_name: "Email System".to_string(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Pretty,
        }
    }
}

impl Config {
    /// Load configuration from defaults, an optional file and the environment
    pub fn load(path: Option<&Path>) -> Result<Self> {
        Self::load_with_env(path, None, |key| std::env::var(key).ok())
    }

    /// Same as [`Config::load`], reading `MAILER_*` from `env` instead of the
    /// process when given, and the legacy variables through `lookup`
    fn load_with_env<F>(
        path: Option<&Path>,
        env: Option<config::Map<String, String>>,
        lookup: F,
    ) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let file = match path {
            Some(path) => File::from(path).required(true),
            None => File::new(DEFAULT_CONFIG_FILE, FileFormat::Toml).required(false),
        };

        let mut config: Config = config::Config::builder()
            .add_source(file)
            .add_source(
                Environment::with_prefix("MAILER")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true)
                    .source(env),
            )
            .build()?
            .try_deserialize()?;

        config.apply_legacy_env(lookup);
        Ok(config)
    }

    /// Apply the flat variable names older deployments use
    pub fn apply_legacy_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(key) = lookup("API_KEY") {
            self.security.api_key = key;
        }
        if let Some(key) = lookup("RESEND_API_KEY") {
            self.provider.api_key = key;
        }
        if let Some(email) = lookup("DEFAULT_FROM_EMAIL") {
            self.sender.from_email = email;
        }
        if let Some(name) = lookup("DEFAULT_FROM_NAME") {
            self.sender.from_name = name;
        }
        if lookup("TESTING").is_some_and(|v| parse_bool(&v)) {
            self.provider.kind = ProviderKind::DryRun;
        }
        if lookup("DEBUG").is_some_and(|v| parse_bool(&v)) {
            self.logging.level = "debug".to_string();
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        self.server.listen_addr.parse::<SocketAddr>().map_err(|e| {
            MailerError::Config(format!(
                "Invalid listen address '{}': {}",
                self.server.listen_addr, e
            ))
        })?;

        if self.provider.kind == ProviderKind::Resend && self.provider.api_key.is_empty() {
            return Err(MailerError::Config(
                "Provider API key is not configured".to_string(),
            ));
        }

        validate_email(&self.sender.from_email).map_err(|_| {
            MailerError::Config(format!(
                "Invalid default sender address: {}",
                self.sender.from_email
            ))
        })?;

        Ok(())
    }

    /// Default sender address
    pub fn default_from(&self) -> EmailAddress {
        EmailAddress::with_name(&self.sender.from_email, &self.sender.from_name)
    }
}

fn parse_bool(value: &str) -> bool {
    matches!(
        value.trim().to_lowercase().as_str(),
        "true" | "1" | "t" | "yes" | "y"
    )
}
