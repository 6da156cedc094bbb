use axum::http::StatusCode;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum MailerError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid email address: {0}")]
    InvalidEmail(String),

    #[error("Template error: {0}")]
    Template(#[from] askama::Error),

    #[error("Provider returned {status}: {body}")]
    Provider { status: u16, body: String },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl MailerError {
    /// HTTP status reported to API callers for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            MailerError::Validation(_) | MailerError::InvalidEmail(_) => StatusCode::BAD_REQUEST,
            MailerError::Provider { .. } | MailerError::Http(_) => StatusCode::BAD_GATEWAY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<config::ConfigError> for MailerError {
    fn from(err: config::ConfigError) -> Self {
        MailerError::Config(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, MailerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(
            MailerError::Validation("x".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            MailerError::InvalidEmail("x".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            MailerError::Provider {
                status: 422,
                body: "bad".into()
            }
            .status_code(),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            MailerError::Config("x".into()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_provider_error_message() {
        let err = MailerError::Provider {
            status: 401,
            body: "missing api key".into(),
        };
        assert_eq!(err.to_string(), "Provider returned 401: missing api key");
    }
}
