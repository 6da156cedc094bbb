use crate::error::{MailerError, Result};
use regex::Regex;
use std::sync::OnceLock;
use tracing::warn;

const EMAIL_PATTERN: &str = r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$";

/// Separators accepted between address and display name in recipient lists
const NAME_SEPARATORS: [char; 2] = [',', ';'];

fn email_regex() -> &'static Regex {
    static EMAIL_REGEX: OnceLock<Regex> = OnceLock::new();
    EMAIL_REGEX.get_or_init(|| Regex::new(EMAIL_PATTERN).expect("email pattern is valid"))
}

/// Basic email validation
pub fn validate_email(email: &str) -> Result<()> {
    if email.is_empty() {
        return Err(MailerError::InvalidEmail("Email is empty".to_string()));
    }

    if !email_regex().is_match(email) {
        return Err(MailerError::InvalidEmail(email.to_string()));
    }

    Ok(())
}

/// Split a list of addresses into (valid, invalid)
pub fn validate_emails(emails: &[String]) -> (Vec<String>, Vec<String>) {
    let mut valid = Vec::new();
    let mut invalid = Vec::new();

    for email in emails {
        if validate_email(email).is_ok() {
            valid.push(email.clone());
        } else {
            warn!("Invalid email: {}", email);
            invalid.push(email.clone());
        }
    }

    (valid, invalid)
}

/// Trim whitespace and lowercase an address
pub fn sanitize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Parse a recipient list with one `email[, name]` or `email[; name]` per line.
///
/// Blank lines and lines whose address fails validation are dropped.
pub fn parse_recipients(text: &str) -> Vec<(String, String)> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .filter_map(|line| {
            let (email, name) = match line.find(NAME_SEPARATORS) {
                Some(idx) => (line[..idx].trim(), line[idx + 1..].trim()),
                None => (line, ""),
            };

            validate_email(email)
                .ok()
                .map(|_| (email.to_string(), name.to_string()))
        })
        .collect()
}
