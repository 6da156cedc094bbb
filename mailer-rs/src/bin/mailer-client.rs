//! Command-line client for the email API
//!
//! # Usage
//!
//! ```bash
//! # Check the server
//! mailer-client health
//!
//! # Welcome email to two users
//! mailer-client --company acme.toml welcome \
//!     --to "ana@example.com, Ana" --to bob@example.com \
//!     --dashboard-url https://acme.test/dashboard
//!
//! # Personalized batch from a recipient list (one "email, name" per line)
//! mailer-client --company acme.toml batch --email-type welcome \
//!     --recipients-file users.txt --query dashboard_url=https://acme.test/dashboard
//!
//! # Render without sending
//! mailer-client --company acme.toml preview --email-type alert \
//!     --to ana@example.com --alert-file alert.json --output preview.html
//! ```

use anyhow::{bail, Context};
use clap::{Args, Parser, Subcommand};
use mailer_rs::api::types::{
    AlertRequest, BatchRequest, NotificationQuery, NotificationRequest, OrderConfirmationRequest,
    PasswordResetQuery, PasswordResetRequest, UserInput, WelcomeQuery, WelcomeRequest,
};
use mailer_rs::client::{EmailApiClient, DEFAULT_API_URL};
use mailer_rs::email::{
    Alert, AlertLevel, Company, EmailKind, Notification, NotificationLevel, Order,
    DEFAULT_RESET_EXPIRY_HOURS,
};
use mailer_rs::service::BatchRecipient;
use mailer_rs::utils::parse_recipients;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "mailer-client")]
#[command(about = "Send and preview emails through the mailer-rs API", long_about = None)]
struct Cli {
    /// API base URL
    #[arg(long, global = true, env = "EMAIL_SYSTEM_API_URL", default_value = DEFAULT_API_URL)]
    api_url: String,

    /// Value sent in the X-API-Key header
    #[arg(long, global = true, env = "EMAIL_SYSTEM_API_KEY")]
    api_key: Option<String>,

    /// TOML file with the company details
    #[arg(long, global = true)]
    company: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct Recipients {
    /// Recipient as "email" or "email, name" (repeatable)
    #[arg(long = "to")]
    to: Vec<String>,

    /// File with one "email, name" or "email; name" per line
    #[arg(long)]
    recipients_file: Option<PathBuf>,
}

#[derive(Args)]
struct MessageArgs {
    #[arg(long)]
    title: String,
    #[arg(long)]
    message: String,
    #[arg(long)]
    action_url: Option<String>,
    #[arg(long)]
    action_text: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Check that the API is up
    Health,
    /// Send a welcome email
    Welcome {
        #[command(flatten)]
        recipients: Recipients,
        #[arg(long)]
        dashboard_url: String,
    },
    /// Send a password reset email
    PasswordReset {
        #[command(flatten)]
        recipients: Recipients,
        #[arg(long)]
        reset_url: String,
        /// Link lifetime in hours
        #[arg(long, default_value_t = DEFAULT_RESET_EXPIRY_HOURS)]
        expires_in: i64,
    },
    /// Send a notification
    Notification {
        #[command(flatten)]
        recipients: Recipients,
        #[command(flatten)]
        message: MessageArgs,
        /// success, warning, error or info
        #[arg(long = "type", default_value = "info")]
        level: String,
        #[arg(long)]
        icon: Option<String>,
        #[arg(long)]
        additional_info: Option<String>,
        #[arg(long)]
        preferences_url: Option<String>,
    },
    /// Send an alert
    Alert {
        #[command(flatten)]
        recipients: Recipients,
        #[command(flatten)]
        message: MessageArgs,
        /// info, warning or error
        #[arg(long = "type", default_value = "info")]
        level: String,
        /// Remediation step (repeatable)
        #[arg(long = "step")]
        steps: Vec<String>,
        /// Leave out the "contact support" line
        #[arg(long)]
        no_contact_support: bool,
    },
    /// Send an order confirmation
    OrderConfirmation {
        #[command(flatten)]
        recipients: Recipients,
        /// JSON file with the order
        #[arg(long)]
        order_file: PathBuf,
    },
    /// Send a personalized email to every recipient
    Batch(BatchArgs),
    /// Render an email for the first recipient without sending it
    Preview {
        #[command(flatten)]
        batch: BatchArgs,
        /// Write the HTML to this file instead of stdout
        #[arg(long)]
        output: Option<PathBuf>,
    },
}

#[derive(Args)]
struct BatchArgs {
    /// welcome, password-reset, notification, alert or order-confirmation
    #[arg(long)]
    email_type: String,
    #[command(flatten)]
    recipients: Recipients,
    /// Query value as KEY=VALUE (repeatable)
    #[arg(long = "query")]
    query: Vec<String>,
    /// JSON file with the alert
    #[arg(long)]
    alert_file: Option<PathBuf>,
    /// JSON file with the order
    #[arg(long)]
    order_file: Option<PathBuf>,
    #[arg(long)]
    subject: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let client = EmailApiClient::new(&cli.api_url, cli.api_key.clone());

    match cli.command {
        Commands::Health => {
            let health = client.health().await?;
            print_json(&health)?;
        }
        Commands::Welcome {
            recipients,
            dashboard_url,
        } => {
            let request = WelcomeRequest {
                company: load_company(cli.company.as_deref())?,
                user: user_input(&recipients)?,
                query: WelcomeQuery { dashboard_url },
            };
            print_json(&client.send(EmailKind::Welcome, &request).await?)?;
        }
        Commands::PasswordReset {
            recipients,
            reset_url,
            expires_in,
        } => {
            let request = PasswordResetRequest {
                company: load_company(cli.company.as_deref())?,
                user: user_input(&recipients)?,
                query: PasswordResetQuery {
                    reset_url,
                    expires_in,
                },
            };
            print_json(&client.send(EmailKind::PasswordReset, &request).await?)?;
        }
        Commands::Notification {
            recipients,
            message,
            level,
            icon,
            additional_info,
            preferences_url,
        } => {
            let request = NotificationRequest {
                company: load_company(cli.company.as_deref())?,
                user: user_input(&recipients)?,
                notification: Notification {
                    title: message.title,
                    message: message.message,
                    level: parse_level::<NotificationLevel>(&level)?,
                    icon,
                    action_url: message.action_url,
                    action_text: message.action_text,
                    additional_info,
                },
                query: Some(NotificationQuery { preferences_url }),
            };
            print_json(&client.send(EmailKind::Notification, &request).await?)?;
        }
        Commands::Alert {
            recipients,
            message,
            level,
            steps,
            no_contact_support,
        } => {
            let request = AlertRequest {
                company: load_company(cli.company.as_deref())?,
                user: user_input(&recipients)?,
                alert: Alert {
                    title: message.title,
                    message: message.message,
                    level: parse_level::<AlertLevel>(&level)?,
                    steps: (!steps.is_empty()).then_some(steps),
                    action_url: message.action_url,
                    action_text: message.action_text,
                    contact_support: !no_contact_support,
                },
            };
            print_json(&client.send(EmailKind::Alert, &request).await?)?;
        }
        Commands::OrderConfirmation {
            recipients,
            order_file,
        } => {
            let request = OrderConfirmationRequest {
                company: load_company(cli.company.as_deref())?,
                user: user_input(&recipients)?,
                order: load_json::<Order>(&order_file)?,
            };
            print_json(&client.send(EmailKind::OrderConfirmation, &request).await?)?;
        }
        Commands::Batch(args) => {
            let request = batch_request(&args, cli.company.as_deref())?;
            let report = client.send_batch(&request).await?;
            print_json(&report)?;
            if report.failed > 0 {
                eprintln!("{} of {} emails failed", report.failed, report.total);
                std::process::exit(1);
            }
        }
        Commands::Preview { batch, output } => {
            let request = batch_request(&batch, cli.company.as_deref())?;
            let rendered = client.preview(&request).await?;
            match output {
                Some(path) => {
                    std::fs::write(&path, &rendered.html)
                        .with_context(|| format!("Failed to write {}", path.display()))?;
                    println!("Subject: {}", rendered.subject);
                    println!("✓ Preview written to {}", path.display());
                }
                None => {
                    println!("Subject: {}\n", rendered.subject);
                    println!("{}", rendered.html);
                }
            }
        }
    }

    Ok(())
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn load_company(path: Option<&Path>) -> anyhow::Result<Company> {
    let Some(path) = path else {
        bail!("--company <file.toml> is required for this command");
    };
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read company file {}", path.display()))?;
    toml::from_str(&content)
        .with_context(|| format!("Failed to parse company file {}", path.display()))
}

fn load_json<T: DeserializeOwned>(path: &Path) -> anyhow::Result<T> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&content).with_context(|| format!("Failed to parse {}", path.display()))
}

fn parse_level<T: DeserializeOwned>(level: &str) -> anyhow::Result<T> {
    serde_json::from_value(Value::String(level.to_lowercase()))
        .with_context(|| format!("Unknown type: {}", level))
}

/// Recipients from `--to` then from `--recipients-file`
fn collect_recipients(recipients: &Recipients) -> anyhow::Result<Vec<(String, String)>> {
    let mut collected = Vec::new();

    for arg in &recipients.to {
        match parse_recipients(arg).into_iter().next() {
            Some(recipient) => collected.push(recipient),
            None => bail!("Invalid recipient: {}", arg),
        }
    }

    if let Some(path) = &recipients.recipients_file {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        collected.extend(parse_recipients(&content));
    }

    if collected.is_empty() {
        bail!("At least one recipient is required (--to or --recipients-file)");
    }
    Ok(collected)
}

fn user_input(recipients: &Recipients) -> anyhow::Result<UserInput> {
    let mut collected = collect_recipients(recipients)?;

    if collected.len() == 1 {
        let (email, name) = collected.remove(0);
        return Ok(UserInput::Single {
            email,
            name: (!name.is_empty()).then_some(name),
        });
    }

    let (emails, names): (Vec<String>, Vec<String>) = collected.into_iter().unzip();
    Ok(UserInput::Multiple {
        emails,
        names: Some(names),
    })
}

fn batch_request(args: &BatchArgs, company: Option<&Path>) -> anyhow::Result<BatchRequest> {
    let recipients = collect_recipients(&args.recipients)?
        .into_iter()
        .map(|(email, name)| BatchRecipient::new(email, (!name.is_empty()).then_some(name)))
        .collect();

    let mut query = Map::new();
    for pair in &args.query {
        let Some((key, value)) = pair.split_once('=') else {
            bail!("Invalid --query value '{}', expected KEY=VALUE", pair);
        };
        let key = key.trim();
        let value = match (key, value.parse::<i64>()) {
            ("expires_in", Ok(hours)) => Value::from(hours),
            _ => Value::String(value.to_string()),
        };
        query.insert(key.to_string(), value);
    }

    Ok(BatchRequest {
        email_type: Some(args.email_type.clone()),
        company: Some(load_company(company)?),
        recipients,
        query: (!query.is_empty()).then_some(query),
        alert: args.alert_file.as_deref().map(load_json).transpose()?,
        order: args.order_file.as_deref().map(load_json).transpose()?,
        subject: args.subject.clone(),
    })
}
