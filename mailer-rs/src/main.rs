use mailer_rs::api::ApiServer;
use mailer_rs::config::Config;
use mailer_rs::provider::build_provider;
use mailer_rs::service::EmailService;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config_path = std::env::args().nth(1).map(PathBuf::from);
    let config = Config::load(config_path.as_deref())?;

    mailer_rs::logging::init(&config.logging)?;

    info!("Starting mailer-rs v{}", env!("CARGO_PKG_VERSION"));
    match &config_path {
        Some(path) => info!("Configuration loaded from {}", path.display()),
        None => info!("No config file specified, using defaults and environment"),
    }

    if let Err(e) = config.validate() {
        error!("Invalid configuration: {}", e);
        return Err(e.into());
    }

    let provider = build_provider(&config.provider)?;
    info!("Email provider: {}", provider.name());

    let service = Arc::new(EmailService::new(provider, config.default_from()));
    let server = ApiServer::new(&config, service);

    if let Err(e) = server.run().await {
        error!("API server error: {}", e);
        return Err(e.into());
    }

    Ok(())
}
