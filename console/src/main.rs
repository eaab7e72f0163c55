//! `checkin` binary: parse the command line, run one command, print its
//! output.

use anyhow::Context;
use checkin_api::ApiClient;
use checkin_auth::{FileSessionStore, SessionGate};
use checkin_console::{Cli, Config, Console, ConsoleError, SessionService};
use checkin_core::environment::{Clock, SystemClock};
use clap::Parser;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = Config::from_env();

    // Logs go to stderr so command output stays pipeable
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| config.log_filter.clone().into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    tracing::debug!(api_url = %config.api.url, session_file = %config.session.file.display(), "Configuration loaded");

    let gate_config = config
        .session
        .gate_config()
        .ok_or(ConsoleError::MissingSecret)?;
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let gate = SessionGate::new(gate_config, Arc::clone(&clock)).context("invalid session key")?;
    let session = SessionService::new(
        gate,
        Arc::new(FileSessionStore::new(config.session.file.clone())),
        ApiClient::new(config.api.url.clone()),
    );

    let output = Console::new(session, clock).run(cli).await?;
    if !output.is_empty() {
        println!("{}", output.trim_end());
    }
    Ok(())
}
