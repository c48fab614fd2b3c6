mod cli;

use std::io::IsTerminal;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{debug, error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use spacegate_core::{
    load_config, validate_config, ExitStatus, Gatekeeper, Outcome, QBittorrentClient,
    SanitizedConfig, StatvfsProbe,
};

use cli::{Args, LogFormat};

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let args = Args::parse();
    init_logging(args.log_format);

    match run(args).await {
        Ok(status) => status.into(),
        Err(e) => {
            error!("Fatal error: {:#}", e);
            ExitStatus::OperationalError.into()
        }
    }
}

/// Logs go to stderr; stdout is left to the calling tool.
fn init_logging(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into());

    let (text, json) = match format {
        LogFormat::Text => (
            Some(
                tracing_subscriber::fmt::layer()
                    .with_ansi(std::io::stderr().is_terminal())
                    .with_writer(std::io::stderr),
            ),
            None,
        ),
        LogFormat::Json => (
            None,
            Some(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr),
            ),
        ),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(text)
        .with(json)
        .init();
}

async fn run(args: Args) -> Result<ExitStatus> {
    let overrides = args.overrides();

    let config = load_config(args.config.as_deref(), &overrides)
        .context("Failed to load configuration")?;
    validate_config(&config).context("Configuration validation failed")?;
    debug!(config = ?SanitizedConfig::from(&config), "Configuration loaded");

    let mut gatekeeper = Gatekeeper::new(&config, StatvfsProbe::new());
    match config.qbittorrent() {
        Some(qbit) => {
            info!("Using qBittorrent at {}", qbit.url);
            let client = QBittorrentClient::new(qbit.clone())
                .context("Failed to create qBittorrent client")?;
            gatekeeper = gatekeeper.with_client(Arc::new(client));
        }
        None => info!("No torrent client configured"),
    }

    let result = gatekeeper.run().await;
    let status = ExitStatus::from_result(&result);

    match &result {
        Ok(Outcome::Sufficient { .. }) => info!("SUCCESS: sufficient disk space available"),
        Ok(Outcome::Reclaimed { removed, .. }) => {
            info!(
                "SUCCESS: sufficient disk space freed by removing {} torrent(s)",
                removed.len()
            )
        }
        Ok(Outcome::Insufficient { reading, removed }) => error!(
            "FAILURE: insufficient disk space ({} available, {} required, {} torrent(s) removed)",
            reading.available(),
            config.disk.required,
            removed.len()
        ),
        Err(e) => error!("ERROR: {}", e),
    }

    info!("Exiting with code {}", status.code());
    Ok(status)
}
