//! float_sniper - Main Entry Point
//!
//! Watches market pages for new CS2 inspect links and pings Discord when
//! an item's float is at or under the configured threshold.

use anyhow::Result;
use clap::Parser;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn, Level};
use tracing_subscriber::FmtSubscriber;

use float_sniper::config::load_config;
use float_sniper::{Poller, SeenLinks};

/// CLI arguments for the application
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(short, long, default_value = "config.toml")]
    config: String,

    /// Log level (trace, debug, info, warn, error); defaults to settings.log_level
    #[arg(long, env = "FLOAT_SNIPER_LOG")]
    log_level: Option<String>,

    /// Run a single pass over all pages and exit
    #[arg(long)]
    once: bool,
}

fn parse_level(level: &str) -> Level {
    match level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command line arguments
    let args = Args::parse();

    let config = load_config(Some(&args.config))?;

    let level = parse_level(
        args.log_level
            .as_deref()
            .unwrap_or(&config.settings.log_level),
    );

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(true)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    info!("Starting float_sniper");
    info!("Configuration file: {}", args.config);
    for warning in config.warnings() {
        warn!("{}", warning);
    }
    info!(
        "Watching {} pages every {}s",
        config.pages.len(),
        config.check_interval_seconds
    );

    let poller = Poller::from_config(&config)?;

    if args.once {
        let report = poller.check_pages(&mut SeenLinks::new()).await;
        info!(?report, "Single pass complete");
        return Ok(());
    }

    let shutdown = CancellationToken::new();
    let signal_token = shutdown.clone();
    tokio::spawn(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Signal handler error: {}. Shutting down anyway.", e);
        }
        info!("Received shutdown signal, cleaning up...");
        signal_token.cancel();
    });

    let seen = poller.run(shutdown).await;
    info!("Exiting after checking {} links", seen.len());

    Ok(())
}
