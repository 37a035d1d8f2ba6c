//! Sockrelay - Transparent SOCKS5 relay
//!
//! This is the main entry point for the Sockrelay application.

use anyhow::{bail, Result};
use clap::Parser;
use sockrelay::config::{load_config, RelayConfig};
use sockrelay::Relay;
use std::path::PathBuf;
use tokio::sync::broadcast;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

/// Sockrelay - relay SOCKS5 to an upstream server, resolving domains locally
#[derive(Parser, Debug)]
#[command(name = "sockrelay")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Address to listen on (overrides the configuration file)
    #[arg(short, long)]
    bind: Option<String>,

    /// Upstream SOCKS5 server address (overrides the configuration file)
    #[arg(short, long)]
    server: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,

    /// Enable JSON logging format
    #[arg(long)]
    json_log: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Setup logging
    setup_logging(&args.log_level, args.json_log)?;

    let config = relay_config(&args)?;
    config.validate()?;

    info!("Sockrelay v{}", sockrelay::VERSION);
    if let Some(path) = &args.config {
        info!("Configuration loaded from: {:?}", path);
    }

    // Setup shutdown signal
    let (shutdown_tx, shutdown_rx) = broadcast::channel(1);

    // Handle Ctrl+C and termination signals (cross-platform)
    tokio::spawn(async move {
        #[cfg(unix)]
        {
            use tokio::signal::unix::{signal, SignalKind};
            match signal(SignalKind::terminate()) {
                Ok(mut sigterm) => {
                    tokio::select! {
                        _ = tokio::signal::ctrl_c() => {
                            info!("Received Ctrl+C, shutting down...");
                        }
                        _ = sigterm.recv() => {
                            info!("Received SIGTERM, shutting down...");
                        }
                    }
                }
                Err(e) => {
                    tracing::warn!("Failed to setup SIGTERM handler: {}", e);
                    let _ = tokio::signal::ctrl_c().await;
                    info!("Received Ctrl+C, shutting down...");
                }
            }
        }

        #[cfg(not(unix))]
        {
            // On Windows, only handle Ctrl+C
            let _ = tokio::signal::ctrl_c().await;
            info!("Received Ctrl+C, shutting down...");
        }

        let _ = shutdown_tx.send(true);
    });

    Relay::from_config(config)
        .serve_with_shutdown(shutdown_rx)
        .await
}

/// Build the relay configuration from the file and command line
fn relay_config(args: &Args) -> Result<RelayConfig> {
    let mut config = match &args.config {
        Some(path) => load_config(path)?.relay,
        None => match (&args.bind, &args.server) {
            (Some(bind), Some(server)) => return Ok(RelayConfig::new(bind.clone(), server.clone())),
            _ => bail!("either --config or both --bind and --server are required"),
        },
    };

    if let Some(bind) = &args.bind {
        config.bind_addr = bind.clone();
    }
    if let Some(server) = &args.server {
        config.server_addr = server.clone();
    }

    Ok(config)
}

/// Setup logging based on configuration
fn setup_logging(level: &str, json: bool) -> Result<()> {
    let level = match level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" | "warning" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    if json {
        let subscriber = FmtSubscriber::builder()
            .with_max_level(level)
            .json()
            .finish();
        tracing::subscriber::set_global_default(subscriber)?;
    } else {
        let subscriber = FmtSubscriber::builder()
            .with_max_level(level)
            .with_target(true)
            .with_thread_ids(false)
            .with_thread_names(false)
            .finish();
        tracing::subscriber::set_global_default(subscriber)?;
    }

    Ok(())
}
