//! Minnow Server - Minimal concurrent HTTP server

mod error;
mod handlers;
mod reload;
mod response;
mod router;
mod server;
mod stats;

use anyhow::Result;
use clap::Parser;
use minnow_common::MinnowConfig;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, error, info};

/// Tracing target of this binary's modules; the default log filter is keyed on it
const LOG_TARGET: &str = env!("CARGO_CRATE_NAME");

/// Shared application state
pub struct AppState {
    pub config: Arc<RwLock<MinnowConfig>>,
    pub stats: Arc<stats::StatsRegistry>,
    pub start_time: std::time::Instant,
    pub config_path: PathBuf,
    /// Port given on the command line, kept across config reloads
    pub port_override: Option<u16>,
}

impl AppState {
    pub fn new(config: MinnowConfig, config_path: PathBuf, port_override: Option<u16>) -> Self {
        Self {
            config: Arc::new(RwLock::new(config)),
            stats: Arc::new(stats::StatsRegistry::new()),
            start_time: std::time::Instant::now(),
            config_path,
            port_override,
        }
    }
}

#[derive(Parser)]
#[command(name = "minnow", version)]
#[command(
    about = "Minimal concurrent HTTP server: static files, stats and a calculator",
    long_about = None
)]
struct Cli {
    /// Port to listen on (overrides the config file)
    #[arg(short, long, value_parser = clap::value_parser!(u16).range(1..))]
    port: Option<u16>,

    /// Path to the TOML configuration file
    #[arg(short, long, default_value = "minnow.toml")]
    config: PathBuf,
}

fn default_log_directive() -> String {
    format!("{}=info", LOG_TARGET)
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(default_log_directive().parse()?),
        )
        .init();

    info!("Starting Minnow Server v{}", env!("CARGO_PKG_VERSION"));

    let mut config = if cli.config.exists() {
        info!("Loading configuration from {}", cli.config.display());
        MinnowConfig::load(&cli.config)?
    } else {
        info!("No configuration file found, using defaults");
        MinnowConfig::default()
    };

    if let Some(port) = cli.port {
        config.server.port = port;
    }
    config.validate()?;
    debug!("Effective configuration:\n{}", config.to_toml()?);

    let state = Arc::new(AppState::new(config, cli.config, cli.port));

    // Bind before spawning anything so a bad port stops the process
    let listener = server::bind_listener(&state).await?;

    // Start file watcher for live reloading
    let reload_state = state.clone();
    let reload_handle = tokio::spawn(async move {
        if let Err(e) = reload::watch_config(reload_state).await {
            error!("Config watcher error: {}", e);
        }
    });

    let server_handle = tokio::spawn(server::serve(listener, state.clone()));

    tokio::select! {
        _ = tokio::signal::ctrl_c() => {
            info!("Received shutdown signal");
        }
        result = server_handle => {
            if let Err(e) = result {
                error!("Server task failed: {}", e);
            }
        }
    }

    reload_handle.abort();

    let stats = state.stats.snapshot().await;
    info!(
        "Minnow Server stopped after {:?}: {} requests, {} bytes in, {} bytes out",
        state.start_time.elapsed(),
        stats.total_requests,
        stats.bytes_received,
        stats.bytes_sent
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_log_directive_covers_modules() {
        assert!(module_path!().starts_with(LOG_TARGET));
        assert_eq!(default_log_directive(), "minnow=info");

        assert!(default_log_directive()
            .parse::<tracing_subscriber::filter::Directive>()
            .is_ok());
    }

    #[test]
    fn test_cli_defaults() {
        let cli = Cli::try_parse_from(["minnow"]).unwrap();
        assert_eq!(cli.port, None);
        assert_eq!(cli.config, PathBuf::from("minnow.toml"));
    }

    #[test]
    fn test_cli_port() {
        let cli = Cli::try_parse_from(["minnow", "-p", "8080"]).unwrap();
        assert_eq!(cli.port, Some(8080));

        let cli =
            Cli::try_parse_from(["minnow", "--port", "3000", "-c", "/etc/minnow.toml"]).unwrap();
        assert_eq!(cli.port, Some(3000));
        assert_eq!(cli.config, PathBuf::from("/etc/minnow.toml"));
    }

    #[test]
    fn test_cli_rejects_non_positive_port() {
        assert!(Cli::try_parse_from(["minnow", "-p", "0"]).is_err());
        assert!(Cli::try_parse_from(["minnow", "-p", "-5"]).is_err());
        assert!(Cli::try_parse_from(["minnow", "-p", "abc"]).is_err());
        assert!(Cli::try_parse_from(["minnow", "-p", "70000"]).is_err());
    }
}
