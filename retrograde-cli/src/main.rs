use anyhow::{Context, Result};
use clap::Parser;
use retrograde_config::{ConfigLoader, LoggingConfig, RetrogradeConfig};
use std::path::PathBuf;
use tracing::{debug, info, warn};

mod cli;
mod commands;
mod logging;

use cli::{Cli, Commands, ConfigCommands};
use commands::{handle_config_generate, handle_config_show, handle_config_validate, handle_run};

/// Load configuration from `config_path`, or from the environment and
/// defaults when no path is given. A named file that is missing or invalid
/// is an error.
pub(crate) fn load_config(config_path: Option<&PathBuf>) -> Result<RetrogradeConfig> {
    ConfigLoader::new()
        .load(config_path)
        .with_context(|| match config_path {
            Some(path) => format!("Failed to load configuration from {:?}", path),
            None => "Failed to load configuration from environment".to_string(),
        })
}

/// Completes on Ctrl-C or, on unix, SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received, stopping users...");
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Config errors surface per command, after logging is up
    let config = load_config(cli.config.as_ref());
    let logging = config
        .as_ref()
        .map(|config| config.logging.clone())
        .unwrap_or_else(|_| LoggingConfig::default());
    logging::init_tracing(&logging, cli.log_level.as_deref())?;

    debug!("Retrograde CLI starting");
    match (&cli.config, &config) {
        (Some(path), Ok(_)) => info!("Loaded configuration from {:?}", path),
        (None, Ok(_)) => debug!("No configuration file specified; using environment and defaults"),
        (_, Err(e)) => debug!("Configuration not loaded: {:#}", e),
    }

    match &cli.command {
        Commands::Run(args) => handle_run(config?, args, shutdown_signal()).await,
        Commands::Config { config_cmd } => match config_cmd {
            ConfigCommands::Validate { config_file } => handle_config_validate(config_file),
            ConfigCommands::Generate { output, force } => handle_config_generate(output, *force),
            ConfigCommands::Show {
                config_file,
                format,
            } => handle_config_show(config_file.as_ref().or(cli.config.as_ref()), format),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_missing_config_file_is_error() {
        let path = PathBuf::from("/nonexistent/typo.yaml");
        let error = load_config(Some(&path)).unwrap_err();
        assert!(format!("{:#}", error).contains("Failed to load configuration from"));
    }

    #[test]
    fn test_config_file_is_loaded() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("retrograde.yaml");
        fs::write(&path, "users:\n  count: 12\n  run_time: 2m\n").unwrap();

        let config = load_config(Some(&path)).unwrap();
        assert_eq!(config.users.count, 12);
        assert_eq!(config.users.run_time, Some(std::time::Duration::from_secs(120)));
    }
}
