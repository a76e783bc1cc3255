//! CLI argument parsing definitions

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(long, value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,

    /// Set the log level (trace, debug, info, warn, error)
    #[arg(long, value_name = "LEVEL", global = true)]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run a load test against a Retrograde server
    Run(RunArgs),

    /// Configuration management commands
    Config {
        #[command(subcommand)]
        config_cmd: ConfigCommands,
    },
}

/// Overrides for a single run; anything unset falls back to configuration
#[derive(Args, Debug, Default)]
pub struct RunArgs {
    /// Base URL of the server under test (example: http://localhost:8000)
    #[arg(long, value_name = "URL")]
    pub host: Option<String>,

    /// Number of concurrent virtual users
    #[arg(long, short = 'u', value_name = "N")]
    pub users: Option<usize>,

    /// Users started per second
    #[arg(long, short = 'r', value_name = "RATE")]
    pub spawn_rate: Option<f64>,

    /// Stop after this long (example: 90s, 5m, 1h30m)
    #[arg(long, short = 't', value_name = "DURATION", value_parser = parse_run_time)]
    pub run_time: Option<Duration>,

    /// Seed for reproducible task and card choices
    #[arg(long, value_name = "SEED")]
    pub seed: Option<u64>,

    /// Write the final statistics as JSON to this file
    #[arg(long, value_name = "PATH")]
    pub report_file: Option<PathBuf>,

    /// Discard statistics gathered while users were still spawning
    #[arg(long)]
    pub reset_stats: bool,
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Validate a configuration file
    Validate {
        /// Path to the configuration file
        #[arg(long, value_name = "PATH")]
        config_file: PathBuf,
    },

    /// Generate a sample configuration file
    Generate {
        /// Output file path
        #[arg(long, value_name = "PATH")]
        output: PathBuf,

        /// Overwrite existing file
        #[arg(long)]
        force: bool,
    },

    /// Show current configuration in use
    Show {
        /// Path to configuration file (optional, uses default loading logic)
        #[arg(long, value_name = "PATH")]
        config_file: Option<PathBuf>,

        /// Output format: yaml, json
        #[arg(long, value_name = "FORMAT", default_value = "yaml")]
        format: String,
    },
}

fn parse_run_time(value: &str) -> Result<Duration, String> {
    let duration = retrograde_config::parse_duration(value)?;
    if duration.is_zero() {
        return Err("run time must be greater than zero".to_string());
    }
    Ok(duration)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_arguments() {
        let cli = Cli::try_parse_from([
            "retrograde",
            "--log-level",
            "debug",
            "run",
            "--host",
            "http://localhost:8000",
            "--users",
            "50",
            "--spawn-rate",
            "5",
            "--run-time",
            "5m",
            "--seed",
            "42",
            "--report-file",
            "report.json",
            "--reset-stats",
        ])
        .unwrap();

        assert_eq!(cli.log_level.as_deref(), Some("debug"));
        match cli.command {
            Commands::Run(args) => {
                assert_eq!(args.host.as_deref(), Some("http://localhost:8000"));
                assert_eq!(args.users, Some(50));
                assert_eq!(args.spawn_rate, Some(5.0));
                assert_eq!(args.run_time, Some(Duration::from_secs(300)));
                assert_eq!(args.seed, Some(42));
                assert_eq!(args.report_file, Some(PathBuf::from("report.json")));
                assert!(args.reset_stats);
            }
            _ => panic!("expected run command"),
        }
    }

    #[test]
    fn test_run_defaults_are_unset() {
        let cli = Cli::try_parse_from(["retrograde", "run"]).unwrap();
        match cli.command {
            Commands::Run(args) => {
                assert!(args.host.is_none());
                assert!(args.users.is_none());
                assert!(args.run_time.is_none());
                assert!(!args.reset_stats);
            }
            _ => panic!("expected run command"),
        }
    }

    #[test]
    fn test_global_config_after_subcommand() {
        let cli = Cli::try_parse_from(["retrograde", "run", "--config", "load.yaml"]).unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("load.yaml")));
    }

    #[test]
    fn test_invalid_run_time_rejected() {
        assert!(Cli::try_parse_from(["retrograde", "run", "--run-time", "soon"]).is_err());
        assert!(Cli::try_parse_from(["retrograde", "run", "--run-time", "0s"]).is_err());
    }

    #[test]
    fn test_config_show_defaults_to_yaml() {
        let cli = Cli::try_parse_from(["retrograde", "config", "show"]).unwrap();
        match cli.command {
            Commands::Config {
                config_cmd: ConfigCommands::Show { config_file, format },
            } => {
                assert!(config_file.is_none());
                assert_eq!(format, "yaml");
            }
            _ => panic!("expected config show"),
        }
    }

    #[test]
    fn test_command_is_required() {
        assert!(Cli::try_parse_from(["retrograde"]).is_err());
    }
}
