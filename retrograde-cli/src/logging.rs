//! Tracing initialisation for the CLI

use anyhow::Result;
use retrograde_config::{LogFormat, LoggingConfig};
use tracing_subscriber::EnvFilter;

/// Initialise the global subscriber.
///
/// Filter precedence: `--log-level`, then `RUST_LOG`, then the configured
/// level. Output goes to stderr so the report on stdout stays clean.
pub fn init_tracing(config: &LoggingConfig, log_level: Option<&str>) -> Result<()> {
    let rust_log = std::env::var(EnvFilter::DEFAULT_ENV).ok();
    let directive = filter_directive(config, log_level, rust_log.as_deref());

    let env_filter = EnvFilter::try_new(&directive).unwrap_or_else(|_| {
        eprintln!("Invalid log level '{}', falling back to 'info'", directive);
        EnvFilter::new("info")
    });

    let builder = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_file(config.include_location)
        .with_line_number(config.include_location);

    // A subscriber may already be installed
    let result = match config.format {
        LogFormat::Json => builder.json().try_init(),
        LogFormat::Compact => builder.compact().try_init(),
        LogFormat::Text => builder.try_init(),
    };
    if result.is_err() {
        tracing::debug!("Global tracing subscriber already initialized, skipping");
    }

    Ok(())
}

fn filter_directive(config: &LoggingConfig, log_level: Option<&str>, rust_log: Option<&str>) -> String {
    log_level
        .or(rust_log.filter(|value| !value.trim().is_empty()))
        .map(str::to_string)
        .unwrap_or_else(|| config.level.as_str().to_string())
}
