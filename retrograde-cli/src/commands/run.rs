//! The `run` command

use crate::cli::RunArgs;
use anyhow::{Context, Result};
use retrograde_config::RetrogradeConfig;
use retrograde_loadtest::report::{render_table, write_json};
use retrograde_loadtest::Runner;
use std::future::Future;
use tracing::info;

impl RunArgs {
    /// Layer command-line values over the loaded configuration
    pub fn apply(&self, config: &mut RetrogradeConfig) {
        if let Some(host) = &self.host {
            config.target.host = Some(host.clone());
        }
        if let Some(users) = self.users {
            config.users.count = users;
        }
        if let Some(spawn_rate) = self.spawn_rate {
            config.users.spawn_rate = spawn_rate;
        }
        if let Some(run_time) = self.run_time {
            config.users.run_time = Some(run_time);
        }
        if let Some(seed) = self.seed {
            config.users.seed = Some(seed);
        }
        if self.reset_stats {
            config.users.reset_stats = true;
        }
    }
}

/// Run the load test until its run time elapses or `interrupt` fires, then
/// print the statistics table
pub async fn handle_run<F>(mut config: RetrogradeConfig, args: &RunArgs, interrupt: F) -> Result<()>
where
    F: Future<Output = ()>,
{
    args.apply(&mut config);

    let runner = Runner::new(config).context("Invalid load test configuration")?;
    let host = runner.config().target.host.clone().unwrap_or_default();
    match runner.config().users.run_time {
        Some(run_time) => info!(
            "Starting load test against {} for {}",
            host,
            humantime::format_duration(run_time)
        ),
        None => info!("Starting load test against {} until interrupted", host),
    }

    let report = runner.run(interrupt).await.context("Load test failed")?;

    print!("{}", render_table(&report));

    if let Some(path) = &args.report_file {
        write_json(&report, path)
            .with_context(|| format!("Failed to write report to {:?}", path))?;
        info!("Report written to {:?}", path);
    }

    Ok(())
}
