//! Virtual user population and pacing

use crate::error::ConfigResult;
use crate::validation::{validate_positive, Validatable};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Virtual user configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UsersConfig {
    /// Number of concurrent virtual users
    #[serde(default = "default_count")]
    pub count: usize,

    /// Users started per second until `count` is reached
    #[serde(default = "default_spawn_rate")]
    pub spawn_rate: f64,

    /// Stop after this long; run until interrupted when unset
    #[serde(
        with = "humantime_serde",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub run_time: Option<Duration>,

    /// Lower bound of the pause between two tasks, in milliseconds
    #[serde(default)]
    pub wait_time_min_ms: u64,

    /// Upper bound of the pause between two tasks, in milliseconds
    #[serde(default)]
    pub wait_time_max_ms: u64,

    /// Seed for reproducible task selection; user `i` uses `seed + i`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,

    /// Reset statistics once every user has been spawned
    #[serde(default)]
    pub reset_stats: bool,
}

impl UsersConfig {
    /// Delay between two user spawns; `Duration::MAX` when the rate is too
    /// small to express
    pub fn spawn_interval(&self) -> Duration {
        Duration::try_from_secs_f64(1.0 / self.spawn_rate).unwrap_or(Duration::MAX)
    }

    /// Inclusive think-time range between tasks
    pub fn wait_time(&self) -> (Duration, Duration) {
        (
            Duration::from_millis(self.wait_time_min_ms),
            Duration::from_millis(self.wait_time_max_ms),
        )
    }
}

impl Default for UsersConfig {
    fn default() -> Self {
        Self {
            count: default_count(),
            spawn_rate: default_spawn_rate(),
            run_time: None,
            wait_time_min_ms: 0,
            wait_time_max_ms: 0,
            seed: None,
            reset_stats: false,
        }
    }
}

impl Validatable for UsersConfig {
    fn validate(&self) -> ConfigResult<()> {
        validate_positive(self.count, "count", self.domain_name())?;
        validate_positive(self.spawn_rate, "spawn_rate", self.domain_name())?;

        if !self.spawn_rate.is_finite() {
            return Err(self.validation_error("spawn_rate must be finite"));
        }

        if Duration::try_from_secs_f64(1.0 / self.spawn_rate).is_err() {
            return Err(self.validation_error(format!(
                "spawn_rate {} is too small; the delay between spawns overflows",
                self.spawn_rate
            )));
        }

        if let Some(run_time) = self.run_time {
            if run_time.is_zero() {
                return Err(self.validation_error("run_time must be greater than 0"));
            }
        }

        if self.wait_time_min_ms > self.wait_time_max_ms {
            return Err(self.validation_error(format!(
                "wait_time_min_ms ({}) exceeds wait_time_max_ms ({})",
                self.wait_time_min_ms, self.wait_time_max_ms
            )));
        }

        Ok(())
    }

    fn domain_name(&self) -> &'static str {
        "users"
    }
}

fn default_count() -> usize {
    1
}

fn default_spawn_rate() -> f64 {
    1.0
}
