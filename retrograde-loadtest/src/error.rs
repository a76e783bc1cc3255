//! Load test error types

use retrograde_config::ConfigError;
use retrograde_http::HttpError;
use thiserror::Error;

pub type LoadTestResult<T> = Result<T, LoadTestError>;

/// Errors that stop a load test run.
///
/// Individual request failures are never surfaced here; they are recorded as
/// failed requests and the virtual user carries on.
#[derive(Error, Debug)]
pub enum LoadTestError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("HTTP client error: {0}")]
    Http(#[from] HttpError),

    #[error("No target host configured; pass --host or set target.host")]
    MissingHost,

    #[error("Every task weight is zero")]
    NoTasksEnabled,

    #[error("Virtual user {user} terminated abnormally: {source}")]
    UserTask {
        user: usize,
        #[source]
        source: tokio::task::JoinError,
    },

    #[error("Failed to set up latency histogram: {0}")]
    Metrics(#[from] hdrhistogram::CreationError),

    #[error("Failed to write report: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to serialize report: {0}")]
    Json(#[from] serde_json::Error),
}
