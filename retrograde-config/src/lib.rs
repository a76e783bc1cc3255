//! Domain-driven configuration for the Retrograde load generator
//!
//! Configuration is split by functional domain (target, users, http,
//! logging), each with its own defaults and validation, and can be loaded
//! from YAML with `RETROGRADE_*` environment overrides.

pub mod error;
pub mod loader;
pub mod validation;

pub mod domains;

pub use error::{ConfigError, ConfigResult};
pub use loader::ConfigLoader;

pub use domains::{
    http::HttpConfig,
    logging::{LogFormat, LogLevel, LoggingConfig},
    target::{TargetConfig, TaskWeights},
    users::UsersConfig,
    RetrogradeConfig,
};

pub use domains::utils::parse_duration;
