//! Target system configuration: where to send load and what to exercise

use crate::error::ConfigResult;
use crate::validation::{validate_required_string, validate_url, Validatable};
use serde::{Deserialize, Serialize};

/// Board exercised when no board is configured
pub const DEFAULT_BOARD: &str = "mBDcdvqipyObonQy";

/// Ranks (columns) of [`DEFAULT_BOARD`]
pub const DEFAULT_RANKS: [&str; 4] = [
    "wKiUTsNoCCU1R8AD",
    "INpwJgf9g4lUrCTp",
    "WCKy5hoItIILQSZj",
    "qPfA6LJmP5HHHk7m",
];

/// Target configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TargetConfig {
    /// Base URL of the Retrograde API, e.g. `http://localhost:8000`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,

    /// Board identifier
    #[serde(default = "default_board")]
    pub board: String,

    /// Rank identifiers belonging to `board`
    #[serde(default = "default_ranks")]
    pub ranks: Vec<String>,

    /// Relative task weights
    #[serde(default)]
    pub weights: TaskWeights,
}

/// Relative frequency of each weighted task. A zero weight disables the task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TaskWeights {
    pub load_board: u32,
    pub load_ranks: u32,
    pub load_cards: u32,
    pub create_card: u32,
    pub delete_card: u32,
    pub vote_card: u32,
}

impl TaskWeights {
    /// Sum of all weights
    pub fn total(&self) -> u64 {
        [
            self.load_board,
            self.load_ranks,
            self.load_cards,
            self.create_card,
            self.delete_card,
            self.vote_card,
        ]
        .iter()
        .map(|w| u64::from(*w))
        .sum()
    }
}

impl Default for TaskWeights {
    fn default() -> Self {
        Self {
            load_board: 4,
            load_ranks: 1,
            load_cards: 4,
            create_card: 2,
            delete_card: 3,
            vote_card: 4,
        }
    }
}

impl Default for TargetConfig {
    fn default() -> Self {
        Self {
            host: None,
            board: default_board(),
            ranks: default_ranks(),
            weights: TaskWeights::default(),
        }
    }
}

impl Validatable for TargetConfig {
    fn validate(&self) -> ConfigResult<()> {
        if let Some(ref host) = self.host {
            validate_url(host, "host", self.domain_name())?;
        }

        validate_required_string(&self.board, "board", self.domain_name())?;

        if self.ranks.is_empty() {
            return Err(self.validation_error("at least one rank must be configured"));
        }
        for rank in &self.ranks {
            validate_required_string(rank, "ranks[]", self.domain_name())?;
        }

        if self.weights.total() == 0 {
            return Err(self.validation_error("at least one task weight must be positive"));
        }

        Ok(())
    }

    fn domain_name(&self) -> &'static str {
        "target"
    }
}

fn default_board() -> String {
    DEFAULT_BOARD.to_string()
}

fn default_ranks() -> Vec<String> {
    DEFAULT_RANKS.iter().map(|r| r.to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_target_defaults() {
        let config = TargetConfig::default();
        assert_eq!(config.board, "mBDcdvqipyObonQy");
        assert_eq!(config.ranks.len(), 4);
        assert_eq!(config.ranks[0], "wKiUTsNoCCU1R8AD");
        assert_eq!(config.weights.total(), 18);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_target_validation() {
        let mut config = TargetConfig::default();
        config.host = Some("http://localhost:8000".to_string());
        assert!(config.validate().is_ok());

        config.host = Some("localhost:8000/not a url".to_string());
        assert!(config.validate().is_err());

        let mut config = TargetConfig::default();
        config.board = String::new();
        assert!(config.validate().is_err());

        let mut config = TargetConfig::default();
        config.ranks.clear();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_all_zero_weights_rejected() {
        let mut config = TargetConfig::default();
        config.weights = TaskWeights {
            load_board: 0,
            load_ranks: 0,
            load_cards: 0,
            create_card: 0,
            delete_card: 0,
            vote_card: 0,
        };
        assert!(config.validate().is_err());

        config.weights.vote_card = 1;
        assert!(config.validate().is_ok());
    }
}
