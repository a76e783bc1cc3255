//! Resource addresses of the board under test

use retrograde_config::TargetConfig;

/// Board and rank identifiers shared read-only by every virtual user
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Targets {
    pub board: String,
    pub ranks: Vec<String>,
}

impl Targets {
    pub fn new(board: impl Into<String>, ranks: Vec<String>) -> Self {
        Self {
            board: board.into(),
            ranks,
        }
    }

    pub fn board_path(&self) -> String {
        format!("/boards/{}", self.board)
    }

    pub fn ranks_path(&self) -> String {
        format!("/boards/{}/ranks", self.board)
    }

    pub fn cards_path(&self) -> String {
        format!("/boards/{}/cards", self.board)
    }

    pub fn rank_cards_path(&self, rank: &str) -> String {
        format!("/boards/{}/ranks/{}/cards", self.board, rank)
    }

    pub fn card_path(&self, rank: &str, card: &str) -> String {
        format!("/boards/{}/ranks/{}/cards/{}", self.board, rank, card)
    }

    pub fn vote_path(&self, rank: &str, card: &str) -> String {
        format!("/boards/{}/ranks/{}/cards/{}/vote", self.board, rank, card)
    }
}

impl Default for Targets {
    fn default() -> Self {
        Self::from(&TargetConfig::default())
    }
}

impl From<&TargetConfig> for Targets {
    fn from(config: &TargetConfig) -> Self {
        Self::new(config.board.clone(), config.ranks.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_paths() {
        let targets = Targets::default();
        assert_eq!(targets.board_path(), "/boards/mBDcdvqipyObonQy");
        assert_eq!(targets.ranks_path(), "/boards/mBDcdvqipyObonQy/ranks");
        assert_eq!(targets.cards_path(), "/boards/mBDcdvqipyObonQy/cards");
        assert_eq!(
            targets.rank_cards_path("wKiUTsNoCCU1R8AD"),
            "/boards/mBDcdvqipyObonQy/ranks/wKiUTsNoCCU1R8AD/cards"
        );
        assert_eq!(
            targets.card_path("r1", "c1"),
            "/boards/mBDcdvqipyObonQy/ranks/r1/cards/c1"
        );
        assert_eq!(
            targets.vote_path("r1", "c1"),
            "/boards/mBDcdvqipyObonQy/ranks/r1/cards/c1/vote"
        );
        assert_eq!(targets.ranks.len(), 4);
    }
}
