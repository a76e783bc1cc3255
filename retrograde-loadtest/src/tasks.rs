//! Weighted task table

use crate::error::{LoadTestError, LoadTestResult};
use crate::random::RandomSource;
use retrograde_config::TaskWeights;
use serde::Serialize;
use std::fmt;

/// The weighted tasks a virtual user can pick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum TaskKind {
    LoadBoard,
    LoadRanks,
    LoadCards,
    CreateCard,
    DeleteCard,
    VoteCard,
}

impl TaskKind {
    pub const ALL: [TaskKind; 6] = [
        TaskKind::LoadBoard,
        TaskKind::LoadRanks,
        TaskKind::LoadCards,
        TaskKind::CreateCard,
        TaskKind::DeleteCard,
        TaskKind::VoteCard,
    ];

    /// Name used to group requests in statistics
    pub fn name(&self) -> &'static str {
        match self {
            TaskKind::LoadBoard => "Load Board",
            TaskKind::LoadRanks => "Load Ranks",
            TaskKind::LoadCards => "Load Cards",
            TaskKind::CreateCard => "Create a Card",
            TaskKind::DeleteCard => "Delete a Card",
            TaskKind::VoteCard => "Vote on a Card",
        }
    }

    fn weight_in(&self, weights: &TaskWeights) -> u32 {
        match self {
            TaskKind::LoadBoard => weights.load_board,
            TaskKind::LoadRanks => weights.load_ranks,
            TaskKind::LoadCards => weights.load_cards,
            TaskKind::CreateCard => weights.create_card,
            TaskKind::DeleteCard => weights.delete_card,
            TaskKind::VoteCard => weights.vote_card,
        }
    }
}

impl fmt::Display for TaskKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Tasks with positive weight and their cumulative weight bounds
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskTable {
    entries: Vec<(TaskKind, u32)>,
    total: u64,
}

impl TaskTable {
    /// Build a table, dropping zero-weight tasks
    pub fn new(weights: &TaskWeights) -> LoadTestResult<Self> {
        let entries: Vec<(TaskKind, u32)> = TaskKind::ALL
            .iter()
            .map(|kind| (*kind, kind.weight_in(weights)))
            .filter(|(_, weight)| *weight > 0)
            .collect();

        let total = entries.iter().map(|(_, w)| u64::from(*w)).sum();
        if total == 0 {
            return Err(LoadTestError::NoTasksEnabled);
        }

        Ok(Self { entries, total })
    }

    pub fn total_weight(&self) -> u64 {
        self.total
    }

    /// Weight of `kind`, zero when disabled
    pub fn weight(&self, kind: TaskKind) -> u32 {
        self.entries
            .iter()
            .find(|(k, _)| *k == kind)
            .map(|(_, w)| *w)
            .unwrap_or(0)
    }

    /// Pick a task with probability weight / total weight
    pub fn pick(&self, rng: &mut impl RandomSource) -> TaskKind {
        let mut roll = rng.between(0, self.total - 1);
        for (kind, weight) in &self.entries {
            let weight = u64::from(*weight);
            if roll < weight {
                return *kind;
            }
            roll -= weight;
        }
        // unreachable while roll < total
        self.entries[self.entries.len() - 1].0
    }
}

impl Default for TaskTable {
    fn default() -> Self {
        let weights = TaskWeights::default();
        Self {
            entries: TaskKind::ALL
                .iter()
                .map(|kind| (*kind, kind.weight_in(&weights)))
                .collect(),
            total: weights.total(),
        }
    }
}
