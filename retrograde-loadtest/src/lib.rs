//! Load generator for the Retrograde board/ranks/cards voting API
//!
//! Virtual users repeatedly pick weighted tasks (load the board, its ranks
//! or its cards, create, delete or vote on a card) and report every request
//! to a shared [`MetricsCollector`]. Each user keeps a private cache of the
//! cards it last listed, which delete and vote draw their targets from.

pub mod cache;
pub mod error;
pub mod metrics;
pub mod outcome;
pub mod profile;
pub mod random;
pub mod report;
pub mod runner;
pub mod targets;
pub mod tasks;
pub mod user;
pub mod vocabulary;

pub use cache::{KnownCard, KnownCards};
pub use error::{LoadTestError, LoadTestResult};
pub use metrics::{EntryReport, LoadTestReport, MetricsCollector, RequestRecord};
pub use outcome::{classify, Outcome, StatusPolicy};
pub use random::{RandomSource, ScriptedRandom};
pub use runner::Runner;
pub use targets::Targets;
pub use tasks::{TaskKind, TaskTable};
pub use user::VirtualUser;
