//! Shared types for proof-of-work admission and difficulty retargeting.

pub mod config;
pub mod constants;
pub mod errors;
pub mod hash;
pub mod statistics;

pub use config::params::{DifficultyParams, LwmaParams, WindowParams};
pub use errors::{ConsensusError, ConsensusResult};
pub use hash::{Hash, HASH_SIZE, ZERO_HASH};
pub use statistics::{
    BlockCreateRecord, LoggedStatistics, StatisticsError, StatisticsRecord, StatisticsSink, StatisticsStore,
};

/// Required cumulative work of a block. Larger is harder.
pub type Difficulty = u64;
