//! Difficulty retargeting for a proof-of-work chain.
//!
//! Two algorithms are provided: a trimmed-mean window retarget and LWMA-1. Both
//! are pure functions of the timestamp and cumulative difficulty history handed
//! in by the caller. [`DifficultyManager`] ties them to configured parameters and
//! an optional statistics sink.

pub mod difficulty;

pub use consensus_core::{ConsensusError, ConsensusResult, Difficulty, DifficultyParams};
pub use consensus_pow::check_hash;
pub use difficulty::{
    lwma_next_difficulty, next_difficulty, next_difficulty_with_statistics, DifficultyManager, WindowOutcome,
};
