//! Difficulty adjustment algorithms.

pub mod lwma;
pub mod manager;
pub mod window;

pub use lwma::lwma_next_difficulty;
pub use manager::DifficultyManager;
pub use window::{next_difficulty, next_difficulty_with_statistics, window_retarget, WindowOutcome};
