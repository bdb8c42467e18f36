use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConsensusError {
    /// The windowed retarget overflowed; the candidate block must be rejected.
    #[error("Difficulty overhead")]
    DifficultyOverhead,

    #[error("Cumulative difficulty does not increase between window positions {begin} and {end}")]
    InvalidTotalWork { begin: usize, end: usize },

    #[error("Window length mismatch: {timestamps} timestamps, {cumulative_difficulties} cumulative difficulties")]
    WindowLengthMismatch { timestamps: usize, cumulative_difficulties: usize },

    #[error("Window too long: {len} entries, at most {max} allowed")]
    WindowTooLong { len: usize, max: usize },

    #[error("Insufficient history: expected {expected} entries, got {actual}")]
    InsufficientHistory { expected: usize, actual: usize },

    #[error("Invalid difficulty window {window} with cut {cut}")]
    InvalidWindowParams { window: u64, cut: u64 },

    #[error("Invalid LWMA parameters: {0}")]
    InvalidLwmaParams(&'static str),

    #[error("Configuration error: {0}")]
    Config(String),
}

pub type ConsensusResult<T> = Result<T, ConsensusError>;
