//! Difficulty manager for consensus
//!
//! Owns the retarget parameters of a network and picks the algorithm in effect
//! at a given height.

use std::fmt;
use std::sync::Arc;

use consensus_core::constants::DIFFICULTY_OVERHEAD;
use consensus_core::{ConsensusError, ConsensusResult, Difficulty, DifficultyParams, StatisticsSink};
use tracing::{debug, warn};

use super::{lwma, window};

/// Difficulty manager for consensus
#[derive(Clone)]
pub struct DifficultyManager {
    params: DifficultyParams,
    sink: Option<Arc<dyn StatisticsSink>>,
}

impl DifficultyManager {
    /// Create a manager over validated parameters
    pub fn new(params: DifficultyParams) -> ConsensusResult<Self> {
        params.validate()?;
        Ok(Self { params, sink: None })
    }

    /// Report every computed window retarget to `sink`
    pub fn with_statistics(mut self, sink: Arc<dyn StatisticsSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    pub fn params(&self) -> &DifficultyParams {
        &self.params
    }

    /// Window retarget for `height`.
    ///
    /// Unlike [`window::next_difficulty`], an overflowing retarget is an error
    /// here so callers cannot mistake the sentinel for a difficulty.
    pub fn next_difficulty(
        &self,
        timestamps: &[u64],
        cumulative_difficulties: &[Difficulty],
        height: u64,
    ) -> ConsensusResult<Difficulty> {
        let target = self.params.target_seconds;
        let difficulty = match &self.sink {
            Some(sink) => window::next_difficulty_with_statistics(
                sink.as_ref(),
                timestamps,
                cumulative_difficulties,
                target,
                height,
                &self.params,
            )?,
            None => window::next_difficulty(timestamps, cumulative_difficulties, target, height, &self.params)?,
        };

        if difficulty == DIFFICULTY_OVERHEAD {
            warn!(height, "difficulty overhead, scaled work does not fit in 64 bits");
            return Err(ConsensusError::DifficultyOverhead);
        }

        debug!(height, difficulty, "window retarget");
        Ok(difficulty)
    }

    /// LWMA retarget for `height` with the configured window and fork.
    pub fn lwma_next_difficulty(
        &self,
        timestamps: &[u64],
        cumulative_difficulties: &[Difficulty],
        height: u64,
    ) -> ConsensusResult<Difficulty> {
        let config = &self.params.lwma;
        let difficulty = lwma::lwma_next_difficulty(
            timestamps,
            cumulative_difficulties,
            self.params.target_seconds,
            config.window,
            height,
            config.fork_height,
            config.difficulty_guess,
        )?;
        debug!(height, difficulty, "lwma retarget");
        Ok(difficulty)
    }

    /// Retarget with whichever algorithm governs `height`.
    pub fn next_difficulty_for_height(
        &self,
        timestamps: &[u64],
        cumulative_difficulties: &[Difficulty],
        height: u64,
    ) -> ConsensusResult<Difficulty> {
        if self.params.lwma.is_active(height) {
            self.lwma_next_difficulty(timestamps, cumulative_difficulties, height)
        } else {
            self.next_difficulty(timestamps, cumulative_difficulties, height)
        }
    }

    /// Trailing blocks the caller must supply to retarget `height`.
    pub fn blocks_count(&self, height: u64) -> u64 {
        if self.params.lwma.is_active(height) {
            self.params.lwma.window.saturating_add(1)
        } else {
            self.params.window_blocks_count(height)
        }
    }
}

impl fmt::Debug for DifficultyManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DifficultyManager")
            .field("params", &self.params)
            .field("statistics", &self.sink.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use consensus_core::{LwmaParams, StatisticsError};
    use parking_lot::Mutex;

    #[derive(Default)]
    struct RecordingSink {
        heights: Mutex<Vec<u64>>,
    }

    impl StatisticsSink for RecordingSink {
        fn record_next_difficulty(&self, height: u64, _: u64, _: u64, _: Difficulty) -> Result<(), StatisticsError> {
            self.heights.lock().push(height);
            Ok(())
        }
    }

    fn small_params() -> DifficultyParams {
        DifficultyParams {
            target_seconds: 10,
            window: 6,
            cut: 0,
            lag: 2,
            window_adjust: 6,
            cut_adjust: 0,
            adjust_height: u64::MAX,
            lwma: LwmaParams { window: 4, fork_height: 100, difficulty_guess: 5_000 },
            ..DifficultyParams::default()
        }
    }

    #[test]
    fn test_rejects_invalid_params() {
        let params = DifficultyParams { target_seconds: 0, ..DifficultyParams::default() };
        assert!(matches!(DifficultyManager::new(params), Err(ConsensusError::Config(_))));

        let params = DifficultyParams { window: 10, cut: 5, ..DifficultyParams::default() };
        assert_eq!(
            DifficultyManager::new(params).unwrap_err(),
            ConsensusError::InvalidWindowParams { window: 10, cut: 5 }
        );
    }

    #[test]
    fn test_overhead_becomes_an_error() {
        let manager = DifficultyManager::new(small_params()).unwrap();
        assert_eq!(manager.next_difficulty(&[0, 1], &[0, u64::MAX], 1), Err(ConsensusError::DifficultyOverhead));
    }

    #[test]
    fn test_dispatches_on_fork_height() {
        let manager = DifficultyManager::new(small_params()).unwrap();
        let timestamps = [100, 110, 120, 130, 140];
        let cumulative = [0, 1_000, 2_000, 3_000, 4_000];

        // Window retarget: 4000 work over 40 seconds at a 10 second target.
        assert_eq!(manager.next_difficulty_for_height(&timestamps, &cumulative, 99).unwrap(), 1_000);
        // LWMA warm-up.
        assert_eq!(manager.next_difficulty_for_height(&[], &[], 100).unwrap(), 5_000);
        assert_eq!(manager.next_difficulty_for_height(&timestamps, &cumulative, 103).unwrap(), 5_000);
        // LWMA proper.
        assert_eq!(manager.next_difficulty_for_height(&timestamps, &cumulative, 104).unwrap(), 900);
    }

    #[test]
    fn test_blocks_count_follows_active_algorithm() {
        let manager = DifficultyManager::new(small_params()).unwrap();
        assert_eq!(manager.blocks_count(0), 8);
        assert_eq!(manager.blocks_count(99), 8);
        assert_eq!(manager.blocks_count(100), 5);

        let mainnet = DifficultyManager::new(DifficultyParams::default()).unwrap();
        assert_eq!(mainnet.blocks_count(1), 735);
    }

    #[test]
    fn test_statistics_sink_sees_window_retargets_only() {
        let sink = Arc::new(RecordingSink::default());
        let manager = DifficultyManager::new(small_params()).unwrap().with_statistics(sink.clone());
        let timestamps = [100, 110, 120, 130, 140];
        let cumulative = [0, 1_000, 2_000, 3_000, 4_000];

        manager.next_difficulty_for_height(&timestamps, &cumulative, 50).unwrap();
        manager.next_difficulty_for_height(&timestamps, &cumulative, 104).unwrap();
        assert_eq!(*sink.heights.lock(), vec![50]);
    }
}
