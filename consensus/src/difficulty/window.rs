//! Windowed difficulty retarget.
//!
//! The timestamps of the window are sorted and `cut` outliers are trimmed from
//! each end. The next difficulty is the work done between the remaining
//! endpoints scaled to the target block time, rounded up.

use consensus_core::constants::DIFFICULTY_OVERHEAD;
use consensus_core::{ConsensusError, ConsensusResult, Difficulty, DifficultyParams, StatisticsSink, WindowParams};
use pow_math::{cadd, DefaultMul, WideMul};
use tracing::warn;

/// Result of one windowed retarget.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowOutcome {
    /// Fewer than two samples, difficulty 1.
    Bootstrap,
    /// `total_work * target_seconds` does not fit; reported as difficulty 0.
    Overhead { time_span: u64, total_work: u64 },
    Computed { time_span: u64, total_work: u64, difficulty: Difficulty },
}

impl WindowOutcome {
    pub fn difficulty(&self) -> Difficulty {
        match self {
            WindowOutcome::Bootstrap => 1,
            WindowOutcome::Overhead { .. } => DIFFICULTY_OVERHEAD,
            WindowOutcome::Computed { difficulty, .. } => *difficulty,
        }
    }
}

/// Next difficulty for the block at `height`.
///
/// Callers pass the trailing history oldest first. Anything beyond the window
/// size in effect at `height` is dropped from the newest end. A return value of
/// `0` means the scaled work overflowed and the block must not be accepted.
pub fn next_difficulty(
    timestamps: &[u64],
    cumulative_difficulties: &[Difficulty],
    target_seconds: u64,
    height: u64,
    params: &DifficultyParams,
) -> ConsensusResult<Difficulty> {
    let outcome =
        window_retarget::<DefaultMul>(timestamps, cumulative_difficulties, target_seconds, params.window_for(height))?;
    Ok(outcome.difficulty())
}

/// [`next_difficulty`], reporting the computation to `sink`.
///
/// Only computed (non-zero) results are recorded. Sink failures are logged and
/// never change the returned difficulty.
pub fn next_difficulty_with_statistics<S: StatisticsSink + ?Sized>(
    sink: &S,
    timestamps: &[u64],
    cumulative_difficulties: &[Difficulty],
    target_seconds: u64,
    height: u64,
    params: &DifficultyParams,
) -> ConsensusResult<Difficulty> {
    let outcome =
        window_retarget::<DefaultMul>(timestamps, cumulative_difficulties, target_seconds, params.window_for(height))?;

    if let WindowOutcome::Computed { time_span, total_work, difficulty } = outcome {
        // A zero target scales every window to the overhead sentinel.
        if difficulty == DIFFICULTY_OVERHEAD {
            return Ok(difficulty);
        }
        if let Err(err) = sink.record_next_difficulty(height, time_span, total_work, difficulty) {
            warn!(height, %err, "failed to record next difficulty statistics");
        }
    }

    Ok(outcome.difficulty())
}

/// Windowed retarget with an explicit window and multiplier.
pub fn window_retarget<M: WideMul>(
    timestamps: &[u64],
    cumulative_difficulties: &[Difficulty],
    target_seconds: u64,
    window: WindowParams,
) -> ConsensusResult<WindowOutcome> {
    if timestamps.len() != cumulative_difficulties.len() {
        return Err(ConsensusError::WindowLengthMismatch {
            timestamps: timestamps.len(),
            cumulative_difficulties: cumulative_difficulties.len(),
        });
    }
    window.validate()?;

    let window_size = to_usize(window.window);
    let length = timestamps.len().min(window_size);
    if length <= 1 {
        return Ok(WindowOutcome::Bootstrap);
    }

    let mut sorted = timestamps[..length].to_vec();
    sorted.sort_unstable();

    let kept = to_usize(window.kept());
    let (cut_begin, cut_end) = if length <= kept {
        (0, length)
    } else {
        let begin = (length - kept + 1) / 2;
        (begin, begin + kept)
    };
    debug_assert!(cut_begin + 2 <= cut_end && cut_end <= length);

    let time_span = match sorted[cut_end - 1] - sorted[cut_begin] {
        0 => 1,
        span => span,
    };

    let total_work = cumulative_difficulties[cut_end - 1]
        .checked_sub(cumulative_difficulties[cut_begin])
        .filter(|work| *work > 0)
        .ok_or(ConsensusError::InvalidTotalWork { begin: cut_begin, end: cut_end - 1 })?;

    let (low, high) = M::mul(total_work, target_seconds);
    if high != 0 || cadd(low, time_span - 1) {
        return Ok(WindowOutcome::Overhead { time_span, total_work });
    }

    let difficulty = (low + time_span - 1) / time_span;
    Ok(WindowOutcome::Computed { time_span, total_work, difficulty })
}

fn to_usize(value: u64) -> usize {
    usize::try_from(value).unwrap_or(usize::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use consensus_core::StatisticsError;
    use parking_lot::Mutex;
    use pow_math::{NativeMul, PortableMul};
    use proptest::prelude::*;

    fn params(window: u64, cut: u64) -> DifficultyParams {
        DifficultyParams { window, cut, lag: 0, ..DifficultyParams::default() }
    }

    #[derive(Default)]
    struct RecordingSink {
        records: Mutex<Vec<(u64, u64, u64, u64)>>,
    }

    impl StatisticsSink for RecordingSink {
        fn record_next_difficulty(
            &self,
            height: u64,
            time_span: u64,
            total_work: u64,
            difficulty: Difficulty,
        ) -> Result<(), StatisticsError> {
            self.records.lock().push((height, time_span, total_work, difficulty));
            Ok(())
        }
    }

    struct FailingSink;

    impl StatisticsSink for FailingSink {
        fn record_next_difficulty(&self, _: u64, _: u64, _: u64, _: Difficulty) -> Result<(), StatisticsError> {
            Err(StatisticsError::Closed)
        }
    }

    #[test]
    fn test_short_history_bootstraps_to_one() {
        let p = params(720, 60);
        assert_eq!(next_difficulty(&[], &[], 120, 0, &p).unwrap(), 1);
        assert_eq!(next_difficulty(&[1_000], &[5], 120, 1, &p).unwrap(), 1);
    }

    #[test]
    fn test_untrimmed_window() {
        let timestamps = [100, 105, 110, 115, 120, 125];
        let cumulative = [0, 10, 20, 30, 40, 50];
        let outcome = window_retarget::<NativeMul>(&timestamps, &cumulative, 5, WindowParams::new(6, 0)).unwrap();
        assert_eq!(outcome, WindowOutcome::Computed { time_span: 25, total_work: 50, difficulty: 10 });
        assert_eq!(next_difficulty(&timestamps, &cumulative, 5, 0, &params(6, 0)).unwrap(), 10);
    }

    #[test]
    fn test_zero_span_clamps_to_one() {
        let timestamps = [100; 6];
        let cumulative = [0, 10, 20, 30, 40, 50];
        let outcome = window_retarget::<NativeMul>(&timestamps, &cumulative, 5, WindowParams::new(6, 0)).unwrap();
        assert_eq!(outcome, WindowOutcome::Computed { time_span: 1, total_work: 50, difficulty: 250 });
    }

    #[test]
    fn test_trims_outliers_from_sorted_timestamps() {
        let mut timestamps: Vec<u64> = (0..10).map(|i| 1_000 + 120 * i).collect();
        timestamps[3] = 5_000;
        timestamps[7] = 0;
        let cumulative: Vec<u64> = (0..10).map(|i| 1_000 * i).collect();

        let outcome = window_retarget::<NativeMul>(&timestamps, &cumulative, 120, WindowParams::new(10, 2)).unwrap();
        assert_eq!(outcome, WindowOutcome::Computed { time_span: 840, total_work: 5_000, difficulty: 715 });
    }

    #[test]
    fn test_partial_window_is_trimmed_symmetrically() {
        let timestamps: Vec<u64> = (0..8).map(|i| 1_000 + 60 * i).collect();
        let cumulative: Vec<u64> = (0..8).map(|i| 500 * i).collect();
        let outcome = window_retarget::<NativeMul>(&timestamps, &cumulative, 120, WindowParams::new(10, 2)).unwrap();
        assert_eq!(outcome, WindowOutcome::Computed { time_span: 300, total_work: 2_500, difficulty: 1_000 });
    }

    #[test]
    fn test_truncation_keeps_oldest_entries() {
        let mut timestamps: Vec<u64> = (0..12).map(|i| 1_000 + 60 * i).collect();
        let mut cumulative: Vec<u64> = (0..12).map(|i| 500 * i).collect();
        let p = params(10, 2);

        let expected = next_difficulty(&timestamps[..10], &cumulative[..10], 120, 0, &p).unwrap();
        assert_eq!(expected, 1_000);

        // Entries past the window never contribute.
        timestamps[10] = 1;
        timestamps[11] = 1_000_000;
        cumulative[10] = 0;
        cumulative[11] = u64::MAX;
        assert_eq!(next_difficulty(&timestamps, &cumulative, 120, 0, &p).unwrap(), expected);
    }

    #[test]
    fn test_window_switches_at_adjust_height() {
        let timestamps = [1_000, 1_100, 1_150, 1_400, 1_420, 1_500, 1_700, 1_710, 1_900, 2_400];
        let cumulative = [0, 90, 200, 260, 400, 480, 600, 650, 800, 1_000];
        let p = DifficultyParams {
            window: 10,
            cut: 2,
            window_adjust: 6,
            cut_adjust: 0,
            adjust_height: 100,
            ..DifficultyParams::default()
        };

        assert_eq!(next_difficulty(&timestamps, &cumulative, 100, 99, &p).unwrap(), 81);
        assert_eq!(next_difficulty(&timestamps, &cumulative, 100, 100, &p).unwrap(), 96);
    }

    #[test]
    fn test_scaled_work_overflow_reports_overhead() {
        let outcome = window_retarget::<NativeMul>(&[0, 1], &[0, u64::MAX], 2, WindowParams::new(10, 0)).unwrap();
        assert_eq!(outcome, WindowOutcome::Overhead { time_span: 1, total_work: u64::MAX });
        assert_eq!(outcome.difficulty(), 0);

        // The product fits but rounding up overflows.
        let outcome = window_retarget::<PortableMul>(&[0, 2], &[0, u64::MAX], 1, WindowParams::new(10, 0)).unwrap();
        assert_eq!(outcome.difficulty(), DIFFICULTY_OVERHEAD);
    }

    #[test]
    fn test_non_increasing_work_is_rejected() {
        let p = params(10, 0);
        assert_eq!(
            next_difficulty(&[10, 20, 30], &[5, 6, 5], 120, 0, &p),
            Err(ConsensusError::InvalidTotalWork { begin: 0, end: 2 })
        );
        assert_eq!(
            next_difficulty(&[10, 20, 30], &[9, 4, 1], 120, 0, &p),
            Err(ConsensusError::InvalidTotalWork { begin: 0, end: 2 })
        );
    }

    #[test]
    fn test_mismatched_lengths_are_rejected() {
        let err = next_difficulty(&[1, 2, 3], &[1, 2], 120, 0, &params(10, 0)).unwrap_err();
        assert_eq!(err, ConsensusError::WindowLengthMismatch { timestamps: 3, cumulative_difficulties: 2 });
    }

    #[test]
    fn test_invalid_window_is_rejected() {
        let err = window_retarget::<NativeMul>(&[1, 2, 3], &[1, 2, 3], 120, WindowParams::new(6, 3)).unwrap_err();
        assert_eq!(err, ConsensusError::InvalidWindowParams { window: 6, cut: 3 });
    }

    #[test]
    fn test_statistics_are_recorded_for_computed_results() {
        let sink = RecordingSink::default();
        let difficulty = next_difficulty_with_statistics(
            &sink,
            &[100, 105, 110, 115, 120, 125],
            &[0, 10, 20, 30, 40, 50],
            5,
            42,
            &params(6, 0),
        )
        .unwrap();
        assert_eq!(difficulty, 10);
        assert_eq!(*sink.records.lock(), vec![(42, 25, 50, 10)]);
    }

    #[test]
    fn test_bootstrap_and_overhead_are_not_recorded() {
        let sink = RecordingSink::default();
        let p = params(10, 0);
        assert_eq!(next_difficulty_with_statistics(&sink, &[7], &[7], 120, 1, &p).unwrap(), 1);
        assert_eq!(next_difficulty_with_statistics(&sink, &[0, 1], &[0, u64::MAX], 2, 2, &p).unwrap(), 0);
        assert!(sink.records.lock().is_empty());
    }

    #[test]
    fn test_zero_target_is_not_recorded() {
        let sink = RecordingSink::default();
        let difficulty = next_difficulty_with_statistics(&sink, &[100, 200], &[0, 10], 0, 5, &params(10, 0)).unwrap();
        assert_eq!(difficulty, 0);
        assert!(sink.records.lock().is_empty());
    }

    #[test]
    fn test_sink_failure_does_not_change_result() {
        let timestamps: Vec<u64> = (0..8).map(|i| 1_000 + 60 * i).collect();
        let cumulative: Vec<u64> = (0..8).map(|i| 500 * i).collect();
        let p = params(10, 2);
        let plain = next_difficulty(&timestamps, &cumulative, 120, 9, &p).unwrap();
        let recorded = next_difficulty_with_statistics(&FailingSink, &timestamps, &cumulative, 120, 9, &p).unwrap();
        assert_eq!(plain, recorded);
    }

    proptest! {
        #[test]
        fn test_only_cut_endpoints_of_cumulative_difficulty_matter(
            order in Just(vec![0usize, 1, 3, 4, 5, 6, 8, 9]).prop_shuffle(),
            fillers in proptest::collection::vec(any::<u64>(), 8),
        ) {
            // Sorted timestamps with W = 10, C = 2 cut at positions 2 and 7.
            let timestamps: Vec<u64> = (0..10).map(|i| 10_000 + 100 * i).collect();
            let mut cumulative = vec![0u64; 10];
            cumulative[2] = 1_000;
            cumulative[7] = 6_000;
            for (slot, value) in order.iter().zip(fillers.iter()) {
                cumulative[*slot] = *value;
            }

            let outcome = window_retarget::<NativeMul>(&timestamps, &cumulative, 120, WindowParams::new(10, 2)).unwrap();
            prop_assert_eq!(outcome, WindowOutcome::Computed { time_span: 500, total_work: 5_000, difficulty: 1_200 });
        }

        #[test]
        fn test_multipliers_agree(
            timestamps in proptest::collection::vec(0u64..1_000_000, 2..40),
            step in 1u64..u64::MAX / 64,
            target in 1u64..=u64::MAX,
        ) {
            let cumulative: Vec<u64> = (0..timestamps.len() as u64).map(|i| i * step).collect();
            let window = WindowParams::new(30, 5);
            let native = window_retarget::<NativeMul>(&timestamps, &cumulative, target, window).unwrap();
            let portable = window_retarget::<PortableMul>(&timestamps, &cumulative, target, window).unwrap();
            prop_assert_eq!(native, portable);
        }
    }
}
