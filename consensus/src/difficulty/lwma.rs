//! LWMA-1 difficulty retarget (zawy12).
//!
//! Solve times are weighted linearly by recency and capped at six target
//! intervals. All arithmetic wraps on `u64` so results stay bit-identical with
//! the reference implementation on every input.

use consensus_core::{ConsensusError, ConsensusResult, Difficulty};

/// Next difficulty for the block at `height` using LWMA over `window` (`N`)
/// solve times.
///
/// Inputs are oldest first and at most `N + 1` long. During the first `N`
/// heights after `fork_height` the history is too short to be trusted and
/// `difficulty_guess` is returned as is. Otherwise exactly `N + 1` samples are
/// required.
pub fn lwma_next_difficulty(
    timestamps: &[u64],
    cumulative_difficulties: &[Difficulty],
    target_seconds: u64,
    window: u64,
    height: u64,
    fork_height: u64,
    difficulty_guess: Difficulty,
) -> ConsensusResult<Difficulty> {
    if window == 0 {
        return Err(ConsensusError::InvalidLwmaParams("window must be positive"));
    }
    if target_seconds == 0 {
        return Err(ConsensusError::InvalidLwmaParams("target seconds must be positive"));
    }
    if timestamps.len() != cumulative_difficulties.len() {
        return Err(ConsensusError::WindowLengthMismatch {
            timestamps: timestamps.len(),
            cumulative_difficulties: cumulative_difficulties.len(),
        });
    }

    let samples = usize::try_from(window).ok().and_then(|n| n.checked_add(1)).unwrap_or(usize::MAX);
    if timestamps.len() > samples {
        return Err(ConsensusError::WindowTooLong { len: timestamps.len(), max: samples });
    }

    if height >= fork_height && height < fork_height.saturating_add(window) {
        return Ok(difficulty_guess);
    }

    if timestamps.len() != samples {
        return Err(ConsensusError::InsufficientHistory { expected: samples, actual: timestamps.len() });
    }

    let n = window;
    let t = target_seconds;
    let max_solve_time = t.wrapping_mul(6);

    let mut weighted: u64 = 0;
    let mut previous = timestamps[0].wrapping_sub(t);
    for (i, &timestamp) in (1..=n).zip(&timestamps[1..]) {
        // Out-of-sequence timestamps count as a one second solve.
        let this = if timestamp > previous { timestamp } else { previous.wrapping_add(1) };
        let solve_time = max_solve_time.min(this.wrapping_sub(previous));
        weighted = weighted.wrapping_add(i.wrapping_mul(solve_time));
        previous = this;
    }

    let floor = n.wrapping_mul(n).wrapping_mul(t) / 20;
    if weighted < floor {
        weighted = floor;
    }

    let last = samples - 1;
    let avg_difficulty = cumulative_difficulties[last]
        .checked_sub(cumulative_difficulties[0])
        .ok_or(ConsensusError::InvalidTotalWork { begin: 0, end: last })?
        / n;

    let scale = n.wrapping_mul(n.wrapping_add(1)).wrapping_mul(t).wrapping_mul(99);
    let divisor = weighted.wrapping_mul(200);
    if divisor == 0 {
        return Err(ConsensusError::InvalidLwmaParams("weighted solve time overflows"));
    }

    // Divide first for large difficulties to avoid overflow, multiply first for
    // small ones to avoid round-off.
    let threshold = n.wrapping_mul(n).wrapping_mul(t).wrapping_mul(2_000_000);
    let next = if avg_difficulty > threshold {
        (avg_difficulty / divisor).wrapping_mul(scale)
    } else {
        avg_difficulty.wrapping_mul(scale) / divisor
    };

    Ok(round_insignificant_digits(next))
}

/// Zeroes the digits below the leading three or so, rounding to nearest.
fn round_insignificant_digits(value: u64) -> u64 {
    let mut scale: u64 = 1_000_000_000;
    while scale > 1 {
        if value > scale * 100 {
            return (value.wrapping_add(scale / 2) / scale) * scale;
        }
        scale /= 10;
    }
    value
}
