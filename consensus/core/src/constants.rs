//! Default consensus constants. Deployments override them through
//! [`DifficultyParams`](crate::DifficultyParams).

/// Target block time in seconds.
pub const DIFFICULTY_TARGET: u64 = 120;

/// Blocks considered by the windowed retarget.
pub const DIFFICULTY_WINDOW: u64 = 720;

/// Timestamps trimmed from each end of the sorted window.
pub const DIFFICULTY_CUT: u64 = 60;

/// Most recent blocks left out of the window.
pub const DIFFICULTY_LAG: u64 = 15;

/// Window size once the adjustment fork is active.
pub const DIFFICULTY_WINDOW_ADJUST: u64 = 360;

/// Cut size once the adjustment fork is active.
pub const DIFFICULTY_CUT_ADJUST: u64 = 30;

/// Height at which the adjusted window and cut take over. Disabled by default.
pub const DIFFICULTY_ADJUST_HEIGHT: u64 = u64::MAX;

/// LWMA averaging window `N`.
pub const LWMA_WINDOW: u64 = 60;

/// Height at which LWMA replaces the windowed retarget. Disabled by default.
pub const LWMA_FORK_HEIGHT: u64 = u64::MAX;

/// Difficulty handed out during the LWMA warm-up after the fork.
pub const LWMA_DIFFICULTY_GUESS: u64 = 100_000;

/// Returned by the windowed retarget when the scaled work does not fit in 64 bits.
pub const DIFFICULTY_OVERHEAD: u64 = 0;
