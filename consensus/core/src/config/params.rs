use crate::constants::*;
use crate::errors::{ConsensusError, ConsensusResult};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::debug;

/// Window and cut sizes in effect at a given height.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowParams {
    /// Maximum number of blocks considered.
    pub window: u64,
    /// Timestamps trimmed from each end of the sorted window.
    pub cut: u64,
}

impl WindowParams {
    pub fn new(window: u64, cut: u64) -> Self {
        Self { window, cut }
    }

    /// Checks `window >= 2` and `2 * cut <= window - 2`, which keeps at least two
    /// samples after trimming.
    pub fn validate(&self) -> ConsensusResult<()> {
        let invalid = ConsensusError::InvalidWindowParams { window: self.window, cut: self.cut };
        if self.window < 2 {
            return Err(invalid);
        }
        match self.cut.checked_mul(2) {
            Some(trimmed) if trimmed <= self.window - 2 => Ok(()),
            _ => Err(invalid),
        }
    }

    /// Samples left once `cut` is trimmed from both ends of a full window.
    pub fn kept(&self) -> u64 {
        self.window - 2 * self.cut
    }
}

/// LWMA retarget parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LwmaParams {
    /// Averaging window `N`; the algorithm reads `N + 1` samples.
    pub window: u64,
    /// First height retargeted by LWMA.
    pub fork_height: u64,
    /// Difficulty returned for heights in `[fork_height, fork_height + window)`.
    pub difficulty_guess: u64,
}

impl Default for LwmaParams {
    fn default() -> Self {
        Self { window: LWMA_WINDOW, fork_height: LWMA_FORK_HEIGHT, difficulty_guess: LWMA_DIFFICULTY_GUESS }
    }
}

impl LwmaParams {
    pub fn validate(&self) -> ConsensusResult<()> {
        if self.window == 0 {
            return Err(ConsensusError::InvalidLwmaParams("window must be positive"));
        }
        Ok(())
    }

    /// Whether LWMA governs `height`.
    pub fn is_active(&self, height: u64) -> bool {
        height >= self.fork_height
    }
}

/// Difficulty retarget configuration for one network.
///
/// Fork heights are deployment specific, so everything here can be supplied from
/// a TOML file instead of relying on the compiled-in defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DifficultyParams {
    pub network: String,
    /// Target seconds between blocks.
    pub target_seconds: u64,
    pub window: u64,
    pub cut: u64,
    /// Most recent blocks supplied by callers but left out of the window.
    pub lag: u64,
    pub window_adjust: u64,
    pub cut_adjust: u64,
    /// Height from which `window_adjust` and `cut_adjust` apply.
    pub adjust_height: u64,
    pub lwma: LwmaParams,
}

impl Default for DifficultyParams {
    fn default() -> Self {
        Self {
            network: "mainnet".to_string(),
            target_seconds: DIFFICULTY_TARGET,
            window: DIFFICULTY_WINDOW,
            cut: DIFFICULTY_CUT,
            lag: DIFFICULTY_LAG,
            window_adjust: DIFFICULTY_WINDOW_ADJUST,
            cut_adjust: DIFFICULTY_CUT_ADJUST,
            adjust_height: DIFFICULTY_ADJUST_HEIGHT,
            lwma: LwmaParams::default(),
        }
    }
}

impl DifficultyParams {
    /// Loads parameters from a TOML file, falling back to defaults when the file
    /// does not exist.
    pub fn load(path: &Path) -> ConsensusResult<Self> {
        if !path.exists() {
            debug!("difficulty config {} not found, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)
            .map_err(|e| ConsensusError::Config(format!("Failed to read difficulty config: {}", e)))?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> ConsensusResult<Self> {
        let params: Self = toml::from_str(content)
            .map_err(|e| ConsensusError::Config(format!("Failed to parse difficulty config: {}", e)))?;
        params.validate()?;
        Ok(params)
    }

    /// Built-in parameters for a named network.
    pub fn for_network(network: &str) -> ConsensusResult<Self> {
        let mut params = Self::default();
        match network {
            "mainnet" => {}
            "testnet" => {
                params.network = "testnet".to_string();
                params.adjust_height = 1_000;
            }
            "devnet" => {
                params.network = "devnet".to_string();
                params.target_seconds = 10;
                params.window = 60;
                params.cut = 6;
                params.lag = 0;
                params.window_adjust = 30;
                params.cut_adjust = 3;
                params.adjust_height = 100;
                params.lwma = LwmaParams { window: 20, fork_height: 500, difficulty_guess: 1_000 };
            }
            _ => return Err(ConsensusError::Config(format!("Unknown network: {}", network))),
        }
        Ok(params)
    }

    pub fn validate(&self) -> ConsensusResult<()> {
        if self.target_seconds == 0 {
            return Err(ConsensusError::Config("target_seconds must be positive".to_string()));
        }
        WindowParams::new(self.window, self.cut).validate()?;
        WindowParams::new(self.window_adjust, self.cut_adjust).validate()?;
        self.lwma.validate()
    }

    /// Window and cut in effect at `height`.
    pub fn window_for(&self, height: u64) -> WindowParams {
        if height >= self.adjust_height {
            WindowParams::new(self.window_adjust, self.cut_adjust)
        } else {
            WindowParams::new(self.window, self.cut)
        }
    }

    /// Trailing blocks a caller should hand to the windowed retarget at `height`.
    pub fn window_blocks_count(&self, height: u64) -> u64 {
        self.window_for(height).window.saturating_add(self.lag)
    }
}
