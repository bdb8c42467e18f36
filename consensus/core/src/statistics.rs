//! Statistics recorded around difficulty adjustment and block creation.
//!
//! The retarget code only ever sees [`StatisticsSink`]. Storage engines implement
//! [`StatisticsStore`] on top of it for operational queries.

use crate::{Difficulty, Hash};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Inputs and output of one windowed retarget.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatisticsRecord {
    pub height: u64,
    pub time_span: u64,
    pub total_work: u64,
    pub difficulty: Difficulty,
}

/// A stored [`StatisticsRecord`] with the unix time it was written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggedStatistics {
    pub record: StatisticsRecord,
    pub logged_at: u64,
}

/// Block creation timing, keyed by height.
///
/// Written in two steps: the template fields when a block template is built,
/// then hash, nonce and notify time once the block is found.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockCreateRecord {
    pub height: u64,
    pub difficulty: Difficulty,
    pub create_template_time: u64,
    pub block_hash: Option<Hash>,
    pub block_nonce: Option<u64>,
    pub notify_block_time: Option<u64>,
}

impl BlockCreateRecord {
    pub fn new(height: u64, difficulty: Difficulty, create_template_time: u64) -> Self {
        Self { height, difficulty, create_template_time, block_hash: None, block_nonce: None, notify_block_time: None }
    }

    /// Seconds between template creation and block notification, if notified.
    pub fn creation_latency(&self) -> Option<u64> {
        self.notify_block_time.map(|notify| notify.saturating_sub(self.create_template_time))
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StatisticsError {
    #[error("Statistics are closed")]
    Closed,

    #[error("No block statistics at height {0}")]
    MissingBlock(u64),

    #[error("Statistics backend error: {0}")]
    Backend(String),
}

/// Receiver of retarget statistics. Failures are reported but never affect the
/// computed difficulty.
pub trait StatisticsSink: Send + Sync {
    fn record_next_difficulty(
        &self,
        height: u64,
        time_span: u64,
        total_work: u64,
        difficulty: Difficulty,
    ) -> Result<(), StatisticsError>;
}

/// Append and range-query access to the recorded statistics. Ranges are
/// inclusive on both ends and results are ordered by height.
pub trait StatisticsStore: StatisticsSink {
    fn query_next_difficulty(&self, from_height: u64, to_height: u64) -> Result<Vec<StatisticsRecord>, StatisticsError>;

    fn query_next_difficulty_by_height(&self, height: u64) -> Result<Vec<StatisticsRecord>, StatisticsError> {
        self.query_next_difficulty(height, height)
    }

    /// Inserts or replaces the template half of a block creation record.
    fn insert_block_statistics(
        &self,
        height: u64,
        difficulty: Difficulty,
        create_template_time: u64,
    ) -> Result<(), StatisticsError>;

    /// Completes the record at `height`; fails with [`StatisticsError::MissingBlock`]
    /// when no template was recorded.
    fn update_block_statistics(
        &self,
        height: u64,
        block_hash: Hash,
        block_nonce: u64,
        notify_block_time: u64,
    ) -> Result<(), StatisticsError>;

    fn query_block_statistics(&self, from_height: u64, to_height: u64) -> Result<Vec<BlockCreateRecord>, StatisticsError>;

    fn block_statistics(&self, height: u64) -> Result<Option<BlockCreateRecord>, StatisticsError> {
        Ok(self.query_block_statistics(height, height)?.into_iter().next())
    }
}
