use consensus_core::{BlockCreateRecord, Difficulty, Hash, StatisticsError, StatisticsRecord, StatisticsSink, StatisticsStore};
use parking_lot::RwLock;
use std::collections::BTreeMap;

/// In-memory statistics store for tests and short-lived tools.
#[derive(Default)]
pub struct MemoryStatisticsStore {
    inner: RwLock<Inner>,
}

#[derive(Default)]
struct Inner {
    next_sequence: u64,
    difficulty: BTreeMap<(u64, u64), StatisticsRecord>,
    blocks: BTreeMap<u64, BlockCreateRecord>,
}

impl MemoryStatisticsStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.inner.read().difficulty.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl StatisticsSink for MemoryStatisticsStore {
    fn record_next_difficulty(
        &self,
        height: u64,
        time_span: u64,
        total_work: u64,
        difficulty: Difficulty,
    ) -> Result<(), StatisticsError> {
        let mut inner = self.inner.write();
        let sequence = inner.next_sequence;
        inner.next_sequence += 1;
        inner.difficulty.insert((height, sequence), StatisticsRecord { height, time_span, total_work, difficulty });
        Ok(())
    }
}

impl StatisticsStore for MemoryStatisticsStore {
    fn query_next_difficulty(&self, from_height: u64, to_height: u64) -> Result<Vec<StatisticsRecord>, StatisticsError> {
        if from_height > to_height {
            return Ok(Vec::new());
        }
        let inner = self.inner.read();
        Ok(inner.difficulty.range((from_height, 0)..=(to_height, u64::MAX)).map(|(_, record)| *record).collect())
    }

    fn insert_block_statistics(
        &self,
        height: u64,
        difficulty: Difficulty,
        create_template_time: u64,
    ) -> Result<(), StatisticsError> {
        self.inner.write().blocks.insert(height, BlockCreateRecord::new(height, difficulty, create_template_time));
        Ok(())
    }

    fn update_block_statistics(
        &self,
        height: u64,
        block_hash: Hash,
        block_nonce: u64,
        notify_block_time: u64,
    ) -> Result<(), StatisticsError> {
        let mut inner = self.inner.write();
        let record = inner.blocks.get_mut(&height).ok_or(StatisticsError::MissingBlock(height))?;
        record.block_hash = Some(block_hash);
        record.block_nonce = Some(block_nonce);
        record.notify_block_time = Some(notify_block_time);
        Ok(())
    }

    fn query_block_statistics(&self, from_height: u64, to_height: u64) -> Result<Vec<BlockCreateRecord>, StatisticsError> {
        if from_height > to_height {
            return Ok(Vec::new());
        }
        let inner = self.inner.read();
        Ok(inner.blocks.range(from_height..=to_height).map(|(_, record)| record.clone()).collect())
    }
}
