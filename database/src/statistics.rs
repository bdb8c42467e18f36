//! RocksDB-backed statistics store.

use crate::stores::{BlockCreateStore, DifficultyStore};
use crate::{Database, DbResult};
use consensus_core::{
    BlockCreateRecord, Difficulty, Hash, LoggedStatistics, StatisticsError, StatisticsRecord, StatisticsSink,
    StatisticsStore,
};
use parking_lot::RwLock;
use std::path::Path;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::{debug, info};

pub struct StatisticsDb {
    difficulty: DifficultyStore,
    blocks: BlockCreateStore,
    statistics_open: RwLock<bool>,
}

impl StatisticsDb {
    /// Opens (or creates) the store at `path` with statistics enabled.
    pub fn open<P: AsRef<Path>>(path: P) -> DbResult<Self> {
        let path = path.as_ref();
        let db = Arc::new(Database::open(path)?);
        let store = Self::with_database(db);
        info!("statistics store opened at {}", path.display());
        Ok(store)
    }

    /// A statistics view over an already open database. Views on the same
    /// database share its record sequence and write lock.
    pub fn with_database(db: Arc<Database>) -> Self {
        Self {
            difficulty: DifficultyStore::new(db.clone()),
            blocks: BlockCreateStore::new(db),
            statistics_open: RwLock::new(true),
        }
    }

    pub fn open_statistics(&self) {
        *self.statistics_open.write() = true;
        debug!("statistics opened");
    }

    /// Rejects every statistics call until [`StatisticsDb::open_statistics`].
    pub fn close_statistics(&self) {
        *self.statistics_open.write() = false;
        debug!("statistics closed");
    }

    pub fn is_statistics_open(&self) -> bool {
        *self.statistics_open.read()
    }

    /// Like [`StatisticsStore::query_next_difficulty`], keeping the log time.
    pub fn query_next_difficulty_entries(
        &self,
        from_height: u64,
        to_height: u64,
    ) -> Result<Vec<LoggedStatistics>, StatisticsError> {
        self.check_open()?;
        Ok(self.difficulty.range(from_height, to_height)?)
    }

    fn check_open(&self) -> Result<(), StatisticsError> {
        if self.is_statistics_open() {
            Ok(())
        } else {
            Err(StatisticsError::Closed)
        }
    }
}

fn unix_now() -> u64 {
    SystemTime::now().duration_since(UNIX_EPOCH).map(|d| d.as_secs()).unwrap_or(0)
}

impl StatisticsSink for StatisticsDb {
    fn record_next_difficulty(
        &self,
        height: u64,
        time_span: u64,
        total_work: u64,
        difficulty: Difficulty,
    ) -> Result<(), StatisticsError> {
        self.check_open()?;
        let record = StatisticsRecord { height, time_span, total_work, difficulty };
        self.difficulty.append(&LoggedStatistics { record, logged_at: unix_now() })?;
        Ok(())
    }
}

impl StatisticsStore for StatisticsDb {
    fn query_next_difficulty(&self, from_height: u64, to_height: u64) -> Result<Vec<StatisticsRecord>, StatisticsError> {
        Ok(self.query_next_difficulty_entries(from_height, to_height)?.into_iter().map(|entry| entry.record).collect())
    }

    fn insert_block_statistics(
        &self,
        height: u64,
        difficulty: Difficulty,
        create_template_time: u64,
    ) -> Result<(), StatisticsError> {
        self.check_open()?;
        self.blocks.put(&BlockCreateRecord::new(height, difficulty, create_template_time))?;
        Ok(())
    }

    fn update_block_statistics(
        &self,
        height: u64,
        block_hash: Hash,
        block_nonce: u64,
        notify_block_time: u64,
    ) -> Result<(), StatisticsError> {
        self.check_open()?;
        self.blocks
            .update(height, |record| {
                record.block_hash = Some(block_hash);
                record.block_nonce = Some(block_nonce);
                record.notify_block_time = Some(notify_block_time);
            })?
            .ok_or(StatisticsError::MissingBlock(height))?;
        Ok(())
    }

    fn query_block_statistics(&self, from_height: u64, to_height: u64) -> Result<Vec<BlockCreateRecord>, StatisticsError> {
        self.check_open()?;
        Ok(self.blocks.range(from_height, to_height)?)
    }

    fn block_statistics(&self, height: u64) -> Result<Option<BlockCreateRecord>, StatisticsError> {
        self.check_open()?;
        Ok(self.blocks.get(height)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_records_share_a_height_in_insertion_order() {
        let tmp = TempDir::new().unwrap();
        let db = StatisticsDb::open(tmp.path()).unwrap();
        db.record_next_difficulty(7, 100, 1_000, 10).unwrap();
        db.record_next_difficulty(7, 200, 1_000, 5).unwrap();
        db.record_next_difficulty(6, 50, 500, 9).unwrap();

        let difficulties: Vec<_> = db.query_next_difficulty_by_height(7).unwrap().iter().map(|r| r.difficulty).collect();
        assert_eq!(difficulties, vec![10, 5]);
        let heights: Vec<_> = db.query_next_difficulty(0, 10).unwrap().iter().map(|r| r.height).collect();
        assert_eq!(heights, vec![6, 7, 7]);
    }

    #[test]
    fn test_exact_height_returns_full_record() {
        let tmp = TempDir::new().unwrap();
        let db = StatisticsDb::open(tmp.path()).unwrap();
        db.record_next_difficulty(41, 1_234, 98_765, 9_601).unwrap();
        db.record_next_difficulty(42, 1_100, 99_000, 10_800).unwrap();

        assert_eq!(
            db.query_next_difficulty_by_height(42).unwrap(),
            vec![StatisticsRecord { height: 42, time_span: 1_100, total_work: 99_000, difficulty: 10_800 }]
        );
    }

    #[test]
    fn test_views_on_one_database_share_the_sequence() {
        let tmp = TempDir::new().unwrap();
        let database = Arc::new(Database::open(tmp.path()).unwrap());
        let first = StatisticsDb::with_database(database.clone());
        let second = StatisticsDb::with_database(database);

        first.record_next_difficulty(7, 100, 1_000, 10).unwrap();
        second.record_next_difficulty(7, 200, 2_000, 20).unwrap();
        first.record_next_difficulty(7, 300, 3_000, 30).unwrap();

        let difficulties: Vec<_> = second.query_next_difficulty_by_height(7).unwrap().iter().map(|r| r.difficulty).collect();
        assert_eq!(difficulties, vec![10, 20, 30]);
    }

    #[test]
    fn test_concurrent_block_updates_keep_every_field() {
        let tmp = TempDir::new().unwrap();
        let db = Arc::new(StatisticsDb::open(tmp.path()).unwrap());

        let handles: Vec<_> = (0..8u64)
            .map(|worker| {
                let db = db.clone();
                std::thread::spawn(move || {
                    for i in 0..25u64 {
                        let height = worker * 100 + i;
                        db.insert_block_statistics(height, height, 1_000).unwrap();
                        db.update_block_statistics(height, Hash::from_le_u64([height, 0, 0, 0]), i, 1_010).unwrap();
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let records = db.query_block_statistics(0, u64::MAX).unwrap();
        assert_eq!(records.len(), 200);
        for record in records {
            assert_eq!(record.block_hash, Some(Hash::from_le_u64([record.height, 0, 0, 0])));
            assert_eq!(record.block_nonce, Some(record.height % 100));
            assert_eq!(record.creation_latency(), Some(10));
        }
    }

    #[test]
    fn test_inverted_range_is_empty() {
        let tmp = TempDir::new().unwrap();
        let db = StatisticsDb::open(tmp.path()).unwrap();
        db.record_next_difficulty(5, 1, 1, 1).unwrap();
        db.insert_block_statistics(5, 1, 1).unwrap();
        assert!(db.query_next_difficulty(6, 4).unwrap().is_empty());
        assert!(db.query_block_statistics(6, 4).unwrap().is_empty());
    }

    #[test]
    fn test_block_statistics_two_step_write() {
        let tmp = TempDir::new().unwrap();
        let db = StatisticsDb::open(tmp.path()).unwrap();
        let hash = Hash::from_le_u64([1, 2, 3, 4]);

        assert_eq!(db.update_block_statistics(3, hash, 9, 100), Err(StatisticsError::MissingBlock(3)));

        db.insert_block_statistics(3, 500, 40).unwrap();
        db.update_block_statistics(3, hash, 9, 100).unwrap();
        let record = db.block_statistics(3).unwrap().unwrap();
        assert_eq!(record.block_hash, Some(hash));
        assert_eq!(record.block_nonce, Some(9));
        assert_eq!(record.creation_latency(), Some(60));
        assert_eq!(db.block_statistics(4).unwrap(), None);
    }
}
