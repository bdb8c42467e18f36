use super::metadata_store::NEXT_DIFFICULTY_SEQUENCE;
use super::{height_key, read_height, MetadataStore};
use crate::{Database, DbResult};
use consensus_core::LoggedStatistics;
use rocksdb::{Direction, IteratorMode, WriteBatch};
use std::sync::Arc;

/// Append-only log of retarget statistics.
///
/// Several records may share a height (reorgs, repeated template builds), so
/// keys are `height ++ sequence` with a database-wide sequence persisted in the
/// metadata column family.
pub struct DifficultyStore {
    db: Arc<Database>,
    metadata: MetadataStore,
}

impl DifficultyStore {
    pub fn new(db: Arc<Database>) -> Self {
        let metadata = MetadataStore::new(db.clone());
        Self { db, metadata }
    }

    pub fn append(&self, entry: &LoggedStatistics) -> DbResult<()> {
        let serialized = bincode::serialize(entry)?;
        let _guard = self.db.lock_writes();
        let sequence = self.metadata.get_u64(NEXT_DIFFICULTY_SEQUENCE)?.unwrap_or(0);

        let mut key = [0u8; 16];
        key[..8].copy_from_slice(&height_key(entry.record.height));
        key[8..].copy_from_slice(&sequence.to_be_bytes());

        let mut batch = WriteBatch::default();
        self.db.batch_put(&mut batch, crate::db::CF_NEXT_DIFFICULTY, &key, &serialized)?;
        self.metadata.batch_put_u64(&mut batch, NEXT_DIFFICULTY_SEQUENCE, sequence + 1)?;
        self.db.write_batch(batch)
    }

    /// Entries with `from_height <= height <= to_height`, ordered by height then
    /// insertion.
    pub fn range(&self, from_height: u64, to_height: u64) -> DbResult<Vec<LoggedStatistics>> {
        let mut entries = Vec::new();
        if from_height > to_height {
            return Ok(entries);
        }

        let start = height_key(from_height);
        let iter = self.db.iterator(crate::db::CF_NEXT_DIFFICULTY, IteratorMode::From(&start, Direction::Forward))?;
        for item in iter {
            let (key, value) = item?;
            if read_height(&key)? > to_height {
                break;
            }
            entries.push(bincode::deserialize(&value)?);
        }
        Ok(entries)
    }
}
