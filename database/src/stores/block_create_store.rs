use super::{height_key, read_height};
use crate::{Database, DbResult};
use consensus_core::BlockCreateRecord;
use rocksdb::{Direction, IteratorMode};
use std::sync::Arc;

/// Block creation timing, one record per height.
pub struct BlockCreateStore {
    db: Arc<Database>,
}

impl BlockCreateStore {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    /// Inserts or replaces the record at `record.height`.
    pub fn put(&self, record: &BlockCreateRecord) -> DbResult<()> {
        let _guard = self.db.lock_writes();
        self.write(record)
    }

    /// Applies `f` to the stored record at `height` and writes it back, returning
    /// the new record or `None` when nothing is stored there.
    pub fn update<F>(&self, height: u64, f: F) -> DbResult<Option<BlockCreateRecord>>
    where
        F: FnOnce(&mut BlockCreateRecord),
    {
        let _guard = self.db.lock_writes();
        let Some(mut record) = self.get(height)? else {
            return Ok(None);
        };
        f(&mut record);
        self.write(&record)?;
        Ok(Some(record))
    }

    fn write(&self, record: &BlockCreateRecord) -> DbResult<()> {
        let serialized = bincode::serialize(record)?;
        self.db.put(crate::db::CF_BLOCK_CREATE_TIME, &height_key(record.height), &serialized)
    }

    pub fn get(&self, height: u64) -> DbResult<Option<BlockCreateRecord>> {
        match self.db.get(crate::db::CF_BLOCK_CREATE_TIME, &height_key(height))? {
            Some(data) => Ok(Some(bincode::deserialize(&data)?)),
            None => Ok(None),
        }
    }

    pub fn range(&self, from_height: u64, to_height: u64) -> DbResult<Vec<BlockCreateRecord>> {
        let mut records = Vec::new();
        if from_height > to_height {
            return Ok(records);
        }

        let start = height_key(from_height);
        let iter = self.db.iterator(crate::db::CF_BLOCK_CREATE_TIME, IteratorMode::From(&start, Direction::Forward))?;
        for item in iter {
            let (key, value) = item?;
            if read_height(&key)? > to_height {
                break;
            }
            records.push(bincode::deserialize(&value)?);
        }
        Ok(records)
    }
}
