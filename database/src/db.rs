use crate::errors::{DbError, DbResult};
use parking_lot::{Mutex, MutexGuard};
use rocksdb::{ColumnFamilyDescriptor, IteratorMode, Options, WriteBatch, DB};
use std::path::Path;
use std::sync::Arc;

pub const CF_NEXT_DIFFICULTY: &str = "next_difficulty";
pub const CF_BLOCK_CREATE_TIME: &str = "block_create_time";
pub const CF_METADATA: &str = "metadata";

const COLUMN_FAMILIES: [&str; 3] = [CF_NEXT_DIFFICULTY, CF_BLOCK_CREATE_TIME, CF_METADATA];

/// Shared handle to the statistics RocksDB instance.
#[derive(Clone)]
pub struct Database {
    db: Arc<DB>,
    write_lock: Arc<Mutex<()>>,
}

impl Database {
    pub fn open<P: AsRef<Path>>(path: P) -> DbResult<Self> {
        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.create_missing_column_families(true);
        opts.set_keep_log_file_num(10);
        opts.set_max_background_jobs(2);
        opts.set_compression_type(rocksdb::DBCompressionType::Lz4);
        opts.set_write_buffer_size(16 * 1024 * 1024);

        let cf_descriptors: Vec<_> = COLUMN_FAMILIES
            .iter()
            .map(|name| ColumnFamilyDescriptor::new(*name, Options::default()))
            .collect();

        let db = DB::open_cf_descriptors(&opts, path, cf_descriptors)?;
        Ok(Self { db: Arc::new(db), write_lock: Arc::new(Mutex::new(())) })
    }

    /// Serializes read-modify-write sequences across every handle and store on
    /// this database.
    pub fn lock_writes(&self) -> MutexGuard<'_, ()> {
        self.write_lock.lock()
    }

    fn get_cf_handle(&self, cf_name: &str) -> DbResult<&rocksdb::ColumnFamily> {
        self.db.cf_handle(cf_name).ok_or_else(|| DbError::ColumnFamilyNotFound(cf_name.to_string()))
    }

    pub fn put(&self, cf_name: &str, key: &[u8], value: &[u8]) -> DbResult<()> {
        let cf = self.get_cf_handle(cf_name)?;
        self.db.put_cf(cf, key, value)?;
        Ok(())
    }

    pub fn get(&self, cf_name: &str, key: &[u8]) -> DbResult<Option<Vec<u8>>> {
        let cf = self.get_cf_handle(cf_name)?;
        Ok(self.db.get_cf(cf, key)?)
    }

    /// Adds a put to `batch` against the named column family.
    pub fn batch_put(&self, batch: &mut WriteBatch, cf_name: &str, key: &[u8], value: &[u8]) -> DbResult<()> {
        let cf = self.get_cf_handle(cf_name)?;
        batch.put_cf(cf, key, value);
        Ok(())
    }

    pub fn write_batch(&self, batch: WriteBatch) -> DbResult<()> {
        self.db.write(batch)?;
        Ok(())
    }

    pub fn iterator(&self, cf_name: &str, mode: IteratorMode) -> DbResult<rocksdb::DBIteratorWithThreadMode<'_, DB>> {
        let cf = self.get_cf_handle(cf_name)?;
        Ok(self.db.iterator_cf(cf, mode))
    }
}
