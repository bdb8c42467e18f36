use crate::{Database, DbError, DbResult};
use rocksdb::WriteBatch;
use std::sync::Arc;

pub const NEXT_DIFFICULTY_SEQUENCE: &str = "next_difficulty_sequence";

pub struct MetadataStore {
    db: Arc<Database>,
}

impl MetadataStore {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    pub fn get_u64(&self, key: &str) -> DbResult<Option<u64>> {
        match self.db.get(crate::db::CF_METADATA, key.as_bytes())? {
            Some(bytes) => {
                let raw: [u8; 8] = bytes
                    .as_slice()
                    .try_into()
                    .map_err(|_| DbError::InvalidData(format!("metadata {} is {} bytes", key, bytes.len())))?;
                Ok(Some(u64::from_be_bytes(raw)))
            }
            None => Ok(None),
        }
    }

    pub fn batch_put_u64(&self, batch: &mut WriteBatch, key: &str, value: u64) -> DbResult<()> {
        self.db.batch_put(batch, crate::db::CF_METADATA, key.as_bytes(), &value.to_be_bytes())
    }
}
