pub mod block_create_store;
pub mod difficulty_store;
pub mod metadata_store;

pub use block_create_store::BlockCreateStore;
pub use difficulty_store::DifficultyStore;
pub use metadata_store::MetadataStore;

use crate::{DbError, DbResult};

/// Big-endian so lexicographic key order is numeric order.
pub(crate) fn height_key(height: u64) -> [u8; 8] {
    height.to_be_bytes()
}

pub(crate) fn read_height(key: &[u8]) -> DbResult<u64> {
    key.get(..8)
        .and_then(|prefix| prefix.try_into().ok())
        .map(u64::from_be_bytes)
        .ok_or_else(|| DbError::InvalidData(format!("key of {} bytes has no height prefix", key.len())))
}
