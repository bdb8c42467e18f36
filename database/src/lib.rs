pub mod db;
pub mod errors;
pub mod memory;
pub mod statistics;
pub mod stores;

pub use db::Database;
pub use errors::{DbError, DbResult};
pub use memory::MemoryStatisticsStore;
pub use statistics::StatisticsDb;
