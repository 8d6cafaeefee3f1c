// Storage module: persists the normalized record set.

pub mod sqlite;

pub use sqlite::SqliteStorage;

use crate::model::{StorageError, Table};
use std::path::Path;

/// Writes `table` into `table_name` at `destination`, replacing any table of
/// that name. The connection is closed before returning.
pub fn persist(table: &Table, destination: &Path, table_name: &str) -> Result<(), StorageError> {
    let mut storage = SqliteStorage::open(destination)?;
    storage.replace_table(table, table_name)
}
