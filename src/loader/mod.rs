// Loader module: reads both inputs and joins them on the identifier column.

pub mod csv_source;
pub mod join;

pub use csv_source::CsvSource;

use crate::model::{LoadError, Table};
use tracing::{debug, info};

/// Anything that can produce a whole [`Table`] in one read.
pub trait TableSource {
    /// Human-readable name used in errors and logs.
    fn name(&self) -> String;
    fn read_table(&self) -> Result<Table, LoadError>;
}

/// Reads both sources and inner-joins them on `key`.
/// Identifiers present in only one source are dropped without error.
pub fn load(
    messages: &dyn TableSource,
    categories: &dyn TableSource,
    key: &str,
) -> Result<Table, LoadError> {
    let left = messages.read_table()?;
    info!("Read {} message rows from {}", left.len(), messages.name());
    let right = categories.read_table()?;
    info!("Read {} category rows from {}", right.len(), categories.name());

    let left_key = require_column(&left, key, messages)?;
    let right_key = require_column(&right, key, categories)?;

    let joined = join::inner_join(&left, left_key, &right, right_key);
    debug!(
        "Join kept {} rows ({} message rows, {} category rows)",
        joined.len(),
        left.len(),
        right.len()
    );
    Ok(joined)
}

fn require_column(
    table: &Table,
    column: &str,
    source: &dyn TableSource,
) -> Result<usize, LoadError> {
    table.column_index(column).ok_or_else(|| LoadError::Schema {
        source_name: source.name(),
        column: column.to_string(),
    })
}
