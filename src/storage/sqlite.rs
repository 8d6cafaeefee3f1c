use crate::model::{StorageError, Table, Value};
use rusqlite::types::{Null, ToSqlOutput};
use rusqlite::{params_from_iter, Connection, ToSql};
use std::path::{Path, PathBuf};
use tracing::info;

pub struct SqliteStorage {
    conn: Connection,
    path: PathBuf,
}

impl ToSql for Value {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(match self {
            Value::Null => ToSqlOutput::from(Null),
            Value::Integer(i) => ToSqlOutput::from(*i),
            Value::Real(r) => ToSqlOutput::from(*r),
            Value::Text(s) => ToSqlOutput::from(s.as_str()),
        })
    }
}

impl SqliteStorage {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StorageError> {
        let path = path.as_ref().to_path_buf();
        let conn = Connection::open(&path).map_err(|source| StorageError::StoreWrite {
            path: path.clone(),
            source,
        })?;
        Ok(Self { conn, path })
    }

    /// Drops `name` if present and recreates it holding exactly `table`'s rows.
    /// No primary key and no index are created.
    pub fn replace_table(&mut self, table: &Table, name: &str) -> Result<(), StorageError> {
        let written = write_table(&mut self.conn, table, name).map_err(|source| {
            StorageError::StoreWrite {
                path: self.path.clone(),
                source,
            }
        })?;
        info!("Wrote {} rows into `{}` at {}", written, name, self.path.display());
        Ok(())
    }
}

fn write_table(conn: &mut Connection, table: &Table, name: &str) -> rusqlite::Result<usize> {
    let tx = conn.transaction()?;
    let quoted = quote_ident(name);

    let column_defs = table
        .columns
        .iter()
        .enumerate()
        .map(|(i, c)| format!("{} {}", quote_ident(c), table.column_type(i).sql_name()))
        .collect::<Vec<_>>()
        .join(", ");
    tx.execute_batch(&format!(
        "DROP TABLE IF EXISTS {quoted};
         CREATE TABLE {quoted} ({column_defs});"
    ))?;

    let column_list = table
        .columns
        .iter()
        .map(|c| quote_ident(c))
        .collect::<Vec<_>>()
        .join(", ");
    let placeholders = table.columns.iter().map(|_| "?").collect::<Vec<_>>().join(", ");
    let insert = format!("INSERT INTO {quoted} ({column_list}) VALUES ({placeholders})");
    {
        let mut stmt = tx.prepare(&insert)?;
        for row in &table.rows {
            stmt.execute(params_from_iter(row.iter()))?;
        }
    }

    tx.commit()?;
    Ok(table.len())
}

fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}
