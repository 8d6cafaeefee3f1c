// loader/csv_source.rs

use crate::loader::TableSource;
use crate::model::{ColumnType, LoadError, Table};
use csv::{Reader, ReaderBuilder, StringRecord};
use std::io;
use std::path::PathBuf;

pub struct CsvSource {
    path: PathBuf,
}

impl CsvSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl TableSource for CsvSource {
    fn name(&self) -> String {
        self.path.display().to_string()
    }

    fn read_table(&self) -> Result<Table, LoadError> {
        let reader = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_path(&self.path)
            .map_err(|source| self.unreadable(source))?;
        self.read_typed(reader)
    }
}

impl CsvSource {
    fn unreadable(&self, source: csv::Error) -> LoadError {
        LoadError::SourceNotFound {
            path: self.path.clone(),
            source,
        }
    }

    /// Reads every record, then types each column once over all of its fields.
    /// Short records are padded with empty fields; long ones are rejected.
    fn read_typed<R: io::Read>(&self, mut reader: Reader<R>) -> Result<Table, LoadError> {
        let columns: Vec<String> = reader
            .headers()
            .map_err(|e| self.unreadable(e))?
            .iter()
            .map(str::to_string)
            .collect();

        let mut records = Vec::new();
        for record in reader.records() {
            let mut record: StringRecord = record.map_err(|e| self.unreadable(e))?;
            if record.len() > columns.len() {
                return Err(LoadError::RaggedRecord {
                    path: self.path.clone(),
                    line: record.position().map_or(0, |p| p.line()),
                    expected: columns.len(),
                    found: record.len(),
                });
            }
            while record.len() < columns.len() {
                record.push_field("");
            }
            records.push(record);
        }

        let types: Vec<ColumnType> = (0..columns.len())
            .map(|i| ColumnType::infer(records.iter().filter_map(|r| r.get(i))))
            .collect();

        let rows = records
            .iter()
            .map(|record| {
                record
                    .iter()
                    .zip(&types)
                    .map(|(field, ty)| ty.parse(field))
                    .collect()
            })
            .collect();

        Ok(Table { columns, rows })
    }
}
