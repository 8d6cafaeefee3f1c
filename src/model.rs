// Core types: Value, Table, CategorySchema and the per-stage errors
use std::fmt;
use std::hash::{Hash, Hasher};
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Clone)]
pub enum Value {
    Null,
    Integer(i64),
    Real(f64),
    Text(String),
}

// Reals compare by bit pattern so that whole rows can be used as set keys.
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Integer(a), Value::Integer(b)) => a == b,
            (Value::Real(a), Value::Real(b)) => a.to_bits() == b.to_bits(),
            (Value::Text(a), Value::Text(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for Value {}

impl Hash for Value {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            Value::Null => {}
            Value::Integer(i) => i.hash(state),
            Value::Real(f) => f.to_bits().hash(state),
            Value::Text(s) => s.hash(state),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => Ok(()),
            Value::Integer(i) => write!(f, "{}", i),
            Value::Real(r) => write!(f, "{}", r),
            Value::Text(s) => f.write_str(s),
        }
    }
}

/// Storage class of a whole column, inferred once from its fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
    Integer,
    Real,
    Text,
}

impl ColumnType {
    /// Picks the narrowest type every non-empty field fits into.
    pub fn infer<'a>(fields: impl IntoIterator<Item = &'a str>) -> Self {
        let mut ty = ColumnType::Integer;
        for field in fields.into_iter().filter(|f| !f.is_empty()) {
            let field = field.trim();
            if ty == ColumnType::Integer && field.parse::<i64>().is_err() {
                ty = ColumnType::Real;
            }
            if ty == ColumnType::Real && field.parse::<f64>().is_err() {
                return ColumnType::Text;
            }
        }
        ty
    }

    // Empty fields are always `Null`.
    pub fn parse(self, field: &str) -> Value {
        if field.is_empty() {
            return Value::Null;
        }
        match self {
            ColumnType::Integer => field
                .trim()
                .parse()
                .map(Value::Integer)
                .unwrap_or_else(|_| Value::Text(field.to_string())),
            ColumnType::Real => field
                .trim()
                .parse()
                .map(Value::Real)
                .unwrap_or_else(|_| Value::Text(field.to_string())),
            ColumnType::Text => Value::Text(field.to_string()),
        }
    }

    pub fn sql_name(self) -> &'static str {
        match self {
            ColumnType::Integer => "INTEGER",
            ColumnType::Real => "REAL",
            ColumnType::Text => "TEXT",
        }
    }
}

/// In-memory record set: ordered column names and rows of equal width.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Value>>,
}

impl Table {
    pub fn new(columns: Vec<String>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Storage class for the column at `index`, judged from the values it holds.
    /// A column with no non-null values is `Text`.
    pub fn column_type(&self, index: usize) -> ColumnType {
        let mut ty = None;
        for value in self.rows.iter().map(|row| &row[index]) {
            ty = match (ty, value) {
                (_, Value::Null) => ty,
                (_, Value::Text(_)) => return ColumnType::Text,
                (None | Some(ColumnType::Integer), Value::Integer(_)) => Some(ColumnType::Integer),
                (_, Value::Integer(_) | Value::Real(_)) => Some(ColumnType::Real),
            };
        }
        ty.unwrap_or(ColumnType::Text)
    }
}

/// Ordered category names decoded from a packed label field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CategorySchema {
    pub names: Vec<String>,
}

impl CategorySchema {
    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn position(&self, name: &str) -> Option<usize> {
        self.names.iter().position(|n| n == name)
    }
}

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("cannot read source {}: {source}", .path.display())]
    SourceNotFound {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
    #[error(
        "source {} line {line}: expected {expected} fields, saw {found}",
        .path.display()
    )]
    RaggedRecord {
        path: PathBuf,
        line: u64,
        expected: usize,
        found: usize,
    },
    #[error("source {source_name} has no `{column}` column")]
    Schema { source_name: String, column: String },
}

#[derive(Debug, Error)]
pub enum NormalizeError {
    #[error("record {row}: malformed category token `{token}`: {reason}")]
    Format {
        row: usize,
        token: String,
        reason: &'static str,
    },
    #[error("schema error: {0}")]
    Schema(String),
}

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("cannot write store {}: {source}", .path.display())]
    StoreWrite {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },
}

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Load(#[from] LoadError),
    #[error(transparent)]
    Normalize(#[from] NormalizeError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn infers_narrowest_column_type() {
        assert_eq!(ColumnType::infer(["1", "", "42"]), ColumnType::Integer);
        assert_eq!(ColumnType::infer(["1", "2.5"]), ColumnType::Real);
        assert_eq!(ColumnType::infer(["1", "flood"]), ColumnType::Text);
        assert_eq!(ColumnType::infer(["", ""]), ColumnType::Integer);
    }

    #[test]
    fn empty_fields_parse_to_null() {
        assert_eq!(ColumnType::Integer.parse(""), Value::Null);
        assert_eq!(ColumnType::Text.parse(""), Value::Null);
        assert_eq!(ColumnType::Integer.parse("7"), Value::Integer(7));
    }

    #[test]
    fn column_type_widens_integer_to_real() {
        let table = Table {
            columns: vec!["a".into(), "b".into(), "c".into()],
            rows: vec![
                vec![Value::Integer(1), Value::Integer(1), Value::Null],
                vec![Value::Null, Value::Real(0.5), Value::Null],
            ],
        };
        assert_eq!(table.column_type(0), ColumnType::Integer);
        assert_eq!(table.column_type(1), ColumnType::Real);
        assert_eq!(table.column_type(2), ColumnType::Text);
    }

    #[test]
    fn reals_hash_and_compare_by_bits() {
        use std::collections::HashSet;
        let mut set = HashSet::new();
        assert!(set.insert(vec![Value::Real(f64::NAN)]));
        assert!(!set.insert(vec![Value::Real(f64::NAN)]));
        assert_ne!(Value::Integer(1), Value::Real(1.0));
    }
}
