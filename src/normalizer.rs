// Decodes packed category labels into binary columns and drops duplicate records.
use crate::model::{CategorySchema, NormalizeError, Table, Value};
use std::collections::HashSet;
use tracing::{debug, info, warn};

/// Category whose tri-state `2` label is folded into `1`.
pub const RELATED: &str = "related";

/// Replaces `packed_column` with one 0/1 column per category and removes
/// duplicate records. The category columns are appended after the remaining
/// original columns, in schema order. Every row must carry the schema's
/// names in the schema's order.
pub fn normalize(table: Table, packed_column: &str) -> Result<Table, NormalizeError> {
    let packed = table.column_index(packed_column).ok_or_else(|| {
        NormalizeError::Schema(format!("packed category column `{}` is missing", packed_column))
    })?;

    if table.is_empty() {
        warn!("No records to normalize");
    }
    let schema = match table.rows.first() {
        Some(row) => derive_schema(packed_text(&row[packed], 0)?)?,
        None => CategorySchema::default(),
    };
    debug!("Category schema: {:?}", schema.names);

    let kept: Vec<String> = table
        .columns
        .iter()
        .enumerate()
        .filter(|(i, _)| *i != packed)
        .map(|(_, c)| c.clone())
        .collect();
    check_collisions(&kept, &schema)?;

    let related = schema.position(RELATED);
    let mut out_of_range = 0usize;
    let mut columns = kept;
    columns.extend(schema.names.iter().cloned());
    let mut normalized = Table::new(columns);

    for (row_no, mut row) in table.rows.into_iter().enumerate() {
        let packed_value = row.remove(packed);
        let mut labels = decode_row(packed_text(&packed_value, row_no)?, &schema, row_no)?;
        if let Some(i) = related {
            if labels[i] == 2 {
                labels[i] = 1;
            }
        }
        out_of_range += labels.iter().filter(|&&l| l > 1).count();
        row.extend(labels.into_iter().map(|l| Value::Integer(i64::from(l))));
        normalized.rows.push(row);
    }

    if out_of_range > 0 {
        warn!("{} category labels outside 0/1 were left as-is", out_of_range);
    }

    let before = normalized.len();
    let normalized = drop_duplicates(normalized);
    info!(
        "Normalized {} records into {} categories, dropped {} duplicates",
        before,
        schema.len(),
        before - normalized.len()
    );
    Ok(normalized)
}

/// Builds the category schema from one packed label: each token minus its
/// trailing `-digit`.
pub fn derive_schema(packed: &str) -> Result<CategorySchema, NormalizeError> {
    let names = packed
        .split(';')
        .map(|token| split_token(token, 0).map(|(name, _)| name.to_string()))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(CategorySchema { names })
}

/// Removes exact duplicate rows, keeping the first occurrence in order.
pub fn drop_duplicates(mut table: Table) -> Table {
    let mut seen = HashSet::with_capacity(table.rows.len());
    table.rows.retain(|row| seen.insert(row.clone()));
    table
}

fn packed_text(value: &Value, row: usize) -> Result<&str, NormalizeError> {
    match value {
        Value::Text(s) => Ok(s),
        other => Err(NormalizeError::Format {
            row,
            token: other.to_string(),
            reason: "packed label is not text",
        }),
    }
}

fn decode_row(
    packed: &str,
    schema: &CategorySchema,
    row: usize,
) -> Result<Vec<u32>, NormalizeError> {
    let mut labels = Vec::with_capacity(schema.len());
    for (i, token) in packed.split(';').enumerate() {
        let Some(expected) = schema.names.get(i) else {
            return Err(NormalizeError::Format {
                row,
                token: token.to_string(),
                reason: "more tokens than the category schema",
            });
        };
        let (name, digit) = split_token(token, row)?;
        if name != expected {
            return Err(NormalizeError::Format {
                row,
                token: token.to_string(),
                reason: "category name out of schema order",
            });
        }
        labels.push(digit);
    }
    if labels.len() < schema.len() {
        return Err(NormalizeError::Format {
            row,
            token: packed.to_string(),
            reason: "fewer tokens than the category schema",
        });
    }
    Ok(labels)
}

/// Splits `name-d` into its name (everything but the last two characters,
/// possibly empty) and its trailing digit.
fn split_token(token: &str, row: usize) -> Result<(&str, u32), NormalizeError> {
    let malformed = |reason| NormalizeError::Format {
        row,
        token: token.to_string(),
        reason,
    };
    let mut chars = token.char_indices().rev();
    let (_, last) = chars.next().ok_or_else(|| malformed("empty token"))?;
    let (name_end, _) = chars
        .next()
        .ok_or_else(|| malformed("token shorter than two characters"))?;
    let digit = last
        .to_digit(10)
        .ok_or_else(|| malformed("label is not a decimal digit"))?;
    Ok((&token[..name_end], digit))
}

fn check_collisions(columns: &[String], schema: &CategorySchema) -> Result<(), NormalizeError> {
    let mut taken: HashSet<&str> = columns.iter().map(String::as_str).collect();
    for name in &schema.names {
        if !taken.insert(name) {
            return Err(NormalizeError::Schema(format!(
                "category `{}` collides with an existing column",
                name
            )));
        }
    }
    Ok(())
}
