// loader/join.rs

use crate::model::{Table, Value};
use std::collections::{HashMap, HashSet};

/// Inner join of `left` and `right` on the given key columns.
///
/// Keys are matched on their text rendering so `1` in one file meets `1` in
/// the other regardless of inferred column type. Every matching pair is
/// emitted; output follows `left` order, then `right` order within a key.
/// Columns are all of `left`'s, then `right`'s minus its key. A non-key name
/// present on both sides gets `_x` / `_y` suffixes.
pub fn inner_join(left: &Table, left_key: usize, right: &Table, right_key: usize) -> Table {
    let mut index: HashMap<String, Vec<usize>> = HashMap::new();
    for (i, row) in right.rows.iter().enumerate() {
        index.entry(row[right_key].to_string()).or_default().push(i);
    }

    let mut joined = Table::new(joined_columns(left, left_key, right, right_key));
    for row in &left.rows {
        let Some(matches) = index.get(&row[left_key].to_string()) else {
            continue;
        };
        for &i in matches {
            let mut out: Vec<Value> = Vec::with_capacity(joined.columns.len());
            out.extend(row.iter().cloned());
            out.extend(
                right.rows[i]
                    .iter()
                    .enumerate()
                    .filter(|(j, _)| *j != right_key)
                    .map(|(_, v)| v.clone()),
            );
            joined.rows.push(out);
        }
    }
    joined
}

fn joined_columns(left: &Table, left_key: usize, right: &Table, right_key: usize) -> Vec<String> {
    let left_names: HashSet<&str> = left
        .columns
        .iter()
        .enumerate()
        .filter(|(i, _)| *i != left_key)
        .map(|(_, c)| c.as_str())
        .collect();
    let right_names: HashSet<&str> = right
        .columns
        .iter()
        .enumerate()
        .filter(|(i, _)| *i != right_key)
        .map(|(_, c)| c.as_str())
        .collect();

    let left_cols = left.columns.iter().enumerate().map(|(i, c)| {
        if i != left_key && right_names.contains(c.as_str()) {
            format!("{}_x", c)
        } else {
            c.clone()
        }
    });
    let right_cols = right
        .columns
        .iter()
        .enumerate()
        .filter(|(i, _)| *i != right_key)
        .map(|(_, c)| {
            if left_names.contains(c.as_str()) {
                format!("{}_y", c)
            } else {
                c.clone()
            }
        });
    left_cols.chain(right_cols).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(s: &str) -> Value {
        Value::Text(s.to_string())
    }

    #[test]
    fn duplicate_keys_produce_every_pair() {
        let left = Table {
            columns: vec!["id".into(), "message".into()],
            rows: vec![vec![Value::Integer(7), text("help")]],
        };
        let right = Table {
            columns: vec!["id".into(), "categories".into()],
            rows: vec![
                vec![Value::Integer(7), text("related-1")],
                vec![Value::Integer(7), text("related-0")],
            ],
        };

        let joined = inner_join(&left, 0, &right, 0);

        assert_eq!(joined.len(), 2);
        assert_eq!(joined.rows[0][2], text("related-1"));
        assert_eq!(joined.rows[1][2], text("related-0"));
    }

    #[test]
    fn overlapping_columns_are_suffixed() {
        let left = Table {
            columns: vec!["id".into(), "genre".into()],
            rows: vec![vec![Value::Integer(1), text("news")]],
        };
        let right = Table {
            columns: vec!["genre".into(), "id".into()],
            rows: vec![vec![text("direct"), Value::Integer(1)]],
        };

        let joined = inner_join(&left, 0, &right, 1);

        assert_eq!(joined.columns, vec!["id", "genre_x", "genre_y"]);
        assert_eq!(joined.rows, vec![vec![Value::Integer(1), text("news"), text("direct")]]);
    }

    #[test]
    fn keys_match_across_column_types() {
        let left = Table {
            columns: vec!["id".into()],
            rows: vec![vec![Value::Integer(12)], vec![Value::Integer(13)]],
        };
        let right = Table {
            columns: vec!["id".into(), "categories".into()],
            rows: vec![vec![text("12"), text("offer-1")]],
        };

        let joined = inner_join(&left, 0, &right, 0);

        assert_eq!(joined.rows, vec![vec![Value::Integer(12), text("offer-1")]]);
    }
}
