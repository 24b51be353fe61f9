use std::collections::btree_map::{self, BTreeMap};

use crate::value::{
    binary_placeholder, join_scalars, json_text, Cell, FieldValue, Record, TIMESTAMP_FORMAT,
};

/// Default separator between a parent key and its child keys.
pub const DEFAULT_SEPARATOR: &str = "_";

/// A single-level mapping from flattened path to displayable cell.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FlatRow {
    cells: BTreeMap<String, Cell>,
    overwritten: Vec<String>,
}

impl FlatRow {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a cell; a later write to the same path replaces the earlier one and the
    /// path is remembered in [`FlatRow::overwritten`].
    pub fn insert(&mut self, path: impl Into<String>, cell: Cell) {
        let path = path.into();
        match self.cells.entry(path) {
            btree_map::Entry::Occupied(mut slot) => {
                self.overwritten.push(slot.key().clone());
                slot.insert(cell);
            }
            btree_map::Entry::Vacant(slot) => {
                slot.insert(cell);
            }
        }
    }

    pub fn get(&self, path: &str) -> Option<&Cell> {
        self.cells.get(path)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.cells.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Cell)> {
        self.cells.iter().map(|(key, cell)| (key.as_str(), cell))
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Paths that were written more than once while flattening.
    pub fn overwritten(&self) -> &[String] {
        &self.overwritten
    }

    fn merge(&mut self, child: FlatRow) {
        self.overwritten.extend(child.overwritten);
        for (path, cell) in child.cells {
            self.insert(path, cell);
        }
    }
}

/// Flattens one record into a single-level row, joining nested keys with `separator`.
pub fn flatten(record: &Record, separator: &str) -> FlatRow {
    flatten_with_prefix(record, "", separator)
}

/// Same as [`flatten`], but every produced path is rooted at `prefix`.
pub fn flatten_with_prefix(record: &Record, prefix: &str, separator: &str) -> FlatRow {
    let mut row = FlatRow::new();

    for (key, value) in record.iter() {
        let path = if prefix.is_empty() {
            key.to_string()
        } else {
            format!("{prefix}{separator}{key}")
        };

        match value {
            FieldValue::Nested(child) => {
                row.merge(flatten_with_prefix(child, &path, separator));
            }
            other => row.insert(path, scalar_cell(other)),
        }
    }

    row
}

fn scalar_cell(value: &FieldValue) -> Cell {
    match value {
        FieldValue::Null => Cell::Empty,
        FieldValue::Bool(b) => Cell::Bool(*b),
        FieldValue::Integer(i) => Cell::Integer(*i),
        FieldValue::Float(f) => Cell::Number(*f),
        FieldValue::Text(s) | FieldValue::Reference(s) => Cell::Text(s.clone()),
        FieldValue::Timestamp(ts) => Cell::Text(ts.format(TIMESTAMP_FORMAT).to_string()),
        FieldValue::Binary(bytes) => Cell::Text(binary_placeholder(bytes.len())),
        FieldValue::RecordList(_) => Cell::Text(json_text(&value.to_json())),
        FieldValue::ScalarList(items) => Cell::Text(join_scalars(items)),
        // Only reached for a nested record passed directly, never from `flatten_with_prefix`.
        FieldValue::Nested(record) => Cell::Text(json_text(&record.to_json())),
    }
}
