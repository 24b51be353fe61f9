use std::collections::BTreeSet;

use crate::flatten::FlatRow;
use crate::value::Cell;

/// A rectangular table: every row has exactly `headers.len()` cells.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<Cell>>,
}

impl Table {
    pub fn width(&self) -> usize {
        self.headers.len()
    }

    pub fn height(&self) -> usize {
        self.rows.len()
    }

    pub fn column(&self, header: &str) -> Option<impl Iterator<Item = &Cell>> {
        let index = self.headers.iter().position(|h| h == header)?;
        Some(self.rows.iter().map(move |row| &row[index]))
    }
}

/// Projects heterogeneous rows onto the sorted union of their keys.
///
/// Returns `None` when there is nothing to export. Headers are ordered by code point
/// and absent keys become [`Cell::Empty`].
pub fn project(rows: &[FlatRow]) -> Option<Table> {
    if rows.is_empty() {
        return None;
    }

    let columns: BTreeSet<&str> = rows.iter().flat_map(FlatRow::keys).collect();
    let headers: Vec<String> = columns.into_iter().map(str::to_string).collect();

    let table_rows = rows
        .iter()
        .map(|row| {
            headers
                .iter()
                .map(|header| row.get(header).cloned().unwrap_or_default())
                .collect()
        })
        .collect();

    Some(Table {
        headers,
        rows: table_rows,
    })
}
