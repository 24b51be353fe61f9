use std::fmt;

use chrono::NaiveDateTime;

use crate::project::Table;
use crate::value::{Cell, TIMESTAMP_FORMAT};

pub const SUMMARY_SHEET_TITLE: &str = "Database Summary";
pub const SUMMARY_HEADERS: [&str; 3] = ["Collection Name", "Document Count", "Export Status"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportStatus {
    Exported,
    Empty,
    Failed(String),
}

impl fmt::Display for ExportStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExportStatus::Exported => f.write_str("Exported"),
            ExportStatus::Empty => f.write_str("Empty"),
            ExportStatus::Failed(message) => write!(f, "Error: {message}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummaryRow {
    pub collection: String,
    pub documents: usize,
    pub status: ExportStatus,
}

/// Lays out the summary report: one row per collection, a blank row, then the run date.
pub fn summary_table(rows: &[SummaryRow], exported_at: NaiveDateTime) -> Table {
    let width = SUMMARY_HEADERS.len();
    let mut table_rows: Vec<Vec<Cell>> = rows
        .iter()
        .map(|row| {
            vec![
                Cell::text(&row.collection),
                Cell::Integer(i64::try_from(row.documents).unwrap_or(i64::MAX)),
                Cell::text(row.status.to_string()),
            ]
        })
        .collect();

    table_rows.push(vec![Cell::Empty; width]);
    table_rows.push(vec![
        Cell::text("Export Date"),
        Cell::text(exported_at.format(TIMESTAMP_FORMAT).to_string()),
        Cell::Empty,
    ]);

    Table {
        headers: SUMMARY_HEADERS.iter().map(|h| h.to_string()).collect(),
        rows: table_rows,
    }
}
