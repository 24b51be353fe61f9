use std::path::Path;

use rust_xlsxwriter::{Color, Format, FormatAlign, Workbook, Worksheet, XlsxError};
use tracing::debug;

use crate::error::{ExportError, Result};
use crate::naming::sanitize_sheet_title;
use crate::project::Table;
use crate::value::Cell;

pub const DEFAULT_MAX_COLUMN_WIDTH: usize = 50;
pub const DEFAULT_FALLBACK_TITLE: &str = "Sheet";

/// Longest string a single xlsx cell can hold.
pub const MAX_CELL_CHARS: usize = 32_767;

const HEADER_FILL: u32 = 0x366092;
const COLUMN_PADDING: usize = 2;
// Integers outside this range lose precision as spreadsheet numbers.
const MAX_SAFE_INTEGER: u64 = 1 << 53;

/// Writes a [`Table`] as a single styled worksheet.
#[derive(Debug, Clone)]
pub struct SheetWriter {
    max_column_width: usize,
    fallback_title: String,
}

impl Default for SheetWriter {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_COLUMN_WIDTH)
    }
}

impl SheetWriter {
    pub fn new(max_column_width: usize) -> Self {
        Self {
            max_column_width,
            fallback_title: DEFAULT_FALLBACK_TITLE.to_string(),
        }
    }

    pub fn with_fallback_title(mut self, title: impl Into<String>) -> Self {
        self.fallback_title = title.into();
        self
    }

    /// Persists `table` to `path`, replacing any existing file.
    pub fn write(&self, table: &Table, path: &Path, title: &str) -> Result<()> {
        self.write_workbook(table, path, title)
            .map_err(|source| ExportError::Workbook {
                path: path.to_path_buf(),
                source,
            })
    }

    fn write_workbook(
        &self,
        table: &Table,
        path: &Path,
        title: &str,
    ) -> std::result::Result<(), XlsxError> {
        let mut workbook = Workbook::new();
        let worksheet = workbook.add_worksheet();
        worksheet.set_name(sanitize_sheet_title(title, &self.fallback_title))?;

        let header_format = header_format();
        for (col, header) in table.headers.iter().enumerate() {
            worksheet.write_string_with_format(0, col_index(col), header, &header_format)?;
        }

        for (row_idx, row) in table.rows.iter().enumerate() {
            let row_num = u32::try_from(row_idx + 1).unwrap_or(u32::MAX);
            for (col, cell) in row.iter().enumerate() {
                write_cell(worksheet, row_num, col_index(col), cell)?;
            }
        }

        for (col, width) in self.column_widths(table).into_iter().enumerate() {
            worksheet.set_column_width(col_index(col), width as f64)?;
        }

        workbook.save(path)?;
        debug!(path = %path.display(), rows = table.height(), "workbook saved");
        Ok(())
    }

    /// Longest rendered value per column plus padding, clamped to the configured maximum.
    pub fn column_widths(&self, table: &Table) -> Vec<usize> {
        table
            .headers
            .iter()
            .enumerate()
            .map(|(col, header)| {
                let longest = table
                    .rows
                    .iter()
                    .filter_map(|row| row.get(col))
                    .map(|cell| cell.to_string().chars().count().min(MAX_CELL_CHARS))
                    .chain(std::iter::once(header.chars().count()))
                    .max()
                    .unwrap_or(0);
                (longest + COLUMN_PADDING).min(self.max_column_width)
            })
            .collect()
    }
}

fn header_format() -> Format {
    Format::new()
        .set_bold()
        .set_font_size(11)
        .set_font_color(Color::White)
        .set_background_color(Color::RGB(HEADER_FILL))
        .set_align(FormatAlign::Center)
        .set_align(FormatAlign::VerticalCenter)
}

// Out-of-range columns are left for the writer to reject.
fn col_index(col: usize) -> u16 {
    u16::try_from(col).unwrap_or(u16::MAX)
}

fn write_cell(
    worksheet: &mut Worksheet,
    row: u32,
    col: u16,
    cell: &Cell,
) -> std::result::Result<(), XlsxError> {
    match cell {
        Cell::Empty => {}
        Cell::Text(text) => {
            worksheet.write_string(row, col, truncate_cell_text(text))?;
        }
        Cell::Integer(value) if value.unsigned_abs() <= MAX_SAFE_INTEGER => {
            worksheet.write_number(row, col, *value as f64)?;
        }
        Cell::Integer(value) => {
            worksheet.write_string(row, col, value.to_string())?;
        }
        Cell::Number(value) if value.is_finite() => {
            worksheet.write_number(row, col, *value)?;
        }
        Cell::Number(value) => {
            worksheet.write_string(row, col, value.to_string())?;
        }
        Cell::Bool(value) => {
            worksheet.write_boolean(row, col, *value)?;
        }
    }
    Ok(())
}

fn truncate_cell_text(text: &str) -> &str {
    match text.char_indices().nth(MAX_CELL_CHARS) {
        Some((byte_idx, _)) => &text[..byte_idx],
        None => text,
    }
}
