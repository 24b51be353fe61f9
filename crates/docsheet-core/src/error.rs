// crates/docsheet-core/src/error.rs

use std::path::PathBuf;

use thiserror::Error;

use crate::source::SourceError;

/// Failure of one unit of work (a collection, a group, or the summary report).
#[derive(Error, Debug)]
pub enum ExportError {
    #[error("failed to read collection '{collection}': {source}")]
    Source {
        collection: String,
        #[source]
        source: SourceError,
    },

    #[error("failed to write workbook {}: {source}", .path.display())]
    Workbook {
        path: PathBuf,
        #[source]
        source: rust_xlsxwriter::XlsxError,
    },

    #[error("failed to create directory {}: {source}", .path.display())]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ExportError {
    pub fn source_failure(collection: &str, source: SourceError) -> Self {
        ExportError::Source {
            collection: collection.to_string(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, ExportError>;
