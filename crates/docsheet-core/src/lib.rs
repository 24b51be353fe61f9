pub mod config;
pub mod error;
pub mod export;
pub mod flatten;
pub mod grouping;
pub mod mongo;
pub mod naming;
pub mod project;
pub mod sheet;
pub mod source;
pub mod summary;
pub mod value;

pub use config::{ConfigError, ExportConfig};
pub use error::ExportError;
pub use export::{Exporter, RunReport};
pub use flatten::{flatten, FlatRow};
pub use project::{project, Table};
pub use source::{DocumentSource, MemorySource, SourceError};
pub use value::{Cell, FieldValue, Record};
