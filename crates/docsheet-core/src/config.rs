use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

use crate::flatten::DEFAULT_SEPARATOR;
use crate::sheet::DEFAULT_MAX_COLUMN_WIDTH;

pub const DEFAULT_COLLECTIONS: [&str; 9] = [
    "users",
    "events",
    "registrations",
    "adminusers",
    "discounts",
    "minimarathons",
    "nonpecminimarathons",
    "registrationforms",
    "otps",
];

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Everything one export run needs; threaded into the exporter at construction.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ExportConfig {
    pub mongodb_uri: Option<String>,
    /// Used when the connection string does not name a database.
    pub database: String,
    pub output_dir: PathBuf,
    /// Subdirectory of `output_dir` receiving one workbook per event.
    pub events_subdir: String,
    pub collections: Vec<String>,
    pub events_collection: String,
    pub registrations_collection: String,
    pub join_field: String,
    pub name_field: String,
    pub separator: String,
    pub max_column_width: usize,
    pub summary_file: String,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            mongodb_uri: None,
            database: "test".to_string(),
            output_dir: PathBuf::from("output"),
            events_subdir: "events".to_string(),
            collections: DEFAULT_COLLECTIONS.iter().map(|c| c.to_string()).collect(),
            events_collection: "events".to_string(),
            registrations_collection: "registrations".to_string(),
            join_field: "eventId".to_string(),
            name_field: "eventName".to_string(),
            separator: DEFAULT_SEPARATOR.to_string(),
            max_column_width: DEFAULT_MAX_COLUMN_WIDTH,
            summary_file: "00_SUMMARY_REPORT.xlsx".to_string(),
        }
    }
}

impl ExportConfig {
    pub fn from_toml_str(contents: &str, path: &Path) -> Result<Self, ConfigError> {
        toml::from_str(contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn load_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&contents, path)
    }

    /// Applies `DOCSHEET_*` (and plain `MONGODB_URI`) variables from the process environment.
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides_from(|name| std::env::var(name).ok());
    }

    pub fn apply_overrides_from<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| {
            lookup(name)
                .map(|raw| raw.trim().to_string())
                .filter(|raw| !raw.is_empty())
        };

        if let Some(uri) = get("DOCSHEET_MONGODB_URI").or_else(|| get("MONGODB_URI")) {
            self.mongodb_uri = Some(uri);
        }
        if let Some(database) = get("DOCSHEET_DATABASE") {
            self.database = database;
        }
        if let Some(dir) = get("DOCSHEET_OUTPUT_DIR") {
            self.output_dir = PathBuf::from(dir);
        }
        if let Some(raw) = get("DOCSHEET_COLLECTIONS") {
            self.collections = split_list(&raw);
        }
        if let Some(raw) = get("DOCSHEET_MAX_COLUMN_WIDTH") {
            match raw.parse::<usize>() {
                Ok(width) => self.max_column_width = width,
                Err(err) => warn!("invalid DOCSHEET_MAX_COLUMN_WIDTH, ignoring: {err}"),
            }
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.mongodb_uri.as_deref().map_or(true, str::is_empty) {
            return Err(ConfigError::Invalid(
                "a MongoDB connection string is required (--uri or MONGODB_URI)".into(),
            ));
        }
        if self.collections.is_empty() {
            return Err(ConfigError::Invalid("collection list is empty".into()));
        }
        if self.separator.is_empty() {
            return Err(ConfigError::Invalid("separator must not be empty".into()));
        }
        if self.max_column_width == 0 {
            return Err(ConfigError::Invalid(
                "max_column_width must be greater than zero".into(),
            ));
        }
        Ok(())
    }

    pub fn events_dir(&self) -> PathBuf {
        self.output_dir.join(&self.events_subdir)
    }

    pub fn summary_path(&self) -> PathBuf {
        self.output_dir.join(&self.summary_file)
    }
}

/// Splits a comma separated list, dropping empty entries.
pub fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}
