use std::collections::{BTreeSet, HashSet};
use std::fs;
use std::path::{Path, PathBuf};

use chrono::{Local, NaiveDateTime};
use tracing::{error, info, warn};

use crate::config::ExportConfig;
use crate::error::{ExportError, Result};
use crate::flatten::{flatten, FlatRow};
use crate::grouping::{partition_by_key, JoinKey};
use crate::naming::{collection_file_name, group_file_name, sanitize_sheet_title};
use crate::project::project;
use crate::sheet::SheetWriter;
use crate::source::DocumentSource;
use crate::summary::{summary_table, ExportStatus, SummaryRow, SUMMARY_SHEET_TITLE};
use crate::value::{FieldValue, Record};

pub const UNKNOWN_EVENT_NAME: &str = "Unknown Event";
pub const GROUP_FALLBACK_TITLE: &str = "Event";

#[derive(Debug)]
pub struct CollectionOutcome {
    pub collection: String,
    pub path: PathBuf,
    pub result: Result<usize>,
}

impl CollectionOutcome {
    pub fn summary_row(&self) -> SummaryRow {
        let (documents, status) = match &self.result {
            Ok(0) => (0, ExportStatus::Empty),
            Ok(count) => (*count, ExportStatus::Exported),
            Err(err) => (0, ExportStatus::Failed(err.to_string())),
        };
        SummaryRow {
            collection: self.collection.clone(),
            documents,
            status,
        }
    }
}

#[derive(Debug)]
pub struct GroupOutcome {
    pub key: JoinKey,
    pub name: String,
    pub path: PathBuf,
    pub result: Result<usize>,
}

#[derive(Debug, Default)]
pub struct GroupedReport {
    pub groups: Vec<GroupOutcome>,
    /// Parents whose key matched no child records.
    pub without_children: Vec<JoinKey>,
    /// Parents lacking a usable join key.
    pub without_key: usize,
}

impl GroupedReport {
    /// Number of group workbooks written.
    pub fn exported(&self) -> usize {
        self.groups.iter().filter(|g| g.result.is_ok()).count()
    }
}

#[derive(Debug)]
pub struct RunReport {
    pub collections: Vec<CollectionOutcome>,
    pub grouped: Result<GroupedReport>,
    pub summary: Result<PathBuf>,
}

impl RunReport {
    pub fn collections_exported(&self) -> usize {
        self.collections
            .iter()
            .filter(|c| matches!(c.result, Ok(n) if n > 0))
            .count()
    }

    pub fn total_documents(&self) -> usize {
        self.collections
            .iter()
            .filter_map(|c| c.result.as_ref().ok())
            .sum()
    }

    pub fn group_files(&self) -> usize {
        self.grouped.as_ref().map(GroupedReport::exported).unwrap_or(0)
    }

    pub fn files_written(&self) -> usize {
        self.collections_exported() + self.group_files() + usize::from(self.summary.is_ok())
    }
}

/// Runs every export unit sequentially against one source.
pub struct Exporter<'a, S: DocumentSource + ?Sized> {
    source: &'a S,
    config: &'a ExportConfig,
    writer: SheetWriter,
}

impl<'a, S: DocumentSource + ?Sized> Exporter<'a, S> {
    pub fn new(source: &'a S, config: &'a ExportConfig) -> Self {
        Self {
            source,
            config,
            writer: SheetWriter::new(config.max_column_width),
        }
    }

    /// Creates the output and per-event directories.
    pub fn prepare_output_dirs(&self) -> Result<()> {
        for dir in [self.config.output_dir.clone(), self.config.events_dir()] {
            fs::create_dir_all(&dir).map_err(|source| ExportError::CreateDir {
                path: dir.clone(),
                source,
            })?;
        }
        info!(output_dir = %self.config.output_dir.display(), "output directories ready");
        Ok(())
    }

    /// Full run: every configured collection, the grouped export, then the summary report.
    /// Only directory creation is fatal; every other failure is recorded in the report.
    pub async fn run(&self) -> Result<RunReport> {
        self.run_at(Local::now().naive_local()).await
    }

    pub async fn run_at(&self, exported_at: NaiveDateTime) -> Result<RunReport> {
        self.prepare_output_dirs()?;

        let mut collections = Vec::with_capacity(self.config.collections.len());
        for collection in &self.config.collections {
            collections.push(self.export_collection(collection).await);
        }

        let grouped = self.export_groups().await;
        if let Err(err) = &grouped {
            error!(error = %err, "grouped export failed");
        }

        let rows: Vec<SummaryRow> = collections.iter().map(CollectionOutcome::summary_row).collect();
        let summary = self.write_summary(&rows, exported_at);
        if let Err(err) = &summary {
            error!(error = %err, "failed to write summary report");
        }

        Ok(RunReport {
            collections,
            grouped,
            summary,
        })
    }

    /// Exports one collection to `{output_dir}/{collection}.xlsx`. Ok(0) means it was empty
    /// and no file was written.
    pub async fn export_collection(&self, collection: &str) -> CollectionOutcome {
        let path = self.config.output_dir.join(collection_file_name(collection));
        let result = self.export_collection_to(collection, &path).await;

        match &result {
            Ok(0) => warn!(collection, "collection is empty, skipping"),
            Ok(count) => info!(collection, count, path = %path.display(), "exported collection"),
            Err(err) => error!(collection, error = %err, "failed to export collection"),
        }

        CollectionOutcome {
            collection: collection.to_string(),
            path,
            result,
        }
    }

    async fn export_collection_to(&self, collection: &str, path: &Path) -> Result<usize> {
        let records = self
            .source
            .fetch_all(collection)
            .await
            .map_err(|source| ExportError::source_failure(collection, source))?;
        self.write_records(collection, records.iter(), path, collection)
    }

    /// Writes one workbook per parent record whose join key matches at least one child.
    pub async fn export_groups(&self) -> Result<GroupedReport> {
        let config = self.config;
        let parents = self
            .source
            .fetch_all(&config.events_collection)
            .await
            .map_err(|source| ExportError::source_failure(&config.events_collection, source))?;

        let mut report = GroupedReport::default();
        if parents.is_empty() {
            warn!(collection = %config.events_collection, "no parent records found");
            return Ok(report);
        }
        info!(count = parents.len(), "grouping child records by parent");

        let children = self
            .source
            .fetch_all(&config.registrations_collection)
            .await
            .map_err(|source| {
                ExportError::source_failure(&config.registrations_collection, source)
            })?;
        let partitions = partition_by_key(&children, &config.join_field);
        let events_dir = config.events_dir();
        let mut written: HashSet<PathBuf> = HashSet::new();

        for parent in &parents {
            let Some(key) = JoinKey::from_record(parent, &config.join_field) else {
                report.without_key += 1;
                continue;
            };
            let name = display_name(parent, &config.name_field);

            let Some(selection) = partitions.get(&key) else {
                warn!(key = %key, name = %name, "no child records for parent");
                report.without_children.push(key);
                continue;
            };

            // Parents sharing a key each get a file unless their names collapse to the same path.
            let path = events_dir.join(group_file_name(&key.to_string(), &name));
            if !written.insert(path.clone()) {
                warn!(
                    key = %key,
                    name = %name,
                    path = %path.display(),
                    "group file already written, skipping"
                );
                continue;
            }
            let title = sanitize_sheet_title(&name, GROUP_FALLBACK_TITLE);
            let unit = format!("{}:{key}", config.registrations_collection);
            let result = self.write_records(&unit, selection.iter().copied(), &path, &title);

            match &result {
                Ok(count) => info!(key = %key, name = %name, count, "exported group"),
                Err(err) => error!(key = %key, name = %name, error = %err, "failed to export group"),
            }

            report.groups.push(GroupOutcome {
                key,
                name,
                path,
                result,
            });
        }

        info!(groups = report.exported(), "grouped export finished");
        Ok(report)
    }

    /// Writes the summary workbook and returns its path.
    pub fn write_summary(&self, rows: &[SummaryRow], exported_at: NaiveDateTime) -> Result<PathBuf> {
        let path = self.config.summary_path();
        let table = summary_table(rows, exported_at);
        self.writer.write(&table, &path, SUMMARY_SHEET_TITLE)?;
        info!(path = %path.display(), "summary report written");
        Ok(path)
    }

    fn write_records<'r>(
        &self,
        unit: &str,
        records: impl Iterator<Item = &'r Record>,
        path: &Path,
        title: &str,
    ) -> Result<usize> {
        let rows: Vec<FlatRow> = records
            .map(|record| flatten(record, &self.config.separator))
            .collect();

        let collisions: BTreeSet<&str> = rows
            .iter()
            .flat_map(|row| row.overwritten().iter().map(String::as_str))
            .collect();
        if !collisions.is_empty() {
            warn!(unit, columns = ?collisions, "flattened columns collided; later fields won");
        }

        let Some(table) = project(&rows) else {
            return Ok(0);
        };
        self.writer.write(&table, path, title)?;
        Ok(table.height())
    }
}

fn display_name(record: &Record, field: &str) -> String {
    match record.get(field) {
        None | Some(FieldValue::Null) => UNKNOWN_EVENT_NAME.to_string(),
        Some(value) => value.display_text(),
    }
}
