use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use comfy_table::presets::UTF8_FULL;
use comfy_table::Table;
use docsheet_core::export::{Exporter, RunReport};
use docsheet_core::mongo::MongoSource;
use docsheet_core::ExportConfig;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(author, version, about = "Export MongoDB collections to styled xlsx workbooks", long_about = None)]
struct Cli {
    #[command(flatten)]
    global: GlobalArgs,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Export every configured collection, the per-event registrations and the summary report
    Export(ExportArgs),
    /// List the collections present in the target database
    ListCollections,
}

#[derive(Args, Debug)]
struct GlobalArgs {
    /// TOML file with export settings
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// MongoDB connection string (overrides MONGODB_URI)
    #[arg(long, global = true)]
    uri: Option<String>,
    /// Database used when the connection string does not name one
    #[arg(long, global = true)]
    database: Option<String>,
    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    json_logs: bool,
}

#[derive(Args, Debug, Default)]
struct ExportArgs {
    /// Directory receiving the workbooks
    #[arg(short, long)]
    output_dir: Option<PathBuf>,
    /// Collection to export; repeat to export several (replaces the configured list)
    #[arg(short, long = "collection")]
    collections: Vec<String>,
    /// Upper bound for auto-sized column widths
    #[arg(long)]
    max_column_width: Option<usize>,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    init_tracing(cli.global.json_logs);

    match cli.command.unwrap_or(Command::Export(ExportArgs::default())) {
        Command::Export(args) => {
            let config = load_config(&cli.global, Some(args))?;
            handle_export(&config).await
        }
        Command::ListCollections => {
            let config = load_config(&cli.global, None)?;
            handle_list_collections(&config).await
        }
    }
}

fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    if json {
        tracing_subscriber::fmt().with_env_filter(filter).json().init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

/// Defaults, then the config file, then the environment, then command-line flags.
fn load_config(global: &GlobalArgs, export: Option<ExportArgs>) -> Result<ExportConfig> {
    let mut config = match &global.config {
        Some(path) => ExportConfig::load_file(path)?,
        None => ExportConfig::default(),
    };
    config.apply_env_overrides();

    if let Some(uri) = &global.uri {
        config.mongodb_uri = Some(uri.clone());
    }
    if let Some(database) = &global.database {
        config.database = database.clone();
    }
    if let Some(args) = export {
        if let Some(dir) = args.output_dir {
            config.output_dir = dir;
        }
        if !args.collections.is_empty() {
            config.collections = args.collections;
        }
        if let Some(width) = args.max_column_width {
            config.max_column_width = width;
        }
    }

    config.validate()?;
    Ok(config)
}

async fn connect(config: &ExportConfig) -> Result<MongoSource> {
    let uri = config
        .mongodb_uri
        .as_deref()
        .context("MONGODB_URI (or --uri) must be set")?;
    info!("connecting to MongoDB");
    let source = MongoSource::connect(uri, &config.database).await?;
    info!(database = source.database_name(), "connected to MongoDB");
    Ok(source)
}

async fn handle_export(config: &ExportConfig) -> Result<()> {
    let source = connect(config).await?;

    match source.collection_names().await {
        Ok(names) => info!(count = names.len(), "collections found in database"),
        Err(err) => warn!("could not list collections: {err:#}"),
    }

    let report = Exporter::new(&source, config).run().await;
    source.shutdown().await;
    let report = report.context("export aborted")?;

    print_report(config, &report);
    Ok(())
}

async fn handle_list_collections(config: &ExportConfig) -> Result<()> {
    let source = connect(config).await?;
    let names = source.collection_names().await;
    source.shutdown().await;

    let mut names = names?;
    names.sort();
    for name in names {
        println!("{name}");
    }
    Ok(())
}

fn print_report(config: &ExportConfig, report: &RunReport) {
    let mut collections = Table::new();
    collections
        .load_preset(UTF8_FULL)
        .set_header(vec!["Collection", "Documents", "Status", "File"]);
    for outcome in &report.collections {
        let row = outcome.summary_row();
        let file = match &outcome.result {
            Ok(n) if *n > 0 => outcome.path.display().to_string(),
            _ => String::new(),
        };
        collections.add_row(vec![
            row.collection,
            row.documents.to_string(),
            row.status.to_string(),
            file,
        ]);
    }
    println!("{collections}");

    let grouped_status = match &report.grouped {
        Ok(grouped) => format!(
            "{} written, {} without registrations, {} without key",
            grouped.exported(),
            grouped.without_children.len(),
            grouped.without_key
        ),
        Err(err) => format!("failed: {err}"),
    };

    let mut totals = Table::new();
    totals.load_preset(UTF8_FULL).set_header(vec!["Export summary", ""]);
    totals.add_row(vec![
        "Collections exported".to_string(),
        format!("{}/{}", report.collections_exported(), report.collections.len()),
    ]);
    totals.add_row(vec![
        "Total documents".to_string(),
        report.total_documents().to_string(),
    ]);
    totals.add_row(vec!["Event registration files".to_string(), grouped_status]);
    totals.add_row(vec![
        "Workbooks written".to_string(),
        report.files_written().to_string(),
    ]);
    totals.add_row(vec![
        "Output directory".to_string(),
        config.output_dir.display().to_string(),
    ]);
    println!("{totals}");
}
