//! CLI entry point for the bookshelf tool.

use std::fs;
use std::io::IsTerminal;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use anyhow::{Context, Result};
use bookshelf_core::{
    BookStore, CatalogService, Database, DatabaseOptions, LookupConfig, LookupOutcome,
    OpenLibraryClient,
};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, info};

mod app_config;
mod cli;
mod output;

use app_config::{FileConfig, load_default_file_config, resolve_default_db_path};
use cli::{Cli, Command};

type Catalog = CatalogService<BookStore, OpenLibraryClient>;

/// Process exit outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ProcessExit {
    Success,
    Failure,
    /// The requested book is unknown (scan: upstream; show: local catalog).
    NotFound,
}

impl ProcessExit {
    fn code(self) -> u8 {
        match self {
            Self::Success => 0,
            Self::Failure => 1,
            Self::NotFound => 2,
        }
    }
}

impl From<ProcessExit> for ExitCode {
    fn from(value: ProcessExit) -> Self {
        ExitCode::from(value.code())
    }
}

/// Fully merged runtime settings: defaults < config file < CLI flags.
#[derive(Debug, Clone, PartialEq, Eq)]
struct RuntimeSettings {
    db_path: PathBuf,
    database: DatabaseOptions,
    lookup: LookupConfig,
}

fn resolve_settings(cli: &Cli, file: Option<&FileConfig>) -> RuntimeSettings {
    let file = file.cloned().unwrap_or_default();

    let db_path = cli
        .db
        .clone()
        .or(file.db_path)
        .unwrap_or_else(resolve_default_db_path);

    let defaults = DatabaseOptions::default();
    let database = DatabaseOptions {
        max_connections: file.db_max_connections.unwrap_or(defaults.max_connections),
        busy_timeout_ms: file.db_busy_timeout_ms.unwrap_or(defaults.busy_timeout_ms),
    };

    let lookup_defaults = LookupConfig::default();
    let lookup = LookupConfig {
        base_url: cli
            .base_url
            .clone()
            .or(file.lookup_base_url)
            .unwrap_or(lookup_defaults.base_url),
        connect_timeout: file
            .lookup_connect_timeout_secs
            .map_or(lookup_defaults.connect_timeout, Duration::from_secs),
        request_timeout: cli
            .timeout
            .or(file.lookup_timeout_secs)
            .map_or(lookup_defaults.request_timeout, Duration::from_secs),
    };

    RuntimeSettings {
        db_path,
        database,
        lookup,
    }
}

fn default_log_level(quiet: bool, verbose: u8) -> &'static str {
    if quiet {
        "error"
    } else {
        match verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    }
}

fn init_tracing(default_level: &str) {
    // RUST_LOG wins over the CLI flags.
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .try_init();
}

fn should_use_spinner(stderr_is_terminal: bool, quiet: bool) -> bool {
    stderr_is_terminal && !quiet
}

#[tokio::main]
async fn main() -> ExitCode {
    // Parse CLI arguments first (before tracing, so --help works without logs)
    let cli = Cli::parse();
    init_tracing(default_log_level(cli.quiet, cli.verbose));
    debug!(?cli, "CLI arguments parsed");

    match run(cli).await {
        Ok(exit) => exit.into(),
        Err(error) => {
            eprintln!("Error: {error:#}");
            ProcessExit::Failure.into()
        }
    }
}

async fn run(cli: Cli) -> Result<ProcessExit> {
    let loaded = load_default_file_config()?;
    if let Some(path) = loaded.path.as_deref() {
        debug!(
            path = %path.display(),
            loaded = loaded.loaded_from_file(),
            "Config file resolved"
        );
    }
    let settings = resolve_settings(&cli, loaded.config.as_ref());
    debug!(?settings, "Runtime settings resolved");

    let catalog = open_catalog(&settings).await?;

    match cli.command {
        Command::Add {
            isbn,
            title,
            author,
        } => {
            let record = catalog.add_book_details(&isbn, &title, &author).await?;
            println!("Saved: {record}");
            Ok(ProcessExit::Success)
        }
        Command::Scan { isbn } => Ok(run_scan(&catalog, &isbn, cli.quiet).await),
        Command::List { json } => {
            let books = catalog.list_books();
            if json {
                println!("{}", output::render_json(&books)?);
            } else if books.is_empty() {
                info!("Catalog is empty");
            } else {
                print!("{}", output::render_tsv(&books));
            }
            Ok(ProcessExit::Success)
        }
        Command::Show { isbn, json } => {
            let Some(book) = catalog.find_by_isbn(&isbn) else {
                eprintln!("No book with ISBN {isbn} in the catalog");
                return Ok(ProcessExit::NotFound);
            };
            if json {
                println!("{}", output::render_json(&book)?);
            } else {
                print!("{}", output::render_detail(&book));
            }
            Ok(ProcessExit::Success)
        }
    }
}

async fn open_catalog(settings: &RuntimeSettings) -> Result<Catalog> {
    if let Some(parent) = settings.db_path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent).with_context(|| {
            format!("Failed to create database directory '{}'", parent.display())
        })?;
    }

    let db = Database::new_with_options(&settings.db_path, &settings.database)
        .await
        .with_context(|| {
            format!(
                "Failed to open catalog database '{}'",
                settings.db_path.display()
            )
        })?;
    let lookup = OpenLibraryClient::with_config(&settings.lookup)?;
    let catalog = CatalogService::open(BookStore::new(db), lookup).await?;
    Ok(catalog)
}

async fn run_scan(catalog: &Catalog, raw_isbn: &str, quiet: bool) -> ProcessExit {
    let spinner = should_use_spinner(std::io::stderr().is_terminal(), quiet).then(|| {
        let spinner = ProgressBar::new_spinner();
        spinner.set_style(
            ProgressStyle::with_template("{spinner} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        spinner.set_message(format!("Looking up {raw_isbn}..."));
        spinner.enable_steady_tick(Duration::from_millis(100));
        spinner
    });

    let outcome = catalog.lookup_and_add(raw_isbn).await;
    if let Some(spinner) = spinner {
        spinner.finish_and_clear();
    }

    match outcome {
        LookupOutcome::Added(record) => {
            println!("Added: {record}");
            ProcessExit::Success
        }
        LookupOutcome::NotFound { isbn } => {
            eprintln!("No book found for ISBN {isbn}");
            ProcessExit::NotFound
        }
        LookupOutcome::Failed(error) => {
            eprintln!("Error: {error}");
            ProcessExit::Failure
        }
    }
}
