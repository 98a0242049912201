//! CLI argument definitions using clap derive macros.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use bookshelf_core::UNKNOWN_AUTHOR;

/// Keep a personal book catalog.
///
/// Books are stored in a local database keyed by ISBN. Scanning an ISBN
/// fills in the title and author from Open Library.
#[derive(Parser, Debug)]
#[command(name = "bookshelf")]
#[command(author, version, about)]
pub struct Cli {
    /// Increase output verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Catalog database file (overrides config and the default location)
    #[arg(long, value_name = "PATH", global = true)]
    pub db: Option<PathBuf>,

    /// Metadata source base URL (overrides config)
    #[arg(long, value_name = "URL", global = true)]
    pub base_url: Option<String>,

    /// Lookup request timeout in seconds (1-3600)
    #[arg(long, value_name = "SECS", global = true, value_parser = clap::value_parser!(u64).range(1..=3600))]
    pub timeout: Option<u64>,

    #[command(subcommand)]
    pub command: Command,
}

/// Catalog subcommands.
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Add or replace a book by hand
    Add {
        /// ISBN the book is stored under
        #[arg(long)]
        isbn: String,

        /// Book title
        #[arg(long)]
        title: String,

        /// Book author
        #[arg(long, default_value = UNKNOWN_AUTHOR)]
        author: String,
    },

    /// Look an ISBN up online and add the result
    Scan {
        /// Scanned or typed ISBN (hyphens and an "ISBN" label are accepted)
        isbn: String,
    },

    /// List every book in the catalog
    List {
        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Show a single book
    Show {
        /// ISBN to show
        isbn: String,

        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },
}
