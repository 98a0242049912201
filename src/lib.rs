//! Bookshelf Core Library
//!
//! This library provides the core of the bookshelf tool, a personal book
//! catalog: register books by hand or by scanned ISBN, keep them in a local
//! `SQLite` database, and fill in titles and authors from Open Library.
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//! - [`db`] - Database connection and schema management
//! - [`catalog`] - Durable book store keyed by ISBN
//! - [`isbn`] - Normalization and checksum checks for scanned/typed ISBNs
//! - [`lookup`] - Metadata lookup against the Open Library Books API
//! - [`service`] - Catalog service: in-memory mirror and lookup-then-persist flow

// Clippy lints - strict for library code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod catalog;
pub mod db;
pub mod isbn;
pub mod lookup;
pub mod service;
#[cfg(test)]
pub mod test_support;
pub(crate) mod user_agent;

// Re-export commonly used types
pub use catalog::{
    BookRecord, BookStore, CatalogRepository, StorageError, StorageErrorKind, UNKNOWN_AUTHOR,
};
pub use db::{Database, DatabaseOptions, DbError};
pub use lookup::{
    LookupConfig, LookupError, MetadataLookup, OpenLibraryClient, TransportFailure,
};
pub use service::{CatalogError, CatalogService, LookupOutcome, ValidationError};
