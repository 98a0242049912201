//! Catalog store: durable persistence of book records keyed by ISBN.
//!
//! # Overview
//!
//! - [`BookStore`] - `SQLite`-backed store
//! - [`BookRecord`] - The stored entity
//! - [`CatalogRepository`] - Async seam the catalog service depends on
//! - [`StorageError`] - Operation error type
//!
//! # Example
//!
//! ```ignore
//! use bookshelf_core::catalog::{BookRecord, BookStore};
//! use bookshelf_core::Database;
//! use std::path::Path;
//!
//! let db = Database::new(Path::new("books.db")).await?;
//! let store = BookStore::new(db);
//!
//! store.insert(&BookRecord::new("9780140449136", "The Odyssey", "Homer")).await?;
//! let odyssey = store.get_by_isbn("9780140449136").await?;
//! ```

mod error;
mod record;
mod repository;

pub use error::{StorageError, StorageErrorKind};
pub use record::{BookRecord, UNKNOWN_AUTHOR};
pub use repository::CatalogRepository;

use tracing::{debug, instrument};

use crate::db::Database;

/// Result type for store operations.
pub type Result<T> = std::result::Result<T, StorageError>;

/// Book store backed by the `books` table.
#[derive(Debug, Clone)]
pub struct BookStore {
    db: Database,
}

impl BookStore {
    /// Creates a store over an already-opened database.
    #[must_use]
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Returns every stored record, ordered by title (case-insensitive) then ISBN.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if the query fails.
    #[instrument(skip(self))]
    pub async fn get_all(&self) -> Result<Vec<BookRecord>> {
        let books = sqlx::query_as::<_, BookRecord>(
            r"SELECT isbn, title, author FROM books
              ORDER BY title COLLATE NOCASE ASC, isbn ASC",
        )
        .fetch_all(self.db.pool())
        .await?;

        debug!(count = books.len(), "Loaded catalog");
        Ok(books)
    }

    /// Looks up a single record. An absent record is `Ok(None)`.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if the query fails.
    #[instrument(skip(self), fields(isbn = %isbn))]
    pub async fn get_by_isbn(&self, isbn: &str) -> Result<Option<BookRecord>> {
        let book = sqlx::query_as::<_, BookRecord>(
            "SELECT isbn, title, author FROM books WHERE isbn = ?",
        )
        .bind(isbn)
        .fetch_optional(self.db.pool())
        .await?;

        Ok(book)
    }

    /// Inserts or fully replaces the record with the same ISBN.
    ///
    /// The upsert is a single statement, so concurrent inserts of one ISBN
    /// cannot interleave into a mixed row.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if the write fails, including
    /// [`StorageErrorKind::ConstraintViolation`] for an empty isbn or title.
    #[instrument(skip(self, record), fields(isbn = %record.isbn))]
    pub async fn insert(&self, record: &BookRecord) -> Result<()> {
        sqlx::query(
            r"INSERT INTO books (isbn, title, author)
              VALUES (?, ?, ?)
              ON CONFLICT(isbn) DO UPDATE SET
                  title = excluded.title,
                  author = excluded.author",
        )
        .bind(&record.isbn)
        .bind(&record.title)
        .bind(&record.author)
        .execute(self.db.pool())
        .await?;

        debug!("Stored book record");
        Ok(())
    }
}
