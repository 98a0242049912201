//! The book record stored in the catalog.

use std::fmt;

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Placeholder author used when the metadata source names nobody.
pub const UNKNOWN_AUTHOR: &str = "Unknown";

/// A cataloged book, keyed by ISBN.
///
/// Records are replaced as a whole; there are no partial field updates.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, FromRow)]
pub struct BookRecord {
    /// International Standard Book Number, the primary key.
    pub isbn: String,
    /// Book title. Must be non-empty for the record to be stored.
    pub title: String,
    /// Display author, or [`UNKNOWN_AUTHOR`].
    pub author: String,
}

impl BookRecord {
    /// Creates a record from its three fields.
    #[must_use]
    pub fn new(
        isbn: impl Into<String>,
        title: impl Into<String>,
        author: impl Into<String>,
    ) -> Self {
        Self {
            isbn: isbn.into(),
            title: title.into(),
            author: author.into(),
        }
    }
}

impl fmt::Display for BookRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} by {} (ISBN {})", self.title, self.author, self.isbn)
    }
}
