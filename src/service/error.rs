//! Error types surfaced by the catalog service.

use thiserror::Error;

use crate::catalog::StorageError;
use crate::lookup::LookupError;

/// A caller supplied an unusable record. Raised before any I/O.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// The ISBN was empty or whitespace.
    #[error("ISBN must not be empty\n  Suggestion: Scan the barcode again or type the ISBN")]
    EmptyIsbn,

    /// The title was empty or whitespace.
    #[error("title must not be empty\n  Suggestion: Enter the book title")]
    EmptyTitle,
}

/// Any failure the catalog service can report.
#[derive(Debug, Clone, Error)]
pub enum CatalogError {
    /// Input rejected before touching storage or the network.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The catalog store failed to read or write.
    #[error(transparent)]
    Storage(#[from] StorageError),

    /// The metadata source failed (never `NotFound`; that is its own outcome).
    #[error(transparent)]
    Lookup(#[from] LookupError),
}

impl CatalogError {
    /// Stable label for structured logs.
    #[must_use]
    pub fn kind_label(&self) -> &'static str {
        match self {
            Self::Validation(_) => "validation",
            Self::Storage(_) => "storage",
            Self::Lookup(err) => err.kind_label(),
        }
    }
}
