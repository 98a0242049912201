//! The single result delivered for each lookup-and-add request.

use std::fmt;

use crate::catalog::BookRecord;

use super::CatalogError;

/// Terminal state of one `lookup_and_add` call.
///
/// Exactly one variant is produced per call; there is no retry and no
/// intermediate notification.
#[derive(Debug, Clone)]
pub enum LookupOutcome {
    /// The record was fetched, stored, and is visible in the mirror.
    Added(BookRecord),
    /// The metadata source has no entry for the ISBN. Nothing was stored.
    NotFound {
        /// The normalized ISBN that was looked up.
        isbn: String,
    },
    /// The lookup or the follow-up write failed. Nothing new is in the mirror.
    ///
    /// With [`CatalogError::Storage`] the insert itself may have succeeded
    /// and only the mirror refresh failed; the record is then durable and
    /// shows up after the next successful refresh.
    Failed(CatalogError),
}

impl LookupOutcome {
    /// Returns the stored record on success.
    #[must_use]
    pub fn record(&self) -> Option<&BookRecord> {
        match self {
            Self::Added(record) => Some(record),
            Self::NotFound { .. } | Self::Failed(_) => None,
        }
    }

    #[must_use]
    pub fn is_added(&self) -> bool {
        matches!(self, Self::Added(_))
    }

    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    #[must_use]
    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed(_))
    }

    /// Returns the failure, if any.
    #[must_use]
    pub fn error(&self) -> Option<&CatalogError> {
        match self {
            Self::Failed(err) => Some(err),
            Self::Added(_) | Self::NotFound { .. } => None,
        }
    }

    /// Stable label for structured logs: `added`, `not_found` or `error`.
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::Added(_) => "added",
            Self::NotFound { .. } => "not_found",
            Self::Failed(_) => "error",
        }
    }
}

impl fmt::Display for LookupOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Added(record) => write!(f, "added {record}"),
            Self::NotFound { isbn } => write!(f, "no book found for ISBN {isbn}"),
            Self::Failed(err) => write!(f, "lookup failed: {err}"),
        }
    }
}
