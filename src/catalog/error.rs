//! Error types for catalog store operations.

use std::fmt;

use thiserror::Error;

/// Structured classification for storage failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageErrorKind {
    /// `SQLite` returned busy/locked under concurrent access.
    BusyOrLocked,
    /// Constraint failure (primary key, check, not-null).
    ConstraintViolation,
    /// Connection pool timed out waiting for a free connection.
    PoolTimeout,
    /// Connection pool is closed.
    PoolClosed,
    /// Filesystem or transport IO failure.
    Io,
    /// SQL protocol/driver error.
    Protocol,
    /// A stored row could not be decoded into a record.
    Decode,
    /// Unclassified database failure.
    Other,
}

impl StorageErrorKind {
    #[must_use]
    pub fn from_sqlx(error: &sqlx::Error) -> Self {
        match error {
            sqlx::Error::PoolTimedOut => Self::PoolTimeout,
            sqlx::Error::PoolClosed => Self::PoolClosed,
            sqlx::Error::Io(_) => Self::Io,
            sqlx::Error::Protocol(_) => Self::Protocol,
            sqlx::Error::ColumnDecode { .. } | sqlx::Error::Decode(_) => Self::Decode,
            sqlx::Error::Database(database_error) => {
                classify_database_error(database_error.as_ref())
            }
            _ => Self::Other,
        }
    }
}

impl fmt::Display for StorageErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::BusyOrLocked => "busy_or_locked",
            Self::ConstraintViolation => "constraint_violation",
            Self::PoolTimeout => "pool_timeout",
            Self::PoolClosed => "pool_closed",
            Self::Io => "io",
            Self::Protocol => "protocol",
            Self::Decode => "decode",
            Self::Other => "other",
        };
        write!(f, "{label}")
    }
}

fn classify_database_error(
    database_error: &(dyn sqlx::error::DatabaseError + 'static),
) -> StorageErrorKind {
    let code = database_error.code();
    if matches!(
        code.as_deref(),
        Some("SQLITE_BUSY" | "SQLITE_LOCKED" | "5" | "6")
    ) {
        return StorageErrorKind::BusyOrLocked;
    }

    if database_error.is_unique_violation()
        || database_error.is_check_violation()
        || code
            .as_deref()
            .is_some_and(|value| value.starts_with("SQLITE_CONSTRAINT") || value == "275")
    {
        return StorageErrorKind::ConstraintViolation;
    }

    let message = database_error.message().to_ascii_lowercase();
    if message.contains("database is locked")
        || message.contains("database table is locked")
        || message.contains("database is busy")
    {
        return StorageErrorKind::BusyOrLocked;
    }
    if message.contains("constraint failed") {
        return StorageErrorKind::ConstraintViolation;
    }

    StorageErrorKind::Other
}

/// Errors raised by the catalog store.
///
/// The store never retries; the caller decides what to do next.
#[derive(Debug, Clone, Error)]
pub enum StorageError {
    /// Database operation failed.
    #[error(
        "catalog storage error ({kind}): {message}\n  Suggestion: Check that the catalog database file is writable and not in use by another process"
    )]
    Database {
        /// Typed classification used for diagnostics.
        kind: StorageErrorKind,
        /// Human-readable database error text.
        message: String,
    },
}

impl From<sqlx::Error> for StorageError {
    fn from(err: sqlx::Error) -> Self {
        Self::Database {
            kind: StorageErrorKind::from_sqlx(&err),
            message: err.to_string(),
        }
    }
}

impl StorageError {
    /// Builds a storage error of the given kind with a custom message.
    #[must_use]
    pub fn new(kind: StorageErrorKind, message: impl Into<String>) -> Self {
        Self::Database {
            kind,
            message: message.into(),
        }
    }

    /// Returns the typed error kind.
    #[must_use]
    pub fn kind(&self) -> StorageErrorKind {
        match self {
            Self::Database { kind, .. } => *kind,
        }
    }
}
