//! Error types for metadata lookups.
//!
//! Follows the What/Why/Fix message pattern used across the project.

use std::fmt;

use thiserror::Error;

/// What went wrong on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportFailure {
    /// The request did not complete within the configured timeout.
    Timeout,
    /// The connection could not be established.
    Connect,
    /// The server answered with a non-2xx status.
    Status(u16),
    /// The body could not be read or parsed as JSON.
    Body,
    /// The request could not be built or sent for another reason.
    Request,
}

impl fmt::Display for TransportFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Timeout => write!(f, "timeout"),
            Self::Connect => write!(f, "connect"),
            Self::Status(code) => write!(f, "http_{code}"),
            Self::Body => write!(f, "body"),
            Self::Request => write!(f, "request"),
        }
    }
}

/// Errors that can occur while fetching book metadata.
#[derive(Debug, Clone, Error)]
pub enum LookupError {
    /// The metadata source has no entry for this ISBN.
    #[error(
        "no metadata found for ISBN '{isbn}'\n  Suggestion: Check the ISBN or enter the book details manually"
    )]
    NotFound {
        /// The ISBN that was looked up
        isbn: String,
    },

    /// The request failed before a usable document arrived.
    #[error("lookup of ISBN '{isbn}' failed ({failure}): {reason}\n  Suggestion: {suggestion}")]
    Transport {
        /// The ISBN that was looked up
        isbn: String,
        /// Typed classification of the failure
        failure: TransportFailure,
        /// Why the request failed
        reason: String,
        /// How to fix the issue
        suggestion: String,
    },

    /// The document had an entry for the ISBN but not in the expected shape.
    #[error(
        "malformed metadata for ISBN '{isbn}': {reason}\n  Suggestion: Enter the book details manually"
    )]
    MalformedResponse {
        /// The ISBN that was looked up
        isbn: String,
        /// Which field was missing or mistyped
        reason: String,
    },
}

impl LookupError {
    /// Creates a `NotFound` error.
    #[must_use]
    pub fn not_found(isbn: &str) -> Self {
        Self::NotFound {
            isbn: isbn.to_string(),
        }
    }

    /// Creates a `Transport` error with a suggestion matched to the failure.
    #[must_use]
    pub fn transport(isbn: &str, failure: TransportFailure, reason: &str) -> Self {
        let suggestion = match failure {
            TransportFailure::Timeout => "The metadata service is slow to respond. Try again later",
            TransportFailure::Connect => "Check your network connection",
            TransportFailure::Status(429) => {
                "The metadata service is rate limiting requests. Wait a moment and try again"
            }
            TransportFailure::Status(code) if code >= 500 => {
                "The metadata service is unavailable. Try again later"
            }
            TransportFailure::Status(_) | TransportFailure::Body | TransportFailure::Request => {
                "Check the configured lookup base URL and try again"
            }
        };
        Self::Transport {
            isbn: isbn.to_string(),
            failure,
            reason: reason.to_string(),
            suggestion: suggestion.to_string(),
        }
    }

    /// Creates a `MalformedResponse` error.
    #[must_use]
    pub fn malformed(isbn: &str, reason: &str) -> Self {
        Self::MalformedResponse {
            isbn: isbn.to_string(),
            reason: reason.to_string(),
        }
    }

    /// Returns true for the expected "no such ISBN upstream" outcome.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Stable label for structured logs.
    #[must_use]
    pub fn kind_label(&self) -> &'static str {
        match self {
            Self::NotFound { .. } => "not_found",
            Self::Transport { .. } => "transport",
            Self::MalformedResponse { .. } => "malformed_response",
        }
    }
}
