//! Metadata lookup: turn an ISBN into a [`BookRecord`] using an external source.
//!
//! # Architecture
//!
//! - [`MetadataLookup`] - Async trait the catalog service calls
//! - [`OpenLibraryClient`] - Open Library Books API implementation
//! - [`LookupConfig`] - Base URL and timeouts
//! - [`LookupError`] - `NotFound`, `Transport` or `MalformedResponse`
//!
//! # Example
//!
//! ```no_run
//! use bookshelf_core::lookup::{MetadataLookup, OpenLibraryClient};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = OpenLibraryClient::new()?;
//! let record = client.fetch("9780140449136").await?;
//! println!("{}", record.title);
//! # Ok(())
//! # }
//! ```

mod error;
mod http_client;
mod open_library;

pub use error::{LookupError, TransportFailure};
pub use open_library::{OpenLibraryClient, bibkey, extract_book_record};

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use crate::catalog::BookRecord;

/// Default Open Library base URL.
pub const DEFAULT_BASE_URL: &str = "https://openlibrary.org";

/// Default TCP connect timeout for lookups.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Default whole-request timeout for lookups.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Where and how long to look things up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LookupConfig {
    /// Base URL of the metadata source, without the API path.
    pub base_url: String,
    /// Connect timeout.
    pub connect_timeout: Duration,
    /// Whole-request timeout; expiry is reported as [`TransportFailure::Timeout`].
    pub request_timeout: Duration,
}

impl Default for LookupConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }
}

/// A single external source of book metadata.
///
/// Implementations issue one request per call and never retry; retrying is
/// the caller's decision.
#[async_trait]
pub trait MetadataLookup: Send + Sync {
    /// Returns the source name (e.g., "openlibrary").
    fn name(&self) -> &str;

    /// Fetches and normalizes the record for `isbn`.
    async fn fetch(&self, isbn: &str) -> Result<BookRecord, LookupError>;
}

#[async_trait]
impl<T: MetadataLookup + ?Sized> MetadataLookup for Arc<T> {
    fn name(&self) -> &str {
        (**self).name()
    }

    async fn fetch(&self, isbn: &str) -> Result<BookRecord, LookupError> {
        (**self).fetch(isbn).await
    }
}
