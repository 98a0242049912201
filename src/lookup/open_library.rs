//! Open Library Books API client.
//!
//! The [`OpenLibraryClient`] calls `GET <base>/api/books?bibkeys=ISBN:<isbn>&jscmd=data&format=json`
//! and narrows the loosely-typed response into a [`BookRecord`]. The response
//! is keyed by the same `ISBN:<isbn>` bibkey, so the shape is not known
//! statically and is read as a [`serde_json::Value`].

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use tracing::{debug, warn};
use url::Url;

use crate::catalog::{BookRecord, UNKNOWN_AUTHOR};

use super::http_client::{build_lookup_http_client, classify_reqwest_error};
use super::{LookupConfig, LookupError, MetadataLookup, TransportFailure};

const SOURCE_NAME: &str = "openlibrary";

/// Path of the Books API relative to the base URL.
const BOOKS_API_PATH: &str = "api/books";

/// Builds the composite bibkey Open Library indexes responses by.
#[must_use]
pub fn bibkey(isbn: &str) -> String {
    format!("ISBN:{isbn}")
}

/// Resolves ISBNs to book records via the Open Library Books API.
///
/// Each [`fetch`](MetadataLookup::fetch) issues exactly one request; there
/// is no retry and no caching.
pub struct OpenLibraryClient {
    client: Client,
    books_endpoint: Url,
}

impl OpenLibraryClient {
    /// Creates a client against `https://openlibrary.org` with default timeouts.
    ///
    /// # Errors
    ///
    /// Returns [`LookupError`] if HTTP client construction fails.
    pub fn new() -> Result<Self, LookupError> {
        Self::with_config(&LookupConfig::default())
    }

    /// Creates a client with a custom base URL (for testing with wiremock).
    ///
    /// # Errors
    ///
    /// Returns [`LookupError`] if the URL is invalid or client construction fails.
    pub fn with_base_url(base_url: impl Into<String>) -> Result<Self, LookupError> {
        Self::with_config(&LookupConfig {
            base_url: base_url.into(),
            ..LookupConfig::default()
        })
    }

    /// Creates a client from a full lookup configuration.
    ///
    /// # Errors
    ///
    /// Returns [`LookupError`] if the base URL is invalid or client
    /// construction fails.
    #[tracing::instrument(skip_all, fields(base_url = %config.base_url))]
    pub fn with_config(config: &LookupConfig) -> Result<Self, LookupError> {
        let books_endpoint = books_endpoint(&config.base_url)?;
        let client = build_lookup_http_client(
            SOURCE_NAME,
            config.connect_timeout,
            config.request_timeout,
        )?;

        Ok(Self {
            client,
            books_endpoint,
        })
    }

    fn request_url(&self, isbn: &str) -> Url {
        let mut url = self.books_endpoint.clone();
        url.query_pairs_mut()
            .append_pair("bibkeys", &bibkey(isbn))
            .append_pair("jscmd", "data")
            .append_pair("format", "json");
        url
    }
}

impl std::fmt::Debug for OpenLibraryClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenLibraryClient")
            .field("books_endpoint", &self.books_endpoint.as_str())
            .finish_non_exhaustive()
    }
}

fn books_endpoint(base_url: &str) -> Result<Url, LookupError> {
    let mut base = Url::parse(base_url.trim()).map_err(|e| {
        LookupError::transport(
            "",
            TransportFailure::Request,
            &format!("invalid lookup base URL '{base_url}': {e}"),
        )
    })?;
    if !matches!(base.scheme(), "http" | "https") {
        return Err(LookupError::transport(
            "",
            TransportFailure::Request,
            &format!("lookup base URL '{base_url}' must use http or https"),
        ));
    }
    if !base.path().ends_with('/') {
        let path = format!("{}/", base.path());
        base.set_path(&path);
    }
    base.join(BOOKS_API_PATH).map_err(|e| {
        LookupError::transport(
            "",
            TransportFailure::Request,
            &format!("cannot build Books API URL from '{base_url}': {e}"),
        )
    })
}

#[async_trait]
impl MetadataLookup for OpenLibraryClient {
    fn name(&self) -> &'static str {
        SOURCE_NAME
    }

    #[tracing::instrument(skip(self), fields(source = SOURCE_NAME, isbn = %isbn))]
    async fn fetch(&self, isbn: &str) -> Result<BookRecord, LookupError> {
        let url = self.request_url(isbn);
        debug!(api_url = %url, "Calling Open Library Books API");

        let response = self.client.get(url).send().await.map_err(|e| {
            let failure = classify_reqwest_error(&e);
            warn!(error = %e, %failure, "Open Library request failed");
            LookupError::transport(isbn, failure, "Cannot reach Open Library")
        })?;

        let status = response.status();
        if !status.is_success() {
            debug!(status = status.as_u16(), "Open Library API error status");
            return Err(LookupError::transport(
                isbn,
                TransportFailure::Status(status.as_u16()),
                &format!("Open Library returned HTTP {}", status.as_u16()),
            ));
        }

        let body = response.json::<Value>().await.map_err(|e| {
            let failure = if e.is_timeout() {
                TransportFailure::Timeout
            } else {
                TransportFailure::Body
            };
            warn!(error = %e, %failure, "Failed to read Open Library response JSON");
            LookupError::transport(isbn, failure, "Unreadable Open Library response body")
        })?;

        extract_book_record(isbn, &body)
    }
}

// ==================== Extraction ====================

/// Narrows a Books API document into a [`BookRecord`] for `isbn`.
///
/// - Missing bibkey: [`LookupError::NotFound`].
/// - Missing, non-string or blank `title`: [`LookupError::MalformedResponse`].
/// - `authors` absent, null or empty, or a first author without a `name`:
///   author becomes [`UNKNOWN_AUTHOR`].
/// - `authors` present but not an array: [`LookupError::MalformedResponse`].
///
/// # Errors
///
/// See above.
pub fn extract_book_record(isbn: &str, document: &Value) -> Result<BookRecord, LookupError> {
    let Some(entries) = document.as_object() else {
        return Err(LookupError::malformed(
            isbn,
            "top-level document is not a JSON object",
        ));
    };

    let key = bibkey(isbn);
    let Some(entry) = entries.get(&key) else {
        debug!(bibkey = %key, "bibkey absent from Open Library response");
        return Err(LookupError::not_found(isbn));
    };

    let Some(entry) = entry.as_object() else {
        return Err(LookupError::malformed(
            isbn,
            &format!("entry for '{key}' is not a JSON object"),
        ));
    };

    let title = match entry.get("title") {
        Some(Value::String(title)) if !title.trim().is_empty() => title.trim().to_string(),
        Some(Value::String(_)) => {
            return Err(LookupError::malformed(isbn, "field 'title' is empty"));
        }
        Some(_) => {
            return Err(LookupError::malformed(isbn, "field 'title' is not a string"));
        }
        None => return Err(LookupError::malformed(isbn, "missing field 'title'")),
    };

    let author = match entry.get("authors") {
        None | Some(Value::Null) => UNKNOWN_AUTHOR.to_string(),
        Some(Value::Array(authors)) => first_author_name(authors),
        Some(_) => {
            return Err(LookupError::malformed(
                isbn,
                "field 'authors' is not an array",
            ));
        }
    };

    Ok(BookRecord::new(isbn, title, author))
}

fn first_author_name(authors: &[Value]) -> String {
    authors
        .first()
        .and_then(|first| first.get("name"))
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .unwrap_or(UNKNOWN_AUTHOR)
        .to_string()
}
