//! Shared User-Agent string for outbound metadata requests.
//!
//! Open Library asks clients to identify themselves; keep the format in one
//! place so every request carries the same header.

/// Project URL for User-Agent identification.
const PROJECT_UA_URL: &str = "https://github.com/fierce/bookshelf";

/// Default User-Agent for metadata lookup requests.
#[must_use]
pub(crate) fn default_lookup_user_agent() -> String {
    let version = env!("CARGO_PKG_VERSION");
    format!("bookshelf/{version} (personal-catalog; +{PROJECT_UA_URL})")
}
