//! Rendering of catalog records for stdout.

use anyhow::{Context, Result};
use bookshelf_core::BookRecord;

/// One record per line: `isbn<TAB>title<TAB>author`.
#[must_use]
pub(crate) fn render_tsv(books: &[BookRecord]) -> String {
    books
        .iter()
        .map(|book| format!("{}\t{}\t{}\n", book.isbn, book.title, book.author))
        .collect()
}

/// Multi-line, human-oriented view of a single record.
#[must_use]
pub(crate) fn render_detail(book: &BookRecord) -> String {
    format!(
        "ISBN:   {}\nTitle:  {}\nAuthor: {}\n",
        book.isbn, book.title, book.author
    )
}

pub(crate) fn render_json<T: serde::Serialize + ?Sized>(value: &T) -> Result<String> {
    serde_json::to_string_pretty(value).context("Failed to serialize catalog output as JSON")
}
