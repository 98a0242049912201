//! ISBN input normalization and checksum validation.
//!
//! Scanners hand over raw barcode values and people type ISBNs with hyphens,
//! spaces or an `ISBN:` label. [`normalize`] reduces all of those to the bare
//! identifier the metadata source expects. [`checksum_valid`] is diagnostic
//! only; callers log a mismatch and carry on.

use std::sync::LazyLock;

use regex::Regex;
use tracing::trace;

/// Leading `ISBN`, `ISBN-10`, `ISBN-13` label with optional colon.
#[allow(clippy::expect_used)]
static ISBN_LABEL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^\s*isbn(?:-1[03])?\s*:?\s*").expect("ISBN label regex is valid") // Static pattern, safe to panic
});

/// Normalizes a scanned or typed ISBN candidate.
///
/// Strips an `ISBN` label, surrounding whitespace, inner spaces and hyphens,
/// and uppercases a trailing `x` check digit. Anything else is left alone so
/// the upstream can decide whether the value matches.
///
/// # Examples
///
/// ```
/// use bookshelf_core::isbn::normalize;
///
/// assert_eq!(normalize(" ISBN: 978-0-14-044913-6 "), "9780140449136");
/// assert_eq!(normalize("0-8044-2957-x"), "080442957X");
/// ```
#[must_use]
pub fn normalize(raw: &str) -> String {
    let unlabeled = ISBN_LABEL_PATTERN.replace(raw, "");
    let normalized: String = unlabeled
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '-')
        .map(|c| if c == 'x' { 'X' } else { c })
        .collect();
    trace!(raw = %raw, normalized = %normalized, "normalized ISBN candidate");
    normalized
}

/// Returns true when `isbn` is a well-formed ISBN-10 or ISBN-13 with a valid
/// check digit. Expects already-normalized input.
#[must_use]
pub fn checksum_valid(isbn: &str) -> bool {
    match isbn.len() {
        10 => isbn10_checksum_valid(isbn),
        13 => isbn13_checksum_valid(isbn),
        _ => false,
    }
}

fn isbn10_checksum_valid(isbn: &str) -> bool {
    let mut sum = 0u32;
    for (index, ch) in isbn.chars().enumerate() {
        let value = match ch {
            'X' if index == 9 => 10,
            _ => match ch.to_digit(10) {
                Some(digit) => digit,
                None => return false,
            },
        };
        // Weights run 10 down to 1.
        let weight = 10 - u32::try_from(index).unwrap_or(0);
        sum += value * weight;
    }
    sum % 11 == 0
}

fn isbn13_checksum_valid(isbn: &str) -> bool {
    let mut sum = 0u32;
    for (index, ch) in isbn.chars().enumerate() {
        let Some(digit) = ch.to_digit(10) else {
            return false;
        };
        sum += if index % 2 == 0 { digit } else { digit * 3 };
    }
    sum % 10 == 0
}
