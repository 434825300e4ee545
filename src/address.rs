//! Splits free-text postal addresses into their components.
//!
//! Extracted invoices only carry a single address string such as
//! `"Hauptstr. 5, Berlin, 10115, Germany"`. This is a best-effort heuristic,
//! not a validator: every input, including the empty string, produces an
//! address with every field set (possibly to an empty string).

use std::sync::OnceLock;

use regex::Regex;
use serde::Serialize;

/// The components of a postal address.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PostalAddress {
    /// The street address line.
    pub address: String,
    /// The city or town.
    pub city: String,
    /// The state or region. Never populated by [split_address].
    pub state: String,
    /// The first run of digits found in the third segment.
    pub zip_code: String,
    /// The last comma separated segment.
    pub country: String,
}

/// Split a comma separated address into its components.
///
/// Segment 0 is the street, segment 1 the city, the postal code is the first
/// run of digits in segment 2 and the country is the last segment.
pub fn split_address(raw_address: &str) -> PostalAddress {
    if raw_address.is_empty() {
        return PostalAddress::default();
    }

    let parts: Vec<&str> = raw_address.split(',').map(str::trim).collect();
    let segment = |index: usize| parts.get(index).copied().unwrap_or_default().to_owned();

    let zip_code = parts
        .get(2)
        .and_then(|part| digits_pattern().find(part))
        .map(|found| found.as_str().to_owned())
        .unwrap_or_default();

    PostalAddress {
        address: segment(0),
        city: segment(1),
        state: String::new(),
        zip_code,
        country: parts.last().copied().unwrap_or_default().to_owned(),
    }
}

fn digits_pattern() -> &'static Regex {
    static DIGITS: OnceLock<Regex> = OnceLock::new();

    DIGITS.get_or_init(|| Regex::new(r"[0-9]+").expect("digit pattern is a valid regex"))
}
