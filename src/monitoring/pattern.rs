//! Filter pattern normalization
//!
//! Filter expressions arrive from configuration and metric filter metadata with
//! stray quoting and whitespace. The legacy `[error]` space-delimited pattern is
//! searched as the bare `error` term.

const LEGACY_ERROR_TOKEN: &str = "[error]";

fn strip_matching_quotes(text: &str) -> Option<&str> {
    let bytes = text.as_bytes();
    if bytes.len() < 2 {
        return None;
    }
    let (first, last) = (bytes[0], bytes[bytes.len() - 1]);
    if first == last && (first == b'"' || first == b'\'') {
        Some(&text[1..text.len() - 1])
    } else {
        None
    }
}

/// Canonicalize a filter expression for the log query.
///
/// Surrounding matching quotes and whitespace are peeled until neither remains,
/// so `normalize(&normalize(x)) == normalize(x)` for every input.
pub fn normalize(filter_expression: &str) -> String {
    let mut current = filter_expression.trim();
    while let Some(inner) = strip_matching_quotes(current) {
        current = inner.trim();
    }

    if current.eq_ignore_ascii_case(LEGACY_ERROR_TOKEN) {
        "error".to_string()
    } else {
        current.to_string()
    }
}

/// [`normalize`] for an absent expression, which normalizes to an empty string.
pub fn normalize_optional(filter_expression: Option<&str>) -> String {
    filter_expression.map(normalize).unwrap_or_default()
}
