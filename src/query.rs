//! Page query string handling.
//!
//! [`QueryParams`] is the read-only snapshot of the page URL taken once at
//! startup. [`mirror_coordinates`] produces the URL the page is rewritten
//! to whenever the crosshair position changes.

use std::collections::HashMap;

use percent_encoding::{
    percent_decode_str, utf8_percent_encode, AsciiSet, CONTROLS,
};

use crate::volume::{Axis, VoxelCoordinate};

/// Query parameter naming the volume to load.
pub const PAYLOAD_KEY: &str = "payload";

/// Characters that must stay escaped for a query to parse back into the
/// same pairs. Everything else is written verbatim to keep shared URLs
/// readable.
const QUERY_RESERVED: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'#')
    .add(b'%')
    .add(b'&')
    .add(b'+')
    .add(b'=');

/// Flat, case-sensitive mapping of query parameter names to raw values.
///
/// Absent keys mean "not specified". When a key repeats, the last
/// occurrence wins.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams {
    params: HashMap<String, String>,
}

impl QueryParams {
    /// Parse a `location.search` style string (leading `?` optional).
    #[must_use]
    pub fn parse(search: &str) -> Self {
        let query = search.strip_prefix('?').unwrap_or(search);
        Self {
            params: parse_pairs(query).into_iter().collect(),
        }
    }

    /// Parse the query component of a full URL.
    #[must_use]
    pub fn from_href(href: &str) -> Self {
        let (_, query, _) = split_href(href);
        query.map(Self::parse).unwrap_or_default()
    }

    /// Raw value of `key`, if present.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.params.get(key).map(String::as_str)
    }

    /// Number of distinct parameters.
    #[must_use]
    pub fn len(&self) -> usize {
        self.params.len()
    }

    /// Whether the query string carried no parameters.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    /// The payload URL with stray wrapping quotes removed, or `None` when
    /// no (non-empty) payload was given.
    #[must_use]
    pub fn payload(&self) -> Option<String> {
        self.get(PAYLOAD_KEY)
            .map(unquote)
            .filter(|url| !url.is_empty())
            .map(str::to_owned)
    }

    /// Requested position along `axis`.
    ///
    /// The lowercase key is consulted before the uppercase one and the
    /// first non-empty value wins. Values that do not start with an integer
    /// or are not strictly positive yield `None`.
    #[must_use]
    pub fn requested(&self, axis: Axis) -> Option<i32> {
        [axis.lower_key(), axis.upper_key()]
            .into_iter()
            .filter_map(|key| self.get(key))
            .find(|value| !value.is_empty())
            .and_then(parse_leading_int)
            .filter(|value| *value > 0)
    }
}

/// Strip any leading and trailing single or double quote characters.
#[must_use]
pub fn unquote(value: &str) -> &str {
    value.trim_matches(|c: char| c == '\'' || c == '"')
}

/// Parse the integer prefix of `value`: leading whitespace, an optional
/// sign, then at least one digit. Trailing garbage is ignored.
#[must_use]
pub fn parse_leading_int(value: &str) -> Option<i32> {
    let value = value.trim_start();
    let (negative, digits) = match value.as_bytes().first() {
        Some(b'-') => (true, &value[1..]),
        Some(b'+') => (false, &value[1..]),
        _ => (false, value),
    };
    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());
    if end == 0 {
        return None;
    }
    let magnitude = digits[..end].parse::<i32>().ok()?;
    Some(if negative { -magnitude } else { magnitude })
}

/// Rewrite `href` so its `X`, `Y` and `Z` parameters carry `coordinate`.
///
/// Existing uppercase keys are replaced in place (later duplicates are
/// dropped), missing ones are appended, and lowercase `x`/`y`/`z` are
/// removed so the URL reloads to the same position. Other parameters and
/// the fragment are kept. Values are written decoded, escaping only
/// spaces, `#`, `%`, `&`, `+`, `=`, control and non-ASCII characters.
#[must_use]
pub fn mirror_coordinates(href: &str, coordinate: VoxelCoordinate) -> String {
    let (base, query, fragment) = split_href(href);
    let mut pairs = query.map(parse_pairs).unwrap_or_default();

    pairs.retain(|(key, _)| {
        !Axis::ALL.iter().any(|axis| key == axis.lower_key())
    });
    for axis in Axis::ALL {
        let value = coordinate.get(axis).to_string();
        set_pair(&mut pairs, axis.upper_key(), value);
    }

    let query = pairs
        .iter()
        .map(|(key, value)| {
            format!(
                "{}={}",
                utf8_percent_encode(key, QUERY_RESERVED),
                utf8_percent_encode(value, QUERY_RESERVED)
            )
        })
        .collect::<Vec<_>>()
        .join("&");

    format!("{base}?{query}{fragment}")
}

// ── Internals ────────────────────────────────────────────────────────────

/// Split an URL into `(before '?', query without '?', fragment with '#')`.
fn split_href(href: &str) -> (&str, Option<&str>, &str) {
    let (rest, fragment) = match href.find('#') {
        Some(idx) => href.split_at(idx),
        None => (href, ""),
    };
    match rest.split_once('?') {
        Some((base, query)) => (base, Some(query), fragment),
        None => (rest, None, fragment),
    }
}

/// Decode `a=b&c=d` into ordered pairs. Empty segments are skipped, a key
/// without `=` maps to the empty string.
fn parse_pairs(query: &str) -> Vec<(String, String)> {
    query
        .split('&')
        .filter(|pair| !pair.is_empty())
        .map(|pair| {
            let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
            (decode_component(key), decode_component(value))
        })
        .collect()
}

/// Form-decode a single key or value (`+` is a space).
fn decode_component(raw: &str) -> String {
    let spaced = raw.replace('+', " ");
    percent_decode_str(&spaced).decode_utf8_lossy().into_owned()
}

/// Set the first `key` to `value` and drop later duplicates, or append.
fn set_pair(pairs: &mut Vec<(String, String)>, key: &str, value: String) {
    match pairs.iter().position(|(k, _)| k == key) {
        Some(first) => {
            pairs[first].1 = value;
            let mut idx = 0;
            pairs.retain(|(k, _)| {
                let keep = idx <= first || k != key;
                idx += 1;
                keep
            });
        }
        None => pairs.push((key.to_owned(), value)),
    }
}
