//! URL query-string model and the regex-literal filter encoding.
//!
//! [`LocationQuery`] is an ordered list of decoded key/value pairs with
//! `URLSearchParams`-style semantics: [`set`](LocationQuery::set) replaces
//! every existing entry for a key, serialization uses
//! `application/x-www-form-urlencoded` (so `/react/i` travels as
//! `%2Freact%2Fi`).
//!
//! Filter values are sent to the backend as delimited patterns. A location
//! is encoded as `/text/`, a keyword or a skill as `/text/i`.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;

/// Matches a delimited pattern, capturing the body between the slashes.
static PATTERN_LITERAL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)^/(.*)/i?$").expect("pattern literal regex is valid")
});

/// Separator for multi-valued parameters (`level`, `skills`).
pub const LIST_SEPARATOR: &str = ",";

/// An ordered, decoded view of a URL query string.
///
/// # Examples
///
/// ```
/// use jobboard_stores::LocationQuery;
///
/// let mut query = LocationQuery::parse("?location=%2FHanoi%2F&gte=100");
/// assert_eq!(query.get("location"), Some("/Hanoi/"));
///
/// query.set("gte", "200");
/// assert_eq!(query.to_string(), "location=%2FHanoi%2F&gte=200");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LocationQuery {
    pairs: Vec<(String, String)>,
}

impl LocationQuery {
    /// Create an empty query.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a raw query string. A leading `?` is ignored; empty input
    /// yields an empty query.
    pub fn parse(raw: &str) -> Self {
        let raw = raw.strip_prefix('?').unwrap_or(raw);
        let pairs = url::form_urlencoded::parse(raw.as_bytes())
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();
        Self { pairs }
    }

    /// Split a full path such as `/search?name=x` into its route and query.
    ///
    /// # Returns
    ///
    /// `(route, query)`; the query is empty when the path has no `?`.
    pub fn split_path(full_path: &str) -> (&str, Self) {
        match full_path.split_once('?') {
            Some((route, raw)) => (route, Self::parse(raw)),
            None => (full_path, Self::new()),
        }
    }

    /// The first value recorded for `key`, if any.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Whether any entry exists for `key`.
    pub fn contains(&self, key: &str) -> bool {
        self.pairs.iter().any(|(k, _)| k == key)
    }

    /// Set `key` to `value`.
    ///
    /// The first existing entry is overwritten in place and any further
    /// entries for the same key are dropped; a new key is appended.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.pairs.iter().position(|(k, _)| *k == key) {
            Some(idx) => {
                self.pairs[idx].1 = value;
                let mut seen = 0usize;
                self.pairs.retain(|(k, _)| {
                    if *k != key {
                        return true;
                    }
                    seen += 1;
                    seen == 1
                });
            }
            None => self.pairs.push((key, value)),
        }
    }

    /// Append an entry without touching existing ones.
    pub fn append(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.pairs.push((key.into(), value.into()));
    }

    /// Remove every entry for `key`.
    pub fn remove(&mut self, key: &str) {
        self.pairs.retain(|(k, _)| k != key);
    }

    /// Whether the query has no entries.
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Iterate over the decoded entries in order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.pairs.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl fmt::Display for LocationQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut serializer = url::form_urlencoded::Serializer::new(String::new());
        for (k, v) in &self.pairs {
            serializer.append_pair(k, v);
        }
        f.write_str(&serializer.finish())
    }
}

/// Encode a value as a case-sensitive pattern literal: `/value/`.
pub fn encode_pattern(value: &str) -> String {
    format!("/{value}/")
}

/// Encode a value as a case-insensitive pattern literal: `/value/i`.
pub fn encode_pattern_ci(value: &str) -> String {
    format!("/{value}/i")
}

/// Strip pattern-literal delimiters from a raw parameter value.
///
/// `/foo/i` and `/foo/` both decode to `foo`. Values that are not delimited
/// are returned unchanged.
///
/// # Examples
///
/// ```
/// use jobboard_stores::query::decode_pattern;
///
/// assert_eq!(decode_pattern("/react/i"), "react");
/// assert_eq!(decode_pattern("/Ho Chi Minh/"), "Ho Chi Minh");
/// assert_eq!(decode_pattern("plain"), "plain");
/// ```
pub fn decode_pattern(raw: &str) -> String {
    match PATTERN_LITERAL.captures(raw) {
        Some(caps) => caps[1].to_string(),
        None => raw.to_string(),
    }
}

/// Join values into one comma-separated parameter value.
pub fn join_list<I, S>(values: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    values
        .into_iter()
        .map(|v| v.as_ref().to_string())
        .collect::<Vec<_>>()
        .join(LIST_SEPARATOR)
}

/// Split a comma-separated parameter value, dropping empty segments.
pub fn split_list(raw: &str) -> impl Iterator<Item = &str> {
    raw.split(LIST_SEPARATOR)
        .map(str::trim)
        .filter(|s| !s.is_empty())
}
