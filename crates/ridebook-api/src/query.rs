// ── Filter sets and query-string construction ──
//
// Every list/export endpoint takes its query from a `FilterSet`. Values
// that are unset or empty strings never reach the wire; everything else
// is stringified.

use std::collections::BTreeMap;
use std::fmt;

use strum::{Display, EnumString};

/// Well-known filter keys shared by most list endpoints.
pub mod keys {
    pub const PAGE: &str = "page";
    pub const LIMIT: &str = "limit";
    pub const PAGE_SIZE: &str = "pageSize";
    pub const SEARCH: &str = "search";
    pub const STATUS: &str = "status";
    pub const TYPE: &str = "type";
    pub const DATE_RANGE: &str = "dateRange";
}

/// A single filter value.
///
/// `Unset` keeps a key present in the set (so a merge can blank out an
/// earlier value) while suppressing it on the wire.
#[derive(Debug, Clone, PartialEq)]
pub enum FilterValue {
    Text(String),
    Int(i64),
    Float(f64),
    Bool(bool),
    Unset,
}

impl FilterValue {
    /// The string sent in the query, or `None` if the key must be omitted.
    pub fn wire_value(&self) -> Option<String> {
        match self {
            Self::Text(s) if s.is_empty() => None,
            Self::Text(s) => Some(s.clone()),
            Self::Int(i) => Some(i.to_string()),
            Self::Float(f) => Some(f.to_string()),
            Self::Bool(b) => Some(b.to_string()),
            Self::Unset => None,
        }
    }

    pub fn is_transmitted(&self) -> bool {
        self.wire_value().is_some()
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(i) => Some(*i),
            Self::Text(s) => s.parse().ok(),
            _ => None,
        }
    }
}

impl fmt::Display for FilterValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.wire_value() {
            Some(v) => f.write_str(&v),
            None => f.write_str("<unset>"),
        }
    }
}

impl From<&str> for FilterValue {
    fn from(s: &str) -> Self {
        Self::Text(s.to_owned())
    }
}

impl From<String> for FilterValue {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<i64> for FilterValue {
    fn from(i: i64) -> Self {
        Self::Int(i)
    }
}

impl From<u32> for FilterValue {
    fn from(i: u32) -> Self {
        Self::Int(i64::from(i))
    }
}

impl From<u64> for FilterValue {
    fn from(i: u64) -> Self {
        i64::try_from(i).map_or_else(|_| Self::Text(i.to_string()), Self::Int)
    }
}

impl From<f64> for FilterValue {
    fn from(f: f64) -> Self {
        Self::Float(f)
    }
}

impl From<bool> for FilterValue {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<DateRange> for FilterValue {
    fn from(r: DateRange) -> Self {
        Self::Text(r.to_string())
    }
}

impl<T: Into<FilterValue>> From<Option<T>> for FilterValue {
    fn from(v: Option<T>) -> Self {
        v.map_or(Self::Unset, Into::into)
    }
}

/// Date-range buckets accepted by the reporting endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum DateRange {
    Today,
    Week,
    Month,
    Quarter,
}

/// Ordered mapping from filter key to value.
///
/// Keys are kept sorted so the emitted query string is deterministic.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterSet {
    entries: BTreeMap<String, FilterValue>,
}

impl FilterSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<FilterValue>) -> Self {
        self.set(key, value);
        self
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<FilterValue>) {
        self.entries.insert(key.into(), value.into());
    }

    pub fn remove(&mut self, key: &str) -> Option<FilterValue> {
        self.entries.remove(key)
    }

    pub fn get(&self, key: &str) -> Option<&FilterValue> {
        self.entries.get(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FilterValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Merge `partial` into `self`. Last write wins per key.
    pub fn merge(&mut self, partial: &FilterSet) {
        for (key, value) in &partial.entries {
            self.entries.insert(key.clone(), value.clone());
        }
    }

    /// Non-mutating variant of [`merge`](Self::merge).
    #[must_use]
    pub fn merged(&self, partial: &FilterSet) -> FilterSet {
        let mut out = self.clone();
        out.merge(partial);
        out
    }

    /// Key/value pairs that actually go on the wire, in key order.
    pub fn query_pairs(&self) -> Vec<(String, String)> {
        self.entries
            .iter()
            .filter_map(|(k, v)| v.wire_value().map(|w| (k.clone(), w)))
            .collect()
    }

    /// URL-encoded query string without the leading `?`.
    pub fn to_query_string(&self) -> String {
        let mut serializer = url::form_urlencoded::Serializer::new(String::new());
        for (k, v) in self.query_pairs() {
            serializer.append_pair(&k, &v);
        }
        serializer.finish()
    }

    /// Requested page, if one is set and parses as a positive integer.
    pub fn page(&self) -> Option<u64> {
        self.get(keys::PAGE)
            .and_then(FilterValue::as_int)
            .and_then(|p| u64::try_from(p).ok())
            .filter(|p| *p > 0)
    }
}

impl<K: Into<String>, V: Into<FilterValue>> FromIterator<(K, V)> for FilterSet {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut set = Self::new();
        for (k, v) in iter {
            set.set(k, v);
        }
        set
    }
}
