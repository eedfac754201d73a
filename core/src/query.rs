//! Canonical query strings.
//!
//! Parameter sets are flattened into bracket notation (`key[sub]`,
//! `key[0]`), merged with whatever query the URL already carries, sorted by
//! flattened key, and percent-encoded. The output is a pure function of the
//! URL and the parameter set: insertion order never leaks into the result.

use std::collections::BTreeMap;

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use serde_json::Value;
use url::form_urlencoded;

/// Everything except `A-Z a-z 0-9 - _ . ! ~ * ' ( )` is escaped.
const COMPONENT_ESCAPE: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// RFC 3986 unreserved characters only: `A-Z a-z 0-9 - _ . ~`.
const FORM_ESCAPE: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

/// A single query parameter value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryValue {
    Scalar(String),
    /// One level of nesting, emitted as `key[sub]=value`.
    Map(Vec<(String, String)>),
    /// Emitted as `key[0]=value`, `key[1]=value`, ...
    List(Vec<String>),
}

impl From<&str> for QueryValue {
    fn from(value: &str) -> Self {
        QueryValue::Scalar(value.to_string())
    }
}

impl From<String> for QueryValue {
    fn from(value: String) -> Self {
        QueryValue::Scalar(value)
    }
}

impl From<&String> for QueryValue {
    fn from(value: &String) -> Self {
        QueryValue::Scalar(value.clone())
    }
}

impl From<bool> for QueryValue {
    fn from(value: bool) -> Self {
        QueryValue::Scalar(value.to_string())
    }
}

macro_rules! scalar_from_int {
    ($($t:ty),*) => {
        $(impl From<$t> for QueryValue {
            fn from(value: $t) -> Self {
                QueryValue::Scalar(value.to_string())
            }
        })*
    };
}

scalar_from_int!(i32, i64, u32, u64, usize);

impl From<Value> for QueryValue {
    fn from(value: Value) -> Self {
        QueryValue::from(&value)
    }
}

impl From<&Value> for QueryValue {
    fn from(value: &Value) -> Self {
        match value {
            Value::Object(map) => QueryValue::Map(
                map.iter()
                    .map(|(k, v)| (k.clone(), scalar_text(v)))
                    .collect(),
            ),
            Value::Array(items) => QueryValue::List(items.iter().map(scalar_text).collect()),
            other => QueryValue::Scalar(scalar_text(other)),
        }
    }
}

/// Text form of a JSON value sitting in scalar position. Containers below
/// the first nesting level are kept as compact JSON.
fn scalar_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// A named set of query parameters. Order of insertion is irrelevant to the
/// URLs built from it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams {
    entries: Vec<(String, QueryValue)>,
}

impl QueryParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a parameter, replacing any previous value under the same name.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<QueryValue>) {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key, value)),
        }
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<QueryValue>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &QueryValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Build from a JSON object. Anything that is not an object yields an
    /// empty set.
    pub fn from_json(value: &Value) -> Self {
        match value {
            Value::Object(map) => map.iter().map(|(k, v)| (k.clone(), QueryValue::from(v))).collect(),
            _ => Self::new(),
        }
    }
}

impl<K: Into<String>, V: Into<QueryValue>> FromIterator<(K, V)> for QueryParams {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut params = QueryParams::new();
        for (k, v) in iter {
            params.insert(k, v);
        }
        params
    }
}

/// Flatten a parameter set into bracket-notation keys.
pub fn flatten(params: &QueryParams) -> BTreeMap<String, String> {
    let mut flat = BTreeMap::new();
    for (key, value) in params.iter() {
        match value {
            QueryValue::Scalar(v) => {
                flat.insert(key.to_string(), v.clone());
            }
            QueryValue::Map(pairs) => {
                for (sub, v) in pairs {
                    flat.insert(format!("{key}[{sub}]"), v.clone());
                }
            }
            QueryValue::List(items) => {
                for (i, v) in items.iter().enumerate() {
                    flat.insert(format!("{key}[{i}]"), v.clone());
                }
            }
        }
    }
    flat
}

/// Percent-encode a query component.
pub fn encode_component(input: &str) -> String {
    utf8_percent_encode(input, COMPONENT_ESCAPE).to_string()
}

/// Percent-encode a form body value, escaping RFC 3986 sub-delimiters too.
pub fn encode_form_value(input: &str) -> String {
    utf8_percent_encode(input, FORM_ESCAPE).to_string()
}

/// Percent-encode a query key, leaving `[` and `]` readable.
pub fn encode_key(input: &str) -> String {
    encode_component(input).replace("%5B", "[").replace("%5D", "]")
}

/// Serialize a flattened parameter map. `BTreeMap` iteration gives the
/// ascending key order.
pub fn canonical_query(flat: &BTreeMap<String, String>) -> String {
    flat.iter()
        .map(|(k, v)| format!("{}={}", encode_key(k), encode_component(v)))
        .collect::<Vec<_>>()
        .join("&")
}

/// Append `params` to `url`, merging with any query the URL already has.
///
/// A URL without a query and an empty parameter set comes back untouched, so
/// no dangling `?` is ever produced.
pub fn build_url(url: &str, params: &QueryParams) -> String {
    let without_fragment = url.split('#').next().unwrap_or(url);
    let (base, existing) = match without_fragment.split_once('?') {
        Some((base, query)) => (base, query),
        None => (without_fragment, ""),
    };

    if existing.is_empty() && params.is_empty() {
        return base.to_string();
    }

    let mut merged: BTreeMap<String, String> = form_urlencoded::parse(existing.as_bytes())
        .into_owned()
        .collect();
    merged.extend(flatten(params));

    if merged.is_empty() {
        return base.to_string();
    }
    format!("{base}?{}", canonical_query(&merged))
}
