//! Raw request parameters, as produced by a URL query-string parser.

use std::collections::btree_map::Entry;
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// One parameter value: a single string or a repeated key's list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    One(String),
    Many(Vec<String>),
}

impl ParamValue {
    /// The single value, if this parameter was given exactly once.
    pub fn as_single(&self) -> Option<&str> {
        match self {
            ParamValue::One(value) => Some(value),
            ParamValue::Many(_) => None,
        }
    }

    /// The first value given for this parameter.
    pub fn first(&self) -> Option<&str> {
        match self {
            ParamValue::One(value) => Some(value),
            ParamValue::Many(values) => values.first().map(String::as_str),
        }
    }
}

impl From<&str> for ParamValue {
    fn from(value: &str) -> Self {
        ParamValue::One(value.to_string())
    }
}

impl From<Vec<String>> for ParamValue {
    fn from(values: Vec<String>) -> Self {
        ParamValue::Many(values)
    }
}

/// Parameters keyed by name. Keys are case-sensitive (`minPrice`, `sortBy`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawParams(BTreeMap<String, ParamValue>);

impl RawParams {
    /// Create an empty parameter set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a URL query string (with or without the leading `?`).
    ///
    /// `+` decodes to a space and percent escapes are decoded; a malformed
    /// escape keeps the raw text. A key given more than once becomes
    /// [`ParamValue::Many`].
    pub fn from_query_string(query: &str) -> Self {
        let mut params = RawParams::new();
        let query = query.strip_prefix('?').unwrap_or(query);

        for pair in query.split('&').filter(|p| !p.is_empty()) {
            let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
            let key = decode_component(key);
            if key.is_empty() {
                continue;
            }
            params.append(key, decode_component(value));
        }

        params
    }

    /// Set a parameter, replacing any previous value.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<ParamValue>) {
        self.0.insert(key.into(), value.into());
    }

    /// Add a value, turning an existing parameter into a list.
    pub fn append(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let value = value.into();
        match self.0.entry(key.into()) {
            Entry::Vacant(slot) => {
                slot.insert(ParamValue::One(value));
            }
            Entry::Occupied(mut slot) => {
                let existing = slot.get_mut();
                match existing {
                    ParamValue::Many(values) => values.push(value),
                    ParamValue::One(first) => {
                        let first = std::mem::take(first);
                        *existing = ParamValue::Many(vec![first, value]);
                    }
                }
            }
        }
    }

    /// Builder-style [`insert`](Self::insert).
    pub fn with(mut self, key: impl Into<String>, value: impl Into<ParamValue>) -> Self {
        self.insert(key, value);
        self
    }

    /// Get a parameter.
    pub fn get(&self, key: &str) -> Option<&ParamValue> {
        self.0.get(key)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }
}

fn decode_component(raw: &str) -> String {
    let spaced = raw.replace('+', " ");
    match urlencoding::decode(&spaced) {
        Ok(decoded) => decoded.into_owned(),
        Err(_) => spaced,
    }
}

/// Percent-encode a value for use in a query string.
pub(crate) fn encode_component(value: &str) -> String {
    urlencoding::encode(value).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_query_string() {
        let params = RawParams::from_query_string("?search=linen+shirt&brand=Arc%2CForm&minPrice=30");
        assert_eq!(params.get("search"), Some(&ParamValue::from("linen shirt")));
        assert_eq!(params.get("brand"), Some(&ParamValue::from("Arc,Form")));
        assert_eq!(params.get("minPrice").and_then(ParamValue::as_single), Some("30"));
        assert_eq!(params.len(), 3);
    }

    #[test]
    fn test_repeated_key_becomes_list() {
        let params = RawParams::from_query_string("color=black&color=navy&color=white");
        assert_eq!(
            params.get("color"),
            Some(&ParamValue::Many(vec![
                "black".to_string(),
                "navy".to_string(),
                "white".to_string()
            ]))
        );
        assert_eq!(params.get("color").and_then(ParamValue::as_single), None);
        assert_eq!(params.get("color").and_then(ParamValue::first), Some("black"));
    }

    #[test]
    fn test_skips_empty_pairs_and_keys() {
        let params = RawParams::from_query_string("&&=orphan&sortBy&");
        assert_eq!(params.len(), 1);
        assert_eq!(params.get("sortBy"), Some(&ParamValue::from("")));
    }

    #[test]
    fn test_malformed_escape_is_kept() {
        let params = RawParams::from_query_string("search=100%25%ZZ");
        assert!(params.get("search").is_some());
    }

    #[test]
    fn test_deserialize_from_json_map() {
        let params: RawParams =
            serde_json::from_str(r#"{"brand": ["Arc", "Form"], "sortBy": "top-sells"}"#).unwrap();
        assert_eq!(params.get("sortBy"), Some(&ParamValue::from("top-sells")));
        assert!(matches!(params.get("brand"), Some(ParamValue::Many(v)) if v.len() == 2));
    }
}
