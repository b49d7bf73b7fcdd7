//! Route parameter extraction and query string parsing
//!
//! Types for URL parameters extracted from route patterns (like `:id` or a
//! trailing catch-all) and from query strings (like `?page=1&sort=name`),
//! plus the validation applied to every extracted parameter.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Longest parameter value kept after sanitizing, in characters.
pub const MAX_PARAM_VALUE_LEN: usize = 2000;

/// Check that a parameter name is a safe identifier.
///
/// Accepts `[A-Za-z_$][A-Za-z0-9_$]*`.
///
/// ```
/// use sparoute::params::is_valid_identifier;
///
/// assert!(is_valid_identifier("id"));
/// assert!(is_valid_identifier("_post_id2"));
/// assert!(!is_valid_identifier("2fast"));
/// assert!(!is_valid_identifier("user-id"));
/// ```
pub fn is_valid_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' || c == '$' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
}

/// Strip control characters and bound the length of a parameter value.
///
/// ```
/// use sparoute::params::sanitize_param_value;
///
/// assert_eq!(sanitize_param_value("a\r\nb\u{0}c"), "abc");
/// ```
pub fn sanitize_param_value(value: &str) -> String {
    value
        .chars()
        .filter(|c| !c.is_control())
        .take(MAX_PARAM_VALUE_LEN)
        .collect()
}

/// Route parameters extracted from path segments
///
/// # Example
///
/// ```
/// use sparoute::RouteParams;
///
/// // Route pattern: /users/:id
/// // Matched path: /users/123
/// let mut params = RouteParams::new();
/// params.insert("id".to_string(), "123".to_string());
///
/// assert_eq!(params.get("id"), Some(&"123".to_string()));
/// assert_eq!(params.get_as::<i32>("id"), Some(123));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RouteParams {
    params: BTreeMap<String, String>,
}

impl RouteParams {
    /// Create new empty route params
    pub fn new() -> Self {
        Self::default()
    }

    /// Create from map
    pub fn from_map(params: BTreeMap<String, String>) -> Self {
        Self { params }
    }

    /// Get a parameter value as a string
    pub fn get(&self, key: &str) -> Option<&String> {
        self.params.get(key)
    }

    /// Get a parameter and parse it as a specific type
    ///
    /// Returns `None` if the parameter doesn't exist or cannot be parsed.
    pub fn get_as<T>(&self, key: &str) -> Option<T>
    where
        T: std::str::FromStr,
    {
        self.params.get(key)?.parse().ok()
    }

    /// Insert a parameter
    pub fn insert(&mut self, key: String, value: String) {
        self.params.insert(key, value);
    }

    /// Check if parameter exists
    pub fn contains(&self, key: &str) -> bool {
        self.params.contains_key(key)
    }

    /// Get all parameters
    pub fn all(&self) -> &BTreeMap<String, String> {
        &self.params
    }

    /// Iterate over all parameters in key order
    pub fn iter(&self) -> impl Iterator<Item = (&String, &String)> {
        self.params.iter()
    }

    /// Check if parameters are empty
    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    /// Get number of parameters
    pub fn len(&self) -> usize {
        self.params.len()
    }
}

// ============================================================================
// Query Parameters
// ============================================================================

/// Query parameters parsed from URL query string
///
/// Supports multiple values for the same key.
///
/// ```
/// use sparoute::QueryParams;
///
/// let query = QueryParams::from_query_string("page=1&sort=name&tag=rust&tag=web");
///
/// assert_eq!(query.get("page"), Some(&"1".to_string()));
/// assert_eq!(query.get_as::<i32>("page"), Some(1));
/// assert_eq!(query.get_all("tag").unwrap().len(), 2);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams {
    params: BTreeMap<String, Vec<String>>,
}

impl QueryParams {
    /// Create new empty query params
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse from query string (without the leading `?`)
    ///
    /// Keys without `=` are kept with an empty value. `+` decodes to a space.
    pub fn from_query_string(query: &str) -> Self {
        let mut params: BTreeMap<String, Vec<String>> = BTreeMap::new();

        for pair in query.split('&').filter(|p| !p.is_empty()) {
            let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
            params
                .entry(decode_component(key))
                .or_default()
                .push(decode_component(value));
        }

        Self { params }
    }

    /// Get first value for a parameter
    pub fn get(&self, key: &str) -> Option<&String> {
        self.params.get(key)?.first()
    }

    /// Get all values for a parameter
    pub fn get_all(&self, key: &str) -> Option<&Vec<String>> {
        self.params.get(key)
    }

    /// Get the first value parsed as type T
    pub fn get_as<T>(&self, key: &str) -> Option<T>
    where
        T: std::str::FromStr,
    {
        self.get(key)?.parse().ok()
    }

    /// Insert a parameter
    ///
    /// If the key already exists, the value is appended to the list.
    pub fn insert(&mut self, key: String, value: String) {
        self.params.entry(key).or_default().push(value);
    }

    /// Check if parameter exists
    pub fn contains(&self, key: &str) -> bool {
        self.params.contains_key(key)
    }

    /// Flatten to single values (first value wins), as carried in page props
    pub fn to_first_values(&self) -> BTreeMap<String, String> {
        self.params
            .iter()
            .filter_map(|(k, v)| v.first().map(|first| (k.clone(), first.clone())))
            .collect()
    }

    /// Convert to query string
    pub fn to_query_string(&self) -> String {
        self.params
            .iter()
            .flat_map(|(key, values)| {
                values
                    .iter()
                    .map(move |value| format!("{}={}", urlencoding::encode(key), urlencoding::encode(value)))
            })
            .collect::<Vec<_>>()
            .join("&")
    }

    /// Check if parameters are empty
    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    /// Get number of unique parameter keys
    pub fn len(&self) -> usize {
        self.params.len()
    }
}

/// Decode a query component. Malformed escapes are kept verbatim.
fn decode_component(s: &str) -> String {
    let spaced = s.replace('+', " ");
    match urlencoding::decode(&spaced) {
        Ok(decoded) => decoded.into_owned(),
        Err(_) => spaced,
    }
}
