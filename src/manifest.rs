//! Production route manifest
//!
//! A flat JSON object mapping a logical route key (`"index"`,
//! `"users/[id]"`, `"_layout"`) to a deployable module reference. Loaded
//! instead of scanning the source tree when running from a build.

use crate::error::RouteTableError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// Route key → module reference
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RouteManifest {
    entries: BTreeMap<String, String>,
}

impl RouteManifest {
    /// Create an empty manifest
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse from JSON text
    ///
    /// ```
    /// use sparoute::RouteManifest;
    ///
    /// let manifest = RouteManifest::from_json_str(r#"{"index": "assets/index.js"}"#).unwrap();
    /// assert_eq!(manifest.get("index"), Some("assets/index.js"));
    /// ```
    pub fn from_json_str(json: &str) -> Result<Self, RouteTableError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Read and parse a manifest file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, RouteTableError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| RouteTableError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&content)
    }

    /// Add an entry
    pub fn insert(&mut self, key: impl Into<String>, module_ref: impl Into<String>) {
        self.entries.insert(key.into(), module_ref.into());
    }

    /// Module reference for a key
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    /// Entries in key order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the manifest is empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
