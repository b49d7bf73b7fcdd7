//! Page bootstrap payload
//!
//! The server serializes a [`PageData`] into the HTML document inside a
//! script tag carrying the [`PAGE_DATA_MARKER`] attribute. The client reads
//! it back with [`extract_page_data`], both for the initial document and for
//! documents fetched during navigation.

use crate::error::PageDataError;
use crate::params::RouteParams;
use crate::render_mode::RenderMode;
use crate::table::{RouteMatch, RouteTable};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Attribute that marks the payload script tag
pub const PAGE_DATA_MARKER: &str = "data-sparoute-page";

static PAGE_DATA_SCRIPT: Lazy<Option<Regex>> = Lazy::new(|| {
    // the attribute name must stand alone, not prefix a longer one
    Regex::new(r#"(?is)<script\b[^>]*\sdata-sparoute-page(?:[\s=/][^>]*)?>(.*?)</script\s*>"#).ok()
});

/// SEO fields carried with a page
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Metadata {
    pub title: Option<String>,
    pub description: Option<String>,
    pub keywords: Vec<String>,
    pub canonical: Option<String>,
    pub og_title: Option<String>,
    pub og_description: Option<String>,
    pub og_image: Option<String>,
    pub robots: Option<String>,
}

impl Metadata {
    /// Metadata with only a title
    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            ..Self::default()
        }
    }

    /// Whether no field is set
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Props handed to the page component
///
/// Loader output is flattened next to `params` and `query`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PageProps {
    pub params: RouteParams,
    pub query: BTreeMap<String, String>,
    #[serde(flatten)]
    pub data: serde_json::Map<String, serde_json::Value>,
}

impl PageProps {
    /// Loader value by key
    pub fn data(&self, key: &str) -> Option<&serde_json::Value> {
        self.data.get(key)
    }
}

/// Serialized route payload
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageData {
    /// Module id of the page to import
    pub route: String,
    #[serde(default)]
    pub render_mode: RenderMode,
    /// Nearest layout, kept for payloads that carry only one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub layout_path: Option<String>,
    /// Every inherited layout, most specific first
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub all_layout_paths: Vec<String>,
    #[serde(default)]
    pub props: PageProps,
    #[serde(default)]
    pub metadata: Metadata,
    /// `false` renders the page without any layout
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub layout: Option<bool>,
}

impl PageData {
    /// Build the payload for a matched route.
    ///
    /// Layout refs come from the table's layout chain for the matched path.
    pub fn for_match(
        table: &RouteTable,
        route_match: &RouteMatch,
        render_mode: RenderMode,
        data: serde_json::Map<String, serde_json::Value>,
        metadata: Metadata,
    ) -> Self {
        let all_layout_paths: Vec<String> = table
            .get_layouts(&route_match.path)
            .iter()
            .map(|layout| layout.source_ref.clone())
            .collect();

        Self {
            route: route_match.entry.source_ref.clone(),
            render_mode,
            layout_path: all_layout_paths.first().cloned(),
            all_layout_paths,
            props: PageProps {
                params: route_match.params.clone(),
                query: route_match.query.to_first_values(),
                data,
            },
            metadata,
            layout: None,
        }
    }

    /// Layout module ids to wrap the page in, most specific first
    pub fn layout_refs(&self) -> Vec<&str> {
        if self.layout == Some(false) {
            return Vec::new();
        }
        if self.all_layout_paths.is_empty() {
            return self.layout_path.iter().map(String::as_str).collect();
        }
        self.all_layout_paths.iter().map(String::as_str).collect()
    }
}

/// Read the payload out of an HTML document.
///
/// The script text is trimmed and a trailing `;` is tolerated.
///
/// ```
/// use sparoute::page_data::extract_page_data;
///
/// let html = r#"<body><script type="application/json" data-sparoute-page>
///   {"route": "pages/index.js", "renderMode": "hybrid"};
/// </script></body>"#;
/// let data = extract_page_data(html).unwrap();
/// assert_eq!(data.route, "pages/index.js");
/// ```
pub fn extract_page_data(html: &str) -> Result<PageData, PageDataError> {
    let text = PAGE_DATA_SCRIPT
        .as_ref()
        .and_then(|re| re.captures(html))
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
        .ok_or(PageDataError::MarkerNotFound)?;

    let text = text.trim();
    let text = text.strip_suffix(';').unwrap_or(text).trim_end();
    Ok(serde_json::from_str(text)?)
}

/// Serialize the payload into its script tag.
///
/// `</` is escaped so loader data can never close the tag early.
pub fn embed_page_data(data: &PageData) -> Result<String, PageDataError> {
    let json = serde_json::to_string(data)?.replace("</", "<\\/");
    Ok(format!(
        r#"<script type="application/json" {}>{}</script>"#,
        PAGE_DATA_MARKER, json
    ))
}
