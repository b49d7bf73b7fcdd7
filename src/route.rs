//! Route entries and the file naming convention
//!
//! A route source tree is described by relative keys without extension,
//! such as `index`, `users/[id]`, `blog/_layout` or `api/users`. The same
//! keys come from a directory scan or from a production manifest, and
//! [`classify_route_file`] turns each one into what it registers.

use crate::matcher::RoutePattern;
use crate::path::join_base;
use crate::warn_log;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ============================================================================
// Kinds
// ============================================================================

/// What a route entry stands for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RouteKind {
    /// Renderable page
    Page,
    /// API handler under the API namespace
    Api,
    /// Layout wrapping every page below its scope
    Layout,
    /// Server middleware accumulated root-to-leaf
    Middleware,
    /// Named error page
    Error,
}

/// Named error pages: `_404`, `_error`, `_500`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ErrorPageKind {
    /// `_404`
    #[serde(rename = "404")]
    NotFound,
    /// `_error`
    #[serde(rename = "error")]
    Error,
    /// `_500`
    #[serde(rename = "500")]
    ServerError,
}

impl ErrorPageKind {
    /// Key used in config and payloads
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorPageKind::NotFound => "404",
            ErrorPageKind::Error => "error",
            ErrorPageKind::ServerError => "500",
        }
    }

    fn from_file_stem(stem: &str) -> Option<Self> {
        match stem {
            "_404" => Some(ErrorPageKind::NotFound),
            "_error" => Some(ErrorPageKind::Error),
            "_500" => Some(ErrorPageKind::ServerError),
            _ => None,
        }
    }
}

impl fmt::Display for ErrorPageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ErrorPageKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "404" => Ok(ErrorPageKind::NotFound),
            "error" => Ok(ErrorPageKind::Error),
            "500" => Ok(ErrorPageKind::ServerError),
            other => Err(format!("unknown error page kind '{}'", other)),
        }
    }
}

// ============================================================================
// RouteEntry
// ============================================================================

/// One compiled mapping from a URL pattern to a source module
///
/// `path` is normalized: leading `/`, no trailing slash except root. For a
/// catch-all entry the `*` segment is always last.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteEntry {
    /// URL pattern, e.g. `/users/:id`
    pub path: String,
    /// Opaque locator resolved by the module loader (file path or module id)
    pub source_ref: String,
    /// Entry kind
    pub kind: RouteKind,
    /// Dynamic segment names in order; the catch-all name is last
    pub param_names: Vec<String>,
    /// Whether the pattern ends in a catch-all
    pub is_catch_all: bool,
    pattern: RoutePattern,
}

impl RouteEntry {
    /// Create an entry and compile its pattern
    pub fn new(
        path: impl Into<String>,
        source_ref: impl Into<String>,
        kind: RouteKind,
        param_names: Vec<String>,
        is_catch_all: bool,
    ) -> Self {
        let path = path.into();
        let mut pattern = RoutePattern::parse(&path);
        if is_catch_all {
            if let Some(name) = param_names.last() {
                pattern = pattern.with_catch_all_name(name.clone());
            }
        }

        Self {
            path,
            source_ref: source_ref.into(),
            kind,
            param_names,
            is_catch_all,
            pattern,
        }
    }

    /// Compiled pattern
    pub fn pattern(&self) -> &RoutePattern {
        &self.pattern
    }

    /// Whether the path has no dynamic segments
    pub fn is_static(&self) -> bool {
        self.pattern.is_static()
    }

    /// Same entry mounted under `base_path`
    pub fn with_base_path(&self, base_path: &str) -> Self {
        Self::new(
            join_base(base_path, &self.path),
            self.source_ref.clone(),
            self.kind,
            self.param_names.clone(),
            self.is_catch_all,
        )
    }
}

// ============================================================================
// File Classification
// ============================================================================

/// What a single route file registers
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteFile {
    /// `_app` at the source root
    App,
    /// `_layout`, scoped to its directory pattern
    Layout {
        /// Directory pattern, `/` for the root layout
        scope: String,
    },
    /// `_middleware`, scoped to its directory pattern
    Middleware {
        /// Directory pattern, `/` for root
        scope: String,
    },
    /// `_404`, `_error` or `_500`
    ErrorPage {
        /// Which error page
        kind: ErrorPageKind,
        /// Directory depth, used to prefer the shallowest duplicate
        depth: usize,
    },
    /// A page or API route
    Route {
        /// URL pattern
        path: String,
        /// `Page` or `Api`
        kind: RouteKind,
        /// Dynamic segment names in order
        param_names: Vec<String>,
        /// Ends in a catch-all
        is_catch_all: bool,
    },
    /// Private or malformed file that registers nothing
    Ignored,
}

/// Pattern built from directory segments
#[derive(Debug, Default)]
struct PatternParts {
    path: String,
    param_names: Vec<String>,
    is_catch_all: bool,
}

/// Convert directory/file segments into a URL pattern.
///
/// `[name]` becomes `:name`, `[...name]` becomes `*`. Returns `None` when a
/// catch-all is not last or a bracket segment is empty.
fn build_pattern(segments: &[&str]) -> Option<PatternParts> {
    let mut parts = PatternParts::default();
    let last = segments.len().saturating_sub(1);

    for (i, segment) in segments.iter().enumerate() {
        if let Some(inner) = segment.strip_prefix('[').and_then(|s| s.strip_suffix(']')) {
            if let Some(name) = inner.strip_prefix("...") {
                if name.is_empty() || i != last {
                    return None;
                }
                parts.path.push_str("/*");
                parts.param_names.push(name.to_string());
                parts.is_catch_all = true;
            } else {
                if inner.is_empty() {
                    return None;
                }
                parts.path.push_str("/:");
                parts.path.push_str(inner);
                parts.param_names.push(inner.to_string());
            }
        } else {
            parts.path.push('/');
            parts.path.push_str(segment);
        }
    }

    if parts.path.is_empty() {
        parts.path.push('/');
    }
    Some(parts)
}

/// Classify a route file by its relative key (no extension, `/` separated).
///
/// `api_dir` is the directory path that holds API routes, usually `api`. It
/// may span several segments, e.g. `v1/api`.
///
/// ```
/// use sparoute::route::{classify_route_file, RouteFile, RouteKind};
///
/// match classify_route_file("users/[id]", "api") {
///     RouteFile::Route { path, kind, .. } => {
///         assert_eq!(path, "/users/:id");
///         assert_eq!(kind, RouteKind::Page);
///     }
///     other => panic!("unexpected {:?}", other),
/// }
/// ```
pub fn classify_route_file(key: &str, api_dir: &str) -> RouteFile {
    let segments: Vec<&str> = key
        .split(['/', '\\'])
        .filter(|s| !s.is_empty())
        .collect();

    let Some((file_stem, dirs)) = segments.split_last() else {
        return RouteFile::Ignored;
    };

    let scope = || build_pattern(dirs).map(|p| p.path);

    match *file_stem {
        "_app" if dirs.is_empty() => return RouteFile::App,
        "_app" => {
            warn_log!("ignoring nested _app at '{}': only the root _app is used", key);
            return RouteFile::Ignored;
        }
        "_layout" => {
            return scope().map_or(RouteFile::Ignored, |scope| RouteFile::Layout { scope });
        }
        "_middleware" => {
            return scope().map_or(RouteFile::Ignored, |scope| RouteFile::Middleware { scope });
        }
        _ => {}
    }

    if let Some(kind) = ErrorPageKind::from_file_stem(file_stem) {
        return RouteFile::ErrorPage {
            kind,
            depth: dirs.len(),
        };
    }

    if file_stem.starts_with('_') || file_stem.starts_with('.') {
        return RouteFile::Ignored;
    }

    let route_segments: &[&str] = if *file_stem == "index" { dirs } else { &segments };

    let Some(parts) = build_pattern(route_segments) else {
        warn_log!("ignoring malformed route file '{}'", key);
        return RouteFile::Ignored;
    };

    let api_dirs: Vec<&str> = api_dir.split('/').filter(|s| !s.is_empty()).collect();
    let kind = if !api_dirs.is_empty() && segments.len() > api_dirs.len() && segments.starts_with(&api_dirs) {
        RouteKind::Api
    } else {
        RouteKind::Page
    };

    RouteFile::Route {
        path: parts.path,
        kind,
        param_names: parts.param_names,
        is_catch_all: parts.is_catch_all,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn route(key: &str) -> (String, RouteKind, Vec<String>, bool) {
        match classify_route_file(key, "api") {
            RouteFile::Route {
                path,
                kind,
                param_names,
                is_catch_all,
            } => (path, kind, param_names, is_catch_all),
            other => panic!("expected route for '{}', got {:?}", key, other),
        }
    }

    #[test]
    fn test_index_maps_to_parent() {
        assert_eq!(route("index").0, "/");
        assert_eq!(route("blog/index").0, "/blog");
    }

    #[test]
    fn test_dynamic_and_catch_all() {
        let (path, kind, params, catch_all) = route("users/[id]");
        assert_eq!(path, "/users/:id");
        assert_eq!(kind, RouteKind::Page);
        assert_eq!(params, vec!["id"]);
        assert!(!catch_all);

        let (path, _, params, catch_all) = route("docs/[...rest]");
        assert_eq!(path, "/docs/*");
        assert_eq!(params, vec!["rest"]);
        assert!(catch_all);
    }

    #[test]
    fn test_catch_all_must_be_last() {
        assert_eq!(classify_route_file("a/[...x]/b", "api"), RouteFile::Ignored);
    }

    #[test]
    fn test_api_routes() {
        let (path, kind, _, _) = route("api/users");
        assert_eq!(path, "/api/users");
        assert_eq!(kind, RouteKind::Api);

        // a page literally named "api" at the root is still a page
        assert_eq!(route("api").1, RouteKind::Page);
    }

    #[test]
    fn test_nested_api_dir() {
        let kind_of = |key: &str| match classify_route_file(key, "v1/api") {
            RouteFile::Route { kind, .. } => kind,
            other => panic!("expected route for '{}', got {:?}", key, other),
        };

        assert_eq!(kind_of("v1/api/users"), RouteKind::Api);
        assert_eq!(kind_of("v1/api/users/[id]"), RouteKind::Api);
        assert_eq!(kind_of("v1/api"), RouteKind::Page);
        assert_eq!(kind_of("api/users"), RouteKind::Page);
        assert_eq!(kind_of("v1/docs"), RouteKind::Page);
    }

    #[test]
    fn test_special_files() {
        assert_eq!(classify_route_file("_app", "api"), RouteFile::App);
        assert_eq!(classify_route_file("admin/_app", "api"), RouteFile::Ignored);
        assert_eq!(
            classify_route_file("_layout", "api"),
            RouteFile::Layout { scope: "/".to_string() }
        );
        assert_eq!(
            classify_route_file("users/[id]/_layout", "api"),
            RouteFile::Layout {
                scope: "/users/:id".to_string()
            }
        );
        assert_eq!(
            classify_route_file("admin/_middleware", "api"),
            RouteFile::Middleware {
                scope: "/admin".to_string()
            }
        );
        assert_eq!(
            classify_route_file("_404", "api"),
            RouteFile::ErrorPage {
                kind: ErrorPageKind::NotFound,
                depth: 0
            }
        );
        assert_eq!(classify_route_file("_private", "api"), RouteFile::Ignored);
    }

    #[test]
    fn test_entry_catch_all_name() {
        let entry = RouteEntry::new("/docs/*", "docs/[...rest].tsx", RouteKind::Page, vec!["rest".into()], true);
        let params = entry.pattern().match_path("/docs/a/b").unwrap();
        assert_eq!(params.get("rest"), Some(&"a/b".to_string()));
    }

    #[test]
    fn test_entry_with_base_path() {
        let entry = RouteEntry::new("/", "index.tsx", RouteKind::Page, Vec::new(), false);
        assert_eq!(entry.with_base_path("/app").path, "/app");

        let entry = RouteEntry::new("/users/:id", "users/[id].tsx", RouteKind::Page, vec!["id".into()], false);
        let mounted = entry.with_base_path("/app");
        assert_eq!(mounted.path, "/app/users/:id");
        assert!(mounted.pattern().matches("/app/users/1"));
    }

    #[test]
    fn test_error_page_kind_round_trip_names() {
        for kind in [ErrorPageKind::NotFound, ErrorPageKind::Error, ErrorPageKind::ServerError] {
            assert_eq!(kind.as_str().parse::<ErrorPageKind>(), Ok(kind));
        }
    }
}
