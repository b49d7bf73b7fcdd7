//! Route table: compiled routes, layouts, middlewares and error pages
//!
//! Built once from a source directory ([`RouteTable::scan`]) or a production
//! manifest ([`RouteTable::load_from_manifest`]) and read-only afterwards.
//! Every build replaces the whole table; nothing is merged with prior state.
//!
//! # Matching order
//!
//! 1. `basePath` prefix is enforced when configured
//! 2. Exact lookup among static routes
//! 3. Under the API namespace: static API routes longest-first as
//!    namespaces (`/api/users/list` resolves to `/api/users`), then dynamic
//!    API routes. Page routes are not considered.
//! 4. Dynamic and catch-all routes in priority order (see [`crate::matcher`])

use crate::error::RouteTableError;
use crate::manifest::RouteManifest;
use crate::matcher::RoutePattern;
use crate::params::{QueryParams, RouteParams};
use crate::path::{join_base, normalize_path, split_url, strip_base, PathHierarchy};
use crate::route::{classify_route_file, ErrorPageKind, RouteEntry, RouteFile, RouteKind};
use crate::{debug_log, info_log, trace_log, warn_log};
use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use walkdir::WalkDir;

static NEXT_BUILD_ID: AtomicU64 = AtomicU64::new(1);

/// Options applied when building a table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteTableOptions {
    /// Mount point for every page and API route; `None` or `/` for root
    pub base_path: Option<String>,
    /// URL prefix of the API namespace
    pub api_prefix: String,
    /// File extensions considered route files when scanning
    pub extensions: Vec<String>,
}

impl Default for RouteTableOptions {
    fn default() -> Self {
        Self {
            base_path: None,
            api_prefix: "/api".to_string(),
            extensions: ["tsx", "ts", "jsx", "js"].iter().map(|s| (*s).to_string()).collect(),
        }
    }
}

impl RouteTableOptions {
    /// Set the base path
    pub fn base_path(mut self, base_path: impl Into<String>) -> Self {
        self.base_path = Some(base_path.into());
        self
    }

    /// Set the API prefix
    pub fn api_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.api_prefix = prefix.into();
        self
    }

    fn validated_base(&self) -> Result<Option<String>, RouteTableError> {
        match self.base_path.as_deref() {
            None | Some("" | "/") => Ok(None),
            Some(base) if base.starts_with('/') && !base.ends_with('/') && !base.contains("//") => {
                Ok(Some(base.to_string()))
            }
            Some(base) => Err(RouteTableError::InvalidBasePath(base.to_string())),
        }
    }

    fn api_dir(&self) -> &str {
        self.api_prefix.trim_matches('/')
    }
}

/// Result of matching a URL against the table
#[derive(Debug, Clone, PartialEq)]
pub struct RouteMatch {
    /// Matched entry
    pub entry: Arc<RouteEntry>,
    /// Normalized URL path that was matched (query stripped)
    pub path: String,
    /// Extracted route parameters
    pub params: RouteParams,
    /// Parsed query string
    pub query: QueryParams,
}

/// The compiled route table
#[derive(Debug, Clone, Default)]
pub struct RouteTable {
    options: RouteTableOptions,
    base_path: Option<String>,
    build_id: u64,
    /// Page and API routes in registration order
    routes: Vec<Arc<RouteEntry>>,
    /// Static routes by exact path
    exact: HashMap<String, Arc<RouteEntry>>,
    /// Dynamic routes in priority order
    dynamic: Vec<Arc<RouteEntry>>,
    /// Static API routes, longest path first
    api_namespaces: Vec<Arc<RouteEntry>>,
    layouts: BTreeMap<String, Arc<RouteEntry>>,
    middlewares: BTreeMap<String, Arc<RouteEntry>>,
    error_pages: BTreeMap<ErrorPageKind, (usize, Arc<RouteEntry>)>,
    app: Option<Arc<RouteEntry>>,
}

impl PartialEq for RouteTable {
    /// Tables are equal when they hold the same entries in the same order,
    /// whichever build produced them.
    fn eq(&self, other: &Self) -> bool {
        self.base_path == other.base_path
            && self.routes == other.routes
            && self.dynamic == other.dynamic
            && self.api_namespaces == other.api_namespaces
            && self.layouts == other.layouts
            && self.middlewares == other.middlewares
            && self.error_pages == other.error_pages
            && self.app == other.app
    }
}

impl RouteTable {
    /// Create an empty table with the given options
    pub fn new(options: RouteTableOptions) -> Self {
        Self {
            options,
            ..Self::default()
        }
    }

    // ------------------------------------------------------------------------
    // Build
    // ------------------------------------------------------------------------

    /// Rebuild from a source directory.
    ///
    /// Files are visited in sorted order so repeated scans of an unchanged
    /// tree produce identical tables. Hidden entries and `node_modules` are
    /// skipped.
    pub fn scan(&mut self, dir: impl AsRef<Path>) -> Result<(), RouteTableError> {
        let dir = dir.as_ref();
        std::fs::metadata(dir).map_err(|source| RouteTableError::Io {
            path: dir.to_path_buf(),
            source,
        })?;

        let mut files = Vec::new();
        let walker = WalkDir::new(dir)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| {
                let name = e.file_name().to_string_lossy();
                e.depth() == 0 || !(name.starts_with('.') || name == "node_modules")
            });

        for entry in walker {
            let entry = entry?;
            if !entry.file_type().is_file() {
                continue;
            }
            let Ok(relative) = entry.path().strip_prefix(dir) else {
                continue;
            };
            let Some(ext) = relative.extension().and_then(|e| e.to_str()) else {
                continue;
            };
            if !self.options.extensions.iter().any(|allowed| allowed == ext) {
                continue;
            }

            let source_ref = relative
                .components()
                .map(|c| c.as_os_str().to_string_lossy())
                .collect::<Vec<_>>()
                .join("/");
            let key = source_ref
                .strip_suffix(ext)
                .and_then(|s| s.strip_suffix('.'))
                .unwrap_or(&source_ref)
                .to_string();

            files.push((key, source_ref));
        }

        debug_log!("scanned {} route files under '{}'", files.len(), dir.display());
        self.build(files)
    }

    /// Rebuild from a production manifest
    pub fn load_from_manifest(&mut self, manifest: &RouteManifest) -> Result<(), RouteTableError> {
        self.build(
            manifest
                .iter()
                .map(|(key, module_ref)| (key.to_string(), module_ref.to_string())),
        )
    }

    /// Rebuild from `(route key, source ref)` pairs.
    ///
    /// The new table is assembled separately and swapped in only on success.
    pub fn build<I>(&mut self, files: I) -> Result<(), RouteTableError>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let mut next = RouteTable::new(self.options.clone());
        next.base_path = self.options.validated_base()?;
        next.build_id = NEXT_BUILD_ID.fetch_add(1, Ordering::Relaxed);

        let api_dir = self.options.api_dir().to_string();
        for (key, source_ref) in files {
            next.register(&key, source_ref, &api_dir);
        }
        next.finish();

        info_log!(
            "route table built: {} routes ({} dynamic), {} layouts, {} middlewares, {} error pages",
            next.routes.len(),
            next.dynamic.len(),
            next.layouts.len(),
            next.middlewares.len(),
            next.error_pages.len()
        );

        *self = next;
        Ok(())
    }

    fn register(&mut self, key: &str, source_ref: String, api_dir: &str) {
        match classify_route_file(key, api_dir) {
            RouteFile::App => {
                if self.app.is_some() {
                    warn_log!("duplicate _app '{}' ignored", source_ref);
                    return;
                }
                self.app = Some(Arc::new(RouteEntry::new("/", source_ref, RouteKind::Page, Vec::new(), false)));
            }
            RouteFile::Layout { scope } => {
                let entry = scoped_entry(&scope, source_ref, RouteKind::Layout);
                insert_scoped(&mut self.layouts, scope, entry);
            }
            RouteFile::Middleware { scope } => {
                let entry = scoped_entry(&scope, source_ref, RouteKind::Middleware);
                insert_scoped(&mut self.middlewares, scope, entry);
            }
            RouteFile::ErrorPage { kind, depth } => {
                let shallower = self
                    .error_pages
                    .get(&kind)
                    .map_or(true, |(existing, _)| depth < *existing);
                if shallower {
                    let entry = RouteEntry::new("/", source_ref, RouteKind::Error, Vec::new(), false);
                    self.error_pages.insert(kind, (depth, Arc::new(entry)));
                }
            }
            RouteFile::Route {
                path,
                kind,
                param_names,
                is_catch_all,
            } => {
                if self.routes.iter().any(|e| e.path == path) {
                    warn_log!("duplicate route '{}' from '{}' ignored", path, source_ref);
                    return;
                }
                trace_log!("registered {:?} route '{}' -> '{}'", kind, path, source_ref);
                self.routes
                    .push(Arc::new(RouteEntry::new(path, source_ref, kind, param_names, is_catch_all)));
            }
            RouteFile::Ignored => {
                trace_log!("ignored route file '{}'", key);
            }
        }
    }

    /// Mount routes under the base path and build the lookup indexes
    fn finish(&mut self) {
        if let Some(base) = &self.base_path {
            self.routes = self
                .routes
                .iter()
                .map(|entry| Arc::new(entry.with_base_path(base)))
                .collect();
        }

        for entry in &self.routes {
            if entry.is_static() {
                self.exact.insert(entry.path.clone(), Arc::clone(entry));
                if entry.kind == RouteKind::Api {
                    self.api_namespaces.push(Arc::clone(entry));
                }
            } else {
                self.dynamic.push(Arc::clone(entry));
            }
        }

        // stable sorts keep registration order as the final tie-break
        self.dynamic.sort_by_key(|e| e.pattern().priority());
        self.api_namespaces
            .sort_by_key(|e| std::cmp::Reverse(e.path.len()));
    }

    // ------------------------------------------------------------------------
    // Match
    // ------------------------------------------------------------------------

    /// Match a URL (path with optional query) against the table.
    ///
    /// Returns the first match in priority order or `None`.
    pub fn match_route(&self, url: &str) -> Option<RouteMatch> {
        let (raw_path, query) = split_url(url);
        let path = normalize_path(raw_path);

        if let Some(base) = &self.base_path {
            if strip_base(base, &path).is_none() {
                trace_log!("'{}' is outside base path '{}'", path, base);
                return None;
            }
        }

        let found = self.find_entry(&path)?;
        let query = query.map(QueryParams::from_query_string).unwrap_or_default();

        Some(RouteMatch {
            entry: found.0,
            path: path.into_owned(),
            params: found.1,
            query,
        })
    }

    fn find_entry(&self, path: &str) -> Option<(Arc<RouteEntry>, RouteParams)> {
        if let Some(entry) = self.exact.get(path) {
            return Some((Arc::clone(entry), RouteParams::new()));
        }

        if self.in_api_namespace(path) {
            let namespace = self.api_namespaces.iter().find(|entry| {
                path.strip_prefix(entry.path.as_str())
                    .is_some_and(|rest| rest.is_empty() || rest.starts_with('/'))
            });
            if let Some(entry) = namespace {
                return Some((Arc::clone(entry), RouteParams::new()));
            }

            return self
                .dynamic
                .iter()
                .filter(|entry| entry.kind == RouteKind::Api)
                .find_map(|entry| entry.pattern().match_path(path).map(|p| (Arc::clone(entry), p)));
        }

        self.dynamic
            .iter()
            .find_map(|entry| entry.pattern().match_path(path).map(|p| (Arc::clone(entry), p)))
    }

    fn in_api_namespace(&self, path: &str) -> bool {
        let api_root = join_base(
            self.base_path.as_deref().unwrap_or("/"),
            &normalize_path(&self.options.api_prefix),
        );
        path.strip_prefix(api_root.as_str())
            .is_some_and(|rest| rest.is_empty() || rest.starts_with('/'))
    }

    // ------------------------------------------------------------------------
    // Scoped Lookups
    // ------------------------------------------------------------------------

    /// Nearest layout at or above `path`, falling back to the root layout.
    pub fn get_layout(&self, path: &str) -> Option<&RouteEntry> {
        let path = self.scope_path(path);
        PathHierarchy::new(&path)
            .find_map(|ancestor| find_scoped(&self.layouts, ancestor))
            .map(Arc::as_ref)
    }

    /// Every layout from the nearest ancestor up to root, most specific first
    pub fn get_layouts(&self, path: &str) -> Vec<&RouteEntry> {
        let path = self.scope_path(path);
        PathHierarchy::new(&path)
            .filter_map(|ancestor| find_scoped(&self.layouts, ancestor))
            .map(Arc::as_ref)
            .collect()
    }

    /// Middlewares registered on the way from root to `path`, in that order
    pub fn get_middlewares(&self, path: &str) -> Vec<&RouteEntry> {
        let path = self.scope_path(path);
        let mut chain: Vec<&RouteEntry> = PathHierarchy::new(&path)
            .filter_map(|ancestor| find_scoped(&self.middlewares, ancestor))
            .map(Arc::as_ref)
            .collect();
        chain.reverse();
        chain
    }

    /// Named error page
    pub fn get_error_page(&self, kind: ErrorPageKind) -> Option<&RouteEntry> {
        self.error_pages.get(&kind).map(|(_, entry)| entry.as_ref())
    }

    /// App shell
    pub fn get_app(&self) -> Option<&RouteEntry> {
        self.app.as_deref()
    }

    /// Strip the base path and query for scope walks
    fn scope_path(&self, path: &str) -> String {
        let path = normalize_path(split_url(path).0);
        match &self.base_path {
            Some(base) => strip_base(base, &path).unwrap_or(&*path).to_string(),
            None => path.into_owned(),
        }
    }

    // ------------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------------

    /// Page and API routes in registration order
    pub fn routes(&self) -> impl Iterator<Item = &RouteEntry> {
        self.routes.iter().map(Arc::as_ref)
    }

    /// Route with exactly this pattern path
    pub fn get(&self, path: &str) -> Option<&RouteEntry> {
        self.routes.iter().find(|e| e.path == path).map(Arc::as_ref)
    }

    /// Number of page and API routes
    pub fn len(&self) -> usize {
        self.routes.len()
    }

    /// Whether the table has no routes
    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// Effective base path, `None` when mounted at root
    pub fn base_path(&self) -> Option<&str> {
        self.base_path.as_deref()
    }

    /// Identifier of the build that produced this table. Changes on every
    /// rebuild, including rebuilds with identical content.
    pub fn build_id(&self) -> u64 {
        self.build_id
    }

    /// Options this table is built with
    pub fn options(&self) -> &RouteTableOptions {
        &self.options
    }
}

fn scoped_entry(scope: &str, source_ref: String, kind: RouteKind) -> RouteEntry {
    let param_names = RoutePattern::parse(scope)
        .segments()
        .iter()
        .filter_map(|s| match s {
            crate::matcher::Segment::Param(name) => Some(name.clone()),
            _ => None,
        })
        .collect();
    RouteEntry::new(scope, source_ref, kind, param_names, false)
}

fn insert_scoped(map: &mut BTreeMap<String, Arc<RouteEntry>>, scope: String, entry: RouteEntry) {
    if map.contains_key(&scope) {
        warn_log!("duplicate {:?} for scope '{}' ignored", entry.kind, scope);
        return;
    }
    map.insert(scope, Arc::new(entry));
}

/// Scoped attachment for one ancestor: an exact scope first, then a dynamic
/// scope whose pattern matches the ancestor.
fn find_scoped<'a>(map: &'a BTreeMap<String, Arc<RouteEntry>>, ancestor: &str) -> Option<&'a Arc<RouteEntry>> {
    map.get(ancestor).or_else(|| {
        map.values()
            .find(|entry| !entry.is_static() && entry.pattern().matches(ancestor))
    })
}
