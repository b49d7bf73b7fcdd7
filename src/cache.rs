//! Navigation caches
//!
//! [`PageDataCache`] and [`ModuleCache`] are constructed once and handed to
//! both the navigator and the prefetch scheduler. Cloning a cache shares the
//! same underlying storage. Entries live until the page is reloaded and are
//! only ever stored complete.
//!
//! With the `cache` feature, [`MatchCache`] memoizes route table lookups
//! with LRU eviction.

use crate::module::{LoadedModule, ModuleKind};
use crate::page_data::PageData;
use crate::path::{normalize_path, split_url};
use crate::trace_log;
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

/// Cache key for a URL: normalized path plus `?query` when present.
///
/// ```
/// use sparoute::cache::page_key;
///
/// assert_eq!(page_key("/users/42/"), "/users/42");
/// assert_eq!(page_key("/search?q=x#top"), "/search?q=x");
/// ```
pub fn page_key(url: &str) -> String {
    let (path, query) = split_url(url);
    let path = normalize_path(path);
    match query {
        Some(query) => format!("{}?{}", path, query),
        None => path.into_owned(),
    }
}

/// Cache performance statistics
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: usize,
    pub misses: usize,
    /// Entries discarded instead of trusted
    pub invalidations: usize,
}

impl CacheStats {
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

// ============================================================================
// Page Data
// ============================================================================

#[derive(Debug, Default)]
struct PageDataInner {
    entries: HashMap<String, Rc<PageData>>,
    stats: CacheStats,
}

/// Page payloads by [`page_key`]
#[derive(Debug, Clone, Default)]
pub struct PageDataCache {
    inner: Rc<RefCell<PageDataInner>>,
}

impl PageDataCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a URL
    pub fn get(&self, url: &str) -> Option<Rc<PageData>> {
        let key = page_key(url);
        let mut inner = self.inner.borrow_mut();
        match inner.entries.get(&key).cloned() {
            Some(data) => {
                inner.stats.hits += 1;
                trace_log!("page data cache hit for '{}'", key);
                Some(data)
            }
            None => {
                inner.stats.misses += 1;
                trace_log!("page data cache miss for '{}'", key);
                None
            }
        }
    }

    /// Store a payload, replacing any previous one
    pub fn insert(&self, url: &str, data: PageData) -> Rc<PageData> {
        let data = Rc::new(data);
        self.inner
            .borrow_mut()
            .entries
            .insert(page_key(url), Rc::clone(&data));
        data
    }

    /// Check for an entry without touching statistics
    pub fn contains(&self, url: &str) -> bool {
        self.inner.borrow().entries.contains_key(&page_key(url))
    }

    pub fn len(&self) -> usize {
        self.inner.borrow().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn stats(&self) -> CacheStats {
        self.inner.borrow().stats
    }
}

// ============================================================================
// Modules
// ============================================================================

#[derive(Debug, Default)]
struct ModuleInner {
    entries: HashMap<String, Rc<LoadedModule>>,
    stats: CacheStats,
}

/// Imported modules by module id
#[derive(Debug, Clone, Default)]
pub struct ModuleCache {
    inner: Rc<RefCell<ModuleInner>>,
}

impl ModuleCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a module expected to fill `kind`.
    ///
    /// An entry of the wrong kind is discarded and reported as a miss so the
    /// caller imports it again.
    pub fn get(&self, id: &str, kind: ModuleKind) -> Option<Rc<LoadedModule>> {
        let mut inner = self.inner.borrow_mut();
        match inner.entries.get(id).cloned() {
            Some(module) if module.kind == kind => {
                inner.stats.hits += 1;
                trace_log!("module cache hit for '{}'", id);
                Some(module)
            }
            Some(module) => {
                inner.entries.remove(id);
                inner.stats.invalidations += 1;
                inner.stats.misses += 1;
                trace_log!(
                    "discarding cached '{}': cached as {:?}, wanted {:?}",
                    id,
                    module.kind,
                    kind
                );
                None
            }
            None => {
                inner.stats.misses += 1;
                trace_log!("module cache miss for '{}'", id);
                None
            }
        }
    }

    /// Store a module under its id
    pub fn insert(&self, module: LoadedModule) -> Rc<LoadedModule> {
        let module = Rc::new(module);
        self.inner
            .borrow_mut()
            .entries
            .insert(module.id.clone(), Rc::clone(&module));
        module
    }

    /// Check for an entry of any kind without touching statistics
    pub fn contains(&self, id: &str) -> bool {
        self.inner.borrow().entries.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.inner.borrow().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn stats(&self) -> CacheStats {
        self.inner.borrow().stats
    }
}

// ============================================================================
// Match Resolution
// ============================================================================

#[cfg(feature = "cache")]
pub use match_cache::MatchCache;

#[cfg(feature = "cache")]
mod match_cache {
    use super::CacheStats;
    use crate::table::{RouteMatch, RouteTable};
    use crate::trace_log;
    use lru::LruCache;
    use std::num::NonZeroUsize;

    /// LRU memo of [`RouteTable::match_route`]
    ///
    /// Misses are cached too. The cache empties itself when handed a table
    /// from a different build.
    #[derive(Debug)]
    pub struct MatchCache {
        entries: LruCache<String, Option<RouteMatch>>,
        build_id: u64,
        stats: CacheStats,
    }

    impl MatchCache {
        const DEFAULT_CAPACITY: usize = 1000;

        pub fn new() -> Self {
            Self::with_capacity(Self::DEFAULT_CAPACITY)
        }

        /// A capacity of zero is raised to one
        pub fn with_capacity(capacity: usize) -> Self {
            let cap = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
            Self {
                entries: LruCache::new(cap),
                build_id: 0,
                stats: CacheStats::default(),
            }
        }

        /// Match `url` against `table`, reusing an earlier result when the
        /// table has not been rebuilt since.
        pub fn resolve(&mut self, table: &RouteTable, url: &str) -> Option<RouteMatch> {
            if table.build_id() != self.build_id {
                if !self.entries.is_empty() {
                    trace_log!("route table rebuilt, clearing match cache");
                    self.entries.clear();
                    self.stats.invalidations += 1;
                }
                self.build_id = table.build_id();
            }

            if let Some(cached) = self.entries.get(url) {
                self.stats.hits += 1;
                return cached.clone();
            }

            self.stats.misses += 1;
            let resolved = table.match_route(url);
            self.entries.put(url.to_string(), resolved.clone());
            resolved
        }

        pub fn clear(&mut self) {
            self.entries.clear();
            self.stats.invalidations += 1;
        }

        pub fn len(&self) -> usize {
            self.entries.len()
        }

        pub fn is_empty(&self) -> bool {
            self.entries.is_empty()
        }

        pub fn stats(&self) -> &CacheStats {
            &self.stats
        }
    }

    impl Default for MatchCache {
        fn default() -> Self {
            Self::new()
        }
    }
}
