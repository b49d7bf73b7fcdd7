//! # sparoute
//!
//! File-system routing and client-side navigation for apps that render on
//! the server and take over in the browser:
//!
//! - **Route Table** - Build routes from a `pages/` tree or a module manifest,
//!   with layouts, middleware, error pages and API namespaces
//! - **Route Matching** - Exact, dynamic (`[id]`) and catch-all (`[...slug]`)
//!   segments, ordered by specificity
//! - **Render Modes** - SSR, CSR and hybrid per route
//! - **Page Data** - Typed payload embedded in server HTML and reused on the client
//! - **Client Navigator** - Fetch, import, compose and paint with
//!   last-clicked-wins semantics and full-reload fallback
//! - **Prefetching** - Warm caches for likely routes, one by one or in a batch
//! - **Link Interception** - Decide which anchor clicks become in-app navigations
//!
//! # Quick Start
//!
//! ```
//! use sparoute::{RouteTable, RouteTableOptions};
//!
//! let mut table = RouteTable::new(RouteTableOptions::default());
//! table
//!     .build([
//!         ("index".to_string(), "pages/index.tsx".to_string()),
//!         ("users/[id]".to_string(), "pages/users/[id].tsx".to_string()),
//!         ("_layout".to_string(), "pages/_layout.tsx".to_string()),
//!     ])
//!     .unwrap();
//!
//! let route_match = table.match_route("/users/42?tab=posts").unwrap();
//! assert_eq!(route_match.entry.path, "/users/:id");
//! assert_eq!(route_match.params.get("id"), Some(&"42".to_string()));
//! assert_eq!(route_match.query.get("tab"), Some(&"posts".to_string()));
//! assert_eq!(table.get_layouts("/users/42").len(), 1);
//! ```
//!
//! # Navigation
//!
//! [`ClientNavigator`] is generic over a [`host::NavigatorHost`], the set of
//! browser capabilities it needs (fetch, module import, rendering, history).
//! Caches are shared handles, so a [`PrefetchScheduler`] built from clones of
//! the same caches warms what the navigator reads.
//!
//! ```ignore
//! let page_data = PageDataCache::new();
//! let modules = ModuleCache::new();
//! let navigator = ClientNavigator::new(host.clone(), page_data.clone(), modules.clone());
//!
//! navigator.bootstrap(&document_html, "/").await;
//! navigator.navigate_to("/users/42", NavigationKind::Push).await;
//! ```
//!
//! # Feature Flags
//!
//! - `log` (default) - Uses the standard `log` crate for logging
//! - `tracing` - Uses the `tracing` crate for structured logging (mutually exclusive with `log`)
//! - `cache` (default) - LRU [`cache::MatchCache`] for repeated route matches

#![doc(html_root_url = "https://docs.rs/sparoute/0.1.0")]
#![cfg_attr(docsrs, feature(doc_cfg))]
// Lints are configured in Cargo.toml [lints] section

// Logging abstraction
pub mod logging;

// Core routing modules
pub mod manifest;
pub mod matcher;
pub mod params;
pub mod path;
pub mod route;
pub mod table;

// Rendering
pub mod module;
pub mod page_data;
pub mod render_mode;
pub mod seo;

// Client runtime
pub mod cache;
pub mod history;
pub mod host;
pub mod interceptor;
pub mod navigator;
pub mod prefetch;

// Configuration
pub mod config;

// Error handling
pub mod error;

#[cfg(test)]
mod test_support;

// Re-export main types for convenient access
#[cfg(feature = "cache")]
pub use cache::MatchCache;
pub use cache::{CacheStats, ModuleCache, PageDataCache};
pub use config::AppConfig;
pub use error::{
    ConfigError, FetchError, ImportError, NavigationError, NavigationResult, PageDataError,
    RenderError, RouteTableError,
};
pub use history::{HistoryState, MemoryHistory};
pub use interceptor::{InterceptDecision, LinkClick, LinkInterceptor, Modifiers};
pub use manifest::RouteManifest;
pub use matcher::RoutePattern;
pub use module::{Element, LoadedModule, ModuleExports, ModuleKind};
pub use navigator::{ClientNavigator, NavState, NavigationKind};
pub use page_data::{extract_page_data, Metadata, PageData, PageProps};
pub use params::{QueryParams, RouteParams};
pub use prefetch::{PrefetchConfig, PrefetchReport, PrefetchScheduler, PrefetchStrategy};
pub use render_mode::{RenderMode, RenderModeResolver};
pub use route::{ErrorPageKind, RouteEntry, RouteKind};
pub use table::{RouteMatch, RouteTable, RouteTableOptions};

/// Navigation direction indicator.
///
/// Tells listeners whether a route change added a history entry, went back,
/// or replaced the current one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavigationDirection {
    /// Navigating forward to a new route
    Forward,
    /// Navigating back in history
    Back,
    /// Replacing the current route without affecting history direction
    Replace,
}

/// Event emitted when the route changes.
///
/// Contains the source and destination paths and the direction of
/// navigation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteChangeEvent {
    /// The previous path (None if this is the first navigation)
    pub from: Option<String>,
    /// The new path being navigated to
    pub to: String,
    /// The direction of navigation
    pub direction: NavigationDirection,
}
