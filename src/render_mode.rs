//! Per-route rendering mode
//!
//! The server resolves a mode for each matched route and ships it inside the
//! page payload. The client never recomputes it for the initial load; later
//! navigations honor the target page module's own declaration.

use crate::route::RouteEntry;
use crate::trace_log;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// How a page is produced
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RenderMode {
    /// Server produces final markup; the client stays out unless the page
    /// opts into hydration
    #[default]
    Ssr,
    /// Server sends a shell; the client produces all content
    Csr,
    /// Server renders and the client hydrates, falling back to a render
    Hybrid,
}

impl RenderMode {
    /// Wire name
    pub fn as_str(self) -> &'static str {
        match self {
            RenderMode::Ssr => "ssr",
            RenderMode::Csr => "csr",
            RenderMode::Hybrid => "hybrid",
        }
    }
}

impl fmt::Display for RenderMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RenderMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "ssr" => Ok(RenderMode::Ssr),
            "csr" => Ok(RenderMode::Csr),
            "hybrid" => Ok(RenderMode::Hybrid),
            other => Err(format!("unknown render mode '{}'", other)),
        }
    }
}

/// Resolves the render mode of a matched route
///
/// Precedence: the page module's own declaration, then a configured
/// override keyed by route pattern, then the default.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenderModeResolver {
    default_mode: RenderMode,
    overrides: BTreeMap<String, RenderMode>,
}

impl RenderModeResolver {
    /// Resolver with a default mode and no overrides
    pub fn new(default_mode: RenderMode) -> Self {
        Self {
            default_mode,
            overrides: BTreeMap::new(),
        }
    }

    /// Override the mode of one route pattern (e.g. `/dashboard` or `/users/:id`)
    pub fn with_override(mut self, route_path: impl Into<String>, mode: RenderMode) -> Self {
        self.overrides.insert(route_path.into(), mode);
        self
    }

    /// Default mode
    pub fn default_mode(&self) -> RenderMode {
        self.default_mode
    }

    /// Resolve the mode for `entry`, given what its module declares
    pub fn resolve(&self, entry: &RouteEntry, declared: Option<RenderMode>) -> RenderMode {
        let mode = declared
            .or_else(|| self.overrides.get(&entry.path).copied())
            .unwrap_or(self.default_mode);
        trace_log!("render mode for '{}': {}", entry.path, mode);
        mode
    }
}

/// What the client does with the container
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaintStrategy {
    /// Paint unconditionally
    Render,
    /// Attach behavior to existing markup
    Hydrate,
    /// Leave server markup untouched
    Keep,
}

impl PaintStrategy {
    /// Choose how to paint.
    ///
    /// An empty container is always rendered. Otherwise the target page's
    /// mode decides: hybrid pages and SSR pages that opt in are hydrated
    /// over the existing markup, CSR pages are rendered. Server markup of a
    /// plain SSR page is kept only on the initial load, since later the
    /// container holds the previous page.
    pub fn choose(mode: RenderMode, has_content: bool, initial: bool, hydrate_opt_in: bool) -> Self {
        if !has_content {
            return PaintStrategy::Render;
        }
        match mode {
            RenderMode::Hybrid => PaintStrategy::Hydrate,
            RenderMode::Ssr if hydrate_opt_in => PaintStrategy::Hydrate,
            RenderMode::Ssr if initial => PaintStrategy::Keep,
            RenderMode::Ssr | RenderMode::Csr => PaintStrategy::Render,
        }
    }
}
