//! Configuration loaded from TOML
//!
//! ```toml
//! [routing]
//! pages_dir = "pages"
//! base_path = "/shop"
//!
//! [render]
//! default_mode = "hybrid"
//! routes = { "/dashboard" = "csr" }
//!
//! [prefetch]
//! enabled = true
//! routes = ["/about", "/blog"]
//! strategy = "batch"
//! ```
//!
//! Every field has a default, so an empty file is a valid config.

use crate::error::ConfigError;
use crate::prefetch::{PrefetchConfig, PrefetchStrategy};
use crate::render_mode::{RenderMode, RenderModeResolver};
use crate::table::RouteTableOptions;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;

/// Application configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub routing: RoutingConfig,

    #[serde(default)]
    pub render: RenderConfig,

    #[serde(default)]
    pub prefetch: PrefetchSettings,
}

/// `[routing]`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoutingConfig {
    /// Directory containing route files (default: "pages")
    #[serde(default = "default_pages_dir")]
    pub pages_dir: String,

    /// Mount point for all routes (e.g. "/app")
    #[serde(default)]
    pub base_path: Option<String>,

    /// URL prefix of API routes (default: "/api")
    #[serde(default = "default_api_prefix")]
    pub api_prefix: String,

    /// Route file extensions
    #[serde(default = "default_extensions")]
    pub extensions: Vec<String>,
}

/// `[render]`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderConfig {
    #[serde(default)]
    pub default_mode: RenderMode,

    /// Route pattern → mode
    #[serde(default)]
    pub routes: BTreeMap<String, RenderMode>,
}

/// `[prefetch]`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrefetchSettings {
    #[serde(default)]
    pub enabled: bool,

    #[serde(default)]
    pub routes: Vec<String>,

    #[serde(default)]
    pub strategy: PrefetchStrategy,

    /// Delay after page load, in milliseconds (default: 2000)
    #[serde(default = "default_delay_ms")]
    pub delay_ms: u64,

    #[serde(default)]
    pub show_loading: bool,
}

fn default_pages_dir() -> String {
    "pages".to_string()
}

fn default_api_prefix() -> String {
    "/api".to_string()
}

fn default_extensions() -> Vec<String> {
    RouteTableOptions::default().extensions
}

fn default_delay_ms() -> u64 {
    2000
}

impl Default for RoutingConfig {
    fn default() -> Self {
        Self {
            pages_dir: default_pages_dir(),
            base_path: None,
            api_prefix: default_api_prefix(),
            extensions: default_extensions(),
        }
    }
}

impl Default for PrefetchSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            routes: Vec::new(),
            strategy: PrefetchStrategy::default(),
            delay_ms: default_delay_ms(),
            show_loading: false,
        }
    }
}

impl AppConfig {
    /// Parse and validate TOML text
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: AppConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a file. A missing file yields the default config.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    /// Check values serde cannot
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(base) = self.routing.base_path.as_deref() {
            if base != "/" && (!base.starts_with('/') || base.ends_with('/')) {
                return Err(ConfigError::Invalid(format!(
                    "routing.base_path '{}' must start with '/' and not end with '/'",
                    base
                )));
            }
        }
        if !self.routing.api_prefix.starts_with('/') || self.routing.api_prefix.len() < 2 {
            return Err(ConfigError::Invalid(format!(
                "routing.api_prefix '{}' must be a non-root absolute path",
                self.routing.api_prefix
            )));
        }
        if self.routing.extensions.is_empty() {
            return Err(ConfigError::Invalid("routing.extensions is empty".to_string()));
        }
        if let Some(route) = self.prefetch.routes.iter().find(|r| !r.starts_with('/')) {
            return Err(ConfigError::Invalid(format!(
                "prefetch route '{}' must start with '/'",
                route
            )));
        }
        Ok(())
    }

    /// Options for building the route table
    pub fn route_table_options(&self) -> RouteTableOptions {
        RouteTableOptions {
            base_path: self.routing.base_path.clone(),
            api_prefix: self.routing.api_prefix.clone(),
            extensions: self
                .routing
                .extensions
                .iter()
                .map(|ext| ext.trim_start_matches('.').to_string())
                .collect(),
        }
    }

    /// Render mode resolver with the configured overrides
    pub fn render_mode_resolver(&self) -> RenderModeResolver {
        self.render
            .routes
            .iter()
            .fold(RenderModeResolver::new(self.render.default_mode), |resolver, (route, mode)| {
                resolver.with_override(route.clone(), *mode)
            })
    }

    /// Prefetch settings, or `None` when prefetching is disabled
    pub fn prefetch_config(&self) -> Option<PrefetchConfig> {
        if !self.prefetch.enabled {
            return None;
        }
        Some(PrefetchConfig {
            routes: self.prefetch.routes.clone(),
            strategy: self.prefetch.strategy,
            delay: Duration::from_millis(self.prefetch.delay_ms),
            show_loading: self.prefetch.show_loading,
            base_path: self.routing.base_path.clone().filter(|base| base != "/"),
        })
    }
}
