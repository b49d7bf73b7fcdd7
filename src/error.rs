//! Error types for the route table, page payloads and client navigation
//!
//! Navigation failures follow one rule: a failure that means "this route
//! does not exist here" forces a full page load, anything else leaves the
//! current UI in place.

use std::path::PathBuf;
use thiserror::Error;

// ============================================================================
// Route Table
// ============================================================================

/// Errors raised while building a route table
#[derive(Debug, Error)]
pub enum RouteTableError {
    /// Reading the source tree or manifest failed
    #[error("failed to read '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Walking the source tree failed
    #[error("failed to walk route directory: {0}")]
    Walk(#[from] walkdir::Error),

    /// Manifest JSON could not be decoded
    #[error("invalid route manifest: {0}")]
    Manifest(#[from] serde_json::Error),

    /// `basePath` must be `/` or a normalized absolute path
    #[error("invalid base path '{0}': expected a leading '/' and no trailing '/'")]
    InvalidBasePath(String),
}

// ============================================================================
// Page Data
// ============================================================================

/// Errors raised while reading an embedded page payload
#[derive(Debug, Error)]
pub enum PageDataError {
    /// The document has no script tag carrying the payload marker
    #[error("page data script tag not found")]
    MarkerNotFound,

    /// The payload was found but is not valid page data
    #[error("invalid page data payload: {0}")]
    Json(#[from] serde_json::Error),
}

// ============================================================================
// Host-Reported Errors
// ============================================================================

/// Failure reported by the document fetcher
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    /// Request never produced a response
    #[error("network error: {0}")]
    Network(String),

    /// Response had a non-success status
    #[error("HTTP status {0}")]
    Status(u16),
}

/// Failure reported by the module loader
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct ImportError(pub String);

/// Failure reported by the component renderer
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct RenderError(pub String);

// ============================================================================
// Navigation
// ============================================================================

/// Errors that end a navigation
#[derive(Debug, Error)]
pub enum NavigationError {
    /// No route serves the target path
    #[error("route not found: {path}")]
    NoRoute { path: String },

    /// Loading the target document failed
    #[error("failed to load page data for {url}: {source}")]
    DataFetch {
        url: String,
        #[source]
        source: FetchError,
    },

    /// The target document carried no usable payload
    #[error("invalid page data for {url}: {source}")]
    Payload {
        url: String,
        #[source]
        source: PageDataError,
    },

    /// A page or layout module failed to import
    #[error("failed to import module '{module}': {source}")]
    ModuleImport {
        module: String,
        #[source]
        source: ImportError,
    },

    /// A module imported but exposes no callable default export
    #[error("module '{module}' has no default component")]
    InvalidModule { module: String },

    /// The renderer rejected the composed tree
    #[error("render failed: {0}")]
    Render(#[from] RenderError),

    /// The container was still empty after the retry
    #[error("render produced no content for {path}")]
    EmptyRender { path: String },
}

impl NavigationError {
    /// Whether the client should fall back to a full page load.
    ///
    /// True for missing routes and for failures loading page data.
    pub fn forces_reload(&self) -> bool {
        matches!(
            self,
            NavigationError::NoRoute { .. }
                | NavigationError::DataFetch { .. }
                | NavigationError::Payload { .. }
        )
    }
}

// ============================================================================
// Navigation Result
// ============================================================================

/// Result of a navigation attempt
#[derive(Debug)]
pub enum NavigationResult {
    /// Navigation settled on `path`
    Success { path: String },
    /// A newer navigation started before this one could commit
    Superseded { path: String, generation: u64 },
    /// Fell back to a full page load of `href`
    Reloaded { href: String, cause: NavigationError },
    /// Navigation failed and the current UI was left in place
    Error(NavigationError),
}

impl NavigationResult {
    /// Check if navigation was successful
    pub fn is_success(&self) -> bool {
        matches!(self, NavigationResult::Success { .. })
    }

    /// Check if a newer navigation won
    pub fn is_superseded(&self) -> bool {
        matches!(self, NavigationResult::Superseded { .. })
    }

    /// Check if a full page load was forced
    pub fn is_reload(&self) -> bool {
        matches!(self, NavigationResult::Reloaded { .. })
    }

    /// Check if there was an error without reload
    pub fn is_error(&self) -> bool {
        matches!(self, NavigationResult::Error(_))
    }

    /// The underlying error, if any
    pub fn error(&self) -> Option<&NavigationError> {
        match self {
            NavigationResult::Reloaded { cause, .. } => Some(cause),
            NavigationResult::Error(err) => Some(err),
            _ => None,
        }
    }
}

// ============================================================================
// Configuration
// ============================================================================

/// Errors raised while loading configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Config file could not be read
    #[error("failed to read config '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Config file is not valid TOML for this schema
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    /// Config parsed but a value is out of range
    #[error("invalid config: {0}")]
    Invalid(String),
}
