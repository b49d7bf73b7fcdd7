//! Host seams
//!
//! Everything the navigation engine needs from its environment: fetching
//! documents, importing modules, painting, history and the document head.
//! Implementations are single-threaded; async methods return
//! [`LocalBoxFuture`] and methods take `&self`, so hosts use interior
//! mutability where they keep state.

use crate::error::{FetchError, ImportError, RenderError};
use crate::history::HistoryState;
use crate::module::{Element, ModuleExports};
use crate::seo::HeadTag;
use crate::RouteChangeEvent;
use futures::future::LocalBoxFuture;
use std::time::Duration;

/// Response to a document or batch request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchResponse {
    pub status: u16,
    pub body: String,
}

impl FetchResponse {
    /// 200 response
    pub fn ok(body: impl Into<String>) -> Self {
        Self {
            status: 200,
            body: body.into(),
        }
    }

    /// Whether the status is 2xx
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Body of a 2xx response, or the status as an error
    pub fn into_body(self) -> Result<String, FetchError> {
        if self.is_success() {
            Ok(self.body)
        } else {
            Err(FetchError::Status(self.status))
        }
    }
}

/// Network access
pub trait Fetcher {
    /// GET `url`
    fn fetch<'a>(&'a self, url: &'a str) -> LocalBoxFuture<'a, Result<FetchResponse, FetchError>>;
}

/// Dynamic module import
pub trait ModuleLoader {
    /// Import a module by id
    fn import<'a>(&'a self, id: &'a str) -> LocalBoxFuture<'a, Result<ModuleExports, ImportError>>;

    /// Evaluate module source delivered inline, without a network request
    fn evaluate(&self, id: &str, source: &str) -> Result<ModuleExports, ImportError>;
}

/// Component renderer bound to the app container
pub trait Renderer {
    /// Paint unconditionally, replacing container content
    fn render(&self, element: &Element) -> Result<(), RenderError>;

    /// Attach behavior to the existing markup
    fn hydrate(&self, element: &Element) -> Result<(), RenderError>;

    /// Whether the container has any content
    fn has_content(&self) -> bool;

    /// Yield so the renderer can flush a paint
    fn flush(&self) -> LocalBoxFuture<'_, ()>;
}

/// Browser history and location
pub trait HistoryApi {
    fn push_state(&self, state: &HistoryState, url: &str);

    fn replace_state(&self, state: &HistoryState, url: &str);

    /// Full page load of `href`
    fn assign_location(&self, href: &str);
}

/// Managed tags in the document head
pub trait DocumentHead {
    fn apply_head(&self, tags: &[HeadTag]);
}

/// App-level notifications
pub trait RouteEvents {
    /// Dispatched on every settled navigation
    fn dispatch_route_changed(&self, event: &RouteChangeEvent);
}

/// Delays
pub trait Timer {
    fn sleep(&self, duration: Duration) -> LocalBoxFuture<'_, ()>;
}

/// Full-screen loading indicator
pub trait LoadingIndicator {
    fn show(&self);

    fn hide(&self);
}

/// Everything [`ClientNavigator`](crate::ClientNavigator) uses
pub trait NavigatorHost: Fetcher + ModuleLoader + Renderer + HistoryApi + DocumentHead + RouteEvents {}

impl<T> NavigatorHost for T where T: Fetcher + ModuleLoader + Renderer + HistoryApi + DocumentHead + RouteEvents {}

/// Everything [`PrefetchScheduler`](crate::PrefetchScheduler) uses
pub trait PrefetchHost: Fetcher + ModuleLoader + Timer + LoadingIndicator {}

impl<T> PrefetchHost for T where T: Fetcher + ModuleLoader + Timer + LoadingIndicator {}
