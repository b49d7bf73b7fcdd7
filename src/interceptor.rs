//! Link clicks and history pops
//!
//! [`LinkInterceptor::intercept`] decides whether an anchor click is an
//! in-app navigation or should be left to the browser. Only plain primary
//! clicks on same-origin links inside the base path are taken over.

use crate::error::NavigationResult;
use crate::history::HistoryState;
use crate::host::NavigatorHost;
use crate::navigator::{ClientNavigator, NavigationKind};
use crate::path::{normalize_path, split_url, strip_base};
use crate::trace_log;
use std::rc::Rc;
use url::Url;

/// Modifier keys held during a click
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Modifiers {
    pub ctrl: bool,
    pub meta: bool,
    pub shift: bool,
    pub alt: bool,
}

impl Modifiers {
    pub fn any(self) -> bool {
        self.ctrl || self.meta || self.shift || self.alt
    }
}

/// An anchor click as seen by the page
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LinkClick {
    /// Raw `href` attribute
    pub href: String,
    /// Mouse button, 0 for primary
    pub button: u16,
    pub modifiers: Modifiers,
    /// `target` attribute
    pub target: Option<String>,
    /// Anchor has a `download` attribute
    pub download: bool,
    /// `rel` attribute
    pub rel: Option<String>,
    /// Another handler already called `preventDefault`
    pub default_prevented: bool,
}

impl LinkClick {
    /// Plain primary-button click
    pub fn primary(href: impl Into<String>) -> Self {
        Self {
            href: href.into(),
            ..Self::default()
        }
    }

    pub fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }

    pub fn with_target(mut self, target: impl Into<String>) -> Self {
        self.target = Some(target.into());
        self
    }

    pub fn with_rel(mut self, rel: impl Into<String>) -> Self {
        self.rel = Some(rel.into());
        self
    }
}

/// Outcome of inspecting a click
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InterceptDecision {
    /// Prevent the default and navigate to this path (with query)
    Navigate(String),
    /// Let the browser handle the click
    PassThrough,
}

/// Turns clicks and history pops into navigator calls
pub struct LinkInterceptor<H: NavigatorHost> {
    navigator: Rc<ClientNavigator<H>>,
    origin: Url,
    base_path: Option<String>,
}

impl<H: NavigatorHost> LinkInterceptor<H> {
    /// Interceptor for pages served from `origin` (e.g. `https://example.com`)
    pub fn new(navigator: Rc<ClientNavigator<H>>, origin: &str) -> Result<Self, url::ParseError> {
        Ok(Self {
            navigator,
            origin: Url::parse(origin)?,
            base_path: None,
        })
    }

    /// Only take over links below `base_path`
    pub fn with_base_path(mut self, base_path: impl Into<String>) -> Self {
        self.base_path = Some(base_path.into());
        self
    }

    pub fn navigator(&self) -> &Rc<ClientNavigator<H>> {
        &self.navigator
    }

    /// Decide what to do with a click.
    pub fn intercept(&self, click: &LinkClick) -> InterceptDecision {
        if click.default_prevented
            || click.button != 0
            || click.modifiers.any()
            || click.download
            || click.href.trim().is_empty()
        {
            return InterceptDecision::PassThrough;
        }
        if click
            .target
            .as_deref()
            .is_some_and(|target| !target.is_empty() && !target.eq_ignore_ascii_case("_self"))
        {
            return InterceptDecision::PassThrough;
        }
        if click
            .rel
            .as_deref()
            .is_some_and(|rel| rel.split_whitespace().any(|r| r.eq_ignore_ascii_case("external")))
        {
            return InterceptDecision::PassThrough;
        }

        // relative links resolve against the current page
        let base = self
            .navigator
            .current_path()
            .and_then(|current| self.origin.join(&current).ok())
            .unwrap_or_else(|| self.origin.clone());
        let Ok(target) = base.join(click.href.trim()) else {
            return InterceptDecision::PassThrough;
        };
        if !matches!(target.scheme(), "http" | "https") || target.origin() != self.origin.origin() {
            trace_log!("leaving '{}' to the browser", click.href);
            return InterceptDecision::PassThrough;
        }

        let path = normalize_path(target.path());
        if let Some(base) = &self.base_path {
            if strip_base(base, &path).is_none() {
                return InterceptDecision::PassThrough;
            }
        }

        let destination = match target.query() {
            Some(query) if !query.is_empty() => format!("{}?{}", path, query),
            _ => path.into_owned(),
        };

        // fragment links on the current page only scroll
        if target.fragment().is_some() && self.navigator.current_path().as_deref() == Some(destination.as_str()) {
            return InterceptDecision::PassThrough;
        }

        InterceptDecision::Navigate(destination)
    }

    /// Intercept and, when taken over, run the navigation.
    ///
    /// Returns `None` when the browser should handle the click.
    pub async fn follow(&self, click: &LinkClick) -> Option<NavigationResult> {
        match self.intercept(click) {
            InterceptDecision::Navigate(path) => Some(self.navigator.navigate_to(&path, NavigationKind::Push).await),
            InterceptDecision::PassThrough => None,
        }
    }

    /// Handle browser back/forward.
    ///
    /// The entry's state names the path; without one, `location` (path and
    /// query) is used.
    pub async fn handle_popstate(&self, state: Option<&HistoryState>, location: &str) -> NavigationResult {
        let target = match state {
            Some(state) => state.path.clone(),
            None => {
                let (path, query) = split_url(location);
                match query {
                    Some(query) => format!("{}?{}", normalize_path(path), query),
                    None => normalize_path(path).into_owned(),
                }
            }
        };
        self.navigator.navigate_to(&target, NavigationKind::Pop).await
    }
}
