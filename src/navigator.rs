//! Client navigation state machine
//!
//! A navigation moves through
//! `Idle → LoadingData → LoadingModules → Composing → Painting → Settled`,
//! or into `Error` from any of the loading and painting steps.
//!
//! Every call to [`ClientNavigator::navigate_to`] takes a new generation
//! number. Only the navigation holding the latest generation may paint or
//! settle; an older one that finishes later returns
//! [`NavigationResult::Superseded`]. Cache writes made along the way are
//! kept either way.
//!
//! Failures split in two: missing routes and page data failures fall back to
//! a full page load, everything else leaves the current UI in place. Every
//! retry is bounded to a single extra attempt.

use crate::cache::{page_key, ModuleCache, PageDataCache};
use crate::error::{NavigationError, NavigationResult, RenderError};
use crate::history::HistoryState;
use crate::host::{Fetcher, ModuleLoader, NavigatorHost};
use crate::module::{compose, Element, LoadedModule, ModuleKind};
use crate::page_data::{extract_page_data, PageData};
use crate::render_mode::{PaintStrategy, RenderMode};
use crate::seo::head_tags;
use crate::table::RouteTable;
use crate::{debug_log, error_log, info_log, trace_log, warn_log};
use crate::{NavigationDirection, RouteChangeEvent};
use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

/// Navigation state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavState {
    Idle,
    LoadingData,
    LoadingModules,
    Composing,
    Painting,
    Settled,
    Error,
}

/// What started a navigation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavigationKind {
    /// Link click or programmatic navigation; pushes a history entry
    Push,
    /// Browser back/forward; replaces the current entry
    Pop,
    /// First paint of the server document
    Initial,
}

impl NavigationKind {
    /// Direction reported in route change events
    pub fn direction(self) -> NavigationDirection {
        match self {
            NavigationKind::Push => NavigationDirection::Forward,
            NavigationKind::Pop => NavigationDirection::Back,
            NavigationKind::Initial => NavigationDirection::Replace,
        }
    }
}

type Listener = Rc<dyn Fn(&RouteChangeEvent)>;

/// Drives navigations against a host
pub struct ClientNavigator<H: NavigatorHost> {
    host: Rc<H>,
    page_data: PageDataCache,
    modules: ModuleCache,
    table: Option<Rc<RouteTable>>,
    generation: Cell<u64>,
    state: Cell<NavState>,
    current: RefCell<Option<String>>,
    listeners: RefCell<Vec<Listener>>,
}

impl<H: NavigatorHost> ClientNavigator<H> {
    /// Navigator sharing the given caches
    pub fn new(host: Rc<H>, page_data: PageDataCache, modules: ModuleCache) -> Self {
        Self {
            host,
            page_data,
            modules,
            table: None,
            generation: Cell::new(0),
            state: Cell::new(NavState::Idle),
            current: RefCell::new(None),
            listeners: RefCell::new(Vec::new()),
        }
    }

    /// Check targets against a client-side route table before loading them.
    ///
    /// Unknown targets then fail fast with [`NavigationError::NoRoute`].
    pub fn with_route_table(mut self, table: Rc<RouteTable>) -> Self {
        self.table = Some(table);
        self
    }

    pub fn state(&self) -> NavState {
        self.state.get()
    }

    /// Generation of the latest navigation
    pub fn generation(&self) -> u64 {
        self.generation.get()
    }

    /// URL of the last settled navigation
    pub fn current_path(&self) -> Option<String> {
        self.current.borrow().clone()
    }

    pub fn host(&self) -> &Rc<H> {
        &self.host
    }

    pub fn page_data_cache(&self) -> &PageDataCache {
        &self.page_data
    }

    pub fn module_cache(&self) -> &ModuleCache {
        &self.modules
    }

    /// Register a listener called on every settled navigation
    pub fn on_route_change<F>(&self, listener: F)
    where
        F: Fn(&RouteChangeEvent) + 'static,
    {
        self.listeners.borrow_mut().push(Rc::new(listener));
    }

    // ------------------------------------------------------------------------
    // Entry Points
    // ------------------------------------------------------------------------

    /// Start from the server document.
    ///
    /// The embedded payload seeds the page data cache for `url`, then the
    /// page is hydrated, kept or rendered according to its render mode.
    /// A missing payload is reported without reloading.
    pub async fn bootstrap(&self, html: &str, url: &str) -> NavigationResult {
        match extract_page_data(html) {
            Ok(data) => {
                self.page_data.insert(url, data);
            }
            Err(source) => {
                self.state.set(NavState::Error);
                let err = NavigationError::Payload {
                    url: url.to_string(),
                    source,
                };
                error_log!("bootstrap of '{}' failed: {}", url, err);
                return NavigationResult::Error(err);
            }
        }
        self.navigate_to(url, NavigationKind::Initial).await
    }

    /// Navigate to `url` (path with optional query).
    pub async fn navigate_to(&self, url: &str, kind: NavigationKind) -> NavigationResult {
        let generation = self.generation.get() + 1;
        self.generation.set(generation);
        debug_log!("navigation #{} to '{}' ({:?})", generation, url, kind);

        match self.run(generation, url, kind).await {
            Ok(result) => result,
            Err(err) => self.fail(generation, url, kind, err),
        }
    }

    // ------------------------------------------------------------------------
    // Pipeline
    // ------------------------------------------------------------------------

    async fn run(
        &self,
        generation: u64,
        url: &str,
        kind: NavigationKind,
    ) -> Result<NavigationResult, NavigationError> {
        self.transition(generation, NavState::LoadingData);

        if let Some(table) = &self.table {
            if table.match_route(url).is_none() {
                return Err(NavigationError::NoRoute {
                    path: page_key(url),
                });
            }
        }

        let data = match self.page_data.get(url) {
            Some(data) => data,
            None => fetch_page_data(self.host.as_ref(), &self.page_data, url).await?,
        };

        self.transition(generation, NavState::LoadingModules);
        let (page, layouts) = load_route_modules(self.host.as_ref(), &self.modules, &data).await?;

        if self.is_stale(generation) {
            return Ok(self.superseded(generation, url));
        }

        let mode = match kind {
            NavigationKind::Initial => data.render_mode,
            _ => effective_mode(&data, &page),
        };

        let mut retried = false;
        loop {
            self.transition(generation, NavState::Composing);
            let element = compose(&page, &layouts, &data.props);

            self.transition(generation, NavState::Painting);
            // a retry after an empty paint always renders
            let strategy = if retried {
                PaintStrategy::Render
            } else {
                PaintStrategy::choose(
                    mode,
                    self.host.has_content(),
                    kind == NavigationKind::Initial,
                    page.hydrates,
                )
            };
            self.paint(strategy, &element)?;
            self.host.flush().await;

            if self.is_stale(generation) {
                return Ok(self.superseded(generation, url));
            }
            if self.host.has_content() {
                break;
            }
            if retried {
                return Err(NavigationError::EmptyRender {
                    path: url.to_string(),
                });
            }
            warn_log!("container empty after painting '{}', retrying once", url);
            retried = true;
        }

        Ok(self.settle(url, kind, &data))
    }

    /// Paint with the chosen strategy. A failed hydration falls back to one
    /// render.
    fn paint(&self, strategy: PaintStrategy, element: &Element) -> Result<(), RenderError> {
        trace_log!("painting with {:?}", strategy);
        match strategy {
            PaintStrategy::Keep => Ok(()),
            PaintStrategy::Render => self.host.render(element),
            PaintStrategy::Hydrate => self.host.hydrate(element).or_else(|err| {
                warn_log!("hydration failed ({}), rendering instead", err);
                self.host.render(element)
            }),
        }
    }

    fn settle(&self, url: &str, kind: NavigationKind, data: &PageData) -> NavigationResult {
        self.state.set(NavState::Settled);

        let state = HistoryState::new(url);
        match kind {
            NavigationKind::Push => self.host.push_state(&state, url),
            NavigationKind::Pop | NavigationKind::Initial => self.host.replace_state(&state, url),
        }

        let from = self.current.replace(Some(url.to_string()));
        let event = RouteChangeEvent {
            from,
            to: url.to_string(),
            direction: kind.direction(),
        };
        self.host.dispatch_route_changed(&event);

        // listeners may register more listeners
        let listeners: Vec<Listener> = self.listeners.borrow().clone();
        for listener in listeners {
            listener(&event);
        }

        self.host.apply_head(&head_tags(&data.metadata));

        info_log!("navigation settled on '{}'", url);
        NavigationResult::Success {
            path: url.to_string(),
        }
    }

    fn fail(&self, generation: u64, url: &str, kind: NavigationKind, err: NavigationError) -> NavigationResult {
        if self.is_stale(generation) {
            debug_log!("dropping error of superseded navigation #{}: {}", generation, err);
            return self.superseded(generation, url);
        }

        self.state.set(NavState::Error);

        if err.forces_reload() && kind != NavigationKind::Initial {
            warn_log!("falling back to full page load of '{}': {}", url, err);
            self.host.assign_location(url);
            return NavigationResult::Reloaded {
                href: url.to_string(),
                cause: err,
            };
        }

        error_log!("navigation to '{}' failed: {}", url, err);
        NavigationResult::Error(err)
    }

    fn superseded(&self, generation: u64, url: &str) -> NavigationResult {
        debug_log!(
            "navigation #{} to '{}' superseded by #{}",
            generation,
            url,
            self.generation.get()
        );
        NavigationResult::Superseded {
            path: url.to_string(),
            generation,
        }
    }

    fn is_stale(&self, generation: u64) -> bool {
        generation != self.generation.get()
    }

    /// Only the latest navigation drives the visible state
    fn transition(&self, generation: u64, next: NavState) {
        if self.is_stale(generation) {
            return;
        }
        trace_log!("navigation #{}: {:?} -> {:?}", generation, self.state.get(), next);
        self.state.set(next);
    }
}

impl<H: NavigatorHost> fmt::Debug for ClientNavigator<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientNavigator")
            .field("state", &self.state.get())
            .field("generation", &self.generation.get())
            .field("current", &self.current.borrow())
            .field("listeners", &self.listeners.borrow().len())
            .finish()
    }
}

// ============================================================================
// Loading (shared with prefetch)
// ============================================================================

/// Fetch the document for `url`, read its payload and cache it
pub(crate) async fn fetch_page_data<F>(
    fetcher: &F,
    cache: &PageDataCache,
    url: &str,
) -> Result<Rc<PageData>, NavigationError>
where
    F: Fetcher + ?Sized,
{
    let data_error = |source| NavigationError::DataFetch {
        url: url.to_string(),
        source,
    };

    let body = fetcher.fetch(url).await.map_err(data_error)?.into_body().map_err(data_error)?;
    let data = extract_page_data(&body).map_err(|source| NavigationError::Payload {
        url: url.to_string(),
        source,
    })?;

    debug_log!("loaded page data for '{}' (route '{}')", url, data.route);
    Ok(cache.insert(url, data))
}

/// Cached module, or import, validate and cache it
pub(crate) async fn load_module<L>(
    loader: &L,
    cache: &ModuleCache,
    id: &str,
    kind: ModuleKind,
) -> Result<Rc<LoadedModule>, NavigationError>
where
    L: ModuleLoader + ?Sized,
{
    if let Some(module) = cache.get(id, kind) {
        return Ok(module);
    }

    let exports = loader
        .import(id)
        .await
        .map_err(|source| NavigationError::ModuleImport {
            module: id.to_string(),
            source,
        })?;
    let module = LoadedModule::from_exports(id, kind, exports)?;
    Ok(cache.insert(module))
}

/// Page module and every layout module of a payload. Layout imports run
/// together, alongside the page import.
pub(crate) async fn load_route_modules<L>(
    loader: &L,
    cache: &ModuleCache,
    data: &PageData,
) -> Result<(Rc<LoadedModule>, Vec<Rc<LoadedModule>>), NavigationError>
where
    L: ModuleLoader + ?Sized,
{
    let layout_refs = data.layout_refs();
    let layouts = futures::future::join_all(
        layout_refs
            .iter()
            .map(|id| load_module(loader, cache, id, ModuleKind::Layout)),
    );
    let (page, layouts) = futures::join!(load_module(loader, cache, &data.route, ModuleKind::Page), layouts);

    let layouts = layouts.into_iter().collect::<Result<Vec<_>, _>>()?;
    Ok((page?, layouts))
}

/// Mode a page ends up painted with after a client-side navigation
pub fn effective_mode(data: &PageData, page: &LoadedModule) -> RenderMode {
    page.override_mode.unwrap_or(data.render_mode)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{FetchError, ImportError};
    use crate::host::Renderer;
    use crate::module::ModuleExports;
    use crate::test_support::{document, TestHost};
    use futures::executor::block_on;

    fn navigator(host: &Rc<TestHost>) -> ClientNavigator<TestHost> {
        ClientNavigator::new(Rc::clone(host), PageDataCache::new(), ModuleCache::new())
    }

    fn host_with_pages() -> Rc<TestHost> {
        let host = Rc::new(TestHost::new());
        host.add_page("/", r#"{"route":"pages/index.js","renderMode":"hybrid","allLayoutPaths":["pages/_layout.js"]}"#);
        host.add_page(
            "/about",
            r#"{"route":"pages/about.js","renderMode":"ssr","allLayoutPaths":["pages/_layout.js"],"metadata":{"title":"About"}}"#,
        );
        host.add_module("pages/index.js", ModuleExports::component(|_| Element::new("main").text("home")));
        host.add_module("pages/about.js", ModuleExports::component(|_| Element::new("main").text("about")));
        host.add_module(
            "pages/_layout.js",
            ModuleExports::component(|props| Element::new("div").maybe_child(props.children.clone())),
        );
        host
    }

    #[test]
    fn test_push_navigation_settles() {
        let host = host_with_pages();
        let nav = navigator(&host);
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        nav.on_route_change(move |event| sink.borrow_mut().push(event.to.clone()));

        let result = block_on(nav.navigate_to("/about", NavigationKind::Push));

        assert!(result.is_success());
        assert_eq!(nav.state(), NavState::Settled);
        assert_eq!(nav.current_path().as_deref(), Some("/about"));
        assert_eq!(host.history.current_url(), "/about");
        assert_eq!(host.history.current_state(), Some(HistoryState::new("/about")));
        assert_eq!(host.render_calls(), 1);
        assert_eq!(host.dispatched().len(), 1);
        assert_eq!(*seen.borrow(), vec!["/about"]);
        assert!(host.head().iter().any(|t| t.to_html() == "<title>About</title>"));
    }

    #[test]
    fn test_pop_replaces_history() {
        let host = host_with_pages();
        let nav = navigator(&host);

        block_on(nav.navigate_to("/about", NavigationKind::Push));
        let result = block_on(nav.navigate_to("/", NavigationKind::Pop));

        assert!(result.is_success());
        assert_eq!(host.history.len(), 2);
        assert_eq!(host.dispatched()[1].direction, NavigationDirection::Back);
    }

    #[test]
    fn test_second_visit_uses_caches() {
        let host = host_with_pages();
        let nav = navigator(&host);

        block_on(nav.navigate_to("/about", NavigationKind::Push));
        let fetches = host.fetch_count();
        let imports = host.import_count();

        assert!(block_on(nav.navigate_to("/about", NavigationKind::Push)).is_success());
        assert_eq!(host.fetch_count(), fetches);
        assert_eq!(host.import_count(), imports);
    }

    #[test]
    fn test_layout_shared_between_pages_imported_once() {
        let host = host_with_pages();
        let nav = navigator(&host);

        block_on(nav.navigate_to("/", NavigationKind::Push));
        block_on(nav.navigate_to("/about", NavigationKind::Push));

        assert_eq!(host.imports_of("pages/_layout.js"), 1);
    }

    #[test]
    fn test_missing_page_reloads() {
        let host = host_with_pages();
        let nav = navigator(&host);

        let result = block_on(nav.navigate_to("/nowhere", NavigationKind::Push));

        assert!(result.is_reload());
        assert!(matches!(
            result.error(),
            Some(NavigationError::DataFetch {
                source: FetchError::Status(404),
                ..
            })
        ));
        assert_eq!(host.history.assigned_locations(), vec!["/nowhere"]);
        assert_eq!(nav.state(), NavState::Error);
    }

    #[test]
    fn test_network_failure_reloads() {
        let host = host_with_pages();
        host.go_offline("/about");
        let nav = navigator(&host);

        let result = block_on(nav.navigate_to("/about", NavigationKind::Push));

        assert!(matches!(
            result.error(),
            Some(NavigationError::DataFetch {
                source: FetchError::Network(_),
                ..
            })
        ));
        assert_eq!(host.history.assigned_locations(), vec!["/about"]);
        assert_eq!(host.render_calls(), 0);
    }

    #[test]
    fn test_no_route_in_table_reloads_without_fetch() {
        let host = host_with_pages();
        let mut table = RouteTable::new(crate::table::RouteTableOptions::default());
        table
            .build(vec![("about".to_string(), "pages/about.js".to_string())])
            .unwrap();
        let nav = navigator(&host).with_route_table(Rc::new(table));

        let result = block_on(nav.navigate_to("/ghost", NavigationKind::Push));

        assert!(matches!(result.error(), Some(NavigationError::NoRoute { .. })));
        assert!(result.is_reload());
        assert_eq!(host.fetch_count(), 0);
    }

    #[test]
    fn test_payload_without_marker_reloads() {
        let host = host_with_pages();
        host.add_raw("/plain", "<html><body>no payload</body></html>");
        let nav = navigator(&host);

        let result = block_on(nav.navigate_to("/plain", NavigationKind::Push));
        assert!(matches!(result.error(), Some(NavigationError::Payload { .. })));
        assert!(result.is_reload());
    }

    #[test]
    fn test_import_failure_keeps_ui() {
        let host = host_with_pages();
        host.add_page("/broken", r#"{"route":"pages/broken.js","renderMode":"csr"}"#);
        host.fail_import("pages/broken.js", ImportError("syntax error".into()));
        let nav = navigator(&host);

        let result = block_on(nav.navigate_to("/broken", NavigationKind::Push));

        assert!(result.is_error());
        assert!(!result.is_reload());
        assert!(host.history.assigned_locations().is_empty());
        assert!(!nav.module_cache().contains("pages/broken.js"));
    }

    #[test]
    fn test_module_without_default_is_not_cached() {
        let host = host_with_pages();
        host.add_page("/empty", r#"{"route":"pages/empty.js"}"#);
        host.add_module("pages/empty.js", ModuleExports::default());
        let nav = navigator(&host);

        let result = block_on(nav.navigate_to("/empty", NavigationKind::Push));
        assert!(matches!(result.error(), Some(NavigationError::InvalidModule { .. })));
        assert!(!nav.module_cache().contains("pages/empty.js"));

        block_on(nav.navigate_to("/empty", NavigationKind::Push));
        assert_eq!(host.imports_of("pages/empty.js"), 2);
    }

    #[test]
    fn test_render_error_surfaces() {
        let host = host_with_pages();
        host.fail_render(2);
        let nav = navigator(&host);

        let result = block_on(nav.navigate_to("/about", NavigationKind::Push));
        assert!(matches!(result.error(), Some(NavigationError::Render(_))));
        assert!(!result.is_reload());
    }

    #[test]
    fn test_module_imports_run_together() {
        let host = host_with_pages();
        host.add_page(
            "/docs",
            r#"{"route":"pages/docs.js","allLayoutPaths":["pages/_layout.js","pages/docs/_layout.js"]}"#,
        );
        host.add_module("pages/docs.js", ModuleExports::component(|_| Element::new("main")));
        host.add_module(
            "pages/docs/_layout.js",
            ModuleExports::component(|props| Element::new("section").maybe_child(props.children.clone())),
        );
        let ids = ["pages/docs.js", "pages/_layout.js", "pages/docs/_layout.js"];
        let gates: Vec<_> = ids.iter().map(|id| host.gate_import(id)).collect();
        let nav = navigator(&host);

        let (result, started) = block_on(async {
            futures::join!(nav.navigate_to("/docs", NavigationKind::Push), async {
                // every import is requested before any of them resolves
                let started: Vec<usize> = ids.iter().map(|id| host.imports_of(id)).collect();
                for gate in gates {
                    let _ = gate.send(());
                }
                started
            })
        });

        assert!(result.is_success());
        assert_eq!(started, vec![1, 1, 1]);
        assert_eq!(host.import_count(), 3);
    }

    #[test]
    fn test_wrong_kind_cached_module_is_reimported() {
        let host = host_with_pages();
        let modules = ModuleCache::new();
        modules.insert(
            LoadedModule::from_exports(
                "pages/about.js",
                ModuleKind::Layout,
                ModuleExports::component(|_| Element::new("div")),
            )
            .unwrap(),
        );
        let nav = ClientNavigator::new(Rc::clone(&host), PageDataCache::new(), modules.clone());

        assert!(block_on(nav.navigate_to("/about", NavigationKind::Push)).is_success());
        assert_eq!(host.imports_of("pages/about.js"), 1);
        assert_eq!(modules.stats().invalidations, 1);
        assert_eq!(
            modules.get("pages/about.js", ModuleKind::Page).map(|m| m.kind),
            Some(ModuleKind::Page)
        );
    }

    #[test]
    fn test_hybrid_target_hydrates_existing_markup() {
        let host = host_with_pages();
        let nav = navigator(&host);

        block_on(nav.navigate_to("/about", NavigationKind::Push));
        assert!(block_on(nav.navigate_to("/", NavigationKind::Push)).is_success());

        assert_eq!(host.render_calls(), 1);
        assert_eq!(host.hydrate_calls(), 1);
    }

    #[test]
    fn test_csr_target_renders_over_markup() {
        let host = host_with_pages();
        host.add_page("/app", r#"{"route":"pages/index.js","renderMode":"csr"}"#);
        host.set_server_markup(true);
        let nav = navigator(&host);

        assert!(block_on(nav.navigate_to("/app", NavigationKind::Push)).is_success());
        assert_eq!(host.render_calls(), 1);
        assert_eq!(host.hydrate_calls(), 0);
    }

    #[test]
    fn test_navigation_hydration_failure_renders_once() {
        let host = host_with_pages();
        host.set_server_markup(true);
        host.fail_hydrate();
        let nav = navigator(&host);

        assert!(block_on(nav.navigate_to("/", NavigationKind::Push)).is_success());
        assert_eq!(host.hydrate_calls(), 1);
        assert_eq!(host.render_calls(), 1);
    }

    #[test]
    fn test_module_mode_overrides_payload_on_navigation() {
        let host = host_with_pages();
        host.add_page("/live", r#"{"route":"pages/live.js","renderMode":"ssr"}"#);
        host.add_module(
            "pages/live.js",
            ModuleExports::component(|_| Element::new("main")).with_render_mode("hybrid"),
        );
        host.set_server_markup(true);
        let nav = navigator(&host);

        assert!(block_on(nav.navigate_to("/live", NavigationKind::Push)).is_success());
        assert_eq!(host.hydrate_calls(), 1);
        assert_eq!(host.render_calls(), 0);
    }

    #[test]
    fn test_empty_render_retried_once() {
        let host = host_with_pages();
        host.blank_renders(1);
        let nav = navigator(&host);

        assert!(block_on(nav.navigate_to("/about", NavigationKind::Push)).is_success());
        assert_eq!(host.render_calls(), 2);
    }

    #[test]
    fn test_empty_render_twice_fails() {
        let host = host_with_pages();
        host.blank_renders(2);
        let nav = navigator(&host);

        let result = block_on(nav.navigate_to("/about", NavigationKind::Push));
        assert!(matches!(result.error(), Some(NavigationError::EmptyRender { .. })));
        assert_eq!(host.render_calls(), 2);
        assert!(host.dispatched().is_empty());
    }

    #[test]
    fn test_bootstrap_hybrid_hydrates() {
        let host = host_with_pages();
        host.set_server_markup(true);
        let nav = navigator(&host);
        let html = document(r#"{"route":"pages/index.js","renderMode":"hybrid"}"#);

        assert!(block_on(nav.bootstrap(&html, "/")).is_success());
        assert_eq!(host.hydrate_calls(), 1);
        assert_eq!(host.render_calls(), 0);
        assert_eq!(host.fetch_count(), 0);
        assert_eq!(host.history.len(), 1);
    }

    #[test]
    fn test_bootstrap_ssr_keeps_markup() {
        let host = host_with_pages();
        host.set_server_markup(true);
        let nav = navigator(&host);
        let html = document(r#"{"route":"pages/about.js","renderMode":"ssr"}"#);

        assert!(block_on(nav.bootstrap(&html, "/about")).is_success());
        assert_eq!(host.hydrate_calls(), 0);
        assert_eq!(host.render_calls(), 0);
    }

    #[test]
    fn test_bootstrap_ssr_opt_in_hydrates() {
        let host = host_with_pages();
        host.add_module(
            "pages/interactive.js",
            ModuleExports::component(|_| Element::new("main")).with_hydrate(),
        );
        host.set_server_markup(true);
        let nav = navigator(&host);
        let html = document(r#"{"route":"pages/interactive.js","renderMode":"ssr"}"#);

        assert!(block_on(nav.bootstrap(&html, "/interactive")).is_success());
        assert_eq!(host.hydrate_calls(), 1);
    }

    #[test]
    fn test_bootstrap_csr_renders_into_shell() {
        let host = host_with_pages();
        let nav = navigator(&host);
        let html = document(r#"{"route":"pages/index.js","renderMode":"csr"}"#);

        assert!(block_on(nav.bootstrap(&html, "/")).is_success());
        assert_eq!(host.render_calls(), 1);
        assert!(host.has_content());
    }

    #[test]
    fn test_bootstrap_hydration_failure_renders_once() {
        let host = host_with_pages();
        host.set_server_markup(true);
        host.fail_hydrate();
        let nav = navigator(&host);
        let html = document(r#"{"route":"pages/index.js","renderMode":"hybrid"}"#);

        assert!(block_on(nav.bootstrap(&html, "/")).is_success());
        assert_eq!(host.hydrate_calls(), 1);
        assert_eq!(host.render_calls(), 1);
    }

    #[test]
    fn test_bootstrap_without_payload_does_not_reload() {
        let host = host_with_pages();
        let nav = navigator(&host);

        let result = block_on(nav.bootstrap("<html></html>", "/"));
        assert!(result.is_error());
        assert!(host.history.assigned_locations().is_empty());
    }

    #[test]
    fn test_last_clicked_wins() {
        let host = host_with_pages();
        let release_slow = host.gate("/");
        let nav = navigator(&host);

        let (slow, fast) = block_on(async {
            futures::join!(nav.navigate_to("/", NavigationKind::Push), async {
                let result = nav.navigate_to("/about", NavigationKind::Push).await;
                let _ = release_slow.send(());
                result
            })
        });

        assert!(fast.is_success());
        assert!(slow.is_superseded());
        assert_eq!(nav.current_path().as_deref(), Some("/about"));
        assert_eq!(host.dispatched().len(), 1);
        // the superseded navigation still warmed the cache
        assert!(nav.page_data_cache().contains("/"));
    }

    #[test]
    fn test_effective_mode_prefers_module() {
        let data = PageData {
            render_mode: RenderMode::Ssr,
            ..PageData::default()
        };
        let page = LoadedModule::from_exports(
            "p",
            ModuleKind::Page,
            ModuleExports::component(|_| Element::new("main")).with_render_mode("csr"),
        )
        .unwrap();
        assert_eq!(effective_mode(&data, &page), RenderMode::Csr);
    }
}
