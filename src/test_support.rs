//! Scriptable in-memory host for unit tests

use crate::error::{FetchError, ImportError, RenderError};
use crate::history::{HistoryState, MemoryHistory};
use crate::host::{
    DocumentHead, FetchResponse, Fetcher, HistoryApi, LoadingIndicator, ModuleLoader, Renderer,
    RouteEvents, Timer,
};
use crate::module::{Element, ModuleExports};
use crate::page_data::PAGE_DATA_MARKER;
use crate::seo::HeadTag;
use crate::RouteChangeEvent;
use futures::channel::oneshot;
use futures::future::LocalBoxFuture;
use futures::FutureExt;
use std::cell::{Cell, RefCell};
use std::collections::{HashMap, HashSet};
use std::time::Duration;

/// Wrap a JSON payload in a minimal HTML document
pub fn document(payload: &str) -> String {
    format!(
        r#"<!doctype html><html><head></head><body><div id="app"></div><script type="application/json" {}>{}</script></body></html>"#,
        PAGE_DATA_MARKER, payload
    )
}

#[derive(Default)]
pub struct TestHost {
    pages: RefCell<HashMap<String, String>>,
    offline: RefCell<HashSet<String>>,
    modules: RefCell<HashMap<String, ModuleExports>>,
    sources: RefCell<HashMap<String, ModuleExports>>,
    import_failures: RefCell<HashMap<String, ImportError>>,
    gates: RefCell<HashMap<String, oneshot::Receiver<()>>>,
    import_gates: RefCell<HashMap<String, oneshot::Receiver<()>>>,
    fetched: RefCell<Vec<String>>,
    imported: RefCell<Vec<String>>,
    evaluated: RefCell<Vec<String>>,

    content: Cell<bool>,
    renders: Cell<usize>,
    hydrates: Cell<usize>,
    hydrate_fails: Cell<bool>,
    render_failures: Cell<usize>,
    blank_renders: Cell<usize>,

    pub history: MemoryHistory,
    dispatched: RefCell<Vec<RouteChangeEvent>>,
    head: RefCell<Vec<HeadTag>>,

    sleeps: RefCell<Vec<Duration>>,
    shows: Cell<usize>,
    hides: Cell<usize>,
}

impl TestHost {
    pub fn new() -> Self {
        Self {
            history: MemoryHistory::new("/"),
            ..Self::default()
        }
    }

    // scripting

    pub fn add_page(&self, url: &str, payload: &str) {
        self.add_raw(url, &document(payload));
    }

    pub fn add_raw(&self, url: &str, body: &str) {
        self.pages.borrow_mut().insert(url.to_string(), body.to_string());
    }

    pub fn go_offline(&self, url: &str) {
        self.offline.borrow_mut().insert(url.to_string());
    }

    pub fn add_module(&self, id: &str, exports: ModuleExports) {
        self.modules.borrow_mut().insert(id.to_string(), exports);
    }

    /// Exports returned when `source` is evaluated
    pub fn add_source(&self, source: &str, exports: ModuleExports) {
        self.sources.borrow_mut().insert(source.to_string(), exports);
    }

    pub fn fail_import(&self, id: &str, err: ImportError) {
        self.import_failures.borrow_mut().insert(id.to_string(), err);
    }

    /// Hold the next fetch of `url` until the sender fires
    pub fn gate(&self, url: &str) -> oneshot::Sender<()> {
        let (tx, rx) = oneshot::channel();
        self.gates.borrow_mut().insert(url.to_string(), rx);
        tx
    }

    /// Hold the next import of `id` until the sender fires
    pub fn gate_import(&self, id: &str) -> oneshot::Sender<()> {
        let (tx, rx) = oneshot::channel();
        self.import_gates.borrow_mut().insert(id.to_string(), rx);
        tx
    }

    pub fn set_server_markup(&self, present: bool) {
        self.content.set(present);
    }

    pub fn fail_hydrate(&self) {
        self.hydrate_fails.set(true);
    }

    /// Fail the next `n` renders
    pub fn fail_render(&self, n: usize) {
        self.render_failures.set(n);
    }

    /// Leave the container empty after the next `n` renders
    pub fn blank_renders(&self, n: usize) {
        self.blank_renders.set(n);
    }

    // observations

    pub fn fetched(&self) -> Vec<String> {
        self.fetched.borrow().clone()
    }

    pub fn fetch_count(&self) -> usize {
        self.fetched.borrow().len()
    }

    pub fn import_count(&self) -> usize {
        self.imported.borrow().len()
    }

    pub fn imports_of(&self, id: &str) -> usize {
        self.imported.borrow().iter().filter(|i| *i == id).count()
    }

    pub fn evaluated(&self) -> Vec<String> {
        self.evaluated.borrow().clone()
    }

    pub fn render_calls(&self) -> usize {
        self.renders.get()
    }

    pub fn hydrate_calls(&self) -> usize {
        self.hydrates.get()
    }

    pub fn dispatched(&self) -> Vec<RouteChangeEvent> {
        self.dispatched.borrow().clone()
    }

    pub fn head(&self) -> Vec<HeadTag> {
        self.head.borrow().clone()
    }

    pub fn sleeps(&self) -> Vec<Duration> {
        self.sleeps.borrow().clone()
    }

    pub fn indicator_counts(&self) -> (usize, usize) {
        (self.shows.get(), self.hides.get())
    }
}

impl Fetcher for TestHost {
    fn fetch<'a>(&'a self, url: &'a str) -> LocalBoxFuture<'a, Result<FetchResponse, FetchError>> {
        self.fetched.borrow_mut().push(url.to_string());
        let gate = self.gates.borrow_mut().remove(url);

        async move {
            if let Some(gate) = gate {
                let _ = gate.await;
            }
            if self.offline.borrow().contains(url) {
                return Err(FetchError::Network("connection refused".to_string()));
            }
            let body = self.pages.borrow().get(url).cloned();
            Ok(match body {
                Some(body) => FetchResponse::ok(body),
                None => FetchResponse {
                    status: 404,
                    body: String::new(),
                },
            })
        }
        .boxed_local()
    }
}

impl ModuleLoader for TestHost {
    fn import<'a>(&'a self, id: &'a str) -> LocalBoxFuture<'a, Result<ModuleExports, ImportError>> {
        self.imported.borrow_mut().push(id.to_string());
        let gate = self.import_gates.borrow_mut().remove(id);
        let result = match self.import_failures.borrow().get(id) {
            Some(err) => Err(err.clone()),
            None => self
                .modules
                .borrow()
                .get(id)
                .cloned()
                .ok_or_else(|| ImportError(format!("cannot find module '{}'", id))),
        };

        async move {
            if let Some(gate) = gate {
                let _ = gate.await;
            }
            result
        }
        .boxed_local()
    }

    fn evaluate(&self, id: &str, source: &str) -> Result<ModuleExports, ImportError> {
        self.evaluated.borrow_mut().push(id.to_string());
        self.sources
            .borrow()
            .get(source)
            .cloned()
            .ok_or_else(|| ImportError(format!("cannot evaluate '{}'", id)))
    }
}

impl Renderer for TestHost {
    fn render(&self, _element: &Element) -> Result<(), RenderError> {
        self.renders.set(self.renders.get() + 1);
        if self.render_failures.get() > 0 {
            self.render_failures.set(self.render_failures.get() - 1);
            return Err(RenderError("render threw".to_string()));
        }
        if self.blank_renders.get() > 0 {
            self.blank_renders.set(self.blank_renders.get() - 1);
            self.content.set(false);
            return Ok(());
        }
        self.content.set(true);
        Ok(())
    }

    fn hydrate(&self, _element: &Element) -> Result<(), RenderError> {
        self.hydrates.set(self.hydrates.get() + 1);
        if self.hydrate_fails.get() {
            return Err(RenderError("hydration mismatch".to_string()));
        }
        Ok(())
    }

    fn has_content(&self) -> bool {
        self.content.get()
    }

    fn flush(&self) -> LocalBoxFuture<'_, ()> {
        futures::future::ready(()).boxed_local()
    }
}

impl HistoryApi for TestHost {
    fn push_state(&self, state: &HistoryState, url: &str) {
        self.history.push_state(state, url);
    }

    fn replace_state(&self, state: &HistoryState, url: &str) {
        self.history.replace_state(state, url);
    }

    fn assign_location(&self, href: &str) {
        self.history.assign_location(href);
    }
}

impl DocumentHead for TestHost {
    fn apply_head(&self, tags: &[HeadTag]) {
        *self.head.borrow_mut() = tags.to_vec();
    }
}

impl RouteEvents for TestHost {
    fn dispatch_route_changed(&self, event: &RouteChangeEvent) {
        self.dispatched.borrow_mut().push(event.clone());
    }
}

impl Timer for TestHost {
    fn sleep(&self, duration: Duration) -> LocalBoxFuture<'_, ()> {
        self.sleeps.borrow_mut().push(duration);
        futures::future::ready(()).boxed_local()
    }
}

impl LoadingIndicator for TestHost {
    fn show(&self) {
        self.shows.set(self.shows.get() + 1);
    }

    fn hide(&self) {
        self.hides.set(self.hides.get() + 1);
    }
}
