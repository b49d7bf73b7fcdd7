//! Background cache warming
//!
//! After a delay from page load, [`PrefetchScheduler::run`] fills the page
//! data and module caches for a configured list of routes, either with one
//! request per route ([`PrefetchStrategy::Single`]) or with one combined
//! request ([`PrefetchStrategy::Batch`]). Failures are logged and skipped;
//! navigation never waits on prefetching.

use crate::cache::{ModuleCache, PageDataCache};
use crate::error::{NavigationError, PageDataError};
use crate::host::PrefetchHost;
use crate::module::{LoadedModule, ModuleKind};
use crate::navigator::{fetch_page_data, load_route_modules};
use crate::page_data::PageData;
use crate::path::join_base;
use crate::{debug_log, info_log, warn_log};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::rc::Rc;
use std::time::Duration;

/// Path of the batch endpoint below the base path
pub const BATCH_ENDPOINT: &str = "/__prefetch/batch";

/// How routes are fetched
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PrefetchStrategy {
    /// One document request and import per route, all concurrent
    #[default]
    Single,
    /// One request returning data and module source for every route
    Batch,
}

/// Scheduler settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrefetchConfig {
    /// App paths to warm, without the base path
    pub routes: Vec<String>,
    pub strategy: PrefetchStrategy,
    /// Wait before the first request
    pub delay: Duration,
    /// Show the loading indicator while prefetching
    pub show_loading: bool,
    pub base_path: Option<String>,
}

impl Default for PrefetchConfig {
    fn default() -> Self {
        Self {
            routes: Vec::new(),
            strategy: PrefetchStrategy::Single,
            delay: Duration::from_millis(2000),
            show_loading: false,
            base_path: None,
        }
    }
}

impl PrefetchConfig {
    /// Config warming `routes` with the default settings
    pub fn new<I, S>(routes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            routes: routes.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    pub fn strategy(mut self, strategy: PrefetchStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn show_loading(mut self, show: bool) -> Self {
        self.show_loading = show;
        self
    }

    pub fn base_path(mut self, base_path: impl Into<String>) -> Self {
        self.base_path = Some(base_path.into());
        self
    }

    /// Full URL of an app path
    pub fn url_for(&self, route: &str) -> String {
        join_base(self.base_path.as_deref().unwrap_or("/"), route)
    }

    /// URL of the batch request for every configured route
    pub fn batch_url(&self) -> String {
        let routes = self
            .routes
            .iter()
            .map(|route| urlencoding::encode(route).into_owned())
            .collect::<Vec<_>>()
            .join(",");
        format!("{}?routes={}", self.url_for(BATCH_ENDPOINT), routes)
    }
}

/// One entry of the batch response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchItem {
    /// App path this entry is for
    pub route: String,
    /// Page module source
    pub body: String,
    #[serde(rename = "pageData")]
    pub page_data: PageData,
    /// Layout module id → source
    #[serde(default)]
    pub layouts: BTreeMap<String, String>,
}

/// What a run achieved
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PrefetchReport {
    pub warmed: Vec<String>,
    pub failed: Vec<String>,
}

/// Warms the shared caches in the background
pub struct PrefetchScheduler<H: PrefetchHost> {
    host: Rc<H>,
    page_data: PageDataCache,
    modules: ModuleCache,
    config: PrefetchConfig,
}

impl<H: PrefetchHost> PrefetchScheduler<H> {
    /// Scheduler writing into the given caches
    pub fn new(host: Rc<H>, page_data: PageDataCache, modules: ModuleCache, config: PrefetchConfig) -> Self {
        Self {
            host,
            page_data,
            modules,
            config,
        }
    }

    pub fn config(&self) -> &PrefetchConfig {
        &self.config
    }

    /// Wait for the configured delay, then warm every route.
    pub async fn run(&self) -> PrefetchReport {
        if self.config.routes.is_empty() {
            return PrefetchReport::default();
        }

        self.host.sleep(self.config.delay).await;

        if self.config.show_loading {
            self.host.show();
        }

        let report = match self.config.strategy {
            PrefetchStrategy::Single => self.run_single().await,
            PrefetchStrategy::Batch => self.run_batch().await,
        };

        if self.config.show_loading {
            self.host.hide();
        }

        info_log!(
            "prefetch finished: {} warmed, {} failed",
            report.warmed.len(),
            report.failed.len()
        );
        report
    }

    async fn run_single(&self) -> PrefetchReport {
        let results = futures::future::join_all(self.config.routes.iter().map(|route| async move {
            let outcome = self.prefetch_route(route).await;
            (route, outcome)
        }))
        .await;

        let mut report = PrefetchReport::default();
        for (route, outcome) in results {
            match outcome {
                Ok(()) => report.warmed.push(route.clone()),
                Err(err) => {
                    warn_log!("prefetch of '{}' failed: {}", route, err);
                    report.failed.push(route.clone());
                }
            }
        }
        report
    }

    /// Page data, page module and layout modules for one route
    async fn prefetch_route(&self, route: &str) -> Result<(), NavigationError> {
        let url = self.config.url_for(route);
        let data = match self.page_data.get(&url) {
            Some(data) => data,
            None => fetch_page_data(self.host.as_ref(), &self.page_data, &url).await?,
        };
        load_route_modules(self.host.as_ref(), &self.modules, &data).await?;
        debug_log!("prefetched '{}'", url);
        Ok(())
    }

    async fn run_batch(&self) -> PrefetchReport {
        let url = self.config.batch_url();
        let items = match self.fetch_batch(&url).await {
            Ok(items) => items,
            Err(err) => {
                warn_log!("batch prefetch failed: {}", err);
                return PrefetchReport {
                    warmed: Vec::new(),
                    failed: self.config.routes.clone(),
                };
            }
        };

        let mut report = PrefetchReport::default();
        for item in items {
            let route = item.route.clone();
            match self.store_batch_item(item) {
                Ok(()) => report.warmed.push(route),
                Err(err) => {
                    warn_log!("batch item '{}' skipped: {}", route, err);
                    report.failed.push(route);
                }
            }
        }

        for route in &self.config.routes {
            if !report.warmed.contains(route) && !report.failed.contains(route) {
                report.failed.push(route.clone());
            }
        }
        report
    }

    async fn fetch_batch(&self, url: &str) -> Result<Vec<BatchItem>, NavigationError> {
        let data_error = |source| NavigationError::DataFetch {
            url: url.to_string(),
            source,
        };
        let body = self
            .host
            .fetch(url)
            .await
            .map_err(data_error)?
            .into_body()
            .map_err(data_error)?;

        serde_json::from_str(&body).map_err(|err| NavigationError::Payload {
            url: url.to_string(),
            source: PageDataError::Json(err),
        })
    }

    /// Evaluate the item's sources and fill both caches. Nothing is cached
    /// for the item unless every module evaluates.
    fn store_batch_item(&self, item: BatchItem) -> Result<(), NavigationError> {
        let page = self.evaluate(&item.page_data.route, &item.body, ModuleKind::Page)?;
        let layouts = item
            .layouts
            .iter()
            .map(|(id, source)| self.evaluate(id, source, ModuleKind::Layout))
            .collect::<Result<Vec<_>, _>>()?;

        if let Some(page) = page {
            self.modules.insert(page);
        }
        for layout in layouts.into_iter().flatten() {
            self.modules.insert(layout);
        }
        self.page_data.insert(&self.config.url_for(&item.route), item.page_data);
        Ok(())
    }

    /// `None` when the module is already cached
    fn evaluate(&self, id: &str, source: &str, kind: ModuleKind) -> Result<Option<LoadedModule>, NavigationError> {
        if self.modules.contains(id) {
            return Ok(None);
        }
        let exports = self
            .host
            .evaluate(id, source)
            .map_err(|source| NavigationError::ModuleImport {
                module: id.to_string(),
                source,
            })?;
        LoadedModule::from_exports(id, kind, exports).map(Some)
    }
}
