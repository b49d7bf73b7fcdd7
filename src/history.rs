//! Navigation history
//!
//! [`HistoryState`] is the state object stored with each browser history
//! entry. [`History`] is a bounded back/forward stack, and [`MemoryHistory`]
//! wraps it as a [`HistoryApi`] for hosts without a browser:
//! - Forward/backward navigation
//! - History truncation on new navigation
//! - Configurable history limits
//! - Recorded full-page loads

use crate::host::HistoryApi;
use crate::{trace_log, NavigationDirection, RouteChangeEvent};
use serde::{Deserialize, Serialize};
use std::cell::RefCell;

/// State object pushed with every entry: `{ "path": ... }`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryState {
    pub path: String,
}

impl HistoryState {
    pub fn new(path: impl Into<String>) -> Self {
        Self { path: path.into() }
    }
}

/// Navigation history entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryEntry {
    /// URL shown in the address bar
    pub url: String,
    /// State stored with the entry
    pub state: Option<HistoryState>,
}

impl HistoryEntry {
    /// Create a new history entry
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            state: None,
        }
    }

    /// Create with state
    pub fn with_state(url: impl Into<String>, state: HistoryState) -> Self {
        Self {
            url: url.into(),
            state: Some(state),
        }
    }
}

/// Navigation history stack
#[derive(Debug, Clone)]
pub struct History {
    entries: Vec<HistoryEntry>,
    current: usize,
    /// Maximum history size (0 = unlimited)
    max_size: usize,
}

impl History {
    const DEFAULT_MAX_SIZE: usize = 1000;

    /// Create a new history with initial URL
    pub fn new(initial_url: impl Into<String>) -> Self {
        Self::with_max_size(initial_url, Self::DEFAULT_MAX_SIZE)
    }

    /// Create with custom max size
    pub fn with_max_size(initial_url: impl Into<String>, max_size: usize) -> Self {
        Self {
            entries: vec![HistoryEntry::new(initial_url)],
            current: 0,
            max_size,
        }
    }

    /// Current entry
    pub fn current_entry(&self) -> &HistoryEntry {
        // `current` always indexes a live entry
        &self.entries[self.current]
    }

    /// Current URL
    pub fn current_url(&self) -> &str {
        &self.current_entry().url
    }

    /// Push a new entry, dropping any forward history
    pub fn push(&mut self, entry: HistoryEntry) -> RouteChangeEvent {
        let from = Some(self.current_url().to_string());
        let to = entry.url.clone();

        self.entries.truncate(self.current + 1);
        self.entries.push(entry);
        self.current += 1;
        self.enforce_size_limit();

        RouteChangeEvent {
            from,
            to,
            direction: NavigationDirection::Forward,
        }
    }

    /// Replace the current entry
    pub fn replace(&mut self, entry: HistoryEntry) -> RouteChangeEvent {
        let from = Some(self.current_url().to_string());
        let to = entry.url.clone();
        self.entries[self.current] = entry;

        RouteChangeEvent {
            from,
            to,
            direction: NavigationDirection::Replace,
        }
    }

    /// Go back in history
    pub fn back(&mut self) -> Option<RouteChangeEvent> {
        if !self.can_go_back() {
            return None;
        }
        let from = Some(self.current_url().to_string());
        self.current -= 1;

        Some(RouteChangeEvent {
            from,
            to: self.current_url().to_string(),
            direction: NavigationDirection::Back,
        })
    }

    /// Go forward in history
    pub fn forward(&mut self) -> Option<RouteChangeEvent> {
        if !self.can_go_forward() {
            return None;
        }
        let from = Some(self.current_url().to_string());
        self.current += 1;

        Some(RouteChangeEvent {
            from,
            to: self.current_url().to_string(),
            direction: NavigationDirection::Forward,
        })
    }

    pub fn can_go_back(&self) -> bool {
        self.current > 0
    }

    pub fn can_go_forward(&self) -> bool {
        self.current + 1 < self.entries.len()
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Never true: the stack always holds the current entry
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    fn enforce_size_limit(&mut self) {
        if self.max_size > 0 && self.entries.len() > self.max_size {
            let excess = self.entries.len() - self.max_size;
            self.entries.drain(0..excess);
            self.current = self.current.saturating_sub(excess);
        }
    }
}

impl Default for History {
    fn default() -> Self {
        Self::new("/")
    }
}

/// In-memory [`HistoryApi`]
///
/// Full page loads are recorded instead of performed.
#[derive(Debug, Default)]
pub struct MemoryHistory {
    stack: RefCell<History>,
    assigned: RefCell<Vec<String>>,
}

impl MemoryHistory {
    pub fn new(initial_url: impl Into<String>) -> Self {
        Self {
            stack: RefCell::new(History::new(initial_url)),
            assigned: RefCell::new(Vec::new()),
        }
    }

    /// Current URL
    pub fn current_url(&self) -> String {
        self.stack.borrow().current_url().to_string()
    }

    /// State of the current entry
    pub fn current_state(&self) -> Option<HistoryState> {
        self.stack.borrow().current_entry().state.clone()
    }

    /// Step back
    pub fn back(&self) -> Option<RouteChangeEvent> {
        self.stack.borrow_mut().back()
    }

    /// Step forward
    pub fn forward(&self) -> Option<RouteChangeEvent> {
        self.stack.borrow_mut().forward()
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.stack.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.stack.borrow().is_empty()
    }

    /// Every URL passed to [`HistoryApi::assign_location`], oldest first
    pub fn assigned_locations(&self) -> Vec<String> {
        self.assigned.borrow().clone()
    }
}

impl HistoryApi for MemoryHistory {
    fn push_state(&self, state: &HistoryState, url: &str) {
        trace_log!("history push '{}'", url);
        self.stack
            .borrow_mut()
            .push(HistoryEntry::with_state(url, state.clone()));
    }

    fn replace_state(&self, state: &HistoryState, url: &str) {
        trace_log!("history replace '{}'", url);
        self.stack
            .borrow_mut()
            .replace(HistoryEntry::with_state(url, state.clone()));
    }

    fn assign_location(&self, href: &str) {
        self.assigned.borrow_mut().push(href.to_string());
    }
}
