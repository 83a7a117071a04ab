//! Navigation seam between the stores and the platform router.
//!
//! The search store never reads a router directly. It asks a [`Navigator`]
//! for the current [`Location`], pushes new locations through
//! [`navigate_with_query`](Navigator::navigate_with_query), and subscribes to
//! query changes with [`observe_query_change`](Navigator::observe_query_change).
//! [`MemoryNavigator`] is a self-contained implementation with a history
//! stack, suitable for headless clients and tests.

use std::sync::Mutex;

use tokio::sync::watch;

use crate::error::NavigationError;
use crate::query::LocationQuery;

/// A navigable location: a route path plus its decoded query.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Location {
    pub route: String,
    pub query: LocationQuery,
}

impl Location {
    /// Build a location from a route and query.
    pub fn new(route: impl Into<String>, query: LocationQuery) -> Self {
        Self {
            route: route.into(),
            query,
        }
    }

    /// Parse a full path such as `/search?name=%2Fgo%2Fi`.
    pub fn parse(full_path: &str) -> Self {
        let (route, query) = LocationQuery::split_path(full_path);
        Self::new(route, query)
    }

    /// The full path, `route?query`, or just `route` for an empty query.
    pub fn full_path(&self) -> String {
        if self.query.is_empty() {
            self.route.clone()
        } else {
            format!("{}?{}", self.route, self.query)
        }
    }
}

/// Narrow interface over the platform's navigation API.
pub trait Navigator: Send + Sync {
    /// The location currently shown.
    fn current(&self) -> Location;

    /// Push a new history entry for `route` with `query`.
    ///
    /// # Errors
    ///
    /// Returns [`NavigationError::InvalidRoute`] if `route` is not an
    /// absolute path.
    fn navigate_with_query(
        &self,
        route: &str,
        query: LocationQuery,
    ) -> Result<(), NavigationError>;

    /// Subscribe to the current location. The receiver is marked changed
    /// whenever the query portion of the location changes.
    fn observe_query_change(&self) -> watch::Receiver<Location>;
}

struct History {
    entries: Vec<Location>,
    index: usize,
}

/// In-memory [`Navigator`] with browser-like history.
///
/// Navigating truncates any forward entries, [`back`](Self::back) and
/// [`forward`](Self::forward) move through the stack. Observers are woken
/// only when the query differs from the one they last saw, mirroring a
/// router that reports query changes.
pub struct MemoryNavigator {
    tx: watch::Sender<Location>,
    history: Mutex<History>,
}

impl MemoryNavigator {
    /// Start at `initial`, e.g. `"/search?location=%2F%2F"`.
    pub fn new(initial: &str) -> Self {
        let location = Location::parse(initial);
        let (tx, _rx) = watch::channel(location.clone());
        Self {
            tx,
            history: Mutex::new(History {
                entries: vec![location],
                index: 0,
            }),
        }
    }

    /// Step back one history entry. Returns `false` at the start of history.
    pub fn back(&self) -> bool {
        let mut history = self.history.lock().expect("history mutex poisoned");
        if history.index == 0 {
            return false;
        }
        history.index -= 1;
        self.publish(history.entries[history.index].clone());
        true
    }

    /// Step forward one history entry. Returns `false` at the end of history.
    pub fn forward(&self) -> bool {
        let mut history = self.history.lock().expect("history mutex poisoned");
        if history.index + 1 >= history.entries.len() {
            return false;
        }
        history.index += 1;
        self.publish(history.entries[history.index].clone());
        true
    }

    /// Number of entries in the history stack.
    pub fn history_len(&self) -> usize {
        self.history.lock().expect("history mutex poisoned").entries.len()
    }

    fn publish(&self, next: Location) {
        let query_changed = self.tx.send_if_modified(|current| {
            let changed = current.query != next.query;
            *current = next;
            changed
        });
        tracing::debug!(query_changed, "location updated");
    }
}

impl Default for MemoryNavigator {
    fn default() -> Self {
        Self::new("/")
    }
}

impl Navigator for MemoryNavigator {
    fn current(&self) -> Location {
        self.tx.borrow().clone()
    }

    fn navigate_with_query(
        &self,
        route: &str,
        query: LocationQuery,
    ) -> Result<(), NavigationError> {
        if !route.starts_with('/') {
            return Err(NavigationError::InvalidRoute(route.to_string()));
        }
        let next = Location::new(route, query);
        let mut history = self.history.lock().expect("history mutex poisoned");
        let keep = history.index + 1;
        history.entries.truncate(keep);
        history.entries.push(next.clone());
        history.index = history.entries.len() - 1;
        tracing::debug!(path = %next.full_path(), "navigate");
        self.publish(next);
        Ok(())
    }

    fn observe_query_change(&self) -> watch::Receiver<Location> {
        self.tx.subscribe()
    }
}
