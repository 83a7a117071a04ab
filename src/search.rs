//! URL-synchronized job search store.
//!
//! [`SearchQuerySync`] keeps the displayed job listing consistent with the
//! query string of the current location. Data flows one way:
//!
//! ```text
//! filter edit -> navigate_with_query -> query change -> refresh() -> ListingPage
//! ```
//!
//! Every `refresh()` rebuilds the [`SearchFilter`] from the URL and asks the
//! backend for the matching page. Overlapping refreshes are ordered by a
//! request sequence number: a response is applied only if no newer refresh
//! was issued while it was in flight.

use std::fmt;
use std::sync::Arc;

use tokio::sync::RwLock;

use crate::client::{ApiClient, fetch_page};
use crate::config::SearchConfig;
use crate::error::NavigationError;
use crate::filter::{
    ListingPage, PARAM_CURRENT, SalaryRange, SearchFilter, echoed_keyword,
};
use crate::live::LiveHandle;
use crate::model::Job;
use crate::navigation::Navigator;
use crate::notify::{Notifier, TracingNotifier};
use crate::query::LocationQuery;

/// Parameters the store always sets itself on listing requests. Copies of
/// these found in the URL are not forwarded.
const RESERVED_PARAMS: [&str; 5] = ["populate", "isActive", "current", "pageSize", "sort"];

/// UI-visible state of the search screen.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchState {
    /// Filter as last rebuilt from the URL, plus any unsubmitted edits.
    pub filter: SearchFilter,
    /// The page of jobs on screen.
    pub listing: ListingPage,
    /// Highest salary on the server; `None` until probed or if there are no
    /// jobs.
    pub salary_bound: Option<f64>,
    /// `true` while the most recent refresh is in flight.
    pub loading: bool,
    /// Sequence number of the most recently issued refresh.
    pub(crate) latest_seq: u64,
}

/// What happened to a single [`refresh`](SearchQuerySync::refresh).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// The response replaced the displayed listing.
    Applied,
    /// A newer refresh was issued meanwhile; the response was dropped.
    Superseded,
    /// The request failed; the failure was reported and the previous
    /// listing kept.
    Failed,
}

/// Search store bound to one navigator and one backend.
///
/// Construct one per session through [`SearchQuerySync::builder`]. `Clone`
/// is cheap: all fields are `Arc`-wrapped, and clones share state.
#[derive(Clone)]
pub struct SearchQuerySync {
    client: Arc<dyn ApiClient>,
    navigator: Arc<dyn Navigator>,
    notifier: Arc<dyn Notifier>,
    config: Arc<SearchConfig>,
    state: Arc<RwLock<SearchState>>,
}

impl fmt::Debug for SearchQuerySync {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SearchQuerySync")
            .field("config", &self.config)
            .finish()
    }
}

impl SearchQuerySync {
    /// Start building a store over `client` and `navigator`.
    pub fn builder(
        client: Arc<dyn ApiClient>,
        navigator: Arc<dyn Navigator>,
    ) -> SearchQuerySyncBuilder {
        SearchQuerySyncBuilder {
            client,
            navigator,
            notifier: None,
            config: SearchConfig::default(),
        }
    }

    /// A clone of the full UI-visible state.
    pub async fn snapshot(&self) -> SearchState {
        self.state.read().await.clone()
    }

    /// The page of jobs on screen.
    pub async fn listing(&self) -> ListingPage {
        self.state.read().await.listing.clone()
    }

    /// The current filter.
    pub async fn filter(&self) -> SearchFilter {
        self.state.read().await.filter.clone()
    }

    /// The salary-range upper bound, if known.
    pub async fn salary_bound(&self) -> Option<f64> {
        self.state.read().await.salary_bound
    }

    /// The 1-based page index from the URL.
    pub async fn current_page_index(&self) -> u32 {
        self.state.read().await.filter.page_index
    }

    /// Edit the location text without navigating.
    pub async fn set_location_text(&self, text: impl Into<String>) {
        self.state.write().await.filter.location_text = text.into();
    }

    /// Edit the keyword text without navigating.
    pub async fn set_keyword_text(&self, text: impl Into<String>) {
        self.state.write().await.filter.keyword_text = text.into();
    }

    /// Edit the salary range without navigating. Inverted ranges are
    /// accepted here and normalized by [`apply_filters`](Self::apply_filters).
    pub async fn set_salary_range(&self, range: SalaryRange) {
        self.state.write().await.filter.salary_range = range;
    }

    /// Select or deselect an experience level.
    pub async fn toggle_level(&self, level: &str) {
        toggle(&mut self.state.write().await.filter.levels, level);
    }

    /// Select or deselect a skill.
    pub async fn toggle_skill(&self, skill: &str) {
        toggle(&mut self.state.write().await.filter.skills, skill);
    }

    /// Reload the listing for the current URL.
    ///
    /// Rebuilds the filter from the URL query, forwards the query to the
    /// listing endpoint together with the store's fixed parameters, and
    /// replaces the displayed page when the response arrives, unless a newer
    /// refresh has been issued in the meantime. Failures are reported to the
    /// notifier and leave the previous page on screen.
    ///
    /// # Returns
    ///
    /// How the refresh concluded. Callers driven by UI events can ignore it.
    pub async fn refresh(&self) -> RefreshOutcome {
        let (seq, path, keyword) = {
            let mut state = self.state.write().await;
            state.latest_seq += 1;
            let seq = state.latest_seq;
            // Read the location under the lock so sequence order matches the
            // order in which locations were observed.
            let query = self.navigator.current().query;
            state.filter = SearchFilter::from_query(&query, state.salary_bound);
            state.loading = true;
            let path = self.listing_path(&query, state.filter.page_index);
            (seq, path, echoed_keyword(&query))
        };

        tracing::debug!(seq, path = %path, "refresh: requesting listing");
        let result = fetch_page::<Job>(self.client.as_ref(), &path).await;

        let mut state = self.state.write().await;
        if seq != state.latest_seq {
            tracing::debug!(
                seq,
                latest = state.latest_seq,
                "refresh: discarding superseded response"
            );
            return RefreshOutcome::Superseded;
        }
        state.loading = false;

        match result {
            Ok(page) => {
                tracing::debug!(
                    seq,
                    items = page.result.len(),
                    total = page.meta.total,
                    "refresh: listing applied"
                );
                state.listing = ListingPage::from_page(page, keyword);
                RefreshOutcome::Applied
            }
            Err(e) => {
                drop(state);
                tracing::warn!(seq, error = %e, "refresh: listing request failed");
                self.notifier.error(&e.user_message());
                RefreshOutcome::Failed
            }
        }
    }

    /// Navigate to a plain location + keyword search.
    ///
    /// Range, level and skill filters are dropped from the URL.
    ///
    /// # Errors
    ///
    /// Returns [`NavigationError`] if the navigator rejects the search route.
    pub async fn search_by_keyword_and_location(&self) -> Result<(), NavigationError> {
        let query = self.state.read().await.filter.simple_query();
        self.navigate(query)
    }

    /// Set the keyword and run a plain location + keyword search.
    ///
    /// # Errors
    ///
    /// Returns [`NavigationError`] if the navigator rejects the search route.
    pub async fn set_keyword(&self, text: impl Into<String>) -> Result<(), NavigationError> {
        self.set_keyword_text(text).await;
        self.search_by_keyword_and_location().await
    }

    /// Navigate to the full filter query.
    ///
    /// The salary range is normalized first (and the normalized range is
    /// kept in the store), then the URL query is replaced with location,
    /// keyword, salary bounds, levels and skills.
    ///
    /// # Errors
    ///
    /// Returns [`NavigationError`] if the navigator rejects the search route.
    pub async fn apply_filters(&self) -> Result<(), NavigationError> {
        let query = {
            let mut state = self.state.write().await;
            state.filter.salary_range = state.filter.salary_range.normalized();
            state.filter.filter_query()
        };
        self.navigate(query)
    }

    /// Navigate to page `page` of the current results, keeping every other
    /// query parameter. Pages below 1 are clamped to 1.
    ///
    /// # Errors
    ///
    /// Returns [`NavigationError`] if the navigator rejects the search route.
    pub fn go_to_page(&self, page: u32) -> Result<(), NavigationError> {
        let mut query = self.navigator.current().query;
        query.set(PARAM_CURRENT, page.max(1).to_string());
        self.navigate(query)
    }

    /// Probe the highest salary on the server to bound the salary control.
    ///
    /// Requests a single job sorted by salary, descending. An empty job
    /// collection leaves the bound unset; a failed request is reported and
    /// also leaves it unset. When the filter has no upper bound yet, the
    /// probed bound becomes its upper bound.
    ///
    /// # Returns
    ///
    /// The bound, if one could be determined.
    pub async fn init_salary_bound(&self) -> Option<f64> {
        let path = format!(
            "{}?sort=-salary&current=1&pageSize=1",
            self.config.listing_path
        );
        let bound = match fetch_page::<Job>(self.client.as_ref(), &path).await {
            Ok(page) => page.result.first().map(|job| job.salary),
            Err(e) => {
                tracing::warn!(error = %e, "salary bound probe failed");
                self.notifier.error(&e.user_message());
                None
            }
        };

        match bound {
            Some(max) => {
                let mut state = self.state.write().await;
                state.salary_bound = Some(max);
                if state.filter.salary_range.max.is_none() {
                    state.filter.salary_range.max = Some(max);
                }
                tracing::debug!(max, "salary bound set");
            }
            None => tracing::debug!("salary bound unavailable, leaving range open"),
        }
        bound
    }

    /// Run the mount-time work: the salary probe and the first refresh.
    pub async fn mount(&self) {
        tokio::join!(self.init_salary_bound(), self.refresh());
    }

    /// Mount the store and keep it in sync with the navigator.
    ///
    /// Spawns a background task that runs [`mount`](Self::mount) and then
    /// starts a [`refresh`](Self::refresh) for every query change the
    /// navigator reports. Refreshes are not awaited by the loop; ordering is
    /// enforced by the request sequence number.
    ///
    /// Must be called from within a tokio runtime.
    pub fn start_live(&self) -> LiveHandle {
        LiveHandle::spawn(self.clone(), self.navigator.observe_query_change())
    }

    fn navigate(&self, query: LocationQuery) -> Result<(), NavigationError> {
        tracing::debug!(query = %query, "search: navigating");
        self.navigator
            .navigate_with_query(&self.config.search_route, query)
    }

    /// Listing request path for a URL query: the query's own parameters
    /// followed by the fixed listing parameters.
    fn listing_path(&self, query: &LocationQuery, page_index: u32) -> String {
        let mut forwarded = LocationQuery::new();
        for (k, v) in query.iter() {
            if !RESERVED_PARAMS.contains(&k) {
                forwarded.append(k, v);
            }
        }
        forwarded.append("populate", self.config.populate.as_str());
        forwarded.append("isActive", "true");
        forwarded.append("current", page_index.to_string());
        forwarded.append("pageSize", self.config.page_size.to_string());
        forwarded.append("sort", self.config.sort.as_str());
        format!("{}?{}", self.config.listing_path, forwarded)
    }
}

fn toggle(set: &mut std::collections::BTreeSet<String>, value: &str) {
    if !set.remove(value) {
        set.insert(value.to_string());
    }
}

/// Builder for [`SearchQuerySync`].
pub struct SearchQuerySyncBuilder {
    client: Arc<dyn ApiClient>,
    navigator: Arc<dyn Navigator>,
    notifier: Option<Arc<dyn Notifier>>,
    config: SearchConfig,
}

impl SearchQuerySyncBuilder {
    /// Where failures are reported. Defaults to [`TracingNotifier`].
    pub fn notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = Some(notifier);
        self
    }

    /// Override the default [`SearchConfig`].
    pub fn config(mut self, config: SearchConfig) -> Self {
        self.config = config;
        self
    }

    pub fn build(self) -> SearchQuerySync {
        SearchQuerySync {
            client: self.client,
            navigator: self.navigator,
            notifier: self
                .notifier
                .unwrap_or_else(|| Arc::new(TracingNotifier)),
            config: Arc::new(self.config),
            state: Arc::new(RwLock::new(SearchState::default())),
        }
    }
}
