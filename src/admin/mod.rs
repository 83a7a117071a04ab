//! Admin CRUD stores for job postings and permissions.
//!
//! Both admin screens share one shape: a paginated table, a search box, a
//! modal form for create/edit, and delete. [`CrudStore`] implements that
//! shape once over any [`AdminResource`]; [`JobAdminStore`] and
//! [`PermissionAdminStore`] are its two instantiations.
//!
//! Every action holds a drop guard while it runs. `loading` stays set until
//! the last overlapping action exits, on every exit path including
//! cancellation. Backend failures are
//! reported to the [`Notifier`] with the server's message and never
//! propagated to the caller.

mod job;
mod permission;

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard};

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::client::{ApiClient, fetch_one, fetch_page};
use crate::config::AdminConfig;
use crate::error::ApiError;
use crate::model::{Job, PageMeta, Permission};
use crate::notify::{Notifier, TracingNotifier};
use crate::query::{LocationQuery, encode_pattern};

pub use job::HR_ROLE;

/// Store for the job administration screen.
pub type JobAdminStore = CrudStore<Job>;

/// Store for the permission administration screen.
pub type PermissionAdminStore = CrudStore<Permission>;

const MSG_CREATED: &str = "Created successfully";
const MSG_UPDATED: &str = "Updated successfully";
const MSG_DELETED: &str = "Deleted successfully";

/// The signed-in account as far as the admin stores care: its role and,
/// for company-bound roles, its company.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Account {
    pub role: String,
    pub company_id: Option<String>,
}

impl Account {
    pub fn new(role: impl Into<String>, company_id: Option<String>) -> Self {
        Self {
            role: role.into(),
            company_id,
        }
    }

    /// The company this account is restricted to, if its role is
    /// company-bound.
    pub fn company_scope(&self) -> Option<&str> {
        if self.role == HR_ROLE {
            self.company_id.as_deref()
        } else {
            None
        }
    }
}

/// A resource managed through an admin screen.
pub trait AdminResource:
    Clone + Default + Serialize + DeserializeOwned + Send + Sync + 'static
{
    /// Collection path, e.g. `jobs`.
    const PATH: &'static str;

    /// Field the search box filters on with a `/text/` pattern.
    const SEARCH_FIELD: &'static str;

    /// Whether listings carry an `isActive` filter.
    const HAS_ACTIVE_FILTER: bool = false;

    /// Whether listings are restricted to the account's company.
    const COMPANY_SCOPED: bool = false;

    /// Server id; empty for a record that has not been created yet.
    fn id(&self) -> &str;

    /// An empty form, pre-filled for the given company scope.
    fn blank(_company_scope: Option<&str>) -> Self {
        Self::default()
    }

    /// Request body for create and update.
    ///
    /// # Errors
    ///
    /// Returns [`serde_json::Error`] if the record cannot be serialized.
    fn payload(&self) -> Result<Value, serde_json::Error> {
        let mut body = serde_json::to_value(self)?;
        if let Value::Object(map) = &mut body {
            map.remove("_id");
        }
        Ok(body)
    }
}

/// UI-visible state of an admin screen.
#[derive(Debug, Clone, PartialEq)]
pub struct CrudState<R> {
    pub items: Vec<R>,
    pub meta: PageMeta,
    pub form: R,
    pub modal_open: bool,
    pub loading: bool,
    pub search_value: String,
    /// Only meaningful for resources with an active filter.
    pub active_only: bool,
    /// Actions currently running; `loading` is set while this is non-zero.
    in_flight: usize,
}

/// Counts one running action; `loading` clears when the last one drops.
struct LoadingGuard<'a, R> {
    state: &'a Mutex<CrudState<R>>,
}

impl<'a, R> LoadingGuard<'a, R> {
    fn enter(state: &'a Mutex<CrudState<R>>) -> Self {
        let mut guard = lock(state);
        guard.in_flight += 1;
        guard.loading = true;
        Self { state }
    }
}

impl<R> Drop for LoadingGuard<'_, R> {
    fn drop(&mut self) {
        let mut state = lock(self.state);
        state.in_flight = state.in_flight.saturating_sub(1);
        state.loading = state.in_flight > 0;
    }
}

fn lock<R>(state: &Mutex<CrudState<R>>) -> MutexGuard<'_, CrudState<R>> {
    state.lock().expect("admin state mutex poisoned")
}

/// Paginated CRUD store over one [`AdminResource`].
///
/// `Clone` is cheap and clones share state. The state lock is never held
/// across a backend call.
#[derive(Clone)]
pub struct CrudStore<R: AdminResource> {
    client: Arc<dyn ApiClient>,
    notifier: Arc<dyn Notifier>,
    account: Arc<Account>,
    config: Arc<AdminConfig>,
    state: Arc<Mutex<CrudState<R>>>,
}

impl<R: AdminResource> fmt::Debug for CrudStore<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CrudStore")
            .field("path", &R::PATH)
            .field("account", &self.account)
            .finish()
    }
}

impl<R: AdminResource> CrudStore<R> {
    /// Create a store acting as `account`.
    pub fn new(client: Arc<dyn ApiClient>, account: Account) -> Self {
        Self::with_parts(
            client,
            Arc::new(TracingNotifier),
            account,
            AdminConfig::default(),
        )
    }

    /// Create a store with an explicit notifier and configuration.
    pub fn with_parts(
        client: Arc<dyn ApiClient>,
        notifier: Arc<dyn Notifier>,
        account: Account,
        config: AdminConfig,
    ) -> Self {
        let state = CrudState {
            items: Vec::new(),
            meta: PageMeta::first(config.page_size),
            form: R::blank(account.company_scope()),
            modal_open: false,
            loading: false,
            search_value: String::new(),
            active_only: true,
            in_flight: 0,
        };
        Self {
            client,
            notifier,
            account: Arc::new(account),
            config: Arc::new(config),
            state: Arc::new(Mutex::new(state)),
        }
    }

    /// A clone of the current state.
    pub fn snapshot(&self) -> CrudState<R> {
        lock(&self.state).clone()
    }

    /// Replace the form being edited.
    pub fn set_form(&self, form: R) {
        lock(&self.state).form = form;
    }

    /// Load the current page with the current search text.
    ///
    /// # Returns
    ///
    /// `true` if the listing was replaced.
    pub async fn load(&self) -> bool {
        let _loading = LoadingGuard::enter(&self.state);
        self.load_page().await
    }

    /// Search from the first page.
    pub async fn search(&self, text: impl Into<String>) -> bool {
        {
            let mut state = lock(&self.state);
            state.search_value = text.into();
            state.meta.current = 1;
        }
        self.load().await
    }

    /// Jump to page `page` (clamped to at least 1) and reload.
    pub async fn set_page(&self, page: u32) -> bool {
        lock(&self.state).meta.current = page.max(1);
        self.load().await
    }

    /// Open the modal with a blank form.
    pub fn open_create(&self) {
        let mut state = lock(&self.state);
        state.form = R::blank(self.account.company_scope());
        state.modal_open = true;
    }

    /// Close the modal and discard the form.
    pub fn close_modal(&self) {
        let mut state = lock(&self.state);
        state.form = R::blank(self.account.company_scope());
        state.modal_open = false;
    }

    /// Fetch a record into the form and open the modal.
    pub async fn open_edit(&self, id: &str) -> bool {
        let _loading = LoadingGuard::enter(&self.state);
        let path = format!("{}/{id}", R::PATH);
        match fetch_one::<R>(self.client.as_ref(), &path).await {
            Ok(record) => {
                let mut state = lock(&self.state);
                state.form = record;
                state.modal_open = true;
                true
            }
            Err(e) => self.report(e),
        }
    }

    /// Create or update the record in the form.
    ///
    /// A form with an id is updated, otherwise created. On success the form
    /// is reset, the modal closed and the listing reloaded.
    pub async fn save(&self) -> bool {
        let _loading = LoadingGuard::enter(&self.state);
        let form = lock(&self.state).form.clone();
        let body = match form.payload() {
            Ok(body) => body,
            Err(e) => return self.report(ApiError::from(e)),
        };

        let (result, message) = if form.id().is_empty() {
            (self.client.add(R::PATH, body).await, MSG_CREATED)
        } else {
            let path = format!("{}/{}", R::PATH, form.id());
            (self.client.update(&path, body).await, MSG_UPDATED)
        };

        if let Err(e) = result {
            return self.report(e);
        }
        tracing::info!(path = R::PATH, id = form.id(), "record saved");
        self.notifier.success(message);
        self.close_modal();
        self.load_page().await;
        true
    }

    /// Delete a record and reload the listing.
    pub async fn delete(&self, id: &str) -> bool {
        let _loading = LoadingGuard::enter(&self.state);
        let path = format!("{}/{id}", R::PATH);
        if let Err(e) = self.client.delete(&path).await {
            return self.report(e);
        }
        tracing::info!(path = R::PATH, id, "record deleted");
        self.notifier.success(MSG_DELETED);
        self.load_page().await;
        true
    }

    /// Listing path for the current page, search text and scope.
    pub(crate) fn listing_path(&self) -> String {
        let state = lock(&self.state);
        let mut query = LocationQuery::new();
        query.append("current", state.meta.current.to_string());
        query.append("pageSize", state.meta.page_size.to_string());
        if R::HAS_ACTIVE_FILTER {
            query.append("isActive", state.active_only.to_string());
        }
        query.append("sort", self.config.sort.as_str());
        if !state.search_value.is_empty() {
            query.append(R::SEARCH_FIELD, encode_pattern(&state.search_value));
        }
        if R::COMPANY_SCOPED
            && let Some(company) = self.account.company_scope()
        {
            query.append("companyId", company);
        }
        format!("{}?{}", R::PATH, query)
    }

    async fn load_page(&self) -> bool {
        let path = self.listing_path();
        match fetch_page::<R>(self.client.as_ref(), &path).await {
            Ok(page) => {
                tracing::debug!(path = %path, items = page.result.len(), "admin listing loaded");
                let mut state = lock(&self.state);
                state.items = page.result;
                state.meta = page.meta;
                true
            }
            Err(e) => self.report(e),
        }
    }

    fn report(&self, err: ApiError) -> bool {
        tracing::warn!(path = R::PATH, error = %err, "admin action failed");
        self.notifier.error(&err.user_message());
        false
    }
}
