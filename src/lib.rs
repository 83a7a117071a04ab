//! Client-side state stores for a job board.
//!
//! [`SearchQuerySync`] drives the public job search screen from the URL
//! query; [`JobAdminStore`] and [`PermissionAdminStore`] back the admin
//! tables. Stores reach the outside world only through three seams:
//! [`ApiClient`] for the REST backend, [`Navigator`] for the location, and
//! [`Notifier`] for user-facing messages.

pub mod admin;
mod auth;
mod client;
mod config;
mod error;
mod filter;
mod live;
pub mod model;
mod navigation;
mod notify;
pub mod query;
mod search;

pub use admin::{
    Account, AdminResource, CrudState, CrudStore, HR_ROLE, JobAdminStore, PermissionAdminStore,
};
pub use client::{ApiClient, ApiFuture, HttpApiClient, fetch_one, fetch_page};
pub use config::{AdminConfig, SearchConfig};
pub use error::{ApiError, NavigationError};
pub use filter::{ListingPage, SalaryRange, SearchFilter, echoed_keyword};
pub use live::LiveHandle;
pub use model::{CompanyRef, Job, Page, PageMeta, Permission};
pub use navigation::{Location, MemoryNavigator, Navigator};
pub use notify::{ChannelNotifier, Level, Notification, Notifier, TracingNotifier};
pub use query::LocationQuery;
pub use search::{RefreshOutcome, SearchQuerySync, SearchQuerySyncBuilder, SearchState};
