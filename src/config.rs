//! Store configuration.
//!
//! Both config types have defaults matching the job-board backend and can
//! be adjusted with struct-update syntax.

/// Configuration for [`SearchQuerySync`](crate::SearchQuerySync).
///
/// # Examples
///
/// ```
/// use jobboard_stores::SearchConfig;
///
/// let config = SearchConfig {
///     page_size: 12,
///     ..SearchConfig::default()
/// };
/// assert_eq!(config.page_size, 12);
/// assert_eq!(config.search_route, "/search");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchConfig {
    /// Resource path of the public job listing.
    ///
    /// Default: `jobs/client`.
    pub listing_path: String,

    /// Route the search actions navigate to.
    ///
    /// Default: `/search`.
    pub search_route: String,

    /// Jobs per listing page.
    ///
    /// Default: 9.
    pub page_size: u32,

    /// Reference field the backend should expand on listed jobs.
    ///
    /// Default: `companyId`.
    pub populate: String,

    /// Sort order of the listing.
    ///
    /// Default: `-createdAt` (newest first).
    pub sort: String,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            listing_path: "jobs/client".to_string(),
            search_route: "/search".to_string(),
            page_size: 9,
            populate: "companyId".to_string(),
            sort: "-createdAt".to_string(),
        }
    }
}

/// Configuration shared by the admin CRUD stores.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdminConfig {
    /// Rows per admin table page.
    ///
    /// Default: 6.
    pub page_size: u32,

    /// Sort order of admin listings.
    ///
    /// Default: `-createdAt`.
    pub sort: String,
}

impl Default for AdminConfig {
    fn default() -> Self {
        Self {
            page_size: 6,
            sort: "-createdAt".to_string(),
        }
    }
}
