//! Search filter state and its mapping to and from the URL query.
//!
//! The URL is the source of truth: [`SearchFilter::from_query`] rebuilds the
//! whole filter from a [`LocationQuery`] on every navigation, and
//! [`SearchFilter::simple_query`] / [`SearchFilter::filter_query`] build the
//! query a filter edit navigates to.

use std::collections::BTreeSet;

use crate::model::{Job, Page};
use crate::query::{
    LocationQuery, decode_pattern, encode_pattern, encode_pattern_ci, join_list, split_list,
};

/// Query parameter carrying the keyword filter, `/text/i`.
pub const PARAM_NAME: &str = "name";
/// Query parameter carrying the location filter, `/text/`.
pub const PARAM_LOCATION: &str = "location";
/// Lower salary bound.
pub const PARAM_GTE: &str = "gte";
/// Upper salary bound.
pub const PARAM_LTE: &str = "lte";
/// Comma-joined experience levels.
pub const PARAM_LEVEL: &str = "level";
/// Comma-joined `/skill/i` patterns.
pub const PARAM_SKILLS: &str = "skills";
/// 1-based page index.
pub const PARAM_CURRENT: &str = "current";

/// A salary interval whose upper bound may not be known yet.
///
/// The upper bound stays `None` until the highest salary on the server has
/// been probed (and stays `None` if there are no jobs at all).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SalaryRange {
    pub min: f64,
    pub max: Option<f64>,
}

impl SalaryRange {
    pub fn new(min: f64, max: Option<f64>) -> Self {
        Self { min, max }
    }

    /// The range with `min <= max`, swapping the bounds if they are inverted.
    ///
    /// # Examples
    ///
    /// ```
    /// use jobboard_stores::SalaryRange;
    ///
    /// let range = SalaryRange::new(500.0, Some(100.0)).normalized();
    /// assert_eq!(range, SalaryRange::new(100.0, Some(500.0)));
    /// ```
    pub fn normalized(self) -> Self {
        match self.max {
            Some(max) if self.min > max => Self {
                min: max,
                max: Some(self.min),
            },
            _ => self,
        }
    }
}

/// Filter state of the job search screen.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchFilter {
    pub location_text: String,
    pub keyword_text: String,
    pub salary_range: SalaryRange,
    pub levels: BTreeSet<String>,
    pub skills: BTreeSet<String>,
    pub page_index: u32,
}

impl Default for SearchFilter {
    fn default() -> Self {
        Self {
            location_text: String::new(),
            keyword_text: String::new(),
            salary_range: SalaryRange::default(),
            levels: BTreeSet::new(),
            skills: BTreeSet::new(),
            page_index: 1,
        }
    }
}

impl SearchFilter {
    /// Rebuild a filter from a URL query.
    ///
    /// Missing parameters fall back to defaults; a missing `lte` falls back
    /// to `salary_bound`, the highest salary known on the server. Values
    /// that fail to parse, and non-finite ones such as `inf` or `NaN`, are
    /// treated as missing.
    pub fn from_query(query: &LocationQuery, salary_bound: Option<f64>) -> Self {
        let number = |key: &str| {
            query
                .get(key)
                .and_then(|v| v.trim().parse::<f64>().ok())
                .filter(|n| n.is_finite())
        };

        Self {
            location_text: query.get(PARAM_LOCATION).map(decode_pattern).unwrap_or_default(),
            keyword_text: query.get(PARAM_NAME).map(decode_pattern).unwrap_or_default(),
            salary_range: SalaryRange {
                min: number(PARAM_GTE).unwrap_or(0.0),
                max: number(PARAM_LTE).or(salary_bound),
            },
            levels: query
                .get(PARAM_LEVEL)
                .map(|raw| split_list(raw).map(str::to_string).collect())
                .unwrap_or_default(),
            skills: query
                .get(PARAM_SKILLS)
                .map(|raw| split_list(raw).map(decode_pattern).collect())
                .unwrap_or_default(),
            page_index: query
                .get(PARAM_CURRENT)
                .and_then(|v| v.trim().parse::<u32>().ok())
                .unwrap_or(1)
                .max(1),
        }
    }

    /// Query for a plain location + keyword search.
    ///
    /// The location is always present (an empty location encodes as `//`,
    /// which matches everything); the keyword only when non-empty. Range,
    /// level and skill filters are not carried over.
    pub fn simple_query(&self) -> LocationQuery {
        let mut query = LocationQuery::new();
        query.set(PARAM_LOCATION, encode_pattern(&self.location_text));
        if !self.keyword_text.is_empty() {
            query.set(PARAM_NAME, encode_pattern_ci(&self.keyword_text));
        }
        query
    }

    /// Query for the advanced filter panel.
    ///
    /// Starts from [`simple_query`](Self::simple_query) and adds the
    /// normalized salary bounds, `level` when any level is selected and
    /// `skills` when any skill is selected. An unknown upper bound omits
    /// `lte`.
    pub fn filter_query(&self) -> LocationQuery {
        let mut query = self.simple_query();
        let range = self.salary_range.normalized();
        query.set(PARAM_GTE, range.min.to_string());
        if let Some(max) = range.max {
            query.set(PARAM_LTE, max.to_string());
        }
        if !self.levels.is_empty() {
            query.set(PARAM_LEVEL, join_list(&self.levels));
        }
        if !self.skills.is_empty() {
            query.set(
                PARAM_SKILLS,
                join_list(self.skills.iter().map(|s| encode_pattern_ci(s))),
            );
        }
        query
    }
}

/// The keyword echoed back above the results.
///
/// Taken from `name` when non-empty, else from `location`, with pattern
/// delimiters stripped; empty when neither is set.
pub fn echoed_keyword(query: &LocationQuery) -> String {
    query
        .get(PARAM_NAME)
        .filter(|v| !v.is_empty())
        .or_else(|| query.get(PARAM_LOCATION))
        .map(decode_pattern)
        .unwrap_or_default()
}

/// The page of jobs currently displayed.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ListingPage {
    pub items: Vec<Job>,
    pub current_page: u32,
    pub page_size: u32,
    pub total_pages: u32,
    pub total_count: u64,
    pub echoed_keyword: String,
}

impl ListingPage {
    /// Build the displayed page from a server page and the echoed keyword.
    pub fn from_page(page: Page<Job>, echoed_keyword: String) -> Self {
        Self {
            items: page.result,
            current_page: page.meta.current,
            page_size: page.meta.page_size,
            total_pages: page.meta.pages,
            total_count: page.meta.total,
            echoed_keyword,
        }
    }
}
