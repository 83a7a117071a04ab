//! Wire types exchanged with the job-board backend.
//!
//! The backend uses Mongo-style `_id` identifiers and camelCase field names;
//! the serde attributes here map both onto Rust naming.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Pagination block returned alongside every listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageMeta {
    /// 1-based index of the returned page.
    pub current: u32,
    /// Requested page size.
    pub page_size: u32,
    /// Total number of pages.
    pub pages: u32,
    /// Total number of matching records.
    pub total: u64,
}

impl PageMeta {
    /// An empty first page of the given size, used before the first load.
    pub fn first(page_size: u32) -> Self {
        Self {
            current: 1,
            page_size,
            pages: 0,
            total: 0,
        }
    }
}

/// One page of a listing: `{ "result": [...], "meta": {...} }`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    pub result: Vec<T>,
    pub meta: PageMeta,
}

/// A company a job belongs to.
///
/// The backend sends either a bare id or, when the listing was requested
/// with `populate=companyId`, the company document itself. Both forms
/// deserialize into this type.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "CompanyRefWire")]
pub struct CompanyRef {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logo: Option<String>,
}

impl CompanyRef {
    /// A reference carrying only an id.
    pub fn with_id(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Self::default()
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum CompanyRefWire {
    Id(String),
    Populated {
        #[serde(rename = "_id")]
        id: String,
        #[serde(default)]
        name: Option<String>,
        #[serde(default)]
        logo: Option<String>,
    },
}

impl From<CompanyRefWire> for CompanyRef {
    fn from(wire: CompanyRefWire) -> Self {
        match wire {
            CompanyRefWire::Id(id) => Self::with_id(id),
            CompanyRefWire::Populated { id, name, logo } => Self { id, name, logo },
        }
    }
}

/// A job posting.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Job {
    #[serde(rename = "_id", default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub skills: Vec<String>,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub salary: f64,
    #[serde(default)]
    pub quantity: u32,
    #[serde(default)]
    pub level: String,
    #[serde(rename = "companyId", default)]
    pub company: CompanyRef,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub start_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub end_date: Option<DateTime<Utc>>,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

fn default_true() -> bool {
    true
}

/// An API permission: a named `(method, api_path)` pair grouped by module.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Permission {
    #[serde(rename = "_id", default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub api_path: String,
    #[serde(default)]
    pub module: String,
    #[serde(default)]
    pub method: String,
}
