//! Job postings as an admin resource.

use chrono::Utc;
use serde_json::Value;

use super::{AdminResource, CrudStore, lock};
use crate::model::{CompanyRef, Job};

/// Role whose accounts only see and create jobs for their own company.
pub const HR_ROLE: &str = "HR_USER";

impl AdminResource for Job {
    const PATH: &'static str = "jobs";
    const SEARCH_FIELD: &'static str = "name";
    const HAS_ACTIVE_FILTER: bool = true;
    const COMPANY_SCOPED: bool = true;

    fn id(&self) -> &str {
        &self.id
    }

    fn blank(company_scope: Option<&str>) -> Self {
        let now = Utc::now();
        Self {
            company: CompanyRef::with_id(company_scope.unwrap_or_default()),
            start_date: Some(now),
            end_date: Some(now),
            is_active: true,
            ..Self::default()
        }
    }

    /// The company reference travels as its bare id.
    fn payload(&self) -> Result<Value, serde_json::Error> {
        let mut body = serde_json::to_value(self)?;
        if let Value::Object(map) = &mut body {
            map.remove("_id");
            map.insert("companyId".to_string(), Value::String(self.company.id.clone()));
        }
        Ok(body)
    }
}

impl CrudStore<Job> {
    /// Show only active (or only inactive) jobs and reload.
    pub async fn set_active_only(&self, active_only: bool) -> bool {
        {
            let mut state = lock(&self.state);
            state.active_only = active_only;
            state.meta.current = 1;
        }
        self.load().await
    }
}
