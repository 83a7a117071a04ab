//! API permissions as an admin resource.

use super::AdminResource;
use crate::model::Permission;

impl AdminResource for Permission {
    const PATH: &'static str = "permissions";
    const SEARCH_FIELD: &'static str = "module";

    fn id(&self) -> &str {
        &self.id
    }
}
