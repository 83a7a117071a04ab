//! Bearer-token injection for outgoing backend requests.

use std::sync::{Arc, RwLock};

/// Session token attached to every backend request.
///
/// The HTTP client and the session layer share the same cell, so signing in
/// or out takes effect on the next request. An empty token sends no
/// `Authorization` header, which is how anonymous job search reaches the
/// public endpoints.
#[derive(Clone, Default)]
pub(crate) struct BearerToken {
    pub(crate) token: Arc<RwLock<String>>,
}

impl BearerToken {
    pub(crate) fn apply(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        let token = self.token.read().expect("session token lock poisoned");
        if token.is_empty() {
            req
        } else {
            req.bearer_auth(token.as_str())
        }
    }
}
