//! REST client seam and its HTTP adapter.
//!
//! Stores talk to the backend only through the object-safe [`ApiClient`]
//! trait, which moves untyped JSON over resource paths such as
//! `jobs/client?current=1`. [`fetch_page`] and [`fetch_one`] add the typed
//! decoding on top. [`HttpApiClient`] is the production implementation over
//! `reqwest`; tests substitute scripted in-memory clients.

use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, RwLock};

use serde::de::DeserializeOwned;
use serde_json::Value;
use url::Url;

use crate::auth::BearerToken;
use crate::error::ApiError;
use crate::model::Page;

/// Boxed future returned by [`ApiClient`] methods.
pub type ApiFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, ApiError>> + Send + 'a>>;

/// Generic REST collaborator used by every store.
///
/// Paths are relative to the backend's API root and may carry a query
/// string. Implementations return the decoded JSON body of a successful
/// response, or an [`ApiError`] whose [`user_message`](ApiError::user_message)
/// is fit for display.
pub trait ApiClient: Send + Sync {
    /// `GET path`.
    fn get<'a>(&'a self, path: &'a str) -> ApiFuture<'a, Value>;

    /// `POST path` with a JSON body.
    fn add<'a>(&'a self, path: &'a str, body: Value) -> ApiFuture<'a, Value>;

    /// `PATCH path` with a JSON body.
    fn update<'a>(&'a self, path: &'a str, body: Value) -> ApiFuture<'a, Value>;

    /// `DELETE path`.
    fn delete<'a>(&'a self, path: &'a str) -> ApiFuture<'a, Value>;
}

/// `GET` a listing and decode it as a [`Page`].
///
/// # Errors
///
/// Returns the client's [`ApiError`], or [`ApiError::Decode`] if the body is
/// not a `{ result, meta }` page of `T`.
pub async fn fetch_page<T: DeserializeOwned>(
    client: &dyn ApiClient,
    path: &str,
) -> Result<Page<T>, ApiError> {
    let body = client.get(path).await?;
    Ok(serde_json::from_value(body)?)
}

/// `GET` a single resource and decode it as `T`.
///
/// # Errors
///
/// Returns the client's [`ApiError`], or [`ApiError::Decode`] if the body
/// does not match `T`.
pub async fn fetch_one<T: DeserializeOwned>(
    client: &dyn ApiClient,
    path: &str,
) -> Result<T, ApiError> {
    let body = client.get(path).await?;
    Ok(serde_json::from_value(body)?)
}

/// Shared state behind an [`HttpApiClient`].
struct HttpInner {
    http: reqwest::Client,
    base_url: Url,
    bearer: BearerToken,
}

/// [`ApiClient`] over HTTP.
///
/// Requests are resolved against a base URL; a trailing slash is added to
/// the base when missing so that relative paths extend it instead of
/// replacing its last segment. Clone is cheap because the inner
/// `reqwest::Client` and settings are wrapped in an [`Arc`].
///
/// Timeouts, proxies and TLS settings belong to the `reqwest::Client`
/// passed to [`from_parts`](Self::from_parts).
///
/// # Examples
///
/// ```
/// use jobboard_stores::HttpApiClient;
///
/// let client = HttpApiClient::new("http://localhost:8000/api/v1").unwrap();
/// assert_eq!(
///     client.resolve("jobs/client?current=1").unwrap().as_str(),
///     "http://localhost:8000/api/v1/jobs/client?current=1"
/// );
/// ```
#[derive(Clone)]
pub struct HttpApiClient {
    inner: Arc<HttpInner>,
}

impl fmt::Debug for HttpApiClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpApiClient")
            .field("base_url", &self.inner.base_url.as_str())
            .finish()
    }
}

impl HttpApiClient {
    /// Create an unauthenticated client for the API rooted at `base_url`.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Url`] if `base_url` is not an absolute URL.
    pub fn new(base_url: &str) -> Result<Self, ApiError> {
        Self::from_parts(reqwest::Client::new(), base_url, Arc::default())
    }

    /// Create a client that sends `Authorization: Bearer <token>`.
    ///
    /// The token is read from the shared [`RwLock`] on every request. If
    /// the token string is empty, no header is sent.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Url`] if `base_url` is not an absolute URL.
    pub fn with_token(base_url: &str, token: Arc<RwLock<String>>) -> Result<Self, ApiError> {
        Self::from_parts(reqwest::Client::new(), base_url, token)
    }

    /// Create a client from a pre-configured `reqwest::Client`.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Url`] if `base_url` is not an absolute URL.
    pub fn from_parts(
        http: reqwest::Client,
        base_url: &str,
        token: Arc<RwLock<String>>,
    ) -> Result<Self, ApiError> {
        let mut base_url = Url::parse(base_url)?;
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }
        Ok(Self {
            inner: Arc::new(HttpInner {
                http,
                base_url,
                bearer: BearerToken { token },
            }),
        })
    }

    /// Resolve a resource path against the base URL.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Url`] if the joined URL is invalid.
    pub fn resolve(&self, path: &str) -> Result<Url, ApiError> {
        let path = path.trim_start_matches('/');
        Ok(self.inner.base_url.join(path)?)
    }

    async fn send(&self, req: reqwest::RequestBuilder) -> Result<Value, ApiError> {
        let response = self.inner.bearer.apply(req).send().await?;
        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            tracing::debug!(status = status.as_u16(), "backend rejected request");
            return Err(ApiError::Status {
                status: status.as_u16(),
                message: error_message(status, &text),
            });
        }

        if text.trim().is_empty() {
            return Ok(Value::Null);
        }
        let body: Value = serde_json::from_str(&text)?;
        Ok(unwrap_envelope(body))
    }

    async fn request(
        &self,
        method: reqwest::Method,
        path: &str,
        body: Option<Value>,
    ) -> Result<Value, ApiError> {
        let url = self.resolve(path)?;
        tracing::debug!(method = %method, url = %url, "backend request");
        let mut req = self.inner.http.request(method, url);
        if let Some(body) = body {
            req = req.json(&body);
        }
        self.send(req).await
    }
}

impl ApiClient for HttpApiClient {
    fn get<'a>(&'a self, path: &'a str) -> ApiFuture<'a, Value> {
        Box::pin(self.request(reqwest::Method::GET, path, None))
    }

    fn add<'a>(&'a self, path: &'a str, body: Value) -> ApiFuture<'a, Value> {
        Box::pin(self.request(reqwest::Method::POST, path, Some(body)))
    }

    fn update<'a>(&'a self, path: &'a str, body: Value) -> ApiFuture<'a, Value> {
        Box::pin(self.request(reqwest::Method::PATCH, path, Some(body)))
    }

    fn delete<'a>(&'a self, path: &'a str) -> ApiFuture<'a, Value> {
        Box::pin(self.request(reqwest::Method::DELETE, path, None))
    }
}

/// Strip the backend's response envelope.
///
/// Successful responses arrive as `{ "statusCode", "message", "data" }`;
/// the payload is `data`. Bodies without that envelope pass through.
pub(crate) fn unwrap_envelope(body: Value) -> Value {
    match body {
        Value::Object(mut map) if map.contains_key("statusCode") && map.contains_key("data") => {
            map.remove("data").unwrap_or(Value::Null)
        }
        other => other,
    }
}

/// Extract the human-readable message from an error response body.
///
/// The backend sends `message` either as a string or, for validation
/// failures, as a list of strings which are joined with `", "`. Falls back
/// to the status' reason phrase.
pub(crate) fn error_message(status: reqwest::StatusCode, body: &str) -> String {
    let fallback = || status.canonical_reason().unwrap_or("request failed").to_string();
    let Ok(value) = serde_json::from_str::<Value>(body) else {
        return fallback();
    };
    match value.get("message") {
        Some(Value::String(msg)) => msg.clone(),
        Some(Value::Array(items)) => {
            let parts: Vec<&str> = items.iter().filter_map(Value::as_str).collect();
            if parts.is_empty() {
                fallback()
            } else {
                parts.join(", ")
            }
        }
        _ => fallback(),
    }
}
