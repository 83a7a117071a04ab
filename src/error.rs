//! Crate-level error types for backend calls and navigation.

/// Error returned when a call against the REST backend fails.
///
/// Every variant can produce a human-readable message via
/// [`user_message`](ApiError::user_message), which is what the stores hand
/// to the [`Notifier`](crate::Notifier) when an action fails.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The server answered with a non-success status.
    ///
    /// `message` carries the `message` field of the server's error body
    /// when one was present, otherwise the canonical reason phrase.
    #[error("server returned {status}: {message}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Server-provided explanation.
        message: String,
    },

    /// The request never produced a response (DNS, connect, timeout, ...).
    #[error("transport error: {0}")]
    Transport(String),

    /// The response body could not be decoded into the expected shape.
    #[error("invalid response body: {0}")]
    Decode(#[from] serde_json::Error),

    /// A request URL could not be built from the configured base URL.
    #[error("invalid request url: {0}")]
    Url(#[from] url::ParseError),
}

impl ApiError {
    /// The message to show to a user for this failure.
    ///
    /// For [`ApiError::Status`] this is exactly the server-provided text;
    /// for the other variants it is the `Display` form.
    pub fn user_message(&self) -> String {
        match self {
            Self::Status { message, .. } => message.clone(),
            other => other.to_string(),
        }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        match err.status() {
            Some(status) => Self::Status {
                status: status.as_u16(),
                message: status.canonical_reason().unwrap_or("unknown").to_string(),
            },
            None => Self::Transport(err.to_string()),
        }
    }
}

/// Error returned by a [`Navigator`](crate::Navigator) when a navigation
/// cannot be carried out.
#[derive(Debug, thiserror::Error)]
pub enum NavigationError {
    /// The target route is not an absolute path.
    #[error("invalid route '{0}': must start with '/'")]
    InvalidRoute(String),
}
