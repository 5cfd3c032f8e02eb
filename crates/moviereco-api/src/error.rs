//! `ApiError` - failures surfaced by client operations.

use serde_json::Value;

/// Message used when an error response carries no usable `detail`.
pub const GENERIC_ERROR_MESSAGE: &str = "An error occurred";

/// Error returned by every `MovieClient` and `TmdbClient` operation.
#[derive(Debug, thiserror::Error)]
#[allow(clippy::module_name_repetitions)]
pub enum ApiError {
    /// The connectivity probe reported no network; nothing was sent.
    #[error("No internet connection")]
    Offline,

    /// The server answered with a non-success status.
    #[error("{message}")]
    Http {
        /// HTTP status code.
        status: u16,
        /// `detail` from the error body, or the generic fallback.
        message: String,
        /// Parsed error body, `None` when it was not JSON.
        data: Option<Value>,
    },

    /// The request never produced a response.
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// A response body was not the JSON we expected.
    #[error("failed to decode JSON response: {0}")]
    Decode(#[from] serde_json::Error),

    /// A response was missing something the caller depends on.
    #[error("{0}")]
    Shape(String),

    /// The operation needs a stored session token.
    #[error("No auth token found")]
    NotAuthenticated,

    /// Refreshing the session token failed; stored credentials were cleared.
    #[error("session expired: {0}")]
    SessionExpired(#[source] Box<ApiError>),

    /// Loading the user profile failed for any reason.
    #[error("Failed to load user profile")]
    ProfileLoad(#[source] Box<ApiError>),

    /// Discovery was requested but no TMDB token was configured.
    #[error("TMDB API token is not configured")]
    TmdbNotConfigured,

    /// A queued unit was dropped before reporting its result.
    #[error("queued request was dropped before completing")]
    QueueClosed,

    /// The session store could not be read or written.
    #[error(transparent)]
    Storage(#[from] anyhow::Error),
}

impl ApiError {
    /// Builds an `Http` error from a status and the raw error body.
    ///
    /// The message is the body's `detail` field when present, otherwise
    /// [`GENERIC_ERROR_MESSAGE`].
    #[must_use]
    pub fn from_error_body(status: u16, body: &str) -> Self {
        let data = serde_json::from_str::<Value>(body).ok();
        let message = data
            .as_ref()
            .and_then(|v| v.get("detail"))
            .and_then(|detail| match detail {
                Value::Null => None,
                Value::String(s) if s.is_empty() => None,
                Value::String(s) => Some(s.clone()),
                other => Some(other.to_string()),
            })
            .unwrap_or_else(|| String::from(GENERIC_ERROR_MESSAGE));
        Self::Http {
            status,
            message,
            data,
        }
    }

    /// Returns the HTTP status for `Http` errors.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Http { status, .. } => Some(*status),
            _ => None,
        }
    }
}
