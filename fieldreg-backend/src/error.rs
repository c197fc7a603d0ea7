//! Error types for backend calls

use thiserror::Error;

/// Result type for backend operations
pub type Result<T> = std::result::Result<T, BackendError>;

/// Errors a backend call can produce.
///
/// The registry reports failures as a JSON body optionally carrying a
/// `detail` string. Callers show that message when present and fall back to
/// their own generic wording otherwise.
#[derive(Debug, Error)]
pub enum BackendError {
    /// The server answered with a non-success status
    #[error("backend returned {status}{}", suffix(.detail))]
    Api { status: u16, detail: Option<String> },

    /// The request never produced a response
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The response body did not have the expected shape
    #[error("unexpected response from {endpoint}: {source}")]
    Decode {
        endpoint: String,
        source: serde_json::Error,
    },

    /// A request URL could not be built
    #[error("invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

fn suffix(detail: &Option<String>) -> String {
    detail
        .as_deref()
        .map(|d| format!(": {d}"))
        .unwrap_or_default()
}

/// Pull a human-readable message out of an error body.
///
/// Tries `detail`, then `message`. Non-string details (e.g. a list of
/// field errors) are ignored so the caller's generic message is used.
pub(crate) fn extract_detail(body: &str) -> Option<String> {
    let json = serde_json::from_str::<serde_json::Value>(body).ok()?;
    ["detail", "message"]
        .iter()
        .find_map(|key| json.get(key).and_then(|v| v.as_str()))
        .filter(|s| !s.trim().is_empty())
        .map(str::to_string)
}

impl BackendError {
    /// Create an API error from a status code and raw response body
    pub fn from_response(status: u16, body: &str) -> Self {
        Self::Api {
            status,
            detail: extract_detail(body),
        }
    }

    /// Create an API error carrying an explicit detail message
    pub fn api(status: u16, detail: impl Into<String>) -> Self {
        Self::Api {
            status,
            detail: Some(detail.into()),
        }
    }

    /// The server-provided message, if any
    pub fn detail(&self) -> Option<&str> {
        match self {
            Self::Api { detail, .. } => detail.as_deref(),
            _ => None,
        }
    }

    /// The server message, or `generic` when the server gave none
    pub fn message_or(&self, generic: &str) -> String {
        self.detail().unwrap_or(generic).to_string()
    }

    /// HTTP status, for errors that came back as a response
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Check if retrying the same request may succeed
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Api { status, .. } => *status == 429 || *status >= 500,
            Self::Transport(_) => true,
            Self::Decode { .. } | Self::InvalidUrl(_) => false,
        }
    }
}
