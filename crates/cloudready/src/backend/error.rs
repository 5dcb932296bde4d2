use axum::http::StatusCode;
use serde_json::Value;

/// Failure talking to the analysis backend.
#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    #[error("invalid backend url '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },
    #[error("backend responded with {status}")]
    Status { status: StatusCode, body: Value },
    #[error("backend unreachable: {0}")]
    Unreachable(#[source] reqwest::Error),
    #[error("unexpected backend payload: {0}")]
    Decode(#[from] serde_json::Error),
}

impl BackendError {
    /// Status the backend answered with, if it answered at all.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            BackendError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.status() == Some(StatusCode::NOT_FOUND)
    }

    /// A string field of the backend's error body, such as `detail`.
    pub fn body_field(&self, key: &str) -> Option<&str> {
        match self {
            BackendError::Status { body, .. } => body
                .get(key)
                .and_then(Value::as_str)
                .filter(|value| !value.is_empty()),
            _ => None,
        }
    }
}
