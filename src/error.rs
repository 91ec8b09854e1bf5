//! Unified error model for the API client, router and session stores.
//! HTTP failures keep the server's status and `{"error": ...}` message so callers
//! can render them without re-parsing the body.

use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("unauthorized: {message}")]
    Unauthorized { message: String },
    #[error("forbidden: {message}")]
    Forbidden { message: String },
    #[error("HTTP {status}: {message}")]
    Status { status: u16, message: String, body: Value },
    #[error("transport error: {0}")]
    Transport(#[source] reqwest::Error),
    #[error("request timed out: {0}")]
    Timeout(String),
    #[error("unexpected response: {0}")]
    Decode(String),
    #[error("invalid configuration: {0}")]
    Config(String),
    #[error("session store: {0}")]
    Storage(String),
    #[error("too many redirects while resolving {0}")]
    RedirectLoop(String),
}

impl AppError {
    /// Build the error for a non-success response. The message is taken from the
    /// server's `error` field, falling back to the canonical reason phrase.
    pub fn from_status(status: u16, body: Value) -> Self {
        let message = body
            .get("error")
            .and_then(|v| v.as_str())
            .map(str::to_string)
            .or_else(|| {
                reqwest::StatusCode::from_u16(status)
                    .ok()
                    .and_then(|s| s.canonical_reason())
                    .map(str::to_string)
            })
            .unwrap_or_else(|| format!("status {}", status));
        match status {
            401 => AppError::Unauthorized { message },
            403 => AppError::Forbidden { message },
            _ => AppError::Status { status, message, body },
        }
    }

    pub fn code_str(&self) -> &'static str {
        match self {
            AppError::Unauthorized { .. } => "unauthorized",
            AppError::Forbidden { .. } => "forbidden",
            AppError::Status { .. } => "http_status",
            AppError::Transport(_) => "transport",
            AppError::Timeout(_) => "timeout",
            AppError::Decode(_) => "decode",
            AppError::Config(_) => "config",
            AppError::Storage(_) => "storage",
            AppError::RedirectLoop(_) => "redirect_loop",
        }
    }

    /// HTTP status this error corresponds to, if it came from the remote API.
    pub fn http_status(&self) -> Option<u16> {
        match self {
            AppError::Unauthorized { .. } => Some(401),
            AppError::Forbidden { .. } => Some(403),
            AppError::Status { status, .. } => Some(*status),
            AppError::Transport(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        matches!(self, AppError::Unauthorized { .. })
    }
}

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            AppError::Timeout(err.to_string())
        } else if err.is_decode() {
            AppError::Decode(err.to_string())
        } else {
            AppError::Transport(err)
        }
    }
}

pub type AppResult<T> = Result<T, AppError>;
