//! Client configuration loaded from `BLOGDESK_*` environment variables.

use std::path::PathBuf;
use std::time::Duration;

use reqwest::Url;

use crate::error::{AppError, AppResult};

/// Versioned path segment every API call is prefixed with.
pub const API_PREFIX: &str = "/api/v1";

pub const ENV_BASE_URL: &str = "BLOGDESK_API_BASE_URL";
pub const ENV_HTTP_TIMEOUT_MS: &str = "BLOGDESK_HTTP_TIMEOUT_MS";
pub const ENV_ROLE_TIMEOUT_MS: &str = "BLOGDESK_ROLE_TIMEOUT_MS";
pub const ENV_SESSION_FILE: &str = "BLOGDESK_SESSION_FILE";

const DEFAULT_BASE_URL: &str = "http://localhost:3000";
const DEFAULT_SESSION_FILE: &str = "blogdesk-session.json";

#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Server origin, e.g. `http://localhost:3000`.
    pub origin: Url,
    pub request_timeout: Duration,
    pub role_lookup_timeout: Duration,
    pub session_file: PathBuf,
}

impl ClientConfig {
    pub fn new(origin: &str) -> AppResult<Self> {
        Ok(Self {
            origin: parse_origin(origin)?,
            request_timeout: Duration::from_millis(10_000),
            role_lookup_timeout: Duration::from_millis(5_000),
            session_file: PathBuf::from(DEFAULT_SESSION_FILE),
        })
    }

    pub fn from_env() -> AppResult<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build from an arbitrary variable lookup; unset variables keep their defaults.
    pub fn from_lookup<F>(lookup: F) -> AppResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let origin = non_empty(lookup(ENV_BASE_URL)).unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        let mut cfg = Self::new(&origin)?;
        if let Some(ms) = parse_millis(ENV_HTTP_TIMEOUT_MS, lookup(ENV_HTTP_TIMEOUT_MS))? {
            cfg.request_timeout = ms;
        }
        if let Some(ms) = parse_millis(ENV_ROLE_TIMEOUT_MS, lookup(ENV_ROLE_TIMEOUT_MS))? {
            cfg.role_lookup_timeout = ms;
        }
        if let Some(p) = non_empty(lookup(ENV_SESSION_FILE)) {
            cfg.session_file = PathBuf::from(p);
        }
        Ok(cfg)
    }

    /// `<origin>/api/v1`, without a trailing slash.
    pub fn api_base(&self) -> String {
        format!("{}{}", self.origin.as_str().trim_end_matches('/'), API_PREFIX)
    }
}

fn non_empty(v: Option<String>) -> Option<String> {
    v.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}

fn parse_origin(raw: &str) -> AppResult<Url> {
    let url = Url::parse(raw.trim())
        .map_err(|e| AppError::Config(format!("{}='{}': {}", ENV_BASE_URL, raw, e)))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(AppError::Config(format!("{}: unsupported scheme '{}'", ENV_BASE_URL, other))),
    }
}

fn parse_millis(name: &str, raw: Option<String>) -> AppResult<Option<Duration>> {
    let Some(v) = non_empty(raw) else { return Ok(None); };
    match v.parse::<u64>() {
        Ok(0) => Err(AppError::Config(format!("{} must be greater than zero", name))),
        Ok(ms) => Ok(Some(Duration::from_millis(ms))),
        Err(_) => Err(AppError::Config(format!("{}='{}' is not a number of milliseconds", name, v))),
    }
}
