use std::sync::Arc;

use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::config::ClientConfig;
use crate::error::{AppError, AppResult};
use crate::nav::{Navigator, LOGIN_PATH};
use crate::session::SessionContext;

/// Paths never sent with a credential. Matched as substrings, so
/// `/users/login-history` is exempt too.
// TODO: switch to exact matching against the auth endpoints once nothing relies on the broad match.
pub const CREDENTIAL_EXEMPT_MARKERS: [&str; 2] = ["/register", "/login"];

pub fn should_attach_credential(path: &str) -> bool {
    !CREDENTIAL_EXEMPT_MARKERS.iter().any(|m| path.contains(m))
}

/// Successful (2xx) response with its JSON body. Empty bodies are `Null`.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    pub status: u16,
    pub body: Value,
}

impl ApiResponse {
    pub fn json<T: DeserializeOwned>(&self) -> AppResult<T> {
        serde_json::from_value(self.body.clone()).map_err(|e| AppError::Decode(e.to_string()))
    }

    /// Decode the `data` member of the `{data, message}` envelope.
    pub fn data<T: DeserializeOwned>(&self) -> AppResult<T> {
        let data = self
            .body
            .get("data")
            .cloned()
            .ok_or_else(|| AppError::Decode("response has no 'data' field".into()))?;
        serde_json::from_value(data).map_err(|e| AppError::Decode(e.to_string()))
    }

    pub fn message(&self) -> Option<&str> {
        self.body.get("message").and_then(|v| v.as_str())
    }
}

/// HTTP client for the blog API that carries the session's bearer token and
/// tears the session down when the server answers 401.
pub struct ApiClient {
    base: String,
    http: reqwest::Client,
    session: SessionContext,
    navigator: Arc<dyn Navigator>,
}

impl ApiClient {
    pub fn new(cfg: &ClientConfig, session: SessionContext, navigator: Arc<dyn Navigator>) -> AppResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(cfg.request_timeout)
            .build()
            .map_err(|e| AppError::Config(format!("http client: {}", e)))?;
        Ok(Self { base: cfg.api_base(), http, session, navigator })
    }

    pub fn base(&self) -> &str { &self.base }

    pub fn session(&self) -> &SessionContext { &self.session }

    fn url_for(&self, path: &str) -> String {
        format!("{}/{}", self.base, path.trim_start_matches('/'))
    }

    /// Send one request. Non-2xx responses come back as errors with the server's
    /// status and message; nothing is retried.
    pub async fn request(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
        headers: Option<HeaderMap>,
    ) -> AppResult<ApiResponse> {
        debug!(target: "blogdesk::http", "[REQ] {} {} {}", method, self.base, path);

        let mut headers = headers.unwrap_or_default();
        if should_attach_credential(path) {
            if let Some(token) = self.session.token() {
                let mut value = HeaderValue::from_str(&format!("Bearer {}", token))
                    .map_err(|_| AppError::Storage("stored token is not a valid header value".into()))?;
                value.set_sensitive(true);
                headers.insert(AUTHORIZATION, value);
            }
        }

        let mut req = self.http.request(method, self.url_for(path)).headers(headers);
        if let Some(b) = body {
            req = req.json(b);
        }
        let resp = req.send().await?;
        let status = resp.status();
        let bytes = resp.bytes().await?;
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes)
                .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
        };

        if status == StatusCode::UNAUTHORIZED {
            self.handle_unauthorized(path);
            return Err(AppError::from_status(status.as_u16(), body));
        }
        if !status.is_success() {
            debug!(target: "blogdesk::http", "[RES] {} {}", status, path);
            return Err(AppError::from_status(status.as_u16(), body));
        }
        Ok(ApiResponse { status: status.as_u16(), body })
    }

    fn handle_unauthorized(&self, path: &str) {
        warn!(target: "blogdesk::http", "401 from {}, clearing session", path);
        if let Err(e) = self.session.invalidate() {
            warn!(target: "blogdesk::http", "session store not cleared after 401: {}", e);
        }
        if self.navigator.current_path() != LOGIN_PATH {
            self.navigator.redirect(LOGIN_PATH);
        }
    }

    pub async fn get(&self, path: &str) -> AppResult<ApiResponse> {
        self.request(Method::GET, path, None, None).await
    }

    pub async fn delete(&self, path: &str) -> AppResult<ApiResponse> {
        self.request(Method::DELETE, path, None, None).await
    }

    pub async fn post<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> AppResult<ApiResponse> {
        let v = to_body(body)?;
        self.request(Method::POST, path, Some(&v), None).await
    }

    pub async fn put<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> AppResult<ApiResponse> {
        let v = to_body(body)?;
        self.request(Method::PUT, path, Some(&v), None).await
    }
}

fn to_body<B: Serialize + ?Sized>(body: &B) -> AppResult<Value> {
    serde_json::to_value(body).map_err(|e| AppError::Decode(format!("request body: {}", e)))
}
