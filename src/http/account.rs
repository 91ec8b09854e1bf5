use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::error::{AppError, AppResult};
use crate::nav::RoleResolver;
use crate::session::SessionRecord;

use super::client::ApiClient;

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct LoginResponse {
    pub token: String,
    pub id: u64,
    pub username: String,
    pub email: String,
    #[serde(default)]
    pub role: Option<String>,
}

impl From<LoginResponse> for SessionRecord {
    fn from(r: LoginResponse) -> Self {
        SessionRecord {
            token: Some(r.token),
            username: Some(r.username),
            email: Some(r.email),
            id: Some(r.id.to_string()),
            role: r.role.filter(|s| !s.is_empty()),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    /// Asking for "admin" files a role request; the account starts as a reader.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct UserProfile {
    pub id: u64,
    pub username: String,
    pub email: String,
    #[serde(default)]
    pub role: String,
    #[serde(default)]
    pub followers: Vec<String>,
}

impl ApiClient {
    /// `POST /login`, then store the returned credential as the new session.
    pub async fn login(&self, identifier: &str, password: &str) -> AppResult<SessionRecord> {
        let resp = self
            .post("/login", &json!({ "identifier": identifier, "password": password }))
            .await?;
        let login: LoginResponse = resp.data()?;
        if login.token.is_empty() {
            return Err(AppError::Decode("login response carried an empty token".into()));
        }
        let record = SessionRecord::from(login);
        self.session().establish(record.clone())?;
        Ok(record)
    }

    /// `POST /register`; returns the server's message. Does not log in.
    pub async fn register(&self, req: &RegisterRequest) -> AppResult<String> {
        let resp = self.post("/register", req).await?;
        Ok(resp.message().unwrap_or("registered").to_string())
    }

    pub async fn me(&self) -> AppResult<UserProfile> {
        self.get("/me").await?.data()
    }

    /// Drop the local session. The API has no server-side logout.
    pub fn logout(&self) -> AppResult<()> {
        self.session().invalidate()
    }
}

#[async_trait]
impl RoleResolver for ApiClient {
    async fn fetch_role(&self) -> AppResult<String> {
        let resp = self.get("/me").await?;
        resp.body
            .pointer("/data/role")
            .and_then(|v| v.as_str())
            .filter(|r| !r.is_empty())
            .map(str::to_string)
            .ok_or_else(|| AppError::Decode("/me response has no data.role".into()))
    }
}
