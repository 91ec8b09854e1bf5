//! In-process stand-in for the blog API, bound to an ephemeral localhost port.
#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::routing::{get, post};
use axum::{Json, Router};
use parking_lot::Mutex;
use serde_json::{json, Value};

use blogdesk::session::SessionRecord;

pub const VALID_TOKEN: &str = "tok-123";

/// What `GET /me` answers with.
#[derive(Debug, Clone)]
pub enum MeMode {
    Role(&'static str),
    NoRole,
    ServerError,
    Hang,
}

#[derive(Clone)]
pub struct MockApi {
    pub me_calls: Arc<AtomicUsize>,
    pub me_mode: Arc<Mutex<MeMode>>,
    /// Authorization header seen by the last POST /login.
    pub login_auth: Arc<Mutex<Option<String>>>,
    /// Authorization header seen by the last POST /register.
    pub register_auth: Arc<Mutex<Option<String>>>,
}

impl MockApi {
    pub fn new(mode: MeMode) -> Self {
        Self {
            me_calls: Arc::new(AtomicUsize::new(0)),
            me_mode: Arc::new(Mutex::new(mode)),
            login_auth: Arc::new(Mutex::new(None)),
            register_auth: Arc::new(Mutex::new(None)),
        }
    }

    pub fn me_calls(&self) -> usize {
        self.me_calls.load(Ordering::SeqCst)
    }

    /// Serve the API and return its origin, e.g. `http://127.0.0.1:41234`.
    pub async fn start(&self) -> String {
        let api = Router::new()
            .route("/echo", get(echo))
            .route("/users/login-history", get(echo))
            .route("/login", post(login))
            .route("/register", post(register))
            .route("/me", get(me))
            .route("/expired", get(expired))
            .route("/boom", get(boom));
        let app = Router::new().nest("/api/v1", api).with_state(self.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.expect("bind 127.0.0.1:0");
        let addr = listener.local_addr().expect("local addr");
        tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, app).await {
                eprintln!("mock api error: {e:?}");
            }
        });
        format!("http://{}", addr)
    }
}

fn auth_of(headers: &HeaderMap) -> Option<String> {
    headers.get("authorization").and_then(|v| v.to_str().ok()).map(str::to_string)
}

async fn echo(headers: HeaderMap) -> Json<Value> {
    Json(json!({ "data": { "authorization": auth_of(&headers) } }))
}

async fn login(State(s): State<MockApi>, headers: HeaderMap, Json(body): Json<Value>) -> (StatusCode, Json<Value>) {
    *s.login_auth.lock() = auth_of(&headers);
    if body["identifier"] == "ayse" && body["password"] == "pw" {
        (
            StatusCode::OK,
            Json(json!({
                "data": { "token": VALID_TOKEN, "id": 7, "username": "ayse", "email": "ayse@example.com" },
                "message": "User login successfully!"
            })),
        )
    } else {
        (StatusCode::UNAUTHORIZED, Json(json!({ "error": "invalid password" })))
    }
}

async fn register(State(s): State<MockApi>, headers: HeaderMap, Json(body): Json<Value>) -> (StatusCode, Json<Value>) {
    *s.register_auth.lock() = auth_of(&headers);
    if body["username"].as_str().unwrap_or("").is_empty() {
        return (StatusCode::BAD_REQUEST, Json(json!({ "error": "invalid input" })));
    }
    (
        StatusCode::CREATED,
        Json(json!({ "data": { "username": body["username"], "role": "reader" }, "message": "User created successfully" })),
    )
}

async fn me(State(s): State<MockApi>, headers: HeaderMap) -> (StatusCode, Json<Value>) {
    s.me_calls.fetch_add(1, Ordering::SeqCst);
    let expected = format!("Bearer {}", VALID_TOKEN);
    if auth_of(&headers).as_deref() != Some(expected.as_str()) {
        return (StatusCode::UNAUTHORIZED, Json(json!({ "error": "Invalid token" })));
    }
    let mode = s.me_mode.lock().clone();
    match mode {
        MeMode::Role(role) => (
            StatusCode::OK,
            Json(json!({ "data": {
                "id": 7, "username": "ayse", "email": "ayse@example.com", "role": role, "followers": ["mehmet"]
            }})),
        ),
        MeMode::NoRole => (StatusCode::OK, Json(json!({ "data": { "id": 7, "username": "ayse", "email": "ayse@example.com" } }))),
        MeMode::ServerError => (StatusCode::INTERNAL_SERVER_ERROR, Json(json!({ "error": "db down" }))),
        MeMode::Hang => {
            tokio::time::sleep(Duration::from_secs(3)).await;
            (StatusCode::OK, Json(json!({ "data": { "role": "admin" } })))
        }
    }
}

async fn expired() -> (StatusCode, Json<Value>) {
    (StatusCode::UNAUTHORIZED, Json(json!({ "error": "Invalid or expired token" })))
}

async fn boom() -> (StatusCode, Json<Value>) {
    (StatusCode::INTERNAL_SERVER_ERROR, Json(json!({ "error": "db down" })))
}

pub fn session_with(token: &str, role: Option<&str>) -> SessionRecord {
    SessionRecord {
        token: Some(token.to_string()),
        username: Some("ayse".into()),
        email: Some("ayse@example.com".into()),
        id: Some("7".into()),
        role: role.map(str::to_string),
    }
}
