//! Shared fixtures for unit tests: sample payloads, an in-memory auth backend,
//! and an in-process HTTP backend served by axum.

use std::sync::Mutex;

use axum::Json;
use axum::http::header::{COOKIE, SET_COOKIE};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use serde_json::{Value, json};

use crate::net::api::{ApiError, AuthBackend};
use crate::net::types::{
    CurrentSessionResponse, LoginRequest, LoginResponse, LogoutRequest, RegistrationRequest, RegistrationResponse,
};

// =============================================================================
// PAYLOADS
// =============================================================================

pub fn login_json() -> Value {
    json!({
        "user_id": 1,
        "email": "a@b.com",
        "created_at": "2024-01-01T12:00:00Z",
        "last_active_at": "2024-01-01T18:00:00Z",
        "is_active": true,
        "is_suspended": false,
        "roles": ["user"],
        "capabilities": ["create_content", "vote"],
        "access_token": "access-1",
        "refresh_token": "refresh-1",
        "active_pseudonym_id": "p1",
        "display_name": "Ada",
        "pseudonyms": [{
            "pseudonym_id": "p1",
            "display_name": "Ada",
            "karma_score": 12,
            "created_at": "2024-01-01T12:00:00Z",
            "last_active_at": "2024-01-01T18:00:00Z",
            "is_active": true
        }]
    })
}

pub fn registration_json() -> Value {
    json!({
        "user_id": 2,
        "email": "new@b.com",
        "created_at": "2024-02-01T09:00:00Z",
        "last_active_at": "2024-02-01T09:00:00Z",
        "is_active": true,
        "is_suspended": false,
        "roles": ["user"],
        "capabilities": ["create_content"],
        "pseudonym_id": "p-new",
        "display_name": "Newbie",
        "karma_score": 3,
        "access_token": "access-2",
        "refresh_token": "refresh-2",
        "expires_in": 3600
    })
}

pub fn session_json() -> Value {
    let mut json = login_json();
    if let Some(map) = json.as_object_mut() {
        map.remove("access_token");
        map.remove("refresh_token");
    }
    json
}

pub fn login_response() -> LoginResponse {
    serde_json::from_value(login_json()).unwrap()
}

pub fn registration_response() -> RegistrationResponse {
    serde_json::from_value(registration_json()).unwrap()
}

pub fn session_response() -> CurrentSessionResponse {
    serde_json::from_value(session_json()).unwrap()
}

fn unauthorized() -> ApiError {
    ApiError::Status { status: 401, body: "unauthorized".to_owned() }
}

// =============================================================================
// MOCK BACKEND
// =============================================================================

/// In-memory [`AuthBackend`] with scripted answers and a call log.
#[derive(Default)]
pub struct MockBackend {
    pub session: Option<CurrentSessionResponse>,
    pub login: Option<LoginResponse>,
    pub register: Option<RegistrationResponse>,
    pub fail_logout: bool,
    pub calls: Mutex<Vec<String>>,
}

impl MockBackend {
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn with_session(session: CurrentSessionResponse) -> Self {
        Self { session: Some(session), ..Self::default() }
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: impl Into<String>) {
        self.calls.lock().unwrap().push(call.into());
    }
}

#[async_trait::async_trait]
impl AuthBackend for MockBackend {
    async fn login(&self, request: &LoginRequest) -> Result<LoginResponse, ApiError> {
        self.record(format!("login:{}", request.email));
        self.login.clone().ok_or_else(unauthorized)
    }

    async fn register(&self, request: &RegistrationRequest) -> Result<RegistrationResponse, ApiError> {
        self.record(format!("register:{}", request.email));
        self.register
            .clone()
            .ok_or_else(|| ApiError::Status { status: 409, body: "email taken".to_owned() })
    }

    async fn current_session(&self) -> Result<CurrentSessionResponse, ApiError> {
        self.record("me");
        self.session.clone().ok_or_else(unauthorized)
    }

    async fn logout(&self, request: &LogoutRequest) -> Result<(), ApiError> {
        self.record(format!("logout:{}", request.refresh_token));
        if self.fail_logout {
            return Err(ApiError::Status { status: 503, body: "unavailable".to_owned() });
        }
        Ok(())
    }
}

// =============================================================================
// HTTP BACKEND
// =============================================================================

/// Serve a cookie-authenticated fake of the auth endpoints on an ephemeral
/// port and return its base URL.
///
/// Accepts password `"x"` for any email, registers any request, and treats
/// the `access_token=access-1` cookie as the only valid session.
pub async fn spawn_http_backend() -> String {
    let router = axum::Router::new()
        .route("/auth/login", post(http_login))
        .route("/auth/register", post(http_register))
        .route("/auth/me", get(http_me))
        .route("/auth/logout", post(http_logout))
        .route("/openapi.json", get(http_openapi));
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{addr}")
}

async fn http_login(Json(body): Json<Value>) -> Response {
    if body["password"] != "x" {
        return (StatusCode::UNAUTHORIZED, Json(json!({ "detail": "invalid credentials" }))).into_response();
    }
    let mut payload = login_json();
    payload["email"] = body["email"].clone();
    (
        [(SET_COOKIE, "access_token=access-1; Path=/; HttpOnly")],
        Json(payload),
    )
        .into_response()
}

async fn http_register(Json(body): Json<Value>) -> Response {
    let mut payload = registration_json();
    payload["email"] = body["email"].clone();
    payload["display_name"] = body["display_name"].clone();
    (
        [(SET_COOKIE, "access_token=access-1; Path=/; HttpOnly")],
        Json(payload),
    )
        .into_response()
}

async fn http_me(headers: HeaderMap) -> Response {
    let authenticated = headers
        .get(COOKIE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|cookies| cookies.split(';').any(|c| c.trim() == "access_token=access-1"));
    if !authenticated {
        return (StatusCode::UNAUTHORIZED, Json(json!({ "detail": "not authenticated" }))).into_response();
    }
    Json(session_json()).into_response()
}

async fn http_logout(Json(body): Json<Value>) -> Response {
    if body["refresh_token"] != "" {
        return (StatusCode::BAD_REQUEST, Json(json!({ "detail": "unexpected token" }))).into_response();
    }
    (
        [(SET_COOKIE, "access_token=; Path=/; Max-Age=0; HttpOnly")],
        Json(json!({ "message": "Logout successful. Cookies have been cleared." })),
    )
        .into_response()
}

async fn http_openapi() -> Json<Value> {
    Json(json!({
        "openapi": "3.1.0",
        "paths": {
            "/auth/login": {},
            "/auth/register": {},
            "/auth/me": {},
            "/auth/logout": {}
        }
    }))
}
