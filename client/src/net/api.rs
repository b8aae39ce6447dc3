//! REST API client wrapper for the HashPost backend.
//!
//! DESIGN
//! ======
//! One [`ApiConfig`] is built per process and shared by every API object
//! produced through [`ApiClient::api`]. All objects share a single
//! `reqwest::Client`, so the cookie jar that carries the backend's HTTP-only
//! session cookies is common to every call.
//!
//! ERROR HANDLING
//! ==============
//! No retries and no error translation: transport failures and non-2xx
//! statuses are handed back to the caller as [`ApiError`] with the original
//! error or status/body attached. Deciding what a failure means is left to
//! the auth utilities and the dialog layer.

#[cfg(test)]
#[path = "api_test.rs"]
mod api_test;

use std::sync::Arc;
use std::time::Duration;

use reqwest::cookie::Jar;
use reqwest::header::{CONTENT_TYPE, COOKIE, HeaderMap, HeaderValue};
use serde::Serialize;
use serde::de::DeserializeOwned;

use super::types::{
    CurrentSessionResponse, LoginRequest, LoginResponse, LogoutRequest, LogoutResponse, RegistrationRequest,
    RegistrationResponse,
};

pub const DEFAULT_API_URL: &str = "http://localhost:8888";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;

// =============================================================================
// ERROR
// =============================================================================

/// Errors produced by API object calls.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The HTTP request could not be sent or its body could not be read.
    #[error("http request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The backend answered with a non-success status.
    #[error("server returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    /// The response body did not match the expected schema.
    #[error("response decode failed: {0}")]
    Decode(#[from] serde_json::Error),

    /// A configured header value is not valid HTTP.
    #[error("invalid header value: {0}")]
    InvalidHeader(#[from] reqwest::header::InvalidHeaderValue),

    /// The configured base URL cannot seed the cookie jar.
    #[error("invalid base URL: {0}")]
    InvalidBaseUrl(String),

    /// The underlying HTTP client could not be constructed.
    #[error("HTTP client build failed: {0}")]
    HttpClientBuild(String),
}

impl ApiError {
    /// HTTP status for backend rejections, `None` for transport failures.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

// =============================================================================
// CONFIG
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ApiTimeouts {
    pub request_secs: u64,
    pub connect_secs: u64,
}

impl Default for ApiTimeouts {
    fn default() -> Self {
        Self { request_secs: DEFAULT_REQUEST_TIMEOUT_SECS, connect_secs: DEFAULT_CONNECT_TIMEOUT_SECS }
    }
}

/// Process-wide API configuration shared by every API object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiConfig {
    /// Backend origin without a trailing slash.
    pub base_url: String,
    /// Keep and resend cookies set by the backend.
    pub include_credentials: bool,
    /// Headers attached to every request.
    pub headers: HeaderMap,
    /// Pre-existing access token sent as the `access_token` cookie.
    pub session_cookie: Option<String>,
    pub timeouts: ApiTimeouts,
}

impl ApiConfig {
    /// Configuration for `base_url` with the default credential and header policy.
    pub fn new(base_url: &str) -> Self {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        Self {
            base_url: base_url.trim_end_matches('/').to_owned(),
            include_credentials: true,
            headers,
            session_cookie: None,
            timeouts: ApiTimeouts::default(),
        }
    }

    /// Build configuration from process environment variables.
    ///
    /// - `HASHPOST_API_URL` (falls back to `NEXT_PUBLIC_API_URL`, then
    ///   `http://localhost:8888`)
    /// - `HASHPOST_ACCESS_TOKEN`: optional session cookie value
    /// - `HASHPOST_REQUEST_TIMEOUT_SECS`: default 30
    /// - `HASHPOST_CONNECT_TIMEOUT_SECS`: default 10
    pub fn from_env() -> Self {
        Self::from_vars(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable lookup.
    pub fn from_vars<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let base_url = non_empty("HASHPOST_API_URL")
            .or_else(|| non_empty("NEXT_PUBLIC_API_URL"))
            .unwrap_or_else(|| DEFAULT_API_URL.to_owned());
        let mut config = Self::new(base_url.trim());
        config.session_cookie = non_empty("HASHPOST_ACCESS_TOKEN");
        config.timeouts = ApiTimeouts {
            request_secs: parse_u64(lookup("HASHPOST_REQUEST_TIMEOUT_SECS"), DEFAULT_REQUEST_TIMEOUT_SECS),
            connect_secs: parse_u64(lookup("HASHPOST_CONNECT_TIMEOUT_SECS"), DEFAULT_CONNECT_TIMEOUT_SECS),
        };
        config
    }

    /// Absolute URL for an API path such as `/auth/me`.
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

fn parse_u64(raw: Option<String>, default: u64) -> u64 {
    raw.and_then(|v| v.trim().parse::<u64>().ok()).unwrap_or(default)
}

// =============================================================================
// CLIENT
// =============================================================================

/// Shared configuration plus the HTTP client built from it.
#[derive(Debug, Clone)]
pub struct ApiClient {
    config: Arc<ApiConfig>,
    http: reqwest::Client,
}

/// An API object that can be produced from the shared client.
pub trait ApiResource {
    fn from_client(client: ApiClient) -> Self;
}

impl ApiClient {
    /// Build the shared HTTP client for `config`.
    ///
    /// # Errors
    ///
    /// Returns an error if the session cookie is not a valid header value, the
    /// base URL cannot be parsed, or the HTTP client cannot be constructed.
    pub fn new(config: ApiConfig) -> Result<Self, ApiError> {
        let mut headers = config.headers.clone();
        let mut builder = reqwest::Client::builder();
        if config.include_credentials {
            // Preset token lives in the jar; Set-Cookie responses replace or expire it.
            let jar = Jar::default();
            if let Some(token) = &config.session_cookie {
                let cookie = session_cookie_value(token)?;
                let url = reqwest::Url::parse(&config.base_url)
                    .map_err(|e| ApiError::InvalidBaseUrl(format!("{}: {e}", config.base_url)))?;
                jar.add_cookie_str(&format!("{cookie}; Path=/"), &url);
            }
            builder = builder.cookie_provider(Arc::new(jar));
        } else if let Some(token) = &config.session_cookie {
            headers.insert(COOKIE, HeaderValue::from_str(&session_cookie_value(token)?)?);
        }
        let http = builder
            .default_headers(headers)
            .timeout(Duration::from_secs(config.timeouts.request_secs))
            .connect_timeout(Duration::from_secs(config.timeouts.connect_secs))
            .build()
            .map_err(|e| ApiError::HttpClientBuild(e.to_string()))?;
        Ok(Self { config: Arc::new(config), http })
    }

    pub fn config(&self) -> &ApiConfig {
        &self.config
    }

    /// Produce a configured API object, e.g. `client.api::<AuthenticationApi>()`.
    pub fn api<T: ApiResource>(&self) -> T {
        T::from_client(self.clone())
    }

    async fn send<B: Serialize + ?Sized>(
        &self,
        method: reqwest::Method,
        path: &str,
        body: Option<&B>,
    ) -> Result<(u16, String), ApiError> {
        let request = self.http.request(method, self.config.url(path));
        let request = if let Some(body) = body { request.json(body) } else { request };
        let response = request.send().await?;
        let status = response.status().as_u16();
        let text = response.text().await?;
        Ok((status, text))
    }

    async fn request_json<B, R>(&self, method: reqwest::Method, path: &str, body: Option<&B>) -> Result<R, ApiError>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let (status, text) = self.send(method, path, body).await?;
        decode_response(status, &text)
    }
}

/// `access_token=<token>`, rejected up front when it is not a valid header value.
fn session_cookie_value(token: &str) -> Result<String, ApiError> {
    let cookie = format!("access_token={token}");
    HeaderValue::from_str(&cookie)?;
    Ok(cookie)
}

/// Map a raw status/body pair to a typed result.
fn decode_response<R: DeserializeOwned>(status: u16, body: &str) -> Result<R, ApiError> {
    if !(200..300).contains(&status) {
        return Err(ApiError::Status { status, body: body.to_owned() });
    }
    Ok(serde_json::from_str(body)?)
}

// =============================================================================
// AUTH BACKEND SEAM
// =============================================================================

/// Backend operations the session layer depends on.
///
/// [`AuthenticationApi`] is the production implementation; tests substitute
/// an in-memory mock.
#[async_trait::async_trait]
pub trait AuthBackend: Send + Sync {
    /// `POST /auth/login`.
    ///
    /// # Errors
    ///
    /// Returns an [`ApiError`] on transport failure or rejection.
    async fn login(&self, request: &LoginRequest) -> Result<LoginResponse, ApiError>;

    /// `POST /auth/register`.
    ///
    /// # Errors
    ///
    /// Returns an [`ApiError`] on transport failure or rejection.
    async fn register(&self, request: &RegistrationRequest) -> Result<RegistrationResponse, ApiError>;

    /// `GET /auth/me`.
    ///
    /// # Errors
    ///
    /// Returns an [`ApiError`] when not authenticated or unreachable.
    async fn current_session(&self) -> Result<CurrentSessionResponse, ApiError>;

    /// `POST /auth/logout`.
    ///
    /// # Errors
    ///
    /// Returns an [`ApiError`] on transport failure or rejection.
    async fn logout(&self, request: &LogoutRequest) -> Result<(), ApiError>;
}

// =============================================================================
// API OBJECTS
// =============================================================================

/// Typed client for the `/auth/*` endpoints.
#[derive(Debug, Clone)]
pub struct AuthenticationApi {
    client: ApiClient,
}

impl ApiResource for AuthenticationApi {
    fn from_client(client: ApiClient) -> Self {
        Self { client }
    }
}

impl AuthenticationApi {
    /// Authenticate with email and password.
    ///
    /// # Errors
    ///
    /// Returns an [`ApiError`] on transport failure, rejection, or an
    /// unexpected response body.
    pub async fn login_user(&self, request: &LoginRequest) -> Result<LoginResponse, ApiError> {
        self.client
            .request_json(reqwest::Method::POST, "/auth/login", Some(request))
            .await
    }

    /// Create an account and its first pseudonym.
    ///
    /// # Errors
    ///
    /// Returns an [`ApiError`] on transport failure, rejection, or an
    /// unexpected response body.
    pub async fn register_user(&self, request: &RegistrationRequest) -> Result<RegistrationResponse, ApiError> {
        self.client
            .request_json(reqwest::Method::POST, "/auth/register", Some(request))
            .await
    }

    /// Ask the backend who the current cookie session belongs to.
    ///
    /// # Errors
    ///
    /// Returns an [`ApiError`] when there is no session or the call fails.
    pub async fn get_current_user_session(&self) -> Result<CurrentSessionResponse, ApiError> {
        self.client
            .request_json::<(), _>(reqwest::Method::GET, "/auth/me", None)
            .await
    }

    /// End the session; the backend answers by expiring its cookies.
    ///
    /// # Errors
    ///
    /// Returns an [`ApiError`] on transport failure or a non-2xx status.
    pub async fn logout_user(&self, request: &LogoutRequest) -> Result<LogoutResponse, ApiError> {
        let (status, text) = self
            .client
            .send(reqwest::Method::POST, "/auth/logout", Some(request))
            .await?;
        if text.trim().is_empty() && (200..300).contains(&status) {
            return Ok(LogoutResponse::default());
        }
        decode_response(status, &text)
    }
}

#[async_trait::async_trait]
impl AuthBackend for AuthenticationApi {
    async fn login(&self, request: &LoginRequest) -> Result<LoginResponse, ApiError> {
        self.login_user(request).await
    }

    async fn register(&self, request: &RegistrationRequest) -> Result<RegistrationResponse, ApiError> {
        self.register_user(request).await
    }

    async fn current_session(&self) -> Result<CurrentSessionResponse, ApiError> {
        self.get_current_user_session().await
    }

    async fn logout(&self, request: &LogoutRequest) -> Result<(), ApiError> {
        self.logout_user(request).await.map(|_| ())
    }
}

/// Client for the backend's published OpenAPI document.
#[derive(Debug, Clone)]
pub struct SchemaApi {
    client: ApiClient,
}

impl ApiResource for SchemaApi {
    fn from_client(client: ApiClient) -> Self {
        Self { client }
    }
}

impl SchemaApi {
    /// Fetch `GET /openapi.json` as raw JSON.
    ///
    /// # Errors
    ///
    /// Returns an [`ApiError`] when the document cannot be fetched or parsed.
    pub async fn fetch_openapi(&self) -> Result<serde_json::Value, ApiError> {
        self.client
            .request_json::<(), _>(reqwest::Method::GET, "/openapi.json", None)
            .await
    }
}

/// Number of documented paths in an OpenAPI document.
pub fn openapi_path_count(schema: &serde_json::Value) -> usize {
    schema
        .get("paths")
        .and_then(serde_json::Value::as_object)
        .map_or(0, serde_json::Map::len)
}
