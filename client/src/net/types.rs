//! Wire DTOs for the HashPost auth endpoints and the session identity records.
//!
//! DESIGN
//! ======
//! Field names mirror the backend's snake_case JSON so serde round-trips stay
//! lossless. The backend serializes empty collections as `null`, so list
//! fields accept both `null` and a missing key as "empty".
//!
//! NORMALIZATION
//! =============
//! Login and session responses carry the full pseudonym list plus the active
//! pseudonym id. Registration responses carry only the single pseudonym that
//! was created with the account; [`User::from`] synthesizes a one-element list
//! for that shape so the rest of the client sees a single `User` layout.

#[cfg(test)]
#[path = "types_test.rs"]
mod types_test;

use std::fmt;

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};

// =============================================================================
// IDENTITY RECORDS
// =============================================================================

/// A named identity a user can post under.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pseudonym {
    /// Opaque pseudonym identifier.
    pub pseudonym_id: String,
    /// Name shown on posts made under this pseudonym.
    pub display_name: String,
    /// Reputation score accumulated by this pseudonym.
    #[serde(default, deserialize_with = "deserialize_i64_from_number")]
    pub karma_score: i64,
    /// Creation timestamp (RFC 3339).
    pub created_at: String,
    /// Last activity timestamp (RFC 3339).
    pub last_active_at: String,
    /// Whether the pseudonym is usable.
    pub is_active: bool,
}

/// The authenticated session identity held by the auth store.
///
/// Tokens only ever live here, in memory. They are never part of the cached
/// projection written to local storage (see [`CachedUser`]).
#[derive(Clone, PartialEq, Eq)]
pub struct User {
    pub user_id: i64,
    pub email: String,
    pub created_at: String,
    pub last_active_at: String,
    pub is_active: bool,
    pub is_suspended: bool,
    pub roles: Vec<String>,
    pub capabilities: Vec<String>,
    /// Id of the pseudonym the user currently acts as.
    pub active_pseudonym_id: String,
    pub display_name: String,
    pub pseudonyms: Vec<Pseudonym>,
    pub access_token: String,
    pub refresh_token: String,
}

impl User {
    /// The pseudonym referenced by `active_pseudonym_id`, if it is listed.
    pub fn active_pseudonym(&self) -> Option<&Pseudonym> {
        self.pseudonyms
            .iter()
            .find(|p| p.pseudonym_id == self.active_pseudonym_id)
    }

    /// Whether this user record carries tokens from a login/signup response.
    ///
    /// Users rebuilt from `/auth/me` or the local cache have empty tokens; the
    /// backend still authenticates them through its HTTP-only cookies.
    pub fn is_authenticated_with_tokens(&self) -> bool {
        !self.access_token.is_empty()
    }
}

impl fmt::Debug for User {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("User")
            .field("user_id", &self.user_id)
            .field("email", &self.email)
            .field("created_at", &self.created_at)
            .field("last_active_at", &self.last_active_at)
            .field("is_active", &self.is_active)
            .field("is_suspended", &self.is_suspended)
            .field("roles", &self.roles)
            .field("capabilities", &self.capabilities)
            .field("active_pseudonym_id", &self.active_pseudonym_id)
            .field("display_name", &self.display_name)
            .field("pseudonyms", &self.pseudonyms)
            .field("access_token", &redacted(&self.access_token))
            .field("refresh_token", &redacted(&self.refresh_token))
            .finish()
    }
}

fn redacted(token: &str) -> &'static str {
    if token.is_empty() { "" } else { "<redacted>" }
}

/// Token-stripped projection of [`User`] persisted to local storage.
///
/// There are no token fields at all, so nothing sensitive can be serialized
/// through this type.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CachedUser {
    pub user_id: i64,
    pub email: String,
    pub created_at: String,
    pub last_active_at: String,
    pub is_active: bool,
    pub is_suspended: bool,
    #[serde(default, deserialize_with = "deserialize_null_as_empty")]
    pub roles: Vec<String>,
    #[serde(default, deserialize_with = "deserialize_null_as_empty")]
    pub capabilities: Vec<String>,
    pub active_pseudonym_id: String,
    pub display_name: String,
    #[serde(default, deserialize_with = "deserialize_null_as_empty")]
    pub pseudonyms: Vec<Pseudonym>,
}

impl CachedUser {
    /// Structural check applied before a cached record is trusted.
    ///
    /// `user_id` presence is already enforced by deserialization. The active
    /// pseudonym is not checked: login payloads are installed as-is, and the
    /// cache must accept whatever the store accepted.
    ///
    /// # Errors
    ///
    /// Returns a short reason when the email is blank.
    pub fn check_shape(&self) -> Result<(), &'static str> {
        if self.email.trim().is_empty() {
            return Err("cached user has no email");
        }
        Ok(())
    }

    /// Rebuild an in-memory user with empty tokens.
    pub fn into_user(self) -> User {
        User {
            user_id: self.user_id,
            email: self.email,
            created_at: self.created_at,
            last_active_at: self.last_active_at,
            is_active: self.is_active,
            is_suspended: self.is_suspended,
            roles: self.roles,
            capabilities: self.capabilities,
            active_pseudonym_id: self.active_pseudonym_id,
            display_name: self.display_name,
            pseudonyms: self.pseudonyms,
            access_token: String::new(),
            refresh_token: String::new(),
        }
    }
}

impl From<&User> for CachedUser {
    fn from(user: &User) -> Self {
        Self {
            user_id: user.user_id,
            email: user.email.clone(),
            created_at: user.created_at.clone(),
            last_active_at: user.last_active_at.clone(),
            is_active: user.is_active,
            is_suspended: user.is_suspended,
            roles: user.roles.clone(),
            capabilities: user.capabilities.clone(),
            active_pseudonym_id: user.active_pseudonym_id.clone(),
            display_name: user.display_name.clone(),
            pseudonyms: user.pseudonyms.clone(),
        }
    }
}

// =============================================================================
// REQUESTS
// =============================================================================

/// Body of `POST /auth/login`.
#[derive(Clone, PartialEq, Eq, Serialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Body of `POST /auth/register`.
#[derive(Clone, PartialEq, Eq, Serialize)]
pub struct RegistrationRequest {
    pub email: String,
    pub password: String,
    pub display_name: String,
}

impl fmt::Debug for LoginRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginRequest")
            .field("email", &self.email)
            .field("password", &redacted(&self.password))
            .finish()
    }
}

impl fmt::Debug for RegistrationRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegistrationRequest")
            .field("email", &self.email)
            .field("password", &redacted(&self.password))
            .field("display_name", &self.display_name)
            .finish()
    }
}

/// Body of `POST /auth/logout`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct LogoutRequest {
    pub refresh_token: String,
}

// =============================================================================
// RESPONSES
// =============================================================================

/// Response of `POST /auth/login`.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct LoginResponse {
    pub user_id: i64,
    pub email: String,
    pub created_at: String,
    pub last_active_at: String,
    pub is_active: bool,
    pub is_suspended: bool,
    #[serde(default, deserialize_with = "deserialize_null_as_empty")]
    pub roles: Vec<String>,
    #[serde(default, deserialize_with = "deserialize_null_as_empty")]
    pub capabilities: Vec<String>,
    #[serde(default)]
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: String,
    pub active_pseudonym_id: String,
    pub display_name: String,
    #[serde(default, deserialize_with = "deserialize_null_as_empty")]
    pub pseudonyms: Vec<Pseudonym>,
}

/// Response of `POST /auth/register`.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct RegistrationResponse {
    pub user_id: i64,
    pub email: String,
    pub created_at: String,
    pub last_active_at: String,
    pub is_active: bool,
    pub is_suspended: bool,
    #[serde(default, deserialize_with = "deserialize_null_as_empty")]
    pub roles: Vec<String>,
    #[serde(default, deserialize_with = "deserialize_null_as_empty")]
    pub capabilities: Vec<String>,
    pub pseudonym_id: String,
    pub display_name: String,
    #[serde(default, deserialize_with = "deserialize_i64_from_number")]
    pub karma_score: i64,
    #[serde(default)]
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: String,
    /// Access token lifetime in seconds.
    #[serde(default)]
    pub expires_in: u64,
}

/// Response of `GET /auth/me`. Tokens are never part of this payload.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct CurrentSessionResponse {
    pub user_id: i64,
    pub email: String,
    pub created_at: String,
    pub last_active_at: String,
    pub is_active: bool,
    pub is_suspended: bool,
    #[serde(default, deserialize_with = "deserialize_null_as_empty")]
    pub roles: Vec<String>,
    #[serde(default, deserialize_with = "deserialize_null_as_empty")]
    pub capabilities: Vec<String>,
    pub active_pseudonym_id: String,
    pub display_name: String,
    #[serde(default, deserialize_with = "deserialize_null_as_empty")]
    pub pseudonyms: Vec<Pseudonym>,
}

/// Response of `POST /auth/logout`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
pub struct LogoutResponse {
    #[serde(default)]
    pub message: String,
}

impl From<CurrentSessionResponse> for LoginResponse {
    /// Reshape a session check result as a login payload with empty tokens.
    fn from(session: CurrentSessionResponse) -> Self {
        Self {
            user_id: session.user_id,
            email: session.email,
            created_at: session.created_at,
            last_active_at: session.last_active_at,
            is_active: session.is_active,
            is_suspended: session.is_suspended,
            roles: session.roles,
            capabilities: session.capabilities,
            access_token: String::new(),
            refresh_token: String::new(),
            active_pseudonym_id: session.active_pseudonym_id,
            display_name: session.display_name,
            pseudonyms: session.pseudonyms,
        }
    }
}

// =============================================================================
// NORMALIZATION
// =============================================================================

/// Any backend response that establishes a session.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AuthPayload {
    /// Login-shaped: full pseudonym list plus the active id.
    Login(LoginResponse),
    /// Registration-shaped: a single freshly created pseudonym.
    Registration(RegistrationResponse),
}

impl From<LoginResponse> for AuthPayload {
    fn from(response: LoginResponse) -> Self {
        Self::Login(response)
    }
}

impl From<RegistrationResponse> for AuthPayload {
    fn from(response: RegistrationResponse) -> Self {
        Self::Registration(response)
    }
}

impl From<CurrentSessionResponse> for AuthPayload {
    fn from(response: CurrentSessionResponse) -> Self {
        Self::Login(response.into())
    }
}

impl From<AuthPayload> for User {
    fn from(payload: AuthPayload) -> Self {
        match payload {
            AuthPayload::Login(r) => Self {
                user_id: r.user_id,
                email: r.email,
                created_at: r.created_at,
                last_active_at: r.last_active_at,
                is_active: r.is_active,
                is_suspended: r.is_suspended,
                roles: r.roles,
                capabilities: r.capabilities,
                active_pseudonym_id: r.active_pseudonym_id,
                display_name: r.display_name,
                pseudonyms: r.pseudonyms,
                access_token: r.access_token,
                refresh_token: r.refresh_token,
            },
            AuthPayload::Registration(r) => {
                let pseudonym = Pseudonym {
                    pseudonym_id: r.pseudonym_id.clone(),
                    display_name: r.display_name.clone(),
                    karma_score: r.karma_score,
                    created_at: r.created_at.clone(),
                    last_active_at: r.last_active_at.clone(),
                    is_active: r.is_active,
                };
                Self {
                    user_id: r.user_id,
                    email: r.email,
                    created_at: r.created_at,
                    last_active_at: r.last_active_at,
                    is_active: r.is_active,
                    is_suspended: r.is_suspended,
                    roles: r.roles,
                    capabilities: r.capabilities,
                    active_pseudonym_id: r.pseudonym_id,
                    display_name: r.display_name,
                    pseudonyms: vec![pseudonym],
                    access_token: r.access_token,
                    refresh_token: r.refresh_token,
                }
            }
        }
    }
}

// =============================================================================
// SERDE HELPERS
// =============================================================================

fn deserialize_null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}

#[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation)]
fn deserialize_i64_from_number<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    match value {
        serde_json::Value::Null => Ok(0),
        serde_json::Value::Number(number) => {
            if let Some(int) = number.as_i64() {
                return Ok(int);
            }
            if let Some(float) = number.as_f64()
                && float.is_finite()
                && float.fract() == 0.0
                && float >= i64::MIN as f64
                && float <= i64::MAX as f64
            {
                return Ok(float as i64);
            }
            Err(D::Error::custom("expected integer-compatible number"))
        }
        _ => Err(D::Error::custom("expected number")),
    }
}
