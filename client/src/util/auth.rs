//! Auth request helpers and the cached-user storage helpers.
//!
//! ERROR HANDLING
//! ==============
//! Everything here is best-effort. A failed session check reads as "not
//! logged in", a failed backend logout still lets local cleanup run, and a
//! corrupt cache entry is discarded. Failures are logged, never returned,
//! except through [`read_cached`] for callers that want the typed reason.

#[cfg(test)]
#[path = "auth_test.rs"]
mod auth_test;

use crate::net::api::AuthBackend;
use crate::net::types::{AuthPayload, CachedUser, LogoutRequest, User};
use crate::util::storage::{LocalStore, StorageError};

/// Storage key holding the token-stripped user projection.
pub const USER_STORAGE_KEY: &str = "hashpost_user";
/// Key written by earlier client versions; only ever removed.
pub const LEGACY_USER_STORAGE_KEY: &str = "user";

/// Why a cached entry could not be used.
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    #[error("cached user is not valid JSON for the expected schema: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("cached user failed shape check: {0}")]
    Invalid(&'static str),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

// =============================================================================
// REQUESTS
// =============================================================================

/// Ask the backend who is logged in, via its HTTP-only cookies.
///
/// Returns `None` on any failure; an unreachable backend and an anonymous
/// visitor look the same. Tokens are not readable this way and come back
/// empty.
pub async fn fetch_current_session<B: AuthBackend + ?Sized>(backend: &B) -> Option<User> {
    match backend.current_session().await {
        Ok(session) => {
            tracing::debug!(user_id = session.user_id, "session check succeeded");
            Some(User::from(AuthPayload::from(session)))
        }
        Err(e) => {
            tracing::debug!(error = %e, "session check failed or not authenticated");
            None
        }
    }
}

/// Tell the backend to end the session, then drop the legacy storage key.
///
/// The refresh token lives in an HTTP-only cookie, so the body carries an
/// empty one. A backend failure is logged and cleanup continues.
pub async fn logout<B, S>(backend: &B, storage: &S)
where
    B: AuthBackend + ?Sized,
    S: LocalStore + ?Sized,
{
    match backend.logout(&LogoutRequest::default()).await {
        Ok(()) => tracing::debug!("backend logout succeeded"),
        Err(e) => tracing::warn!(error = %e, "backend logout failed, continuing with local cleanup"),
    }
    if storage.is_available() {
        if let Err(e) = storage.remove_item(LEGACY_USER_STORAGE_KEY) {
            tracing::warn!(error = %e, "failed to remove legacy user entry");
        }
    }
}

// =============================================================================
// CACHE
// =============================================================================

/// Persist the token-stripped projection of `user`.
pub fn store_user<S: LocalStore + ?Sized>(storage: &S, user: &User) {
    if !storage.is_available() {
        return;
    }
    let raw = match serde_json::to_string(&CachedUser::from(user)) {
        Ok(raw) => raw,
        Err(e) => {
            tracing::error!(error = %e, "failed to serialize cached user");
            return;
        }
    };
    match storage.set_item(USER_STORAGE_KEY, &raw) {
        Ok(()) => tracing::debug!(user_id = user.user_id, "stored user in local cache"),
        Err(e) => tracing::error!(error = %e, "failed to write cached user"),
    }
}

/// Remove the cached projection, if any.
pub fn clear_user<S: LocalStore + ?Sized>(storage: &S) {
    if !storage.is_available() {
        return;
    }
    match storage.remove_item(USER_STORAGE_KEY) {
        Ok(()) => tracing::debug!("cleared user from local cache"),
        Err(e) => tracing::error!(error = %e, "failed to clear cached user"),
    }
}

/// Read and validate the cached projection.
///
/// `Ok(None)` means there is no entry (or no storage at all).
///
/// # Errors
///
/// Returns a [`CacheError`] when the entry cannot be read, does not match the
/// schema, or fails the shape check.
pub fn read_cached<S: LocalStore + ?Sized>(storage: &S) -> Result<Option<CachedUser>, CacheError> {
    if !storage.is_available() {
        return Ok(None);
    }
    let Some(raw) = storage.get_item(USER_STORAGE_KEY)? else {
        return Ok(None);
    };
    let cached: CachedUser = serde_json::from_str(&raw)?;
    cached.check_shape().map_err(CacheError::Invalid)?;
    Ok(Some(cached))
}

/// Cached user with empty tokens, or `None`.
///
/// Unreadable or invalid entries are removed so the next start begins clean.
pub fn read_user<S: LocalStore + ?Sized>(storage: &S) -> Option<User> {
    match read_cached(storage) {
        Ok(Some(cached)) => {
            tracing::debug!(user_id = cached.user_id, "retrieved user from local cache");
            Some(cached.into_user())
        }
        Ok(None) => None,
        Err(CacheError::Storage(e)) => {
            tracing::error!(error = %e, "failed to read cached user");
            None
        }
        Err(e) => {
            tracing::warn!(error = %e, "discarding cached user");
            clear_user(storage);
            None
        }
    }
}
