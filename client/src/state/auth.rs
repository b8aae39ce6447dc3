//! Auth store: the single in-memory session slot.
//!
//! SYSTEM CONTEXT
//! ==============
//! The store is owned by whatever drives the presentation layer and is handed
//! to the dialog and components by `&mut`. It settles the start-up phase once
//! through [`AuthStore::rehydrate`], then changes only on login and logout.
//! The token-stripped cache written beside it is a fallback for an
//! unreachable backend, never the authority.

#[cfg(test)]
#[path = "auth_test.rs"]
mod auth_test;

use crate::net::api::AuthBackend;
use crate::net::types::{AuthPayload, User};
use crate::util::auth::{clear_user, fetch_current_session, read_user, store_user};
use crate::util::storage::LocalStore;

/// Authentication state tracking the current user and loading status.
///
/// Starts out loading; the first [`AuthStore::rehydrate`] settles it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AuthState {
    pub user: Option<User>,
    pub loading: bool,
}

impl Default for AuthState {
    fn default() -> Self {
        Self { user: None, loading: true }
    }
}

/// Logical phase derived from [`AuthState`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AuthPhase {
    /// Start-up session check has not finished.
    Unknown,
    Anonymous,
    Authenticated,
}

impl AuthState {
    pub fn phase(&self) -> AuthPhase {
        match (&self.user, self.loading) {
            (_, true) => AuthPhase::Unknown,
            (None, false) => AuthPhase::Anonymous,
            (Some(_), false) => AuthPhase::Authenticated,
        }
    }
}

/// Single-owner session manager.
///
/// Holds the one in-memory user slot and writes its token-stripped projection
/// to `storage`. All mutation goes through `&mut self`, so one store can never
/// run two logins or a login and a logout at the same time.
pub struct AuthStore<B, S> {
    state: AuthState,
    backend: B,
    storage: S,
    rehydrated: bool,
}

impl<B: AuthBackend, S: LocalStore> AuthStore<B, S> {
    pub fn new(backend: B, storage: S) -> Self {
        Self { state: AuthState::default(), backend, storage, rehydrated: false }
    }

    pub fn state(&self) -> &AuthState {
        &self.state
    }

    pub fn user(&self) -> Option<&User> {
        self.state.user.as_ref()
    }

    pub fn is_loading(&self) -> bool {
        self.state.loading
    }

    pub fn is_authenticated(&self) -> bool {
        self.state.user.is_some()
    }

    pub fn phase(&self) -> AuthPhase {
        self.state.phase()
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// One-time start-up session check.
    ///
    /// A live backend session wins and refreshes the cache. Without one the
    /// cached projection is used as-is (tokens empty). Only the first call
    /// does any work; later calls report the current phase.
    pub async fn rehydrate(&mut self) -> AuthPhase {
        if self.rehydrated {
            return self.phase();
        }
        self.rehydrated = true;

        if let Some(user) = fetch_current_session(&self.backend).await {
            tracing::info!(user_id = user.user_id, "session rehydrated from backend");
            self.set_user(user);
        } else if let Some(user) = read_user(&self.storage) {
            tracing::info!(user_id = user.user_id, "session check failed, using cached user");
            self.state.user = Some(user);
        } else {
            tracing::debug!("no session and no cached user");
            self.state.user = None;
        }
        self.state.loading = false;
        self.phase()
    }

    /// Install the identity from a login or signup response.
    ///
    /// Replaces any current user wholesale; the response is trusted as-is.
    pub fn login(&mut self, payload: impl Into<AuthPayload>) {
        let user = User::from(payload.into());
        tracing::info!(
            user_id = user.user_id,
            pseudonyms = user.pseudonyms.len(),
            "user logged in"
        );
        self.set_user(user);
        self.state.loading = false;
    }

    /// End the session. Local state is cleared even if the backend call fails.
    pub async fn logout(&mut self) {
        crate::util::auth::logout(&self.backend, &self.storage).await;
        self.state.user = None;
        self.state.loading = false;
        clear_user(&self.storage);
        tracing::info!("user logged out");
    }

    fn set_user(&mut self, user: User) {
        store_user(&self.storage, &user);
        self.state.user = Some(user);
    }
}
