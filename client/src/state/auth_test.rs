use super::*;

use crate::net::types::{CachedUser, LoginResponse};
use crate::test_helpers::{
    MockBackend, login_response, registration_response, session_response, spawn_http_backend,
};
use crate::util::auth::USER_STORAGE_KEY;
use crate::util::storage::{FileStore, MemoryStore};

fn seed_cache(storage: &MemoryStore) -> CachedUser {
    let mut resp = login_response();
    resp.display_name = "Cached Ada".to_owned();
    let cached = CachedUser::from(&User::from(AuthPayload::from(resp)));
    storage
        .set_item(USER_STORAGE_KEY, &serde_json::to_string(&cached).unwrap())
        .unwrap();
    cached
}

// =============================================================
// AuthState
// =============================================================

#[test]
fn auth_state_default_no_user() {
    let state = AuthState::default();
    assert!(state.user.is_none());
}

#[test]
fn auth_state_default_is_loading() {
    let state = AuthState::default();
    assert!(state.loading);
    assert_eq!(state.phase(), AuthPhase::Unknown);
}

#[test]
fn new_store_starts_unknown() {
    let store = AuthStore::new(MockBackend::anonymous(), MemoryStore::new());
    assert_eq!(store.phase(), AuthPhase::Unknown);
    assert!(store.is_loading());
    assert!(!store.is_authenticated());
}

// =============================================================
// rehydrate
// =============================================================

#[tokio::test]
async fn rehydrate_uses_backend_session_and_overwrites_cache() {
    let storage = MemoryStore::new();
    seed_cache(&storage);
    let mut store = AuthStore::new(MockBackend::with_session(session_response()), storage);

    assert_eq!(store.rehydrate().await, AuthPhase::Authenticated);
    let user = store.user().unwrap();
    assert_eq!(user.display_name, "Ada");
    assert_eq!(user.access_token, "");

    let raw = store.storage().get_item(USER_STORAGE_KEY).unwrap().unwrap();
    let cached: CachedUser = serde_json::from_str(&raw).unwrap();
    assert_eq!(cached.display_name, "Ada");
}

#[tokio::test]
async fn rehydrate_without_session_or_cache_is_anonymous() {
    let mut store = AuthStore::new(MockBackend::anonymous(), MemoryStore::new());
    assert_eq!(store.rehydrate().await, AuthPhase::Anonymous);
    assert_eq!(store.state(), &AuthState { user: None, loading: false });
}

#[tokio::test]
async fn rehydrate_falls_back_to_valid_cache() {
    let storage = MemoryStore::new();
    let cached = seed_cache(&storage);
    let mut store = AuthStore::new(MockBackend::anonymous(), storage);

    assert_eq!(store.rehydrate().await, AuthPhase::Authenticated);
    assert!(!store.is_loading());
    assert_eq!(store.user(), Some(&cached.into_user()));
}

#[tokio::test]
async fn rehydrate_discards_corrupt_cache() {
    let storage = MemoryStore::new();
    storage.set_item(USER_STORAGE_KEY, "{broken").unwrap();
    let mut store = AuthStore::new(MockBackend::anonymous(), storage);

    assert_eq!(store.rehydrate().await, AuthPhase::Anonymous);
    assert!(store.storage().is_empty());
}

#[tokio::test]
async fn rehydrate_runs_once() {
    let mut store = AuthStore::new(MockBackend::anonymous(), MemoryStore::new());
    store.rehydrate().await;
    store.rehydrate().await;
    assert_eq!(store.backend().calls(), ["me"]);
}

#[tokio::test]
async fn rehydrate_after_login_keeps_logged_in_user_when_checked_once() {
    let mut store = AuthStore::new(MockBackend::with_session(session_response()), MemoryStore::new());
    store.rehydrate().await;
    let mut resp = login_response();
    resp.display_name = "Relogged".to_owned();
    store.login(resp);
    assert_eq!(store.rehydrate().await, AuthPhase::Authenticated);
    assert_eq!(store.user().unwrap().display_name, "Relogged");
}

// =============================================================
// login
// =============================================================

#[tokio::test]
async fn login_scenario_sets_single_pseudonym_user() {
    let mut store = AuthStore::new(MockBackend::anonymous(), MemoryStore::new());
    store.rehydrate().await;
    store.login(login_response());

    let user = store.user().unwrap();
    assert_eq!(user.pseudonyms.len(), 1);
    assert_eq!(user.active_pseudonym_id, "p1");
    assert_eq!(user.access_token, "access-1");
    assert_eq!(store.phase(), AuthPhase::Authenticated);
}

#[test]
fn login_with_registration_payload_synthesizes_pseudonym() {
    let mut store = AuthStore::new(MockBackend::anonymous(), MemoryStore::new());
    store.login(registration_response());
    let user = store.user().unwrap();
    assert_eq!(user.pseudonyms.len(), 1);
    assert_eq!(user.pseudonyms[0].pseudonym_id, user.active_pseudonym_id);
    assert!(!store.is_loading());
}

#[test]
fn login_writes_token_free_cache() {
    let mut store = AuthStore::new(MockBackend::anonymous(), MemoryStore::new());
    store.login(login_response());
    let raw = store.storage().get_item(USER_STORAGE_KEY).unwrap().unwrap();
    assert!(!raw.contains("access-1"));
    assert!(!raw.contains("refresh-1"));
}

#[test]
fn relogin_replaces_user_wholesale() {
    let mut store = AuthStore::new(MockBackend::anonymous(), MemoryStore::new());
    store.login(login_response());
    store.login(registration_response());
    let user = store.user().unwrap();
    assert_eq!(user.user_id, 2);
    assert_eq!(user.roles, ["user"]);
    assert_eq!(user.capabilities, ["create_content"]);
    assert_eq!(user.active_pseudonym_id, "p-new");
}

#[tokio::test]
async fn login_with_unlisted_active_pseudonym_survives_restart() {
    let storage = MemoryStore::new();
    let mut resp = login_response();
    resp.active_pseudonym_id = "p-elsewhere".to_owned();

    let mut first = AuthStore::new(MockBackend::anonymous(), &storage);
    first.rehydrate().await;
    first.login(resp);
    assert!(first.user().unwrap().active_pseudonym().is_none());

    let mut second = AuthStore::new(MockBackend::anonymous(), &storage);
    assert_eq!(second.rehydrate().await, AuthPhase::Authenticated);
    assert_eq!(second.user().unwrap().active_pseudonym_id, "p-elsewhere");
    assert!(storage.get_item(USER_STORAGE_KEY).unwrap().is_some());
}

#[test]
fn login_accepts_explicit_payload() {
    let mut store = AuthStore::new(MockBackend::anonymous(), MemoryStore::new());
    let resp: LoginResponse = login_response();
    store.login(AuthPayload::Login(resp));
    assert!(store.is_authenticated());
}

// =============================================================
// logout
// =============================================================

#[tokio::test]
async fn logout_clears_user_and_cache() {
    let mut store = AuthStore::new(MockBackend::anonymous(), MemoryStore::new());
    store.login(login_response());
    store.logout().await;
    assert_eq!(store.state(), &AuthState { user: None, loading: false });
    assert_eq!(store.storage().get_item(USER_STORAGE_KEY).unwrap(), None);
}

#[tokio::test]
async fn logout_clears_state_even_when_backend_fails() {
    let backend = MockBackend { fail_logout: true, ..MockBackend::default() };
    let mut store = AuthStore::new(backend, MemoryStore::new());
    store.login(login_response());
    store.logout().await;
    assert!(store.user().is_none());
    assert!(store.storage().is_empty());
    assert_eq!(store.backend().calls(), ["logout:"]);
}

// =============================================================
// Against the HTTP backend
// =============================================================

#[tokio::test]
async fn http_session_survives_into_new_store_via_cookie() {
    use crate::net::api::{ApiClient, ApiConfig, AuthenticationApi};
    use crate::net::types::LoginRequest;

    let base = spawn_http_backend().await;
    let client = ApiClient::new(ApiConfig::new(&base)).unwrap();
    let dir = tempfile::tempdir().unwrap();

    let mut first = AuthStore::new(client.api::<AuthenticationApi>(), FileStore::new(dir.path()));
    assert_eq!(first.rehydrate().await, AuthPhase::Anonymous);
    let req = LoginRequest { email: "a@b.com".to_owned(), password: "x".to_owned() };
    let resp = first.backend().login_user(&req).await.unwrap();
    first.login(resp);

    // Same HTTP client (same cookie jar), fresh store: the backend answers.
    let mut second = AuthStore::new(client.api::<AuthenticationApi>(), FileStore::new(dir.path()));
    assert_eq!(second.rehydrate().await, AuthPhase::Authenticated);
    assert_eq!(second.user().unwrap().access_token, "");

    second.logout().await;
    let mut third = AuthStore::new(client.api::<AuthenticationApi>(), FileStore::new(dir.path()));
    assert_eq!(third.rehydrate().await, AuthPhase::Anonymous);
}

#[tokio::test]
async fn unreachable_backend_falls_back_to_file_cache() {
    use crate::net::api::{ApiClient, ApiConfig, AuthenticationApi};

    let dir = tempfile::tempdir().unwrap();
    let storage = FileStore::new(dir.path());
    crate::util::auth::store_user(&storage, &User::from(AuthPayload::from(login_response())));

    let api = ApiClient::new(ApiConfig::new("http://127.0.0.1:9"))
        .unwrap()
        .api::<AuthenticationApi>();
    let mut store = AuthStore::new(api, storage);
    assert_eq!(store.rehydrate().await, AuthPhase::Authenticated);
    assert_eq!(store.user().unwrap().email, "a@b.com");
}
