//! # hashpost-client
//!
//! Native client for the HashPost forum backend. Owns the session lifecycle
//! (login, signup, logout, start-up rehydration) on top of a typed REST client
//! for the backend's authentication endpoints.
//!
//! This crate contains network types and API objects, local storage and auth
//! helpers, the auth store, the login dialog model, and terminal view models
//! for the top bar, user avatar menu, and sidebar.

pub mod components;
pub mod net;
pub mod pages;
pub mod state;
pub mod util;

#[cfg(test)]
pub(crate) mod test_helpers;
