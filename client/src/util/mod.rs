//! Helpers shared by the auth store and the presentation layer.
//!
//! SYSTEM CONTEXT
//! ==============
//! `storage` isolates where cached bytes live, and `auth` holds the
//! best-effort request and cache helpers the auth store is built from.

pub mod auth;
pub mod storage;
