//! Networking modules for the HashPost REST API.
//!
//! SYSTEM CONTEXT
//! ==============
//! `api` owns the shared client configuration and the typed API objects,
//! and `types` defines the wire schema plus the session identity records.

pub mod api;
pub mod types;
