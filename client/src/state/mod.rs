//! Client-side state modules.
//!
//! DESIGN
//! ======
//! The auth store is the only process-wide state. It is an owned value
//! handed to whatever drives the presentation layer, not a global.

pub mod auth;
