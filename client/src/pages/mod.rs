//! Page-level models.
//!
//! ARCHITECTURE
//! ============
//! A page owns form state and orchestration; the auth store owns identity.

pub mod login;
