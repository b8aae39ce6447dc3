//! Terminal presentation components.
//!
//! SYSTEM CONTEXT
//! ==============
//! Components read auth state and render plain text lines. Anything that
//! changes identity goes through the auth store.

pub mod sidebar;
pub mod top_bar;
pub mod user_avatar;
