//! Top bar: brand on the left, auth affordance on the right.
//!
//! SYSTEM CONTEXT
//! ==============
//! Reads the auth store's state only. While the start-up session check is
//! pending nothing is shown on the right, so the login button never flashes
//! for a user who turns out to be signed in.

#[cfg(test)]
#[path = "top_bar_test.rs"]
mod top_bar_test;

use super::user_avatar::UserAvatar;
use crate::state::auth::{AuthPhase, AuthState};

pub const BRAND: &str = "HashPost";
pub const BADGE: &str = "alpha";
pub const LOGIN_LABEL: &str = "[Login]";

/// What occupies the right-hand side of the bar.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RightSlot {
    Empty,
    Avatar,
    LoginButton,
}

pub fn right_slot(state: &AuthState) -> RightSlot {
    match state.phase() {
        AuthPhase::Unknown => RightSlot::Empty,
        AuthPhase::Authenticated => RightSlot::Avatar,
        AuthPhase::Anonymous => RightSlot::LoginButton,
    }
}

/// Render the bar as text. The first line is the bar itself; an open avatar
/// menu adds lines below it.
pub fn render(state: &AuthState, avatar: &UserAvatar) -> Vec<String> {
    let brand = format!("{BRAND} {BADGE}");
    match (right_slot(state), state.user.as_ref()) {
        (RightSlot::Avatar, Some(user)) => {
            let mut lines = avatar.render(user);
            lines[0] = format!("{brand} | {}", lines[0]);
            lines
        }
        (RightSlot::LoginButton, _) => vec![format!("{brand} | {LOGIN_LABEL}")],
        _ => vec![brand],
    }
}
