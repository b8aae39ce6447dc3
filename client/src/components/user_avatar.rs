//! Avatar button and account menu for the signed-in user.

#[cfg(test)]
#[path = "user_avatar_test.rs"]
mod user_avatar_test;

use crate::net::api::AuthBackend;
use crate::net::types::User;
use crate::state::auth::AuthStore;
use crate::util::storage::LocalStore;

/// Account menu entries, in display order.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MenuEntry {
    Profile,
    Settings,
    SignOut,
}

impl MenuEntry {
    pub const ALL: [Self; 3] = [Self::Profile, Self::Settings, Self::SignOut];
}

/// Up to two uppercase initials, one per space-separated word.
pub fn initials(display_name: &str) -> String {
    display_name
        .split(' ')
        .filter_map(|word| word.chars().next())
        .flat_map(char::to_uppercase)
        .take(2)
        .collect()
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct UserAvatar {
    pub menu_open: bool,
    pub busy: bool,
}

impl UserAvatar {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open or close the menu. Ignored while signing out.
    pub fn toggle(&mut self) {
        if !self.busy {
            self.menu_open = !self.menu_open;
        }
    }

    pub fn entry_label(&self, entry: MenuEntry) -> &'static str {
        match entry {
            MenuEntry::Profile => "Profile",
            MenuEntry::Settings => "Settings",
            MenuEntry::SignOut if self.busy => "Signing out...",
            MenuEntry::SignOut => "Sign out",
        }
    }

    /// Pick a menu entry. Profile and Settings only close the menu.
    pub async fn select<B: AuthBackend, S: LocalStore>(&mut self, entry: MenuEntry, store: &mut AuthStore<B, S>) {
        match entry {
            MenuEntry::Profile | MenuEntry::Settings => self.menu_open = false,
            MenuEntry::SignOut => self.sign_out(store).await,
        }
    }

    /// Log out through the store. Always ends with the menu closed.
    pub async fn sign_out<B: AuthBackend, S: LocalStore>(&mut self, store: &mut AuthStore<B, S>) {
        if self.busy {
            return;
        }
        self.busy = true;
        store.logout().await;
        self.busy = false;
        self.menu_open = false;
    }

    /// Avatar badge, plus the menu lines when it is open.
    pub fn render(&self, user: &User) -> Vec<String> {
        let mut lines = vec![format!("({})", initials(&user.display_name))];
        if self.menu_open {
            lines.push(user.display_name.clone());
            lines.push(user.email.clone());
            lines.extend(MenuEntry::ALL.iter().map(|&e| format!("  {}", self.entry_label(e))));
        }
        lines
    }
}
