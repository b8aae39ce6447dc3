//! Login / signup dialog model.
//!
//! Holds the form fields and drives one request at a time against the auth
//! store's backend. Rendering produces plain text lines for the terminal.

#[cfg(test)]
#[path = "login_test.rs"]
mod login_test;

use crate::net::api::AuthBackend;
use crate::net::types::{AuthPayload, LoginRequest, RegistrationRequest};
use crate::state::auth::AuthStore;
use crate::util::storage::LocalStore;

pub const PASSWORDS_MISMATCH_MESSAGE: &str = "Passwords do not match";
pub const LOGIN_FAILED_MESSAGE: &str = "Invalid email or password";
pub const SIGNUP_FAILED_MESSAGE: &str = "Failed to create account";

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DialogMode {
    #[default]
    Login,
    Signup,
}

impl DialogMode {
    pub fn failure_message(self) -> &'static str {
        match self {
            Self::Login => LOGIN_FAILED_MESSAGE,
            Self::Signup => SIGNUP_FAILED_MESSAGE,
        }
    }
}

/// Why a submit did not install a user.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DialogError {
    #[error("a request is already in flight")]
    Busy,
    #[error("Passwords do not match")]
    PasswordsMismatch,
    #[error("Fill in all required fields")]
    MissingFields,
    /// Backend refused or was unreachable. Carries the generic user-facing text.
    #[error("{0}")]
    Rejected(&'static str),
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LoginDialog {
    pub mode: DialogMode,
    pub open: bool,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
    pub display_name: String,
    pub busy: bool,
    pub error: String,
}

impl LoginDialog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn open(&mut self) {
        self.open = true;
    }

    /// Close and reset every field, returning to login mode.
    pub fn close(&mut self) {
        *self = Self::default();
    }

    pub fn switch_mode(&mut self, mode: DialogMode) {
        self.mode = mode;
        self.error.clear();
        self.password.clear();
        self.confirm_password.clear();
        self.display_name.clear();
    }

    pub fn passwords_mismatch(&self) -> bool {
        self.mode == DialogMode::Signup && self.password != self.confirm_password
    }

    pub fn mismatch_message(&self) -> Option<&'static str> {
        self.passwords_mismatch().then_some(PASSWORDS_MISMATCH_MESSAGE)
    }

    pub fn can_submit(&self) -> bool {
        !self.busy && !self.passwords_mismatch()
    }

    fn missing_fields(&self) -> bool {
        let base = self.email.trim().is_empty() || self.password.is_empty();
        match self.mode {
            DialogMode::Login => base,
            DialogMode::Signup => base || self.display_name.trim().is_empty(),
        }
    }

    pub fn title(&self) -> &'static str {
        match self.mode {
            DialogMode::Login => "Login to HashPost",
            DialogMode::Signup => "Create Account",
        }
    }

    pub fn description(&self) -> &'static str {
        match self.mode {
            DialogMode::Login => "Enter your credentials to access your account.",
            DialogMode::Signup => "Create a new account to get started with HashPost.",
        }
    }

    pub fn submit_label(&self) -> &'static str {
        match (self.mode, self.busy) {
            (DialogMode::Login, false) => "Sign In",
            (DialogMode::Login, true) => "Signing in...",
            (DialogMode::Signup, false) => "Create Account",
            (DialogMode::Signup, true) => "Creating account...",
        }
    }

    /// Submit the form against `store`'s backend.
    ///
    /// On success the response is installed through [`AuthStore::login`] and
    /// the dialog closes. On failure the generic mode message is stored in
    /// `error` and the underlying cause is only logged.
    pub async fn submit<B, S>(&mut self, store: &mut AuthStore<B, S>) -> Result<DialogMode, DialogError>
    where
        B: AuthBackend,
        S: LocalStore,
    {
        if self.busy {
            return Err(DialogError::Busy);
        }
        if self.passwords_mismatch() {
            return Err(DialogError::PasswordsMismatch);
        }
        if self.missing_fields() {
            return Err(DialogError::MissingFields);
        }

        let mode = self.mode;
        self.busy = true;
        self.error.clear();

        let outcome = match mode {
            DialogMode::Login => {
                let request = LoginRequest { email: self.email.clone(), password: self.password.clone() };
                store.backend().login(&request).await.map(AuthPayload::from)
            }
            DialogMode::Signup => {
                let request = RegistrationRequest {
                    email: self.email.clone(),
                    password: self.password.clone(),
                    display_name: self.display_name.clone(),
                };
                store.backend().register(&request).await.map(AuthPayload::from)
            }
        };
        self.busy = false;

        match outcome {
            Ok(payload) => {
                tracing::debug!(?mode, "dialog submit succeeded");
                store.login(payload);
                self.close();
                Ok(mode)
            }
            Err(e) => {
                tracing::warn!(error = %e, ?mode, "dialog submit failed");
                let message = mode.failure_message();
                self.error = message.to_owned();
                Err(DialogError::Rejected(message))
            }
        }
    }

    /// Text rendering of the open dialog. Empty when closed.
    pub fn render(&self) -> Vec<String> {
        if !self.open {
            return Vec::new();
        }
        let mut lines = vec![self.title().to_owned(), self.description().to_owned()];
        lines.push(format!("Email: {}", self.email));
        if self.mode == DialogMode::Signup {
            lines.push(format!("Display Name: {}", self.display_name));
        }
        lines.push(format!("Password: {}", mask(&self.password)));
        if self.mode == DialogMode::Signup {
            lines.push(format!("Confirm Password: {}", mask(&self.confirm_password)));
        }
        if let Some(message) = self.mismatch_message() {
            lines.push(message.to_owned());
        }
        if !self.error.is_empty() {
            lines.push(self.error.clone());
        }
        let marker = if self.can_submit() { "" } else { " (disabled)" };
        lines.push(format!("[{}]{marker}", self.submit_label()));
        lines.push(
            match self.mode {
                DialogMode::Login => "Don't have an account? Sign up",
                DialogMode::Signup => "Already have an account? Sign in",
            }
            .to_owned(),
        );
        lines
    }
}

fn mask(secret: &str) -> String {
    "*".repeat(secret.chars().count())
}
