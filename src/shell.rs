//! Interactive session sharing one auth store across commands.

#[cfg(test)]
#[path = "shell_test.rs"]
mod shell_test;

use std::io::{BufRead, Write};

use hashpost_client::components::user_avatar::UserAvatar;
use hashpost_client::components::{sidebar, top_bar};
use hashpost_client::net::api::AuthBackend;
use hashpost_client::net::types::CachedUser;
use hashpost_client::pages::login::{DialogMode, LoginDialog};
use hashpost_client::state::auth::{AuthState, AuthStore};
use hashpost_client::util::storage::LocalStore;

use crate::{CliError, submit_dialog};

const HELP: &str = "\
commands:
  login <email> <password>
  signup <email> <password> <confirm-password> <display name...>
  logout
  whoami [--json]
  sidebar
  help
  quit";

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum ShellCommand {
    Empty,
    Login { email: String, password: String },
    Signup { email: String, password: String, confirm_password: String, display_name: String },
    Logout,
    Whoami { json: bool },
    Sidebar,
    Help,
    Quit,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub(crate) enum ParseError {
    #[error("usage: {0}")]
    Usage(&'static str),
    #[error("unknown command `{0}`; type `help`")]
    Unknown(String),
}

pub(crate) fn parse_line(line: &str) -> Result<ShellCommand, ParseError> {
    let mut words = line.split_whitespace();
    let Some(head) = words.next() else {
        return Ok(ShellCommand::Empty);
    };
    let rest: Vec<&str> = words.collect();

    match head {
        "login" => match rest.as_slice() {
            [email, password] => Ok(ShellCommand::Login {
                email: (*email).to_owned(),
                password: (*password).to_owned(),
            }),
            _ => Err(ParseError::Usage("login <email> <password>")),
        },
        "signup" => match rest.as_slice() {
            [email, password, confirm, name @ ..] if !name.is_empty() => Ok(ShellCommand::Signup {
                email: (*email).to_owned(),
                password: (*password).to_owned(),
                confirm_password: (*confirm).to_owned(),
                display_name: name.join(" "),
            }),
            _ => Err(ParseError::Usage("signup <email> <password> <confirm-password> <display name...>")),
        },
        "logout" => Ok(ShellCommand::Logout),
        "whoami" => match rest.as_slice() {
            [] => Ok(ShellCommand::Whoami { json: false }),
            ["--json"] => Ok(ShellCommand::Whoami { json: true }),
            _ => Err(ParseError::Usage("whoami [--json]")),
        },
        "sidebar" => Ok(ShellCommand::Sidebar),
        "help" | "?" => Ok(ShellCommand::Help),
        "quit" | "exit" => Ok(ShellCommand::Quit),
        other => Err(ParseError::Unknown(other.to_owned())),
    }
}

/// Top bar plus the current identity, or the token-free JSON record.
pub(crate) fn whoami_lines(state: &AuthState, json: bool) -> Result<Vec<String>, serde_json::Error> {
    if json {
        let value = match &state.user {
            Some(user) => serde_json::to_value(CachedUser::from(user))?,
            None => serde_json::Value::Null,
        };
        return Ok(vec![serde_json::to_string_pretty(&value)?]);
    }

    let mut lines = top_bar::render(state, &UserAvatar::new());
    match &state.user {
        Some(user) => {
            lines.push(format!("{} <{}>", user.display_name, user.email));
            if let Some(pseudonym) = user.active_pseudonym() {
                lines.push(format!("pseudonym: {} (karma {})", pseudonym.display_name, pseudonym.karma_score));
            }
            if !user.roles.is_empty() {
                lines.push(format!("roles: {}", user.roles.join(", ")));
            }
            let session = if user.is_authenticated_with_tokens() { "signed in this run" } else { "restored" };
            lines.push(format!("session: {session}"));
        }
        None => lines.push("Not signed in".to_owned()),
    }
    Ok(lines)
}

/// Read commands from `input` until EOF or `quit`.
///
/// Login and signup failures are printed and the loop continues; write
/// failures end the session.
pub(crate) async fn run<R, W, B, S>(input: R, out: &mut W, store: &mut AuthStore<B, S>) -> Result<(), CliError>
where
    R: BufRead,
    W: Write,
    B: AuthBackend,
    S: LocalStore,
{
    let mut avatar = UserAvatar::new();
    writeln!(out, "{HELP}")?;

    for line in input.lines() {
        let line = line?;
        let command = match parse_line(&line) {
            Ok(command) => command,
            Err(e) => {
                writeln!(out, "{e}")?;
                continue;
            }
        };
        tracing::debug!(command = line.split_whitespace().next().unwrap_or_default(), "shell command");

        match command {
            ShellCommand::Empty => {}
            ShellCommand::Quit => break,
            ShellCommand::Help => writeln!(out, "{HELP}")?,
            ShellCommand::Sidebar => {
                for item in sidebar::render() {
                    writeln!(out, "{item}")?;
                }
            }
            ShellCommand::Whoami { json } => {
                for line in whoami_lines(store.state(), json)? {
                    writeln!(out, "{line}")?;
                }
            }
            ShellCommand::Logout => {
                avatar.sign_out(store).await;
                writeln!(out, "Signed out")?;
            }
            ShellCommand::Login { email, password } => {
                let mut dialog = LoginDialog::new();
                dialog.open();
                dialog.email = email;
                dialog.password = password;
                report(submit_dialog(&mut dialog, store, out).await, out)?;
            }
            ShellCommand::Signup { email, password, confirm_password, display_name } => {
                let mut dialog = LoginDialog::new();
                dialog.open();
                dialog.switch_mode(DialogMode::Signup);
                dialog.email = email;
                dialog.password = password;
                dialog.confirm_password = confirm_password;
                dialog.display_name = display_name;
                report(submit_dialog(&mut dialog, store, out).await, out)?;
            }
        }
    }
    Ok(())
}

fn report<W: Write>(result: Result<(), CliError>, out: &mut W) -> Result<(), CliError> {
    match result {
        Err(CliError::Dialog(e)) => {
            writeln!(out, "{e}")?;
            Ok(())
        }
        other => other,
    }
}
