mod schema;
mod shell;

use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use hashpost_client::net::api::{ApiClient, ApiConfig, ApiError, AuthenticationApi};
use hashpost_client::pages::login::{DialogError, DialogMode, LoginDialog};
use hashpost_client::state::auth::AuthStore;
use hashpost_client::util::storage::{AnyStore, FileStore};
use tracing_subscriber::EnvFilter;

pub(crate) type Store = AuthStore<AuthenticationApi, AnyStore>;

#[derive(Debug, thiserror::Error)]
pub(crate) enum CliError {
    #[error("api request failed: {0}")]
    Api(#[from] ApiError),
    #[error("{0}")]
    Dialog(#[from] DialogError),
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("io error: {0}")]
    Io(#[from] io::Error),
}

#[derive(Parser, Debug)]
#[command(name = "hashpost", about = "HashPost account client")]
struct Cli {
    /// Backend base URL. Defaults to `HASHPOST_API_URL`, `NEXT_PUBLIC_API_URL`,
    /// then http://localhost:8888.
    #[arg(long, global = true)]
    api_url: Option<String>,

    /// Existing access token, sent as the `access_token` cookie.
    #[arg(long, env = "HASHPOST_ACCESS_TOKEN", global = true, hide_env_values = true)]
    access_token: Option<String>,

    /// Directory holding the cached user. Without one nothing is cached.
    #[arg(long, env = "HASHPOST_STATE_DIR", global = true)]
    state_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    Login(LoginArgs),
    Signup(SignupArgs),
    Logout,
    Whoami {
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    Shell,
    Schema(SchemaCommand),
}

#[derive(Args, Debug)]
struct LoginArgs {
    #[arg(long)]
    email: String,
    #[arg(long)]
    password: String,
}

#[derive(Args, Debug)]
struct SignupArgs {
    #[arg(long)]
    email: String,
    #[arg(long)]
    password: String,
    #[arg(long)]
    confirm_password: String,
    #[arg(long)]
    display_name: String,
}

#[derive(Args, Debug)]
struct SchemaCommand {
    #[command(subcommand)]
    command: SchemaSubcommand,
}

#[derive(Subcommand, Debug)]
enum SchemaSubcommand {
    Download {
        #[arg(long, default_value = "openapi.json")]
        output: PathBuf,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let _ = dotenvy::dotenv();
    init_tracing();

    let cli = Cli::parse();
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn api_config(cli: &Cli) -> ApiConfig {
    let mut config = ApiConfig::from_env();
    if let Some(url) = cli.api_url.as_deref().filter(|u| !u.trim().is_empty()) {
        config.base_url = url.trim().trim_end_matches('/').to_owned();
    }
    if let Some(token) = cli.access_token.clone().filter(|t| !t.trim().is_empty()) {
        config.session_cookie = Some(token);
    }
    config
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let client = ApiClient::new(api_config(&cli))?;
    let state_dir = cli.state_dir.clone().or_else(FileStore::default_dir);
    tracing::debug!(base_url = %client.config().base_url, ?state_dir, "starting");

    let mut store: Store = AuthStore::new(client.api::<AuthenticationApi>(), AnyStore::from_dir(state_dir));
    store.rehydrate().await;

    let mut out = io::stdout().lock();
    match cli.command {
        Command::Login(args) => {
            let mut dialog = LoginDialog::new();
            dialog.open();
            dialog.email = args.email;
            dialog.password = args.password;
            submit_dialog(&mut dialog, &mut store, &mut out).await
        }
        Command::Signup(args) => {
            let mut dialog = LoginDialog::new();
            dialog.open();
            dialog.switch_mode(DialogMode::Signup);
            dialog.email = args.email;
            dialog.password = args.password;
            dialog.confirm_password = args.confirm_password;
            dialog.display_name = args.display_name;
            submit_dialog(&mut dialog, &mut store, &mut out).await
        }
        Command::Logout => {
            store.logout().await;
            writeln!(out, "Signed out")?;
            Ok(())
        }
        Command::Whoami { json } => {
            for line in shell::whoami_lines(store.state(), json)? {
                writeln!(out, "{line}")?;
            }
            Ok(())
        }
        Command::Shell => {
            let stdin = io::stdin().lock();
            shell::run(stdin, &mut out, &mut store).await
        }
        Command::Schema(schema) => match schema.command {
            SchemaSubcommand::Download { output } => {
                let count = schema::download(&client, &output).await?;
                writeln!(out, "Wrote {} ({count} paths)", output.display())?;
                Ok(())
            }
        },
    }
}

/// Submit a filled dialog and report the outcome the way the dialog shows it.
pub(crate) async fn submit_dialog<B, S, W>(
    dialog: &mut LoginDialog,
    store: &mut AuthStore<B, S>,
    out: &mut W,
) -> Result<(), CliError>
where
    B: hashpost_client::net::api::AuthBackend,
    S: hashpost_client::util::storage::LocalStore,
    W: Write,
{
    match dialog.submit(store).await {
        Ok(mode) => {
            let name = store.user().map(|u| u.display_name.as_str()).unwrap_or_default();
            match mode {
                DialogMode::Login => writeln!(out, "Signed in as {name}")?,
                DialogMode::Signup => writeln!(out, "Account created for {name}")?,
            }
            Ok(())
        }
        Err(e) => Err(e.into()),
    }
}
