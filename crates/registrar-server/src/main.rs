//! Registrar server binary.
//!
//! Reads `config.toml` (or the path given with `--config`) overlaid by
//! `REGISTRAR_*` environment variables, opens the SQLite store, and serves the
//! JSON API over HTTP until SIGINT or SIGTERM.
//!
//! # Operator helpers
//!
//! ```text
//! server --hash-password            # print an argon2 PHC string for stdin
//! server --create-admin alice       # provision an Admin, password on stdin
//! ```

use std::{
  path::{Path, PathBuf},
  sync::Arc,
};

use anyhow::Context as _;
use chrono::Utc;
use clap::Parser;
use registrar_auth::{TokenIssuer, password::hash_password};
use registrar_core::{
  identity::{Identity, NewIdentity, Role},
  store::RecordStore,
};
use registrar_server::{AppState, ServerConfig};
use registrar_store_sqlite::SqliteStore;
use tokio::net::TcpListener;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "Registrar school-records server")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "config.toml")]
  config: PathBuf,

  /// Print the argon2 hash for a password entered on stdin and exit.
  #[arg(long)]
  hash_password: bool,

  /// Create an Admin identity with this username (password on stdin) and exit.
  #[arg(long, value_name = "USERNAME")]
  create_admin: Option<String>,

  /// Email for `--create-admin`. Defaults to `<username>@localhost`.
  #[arg(long, requires = "create_admin")]
  email: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();

  if cli.hash_password {
    let password = read_password()?;
    println!("{}", hash_password(&password)?);
    return Ok(());
  }

  let settings = config::Config::builder()
    .add_source(config::File::from(cli.config).required(false))
    .add_source(config::Environment::with_prefix("REGISTRAR"))
    .build()
    .context("failed to read config file")?;

  let server_cfg: ServerConfig = settings
    .try_deserialize()
    .context("failed to deserialise ServerConfig")?;

  let store_path = expand_tilde(&server_cfg.store_path);
  let store = SqliteStore::open(&store_path)
    .await
    .with_context(|| format!("failed to open store at {store_path:?}"))?;

  if let Some(username) = cli.create_admin {
    let email = cli.email.unwrap_or_else(|| format!("{username}@localhost"));
    return create_admin(&store, username, email).await;
  }

  let tokens = TokenIssuer::new(server_cfg.jwt_secret.as_bytes())
    .context("jwt_secret must be set (REGISTRAR_JWT_SECRET or config file)")?;

  let state = AppState {
    store:  Arc::new(store),
    tokens: Arc::new(tokens),
  };

  let app = registrar_server::router(state);
  let address = format!("{}:{}", server_cfg.host, server_cfg.port);

  tracing::info!("Listening on http://{address}");
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;

  axum::serve(listener, app)
    .with_graceful_shutdown(shutdown_signal())
    .await
    .context("server error")?;

  tracing::info!("shut down");
  Ok(())
}

async fn create_admin(store: &SqliteStore, username: String, email: String) -> anyhow::Result<()> {
  let password = read_password()?;
  anyhow::ensure!(!password.is_empty(), "password must not be empty");

  let identity = Identity::new(
    NewIdentity {
      display_name:  username.clone(),
      username,
      email,
      password_hash: hash_password(&password)?,
      role:          Role::Admin,
    },
    Utc::now(),
  );
  let identity = store
    .create_identity(identity)
    .await
    .context("failed to create admin identity")?;

  tracing::info!(identity = %identity.identity_id, username = %identity.username, "admin created");
  Ok(())
}

/// Resolves on SIGINT, or SIGTERM on unix.
async fn shutdown_signal() {
  let ctrl_c = async {
    if let Err(e) = tokio::signal::ctrl_c().await {
      tracing::error!(error = %e, "failed to listen for ctrl-c");
      std::future::pending::<()>().await;
    }
  };

  #[cfg(unix)]
  let terminate = async {
    match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
      Ok(mut sig) => {
        sig.recv().await;
      }
      Err(e) => {
        tracing::error!(error = %e, "failed to listen for SIGTERM");
        std::future::pending::<()>().await;
      }
    }
  };

  #[cfg(not(unix))]
  let terminate = std::future::pending::<()>();

  tokio::select! {
    () = ctrl_c => {},
    () = terminate => {},
  }
  tracing::info!("shutdown signal received");
}

/// Read a password from stdin.
fn read_password() -> anyhow::Result<String> {
  use std::io::{self, BufRead, Write};
  let stdin = io::stdin();
  print!("Password: ");
  io::stdout().flush().ok();
  let mut line = String::new();
  stdin.lock().read_line(&mut line)?;
  Ok(
    line
      .trim_end_matches('\n')
      .trim_end_matches('\r')
      .to_string(),
  )
}

/// Expand a leading `~` to the user's home directory.
fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}
