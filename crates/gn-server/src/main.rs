//! gn-registry server binary.
//!
//! Reads `config.toml` (or the path specified with `--config`), opens the JSON
//! record store in `data_dir`, and serves the registry API over HTTP.
//!
//! # Password hash generation
//!
//! To generate the argon2 PHC string for `auth_password_hash` in config.toml:
//!
//! ```text
//! cargo run -p gn-server -- hash-password
//! ```

use std::{
  path::{Path, PathBuf},
  sync::Arc,
};

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use gn_core::search::Aggregator;
use gn_server::{ServerConfig, auth, build_aggregator, repl, router};
use gn_store_json::JsonStore;
use tokio::net::TcpListener;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "Grama Niladhari registry server")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "config.toml")]
  config: PathBuf,

  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand)]
enum Command {
  /// Serve the JSON API.
  Serve,
  /// Run one search and print the dossiers as JSON.
  Search {
    /// Text matched against citizen names and NICs.
    query: String,
  },
  /// Read queries from stdin, one per line.
  Repl,
  /// Print the argon2 hash for a password entered on stdin and exit.
  HashPassword,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  // Logs go to stderr so `search` output stays machine-readable.
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .with_writer(std::io::stderr)
    .init();

  let cli = Cli::parse();

  match cli.command {
    Command::Serve => serve(&cli.config).await,
    Command::Search { query } => search(&cli.config, &query).await,
    Command::Repl => {
      let (_, aggregator) = open(&cli.config).await?;
      let stdin = tokio::io::BufReader::new(tokio::io::stdin());
      repl::run(aggregator, stdin, tokio::io::stdout()).await?;
      Ok(())
    }
    Command::HashPassword => {
      let password = read_password()?;
      let hash = auth::hash_password(&password)
        .map_err(|e| anyhow::anyhow!("argon2 error: {e}"))?;
      println!("{hash}");
      Ok(())
    }
  }
}

async fn serve(config_path: &Path) -> anyhow::Result<()> {
  let (server_cfg, aggregator) = open(config_path).await?;
  anyhow::ensure!(
    !server_cfg.auth_username.is_empty()
      && !server_cfg.auth_password_hash.is_empty(),
    "auth_username and auth_password_hash must be configured to serve"
  );

  let app = router(aggregator, Arc::new(server_cfg.auth()));
  let address = format!("{}:{}", server_cfg.host, server_cfg.port);

  tracing::info!("Listening on http://{address}");
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;

  axum::serve(listener, app).await.context("server error")?;
  Ok(())
}

async fn search(config_path: &Path, query: &str) -> anyhow::Result<()> {
  let (_, aggregator) = open(config_path).await?;
  let results = aggregator
    .try_search(query)
    .await
    .context("search failed")?;
  println!("{}", serde_json::to_string_pretty(&results)?);
  Ok(())
}

/// Load configuration and open the store it points at.
async fn open(
  config_path: &Path,
) -> anyhow::Result<(ServerConfig, Aggregator<JsonStore>)> {
  let server_cfg = load_config(config_path)?;

  // Expand `~` in the data directory.
  let data_dir = expand_tilde(&server_cfg.data_dir);
  let store = JsonStore::open(&data_dir)
    .await
    .with_context(|| format!("failed to open store at {data_dir:?}"))?;
  tracing::info!(?data_dir, "store opened");

  let aggregator = build_aggregator(Arc::new(store), &server_cfg);
  Ok((server_cfg, aggregator))
}

/// Layer defaults, the optional TOML file, and `GN_*` environment variables.
fn load_config(path: &Path) -> anyhow::Result<ServerConfig> {
  let settings = config::Config::builder()
    .set_default("host", "127.0.0.1")?
    .set_default("port", 8080)?
    .set_default("data_dir", "~/.local/share/gn-registry")?
    .add_source(config::File::from(path).required(false))
    .add_source(config::Environment::with_prefix("GN"))
    .build()
    .context("failed to read config file")?;

  settings
    .try_deserialize()
    .context("failed to deserialise ServerConfig")
}

/// Prompt on stderr and read one password line from stdin.
fn read_password() -> anyhow::Result<String> {
  use std::io::{BufRead as _, Write as _};

  eprint!("Password: ");
  std::io::stderr().flush()?;
  let mut line = String::new();
  std::io::stdin()
    .lock()
    .read_line(&mut line)
    .context("failed to read password")?;
  let password = line.trim_end_matches(['\r', '\n']);
  anyhow::ensure!(!password.is_empty(), "password must not be empty");
  Ok(password.to_owned())
}

/// Resolve a `data_dir` written as `~/...` against `$HOME`.
fn expand_tilde(path: &Path) -> PathBuf {
  let home = std::env::var_os("HOME").map(PathBuf::from);
  match (path.strip_prefix("~"), home) {
    (Ok(rest), Some(home)) => home.join(rest),
    _ => path.to_path_buf(),
  }
}
