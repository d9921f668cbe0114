//! Server wiring for the registry: configuration, auth gate, and the
//! interactive search loop.

pub mod auth;
pub mod error;
pub mod repl;

pub use error::Error;

use std::{path::PathBuf, sync::Arc, time::Duration};

use axum::{Router, middleware};
use gn_core::{search::Aggregator, store::RecordStore};
use serde::Deserialize;
use tower_http::trace::TraceLayer;

use auth::{AuthConfig, require_auth};

// ─── Configuration ────────────────────────────────────────────────────────────

/// Runtime configuration, deserialised from `config.toml` and `GN_*`
/// environment variables.
#[derive(Deserialize, Clone, Debug)]
pub struct ServerConfig {
  pub host:               String,
  pub port:               u16,
  /// Directory holding one `<collection>.json` document per record type.
  pub data_dir:           PathBuf,
  #[serde(default)]
  pub auth_username:      String,
  #[serde(default)]
  pub auth_password_hash: String,
  /// Searches running longer than this are reported as failed.
  #[serde(default)]
  pub search_timeout_ms:  Option<u64>,
}

impl ServerConfig {
  pub fn search_timeout(&self) -> Option<Duration> {
    self.search_timeout_ms.map(Duration::from_millis)
  }

  pub fn auth(&self) -> AuthConfig {
    AuthConfig {
      username:      self.auth_username.clone(),
      password_hash: self.auth_password_hash.clone(),
    }
  }
}

/// Build the search aggregator for `store` with the configured deadline.
pub fn build_aggregator<S>(store: Arc<S>, config: &ServerConfig) -> Aggregator<S>
where
  S: RecordStore + 'static,
{
  let aggregator = Aggregator::new(store);
  match config.search_timeout() {
    Some(limit) => aggregator.with_timeout(limit),
    None => aggregator,
  }
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// The full HTTP surface: the JSON API under `/api`, behind Basic auth.
pub fn router<S>(aggregator: Aggregator<S>, auth: Arc<AuthConfig>) -> Router
where
  S: RecordStore + 'static,
{
  let api = gn_api::api_router(aggregator)
    .layer(middleware::from_fn_with_state(auth, require_auth));

  Router::new()
    .nest("/api", api)
    .layer(TraceLayer::new_for_http())
}

// ─── Integration tests ────────────────────────────────────────────────────────
