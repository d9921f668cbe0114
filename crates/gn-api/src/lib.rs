//! JSON REST API for the registry.
//!
//! Exposes an axum [`Router`] backed by any [`gn_core::store::RecordStore`].
//! Auth, TLS, and transport concerns are the caller's responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", gn_api::api_router(aggregator))
//! ```

pub mod error;
pub mod records;
pub mod search;

use std::sync::Arc;

use axum::{Router, routing::get};
use gn_core::{
  record::{
    Citizen, DailyLog, ElderlyId, Entity, Household, Pension, Permit,
    ServiceRequest, VoluntaryOrg, WelfareProgram,
  },
  search::Aggregator,
  store::RecordStore,
};

pub use error::ApiError;

/// Shared state threaded through all handlers.
pub struct ApiState<S> {
  pub store:      Arc<S>,
  pub aggregator: Aggregator<S>,
}

impl<S> Clone for ApiState<S> {
  fn clone(&self) -> Self {
    Self {
      store:      Arc::clone(&self.store),
      aggregator: self.aggregator.clone(),
    }
  }
}

/// Build the API router. Searches run through `aggregator`; record reads and
/// writes go to the aggregator's store.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S>(aggregator: Aggregator<S>) -> Router<()>
where
  S: RecordStore + 'static,
{
  let state = ApiState {
    store: Arc::clone(aggregator.store()),
    aggregator,
  };

  let router = Router::new()
    .route("/search", get(search::handler::<S>))
    .route("/summary", get(search::summary::<S>));

  let router = collection::<S, Citizen>(router, "citizens");
  let router = collection::<S, Household>(router, "households");
  let router = collection::<S, WelfareProgram>(router, "welfare");
  let router = collection::<S, Permit>(router, "permits");
  let router = collection::<S, DailyLog>(router, "logs");
  let router = collection::<S, Pension>(router, "pensions");
  let router = collection::<S, ElderlyId>(router, "elderly-ids");
  let router = collection::<S, VoluntaryOrg>(router, "organizations");
  let router = collection::<S, ServiceRequest>(router, "requests");

  router.with_state(state)
}

fn collection<S, E>(
  router: Router<ApiState<S>>,
  name: &str,
) -> Router<ApiState<S>>
where
  S: RecordStore + 'static,
  E: Entity,
{
  router
    .route(
      &format!("/{name}"),
      get(records::list::<S, E>).post(records::save::<S, E>),
    )
    .route(
      &format!("/{name}/{{key}}"),
      get(records::get_one::<S, E>).delete(records::delete_one::<S, E>),
    )
}

// ─── Integration tests ────────────────────────────────────────────────────────
