//! Handlers for `GET /search` and `GET /summary`.

use axum::{
  Json,
  extract::{Query, State},
};
use gn_core::{
  record::Citizen360,
  store::RecordStore,
  summary::{RegistrySummary, summarize},
};
use serde::Deserialize;

use crate::{ApiState, error::ApiError};

#[derive(Debug, Deserialize, Default)]
pub struct SearchParams {
  /// Free text matched against citizen names and NICs.
  #[serde(default)]
  pub q: String,
}

/// `GET /search?q=<text>`: one Citizen360 dossier per matching citizen.
pub async fn handler<S>(
  State(state): State<ApiState<S>>,
  Query(params): Query<SearchParams>,
) -> Result<Json<Vec<Citizen360>>, ApiError>
where
  S: RecordStore + 'static,
{
  let results = state.aggregator.try_search(&params.q).await?;
  Ok(Json(results))
}

/// `GET /summary`
pub async fn summary<S>(
  State(state): State<ApiState<S>>,
) -> Json<RegistrySummary>
where
  S: RecordStore + 'static,
{
  Json(summarize(state.store.as_ref()).await)
}
