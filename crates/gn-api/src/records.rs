//! Generic CRUD handlers, mounted once per collection.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `GET`    | `/{collection}` | Whole collection in stored order |
//! | `POST`   | `/{collection}` | Upsert by key; blank ids are generated; returns 201 |
//! | `GET`    | `/{collection}/{key}` | 404 if not found |
//! | `DELETE` | `/{collection}/{key}` | 204, or 404 if not found |

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
};
use gn_core::{
  record::Entity,
  store::{RecordStore, delete_record, find_record, upsert_record},
};

use crate::{ApiState, error::ApiError};

// ─── List ─────────────────────────────────────────────────────────────────────

/// `GET /{collection}`
pub async fn list<S, E>(
  State(state): State<ApiState<S>>,
) -> Result<Json<Vec<E>>, ApiError>
where
  S: RecordStore + 'static,
  E: Entity,
{
  let records = state
    .store
    .read_all::<E>()
    .await
    .map_err(ApiError::store)?;
  Ok(Json(records))
}

// ─── Get one ──────────────────────────────────────────────────────────────────

/// `GET /{collection}/{key}`
pub async fn get_one<S, E>(
  State(state): State<ApiState<S>>,
  Path(key): Path<String>,
) -> Result<Json<E>, ApiError>
where
  S: RecordStore + 'static,
  E: Entity,
{
  let record = find_record::<S, E>(&state.store, &key)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::from(not_found::<E>(key)))?;
  Ok(Json(record))
}

// ─── Create / replace ─────────────────────────────────────────────────────────

/// `POST /{collection}`: validates, fills a blank key, then upserts.
pub async fn save<S, E>(
  State(state): State<ApiState<S>>,
  Json(mut record): Json<E>,
) -> Result<impl IntoResponse, ApiError>
where
  S: RecordStore + 'static,
  E: Entity,
{
  record.ensure_key();
  record.validate()?;
  let stored = upsert_record(state.store.as_ref(), record)
    .await
    .map_err(ApiError::store)?;
  Ok((StatusCode::CREATED, Json(stored)))
}

// ─── Delete ───────────────────────────────────────────────────────────────────

/// `DELETE /{collection}/{key}`
pub async fn delete_one<S, E>(
  State(state): State<ApiState<S>>,
  Path(key): Path<String>,
) -> Result<StatusCode, ApiError>
where
  S: RecordStore + 'static,
  E: Entity,
{
  let removed = delete_record::<S, E>(&state.store, &key)
    .await
    .map_err(ApiError::store)?;
  if removed {
    Ok(StatusCode::NO_CONTENT)
  } else {
    Err(not_found::<E>(key).into())
  }
}

fn not_found<E: Entity>(key: String) -> gn_core::Error {
  gn_core::Error::NotFound {
    collection: E::COLLECTION,
    key,
  }
}
