//! Caller-side search state with last-started-wins supersession.
//!
//! A [`SearchSession`] hands out numbered [`SearchRequest`]s. Responses carry
//! the number back; only a response to the most recent request changes the
//! session state, so a slow earlier search can never overwrite a newer one.
//!
//! ```text
//! Idle ──begin──▶ Searching ──complete──▶ Results | Empty | Failed
//!                     ▲                          │
//!                     └──────────begin───────────┘
//! ```

use serde::Serialize;

use crate::{
  Result,
  record::Citizen360,
  search::Aggregator,
  store::RecordStore,
};

/// What the caller should currently show.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", content = "detail", rename_all = "snake_case")]
pub enum SearchState {
  Idle,
  Searching { generation: u64, query: String },
  Results(Vec<Citizen360>),
  Empty,
  Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchRequest {
  pub generation: u64,
  pub query:      String,
}

#[derive(Debug)]
pub struct SearchResponse {
  pub generation: u64,
  pub outcome:    Result<Vec<Citizen360>>,
}

#[derive(Debug)]
pub struct SearchSession {
  generation: u64,
  state:      SearchState,
}

impl Default for SearchSession {
  fn default() -> Self { Self::new() }
}

impl SearchSession {
  pub fn new() -> Self {
    Self {
      generation: 0,
      state:      SearchState::Idle,
    }
  }

  pub fn state(&self) -> &SearchState { &self.state }

  /// Generation of the most recently started search; `0` before any.
  pub fn generation(&self) -> u64 { self.generation }

  /// Start a search for `query`, superseding whatever was in flight.
  pub fn begin(&mut self, query: impl Into<String>) -> SearchRequest {
    self.generation += 1;
    let query = query.into();
    self.state = SearchState::Searching {
      generation: self.generation,
      query:      query.clone(),
    };
    SearchRequest {
      generation: self.generation,
      query,
    }
  }

  /// Apply `response` if it answers the latest request. Returns `false` for
  /// stale or duplicate responses, which are dropped.
  pub fn complete(&mut self, response: SearchResponse) -> bool {
    let current = matches!(
      self.state,
      SearchState::Searching { generation, .. } if generation == response.generation
    );
    if !current {
      tracing::debug!(
        stale = response.generation,
        latest = self.generation,
        "discarding superseded search response"
      );
      return false;
    }

    self.state = match response.outcome {
      Ok(results) if results.is_empty() => SearchState::Empty,
      Ok(results) => SearchState::Results(results),
      Err(e) => SearchState::Failed(e.to_string()),
    };
    true
  }
}

impl<S: RecordStore + 'static> Aggregator<S> {
  /// Answer a session request.
  pub async fn respond(&self, request: SearchRequest) -> SearchResponse {
    SearchResponse {
      generation: request.generation,
      outcome:    self.try_search(&request.query).await,
    }
  }
}
