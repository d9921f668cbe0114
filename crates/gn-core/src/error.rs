//! Error types for `gn-core`.

use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("invalid NIC {0:?}: must be at least 10 characters")]
  InvalidNic(String),

  #[error("{0} must not be blank")]
  BlankField(&'static str),

  #[error("{collection} record not found: {key}")]
  NotFound {
    collection: &'static str,
    key:        String,
  },

  #[error("collection {0} is unavailable")]
  Unavailable(String),

  #[error("search task failed: {0}")]
  SearchFailed(String),

  #[error("search did not finish within {0:?}")]
  SearchTimedOut(Duration),

  #[error("serialization error: {0}")]
  Serialization(#[from] serde_json::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
