//! Core types and trait definitions for the Grama Niladhari registry.
//!
//! This crate is deliberately free of HTTP and filesystem dependencies.
//! Storage backends implement [`store::RecordStore`]; the API and server
//! crates depend on that abstraction, never on a concrete backend.

// We intentionally use native `async fn` in traits.
#![allow(async_fn_in_trait)]

pub mod error;
#[cfg(any(test, feature = "test-util"))]
pub mod memory;
pub mod normalize;
pub mod record;
pub mod search;
pub mod session;
pub mod store;
pub mod summary;
pub mod upsert;

pub use error::{Error, Result};
