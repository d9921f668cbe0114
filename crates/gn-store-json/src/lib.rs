//! JSON-file backend for the registry.
//!
//! Each collection lives in its own `<collection>.json` array document inside
//! one data directory. All file access goes through [`tokio::fs`].

mod store;

pub mod error;

pub use error::{Error, Result};
pub use store::JsonStore;

#[cfg(test)]
mod tests;
