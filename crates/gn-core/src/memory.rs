//! [`MemoryStore`]: a [`RecordStore`] that keeps each collection document as
//! raw JSON text in memory.
//!
//! Decoding follows the same rules as an on-disk store, so tests can inject
//! malformed documents with [`MemoryStore::put_raw`]. Only built for tests and
//! under the `test-util` feature.

use std::{
  collections::{HashMap, HashSet},
  sync::{
    Mutex,
    atomic::{AtomicUsize, Ordering},
  },
};

use crate::{
  Error, Result,
  record::Entity,
  store::{RecordStore, decode_collection},
};

#[derive(Default)]
pub struct MemoryStore {
  docs:        Mutex<HashMap<String, Vec<u8>>>,
  unavailable: Mutex<HashSet<String>>,
  reads:       AtomicUsize,
}

impl MemoryStore {
  pub fn new() -> Self { Self::default() }

  /// Replace a collection document with arbitrary text.
  pub fn put_raw(&self, collection: &str, text: &str) {
    self
      .docs
      .lock()
      .unwrap_or_else(|e| e.into_inner())
      .insert(collection.to_owned(), text.as_bytes().to_vec());
  }

  /// Make every subsequent read of `collection` fail.
  pub fn make_unavailable(&self, collection: &str) {
    self
      .unavailable
      .lock()
      .unwrap_or_else(|e| e.into_inner())
      .insert(collection.to_owned());
  }

  /// Whether a document exists for `collection`.
  pub fn contains(&self, collection: &str) -> bool {
    self
      .docs
      .lock()
      .unwrap_or_else(|e| e.into_inner())
      .contains_key(collection)
  }

  /// Number of `read_all` calls served so far.
  pub fn read_count(&self) -> usize { self.reads.load(Ordering::SeqCst) }
}

impl RecordStore for MemoryStore {
  type Error = Error;

  async fn read_all<E: Entity>(&self) -> Result<Vec<E>> {
    self.reads.fetch_add(1, Ordering::SeqCst);

    if self
      .unavailable
      .lock()
      .unwrap_or_else(|e| e.into_inner())
      .contains(E::COLLECTION)
    {
      return Err(Error::Unavailable(E::COLLECTION.to_owned()));
    }

    let docs = self.docs.lock().unwrap_or_else(|e| e.into_inner());
    Ok(
      docs
        .get(E::COLLECTION)
        .map(|bytes| decode_collection(E::COLLECTION, bytes))
        .unwrap_or_default(),
    )
  }

  async fn write_all<E: Entity>(&self, records: Vec<E>) -> Result<()> {
    let bytes = serde_json::to_vec(&records)?;
    self
      .docs
      .lock()
      .unwrap_or_else(|e| e.into_inner())
      .insert(E::COLLECTION.to_owned(), bytes);
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::record::{Citizen, WelfareProgram};

  #[tokio::test]
  async fn absent_document_reads_as_empty() {
    let s = MemoryStore::new();
    assert!(s.read_all::<Citizen>().await.unwrap().is_empty());
    assert_eq!(s.read_count(), 1);
  }

  #[tokio::test]
  async fn malformed_document_reads_as_empty() {
    let s = MemoryStore::new();
    s.put_raw("welfare_programs", "[{ this is not json");
    assert!(s.read_all::<WelfareProgram>().await.unwrap().is_empty());
  }

  #[tokio::test]
  async fn unavailable_collection_errors() {
    let s = MemoryStore::new();
    s.make_unavailable("citizens");
    assert!(matches!(
      s.read_all::<Citizen>().await,
      Err(Error::Unavailable(c)) if c == "citizens"
    ));
  }
}
