//! The `RecordStore` trait and the read-modify-write helpers built on it.
//!
//! A store maps each collection name to one JSON array document. The only
//! primitives are a full read and a full overwrite; lookup, upsert and
//! delete are read-modify-write passes over the whole document.

use std::future::Future;

use serde::de::DeserializeOwned;

use crate::{
  record::Entity,
  upsert::{remove_by_key, upsert},
};

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Abstraction over a registry storage backend.
///
/// Backends return an empty collection when the document is absent or does
/// not parse. Errors are reserved for faults reading or writing a document
/// that does exist.
pub trait RecordStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Read every record of `E`'s collection, in stored order.
  fn read_all<E: Entity>(
    &self,
  ) -> impl Future<Output = Result<Vec<E>, Self::Error>> + Send + '_;

  /// Replace `E`'s collection document with `records`.
  fn write_all<E: Entity>(
    &self,
    records: Vec<E>,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;
}

// ─── Decoding ────────────────────────────────────────────────────────────────

/// Parse a collection document. A document that is not a JSON array of `T`
/// yields an empty collection and a warning.
pub fn decode_collection<T: DeserializeOwned>(
  collection: &str,
  bytes: &[u8],
) -> Vec<T> {
  match serde_json::from_slice::<Vec<T>>(bytes) {
    Ok(records) => records,
    Err(e) => {
      tracing::warn!(
        collection,
        error = %e,
        "malformed collection document; treating as empty"
      );
      Vec::new()
    }
  }
}

// ─── Read-modify-write helpers ───────────────────────────────────────────────

/// Find the record of `E` whose key equals `key`.
pub async fn find_record<S, E>(store: &S, key: &str) -> Result<Option<E>, S::Error>
where
  S: RecordStore,
  E: Entity,
{
  let records = store.read_all::<E>().await?;
  Ok(records.into_iter().find(|r| r.key() == key))
}

/// Insert or replace `record` by key and persist the collection. Returns the
/// stored record.
pub async fn upsert_record<S, E>(store: &S, record: E) -> Result<E, S::Error>
where
  S: RecordStore,
  E: Entity,
{
  let records = store.read_all::<E>().await?;
  let records = upsert(records, record.clone(), |r: &E| r.key().to_owned());
  store.write_all(records).await?;
  tracing::info!(collection = E::COLLECTION, key = record.key(), "record saved");
  Ok(record)
}

/// Remove the record of `E` keyed by `key`. Returns whether it existed; the
/// document is only rewritten when something was removed.
pub async fn delete_record<S, E>(store: &S, key: &str) -> Result<bool, S::Error>
where
  S: RecordStore,
  E: Entity,
{
  let records = store.read_all::<E>().await?;
  let (records, removed) = remove_by_key(records, key, |r: &E| r.key());
  if removed {
    store.write_all(records).await?;
    tracing::info!(collection = E::COLLECTION, key, "record deleted");
  }
  Ok(removed)
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::{
    memory::MemoryStore,
    record::{Citizen, Household},
  };

  fn citizen(nic: &str, name: &str) -> Citizen {
    Citizen {
      nic: nic.into(),
      full_name: name.into(),
      ..Default::default()
    }
  }

  #[test]
  fn decode_rejects_non_arrays_as_empty() {
    let rows: Vec<Citizen> = decode_collection("citizens", br#"{"nic":"x"}"#);
    assert!(rows.is_empty());
    let rows: Vec<Citizen> = decode_collection("citizens", b"not json");
    assert!(rows.is_empty());
  }

  #[tokio::test]
  async fn upsert_then_find() {
    let s = MemoryStore::new();
    upsert_record(&s, citizen("123456789V", "John Doe")).await.unwrap();
    upsert_record(&s, citizen("987654321V", "Jane Roe")).await.unwrap();
    upsert_record(&s, citizen("123456789V", "John A. Doe")).await.unwrap();

    let all = s.read_all::<Citizen>().await.unwrap();
    assert_eq!(all.len(), 2);
    assert_eq!(all[1].full_name, "John A. Doe");

    let found: Option<Citizen> = find_record(&s, "987654321V").await.unwrap();
    assert_eq!(found.unwrap().full_name, "Jane Roe");
  }

  #[tokio::test]
  async fn delete_missing_key_does_not_rewrite() {
    let s = MemoryStore::new();
    let removed = delete_record::<_, Household>(&s, "nope").await.unwrap();
    assert!(!removed);
    assert!(!s.contains(Household::COLLECTION));
  }

  #[tokio::test]
  async fn delete_existing_key() {
    let s = MemoryStore::new();
    upsert_record(&s, citizen("123456789V", "John Doe")).await.unwrap();
    assert!(delete_record::<_, Citizen>(&s, "123456789V").await.unwrap());
    assert!(s.read_all::<Citizen>().await.unwrap().is_empty());
  }
}
