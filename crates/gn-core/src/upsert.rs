//! The replace-by-key rule shared by every collection.
//!
//! Collections are ordered sets keyed by one identity field. A write removes
//! any record already holding the key and appends the new one, so an updated
//! record moves to the end of the collection.

/// Remove every record whose key equals `key_of(&new_record)`, then append
/// `new_record`.
pub fn upsert<T, K, F>(mut records: Vec<T>, new_record: T, key_of: F) -> Vec<T>
where
  K: PartialEq,
  F: Fn(&T) -> K,
{
  let key = key_of(&new_record);
  records.retain(|r| key_of(r) != key);
  records.push(new_record);
  records
}

/// Remove every record whose key equals `key`. Returns the remaining records
/// and whether anything was removed.
pub fn remove_by_key<T, K, F>(
  mut records: Vec<T>,
  key: &K,
  key_of: F,
) -> (Vec<T>, bool)
where
  K: PartialEq + ?Sized,
  F: Fn(&T) -> &K,
{
  let before = records.len();
  records.retain(|r| key_of(r) != key);
  let removed = records.len() != before;
  (records, removed)
}
