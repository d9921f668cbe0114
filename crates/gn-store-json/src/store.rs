//! [`JsonStore`], the on-disk implementation of [`RecordStore`].

use std::{
  io::ErrorKind,
  path::{Path, PathBuf},
  sync::Arc,
};

use gn_core::{
  record::Entity,
  store::{RecordStore, decode_collection},
};

use uuid::Uuid;

use crate::{Error, Result};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A registry store backed by a directory of JSON array documents.
///
/// Cloning is cheap; the directory path is reference-counted.
#[derive(Debug, Clone)]
pub struct JsonStore {
  dir: Arc<PathBuf>,
}

impl JsonStore {
  /// Open a store rooted at `dir`, creating the directory if needed.
  pub async fn open(dir: impl AsRef<Path>) -> Result<Self> {
    let dir = dir.as_ref().to_path_buf();
    tokio::fs::create_dir_all(&dir)
      .await
      .map_err(Error::io(&dir))?;
    tracing::debug!(?dir, "opened json store");
    Ok(Self { dir: Arc::new(dir) })
  }

  pub fn dir(&self) -> &Path { &self.dir }

  /// Location of the document backing `collection`.
  pub fn path_for(&self, collection: &str) -> PathBuf {
    self.dir.join(format!("{collection}.json"))
  }

  /// Where an unreadable document is copied before it is overwritten.
  pub fn backup_path_for(&self, collection: &str) -> PathBuf {
    self.dir.join(format!("{collection}.json.bak"))
  }

  /// Reads treat a malformed document as empty, so the next write would
  /// silently drop its contents. Copy it aside first.
  async fn keep_unreadable<E: Entity>(&self, path: &Path) -> Result<()> {
    let existing = match tokio::fs::read(path).await {
      Ok(bytes) => bytes,
      Err(e) if e.kind() == ErrorKind::NotFound => return Ok(()),
      Err(e) => return Err(Error::io(path)(e)),
    };
    if serde_json::from_slice::<Vec<E>>(&existing).is_ok() {
      return Ok(());
    }

    let backup = self.backup_path_for(E::COLLECTION);
    tokio::fs::write(&backup, &existing)
      .await
      .map_err(Error::io(&backup))?;
    tracing::warn!(
      collection = E::COLLECTION,
      ?backup,
      "overwriting unreadable collection document; previous contents kept"
    );
    Ok(())
  }
}

// ─── RecordStore impl ────────────────────────────────────────────────────────

impl RecordStore for JsonStore {
  type Error = Error;

  async fn read_all<E: Entity>(&self) -> Result<Vec<E>> {
    let path = self.path_for(E::COLLECTION);
    match tokio::fs::read(&path).await {
      Ok(bytes) => Ok(decode_collection(E::COLLECTION, &bytes)),
      Err(e) if e.kind() == ErrorKind::NotFound => Ok(Vec::new()),
      Err(e) => Err(Error::io(path)(e)),
    }
  }

  async fn write_all<E: Entity>(&self, records: Vec<E>) -> Result<()> {
    let path = self.path_for(E::COLLECTION);
    let bytes = serde_json::to_vec_pretty(&records)?;

    self.keep_unreadable::<E>(&path).await?;

    // Each writer gets its own temp file beside the target, then renames
    // over it. Concurrent writers to one collection never share a temp path.
    let tmp = self
      .dir
      .join(format!(".{}.{}.json.tmp", E::COLLECTION, Uuid::new_v4()));
    tokio::fs::write(&tmp, &bytes)
      .await
      .map_err(Error::io(&tmp))?;
    if let Err(e) = tokio::fs::rename(&tmp, &path).await {
      let _ = tokio::fs::remove_file(&tmp).await;
      return Err(Error::io(&path)(e));
    }

    tracing::debug!(
      collection = E::COLLECTION,
      records = records.len(),
      bytes = bytes.len(),
      "collection written"
    );
    Ok(())
  }
}
