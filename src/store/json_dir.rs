//! Document store backed by one JSON array file per collection.

use std::collections::BTreeSet;
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use serde_json::Value;
use tempfile::NamedTempFile;

use super::{DocumentStore, StoreError};
use crate::models::{Document, RecordUpdate, document_id};

/// Store reading and writing `<data_dir>/<collection>.json`.
///
/// Every update rewrites the collection file through a temporary file in the same
/// directory followed by a rename, so a crash never leaves a half-written collection.
#[derive(Debug, Clone)]
pub struct JsonDirStore {
  root: PathBuf,
}

impl JsonDirStore {
  /// Open a store rooted at `root`; the directory is created on first write.
  pub fn new(root: impl Into<PathBuf>) -> Self {
    Self { root: root.into() }
  }

  /// Directory holding the collection files.
  pub fn root(&self) -> &Path {
    &self.root
  }

  /// Path of the file backing `collection`.
  pub fn collection_path(&self, collection: &str) -> PathBuf {
    self.root.join(format!("{collection}.json"))
  }

  fn load_raw(&self, collection: &str) -> Result<Vec<Value>, StoreError> {
    let path = self.collection_path(collection);
    let content = match fs::read_to_string(&path) {
      Ok(content) => content,
      Err(err) if err.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
      Err(source) => return Err(StoreError::Io { path, source }),
    };

    serde_json::from_str(&content).map_err(|source| StoreError::Parse { path, source })
  }

  fn write_raw(&self, collection: &str, entries: &[Value]) -> Result<(), StoreError> {
    let path = self.collection_path(collection);
    let io_error = |source| StoreError::Io {
      path: path.clone(),
      source,
    };

    fs::create_dir_all(&self.root).map_err(io_error)?;
    let mut staged = NamedTempFile::new_in(&self.root).map_err(io_error)?;
    let text = serde_json::to_string_pretty(entries).map_err(|source| StoreError::Parse {
      path: path.clone(),
      source,
    })?;
    staged.write_all(text.as_bytes()).map_err(io_error)?;
    staged.write_all(b"\n").map_err(io_error)?;
    staged.as_file().sync_all().map_err(io_error)?;
    staged
      .persist(&path)
      .map_err(|err| io_error(err.error))?;
    Ok(())
  }
}

impl DocumentStore for JsonDirStore {
  /// Rejects entries that are not objects or whose `_id` is missing or repeated.
  fn find_all(&self, collection: &str) -> Result<Vec<Document>, StoreError> {
    let mut seen = BTreeSet::new();
    self
      .load_raw(collection)?
      .into_iter()
      .enumerate()
      .map(|(index, entry)| {
        let document = match entry {
          Value::Object(body) => Document::from_record(body),
          _ => None,
        };
        document
          .filter(|document| seen.insert(document.id.clone()))
          .ok_or_else(|| StoreError::InvalidDocument {
            collection: collection.to_string(),
            index,
          })
      })
      .collect()
  }

  fn update_one(
    &mut self,
    collection: &str,
    id: &str,
    update: &RecordUpdate,
  ) -> Result<(), StoreError> {
    let mut entries = self.load_raw(collection)?;
    let target = entries
      .iter_mut()
      .filter_map(Value::as_object_mut)
      .find(|body| document_id(body).as_deref() == Some(id))
      .ok_or_else(|| StoreError::NotFound {
        collection: collection.to_string(),
        id: id.to_string(),
      })?;

    update.apply_to(target);
    self.write_raw(collection, &entries)
  }
}
