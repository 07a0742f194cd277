//! Storage boundary: collections of mutable JSON documents addressed by `_id`.

mod json_dir;
mod memory;

use std::path::PathBuf;

use thiserror::Error;

use crate::models::{Document, RecordUpdate};

pub use json_dir::JsonDirStore;
pub use memory::MemoryStore;

/// Errors raised by document stores.
#[derive(Debug, Error)]
pub enum StoreError {
  /// Failed to read or write a collection file.
  #[error("failed to access {}: {source}", path.display())]
  Io {
    /// Path that caused the error.
    path: PathBuf,
    /// Source I/O error.
    source: std::io::Error,
  },
  /// A collection file is not valid JSON.
  #[error("failed to parse {}: {source}", path.display())]
  Parse {
    /// Path that caused the error.
    path: PathBuf,
    /// Source parse error.
    source: serde_json::Error,
  },
  /// A stored entry is not an object with a usable, unique `_id`.
  #[error("invalid document at index {index} in collection `{collection}`")]
  InvalidDocument {
    /// Collection the entry belongs to.
    collection: String,
    /// Position of the entry in the collection.
    index: usize,
  },
  /// The addressed document does not exist.
  #[error("document `{id}` not found in collection `{collection}`")]
  NotFound {
    /// Collection that was searched.
    collection: String,
    /// Identifier that was requested.
    id: String,
  },
  /// The store refused the write.
  #[error("write rejected for `{id}` in collection `{collection}`: {reason}")]
  Rejected {
    /// Collection being written.
    collection: String,
    /// Identifier being written.
    id: String,
    /// Store-specific reason.
    reason: String,
  },
}

/// Minimal find/update surface the migration driver needs.
///
/// Each `update_one` call must be atomic for the addressed document; no atomicity is
/// expected across documents.
pub trait DocumentStore {
  /// Read every document in `collection`; a missing collection is empty.
  fn find_all(&self, collection: &str) -> Result<Vec<Document>, StoreError>;

  /// Apply a partial update to the document addressed by `id`.
  fn update_one(
    &mut self,
    collection: &str,
    id: &str,
    update: &RecordUpdate,
  ) -> Result<(), StoreError>;
}
