//! In-process document store.

use std::collections::{BTreeMap, BTreeSet};

use super::{DocumentStore, StoreError};
use crate::models::{Document, Record, RecordUpdate};

/// Document store kept entirely in memory.
///
/// Writes to ids registered with [`MemoryStore::reject_writes_to`] fail, which lets callers
/// exercise partial-run behaviour.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
  collections: BTreeMap<String, Vec<Document>>,
  rejected: BTreeSet<(String, String)>,
  writes: usize,
}

impl MemoryStore {
  /// Create an empty store.
  pub fn new() -> Self {
    Self::default()
  }

  /// Insert records into `collection`; entries without an `_id` are skipped.
  pub fn insert_many(&mut self, collection: &str, records: impl IntoIterator<Item = Record>) {
    let documents = self.collections.entry(collection.to_string()).or_default();
    documents.extend(records.into_iter().filter_map(Document::from_record));
  }

  /// Make every future write to `id` in `collection` fail.
  pub fn reject_writes_to(&mut self, collection: &str, id: &str) {
    self
      .rejected
      .insert((collection.to_string(), id.to_string()));
  }

  /// Look a single document up.
  pub fn get(&self, collection: &str, id: &str) -> Option<&Record> {
    self
      .collections
      .get(collection)?
      .iter()
      .find(|document| document.id == id)
      .map(|document| &document.body)
  }

  /// Number of successful `update_one` calls.
  pub fn writes(&self) -> usize {
    self.writes
  }
}

impl DocumentStore for MemoryStore {
  fn find_all(&self, collection: &str) -> Result<Vec<Document>, StoreError> {
    Ok(self.collections.get(collection).cloned().unwrap_or_default())
  }

  fn update_one(
    &mut self,
    collection: &str,
    id: &str,
    update: &RecordUpdate,
  ) -> Result<(), StoreError> {
    if self
      .rejected
      .contains(&(collection.to_string(), id.to_string()))
    {
      return Err(StoreError::Rejected {
        collection: collection.to_string(),
        id: id.to_string(),
        reason: "write rejected by test hook".into(),
      });
    }

    let document = self
      .collections
      .get_mut(collection)
      .and_then(|documents| documents.iter_mut().find(|document| document.id == id))
      .ok_or_else(|| StoreError::NotFound {
        collection: collection.to_string(),
        id: id.to_string(),
      })?;

    update.apply_to(&mut document.body);
    self.writes += 1;
    Ok(())
  }
}
