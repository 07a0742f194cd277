//! Backfill of the `isVisible` flag on records created before it existed.

use serde_json::Value;

use super::NormalizationStep;
use crate::models::{Record, RecordUpdate};

const VISIBILITY_FIELD: &str = "isVisible";

/// Step setting `isVisible: true` where the flag is missing.
#[derive(Debug, Clone, Copy, Default)]
pub struct VisibilityBackfill;

impl NormalizationStep for VisibilityBackfill {
  fn name(&self) -> &'static str {
    "visibility"
  }

  fn applies_to(&self, _collection: &str) -> bool {
    true
  }

  fn plan(&self, record: &Record) -> RecordUpdate {
    let mut update = RecordUpdate::default();
    if !record.contains_key(VISIBILITY_FIELD) {
      update.set(VISIBILITY_FIELD, Value::Bool(true));
    }
    update
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use serde_json::json;

  #[test]
  fn backfills_missing_flag_only() {
    let missing = json!({"_id": "a1"}).as_object().cloned().unwrap();
    assert_eq!(VisibilityBackfill.plan(&missing).set.get("isVisible"), Some(&json!(true)));

    let hidden = json!({"_id": "a1", "isVisible": false}).as_object().cloned().unwrap();
    assert!(VisibilityBackfill.plan(&hidden).is_empty());
  }
}
