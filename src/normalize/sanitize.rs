//! Removal of deprecated duplicate localized fields.

use super::{CHARACTERS, NormalizationStep};
use crate::models::{ID_FIELD, Record, RecordUpdate};

/// Step unsetting deprecated fields that are still present on a record.
#[derive(Debug, Clone)]
pub struct FieldSanitizer {
  fields: Vec<String>,
}

impl FieldSanitizer {
  /// Create a sanitizer removing `fields`; the identifier field is never removed.
  pub fn new(fields: Vec<String>) -> Self {
    Self {
      fields: fields
        .into_iter()
        .map(|field| field.trim().to_string())
        .filter(|field| !field.is_empty() && field != ID_FIELD)
        .collect(),
    }
  }
}

impl NormalizationStep for FieldSanitizer {
  fn name(&self) -> &'static str {
    "sanitize"
  }

  fn applies_to(&self, collection: &str) -> bool {
    collection == CHARACTERS
  }

  fn plan(&self, record: &Record) -> RecordUpdate {
    let mut update = RecordUpdate::default();
    for field in &self.fields {
      if record.contains_key(field) {
        update.unset(field.clone());
      }
    }
    update
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use serde_json::{Value, json};

  fn record(value: Value) -> Record {
    match value {
      Value::Object(map) => map,
      _ => panic!("fixture must be an object"),
    }
  }

  #[test]
  fn unsets_present_fields_only() {
    let step = FieldSanitizer::new(vec!["faction".into(), "positioning".into()]);
    let record = record(json!({"_id": "c1", "faction": {"en": "Athena"}, "row": "front"}));

    let update = step.plan(&record);
    assert!(update.set.is_empty());
    assert_eq!(update.unset, vec!["faction".to_string()]);
  }

  #[test]
  fn never_removes_identifier() {
    let step = FieldSanitizer::new(vec!["_id".into(), " ".into()]);
    assert!(step.plan(&record(json!({"_id": "c1"}))).is_empty());
  }

  #[test]
  fn sanitized_record_is_stable() {
    let step = FieldSanitizer::new(vec!["attackType".into()]);
    let mut target = record(json!({"_id": "c1", "attackType": {"en": "P-ATK"}}));
    step.plan(&target).apply_to(&mut target);
    assert!(step.plan(&target).is_empty());
  }
}
