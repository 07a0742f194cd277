//! Normalized lookup keys derived from free-text category fields.

use std::collections::BTreeMap;

use serde_json::Value;

use super::{CHARACTERS, NormalizationStep};
use crate::models::{Language, LocalizedText, Record, RecordUpdate};

/// Key written when the source category is absent.
pub const DEFAULT_KEY: &str = "other";

/// Source field and derived key for each filter.
const KEY_SOURCES: [(&str, &str); 3] = [
  ("faction", "factionKey"),
  ("combatPosition", "roleKey"),
  ("attackType", "attackTypeKey"),
];

const EXTERNAL_ID_FIELD: &str = "id";

/// Lowercase, trim and join whitespace-separated words with single hyphens.
///
/// `"Gold Saints"` becomes `"gold-saints"`.
pub fn slugify(text: &str) -> String {
  text
    .to_lowercase()
    .split_whitespace()
    .collect::<Vec<_>>()
    .join("-")
}

/// Step deriving `factionKey`, `roleKey` and `attackTypeKey`.
#[derive(Debug, Clone, Default)]
pub struct FilterKeys {
  faction_overrides: BTreeMap<String, String>,
}

impl FilterKeys {
  /// Create the step with per-record faction keys keyed by external id.
  pub fn new(faction_overrides: BTreeMap<String, String>) -> Self {
    Self { faction_overrides }
  }

  /// Derive the three keys for a record, or `None` when none of the source fields exist.
  pub fn derive(&self, record: &Record) -> Option<[(&'static str, String); 3]> {
    if KEY_SOURCES
      .iter()
      .all(|(source, _)| !record.contains_key(*source))
    {
      return None;
    }

    let override_key = external_id(record).and_then(|id| self.faction_overrides.get(&id));
    Some(KEY_SOURCES.map(|(source, key)| {
      let value = match (source, override_key) {
        ("faction", Some(forced)) => forced.clone(),
        _ => LocalizedText::field(record, source)
          .and_then(|text| text.get(Language::En))
          .map(slugify)
          .filter(|slug| !slug.is_empty())
          .unwrap_or_else(|| DEFAULT_KEY.to_string()),
      };
      (key, value)
    }))
  }
}

fn external_id(record: &Record) -> Option<String> {
  match record.get(EXTERNAL_ID_FIELD)? {
    Value::String(value) => Some(value.trim().to_string()),
    Value::Number(value) => Some(value.to_string()),
    _ => None,
  }
}

impl NormalizationStep for FilterKeys {
  fn name(&self) -> &'static str {
    "filter_keys"
  }

  fn applies_to(&self, collection: &str) -> bool {
    collection == CHARACTERS
  }

  fn plan(&self, record: &Record) -> RecordUpdate {
    let mut update = RecordUpdate::default();
    let Some(keys) = self.derive(record) else {
      return update;
    };

    for (key, value) in keys {
      if record.get(key).and_then(Value::as_str) != Some(value.as_str()) {
        update.set(key, value);
      }
    }
    update
  }
}
