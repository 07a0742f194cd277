//! Data structures shared by the normalization steps, the stores and the driver.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Loosely-typed stored entity (character, artifact, force card or news item).
pub type Record = Map<String, Value>;

/// Field holding the internal storage identifier of a document.
pub const ID_FIELD: &str = "_id";

/// A stored record together with its internal identifier.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
  /// Internal identifier used to address the document in its collection.
  pub id: String,
  /// Full document body, including the identifier field.
  pub body: Record,
}

impl Document {
  /// Build a document from a raw JSON object, reading the identifier from `_id`.
  ///
  /// Numeric identifiers are accepted and stringified. Objects without an identifier
  /// yield `None`.
  pub fn from_record(body: Record) -> Option<Self> {
    let id = document_id(&body)?;
    Some(Self { id, body })
  }
}

/// Identifier stored in a record's `_id` field, if usable.
pub fn document_id(record: &Record) -> Option<String> {
  match record.get(ID_FIELD)? {
    Value::String(value) if !value.is_empty() => Some(value.clone()),
    Value::Number(value) => Some(value.to_string()),
    _ => None,
  }
}

/// Partial update computed for a single record.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordUpdate {
  /// Fields to overwrite with new values.
  pub set: Map<String, Value>,
  /// Fields to remove from the record.
  pub unset: Vec<String>,
}

impl RecordUpdate {
  /// Returns `true` when applying the update would not touch the record.
  pub fn is_empty(&self) -> bool {
    self.set.is_empty() && self.unset.is_empty()
  }

  /// Queue a field overwrite.
  pub fn set(&mut self, field: impl Into<String>, value: impl Into<Value>) {
    let field = field.into();
    self.unset.retain(|existing| existing != &field);
    self.set.insert(field, value.into());
  }

  /// Queue a field removal.
  pub fn unset(&mut self, field: impl Into<String>) {
    let field = field.into();
    self.set.remove(&field);
    if !self.unset.contains(&field) {
      self.unset.push(field);
    }
  }

  /// Fold another update into this one; later operations win on conflicting fields.
  pub fn merge(&mut self, other: RecordUpdate) {
    for (field, value) in other.set {
      self.set(field, value);
    }
    for field in other.unset {
      self.unset(field);
    }
  }

  /// Apply the update to a record in place.
  pub fn apply_to(&self, record: &mut Record) {
    for (field, value) in &self.set {
      record.insert(field.clone(), value.clone());
    }
    for field in &self.unset {
      record.remove(field);
    }
  }

  /// Names of every field the update touches, in application order.
  pub fn touched_fields(&self) -> Vec<&str> {
    self
      .set
      .keys()
      .map(String::as_str)
      .chain(self.unset.iter().map(String::as_str))
      .collect()
  }
}

/// Coarse positional category used for team-slot placement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Row {
  /// Front line.
  Front,
  /// Middle line.
  Mid,
  /// Back line.
  Back,
}

impl Row {
  /// Stored string form of the row.
  pub fn as_str(self) -> &'static str {
    match self {
      Self::Front => "front",
      Self::Mid => "mid",
      Self::Back => "back",
    }
  }
}

impl fmt::Display for Row {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

/// Language codes used as keys in localized maps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
  /// English.
  En,
  /// Portuguese.
  Pt,
  /// Spanish.
  Es,
  /// French.
  Fr,
  /// Simplified Chinese.
  Cn,
  /// Indonesian.
  Id,
  /// Thai.
  Th,
}

impl Language {
  /// Every supported language, in display order.
  pub const ALL: [Language; 7] = [
    Self::En,
    Self::Pt,
    Self::Es,
    Self::Fr,
    Self::Cn,
    Self::Id,
    Self::Th,
  ];

  /// Key used for this language inside a localized map.
  pub fn code(self) -> &'static str {
    match self {
      Self::En => "en",
      Self::Pt => "pt",
      Self::Es => "es",
      Self::Fr => "fr",
      Self::Cn => "cn",
      Self::Id => "id",
      Self::Th => "th",
    }
  }

  /// Look a language up by its map key.
  pub fn from_code(code: &str) -> Option<Self> {
    Self::ALL.into_iter().find(|language| language.code() == code)
  }
}

/// Read-only view over a multi-language map.
#[derive(Debug, Clone, Copy)]
pub struct LocalizedText<'a> {
  map: &'a Map<String, Value>,
}

impl<'a> LocalizedText<'a> {
  /// Borrow `record[field]` as a localized map when it is a JSON object.
  pub fn field(record: &'a Record, field: &str) -> Option<Self> {
    record.get(field).and_then(Value::as_object).map(Self::new)
  }

  /// Wrap an already extracted JSON object.
  pub fn new(map: &'a Map<String, Value>) -> Self {
    Self { map }
  }

  /// Text stored for `language`; non-string and empty entries count as absent.
  pub fn get(&self, language: Language) -> Option<&'a str> {
    self
      .map
      .get(language.code())
      .and_then(Value::as_str)
      .filter(|text| !text.trim().is_empty())
  }

  /// Every non-empty text value in the map, in stored order.
  pub fn values(self) -> impl Iterator<Item = &'a str> + 'a {
    self
      .map
      .values()
      .filter_map(Value::as_str)
      .filter(|text| !text.trim().is_empty())
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use serde_json::json;

  fn record(value: Value) -> Record {
    match value {
      Value::Object(map) => map,
      _ => panic!("fixture must be an object"),
    }
  }

  #[test]
  fn documents_require_an_identifier() {
    assert!(Document::from_record(record(json!({"name": "Seiya"}))).is_none());
    assert!(Document::from_record(record(json!({"_id": ""}))).is_none());

    let numeric = Document::from_record(record(json!({"_id": 42}))).unwrap();
    assert_eq!(numeric.id, "42");
  }

  #[test]
  fn later_operations_win_when_merging() {
    let mut first = RecordUpdate::default();
    first.set("row", "front");
    first.unset("faction");

    let mut second = RecordUpdate::default();
    second.set("faction", "athena");
    second.unset("row");

    first.merge(second);
    assert_eq!(first.set.get("faction"), Some(&json!("athena")));
    assert!(!first.set.contains_key("row"));
    assert_eq!(first.unset, vec!["row".to_string()]);
  }

  #[test]
  fn applies_set_and_unset() {
    let mut target = record(json!({"_id": "a", "row": "front", "positioning": {"en": "Back"}}));
    let mut update = RecordUpdate::default();
    update.set("row", "back");
    update.unset("positioning");
    update.apply_to(&mut target);

    assert_eq!(target, record(json!({"_id": "a", "row": "back"})));
  }

  #[test]
  fn localized_text_ignores_blank_entries() {
    let map = record(json!({"en": "  ", "pt": "Guarda", "cn": 3}));
    let text = LocalizedText::new(&map);
    assert_eq!(text.get(Language::En), None);
    assert_eq!(text.get(Language::Pt), Some("Guarda"));
    assert_eq!(text.get(Language::Cn), None);
    assert_eq!(text.values().collect::<Vec<_>>(), vec!["Guarda"]);
  }

  #[test]
  fn looks_languages_up_by_code() {
    assert_eq!(Language::from_code("th"), Some(Language::Th));
    assert_eq!(Language::from_code("kr"), None);
  }

  #[test]
  fn rows_serialise_lowercase() {
    assert_eq!(serde_json::to_value(Row::Mid).unwrap(), json!("mid"));
    assert_eq!(Row::Back.to_string(), "back");
  }
}
