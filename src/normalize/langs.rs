//! Repair of localized text slots that hold Chinese text under another language code.

use serde_json::{Map, Value};

use super::{CHARACTERS, NormalizationStep};
use crate::models::{ID_FIELD, Language, LocalizedText, Record, RecordUpdate};

/// Returns `true` when `text` contains a CJK unified ideograph (U+4E00..=U+9FA5).
pub fn contains_cjk(text: &str) -> bool {
  text.chars().any(|c| ('\u{4e00}'..='\u{9fa5}').contains(&c))
}

/// Replacement for `map[target]` when it holds Chinese text.
///
/// Returns the first non-empty value among `priority` that is free of Chinese text
/// (skipping `target` itself), or `None` when the slot is fine, no clean fallback exists
/// or the fallback equals the current value.
pub fn resolve_fallback(
  map: &Map<String, Value>,
  target: Language,
  priority: &[Language],
) -> Option<String> {
  let current = map.get(target.code()).and_then(Value::as_str)?;
  if target == Language::Cn || !contains_cjk(current) {
    return None;
  }

  let text = LocalizedText::new(map);
  priority
    .iter()
    .copied()
    .filter(|language| *language != target)
    .filter_map(|language| text.get(language))
    .find(|candidate| !contains_cjk(candidate))
    .filter(|candidate| *candidate != current)
    .map(str::to_string)
}

/// Step replacing Chinese text found in non-Chinese slots with a fallback language.
#[derive(Debug, Clone)]
pub struct LanguageFallback {
  targets: Vec<Language>,
  priority: Vec<Language>,
}

impl LanguageFallback {
  /// Create a resolver checking `targets` and falling back through `priority`.
  pub fn new(targets: Vec<Language>, priority: Vec<Language>) -> Self {
    Self {
      targets: targets
        .into_iter()
        .filter(|language| *language != Language::Cn)
        .collect(),
      priority,
    }
  }

  fn repair(&self, value: &mut Value) -> bool {
    match value {
      Value::Object(map) => {
        let mut changed = self.repair_map(map);
        for child in map.values_mut() {
          changed |= self.repair(child);
        }
        changed
      }
      Value::Array(items) => {
        let mut changed = false;
        for item in items.iter_mut() {
          changed |= self.repair(item);
        }
        changed
      }
      _ => false,
    }
  }

  fn repair_map(&self, map: &mut Map<String, Value>) -> bool {
    let mut changed = false;
    for target in &self.targets {
      if let Some(fallback) = resolve_fallback(map, *target, &self.priority) {
        map.insert(target.code().to_string(), Value::String(fallback));
        changed = true;
      }
    }
    changed
  }
}

impl Default for LanguageFallback {
  fn default() -> Self {
    Self::new(vec![Language::Pt], vec![Language::En, Language::Es])
  }
}

impl NormalizationStep for LanguageFallback {
  fn name(&self) -> &'static str {
    "language_fallback"
  }

  fn applies_to(&self, collection: &str) -> bool {
    collection == CHARACTERS
  }

  fn plan(&self, record: &Record) -> RecordUpdate {
    let mut update = RecordUpdate::default();
    for (field, value) in record {
      if field == ID_FIELD || !matches!(value, Value::Object(_) | Value::Array(_)) {
        continue;
      }

      let mut repaired = value.clone();
      if self.repair(&mut repaired) {
        update.set(field.clone(), repaired);
      }
    }
    update
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

  fn priority() -> Vec<Language> {
    vec![Language::En, Language::Es]
  }

  #[test]
  fn detects_cjk_ideographs_only() {
    assert!(contains_cjk("天马流星拳"));
    assert!(contains_cjk("Ataque 攻击"));
    assert!(!contains_cjk("Meteoro de Pégaso"));
    assert!(!contains_cjk("ペガサス"));
    assert!(!contains_cjk("หน้า"));
  }

  #[test]
  fn falls_back_to_english_first() {
    let map = record(json!({"en": "Pegasus Meteor", "es": "Meteoro", "pt": "天马流星拳"}));
    assert_eq!(
      resolve_fallback(&map, Language::Pt, &priority()),
      Some("Pegasus Meteor".to_string())
    );
  }

  #[test]
  fn falls_back_to_spanish_when_english_is_empty() {
    let map = record(json!({"en": "", "es": "Meteoro", "pt": "天马流星拳"}));
    assert_eq!(
      resolve_fallback(&map, Language::Pt, &priority()),
      Some("Meteoro".to_string())
    );
  }

  #[test]
  fn skips_fallbacks_that_are_also_chinese() {
    let map = record(json!({"en": "攻击", "es": "Golpe", "pt": "攻击"}));
    assert_eq!(
      resolve_fallback(&map, Language::Pt, &priority()),
      Some("Golpe".to_string())
    );

    let map = record(json!({"en": "", "es": "攻击", "pt": "攻击"}));
    assert_eq!(resolve_fallback(&map, Language::Pt, &priority()), None);
  }

  #[test]
  fn mixed_script_english_is_not_a_fallback() {
    let map = record(json!({"en": "Pegasus 天马", "pt": "天马流星拳"}));
    assert_eq!(resolve_fallback(&map, Language::Pt, &priority()), None);
  }

  #[test]
  fn second_plan_is_empty_once_applied() {
    let step = LanguageFallback::default();
    let mut record = record(json!({
      "_id": "c1",
      "skills": [
        {"description": {"en": "Pegasus 天马", "pt": "天马流星拳"}},
        {"description": {"en": "", "es": "攻击", "pt": "攻击"}},
        {"description": {"en": "Strike", "pt": "攻击"}}
      ]
    }));

    let first = step.plan(&record);
    assert_eq!(first.touched_fields(), vec!["skills"]);
    first.apply_to(&mut record);
    assert_eq!(record["skills"][0]["description"]["pt"], json!("天马流星拳"));
    assert_eq!(record["skills"][2]["description"]["pt"], json!("Strike"));

    assert!(step.plan(&record).is_empty());
  }

  #[test]
  fn repairs_maps_with_unknown_language_keys() {
    let step = LanguageFallback::default();
    let record = record(json!({
      "skills": [{"description": {"en": "Strike", "kr": "공격", "pt": "攻击"}}]
    }));
    let update = step.plan(&record);
    assert_eq!(update.set["skills"][0]["description"]["pt"], json!("Strike"));
    assert_eq!(update.set["skills"][0]["description"]["kr"], json!("공격"));
  }

  #[test]
  fn keeps_value_without_fallback() {
    let map = record(json!({"en": "", "pt": "天马流星拳"}));
    assert_eq!(resolve_fallback(&map, Language::Pt, &priority()), None);
  }

  #[test]
  fn ignores_clean_and_chinese_slots() {
    let clean = record(json!({"en": "Strike", "pt": "Golpe"}));
    assert_eq!(resolve_fallback(&clean, Language::Pt, &priority()), None);

    let chinese = record(json!({"en": "Strike", "cn": "攻击"}));
    assert_eq!(resolve_fallback(&chinese, Language::Cn, &priority()), None);
  }

  #[test]
  fn repairs_nested_skill_and_level_descriptions() {
    let step = LanguageFallback::default();
    let record = record(json!({
      "_id": "c1",
      "name": {"en": "Seiya", "pt": "Seiya"},
      "skills": [
        {
          "iconUrl": "x.png",
          "description": {"en": "Strike", "pt": "攻击"},
          "levels": [
            {"level": 1, "description": {"en": "", "es": "Golpe", "pt": "攻击"}},
            {"level": 2, "description": {"en": "Strike II", "pt": "Golpe II"}}
          ]
        }
      ]
    }));

    let update = step.plan(&record);
    assert_eq!(update.touched_fields(), vec!["skills"]);

    let skills = &update.set["skills"];
    assert_eq!(skills[0]["description"]["pt"], json!("Strike"));
    assert_eq!(skills[0]["levels"][0]["description"]["pt"], json!("Golpe"));
    assert_eq!(skills[0]["levels"][1]["description"]["pt"], json!("Golpe II"));
    assert_eq!(skills[0]["iconUrl"], json!("x.png"));
  }

  #[test]
  fn clean_records_produce_no_update() {
    let step = LanguageFallback::default();
    let record = record(json!({
      "_id": "c1",
      "skills": [{"description": {"en": "Strike", "pt": "Golpe", "cn": "攻击"}}]
    }));
    assert!(step.plan(&record).is_empty());
  }

  #[test]
  fn chinese_is_never_a_target() {
    let step = LanguageFallback::new(vec![Language::Cn, Language::Fr], priority());
    let record = record(json!({
      "skills": [{"description": {"en": "Strike", "fr": "攻击", "cn": "攻击"}}]
    }));
    let update = step.plan(&record);
    assert_eq!(update.set["skills"][0]["description"]["fr"], json!("Strike"));
    assert_eq!(update.set["skills"][0]["description"]["cn"], json!("攻击"));
  }
}
