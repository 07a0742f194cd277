//! Record-level asset URL rewriting onto (and back from) the canonical CDN prefix.

use std::borrow::Cow;

use serde_json::Value;

use super::NormalizationStep;
use crate::asset_paths::{AssetUrlRules, revert_asset_url, rewrite_asset_url};
use crate::models::{Record, RecordUpdate};

const SKILLS_FIELD: &str = "skills";
const SKILL_ICON_FIELD: &str = "iconUrl";

/// Step moving legacy asset paths onto the canonical CDN prefix.
#[derive(Debug, Clone)]
pub struct RewriteUrls {
  rules: AssetUrlRules,
  fields: Vec<String>,
}

impl RewriteUrls {
  /// Create the step for the top-level asset `fields`; skill icons are always included.
  pub fn new(rules: AssetUrlRules, fields: Vec<String>) -> Self {
    Self { rules, fields }
  }
}

impl NormalizationStep for RewriteUrls {
  fn name(&self) -> &'static str {
    "rewrite_urls"
  }

  fn applies_to(&self, _collection: &str) -> bool {
    true
  }

  fn plan(&self, record: &Record) -> RecordUpdate {
    plan_asset_fields(record, &self.fields, |url| rewrite_asset_url(url, &self.rules))
  }
}

/// Step restoring canonical CDN URLs to the legacy `/assets/` root.
#[derive(Debug, Clone)]
pub struct RevertCdnUrls {
  rules: AssetUrlRules,
  fields: Vec<String>,
}

impl RevertCdnUrls {
  /// Create the revert step over the same fields [`RewriteUrls`] touches.
  pub fn new(rules: AssetUrlRules, fields: Vec<String>) -> Self {
    Self { rules, fields }
  }
}

impl NormalizationStep for RevertCdnUrls {
  fn name(&self) -> &'static str {
    "revert_cdn"
  }

  fn applies_to(&self, _collection: &str) -> bool {
    true
  }

  fn plan(&self, record: &Record) -> RecordUpdate {
    plan_asset_fields(record, &self.fields, |url| revert_asset_url(url, &self.rules))
  }
}

/// Run `map_url` over top-level asset fields and `skills[].iconUrl`.
///
/// Only string values are considered. The full `skills` array is written back when any
/// icon changes.
fn plan_asset_fields<F>(record: &Record, fields: &[String], map_url: F) -> RecordUpdate
where
  F: for<'a> Fn(&'a str) -> Cow<'a, str>,
{
  let mut update = RecordUpdate::default();

  for field in fields {
    let Some(current) = record.get(field).and_then(Value::as_str) else {
      continue;
    };
    let mapped = map_url(current);
    if mapped != current {
      update.set(field.clone(), mapped.into_owned());
    }
  }

  if let Some(skills) = record.get(SKILLS_FIELD).and_then(Value::as_array) {
    let mut changed = false;
    let rewritten: Vec<Value> = skills
      .iter()
      .map(|skill| {
        let Some(icon) = skill.get(SKILL_ICON_FIELD).and_then(Value::as_str) else {
          return skill.clone();
        };
        let mapped = map_url(icon);
        if mapped == icon {
          return skill.clone();
        }

        changed = true;
        let mut skill = skill.clone();
        if let Some(object) = skill.as_object_mut() {
          object.insert(SKILL_ICON_FIELD.to_string(), Value::String(mapped.into_owned()));
        }
        skill
      })
      .collect();

    if changed {
      update.set(SKILLS_FIELD, Value::Array(rewritten));
    }
  }

  update
}
