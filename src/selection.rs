//! Helpers used to filter which (collection, step) pairs a migration run touches.

use std::collections::BTreeSet;

/// Trait describing selection filters for migration runs.
pub trait StepInclusion {
  /// Returns `true` when `step` should run against `collection`.
  fn is_included(&self, collection: &str, step: &str) -> bool;
}

/// Include/exclude rules scoped as `collection` or `collection/step`.
///
/// Exclusions always win. With no include rules every pair not excluded runs.
#[derive(Debug, Clone, Default)]
pub struct StepSelection {
  include: Option<BTreeSet<String>>,
  exclude: BTreeSet<String>,
}

impl StepSelection {
  /// Build a selection from raw rule lists.
  pub fn new(
    include: impl IntoIterator<Item = String>,
    exclude: impl IntoIterator<Item = String>,
  ) -> Self {
    let include = normalise_list(include);
    let exclude = normalise_list(exclude);

    Self {
      include: (!include.is_empty()).then_some(include),
      exclude,
    }
  }

  /// Determine whether `step` runs against `collection`.
  pub fn is_included(&self, collection: &str, step: &str) -> bool {
    let candidate = format!("{collection}/{step}");
    if self
      .exclude
      .iter()
      .any(|value| scope_matches(value, &candidate))
    {
      return false;
    }

    match &self.include {
      Some(include) => include.iter().any(|value| scope_matches(value, &candidate)),
      None => true,
    }
  }

  /// Returns true when no filtering rules are active.
  pub fn is_unfiltered(&self) -> bool {
    self.include.is_none() && self.exclude.is_empty()
  }
}

impl StepInclusion for StepSelection {
  fn is_included(&self, collection: &str, step: &str) -> bool {
    StepSelection::is_included(self, collection, step)
  }
}

/// Convert a list of raw scopes into a sorted, de-duplicated set.
///
/// Values are trimmed and empty entries are discarded to simplify downstream filtering logic.
fn normalise_list(values: impl IntoIterator<Item = String>) -> BTreeSet<String> {
  values
    .into_iter()
    .map(|value| value.trim().trim_matches('/').to_string())
    .filter(|value| !value.is_empty())
    .collect()
}

fn scope_matches(rule: &str, candidate: &str) -> bool {
  if candidate == rule {
    return true;
  }

  candidate
    .strip_prefix(rule)
    .is_some_and(|suffix| suffix.starts_with('/'))
}

#[cfg(test)]
mod tests {
  use super::*;

  fn selection(include: &[&str], exclude: &[&str]) -> StepSelection {
    StepSelection::new(
      include.iter().map(|value| value.to_string()),
      exclude.iter().map(|value| value.to_string()),
    )
  }

  #[test]
  fn defaults_to_including_everything() {
    let selection = StepSelection::default();
    assert!(selection.is_included("characters", "classify_rows"));
    assert!(selection.is_unfiltered());
  }

  #[test]
  fn excludes_whole_collections() {
    let selection = selection(&[], &["artifacts", "", " forcecards "]);

    assert!(!selection.is_included("artifacts", "rewrite_urls"));
    assert!(!selection.is_included("forcecards", "visibility"));
    assert!(selection.is_included("characters", "rewrite_urls"));
  }

  #[test]
  fn excludes_single_steps() {
    let selection = selection(&[], &["characters/sanitize"]);

    assert!(!selection.is_included("characters", "sanitize"));
    assert!(selection.is_included("characters", "filter_keys"));
  }

  #[test]
  fn include_rules_restrict_runs() {
    let selection = selection(&["characters/classify_rows", "artifacts"], &[]);

    assert!(selection.is_included("characters", "classify_rows"));
    assert!(!selection.is_included("characters", "rewrite_urls"));
    assert!(selection.is_included("artifacts", "rewrite_urls"));
    assert!(!selection.is_included("forcecards", "rewrite_urls"));
  }

  #[test]
  fn exclusions_override_includes() {
    let selection = selection(&["characters"], &["characters/language_fallback"]);

    assert!(selection.is_included("characters", "filter_keys"));
    assert!(!selection.is_included("characters", "language_fallback"));
  }

  #[test]
  fn prefixes_only_match_on_scope_boundaries() {
    let selection = selection(&[], &["char"]);
    assert!(selection.is_included("characters", "filter_keys"));
  }

  #[test]
  fn normalises_whitespace_and_duplicates() {
    let normalised: Vec<String> = normalise_list(vec![
      "  a  ".into(),
      "b/".into(),
      "a".into(),
      String::new(),
      "/B".into(),
    ])
    .into_iter()
    .collect();

    assert_eq!(normalised, vec![
      String::from("B"),
      String::from("a"),
      String::from("b")
    ]);
  }
}
