//! Idempotent normalization steps applied to stored records.
//!
//! Each step is a pure planner: it looks at one record and returns the minimal
//! [`RecordUpdate`] that brings it back in line, or an empty update when the record is
//! already correct. Persisting the result is the driver's job.

mod filter_keys;
mod langs;
mod rows;
mod sanitize;
mod urls;
mod visibility;

pub use filter_keys::{DEFAULT_KEY, FilterKeys, slugify};
pub use langs::{LanguageFallback, contains_cjk, resolve_fallback};
pub use rows::{EnglishRowHeuristic, MultilingualRowHeuristic, RowClassifier, RowHeuristic};
pub use sanitize::FieldSanitizer;
pub use urls::{RevertCdnUrls, RewriteUrls};
pub use visibility::VisibilityBackfill;

use crate::config::{MigrationConfig, RowHeuristicKind};
use crate::models::{Record, RecordUpdate};

/// Collection holding playable characters.
pub const CHARACTERS: &str = "characters";

/// A single normalization pass over a record.
pub trait NormalizationStep {
  /// Stable identifier used in selection rules and logs.
  fn name(&self) -> &'static str;

  /// Returns `true` when the step should run against `collection`.
  fn applies_to(&self, collection: &str) -> bool;

  /// Compute the update that normalizes `record`; empty when nothing needs to change.
  fn plan(&self, record: &Record) -> RecordUpdate;
}

/// Ordered list of steps executed by the driver.
pub struct Pipeline {
  steps: Vec<Box<dyn NormalizationStep>>,
}

impl Pipeline {
  /// Create an empty pipeline.
  pub fn new() -> Self {
    Self { steps: Vec::new() }
  }

  /// Append a step; steps run in insertion order.
  pub fn with_step(mut self, step: impl NormalizationStep + 'static) -> Self {
    self.steps.push(Box::new(step));
    self
  }

  /// Standard forward pipeline described by `config`.
  ///
  /// The sanitizer runs last so the classifiers still see the fields it removes.
  pub fn from_config(config: &MigrationConfig) -> Self {
    let heuristic: Box<dyn RowHeuristic> = match config.row_heuristic {
      RowHeuristicKind::English => Box::new(EnglishRowHeuristic),
      RowHeuristicKind::Multilingual => Box::new(MultilingualRowHeuristic),
    };

    let mut pipeline = Self::new()
      .with_step(RewriteUrls::new(
        config.asset_rules(),
        config.asset_fields.clone(),
      ))
      .with_step(RowClassifier::new(heuristic))
      .with_step(LanguageFallback::new(
        config.language_fallback.targets.clone(),
        config.language_fallback.priority.clone(),
      ))
      .with_step(FilterKeys::new(config.faction_overrides.clone()))
      .with_step(VisibilityBackfill);

    if config.sanitize.enabled {
      pipeline = pipeline.with_step(FieldSanitizer::new(config.sanitize.fields.clone()));
    }

    pipeline
  }

  /// Pipeline that undoes the CDN rewrite.
  pub fn revert_cdn(config: &MigrationConfig) -> Self {
    Self::new().with_step(RevertCdnUrls::new(
      config.asset_rules(),
      config.asset_fields.clone(),
    ))
  }

  /// Iterate over the steps in execution order.
  pub fn steps(&self) -> impl Iterator<Item = &(dyn NormalizationStep + 'static)> {
    self.steps.iter().map(|step| step.as_ref())
  }

  /// Number of steps in the pipeline.
  pub fn len(&self) -> usize {
    self.steps.len()
  }

  /// Returns `true` when the pipeline has no steps.
  pub fn is_empty(&self) -> bool {
    self.steps.is_empty()
  }

  /// Plan every applicable step against `record`, feeding each step the output of the
  /// previous one, and return the merged update.
  pub fn plan(&self, collection: &str, record: &Record) -> RecordUpdate {
    let mut working = record.clone();
    let mut merged = RecordUpdate::default();
    for step in self.steps().filter(|step| step.applies_to(collection)) {
      let update = step.plan(&working);
      update.apply_to(&mut working);
      merged.merge(update);
    }
    merged
  }
}

impl Default for Pipeline {
  fn default() -> Self {
    Self::new()
  }
}
