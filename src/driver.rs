//! Migration orchestrator sequencing normalization steps over stored collections.

use std::fmt;

use anyhow::{Context, Result};
use serde::Serialize;

use crate::models::Document;
use crate::normalize::{NormalizationStep, Pipeline};
use crate::selection::StepInclusion;
use crate::store::DocumentStore;

/// Outcome of one step over one collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StepReport {
  /// Collection the step ran against.
  pub collection: String,
  /// Step identifier.
  pub step: String,
  /// Records read.
  pub scanned: usize,
  /// Records with a non-empty update (written, or only planned in dry runs).
  pub updated: usize,
}

/// Summary of a whole migration run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MigrationReport {
  /// Whether writes were suppressed.
  pub dry_run: bool,
  /// Per collection and step counts, in execution order.
  pub steps: Vec<StepReport>,
}

impl MigrationReport {
  /// Total number of record updates across every step.
  pub fn total_updated(&self) -> usize {
    self.steps.iter().map(|step| step.updated).sum()
  }

  /// Report for a given pair, if the step ran.
  pub fn find(&self, collection: &str, step: &str) -> Option<&StepReport> {
    self
      .steps
      .iter()
      .find(|report| report.collection == collection && report.step == step)
  }
}

impl fmt::Display for MigrationReport {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let verb = if self.dry_run { "would update" } else { "updated" };
    for report in &self.steps {
      writeln!(
        f,
        "{:<12} {:<18} scanned {:>5}  {verb} {:>5}",
        report.collection, report.step, report.scanned, report.updated
      )?;
    }
    write!(f, "total records {verb}: {}", self.total_updated())
  }
}

/// Runs a [`Pipeline`] over a set of collections in a [`DocumentStore`].
///
/// Steps run one full collection scan at a time and every record update is persisted on
/// its own. A failed write aborts the run; earlier writes stay in place and the run can
/// be repeated once the cause is fixed.
pub struct MigrationDriver<'a, S: DocumentStore> {
  store: &'a mut S,
  pipeline: &'a Pipeline,
  dry_run: bool,
}

impl<'a, S: DocumentStore> MigrationDriver<'a, S> {
  /// Create a driver writing through `store`.
  pub fn new(store: &'a mut S, pipeline: &'a Pipeline) -> Self {
    Self {
      store,
      pipeline,
      dry_run: false,
    }
  }

  /// Plan and count updates without writing them.
  pub fn dry_run(mut self, dry_run: bool) -> Self {
    self.dry_run = dry_run;
    self
  }

  /// Run every selected step over `collections`, in order.
  pub fn run<I: StepInclusion>(
    &mut self,
    collections: &[String],
    selection: &I,
  ) -> Result<MigrationReport> {
    let mut report = MigrationReport {
      dry_run: self.dry_run,
      steps: Vec::new(),
    };

    let pipeline = self.pipeline;
    for collection in collections {
      let mut staged: Option<Vec<Document>> = None;

      for step in pipeline.steps() {
        if !step.applies_to(collection) || !selection.is_included(collection, step.name()) {
          log::debug!("skipping {} for {collection}", step.name());
          continue;
        }

        let documents = match staged.take() {
          Some(documents) => documents,
          None => self
            .store
            .find_all(collection)
            .with_context(|| format!("failed to read collection `{collection}`"))?,
        };

        let (documents, step_report) = self.run_step(collection, step, documents)?;
        log::info!(
          "{}: {} {}/{} records in {collection}",
          step.name(),
          if self.dry_run { "would update" } else { "updated" },
          step_report.updated,
          step_report.scanned
        );
        report.steps.push(step_report);

        if self.dry_run {
          staged = Some(documents);
        }
      }
    }

    Ok(report)
  }

  fn run_step(
    &mut self,
    collection: &str,
    step: &dyn NormalizationStep,
    mut documents: Vec<Document>,
  ) -> Result<(Vec<Document>, StepReport)> {
    let mut updated = 0;

    for document in documents.iter_mut() {
      let update = step.plan(&document.body);
      if update.is_empty() {
        continue;
      }

      log::debug!(
        "{} {collection}/{}: {}",
        step.name(),
        document.id,
        update.touched_fields().join(", ")
      );

      if !self.dry_run {
        self
          .store
          .update_one(collection, &document.id, &update)
          .with_context(|| {
            format!(
              "{} failed to update `{}` in `{collection}` after {updated} successful writes",
              step.name(),
              document.id
            )
          })?;
      }

      update.apply_to(&mut document.body);
      updated += 1;
    }

    let report = StepReport {
      collection: collection.to_string(),
      step: step.name().to_string(),
      scanned: documents.len(),
      updated,
    };
    Ok((documents, report))
  }
}
