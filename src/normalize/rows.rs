//! Row classification from free-text positioning strings.

use serde_json::Value;

use super::{CHARACTERS, NormalizationStep};
use crate::models::{Language, LocalizedText, Record, RecordUpdate, Row};

const POSITIONING_FIELD: &str = "positioning";
const ROW_FIELD: &str = "row";

/// Maps a positioning string onto a row, or makes no decision.
pub trait RowHeuristic {
  /// Classify `text`; `None` means the stored row is left alone.
  fn classify(&self, text: &str) -> Option<Row>;

  /// Text fed to [`RowHeuristic::classify`] for a localized positioning map.
  fn source_text(&self, positioning: LocalizedText<'_>) -> Option<String> {
    positioning.get(Language::En).map(str::to_string)
  }
}

/// Substring match on the English positioning text.
///
/// Checks run in the order `front`, `middle`/`mid`, `back`; the first hit wins even when
/// several appear.
#[derive(Debug, Clone, Copy, Default)]
pub struct EnglishRowHeuristic;

impl RowHeuristic for EnglishRowHeuristic {
  fn classify(&self, text: &str) -> Option<Row> {
    let folded = text.to_lowercase();
    if folded.contains("front") {
      Some(Row::Front)
    } else if folded.contains("middle") || folded.contains("mid") {
      Some(Row::Mid)
    } else if folded.contains("back") {
      Some(Row::Back)
    } else {
      None
    }
  }
}

const FRONT_KEYWORDS: &[&str] = &["front", "frente", "avant", "delante", "前", "depan", "หน้า"];
const MID_KEYWORDS: &[&str] = &[
  "mid", "meio", "medio", "centre", "centro", "milieu", "中", "tengah", "กลาง",
];
const BACK_KEYWORDS: &[&str] = &[
  "back", "trás", "tras", "arrière", "fundo", "atrás", "fondo", "后", "belakang", "หลัง",
];

/// Keyword match over every localized positioning value.
///
/// Used when the English text is missing or unreliable. Same precedence as
/// [`EnglishRowHeuristic`].
#[derive(Debug, Clone, Copy, Default)]
pub struct MultilingualRowHeuristic;

impl RowHeuristic for MultilingualRowHeuristic {
  fn classify(&self, text: &str) -> Option<Row> {
    let folded = text.to_lowercase();
    let hit = |keywords: &[&str]| keywords.iter().any(|keyword| folded.contains(keyword));
    if hit(FRONT_KEYWORDS) {
      Some(Row::Front)
    } else if hit(MID_KEYWORDS) {
      Some(Row::Mid)
    } else if hit(BACK_KEYWORDS) {
      Some(Row::Back)
    } else {
      None
    }
  }

  fn source_text(&self, positioning: LocalizedText<'_>) -> Option<String> {
    let combined = positioning.values().collect::<Vec<_>>().join(" ");
    (!combined.is_empty()).then_some(combined)
  }
}

/// Step that keeps `row` in sync with the positioning text.
pub struct RowClassifier {
  heuristic: Box<dyn RowHeuristic>,
}

impl RowClassifier {
  /// Create a classifier backed by `heuristic`.
  pub fn new(heuristic: Box<dyn RowHeuristic>) -> Self {
    Self { heuristic }
  }

  /// Decide the row for a record, or `None` when the positioning text is absent or
  /// unrecognised.
  pub fn decide(&self, record: &Record) -> Option<Row> {
    let positioning = LocalizedText::field(record, POSITIONING_FIELD)?;
    let text = self.heuristic.source_text(positioning)?;
    self.heuristic.classify(&text)
  }
}

impl NormalizationStep for RowClassifier {
  fn name(&self) -> &'static str {
    "classify_rows"
  }

  fn applies_to(&self, collection: &str) -> bool {
    collection == CHARACTERS
  }

  fn plan(&self, record: &Record) -> RecordUpdate {
    let mut update = RecordUpdate::default();
    let Some(row) = self.decide(record) else {
      return update;
    };

    if record.get(ROW_FIELD).and_then(Value::as_str) != Some(row.as_str()) {
      update.set(ROW_FIELD, row.as_str());
    }
    update
  }
}
