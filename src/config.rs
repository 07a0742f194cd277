//! Migration configuration loader describing the data location and normalization rules.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use crate::asset_paths::AssetUrlRules;
use crate::models::Language;

/// File name searched for in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "migrate.config.json";

/// Environment variable overriding [`MigrationConfig::cdn_base`].
pub const CDN_BASE_ENV: &str = "CDN_BASE";

/// Errors raised while loading an explicitly requested configuration file.
#[derive(Debug, Error)]
pub enum ConfigError {
  /// Failed to read the configuration file from disk.
  #[error("failed to read {}: {source}", path.display())]
  Io {
    /// Path that caused the error.
    path: PathBuf,
    /// Source I/O error.
    source: std::io::Error,
  },
  /// Failed to parse the JSON configuration.
  #[error("failed to parse {}: {source}", path.display())]
  Parse {
    /// Path that caused the error.
    path: PathBuf,
    /// Source parse error.
    source: serde_json::Error,
  },
}

/// Which row heuristic the classifier uses.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RowHeuristicKind {
  /// Substring match on `positioning.en`.
  #[default]
  English,
  /// Keyword match over every localized positioning value.
  Multilingual,
}

/// Languages checked for stray Chinese text and the order fallbacks are taken from.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LanguageFallbackConfig {
  /// Language slots that must not hold Chinese text.
  pub targets: Vec<Language>,
  /// Fallback languages in priority order.
  pub priority: Vec<Language>,
}

impl Default for LanguageFallbackConfig {
  fn default() -> Self {
    Self {
      targets: vec![Language::Pt],
      priority: vec![Language::En, Language::Es],
    }
  }
}

/// Deprecated field removal settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SanitizeConfig {
  /// Removal is irreversible, so the step only runs when enabled.
  pub enabled: bool,
  /// Fields removed from character records.
  pub fields: Vec<String>,
}

impl Default for SanitizeConfig {
  fn default() -> Self {
    Self {
      enabled: false,
      fields: vec![
        "faction".into(),
        "combatPosition".into(),
        "positioning".into(),
        "attackType".into(),
      ],
    }
  }
}

/// Discoverable migration configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MigrationConfig {
  /// Directory holding one `<collection>.json` file per collection.
  pub data_dir: String,
  /// Canonical CDN prefix every asset URL should start with.
  pub cdn_base: String,
  /// Legacy path fragments rewritten onto the CDN prefix, in match order.
  pub legacy_fragments: Vec<String>,
  /// Top-level string fields holding asset URLs.
  pub asset_fields: Vec<String>,
  /// Collections visited by the driver, in order.
  pub collections: Vec<String>,
  /// Row classification heuristic.
  pub row_heuristic: RowHeuristicKind,
  /// Stray-script repair settings.
  pub language_fallback: LanguageFallbackConfig,
  /// Faction keys forced for specific external ids.
  pub faction_overrides: BTreeMap<String, String>,
  /// Deprecated field removal.
  pub sanitize: SanitizeConfig,
  /// `collection` or `collection/step` scopes to run; empty runs everything.
  pub include: Vec<String>,
  /// `collection` or `collection/step` scopes to skip.
  pub exclude: Vec<String>,
}

impl Default for MigrationConfig {
  fn default() -> Self {
    Self {
      data_dir: "data".into(),
      cdn_base: "https://cdn.games4fun.io/ssex-images".into(),
      legacy_fragments: vec!["seiya2.vercel.app/assets/".into(), "/assets/".into()],
      asset_fields: vec!["imageUrl".into(), "avatarUrl".into(), "thumbnailUrl".into()],
      collections: vec!["characters".into(), "artifacts".into(), "forcecards".into()],
      row_heuristic: RowHeuristicKind::default(),
      language_fallback: LanguageFallbackConfig::default(),
      faction_overrides: BTreeMap::new(),
      sanitize: SanitizeConfig::default(),
      include: Vec::new(),
      exclude: Vec::new(),
    }
  }
}

impl MigrationConfig {
  /// Attempt to load configuration from the provided directory.
  ///
  /// A missing or unparsable file falls back to defaults; the reason is logged.
  pub fn discover(dir: &Path) -> Self {
    let candidate = dir.join(DEFAULT_CONFIG_FILE);
    if !candidate.exists() {
      return Self::default();
    }

    Self::from_path(&candidate).unwrap_or_else(|err| {
      log::warn!("{err}; using default configuration");
      Self::default()
    })
  }

  /// Read configuration from a specific JSON file.
  pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
      path: path.to_path_buf(),
      source,
    })?;
    serde_json::from_str(&content).map_err(|source| ConfigError::Parse {
      path: path.to_path_buf(),
      source,
    })
  }

  /// Apply overrides taken from the process environment.
  pub fn with_env_overrides(self) -> Self {
    self.with_cdn_base_override(std::env::var(CDN_BASE_ENV).ok())
  }

  fn with_cdn_base_override(mut self, value: Option<String>) -> Self {
    if let Some(base) = value.filter(|base| !base.trim().is_empty()) {
      self.cdn_base = base.trim().to_string();
    }
    self
  }

  /// Asset URL rules built from the CDN prefix and legacy fragments.
  pub fn asset_rules(&self) -> AssetUrlRules {
    AssetUrlRules::new(&self.cdn_base, self.legacy_fragments.iter().cloned())
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use tempfile::tempdir;

  #[test]
  fn discover_defaults_when_missing() {
    let temp = tempdir().expect("failed to create temp dir");
    let config = MigrationConfig::discover(temp.path());
    assert_eq!(config.data_dir, "data");
    assert_eq!(config.collections.len(), 3);
    assert!(!config.sanitize.enabled);
  }

  #[test]
  fn discover_defaults_when_malformed() {
    let temp = tempdir().expect("failed to create temp dir");
    fs::write(temp.path().join(DEFAULT_CONFIG_FILE), "{ not json").unwrap();
    let config = MigrationConfig::discover(temp.path());
    assert_eq!(config.cdn_base, MigrationConfig::default().cdn_base);
  }

  #[test]
  fn from_path_reports_parse_errors() {
    let temp = tempdir().expect("failed to create temp dir");
    let path = temp.path().join("custom.json");
    fs::write(&path, "42").unwrap();
    assert!(matches!(
      MigrationConfig::from_path(&path),
      Err(ConfigError::Parse { .. })
    ));

    let missing = temp.path().join("missing.json");
    assert!(matches!(
      MigrationConfig::from_path(&missing),
      Err(ConfigError::Io { .. })
    ));
  }

  #[test]
  fn partial_files_keep_remaining_defaults() {
    let temp = tempdir().expect("failed to create temp dir");
    fs::write(
      temp.path().join(DEFAULT_CONFIG_FILE),
      r#"{
        "cdn_base": "https://cdn.example.net/img/",
        "row_heuristic": "multilingual",
        "language_fallback": {"targets": ["pt", "fr"]},
        "faction_overrides": {"1043": "asgard"},
        "sanitize": {"enabled": true}
      }"#,
    )
    .unwrap();

    let config = MigrationConfig::discover(temp.path());
    assert_eq!(config.row_heuristic, RowHeuristicKind::Multilingual);
    assert_eq!(config.language_fallback.targets, vec![Language::Pt, Language::Fr]);
    assert_eq!(config.language_fallback.priority, vec![Language::En, Language::Es]);
    assert_eq!(config.faction_overrides.get("1043").map(String::as_str), Some("asgard"));
    assert!(config.sanitize.enabled);
    assert_eq!(config.sanitize.fields.len(), 4);
    assert_eq!(config.asset_rules().cdn_base(), "https://cdn.example.net/img");
  }

  #[test]
  fn cdn_base_override_ignores_blank_values() {
    let config = MigrationConfig::default().with_cdn_base_override(Some("  ".into()));
    assert_eq!(config.cdn_base, MigrationConfig::default().cdn_base);

    let config = MigrationConfig::default()
      .with_cdn_base_override(Some(" https://cdn.example.net/x ".into()));
    assert_eq!(config.cdn_base, "https://cdn.example.net/x");
  }
}
