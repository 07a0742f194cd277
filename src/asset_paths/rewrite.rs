use std::borrow::Cow;

use super::filters::{is_canonical_asset_url, should_ignore_asset_url};

/// Prefix legacy asset paths are restored to by [`revert_asset_url`].
const LEGACY_ASSET_ROOT: &str = "/assets";

/// Rules describing how legacy asset paths map onto the canonical CDN prefix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetUrlRules {
  cdn_base: String,
  legacy_fragments: Vec<String>,
}

impl AssetUrlRules {
  /// Create rules for a canonical prefix and an ordered list of legacy fragments.
  ///
  /// Trailing slashes on the prefix are dropped and blank fragments are discarded.
  pub fn new(cdn_base: &str, legacy_fragments: impl IntoIterator<Item = String>) -> Self {
    Self {
      cdn_base: cdn_base.trim().trim_end_matches('/').to_string(),
      legacy_fragments: legacy_fragments
        .into_iter()
        .filter(|fragment| !fragment.trim().is_empty())
        .collect(),
    }
  }

  /// Canonical CDN prefix without a trailing slash.
  pub fn cdn_base(&self) -> &str {
    &self.cdn_base
  }

  /// Legacy fragments in match order.
  pub fn legacy_fragments(&self) -> &[String] {
    &self.legacy_fragments
  }
}

/// Rewrite a stored asset URL onto the canonical CDN prefix.
///
/// Empty, ignored and unrecognised values come back exactly as given. Canonical values
/// and rewritten values lose any surrounding whitespace. The first
/// legacy fragment found in the value wins and everything after it is appended to the CDN
/// prefix, so `/assets/resources/x.png` becomes `<CDN>/resources/x.png`.
pub fn rewrite_asset_url<'a>(url: &'a str, rules: &AssetUrlRules) -> Cow<'a, str> {
  let trimmed = url.trim();
  if trimmed.is_empty() || rules.cdn_base.is_empty() {
    return Cow::Borrowed(url);
  }

  if should_ignore_asset_url(trimmed) {
    return Cow::Borrowed(url);
  }
  if is_canonical_asset_url(trimmed, &rules.cdn_base) {
    return Cow::Borrowed(trimmed);
  }

  for fragment in &rules.legacy_fragments {
    if let Some(index) = trimmed.find(fragment.as_str()) {
      let rest = trimmed[index + fragment.len()..].trim_start_matches('/');
      return Cow::Owned(format!("{}/{}", rules.cdn_base, rest));
    }
  }

  Cow::Borrowed(url)
}

/// Map a canonical CDN URL back to the legacy `/assets/` root.
///
/// Values that do not start with the canonical prefix are returned unchanged.
pub fn revert_asset_url<'a>(url: &'a str, rules: &AssetUrlRules) -> Cow<'a, str> {
  if !is_canonical_asset_url(url, &rules.cdn_base) {
    return Cow::Borrowed(url);
  }

  let rest = url[rules.cdn_base.len()..].trim_start_matches('/');
  Cow::Owned(format!("{LEGACY_ASSET_ROOT}/{rest}"))
}
