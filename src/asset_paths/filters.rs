use regex::Regex;

fn asset_url_ignores() -> &'static [Regex] {
  use std::sync::OnceLock;

  static PATTERNS: OnceLock<Vec<Regex>> = OnceLock::new();
  PATTERNS
    .get_or_init(|| {
      vec![
        Regex::new(r"(?i)^data:").expect("invalid data URI regex"),
        Regex::new(r"(?i)^mailto:").expect("invalid mailto regex"),
        Regex::new(r"(?i)^blob:").expect("invalid blob regex"),
      ]
    })
    .as_slice()
}

/// Determine whether a stored asset value must never be rewritten.
///
/// Inline data and non-fetchable schemes do not point at the asset host, even when they
/// happen to contain a legacy path fragment.
pub fn should_ignore_asset_url(value: &str) -> bool {
  asset_url_ignores()
    .iter()
    .any(|pattern| pattern.is_match(value))
}

/// Returns `true` when `value` already points at the canonical CDN prefix.
///
/// The prefix only matches on a path boundary, so `https://cdn/images-old/x.png` is not
/// considered canonical for a base of `https://cdn/images`.
pub fn is_canonical_asset_url(value: &str, cdn_base: &str) -> bool {
  let base = cdn_base.trim_end_matches('/');
  if base.is_empty() {
    return false;
  }

  value
    .strip_prefix(base)
    .is_some_and(|rest| rest.is_empty() || rest.starts_with('/'))
}
