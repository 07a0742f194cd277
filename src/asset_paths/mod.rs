//! Helpers for detecting and rewriting stored asset URLs.
//!
//! Filtering (which values are never rewritten) and rewriting (legacy path to canonical
//! CDN URL) live in separate submodules so each rule can be tested on its own. The record
//! level step in [`crate::normalize`] only decides which fields to feed through here.

mod filters;
mod rewrite;

pub use filters::{is_canonical_asset_url, should_ignore_asset_url};
pub use rewrite::{AssetUrlRules, revert_asset_url, rewrite_asset_url};
