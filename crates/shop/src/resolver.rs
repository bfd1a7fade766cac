//! Matching of displayed product labels to inventory records.
//!
//! Product labels in the menu markup may carry HTML tags and decorative
//! trailing icon text ("Cake 🍰", "Samosa <i class=..></i>"). The resolver
//! cleans the label and walks a cascade of matching strategies against the
//! inventory snapshot, first match wins.
//!
//! The cascade is inherently ambiguous for names sharing prefixes or
//! substrings (two products starting with the same word). Cards should
//! embed a stable [`ItemId`] where possible - id lookup wins over every
//! name strategy - and fuzzy hits with more than one candidate are flagged
//! `ambiguous` and logged for operator review rather than silently trusted.

use std::sync::LazyLock;

use ezfood_core::ItemId;
use regex::Regex;
use tracing::{debug, warn};

use crate::inventory::{InventoryCache, InventoryRecord};

/// Regex for stripping HTML tags out of a label.
static TAG_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new("<[^>]*>").expect("Invalid regex"));

/// Regex for dropping a trailing run of punctuation/symbols plus the
/// following word (heuristic for icon-adjacent text like "- special").
static TRAILING_ICON_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r##"\s*[\u{2000}-\u{206F}\u{2E00}-\u{2E7F}\\'!"#$%&()*+,\-./:;<=>?@\[\]^_`\{\|\}~]+\s*\w+\s*$"##,
    )
    .expect("Invalid regex")
});

/// Which cascade step produced a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchStrategy {
    /// Stable item id embedded in the card data.
    StableId,
    /// Exact match on the cleaned, lowercased, trimmed label.
    Exact,
    /// Match after stripping non-alphanumeric characters on both sides.
    Normalized,
    /// First word of the cleaned label equals or prefixes a cache key.
    FirstWord,
    /// Bidirectional substring match between normalized forms.
    Substring,
}

impl MatchStrategy {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::StableId => "stable-id",
            Self::Exact => "exact",
            Self::Normalized => "normalized",
            Self::FirstWord => "first-word",
            Self::Substring => "substring",
        }
    }
}

/// A successful label resolution.
#[derive(Debug, Clone, Copy)]
pub struct Resolution<'a> {
    pub record: &'a InventoryRecord,
    pub strategy: MatchStrategy,
    /// More than one cache key matched a fuzzy strategy; the first hit in
    /// deterministic key order was kept for compatibility.
    pub ambiguous: bool,
}

/// Clean a raw product label: strip HTML tags, drop trailing icon-adjacent
/// text, lowercase and trim.
#[must_use]
pub fn clean_label(raw: &str) -> String {
    let without_tags = TAG_RE.replace_all(raw, "");
    let without_icons = TRAILING_ICON_RE.replace(&without_tags, "");
    without_icons.to_lowercase().trim().to_string()
}

/// Normalize a cleaned name for fuzzy comparison: keep alphanumerics,
/// underscores and spaces, drop everything else.
#[must_use]
pub fn normalize(name: &str) -> String {
    name.to_lowercase()
        .chars()
        .filter(|c| c.is_alphanumeric() || c.is_whitespace() || *c == '_')
        .collect::<String>()
        .trim()
        .to_string()
}

/// Resolve a displayed label against the inventory snapshot.
///
/// Returns `None` when no strategy matches; callers must treat that as
/// "not orderable". Resolution is idempotent for an unchanged cache.
#[must_use]
pub fn resolve<'a>(cache: &'a InventoryCache, label: &str) -> Option<Resolution<'a>> {
    let clean = clean_label(label);
    if clean.is_empty() {
        return None;
    }

    // Step 1: direct match on the cleaned label (most reliable)
    if let Some(record) = cache.get(&clean) {
        return Some(hit(record, MatchStrategy::Exact, false, &clean));
    }

    let normalized = normalize(&clean);

    // Step 2: match after normalizing both sides
    let candidates: Vec<&InventoryRecord> = cache
        .iter()
        .filter(|(key, _)| normalize(key) == normalized)
        .map(|(_, record)| record)
        .collect();
    if let Some(record) = candidates.first() {
        return Some(hit(
            record,
            MatchStrategy::Normalized,
            candidates.len() > 1,
            &clean,
        ));
    }

    // Step 3: first word, for common items like "Cake", "Sprite"
    if let Some(first_word) = clean.split_whitespace().next()
        && first_word.chars().count() > 2
    {
        let candidates: Vec<&InventoryRecord> = cache
            .iter()
            .filter(|(key, _)| *key == first_word || key.starts_with(first_word))
            .map(|(_, record)| record)
            .collect();
        if let Some(record) = candidates.first() {
            return Some(hit(
                record,
                MatchStrategy::FirstWord,
                candidates.len() > 1,
                &clean,
            ));
        }
    }

    // Step 4: bidirectional substring as a last resort
    if !normalized.is_empty() {
        let candidates: Vec<&InventoryRecord> = cache
            .iter()
            .filter(|(key, _)| {
                let normalized_key = normalize(key);
                !normalized_key.is_empty()
                    && (normalized_key.contains(&normalized)
                        || normalized.contains(&normalized_key))
            })
            .map(|(_, record)| record)
            .collect();
        if let Some(record) = candidates.first() {
            return Some(hit(
                record,
                MatchStrategy::Substring,
                candidates.len() > 1,
                &clean,
            ));
        }
    }

    debug!(label = %clean, "no inventory match for product label");
    None
}

/// Resolve with a stable-id fast path.
///
/// When the card embeds an [`ItemId`], the id lookup wins before any name
/// strategy; the label cascade remains as a compatibility fallback.
#[must_use]
pub fn resolve_with_id<'a>(
    cache: &'a InventoryCache,
    id: Option<ItemId>,
    label: &str,
) -> Option<Resolution<'a>> {
    if let Some(id) = id
        && let Some(record) = cache.get_by_id(id)
    {
        return Some(Resolution {
            record,
            strategy: MatchStrategy::StableId,
            ambiguous: false,
        });
    }
    resolve(cache, label)
}

fn hit<'a>(
    record: &'a InventoryRecord,
    strategy: MatchStrategy,
    ambiguous: bool,
    clean: &str,
) -> Resolution<'a> {
    if ambiguous {
        warn!(
            label = %clean,
            matched = %record.name,
            strategy = strategy.as_str(),
            "ambiguous product match, first hit kept"
        );
    } else {
        debug!(
            label = %clean,
            matched = %record.name,
            strategy = strategy.as_str(),
            "resolved product label"
        );
    }
    Resolution {
        record,
        strategy,
        ambiguous,
    }
}
