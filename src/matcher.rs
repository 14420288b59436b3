//! # Name Matcher
//!
//! Fuzzy matching of ingredient and product names on top of the normalizer.
//!
//! Two names match **exactly** when their normalized forms are equal, and
//! **partially** when the shorter normalized form (at least
//! `min_partial_match_len` characters) occurs inside the longer one, so
//! "new onion" matches "onion". Every matching decision is reported as a
//! `MatchKind` so callers can audit why two records were paired.
//!
//! `NameIndex` normalizes a candidate list once so that repeated lookups
//! against the same stock or master snapshot avoid re-normalizing every name.

use log::{debug, trace};
use serde::Serialize;
use std::cmp::Ordering;
use std::collections::HashMap;

use crate::arithmetic::{compare_quantities, normalized_amount, EPSILON};
use crate::config::EngineConfig;
use crate::model::{Quantity, StockItem};
use crate::normalizer::normalize_for_matching;
use crate::units::{unit_class, CountUnit, UnitClass};

/// Count units treated as interchangeable by the legacy availability check
const LEGACY_INTERCHANGEABLE: [CountUnit; 2] = [CountUnit::Piece, CountUnit::Bottle];

/// How two names matched
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchKind {
    Exact,
    Partial,
    None,
}

/// Outcome of a best-match search over a candidate list
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BestMatch<'a> {
    Exact { index: usize, name: &'a str },
    Partial { index: usize, name: &'a str },
    None,
}

impl<'a> BestMatch<'a> {
    pub fn kind(&self) -> MatchKind {
        match self {
            BestMatch::Exact { .. } => MatchKind::Exact,
            BestMatch::Partial { .. } => MatchKind::Partial,
            BestMatch::None => MatchKind::None,
        }
    }

    /// Position of the matched candidate in the list that was searched
    pub fn index(&self) -> Option<usize> {
        match self {
            BestMatch::Exact { index, .. } | BestMatch::Partial { index, .. } => Some(*index),
            BestMatch::None => None,
        }
    }

    pub fn name(&self) -> Option<&'a str> {
        match self {
            BestMatch::Exact { name, .. } | BestMatch::Partial { name, .. } => Some(*name),
            BestMatch::None => None,
        }
    }

    pub fn is_match(&self) -> bool {
        !matches!(self, BestMatch::None)
    }
}

/// Per-target entry of a batch match
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchMatchEntry {
    pub target: String,
    pub kind: MatchKind,
    pub matched: Option<String>,
}

/// Summary of matching many targets against one candidate list
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchMatchReport {
    pub results: Vec<BatchMatchEntry>,
    pub total: usize,
    pub exact: usize,
    pub partial: usize,
    pub unmatched: usize,
    /// (exact + partial) / total; 1.0 for an empty batch
    pub accuracy: f64,
}

/// Name matcher
#[derive(Debug, Clone, Default)]
pub struct NameMatcher {
    config: EngineConfig,
}

impl NameMatcher {
    /// Create a matcher with the default configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a matcher with a custom configuration
    ///
    /// # Examples
    ///
    /// ```rust
    /// use pantry_reconcile::config::EngineConfig;
    /// use pantry_reconcile::matcher::NameMatcher;
    ///
    /// let matcher = NameMatcher::with_config(EngineConfig {
    ///     min_partial_match_len: 4,
    ///     ..Default::default()
    /// });
    /// assert!(!matcher.is_name_match("green tea", "tea"));
    /// assert!(matcher.is_name_match("green tea", "green"));
    /// ```
    pub fn with_config(config: EngineConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Classify how two raw names match
    pub fn match_kind(&self, a: &str, b: &str) -> MatchKind {
        self.match_normalized(&normalize_for_matching(a), &normalize_for_matching(b))
    }

    /// Classify two names that are already normalized
    pub(crate) fn match_normalized(&self, a: &str, b: &str) -> MatchKind {
        if a.is_empty() || b.is_empty() {
            return MatchKind::None;
        }
        if a == b {
            return MatchKind::Exact;
        }

        let (shorter, longer) = if a.chars().count() <= b.chars().count() {
            (a, b)
        } else {
            (b, a)
        };
        if shorter.chars().count() >= self.config.min_partial_match_len && longer.contains(shorter) {
            MatchKind::Partial
        } else {
            MatchKind::None
        }
    }

    /// Check if two names refer to the same thing, exactly or partially
    pub fn is_name_match(&self, a: &str, b: &str) -> bool {
        self.match_kind(a, b) != MatchKind::None
    }

    /// Build an index over candidate names for repeated lookups
    pub fn index<'a, I>(&self, names: I) -> NameIndex<'a>
    where
        I: IntoIterator<Item = &'a str>,
    {
        NameIndex::new(self.clone(), names)
    }

    /// Find the candidate that best matches `target`
    ///
    /// An exact match wins outright. Otherwise the partial match whose raw
    /// length is closest to the target's raw length is returned.
    pub fn find_best_match<'a, S: AsRef<str>>(&self, target: &str, candidates: &'a [S]) -> BestMatch<'a> {
        self.index(candidates.iter().map(|c| c.as_ref()))
            .find_best_match(target)
    }

    /// Match every target against the candidates and tally the results
    pub fn batch_match<T: AsRef<str>, S: AsRef<str>>(&self, targets: &[T], candidates: &[S]) -> BatchMatchReport {
        let index = self.index(candidates.iter().map(|c| c.as_ref()));
        let mut report = BatchMatchReport {
            results: Vec::with_capacity(targets.len()),
            total: targets.len(),
            exact: 0,
            partial: 0,
            unmatched: 0,
            accuracy: 1.0,
        };

        for target in targets {
            let target = target.as_ref();
            let best = index.find_best_match(target);
            match best.kind() {
                MatchKind::Exact => report.exact += 1,
                MatchKind::Partial => report.partial += 1,
                MatchKind::None => report.unmatched += 1,
            }
            report.results.push(BatchMatchEntry {
                target: target.to_string(),
                kind: best.kind(),
                matched: best.name().map(str::to_string),
            });
        }

        if report.total > 0 {
            report.accuracy = (report.exact + report.partial) as f64 / report.total as f64;
        }
        debug!(
            "Batch matched {} names: {} exact, {} partial, {} unmatched",
            report.total, report.exact, report.partial, report.unmatched
        );
        report
    }

    /// Check if the stock holds enough of an ingredient
    ///
    /// Without a required quantity, finding a matching stock entry is enough.
    pub fn check_stock_availability(&self, name: &str, required: Option<&Quantity>, stock: &[StockItem]) -> bool {
        let index = self.index(stock.iter().map(|item| item.name.as_str()));
        let Some(position) = index.find_best_match(name).index() else {
            trace!("No stock entry for '{}'", name);
            return false;
        };

        match required {
            Some(required) => self.covers(&stock[position].quantity, required),
            None => true,
        }
    }

    /// Check if `available` is at least `required`
    ///
    /// Quantities of different classes never cover each other, except for the
    /// legacy piece/bottle pairing when it is enabled.
    pub fn covers(&self, available: &Quantity, required: &Quantity) -> bool {
        match compare_quantities(available, required) {
            Ok(ordering) => ordering != Ordering::Less,
            Err(_) if self.interchangeable(&available.unit, &required.unit) => {
                normalized_amount(available) + EPSILON >= normalized_amount(required)
            }
            Err(_) => false,
        }
    }

    /// Check if two units fall under the legacy piece/bottle carve-out
    pub fn interchangeable(&self, u1: &str, u2: &str) -> bool {
        if !self.config.legacy_count_interchange {
            return false;
        }
        let is_legacy = |unit: &str| {
            matches!(unit_class(unit), Some(UnitClass::Count(count)) if LEGACY_INTERCHANGEABLE.contains(&count))
        };
        is_legacy(u1) && is_legacy(u2)
    }
}

struct IndexedName<'a> {
    raw: &'a str,
    normalized: String,
}

/// Candidate names normalized once, with a hash lookup for exact matches
pub struct NameIndex<'a> {
    entries: Vec<IndexedName<'a>>,
    exact: HashMap<String, usize>,
    matcher: NameMatcher,
}

impl<'a> NameIndex<'a> {
    pub fn new<I>(matcher: NameMatcher, names: I) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut entries = Vec::new();
        let mut exact = HashMap::new();
        for (position, raw) in names.into_iter().enumerate() {
            let normalized = normalize_for_matching(raw);
            if !normalized.is_empty() {
                exact.entry(normalized.clone()).or_insert(position);
            }
            entries.push(IndexedName { raw, normalized });
        }
        Self {
            entries,
            exact,
            matcher,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn find_best_match(&self, target: &str) -> BestMatch<'a> {
        let normalized = normalize_for_matching(target);
        if normalized.is_empty() {
            return BestMatch::None;
        }

        if let Some(&index) = self.exact.get(&normalized) {
            return BestMatch::Exact {
                index,
                name: self.entries[index].raw,
            };
        }

        let target_len = target.trim().chars().count();
        let mut best: Option<(usize, usize)> = None;
        for (index, entry) in self.entries.iter().enumerate() {
            if self.matcher.match_normalized(&normalized, &entry.normalized) != MatchKind::Partial {
                continue;
            }
            let distance = entry.raw.trim().chars().count().abs_diff(target_len);
            if best.map_or(true, |(best_distance, _)| distance < best_distance) {
                best = Some((distance, index));
            }
        }

        match best {
            Some((_, index)) => BestMatch::Partial {
                index,
                name: self.entries[index].raw,
            },
            None => BestMatch::None,
        }
    }
}

/// Check if two names match using the default configuration
pub fn is_name_match(a: &str, b: &str) -> bool {
    NameMatcher::new().is_name_match(a, b)
}

/// Find the best match for `target` using the default configuration
pub fn find_best_match<'a, S: AsRef<str>>(target: &str, candidates: &'a [S]) -> BestMatch<'a> {
    NameMatcher::new().find_best_match(target, candidates)
}

/// Batch match using the default configuration
pub fn batch_match<T: AsRef<str>, S: AsRef<str>>(targets: &[T], candidates: &[S]) -> BatchMatchReport {
    NameMatcher::new().batch_match(targets, candidates)
}

/// Check stock availability using the default configuration
pub fn check_stock_availability(name: &str, required: Option<&Quantity>, stock: &[StockItem]) -> bool {
    NameMatcher::new().check_stock_availability(name, required, stock)
}
