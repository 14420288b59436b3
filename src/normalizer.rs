//! # Name Normalizer
//!
//! Canonicalizes free-text ingredient and product names so that names typed
//! by a person, printed on a receipt or scraped from a recipe can be compared.
//! Normalized names are used for matching only, never for display.
//!
//! ## Normalization steps
//!
//! 1. Full-width ASCII and the ideographic space become half-width
//! 2. Case folding
//! 3. Bracketed annotations are removed: `(国産)`, `[sale]`, `【特売】`
//! 4. Embedded quantities are removed: `200g`, `2個`, `3 pieces`
//! 5. Runs of whitespace, punctuation and symbols collapse to one space
//!
//! The second half of the module maps captured names onto the ingredient
//! master through each record's recognition pattern.

use lazy_static::lazy_static;
use log::{debug, trace, warn};
use regex::{Regex, RegexBuilder};

use crate::matcher::{MatchKind, NameMatcher};
use crate::model::{IngredientMaster, RecognitionPattern};
use crate::units::known_units;

lazy_static! {
    static ref BRACKETED: Regex =
        Regex::new(r"\([^)]*\)|\[[^\]]*\]|\{[^}]*\}|【[^】]*】|「[^」]*」|〔[^〕]*〕|『[^』]*』")
            .expect("Bracket pattern should be valid");
    static ref EMBEDDED_QUANTITY: Regex = build_embedded_quantity_regex();
    static ref SEPARATORS: Regex =
        Regex::new(r"[\s\p{P}\p{S}]+").expect("Separator pattern should be valid");
}

/// Build the pattern matching a number optionally followed by a known unit
///
/// ASCII units must end on a word boundary so "2 glasses" keeps its word;
/// Japanese counters are followed directly by other text ("2個入り").
fn build_embedded_quantity_regex() -> Regex {
    let mut ascii_units = Vec::new();
    let mut other_units = Vec::new();
    for unit in known_units() {
        let lowered = unit.to_lowercase();
        let bucket = if lowered.is_ascii() {
            &mut ascii_units
        } else {
            &mut other_units
        };
        if !bucket.contains(&lowered) {
            bucket.push(lowered);
        }
    }

    let pattern = format!(
        r"\d+(?:[./]\d+)?(?:\s*(?:{})\b|\s*(?:{}))?",
        join_alternatives(&ascii_units),
        join_alternatives(&other_units)
    );
    trace!("Embedded quantity pattern: {}", pattern);
    Regex::new(&pattern).expect("Embedded quantity pattern should be valid")
}

fn join_alternatives(units: &[String]) -> String {
    units
        .iter()
        .map(|u| regex::escape(u))
        .collect::<Vec<_>>()
        .join("|")
}

/// Convert full-width ASCII characters and the ideographic space to half-width
pub fn to_half_width(text: &str) -> String {
    text.chars()
        .map(|c| match c {
            '\u{FF01}'..='\u{FF5E}' => char::from_u32(c as u32 - 0xFEE0).unwrap_or(c),
            '\u{3000}' => ' ',
            _ => c,
        })
        .collect()
}

/// Canonicalize a name for matching
///
/// # Examples
///
/// ```rust
/// use pantry_reconcile::normalizer::normalize_for_matching;
///
/// assert_eq!(normalize_for_matching("Onion (Hokkaido) 3個"), "onion");
/// assert_eq!(normalize_for_matching("ＭＩＬＫ　1000ml"), "milk");
/// assert_eq!(normalize_for_matching("  new   onion "), "new onion");
/// ```
pub fn normalize_for_matching(name: &str) -> String {
    let half_width = to_half_width(name);
    let folded = half_width.to_lowercase();
    let without_brackets = BRACKETED.replace_all(&folded, " ");
    let without_quantities = EMBEDDED_QUANTITY.replace_all(&without_brackets, " ");
    let collapsed = SEPARATORS.replace_all(&without_quantities, " ");
    collapsed.trim().to_string()
}

/// Key used to group and deduplicate names
///
/// Same as `normalize_for_matching`, except that names consisting only of
/// stripped material fall back to their trimmed lowercase form.
pub fn matching_key(name: &str) -> String {
    let normalized = normalize_for_matching(name);
    if normalized.is_empty() {
        name.trim().to_lowercase()
    } else {
        normalized
    }
}

/// Result of mapping a captured name onto the ingredient master
#[derive(Debug, Clone, PartialEq)]
pub struct Normalization<'a> {
    /// Canonical name on success, otherwise the captured name (trimmed)
    pub name: String,
    pub normalized: bool,
    pub kind: MatchKind,
    pub master: Option<&'a IngredientMaster>,
}

impl<'a> Normalization<'a> {
    fn unmatched(captured: &str) -> Self {
        Self {
            name: captured.trim().to_string(),
            normalized: false,
            kind: MatchKind::None,
            master: None,
        }
    }

    fn matched(master: &'a IngredientMaster, kind: MatchKind) -> Self {
        Self {
            name: master.canonical_name.clone(),
            normalized: true,
            kind,
            master: Some(master),
        }
    }
}

struct CompiledMaster<'a> {
    master: &'a IngredientMaster,
    canonical: String,
    literal: Option<(String, &'a str)>,
    pattern: Option<Regex>,
    anchored: Option<Regex>,
}

/// Ingredient master compiled once for repeated lookups
///
/// Literal patterns are normalized and regex patterns compiled up front.
/// Patterns that fail to compile are skipped, so a broken record simply never
/// matches.
pub struct MasterIndex<'a> {
    entries: Vec<CompiledMaster<'a>>,
    matcher: NameMatcher,
}

impl<'a> MasterIndex<'a> {
    pub fn new(masters: &'a [IngredientMaster]) -> Self {
        Self::with_matcher(masters, NameMatcher::new())
    }

    pub fn with_matcher(masters: &'a [IngredientMaster], matcher: NameMatcher) -> Self {
        let entries = masters.iter().map(compile_master).collect();
        Self { entries, matcher }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Map a captured name to a master record
    ///
    /// Every record is tried for an exact match before any partial match is
    /// considered. Among partial matches the record whose recognised text is
    /// closest in length to the captured name wins.
    pub fn resolve(&self, captured: &str) -> Normalization<'a> {
        let normalized = normalize_for_matching(captured);
        if normalized.is_empty() {
            return Normalization::unmatched(captured);
        }
        let raw = captured.trim();

        if let Some(entry) = self
            .entries
            .iter()
            .find(|entry| self.is_exact(entry, raw, &normalized))
        {
            debug!(
                "Normalized '{}' to '{}' (exact)",
                captured, entry.master.canonical_name
            );
            return Normalization::matched(entry.master, MatchKind::Exact);
        }

        let target_len = raw.chars().count();
        let mut best: Option<(usize, &CompiledMaster<'a>)> = None;
        for entry in &self.entries {
            let Some(matched_len) = self.partial_len(entry, raw, &normalized) else {
                continue;
            };
            let distance = matched_len.abs_diff(target_len);
            if best.map_or(true, |(best_distance, _)| distance < best_distance) {
                best = Some((distance, entry));
            }
        }

        match best {
            Some((_, entry)) => {
                debug!(
                    "Normalized '{}' to '{}' (partial)",
                    captured, entry.master.canonical_name
                );
                Normalization::matched(entry.master, MatchKind::Partial)
            }
            None => {
                trace!("No ingredient master entry for '{}'", captured);
                Normalization::unmatched(captured)
            }
        }
    }

    fn is_exact(&self, entry: &CompiledMaster<'a>, raw: &str, normalized: &str) -> bool {
        if entry.canonical == normalized {
            return true;
        }
        if let Some((literal, _)) = &entry.literal {
            if literal == normalized {
                return true;
            }
        }
        entry
            .anchored
            .as_ref()
            .is_some_and(|re| re.is_match(raw) || re.is_match(normalized))
    }

    /// Length of the recognised text when the entry partially matches
    fn partial_len(&self, entry: &CompiledMaster<'a>, raw: &str, normalized: &str) -> Option<usize> {
        if let Some((literal, literal_raw)) = &entry.literal {
            if self.matcher.match_normalized(normalized, literal) != MatchKind::None {
                return Some(literal_raw.trim().chars().count());
            }
        }
        if let Some(re) = &entry.pattern {
            if re.is_match(raw) || re.is_match(normalized) {
                return Some(entry.master.canonical_name.chars().count());
            }
        }
        if self.matcher.match_normalized(normalized, &entry.canonical) != MatchKind::None {
            return Some(entry.master.canonical_name.chars().count());
        }
        None
    }
}

fn compile_master(master: &IngredientMaster) -> CompiledMaster<'_> {
    let mut compiled = CompiledMaster {
        master,
        canonical: normalize_for_matching(&master.canonical_name),
        literal: None,
        pattern: None,
        anchored: None,
    };

    match &master.recognition_pattern {
        Some(RecognitionPattern::Literal(literal)) => {
            let normalized = normalize_for_matching(literal);
            if !normalized.is_empty() {
                compiled.literal = Some((normalized, literal.as_str()));
            }
        }
        Some(RecognitionPattern::Pattern(pattern)) => {
            let unanchored = build_case_insensitive(pattern);
            let anchored = build_case_insensitive(&format!("^(?:{pattern})$"));
            match (unanchored, anchored) {
                (Ok(unanchored), Ok(anchored)) => {
                    compiled.pattern = Some(unanchored);
                    compiled.anchored = Some(anchored);
                }
                (Err(e), _) | (_, Err(e)) => {
                    warn!(
                        "Skipping invalid recognition pattern for '{}': {}",
                        master.canonical_name, e
                    );
                }
            }
        }
        None => {}
    }

    compiled
}

fn build_case_insensitive(pattern: &str) -> Result<Regex, regex::Error> {
    RegexBuilder::new(pattern).case_insensitive(true).build()
}

/// Map a captured name onto the ingredient master
///
/// Convenience wrapper that compiles the master list for a single lookup; use
/// `MasterIndex` when resolving many names against the same list.
pub fn normalize_against_master<'a>(
    captured_name: &str,
    masters: &'a [IngredientMaster],
) -> Normalization<'a> {
    MasterIndex::new(masters).resolve(captured_name)
}
