//! # Quantity Parser
//!
//! This module turns free-text quantity expressions into typed values.
//!
//! ## Features
//!
//! - Integers and decimals ("2", "1.5", "２")
//! - Fractions and mixed numbers ("1/2", "1 1/2")
//! - Additive expressions ("1 + 1/2", "大さじ1+小さじ1" amounts)
//! - Ambiguous quantity words ("適量", "少々", "to taste") kept verbatim and
//!   counted as zero in arithmetic
//! - Unit suffix detection against the known unit vocabulary, longest first
//!
//! ## Usage
//!
//! ```rust
//! use pantry_reconcile::quantity::{parse_amount, parse_quantity, Amount};
//!
//! let qty = parse_quantity("200g");
//! assert_eq!(qty.amount, "200");
//! assert_eq!(qty.unit, "g");
//!
//! assert_eq!(parse_amount("1 1/2"), Some(Amount::Number(1.5)));
//! assert_eq!(parse_amount("適量"), Some(Amount::Ambiguous));
//! assert_eq!(parse_amount("lots"), None);
//! ```

use log::trace;
use regex::Regex;
use std::sync::LazyLock;

use crate::model::Quantity;
use crate::normalizer::to_half_width;
use crate::units::{known_units, UNITLESS};

/// A parsed amount
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Amount {
    Number(f64),
    /// A recognised non-numeric amount such as "to taste"
    Ambiguous,
}

impl Amount {
    /// Numeric value for arithmetic; ambiguous amounts count as zero
    pub fn value(&self) -> f64 {
        match self {
            Amount::Number(n) => *n,
            Amount::Ambiguous => 0.0,
        }
    }
}

/// Ambiguous quantity words, compared case-insensitively against the whole amount
static AMBIGUOUS_TOKENS: LazyLock<Vec<&'static str>> = LazyLock::new(|| {
    vec![
        "適量", "少々", "少量", "お好みで", "お好み", "ひとつまみ", "適宜", "少し",
        "to taste", "a pinch", "pinch", "as preferred", "as needed", "a little", "some",
    ]
});

/// Compiled regex patterns for amount parsing
struct AmountPatterns {
    /// Matches decimals and integers: "2", "1.5", ".5", "-3"
    decimal: Regex,
    /// Matches simple fractions: "1/2", "3⁄4"
    fraction: Regex,
    /// Matches mixed numbers: "1 1/2"
    mixed: Regex,
}

impl AmountPatterns {
    fn new() -> Self {
        Self {
            decimal: Regex::new(r"^-?(?:\d+(?:\.\d*)?|\.\d+)$").unwrap(),
            fraction: Regex::new(r"^(\d+)\s*[/⁄]\s*(\d+)$").unwrap(),
            mixed: Regex::new(r"^(\d+)\s+(\d+)\s*[/⁄]\s*(\d+)$").unwrap(),
        }
    }
}

static AMOUNT_PATTERNS: LazyLock<AmountPatterns> = LazyLock::new(AmountPatterns::new);

/// Check if the text is one of the known ambiguous quantity words
pub fn is_ambiguous_token(text: &str) -> bool {
    let lowered = text.trim().to_lowercase();
    AMBIGUOUS_TOKENS.iter().any(|token| *token == lowered)
}

/// Parse amount text into a number or the ambiguous sentinel
///
/// Returns `None` for text that is neither. Full-width digits are accepted.
pub fn parse_amount(text: &str) -> Option<Amount> {
    let text = to_half_width(text.trim());
    let text = text.trim();
    if text.is_empty() {
        return None;
    }

    if is_ambiguous_token(text) {
        return Some(Amount::Ambiguous);
    }

    if let Some((left, right)) = text.split_once('+') {
        let left = parse_amount(left)?;
        let right = parse_amount(right)?;
        return Some(Amount::Number(left.value() + right.value()));
    }

    if let Some(captures) = AMOUNT_PATTERNS.mixed.captures(text) {
        let whole: f64 = captures[1].parse().ok()?;
        let fraction = divide(&captures[2], &captures[3])?;
        return Some(Amount::Number(whole + fraction));
    }

    if let Some(captures) = AMOUNT_PATTERNS.fraction.captures(text) {
        return divide(&captures[1], &captures[2]).map(Amount::Number);
    }

    if AMOUNT_PATTERNS.decimal.is_match(text) {
        return text.parse::<f64>().ok().map(Amount::Number);
    }

    trace!("Unparseable amount: '{}'", text);
    None
}

fn divide(numerator: &str, denominator: &str) -> Option<f64> {
    let numerator: f64 = numerator.parse().ok()?;
    let denominator: f64 = denominator.parse().ok()?;
    if denominator == 0.0 {
        return None;
    }
    Some(numerator / denominator)
}

/// Split raw quantity text into amount and unit
///
/// The unit vocabulary is scanned longest first and the first unit that ends
/// the text wins; everything before it is the amount. Text without a known
/// unit suffix becomes a unitless quantity.
///
/// # Examples
///
/// ```rust
/// use pantry_reconcile::quantity::parse_quantity;
///
/// let qty = parse_quantity("1.5kg");
/// assert_eq!((qty.amount.as_str(), qty.unit.as_str()), ("1.5", "kg"));
///
/// let qty = parse_quantity("3");
/// assert_eq!((qty.amount.as_str(), qty.unit.as_str()), ("3", ""));
/// ```
pub fn parse_quantity(raw: &str) -> Quantity {
    let trimmed = raw.trim();

    if is_ambiguous_token(trimmed) {
        return Quantity::new(trimmed, UNITLESS);
    }

    if let Some(quantity) = split_unit_suffix(trimmed) {
        return quantity;
    }

    let lowered = trimmed.to_lowercase();
    if lowered != trimmed {
        if let Some(quantity) = split_unit_suffix(&lowered) {
            return quantity;
        }
    }

    Quantity::new(trimmed, UNITLESS)
}

fn split_unit_suffix(text: &str) -> Option<Quantity> {
    known_units().iter().find_map(|unit| {
        text.strip_suffix(unit)
            .map(|amount| Quantity::new(amount.trim(), *unit))
    })
}

/// Render an amount and unit as display text
///
/// Missing parts degrade to an empty string rather than failing.
pub fn format_quantity(amount: &str, unit: &str) -> String {
    format!("{}{}", amount.trim(), unit.trim())
}

/// Significant digits kept when rendering computed amounts
const SIGNIFICANT_DIGITS: i32 = 10;

/// Render a computed amount so that it parses back to the same value
///
/// Values are rounded to `SIGNIFICANT_DIGITS` significant digits to drop
/// floating point noise ("0.30000000000000004" becomes "0.3"). Whole numbers
/// have no decimal point and trailing zeros are trimmed.
pub fn format_amount(value: f64) -> String {
    if !value.is_finite() || value == 0.0 {
        return "0".to_string();
    }
    let magnitude = value.abs().log10().floor() as i32;
    let decimals = (SIGNIFICANT_DIGITS - 1 - magnitude).max(0) as usize;
    let text = format!("{value:.decimals$}");
    let text = if text.contains('.') {
        text.trim_end_matches('0').trim_end_matches('.')
    } else {
        text.as_str()
    };
    if text == "-0" {
        "0".to_string()
    } else {
        text.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn number(text: &str) -> f64 {
        match parse_amount(text) {
            Some(Amount::Number(n)) => n,
            other => panic!("Expected a number for '{text}', got {other:?}"),
        }
    }

    #[test]
    fn test_parse_integers_and_decimals() {
        assert_eq!(number("2"), 2.0);
        assert_eq!(number("1.5"), 1.5);
        assert_eq!(number(".5"), 0.5);
        assert_eq!(number(" 200 "), 200.0);
        assert_eq!(number("-3"), -3.0);
    }

    #[test]
    fn test_parse_full_width_digits() {
        assert_eq!(number("２"), 2.0);
        assert_eq!(number("１/２"), 0.5);
    }

    #[test]
    fn test_parse_fractions() {
        assert_eq!(number("1/2"), 0.5);
        assert_eq!(number("3 / 4"), 0.75);
        assert_eq!(number("1 1/2"), 1.5);
        assert_eq!(number("2 1/4"), 2.25);
        assert_eq!(parse_amount("1/0"), None);
        assert_eq!(parse_amount("1 1/0"), None);
    }

    #[test]
    fn test_parse_additive_expressions() {
        assert_eq!(number("1 + 1/2"), 1.5);
        assert_eq!(number("1/2+1/4"), 0.75);
        assert_eq!(number("1 + 2 + 3"), 6.0);
        assert_eq!(parse_amount("1 + lots"), None);
    }

    #[test]
    fn test_parse_ambiguous_tokens() {
        for token in ["適量", "少々", "お好みで", "to taste", "A Pinch", "as preferred"] {
            assert_eq!(parse_amount(token), Some(Amount::Ambiguous), "token {token}");
        }
        assert_eq!(Amount::Ambiguous.value(), 0.0);
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert_eq!(parse_amount(""), None);
        assert_eq!(parse_amount("lots"), None);
        assert_eq!(parse_amount("inf"), None);
        assert_eq!(parse_amount("NaN"), None);
        assert_eq!(parse_amount("1.2.3"), None);
    }

    #[test]
    fn test_parse_quantity_suffixes() {
        assert_eq!(parse_quantity("200g"), Quantity::new("200", "g"));
        assert_eq!(parse_quantity("1kg"), Quantity::new("1", "kg"));
        assert_eq!(parse_quantity("500 ml"), Quantity::new("500", "ml"));
        assert_eq!(parse_quantity("2個"), Quantity::new("2", "個"));
        assert_eq!(parse_quantity("1 1/2 cups"), Quantity::new("1 1/2", "cups"));
        assert_eq!(parse_quantity("3 pieces"), Quantity::new("3", "pieces"));
        assert_eq!(parse_quantity("2 bags"), Quantity::new("2", "bags"));
    }

    #[test]
    fn test_parse_quantity_longest_unit_wins() {
        // "キログラム" ends with "グラム", "kg" ends with "g"
        assert_eq!(parse_quantity("2キログラム"), Quantity::new("2", "キログラム"));
        assert_eq!(parse_quantity("2kg").unit, "kg");
        assert_eq!(parse_quantity("300mL").unit, "mL");
        assert_eq!(parse_quantity("1bag").unit, "bag");
    }

    #[test]
    fn test_parse_quantity_without_unit() {
        assert_eq!(parse_quantity("3"), Quantity::new("3", ""));
        assert_eq!(parse_quantity("少々"), Quantity::new("少々", ""));
        assert_eq!(parse_quantity("to taste"), Quantity::new("to taste", ""));
        assert_eq!(parse_quantity(""), Quantity::new("", ""));
    }

    #[test]
    fn test_parse_quantity_case_fallback() {
        assert_eq!(parse_quantity("2 Cups"), Quantity::new("2", "cups"));
        assert_eq!(parse_quantity("200G"), Quantity::new("200", "g"));
    }

    #[test]
    fn test_format_quantity_round_trip() {
        for unit in known_units() {
            for amount in ["200", "1.5", "1/2"] {
                let text = format_quantity(amount, unit);
                assert_eq!(
                    parse_quantity(&text),
                    Quantity::new(amount, *unit),
                    "round trip of '{text}'"
                );
            }
        }
        assert_eq!(parse_quantity(&format_quantity("3", UNITLESS)), Quantity::new("3", ""));
    }

    #[test]
    fn test_format_quantity_empty_safe() {
        assert_eq!(format_quantity("", "g"), "g");
        assert_eq!(format_quantity("2", ""), "2");
        assert_eq!(format_quantity("", ""), "");
    }

    #[test]
    fn test_format_amount() {
        assert_eq!(format_amount(1500.0), "1500");
        assert_eq!(format_amount(1.5), "1.5");
        assert_eq!(format_amount(1.0 / 3.0), "0.3333333333");
        assert_eq!(format_amount(0.1 + 0.2), "0.3");
        assert_eq!(format_amount(-200.0), "-200");
        assert_eq!(format_amount(-0.0), "0");
        assert_eq!(format_amount(f64::NAN), "0");
    }

    #[test]
    fn test_format_amount_keeps_small_and_large_magnitudes() {
        assert_eq!(format_amount(0.0002), "0.0002");
        assert_eq!(format_amount(0.000_000_5), "0.0000005");
        assert_eq!(format_amount(1e20), "100000000000000000000");
        assert_eq!(format_amount(-3e19), "-30000000000000000000");
        assert_eq!(number(&format_amount(1e20)), 1e20);
    }
}
