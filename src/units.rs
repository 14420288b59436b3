//! # Unit Conversion Module
//!
//! Fixed table of surface unit tokens and the compatibility class each one
//! belongs to. Mass and volume units convert into a shared base unit (`g` and
//! `ml`); every count unit is its own class, so "3 sheets" never combines with
//! "3 pieces". The empty unit token stands for unitless quantities and is also
//! a class of its own. Units missing from the table have no class and never
//! convert.
//!
//! Both Japanese counters and their English equivalents are recognised:
//!
//! | Class | Base | Surface units |
//! |---|---|---|
//! | Mass | g | mg, g, kg, グラム, キロ |
//! | Volume | ml | ml, cc, l, 小さじ/tsp, 大さじ/tbsp, カップ/cup, 合 |
//! | Count | itself | 個, 本, 枚, 袋, 缶, パック, 箱, 束, 片, 人分 and English names |

use log::trace;
use std::collections::HashMap;
use std::fmt;
use std::sync::LazyLock;

/// Token used for quantities without a unit ("3" eggs)
pub const UNITLESS: &str = "";

/// Discrete counters; each forms a singleton compatibility class
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CountUnit {
    Piece,
    Bottle,
    Sheet,
    Bag,
    Can,
    Pack,
    Box,
    Bundle,
    Clove,
    Serving,
}

impl CountUnit {
    pub fn base_unit(&self) -> &'static str {
        match self {
            CountUnit::Piece => "piece",
            CountUnit::Bottle => "bottle",
            CountUnit::Sheet => "sheet",
            CountUnit::Bag => "bag",
            CountUnit::Can => "can",
            CountUnit::Pack => "pack",
            CountUnit::Box => "box",
            CountUnit::Bundle => "bundle",
            CountUnit::Clove => "clove",
            CountUnit::Serving => "serving",
        }
    }
}

/// Set of units that can be summed or compared after conversion
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnitClass {
    Mass,
    Volume,
    Count(CountUnit),
    Unitless,
}

impl UnitClass {
    /// Canonical unit every member of the class converts to
    pub fn base_unit(&self) -> &'static str {
        match self {
            UnitClass::Mass => "g",
            UnitClass::Volume => "ml",
            UnitClass::Count(count) => count.base_unit(),
            UnitClass::Unitless => UNITLESS,
        }
    }
}

impl fmt::Display for UnitClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UnitClass::Mass => write!(f, "mass"),
            UnitClass::Volume => write!(f, "volume"),
            UnitClass::Count(count) => write!(f, "count:{}", count.base_unit()),
            UnitClass::Unitless => write!(f, "unitless"),
        }
    }
}

/// Conversion of one surface unit into its class's base unit
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UnitConversion {
    pub class: UnitClass,
    /// Multiply an amount in the surface unit by this to get base units
    pub factor: f64,
}

impl UnitConversion {
    pub fn base_unit(&self) -> &'static str {
        self.class.base_unit()
    }
}

/// An amount expressed in a class's base unit
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BaseAmount {
    pub amount: f64,
    pub base_unit: &'static str,
    pub class: UnitClass,
}

static UNIT_TABLE: LazyLock<HashMap<&'static str, UnitConversion>> = LazyLock::new(|| {
    let mut map = HashMap::new();

    // Mass
    insert_units(&mut map, &["mg", "ミリグラム"], UnitClass::Mass, 0.001);
    insert_units(&mut map, &["g", "gram", "grams", "グラム"], UnitClass::Mass, 1.0);
    insert_units(&mut map, &["kg", "kilogram", "kilograms", "キロ", "キログラム"], UnitClass::Mass, 1000.0);

    // Volume
    insert_units(&mut map, &["ml", "mL", "cc", "ミリリットル"], UnitClass::Volume, 1.0);
    insert_units(&mut map, &["l", "L", "liter", "liters", "litre", "litres", "リットル"], UnitClass::Volume, 1000.0);
    insert_units(&mut map, &["小さじ", "tsp", "teaspoon", "teaspoons"], UnitClass::Volume, 5.0);
    insert_units(&mut map, &["大さじ", "tbsp", "tablespoon", "tablespoons"], UnitClass::Volume, 15.0);
    insert_units(&mut map, &["カップ", "cup", "cups"], UnitClass::Volume, 200.0);
    insert_units(&mut map, &["合"], UnitClass::Volume, 180.0);

    // Count
    let counters: [(&[&'static str], CountUnit); 10] = [
        (&["個", "piece", "pieces", "pc", "pcs"], CountUnit::Piece),
        (&["本", "bottle", "bottles"], CountUnit::Bottle),
        (&["枚", "sheet", "sheets"], CountUnit::Sheet),
        (&["袋", "bag", "bags"], CountUnit::Bag),
        (&["缶", "can", "cans"], CountUnit::Can),
        (&["パック", "pack", "packs"], CountUnit::Pack),
        (&["箱", "box", "boxes"], CountUnit::Box),
        (&["束", "bundle", "bundles"], CountUnit::Bundle),
        (&["片", "かけ", "clove", "cloves"], CountUnit::Clove),
        (&["人分", "serving", "servings"], CountUnit::Serving),
    ];
    for (units, count) in counters {
        insert_units(&mut map, units, UnitClass::Count(count), 1.0);
    }

    insert_units(&mut map, &[UNITLESS], UnitClass::Unitless, 1.0);

    map
});

fn insert_units(
    map: &mut HashMap<&'static str, UnitConversion>,
    units: &[&'static str],
    class: UnitClass,
    factor: f64,
) {
    for unit in units {
        map.insert(*unit, UnitConversion { class, factor });
    }
}

/// Known surface units sorted longest first, excluding the unitless token
static UNITS_LONGEST_FIRST: LazyLock<Vec<&'static str>> = LazyLock::new(|| {
    let mut units: Vec<&'static str> = UNIT_TABLE
        .keys()
        .copied()
        .filter(|unit| !unit.is_empty())
        .collect();
    units.sort_by(|a, b| {
        b.chars()
            .count()
            .cmp(&a.chars().count())
            .then_with(|| a.cmp(b))
    });
    units
});

/// Known surface units, longest first
///
/// Suffix scans must walk this order so that "kg" is tried before "g".
pub fn known_units() -> &'static [&'static str] {
    &UNITS_LONGEST_FIRST
}

/// Look up a unit token, falling back to its lowercase form
pub fn lookup_unit(unit: &str) -> Option<UnitConversion> {
    let unit = unit.trim();
    UNIT_TABLE
        .get(unit)
        .or_else(|| UNIT_TABLE.get(unit.to_lowercase().as_str()))
        .copied()
}

/// Compatibility class of a unit, or `None` when the unit is unknown
pub fn unit_class(unit: &str) -> Option<UnitClass> {
    lookup_unit(unit).map(|conversion| conversion.class)
}

/// Check whether two units can be summed or compared
///
/// # Examples
///
/// ```rust
/// use pantry_reconcile::units::are_units_compatible;
///
/// assert!(are_units_compatible("g", "kg"));
/// assert!(are_units_compatible("大さじ", "ml"));
/// assert!(!are_units_compatible("piece", "sheet"));
/// assert!(!are_units_compatible("g", "furlong"));
/// ```
pub fn are_units_compatible(u1: &str, u2: &str) -> bool {
    match (unit_class(u1), unit_class(u2)) {
        (Some(c1), Some(c2)) => c1 == c2,
        _ => false,
    }
}

/// Convert an amount in `unit` to its base unit; unknown units yield `None`
pub fn convert_to_base(amount: f64, unit: &str) -> Option<BaseAmount> {
    let conversion = lookup_unit(unit)?;
    let base = BaseAmount {
        amount: amount * conversion.factor,
        base_unit: conversion.base_unit(),
        class: conversion.class,
    };
    trace!(
        "Converted {} '{}' to {} '{}'",
        amount,
        unit,
        base.amount,
        base.base_unit
    );
    Some(base)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mass_conversion() {
        let base = convert_to_base(1.5, "kg").unwrap();
        assert_eq!(base.amount, 1500.0);
        assert_eq!(base.base_unit, "g");
        assert_eq!(base.class, UnitClass::Mass);

        let base = convert_to_base(250.0, "mg").unwrap();
        assert!((base.amount - 0.25).abs() < 1e-9);
    }

    #[test]
    fn test_volume_conversion() {
        assert_eq!(convert_to_base(2.0, "大さじ").unwrap().amount, 30.0);
        assert_eq!(convert_to_base(1.0, "小さじ").unwrap().amount, 5.0);
        assert_eq!(convert_to_base(1.0, "カップ").unwrap().amount, 200.0);
        assert_eq!(convert_to_base(1.0, "L").unwrap().amount, 1000.0);
        assert_eq!(convert_to_base(3.0, "tbsp").unwrap().base_unit, "ml");
    }

    #[test]
    fn test_count_units_are_singletons() {
        assert!(are_units_compatible("個", "piece"));
        assert!(are_units_compatible("pieces", "piece"));
        assert!(!are_units_compatible("枚", "個"));
        assert!(!are_units_compatible("sheet", "piece"));
        assert!(!are_units_compatible("bag", "pack"));

        let base = convert_to_base(3.0, "枚").unwrap();
        assert_eq!(base.base_unit, "sheet");
        assert_eq!(base.amount, 3.0);
    }

    #[test]
    fn test_unitless_class() {
        assert!(are_units_compatible("", ""));
        assert!(are_units_compatible(" ", ""));
        assert!(!are_units_compatible("", "g"));
        assert_eq!(unit_class(UNITLESS), Some(UnitClass::Unitless));
    }

    #[test]
    fn test_unknown_units_fail_closed() {
        assert_eq!(lookup_unit("furlong"), None);
        assert_eq!(convert_to_base(1.0, "furlong"), None);
        assert!(!are_units_compatible("furlong", "furlong"));
    }

    #[test]
    fn test_lowercase_fallback() {
        assert_eq!(unit_class("KG"), Some(UnitClass::Mass));
        assert_eq!(unit_class("Cups"), Some(UnitClass::Volume));
    }

    #[test]
    fn test_known_units_longest_first() {
        let units = known_units();
        assert!(!units.contains(&UNITLESS));
        for pair in units.windows(2) {
            assert!(pair[0].chars().count() >= pair[1].chars().count());
        }
        let kg = units.iter().position(|u| *u == "kg").unwrap();
        let g = units.iter().position(|u| *u == "g").unwrap();
        assert!(kg < g);
    }
}
