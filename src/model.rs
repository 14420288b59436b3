//! # Pantry Record Model
//!
//! This module defines the records exchanged with the persistence and
//! extraction collaborators: quantities, stock rows, meal plans, shopping list
//! items, the ingredient master and purchase line items, plus the inclusive
//! date range used to slice meal plans.
//!
//! ## Core Concepts
//!
//! - **Quantity**: raw amount text plus a unit token, kept verbatim for display
//! - **StockItem**: one row of on-hand inventory
//! - **MealPlanEntry**: a planned meal and the ingredients it needs
//! - **ShoppingListItem**: a line on the shopping list, added manually or by the engine
//! - **IngredientMaster**: canonical ingredient names and how to recognise them
//! - **PurchaseItem**: a bought item (typically from a scanned receipt)
//!
//! ## Usage
//!
//! ```rust
//! use pantry_reconcile::model::{Quantity, StockItem};
//!
//! let milk = StockItem::new("milk", Quantity::new("1", "L"))
//!     .with_storage_location("fridge");
//!
//! assert_eq!(milk.quantity.to_string(), "1L");
//! ```
//!
//! All records serialize with camelCase field names, which is the shape the
//! persistence layer stores.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::quantity::{format_quantity, parse_amount, parse_quantity, Amount};

/// A quantity as entered by a person or extracted from a document
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Quantity {
    /// Raw amount text ("200", "1/2", "1 1/2", "適量")
    #[serde(default)]
    pub amount: String,
    /// Unit token ("g", "大さじ", "piece"); empty for unitless quantities
    #[serde(default)]
    pub unit: String,
}

impl Quantity {
    pub fn new(amount: impl Into<String>, unit: impl Into<String>) -> Self {
        Self {
            amount: amount.into(),
            unit: unit.into(),
        }
    }

    /// Parse free text such as "200g" or "2大さじ" into a quantity
    pub fn parse(raw: &str) -> Self {
        parse_quantity(raw)
    }

    /// The parsed amount, if the text is a number or a known ambiguous token
    pub fn parsed_amount(&self) -> Option<Amount> {
        parse_amount(&self.amount)
    }

    /// Check if the amount is an ambiguous token such as "to taste"
    pub fn is_ambiguous(&self) -> bool {
        matches!(self.parsed_amount(), Some(Amount::Ambiguous))
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", format_quantity(&self.amount, &self.unit))
    }
}

/// One row of on-hand inventory
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StockItem {
    /// Persistence identifier; `None` for rows the engine proposes to insert
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner_id: Option<String>,
    pub name: String,
    pub quantity: Quantity,
    #[serde(default)]
    pub best_before: Option<NaiveDate>,
    #[serde(default)]
    pub storage_location: Option<String>,
    #[serde(default)]
    pub is_homemade: bool,
    /// Purchase price, carried through without arithmetic
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
}

impl StockItem {
    pub fn new(name: &str, quantity: Quantity) -> Self {
        Self {
            id: None,
            owner_id: None,
            name: name.to_string(),
            quantity,
            best_before: None,
            storage_location: None,
            is_homemade: false,
            price: None,
        }
    }

    pub fn with_id(mut self, id: &str) -> Self {
        self.id = Some(id.to_string());
        self
    }

    pub fn with_owner(mut self, owner_id: &str) -> Self {
        self.owner_id = Some(owner_id.to_string());
        self
    }

    pub fn with_best_before(mut self, date: NaiveDate) -> Self {
        self.best_before = Some(date);
        self
    }

    pub fn with_storage_location(mut self, location: &str) -> Self {
        self.storage_location = Some(location.to_string());
        self
    }

    pub fn homemade(mut self) -> Self {
        self.is_homemade = true;
        self
    }
}

/// Meal slot within a day
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MealType {
    Breakfast,
    Lunch,
    Dinner,
    Snack,
}

impl fmt::Display for MealType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            MealType::Breakfast => "breakfast",
            MealType::Lunch => "lunch",
            MealType::Dinner => "dinner",
            MealType::Snack => "snack",
        };
        write!(f, "{name}")
    }
}

/// An ingredient line of a planned meal
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlannedIngredient {
    pub name: String,
    #[serde(default)]
    pub quantity: Quantity,
}

impl PlannedIngredient {
    pub fn new(name: &str, quantity: Quantity) -> Self {
        Self {
            name: name.to_string(),
            quantity,
        }
    }
}

/// A meal planned for a given date and slot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MealPlanEntry {
    pub date: NaiveDate,
    pub meal_type: MealType,
    #[serde(default)]
    pub ingredients: Vec<PlannedIngredient>,
}

impl MealPlanEntry {
    pub fn new(date: NaiveDate, meal_type: MealType) -> Self {
        Self {
            date,
            meal_type,
            ingredients: Vec::new(),
        }
    }

    /// Add an ingredient line, parsing the quantity from free text
    pub fn with_ingredient(mut self, name: &str, quantity: &str) -> Self {
        self.ingredients
            .push(PlannedIngredient::new(name, parse_quantity(quantity)));
        self
    }
}

/// Where a shopping list item came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AddedFrom {
    Manual,
    Auto,
}

/// A line on the shopping list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShoppingListItem {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    #[serde(default)]
    pub quantity: Option<Quantity>,
    #[serde(default)]
    pub checked: bool,
    pub added_from: AddedFrom,
    /// Category copied from the ingredient master, if known
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

impl ShoppingListItem {
    /// A manually added, unchecked item
    pub fn manual(name: &str, quantity: Option<Quantity>) -> Self {
        Self {
            id: None,
            name: name.to_string(),
            quantity,
            checked: false,
            added_from: AddedFrom::Manual,
            category: None,
        }
    }

    /// An unchecked item proposed by the shopping list generator
    pub fn auto(name: &str, quantity: Quantity) -> Self {
        Self {
            id: None,
            name: name.to_string(),
            quantity: Some(quantity),
            checked: false,
            added_from: AddedFrom::Auto,
            category: None,
        }
    }
}

/// How an ingredient master record recognises captured names
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "lowercase")]
pub enum RecognitionPattern {
    /// A literal name, compared after normalization
    Literal(String),
    /// A regular expression, matched case-insensitively
    Pattern(String),
}

/// Canonical ingredient record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IngredientMaster {
    pub canonical_name: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub default_unit: Option<String>,
    #[serde(default)]
    pub recognition_pattern: Option<RecognitionPattern>,
    /// Pantry staples that are never tracked against stock
    #[serde(default)]
    pub infinity: bool,
}

impl IngredientMaster {
    pub fn new(canonical_name: &str, category: &str) -> Self {
        Self {
            canonical_name: canonical_name.to_string(),
            category: category.to_string(),
            default_unit: None,
            recognition_pattern: None,
            infinity: false,
        }
    }

    pub fn with_literal(mut self, literal: &str) -> Self {
        self.recognition_pattern = Some(RecognitionPattern::Literal(literal.to_string()));
        self
    }

    pub fn with_pattern(mut self, pattern: &str) -> Self {
        self.recognition_pattern = Some(RecognitionPattern::Pattern(pattern.to_string()));
        self
    }

    pub fn with_default_unit(mut self, unit: &str) -> Self {
        self.default_unit = Some(unit.to_string());
        self
    }

    /// Mark this ingredient as a pantry staple that is never bought automatically
    pub fn infinite(mut self) -> Self {
        self.infinity = true;
        self
    }
}

/// A purchased item waiting to be merged into stock
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseItem {
    pub name: String,
    /// Name exactly as printed on the receipt, when it differs from `name`
    #[serde(default)]
    pub original_name: Option<String>,
    pub quantity: Quantity,
    #[serde(default)]
    pub best_before: Option<NaiveDate>,
    #[serde(default)]
    pub storage_location: Option<String>,
    #[serde(default)]
    pub price: Option<f64>,
    #[serde(default)]
    pub is_homemade: Option<bool>,
}

impl PurchaseItem {
    pub fn new(name: &str, quantity: Quantity) -> Self {
        Self {
            name: name.to_string(),
            original_name: None,
            quantity,
            best_before: None,
            storage_location: None,
            price: None,
            is_homemade: None,
        }
    }

    pub fn with_original_name(mut self, original_name: &str) -> Self {
        self.original_name = Some(original_name.to_string());
        self
    }

    pub fn with_best_before(mut self, date: NaiveDate) -> Self {
        self.best_before = Some(date);
        self
    }

    pub fn with_storage_location(mut self, location: &str) -> Self {
        self.storage_location = Some(location.to_string());
        self
    }

    pub fn with_price(mut self, price: f64) -> Self {
        self.price = Some(price);
        self
    }

    pub fn with_homemade(mut self, is_homemade: bool) -> Self {
        self.is_homemade = Some(is_homemade);
        self
    }
}

/// Inclusive range of dates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    /// A range covering a single day
    pub fn day(date: NaiveDate) -> Self {
        Self::new(date, date)
    }

    /// Check if `date` falls within the range; an inverted range contains nothing
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_quantity_display() {
        assert_eq!(Quantity::new("200", "g").to_string(), "200g");
        assert_eq!(Quantity::new("2", "").to_string(), "2");
        assert_eq!(Quantity::default().to_string(), "");
    }

    #[test]
    fn test_quantity_ambiguous() {
        assert!(Quantity::new("to taste", "").is_ambiguous());
        assert!(Quantity::new("少々", "").is_ambiguous());
        assert!(!Quantity::new("2", "g").is_ambiguous());
    }

    #[test]
    fn test_date_range_inclusive() {
        let range = DateRange::new(date(2024, 3, 1), date(2024, 3, 7));
        assert!(range.contains(date(2024, 3, 1)));
        assert!(range.contains(date(2024, 3, 7)));
        assert!(!range.contains(date(2024, 3, 8)));
        assert!(!range.contains(date(2024, 2, 29)));

        let inverted = DateRange::new(date(2024, 3, 7), date(2024, 3, 1));
        assert!(!inverted.contains(date(2024, 3, 4)));
    }

    #[test]
    fn test_meal_plan_builder_parses_quantities() {
        let entry = MealPlanEntry::new(date(2024, 3, 1), MealType::Dinner)
            .with_ingredient("onion", "2個")
            .with_ingredient("salt", "少々");

        assert_eq!(entry.ingredients.len(), 2);
        assert_eq!(entry.ingredients[0].quantity, Quantity::new("2", "個"));
        assert!(entry.ingredients[1].quantity.is_ambiguous());
    }

    #[test]
    fn test_stock_item_builder() {
        let item = StockItem::new("jam", Quantity::new("1", "bottle"))
            .with_id("s-1")
            .with_owner("user-1")
            .with_best_before(date(2024, 5, 1))
            .homemade();

        assert_eq!(item.id.as_deref(), Some("s-1"));
        assert_eq!(item.owner_id.as_deref(), Some("user-1"));
        assert_eq!(item.best_before, Some(date(2024, 5, 1)));
        assert!(item.is_homemade);
        assert_eq!(item.storage_location, None);
    }

    #[test]
    fn test_shopping_item_constructors() {
        let manual = ShoppingListItem::manual("bread", None);
        assert_eq!(manual.added_from, AddedFrom::Manual);
        assert!(!manual.checked);

        let auto = ShoppingListItem::auto("milk", Quantity::new("1", "L"));
        assert_eq!(auto.added_from, AddedFrom::Auto);
        assert_eq!(auto.quantity, Some(Quantity::new("1", "L")));
    }

    #[test]
    fn test_meal_type_display() {
        assert_eq!(MealType::Breakfast.to_string(), "breakfast");
        assert_eq!(MealType::Snack.to_string(), "snack");
        assert!(MealType::Breakfast < MealType::Dinner);
    }
}
