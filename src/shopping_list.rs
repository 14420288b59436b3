//! # Shopping List Generator
//!
//! Works out what needs to be bought for the meals planned in a date range.
//!
//! ## Pipeline
//!
//! 1. Aggregate the planned ingredients (see [`crate::aggregator`])
//! 2. Skip ingredients whose master record is flagged as infinity
//! 3. Skip ingredients the stock already covers
//! 4. Skip ingredients that are already on the shopping list, checked or not
//! 5. Emit an `auto` item for the remaining shortfall
//!
//! The generator never mutates the shopping list it is given. Running it
//! again with its own output appended to the list yields no new items.
//!
//! ## Usage
//!
//! ```rust
//! use chrono::NaiveDate;
//! use pantry_reconcile::model::{DateRange, MealPlanEntry, MealType, Quantity, StockItem};
//! use pantry_reconcile::shopping_list::generate_shopping_list;
//!
//! let day = NaiveDate::from_ymd_opt(2024, 6, 3).unwrap();
//! let plans = vec![MealPlanEntry::new(day, MealType::Dinner)
//!     .with_ingredient("tomato", "3個")
//!     .with_ingredient("pasta", "200g")];
//! let stock = vec![StockItem::new("pasta", Quantity::new("500", "g"))];
//!
//! let result = generate_shopping_list(&plans, &stock, &[], &[], &DateRange::day(day));
//! assert_eq!(result.items.len(), 1);
//! assert_eq!(result.items[0].name, "tomato");
//! assert_eq!(result.summary.satisfied, 1);
//! ```

use serde::Serialize;
use std::collections::HashSet;
use tracing::{debug, info, trace};

use crate::aggregator::{aggregate, AggregatedIngredient};
use crate::arithmetic::{normalized_amount, subtract_quantities};
use crate::config::EngineConfig;
use crate::matcher::{NameIndex, NameMatcher};
use crate::model::{DateRange, IngredientMaster, MealPlanEntry, Quantity, ShoppingListItem, StockItem};
use crate::normalizer::{matching_key, MasterIndex};
use crate::quantity::format_amount;

/// What the generator decided for one aggregated ingredient
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum IngredientStatus {
    /// Pantry staple, never bought automatically
    Infinity,
    /// Stock covers the requirement
    InStock,
    /// Needs buying, but the shopping list already has it
    AlreadyQueued,
    /// Needs buying; an item was emitted
    Added,
}

impl IngredientStatus {
    pub fn is_satisfied(&self) -> bool {
        matches!(self, IngredientStatus::Infinity | IngredientStatus::InStock)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IngredientDecision {
    pub name: String,
    pub status: IngredientStatus,
    pub required: Quantity,
    /// Quantity emitted on the shopping list, for `Added` ingredients
    pub shortfall: Option<Quantity>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShoppingListSummary {
    pub total_ingredients: usize,
    pub satisfied: usize,
    pub to_buy: usize,
}

/// Items to append to the shopping list, with a summary of the run
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShoppingListResult {
    pub items: Vec<ShoppingListItem>,
    pub summary: ShoppingListSummary,
    pub decisions: Vec<IngredientDecision>,
}

/// Shopping list generator
#[derive(Debug, Clone, Default)]
pub struct ShoppingListGenerator {
    matcher: NameMatcher,
}

impl ShoppingListGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: EngineConfig) -> Self {
        Self {
            matcher: NameMatcher::with_config(config),
        }
    }

    /// Generate the items to buy for the meals planned within `range`
    ///
    /// # Arguments
    ///
    /// * `meal_plans` - Planned meals; entries outside `range` are ignored
    /// * `stock` - On-hand inventory snapshot
    /// * `existing` - Current shopping list, checked and unchecked items alike
    /// * `masters` - Ingredient master records
    /// * `range` - Inclusive date range to plan for
    pub fn generate(
        &self,
        meal_plans: &[MealPlanEntry],
        stock: &[StockItem],
        existing: &[ShoppingListItem],
        masters: &[IngredientMaster],
        range: &DateRange,
    ) -> ShoppingListResult {
        if meal_plans.is_empty() {
            debug!("No meal plans, nothing to buy");
            return ShoppingListResult::default();
        }

        let aggregated = aggregate(meal_plans, range);
        let master_index = MasterIndex::with_matcher(masters, self.matcher.clone());
        let stock_index = self
            .matcher
            .index(stock.iter().map(|item| item.name.as_str()));
        let queued = queued_keys(existing, &master_index);

        let mut result = ShoppingListResult::default();
        result.summary.total_ingredients = aggregated.len();

        for (key, ingredient) in &aggregated {
            let resolution = master_index.resolve(&ingredient.name);
            let canonical_key = resolution
                .master
                .map(|master| matching_key(&master.canonical_name));

            let decision = if resolution.master.is_some_and(|master| master.infinity) {
                trace!(ingredient = %ingredient.name, "Infinity ingredient");
                IngredientDecision {
                    name: ingredient.name.clone(),
                    status: IngredientStatus::Infinity,
                    required: ingredient.quantity.clone(),
                    shortfall: None,
                }
            } else {
                let stock_item = self.find_stock(
                    &stock_index,
                    stock,
                    ingredient,
                    resolution.master.map(|master| master.canonical_name.as_str()),
                );

                if stock_item.is_some_and(|item| self.matcher.covers(&item.quantity, &ingredient.quantity)) {
                    IngredientDecision {
                        name: ingredient.name.clone(),
                        status: IngredientStatus::InStock,
                        required: ingredient.quantity.clone(),
                        shortfall: None,
                    }
                } else if queued.contains(key)
                    || canonical_key.as_ref().is_some_and(|k| queued.contains(k))
                {
                    IngredientDecision {
                        name: ingredient.name.clone(),
                        status: IngredientStatus::AlreadyQueued,
                        required: ingredient.quantity.clone(),
                        shortfall: None,
                    }
                } else {
                    let shortfall = self.shortfall(&ingredient.quantity, stock_item.map(|item| &item.quantity));
                    let mut item = ShoppingListItem::auto(&ingredient.name, shortfall.clone());
                    item.category = resolution
                        .master
                        .map(|master| master.category.clone())
                        .filter(|category| !category.is_empty());
                    debug!(
                        ingredient = %ingredient.name,
                        required = %ingredient.quantity,
                        shortfall = %shortfall,
                        "Adding shopping list item"
                    );
                    result.items.push(item);
                    IngredientDecision {
                        name: ingredient.name.clone(),
                        status: IngredientStatus::Added,
                        required: ingredient.quantity.clone(),
                        shortfall: Some(shortfall),
                    }
                }
            };

            if decision.status.is_satisfied() {
                result.summary.satisfied += 1;
            } else {
                result.summary.to_buy += 1;
            }
            result.decisions.push(decision);
        }

        info!(
            total = result.summary.total_ingredients,
            satisfied = result.summary.satisfied,
            to_buy = result.summary.to_buy,
            added = result.items.len(),
            "Generated shopping list"
        );
        result
    }

    /// Find the stock row for an ingredient, by its planned name first and
    /// then by its canonical name
    fn find_stock<'s>(
        &self,
        index: &NameIndex<'_>,
        stock: &'s [StockItem],
        ingredient: &AggregatedIngredient,
        canonical_name: Option<&str>,
    ) -> Option<&'s StockItem> {
        let position = index.find_best_match(&ingredient.name).index().or_else(|| {
            canonical_name.and_then(|canonical| index.find_best_match(canonical).index())
        })?;
        stock.get(position)
    }

    /// Quantity still missing once the matched stock is used up
    fn shortfall(&self, required: &Quantity, available: Option<&Quantity>) -> Quantity {
        let Some(available) = available else {
            return required.clone();
        };

        match subtract_quantities(required, available) {
            Ok(missing) => missing,
            Err(_) if self.matcher.interchangeable(&required.unit, &available.unit) => {
                let missing = normalized_amount(required) - normalized_amount(available);
                Quantity::new(format_amount(missing), required.unit.clone())
            }
            Err(_) => required.clone(),
        }
    }
}

/// Keys of everything already on the shopping list
///
/// Items are keyed by their own normalized name and, when they resolve to an
/// ingredient master record, by the canonical name as well.
fn queued_keys(existing: &[ShoppingListItem], masters: &MasterIndex<'_>) -> HashSet<String> {
    let mut keys = HashSet::new();
    for item in existing.iter().filter(|item| !item.name.trim().is_empty()) {
        keys.insert(matching_key(&item.name));
        if let Some(master) = masters.resolve(&item.name).master {
            keys.insert(matching_key(&master.canonical_name));
        }
    }
    keys
}

/// Generate a shopping list with the default configuration
pub fn generate_shopping_list(
    meal_plans: &[MealPlanEntry],
    stock: &[StockItem],
    existing: &[ShoppingListItem],
    masters: &[IngredientMaster],
    range: &DateRange,
) -> ShoppingListResult {
    ShoppingListGenerator::new().generate(meal_plans, stock, existing, masters, range)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{AddedFrom, MealType};
    use chrono::NaiveDate;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, d).unwrap()
    }

    fn range() -> DateRange {
        DateRange::new(day(3), day(9))
    }

    fn plans() -> Vec<MealPlanEntry> {
        vec![
            MealPlanEntry::new(day(3), MealType::Dinner)
                .with_ingredient("pork", "300g")
                .with_ingredient("onion", "1個")
                .with_ingredient("salt", "少々"),
            MealPlanEntry::new(day(4), MealType::Lunch)
                .with_ingredient("pork", "200g")
                .with_ingredient("milk", "200ml"),
        ]
    }

    fn masters() -> Vec<IngredientMaster> {
        vec![
            IngredientMaster::new("salt", "seasoning").infinite(),
            IngredientMaster::new("pork", "meat"),
            IngredientMaster::new("玉ねぎ", "vegetable").with_pattern("onions?|玉ねぎ|たまねぎ"),
        ]
    }

    #[test]
    fn test_empty_meal_plans() {
        let stock = vec![StockItem::new("milk", Quantity::new("1", "L"))];
        let result = generate_shopping_list(&[], &stock, &[], &masters(), &range());
        assert_eq!(result, ShoppingListResult::default());
    }

    #[test]
    fn test_generates_shortfall_items() {
        let stock = vec![
            StockItem::new("pork", Quantity::new("200", "g")),
            StockItem::new("milk", Quantity::new("1", "L")),
        ];
        let result = generate_shopping_list(&plans(), &stock, &[], &masters(), &range());

        assert_eq!(result.summary.total_ingredients, 4);
        assert_eq!(result.summary.satisfied, 2);
        assert_eq!(result.summary.to_buy, 2);

        let names: Vec<&str> = result.items.iter().map(|i| i.name.as_str()).collect();
        assert_eq!(names, vec!["onion", "pork"]);

        let pork = &result.items[1];
        assert_eq!(pork.quantity, Some(Quantity::new("300", "g")));
        assert_eq!(pork.added_from, AddedFrom::Auto);
        assert!(!pork.checked);
        assert_eq!(pork.category.as_deref(), Some("meat"));

        let onion = &result.items[0];
        assert_eq!(onion.quantity, Some(Quantity::new("1", "個")));
        assert_eq!(onion.category.as_deref(), Some("vegetable"));
    }

    #[test]
    fn test_infinity_ingredients_are_satisfied() {
        let result = generate_shopping_list(&plans(), &[], &[], &masters(), &range());
        let salt = result
            .decisions
            .iter()
            .find(|d| d.name == "salt")
            .unwrap();
        assert_eq!(salt.status, IngredientStatus::Infinity);
        assert!(result.items.iter().all(|item| item.name != "salt"));
    }

    #[test]
    fn test_existing_items_are_not_duplicated() {
        let mut bought = ShoppingListItem::manual("Pork (thin sliced)", None);
        bought.checked = true;
        let existing = vec![bought, ShoppingListItem::manual("たまねぎ", None)];

        let result = generate_shopping_list(&plans(), &[], &existing, &masters(), &range());
        let names: Vec<&str> = result.items.iter().map(|i| i.name.as_str()).collect();
        assert_eq!(names, vec!["milk"]);

        let queued = result
            .decisions
            .iter()
            .filter(|d| d.status == IngredientStatus::AlreadyQueued)
            .count();
        assert_eq!(queued, 2);
        assert_eq!(result.summary.to_buy, 3);
    }

    #[test]
    fn test_second_run_is_idempotent() {
        let stock = vec![StockItem::new("pork", Quantity::new("100", "g"))];
        let first = generate_shopping_list(&plans(), &stock, &[], &masters(), &range());
        assert!(!first.items.is_empty());

        let second = generate_shopping_list(&plans(), &stock, &first.items, &masters(), &range());
        assert!(second.items.is_empty());
        assert_eq!(second.summary.to_buy, first.summary.to_buy);
    }

    #[test]
    fn test_stock_found_by_canonical_name() {
        let stock = vec![StockItem::new("玉ねぎ", Quantity::new("3", "個"))];
        let result = generate_shopping_list(&plans(), &stock, &[], &masters(), &range());
        let onion = result.decisions.iter().find(|d| d.name == "onion").unwrap();
        assert_eq!(onion.status, IngredientStatus::InStock);
    }

    #[test]
    fn test_incompatible_stock_buys_full_requirement() {
        let stock = vec![StockItem::new("milk", Quantity::new("1", "piece"))];
        let plans = vec![MealPlanEntry::new(day(5), MealType::Breakfast).with_ingredient("milk", "200ml")];
        let result = generate_shopping_list(&plans, &stock, &[], &[], &range());
        assert_eq!(result.items[0].quantity, Some(Quantity::new("200", "ml")));
        assert_eq!(result.items[0].category, None);
    }

    #[test]
    fn test_repeated_ambiguous_amounts_stay_readable() {
        let plans = vec![
            MealPlanEntry::new(day(3), MealType::Dinner)
                .with_ingredient("pepper", "少々")
                .with_ingredient("udon", "2玉"),
            MealPlanEntry::new(day(6), MealType::Dinner)
                .with_ingredient("pepper", "少々")
                .with_ingredient("udon", "1玉"),
        ];
        let result = generate_shopping_list(&plans, &[], &[], &[], &range());

        let quantities: Vec<(&str, Option<Quantity>)> = result
            .items
            .iter()
            .map(|item| (item.name.as_str(), item.quantity.clone()))
            .collect();
        assert_eq!(
            quantities,
            vec![
                ("pepper", Some(Quantity::new("少々", ""))),
                ("udon", Some(Quantity::new("2玉", ""))),
            ]
        );
    }

    #[test]
    fn test_legacy_count_shortfall_keeps_required_unit() {
        let stock = vec![StockItem::new("carrot", Quantity::new("1", "本"))];
        let plans = vec![MealPlanEntry::new(day(5), MealType::Dinner).with_ingredient("carrot", "3個")];

        let result = generate_shopping_list(&plans, &stock, &[], &[], &range());
        assert_eq!(result.items[0].quantity, Some(Quantity::new("2", "個")));

        let strict = ShoppingListGenerator::with_config(EngineConfig {
            legacy_count_interchange: false,
            ..Default::default()
        });
        let result = strict.generate(&plans, &stock, &[], &[], &range());
        assert_eq!(result.items[0].quantity, Some(Quantity::new("3", "個")));
    }
}
