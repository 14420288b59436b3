//! # Ingredient Aggregator
//!
//! Sums the ingredients required by every meal planned within a date range.
//! Ingredient lines are grouped by normalized name; quantities in compatible
//! units are added together (in the base unit of their class).
//!
//! When a later line uses a unit that cannot be added to the running total,
//! the later line replaces the total. Both contributions are still listed as
//! sources. This mirrors how existing plans have always been totalled.

use log::{debug, warn};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

use crate::arithmetic::{add_quantities, has_numeric_amount};
use crate::model::{DateRange, MealPlanEntry, MealType, Quantity};
use crate::normalizer::matching_key;

/// The meal an ingredient requirement came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MealSource {
    pub date: chrono::NaiveDate,
    pub meal_type: MealType,
}

/// Total requirement for one ingredient
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregatedIngredient {
    /// Display name, as first written in the meal plan
    pub name: String,
    pub quantity: Quantity,
    pub sources: BTreeSet<MealSource>,
}

/// Aggregated requirements keyed by normalized name
pub type AggregatedIngredients = BTreeMap<String, AggregatedIngredient>;

/// Total the ingredients of all meals dated within `range`
///
/// # Arguments
///
/// * `meal_plans` - Meal plan entries, in any order
/// * `range` - Inclusive date range
///
/// # Returns
///
/// A map from normalized ingredient name to the summed requirement
pub fn aggregate(meal_plans: &[MealPlanEntry], range: &DateRange) -> AggregatedIngredients {
    let mut totals = AggregatedIngredients::new();

    for entry in meal_plans.iter().filter(|entry| range.contains(entry.date)) {
        let source = MealSource {
            date: entry.date,
            meal_type: entry.meal_type,
        };

        for ingredient in &entry.ingredients {
            if ingredient.name.trim().is_empty() {
                debug!("Skipping unnamed ingredient in {} {}", entry.date, entry.meal_type);
                continue;
            }
            let key = matching_key(&ingredient.name);

            match totals.get_mut(&key) {
                Some(total) => {
                    match add_quantities(&total.quantity, &ingredient.quantity) {
                        Ok(sum) => {
                            // Two non-numeric amounts keep the first text seen
                            if has_numeric_amount(&total.quantity) || has_numeric_amount(&ingredient.quantity) {
                                total.quantity = sum;
                            }
                        }
                        Err(e) => {
                            warn!(
                                "Replacing total for '{}' ({}) with {}: {}",
                                key, total.quantity, ingredient.quantity, e
                            );
                            total.quantity = ingredient.quantity.clone();
                        }
                    }
                    total.sources.insert(source);
                }
                None => {
                    totals.insert(
                        key,
                        AggregatedIngredient {
                            name: ingredient.name.trim().to_string(),
                            quantity: ingredient.quantity.clone(),
                            sources: BTreeSet::from([source]),
                        },
                    );
                }
            }
        }
    }

    debug!(
        "Aggregated {} ingredients between {} and {}",
        totals.len(),
        range.start,
        range.end
    );
    totals
}
