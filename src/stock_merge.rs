//! # Stock Merge Engine
//!
//! Reconciles purchased items, typically the line items of a scanned receipt,
//! with the on-hand stock. Each purchase either tops up an existing stock row
//! or becomes a new one. Nothing is written here: the result separates rows
//! to update from rows to insert and the persistence layer applies them.
//!
//! ## Rules
//!
//! - Purchase names are mapped onto the ingredient master, trying the cleaned
//!   up name first and then the name as printed on the receipt
//! - A stock row with a matching name and a compatible unit absorbs the
//!   purchase; its quantity becomes the sum in the base unit
//! - Purchase metadata (best-before date, storage location, price, homemade
//!   flag) replaces the stock row's when supplied
//! - A matching row with an incompatible unit is left alone and the purchase
//!   is inserted as a new row, so no purchase is ever dropped
//! - Several purchases landing on the same stock row produce one update

use serde::Serialize;
use std::collections::HashMap;
use tracing::{debug, info, warn};

use crate::arithmetic::add_quantities;
use crate::config::EngineConfig;
use crate::matcher::{NameIndex, NameMatcher};
use crate::model::{IngredientMaster, PurchaseItem, StockItem};
use crate::normalizer::{MasterIndex, Normalization};

/// Counters for one merge run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MergeStats {
    /// Purchases absorbed by an existing stock row
    pub merged_count: usize,
    /// Purchases staged as new rows, including incompatible ones
    pub new_count: usize,
    /// Purchases whose name was mapped onto the ingredient master
    pub normalized_count: usize,
    /// Purchases that matched a stock row with an incompatible unit
    pub incompatible_count: usize,
}

/// What happened to a single purchase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum MergeAction {
    Merged {
        #[serde(rename = "stockIndex")]
        stock_index: usize,
    },
    Inserted,
    InsertedIncompatible {
        #[serde(rename = "stockIndex")]
        stock_index: usize,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MergeOutcome {
    pub purchase_name: String,
    pub resolved_name: String,
    pub normalized: bool,
    pub action: MergeAction,
}

/// Proposed stock changes
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MergeResult {
    /// Existing rows with their new state, in order of first merge
    pub merged_items: Vec<StockItem>,
    /// Rows to insert
    pub new_items: Vec<StockItem>,
    pub stats: MergeStats,
    /// One entry per purchase, in input order
    pub outcomes: Vec<MergeOutcome>,
}

/// Stock merge engine
#[derive(Debug, Clone, Default)]
pub struct StockMergeEngine {
    matcher: NameMatcher,
}

impl StockMergeEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: EngineConfig) -> Self {
        Self {
            matcher: NameMatcher::with_config(config),
        }
    }

    /// Merge purchases into a stock snapshot
    ///
    /// # Arguments
    ///
    /// * `purchases` - Purchased items, processed in order
    /// * `stock` - Existing stock rows of the owner
    /// * `masters` - Ingredient master records used to clean up names
    /// * `owner_id` - Owner assigned to inserted rows
    pub fn merge(
        &self,
        purchases: &[PurchaseItem],
        stock: &[StockItem],
        masters: &[IngredientMaster],
        owner_id: &str,
    ) -> MergeResult {
        let master_index = MasterIndex::with_matcher(masters, self.matcher.clone());
        let stock_index = self
            .matcher
            .index(stock.iter().map(|item| item.name.as_str()));

        let mut result = MergeResult::default();
        // Stock position -> slot in `merged_items`
        let mut staged: HashMap<usize, usize> = HashMap::new();

        for purchase in purchases {
            let resolution = resolve_purchase(&master_index, purchase);
            if resolution.normalized {
                result.stats.normalized_count += 1;
            }

            let action = match find_stock_row(&stock_index, &resolution.name, purchase) {
                Some(position) => {
                    let current = match staged.get(&position) {
                        Some(&slot) => &result.merged_items[slot],
                        None => &stock[position],
                    };

                    match add_quantities(&current.quantity, &purchase.quantity) {
                        Ok(total) => {
                            let mut updated = current.clone();
                            updated.quantity = total;
                            apply_purchase_metadata(&mut updated, purchase);
                            debug!(
                                purchase = %purchase.name,
                                stock = %updated.name,
                                quantity = %updated.quantity,
                                "Merged purchase into stock"
                            );

                            match staged.get(&position) {
                                Some(&slot) => result.merged_items[slot] = updated,
                                None => {
                                    staged.insert(position, result.merged_items.len());
                                    result.merged_items.push(updated);
                                }
                            }
                            result.stats.merged_count += 1;
                            MergeAction::Merged {
                                stock_index: position,
                            }
                        }
                        Err(e) => {
                            warn!(
                                purchase = %purchase.name,
                                stock = %current.name,
                                error = %e,
                                "Unit mismatch, inserting purchase as a new row"
                            );
                            result
                                .new_items
                                .push(new_stock_row(&resolution.name, purchase, owner_id));
                            result.stats.new_count += 1;
                            result.stats.incompatible_count += 1;
                            MergeAction::InsertedIncompatible {
                                stock_index: position,
                            }
                        }
                    }
                }
                None => {
                    debug!(purchase = %purchase.name, name = %resolution.name, "New stock row");
                    result
                        .new_items
                        .push(new_stock_row(&resolution.name, purchase, owner_id));
                    result.stats.new_count += 1;
                    MergeAction::Inserted
                }
            };

            result.outcomes.push(MergeOutcome {
                purchase_name: purchase.name.clone(),
                resolved_name: resolution.name,
                normalized: resolution.normalized,
                action,
            });
        }

        info!(
            owner_id = %owner_id,
            purchases = purchases.len(),
            merged = result.stats.merged_count,
            new = result.stats.new_count,
            normalized = result.stats.normalized_count,
            incompatible = result.stats.incompatible_count,
            "Merged purchases into stock"
        );
        result
    }
}

/// Map a purchase onto the ingredient master by name, then by original name
fn resolve_purchase<'a>(masters: &MasterIndex<'a>, purchase: &PurchaseItem) -> Normalization<'a> {
    let by_name = masters.resolve(&purchase.name);
    if by_name.normalized {
        return by_name;
    }

    if let Some(original) = purchase.original_name.as_deref() {
        let by_original = masters.resolve(original);
        if by_original.normalized {
            return by_original;
        }
        if purchase.name.trim().is_empty() {
            return by_original;
        }
    }
    by_name
}

fn find_stock_row(index: &NameIndex<'_>, resolved_name: &str, purchase: &PurchaseItem) -> Option<usize> {
    index.find_best_match(resolved_name).index().or_else(|| {
        if purchase.name.trim() == resolved_name {
            None
        } else {
            index.find_best_match(&purchase.name).index()
        }
    })
}

fn apply_purchase_metadata(item: &mut StockItem, purchase: &PurchaseItem) {
    if let Some(best_before) = purchase.best_before {
        item.best_before = Some(best_before);
    }
    if let Some(location) = &purchase.storage_location {
        item.storage_location = Some(location.clone());
    }
    if let Some(price) = purchase.price {
        item.price = Some(price);
    }
    if let Some(is_homemade) = purchase.is_homemade {
        item.is_homemade = is_homemade;
    }
}

fn new_stock_row(name: &str, purchase: &PurchaseItem, owner_id: &str) -> StockItem {
    StockItem {
        id: None,
        owner_id: Some(owner_id.to_string()),
        name: name.to_string(),
        quantity: purchase.quantity.clone(),
        best_before: purchase.best_before,
        storage_location: purchase.storage_location.clone(),
        is_homemade: purchase.is_homemade.unwrap_or(false),
        price: purchase.price,
    }
}

/// Merge purchases into stock with the default configuration
pub fn merge_stock_with_purchases(
    purchases: &[PurchaseItem],
    stock: &[StockItem],
    masters: &[IngredientMaster],
    owner_id: &str,
) -> MergeResult {
    StockMergeEngine::new().merge(purchases, stock, masters, owner_id)
}
