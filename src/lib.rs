//! # Pantry Reconcile
//!
//! Quantity and ingredient reconciliation for a meal planning and pantry
//! inventory tool. The crate parses free-text quantities, converts them across
//! compatible units, matches ingredient names, and reconciles planned meals,
//! on-hand stock and the shopping list into proposed changes.
//!
//! Every function is pure: records come in as snapshots and the result
//! describes what to insert or update. Applying it is up to the caller.
//!
//! ## Modules
//!
//! - [`quantity`]: free text to `Quantity`
//! - [`units`]: unit table and compatibility classes
//! - [`arithmetic`]: add, subtract and compare quantities
//! - [`normalizer`]: name canonicalization and ingredient master lookup
//! - [`matcher`]: exact and partial name matching, stock availability
//! - [`aggregator`]: requirements summed across meal plans
//! - [`shopping_list`]: what to buy for a date range
//! - [`stock_merge`]: purchases merged into stock

pub mod aggregator;
pub mod arithmetic;
pub mod config;
pub mod error;
pub mod matcher;
pub mod model;
pub mod normalizer;
pub mod quantity;
pub mod shopping_list;
pub mod stock_merge;
pub mod units;

pub use arithmetic::{add_quantities, compare_quantities, subtract_quantities};
pub use config::EngineConfig;
pub use error::QuantityError;
pub use matcher::{batch_match, check_stock_availability, find_best_match, is_name_match, MatchKind};
pub use model::{
    DateRange, IngredientMaster, MealPlanEntry, MealType, PurchaseItem, Quantity, ShoppingListItem,
    StockItem,
};
pub use quantity::{format_quantity, parse_quantity};
pub use shopping_list::{generate_shopping_list, ShoppingListResult};
pub use stock_merge::{merge_stock_with_purchases, MergeResult};
