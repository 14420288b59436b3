//! # Quantity Arithmetic
//!
//! Add, subtract and compare quantities across units of the same
//! compatibility class. Amounts are normalized first: ambiguous tokens such as
//! "少々" count as zero, as does amount text that cannot be parsed at all.
//! Results are expressed in the base unit of the class, so adding
//! 1 大さじ and 1 小さじ yields "20ml".
//!
//! Combining quantities of different classes is an error value rather than a
//! silent zero.
//!
//! ```rust
//! use pantry_reconcile::arithmetic::add_quantities;
//! use pantry_reconcile::model::Quantity;
//!
//! let total = add_quantities(&Quantity::new("500", "g"), &Quantity::new("1", "kg")).unwrap();
//! assert_eq!(total, Quantity::new("1500", "g"));
//!
//! assert!(add_quantities(&Quantity::new("100", "g"), &Quantity::new("1", "piece")).is_err());
//! ```

use std::cmp::Ordering;

use crate::error::QuantityError;
use crate::model::Quantity;
use crate::quantity::{format_amount, parse_amount, Amount};
use crate::units::{are_units_compatible, convert_to_base, lookup_unit, BaseAmount};

/// Tolerance for floating point comparisons of base amounts
pub const EPSILON: f64 = 1e-6;

/// Numeric amount used in arithmetic
pub fn normalized_amount(quantity: &Quantity) -> f64 {
    parse_amount(&quantity.amount)
        .map(|amount| amount.value())
        .unwrap_or(0.0)
}

/// Convert both quantities into their shared base unit
fn to_shared_base(q1: &Quantity, q2: &Quantity) -> Result<(BaseAmount, BaseAmount), QuantityError> {
    for quantity in [q1, q2] {
        if lookup_unit(&quantity.unit).is_none() {
            return Err(QuantityError::UnknownUnit(quantity.unit.clone()));
        }
    }
    if !are_units_compatible(&q1.unit, &q2.unit) {
        return Err(QuantityError::IncompatibleUnits {
            left: q1.unit.clone(),
            right: q2.unit.clone(),
        });
    }

    let base1 = convert_to_base(normalized_amount(q1), &q1.unit)
        .ok_or_else(|| QuantityError::UnknownUnit(q1.unit.clone()))?;
    let base2 = convert_to_base(normalized_amount(q2), &q2.unit)
        .ok_or_else(|| QuantityError::UnknownUnit(q2.unit.clone()))?;
    Ok((base1, base2))
}

/// Check if the amount is a number, as opposed to an ambiguous word or unparseable text
pub fn has_numeric_amount(quantity: &Quantity) -> bool {
    matches!(parse_amount(&quantity.amount), Some(Amount::Number(_)))
}

/// Sum two quantities, expressed in the shared base unit
///
/// When neither amount is a number ("少々" + "少々") the text is kept as is.
/// Of two different texts the lexically smaller one is kept, so the sum does
/// not depend on operand order.
pub fn add_quantities(q1: &Quantity, q2: &Quantity) -> Result<Quantity, QuantityError> {
    let (base1, base2) = to_shared_base(q1, q2)?;
    if !has_numeric_amount(q1) && !has_numeric_amount(q2) {
        return Ok(q1.min(q2).clone());
    }
    Ok(Quantity::new(
        format_amount(base1.amount + base2.amount),
        base1.base_unit,
    ))
}

/// Subtract `q2` from `q1`, expressed in the shared base unit
///
/// Negative results are kept; they represent a deficit. When neither amount
/// is a number, `q1` is returned unchanged.
pub fn subtract_quantities(q1: &Quantity, q2: &Quantity) -> Result<Quantity, QuantityError> {
    let (base1, base2) = to_shared_base(q1, q2)?;
    if !has_numeric_amount(q1) && !has_numeric_amount(q2) {
        return Ok(q1.clone());
    }
    Ok(Quantity::new(
        format_amount(base1.amount - base2.amount),
        base1.base_unit,
    ))
}

/// Order two quantities after conversion, within `EPSILON`
pub fn compare_quantities(q1: &Quantity, q2: &Quantity) -> Result<Ordering, QuantityError> {
    let (base1, base2) = to_shared_base(q1, q2)?;
    let difference = base1.amount - base2.amount;
    if difference.abs() <= EPSILON {
        Ok(Ordering::Equal)
    } else if difference < 0.0 {
        Ok(Ordering::Less)
    } else {
        Ok(Ordering::Greater)
    }
}

/// Check if two quantities are equal after conversion; incompatible ones never are
pub fn quantities_equal(q1: &Quantity, q2: &Quantity) -> bool {
    matches!(compare_quantities(q1, q2), Ok(Ordering::Equal))
}

/// Check if a quantity is usable
///
/// The amount must be a number or an ambiguous token, its value finite and
/// non-negative, and the unit known.
pub fn is_valid_quantity(quantity: &Quantity) -> bool {
    let Some(amount) = parse_amount(&quantity.amount) else {
        return false;
    };
    let value = amount.value();
    value.is_finite() && value >= 0.0 && lookup_unit(&quantity.unit).is_some()
}
