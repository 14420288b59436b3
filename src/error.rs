//! # Quantity Error Types
//!
//! Errors returned by quantity arithmetic. The engine never panics on bad
//! input; instead arithmetic on quantities that cannot be combined returns
//! one of these variants so the caller decides what to do with it.

/// Reasons two quantities could not be combined or compared
#[derive(Debug, Clone, PartialEq)]
pub enum QuantityError {
    /// Both units are known but belong to different compatibility classes
    IncompatibleUnits {
        /// Unit of the left-hand operand
        left: String,
        /// Unit of the right-hand operand
        right: String,
    },
    /// The unit is not in the conversion table
    UnknownUnit(String),
}

impl QuantityError {
    pub fn is_incompatible(&self) -> bool {
        matches!(self, QuantityError::IncompatibleUnits { .. })
    }
}

impl std::fmt::Display for QuantityError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            QuantityError::IncompatibleUnits { left, right } => {
                write!(f, "Incompatible units: '{left}' and '{right}'")
            }
            QuantityError::UnknownUnit(unit) => write!(f, "Unknown unit: '{unit}'"),
        }
    }
}

impl std::error::Error for QuantityError {}
