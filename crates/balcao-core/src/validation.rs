//! # Validation Module
//!
//! Name normalization and input validation for Balcão POS.
//!
//! ## Validation Strategy
//! ```text
//! Layer 1: UI collaborators        basic format checks, user feedback
//! Layer 2: THIS MODULE             business rule validation, runs
//!                                  before any mutation
//! Layer 3: SQLite                  NOT NULL / UNIQUE / CHECK constraints
//! ```
//!
//! Every rule here fires before the engines touch the store, so a
//! validation failure guarantees no side effects.

use crate::error::{ValidationError, ValidationResult};

/// Longest accepted product / customer name.
pub const MAX_NAME_LEN: usize = 200;

// =============================================================================
// Name Normalization
// =============================================================================

/// Normalizes a product name: trim surrounding whitespace, collapse
/// internal runs, then title-case each word.
///
/// Applied identically on **every** read and write path, so lookups are
/// insensitive to operator casing and spacing:
///
/// ```rust
/// use balcao_core::validation::normalize_product_name;
///
/// assert_eq!(normalize_product_name("  coca COLA  "), "Coca Cola");
/// assert_eq!(normalize_product_name("pão de queijo"), "Pão De Queijo");
/// ```
pub fn normalize_product_name(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for word in raw.split_whitespace() {
        if !out.is_empty() {
            out.push(' ');
        }
        let mut chars = word.chars();
        if let Some(first) = chars.next() {
            out.extend(first.to_uppercase());
            out.extend(chars.flat_map(|c| c.to_lowercase()));
        }
    }
    out
}

// =============================================================================
// String Validators
// =============================================================================

/// Validates a product name and returns its normalized form.
pub fn validate_product_name(name: &str) -> ValidationResult<String> {
    let normalized = normalize_product_name(name);

    if normalized.is_empty() {
        return Err(ValidationError::Required { field: "product" });
    }
    if normalized.len() > MAX_NAME_LEN {
        return Err(ValidationError::TooLong {
            field: "product",
            max: MAX_NAME_LEN,
        });
    }

    Ok(normalized)
}

/// Validates a customer name (required on credit sales) and returns it
/// trimmed.
pub fn validate_customer_name(name: &str) -> ValidationResult<String> {
    let name = name.trim();

    if name.is_empty() {
        return Err(ValidationError::Required { field: "customer" });
    }
    if name.len() > MAX_NAME_LEN {
        return Err(ValidationError::TooLong {
            field: "customer",
            max: MAX_NAME_LEN,
        });
    }

    Ok(name.to_string())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Quantity for a catalog entry or stock adjustment: zero is a valid
/// level (sold out), negatives are not.
pub fn validate_initial_quantity(qty: i64) -> ValidationResult<()> {
    if qty < 0 {
        return Err(ValidationError::MustBeNonNegative { field: "quantity" });
    }
    Ok(())
}

/// Quantity for a sale: must move at least one unit.
pub fn validate_sale_quantity(qty: i64) -> ValidationResult<()> {
    if qty <= 0 {
        return Err(ValidationError::MustBePositive { field: "quantity" });
    }
    Ok(())
}

/// Catalog price in cents: free items allowed, negative prices not.
pub fn validate_price(cents: i64) -> ValidationResult<()> {
    if cents < 0 {
        return Err(ValidationError::MustBeNonNegative { field: "price" });
    }
    Ok(())
}

/// Unit price at the moment of sale: must be positive, a zero-value
/// sale is operator error.
pub fn validate_unit_price(cents: i64) -> ValidationResult<()> {
    if cents <= 0 {
        return Err(ValidationError::MustBePositive { field: "unit price" });
    }
    Ok(())
}

/// Manual withdrawal/deposit amount: strictly positive.
pub fn validate_movement_amount(cents: i64) -> ValidationResult<()> {
    if cents <= 0 {
        return Err(ValidationError::MustBePositive { field: "amount" });
    }
    Ok(())
}

/// Opening float at session open: an empty drawer is allowed.
pub fn validate_opening_float(cents: i64) -> ValidationResult<()> {
    if cents < 0 {
        return Err(ValidationError::MustBeNonNegative {
            field: "opening float",
        });
    }
    Ok(())
}

/// Counted amount at session close: zero is a legitimate count.
pub fn validate_counted_amount(cents: i64) -> ValidationResult<()> {
    if cents < 0 {
        return Err(ValidationError::MustBeNonNegative {
            field: "counted amount",
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalization_is_casing_and_spacing_insensitive() {
        assert_eq!(normalize_product_name("coffee"), "Coffee");
        assert_eq!(normalize_product_name("  COFFEE "), "Coffee");
        assert_eq!(normalize_product_name("coca   cola 2l"), "Coca Cola 2l");
        assert_eq!(
            normalize_product_name("x-burger"),
            normalize_product_name("  X-BURGER ")
        );
        assert_eq!(normalize_product_name("   "), "");
    }

    #[test]
    fn product_name_rules() {
        assert_eq!(validate_product_name(" soda ").unwrap(), "Soda");
        assert!(validate_product_name("").is_err());
        assert!(validate_product_name("   ").is_err());
        assert!(validate_product_name(&"a ".repeat(200)).is_err());
    }

    #[test]
    fn customer_name_rules() {
        assert_eq!(validate_customer_name(" Alice ").unwrap(), "Alice");
        assert!(validate_customer_name("  ").is_err());
    }

    #[test]
    fn quantity_rules() {
        assert!(validate_initial_quantity(0).is_ok());
        assert!(validate_initial_quantity(10).is_ok());
        assert!(validate_initial_quantity(-1).is_err());

        assert!(validate_sale_quantity(1).is_ok());
        assert!(validate_sale_quantity(0).is_err());
        assert!(validate_sale_quantity(-3).is_err());
    }

    #[test]
    fn money_rules() {
        assert!(validate_price(0).is_ok());
        assert!(validate_price(-1).is_err());

        assert!(validate_unit_price(1).is_ok());
        assert!(validate_unit_price(0).is_err());

        assert!(validate_movement_amount(2_000).is_ok());
        assert!(validate_movement_amount(0).is_err());

        assert!(validate_opening_float(0).is_ok());
        assert!(validate_opening_float(-1).is_err());

        assert!(validate_counted_amount(0).is_ok());
        assert!(validate_counted_amount(-100).is_err());
    }
}
