//! # Validation Module
//!
//! Input validation utilities for Maktaba POS.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Frontend (TypeScript)                                        │
//! │  ├── Basic format checks (empty, numeric)                              │
//! │  └── Immediate user feedback                                           │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE (defensive re-checks in the core)                │
//! │  ├── Inputs are assumed pre-validated by the caller, but every         │
//! │  │   state-mutating operation re-checks before touching state          │
//! │  └── Check-then-act: no mutation happens after a failed check          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use crate::error::ValidationError;
use crate::money::Money;
use crate::types::InvoiceItem;
use crate::{MAX_ITEM_QUANTITY, MAX_ORDER_ITEMS};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// String Validators
// =============================================================================

/// Validates a display name (product, customer, supplier, budget...).
///
/// ## Rules
/// - Must not be empty after trimming
/// - Must be at most 200 characters
///
/// ## Example
/// ```rust
/// use maktaba_core::validation::validate_name;
///
/// assert!(validate_name("name", "One Hundred Years of Solitude").is_ok());
/// assert!(validate_name("name", "   ").is_err());
/// ```
pub fn validate_name(field: &'static str, value: &str) -> ValidationResult<()> {
    let value = value.trim();

    if value.is_empty() {
        return Err(ValidationError::Required { field });
    }

    if value.len() > 200 {
        return Err(ValidationError::TooLong { field, max: 200 });
    }

    Ok(())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates an item quantity.
///
/// ## Rules
/// - Must be positive (> 0)
/// - Must not exceed MAX_ITEM_QUANTITY (999)
pub fn validate_quantity(qty: i64) -> ValidationResult<()> {
    if qty <= 0 {
        return Err(ValidationError::MustBePositive { field: "quantity" });
    }

    if qty > MAX_ITEM_QUANTITY {
        return Err(ValidationError::OutOfRange {
            field: "quantity",
            min: 1,
            max: MAX_ITEM_QUANTITY,
        });
    }

    Ok(())
}

/// Validates a money amount that must be strictly positive
/// (payments, expenses, manual ledger entries).
pub fn validate_amount(field: &'static str, amount: Money) -> ValidationResult<()> {
    if !amount.is_positive() {
        return Err(ValidationError::MustBePositive { field });
    }

    Ok(())
}

/// Validates a money amount that may be zero but not negative
/// (counted cash, prices, shipping fees).
pub fn validate_non_negative(field: &'static str, amount: Money) -> ValidationResult<()> {
    if amount.is_negative() {
        return Err(ValidationError::OutOfRange {
            field,
            min: 0,
            max: i64::MAX,
        });
    }

    Ok(())
}

/// Validates the factor for batch repricing.
///
/// ## Rules
/// - Must be finite and strictly positive
pub fn validate_price_factor(factor: f64) -> ValidationResult<()> {
    if !factor.is_finite() {
        return Err(ValidationError::InvalidFormat {
            field: "factor",
            reason: "must be a finite number",
        });
    }

    if factor <= 0.0 {
        return Err(ValidationError::MustBePositive { field: "factor" });
    }

    Ok(())
}

// =============================================================================
// Order Item Validators
// =============================================================================

/// Validates the line items of an order or return before any state is
/// touched.
///
/// ## Rules
/// - At most MAX_ORDER_ITEMS lines
/// - Every quantity positive and within range
/// - Prices non-negative; discount never exceeds the unit price (a line
///   may be free, never worth a negative amount)
pub fn validate_order_items(items: &[InvoiceItem]) -> ValidationResult<()> {
    if items.len() > MAX_ORDER_ITEMS {
        return Err(ValidationError::OutOfRange {
            field: "items",
            min: 1,
            max: MAX_ORDER_ITEMS as i64,
        });
    }

    for item in items {
        validate_quantity(item.quantity)?;

        if item.price_cents < 0 {
            return Err(ValidationError::OutOfRange {
                field: "price",
                min: 0,
                max: i64::MAX,
            });
        }

        let discount = item.discount_cents.unwrap_or(0);
        if discount < 0 || discount > item.price_cents {
            return Err(ValidationError::OutOfRange {
                field: "discount",
                min: 0,
                max: item.price_cents,
            });
        }
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
