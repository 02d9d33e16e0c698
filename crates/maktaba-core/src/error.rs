//! # Error Types
//!
//! Domain-specific error types for maktaba-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  maktaba-core errors (this file)                                        │
//! │  ├── CoreError        - Business rule violations                       │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  maktaba-store errors (separate crate)                                  │
//! │  └── StoreError       - Snapshot load/save failures                    │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → caller → user-facing message      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include context in error messages (record ids, quantities)
//! 3. Errors are enum variants, never String
//! 4. Missing referenced entities are explicit `NotFound` errors, never
//!    silent no-ops

use chrono::NaiveDate;
use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
///
/// These errors represent business rule violations or domain logic failures.
/// They should be caught and translated to user-friendly messages. Each one
/// is fatal to the single operation that raised it, never to the app.
#[derive(Debug, Error)]
pub enum CoreError {
    /// An order-mutating operation was invoked without an authenticated
    /// user session.
    #[error("No user session; this operation requires an authenticated user")]
    NoSession,

    /// A referenced record does not exist in the current state.
    ///
    /// ## When This Occurs
    /// - Updating or deleting a record by an id that was never created
    /// - Processing a return against an unknown original invoice
    /// - Posting a payment from an account that does not exist
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    /// The invoice is in a state that does not allow the requested
    /// transition (cancellation is terminal).
    #[error("Invoice {invoice_id} is {from}, cannot move to {to}")]
    InvalidStatusTransition {
        invoice_id: String,
        from: String,
        to: String,
    },

    /// An order was submitted with no items.
    #[error("Order must contain at least one item")]
    EmptyOrder,

    /// A return would exceed the quantity originally purchased.
    ///
    /// ## When This Occurs
    /// Cumulative returned quantity per product is tracked across all
    /// return invoices that reference the same original invoice; a new
    /// return may only cover what is still outstanding.
    #[error(
        "Cannot return {requested} of product {product_id}: only {remaining} still returnable"
    )]
    ReturnExceedsPurchased {
        product_id: String,
        remaining: i64,
        requested: i64,
    },

    /// A return request was already approved or rejected; resolved
    /// requests are terminal.
    #[error("Return request {0} has already been resolved")]
    RequestAlreadyResolved(String),

    /// A till was already closed for this cashier and business day.
    #[error("Till already closed for {username} on {for_date}")]
    DuplicateCloseout {
        username: String,
        for_date: NaiveDate,
    },

    /// A purchase whose items were already applied to stock cannot be
    /// edited or deleted; stock would silently diverge.
    #[error("Purchase {0} has already been stocked in")]
    PurchaseAlreadyStockedIn(String),

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

impl CoreError {
    /// Creates a NotFound error for a given entity type and id.
    pub fn not_found(entity: &'static str, id: impl Into<String>) -> Self {
        CoreError::NotFound {
            entity,
            id: id.into(),
        }
    }
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These errors occur when caller input doesn't meet requirements.
/// Used for early validation before any state is mutated.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: &'static str },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: &'static str },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange {
        field: &'static str,
        min: i64,
        max: i64,
    },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: &'static str, max: usize },

    /// Invalid format (e.g., a non-finite reprice factor).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat {
        field: &'static str,
        reason: &'static str,
    },

    /// Value is not in the allowed set.
    #[error("{field} must be one of: {allowed:?}")]
    NotAllowed {
        field: &'static str,
        allowed: Vec<&'static str>,
    },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================
