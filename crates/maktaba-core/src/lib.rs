//! # maktaba-core: Pure Business Logic for Maktaba POS
//!
//! This crate is the **heart** of the bookshop's order and ledger engine.
//! It contains all business logic as pure, synchronous functions over an
//! explicit state value, with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Maktaba POS Architecture                           │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    Frontend (TypeScript)                        │   │
//! │  │    POS UI ──► Orders UI ──► Finance UI ──► Reports UI          │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ generated bindings (ts-rs)             │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ maktaba-core (THIS CRATE) ★                     │   │
//! │  │                                                                 │   │
//! │  │   ┌─────────┐ ┌─────────┐ ┌─────────┐ ┌─────────┐ ┌─────────┐ │   │
//! │  │   │  state  │ │ orders  │ │ ledger  │ │inventory│ │  till   │ │   │
//! │  │   │AppState │ │ Invoice │ │ balances│ │ deltas  │ │closeout │ │   │
//! │  │   │ Session │ │ returns │ │ budgets │ │  clamp  │ │ summary │ │   │
//! │  │   └─────────┘ └─────────┘ └─────────┘ └─────────┘ └─────────┘ │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • EXPLICIT STATE           │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                 maktaba-store (Persistence Layer)               │   │
//! │  │          full-state JSON snapshots, backup export/import        │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Product, Invoice, Purchase, etc.)
//! - [`money`] - Money type with integer arithmetic (no floating point!)
//! - [`error`] - Domain error types
//! - [`validation`] - Input validation rules
//! - [`state`] - The [`AppState`] container, [`Session`], product and
//!   directory management
//! - [`inventory`] - Signed stock deltas with clamp-at-zero
//! - [`orders`] - The invoice state machine and return workflow
//! - [`ledger`] - Append-only transactions, derived balances, budgets
//! - [`purchasing`] - Supplier purchases, stock-in, instalments
//! - [`till`] - End-of-day cash reconciliation
//!
//! ## Design Principles
//!
//! 1. **Explicit State**: Every operation takes `&mut AppState`; there are
//!    no ambient singletons
//! 2. **No I/O**: Database, network, file system access is FORBIDDEN here
//! 3. **Integer Money**: All monetary values are in cents (i64) to avoid
//!    float errors
//! 4. **Check-Then-Act**: Validation happens before any mutation, so a
//!    failed operation leaves the state untouched
//! 5. **Derived, Never Stored**: Account balances and budget progress are
//!    always folds over the transaction log
//!
//! ## Example Usage
//!
//! ```rust
//! use maktaba_core::money::Money;
//! use maktaba_core::state::AppState;
//!
//! let state = AppState::new();
//!
//! // Create money from cents (never from floats!)
//! let price = Money::from_cents(1550); // 15.50
//! assert_eq!(price.to_string(), "15.50");
//!
//! // Balances are derived from the (empty) transaction log.
//! assert!(state.account_balances().is_empty());
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod inventory;
pub mod ledger;
pub mod money;
pub mod orders;
pub mod purchasing;
pub mod state;
pub mod till;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================
// These allow users to do `use maktaba_core::Money` instead of
// `use maktaba_core::money::Money`

pub use error::{CoreError, CoreResult, ValidationError};
pub use inventory::StockDelta;
pub use ledger::{AccountInput, ExpenseInput, TransactionInput};
pub use money::Money;
pub use orders::OrderInput;
pub use purchasing::PurchaseInput;
pub use state::{AppState, CustomerInput, ProductInput, RepriceOp, Session, SupplierInput};
pub use till::{summarize_till_day, TillDaySummary};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Id of the shop's shared cash drawer.
///
/// ## Why a constant?
/// Income that cannot be routed to a cashier's personal till (and refunds
/// in the same situation) must land somewhere deterministic. The account
/// is created on demand when a snapshot predates it.
pub const DEFAULT_CASH_ACCOUNT_ID: &str = "cash-default";

/// Maximum line items allowed on a single order
///
/// ## Business Reason
/// Prevents runaway orders and ensures reasonable transaction sizes.
pub const MAX_ORDER_ITEMS: usize = 100;

/// Maximum quantity of a single item on an order line
///
/// ## Business Reason
/// Prevents accidental over-ordering (e.g., typing 1000 instead of 10).
pub const MAX_ITEM_QUANTITY: i64 = 999;
