//! # Domain Types
//!
//! Core domain types for the bookshop POS.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌──────────────────────┐  │
//! │  │    Product      │   │    Invoice      │   │ FinancialTransaction │  │
//! │  │  ─────────────  │   │  ─────────────  │   │  ──────────────────  │  │
//! │  │  id (UUID)      │   │  id (UUID)      │   │  id (UUID)           │  │
//! │  │  quantity       │   │  type/status    │   │  amount (positive)   │  │
//! │  │  price_cents    │   │  items[]        │   │  from/to account     │  │
//! │  └─────────────────┘   │  total_cents    │   └──────────────────────┘  │
//! │                        └─────────────────┘                             │
//! │                                                                         │
//! │  Plus: ReturnRequest, FinancialAccount, Purchase, Expense, Budget,     │
//! │        TillCloseout, User, Customer, Supplier, RequestedBook           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Snapshot Pattern
//! Invoice and purchase line items freeze product name, price and cost at
//! the time of the transaction. Later product edits never retroactively
//! change historical totals.
//!
//! ## Serialization
//! All types serialize camelCase to match the TypeScript frontend records
//! and the persisted snapshot format.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::Money;

// =============================================================================
// Product
// =============================================================================

/// A book (or other article) available for sale.
///
/// `quantity` is mutated only through the inventory ledger
/// ([`crate::state::AppState::apply_stock_deltas`]); order logic never
/// sets it directly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Product {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Display name (book title).
    pub name: String,

    /// Author, when known.
    pub author: Option<String>,

    /// Shelf category.
    pub category: Option<String>,

    /// Units on hand. Never negative.
    pub quantity: i64,

    /// Selling price in cents.
    pub price_cents: i64,

    /// Acquisition cost in cents (for profit calculations).
    pub cost_price_cents: Option<i64>,
}

impl Product {
    /// Returns the selling price as Money.
    #[inline]
    pub fn price(&self) -> Money {
        Money::from_cents(self.price_cents)
    }
}

// =============================================================================
// Invoice Items
// =============================================================================

/// A line item embedded in an invoice.
///
/// Uses the snapshot pattern: product name, price and cost are frozen at
/// the time of sale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct InvoiceItem {
    /// Product this line refers to.
    pub product_id: String,

    /// Product name at time of sale (frozen).
    pub product_name: String,

    /// Quantity sold or returned.
    pub quantity: i64,

    /// Unit price in cents at time of sale (frozen).
    pub price_cents: i64,

    /// Unit cost in cents at time of sale (frozen).
    pub cost_price_cents: Option<i64>,

    /// Per-unit discount in cents.
    pub discount_cents: Option<i64>,
}

impl InvoiceItem {
    /// Unit price after discount.
    #[inline]
    pub fn net_unit_price(&self) -> Money {
        Money::from_cents(self.price_cents - self.discount_cents.unwrap_or(0))
    }

    /// Line total: (price - discount) × quantity.
    #[inline]
    pub fn line_total(&self) -> Money {
        self.net_unit_price().multiply_quantity(self.quantity)
    }

    /// Line cost: cost × quantity (zero when cost is unknown).
    #[inline]
    pub fn line_cost(&self) -> Money {
        Money::from_cents(self.cost_price_cents.unwrap_or(0)).multiply_quantity(self.quantity)
    }
}

// =============================================================================
// Order Enums
// =============================================================================

/// The kind of order an invoice records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum OrderType {
    /// Over-the-counter sale, paid immediately.
    Sale,
    /// Delivery order; fulfilled and paid later.
    Shipping,
    /// Held stock for a customer; later converted to a sale or cancelled.
    Reservation,
    /// Reversal of a prior sale. Carries a negative total.
    Return,
}

/// The fulfilment status of an invoice.
///
/// `pending → {shipped → completed, cancelled}` for shipping orders;
/// `pending → {completed, cancelled}` for reservations. Sales and returns
/// are created directly in `completed`. `cancelled` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum OrderStatus {
    Pending,
    Shipped,
    Completed,
    Cancelled,
}

/// Payment state of an invoice or purchase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum PaymentStatus {
    Paid,
    Unpaid,
    Partial,
}

/// Where an order came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum OrderSource {
    #[serde(rename = "in-store")]
    InStore,
    Facebook,
    Instagram,
    Whatsapp,
    Other,
}

// =============================================================================
// Invoice
// =============================================================================

/// Customer details embedded on shipping and reservation invoices.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct CustomerInfo {
    /// Directory record id, when the customer is a known one.
    pub id: Option<String>,
    pub name: String,
    pub phone: String,
    pub address: Option<String>,
}

/// The central order record: sale, shipping order, reservation or return.
///
/// ## Invariants
/// - `total = Σ(price - discount) × quantity + shipping_fee`; negative for
///   returns.
/// - Invoices are never physically deleted: cancellation is a status, so
///   the collection is an append-only log of business events.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Invoice {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Creation time.
    #[ts(as = "String")]
    pub date: DateTime<Utc>,

    /// Set the first time the invoice becomes paid.
    #[ts(as = "Option<String>")]
    pub paid_date: Option<DateTime<Utc>>,

    /// Frozen line items.
    pub items: Vec<InvoiceItem>,

    /// Invoice total in cents. Negative for returns.
    pub total_cents: i64,

    /// Total acquisition cost of the items, in cents.
    pub total_cost_cents: i64,

    /// `total - total_cost - shipping_fee`, in cents.
    pub total_profit_cents: i64,

    #[serde(rename = "type")]
    pub order_type: OrderType,

    pub status: OrderStatus,

    pub payment_status: PaymentStatus,

    pub customer_info: Option<CustomerInfo>,

    /// Shipping fee in cents (zero for non-shipping orders).
    #[serde(default)]
    pub shipping_fee_cents: i64,

    pub source: Option<OrderSource>,

    /// Username of the cashier who processed the order.
    pub processed_by: String,

    /// For `return`-type invoices: the invoice being reversed. Used to
    /// track cumulative returned quantities.
    pub original_invoice_id: Option<String>,
}

impl Invoice {
    /// Invoice total as Money.
    #[inline]
    pub fn total(&self) -> Money {
        Money::from_cents(self.total_cents)
    }

    /// Whether this invoice has been cancelled (terminal).
    #[inline]
    pub fn is_cancelled(&self) -> bool {
        self.status == OrderStatus::Cancelled
    }
}

// =============================================================================
// Return Requests
// =============================================================================

/// Resolution state of a return request. Resolved states are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum RequestStatus {
    Pending,
    Approved,
    Rejected,
}

/// An approval-gated precursor to an actual return.
///
/// Created by non-admin cashiers; touches neither inventory nor the
/// ledger until approved.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct ReturnRequest {
    pub id: String,
    #[ts(as = "String")]
    pub request_date: DateTime<Utc>,
    pub original_invoice_id: String,
    /// Username of the requesting cashier.
    pub requested_by: String,
    pub status: RequestStatus,
    /// Subset of the original invoice's items being returned.
    pub items: Vec<InvoiceItem>,
    /// Username of the admin who resolved the request.
    pub processed_by: Option<String>,
    #[ts(as = "Option<String>")]
    pub processed_date: Option<DateTime<Utc>>,
}

// =============================================================================
// Financial Accounts & Transactions
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum AccountType {
    Cash,
    Bank,
    Other,
}

/// A money container: the shop's cash drawer, a bank account, or a
/// per-cashier till.
///
/// Balances are never stored on the account; they are always derived by
/// folding over the transaction log ([`crate::ledger::compute_balances`]).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct FinancialAccount {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub account_type: AccountType,
    /// Set on per-cashier tills: the user this drawer belongs to.
    pub user_id: Option<String>,
}

/// Categories of money movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum TransactionType {
    SaleIncome,
    Expense,
    ExpenseReversal,
    CapitalDeposit,
    ProfitWithdrawal,
    SupplierPayment,
    ReturnRefund,
    Transfer,
}

/// An append-only, directional money-movement record.
///
/// ## Invariants
/// - `amount` is always positive; direction comes from the account fields.
/// - Only `to_account_id` set → credit. Only `from_account_id` → debit.
///   Both set → transfer.
/// - Entries are never mutated or removed once appended.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct FinancialTransaction {
    pub id: String,
    #[ts(as = "String")]
    pub date: DateTime<Utc>,
    pub description: String,
    /// Always positive, in cents.
    pub amount_cents: i64,
    #[serde(rename = "type")]
    pub tx_type: TransactionType,
    /// Source of funds (expense, withdrawal, refund, transfer).
    pub from_account_id: Option<String>,
    /// Destination of funds (income, deposit, transfer).
    pub to_account_id: Option<String>,
    pub related_invoice_id: Option<String>,
    pub related_purchase_id: Option<String>,
    pub category: Option<String>,
    /// For transfer entries that fund a budget: the budget they count
    /// toward. An explicit key, not a category-string convention.
    pub budget_id: Option<String>,
}

impl FinancialTransaction {
    /// Transaction amount as Money.
    #[inline]
    pub fn amount(&self) -> Money {
        Money::from_cents(self.amount_cents)
    }
}

// =============================================================================
// Expenses
// =============================================================================

/// A recorded shop expense. Paired with an `expense` ledger entry on
/// creation and an `expense_reversal` entry on deletion, so the ledger
/// itself stays append-only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Expense {
    pub id: String,
    #[ts(as = "String")]
    pub date: DateTime<Utc>,
    pub description: String,
    /// Always positive, in cents.
    pub amount_cents: i64,
    pub category: Option<String>,
    /// The account it was paid from.
    pub account_id: String,
}

// =============================================================================
// Purchases (supplier side)
// =============================================================================

/// A line item on a supplier purchase.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct PurchaseItem {
    pub product_id: String,
    pub product_name: String,
    pub quantity: i64,
    /// Unit cost in cents.
    pub cost_price_cents: i64,
    /// Intended selling price in cents, when set at purchase time.
    pub price_cents: Option<i64>,
    pub category: Option<String>,
}

impl PurchaseItem {
    /// Line cost: cost × quantity.
    #[inline]
    pub fn line_cost(&self) -> Money {
        Money::from_cents(self.cost_price_cents).multiply_quantity(self.quantity)
    }
}

/// A payment instalment towards a purchase.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct PurchasePayment {
    #[ts(as = "String")]
    pub date: DateTime<Utc>,
    pub amount_cents: i64,
    /// Account the payment was made from.
    pub account_id: String,
}

/// A supplier invoice.
///
/// Recording the purchase and applying its items to stock are decoupled:
/// `is_stocked_in` gates whether the inventory ledger has seen the items.
/// `payment_status` is derived from cumulative `payments` vs `total_cost`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Purchase {
    pub id: String,
    #[ts(as = "String")]
    pub date: DateTime<Utc>,
    pub supplier_id: String,
    /// Supplier name at time of purchase (frozen).
    pub supplier_name: String,
    pub items: Vec<PurchaseItem>,
    pub total_cost_cents: i64,
    pub payment_status: PaymentStatus,
    pub payments: Vec<PurchasePayment>,
    pub is_stocked_in: bool,
}

impl Purchase {
    /// Sum of payments made so far.
    pub fn total_paid(&self) -> Money {
        self.payments
            .iter()
            .map(|p| Money::from_cents(p.amount_cents))
            .sum()
    }
}

// =============================================================================
// Budgets
// =============================================================================

/// A named savings target.
///
/// Progress is never stored: it is the derived sum of transfer-type
/// transactions carrying this budget's id
/// ([`crate::ledger::budget_funded`]).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Budget {
    pub id: String,
    pub name: String,
    pub target_amount_cents: i64,
}

// =============================================================================
// Till Closeout
// =============================================================================

/// Immutable end-of-day reconciliation record for one cashier.
///
/// A reporting snapshot, not a ledger operation: creating one mutates
/// neither invoices nor accounts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct TillCloseout {
    pub id: String,
    /// When the closing action happened.
    #[ts(as = "String")]
    pub date: DateTime<Utc>,
    pub closed_by_user_id: String,
    pub closed_by_username: String,
    /// The business day (UTC calendar day) this closeout covers.
    #[ts(as = "String")]
    pub for_date: NaiveDate,
    pub total_sales_cents: i64,
    /// Positive number representing the refunded amount.
    pub total_returns_cents: i64,
    pub net_cash_expected_cents: i64,
    pub counted_cash_cents: i64,
    /// `counted_cash - net_cash_expected`.
    pub difference_cents: i64,
    pub notes: Option<String>,
    /// The invoices covered by this closeout.
    pub invoice_ids: Vec<String>,
}

// =============================================================================
// Users
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum Role {
    Admin,
    Cashier,
}

/// A shop user as the core sees it.
///
/// Credential material (hash, salt) lives with the auth collaborator; the
/// core only needs identity to stamp `processed_by` and resolve tills.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct User {
    pub id: String,
    pub username: String,
    pub role: Role,
}

// =============================================================================
// Directory Records
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Customer {
    pub id: String,
    pub name: String,
    pub phone: String,
    pub address: Option<String>,
    pub email: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Supplier {
    pub id: String,
    pub name: String,
    pub contact_person: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum RequestedBookStatus {
    Pending,
    Fulfilled,
}

/// A customer request for a title the shop does not stock.
///
/// Requests for the same title are de-duplicated by name
/// (case-insensitive) and counted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct RequestedBook {
    pub id: String,
    pub name: String,
    pub customer_name: Option<String>,
    pub customer_phone: Option<String>,
    pub requested_count: i64,
    #[ts(as = "String")]
    pub last_requested_date: DateTime<Utc>,
    pub status: RequestedBookStatus,
}

// =============================================================================
// Unit Tests
// =============================================================================
