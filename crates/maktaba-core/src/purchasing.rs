//! # Purchasing
//!
//! Supplier purchases: recording, stock-in and instalment payments.
//!
//! ## Decoupled Steps
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Purchase Lifecycle                                │
//! │                                                                         │
//! │  add_purchase        record the supplier invoice (no side effects)     │
//! │        │                                                                │
//! │        ├── stock_in_purchase   apply items to inventory, once          │
//! │        │                       (idempotent: repeat calls are no-ops)   │
//! │        │                                                                │
//! │        └── add_purchase_payment   pay in instalments; each payment     │
//! │                                   posts a supplier_payment debit and    │
//! │                                   re-derives payment_status             │
//! │                                                                         │
//! │  Once stocked in, a purchase can no longer be edited or deleted:       │
//! │  inventory would silently diverge from the paper trail.                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::Utc;
use tracing::{debug, info};

use crate::error::{CoreError, CoreResult};
use crate::inventory::StockDelta;
use crate::ledger::TransactionInput;
use crate::money::Money;
use crate::state::AppState;
use crate::types::{
    PaymentStatus, Purchase, PurchaseItem, PurchasePayment, TransactionType,
};
use crate::validation::{validate_amount, validate_quantity};

// =============================================================================
// Purchase Input
// =============================================================================

/// Input for recording a supplier purchase. The supplier name is frozen
/// onto the record at creation time.
#[derive(Debug, Clone)]
pub struct PurchaseInput {
    pub supplier_id: String,
    pub items: Vec<PurchaseItem>,
}

fn validate_purchase_items(items: &[PurchaseItem]) -> CoreResult<()> {
    if items.is_empty() {
        return Err(CoreError::EmptyOrder);
    }
    for item in items {
        validate_quantity(item.quantity)?;
        if item.cost_price_cents < 0 {
            return Err(crate::error::ValidationError::OutOfRange {
                field: "costPrice",
                min: 0,
                max: i64::MAX,
            }
            .into());
        }
    }
    Ok(())
}

/// Derives a purchase's payment status from its payments.
fn derive_payment_status(paid: Money, total_cost: Money) -> PaymentStatus {
    if paid >= total_cost {
        PaymentStatus::Paid
    } else if paid.is_zero() {
        PaymentStatus::Unpaid
    } else {
        PaymentStatus::Partial
    }
}

impl AppState {
    /// Records a purchase. No inventory or ledger effect yet.
    pub fn add_purchase(&mut self, input: PurchaseInput) -> CoreResult<Purchase> {
        validate_purchase_items(&input.items)?;
        let supplier = self
            .suppliers
            .iter()
            .find(|s| s.id == input.supplier_id)
            .ok_or_else(|| CoreError::not_found("Supplier", input.supplier_id.clone()))?;

        let total_cost: Money = input.items.iter().map(|i| i.line_cost()).sum();
        let purchase = Purchase {
            id: Self::generate_id(),
            date: Utc::now(),
            supplier_id: supplier.id.clone(),
            supplier_name: supplier.name.clone(),
            items: input.items,
            total_cost_cents: total_cost.cents(),
            payment_status: PaymentStatus::Unpaid,
            payments: Vec::new(),
            is_stocked_in: false,
        };
        self.purchases.push(purchase.clone());
        info!(id = %purchase.id, supplier = %purchase.supplier_name, total = %total_cost, "Purchase recorded");
        Ok(purchase)
    }

    /// Replaces a purchase's items while it has not been stocked in yet.
    pub fn update_purchase(&mut self, id: &str, items: Vec<PurchaseItem>) -> CoreResult<()> {
        validate_purchase_items(&items)?;
        let purchase = self
            .purchases
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or_else(|| CoreError::not_found("Purchase", id))?;
        if purchase.is_stocked_in {
            return Err(CoreError::PurchaseAlreadyStockedIn(id.to_string()));
        }

        purchase.total_cost_cents = items.iter().map(|i| i.line_cost()).sum::<Money>().cents();
        purchase.items = items;
        purchase.payment_status =
            derive_payment_status(purchase.total_paid(), Money::from_cents(purchase.total_cost_cents));
        Ok(())
    }

    /// Deletes a purchase that has not been stocked in.
    pub fn delete_purchase(&mut self, id: &str) -> CoreResult<()> {
        let purchase = self
            .purchase(id)
            .ok_or_else(|| CoreError::not_found("Purchase", id))?;
        if purchase.is_stocked_in {
            return Err(CoreError::PurchaseAlreadyStockedIn(id.to_string()));
        }

        self.purchases.retain(|p| p.id != id);
        Ok(())
    }

    /// Applies a purchase's items to inventory.
    ///
    /// Idempotent: a purchase that was already stocked in is left alone
    /// and the call succeeds without touching stock again.
    pub fn stock_in_purchase(&mut self, id: &str) -> CoreResult<()> {
        let idx = self
            .purchases
            .iter()
            .position(|p| p.id == id)
            .ok_or_else(|| CoreError::not_found("Purchase", id))?;

        if self.purchases[idx].is_stocked_in {
            debug!(id = %id, "Purchase already stocked in, skipping");
            return Ok(());
        }

        let deltas: Vec<StockDelta> = self.purchases[idx]
            .items
            .iter()
            .map(|i| StockDelta {
                product_id: i.product_id.clone(),
                quantity: i.quantity,
            })
            .collect();
        self.apply_stock_deltas(&deltas);
        self.purchases[idx].is_stocked_in = true;
        info!(id = %id, lines = deltas.len(), "Purchase stocked in");
        Ok(())
    }

    /// Records an instalment payment towards a purchase.
    ///
    /// ## Rules
    /// - Amount must be positive and the paying account must exist
    /// - A `supplier_payment` debit is posted against that account
    /// - `payment_status` is re-derived: paid when cumulative payments
    ///   reach the total cost, partial when something but not all is paid
    pub fn add_purchase_payment(
        &mut self,
        purchase_id: &str,
        amount: Money,
        account_id: &str,
    ) -> CoreResult<()> {
        validate_amount("amount", amount)?;
        self.require_account(account_id)?;

        let idx = self
            .purchases
            .iter()
            .position(|p| p.id == purchase_id)
            .ok_or_else(|| CoreError::not_found("Purchase", purchase_id))?;

        let (supplier_name, total_cost, total_paid) = {
            let purchase = &mut self.purchases[idx];
            purchase.payments.push(PurchasePayment {
                date: Utc::now(),
                amount_cents: amount.cents(),
                account_id: account_id.to_string(),
            });
            let paid = purchase.total_paid();
            purchase.payment_status =
                derive_payment_status(paid, Money::from_cents(purchase.total_cost_cents));
            (
                purchase.supplier_name.clone(),
                Money::from_cents(purchase.total_cost_cents),
                paid,
            )
        };

        self.record_transaction(
            TransactionInput::debit(
                TransactionType::SupplierPayment,
                amount,
                account_id,
                format!("Payment to supplier {}", supplier_name),
            )
            .with_purchase(purchase_id.to_string()),
        )?;

        info!(
            purchase = %purchase_id,
            amount = %amount,
            paid = %total_paid,
            of = %total_cost,
            "Purchase payment recorded"
        );
        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
