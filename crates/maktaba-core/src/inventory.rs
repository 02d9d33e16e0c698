//! # Inventory Ledger
//!
//! Signed stock adjustments, the only path that mutates
//! `Product::quantity`.
//!
//! ## Delta Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Stock Delta Sources                              │
//! │                                                                         │
//! │  NEGATIVE (consume)                 POSITIVE (restock)                  │
//! │  ──────────────────                 ──────────────────                  │
//! │  • sale created                     • order cancelled                   │
//! │  • shipping order created           • return processed                  │
//! │  • reservation created              • purchase stocked in               │
//! │                                                                         │
//! │  Reservations and shipping orders consume stock IMMEDIATELY at          │
//! │  creation; only a later cancellation restores it.                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Clamping Policy
//! A resulting quantity below zero is clamped to zero, never raised as an
//! error. The shop is single-writer, so a genuine oversell cannot race in;
//! the clamp only guards display and persistence from a negative count.

use tracing::debug;

use crate::state::AppState;
use crate::types::InvoiceItem;

// =============================================================================
// Stock Delta
// =============================================================================

/// A signed quantity adjustment for one product.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StockDelta {
    pub product_id: String,
    pub quantity: i64,
}

impl StockDelta {
    /// A consuming delta for an invoice line (negative quantity).
    pub fn consume(item: &InvoiceItem) -> Self {
        StockDelta {
            product_id: item.product_id.clone(),
            quantity: -item.quantity,
        }
    }

    /// A restocking delta for an invoice line (positive quantity).
    pub fn restock(item: &InvoiceItem) -> Self {
        StockDelta {
            product_id: item.product_id.clone(),
            quantity: item.quantity,
        }
    }
}

/// Consuming deltas for a whole item list.
pub fn consume_deltas(items: &[InvoiceItem]) -> Vec<StockDelta> {
    items.iter().map(StockDelta::consume).collect()
}

/// Restocking deltas for a whole item list.
pub fn restock_deltas(items: &[InvoiceItem]) -> Vec<StockDelta> {
    items.iter().map(StockDelta::restock).collect()
}

impl AppState {
    /// Applies signed stock deltas to the product collection.
    ///
    /// ## Behavior
    /// - Resulting quantities are clamped at zero (policy, not an error).
    /// - Deltas for unknown product ids are skipped: a cancellation must
    ///   still restock the lines whose products were not deleted.
    pub fn apply_stock_deltas(&mut self, deltas: &[StockDelta]) {
        for delta in deltas {
            if let Some(product) = self.products.iter_mut().find(|p| p.id == delta.product_id) {
                let next = (product.quantity + delta.quantity).max(0);
                debug!(
                    product_id = %delta.product_id,
                    delta = delta.quantity,
                    from = product.quantity,
                    to = next,
                    "Applying stock delta"
                );
                product.quantity = next;
            }
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
