//! # Till Reconciliation
//!
//! End-of-day cash counting for one cashier.
//!
//! ## Day Summary
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Closeout Arithmetic                                  │
//! │                                                                         │
//! │  cashier's invoices for the business day (UTC calendar day of the      │
//! │  paid date, falling back to the creation date):                         │
//! │                                                                         │
//! │    sales    = type sale                                                 │
//! │             + type shipping, completed AND paid                         │
//! │    returns  = type return (negative totals)                             │
//! │                                                                         │
//! │    net cash expected = Σ sales + Σ returns                              │
//! │    difference        = counted cash − net cash expected                 │
//! │                                                                         │
//! │  A closeout is a frozen reporting snapshot: it never mutates invoices  │
//! │  or accounts, and one exists per cashier per day at most.               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{NaiveDate, Utc};
use tracing::info;

use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::state::{AppState, Session};
use crate::types::{Invoice, OrderStatus, OrderType, PaymentStatus, TillCloseout};
use crate::validation::validate_non_negative;

// =============================================================================
// Day Summary
// =============================================================================

/// The derived numbers a closeout freezes.
#[derive(Debug, Clone, PartialEq)]
pub struct TillDaySummary {
    pub total_sales: Money,
    /// Positive magnitude of the refunds.
    pub total_returns: Money,
    pub net_cash_expected: Money,
    pub invoice_ids: Vec<String>,
}

fn business_day(invoice: &Invoice) -> NaiveDate {
    invoice.paid_date.unwrap_or(invoice.date).date_naive()
}

/// Summarizes one cashier's cash-relevant invoices for one business day.
///
/// ## Rules
/// - Counts invoices processed by `username` whose business day matches
/// - Sales: `sale` invoices, plus `shipping` invoices that are both
///   completed and paid (their cash arrived that day)
/// - Returns: `return` invoices; their totals are negative, the summary
///   reports the positive magnitude
pub fn summarize_till_day(invoices: &[Invoice], username: &str, day: NaiveDate) -> TillDaySummary {
    let mut total_sales = Money::zero();
    let mut total_returns = Money::zero();
    let mut invoice_ids = Vec::new();

    for invoice in invoices {
        if invoice.processed_by != username || business_day(invoice) != day {
            continue;
        }

        match invoice.order_type {
            OrderType::Sale => {
                total_sales += invoice.total();
                invoice_ids.push(invoice.id.clone());
            }
            OrderType::Shipping
                if invoice.status == OrderStatus::Completed
                    && invoice.payment_status == PaymentStatus::Paid =>
            {
                total_sales += invoice.total();
                invoice_ids.push(invoice.id.clone());
            }
            OrderType::Return => {
                total_returns += invoice.total();
                invoice_ids.push(invoice.id.clone());
            }
            _ => {}
        }
    }

    TillDaySummary {
        total_sales,
        total_returns: total_returns.abs(),
        net_cash_expected: total_sales + total_returns,
        invoice_ids,
    }
}

// =============================================================================
// Closing the till
// =============================================================================

impl AppState {
    /// Today's summary for the acting cashier, for display before closing.
    pub fn till_day_summary(&self, session: &Session) -> TillDaySummary {
        summarize_till_day(&self.invoices, &session.username, Utc::now().date_naive())
    }

    /// Closes the acting cashier's till for today.
    ///
    /// ## Rules
    /// - Requires a session
    /// - Counted cash may be zero but not negative
    /// - One closeout per cashier per business day; a second attempt errors
    /// - The record is immutable once created
    pub fn close_till(
        &mut self,
        session: Option<&Session>,
        counted_cash: Money,
        notes: Option<String>,
    ) -> CoreResult<TillCloseout> {
        let session = session.ok_or(CoreError::NoSession)?;
        validate_non_negative("countedCash", counted_cash)?;

        let today = Utc::now().date_naive();
        if self
            .till_closeouts
            .iter()
            .any(|c| c.closed_by_user_id == session.user_id && c.for_date == today)
        {
            return Err(CoreError::DuplicateCloseout {
                username: session.username.clone(),
                for_date: today,
            });
        }

        let summary = summarize_till_day(&self.invoices, &session.username, today);
        let closeout = TillCloseout {
            id: Self::generate_id(),
            date: Utc::now(),
            closed_by_user_id: session.user_id.clone(),
            closed_by_username: session.username.clone(),
            for_date: today,
            total_sales_cents: summary.total_sales.cents(),
            total_returns_cents: summary.total_returns.cents(),
            net_cash_expected_cents: summary.net_cash_expected.cents(),
            counted_cash_cents: counted_cash.cents(),
            difference_cents: (counted_cash - summary.net_cash_expected).cents(),
            notes,
            invoice_ids: summary.invoice_ids,
        };

        info!(
            by = %session.username,
            expected = %summary.net_cash_expected,
            counted = %counted_cash,
            difference = %(counted_cash - summary.net_cash_expected),
            "Till closed"
        );
        self.till_closeouts.push(closeout.clone());
        Ok(closeout)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
