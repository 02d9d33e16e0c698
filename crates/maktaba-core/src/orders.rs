//! # Order State Machine
//!
//! Creation and lifecycle of invoices, plus the return workflow.
//!
//! ## Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Invoice Lifecycle                                │
//! │                                                                         │
//! │  sale ──────────────► completed/paid          (stock out, income now)  │
//! │                                                                         │
//! │  shipping ──► pending ──► shipped ──► completed                        │
//! │                  │                       (income on payment)           │
//! │                  └──► cancelled          (stock back)                  │
//! │                                                                         │
//! │  reservation ─► pending ──► completed (convert_to_sale: income now)    │
//! │                  │                                                      │
//! │                  └──► cancelled          (stock back)                  │
//! │                                                                         │
//! │  return ◄── process_return(original)     (stock back, refund out)      │
//! │                                                                         │
//! │  cancelled is terminal. Every order type consumes stock at creation.   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Returns of type `return` are never created through [`AppState::create_order`];
//! they only come out of [`AppState::process_return`], which ties them to the
//! original invoice and enforces the returnable quantity.

use chrono::Utc;
use tracing::info;

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::inventory::{consume_deltas, restock_deltas};
use crate::ledger::TransactionInput;
use crate::money::Money;
use crate::state::{AppState, Session};
use crate::types::{
    CustomerInfo, Invoice, InvoiceItem, OrderSource, OrderStatus, OrderType, PaymentStatus,
    RequestStatus, ReturnRequest, TransactionType,
};
use crate::validation::{validate_non_negative, validate_order_items};

// =============================================================================
// Order Input
// =============================================================================

/// Input for creating a new order.
#[derive(Debug, Clone)]
pub struct OrderInput {
    /// `sale`, `shipping` or `reservation`. Returns are created through
    /// [`AppState::process_return`] only.
    pub order_type: OrderType,
    pub items: Vec<InvoiceItem>,
    pub customer_info: Option<CustomerInfo>,
    pub shipping_fee: Money,
    pub source: Option<OrderSource>,
}

fn status_name(status: OrderStatus) -> &'static str {
    match status {
        OrderStatus::Pending => "pending",
        OrderStatus::Shipped => "shipped",
        OrderStatus::Completed => "completed",
        OrderStatus::Cancelled => "cancelled",
    }
}

/// Short id prefix for human-readable ledger descriptions.
fn short_id(id: &str) -> &str {
    &id[..id.len().min(8)]
}

impl AppState {
    // -------------------------------------------------------------------------
    // Creation
    // -------------------------------------------------------------------------

    /// Creates a sale, shipping order or reservation.
    ///
    /// ## Rules
    /// - Requires a session; the invoice is stamped with the cashier's name
    /// - Stock is consumed immediately for every order type
    /// - A `sale` completes and pays at once, crediting the cashier's till
    /// - `shipping` and `reservation` start `pending`/`unpaid`
    pub fn create_order(
        &mut self,
        session: Option<&Session>,
        input: OrderInput,
    ) -> CoreResult<Invoice> {
        let session = session.ok_or(CoreError::NoSession)?;

        if input.order_type == OrderType::Return {
            return Err(ValidationError::NotAllowed {
                field: "type",
                allowed: vec!["sale", "shipping", "reservation"],
            }
            .into());
        }
        if input.items.is_empty() {
            return Err(CoreError::EmptyOrder);
        }
        validate_order_items(&input.items)?;
        validate_non_negative("shippingFee", input.shipping_fee)?;

        let items_total: Money = input.items.iter().map(|i| i.line_total()).sum();
        let total = items_total + input.shipping_fee;
        if !total.is_positive() {
            return Err(ValidationError::MustBePositive { field: "total" }.into());
        }
        let total_cost: Money = input.items.iter().map(|i| i.line_cost()).sum();
        // Shipping fee is pass-through, not margin.
        let profit = items_total - total_cost;

        let now = Utc::now();
        let is_sale = input.order_type == OrderType::Sale;
        let invoice = Invoice {
            id: Self::generate_id(),
            date: now,
            paid_date: if is_sale { Some(now) } else { None },
            items: input.items,
            total_cents: total.cents(),
            total_cost_cents: total_cost.cents(),
            total_profit_cents: profit.cents(),
            order_type: input.order_type,
            status: if is_sale {
                OrderStatus::Completed
            } else {
                OrderStatus::Pending
            },
            payment_status: if is_sale {
                PaymentStatus::Paid
            } else {
                PaymentStatus::Unpaid
            },
            customer_info: input.customer_info,
            shipping_fee_cents: input.shipping_fee.cents(),
            source: input.source,
            processed_by: session.username.clone(),
            original_invoice_id: None,
        };

        let deltas = consume_deltas(&invoice.items);
        let result = invoice.clone();
        self.invoices.push(invoice);
        self.apply_stock_deltas(&deltas);

        if is_sale {
            let till = self.till_account_id(session);
            self.record_transaction(
                TransactionInput::credit(
                    TransactionType::SaleIncome,
                    total,
                    till,
                    format!("Income from sale invoice {}", short_id(&result.id)),
                )
                .with_invoice(result.id.clone()),
            )?;
        }

        info!(
            id = %result.id,
            order_type = ?result.order_type,
            total = %total,
            by = %session.username,
            "Order created"
        );
        Ok(result)
    }

    // -------------------------------------------------------------------------
    // Status transitions
    // -------------------------------------------------------------------------

    /// Moves an order through its lifecycle and optionally updates its
    /// payment status.
    ///
    /// ## Rules
    /// - `cancelled` is terminal: no transition leads out of it
    /// - Entering `cancelled` restocks the invoice's items (exactly once)
    /// - The first transition to `paid` stamps `paid_date` and credits the
    ///   income; repeating `paid` never double-posts
    pub fn update_order_status(
        &mut self,
        order_id: &str,
        status: OrderStatus,
        payment_status: Option<PaymentStatus>,
    ) -> CoreResult<()> {
        let idx = self
            .invoices
            .iter()
            .position(|i| i.id == order_id)
            .ok_or_else(|| CoreError::not_found("Invoice", order_id))?;

        let current = self.invoices[idx].status;
        if current == OrderStatus::Cancelled && status != OrderStatus::Cancelled {
            return Err(CoreError::InvalidStatusTransition {
                invoice_id: order_id.to_string(),
                from: status_name(current).to_string(),
                to: status_name(status).to_string(),
            });
        }

        let entering_cancelled =
            status == OrderStatus::Cancelled && current != OrderStatus::Cancelled;
        if entering_cancelled {
            let deltas = restock_deltas(&self.invoices[idx].items);
            self.apply_stock_deltas(&deltas);
            info!(id = %order_id, "Order cancelled, stock restored");
        }
        self.invoices[idx].status = status;

        if let Some(ps) = payment_status {
            let newly_paid =
                ps == PaymentStatus::Paid && self.invoices[idx].paid_date.is_none();
            self.invoices[idx].payment_status = ps;

            if newly_paid {
                self.invoices[idx].paid_date = Some(Utc::now());
                let total = self.invoices[idx].total();
                if total.is_positive() {
                    // TODO: route this to the processing cashier's till
                    // instead of the shared drawer; needs the session to be
                    // threaded through the payment UI first.
                    let account = self.default_cash_account_id();
                    self.record_transaction(
                        TransactionInput::credit(
                            TransactionType::SaleIncome,
                            total,
                            account,
                            format!("Payment received for invoice {}", short_id(order_id)),
                        )
                        .with_invoice(order_id.to_string()),
                    )?;
                }
            }
        }

        Ok(())
    }

    /// Converts a reservation into a completed, paid sale.
    ///
    /// Stock was already consumed when the reservation was created, so no
    /// inventory movement happens here; only the income is posted.
    pub fn convert_to_sale(
        &mut self,
        session: Option<&Session>,
        reservation_id: &str,
    ) -> CoreResult<()> {
        let session = session.ok_or(CoreError::NoSession)?;

        let idx = self
            .invoices
            .iter()
            .position(|i| i.id == reservation_id)
            .ok_or_else(|| CoreError::not_found("Invoice", reservation_id))?;

        if self.invoices[idx].order_type != OrderType::Reservation {
            return Err(ValidationError::NotAllowed {
                field: "type",
                allowed: vec!["reservation"],
            }
            .into());
        }
        if self.invoices[idx].is_cancelled() {
            return Err(CoreError::InvalidStatusTransition {
                invoice_id: reservation_id.to_string(),
                from: "cancelled".to_string(),
                to: "completed".to_string(),
            });
        }

        let now = Utc::now();
        {
            let invoice = &mut self.invoices[idx];
            invoice.order_type = OrderType::Sale;
            invoice.status = OrderStatus::Completed;
            invoice.payment_status = PaymentStatus::Paid;
            invoice.paid_date = Some(now);
            invoice.processed_by = session.username.clone();
        }

        let total = self.invoices[idx].total();
        let till = self.till_account_id(session);
        self.record_transaction(
            TransactionInput::credit(
                TransactionType::SaleIncome,
                total,
                till,
                format!("Reservation {} collected", short_id(reservation_id)),
            )
            .with_invoice(reservation_id.to_string()),
        )?;

        info!(id = %reservation_id, by = %session.username, "Reservation converted to sale");
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Returns
    // -------------------------------------------------------------------------

    /// How many units of `product_id` are still returnable against an
    /// original invoice: sold quantity minus everything already returned
    /// through non-cancelled return invoices referencing it.
    fn returnable_quantity(&self, original: &Invoice, product_id: &str) -> i64 {
        let sold: i64 = original
            .items
            .iter()
            .filter(|i| i.product_id == product_id)
            .map(|i| i.quantity)
            .sum();
        let already_returned: i64 = self
            .invoices
            .iter()
            .filter(|i| i.order_type == OrderType::Return && !i.is_cancelled())
            .filter(|i| i.original_invoice_id.as_deref() == Some(&original.id))
            .flat_map(|i| i.items.iter())
            .filter(|i| i.product_id == product_id)
            .map(|i| i.quantity)
            .sum();
        sold - already_returned
    }

    /// Processes a return against an original invoice.
    ///
    /// ## Rules
    /// - Every line must fit within what is still returnable from the
    ///   original (cumulative across earlier returns)
    /// - The return invoice carries a negative total and references the
    ///   original through `original_invoice_id`
    /// - Stock goes back and a `return_refund` debit leaves the till
    pub fn process_return(
        &mut self,
        session: Option<&Session>,
        original_invoice_id: &str,
        items: Vec<InvoiceItem>,
    ) -> CoreResult<Invoice> {
        let session = session.ok_or(CoreError::NoSession)?;

        if items.is_empty() {
            return Err(CoreError::EmptyOrder);
        }
        validate_order_items(&items)?;

        let original = self
            .invoice(original_invoice_id)
            .ok_or_else(|| CoreError::not_found("Invoice", original_invoice_id))?
            .clone();

        // Tally the request per product so split lines cannot slip past
        // the cumulative check.
        let mut requested: Vec<(String, i64)> = Vec::new();
        for item in &items {
            match requested.iter_mut().find(|(id, _)| *id == item.product_id) {
                Some((_, qty)) => *qty += item.quantity,
                None => requested.push((item.product_id.clone(), item.quantity)),
            }
        }
        for (product_id, qty) in &requested {
            let remaining = self.returnable_quantity(&original, product_id);
            if *qty > remaining {
                return Err(CoreError::ReturnExceedsPurchased {
                    product_id: product_id.clone(),
                    remaining: remaining.max(0),
                    requested: *qty,
                });
            }
        }

        let refund: Money = items.iter().map(|i| i.line_total()).sum();
        if !refund.is_positive() {
            return Err(ValidationError::MustBePositive { field: "total" }.into());
        }
        let cost: Money = items.iter().map(|i| i.line_cost()).sum();

        let now = Utc::now();
        let invoice = Invoice {
            id: Self::generate_id(),
            date: now,
            paid_date: Some(now),
            items,
            total_cents: (-refund).cents(),
            total_cost_cents: (-cost).cents(),
            total_profit_cents: (cost - refund).cents(),
            order_type: OrderType::Return,
            status: OrderStatus::Completed,
            payment_status: PaymentStatus::Paid,
            customer_info: original.customer_info.clone(),
            shipping_fee_cents: 0,
            source: None,
            processed_by: session.username.clone(),
            original_invoice_id: Some(original.id.clone()),
        };

        let deltas = restock_deltas(&invoice.items);
        let result = invoice.clone();
        self.invoices.push(invoice);
        self.apply_stock_deltas(&deltas);

        let till = self.till_account_id(session);
        self.record_transaction(
            TransactionInput::debit(
                TransactionType::ReturnRefund,
                refund,
                till,
                format!("Refund for return against invoice {}", short_id(&original.id)),
            )
            .with_invoice(result.id.clone())
            .with_category("returns"),
        )?;

        info!(
            id = %result.id,
            original = %original.id,
            refund = %refund,
            by = %session.username,
            "Return processed"
        );
        Ok(result)
    }

    // -------------------------------------------------------------------------
    // Return requests (approval gate for cashiers)
    // -------------------------------------------------------------------------

    /// Files a return request for later admin review. Touches neither
    /// inventory nor the ledger.
    pub fn send_return_request(
        &mut self,
        session: Option<&Session>,
        original_invoice_id: &str,
        items: Vec<InvoiceItem>,
    ) -> CoreResult<ReturnRequest> {
        let session = session.ok_or(CoreError::NoSession)?;

        if items.is_empty() {
            return Err(CoreError::EmptyOrder);
        }
        validate_order_items(&items)?;
        if self.invoice(original_invoice_id).is_none() {
            return Err(CoreError::not_found("Invoice", original_invoice_id));
        }

        let request = ReturnRequest {
            id: Self::generate_id(),
            request_date: Utc::now(),
            original_invoice_id: original_invoice_id.to_string(),
            requested_by: session.username.clone(),
            status: RequestStatus::Pending,
            items,
            processed_by: None,
            processed_date: None,
        };
        self.return_requests.push(request.clone());
        info!(id = %request.id, by = %session.username, "Return request filed");
        Ok(request)
    }

    /// Approves a pending request by processing the return it describes.
    ///
    /// The return is processed first; if it fails (e.g. the quantity is no
    /// longer returnable) the request stays pending.
    pub fn approve_return_request(
        &mut self,
        session: Option<&Session>,
        request_id: &str,
    ) -> CoreResult<Invoice> {
        let session_ref = session.ok_or(CoreError::NoSession)?;

        let idx = self
            .return_requests
            .iter()
            .position(|r| r.id == request_id)
            .ok_or_else(|| CoreError::not_found("ReturnRequest", request_id))?;
        if self.return_requests[idx].status != RequestStatus::Pending {
            return Err(CoreError::RequestAlreadyResolved(request_id.to_string()));
        }

        let original_invoice_id = self.return_requests[idx].original_invoice_id.clone();
        let items = self.return_requests[idx].items.clone();
        let invoice = self.process_return(session, &original_invoice_id, items)?;

        let request = &mut self.return_requests[idx];
        request.status = RequestStatus::Approved;
        request.processed_by = Some(session_ref.username.clone());
        request.processed_date = Some(Utc::now());
        Ok(invoice)
    }

    /// Rejects a pending request. No side effects beyond the resolution.
    pub fn reject_return_request(
        &mut self,
        session: Option<&Session>,
        request_id: &str,
    ) -> CoreResult<()> {
        let session = session.ok_or(CoreError::NoSession)?;

        let request = self
            .return_requests
            .iter_mut()
            .find(|r| r.id == request_id)
            .ok_or_else(|| CoreError::not_found("ReturnRequest", request_id))?;
        if request.status != RequestStatus::Pending {
            return Err(CoreError::RequestAlreadyResolved(request_id.to_string()));
        }

        request.status = RequestStatus::Rejected;
        request.processed_by = Some(session.username.clone());
        request.processed_date = Some(Utc::now());
        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Product, Role, User};

    fn seeded_state() -> (AppState, Session) {
        let mut state = AppState::new();
        state.products.push(Product {
            id: "p-1".to_string(),
            name: "Dune".to_string(),
            author: None,
            category: None,
            quantity: 10,
            price_cents: 1500,
            cost_price_cents: Some(900),
        });
        let user = User {
            id: "u-1".to_string(),
            username: "amira".to_string(),
            role: Role::Cashier,
        };
        state.users.push(user.clone());
        state.ensure_cashier_tills();
        (state, Session::new(&user))
    }

    fn line(quantity: i64) -> InvoiceItem {
        InvoiceItem {
            product_id: "p-1".to_string(),
            product_name: "Dune".to_string(),
            quantity,
            price_cents: 1500,
            cost_price_cents: Some(900),
            discount_cents: None,
        }
    }

    fn order(order_type: OrderType, quantity: i64) -> OrderInput {
        OrderInput {
            order_type,
            items: vec![line(quantity)],
            customer_info: None,
            shipping_fee: Money::zero(),
            source: None,
        }
    }

    #[test]
    fn test_sale_completes_consumes_stock_and_credits_till() {
        let (mut state, session) = seeded_state();
        let invoice = state
            .create_order(Some(&session), order(OrderType::Sale, 2))
            .unwrap();

        assert_eq!(invoice.status, OrderStatus::Completed);
        assert_eq!(invoice.payment_status, PaymentStatus::Paid);
        assert!(invoice.paid_date.is_some());
        assert_eq!(invoice.total_cents, 3000);
        assert_eq!(invoice.total_profit_cents, 1200);
        assert_eq!(state.product("p-1").unwrap().quantity, 8);

        // Income landed on the cashier's own till, not the shared drawer.
        let till_id = state.accounts[0].id.clone();
        assert_eq!(state.transactions.len(), 1);
        assert_eq!(state.transactions[0].tx_type, TransactionType::SaleIncome);
        assert_eq!(state.transactions[0].to_account_id.as_deref(), Some(till_id.as_str()));
        assert_eq!(state.account_balances()[&till_id].cents(), 3000);
    }

    #[test]
    fn test_create_order_requires_session() {
        let (mut state, _) = seeded_state();
        assert!(matches!(
            state.create_order(None, order(OrderType::Sale, 1)),
            Err(CoreError::NoSession)
        ));
        // Nothing happened.
        assert_eq!(state.product("p-1").unwrap().quantity, 10);
        assert!(state.invoices.is_empty());
    }

    #[test]
    fn test_create_order_rejects_return_type_and_empty_items() {
        let (mut state, session) = seeded_state();
        assert!(state
            .create_order(Some(&session), order(OrderType::Return, 1))
            .is_err());

        let mut empty = order(OrderType::Sale, 1);
        empty.items.clear();
        assert!(matches!(
            state.create_order(Some(&session), empty),
            Err(CoreError::EmptyOrder)
        ));
    }

    #[test]
    fn test_shipping_order_starts_pending_and_consumes_stock() {
        let (mut state, session) = seeded_state();
        let mut input = order(OrderType::Shipping, 3);
        input.shipping_fee = Money::from_cents(500);
        let invoice = state.create_order(Some(&session), input).unwrap();

        assert_eq!(invoice.status, OrderStatus::Pending);
        assert_eq!(invoice.payment_status, PaymentStatus::Unpaid);
        assert_eq!(invoice.total_cents, 5000);
        // Fee is pass-through: profit excludes it.
        assert_eq!(invoice.total_profit_cents, 4500 - 2700);
        assert_eq!(state.product("p-1").unwrap().quantity, 7);
        // No income yet.
        assert!(state.transactions.is_empty());
    }

    #[test]
    fn test_cancellation_restocks_exactly_once() {
        let (mut state, session) = seeded_state();
        let invoice = state
            .create_order(Some(&session), order(OrderType::Reservation, 4))
            .unwrap();
        assert_eq!(state.product("p-1").unwrap().quantity, 6);

        state
            .update_order_status(&invoice.id, OrderStatus::Cancelled, None)
            .unwrap();
        assert_eq!(state.product("p-1").unwrap().quantity, 10);

        // Cancelling again is a no-op transition: no second restock.
        state
            .update_order_status(&invoice.id, OrderStatus::Cancelled, None)
            .unwrap();
        assert_eq!(state.product("p-1").unwrap().quantity, 10);
    }

    #[test]
    fn test_cancelled_is_terminal() {
        let (mut state, session) = seeded_state();
        let invoice = state
            .create_order(Some(&session), order(OrderType::Shipping, 1))
            .unwrap();
        state
            .update_order_status(&invoice.id, OrderStatus::Cancelled, None)
            .unwrap();

        assert!(matches!(
            state.update_order_status(&invoice.id, OrderStatus::Shipped, None),
            Err(CoreError::InvalidStatusTransition { .. })
        ));
    }

    #[test]
    fn test_marking_paid_stamps_date_and_posts_income_once() {
        let (mut state, session) = seeded_state();
        let invoice = state
            .create_order(Some(&session), order(OrderType::Shipping, 2))
            .unwrap();

        state
            .update_order_status(&invoice.id, OrderStatus::Completed, Some(PaymentStatus::Paid))
            .unwrap();
        let stored = state.invoice(&invoice.id).unwrap();
        assert!(stored.paid_date.is_some());
        assert_eq!(state.transactions.len(), 1);
        assert_eq!(
            state.transactions[0].to_account_id.as_deref(),
            Some(crate::DEFAULT_CASH_ACCOUNT_ID)
        );

        // Re-sending paid must not double-post.
        state
            .update_order_status(&invoice.id, OrderStatus::Completed, Some(PaymentStatus::Paid))
            .unwrap();
        assert_eq!(state.transactions.len(), 1);
    }

    #[test]
    fn test_convert_reservation_posts_income_without_stock_movement() {
        let (mut state, session) = seeded_state();
        let invoice = state
            .create_order(Some(&session), order(OrderType::Reservation, 2))
            .unwrap();
        assert_eq!(state.product("p-1").unwrap().quantity, 8);

        state.convert_to_sale(Some(&session), &invoice.id).unwrap();

        let stored = state.invoice(&invoice.id).unwrap();
        assert_eq!(stored.order_type, OrderType::Sale);
        assert_eq!(stored.status, OrderStatus::Completed);
        assert_eq!(stored.payment_status, PaymentStatus::Paid);
        // Stock already left at reservation time.
        assert_eq!(state.product("p-1").unwrap().quantity, 8);
        assert_eq!(state.transactions.len(), 1);
        assert_eq!(state.transactions[0].amount_cents, 3000);
    }

    #[test]
    fn test_convert_rejects_non_reservations_and_cancelled() {
        let (mut state, session) = seeded_state();
        let sale = state
            .create_order(Some(&session), order(OrderType::Sale, 1))
            .unwrap();
        assert!(state.convert_to_sale(Some(&session), &sale.id).is_err());

        let reservation = state
            .create_order(Some(&session), order(OrderType::Reservation, 1))
            .unwrap();
        state
            .update_order_status(&reservation.id, OrderStatus::Cancelled, None)
            .unwrap();
        assert!(matches!(
            state.convert_to_sale(Some(&session), &reservation.id),
            Err(CoreError::InvalidStatusTransition { .. })
        ));
    }

    #[test]
    fn test_process_return_restocks_and_refunds() {
        let (mut state, session) = seeded_state();
        let sale = state
            .create_order(Some(&session), order(OrderType::Sale, 3))
            .unwrap();
        assert_eq!(state.product("p-1").unwrap().quantity, 7);

        let ret = state
            .process_return(Some(&session), &sale.id, vec![line(2)])
            .unwrap();

        assert_eq!(ret.order_type, OrderType::Return);
        assert_eq!(ret.total_cents, -3000);
        assert_eq!(ret.original_invoice_id.as_deref(), Some(sale.id.as_str()));
        assert_eq!(state.product("p-1").unwrap().quantity, 9);

        // Refund left the till: 4500 in, 3000 out.
        let till_id = state.accounts[0].id.clone();
        assert_eq!(state.account_balances()[&till_id].cents(), 1500);
        let refund = state.transactions.last().unwrap();
        assert_eq!(refund.tx_type, TransactionType::ReturnRefund);
        assert_eq!(refund.amount_cents, 3000);
        assert_eq!(refund.from_account_id.as_deref(), Some(till_id.as_str()));
    }

    #[test]
    fn test_cumulative_returns_cannot_exceed_sold_quantity() {
        let (mut state, session) = seeded_state();
        let sale = state
            .create_order(Some(&session), order(OrderType::Sale, 3))
            .unwrap();

        state
            .process_return(Some(&session), &sale.id, vec![line(2)])
            .unwrap();

        // Only one unit is still returnable.
        let err = state
            .process_return(Some(&session), &sale.id, vec![line(2)])
            .unwrap_err();
        assert!(matches!(
            err,
            CoreError::ReturnExceedsPurchased {
                remaining: 1,
                requested: 2,
                ..
            }
        ));

        // Split lines summing past the limit are caught too.
        assert!(state
            .process_return(Some(&session), &sale.id, vec![line(1), line(1)])
            .is_err());

        state
            .process_return(Some(&session), &sale.id, vec![line(1)])
            .unwrap();
        assert_eq!(state.product("p-1").unwrap().quantity, 10);
    }

    #[test]
    fn test_return_against_unknown_invoice_errors() {
        let (mut state, session) = seeded_state();
        assert!(matches!(
            state.process_return(Some(&session), "ghost", vec![line(1)]),
            Err(CoreError::NotFound { .. })
        ));
    }

    #[test]
    fn test_return_request_workflow() {
        let (mut state, session) = seeded_state();
        let sale = state
            .create_order(Some(&session), order(OrderType::Sale, 2))
            .unwrap();

        let request = state
            .send_return_request(Some(&session), &sale.id, vec![line(1)])
            .unwrap();
        // Filing alone has no side effects.
        assert_eq!(state.product("p-1").unwrap().quantity, 8);
        assert_eq!(state.transactions.len(), 1);

        let invoice = state
            .approve_return_request(Some(&session), &request.id)
            .unwrap();
        assert_eq!(invoice.order_type, OrderType::Return);
        assert_eq!(state.product("p-1").unwrap().quantity, 9);
        assert_eq!(
            state.return_requests[0].status,
            RequestStatus::Approved
        );
        assert!(state.return_requests[0].processed_by.is_some());

        // Resolved requests are terminal.
        assert!(matches!(
            state.approve_return_request(Some(&session), &request.id),
            Err(CoreError::RequestAlreadyResolved(_))
        ));
        assert!(matches!(
            state.reject_return_request(Some(&session), &request.id),
            Err(CoreError::RequestAlreadyResolved(_))
        ));
    }

    #[test]
    fn test_failed_approval_leaves_request_pending() {
        let (mut state, session) = seeded_state();
        let sale = state
            .create_order(Some(&session), order(OrderType::Sale, 1))
            .unwrap();

        // Exhaust the returnable quantity before the request is reviewed.
        let request = state
            .send_return_request(Some(&session), &sale.id, vec![line(1)])
            .unwrap();
        state
            .process_return(Some(&session), &sale.id, vec![line(1)])
            .unwrap();

        assert!(state
            .approve_return_request(Some(&session), &request.id)
            .is_err());
        assert_eq!(state.return_requests[0].status, RequestStatus::Pending);
    }

    #[test]
    fn test_reject_return_request() {
        let (mut state, session) = seeded_state();
        let sale = state
            .create_order(Some(&session), order(OrderType::Sale, 1))
            .unwrap();
        let request = state
            .send_return_request(Some(&session), &sale.id, vec![line(1)])
            .unwrap();

        state
            .reject_return_request(Some(&session), &request.id)
            .unwrap();
        assert_eq!(state.return_requests[0].status, RequestStatus::Rejected);
        // No return happened.
        assert_eq!(state.product("p-1").unwrap().quantity, 9);
    }
}
