//! # Application State
//!
//! The explicit state container every operation works against.
//!
//! ## Design
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       State & Control Flow                              │
//! │                                                                         │
//! │  UI event ──► operation(&mut AppState, &Session, input)                │
//! │                      │                                                  │
//! │                      ├── validate (check-then-act, no partial writes)  │
//! │                      ├── mutate collections in memory                   │
//! │                      └── log the committed business event               │
//! │                      │                                                  │
//! │  maktaba-store ◄─────┘  full snapshot persisted after each mutation    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! There are no ambient singletons: the previously module-level "current
//! user" is the explicit [`Session`] argument, and every persisted
//! collection is a field of [`AppState`].

use serde::{Deserialize, Serialize};
use tracing::info;
use ts_rs::TS;
use uuid::Uuid;

use crate::error::{CoreError, CoreResult};
use crate::types::{
    AccountType, Budget, Customer, Expense, FinancialAccount, FinancialTransaction, Invoice,
    Product, Purchase, RequestedBook, RequestedBookStatus, ReturnRequest, Role, Supplier,
    TillCloseout, User,
};
use crate::validation::{validate_name, validate_non_negative, validate_price_factor};
use crate::money::Money;
use crate::DEFAULT_CASH_ACCOUNT_ID;

// =============================================================================
// Session
// =============================================================================

/// The authenticated user, as supplied by the (out-of-scope) auth
/// collaborator. The core uses it only to stamp `processed_by` and to
/// resolve the cashier's personal till.
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    pub user_id: String,
    pub username: String,
    pub role: Role,
}

impl Session {
    pub fn new(user: &User) -> Self {
        Session {
            user_id: user.id.clone(),
            username: user.username.clone(),
            role: user.role,
        }
    }
}

// =============================================================================
// AppState
// =============================================================================

/// Every named collection of the shop, in one serializable snapshot.
///
/// The persistence collaborator reads and writes this whole value;
/// operations mutate it in memory. `#[serde(default)]` lets older
/// snapshots that predate a collection still load.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase", default)]
#[ts(export)]
pub struct AppState {
    pub products: Vec<Product>,
    pub invoices: Vec<Invoice>,
    pub return_requests: Vec<ReturnRequest>,
    pub expenses: Vec<Expense>,
    pub purchases: Vec<Purchase>,
    pub accounts: Vec<FinancialAccount>,
    pub transactions: Vec<FinancialTransaction>,
    pub budgets: Vec<Budget>,
    pub till_closeouts: Vec<TillCloseout>,
    pub users: Vec<User>,
    pub customers: Vec<Customer>,
    pub suppliers: Vec<Supplier>,
    pub requested_books: Vec<RequestedBook>,
}

/// Direction of a batch repricing operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum RepriceOp {
    Multiply,
    Divide,
}

/// Input for creating or editing a product. The id is generated by the
/// state, never supplied by the caller.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct ProductInput {
    pub name: String,
    pub author: Option<String>,
    pub category: Option<String>,
    pub quantity: i64,
    pub price_cents: i64,
    pub cost_price_cents: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct CustomerInput {
    pub name: String,
    pub phone: String,
    pub address: Option<String>,
    pub email: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct SupplierInput {
    pub name: String,
    pub contact_person: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
}

impl AppState {
    /// An empty state. Collections are populated either by the snapshot
    /// store or through operations.
    pub fn new() -> Self {
        AppState::default()
    }

    /// Generates a record id. UUID v4: unique without coordination, no
    /// collision risk under rapid successive creation.
    pub(crate) fn generate_id() -> String {
        Uuid::new_v4().to_string()
    }

    // -------------------------------------------------------------------------
    // Lookups
    // -------------------------------------------------------------------------

    pub fn product(&self, id: &str) -> Option<&Product> {
        self.products.iter().find(|p| p.id == id)
    }

    pub fn invoice(&self, id: &str) -> Option<&Invoice> {
        self.invoices.iter().find(|i| i.id == id)
    }

    pub fn account(&self, id: &str) -> Option<&FinancialAccount> {
        self.accounts.iter().find(|a| a.id == id)
    }

    pub fn purchase(&self, id: &str) -> Option<&Purchase> {
        self.purchases.iter().find(|p| p.id == id)
    }

    /// Errors with `NotFound` unless the account exists. Used before
    /// posting any transaction against a caller-chosen account.
    pub(crate) fn require_account(&self, id: &str) -> CoreResult<()> {
        if self.account(id).is_none() {
            return Err(CoreError::not_found("Account", id));
        }
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Products
    // -------------------------------------------------------------------------

    fn validate_product_input(input: &ProductInput) -> CoreResult<()> {
        validate_name("name", &input.name)?;
        validate_non_negative("price", Money::from_cents(input.price_cents))?;
        if input.quantity < 0 {
            return Err(crate::error::ValidationError::OutOfRange {
                field: "quantity",
                min: 0,
                max: i64::MAX,
            }
            .into());
        }
        Ok(())
    }

    /// Adds a product and returns it.
    pub fn add_product(&mut self, input: ProductInput) -> CoreResult<Product> {
        Self::validate_product_input(&input)?;

        let product = Product {
            id: Self::generate_id(),
            name: input.name,
            author: input.author,
            category: input.category,
            quantity: input.quantity,
            price_cents: input.price_cents,
            cost_price_cents: input.cost_price_cents,
        };
        self.products.push(product.clone());
        Ok(product)
    }

    /// Replaces a product's editable fields. The id is preserved.
    pub fn update_product(&mut self, id: &str, input: ProductInput) -> CoreResult<()> {
        Self::validate_product_input(&input)?;

        let product = self
            .products
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or_else(|| CoreError::not_found("Product", id))?;

        product.name = input.name;
        product.author = input.author;
        product.category = input.category;
        product.quantity = input.quantity;
        product.price_cents = input.price_cents;
        product.cost_price_cents = input.cost_price_cents;
        Ok(())
    }

    pub fn delete_product(&mut self, id: &str) -> CoreResult<()> {
        let before = self.products.len();
        self.products.retain(|p| p.id != id);
        if self.products.len() == before {
            return Err(CoreError::not_found("Product", id));
        }
        Ok(())
    }

    /// Batch-adjusts every product's price and cost price by a factor.
    ///
    /// Results are rounded to the nearest cent; historical invoices are
    /// untouched because their items carry frozen prices.
    pub fn reprice_all(&mut self, op: RepriceOp, factor: f64) -> CoreResult<()> {
        validate_price_factor(factor)?;

        let effective = match op {
            RepriceOp::Multiply => factor,
            RepriceOp::Divide => 1.0 / factor,
        };

        for product in &mut self.products {
            product.price_cents = Money::from_cents(product.price_cents).scale(effective).cents();
            if let Some(cost) = product.cost_price_cents {
                product.cost_price_cents = Some(Money::from_cents(cost).scale(effective).cents());
            }
        }

        info!(op = ?op, factor, count = self.products.len(), "Batch repriced products");
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Tills & Default Account
    // -------------------------------------------------------------------------

    /// Ensures every cashier has a personal till account.
    ///
    /// Run after loading a snapshot and after user management changes.
    /// Idempotent: a cashier who already owns an account is skipped.
    pub fn ensure_cashier_tills(&mut self) {
        let missing: Vec<(String, String)> = self
            .users
            .iter()
            .filter(|u| u.role == Role::Cashier)
            .filter(|u| !self.accounts.iter().any(|a| a.user_id.as_deref() == Some(&u.id)))
            .map(|u| (u.id.clone(), u.username.clone()))
            .collect();

        for (user_id, username) in missing {
            info!(%username, "Creating till account for cashier");
            self.accounts.push(FinancialAccount {
                id: Self::generate_id(),
                name: format!("Till: {}", username),
                account_type: AccountType::Cash,
                user_id: Some(user_id),
            });
        }
    }

    /// Returns the id of the shop's default cash account, creating the
    /// account if the snapshot predates it. Income with no better home
    /// (and cashiers without tills) lands here.
    pub(crate) fn default_cash_account_id(&mut self) -> String {
        if self.account(DEFAULT_CASH_ACCOUNT_ID).is_none() {
            self.accounts.push(FinancialAccount {
                id: DEFAULT_CASH_ACCOUNT_ID.to_string(),
                name: "Main cash drawer".to_string(),
                account_type: AccountType::Cash,
                user_id: None,
            });
        }
        DEFAULT_CASH_ACCOUNT_ID.to_string()
    }

    /// Resolves the acting cashier's till account, falling back to the
    /// default cash account when they have none.
    pub(crate) fn till_account_id(&mut self, session: &Session) -> String {
        match self
            .accounts
            .iter()
            .find(|a| a.user_id.as_deref() == Some(&session.user_id))
        {
            Some(till) => till.id.clone(),
            None => self.default_cash_account_id(),
        }
    }

    // -------------------------------------------------------------------------
    // Customers & Suppliers
    // -------------------------------------------------------------------------

    pub fn add_customer(&mut self, input: CustomerInput) -> CoreResult<Customer> {
        validate_name("name", &input.name)?;
        let customer = Customer {
            id: Self::generate_id(),
            name: input.name,
            phone: input.phone,
            address: input.address,
            email: input.email,
            notes: input.notes,
        };
        self.customers.push(customer.clone());
        Ok(customer)
    }

    pub fn update_customer(&mut self, id: &str, input: CustomerInput) -> CoreResult<()> {
        validate_name("name", &input.name)?;
        let customer = self
            .customers
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or_else(|| CoreError::not_found("Customer", id))?;
        customer.name = input.name;
        customer.phone = input.phone;
        customer.address = input.address;
        customer.email = input.email;
        customer.notes = input.notes;
        Ok(())
    }

    pub fn delete_customer(&mut self, id: &str) -> CoreResult<()> {
        let before = self.customers.len();
        self.customers.retain(|c| c.id != id);
        if self.customers.len() == before {
            return Err(CoreError::not_found("Customer", id));
        }
        Ok(())
    }

    pub fn add_supplier(&mut self, input: SupplierInput) -> CoreResult<Supplier> {
        validate_name("name", &input.name)?;
        let supplier = Supplier {
            id: Self::generate_id(),
            name: input.name,
            contact_person: input.contact_person,
            phone: input.phone,
            email: input.email,
            address: input.address,
        };
        self.suppliers.push(supplier.clone());
        Ok(supplier)
    }

    pub fn update_supplier(&mut self, id: &str, input: SupplierInput) -> CoreResult<()> {
        validate_name("name", &input.name)?;
        let supplier = self
            .suppliers
            .iter_mut()
            .find(|s| s.id == id)
            .ok_or_else(|| CoreError::not_found("Supplier", id))?;
        supplier.name = input.name;
        supplier.contact_person = input.contact_person;
        supplier.phone = input.phone;
        supplier.email = input.email;
        supplier.address = input.address;
        Ok(())
    }

    pub fn delete_supplier(&mut self, id: &str) -> CoreResult<()> {
        let before = self.suppliers.len();
        self.suppliers.retain(|s| s.id != id);
        if self.suppliers.len() == before {
            return Err(CoreError::not_found("Supplier", id));
        }
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Requested Books
    // -------------------------------------------------------------------------

    /// Records a customer's request for a title.
    ///
    /// Requests are de-duplicated by name (case-insensitive): a repeat
    /// request bumps the counter and the last-requested date instead of
    /// creating a new record.
    pub fn record_book_request(
        &mut self,
        name: &str,
        customer_name: Option<String>,
        customer_phone: Option<String>,
    ) -> CoreResult<()> {
        validate_name("name", name)?;
        let now = chrono::Utc::now();

        if let Some(existing) = self
            .requested_books
            .iter_mut()
            .find(|b| b.name.eq_ignore_ascii_case(name))
        {
            existing.requested_count += 1;
            existing.last_requested_date = now;
            return Ok(());
        }

        self.requested_books.push(RequestedBook {
            id: Self::generate_id(),
            name: name.trim().to_string(),
            customer_name,
            customer_phone,
            requested_count: 1,
            last_requested_date: now,
            status: RequestedBookStatus::Pending,
        });
        Ok(())
    }

    pub fn set_requested_book_status(
        &mut self,
        id: &str,
        status: RequestedBookStatus,
    ) -> CoreResult<()> {
        let book = self
            .requested_books
            .iter_mut()
            .find(|b| b.id == id)
            .ok_or_else(|| CoreError::not_found("RequestedBook", id))?;
        book.status = status;
        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn product_input(name: &str, price_cents: i64) -> ProductInput {
        ProductInput {
            name: name.to_string(),
            author: None,
            category: None,
            quantity: 10,
            price_cents,
            cost_price_cents: Some(price_cents / 2),
        }
    }

    fn cashier(id: &str, username: &str) -> User {
        User {
            id: id.to_string(),
            username: username.to_string(),
            role: Role::Cashier,
        }
    }

    #[test]
    fn test_product_crud() {
        let mut state = AppState::new();
        let product = state.add_product(product_input("Dune", 1500)).unwrap();
        assert_eq!(state.products.len(), 1);

        let mut edit = product_input("Dune (2nd ed.)", 1800);
        edit.quantity = 4;
        state.update_product(&product.id, edit).unwrap();
        assert_eq!(state.product(&product.id).unwrap().price_cents, 1800);
        assert_eq!(state.product(&product.id).unwrap().quantity, 4);

        state.delete_product(&product.id).unwrap();
        assert!(state.products.is_empty());
        assert!(matches!(
            state.delete_product(&product.id),
            Err(CoreError::NotFound { .. })
        ));
    }

    #[test]
    fn test_add_product_rejects_blank_name() {
        let mut state = AppState::new();
        assert!(state.add_product(product_input("  ", 100)).is_err());
    }

    #[test]
    fn test_reprice_all_multiply_and_divide() {
        let mut state = AppState::new();
        state.add_product(product_input("A", 1000)).unwrap();
        state.add_product(product_input("B", 999)).unwrap();

        state.reprice_all(RepriceOp::Multiply, 1.1).unwrap();
        assert_eq!(state.products[0].price_cents, 1100);
        assert_eq!(state.products[1].price_cents, 1099); // 1098.9 rounded

        state.reprice_all(RepriceOp::Divide, 1.1).unwrap();
        assert_eq!(state.products[0].price_cents, 1000);

        assert!(state.reprice_all(RepriceOp::Multiply, 0.0).is_err());
    }

    #[test]
    fn test_ensure_cashier_tills_is_idempotent() {
        let mut state = AppState::new();
        state.users.push(cashier("u-1", "amira"));
        state.users.push(User {
            id: "u-2".to_string(),
            username: "boss".to_string(),
            role: Role::Admin,
        });

        state.ensure_cashier_tills();
        assert_eq!(state.accounts.len(), 1);
        assert_eq!(state.accounts[0].user_id.as_deref(), Some("u-1"));
        assert_eq!(state.accounts[0].account_type, AccountType::Cash);

        // Running again must not duplicate the till, and admins get none.
        state.ensure_cashier_tills();
        assert_eq!(state.accounts.len(), 1);
    }

    #[test]
    fn test_till_account_resolution_falls_back_to_default() {
        let mut state = AppState::new();
        state.users.push(cashier("u-1", "amira"));
        let session = Session::new(&state.users[0]);

        // No till yet: resolves (and creates) the default cash account.
        let fallback = state.till_account_id(&session);
        assert_eq!(fallback, crate::DEFAULT_CASH_ACCOUNT_ID);
        assert!(state.account(crate::DEFAULT_CASH_ACCOUNT_ID).is_some());

        state.ensure_cashier_tills();
        let till = state.till_account_id(&session);
        assert_ne!(till, crate::DEFAULT_CASH_ACCOUNT_ID);
    }

    #[test]
    fn test_record_book_request_deduplicates_by_name() {
        let mut state = AppState::new();
        state
            .record_book_request("The Hobbit", Some("Nour".to_string()), None)
            .unwrap();
        state.record_book_request("the hobbit", None, None).unwrap();

        assert_eq!(state.requested_books.len(), 1);
        assert_eq!(state.requested_books[0].requested_count, 2);

        let id = state.requested_books[0].id.clone();
        state
            .set_requested_book_status(&id, RequestedBookStatus::Fulfilled)
            .unwrap();
        assert_eq!(state.requested_books[0].status, RequestedBookStatus::Fulfilled);
    }
}
