//! # Financial Ledger
//!
//! Append-only transaction log, derived balances, budgets and expenses.
//!
//! ## Balance Derivation
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Balances Are Always Derived                          │
//! │                                                                         │
//! │  accounts:      [till-amira, cash-default, bank]  → start all at 0     │
//! │  transactions:  fold each entry:                                        │
//! │                   from_account_id set → subtract amount                 │
//! │                   to_account_id set   → add amount                      │
//! │                                                                         │
//! │  The fold is commutative, so it is idempotent and order-independent:   │
//! │  re-running over the same entries always yields the same balances.     │
//! │  No stored balance exists to diverge from the log.                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Budget progress follows the same principle: a budget's funded amount is
//! the sum of transfer entries carrying its `budget_id`, computed on
//! demand.

use std::collections::HashMap;

use chrono::Utc;
use tracing::{debug, info};

use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::state::AppState;
use crate::types::{
    AccountType, Budget, Expense, FinancialAccount, FinancialTransaction, TransactionType,
};
use crate::validation::{validate_amount, validate_name};

// =============================================================================
// Transaction Input
// =============================================================================

/// Input for appending a ledger entry. Id and timestamp are stamped by
/// the ledger itself.
#[derive(Debug, Clone)]
pub struct TransactionInput {
    pub description: String,
    /// Always positive; direction comes from the account fields.
    pub amount: Money,
    pub tx_type: TransactionType,
    pub from_account_id: Option<String>,
    pub to_account_id: Option<String>,
    pub related_invoice_id: Option<String>,
    pub related_purchase_id: Option<String>,
    pub category: Option<String>,
    pub budget_id: Option<String>,
}

impl TransactionInput {
    /// A credit: money arriving into `to_account_id`.
    pub fn credit(
        tx_type: TransactionType,
        amount: Money,
        to_account_id: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        TransactionInput {
            description: description.into(),
            amount,
            tx_type,
            from_account_id: None,
            to_account_id: Some(to_account_id.into()),
            related_invoice_id: None,
            related_purchase_id: None,
            category: None,
            budget_id: None,
        }
    }

    /// A debit: money leaving `from_account_id`.
    pub fn debit(
        tx_type: TransactionType,
        amount: Money,
        from_account_id: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        TransactionInput {
            description: description.into(),
            amount,
            tx_type,
            from_account_id: Some(from_account_id.into()),
            to_account_id: None,
            related_invoice_id: None,
            related_purchase_id: None,
            category: None,
            budget_id: None,
        }
    }

    /// A transfer between two accounts.
    pub fn transfer(
        amount: Money,
        from_account_id: impl Into<String>,
        to_account_id: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        TransactionInput {
            description: description.into(),
            amount,
            tx_type: TransactionType::Transfer,
            from_account_id: Some(from_account_id.into()),
            to_account_id: Some(to_account_id.into()),
            related_invoice_id: None,
            related_purchase_id: None,
            category: None,
            budget_id: None,
        }
    }

    pub fn with_invoice(mut self, invoice_id: impl Into<String>) -> Self {
        self.related_invoice_id = Some(invoice_id.into());
        self
    }

    pub fn with_purchase(mut self, purchase_id: impl Into<String>) -> Self {
        self.related_purchase_id = Some(purchase_id.into());
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    /// Tags a transfer as funding a budget.
    pub fn with_budget(mut self, budget_id: impl Into<String>) -> Self {
        self.budget_id = Some(budget_id.into());
        self
    }
}

// =============================================================================
// Input shapes
// =============================================================================

#[derive(Debug, Clone)]
pub struct AccountInput {
    pub name: String,
    pub account_type: AccountType,
    /// Set to tie a till to a cashier.
    pub user_id: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ExpenseInput {
    pub description: String,
    pub amount: Money,
    pub category: Option<String>,
    /// The account the expense is paid from.
    pub account_id: String,
}

// =============================================================================
// Pure functions
// =============================================================================

/// Folds the transaction log into per-account balances.
///
/// Every known account starts at zero; entries referencing an account id
/// outside the list still contribute (legacy snapshots may carry them).
/// The fold is a commutative sum, so the result is independent of entry
/// order.
pub fn compute_balances(
    accounts: &[FinancialAccount],
    transactions: &[FinancialTransaction],
) -> HashMap<String, Money> {
    let mut balances: HashMap<String, Money> = accounts
        .iter()
        .map(|a| (a.id.clone(), Money::zero()))
        .collect();

    for tx in transactions {
        if let Some(from) = &tx.from_account_id {
            let entry = balances.entry(from.clone()).or_insert_with(Money::zero);
            *entry -= tx.amount();
        }
        if let Some(to) = &tx.to_account_id {
            let entry = balances.entry(to.clone()).or_insert_with(Money::zero);
            *entry += tx.amount();
        }
    }

    balances
}

/// Derived funding progress for one budget: the sum of transfer entries
/// tagged with its id. There is no stored counter to fall out of sync.
pub fn budget_funded(budget_id: &str, transactions: &[FinancialTransaction]) -> Money {
    transactions
        .iter()
        .filter(|tx| tx.tx_type == TransactionType::Transfer)
        .filter(|tx| tx.budget_id.as_deref() == Some(budget_id))
        .map(|tx| tx.amount())
        .sum()
}

// =============================================================================
// Ledger operations
// =============================================================================

impl AppState {
    /// Appends a transaction to the ledger.
    ///
    /// ## Rules
    /// - `amount` must be positive
    /// - At least one of from/to account must be set, and every account
    ///   referenced must exist
    /// - Prior entries are never mutated or removed
    pub fn record_transaction(
        &mut self,
        input: TransactionInput,
    ) -> CoreResult<FinancialTransaction> {
        validate_amount("amount", input.amount)?;

        if input.from_account_id.is_none() && input.to_account_id.is_none() {
            return Err(crate::error::ValidationError::Required { field: "account" }.into());
        }
        if let Some(from) = &input.from_account_id {
            self.require_account(from)?;
        }
        if let Some(to) = &input.to_account_id {
            self.require_account(to)?;
        }

        let tx = FinancialTransaction {
            id: Self::generate_id(),
            date: Utc::now(),
            description: input.description,
            amount_cents: input.amount.cents(),
            tx_type: input.tx_type,
            from_account_id: input.from_account_id,
            to_account_id: input.to_account_id,
            related_invoice_id: input.related_invoice_id,
            related_purchase_id: input.related_purchase_id,
            category: input.category,
            budget_id: input.budget_id,
        };

        debug!(
            id = %tx.id,
            tx_type = ?tx.tx_type,
            amount = %tx.amount(),
            "Appending ledger entry"
        );
        self.transactions.push(tx.clone());
        Ok(tx)
    }

    /// Current balances of all accounts, derived from the log.
    pub fn account_balances(&self) -> HashMap<String, Money> {
        compute_balances(&self.accounts, &self.transactions)
    }

    /// Funding progress for one budget.
    pub fn budget_funded(&self, budget_id: &str) -> Money {
        budget_funded(budget_id, &self.transactions)
    }

    pub fn add_account(&mut self, input: AccountInput) -> CoreResult<FinancialAccount> {
        validate_name("name", &input.name)?;
        let account = FinancialAccount {
            id: Self::generate_id(),
            name: input.name,
            account_type: input.account_type,
            user_id: input.user_id,
        };
        self.accounts.push(account.clone());
        Ok(account)
    }

    pub fn add_budget(&mut self, name: &str, target: Money) -> CoreResult<Budget> {
        validate_name("name", name)?;
        validate_amount("targetAmount", target)?;
        let budget = Budget {
            id: Self::generate_id(),
            name: name.trim().to_string(),
            target_amount_cents: target.cents(),
        };
        self.budgets.push(budget.clone());
        Ok(budget)
    }

    // -------------------------------------------------------------------------
    // Expenses
    // -------------------------------------------------------------------------

    /// Records an expense and its debit ledger entry.
    pub fn add_expense(&mut self, input: ExpenseInput) -> CoreResult<Expense> {
        validate_name("description", &input.description)?;
        validate_amount("amount", input.amount)?;
        self.require_account(&input.account_id)?;

        let expense = Expense {
            id: Self::generate_id(),
            date: Utc::now(),
            description: input.description.clone(),
            amount_cents: input.amount.cents(),
            category: input.category.clone(),
            account_id: input.account_id.clone(),
        };
        self.expenses.push(expense.clone());

        let mut tx =
            TransactionInput::debit(
                TransactionType::Expense,
                input.amount,
                input.account_id,
                input.description,
            );
        tx.category = input.category;
        self.record_transaction(tx)?;

        info!(id = %expense.id, amount = %input.amount, "Expense recorded");
        Ok(expense)
    }

    /// Deletes an expense record and posts a compensating
    /// `expense_reversal` credit. The original `expense` entry stays in
    /// the log untouched.
    pub fn delete_expense(&mut self, id: &str) -> CoreResult<()> {
        let position = self
            .expenses
            .iter()
            .position(|e| e.id == id)
            .ok_or_else(|| CoreError::not_found("Expense", id))?;

        let expense = self.expenses.remove(position);

        let mut tx = TransactionInput::credit(
            TransactionType::ExpenseReversal,
            Money::from_cents(expense.amount_cents),
            expense.account_id.clone(),
            format!("Reversal of expense: {}", expense.description),
        );
        tx.category = expense.category.clone();
        self.record_transaction(tx)?;

        info!(id = %expense.id, "Expense deleted and reversed");
        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn account(id: &str) -> FinancialAccount {
        FinancialAccount {
            id: id.to_string(),
            name: id.to_string(),
            account_type: AccountType::Cash,
            user_id: None,
        }
    }

    fn tx(
        amount_cents: i64,
        from: Option<&str>,
        to: Option<&str>,
        tx_type: TransactionType,
    ) -> FinancialTransaction {
        FinancialTransaction {
            id: AppState::generate_id(),
            date: Utc::now(),
            description: "test".to_string(),
            amount_cents,
            tx_type,
            from_account_id: from.map(String::from),
            to_account_id: to.map(String::from),
            related_invoice_id: None,
            related_purchase_id: None,
            category: None,
            budget_id: None,
        }
    }

    #[test]
    fn test_compute_balances_credit_debit_transfer() {
        let accounts = vec![account("a"), account("b")];
        let transactions = vec![
            tx(1000, None, Some("a"), TransactionType::SaleIncome),
            tx(300, Some("a"), None, TransactionType::Expense),
            tx(200, Some("a"), Some("b"), TransactionType::Transfer),
        ];

        let balances = compute_balances(&accounts, &transactions);
        assert_eq!(balances["a"].cents(), 500);
        assert_eq!(balances["b"].cents(), 200);
    }

    #[test]
    fn test_compute_balances_is_order_independent() {
        let accounts = vec![account("a"), account("b")];
        let mut transactions = vec![
            tx(1000, None, Some("a"), TransactionType::SaleIncome),
            tx(250, Some("a"), None, TransactionType::Expense),
            tx(400, Some("a"), Some("b"), TransactionType::Transfer),
            tx(75, None, Some("b"), TransactionType::CapitalDeposit),
        ];

        let forward = compute_balances(&accounts, &transactions);
        transactions.reverse();
        let backward = compute_balances(&accounts, &transactions);
        assert_eq!(forward, backward);
    }

    #[test]
    fn test_incremental_fold_equals_batch_fold() {
        let accounts = vec![account("a"), account("b")];
        let transactions = vec![
            tx(1000, None, Some("a"), TransactionType::SaleIncome),
            tx(300, Some("a"), None, TransactionType::Expense),
            tx(150, Some("a"), Some("b"), TransactionType::Transfer),
        ];

        // Recomputing after each appended entry must land on the same
        // balances as one fold over the full list.
        let mut incremental = HashMap::new();
        for n in 1..=transactions.len() {
            incremental = compute_balances(&accounts, &transactions[..n]);
        }
        assert_eq!(incremental, compute_balances(&accounts, &transactions));
    }

    #[test]
    fn test_unknown_account_still_contributes() {
        let balances = compute_balances(
            &[],
            &[tx(500, None, Some("ghost"), TransactionType::SaleIncome)],
        );
        assert_eq!(balances["ghost"].cents(), 500);
    }

    #[test]
    fn test_record_transaction_rules() {
        let mut state = AppState::new();
        state.accounts.push(account("a"));

        // Positive amount, existing account: ok.
        let recorded = state
            .record_transaction(TransactionInput::credit(
                TransactionType::CapitalDeposit,
                Money::from_cents(100),
                "a",
                "seed",
            ))
            .unwrap();
        assert_eq!(recorded.amount_cents, 100);
        assert_eq!(state.transactions.len(), 1);

        // Zero amount rejected.
        assert!(state
            .record_transaction(TransactionInput::credit(
                TransactionType::CapitalDeposit,
                Money::zero(),
                "a",
                "bad",
            ))
            .is_err());

        // No account at all rejected.
        let mut no_accounts = TransactionInput::credit(
            TransactionType::CapitalDeposit,
            Money::from_cents(10),
            "a",
            "bad",
        );
        no_accounts.to_account_id = None;
        assert!(state.record_transaction(no_accounts).is_err());

        // Unknown account rejected.
        assert!(matches!(
            state.record_transaction(TransactionInput::credit(
                TransactionType::CapitalDeposit,
                Money::from_cents(10),
                "ghost",
                "bad",
            )),
            Err(CoreError::NotFound { .. })
        ));

        // Failed appends left the log untouched.
        assert_eq!(state.transactions.len(), 1);
    }

    #[test]
    fn test_budget_funded_is_query_derived() {
        let mut state = AppState::new();
        state.accounts.push(account("a"));
        state.accounts.push(account("saving"));
        let budget = state
            .add_budget("New shelves", Money::from_cents(50_000))
            .unwrap();

        assert!(state.budget_funded(&budget.id).is_zero());

        state
            .record_transaction(
                TransactionInput::transfer(Money::from_cents(7_500), "a", "saving", "fund shelves")
                    .with_budget(budget.id.clone()),
            )
            .unwrap();

        assert_eq!(state.budget_funded(&budget.id).cents(), 7_500);

        // A transfer without the tag, and a non-transfer with it, do not count.
        state
            .record_transaction(TransactionInput::transfer(
                Money::from_cents(1_000),
                "a",
                "saving",
                "untagged",
            ))
            .unwrap();
        let mut deposit = TransactionInput::credit(
            TransactionType::CapitalDeposit,
            Money::from_cents(2_000),
            "saving",
            "deposit",
        );
        deposit.budget_id = Some(budget.id.clone());
        state.record_transaction(deposit).unwrap();

        assert_eq!(state.budget_funded(&budget.id).cents(), 7_500);
    }

    #[test]
    fn test_expense_and_reversal_net_to_zero() {
        let mut state = AppState::new();
        state.accounts.push(account("a"));

        let expense = state
            .add_expense(ExpenseInput {
                description: "Window cleaning".to_string(),
                amount: Money::from_cents(1_500),
                category: Some("maintenance".to_string()),
                account_id: "a".to_string(),
            })
            .unwrap();
        assert_eq!(state.account_balances()["a"].cents(), -1_500);

        state.delete_expense(&expense.id).unwrap();
        assert!(state.expenses.is_empty());
        // The ledger kept both entries; the balance nets to zero.
        assert_eq!(state.transactions.len(), 2);
        assert_eq!(state.account_balances()["a"].cents(), 0);
    }

    #[test]
    fn test_delete_missing_expense_errors() {
        let mut state = AppState::new();
        assert!(matches!(
            state.delete_expense("ghost"),
            Err(CoreError::NotFound { .. })
        ));
    }
}
