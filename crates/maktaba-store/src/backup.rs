//! # Backup Export & Import
//!
//! Single-document JSON backups of the whole shop.
//!
//! ## Guarantees
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Backup Round Trip                                  │
//! │                                                                         │
//! │  export_backup(&state)  →  pretty JSON document (same shape as the     │
//! │                            snapshot, readable in any text editor)       │
//! │                                                                         │
//! │  import_backup(&json)   →  full AppState, REPLACING current state      │
//! │                                                                         │
//! │  export → import is lossless: the restored state equals the            │
//! │  exported one, derived balances included (they are recomputed from      │
//! │  the restored transaction log).                                         │
//! │                                                                         │
//! │  A document with none of the known collections is refused              │
//! │  (EmptyBackup) so a stray file cannot wipe the shop.                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde_json::Value;
use tracing::info;

use maktaba_core::AppState;

use crate::error::{StoreError, StoreResult};

/// Top-level keys a genuine backup carries at least one of.
const KNOWN_COLLECTIONS: &[&str] = &[
    "products",
    "invoices",
    "returnRequests",
    "expenses",
    "purchases",
    "accounts",
    "transactions",
    "budgets",
    "tillCloseouts",
    "users",
    "customers",
    "suppliers",
    "requestedBooks",
];

/// Serializes the full state as a pretty-printed JSON document.
pub fn export_backup(state: &AppState) -> StoreResult<String> {
    let json = serde_json::to_string_pretty(state)?;
    info!(bytes = json.len(), "Backup exported");
    Ok(json)
}

/// Parses a backup document into a full replacement state.
///
/// ## Rules
/// - Must be valid JSON object for the snapshot shape
/// - Must contain at least one known collection key; anything else is
///   refused as [`StoreError::EmptyBackup`]
/// - Collections absent from the document load as empty (older backups
///   predate some collections)
pub fn import_backup(json: &str) -> StoreResult<AppState> {
    let value: Value = serde_json::from_str(json)?;

    let recognizable = value
        .as_object()
        .map(|obj| KNOWN_COLLECTIONS.iter().any(|key| obj.contains_key(*key)))
        .unwrap_or(false);
    if !recognizable {
        return Err(StoreError::EmptyBackup);
    }

    let state: AppState = serde_json::from_value(value)?;
    info!(
        products = state.products.len(),
        invoices = state.invoices.len(),
        transactions = state.transactions.len(),
        "Backup imported"
    );
    Ok(state)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use maktaba_core::{
        AccountInput, AccountType, Money, OrderInput, OrderType, ProductInput, Role, Session,
        TransactionInput, TransactionType, User,
    };

    fn populated_state() -> AppState {
        let mut state = AppState::new();
        let product = state
            .add_product(ProductInput {
                name: "Dune".to_string(),
                author: Some("Frank Herbert".to_string()),
                category: None,
                quantity: 10,
                price_cents: 1500,
                cost_price_cents: Some(900),
            })
            .unwrap();

        let user = User {
            id: "u-1".to_string(),
            username: "amira".to_string(),
            role: Role::Cashier,
        };
        state.users.push(user.clone());
        state.ensure_cashier_tills();
        let session = Session::new(&user);

        state
            .create_order(
                Some(&session),
                OrderInput {
                    order_type: OrderType::Sale,
                    items: vec![maktaba_core::InvoiceItem {
                        product_id: product.id,
                        product_name: "Dune".to_string(),
                        quantity: 2,
                        price_cents: 1500,
                        cost_price_cents: Some(900),
                        discount_cents: None,
                    }],
                    customer_info: None,
                    shipping_fee: Money::zero(),
                    source: None,
                },
            )
            .unwrap();

        let bank = state
            .add_account(AccountInput {
                name: "Bank".to_string(),
                account_type: AccountType::Bank,
                user_id: None,
            })
            .unwrap();
        state
            .record_transaction(TransactionInput::credit(
                TransactionType::CapitalDeposit,
                Money::from_cents(100_000),
                bank.id,
                "Opening capital",
            ))
            .unwrap();
        state
    }

    #[test]
    fn test_export_import_round_trip_is_lossless() {
        let state = populated_state();
        let json = export_backup(&state).unwrap();
        let restored = import_backup(&json).unwrap();

        assert_eq!(restored, state);
        // Derived values come out identical because the log round-tripped.
        assert_eq!(restored.account_balances(), state.account_balances());
    }

    #[test]
    fn test_import_refuses_unrecognizable_documents() {
        assert!(matches!(
            import_backup("{}"),
            Err(StoreError::EmptyBackup)
        ));
        assert!(matches!(
            import_backup(r#"{"somethingElse": []}"#),
            Err(StoreError::EmptyBackup)
        ));
        assert!(matches!(
            import_backup(r#"[1, 2, 3]"#),
            Err(StoreError::EmptyBackup)
        ));
        assert!(matches!(
            import_backup("not json at all"),
            Err(StoreError::Json(_))
        ));
    }

    #[test]
    fn test_import_tolerates_missing_collections() {
        // An older backup that only knew about products.
        let json = r#"{"products": [{
            "id": "p-1",
            "name": "Dune",
            "author": null,
            "category": null,
            "quantity": 3,
            "priceCents": 1500,
            "costPriceCents": null
        }]}"#;

        let state = import_backup(json).unwrap();
        assert_eq!(state.products.len(), 1);
        assert!(state.invoices.is_empty());
        assert!(state.transactions.is_empty());
    }
}
