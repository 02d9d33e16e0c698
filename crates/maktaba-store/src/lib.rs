//! # maktaba-store: Persistence Layer for Maktaba POS
//!
//! This crate persists the shop's state for maktaba-core. There is no
//! database: the whole [`maktaba_core::AppState`] travels as one JSON
//! document, both for the working snapshot and for user-facing backups.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Maktaba POS Data Flow                              │
//! │                                                                         │
//! │  operation(&mut AppState, ...) in maktaba-core                         │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                  maktaba-store (THIS CRATE)                     │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────────┐        ┌───────────────────────────┐   │   │
//! │  │   │   SnapshotStore   │        │      Backup module        │   │   │
//! │  │   │   (snapshot.rs)   │        │       (backup.rs)         │   │   │
//! │  │   │                   │        │                           │   │   │
//! │  │   │ load() / save()   │        │ export_backup()           │   │   │
//! │  │   │ temp file+rename  │        │ import_backup()           │   │   │
//! │  │   └───────────────────┘        └───────────────────────────┘   │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  one JSON file: the full shop state                                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`snapshot`] - Atomic full-state load/save at a fixed path
//! - [`backup`] - Export/import of the same document for the user
//! - [`error`] - Store error types
//!
//! ## Usage
//!
//! ```rust,no_run
//! use maktaba_store::SnapshotStore;
//!
//! # fn main() -> Result<(), maktaba_store::StoreError> {
//! let store = SnapshotStore::new("maktaba/state.json");
//! let mut state = store.load()?;
//! // ... run operations against the state ...
//! store.save(&state)?;
//! # Ok(())
//! # }
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod backup;
pub mod error;
pub mod snapshot;

// =============================================================================
// Re-exports
// =============================================================================

pub use backup::{export_backup, import_backup};
pub use error::{StoreError, StoreResult};
pub use snapshot::SnapshotStore;
