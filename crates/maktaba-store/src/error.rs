//! # Store Error Types
//!
//! Error types for snapshot persistence and backup handling.
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Propagation                                    │
//! │                                                                         │
//! │  std::io::Error / serde_json::Error                                    │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  StoreError (this module) ← Adds the persistence context               │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Caller decides: abort the save, refuse the import, keep the           │
//! │  in-memory state untouched                                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

/// Snapshot and backup errors.
///
/// A failed load or save never corrupts the snapshot on disk: writes go
/// to a temporary file first, and a rejected import leaves the current
/// state in place.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Reading or writing the snapshot file failed.
    ///
    /// ## When This Occurs
    /// - Directory is not writable
    /// - Disk full
    /// - The file vanished between open and read
    #[error("Snapshot I/O failed: {0}")]
    Io(#[from] std::io::Error),

    /// The snapshot or backup is not valid JSON for the expected shape.
    #[error("Snapshot serialization failed: {0}")]
    Json(#[from] serde_json::Error),

    /// A backup was syntactically valid JSON but contained none of the
    /// known collections. Importing it would wipe the shop's data, so it
    /// is refused.
    #[error("Backup contains no recognizable data; import refused")]
    EmptyBackup,
}

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

// =============================================================================
// Unit Tests
// =============================================================================
