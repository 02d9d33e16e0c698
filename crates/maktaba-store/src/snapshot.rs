//! # Snapshot Store
//!
//! Full-state persistence: the whole [`AppState`] is written and read as
//! one JSON document.
//!
//! ## Write Path
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Atomic Save                                       │
//! │                                                                         │
//! │  save(&state)                                                           │
//! │    │                                                                    │
//! │    ├── serialize AppState → JSON                                       │
//! │    ├── write  <path>.tmp          (sibling of the real file)           │
//! │    └── rename <path>.tmp → <path> (atomic on the same filesystem)      │
//! │                                                                         │
//! │  A crash mid-save leaves either the old snapshot or the new one,       │
//! │  never a torn file.                                                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! A missing snapshot file is not an error: first launch starts from an
//! empty state.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use maktaba_core::AppState;

use crate::error::StoreResult;

/// Persists [`AppState`] snapshots at a fixed path.
#[derive(Debug, Clone)]
pub struct SnapshotStore {
    path: PathBuf,
}

impl SnapshotStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        SnapshotStore { path: path.into() }
    }

    /// The snapshot file this store reads and writes.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads the last saved state, or an empty one when no snapshot
    /// exists yet.
    pub fn load(&self) -> StoreResult<AppState> {
        if !self.path.exists() {
            info!(path = %self.path.display(), "No snapshot found, starting empty");
            return Ok(AppState::default());
        }

        let raw = fs::read_to_string(&self.path)?;
        let state: AppState = serde_json::from_str(&raw)?;
        debug!(
            path = %self.path.display(),
            products = state.products.len(),
            invoices = state.invoices.len(),
            "Snapshot loaded"
        );
        Ok(state)
    }

    /// Saves the full state atomically.
    ///
    /// The document is written to a temporary sibling and renamed over
    /// the real file, so readers never observe a partial snapshot.
    pub fn save(&self, state: &AppState) -> StoreResult<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let json = serde_json::to_string(state)?;
        let tmp = self.path.with_extension("tmp");
        fs::write(&tmp, json)?;
        fs::rename(&tmp, &self.path)?;

        debug!(path = %self.path.display(), "Snapshot saved");
        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use maktaba_core::ProductInput;

    fn sample_state() -> AppState {
        let mut state = AppState::new();
        state
            .add_product(ProductInput {
                name: "Dune".to_string(),
                author: Some("Frank Herbert".to_string()),
                category: Some("SF".to_string()),
                quantity: 7,
                price_cents: 1500,
                cost_price_cents: Some(900),
            })
            .unwrap();
        state
    }

    #[test]
    fn test_load_missing_snapshot_starts_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = SnapshotStore::new(dir.path().join("state.json"));
        let state = store.load().unwrap();
        assert_eq!(state, AppState::default());
    }

    #[test]
    fn test_save_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = SnapshotStore::new(dir.path().join("state.json"));

        let state = sample_state();
        store.save(&state).unwrap();
        let loaded = store.load().unwrap();
        assert_eq!(loaded, state);
    }

    #[test]
    fn test_save_creates_parent_directories() {
        let dir = tempfile::tempdir().unwrap();
        let store = SnapshotStore::new(dir.path().join("nested/deeper/state.json"));
        store.save(&AppState::default()).unwrap();
        assert!(store.path().exists());
    }

    #[test]
    fn test_save_overwrites_previous_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        let store = SnapshotStore::new(dir.path().join("state.json"));

        store.save(&AppState::default()).unwrap();
        let state = sample_state();
        store.save(&state).unwrap();

        assert_eq!(store.load().unwrap(), state);
        // No leftover temp file after a completed save.
        assert!(!dir.path().join("state.tmp").exists());
    }

    #[test]
    fn test_corrupt_snapshot_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");
        fs::write(&path, "{ not json").unwrap();

        let store = SnapshotStore::new(path);
        assert!(matches!(
            store.load(),
            Err(crate::error::StoreError::Json(_))
        ));
    }
}
