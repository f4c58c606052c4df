//! Full-snapshot history persistence.
//!
//! The store owns a single fixed file path and reads/writes the complete
//! record list on every operation. The in-memory list held by the caller is
//! the source of truth; persistence failures are logged and swallowed.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use quill_core::types::Conversation;
use quill_core::{QuillError, Result};

/// Fixed file name of the history blob inside the data directory.
pub const HISTORY_FILE: &str = "history.json";

/// Persisted conversation history backed by one JSON file.
pub struct HistoryStore {
    path: PathBuf,
}

impl HistoryStore {
    /// Store rooted at a data directory; the blob lives at
    /// `<data_dir>/history.json`.
    pub fn new(data_dir: impl AsRef<Path>) -> Self {
        Self {
            path: data_dir.as_ref().join(HISTORY_FILE),
        }
    }

    /// Store over an explicit file path.
    pub fn at_path(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the full record list.
    ///
    /// A missing file is an empty history. Any other failure (unreadable
    /// file, malformed JSON) discards the stored blob and returns empty:
    /// corruption self-heals without surfacing an error to the caller.
    pub fn load(&self) -> Vec<Conversation> {
        let raw = match std::fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => return Vec::new(),
            Err(e) => {
                warn!(
                    "Failed to read history from {}: {}. Discarding blob.",
                    self.path.display(),
                    e
                );
                self.clear();
                return Vec::new();
            }
        };

        match serde_json::from_str(&raw) {
            Ok(records) => records,
            Err(e) => {
                warn!(
                    "Malformed history blob at {}: {}. Discarding blob.",
                    self.path.display(),
                    e
                );
                self.clear();
                Vec::new()
            }
        }
    }

    /// Serialize and overwrite the full blob. Failure is logged and
    /// swallowed.
    pub fn save(&self, records: &[Conversation]) {
        if let Err(e) = self.try_save(records) {
            warn!("Failed to save history to {}: {}", self.path.display(), e);
        }
    }

    /// Serialize and overwrite the full blob, propagating failures.
    pub fn try_save(&self, records: &[Conversation]) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let blob = serde_json::to_string(records)
            .map_err(|e| QuillError::History(format!("Failed to serialize history: {}", e)))?;
        std::fs::write(&self.path, blob)?;
        debug!(
            "Saved {} record(s) to {}",
            records.len(),
            self.path.display()
        );
        Ok(())
    }

    /// Remove the blob file entirely. Failure is logged and swallowed.
    pub fn clear(&self) {
        if let Err(e) = self.try_clear() {
            warn!("Failed to clear history at {}: {}", self.path.display(), e);
        }
    }

    /// Remove the blob file, propagating failures. A missing file counts as
    /// success.
    pub fn try_clear(&self) -> Result<()> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn make_store() -> (TempDir, HistoryStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = HistoryStore::new(dir.path());
        (dir, store)
    }

    fn make_records() -> Vec<Conversation> {
        vec![
            Conversation::at("Second prompt", "Second response", 2_000),
            Conversation::at("First prompt", "First response", 1_000),
        ]
    }

    #[test]
    fn test_load_missing_file_returns_empty() {
        let (_dir, store) = make_store();
        assert!(store.load().is_empty());
        assert!(!store.path().exists());
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let (_dir, store) = make_store();
        let records = make_records();

        store.save(&records);
        let loaded = store.load();

        assert_eq!(loaded, records);
    }

    #[test]
    fn test_load_preserves_given_order() {
        // Newest-first ordering is the caller's construction; the store must
        // not re-sort.
        let (_dir, store) = make_store();
        let records = make_records();
        store.save(&records);

        let loaded = store.load();
        assert_eq!(loaded[0].id, "2000");
        assert_eq!(loaded[1].id, "1000");
    }

    #[test]
    fn test_save_load_save_is_byte_identical() {
        let (_dir, store) = make_store();
        store.save(&make_records());
        let first = std::fs::read(store.path()).unwrap();

        let reloaded = store.load();
        store.save(&reloaded);
        let second = std::fs::read(store.path()).unwrap();

        assert_eq!(first, second);
    }

    #[test]
    fn test_save_overwrites_full_blob() {
        let (_dir, store) = make_store();
        store.save(&make_records());

        let shorter = vec![Conversation::at("Only", "One", 3_000)];
        store.save(&shorter);

        let loaded = store.load();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].id, "3000");
    }

    #[test]
    fn test_corrupted_blob_returns_empty_and_clears_store() {
        let (_dir, store) = make_store();
        std::fs::create_dir_all(store.path().parent().unwrap()).unwrap();
        std::fs::write(store.path(), "{ not json at all").unwrap();

        assert!(store.load().is_empty());
        // The corrupt file is purged; subsequent loads are empty too.
        assert!(!store.path().exists());
        assert!(store.load().is_empty());
    }

    #[test]
    fn test_wrong_shape_blob_is_treated_as_corrupt() {
        let (_dir, store) = make_store();
        std::fs::write(store.path(), r#"{"id":"1"}"#).unwrap();

        assert!(store.load().is_empty());
        assert!(!store.path().exists());
    }

    #[test]
    fn test_clear_removes_blob() {
        let (_dir, store) = make_store();
        store.save(&make_records());
        assert!(store.path().exists());

        store.clear();
        assert!(!store.path().exists());
        assert!(store.load().is_empty());
    }

    #[test]
    fn test_clear_missing_file_is_ok() {
        let (_dir, store) = make_store();
        assert!(store.try_clear().is_ok());
    }

    #[test]
    fn test_unicode_content_round_trips() {
        let (_dir, store) = make_store();
        let records = vec![Conversation::at("こんにちは", "héllo wörld 🌍", 5_000)];
        store.save(&records);
        assert_eq!(store.load(), records);
    }

    #[test]
    fn test_save_creates_missing_data_dir() {
        let dir = tempfile::tempdir().unwrap();
        let store = HistoryStore::new(dir.path().join("nested").join("data"));

        store.save(&make_records());
        assert_eq!(store.load().len(), 2);
    }
}
