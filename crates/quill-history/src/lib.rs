//! Quill history crate - persisted conversation history.
//!
//! A flat full-snapshot store: one fixed JSON file holds the entire
//! newest-first record list. Every save overwrites the whole blob; a corrupt
//! blob self-heals to an empty list. No migrations, no schema versioning.

pub mod store;

pub use store::{HistoryStore, HISTORY_FILE};
