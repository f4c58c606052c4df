//! Conversation session orchestration.
//!
//! Ties the AI text service, the history store, and the reveal typewriter
//! together behind a single mutable session that the app drives.

pub mod session;

pub use session::{ChatSession, SubmitOutcome};
