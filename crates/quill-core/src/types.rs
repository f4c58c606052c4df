use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// =============================================================================
// Entity Structs
// =============================================================================

/// A single prompt/response exchange.
///
/// Records are immutable once created: the orchestrator builds one after each
/// successful AI call, prepends it to the in-memory list, and never touches it
/// again. Removal only happens through a full-history clear.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Conversation {
    /// Creation-time-derived identifier (epoch milliseconds as a decimal
    /// string). Unique within the stored list.
    pub id: String,
    pub prompt: String,
    pub response: String,
    /// Creation time in epoch milliseconds.
    pub timestamp: i64,
}

impl Conversation {
    /// Build a record stamped with the current time.
    pub fn new(prompt: impl Into<String>, response: impl Into<String>) -> Self {
        Self::at(prompt, response, now_millis())
    }

    /// Build a record stamped with an explicit creation time.
    ///
    /// The orchestrator uses this to disambiguate same-millisecond
    /// submissions while keeping `id` derived from the creation time.
    pub fn at(prompt: impl Into<String>, response: impl Into<String>, millis: i64) -> Self {
        Self {
            id: millis.to_string(),
            prompt: prompt.into(),
            response: response.into(),
            timestamp: millis,
        }
    }

    /// Creation time as a UTC datetime, for display formatting.
    pub fn created_at(&self) -> DateTime<Utc> {
        DateTime::from_timestamp_millis(self.timestamp).unwrap_or_else(Utc::now)
    }
}

// =============================================================================
// Newtype Wrappers
// =============================================================================

/// Validated data directory path.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DataDir(pub String);

impl DataDir {
    pub fn new(path: String) -> Self {
        let expanded = if path.starts_with('~') {
            let home = std::env::var("USERPROFILE")
                .or_else(|_| std::env::var("HOME"))
                .unwrap_or_else(|_| ".".to_string());
            path.replacen('~', &home, 1)
        } else {
            path
        };
        Self(expanded)
    }
}

// =============================================================================
// Temporal helpers
// =============================================================================

/// Current time in epoch milliseconds.
pub fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}
