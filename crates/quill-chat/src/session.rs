//! Chat session state machine.
//!
//! A [`ChatSession`] owns the conversation list, the persistent history
//! store, and the reveal typewriter. All mutation happens through its
//! methods, so there is exactly one writer for the list and one owner
//! for the reveal timer.

use quill_ai::TextService;
use quill_core::types::{self, Conversation};
use quill_history::HistoryStore;
use quill_reveal::{RevealFrame, Typewriter};
use tokio::sync::watch;
use tracing::{debug, error, info};

/// Result of a [`ChatSession::submit`] call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// The response was recorded and its reveal has started.
    Submitted { id: String },
    /// The AI request failed; the message is available via [`ChatSession::error`].
    Failed,
    /// The prompt was empty or whitespace-only and was ignored.
    EmptyPrompt,
    /// Another request is already in flight; this one was dropped.
    Busy,
}

/// Coordinates one chat view: prompt submission, history, and reveal.
pub struct ChatSession<S> {
    service: S,
    store: HistoryStore,
    typewriter: Typewriter,
    conversations: Vec<Conversation>,
    current_id: Option<String>,
    error: Option<String>,
    is_loading: bool,
}

impl<S: TextService> ChatSession<S> {
    /// Creates a session backed by the given service and store, loading
    /// whatever history the store currently holds.
    pub fn new(service: S, store: HistoryStore, typewriter: Typewriter) -> Self {
        let conversations = store.load();
        info!("Loaded {} conversation(s) from history", conversations.len());
        Self {
            service,
            store,
            typewriter,
            conversations,
            current_id: None,
            error: None,
            is_loading: false,
        }
    }

    /// Sends `prompt` to the AI service and records the exchange.
    ///
    /// Empty or whitespace-only prompts are dropped without touching any
    /// state. While a request is in flight further submissions are
    /// rejected rather than queued. On success the new conversation is
    /// prepended, persisted, selected, and its reveal starts; on failure
    /// the service's error message is kept for display and nothing is
    /// recorded.
    pub async fn submit(&mut self, prompt: &str) -> SubmitOutcome {
        if prompt.trim().is_empty() {
            debug!("Ignoring empty prompt");
            return SubmitOutcome::EmptyPrompt;
        }
        if self.is_loading {
            debug!("Dropping submission, a request is already in flight");
            return SubmitOutcome::Busy;
        }

        self.is_loading = true;
        self.error = None;
        self.current_id = None;
        self.typewriter.start("");

        let outcome = match self.service.generate(prompt).await {
            Ok(response) => {
                let record = self.next_record(prompt, &response);
                let id = record.id.clone();
                info!("Recorded conversation {}", id);
                self.conversations.insert(0, record);
                self.store.save(&self.conversations);
                self.current_id = Some(id.clone());
                self.typewriter.start(response);
                SubmitOutcome::Submitted { id }
            }
            Err(e) => {
                error!("AI request failed: {}", e);
                self.error = Some(e.to_string());
                SubmitOutcome::Failed
            }
        };
        self.is_loading = false;
        outcome
    }

    /// Switches the view to an existing conversation and replays its
    /// reveal. Unknown ids are ignored. Returns whether a switch happened.
    pub fn select(&mut self, id: &str) -> bool {
        let Some(found) = self.conversations.iter().find(|c| c.id == id) else {
            debug!("Ignoring selection of unknown conversation {}", id);
            return false;
        };
        let response = found.response.clone();
        self.current_id = Some(found.id.clone());
        self.error = None;
        self.typewriter.start(response);
        true
    }

    /// Clears the current view without touching the recorded history.
    pub fn new_chat(&mut self) {
        self.current_id = None;
        self.error = None;
        self.typewriter.start("");
    }

    /// Deletes all recorded conversations, in memory and on disk.
    pub fn clear_history(&mut self) {
        self.store.clear();
        self.conversations.clear();
        info!("Cleared conversation history");
        self.new_chat();
    }

    /// All recorded conversations, newest first.
    pub fn conversations(&self) -> &[Conversation] {
        &self.conversations
    }

    /// The conversation currently shown, if any.
    pub fn current(&self) -> Option<&Conversation> {
        let id = self.current_id.as_deref()?;
        self.conversations.iter().find(|c| c.id == id)
    }

    /// The last AI request failure, cleared by the next accepted
    /// submission or selection.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Whether an AI request is in flight.
    pub fn is_loading(&self) -> bool {
        self.is_loading
    }

    /// Whether the current response is still being revealed.
    pub fn is_revealing(&self) -> bool {
        self.typewriter.is_active()
    }

    /// Watches the reveal stream for the current response.
    pub fn subscribe(&self) -> watch::Receiver<RevealFrame> {
        self.typewriter.subscribe()
    }

    // -- Private helpers --

    /// Builds the next record, nudging the creation time forward when it
    /// would collide with (or precede) the newest existing record, so ids
    /// stay unique and the list order stays strictly newest first.
    fn next_record(&self, prompt: &str, response: &str) -> Conversation {
        let mut millis = types::now_millis();
        if let Some(head) = self.conversations.first() {
            if millis <= head.timestamp {
                millis = head.timestamp + 1;
            }
        }
        Conversation::at(prompt, response, millis)
    }
}
