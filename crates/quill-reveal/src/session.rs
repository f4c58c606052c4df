//! Reveal session state machine.
//!
//! Enforces valid state transitions for the reveal lifecycle:
//! - Idle -> Running (start with a non-empty target)
//! - Idle -> Finished (start with an empty target)
//! - Running -> Finished (final character revealed, or restart to empty)
//! - Running -> Running (restart with a new target)
//! - Finished -> Running / Finished (restart)

use std::fmt;

/// Operational state of a reveal session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RevealState {
    /// No target set. Nothing to reveal.
    Idle,
    /// Revealing characters of the current target.
    Running,
    /// Revealed text equals the target. The explicit completion signal.
    Finished,
}

impl fmt::Display for RevealState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RevealState::Idle => write!(f, "Idle"),
            RevealState::Running => write!(f, "Running"),
            RevealState::Finished => write!(f, "Finished"),
        }
    }
}

impl RevealState {
    /// Returns whether a transition from `self` to `target` is valid.
    pub fn can_transition_to(&self, target: &RevealState) -> bool {
        matches!(
            (self, target),
            (RevealState::Idle, RevealState::Running)
                | (RevealState::Idle, RevealState::Finished)
                | (RevealState::Running, RevealState::Finished)
                // Restart transitions
                | (RevealState::Running, RevealState::Running)
                | (RevealState::Finished, RevealState::Running)
                | (RevealState::Finished, RevealState::Finished)
        )
    }
}

/// One reveal of a target string, advanced a character at a time.
///
/// The revealed text is a slice of the target up to a char boundary, so the
/// prefix invariant holds structurally for the whole session. `Finished` is
/// the sole completion signal: mid-session the revealed text can equal some
/// eventual target under a concurrent restart, so consumers must never infer
/// completion from text comparison.
#[derive(Debug, Clone)]
pub struct RevealSession {
    source: String,
    revealed_bytes: usize,
    state: RevealState,
}

impl Default for RevealSession {
    fn default() -> Self {
        Self::new()
    }
}

impl RevealSession {
    /// Create a session with no target, in `Idle`.
    pub fn new() -> Self {
        Self {
            source: String::new(),
            revealed_bytes: 0,
            state: RevealState::Idle,
        }
    }

    /// Begin revealing `target`, discarding any in-progress reveal.
    ///
    /// An empty target finishes immediately with empty revealed text.
    pub fn start(&mut self, target: impl Into<String>) {
        self.source = target.into();
        self.revealed_bytes = 0;
        if self.source.is_empty() {
            self.set_state(RevealState::Finished);
        } else {
            self.set_state(RevealState::Running);
        }
    }

    /// Reveal exactly one more character. No-op unless `Running`.
    ///
    /// The advance that reaches the final character clamps the revealed
    /// prefix to the full target before finishing, so the revealed text is
    /// exactly the target on completion.
    pub fn advance(&mut self) {
        if self.state != RevealState::Running {
            return;
        }
        if let Some(c) = self.source[self.revealed_bytes..].chars().next() {
            self.revealed_bytes += c.len_utf8();
        }
        if self.revealed_bytes >= self.source.len() {
            self.revealed_bytes = self.source.len();
            self.set_state(RevealState::Finished);
        }
    }

    /// The revealed prefix of the target.
    pub fn revealed(&self) -> &str {
        &self.source[..self.revealed_bytes]
    }

    /// The full target string.
    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn state(&self) -> RevealState {
        self.state
    }

    pub fn is_finished(&self) -> bool {
        self.state == RevealState::Finished
    }

    /// Force the session back to `Idle` with no target.
    pub fn reset(&mut self) {
        tracing::debug!("Reveal session reset to Idle from {}", self.state);
        self.source.clear();
        self.revealed_bytes = 0;
        self.state = RevealState::Idle;
    }

    fn set_state(&mut self, target: RevealState) {
        debug_assert!(
            self.state.can_transition_to(&target),
            "invalid reveal transition: {} -> {}",
            self.state,
            target
        );
        tracing::trace!("Reveal state: {} -> {}", self.state, target);
        self.state = target;
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_display() {
        assert_eq!(RevealState::Idle.to_string(), "Idle");
        assert_eq!(RevealState::Running.to_string(), "Running");
        assert_eq!(RevealState::Finished.to_string(), "Finished");
    }

    #[test]
    fn test_valid_transitions() {
        // Start
        assert!(RevealState::Idle.can_transition_to(&RevealState::Running));
        assert!(RevealState::Idle.can_transition_to(&RevealState::Finished));
        // Completion
        assert!(RevealState::Running.can_transition_to(&RevealState::Finished));
        // Restarts
        assert!(RevealState::Running.can_transition_to(&RevealState::Running));
        assert!(RevealState::Finished.can_transition_to(&RevealState::Running));
        assert!(RevealState::Finished.can_transition_to(&RevealState::Finished));
    }

    #[test]
    fn test_invalid_transitions() {
        // Idle is only re-entered through reset, never by transition.
        assert!(!RevealState::Running.can_transition_to(&RevealState::Idle));
        assert!(!RevealState::Finished.can_transition_to(&RevealState::Idle));
        assert!(!RevealState::Idle.can_transition_to(&RevealState::Idle));
    }

    #[test]
    fn test_new_session_is_idle_and_empty() {
        let session = RevealSession::new();
        assert_eq!(session.state(), RevealState::Idle);
        assert_eq!(session.revealed(), "");
        assert_eq!(session.source(), "");
        assert!(!session.is_finished());
    }

    #[test]
    fn test_empty_target_finishes_immediately() {
        let mut session = RevealSession::new();
        session.start("");
        assert!(session.is_finished());
        assert_eq!(session.revealed(), "");
    }

    #[test]
    fn test_advance_reveals_one_character_per_call() {
        let mut session = RevealSession::new();
        session.start("Hi there");

        session.advance();
        assert_eq!(session.revealed(), "H");
        session.advance();
        assert_eq!(session.revealed(), "Hi");
        assert_eq!(session.state(), RevealState::Running);
    }

    #[test]
    fn test_final_advance_reaches_target_exactly() {
        let mut session = RevealSession::new();
        session.start("abc");

        for _ in 0..3 {
            assert!(!session.is_finished());
            session.advance();
        }
        assert!(session.is_finished());
        assert_eq!(session.revealed(), "abc");
        assert_eq!(session.revealed(), session.source());
    }

    #[test]
    fn test_advance_after_finished_is_noop() {
        let mut session = RevealSession::new();
        session.start("a");
        session.advance();
        assert!(session.is_finished());

        session.advance();
        session.advance();
        assert!(session.is_finished());
        assert_eq!(session.revealed(), "a");
    }

    #[test]
    fn test_revealed_is_always_a_prefix() {
        let mut session = RevealSession::new();
        let target = "héllo wörld 🌍!";
        session.start(target);

        while !session.is_finished() {
            session.advance();
            assert!(target.starts_with(session.revealed()));
        }
        assert_eq!(session.revealed(), target);
    }

    #[test]
    fn test_multibyte_characters_advance_one_at_a_time() {
        let mut session = RevealSession::new();
        session.start("日本語");

        session.advance();
        assert_eq!(session.revealed(), "日");
        session.advance();
        assert_eq!(session.revealed(), "日本");
        session.advance();
        assert_eq!(session.revealed(), "日本語");
        assert!(session.is_finished());
    }

    #[test]
    fn test_restart_discards_partial_output() {
        let mut session = RevealSession::new();
        session.start("a long first target");
        session.advance();
        session.advance();
        assert_eq!(session.revealed(), "a ");

        session.start("Hi");
        assert_eq!(session.revealed(), "");
        assert_eq!(session.state(), RevealState::Running);

        session.advance();
        session.advance();
        assert!(session.is_finished());
        assert_eq!(session.revealed(), "Hi");
    }

    #[test]
    fn test_restart_after_finish() {
        let mut session = RevealSession::new();
        session.start("a");
        session.advance();
        assert!(session.is_finished());

        session.start("b");
        assert_eq!(session.state(), RevealState::Running);
        assert_eq!(session.revealed(), "");
    }

    #[test]
    fn test_reset_forces_idle() {
        let mut session = RevealSession::new();
        session.start("something");
        session.advance();

        session.reset();
        assert_eq!(session.state(), RevealState::Idle);
        assert_eq!(session.revealed(), "");
        assert_eq!(session.source(), "");
    }
}
