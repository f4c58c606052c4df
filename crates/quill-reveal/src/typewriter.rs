//! Timer-driven reveal driver.
//!
//! Owns at most one timer task. Each tick advances the session by one
//! character and publishes a [`RevealFrame`] over a watch channel; starting a
//! new target aborts the previous task before the new one is spawned, and
//! dropping the driver aborts whatever is still running.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::debug;

use crate::session::RevealSession;

/// One published snapshot of the active reveal.
///
/// `finished` is the sole completion signal; consumers must not infer
/// completion from `text` alone.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RevealFrame {
    pub text: String,
    pub finished: bool,
}

impl RevealFrame {
    fn of(session: &RevealSession) -> Self {
        Self {
            text: session.revealed().to_string(),
            finished: session.is_finished(),
        }
    }
}

/// Paces a reveal session with a repeating timer.
pub struct Typewriter {
    speed: Duration,
    frames: Arc<watch::Sender<RevealFrame>>,
    timer: Option<JoinHandle<()>>,
}

impl Typewriter {
    /// Driver revealing one character every `speed`.
    pub fn new(speed: Duration) -> Self {
        let (tx, _rx) = watch::channel(RevealFrame::default());
        Self {
            speed,
            frames: Arc::new(tx),
            timer: None,
        }
    }

    /// Subscribe to reveal frames. The receiver starts at the latest frame.
    pub fn subscribe(&self) -> watch::Receiver<RevealFrame> {
        self.frames.subscribe()
    }

    /// The latest published frame.
    pub fn current(&self) -> RevealFrame {
        self.frames.borrow().clone()
    }

    /// Whether a timer task is still revealing.
    pub fn is_active(&self) -> bool {
        self.timer.as_ref().is_some_and(|t| !t.is_finished())
    }

    /// Begin revealing `target`, canceling any previous session's timer
    /// before the new one is scheduled.
    ///
    /// An empty target publishes an immediately-finished frame and schedules
    /// no timer.
    pub fn start(&mut self, target: impl Into<String>) {
        self.cancel();

        let mut session = RevealSession::new();
        session.start(target);
        self.frames.send_replace(RevealFrame::of(&session));
        if session.is_finished() {
            return;
        }

        let frames = Arc::clone(&self.frames);
        let speed = self.speed;
        self.timer = Some(tokio::spawn(async move {
            let mut ticker = tokio::time::interval(speed);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // The first interval tick completes immediately; consume it so
            // the first character appears after one full period.
            ticker.tick().await;
            loop {
                ticker.tick().await;
                session.advance();
                frames.send_replace(RevealFrame::of(&session));
                if session.is_finished() {
                    break;
                }
            }
        }));
    }

    /// Abort the active timer task, if any.
    pub fn cancel(&mut self) {
        if let Some(timer) = self.timer.take() {
            timer.abort();
            debug!("Canceled previous reveal timer");
        }
    }
}

impl Drop for Typewriter {
    fn drop(&mut self) {
        self.cancel();
    }
}

// =============================================================================
// Tests
// =============================================================================
