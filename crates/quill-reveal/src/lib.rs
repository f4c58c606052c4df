//! Quill reveal crate - typewriter text reveal.
//!
//! A reveal session exposes a growing prefix of a target string, one
//! character per tick. The session itself is a pure state machine
//! (Idle -> Running -> Finished); the [`Typewriter`] driver paces it with a
//! repeating timer and publishes frames over a watch channel. Starting a new
//! target cancels the previous timer first, so at most one timer is ever
//! active.

pub mod session;
pub mod typewriter;

pub use session::{RevealSession, RevealState};
pub use typewriter::{RevealFrame, Typewriter};
