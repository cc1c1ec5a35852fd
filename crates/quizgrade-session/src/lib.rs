//! quizgrade-session — Session scoring and progression.
//!
//! Turns a stream of per-question evaluations into a session-level score and
//! drives the session through its lifecycle, backed by any
//! [`quizgrade_core::traits::SessionStore`] implementation.

pub mod memory;
pub mod progression;

pub use memory::InMemoryStore;
pub use progression::{SessionProgression, StartedSession, SubmissionOutcome};
