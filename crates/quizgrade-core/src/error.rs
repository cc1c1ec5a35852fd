//! Error taxonomy for evaluation and session progression.
//!
//! Evaluation and scoring are pure and can only fail on malformed input;
//! every variant here is a caller error except `Conflict`, which is a
//! retryable consistency error. Grading-backend failures never appear here:
//! the rubric evaluator recovers them with its deterministic fallback.

use thiserror::Error;
use uuid::Uuid;

use crate::model::{AnswerKind, SessionStatus, Subject};

/// Errors from evaluating a single answer.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum EvalError {
    /// The submitted value's shape does not match the question's.
    #[error("answer shape mismatch: expected {expected}, got {got}")]
    AnswerShapeMismatch {
        expected: AnswerKind,
        got: AnswerKind,
    },

    /// No evaluation strategy exists for this subject/shape pairing.
    #[error("no evaluation strategy for {subject} {kind} answers")]
    UnsupportedCombination { subject: Subject, kind: AnswerKind },
}

/// Errors from session operations.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("session not found: {0}")]
    SessionNotFound(Uuid),

    /// The question does not exist or belongs to another session.
    #[error("question {question} does not belong to session {session}")]
    QuestionNotFound { session: Uuid, question: Uuid },

    /// The question already has a recorded answer in this session.
    #[error("question {0} has already been answered")]
    DuplicateAnswer(Uuid),

    /// The operation is not valid from the session's current state.
    #[error("cannot {action} a session that is {from}")]
    InvalidTransition {
        from: SessionStatus,
        action: &'static str,
    },

    /// The session was modified concurrently; the caller may retry.
    #[error("session {0} was modified concurrently")]
    Conflict(Uuid),

    #[error(transparent)]
    Evaluation(#[from] EvalError),
}

impl SessionError {
    /// Returns `true` if the caller may retry the operation as-is.
    pub fn is_retryable(&self) -> bool {
        matches!(self, SessionError::Conflict(_))
    }
}
