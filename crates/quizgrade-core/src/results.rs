//! Evaluation result type shared by every strategy.

use serde::{Deserialize, Serialize};

/// Minimum quality score a graded answer needs to count as correct.
///
/// Exact-match strategies only ever produce 0 or 100; similarity and rubric
/// strategies derive correctness from this threshold.
pub const CORRECT_THRESHOLD: u8 = 70;

/// The outcome of evaluating one submitted answer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationResult {
    /// Whether the answer counts as correct.
    pub is_correct: bool,
    /// Quality score in 0..=100.
    pub score: u8,
    /// Learner-facing feedback; `None` when there is nothing to add.
    #[serde(default)]
    pub feedback: Option<String>,
}

impl EvaluationResult {
    /// A full-credit exact match.
    pub fn correct() -> Self {
        Self {
            is_correct: true,
            score: 100,
            feedback: None,
        }
    }

    /// A zero-credit mismatch with feedback naming the expected answer.
    pub fn incorrect(feedback: impl Into<String>) -> Self {
        Self {
            is_correct: false,
            score: 0,
            feedback: Some(feedback.into()),
        }
    }

    /// A graded result; correctness is derived from [`CORRECT_THRESHOLD`].
    pub fn graded(score: u8, feedback: Option<String>) -> Self {
        Self {
            is_correct: score >= CORRECT_THRESHOLD,
            score,
            feedback,
        }
    }
}
