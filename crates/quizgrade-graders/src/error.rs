//! Grader error types.
//!
//! These errors represent failures when asking a grading backend for a
//! judgment. The rubric evaluator treats every one of them the same way
//! (fall back to heuristic grading), so the variants exist for logs and
//! tests rather than for control flow.

use thiserror::Error;

/// Errors that can occur when interacting with a grading backend.
#[derive(Debug, Error)]
pub enum GraderError {
    /// Authentication failed (invalid API key).
    #[error("authentication failed: {0}")]
    AuthenticationFailed(String),

    /// The API returned an error response.
    #[error("API error (HTTP {status}): {message}")]
    ApiError { status: u16, message: String },

    /// The request timed out.
    #[error("request timed out after {0}s")]
    Timeout(u64),

    /// A network error occurred.
    #[error("network error: {0}")]
    NetworkError(String),

    /// The backend replied but not with a usable judgment.
    #[error("malformed judgment: {0}")]
    MalformedJudgment(String),
}
