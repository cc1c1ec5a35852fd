//! Core trait definitions for rubric judges and session persistence.
//!
//! These async traits are implemented by the `quizgrade-graders` and
//! `quizgrade-session` crates respectively.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::SessionError;
use crate::model::{Answer, LearningSession, Question, SessionStatus, UserScore};

// ---------------------------------------------------------------------------
// Rubric judge trait
// ---------------------------------------------------------------------------

/// Trait for text-generation backends that grade free-text answers.
#[async_trait]
pub trait RubricJudge: Send + Sync {
    /// Human-readable judge name (e.g. "anthropic").
    fn name(&self) -> &str;

    /// Grade a submission against a rubric prompt.
    ///
    /// Any error, however it arises, is treated identically by the caller:
    /// the rubric evaluator falls back to deterministic heuristics.
    async fn judge(&self, request: &JudgeRequest) -> anyhow::Result<Judgment>;
}

/// A grading request. The prompt is fully assembled by the rubric
/// evaluator; judges only transport it and parse the reply.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JudgeRequest {
    /// The complete grading prompt, including scoring-band guidance.
    pub prompt: String,
}

/// The structured judgment a grading backend must produce.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Judgment {
    pub is_correct: bool,
    /// Claimed quality score; values above 100 are rejected as malformed.
    pub score: u8,
    #[serde(default)]
    pub feedback: String,
}

/// Extract a JSON object from judge output.
///
/// Handles:
/// - A fenced ```json``` (or bare ```) block
/// - Surrounding prose before/after the object
/// - Truncated (unclosed) fences
pub fn extract_json_object(response: &str) -> Option<String> {
    let body = if let Some(start) = response.find("```") {
        let after = &response[start + 3..];
        let after = after.strip_prefix("json").unwrap_or(after);
        match after.find("```") {
            Some(end) => &after[..end],
            // Truncated fence, take what accumulated
            None => after,
        }
    } else {
        response
    };

    let start = body.find('{')?;
    let end = body.rfind('}')?;
    if end < start {
        return None;
    }
    Some(body[start..=end].to_string())
}

// ---------------------------------------------------------------------------
// Session store trait
// ---------------------------------------------------------------------------

/// A session loaded together with its recorded answers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionRecord {
    pub session: LearningSession,
    pub answers: Vec<Answer>,
}

/// The session-row mutation that accompanies a recorded answer.
///
/// Applied atomically with the answer insert; `expected_version` must match
/// the stored session or the write fails with [`SessionError::Conflict`].
#[derive(Debug, Clone)]
pub struct SessionUpdate {
    pub session_id: Uuid,
    pub expected_version: u64,
    pub status: SessionStatus,
    pub current_question_index: u32,
    pub score: u32,
    pub ended_at: Option<chrono::DateTime<chrono::Utc>>,
}

/// Persistence contract the session progression requires.
///
/// Implementations must serialize mutation per session: a write whose
/// `expected_version` is stale fails with [`SessionError::Conflict`] rather
/// than silently double-applying, and the learner total is an atomic
/// increment, never a read-modify-write in the caller.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Persist a new session together with its questions.
    async fn create_session(
        &self,
        session: &LearningSession,
        questions: &[Question],
    ) -> Result<(), SessionError>;

    /// Load a session with all recorded answers.
    async fn session(&self, id: Uuid) -> Result<SessionRecord, SessionError>;

    /// Load one question, verifying it belongs to the session.
    async fn question(&self, session_id: Uuid, question_id: Uuid)
        -> Result<Question, SessionError>;

    /// Atomically insert an answer and apply the session update.
    ///
    /// Fails with [`SessionError::Conflict`] on a stale version and
    /// [`SessionError::DuplicateAnswer`] if the question already has an
    /// answer; in both cases nothing is written.
    async fn record_answer(&self, update: &SessionUpdate, answer: &Answer)
        -> Result<(), SessionError>;

    /// Version-guarded status-only update (pause/resume).
    async fn update_status(
        &self,
        session_id: Uuid,
        expected_version: u64,
        status: SessionStatus,
    ) -> Result<(), SessionError>;

    /// Additively fold a completed session's score into the learner's
    /// running total. Returns the new total.
    async fn add_to_total_score(&self, learner_id: Uuid, delta: u64) -> Result<u64, SessionError>;

    /// Read a learner's running total (zero if never scored).
    async fn user_score(&self, learner_id: Uuid) -> Result<UserScore, SessionError>;
}
