//! The session state machine.
//!
//! States: `InProgress -> {Paused, Completed}`, `Paused -> InProgress`,
//! `Completed` terminal. Each operation is one read, one validation, and one
//! version-guarded write; the rubric judge call happens between the read and
//! the write with no lock held.

use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::instrument;
use uuid::Uuid;

use quizgrade_core::dispatch::EvaluationDispatcher;
use quizgrade_core::error::SessionError;
use quizgrade_core::model::{
    Answer, AnswerValue, LearningSession, Question, QuestionSet, SessionStatus, HINT_COUNT,
};
use quizgrade_core::scoring;
use quizgrade_core::traits::{SessionRecord, SessionStore, SessionUpdate};

/// A freshly started session together with its instantiated questions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StartedSession {
    pub session: LearningSession,
    pub questions: Vec<Question>,
}

/// What the caller gets back from a submission.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmissionOutcome {
    pub is_correct: bool,
    /// Quality score in 0..=100 from the evaluation strategy.
    pub score: u8,
    pub feedback: Option<String>,
    pub correct_answer: AnswerValue,
    /// Difficulty-weighted points this answer earned.
    pub question_points: u32,
    pub next_question_index: u32,
    pub is_session_complete: bool,
    /// Raw running score while in progress; the multiplied final score once
    /// the session completes.
    pub session_score: u32,
}

/// Drives sessions through their lifecycle.
pub struct SessionProgression {
    store: Arc<dyn SessionStore>,
    dispatcher: EvaluationDispatcher,
}

impl SessionProgression {
    pub fn new(store: Arc<dyn SessionStore>, dispatcher: EvaluationDispatcher) -> Self {
        Self { store, dispatcher }
    }

    /// Start a new session over a question set.
    #[instrument(skip(self, set), fields(set = %set.id, learner = %learner_id))]
    pub async fn start(
        &self,
        learner_id: Uuid,
        set: &QuestionSet,
    ) -> Result<StartedSession, SessionError> {
        let session = LearningSession::begin(learner_id, set.questions.len() as u32);
        let questions: Vec<Question> = set
            .questions
            .iter()
            .enumerate()
            .map(|(i, draft)| Question::from_draft(draft, session.id, i as u32))
            .collect();

        self.store.create_session(&session, &questions).await?;
        tracing::info!(
            session = %session.id,
            questions = questions.len(),
            "session started"
        );

        Ok(StartedSession { session, questions })
    }

    /// Evaluate and record one answer, advancing the session.
    ///
    /// On the final answer the accuracy multiplier is applied, the session
    /// completes, and the finalized score is folded into the learner's
    /// running total.
    #[instrument(skip(self, user_answer), fields(session = %session_id, question = %question_id))]
    pub async fn submit_answer(
        &self,
        session_id: Uuid,
        question_id: Uuid,
        user_answer: AnswerValue,
        hints_used: u8,
        time_ms: u64,
    ) -> Result<SubmissionOutcome, SessionError> {
        let record = self.store.session(session_id).await?;
        let session = &record.session;

        if session.status != SessionStatus::InProgress {
            return Err(SessionError::InvalidTransition {
                from: session.status,
                action: "answer",
            });
        }

        let question = self.store.question(session_id, question_id).await?;

        if record.answers.iter().any(|a| a.question_id == question_id) {
            return Err(SessionError::DuplicateAnswer(question_id));
        }

        // The 4-hint cap is enforced upstream; clamp anyway.
        let hints_used = hints_used.min(HINT_COUNT as u8);

        let result = self.dispatcher.evaluate(&question, &user_answer).await?;
        let question_points =
            scoring::score_question(result.is_correct, hints_used, question.difficulty);

        let next_question_index = session.current_question_index + 1;
        let is_session_complete = next_question_index >= session.total_questions;
        let raw_score = session.score + question_points;

        let session_score = if is_session_complete {
            let answered = record.answers.len() as u32 + 1;
            let correct = record.answers.iter().filter(|a| a.is_correct).count() as u32
                + u32::from(result.is_correct);
            scoring::final_score(raw_score, scoring::accuracy(correct, answered))
        } else {
            raw_score
        };

        let answer = Answer {
            question_id,
            session_id,
            user_answer,
            is_correct: result.is_correct,
            score: result.score,
            points: question_points,
            hints_used,
            time_ms,
            answered_at: Utc::now(),
        };

        let update = SessionUpdate {
            session_id,
            expected_version: session.version,
            status: if is_session_complete {
                SessionStatus::Completed
            } else {
                SessionStatus::InProgress
            },
            current_question_index: next_question_index,
            score: session_score,
            ended_at: is_session_complete.then(Utc::now),
        };

        self.store.record_answer(&update, &answer).await?;

        if is_session_complete {
            let total = self
                .store
                .add_to_total_score(session.learner_id, u64::from(session_score))
                .await?;
            tracing::info!(
                session = %session_id,
                final_score = session_score,
                learner_total = total,
                "session completed"
            );
        }

        Ok(SubmissionOutcome {
            is_correct: result.is_correct,
            score: result.score,
            feedback: result.feedback,
            correct_answer: question.correct_answer,
            question_points,
            next_question_index,
            is_session_complete,
            session_score,
        })
    }

    /// Pause an in-progress session.
    #[instrument(skip(self), fields(session = %session_id))]
    pub async fn pause(&self, session_id: Uuid) -> Result<(), SessionError> {
        let record = self.store.session(session_id).await?;
        if record.session.status != SessionStatus::InProgress {
            return Err(SessionError::InvalidTransition {
                from: record.session.status,
                action: "pause",
            });
        }
        self.store
            .update_status(session_id, record.session.version, SessionStatus::Paused)
            .await
    }

    /// Resume a paused session.
    #[instrument(skip(self), fields(session = %session_id))]
    pub async fn resume(&self, session_id: Uuid) -> Result<(), SessionError> {
        let record = self.store.session(session_id).await?;
        if record.session.status != SessionStatus::Paused {
            return Err(SessionError::InvalidTransition {
                from: record.session.status,
                action: "resume",
            });
        }
        self.store
            .update_status(session_id, record.session.version, SessionStatus::InProgress)
            .await
    }

    /// Read-only snapshot of a session with its answers.
    pub async fn session_view(&self, session_id: Uuid) -> Result<SessionRecord, SessionError> {
        self.store.session(session_id).await
    }
}
