//! In-memory session store.
//!
//! The reference `SessionStore` implementation: a mutex-guarded map with the
//! same guarantees a SQL store would give through transactions and a unique
//! (session, question) index. Every session write checks the caller's
//! `expected_version` inside the critical section, so a stale writer gets a
//! conflict instead of double-applying.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use uuid::Uuid;

use quizgrade_core::error::SessionError;
use quizgrade_core::model::{Answer, LearningSession, Question, SessionStatus, UserScore};
use quizgrade_core::traits::{SessionRecord, SessionStore, SessionUpdate};

#[derive(Default)]
struct StoreInner {
    sessions: HashMap<Uuid, LearningSession>,
    /// Questions keyed by owning session.
    questions: HashMap<Uuid, Vec<Question>>,
    /// Answers keyed by owning session.
    answers: HashMap<Uuid, Vec<Answer>>,
    totals: HashMap<Uuid, u64>,
}

/// An in-memory [`SessionStore`].
#[derive(Default)]
pub struct InMemoryStore {
    inner: Mutex<StoreInner>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionStore for InMemoryStore {
    async fn create_session(
        &self,
        session: &LearningSession,
        questions: &[Question],
    ) -> Result<(), SessionError> {
        let mut inner = self.inner.lock().expect("store lock poisoned");
        inner.sessions.insert(session.id, session.clone());
        inner.questions.insert(session.id, questions.to_vec());
        inner.answers.insert(session.id, Vec::new());
        Ok(())
    }

    async fn session(&self, id: Uuid) -> Result<SessionRecord, SessionError> {
        let inner = self.inner.lock().expect("store lock poisoned");
        let session = inner
            .sessions
            .get(&id)
            .cloned()
            .ok_or(SessionError::SessionNotFound(id))?;
        let answers = inner.answers.get(&id).cloned().unwrap_or_default();
        Ok(SessionRecord { session, answers })
    }

    async fn question(
        &self,
        session_id: Uuid,
        question_id: Uuid,
    ) -> Result<Question, SessionError> {
        let inner = self.inner.lock().expect("store lock poisoned");
        if !inner.sessions.contains_key(&session_id) {
            return Err(SessionError::SessionNotFound(session_id));
        }
        inner
            .questions
            .get(&session_id)
            .and_then(|qs| qs.iter().find(|q| q.id == question_id))
            .cloned()
            .ok_or(SessionError::QuestionNotFound {
                session: session_id,
                question: question_id,
            })
    }

    async fn record_answer(
        &self,
        update: &SessionUpdate,
        answer: &Answer,
    ) -> Result<(), SessionError> {
        let mut inner = self.inner.lock().expect("store lock poisoned");

        let session = inner
            .sessions
            .get(&update.session_id)
            .ok_or(SessionError::SessionNotFound(update.session_id))?;
        if session.version != update.expected_version {
            return Err(SessionError::Conflict(update.session_id));
        }

        let duplicate = inner
            .answers
            .get(&update.session_id)
            .is_some_and(|answers| answers.iter().any(|a| a.question_id == answer.question_id));
        if duplicate {
            return Err(SessionError::DuplicateAnswer(answer.question_id));
        }

        let session = inner
            .sessions
            .get_mut(&update.session_id)
            .ok_or(SessionError::SessionNotFound(update.session_id))?;
        session.status = update.status;
        session.current_question_index = update.current_question_index;
        session.score = update.score;
        if session.ended_at.is_none() {
            session.ended_at = update.ended_at;
        }
        session.version += 1;

        inner
            .answers
            .entry(update.session_id)
            .or_default()
            .push(answer.clone());
        Ok(())
    }

    async fn update_status(
        &self,
        session_id: Uuid,
        expected_version: u64,
        status: SessionStatus,
    ) -> Result<(), SessionError> {
        let mut inner = self.inner.lock().expect("store lock poisoned");
        let session = inner
            .sessions
            .get_mut(&session_id)
            .ok_or(SessionError::SessionNotFound(session_id))?;
        if session.version != expected_version {
            return Err(SessionError::Conflict(session_id));
        }
        session.status = status;
        session.version += 1;
        Ok(())
    }

    async fn add_to_total_score(
        &self,
        learner_id: Uuid,
        delta: u64,
    ) -> Result<u64, SessionError> {
        let mut inner = self.inner.lock().expect("store lock poisoned");
        let total = inner.totals.entry(learner_id).or_insert(0);
        *total += delta;
        Ok(*total)
    }

    async fn user_score(&self, learner_id: Uuid) -> Result<UserScore, SessionError> {
        let inner = self.inner.lock().expect("store lock poisoned");
        Ok(UserScore {
            learner_id,
            total_score: inner.totals.get(&learner_id).copied().unwrap_or(0),
        })
    }
}
