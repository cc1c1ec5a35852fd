//! End-to-end session progression tests over the in-memory store.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use uuid::Uuid;

use quizgrade_core::dispatch::EvaluationDispatcher;
use quizgrade_core::error::SessionError;
use quizgrade_core::model::{
    AnswerValue, Difficulty, QuestionDraft, QuestionSet, SessionStatus, Subject,
};
use quizgrade_core::rubric::RubricEvaluator;
use quizgrade_core::traits::{JudgeRequest, Judgment, RubricJudge};
use quizgrade_graders::MockJudge;
use quizgrade_session::{InMemoryStore, SessionProgression};

fn hints() -> [String; 4] {
    std::array::from_fn(|i| format!("hint {i}"))
}

fn math_set(count: usize) -> QuestionSet {
    QuestionSet {
        id: "math-easy".into(),
        name: "Easy Math".into(),
        description: String::new(),
        subject: Subject::Math,
        questions: (0..count)
            .map(|i| QuestionDraft {
                id: format!("add-{i}"),
                subject: Subject::Math,
                difficulty: Difficulty::Easy,
                prompt: format!("What is {i} + {i}?"),
                correct_answer: AnswerValue::Number { value: 2 * i as i64 },
                hints: hints(),
            })
            .collect(),
    }
}

fn science_set(count: usize) -> QuestionSet {
    QuestionSet {
        id: "science-explain".into(),
        name: "Science Explanations".into(),
        description: String::new(),
        subject: Subject::Science,
        questions: (0..count)
            .map(|i| QuestionDraft {
                id: format!("explain-{i}"),
                subject: Subject::Science,
                difficulty: Difficulty::Easy,
                prompt: format!("Explain phenomenon {i}."),
                correct_answer: AnswerValue::Explanation {
                    value: "water evaporates because of heat".into(),
                    keywords: vec!["evaporates".into(), "heat".into()],
                },
                hints: hints(),
            })
            .collect(),
    }
}

fn progression_with(judge: impl RubricJudge + 'static) -> (SessionProgression, Arc<InMemoryStore>) {
    let store = Arc::new(InMemoryStore::new());
    let dispatcher = EvaluationDispatcher::new(RubricEvaluator::new(Arc::new(judge)));
    (
        SessionProgression::new(store.clone(), dispatcher),
        store,
    )
}

fn number(value: i64) -> AnswerValue {
    AnswerValue::Number { value }
}

#[tokio::test]
async fn perfect_easy_session_applies_the_multiplier() {
    let (progression, store) = progression_with(MockJudge::approving());
    let learner = Uuid::new_v4();
    let started = progression.start(learner, &math_set(3)).await.unwrap();

    for (i, question) in started.questions.iter().enumerate() {
        let outcome = progression
            .submit_answer(started.session.id, question.id, number(2 * i as i64), 0, 1200)
            .await
            .unwrap();
        assert!(outcome.is_correct);
        assert_eq!(outcome.question_points, 10);
        assert_eq!(outcome.next_question_index, i as u32 + 1);

        if i < 2 {
            assert!(!outcome.is_session_complete);
            assert_eq!(outcome.session_score, 10 * (i as u32 + 1));
        } else {
            // 30 raw points at 100% accuracy: multiplier 1.5.
            assert!(outcome.is_session_complete);
            assert_eq!(outcome.session_score, 45);
        }
    }

    let record = progression.session_view(started.session.id).await.unwrap();
    assert_eq!(record.session.status, SessionStatus::Completed);
    assert_eq!(record.session.score, 45);
    assert!(record.session.ended_at.is_some());
    assert_eq!(record.answers.len(), 3);

    use quizgrade_core::traits::SessionStore;
    assert_eq!(store.user_score(learner).await.unwrap().total_score, 45);
}

#[tokio::test]
async fn misses_drag_the_multiplier_down() {
    let (progression, _) = progression_with(MockJudge::approving());
    let started = progression
        .start(Uuid::new_v4(), &math_set(3))
        .await
        .unwrap();
    let ids: Vec<Uuid> = started.questions.iter().map(|q| q.id).collect();

    // One right, two wrong: raw 10, accuracy 33%, multiplier 0.8.
    progression
        .submit_answer(started.session.id, ids[0], number(0), 0, 800)
        .await
        .unwrap();
    progression
        .submit_answer(started.session.id, ids[1], number(99), 0, 800)
        .await
        .unwrap();
    let last = progression
        .submit_answer(started.session.id, ids[2], number(99), 0, 800)
        .await
        .unwrap();

    assert!(last.is_session_complete);
    assert_eq!(last.session_score, 8);
}

#[tokio::test]
async fn hints_reduce_question_points() {
    let (progression, _) = progression_with(MockJudge::approving());
    let started = progression
        .start(Uuid::new_v4(), &math_set(1))
        .await
        .unwrap();

    let outcome = progression
        .submit_answer(started.session.id, started.questions[0].id, number(0), 4, 500)
        .await
        .unwrap();
    // 10 base - 8 hint penalty, floored at 1: 2 raw, then 1.5x accuracy bonus.
    assert_eq!(outcome.question_points, 2);
    assert_eq!(outcome.session_score, 3);
}

#[tokio::test]
async fn pause_and_resume_transition_matrix() {
    let (progression, _) = progression_with(MockJudge::approving());
    let started = progression
        .start(Uuid::new_v4(), &math_set(1))
        .await
        .unwrap();
    let session_id = started.session.id;
    let question_id = started.questions[0].id;

    // resume from in_progress is invalid.
    let err = progression.resume(session_id).await.unwrap_err();
    assert!(matches!(
        err,
        SessionError::InvalidTransition {
            from: SessionStatus::InProgress,
            ..
        }
    ));

    progression.pause(session_id).await.unwrap();

    // pause is not idempotent.
    let err = progression.pause(session_id).await.unwrap_err();
    assert!(matches!(
        err,
        SessionError::InvalidTransition {
            from: SessionStatus::Paused,
            ..
        }
    ));

    // Submitting while paused is invalid.
    let err = progression
        .submit_answer(session_id, question_id, number(0), 0, 100)
        .await
        .unwrap_err();
    assert!(matches!(err, SessionError::InvalidTransition { .. }));

    progression.resume(session_id).await.unwrap();
    let outcome = progression
        .submit_answer(session_id, question_id, number(0), 0, 100)
        .await
        .unwrap();
    assert!(outcome.is_session_complete);

    // Completed is terminal.
    let err = progression.pause(session_id).await.unwrap_err();
    assert!(matches!(
        err,
        SessionError::InvalidTransition {
            from: SessionStatus::Completed,
            ..
        }
    ));
}

#[tokio::test]
async fn duplicate_submission_is_rejected() {
    let (progression, _) = progression_with(MockJudge::approving());
    let started = progression
        .start(Uuid::new_v4(), &math_set(2))
        .await
        .unwrap();
    let question_id = started.questions[0].id;

    progression
        .submit_answer(started.session.id, question_id, number(0), 0, 100)
        .await
        .unwrap();
    let err = progression
        .submit_answer(started.session.id, question_id, number(0), 0, 100)
        .await
        .unwrap_err();
    assert!(matches!(err, SessionError::DuplicateAnswer(id) if id == question_id));

    // The score was not double-counted.
    let record = progression.session_view(started.session.id).await.unwrap();
    assert_eq!(record.session.score, 10);
    assert_eq!(record.answers.len(), 1);
}

#[tokio::test]
async fn unknown_ids_are_caller_errors() {
    let (progression, _) = progression_with(MockJudge::approving());
    let started = progression
        .start(Uuid::new_v4(), &math_set(1))
        .await
        .unwrap();

    let err = progression
        .submit_answer(started.session.id, Uuid::new_v4(), number(0), 0, 100)
        .await
        .unwrap_err();
    assert!(matches!(err, SessionError::QuestionNotFound { .. }));

    let err = progression.session_view(Uuid::new_v4()).await.unwrap_err();
    assert!(matches!(err, SessionError::SessionNotFound(_)));
}

#[tokio::test]
async fn grading_outage_still_completes_the_session() {
    // Every judge call fails; keyword fallback grades the explanations.
    let (progression, store) = progression_with(MockJudge::failing("backend down"));
    let learner = Uuid::new_v4();
    let started = progression.start(learner, &science_set(2)).await.unwrap();

    for question in &started.questions {
        let outcome = progression
            .submit_answer(
                started.session.id,
                question.id,
                AnswerValue::Explanation {
                    value: "the heat makes the water evaporate, so it evaporates away".into(),
                    keywords: vec![],
                },
                0,
                2000,
            )
            .await
            .unwrap();
        assert!(outcome.is_correct);
    }

    let record = progression.session_view(started.session.id).await.unwrap();
    assert_eq!(record.session.status, SessionStatus::Completed);
    // 20 raw at 100% accuracy.
    assert_eq!(record.session.score, 30);

    use quizgrade_core::traits::SessionStore;
    assert_eq!(store.user_score(learner).await.unwrap().total_score, 30);
}

#[tokio::test]
async fn repeated_reads_are_identical() {
    let (progression, _) = progression_with(MockJudge::approving());
    let started = progression
        .start(Uuid::new_v4(), &math_set(2))
        .await
        .unwrap();
    progression
        .submit_answer(started.session.id, started.questions[0].id, number(0), 0, 100)
        .await
        .unwrap();

    let first = progression.session_view(started.session.id).await.unwrap();
    let second = progression.session_view(started.session.id).await.unwrap();
    assert_eq!(
        first.session.current_question_index,
        second.session.current_question_index
    );
    assert_eq!(first.session.score, second.session.score);
    assert_eq!(first.answers.len(), second.answers.len());
}

/// Judge that grades correctly but slowly, to force read/write interleaving.
struct SlowApprovingJudge;

#[async_trait]
impl RubricJudge for SlowApprovingJudge {
    fn name(&self) -> &str {
        "slow-approving"
    }

    async fn judge(&self, _request: &JudgeRequest) -> anyhow::Result<Judgment> {
        tokio::time::sleep(Duration::from_millis(50)).await;
        Ok(Judgment {
            is_correct: true,
            score: 100,
            feedback: String::new(),
        })
    }
}

#[tokio::test]
async fn concurrent_submissions_cannot_both_advance() {
    let (progression, _) = progression_with(SlowApprovingJudge);
    let started = progression
        .start(Uuid::new_v4(), &science_set(3))
        .await
        .unwrap();
    let session_id = started.session.id;
    let answer = AnswerValue::Explanation {
        value: "heat makes it evaporate".into(),
        keywords: vec![],
    };

    // Both submissions read the session before either writes; only one may
    // advance the same question slot.
    let (a, b) = tokio::join!(
        progression.submit_answer(session_id, started.questions[0].id, answer.clone(), 0, 100),
        progression.submit_answer(session_id, started.questions[1].id, answer.clone(), 0, 100),
    );

    let successes = [a.is_ok(), b.is_ok()].iter().filter(|ok| **ok).count();
    assert_eq!(successes, 1, "exactly one concurrent submit may win");

    let loser = if a.is_err() { a.unwrap_err() } else { b.unwrap_err() };
    assert!(matches!(loser, SessionError::Conflict(_)));
    assert!(loser.is_retryable());

    // The session advanced exactly one slot.
    let record = progression.session_view(session_id).await.unwrap();
    assert_eq!(record.session.current_question_index, 1);
    assert_eq!(record.answers.len(), 1);
}
