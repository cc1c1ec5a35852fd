//! Evaluation strategy selection.
//!
//! Routes a (subject, answer shape) pair to the right evaluator through a
//! closed exhaustive match, so an unsupported pairing is a typed error
//! rather than a silent fall-through.

use serde::{Deserialize, Serialize};

use crate::error::EvalError;
use crate::exact;
use crate::model::{AnswerKind, AnswerValue, Question, Subject};
use crate::results::EvaluationResult;
use crate::rubric::RubricEvaluator;
use crate::similarity::{self, SpellingTolerance};

/// How english free-text answers are matched.
///
/// Fill-in-the-blank sets want exact matching, free writing wants edit
/// distance, and single-word vocabulary sets want the spelling policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TextMatchPolicy {
    #[default]
    Similarity,
    Exact,
    SpellingStrict,
    SpellingLenient,
}

/// Selects the evaluator for a submitted answer and normalizes the result.
pub struct EvaluationDispatcher {
    rubric: RubricEvaluator,
    text_policy: TextMatchPolicy,
}

impl EvaluationDispatcher {
    pub fn new(rubric: RubricEvaluator) -> Self {
        Self {
            rubric,
            text_policy: TextMatchPolicy::default(),
        }
    }

    pub fn with_text_policy(mut self, policy: TextMatchPolicy) -> Self {
        self.text_policy = policy;
        self
    }

    /// Evaluate a submission against its question.
    ///
    /// Fails only on malformed input (shape mismatch or an unsupported
    /// subject/shape pairing); grading-backend failures are absorbed by the
    /// rubric evaluator's fallback.
    pub async fn evaluate(
        &self,
        question: &Question,
        submitted: &AnswerValue,
    ) -> Result<EvaluationResult, EvalError> {
        let expected = &question.correct_answer;
        if expected.kind() != submitted.kind() {
            return Err(EvalError::AnswerShapeMismatch {
                expected: expected.kind(),
                got: submitted.kind(),
            });
        }

        match (question.subject, expected, submitted) {
            (Subject::Math, AnswerValue::Number { value: c }, AnswerValue::Number { value: s }) => {
                Ok(exact::evaluate_number(*c, *s))
            }

            (
                Subject::Science,
                AnswerValue::Boolean { value: c },
                AnswerValue::Boolean { value: s },
            ) => Ok(exact::evaluate_boolean(*c, *s)),
            (
                Subject::Science,
                AnswerValue::Choice { value: c },
                AnswerValue::Choice { value: s },
            ) => Ok(exact::evaluate_choice(c, s)),
            (
                Subject::Science,
                AnswerValue::Explanation { value, keywords },
                AnswerValue::Explanation { value: s, .. },
            ) => Ok(self
                .rubric
                .grade_explanation(&question.prompt, value, keywords, s)
                .await),

            (
                Subject::English,
                AnswerValue::Choice { value: c },
                AnswerValue::Choice { value: s },
            ) => Ok(exact::evaluate_choice(c, s)),
            (Subject::English, AnswerValue::Text { value: c }, AnswerValue::Text { value: s }) => {
                Ok(match self.text_policy {
                    TextMatchPolicy::Similarity => similarity::score_free_text(c, s),
                    TextMatchPolicy::Exact => exact::evaluate_text(c, s),
                    TextMatchPolicy::SpellingStrict => {
                        similarity::score_spelling(c, s, SpellingTolerance::Strict)
                    }
                    TextMatchPolicy::SpellingLenient => {
                        similarity::score_spelling(c, s, SpellingTolerance::Lenient)
                    }
                })
            }
            (
                Subject::English,
                AnswerValue::Correction {
                    original,
                    corrected,
                },
                AnswerValue::Correction { corrected: s, .. },
            ) => Ok(self
                .rubric
                .grade_correction(&question.prompt, original, corrected, s)
                .await),

            (subject, expected, _) => Err(EvalError::UnsupportedCombination {
                subject,
                kind: expected.kind(),
            }),
        }
    }
}

/// Whether an evaluation strategy exists for this subject/shape pairing.
///
/// Mirrors the dispatch table above; used by question-set validation to
/// reject combinations before a session ever reaches them.
pub fn is_supported(subject: Subject, kind: AnswerKind) -> bool {
    matches!(
        (subject, kind),
        (Subject::Math, AnswerKind::Number)
            | (Subject::Science, AnswerKind::Boolean)
            | (Subject::Science, AnswerKind::Choice)
            | (Subject::Science, AnswerKind::Explanation)
            | (Subject::English, AnswerKind::Choice)
            | (Subject::English, AnswerKind::Text)
            | (Subject::English, AnswerKind::Correction)
    )
}
