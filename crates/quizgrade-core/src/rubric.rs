//! AI-assisted rubric grading with a deterministic fallback.
//!
//! The evaluator asks a [`RubricJudge`] for a structured judgment and, if
//! the judge fails, times out, or returns a malformed score, grades the
//! answer itself with keyword or word-overlap heuristics. Every failure is
//! caught at exactly one boundary (`try_judge`); callers always get an
//! [`EvaluationResult`], never an error.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use tracing::instrument;

use crate::exact;
use crate::results::EvaluationResult;
use crate::traits::{JudgeRequest, Judgment, RubricJudge};

/// Upper bound on one grading round trip.
pub const DEFAULT_JUDGE_TIMEOUT_SECS: u64 = 30;

const BAND_GUIDANCE: &str = "Score the student's answer from 0 to 100:\n\
- 0-20: wrong or unrelated\n\
- 21-50: partial understanding with major gaps\n\
- 51-80: mostly right with minor omissions\n\
- 81-100: complete and correct\n\
\n\
Respond with a single JSON object and nothing else:\n\
{\"is_correct\": <bool>, \"score\": <integer 0-100>, \"feedback\": \"<one short sentence for the student>\"}";

/// Grades free-text answers through a judge, falling back to heuristics.
pub struct RubricEvaluator {
    judge: Arc<dyn RubricJudge>,
    timeout: Duration,
}

impl RubricEvaluator {
    pub fn new(judge: Arc<dyn RubricJudge>) -> Self {
        Self {
            judge,
            timeout: Duration::from_secs(DEFAULT_JUDGE_TIMEOUT_SECS),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Grade a science free-text explanation.
    #[instrument(skip_all, fields(judge = self.judge.name()))]
    pub async fn grade_explanation(
        &self,
        question: &str,
        expected: &str,
        keywords: &[String],
        submitted: &str,
    ) -> EvaluationResult {
        let mut prompt = format!(
            "You are grading a science explanation.\n\n\
             Question: {question}\n\
             Expected answer: {expected}\n"
        );
        if !keywords.is_empty() {
            prompt.push_str(&format!("Key ideas: {}\n", keywords.join(", ")));
        }
        prompt.push_str(&format!("Student's answer: {submitted}\n\n{BAND_GUIDANCE}"));

        match self.try_judge(&JudgeRequest { prompt }).await {
            Some(judgment) => accept(judgment),
            None => explanation_fallback(expected, keywords, submitted),
        }
    }

    /// Grade an english sentence correction.
    #[instrument(skip_all, fields(judge = self.judge.name()))]
    pub async fn grade_correction(
        &self,
        question: &str,
        original: &str,
        corrected: &str,
        submitted: &str,
    ) -> EvaluationResult {
        let prompt = format!(
            "You are grading an english sentence correction.\n\n\
             Task: {question}\n\
             Original sentence: {original}\n\
             Expected correction: {corrected}\n\
             Student's correction: {submitted}\n\n{BAND_GUIDANCE}"
        );

        match self.try_judge(&JudgeRequest { prompt }).await {
            Some(judgment) => accept(judgment),
            None => exact::evaluate_text(corrected, submitted),
        }
    }

    /// The single failure boundary around the external call.
    ///
    /// Timeout, transport error, and out-of-range score all collapse to
    /// `None`; the caller's fallback produces the result.
    async fn try_judge(&self, request: &JudgeRequest) -> Option<Judgment> {
        match tokio::time::timeout(self.timeout, self.judge.judge(request)).await {
            Err(_) => {
                tracing::warn!(
                    judge = self.judge.name(),
                    timeout_secs = self.timeout.as_secs(),
                    "rubric judge timed out, using fallback grading"
                );
                None
            }
            Ok(Err(e)) => {
                tracing::warn!(
                    judge = self.judge.name(),
                    error = %e,
                    "rubric judge failed, using fallback grading"
                );
                None
            }
            Ok(Ok(judgment)) if judgment.score > 100 => {
                tracing::warn!(
                    judge = self.judge.name(),
                    score = judgment.score,
                    "rubric judge returned an out-of-range score, using fallback grading"
                );
                None
            }
            Ok(Ok(judgment)) => Some(judgment),
        }
    }
}

/// Correctness is re-derived from the score regardless of the judge's flag.
fn accept(judgment: Judgment) -> EvaluationResult {
    let feedback = if judgment.feedback.trim().is_empty() {
        None
    } else {
        Some(judgment.feedback)
    };
    EvaluationResult::graded(judgment.score, feedback)
}

fn explanation_fallback(expected: &str, keywords: &[String], submitted: &str) -> EvaluationResult {
    if keywords.is_empty() {
        return word_overlap_result(expected, submitted);
    }

    let submitted_lower = submitted.to_lowercase();
    let matched = keywords
        .iter()
        .filter(|k| submitted_lower.contains(&k.to_lowercase()))
        .count();
    let score = (100.0 * matched as f64 / keywords.len() as f64).round() as u8;
    EvaluationResult::graded(
        score,
        Some(format!(
            "You covered {matched} of {} key ideas.",
            keywords.len()
        )),
    )
}

/// Jaccard similarity over words longer than 2 characters; the 0.7
/// threshold applies to the similarity itself, not the rounded score.
fn word_overlap_result(expected: &str, submitted: &str) -> EvaluationResult {
    let expected_words = content_words(expected);
    let submitted_words = content_words(submitted);

    let union = expected_words.union(&submitted_words).count();
    let similarity = if union == 0 {
        0.0
    } else {
        expected_words.intersection(&submitted_words).count() as f64 / union as f64
    };

    let is_correct = similarity >= 0.7;
    let score = (similarity * 100.0).round() as u8;
    let feedback = if is_correct {
        "Close enough!".to_string()
    } else {
        format!("The expected answer was \"{}\".", expected.trim())
    };

    EvaluationResult {
        is_correct,
        score,
        feedback: Some(feedback),
    }
}

fn content_words(s: &str) -> HashSet<String> {
    s.split_whitespace()
        .map(|w| {
            w.trim_matches(|c: char| !c.is_alphanumeric())
                .to_lowercase()
        })
        .filter(|w| w.chars().count() > 2)
        .collect()
}
