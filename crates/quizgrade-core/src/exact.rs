//! Binary exact-match evaluation.
//!
//! Total functions over well-typed input: every comparison yields a score of
//! 0 or 100 and attaches feedback only on a mismatch.

use crate::results::EvaluationResult;

/// Trimmed, case-insensitive form used for all string comparisons.
pub(crate) fn normalize(s: &str) -> String {
    s.trim().to_lowercase()
}

/// Math: exact integer equality, no tolerance.
pub fn evaluate_number(correct: i64, submitted: i64) -> EvaluationResult {
    if correct == submitted {
        EvaluationResult::correct()
    } else {
        EvaluationResult::incorrect(format!("The correct answer was {correct}."))
    }
}

/// Science true/false.
pub fn evaluate_boolean(correct: bool, submitted: bool) -> EvaluationResult {
    if correct == submitted {
        EvaluationResult::correct()
    } else {
        EvaluationResult::incorrect(format!("The correct answer was {correct}."))
    }
}

/// Multiple choice: case-insensitive, whitespace-trimmed equality.
pub fn evaluate_choice(correct: &str, submitted: &str) -> EvaluationResult {
    if normalize(correct) == normalize(submitted) {
        EvaluationResult::correct()
    } else {
        EvaluationResult::incorrect(format!("The correct answer was \"{}\".", correct.trim()))
    }
}

/// Free text in exact-match mode. Same comparison as choice answers.
pub fn evaluate_text(correct: &str, submitted: &str) -> EvaluationResult {
    evaluate_choice(correct, submitted)
}
