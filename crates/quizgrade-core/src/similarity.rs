//! Edit-distance partial credit for free-text answers.
//!
//! Two policies share the same distance function: a banded similarity score
//! for sentence-length answers, and a stricter spelling check for single
//! words where a near-miss earns partial credit but is never "correct".

use crate::exact::normalize;
use crate::results::{EvaluationResult, CORRECT_THRESHOLD};

/// Levenshtein edit distance over chars.
pub fn levenshtein(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    if a.is_empty() {
        return b.len();
    }
    if b.is_empty() {
        return a.len();
    }

    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut curr = vec![0usize; b.len() + 1];

    for (i, ca) in a.iter().enumerate() {
        curr[0] = i + 1;
        for (j, cb) in b.iter().enumerate() {
            let cost = usize::from(ca != cb);
            curr[j + 1] = (prev[j + 1] + 1).min(curr[j] + 1).min(prev[j] + cost);
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[b.len()]
}

/// Score a free-text answer by normalized edit distance.
///
/// `similarity = 1 - d / max(len)` over the normalized strings, scaled to
/// 0..=100; two empty strings are a perfect match.
pub fn score_free_text(correct: &str, submitted: &str) -> EvaluationResult {
    let expected = normalize(correct);
    let given = normalize(submitted);

    let max_len = expected.chars().count().max(given.chars().count());
    let score = if max_len == 0 {
        100
    } else {
        let distance = levenshtein(&expected, &given);
        let similarity = 1.0 - distance as f64 / max_len as f64;
        (similarity * 100.0).round() as u8
    };

    let feedback = if score >= CORRECT_THRESHOLD {
        "Close enough!".to_string()
    } else if score >= 40 {
        format!("Almost! The expected answer was \"{}\".", correct.trim())
    } else {
        format!("The correct answer was \"{}\".", correct.trim())
    };

    EvaluationResult::graded(score, Some(feedback))
}

/// How forgiving the spelling check is about typos.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpellingTolerance {
    /// One edit away still earns partial credit.
    Strict,
    /// Up to two edits away earn partial credit.
    Lenient,
}

impl SpellingTolerance {
    fn max_distance(self) -> usize {
        match self {
            SpellingTolerance::Strict => 1,
            SpellingTolerance::Lenient => 2,
        }
    }
}

/// Single-word spelling check.
///
/// Only an exact (normalized) match is correct. A typo within tolerance
/// earns `100 - 20 * distance` but never flips `is_correct`; anything
/// further scores zero.
pub fn score_spelling(
    correct: &str,
    submitted: &str,
    tolerance: SpellingTolerance,
) -> EvaluationResult {
    let expected = normalize(correct);
    let given = normalize(submitted);

    if expected == given {
        return EvaluationResult::correct();
    }

    let distance = levenshtein(&expected, &given);
    if distance <= tolerance.max_distance() {
        let score = 100u8.saturating_sub(20 * distance as u8);
        return EvaluationResult {
            is_correct: false,
            score,
            feedback: Some(format!(
                "You spelled it \"{}\", it should be \"{}\".",
                submitted.trim(),
                correct.trim()
            )),
        };
    }

    EvaluationResult::incorrect(format!("The correct word was \"{}\".", correct.trim()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn levenshtein_basics() {
        assert_eq!(levenshtein("", ""), 0);
        assert_eq!(levenshtein("abc", ""), 3);
        assert_eq!(levenshtein("", "abc"), 3);
        assert_eq!(levenshtein("kitten", "sitting"), 3);
        assert_eq!(levenshtein("apple", "apple"), 0);
    }

    #[test]
    fn identical_text_scores_100() {
        let result = score_free_text("apple", "apple");
        assert!(result.is_correct);
        assert_eq!(result.score, 100);
    }

    #[test]
    fn empty_vs_empty_is_perfect() {
        let result = score_free_text("", "");
        assert!(result.is_correct);
        assert_eq!(result.score, 100);
    }

    #[test]
    fn score_non_increasing_with_distance() {
        let base = "elephant";
        let mut last = score_free_text(base, "elephant").score;
        for submitted in ["elephent", "elephint!", "elphnt!!", "rhino..."] {
            let score = score_free_text(base, submitted).score;
            assert!(
                score <= last,
                "score increased from {last} to {score} for {submitted:?}"
            );
            last = score;
        }
    }

    #[test]
    fn feedback_bands() {
        // One edit in an 8-char word: score 88, top band.
        let close = score_free_text("elephant", "elephent");
        assert!(close.is_correct);
        assert_eq!(close.feedback.as_deref(), Some("Close enough!"));

        // Half the word wrong: middle band.
        let almost = score_free_text("elephant", "elepxxxx");
        assert!(!almost.is_correct);
        assert!(almost.feedback.unwrap().starts_with("Almost!"));

        // Unrelated: bottom band.
        let wrong = score_free_text("elephant", "q");
        assert!(wrong.feedback.unwrap().contains("correct answer"));
    }

    #[test]
    fn spelling_exact_match_is_correct() {
        let result = score_spelling("necessary", " Necessary ", SpellingTolerance::Strict);
        assert!(result.is_correct);
        assert_eq!(result.score, 100);
    }

    #[test]
    fn spelling_typo_is_partial_but_never_correct() {
        let result = score_spelling("necessary", "neccessary", SpellingTolerance::Strict);
        assert!(!result.is_correct);
        assert_eq!(result.score, 80);
        assert!(result.feedback.unwrap().contains("should be"));
    }

    #[test]
    fn spelling_tolerance_widens_with_lenient() {
        let two_edits = score_spelling("necessary", "neccessery", SpellingTolerance::Strict);
        assert_eq!(two_edits.score, 0);

        let two_edits = score_spelling("necessary", "neccessery", SpellingTolerance::Lenient);
        assert_eq!(two_edits.score, 60);
        assert!(!two_edits.is_correct);
    }

    #[test]
    fn spelling_far_miss_scores_zero() {
        let result = score_spelling("necessary", "banana", SpellingTolerance::Lenient);
        assert!(!result.is_correct);
        assert_eq!(result.score, 0);
    }
}
