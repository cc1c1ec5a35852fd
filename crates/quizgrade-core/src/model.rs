//! Core data model types for quizgrade.
//!
//! These are the fundamental types the entire quizgrade system uses to
//! represent questions, submitted answers, and learning sessions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Every question carries exactly this many hints.
pub const HINT_COUNT: usize = 4;

/// Quiz subject. Determines the answer shape and evaluator family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Subject {
    Math,
    Science,
    English,
}

impl fmt::Display for Subject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Subject::Math => write!(f, "math"),
            Subject::Science => write!(f, "science"),
            Subject::English => write!(f, "english"),
        }
    }
}

impl FromStr for Subject {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "math" | "maths" => Ok(Subject::Math),
            "science" => Ok(Subject::Science),
            "english" => Ok(Subject::English),
            other => Err(format!("unknown subject: {other}")),
        }
    }
}

/// Question difficulty tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Difficulty::Easy => write!(f, "easy"),
            Difficulty::Medium => write!(f, "medium"),
            Difficulty::Hard => write!(f, "hard"),
        }
    }
}

impl FromStr for Difficulty {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "easy" => Ok(Difficulty::Easy),
            "medium" => Ok(Difficulty::Medium),
            "hard" => Ok(Difficulty::Hard),
            other => Err(format!("unknown difficulty: {other}")),
        }
    }
}

/// The closed set of answer shapes a question can declare.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnswerKind {
    Number,
    Boolean,
    Choice,
    Text,
    Explanation,
    Correction,
}

impl fmt::Display for AnswerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AnswerKind::Number => write!(f, "number"),
            AnswerKind::Boolean => write!(f, "boolean"),
            AnswerKind::Choice => write!(f, "choice"),
            AnswerKind::Text => write!(f, "text"),
            AnswerKind::Explanation => write!(f, "explanation"),
            AnswerKind::Correction => write!(f, "correction"),
        }
    }
}

impl FromStr for AnswerKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "number" => Ok(AnswerKind::Number),
            "boolean" => Ok(AnswerKind::Boolean),
            "choice" => Ok(AnswerKind::Choice),
            "text" => Ok(AnswerKind::Text),
            "explanation" => Ok(AnswerKind::Explanation),
            "correction" => Ok(AnswerKind::Correction),
            other => Err(format!("unknown answer kind: {other}")),
        }
    }
}

/// A tagged answer value, one variant per answer shape.
///
/// The same type carries both a question's expected answer and a learner's
/// submission; the variant tag must match the question's declared kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum AnswerValue {
    /// Math answers are exact integers.
    Number { value: i64 },
    /// Science true/false.
    Boolean { value: bool },
    /// Multiple choice (science and english).
    Choice { value: String },
    /// English free text.
    Text { value: String },
    /// Science free-text explanation. `keywords` lives on the expected
    /// answer and guides fallback grading; submissions leave it empty.
    Explanation {
        value: String,
        #[serde(default)]
        keywords: Vec<String>,
    },
    /// English sentence correction.
    Correction { original: String, corrected: String },
}

impl AnswerValue {
    /// The shape of this value.
    pub fn kind(&self) -> AnswerKind {
        match self {
            AnswerValue::Number { .. } => AnswerKind::Number,
            AnswerValue::Boolean { .. } => AnswerKind::Boolean,
            AnswerValue::Choice { .. } => AnswerKind::Choice,
            AnswerValue::Text { .. } => AnswerKind::Text,
            AnswerValue::Explanation { .. } => AnswerKind::Explanation,
            AnswerValue::Correction { .. } => AnswerKind::Correction,
        }
    }
}

impl fmt::Display for AnswerValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AnswerValue::Number { value } => write!(f, "{value}"),
            AnswerValue::Boolean { value } => write!(f, "{value}"),
            AnswerValue::Choice { value } => write!(f, "{value}"),
            AnswerValue::Text { value } => write!(f, "{value}"),
            AnswerValue::Explanation { value, .. } => write!(f, "{value}"),
            AnswerValue::Correction { corrected, .. } => write!(f, "{corrected}"),
        }
    }
}

/// A quiz question. Immutable once created; owned by the session it was
/// instantiated for.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Question {
    /// Unique identifier.
    pub id: Uuid,
    /// The session this question belongs to.
    pub session_id: Uuid,
    /// 0-based position within the session.
    pub question_index: u32,
    pub subject: Subject,
    /// Declared answer shape; the expected answer's tag matches it.
    pub kind: AnswerKind,
    pub difficulty: Difficulty,
    /// The question text shown to the learner (and embedded in grading prompts).
    pub prompt: String,
    pub correct_answer: AnswerValue,
    /// Fixed-size hint ladder; each hint used costs points.
    pub hints: [String; HINT_COUNT],
}

impl Question {
    /// Instantiate a concrete question from a blueprint at a session slot.
    pub fn from_draft(draft: &QuestionDraft, session_id: Uuid, question_index: u32) -> Self {
        Self {
            id: Uuid::new_v4(),
            session_id,
            question_index,
            subject: draft.subject,
            kind: draft.correct_answer.kind(),
            difficulty: draft.difficulty,
            prompt: draft.prompt.clone(),
            correct_answer: draft.correct_answer.clone(),
            hints: draft.hints.clone(),
        }
    }
}

/// A recorded answer. Created exactly once per (session, question) pair when
/// a learner submits; immutable thereafter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Answer {
    pub question_id: Uuid,
    pub session_id: Uuid,
    pub user_answer: AnswerValue,
    pub is_correct: bool,
    /// Quality score in 0..=100 from the evaluation strategy.
    pub score: u8,
    /// Difficulty-weighted points awarded for this answer.
    pub points: u32,
    /// Hints consumed before answering, capped at [`HINT_COUNT`].
    pub hints_used: u8,
    /// Time spent on the question in milliseconds.
    pub time_ms: u64,
    pub answered_at: DateTime<Utc>,
}

/// Session lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    InProgress,
    Paused,
    Completed,
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionStatus::InProgress => write!(f, "in_progress"),
            SessionStatus::Paused => write!(f, "paused"),
            SessionStatus::Completed => write!(f, "completed"),
        }
    }
}

/// A bounded run of N questions with a single progression through them.
///
/// Mutated only by the session progression service; `Completed` is terminal.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LearningSession {
    pub id: Uuid,
    pub learner_id: Uuid,
    pub status: SessionStatus,
    pub current_question_index: u32,
    pub total_questions: u32,
    /// Running raw points while in progress; the multiplied final score
    /// once completed.
    pub score: u32,
    pub started_at: DateTime<Utc>,
    pub ended_at: Option<DateTime<Utc>>,
    /// Optimistic concurrency token; bumped by the store on every
    /// session write.
    #[serde(default)]
    pub version: u64,
}

impl LearningSession {
    /// A fresh in-progress session over `total_questions` questions.
    pub fn begin(learner_id: Uuid, total_questions: u32) -> Self {
        Self {
            id: Uuid::new_v4(),
            learner_id,
            status: SessionStatus::InProgress,
            current_question_index: 0,
            total_questions,
            score: 0,
            started_at: Utc::now(),
            ended_at: None,
            version: 0,
        }
    }
}

/// Running total of a learner's points across all completed sessions.
/// Updated additively, never overwritten.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserScore {
    pub learner_id: Uuid,
    pub total_score: u64,
}

/// A question blueprint inside a [`QuestionSet`]: everything a question
/// needs except its session binding.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuestionDraft {
    /// Identifier unique within its set.
    pub id: String,
    pub subject: Subject,
    pub difficulty: Difficulty,
    pub prompt: String,
    pub correct_answer: AnswerValue,
    pub hints: [String; HINT_COUNT],
}

/// A loadable collection of question blueprints from which sessions are
/// instantiated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuestionSet {
    /// Unique identifier for this question set.
    pub id: String,
    /// Human-readable name.
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Default subject for questions that don't specify one.
    pub subject: Subject,
    #[serde(default)]
    pub questions: Vec<QuestionDraft>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn subject_display_and_parse() {
        assert_eq!(Subject::Math.to_string(), "math");
        assert_eq!("science".parse::<Subject>().unwrap(), Subject::Science);
        assert_eq!("English".parse::<Subject>().unwrap(), Subject::English);
        assert_eq!("maths".parse::<Subject>().unwrap(), Subject::Math);
        assert!("history".parse::<Subject>().is_err());
    }

    #[test]
    fn difficulty_display_and_parse() {
        assert_eq!(Difficulty::Hard.to_string(), "hard");
        assert_eq!("Easy".parse::<Difficulty>().unwrap(), Difficulty::Easy);
        assert!("extreme".parse::<Difficulty>().is_err());
    }

    #[test]
    fn answer_value_kind() {
        assert_eq!(AnswerValue::Number { value: 7 }.kind(), AnswerKind::Number);
        assert_eq!(
            AnswerValue::Correction {
                original: "he go".into(),
                corrected: "he goes".into(),
            }
            .kind(),
            AnswerKind::Correction
        );
    }

    #[test]
    fn answer_value_serde_roundtrip() {
        let value = AnswerValue::Explanation {
            value: "water evaporates when heated".into(),
            keywords: vec!["evaporation".into(), "heat".into()],
        };
        let json = serde_json::to_string(&value).unwrap();
        assert!(json.contains("\"type\":\"explanation\""));
        let back: AnswerValue = serde_json::from_str(&json).unwrap();
        assert_eq!(back, value);
    }

    #[test]
    fn explanation_keywords_default_to_empty() {
        let json = r#"{"type":"explanation","value":"because it is hot"}"#;
        let value: AnswerValue = serde_json::from_str(json).unwrap();
        match value {
            AnswerValue::Explanation { keywords, .. } => assert!(keywords.is_empty()),
            other => panic!("unexpected variant: {other:?}"),
        }
    }

    #[test]
    fn session_begin_defaults() {
        let learner = Uuid::new_v4();
        let session = LearningSession::begin(learner, 5);
        assert_eq!(session.status, SessionStatus::InProgress);
        assert_eq!(session.current_question_index, 0);
        assert_eq!(session.total_questions, 5);
        assert_eq!(session.score, 0);
        assert!(session.ended_at.is_none());
    }

    #[test]
    fn question_from_draft_binds_session() {
        let draft = QuestionDraft {
            id: "add-1".into(),
            subject: Subject::Math,
            difficulty: Difficulty::Easy,
            prompt: "What is 2 + 2?".into(),
            correct_answer: AnswerValue::Number { value: 4 },
            hints: std::array::from_fn(|i| format!("hint {i}")),
        };
        let session_id = Uuid::new_v4();
        let question = Question::from_draft(&draft, session_id, 3);
        assert_eq!(question.session_id, session_id);
        assert_eq!(question.question_index, 3);
        assert_eq!(question.kind, AnswerKind::Number);
        assert_eq!(question.correct_answer, draft.correct_answer);
    }
}
