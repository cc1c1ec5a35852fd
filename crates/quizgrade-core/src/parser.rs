//! TOML question-set parser.
//!
//! Loads question sets from TOML files and directories, and validates them.

use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::dispatch::is_supported;
use crate::model::{
    AnswerKind, AnswerValue, Difficulty, QuestionDraft, QuestionSet, Subject, HINT_COUNT,
};

/// Intermediate TOML structure for parsing question-set files.
#[derive(Debug, Deserialize)]
struct TomlQuestionFile {
    question_set: TomlQuestionSetHeader,
    #[serde(default)]
    questions: Vec<TomlQuestion>,
}

#[derive(Debug, Deserialize)]
struct TomlQuestionSetHeader {
    id: String,
    name: String,
    #[serde(default)]
    description: String,
    subject: String,
}

#[derive(Debug, Deserialize)]
struct TomlQuestion {
    id: String,
    prompt: String,
    /// Per-question subject override.
    #[serde(default)]
    subject: Option<String>,
    #[serde(default)]
    difficulty: Option<String>,
    /// Declared answer shape; must agree with the answer's tag when given.
    #[serde(default)]
    kind: Option<String>,
    hints: Vec<String>,
    answer: AnswerValue,
}

/// Parse a single TOML file into a `QuestionSet`.
pub fn parse_question_set(path: &Path) -> Result<QuestionSet> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read question set file: {}", path.display()))?;

    parse_question_set_str(&content, path)
}

/// Parse a TOML string into a `QuestionSet` (useful for testing).
pub fn parse_question_set_str(content: &str, source_path: &Path) -> Result<QuestionSet> {
    let parsed: TomlQuestionFile = toml::from_str(content)
        .with_context(|| format!("failed to parse TOML: {}", source_path.display()))?;

    let default_subject: Subject = parsed
        .question_set
        .subject
        .parse()
        .map_err(|e: String| anyhow::anyhow!("{}", e))?;

    let questions = parsed
        .questions
        .into_iter()
        .map(|q| {
            let subject = match q.subject {
                Some(s) => s.parse().map_err(|e: String| anyhow::anyhow!("{}", e))?,
                None => default_subject,
            };

            let difficulty = match q.difficulty {
                Some(d) => d.parse().map_err(|e: String| anyhow::anyhow!("{}", e))?,
                None => Difficulty::Medium,
            };

            if let Some(kind) = &q.kind {
                let declared: AnswerKind =
                    kind.parse().map_err(|e: String| anyhow::anyhow!("{}", e))?;
                anyhow::ensure!(
                    declared == q.answer.kind(),
                    "question {}: declared kind {declared} does not match answer type {}",
                    q.id,
                    q.answer.kind()
                );
            }

            let hints: [String; HINT_COUNT] = q.hints.try_into().map_err(|h: Vec<String>| {
                anyhow::anyhow!(
                    "question {}: expected {HINT_COUNT} hints, got {}",
                    q.id,
                    h.len()
                )
            })?;

            Ok(QuestionDraft {
                id: q.id,
                subject,
                difficulty,
                prompt: q.prompt,
                correct_answer: q.answer,
                hints,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(QuestionSet {
        id: parsed.question_set.id,
        name: parsed.question_set.name,
        description: parsed.question_set.description,
        subject: default_subject,
        questions,
    })
}

/// Recursively load all `.toml` question-set files from a directory.
pub fn load_question_directory(dir: &Path) -> Result<Vec<QuestionSet>> {
    let mut sets = Vec::new();

    if !dir.is_dir() {
        anyhow::bail!("not a directory: {}", dir.display());
    }

    for entry in std::fs::read_dir(dir)
        .with_context(|| format!("failed to read directory: {}", dir.display()))?
    {
        let entry = entry?;
        let path = entry.path();

        if path.is_dir() {
            sets.extend(load_question_directory(&path)?);
        } else if path.extension().is_some_and(|ext| ext == "toml") {
            match parse_question_set(&path) {
                Ok(set) => sets.push(set),
                Err(e) => {
                    tracing::warn!("skipping {}: {}", path.display(), e);
                }
            }
        }
    }

    Ok(sets)
}

/// A warning from question-set validation.
#[derive(Debug, Clone)]
pub struct ValidationWarning {
    /// The question ID (if applicable).
    pub question_id: Option<String>,
    /// Warning message.
    pub message: String,
}

/// Validate a question set for common issues.
pub fn validate_question_set(set: &QuestionSet) -> Vec<ValidationWarning> {
    let mut warnings = Vec::new();

    // Check for duplicate question IDs
    let mut seen_ids = std::collections::HashSet::new();
    for q in &set.questions {
        if !seen_ids.insert(&q.id) {
            warnings.push(ValidationWarning {
                question_id: Some(q.id.clone()),
                message: format!("duplicate question ID: {}", q.id),
            });
        }
    }

    for q in &set.questions {
        if q.prompt.trim().is_empty() {
            warnings.push(ValidationWarning {
                question_id: Some(q.id.clone()),
                message: "prompt is empty".into(),
            });
        }

        let kind = q.correct_answer.kind();
        if !is_supported(q.subject, kind) {
            warnings.push(ValidationWarning {
                question_id: Some(q.id.clone()),
                message: format!("no evaluation strategy for {} {kind} answers", q.subject),
            });
        }

        match &q.correct_answer {
            AnswerValue::Explanation { keywords, .. } if keywords.is_empty() => {
                warnings.push(ValidationWarning {
                    question_id: Some(q.id.clone()),
                    message: "explanation has no keywords; offline grading will use word overlap"
                        .into(),
                });
            }
            AnswerValue::Choice { value } | AnswerValue::Text { value }
                if value.trim().is_empty() =>
            {
                warnings.push(ValidationWarning {
                    question_id: Some(q.id.clone()),
                    message: "expected answer is empty".into(),
                });
            }
            AnswerValue::Correction { corrected, .. } if corrected.trim().is_empty() => {
                warnings.push(ValidationWarning {
                    question_id: Some(q.id.clone()),
                    message: "expected correction is empty".into(),
                });
            }
            _ => {}
        }
    }

    warnings
}
