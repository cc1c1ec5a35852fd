//! The `quizgrade run` command.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::Deserialize;
use uuid::Uuid;

use quizgrade_core::dispatch::EvaluationDispatcher;
use quizgrade_core::model::{AnswerValue, SessionStatus};
use quizgrade_core::parser;
use quizgrade_core::rubric::RubricEvaluator;
use quizgrade_core::scoring;
use quizgrade_core::traits::{RubricJudge, SessionStore};
use quizgrade_graders::config::load_config_from;
use quizgrade_graders::{create_judge, MockJudge};
use quizgrade_session::{InMemoryStore, SessionProgression};

/// One scripted answer from the answers file.
#[derive(Debug, Deserialize)]
struct ScriptedAnswer {
    /// 0-based index into the question set.
    question_index: usize,
    answer: AnswerValue,
    #[serde(default)]
    hints_used: u8,
    #[serde(default)]
    time_ms: u64,
}

pub async fn execute(
    questions_path: PathBuf,
    answers_path: PathBuf,
    grader: Option<String>,
    offline: bool,
    config_path: Option<PathBuf>,
) -> Result<()> {
    let config = load_config_from(config_path.as_deref())?;

    let set = parser::parse_question_set(&questions_path)?;
    let warnings = parser::validate_question_set(&set);
    for w in &warnings {
        let prefix = w
            .question_id
            .as_ref()
            .map(|id| format!("[{id}] "))
            .unwrap_or_default();
        eprintln!("Warning: {prefix}{}", w.message);
    }

    let scripted: Vec<ScriptedAnswer> = {
        let content = std::fs::read_to_string(&answers_path)
            .with_context(|| format!("failed to read answers file: {}", answers_path.display()))?;
        serde_json::from_str(&content)
            .with_context(|| format!("failed to parse answers JSON: {}", answers_path.display()))?
    };

    let judge: Arc<dyn RubricJudge> = if offline {
        eprintln!("Offline mode: free-text answers are graded by deterministic heuristics.");
        Arc::new(MockJudge::failing("offline mode"))
    } else {
        let name = grader.unwrap_or_else(|| config.default_grader.clone());
        let grader_config = config.graders.get(&name).with_context(|| {
            format!(
                "grader '{name}' not found in config. Available: {:?}",
                config.graders.keys().collect::<Vec<_>>()
            )
        })?;
        Arc::from(create_judge(grader_config)?)
    };

    let rubric = RubricEvaluator::new(judge)
        .with_timeout(Duration::from_secs(config.judge_timeout_secs));
    let dispatcher =
        EvaluationDispatcher::new(rubric).with_text_policy(config.english_text_policy);
    let store = Arc::new(InMemoryStore::new());
    let progression = SessionProgression::new(store.clone(), dispatcher);

    let learner = Uuid::new_v4();
    let started = progression.start(learner, &set).await?;
    println!(
        "Session {} over \"{}\": {} questions",
        started.session.id,
        set.name,
        started.questions.len()
    );

    for scripted_answer in &scripted {
        let question = started
            .questions
            .get(scripted_answer.question_index)
            .with_context(|| {
                format!(
                    "answer refers to question index {} but the set has {} questions",
                    scripted_answer.question_index,
                    started.questions.len()
                )
            })?;

        let outcome = progression
            .submit_answer(
                started.session.id,
                question.id,
                scripted_answer.answer.clone(),
                scripted_answer.hints_used,
                scripted_answer.time_ms,
            )
            .await?;

        let verdict = if outcome.is_correct { "correct" } else { "wrong" };
        println!(
            "Q{} {verdict} (score {}, +{} pts)",
            scripted_answer.question_index + 1,
            outcome.score,
            outcome.question_points,
        );
        if let Some(feedback) = &outcome.feedback {
            println!("   {feedback}");
        }
    }

    // Summary
    let record = progression.session_view(started.session.id).await?;
    let answered = record.answers.len() as u32;
    let correct = record.answers.iter().filter(|a| a.is_correct).count() as u32;
    let accuracy = scoring::accuracy(correct, answered);

    let mut table = comfy_table::Table::new();
    table.set_header(vec!["Questions", "Answered", "Correct", "Accuracy", "Score"]);
    table.add_row(vec![
        comfy_table::Cell::new(record.session.total_questions),
        comfy_table::Cell::new(answered),
        comfy_table::Cell::new(correct),
        comfy_table::Cell::new(format!("{accuracy}%")),
        comfy_table::Cell::new(record.session.score),
    ]);
    println!("\n{table}");

    if record.session.status == SessionStatus::Completed {
        let total = store.user_score(learner).await?.total_score;
        println!(
            "Session complete. Accuracy {accuracy}% (multiplier {:.1}). Final score: {}",
            scoring::accuracy_multiplier(accuracy),
            record.session.score
        );
        println!("Learner total: {total}");
    } else {
        println!(
            "Session {} after {answered} of {} answers (raw score {}).",
            record.session.status, record.session.total_questions, record.session.score
        );
    }

    Ok(())
}
