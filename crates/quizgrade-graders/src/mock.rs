//! Mock judge for testing.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use quizgrade_core::traits::{JudgeRequest, Judgment, RubricJudge};

use crate::error::GraderError;

/// A mock rubric judge for testing the evaluation path without API calls.
///
/// Returns configurable judgments based on prompt content matching, or a
/// configured failure to exercise the fallback path.
pub struct MockJudge {
    /// Map of prompt substring -> judgment.
    judgments: HashMap<String, Judgment>,
    /// Default judgment if no prompt matches.
    default_judgment: Judgment,
    /// When set, every call fails with this message.
    failure: Option<String>,
    /// Number of calls made.
    call_count: AtomicU32,
    /// Last prompt received.
    last_prompt: Mutex<Option<String>>,
}

impl MockJudge {
    /// Create a mock with the given prompt-substring -> judgment mappings.
    pub fn new(judgments: HashMap<String, Judgment>) -> Self {
        Self {
            judgments,
            default_judgment: Judgment {
                is_correct: true,
                score: 100,
                feedback: String::new(),
            },
            failure: None,
            call_count: AtomicU32::new(0),
            last_prompt: Mutex::new(None),
        }
    }

    /// Create a mock that always returns the same judgment.
    pub fn with_fixed_judgment(judgment: Judgment) -> Self {
        Self {
            judgments: HashMap::new(),
            default_judgment: judgment,
            failure: None,
            call_count: AtomicU32::new(0),
            last_prompt: Mutex::new(None),
        }
    }

    /// Create a mock that grades everything as fully correct.
    pub fn approving() -> Self {
        Self::with_fixed_judgment(Judgment {
            is_correct: true,
            score: 100,
            feedback: String::new(),
        })
    }

    /// Create a mock whose every call fails, forcing fallback grading.
    pub fn failing(message: &str) -> Self {
        Self {
            judgments: HashMap::new(),
            default_judgment: Judgment {
                is_correct: false,
                score: 0,
                feedback: String::new(),
            },
            failure: Some(message.to_string()),
            call_count: AtomicU32::new(0),
            last_prompt: Mutex::new(None),
        }
    }

    /// Get the number of calls made to this judge.
    pub fn call_count(&self) -> u32 {
        self.call_count.load(Ordering::Relaxed)
    }

    /// Get the last prompt sent to this judge.
    pub fn last_prompt(&self) -> Option<String> {
        self.last_prompt.lock().unwrap().clone()
    }
}

#[async_trait]
impl RubricJudge for MockJudge {
    fn name(&self) -> &str {
        "mock"
    }

    async fn judge(&self, request: &JudgeRequest) -> anyhow::Result<Judgment> {
        self.call_count.fetch_add(1, Ordering::Relaxed);
        *self.last_prompt.lock().unwrap() = Some(request.prompt.clone());

        if let Some(message) = &self.failure {
            return Err(GraderError::NetworkError(message.clone()).into());
        }

        // Find a matching judgment based on prompt content
        let judgment = self
            .judgments
            .iter()
            .find(|(key, _)| request.prompt.contains(key.as_str()))
            .map(|(_, j)| j.clone())
            .unwrap_or_else(|| self.default_judgment.clone());

        Ok(judgment)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(prompt: &str) -> JudgeRequest {
        JudgeRequest {
            prompt: prompt.into(),
        }
    }

    #[tokio::test]
    async fn fixed_judgment() {
        let judge = MockJudge::with_fixed_judgment(Judgment {
            is_correct: false,
            score: 35,
            feedback: "gaps".into(),
        });

        let judgment = judge.judge(&request("anything")).await.unwrap();
        assert_eq!(judgment.score, 35);
        assert_eq!(judge.call_count(), 1);
        assert_eq!(judge.last_prompt().unwrap(), "anything");
    }

    #[tokio::test]
    async fn prompt_matching() {
        let mut judgments = HashMap::new();
        judgments.insert(
            "evaporation".to_string(),
            Judgment {
                is_correct: true,
                score: 90,
                feedback: "solid".into(),
            },
        );
        judgments.insert(
            "gravity".to_string(),
            Judgment {
                is_correct: false,
                score: 20,
                feedback: "missing the point".into(),
            },
        );

        let judge = MockJudge::new(judgments);

        let evap = judge
            .judge(&request("Student's answer: evaporation happens"))
            .await
            .unwrap();
        assert_eq!(evap.score, 90);

        let grav = judge
            .judge(&request("Student's answer: gravity pulls"))
            .await
            .unwrap();
        assert_eq!(grav.score, 20);
        assert_eq!(judge.call_count(), 2);
    }

    #[tokio::test]
    async fn failing_mode_errors() {
        let judge = MockJudge::failing("backend down");
        let err = judge.judge(&request("anything")).await.unwrap_err();
        assert!(err.to_string().contains("backend down"));
        assert_eq!(judge.call_count(), 1);
    }
}
