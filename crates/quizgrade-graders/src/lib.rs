//! quizgrade-graders — Rubric-grading backends.
//!
//! Implementations of the [`quizgrade_core::traits::RubricJudge`] trait:
//! the Anthropic API, a local Ollama instance, and a configurable mock for
//! tests, plus configuration loading and a judge factory.

pub mod anthropic;
pub mod config;
pub mod error;
pub mod mock;
pub mod ollama;

pub use anthropic::AnthropicJudge;
pub use config::{create_judge, load_config, load_config_from, GraderConfig, QuizgradeConfig};
pub use error::GraderError;
pub use mock::MockJudge;
pub use ollama::OllamaJudge;
