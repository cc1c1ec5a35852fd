//! Grader configuration and factory.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use quizgrade_core::dispatch::TextMatchPolicy;
use quizgrade_core::rubric::DEFAULT_JUDGE_TIMEOUT_SECS;
use quizgrade_core::traits::RubricJudge;

use crate::anthropic::AnthropicJudge;
use crate::ollama::OllamaJudge;

/// Configuration for a single grading backend.
///
/// Note: Custom Debug impl masks API keys to prevent accidental exposure in logs.
#[derive(Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum GraderConfig {
    Anthropic {
        api_key: String,
        #[serde(default)]
        base_url: Option<String>,
        #[serde(default)]
        model: Option<String>,
    },
    Ollama {
        #[serde(default = "default_ollama_url")]
        base_url: String,
        #[serde(default)]
        model: Option<String>,
    },
}

impl std::fmt::Debug for GraderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GraderConfig::Anthropic {
                api_key: _,
                base_url,
                model,
            } => f
                .debug_struct("Anthropic")
                .field("api_key", &"***")
                .field("base_url", base_url)
                .field("model", model)
                .finish(),
            GraderConfig::Ollama { base_url, model } => f
                .debug_struct("Ollama")
                .field("base_url", base_url)
                .field("model", model)
                .finish(),
        }
    }
}

fn default_ollama_url() -> String {
    "http://localhost:11434".to_string()
}

/// Top-level quizgrade configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuizgradeConfig {
    /// Grader configurations keyed by name.
    #[serde(default)]
    pub graders: HashMap<String, GraderConfig>,
    /// Default grader to use.
    #[serde(default = "default_grader")]
    pub default_grader: String,
    /// Upper bound on one grading round trip, in seconds.
    #[serde(default = "default_judge_timeout")]
    pub judge_timeout_secs: u64,
    /// How english free-text answers are matched.
    #[serde(default)]
    pub english_text_policy: TextMatchPolicy,
}

fn default_grader() -> String {
    "anthropic".to_string()
}
fn default_judge_timeout() -> u64 {
    DEFAULT_JUDGE_TIMEOUT_SECS
}

impl Default for QuizgradeConfig {
    fn default() -> Self {
        Self {
            graders: HashMap::new(),
            default_grader: default_grader(),
            judge_timeout_secs: default_judge_timeout(),
            english_text_policy: TextMatchPolicy::default(),
        }
    }
}

/// Resolve environment variable references like `${VAR_NAME}` in a string.
fn resolve_env_vars(s: &str) -> String {
    let mut result = s.to_string();
    while let Some(start) = result.find("${") {
        if let Some(end) = result[start..].find('}') {
            let var_name = &result[start + 2..start + end];
            let value = std::env::var(var_name).unwrap_or_default();
            result = format!(
                "{}{}{}",
                &result[..start],
                value,
                &result[start + end + 1..]
            );
        } else {
            break;
        }
    }
    result
}

/// Resolve env vars in a grader config.
fn resolve_grader_config(config: &GraderConfig) -> GraderConfig {
    match config {
        GraderConfig::Anthropic {
            api_key,
            base_url,
            model,
        } => GraderConfig::Anthropic {
            api_key: resolve_env_vars(api_key),
            base_url: base_url.as_ref().map(|u| resolve_env_vars(u)),
            model: model.clone(),
        },
        GraderConfig::Ollama { base_url, model } => GraderConfig::Ollama {
            base_url: resolve_env_vars(base_url),
            model: model.clone(),
        },
    }
}

/// Load configuration from well-known paths.
///
/// Search order:
/// 1. `quizgrade.toml` in the current directory
/// 2. `~/.config/quizgrade/config.toml`
///
/// Environment variable override: `QUIZGRADE_ANTHROPIC_KEY`.
pub fn load_config() -> Result<QuizgradeConfig> {
    load_config_from(None)
}

/// Load config from an explicit path, or search the default locations.
pub fn load_config_from(path: Option<&Path>) -> Result<QuizgradeConfig> {
    let config_path = if let Some(p) = path {
        if p.exists() {
            Some(p.to_path_buf())
        } else {
            anyhow::bail!("config file not found: {}", p.display());
        }
    } else {
        let local = PathBuf::from("quizgrade.toml");
        if local.exists() {
            Some(local)
        } else if let Some(home) = dirs_path() {
            let global = home.join("config.toml");
            if global.exists() {
                Some(global)
            } else {
                None
            }
        } else {
            None
        }
    };

    let mut config = match config_path {
        Some(path) => {
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read config: {}", path.display()))?;
            toml::from_str::<QuizgradeConfig>(&content)
                .with_context(|| format!("failed to parse config: {}", path.display()))?
        }
        None => QuizgradeConfig::default(),
    };

    // Apply env var overrides
    if let Ok(key) = std::env::var("QUIZGRADE_ANTHROPIC_KEY") {
        config
            .graders
            .entry("anthropic".into())
            .or_insert(GraderConfig::Anthropic {
                api_key: String::new(),
                base_url: None,
                model: None,
            });
        if let Some(GraderConfig::Anthropic { api_key, .. }) = config.graders.get_mut("anthropic")
        {
            *api_key = key;
        }
    }

    // Resolve env vars in all grader configs
    let resolved: HashMap<String, GraderConfig> = config
        .graders
        .iter()
        .map(|(k, v)| (k.clone(), resolve_grader_config(v)))
        .collect();
    config.graders = resolved;

    Ok(config)
}

fn dirs_path() -> Option<PathBuf> {
    std::env::var("HOME")
        .ok()
        .map(|h| PathBuf::from(h).join(".config").join("quizgrade"))
}

/// Create a judge instance from its configuration.
pub fn create_judge(config: &GraderConfig) -> Result<Box<dyn RubricJudge>> {
    match config {
        GraderConfig::Anthropic {
            api_key,
            base_url,
            model,
        } => Ok(Box::new(AnthropicJudge::new(
            api_key,
            base_url.clone(),
            model.clone(),
        ))),
        GraderConfig::Ollama { base_url, model } => {
            Ok(Box::new(OllamaJudge::new(base_url, model.clone())))
        }
    }
}
