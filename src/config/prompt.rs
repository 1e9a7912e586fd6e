use serde::Deserialize;
use std::fs;
use std::sync::Arc;
use log::info;
use thiserror::Error;

use super::knowledge::DEFAULT_SYSTEM_PROMPT;

#[derive(Debug, Error)]
pub enum PromptError {
    #[error("Failed to read prompts file '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse prompts file '{path}': {source}")]
    Json {
        path: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("Prompts file '{0}' has an empty system_prompt")]
    EmptySystemPrompt(String),
}

/// Relay-owned prompt configuration. Loaded once at startup and shared
/// read-only by every request.
#[derive(Deserialize, Debug, Clone)]
pub struct PromptConfig {
    pub system_prompt: String,
}

impl Default for PromptConfig {
    fn default() -> Self {
        Self { system_prompt: DEFAULT_SYSTEM_PROMPT.trim().to_string() }
    }
}

impl PromptConfig {
    fn validate(&self, path: &str) -> Result<(), PromptError> {
        if self.system_prompt.trim().is_empty() {
            return Err(PromptError::EmptySystemPrompt(path.to_string()));
        }
        Ok(())
    }
}

pub fn load_prompts(path: &str) -> Result<Arc<PromptConfig>, PromptError> {
    let file_content = fs::read_to_string(path).map_err(|source| PromptError::Io {
        path: path.to_string(),
        source,
    })?;
    let config: PromptConfig = serde_json::from_str(&file_content).map_err(|source| {
        PromptError::Json { path: path.to_string(), source }
    })?;
    config.validate(path)?;
    Ok(Arc::new(config))
}

/// Returns the prompt file's config when a path is given, else the built-in one.
pub fn resolve_prompts(path: Option<&str>) -> Result<Arc<PromptConfig>, PromptError> {
    match path {
        Some(p) if !p.trim().is_empty() => {
            info!("Loading system prompt from '{}'", p);
            load_prompts(p)
        }
        _ => {
            info!("Using built-in system prompt");
            Ok(Arc::new(PromptConfig::default()))
        }
    }
}
