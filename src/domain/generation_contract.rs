use serde::{Deserialize, Serialize};

use super::GenerationError;

pub const DEFAULT_LANGUAGE: &str = "javascript";
pub const DEFAULT_MODEL: &str = "codellama";

/// One validated code-generation request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationJob {
    pub prompt: String,
    #[serde(default = "default_language")]
    pub language: String,
    #[serde(default = "default_model")]
    pub model: String,
}

impl GenerationJob {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            language: default_language(),
            model: default_model(),
        }
    }

    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn validate(&self) -> Result<(), GenerationError> {
        if self.prompt.is_empty() {
            return Err(GenerationError::validation("Prompt is required"));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationResult {
    pub code: String,
    pub language: String,
}

fn default_language() -> String {
    DEFAULT_LANGUAGE.to_string()
}

fn default_model() -> String {
    DEFAULT_MODEL.to_string()
}
