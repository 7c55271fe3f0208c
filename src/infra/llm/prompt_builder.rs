use serde::Serialize;

use crate::domain::GenerationJob;

pub const MAX_OUTPUT_TOKENS: u32 = 500;
pub const TEMPERATURE: f64 = 0.7;
pub const TOP_P: f64 = 0.95;

/// Sampling parameters shared by every provider.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GenerationParams {
    pub max_tokens: u32,
    pub temperature: f64,
    pub top_p: f64,
}

impl Default for GenerationParams {
    fn default() -> Self {
        Self {
            max_tokens: MAX_OUTPUT_TOKENS,
            temperature: TEMPERATURE,
            top_p: TOP_P,
        }
    }
}

pub struct PromptBuilder;

impl PromptBuilder {
    pub fn build(job: &GenerationJob) -> String {
        format!(
            "Write {language} code for: {prompt}\nOnly respond with code, no explanations.",
            language = job.language,
            prompt = job.prompt,
        )
    }
}
