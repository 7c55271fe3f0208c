use jsonschema::error::ValidationErrorKind;
use jsonschema::{JSONSchema, ValidationError};
use serde_json::Value;

use super::{ConfigError, GenerationError, GenerationJob};

pub const GENERATION_JOB_JSON_SCHEMA: &str = r#"
{
  "$schema": "https://json-schema.org/draft/2020-12/schema",
  "type": "object",
  "required": ["prompt"],
  "properties": {
    "prompt": {
      "type": "string",
      "minLength": 1
    },
    "language": {
      "type": "string"
    },
    "model": {
      "type": "string"
    }
  }
}
"#;

const PROMPT_REQUIRED_MESSAGE: &str = "Prompt is required";

/// Structural validation of inbound generation requests.
///
/// Only the shape of the request is checked here. Whether `model` names a
/// registered endpoint is decided at dispatch time so that an unknown model is
/// reported distinctly from a malformed request.
pub struct GenerationJobValidator {
    compiled_schema: JSONSchema,
}

impl GenerationJobValidator {
    pub fn new() -> Result<Self, ConfigError> {
        let schema: Value = serde_json::from_str(GENERATION_JOB_JSON_SCHEMA).map_err(|err| {
            ConfigError::Internal {
                message: format!("invalid built-in job schema: {err}"),
            }
        })?;
        let compiled_schema = JSONSchema::compile(&schema).map_err(|err| ConfigError::Internal {
            message: format!("failed to compile job schema: {err}"),
        })?;
        Ok(Self { compiled_schema })
    }

    pub fn validate_json(&self, body: &[u8]) -> Result<GenerationJob, GenerationError> {
        let value: Value = serde_json::from_slice(body).map_err(|err| {
            GenerationError::validation(format!("Request body must be valid JSON: {err}"))
        })?;
        self.validate(&value)
    }

    pub fn validate(&self, raw: &Value) -> Result<GenerationJob, GenerationError> {
        if let Err(mut errors) = self.compiled_schema.validate(raw) {
            let message = errors
                .next()
                .map(|error| describe_violation(&error))
                .unwrap_or_else(|| "Request body is invalid".to_string());
            return Err(GenerationError::validation(message));
        }

        let job: GenerationJob = serde_json::from_value(raw.clone())
            .map_err(|err| GenerationError::validation(format!("Invalid request data: {err}")))?;
        job.validate()?;
        Ok(job)
    }
}

fn describe_violation(error: &ValidationError<'_>) -> String {
    let path = error.instance_path.to_string();
    match &error.kind {
        ValidationErrorKind::Required { property } if property == "prompt" => {
            PROMPT_REQUIRED_MESSAGE.to_string()
        }
        ValidationErrorKind::Type { .. } if path.is_empty() => {
            "Request body must be a JSON object".to_string()
        }
        ValidationErrorKind::Type { .. } if path == "/prompt" => {
            "Prompt must be a string".to_string()
        }
        _ if path == "/prompt" => PROMPT_REQUIRED_MESSAGE.to_string(),
        ValidationErrorKind::Type { .. } => {
            format!("{} must be a string", path.trim_start_matches('/'))
        }
        _ => error.to_string(),
    }
}
