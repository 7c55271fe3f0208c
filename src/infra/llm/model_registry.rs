use std::collections::{BTreeMap, HashMap};

use crate::domain::ConfigError;

use super::env::{VarReader, first_present_var, non_empty_var, read_env_var};
use super::provider_shape::ResponseShape;

/// Everything needed to reach one model: where to send the request, which
/// headers to attach, and how to read the answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelEndpoint {
    pub id: String,
    pub url: String,
    pub headers: BTreeMap<String, String>,
    pub shape: ResponseShape,
}

impl ModelEndpoint {
    pub fn new(id: impl Into<String>, url: impl Into<String>, shape: ResponseShape) -> Self {
        Self {
            id: id.into(),
            url: url.into(),
            headers: BTreeMap::new(),
            shape,
        }
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    pub fn with_bearer_token(self, token: &str) -> Self {
        self.with_header("Authorization", format!("Bearer {token}"))
    }
}

struct BuiltinModel {
    id: &'static str,
    env_prefix: &'static str,
    api_key_fallback: &'static str,
    default_url: &'static str,
    shape: ResponseShape,
    extra_headers: &'static [(&'static str, &'static str)],
}

const BUILTIN_MODELS: &[BuiltinModel] = &[
    BuiltinModel {
        id: "codellama",
        env_prefix: "CODEGEN_CODELLAMA",
        api_key_fallback: "REPLICATE_API_TOKEN",
        default_url: "https://api.replicate.com/v1/models/meta/codellama-34b-instruct/predictions",
        shape: ResponseShape::Output,
        extra_headers: &[("Prefer", "wait")],
    },
    BuiltinModel {
        id: "starcoder",
        env_prefix: "CODEGEN_STARCODER",
        api_key_fallback: "HF_API_TOKEN",
        default_url: "https://api-inference.huggingface.co/models/bigcode/starcoder",
        shape: ResponseShape::GeneratedText,
        extra_headers: &[],
    },
    BuiltinModel {
        id: "gpt-3.5-turbo",
        env_prefix: "CODEGEN_OPENAI",
        api_key_fallback: "OPENAI_API_KEY",
        default_url: "https://api.openai.com/v1/chat/completions",
        shape: ResponseShape::ChatCompletion,
        extra_headers: &[],
    },
];

/// Read-only after startup; shared between requests without locking.
#[derive(Debug, Default, Clone)]
pub struct ModelRegistry {
    endpoints: HashMap<String, ModelEndpoint>,
}

impl ModelRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds the built-in catalog, taking URL overrides and API keys from the
    /// environment. Unset variables fall back to the public endpoint URLs and
    /// to unauthenticated requests.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(&read_env_var)
    }

    pub(crate) fn from_vars(read: VarReader<'_>) -> Result<Self, ConfigError> {
        let mut registry = Self::new();
        for builtin in BUILTIN_MODELS {
            let url_var = format!("{}_URL", builtin.env_prefix);
            let key_var = format!("{}_API_KEY", builtin.env_prefix);

            let url = non_empty_var(read, &url_var)?
                .unwrap_or_else(|| builtin.default_url.to_string());
            let api_key = first_present_var(read, &[key_var.as_str(), builtin.api_key_fallback])?;

            let mut endpoint = ModelEndpoint::new(builtin.id, url, builtin.shape);
            for (name, value) in builtin.extra_headers {
                endpoint = endpoint.with_header(*name, *value);
            }
            if let Some(api_key) = api_key {
                endpoint = endpoint.with_bearer_token(&api_key);
            }

            registry.register(endpoint)?;
        }
        Ok(registry)
    }

    pub fn register(&mut self, endpoint: ModelEndpoint) -> Result<(), ConfigError> {
        let id = endpoint.id.trim();
        if id.is_empty() {
            return Err(ConfigError::registry("model id must not be empty"));
        }
        if endpoint.url.trim().is_empty() {
            return Err(ConfigError::registry(format!(
                "model '{id}' must have a non-empty URL"
            )));
        }
        if self.endpoints.contains_key(id) {
            return Err(ConfigError::registry(format!(
                "model '{id}' is already registered"
            )));
        }

        self.endpoints.insert(id.to_string(), endpoint);
        Ok(())
    }

    pub fn resolve(&self, model_id: &str) -> Option<&ModelEndpoint> {
        self.endpoints.get(model_id)
    }

    pub fn model_ids(&self) -> Vec<String> {
        let mut ids = self.endpoints.keys().cloned().collect::<Vec<_>>();
        ids.sort();
        ids
    }
}
