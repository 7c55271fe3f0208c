use std::sync::Arc;
use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::{Client, StatusCode};
use serde_json::Value;
use tokio_util::sync::CancellationToken;

use crate::domain::{ConfigError, GenerationError, GenerationJob, GenerationResult};

use super::env::{VarReader, read_env_var, timeout_var};
use super::model_registry::{ModelEndpoint, ModelRegistry};
use super::prompt_builder::{GenerationParams, PromptBuilder};
use super::response_parsing::{normalize, truncate_message};

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

const ENV_TIMEOUT_SECS: &str = "CODEGEN_DISPATCH_TIMEOUT_SECS";

/// Sends one job to its model endpoint and classifies the outcome.
///
/// Each call makes exactly one attempt. The attempt and its timer share a
/// [`CancellationToken`]; once the token fires the request future is dropped,
/// which closes the provider connection, and the call reports a timeout.
#[derive(Clone)]
pub struct Dispatcher {
    registry: Arc<ModelRegistry>,
    client: Client,
    timeout: Duration,
    params: GenerationParams,
}

impl Dispatcher {
    pub fn new(registry: Arc<ModelRegistry>) -> Result<Self, ConfigError> {
        Self::with_timeout(registry, DEFAULT_TIMEOUT)
    }

    pub fn from_env(registry: Arc<ModelRegistry>) -> Result<Self, ConfigError> {
        Self::from_vars(registry, &read_env_var)
    }

    pub(crate) fn from_vars(
        registry: Arc<ModelRegistry>,
        read: VarReader<'_>,
    ) -> Result<Self, ConfigError> {
        let timeout = timeout_var(read, ENV_TIMEOUT_SECS)?.unwrap_or(DEFAULT_TIMEOUT);
        Self::with_timeout(registry, timeout)
    }

    pub fn with_timeout(
        registry: Arc<ModelRegistry>,
        timeout: Duration,
    ) -> Result<Self, ConfigError> {
        if timeout.is_zero() {
            return Err(ConfigError::invalid(
                ENV_TIMEOUT_SECS,
                "must be greater than 0 seconds",
            ));
        }

        let client = Client::builder().build().map_err(|err| ConfigError::Internal {
            message: format!("failed to create provider HTTP client: {err}"),
        })?;

        Ok(Self {
            registry,
            client,
            timeout,
            params: GenerationParams::default(),
        })
    }

    pub fn registry(&self) -> &ModelRegistry {
        &self.registry
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub async fn generate(&self, job: &GenerationJob) -> Result<GenerationResult, GenerationError> {
        let endpoint = self.registry.resolve(&job.model).ok_or_else(|| {
            GenerationError::UnsupportedModel {
                model: job.model.clone(),
            }
        })?;

        let prompt = PromptBuilder::build(job);
        let body = endpoint.shape.request_body(&endpoint.id, &prompt, self.params);

        let raw = self.send_with_deadline(endpoint, &body).await?;
        let code = normalize(&raw, endpoint.shape, &endpoint.id)?;

        Ok(GenerationResult {
            code,
            language: job.language.clone(),
        })
    }

    async fn send_with_deadline(
        &self,
        endpoint: &ModelEndpoint,
        body: &Value,
    ) -> Result<Value, GenerationError> {
        let token = CancellationToken::new();
        let timer = tokio::spawn({
            let token = token.clone();
            let timeout = self.timeout;
            async move {
                tokio::time::sleep(timeout).await;
                token.cancel();
            }
        });

        let outcome = tokio::select! {
            biased;
            () = token.cancelled() => Err(GenerationError::Timeout {
                model: endpoint.id.clone(),
                timeout: self.timeout,
            }),
            outcome = self.send(endpoint, body) => outcome,
        };

        timer.abort();
        outcome
    }

    async fn send(&self, endpoint: &ModelEndpoint, body: &Value) -> Result<Value, GenerationError> {
        let headers = build_headers(endpoint)?;
        let response = self
            .client
            .post(&endpoint.url)
            .headers(headers)
            .json(body)
            .send()
            .await
            .map_err(|err| map_transport_error(&endpoint.id, err))?;

        let status = response.status();
        if !status.is_success() {
            let body = match response.text().await {
                Ok(text) if !text.trim().is_empty() => truncate_message(&text),
                _ => status_text(status),
            };
            return Err(GenerationError::Provider {
                model: endpoint.id.clone(),
                status: status.as_u16(),
                body,
            });
        }

        let text = response
            .text()
            .await
            .map_err(|err| map_transport_error(&endpoint.id, err))?;
        serde_json::from_str(&text).map_err(|err| {
            GenerationError::unexpected(
                &endpoint.id,
                format!("{} response decode failed: {err}", endpoint.id),
            )
        })
    }
}

fn build_headers(endpoint: &ModelEndpoint) -> Result<HeaderMap, GenerationError> {
    let mut headers = HeaderMap::with_capacity(endpoint.headers.len());
    for (name, value) in &endpoint.headers {
        let name = HeaderName::from_bytes(name.as_bytes()).map_err(|err| {
            GenerationError::unexpected(
                &endpoint.id,
                format!("invalid header name '{name}': {err}"),
            )
        })?;
        let value = HeaderValue::from_str(value).map_err(|err| {
            GenerationError::unexpected(
                &endpoint.id,
                format!("invalid value for header '{name}': {err}"),
            )
        })?;
        headers.insert(name, value);
    }
    Ok(headers)
}

fn status_text(status: StatusCode) -> String {
    status
        .canonical_reason()
        .map(ToOwned::to_owned)
        .unwrap_or_else(|| status.as_str().to_string())
}

fn map_transport_error(model: &str, error: reqwest::Error) -> GenerationError {
    GenerationError::unexpected(model, format!("{model} transport error: {error}"))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use reqwest::StatusCode;

    use super::{Dispatcher, build_headers, status_text};
    use crate::domain::{ConfigError, GenerationError, GenerationJob};
    use crate::infra::llm::{ModelEndpoint, ModelRegistry, ResponseShape};
    use crate::infra::llm::env::test_vars::vars;

    fn dispatcher() -> Dispatcher {
        let mut registry = ModelRegistry::new();
        registry
            .register(ModelEndpoint::new(
                "codellama",
                "http://127.0.0.1:9/predictions",
                ResponseShape::Output,
            ))
            .expect("registration should succeed");
        Dispatcher::new(Arc::new(registry)).expect("dispatcher should build")
    }

    #[tokio::test]
    async fn generate_rejects_unknown_model_before_any_request() {
        let job = GenerationJob::new("hello").with_model("unknown-model");

        let error = dispatcher()
            .generate(&job)
            .await
            .expect_err("unknown model must fail");

        assert!(matches!(
            error,
            GenerationError::UnsupportedModel { model } if model == "unknown-model"
        ));
    }

    #[test]
    fn with_timeout_rejects_zero_duration() {
        let error = match Dispatcher::with_timeout(Arc::new(ModelRegistry::new()), Duration::ZERO) {
            Ok(_) => panic!("zero timeout should fail"),
            Err(error) => error,
        };

        assert!(matches!(error, ConfigError::Invalid { .. }));
    }

    #[test]
    fn default_timeout_is_thirty_seconds() {
        assert_eq!(dispatcher().timeout(), Duration::from_secs(30));
    }

    #[test]
    fn build_headers_rejects_invalid_header_values() {
        let endpoint = ModelEndpoint::new("codellama", "http://localhost", ResponseShape::Output)
            .with_header("Authorization", "Bearer bad\nvalue");

        let error = build_headers(&endpoint).expect_err("newline in header must fail");

        assert_eq!(error.model(), Some("codellama"));
    }

    #[test]
    fn status_text_uses_canonical_reason() {
        assert_eq!(status_text(StatusCode::SERVICE_UNAVAILABLE), "Service Unavailable");
    }

    #[test]
    fn timeout_comes_from_environment_when_set() {
        let registry = Arc::new(ModelRegistry::new());

        let configured = Dispatcher::from_vars(
            registry.clone(),
            &vars(&[("CODEGEN_DISPATCH_TIMEOUT_SECS", "12")]),
        )
        .expect("dispatcher should build");
        let defaulted =
            Dispatcher::from_vars(registry, &vars(&[])).expect("dispatcher should build");

        assert_eq!(configured.timeout(), Duration::from_secs(12));
        assert_eq!(defaulted.timeout(), Duration::from_secs(30));
    }

    #[test]
    fn invalid_environment_timeout_is_rejected() {
        let read = vars(&[("CODEGEN_DISPATCH_TIMEOUT_SECS", "1.5")]);

        let error = match Dispatcher::from_vars(Arc::new(ModelRegistry::new()), &read) {
            Ok(_) => panic!("fractional timeout should fail"),
            Err(error) => error,
        };

        assert_eq!(
            error.to_string(),
            "CODEGEN_DISPATCH_TIMEOUT_SECS must be a positive integer in seconds"
        );
    }
}
