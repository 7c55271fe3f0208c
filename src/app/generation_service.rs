use std::sync::Arc;
use std::time::Instant;

use serde_json::Value;

use crate::domain::{
    ConfigError, GenerationError, GenerationJob, GenerationJobValidator, GenerationResult,
};
use crate::infra::llm::CodeGenerator;

use super::{GenerationObserver, TracingObserver};

/// Validate → dispatch for a single request, reporting each outcome to the
/// injected observer.
pub struct GenerationService<G> {
    validator: Arc<GenerationJobValidator>,
    generator: Arc<G>,
    observer: Arc<dyn GenerationObserver>,
}

impl<G> Clone for GenerationService<G> {
    fn clone(&self) -> Self {
        Self {
            validator: Arc::clone(&self.validator),
            generator: Arc::clone(&self.generator),
            observer: Arc::clone(&self.observer),
        }
    }
}

impl<G: CodeGenerator> GenerationService<G> {
    pub fn new(generator: G) -> Result<Self, ConfigError> {
        Self::with_observer(generator, Arc::new(TracingObserver))
    }

    pub fn with_observer(
        generator: G,
        observer: Arc<dyn GenerationObserver>,
    ) -> Result<Self, ConfigError> {
        Ok(Self {
            validator: Arc::new(GenerationJobValidator::new()?),
            generator: Arc::new(generator),
            observer,
        })
    }

    pub fn model_ids(&self) -> Vec<String> {
        self.generator.model_ids()
    }

    /// Handles a raw request body straight from the HTTP boundary.
    pub async fn generate_from_json(&self, body: &[u8]) -> Result<GenerationResult, GenerationError> {
        let started = Instant::now();
        match self.validator.validate_json(body) {
            Ok(job) => self.dispatch(job, started).await,
            Err(error) => {
                self.observer.on_failed(None, &error, started.elapsed());
                Err(error)
            }
        }
    }

    pub async fn generate(&self, raw: &Value) -> Result<GenerationResult, GenerationError> {
        let started = Instant::now();
        match self.validator.validate(raw) {
            Ok(job) => self.dispatch(job, started).await,
            Err(error) => {
                self.observer.on_failed(None, &error, started.elapsed());
                Err(error)
            }
        }
    }

    async fn dispatch(
        &self,
        job: GenerationJob,
        started: Instant,
    ) -> Result<GenerationResult, GenerationError> {
        self.observer.on_started(&job);
        match self.generator.generate(&job).await {
            Ok(result) => {
                self.observer.on_succeeded(&job, &result, started.elapsed());
                Ok(result)
            }
            Err(error) => {
                self.observer.on_failed(Some(&job), &error, started.elapsed());
                Err(error)
            }
        }
    }
}
