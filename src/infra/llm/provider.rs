use std::future::Future;

use crate::domain::{GenerationError, GenerationJob, GenerationResult};

use super::Dispatcher;

/// Seam between the generation use case and the provider transport.
pub trait CodeGenerator: Send + Sync {
    fn generate(
        &self,
        job: &GenerationJob,
    ) -> impl Future<Output = Result<GenerationResult, GenerationError>> + Send;

    fn model_ids(&self) -> Vec<String>;
}

impl CodeGenerator for Dispatcher {
    async fn generate(&self, job: &GenerationJob) -> Result<GenerationResult, GenerationError> {
        Dispatcher::generate(self, job).await
    }

    fn model_ids(&self) -> Vec<String> {
        self.registry().model_ids()
    }
}
