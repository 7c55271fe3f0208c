use std::time::Duration;

use crate::domain::{GenerationError, GenerationJob, GenerationResult};

/// Receives lifecycle events for each generation request.
///
/// The service never logs on its own; whatever is injected here decides where
/// diagnostics go.
pub trait GenerationObserver: Send + Sync {
    fn on_started(&self, job: &GenerationJob);

    fn on_succeeded(&self, job: &GenerationJob, result: &GenerationResult, elapsed: Duration);

    /// `job` is `None` when the request failed validation.
    fn on_failed(&self, job: Option<&GenerationJob>, error: &GenerationError, elapsed: Duration);
}

/// Emits structured `tracing` events.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingObserver;

impl GenerationObserver for TracingObserver {
    fn on_started(&self, job: &GenerationJob) {
        tracing::info!(
            model = %job.model,
            language = %job.language,
            prompt_chars = job.prompt.chars().count(),
            "dispatching generation request"
        );
    }

    fn on_succeeded(&self, job: &GenerationJob, result: &GenerationResult, elapsed: Duration) {
        tracing::info!(
            model = %job.model,
            language = %result.language,
            code_chars = result.code.chars().count(),
            elapsed_ms = elapsed.as_millis() as u64,
            "generation succeeded"
        );
    }

    fn on_failed(&self, job: Option<&GenerationJob>, error: &GenerationError, elapsed: Duration) {
        let kind = error.kind().as_str();
        let model = job.map(|job| job.model.as_str()).or(error.model());
        if error.http_status() < 500 {
            tracing::debug!(kind, error = %error, "rejected generation request");
        } else {
            tracing::warn!(
                kind,
                model,
                error = %error,
                elapsed_ms = elapsed.as_millis() as u64,
                "generation failed"
            );
        }
    }
}
