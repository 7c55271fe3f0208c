use std::time::Duration;

use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ErrorKind {
    ValidationError,
    UnsupportedModel,
    Timeout,
    ProviderError,
    EmptyResult,
    UnexpectedError,
}

impl ErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::ValidationError => "ValidationError",
            Self::UnsupportedModel => "UnsupportedModel",
            Self::Timeout => "Timeout",
            Self::ProviderError => "ProviderError",
            Self::EmptyResult => "EmptyResult",
            Self::UnexpectedError => "UnexpectedError",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GenerationError {
    #[error("{message}")]
    Validation { message: String },
    #[error("Unsupported model: {model}")]
    UnsupportedModel { model: String },
    #[error("Request to {model} timed out after {timeout:?}")]
    Timeout { model: String, timeout: Duration },
    #[error("Model API error ({status}): {body}")]
    Provider {
        model: String,
        status: u16,
        body: String,
    },
    #[error("Model {model} returned an empty result")]
    EmptyResult { model: String },
    #[error("{message}")]
    Unexpected {
        message: String,
        model: Option<String>,
    },
}

impl GenerationError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    pub fn unexpected(model: &str, message: impl Into<String>) -> Self {
        Self::Unexpected {
            message: message.into(),
            model: Some(model.to_string()),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation { .. } => ErrorKind::ValidationError,
            Self::UnsupportedModel { .. } => ErrorKind::UnsupportedModel,
            Self::Timeout { .. } => ErrorKind::Timeout,
            Self::Provider { .. } => ErrorKind::ProviderError,
            Self::EmptyResult { .. } => ErrorKind::EmptyResult,
            Self::Unexpected { .. } => ErrorKind::UnexpectedError,
        }
    }

    /// Status the HTTP boundary answers with. Only malformed requests are the
    /// caller's fault; an unknown model id is treated as server misconfiguration.
    pub fn http_status(&self) -> u16 {
        match self {
            Self::Validation { .. } => 400,
            Self::UnsupportedModel { .. }
            | Self::Timeout { .. }
            | Self::Provider { .. }
            | Self::EmptyResult { .. }
            | Self::Unexpected { .. } => 500,
        }
    }

    pub fn model(&self) -> Option<&str> {
        match self {
            Self::Validation { .. } => None,
            Self::UnsupportedModel { model }
            | Self::Timeout { model, .. }
            | Self::Provider { model, .. }
            | Self::EmptyResult { model } => Some(model),
            Self::Unexpected { model, .. } => model.as_deref(),
        }
    }

    /// Short headline for the `error` field of a response body.
    pub fn title(&self) -> &'static str {
        match self {
            Self::Validation { .. } => "Invalid request data",
            Self::UnsupportedModel { .. } => "Unsupported model",
            Self::Timeout { .. } => "Generation timed out",
            Self::Provider { .. } => "Model provider error",
            Self::EmptyResult { .. } => "Empty generation result",
            Self::Unexpected { .. } => "Failed to generate code",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("{name} could not be read: {message}")]
    Unreadable { name: String, message: String },
    #[error("{name} {message}")]
    Invalid { name: String, message: String },
    #[error("model registry rejected entry: {message}")]
    Registry { message: String },
    #[error("internal error: {message}")]
    Internal { message: String },
}

impl ConfigError {
    pub fn invalid(name: &str, message: impl Into<String>) -> Self {
        Self::Invalid {
            name: name.to_string(),
            message: message.into(),
        }
    }

    pub fn registry(message: impl Into<String>) -> Self {
        Self::Registry {
            message: message.into(),
        }
    }
}
