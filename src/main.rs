//! Code generation gateway entry point.
//!
//! Reads configuration from the environment, builds the model registry and
//! dispatcher, and serves the HTTP API until ctrl-c.

use std::sync::Arc;

use anyhow::Result;
use codegen_gateway::api;
use codegen_gateway::app::GenerationService;
use codegen_gateway::config::ServerConfig;
use codegen_gateway::infra::llm::{Dispatcher, ModelRegistry};
use tokio::signal;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // RUST_LOG overrides the default `info` level.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = ServerConfig::from_env()?;
    let registry = ModelRegistry::from_env()?;
    tracing::info!(models = ?registry.model_ids(), "model registry loaded");

    let dispatcher = Dispatcher::from_env(Arc::new(registry))?;
    tracing::info!(timeout = ?dispatcher.timeout(), "dispatcher ready");

    let service = GenerationService::new(dispatcher)?;
    let handle = api::serve(service, &config).await?;

    signal::ctrl_c().await?;
    handle.shutdown().await?;
    Ok(())
}
