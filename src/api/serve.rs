use std::net::SocketAddr;

use anyhow::Result;
use tokio::sync::oneshot;

use crate::app::GenerationService;
use crate::config::ServerConfig;
use crate::infra::llm::CodeGenerator;

use super::router;

/// Handle returned by [`serve`]: the bound address and a shutdown trigger.
pub struct ServeHandle {
    pub local_addr: SocketAddr,
    shutdown_tx: Option<oneshot::Sender<()>>,
    join: Option<tokio::task::JoinHandle<Result<(), std::io::Error>>>,
}

impl ServeHandle {
    /// Trigger graceful shutdown and wait for in-flight requests to finish.
    pub async fn shutdown(mut self) -> Result<()> {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
        if let Some(join) = self.join.take() {
            join.await??;
        }
        Ok(())
    }
}

/// Bind `config.bind_addr` and serve the generation API on a spawned task.
pub async fn serve<G>(service: GenerationService<G>, config: &ServerConfig) -> Result<ServeHandle>
where
    G: CodeGenerator + 'static,
{
    let app = router(service, config.max_body_bytes);
    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    let local_addr = listener.local_addr()?;
    tracing::info!(
        %local_addr,
        max_body_bytes = config.max_body_bytes,
        "code generation API listening"
    );

    let (shutdown_tx, shutdown_rx) = oneshot::channel();
    let join = tokio::spawn(async move {
        axum::serve(listener, app)
            .with_graceful_shutdown(async {
                let _ = shutdown_rx.await;
                tracing::info!("received shutdown signal");
            })
            .await
    });

    Ok(ServeHandle {
        local_addr,
        shutdown_tx: Some(shutdown_tx),
        join: Some(join),
    })
}
