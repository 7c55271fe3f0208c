use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use codegen_gateway::infra::llm::{Dispatcher, ModelEndpoint, ModelRegistry, ResponseShape};
use tokio::io::AsyncReadExt;
use tokio::net::TcpListener;
use tokio::sync::oneshot;

/// A provider that accepts one connection, reads the request, and never
/// answers. `closed` resolves once the client side drops the connection.
pub(crate) struct SilentProvider {
    pub(crate) addr: SocketAddr,
    pub(crate) closed: oneshot::Receiver<()>,
}

impl SilentProvider {
    pub(crate) async fn start() -> Self {
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("silent provider should bind");
        let addr = listener.local_addr().expect("bound address should be known");
        let (closed_tx, closed) = oneshot::channel();

        tokio::spawn(async move {
            let Ok((mut socket, _)) = listener.accept().await else {
                return;
            };
            let mut buf = [0_u8; 4096];
            loop {
                match socket.read(&mut buf).await {
                    Ok(0) | Err(_) => break,
                    Ok(_) => continue,
                }
            }
            let _ = closed_tx.send(());
        });

        Self { addr, closed }
    }

    pub(crate) fn url(&self) -> String {
        format!("http://{}/predictions", self.addr)
    }
}

/// Address of a port nothing listens on.
pub(crate) async fn refused_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("probe listener should bind");
    let addr = listener.local_addr().expect("bound address should be known");
    drop(listener);
    format!("http://{addr}/predictions")
}

pub(crate) fn registry_with(endpoints: Vec<ModelEndpoint>) -> Arc<ModelRegistry> {
    let mut registry = ModelRegistry::new();
    for endpoint in endpoints {
        registry
            .register(endpoint)
            .expect("test endpoint registration should succeed");
    }
    Arc::new(registry)
}

/// Dispatcher serving the three built-in dialects from `base_url`.
pub(crate) fn dispatcher_for(base_url: &str, timeout: Duration) -> Dispatcher {
    let registry = registry_with(vec![
        ModelEndpoint::new(
            "codellama",
            format!("{base_url}/predictions"),
            ResponseShape::Output,
        )
        .with_bearer_token("test-key"),
        ModelEndpoint::new(
            "starcoder",
            format!("{base_url}/models/bigcode/starcoder"),
            ResponseShape::GeneratedText,
        ),
        ModelEndpoint::new(
            "gpt-3.5-turbo",
            format!("{base_url}/v1/chat/completions"),
            ResponseShape::ChatCompletion,
        )
        .with_bearer_token("openai-key"),
    ]);
    Dispatcher::with_timeout(registry, timeout).expect("dispatcher should build")
}
