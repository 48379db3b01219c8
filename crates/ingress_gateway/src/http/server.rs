use crate::domain::DispatchService;
use crate::http::router;
use anyhow::{Context, Result};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::info;

/// HTTP ingress configuration
#[derive(Debug, Clone)]
pub struct HttpServerConfig {
    pub host: String,
    pub port: u16,
}

/// Serve the submission API until the cancellation token fires, then finish
/// in-flight requests and return.
pub async fn run_http_server(
    config: HttpServerConfig,
    service: Arc<DispatchService>,
    cancellation_token: CancellationToken,
) -> Result<()> {
    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind HTTP listener on {}", addr))?;

    info!(addr = %addr, "HTTP ingress listening");

    let app = router(service);
    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            cancellation_token.cancelled().await;
            info!("HTTP ingress shutting down");
        })
        .await
        .context("HTTP ingress server error")?;

    Ok(())
}
