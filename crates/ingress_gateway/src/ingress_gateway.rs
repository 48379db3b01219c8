use crate::domain::DispatchService;
use crate::http::{run_http_server, HttpServerConfig};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// HTTP ingress worker: owns the dispatch service and serves the submission
/// API until shutdown.
pub struct IngressGateway {
    config: HttpServerConfig,
    service: Arc<DispatchService>,
}

impl IngressGateway {
    pub fn new(config: HttpServerConfig, service: Arc<DispatchService>) -> Self {
        Self { config, service }
    }

    pub fn into_runner_process(
        self,
    ) -> Box<
        dyn FnOnce(
                CancellationToken,
            ) -> std::pin::Pin<
                Box<dyn std::future::Future<Output = anyhow::Result<()>> + Send>,
            > + Send,
    > {
        Box::new({
            let config = self.config;
            let service = self.service;
            move |ctx| Box::pin(async move { run_http_server(config, service, ctx).await })
        })
    }
}
