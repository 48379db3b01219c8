use crate::domain::AggregationService;
use crate::nats::SinkConsumer;
use anyhow::Context;
use cirrus_domain::Municipality;
use cirrus_nats::{NatsClient, SinkTopology};
use cirrus_store::{AggregateStore, Clock};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::info;

pub struct WeatherAggregatorConfig {
    pub log_stream: String,
    pub queue_stream: String,
    pub log_consumer_name: String,
    pub queue_consumer_name: String,
    pub poll_window_secs: u64,
    pub record_ttl_secs: u64,
    pub scope_municipality: Option<String>,
}

/// Owns one consumer per sink, both applying observations through a shared
/// aggregation service against the same store.
pub struct WeatherAggregator {
    log_consumer: SinkConsumer,
    queue_consumer: SinkConsumer,
}

impl WeatherAggregator {
    pub async fn new(
        nats_client: Arc<NatsClient>,
        store: Arc<dyn AggregateStore>,
        clock: Arc<dyn Clock>,
        config: WeatherAggregatorConfig,
    ) -> anyhow::Result<Self> {
        info!("Initializing Weather Aggregator module");

        // The store must answer before any delivery is consumed
        store
            .ping()
            .await
            .context("Aggregation store liveness check failed")?;

        let scope = config
            .scope_municipality
            .as_deref()
            .map(Municipality::from_name);
        if let Some(scope) = scope {
            info!(scope = %scope.name(), "Aggregation scoped to a single municipality");
        }

        let service = Arc::new(AggregationService::new(
            store,
            clock,
            Duration::from_secs(config.record_ttl_secs),
            scope,
        ));
        let poll_window = Duration::from_secs(config.poll_window_secs);

        // Log sink consumer
        let log_topology = SinkTopology::log(&config.log_stream);
        nats_client.ensure_sink_stream(&log_topology).await?;
        let log_subscription = nats_client
            .subscribe(&log_topology, &config.log_consumer_name, poll_window)
            .await?;
        let log_consumer = SinkConsumer::new(log_subscription, service.clone());

        // Queue sink consumer
        let queue_topology = SinkTopology::queue(&config.queue_stream);
        nats_client.ensure_sink_stream(&queue_topology).await?;
        let queue_subscription = nats_client
            .subscribe(&queue_topology, &config.queue_consumer_name, poll_window)
            .await?;
        let queue_consumer = SinkConsumer::new(queue_subscription, service);

        info!("Weather Aggregator initialized");

        Ok(Self {
            log_consumer,
            queue_consumer,
        })
    }

    pub fn into_runner_processes(
        self,
    ) -> Vec<
        Box<
            dyn FnOnce(
                    CancellationToken,
                ) -> std::pin::Pin<
                    Box<dyn std::future::Future<Output = anyhow::Result<()>> + Send>,
                > + Send,
        >,
    > {
        vec![
            // Log sink consumer
            Box::new({
                let consumer = self.log_consumer;
                move |ctx| Box::pin(async move { consumer.run(ctx).await })
            }),
            // Queue sink consumer
            Box::new({
                let consumer = self.queue_consumer;
                move |ctx| Box::pin(async move { consumer.run(ctx).await })
            }),
        ]
    }
}
