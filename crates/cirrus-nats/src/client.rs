use crate::retry::RetryPolicy;
use crate::subscription::{LogSubscription, QueueSubscription};
use crate::topology::SinkTopology;
use crate::traits::{JetStreamPublisher, SinkSubscription};
use anyhow::{Context, Result};
use async_nats::jetstream;
use async_trait::async_trait;
use cirrus_domain::SinkKind;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

pub struct NatsClient {
    client: async_nats::Client,
    jetstream: jetstream::Context,
}

impl NatsClient {
    pub async fn connect(url: &str, timeout: Duration) -> Result<Self> {
        info!(url = %url, timeout_ms = timeout.as_millis(), "Connecting to NATS");

        let client = async_nats::ConnectOptions::new()
            .connection_timeout(timeout)
            .connect(url)
            .await
            .context("Failed to connect to NATS")?;

        let jetstream = jetstream::new(client.clone());

        info!("Successfully connected to NATS");
        Ok(Self { client, jetstream })
    }

    /// Connect with the bounded startup retry policy. Used by every process
    /// that must outwait a broker still coming up.
    pub async fn connect_with_retry(
        url: &str,
        timeout: Duration,
        policy: &RetryPolicy,
        shutdown: &CancellationToken,
    ) -> Result<Self> {
        policy
            .run("nats_connect", shutdown, || Self::connect(url, timeout))
            .await
            .into_result("NATS connection")
    }

    /// Create the sink's stream if it does not exist yet.
    pub async fn ensure_sink_stream(&self, topology: &SinkTopology) -> Result<()> {
        let config = topology.stream_config();
        info!(stream = %topology.stream(), sink = %topology.kind().name(), "Ensuring stream exists");

        match self.jetstream.get_stream(topology.stream()).await {
            Ok(_) => {
                info!(stream = %topology.stream(), "Stream already exists");
            }
            Err(_) => {
                self.jetstream
                    .create_stream(config)
                    .await
                    .context("Failed to create stream")?;
                info!(stream = %topology.stream(), "Created stream");
            }
        }

        Ok(())
    }

    /// Create a durable consumer on the sink's stream and wrap it in the
    /// subscription flavor matching the sink kind.
    pub async fn subscribe(
        &self,
        topology: &SinkTopology,
        consumer_name: &str,
        poll_window: Duration,
    ) -> Result<Box<dyn SinkSubscription>> {
        debug!(
            stream = %topology.stream(),
            consumer = %consumer_name,
            sink = %topology.kind().name(),
            "Creating sink consumer"
        );

        let consumer = self
            .jetstream
            .create_consumer_on_stream(topology.consumer_config(consumer_name), topology.stream())
            .await
            .context("Failed to create consumer")?;

        Ok(match topology.kind() {
            SinkKind::Log => Box::new(LogSubscription::new(consumer, poll_window)),
            SinkKind::Queue => Box::new(QueueSubscription::new(consumer, poll_window)),
        })
    }

    /// Create a JetStreamPublisher trait object from this client
    pub fn create_publisher_client(&self) -> Arc<dyn JetStreamPublisher> {
        Arc::new(NatsJetStreamPublisher::new(self.jetstream.clone()))
    }

    pub async fn close(self) {
        info!("Closing NATS connection");
        if let Err(e) = self.client.flush().await {
            warn!(error = %e, "Failed to flush NATS client before close");
        }
        // Connection closes when the client drops
    }
}

/// Concrete implementation of JetStreamPublisher using async-nats
pub struct NatsJetStreamPublisher {
    context: jetstream::Context,
}

impl NatsJetStreamPublisher {
    pub fn new(context: jetstream::Context) -> Self {
        Self { context }
    }
}

#[async_trait]
impl JetStreamPublisher for NatsJetStreamPublisher {
    async fn publish(&self, subject: String, payload: bytes::Bytes) -> Result<()> {
        let ack = self
            .context
            .publish(subject, payload)
            .await
            .context("Failed to publish message to JetStream")?;

        ack.await
            .context("Failed to receive JetStream acknowledgment")?;
        Ok(())
    }
}
