use crate::domain::{AggregationOutcome, AggregationService};
use anyhow::Result;
use cirrus_domain::WeatherObservation;
use cirrus_nats::{Delivery, SinkSubscription};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

/// Drains one sink subscription and feeds every delivery through the shared
/// aggregation service.
///
/// Disposition per delivery:
///   - decoded and aggregated: acknowledge
///   - undecodable payload: acknowledge and discard, redelivery cannot fix it
///   - store failure: reject with requeue; the subscription decides what that
///     means (the queue redelivers, the log records the loss)
pub struct SinkConsumer {
    subscription: Box<dyn SinkSubscription>,
    service: Arc<AggregationService>,
}

impl SinkConsumer {
    pub fn new(subscription: Box<dyn SinkSubscription>, service: Arc<AggregationService>) -> Self {
        Self {
            subscription,
            service,
        }
    }

    pub async fn run(mut self, ctx: CancellationToken) -> Result<()> {
        let sink = self.subscription.sink();
        info!(sink = %sink.name(), "Starting sink consumer loop");

        loop {
            tokio::select! {
                _ = ctx.cancelled() => {
                    info!(sink = %sink.name(), "Received shutdown signal, stopping consumer");
                    break;
                }
                received = self.subscription.receive() => {
                    match received {
                        Ok(Some(delivery)) => self.process(delivery).await,
                        Ok(None) => {}
                        Err(e) => {
                            error!(sink = %sink.name(), error = %e, "Error receiving delivery");
                            // Keep polling despite errors
                            tokio::time::sleep(Duration::from_secs(1)).await;
                        }
                    }
                }
            }
        }

        info!(sink = %sink.name(), "Consumer stopped gracefully");
        Ok(())
    }

    async fn process(&mut self, delivery: Delivery) {
        let sink = self.subscription.sink();

        let observation = match WeatherObservation::from_wire(&delivery.payload) {
            Ok(observation) => observation,
            Err(e) => {
                warn!(
                    sink = %sink.name(),
                    subject = %delivery.subject,
                    error = %e,
                    "Discarding undecodable delivery"
                );
                if let Err(e) = self.subscription.ack(&delivery).await {
                    error!(sink = %sink.name(), error = %e, "Failed to acknowledge discarded delivery");
                }
                return;
            }
        };

        match self.service.apply(&observation).await {
            Ok(outcome) => {
                if outcome == AggregationOutcome::Skipped {
                    debug!(sink = %sink.name(), subject = %delivery.subject, "Delivery outside scope");
                }
                if let Err(e) = self.subscription.ack(&delivery).await {
                    error!(sink = %sink.name(), error = %e, "Failed to acknowledge delivery");
                }
            }
            Err(e) => {
                error!(
                    sink = %sink.name(),
                    subject = %delivery.subject,
                    error = %e,
                    "Aggregation failed, rejecting delivery"
                );
                if let Err(e) = self.subscription.nack(&delivery, true).await {
                    error!(sink = %sink.name(), error = %e, "Failed to reject delivery");
                }
            }
        }
    }
}
