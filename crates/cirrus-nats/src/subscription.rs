use crate::traits::SinkSubscription;
use anyhow::{Context, Result};
use async_nats::jetstream::{self, consumer::PullConsumer, AckKind};
use async_trait::async_trait;
use cirrus_domain::SinkKind;
use futures::StreamExt;
use std::time::Duration;
use tracing::warn;

/// One received broker message, as surfaced to the aggregation loop.
#[derive(Debug, Clone)]
pub struct Delivery {
    pub subject: String,
    pub payload: bytes::Bytes,
}

impl Delivery {
    fn from_message(message: &jetstream::Message) -> Self {
        Self {
            subject: message.subject.to_string(),
            payload: message.payload.clone(),
        }
    }
}

async fn fetch_one(consumer: &PullConsumer, poll_window: Duration) -> Result<Option<jetstream::Message>> {
    let mut batch = consumer
        .fetch()
        .max_messages(1)
        .expires(poll_window)
        .messages()
        .await
        .context("Failed to fetch from consumer")?;

    match batch.next().await {
        Some(Ok(message)) => Ok(Some(message)),
        Some(Err(e)) => Err(anyhow::anyhow!("Error receiving message: {}", e)),
        None => Ok(None),
    }
}

/// Queue-style subscription: explicit acknowledgment, one unacknowledged
/// delivery at a time, nak-requeue on failure. The broker redelivers anything
/// not acked.
pub struct QueueSubscription {
    consumer: PullConsumer,
    poll_window: Duration,
    pending: Option<jetstream::Message>,
}

impl QueueSubscription {
    pub fn new(consumer: PullConsumer, poll_window: Duration) -> Self {
        Self {
            consumer,
            poll_window,
            pending: None,
        }
    }
}

#[async_trait]
impl SinkSubscription for QueueSubscription {
    fn sink(&self) -> SinkKind {
        SinkKind::Queue
    }

    async fn receive(&mut self) -> Result<Option<Delivery>> {
        if self.pending.is_some() {
            anyhow::bail!("a delivery is still pending acknowledgment");
        }
        match fetch_one(&self.consumer, self.poll_window).await? {
            Some(message) => {
                let delivery = Delivery::from_message(&message);
                self.pending = Some(message);
                Ok(Some(delivery))
            }
            None => Ok(None),
        }
    }

    async fn ack(&mut self, _delivery: &Delivery) -> Result<()> {
        let message = self
            .pending
            .take()
            .context("No pending delivery to acknowledge")?;
        message
            .ack()
            .await
            .map_err(|e| anyhow::anyhow!("Failed to ack delivery: {}", e))
    }

    async fn nack(&mut self, delivery: &Delivery, requeue: bool) -> Result<()> {
        let message = self
            .pending
            .take()
            .context("No pending delivery to reject")?;
        let ack_kind = if requeue {
            AckKind::Nak(None)
        } else {
            AckKind::Term
        };
        warn!(
            subject = %delivery.subject,
            requeue,
            "Rejecting queue delivery"
        );
        message
            .ack_with(ack_kind)
            .await
            .map_err(|e| anyhow::anyhow!("Failed to reject delivery: {}", e))
    }
}

/// Log-style subscription: the consumer's cursor advances on delivery
/// (auto-commit), so there is nothing to ack and no way to redeliver. A
/// nacked delivery is simply lost, which is the log sink's contract.
pub struct LogSubscription {
    consumer: PullConsumer,
    poll_window: Duration,
}

impl LogSubscription {
    pub fn new(consumer: PullConsumer, poll_window: Duration) -> Self {
        Self {
            consumer,
            poll_window,
        }
    }
}

#[async_trait]
impl SinkSubscription for LogSubscription {
    fn sink(&self) -> SinkKind {
        SinkKind::Log
    }

    async fn receive(&mut self) -> Result<Option<Delivery>> {
        Ok(fetch_one(&self.consumer, self.poll_window)
            .await?
            .map(|message| Delivery::from_message(&message)))
    }

    async fn ack(&mut self, _delivery: &Delivery) -> Result<()> {
        // Offset already committed on delivery
        Ok(())
    }

    async fn nack(&mut self, delivery: &Delivery, _requeue: bool) -> Result<()> {
        warn!(
            subject = %delivery.subject,
            "Log delivery failed; offset is already committed, message dropped"
        );
        Ok(())
    }
}
