use crate::subscription::Delivery;
use anyhow::Result;
use async_trait::async_trait;
use cirrus_domain::SinkKind;

/// Trait for JetStream publisher operations
/// Abstracts publishing so writers can be tested without a broker; stream
/// management stays on `NatsClient`
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait JetStreamPublisher: Send + Sync {
    /// Publish a message to a subject and await the broker acknowledgment
    async fn publish(&self, subject: String, payload: bytes::Bytes) -> Result<()>;
}

/// One delivery semantics for both broker kinds. The aggregation loop is
/// written once against this trait; the per-kind differences (auto-commit vs
/// explicit ack, redelivery vs drop) live entirely in the implementations.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait SinkSubscription: Send + Sync {
    /// Which sink this subscription drains. Used for log fields.
    fn sink(&self) -> SinkKind;

    /// Wait for the next delivery, up to the subscription's poll window.
    /// `None` when the window elapses with nothing to deliver, so callers can
    /// interleave a shutdown check with every poll.
    async fn receive(&mut self) -> Result<Option<Delivery>>;

    /// Acknowledge the delivery so the broker never redelivers it.
    async fn ack(&mut self, delivery: &Delivery) -> Result<()>;

    /// Reject the delivery; `requeue` asks the broker to redeliver it.
    /// Log-style subscriptions commit on receipt and cannot redeliver, so for
    /// them this only records the loss.
    async fn nack(&mut self, delivery: &Delivery, requeue: bool) -> Result<()>;
}
