pub mod client;
pub mod retry;
pub mod subscription;
pub mod topology;
pub mod traits;

pub use client::{NatsClient, NatsJetStreamPublisher};
pub use retry::{RetryOutcome, RetryPolicy};
pub use subscription::{Delivery, LogSubscription, QueueSubscription};
pub use topology::SinkTopology;
pub use traits::{JetStreamPublisher, SinkSubscription};

#[cfg(any(test, feature = "testing"))]
pub use traits::{MockJetStreamPublisher, MockSinkSubscription};
