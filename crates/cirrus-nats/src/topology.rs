use async_nats::jetstream::consumer::{pull, AckPolicy};
use async_nats::jetstream::stream::{Config as StreamConfig, RetentionPolicy};
use cirrus_domain::{Municipality, SinkKind};

/// Broker-side layout of one sink: its stream, its subject space, and the
/// delivery semantics its consumer gets.
///
/// The log sink keeps a limits-retained stream with one subject per
/// municipality (the municipality is the routing key, giving per-municipality
/// ordering) and an auto-commit consumer. The queue sink keeps a work-queue
/// stream with a single subject (global FIFO) and an explicit-ack consumer
/// capped at one unacknowledged delivery.
#[derive(Debug, Clone)]
pub struct SinkTopology {
    kind: SinkKind,
    stream: String,
}

impl SinkTopology {
    pub fn log(stream: impl Into<String>) -> Self {
        Self {
            kind: SinkKind::Log,
            stream: stream.into(),
        }
    }

    pub fn queue(stream: impl Into<String>) -> Self {
        Self {
            kind: SinkKind::Queue,
            stream: stream.into(),
        }
    }

    pub fn kind(&self) -> SinkKind {
        self.kind
    }

    pub fn stream(&self) -> &str {
        &self.stream
    }

    /// Subject an observation for `municipality` is published to.
    pub fn publish_subject(&self, municipality: Municipality) -> String {
        match self.kind {
            SinkKind::Log => format!("{}.{}", self.stream, municipality.name()),
            SinkKind::Queue => format!("{}.reports", self.stream),
        }
    }

    fn filter_subject(&self) -> String {
        match self.kind {
            SinkKind::Log => format!("{}.*", self.stream),
            SinkKind::Queue => format!("{}.reports", self.stream),
        }
    }

    pub fn stream_config(&self) -> StreamConfig {
        let retention = match self.kind {
            SinkKind::Log => RetentionPolicy::Limits,
            SinkKind::Queue => RetentionPolicy::WorkQueue,
        };
        StreamConfig {
            name: self.stream.clone(),
            subjects: vec![self.filter_subject()],
            retention,
            description: Some(format!("{} sink for weather reports", self.kind.name())),
            ..Default::default()
        }
    }

    pub fn consumer_config(&self, consumer_name: &str) -> pull::Config {
        match self.kind {
            SinkKind::Log => pull::Config {
                name: Some(consumer_name.to_string()),
                durable_name: Some(consumer_name.to_string()),
                filter_subject: self.filter_subject(),
                ack_policy: AckPolicy::None,
                ..Default::default()
            },
            SinkKind::Queue => pull::Config {
                name: Some(consumer_name.to_string()),
                durable_name: Some(consumer_name.to_string()),
                filter_subject: self.filter_subject(),
                ack_policy: AckPolicy::Explicit,
                // Prefetch of one: the broker holds the next delivery until
                // the current one is acked or requeued
                max_ack_pending: 1,
                ..Default::default()
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_sink_routes_by_municipality() {
        let topology = SinkTopology::log("weather_log");

        assert_eq!(
            topology.publish_subject(Municipality::Chinautla),
            "weather_log.chinautla"
        );
        assert_eq!(
            topology.publish_subject(Municipality::Unknown),
            "weather_log.unknown"
        );
        assert_eq!(topology.stream_config().subjects, vec!["weather_log.*"]);
        assert_eq!(
            topology.stream_config().retention,
            RetentionPolicy::Limits
        );
    }

    #[test]
    fn test_queue_sink_uses_single_global_subject() {
        let topology = SinkTopology::queue("weather_queue");

        // Every municipality lands on the same subject: queue order is global
        assert_eq!(
            topology.publish_subject(Municipality::Chinautla),
            "weather_queue.reports"
        );
        assert_eq!(
            topology.publish_subject(Municipality::Mixco),
            "weather_queue.reports"
        );
        assert_eq!(
            topology.stream_config().retention,
            RetentionPolicy::WorkQueue
        );
    }

    #[test]
    fn test_consumer_configs_carry_sink_delivery_semantics() {
        let log = SinkTopology::log("weather_log").consumer_config("log_aggregator");
        assert_eq!(log.ack_policy, AckPolicy::None);
        assert_eq!(log.durable_name.as_deref(), Some("log_aggregator"));
        assert_eq!(log.filter_subject, "weather_log.*");

        let queue = SinkTopology::queue("weather_queue").consumer_config("queue_aggregator");
        assert_eq!(queue.ack_policy, AckPolicy::Explicit);
        assert_eq!(queue.max_ack_pending, 1);
        assert_eq!(queue.filter_subject, "weather_queue.reports");
    }
}
