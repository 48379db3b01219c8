use anyhow::Context;
use async_trait::async_trait;
use cirrus_domain::{DomainError, DomainResult, ObservationWriter, WeatherObservation};
use cirrus_nats::{JetStreamPublisher, SinkTopology};
use std::sync::Arc;
use tracing::{debug, info};

/// Writer adapter for one sink. Serializes the canonical event into the wire
/// payload and publishes it onto the sink's stream, awaiting the broker
/// acknowledgment. The log sink routes by municipality, the queue sink has a
/// single global subject; everything else is symmetric across the two kinds.
pub struct SinkWriter {
    jetstream: Arc<dyn JetStreamPublisher>,
    topology: SinkTopology,
}

impl SinkWriter {
    pub fn new(jetstream: Arc<dyn JetStreamPublisher>, topology: SinkTopology) -> Self {
        info!(
            sink = %topology.kind().name(),
            stream = %topology.stream(),
            "Created sink writer"
        );
        Self {
            jetstream,
            topology,
        }
    }
}

#[async_trait]
impl ObservationWriter for SinkWriter {
    async fn publish(&self, observation: &WeatherObservation) -> DomainResult<()> {
        let payload = observation.to_wire()?;
        let subject = self.topology.publish_subject(observation.municipality);

        debug!(
            sink = %self.topology.kind().name(),
            subject = %subject,
            municipality = %observation.municipality.name(),
            size_bytes = payload.len(),
            "Publishing observation"
        );

        self.jetstream
            .publish(subject.clone(), payload.into())
            .await
            .context("Failed to publish and acknowledge observation")
            .map_err(DomainError::SinkError)?;

        info!(
            sink = %self.topology.kind().name(),
            subject = %subject,
            "Observation published"
        );

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;
    use cirrus_nats::MockJetStreamPublisher;

    fn observation() -> WeatherObservation {
        WeatherObservation::normalize("chinautla", 22, 60, "sunny")
    }

    #[tokio::test]
    async fn test_log_writer_routes_by_municipality() {
        // Arrange
        let mut mock_jetstream = MockJetStreamPublisher::new();

        mock_jetstream
            .expect_publish()
            .withf(|subject: &String, payload: &Bytes| {
                let value: serde_json::Value = serde_json::from_slice(payload).unwrap();
                subject == "weather_log.chinautla"
                    && value["municipality"] == "chinautla"
                    && value["temperature"] == 22
                    && value["humidity"] == 60
                    && value["weather"] == "sunny"
            })
            .times(1)
            .returning(|_, _| Ok(()));

        let writer = SinkWriter::new(Arc::new(mock_jetstream), SinkTopology::log("weather_log"));

        // Act
        let result = writer.publish(&observation()).await;

        // Assert
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_queue_writer_publishes_to_single_subject() {
        // Arrange
        let mut mock_jetstream = MockJetStreamPublisher::new();

        mock_jetstream
            .expect_publish()
            .withf(|subject: &String, _payload: &Bytes| subject == "weather_queue.reports")
            .times(2)
            .returning(|_, _| Ok(()));

        let writer = SinkWriter::new(
            Arc::new(mock_jetstream),
            SinkTopology::queue("weather_queue"),
        );

        // Act: two municipalities, same subject
        let first = writer.publish(&observation()).await;
        let second = writer
            .publish(&WeatherObservation::normalize("mixco", 18, 80, "foggy"))
            .await;

        // Assert
        assert!(first.is_ok());
        assert!(second.is_ok());
    }

    #[tokio::test]
    async fn test_unknown_municipality_flows_through_as_unknown() {
        // Arrange
        let mut mock_jetstream = MockJetStreamPublisher::new();

        mock_jetstream
            .expect_publish()
            .withf(|subject: &String, payload: &Bytes| {
                let value: serde_json::Value = serde_json::from_slice(payload).unwrap();
                subject == "weather_log.unknown" && value["municipality"] == "unknown"
            })
            .times(1)
            .returning(|_, _| Ok(()));

        let writer = SinkWriter::new(Arc::new(mock_jetstream), SinkTopology::log("weather_log"));

        // Act
        let result = writer
            .publish(&WeatherObservation::normalize("atlantis", 10, 50, "sunny"))
            .await;

        // Assert
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_publish_failure_surfaces_as_sink_error() {
        // Arrange
        let mut mock_jetstream = MockJetStreamPublisher::new();

        mock_jetstream
            .expect_publish()
            .times(1)
            .returning(|_, _| Err(anyhow::anyhow!("NATS publish failed")));

        let writer = SinkWriter::new(Arc::new(mock_jetstream), SinkTopology::log("weather_log"));

        // Act
        let result = writer.publish(&observation()).await;

        // Assert
        assert!(matches!(result, Err(DomainError::SinkError(_))));
    }
}
