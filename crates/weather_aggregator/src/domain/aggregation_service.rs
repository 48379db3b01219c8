use cirrus_domain::{DomainResult, Municipality, ObservationRecord, WeatherObservation};
use cirrus_store::{keys, AggregateStore, Clock};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

/// How the service disposed of one decoded observation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AggregationOutcome {
    /// Every facet was updated.
    Aggregated,
    /// The observation fell outside the configured municipality scope.
    Skipped,
}

/// Applies one decoded observation to every derived facet in the store.
///
/// The mutation sequence is deliberately not transactional: each step is an
/// independent store operation and the first failure aborts the rest, leaving
/// the earlier facets updated. A redelivered message runs the whole sequence
/// again, so totals count one increment per delivery, not per event.
pub struct AggregationService {
    store: Arc<dyn AggregateStore>,
    clock: Arc<dyn Clock>,
    record_ttl: Duration,
    scope: Option<Municipality>,
}

impl AggregationService {
    pub fn new(
        store: Arc<dyn AggregateStore>,
        clock: Arc<dyn Clock>,
        record_ttl: Duration,
        scope: Option<Municipality>,
    ) -> Self {
        Self {
            store,
            clock,
            record_ttl,
            scope,
        }
    }

    pub async fn apply(&self, observation: &WeatherObservation) -> DomainResult<AggregationOutcome> {
        if let Some(scope) = self.scope {
            if observation.municipality != scope {
                debug!(
                    municipality = %observation.municipality.name(),
                    scope = %scope.name(),
                    "Observation outside scope, skipping"
                );
                return Ok(AggregationOutcome::Skipped);
            }
        }

        let municipality = observation.municipality;
        let observed_at = self.clock.epoch_seconds();

        let total = self.store.increment(keys::TOTAL_REPORTS).await?;
        self.store
            .increment(&keys::municipality_counter(municipality))
            .await?;
        self.store
            .increment(&keys::weather_counter(observation.weather))
            .await?;

        self.store
            .append(
                &keys::temperature_samples(municipality),
                observation.temperature.to_string(),
            )
            .await?;
        self.store
            .append(
                &keys::humidity_samples(municipality),
                observation.humidity.to_string(),
            )
            .await?;

        let serialized = ObservationRecord::new(observation.clone(), observed_at).to_json()?;
        self.store
            .set_with_ttl(
                &keys::observation_record(municipality, observed_at),
                serialized.clone(),
                self.record_ttl,
            )
            .await?;
        self.store
            .sorted_set_add(
                &keys::record_index(municipality),
                observed_at as f64,
                serialized,
            )
            .await?;

        info!(
            municipality = %municipality.name(),
            weather = %observation.weather.name(),
            total_reports = total,
            "Observation aggregated"
        );

        Ok(AggregationOutcome::Aggregated)
    }
}
