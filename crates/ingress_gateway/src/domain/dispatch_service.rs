use cirrus_domain::{
    DispatchOutcome, JointOutcome, ObservationWriter, SinkKind, WeatherObservation,
};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error};

/// Fans one canonical event out to every registered sink writer in parallel
/// and joins the outcomes into the single verdict reported to the caller.
///
/// Each dispatch path carries its own clone of the observation and its own
/// timeout; the barrier waits for the slower path, so the joint outcome is
/// deterministic: success only when every sink confirmed within its window.
pub struct DispatchService {
    writers: Vec<(SinkKind, Arc<dyn ObservationWriter>)>,
    call_timeout: Duration,
}

impl DispatchService {
    pub fn new(writers: Vec<(SinkKind, Arc<dyn ObservationWriter>)>, call_timeout: Duration) -> Self {
        Self {
            writers,
            call_timeout,
        }
    }

    pub async fn dispatch(&self, observation: WeatherObservation) -> JointOutcome {
        debug!(
            municipality = %observation.municipality.name(),
            weather = %observation.weather.name(),
            sinks = self.writers.len(),
            "Dispatching observation"
        );

        let mut handles = Vec::with_capacity(self.writers.len());
        for (sink, writer) in &self.writers {
            let sink = *sink;
            let writer = Arc::clone(writer);
            let observation = observation.clone();
            let timeout = self.call_timeout;
            let handle = tokio::spawn(async move {
                match tokio::time::timeout(timeout, writer.publish(&observation)).await {
                    Ok(Ok(())) => DispatchOutcome::success(sink),
                    Ok(Err(e)) => DispatchOutcome::error(sink, e.to_string()),
                    Err(_) => {
                        DispatchOutcome::error(sink, format!("publish timed out after {:?}", timeout))
                    }
                }
            });
            handles.push((sink, handle));
        }

        // Barrier: the response waits for the slower of the two paths
        let mut outcomes = Vec::with_capacity(handles.len());
        for (sink, handle) in handles {
            let outcome = match handle.await {
                Ok(outcome) => outcome,
                Err(e) => DispatchOutcome::error(sink, format!("dispatch task failed: {}", e)),
            };
            if !outcome.is_success() {
                error!(
                    sink = %sink.name(),
                    detail = outcome.detail.as_deref().unwrap_or(""),
                    "Sink dispatch failed"
                );
            }
            outcomes.push(outcome);
        }

        JointOutcome::new(outcomes)
    }
}
