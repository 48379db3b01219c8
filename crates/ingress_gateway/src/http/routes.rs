use crate::domain::DispatchService;
use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use cirrus_domain::{DispatchOutcome, JointOutcome, WeatherObservation};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

#[derive(Debug, Deserialize)]
pub struct SubmitReportRequest {
    pub municipality: String,
    pub temperature: i32,
    pub humidity: i32,
    pub weather: String,
}

#[derive(Debug, Serialize)]
pub struct SubmitReportResponse {
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub sinks: Vec<DispatchOutcome>,
}

impl SubmitReportResponse {
    fn ok(outcome: JointOutcome) -> Self {
        Self {
            status: "ok",
            message: None,
            sinks: outcome.sinks,
        }
    }

    fn dispatch_failed(outcome: JointOutcome) -> Self {
        Self {
            status: "error",
            message: Some("Failed to deliver the report to every sink".to_string()),
            sinks: outcome.sinks,
        }
    }

    fn rejected(message: impl Into<String>) -> Self {
        Self {
            status: "error",
            message: Some(message.into()),
            sinks: Vec::new(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: &'static str,
}

pub fn router(service: Arc<DispatchService>) -> Router {
    Router::new()
        .route("/tweet", post(submit_report))
        .route("/api/tweet", post(submit_report))
        .route("/health", get(health))
        .layer(TraceLayer::new_for_http())
        .with_state(service)
}

/// Accept one submission, normalize it, and fan it out to both sinks.
/// Success requires every sink to confirm within its window.
async fn submit_report(
    State(service): State<Arc<DispatchService>>,
    Json(request): Json<SubmitReportRequest>,
) -> Result<Json<SubmitReportResponse>, (StatusCode, Json<SubmitReportResponse>)> {
    if request.municipality.trim().is_empty() || request.weather.trim().is_empty() {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(SubmitReportResponse::rejected(
                "Municipality and weather are required",
            )),
        ));
    }

    let observation = WeatherObservation::normalize(
        &request.municipality,
        request.temperature,
        request.humidity,
        &request.weather,
    );

    let outcome = service.dispatch(observation).await;
    if outcome.is_success() {
        info!(municipality = %request.municipality, "Report accepted by both sinks");
        Ok(Json(SubmitReportResponse::ok(outcome)))
    } else {
        warn!(
            municipality = %request.municipality,
            failures = ?outcome.failure_details(),
            "Report rejected, sink dispatch failed"
        );
        Err((
            StatusCode::BAD_GATEWAY,
            Json(SubmitReportResponse::dispatch_failed(outcome)),
        ))
    }
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        service: "cirrus",
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use cirrus_domain::{MockObservationWriter, Municipality, SinkKind, WeatherCondition};
    use std::time::Duration;

    fn request(municipality: &str, weather: &str) -> SubmitReportRequest {
        SubmitReportRequest {
            municipality: municipality.to_string(),
            temperature: 22,
            humidity: 60,
            weather: weather.to_string(),
        }
    }

    fn service_with(
        log: MockObservationWriter,
        queue: MockObservationWriter,
    ) -> Arc<DispatchService> {
        Arc::new(DispatchService::new(
            vec![
                (SinkKind::Log, Arc::new(log)),
                (SinkKind::Queue, Arc::new(queue)),
            ],
            Duration::from_secs(5),
        ))
    }

    #[tokio::test]
    async fn test_submit_rejects_empty_required_fields() {
        // Arrange: writers must never be reached
        let service = service_with(MockObservationWriter::new(), MockObservationWriter::new());

        for (municipality, weather) in [("", "sunny"), ("mixco", ""), ("   ", "sunny")] {
            // Act
            let result = submit_report(
                State(service.clone()),
                Json(request(municipality, weather)),
            )
            .await;

            // Assert
            let (status, Json(body)) = result.err().expect("expected a rejection");
            assert_eq!(status, StatusCode::BAD_REQUEST);
            assert_eq!(body.status, "error");
            assert!(body.message.unwrap().contains("required"));
        }
    }

    #[tokio::test]
    async fn test_submit_reports_joint_success() {
        // Arrange
        let mut log_writer = MockObservationWriter::new();
        log_writer.expect_publish().times(1).returning(|_| Ok(()));
        let mut queue_writer = MockObservationWriter::new();
        queue_writer.expect_publish().times(1).returning(|_| Ok(()));

        let service = service_with(log_writer, queue_writer);

        // Act
        let result = submit_report(State(service), Json(request("chinautla", "sunny"))).await;

        // Assert
        let Json(body) = result.expect("expected success");
        assert_eq!(body.status, "ok");
        assert_eq!(body.sinks.len(), 2);
        assert!(body.sinks.iter().all(DispatchOutcome::is_success));
    }

    #[tokio::test]
    async fn test_submit_maps_dispatch_failure_to_bad_gateway() {
        // Arrange: queue sink fails
        let mut log_writer = MockObservationWriter::new();
        log_writer.expect_publish().times(1).returning(|_| Ok(()));
        let mut queue_writer = MockObservationWriter::new();
        queue_writer.expect_publish().times(1).returning(|_| {
            Err(cirrus_domain::DomainError::SinkError(anyhow::anyhow!(
                "broker unreachable"
            )))
        });

        let service = service_with(log_writer, queue_writer);

        // Act
        let result = submit_report(State(service), Json(request("chinautla", "sunny"))).await;

        // Assert
        let (status, Json(body)) = result.err().expect("expected an error response");
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(body.status, "error");
        // Per-sink detail survives into the response body
        assert!(body.sinks.iter().any(|o| !o.is_success()));
    }

    #[tokio::test]
    async fn test_submit_normalizes_before_dispatch() {
        // Arrange: an unrecognized municipality must reach the writers as
        // Unknown, not as the raw string
        let expects_unknown = |o: &WeatherObservation| {
            o.municipality == Municipality::Unknown && o.weather == WeatherCondition::Sunny
        };

        let mut log_writer = MockObservationWriter::new();
        log_writer
            .expect_publish()
            .withf(expects_unknown)
            .times(1)
            .returning(|_| Ok(()));
        let mut queue_writer = MockObservationWriter::new();
        queue_writer
            .expect_publish()
            .withf(expects_unknown)
            .times(1)
            .returning(|_| Ok(()));

        let service = service_with(log_writer, queue_writer);

        // Act
        let result = submit_report(State(service), Json(request("atlantis", "SUNNY"))).await;

        // Assert
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_health_reports_ok() {
        let Json(body) = health().await;
        assert_eq!(body.status, "ok");
        assert_eq!(body.service, "cirrus");
    }
}
