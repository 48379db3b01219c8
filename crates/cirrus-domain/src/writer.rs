use crate::error::DomainResult;
use crate::observation::WeatherObservation;
use async_trait::async_trait;

/// Publish contract between the ingress gateway and a sink's writer adapter.
/// Implementations serialize the canonical event and publish it onto their
/// broker; a returned error is reported to the caller as that sink's error
/// status, never swallowed.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait ObservationWriter: Send + Sync {
    async fn publish(&self, observation: &WeatherObservation) -> DomainResult<()>;
}
