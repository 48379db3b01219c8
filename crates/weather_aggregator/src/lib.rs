pub mod domain;
pub mod nats;
pub mod weather_aggregator;

pub use domain::{AggregationOutcome, AggregationService};
pub use nats::SinkConsumer;
pub use weather_aggregator::{WeatherAggregator, WeatherAggregatorConfig};
