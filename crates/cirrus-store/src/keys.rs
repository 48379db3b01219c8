//! Store key conventions. Existing consumers of the aggregated data read
//! these keys directly, so the formats here must not drift.

use cirrus_domain::{Municipality, WeatherCondition};

/// Global counter of every aggregated report.
pub const TOTAL_REPORTS: &str = "total_reports";

pub fn municipality_counter(municipality: Municipality) -> String {
    format!("municipality:{}", municipality.name())
}

pub fn weather_counter(weather: WeatherCondition) -> String {
    format!("weather:{}", weather.name())
}

pub fn temperature_samples(municipality: Municipality) -> String {
    format!("temperatures:{}", municipality.name())
}

pub fn humidity_samples(municipality: Municipality) -> String {
    format!("humidities:{}", municipality.name())
}

/// Expiring key holding one full serialized observation.
pub fn observation_record(municipality: Municipality, epoch_seconds: i64) -> String {
    format!("record:{}:{}", municipality.name(), epoch_seconds)
}

/// Sorted set of serialized observations scored by receipt time.
pub fn record_index(municipality: Municipality) -> String {
    format!("records:{}", municipality.name())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_formats_are_exact() {
        assert_eq!(TOTAL_REPORTS, "total_reports");
        assert_eq!(
            municipality_counter(Municipality::Chinautla),
            "municipality:chinautla"
        );
        assert_eq!(weather_counter(WeatherCondition::Sunny), "weather:sunny");
        assert_eq!(
            temperature_samples(Municipality::Chinautla),
            "temperatures:chinautla"
        );
        assert_eq!(
            humidity_samples(Municipality::Chinautla),
            "humidities:chinautla"
        );
        assert_eq!(
            observation_record(Municipality::Chinautla, 1_724_300_000),
            "record:chinautla:1724300000"
        );
        assert_eq!(record_index(Municipality::Chinautla), "records:chinautla");
    }

    #[test]
    fn test_unknown_values_key_under_unknown() {
        assert_eq!(
            municipality_counter(Municipality::Unknown),
            "municipality:unknown"
        );
        assert_eq!(weather_counter(WeatherCondition::Unknown), "weather:unknown");
        assert_eq!(temperature_samples(Municipality::Unknown), "temperatures:unknown");
    }
}
