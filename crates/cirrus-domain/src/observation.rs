use crate::error::DomainResult;
use serde::{Deserialize, Serialize};

/// Municipalities covered by the reporting network, plus the `Unknown`
/// fallback that absorbs every unrecognized name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Municipality {
    Mixco,
    Guatemala,
    Amatitlan,
    Chinautla,
    #[serde(other)]
    Unknown,
}

impl Municipality {
    /// Total mapping from free-form input. Matching is trimmed and
    /// ASCII-case-insensitive; anything unrecognized (including the empty
    /// string) maps to `Unknown`. Never fails.
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "mixco" => Self::Mixco,
            "guatemala" => Self::Guatemala,
            "amatitlan" => Self::Amatitlan,
            "chinautla" => Self::Chinautla,
            _ => Self::Unknown,
        }
    }

    /// Canonical lowercase name, used on the wire and in store keys.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Mixco => "mixco",
            Self::Guatemala => "guatemala",
            Self::Amatitlan => "amatitlan",
            Self::Chinautla => "chinautla",
            Self::Unknown => "unknown",
        }
    }
}

/// Weather conditions a report may carry, with the same `Unknown` fallback
/// rule as [`Municipality`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WeatherCondition {
    Sunny,
    Cloudy,
    Rainy,
    Foggy,
    #[serde(other)]
    Unknown,
}

impl WeatherCondition {
    /// Total mapping from free-form input; unrecognized input yields
    /// `Unknown`, never an error.
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "sunny" => Self::Sunny,
            "cloudy" => Self::Cloudy,
            "rainy" => Self::Rainy,
            "foggy" => Self::Foggy,
            _ => Self::Unknown,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Sunny => "sunny",
            Self::Cloudy => "cloudy",
            Self::Rainy => "rainy",
            Self::Foggy => "foggy",
            Self::Unknown => "unknown",
        }
    }
}

/// Canonical weather event as it travels from the gateway through the writer
/// adapters onto both sinks. Enum values serialize as their string names so
/// consumers need no shared code table to decode.
///
/// Carries no timestamp: each consumer stamps its own receipt time when it
/// materializes the record, so the two sinks may disagree on the instant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeatherObservation {
    pub municipality: Municipality,
    pub temperature: i32,
    pub humidity: i32,
    pub weather: WeatherCondition,
}

impl WeatherObservation {
    /// Normalize a raw submission into the canonical event via the total
    /// enum mappings. No numeric range checks.
    pub fn normalize(municipality: &str, temperature: i32, humidity: i32, weather: &str) -> Self {
        Self {
            municipality: Municipality::from_name(municipality),
            temperature,
            humidity,
            weather: WeatherCondition::from_name(weather),
        }
    }

    /// Encode into the JSON wire payload published to both sinks.
    pub fn to_wire(&self) -> DomainResult<Vec<u8>> {
        Ok(serde_json::to_vec(self)?)
    }

    /// Decode a broker wire payload. Unrecognized enum names fall back to
    /// `Unknown`; only malformed JSON or a wrong shape is an error.
    pub fn from_wire(bytes: &[u8]) -> DomainResult<Self> {
        Ok(serde_json::from_slice(bytes)?)
    }
}

/// Observation as persisted in the expiring record keys and the time-ordered
/// record index, with the receipt timestamp stamped by the consumer that
/// stored it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObservationRecord {
    #[serde(flatten)]
    pub observation: WeatherObservation,
    pub observed_at: i64,
}

impl ObservationRecord {
    pub fn new(observation: WeatherObservation, observed_at: i64) -> Self {
        Self {
            observation,
            observed_at,
        }
    }

    pub fn to_json(&self) -> DomainResult<String> {
        Ok(serde_json::to_string(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_municipality_mapping_is_total() {
        assert_eq!(Municipality::from_name("mixco"), Municipality::Mixco);
        assert_eq!(Municipality::from_name("guatemala"), Municipality::Guatemala);
        assert_eq!(Municipality::from_name("amatitlan"), Municipality::Amatitlan);
        assert_eq!(Municipality::from_name("chinautla"), Municipality::Chinautla);

        // Case and surrounding whitespace are tolerated
        assert_eq!(Municipality::from_name("Chinautla"), Municipality::Chinautla);
        assert_eq!(Municipality::from_name("  MIXCO  "), Municipality::Mixco);

        // Anything unrecognized maps to Unknown, never an error
        assert_eq!(Municipality::from_name("atlantis"), Municipality::Unknown);
        assert_eq!(Municipality::from_name(""), Municipality::Unknown);
        assert_eq!(Municipality::from_name("   "), Municipality::Unknown);
    }

    #[test]
    fn test_weather_mapping_is_total() {
        assert_eq!(WeatherCondition::from_name("sunny"), WeatherCondition::Sunny);
        assert_eq!(WeatherCondition::from_name("cloudy"), WeatherCondition::Cloudy);
        assert_eq!(WeatherCondition::from_name("rainy"), WeatherCondition::Rainy);
        assert_eq!(WeatherCondition::from_name("foggy"), WeatherCondition::Foggy);
        assert_eq!(WeatherCondition::from_name("RAINY"), WeatherCondition::Rainy);

        assert_eq!(WeatherCondition::from_name("hailstorm"), WeatherCondition::Unknown);
        assert_eq!(WeatherCondition::from_name(""), WeatherCondition::Unknown);
    }

    #[test]
    fn test_names_are_stable_lowercase() {
        assert_eq!(Municipality::Chinautla.name(), "chinautla");
        assert_eq!(Municipality::Unknown.name(), "unknown");
        assert_eq!(WeatherCondition::Sunny.name(), "sunny");
        assert_eq!(WeatherCondition::Unknown.name(), "unknown");

        // name() round-trips through the mapping for every recognized value
        for m in [
            Municipality::Mixco,
            Municipality::Guatemala,
            Municipality::Amatitlan,
            Municipality::Chinautla,
            Municipality::Unknown,
        ] {
            assert_eq!(Municipality::from_name(m.name()), m);
        }
        for w in [
            WeatherCondition::Sunny,
            WeatherCondition::Cloudy,
            WeatherCondition::Rainy,
            WeatherCondition::Foggy,
            WeatherCondition::Unknown,
        ] {
            assert_eq!(WeatherCondition::from_name(w.name()), w);
        }
    }

    #[test]
    fn test_normalize_builds_canonical_event() {
        let observation = WeatherObservation::normalize("chinautla", 22, 60, "sunny");

        assert_eq!(observation.municipality, Municipality::Chinautla);
        assert_eq!(observation.temperature, 22);
        assert_eq!(observation.humidity, 60);
        assert_eq!(observation.weather, WeatherCondition::Sunny);
    }

    #[test]
    fn test_normalize_maps_unrecognized_input_to_unknown() {
        let observation = WeatherObservation::normalize("atlantis", -5, 130, "meteor shower");

        assert_eq!(observation.municipality, Municipality::Unknown);
        assert_eq!(observation.weather, WeatherCondition::Unknown);
        // Numeric fields pass through unvalidated
        assert_eq!(observation.temperature, -5);
        assert_eq!(observation.humidity, 130);
    }

    #[test]
    fn test_wire_payload_uses_string_enum_names() {
        let observation = WeatherObservation::normalize("chinautla", 22, 60, "sunny");

        let wire = observation.to_wire().unwrap();
        let value: serde_json::Value = serde_json::from_slice(&wire).unwrap();

        assert_eq!(value["municipality"], "chinautla");
        assert_eq!(value["temperature"], 22);
        assert_eq!(value["humidity"], 60);
        assert_eq!(value["weather"], "sunny");
    }

    #[test]
    fn test_from_wire_decodes_canonical_payload() {
        let wire = br#"{"municipality":"chinautla","temperature":22,"humidity":60,"weather":"sunny"}"#;

        let observation = WeatherObservation::from_wire(wire).unwrap();

        assert_eq!(observation, WeatherObservation::normalize("chinautla", 22, 60, "sunny"));
    }

    #[test]
    fn test_from_wire_falls_back_to_unknown_for_foreign_enum_names() {
        let wire = br#"{"municipality":"atlantis","temperature":1,"humidity":2,"weather":"sleet"}"#;

        let observation = WeatherObservation::from_wire(wire).unwrap();

        assert_eq!(observation.municipality, Municipality::Unknown);
        assert_eq!(observation.weather, WeatherCondition::Unknown);
    }

    #[test]
    fn test_from_wire_rejects_malformed_payloads() {
        assert!(WeatherObservation::from_wire(b"not json at all").is_err());
        assert!(WeatherObservation::from_wire(br#"{"municipality":"mixco"}"#).is_err());
        assert!(
            WeatherObservation::from_wire(
                br#"{"municipality":"mixco","temperature":"warm","humidity":1,"weather":"sunny"}"#
            )
            .is_err()
        );
    }

    #[test]
    fn test_record_json_carries_observation_fields_and_timestamp() {
        let record =
            ObservationRecord::new(WeatherObservation::normalize("mixco", 18, 75, "foggy"), 1_724_300_000);

        let json = record.to_json().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["municipality"], "mixco");
        assert_eq!(value["temperature"], 18);
        assert_eq!(value["humidity"], 75);
        assert_eq!(value["weather"], "foggy");
        assert_eq!(value["observed_at"], 1_724_300_000_i64);
    }
}
