use config::{Config, ConfigError, Environment};
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ServiceConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,

    // NATS configuration
    /// NATS server URL
    #[serde(default = "default_nats_url")]
    pub nats_url: String,

    /// Connection timeout per attempt in seconds
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,

    /// Startup connection attempts before giving up
    #[serde(default = "default_connect_max_attempts")]
    pub connect_max_attempts: u32,

    /// Delay between startup connection attempts in seconds
    #[serde(default = "default_connect_base_delay_secs")]
    pub connect_base_delay_secs: u64,

    /// Stream name for the log-style sink
    #[serde(default = "default_log_stream")]
    pub log_stream: String,

    /// Stream name for the queue-style sink
    #[serde(default = "default_queue_stream")]
    pub queue_stream: String,

    /// Durable consumer name on the log-style sink
    #[serde(default = "default_log_consumer_name")]
    pub log_consumer_name: String,

    /// Durable consumer name on the queue-style sink
    #[serde(default = "default_queue_consumer_name")]
    pub queue_consumer_name: String,

    /// Max wait per consumer poll in seconds
    #[serde(default = "default_poll_window_secs")]
    pub poll_window_secs: u64,

    // HTTP ingress configuration
    /// HTTP listen host
    #[serde(default = "default_http_host")]
    pub http_host: String,

    /// HTTP listen port
    #[serde(default = "default_http_port")]
    pub http_port: u16,

    /// Per-sink publish timeout for one submission in seconds
    #[serde(default = "default_dispatch_timeout_secs")]
    pub dispatch_timeout_secs: u64,

    // Aggregation configuration
    /// Lifetime of individual observation records in seconds
    #[serde(default = "default_record_ttl_secs")]
    pub record_ttl_secs: u64,

    /// Restrict aggregation to one municipality (empty = aggregate everything)
    #[serde(default = "default_scope_municipality")]
    pub scope_municipality: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

// NATS defaults
fn default_nats_url() -> String {
    "nats://localhost:4222".to_string()
}

fn default_connect_timeout_secs() -> u64 {
    5
}

fn default_connect_max_attempts() -> u32 {
    10
}

fn default_connect_base_delay_secs() -> u64 {
    5
}

fn default_log_stream() -> String {
    "weather_log".to_string()
}

fn default_queue_stream() -> String {
    "weather_queue".to_string()
}

fn default_log_consumer_name() -> String {
    "weather-log-aggregator".to_string()
}

fn default_queue_consumer_name() -> String {
    "weather-queue-aggregator".to_string()
}

fn default_poll_window_secs() -> u64 {
    5
}

// HTTP defaults
fn default_http_host() -> String {
    "0.0.0.0".to_string()
}

fn default_http_port() -> u16 {
    8080
}

fn default_dispatch_timeout_secs() -> u64 {
    5
}

// Aggregation defaults
fn default_record_ttl_secs() -> u64 {
    // 24 hours; 3600 reproduces the short-lived variant
    86400
}

fn default_scope_municipality() -> String {
    String::new()
}

impl ServiceConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Config::builder()
            .add_source(Environment::with_prefix("CIRRUS"))
            .build()?
            .try_deserialize()
    }

    /// The municipality scope as an option, with the empty string meaning
    /// no filter.
    pub fn scope(&self) -> Option<String> {
        let scope = self.scope_municipality.trim();
        if scope.is_empty() {
            None
        } else {
            Some(scope.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    // Mutex to ensure tests run serially and don't interfere with each other
    static TEST_LOCK: Mutex<()> = Mutex::new(());

    #[test]
    fn test_default_config() {
        let _lock = TEST_LOCK.lock().unwrap();

        // Clear any CIRRUS_ environment variables these assertions depend on
        std::env::remove_var("CIRRUS_LOG_LEVEL");
        std::env::remove_var("CIRRUS_HTTP_PORT");
        std::env::remove_var("CIRRUS_SCOPE_MUNICIPALITY");

        let config = ServiceConfig::from_env().unwrap();

        assert_eq!(config.log_level, "info");
        assert_eq!(config.nats_url, "nats://localhost:4222");
        assert_eq!(config.http_port, 8080);
        assert_eq!(config.dispatch_timeout_secs, 5);
        assert_eq!(config.connect_max_attempts, 10);
        assert_eq!(config.connect_base_delay_secs, 5);
        assert_eq!(config.record_ttl_secs, 86400);
        assert_eq!(config.log_stream, "weather_log");
        assert_eq!(config.queue_stream, "weather_queue");
        assert_eq!(config.scope(), None);
    }

    #[test]
    fn test_custom_config() {
        let _lock = TEST_LOCK.lock().unwrap();

        std::env::set_var("CIRRUS_LOG_LEVEL", "debug");
        std::env::set_var("CIRRUS_HTTP_PORT", "9090");
        std::env::set_var("CIRRUS_SCOPE_MUNICIPALITY", "chinautla");

        let config = ServiceConfig::from_env().unwrap();
        assert_eq!(config.log_level, "debug");
        assert_eq!(config.http_port, 9090);
        assert_eq!(config.scope(), Some("chinautla".to_string()));

        // Clean up
        std::env::remove_var("CIRRUS_LOG_LEVEL");
        std::env::remove_var("CIRRUS_HTTP_PORT");
        std::env::remove_var("CIRRUS_SCOPE_MUNICIPALITY");
    }

    #[test]
    fn test_blank_scope_means_no_filter() {
        let _lock = TEST_LOCK.lock().unwrap();

        std::env::set_var("CIRRUS_SCOPE_MUNICIPALITY", "   ");

        let config = ServiceConfig::from_env().unwrap();
        assert_eq!(config.scope(), None);

        std::env::remove_var("CIRRUS_SCOPE_MUNICIPALITY");
    }
}
