use async_trait::async_trait;
use cirrus_domain::DomainResult;
use std::time::Duration;

/// Capability interface over the aggregation key-value store.
/// Every operation is individually atomic; nothing here offers multi-key
/// transactions, so callers sequencing several mutations accept partial
/// application when one of them fails.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait AggregateStore: Send + Sync {
    /// Increment the counter at `key` and return the post-increment value.
    /// Counters start at zero and only ever increase.
    async fn increment(&self, key: &str) -> DomainResult<i64>;

    /// Append `value` to the tail of the list at `key`.
    async fn append(&self, key: &str, value: String) -> DomainResult<()>;

    /// Set `key` to `value`, expiring after `ttl`.
    async fn set_with_ttl(&self, key: &str, value: String, ttl: Duration) -> DomainResult<()>;

    /// Insert `member` with `score` into the sorted set at `key`.
    async fn sorted_set_add(&self, key: &str, score: f64, member: String) -> DomainResult<()>;

    /// Liveness check, run once at startup before consumers begin.
    async fn ping(&self) -> DomainResult<()>;
}
