use crate::clock::Clock;
use crate::store::AggregateStore;
use anyhow::Context;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use cirrus_domain::DomainResult;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::debug;

/// One member of a sorted set, ordered by score.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredMember {
    pub score: f64,
    pub member: String,
}

struct ExpiringValue {
    value: String,
    expires_at: DateTime<Utc>,
}

#[derive(Default)]
struct StoreState {
    counters: HashMap<String, i64>,
    lists: HashMap<String, Vec<String>>,
    records: HashMap<String, ExpiringValue>,
    sorted_sets: HashMap<String, Vec<ScoredMember>>,
}

/// In-memory implementation of AggregateStore using HashMaps, with lazy
/// expiry checked against the injected clock on access. Serves the
/// all-in-one deployment and tests; a Valkey-backed implementation slots in
/// behind the same trait for multi-process deployments.
pub struct MemoryAggregateStore {
    clock: Arc<dyn Clock>,
    state: RwLock<StoreState>,
}

impl MemoryAggregateStore {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            clock,
            state: RwLock::new(StoreState::default()),
        }
    }

    /// Current counter value, zero when never incremented.
    pub async fn counter(&self, key: &str) -> i64 {
        let state = self.state.read().await;
        state.counters.get(key).copied().unwrap_or(0)
    }

    /// Snapshot of the list at `key`, oldest first.
    pub async fn list(&self, key: &str) -> Vec<String> {
        let state = self.state.read().await;
        state.lists.get(key).cloned().unwrap_or_default()
    }

    /// Value of an expiring record key, `None` once expired. Expired entries
    /// are evicted on access.
    pub async fn record(&self, key: &str) -> Option<String> {
        let now = self.clock.now();
        let mut state = self.state.write().await;
        match state.records.get(key) {
            Some(record) if record.expires_at > now => Some(record.value.clone()),
            Some(_) => {
                debug!(key = %key, "Evicting expired record");
                state.records.remove(key);
                None
            }
            None => None,
        }
    }

    /// Snapshot of the sorted set at `key`, ascending by score.
    pub async fn sorted_set(&self, key: &str) -> Vec<ScoredMember> {
        let state = self.state.read().await;
        let mut members = state.sorted_sets.get(key).cloned().unwrap_or_default();
        members.sort_by(|a, b| a.score.total_cmp(&b.score));
        members
    }
}

#[async_trait]
impl AggregateStore for MemoryAggregateStore {
    async fn increment(&self, key: &str) -> DomainResult<i64> {
        let mut state = self.state.write().await;
        let counter = state.counters.entry(key.to_string()).or_insert(0);
        *counter += 1;
        Ok(*counter)
    }

    async fn append(&self, key: &str, value: String) -> DomainResult<()> {
        let mut state = self.state.write().await;
        state.lists.entry(key.to_string()).or_default().push(value);
        Ok(())
    }

    async fn set_with_ttl(&self, key: &str, value: String, ttl: Duration) -> DomainResult<()> {
        let ttl = chrono::Duration::from_std(ttl).context("TTL out of range")?;
        let expires_at = self.clock.now() + ttl;
        let mut state = self.state.write().await;
        state
            .records
            .insert(key.to_string(), ExpiringValue { value, expires_at });
        Ok(())
    }

    async fn sorted_set_add(&self, key: &str, score: f64, member: String) -> DomainResult<()> {
        let mut state = self.state.write().await;
        let members = state.sorted_sets.entry(key.to_string()).or_default();
        // Set semantics: re-adding an existing member updates its score
        match members.iter_mut().find(|m| m.member == member) {
            Some(existing) => existing.score = score,
            None => members.push(ScoredMember { score, member }),
        }
        Ok(())
    }

    async fn ping(&self) -> DomainResult<()> {
        Ok(())
    }
}
