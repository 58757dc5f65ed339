//! Server statistics tracking

use minnow_common::StatsSnapshot;
use tokio::sync::Mutex;

#[derive(Debug, Default)]
struct Counters {
    total_requests: u64,
    bytes_received: u64,
    bytes_sent: u64,
}

/// Shared request counters.
///
/// Every read and update takes the same lock for its whole duration, so a
/// snapshot never sees a half-applied `record`.
#[derive(Debug, Default)]
pub struct StatsRegistry {
    counters: Mutex<Counters>,
}

impl StatsRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count one request and add the given byte deltas
    pub async fn record(&self, received: u64, sent: u64) {
        let mut counters = self.counters.lock().await;
        counters.total_requests = counters.total_requests.saturating_add(1);
        counters.bytes_received = counters.bytes_received.saturating_add(received);
        counters.bytes_sent = counters.bytes_sent.saturating_add(sent);
    }

    /// Add to bytes sent for a request that was already counted
    pub async fn record_sent(&self, sent: u64) {
        let mut counters = self.counters.lock().await;
        counters.bytes_sent = counters.bytes_sent.saturating_add(sent);
    }

    pub async fn snapshot(&self) -> StatsSnapshot {
        let counters = self.counters.lock().await;
        StatsSnapshot {
            total_requests: counters.total_requests,
            bytes_received: counters.bytes_received,
            bytes_sent: counters.bytes_sent,
        }
    }
}
