//! Point-in-time view of the server counters

/// Consistent snapshot of the request counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatsSnapshot {
    /// Total requests read
    pub total_requests: u64,

    /// Total bytes received
    pub bytes_received: u64,

    /// Total bytes sent through the response writer
    pub bytes_sent: u64,
}
