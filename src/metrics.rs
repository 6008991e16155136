use std::sync::atomic::{AtomicU64, Ordering};
use serde::Serialize;

#[derive(Debug, Default)]
pub struct Metrics {
    pub total_requests: AtomicU64,
    pub upstream_successes: AtomicU64,
    pub upstream_failures: AtomicU64,
    pub missing_credentials: AtomicU64,
    pub rejected: AtomicU64,
}

impl Metrics {
    pub fn new() -> Self {

        Self::default()

    }

    pub fn record_upstream_success(&self) {

        self.upstream_successes.fetch_add(1, Ordering::Relaxed);
        self.total_requests.fetch_add(1, Ordering::Relaxed);

    }

    pub fn record_upstream_failure(&self) {

        self.upstream_failures.fetch_add(1, Ordering::Relaxed);
        self.total_requests.fetch_add(1, Ordering::Relaxed);

    }

    pub fn record_missing_credential(&self) {

        self.missing_credentials.fetch_add(1, Ordering::Relaxed);
        self.total_requests.fetch_add(1, Ordering::Relaxed);

    }

    // method, body and provider gates
    pub fn record_rejected(&self) {

        self.rejected.fetch_add(1, Ordering::Relaxed);
        self.total_requests.fetch_add(1, Ordering::Relaxed);

    }

    pub fn snapshot(&self) -> MetricsSnapshot {

        let mut snapshot = MetricsSnapshot {
            total_requests: self.total_requests.load(Ordering::Relaxed),
            upstream_successes: self.upstream_successes.load(Ordering::Relaxed),
            upstream_failures: self.upstream_failures.load(Ordering::Relaxed),
            missing_credentials: self.missing_credentials.load(Ordering::Relaxed),
            rejected: self.rejected.load(Ordering::Relaxed),
            upstream_success_rate: 0.0,
        };
        snapshot.upstream_success_rate = snapshot.success_rate();
        snapshot

    }
}

#[derive(Debug, Serialize)]
pub struct MetricsSnapshot {
    pub total_requests: u64,
    pub upstream_successes: u64,
    pub upstream_failures: u64,
    pub missing_credentials: u64,
    pub rejected: u64,
    pub upstream_success_rate: f64,
}

impl MetricsSnapshot {
    pub fn upstream_calls(&self) -> u64 {

        self.upstream_successes + self.upstream_failures

    }

    /// Percentage of vendor calls that came back usable.
    pub fn success_rate(&self) -> f64 {

        let calls = self.upstream_calls();
        if calls == 0 {
            return 0.0;
        }
        (self.upstream_successes as f64 / calls as f64) * 100.0

    }
}
