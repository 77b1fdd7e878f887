//! Running request statistics for an analyzer.

use serde::{Deserialize, Serialize};
use std::sync::{Mutex, PoisonError};

/// Snapshot of analyzer statistics.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Stats {
    /// Every `analyze_image` call, cache hits included
    pub total_requests: u64,

    /// Calls answered by the requested backend
    pub successful: u64,

    /// Calls whose backend failed or whose input was unreadable
    pub failed: u64,

    /// Calls answered from the cache
    pub cache_hits: u64,

    /// Mean processing time of successful calls
    pub average_response_time_ms: f64,
}

/// Thread-safe stats recorder owned by the analyzer.
#[derive(Debug, Default)]
pub struct StatsTracker {
    inner: Mutex<Stats>,
}

impl StatsTracker {
    pub fn new() -> Self {
        Self::default()
    }

    fn update(&self, f: impl FnOnce(&mut Stats)) {
        let mut stats = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut stats);
    }

    pub fn record_request(&self) {
        self.update(|s| s.total_requests += 1);
    }

    pub fn record_cache_hit(&self) {
        self.update(|s| s.cache_hits += 1);
    }

    pub fn record_failure(&self) {
        self.update(|s| s.failed += 1);
    }

    /// Count a success and fold `elapsed_ms` into the running mean.
    pub fn record_success(&self, elapsed_ms: f64) {
        self.update(|s| {
            let before = s.successful as f64;
            s.average_response_time_ms =
                (s.average_response_time_ms * before + elapsed_ms) / (before + 1.0);
            s.successful += 1;
        });
    }

    pub fn snapshot(&self) -> Stats {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_running_average() {
        let tracker = StatsTracker::new();
        tracker.record_success(100.0);
        tracker.record_success(200.0);
        tracker.record_success(600.0);

        let stats = tracker.snapshot();
        assert_eq!(stats.successful, 3);
        assert!((stats.average_response_time_ms - 300.0).abs() < 1e-9);
    }

    #[test]
    fn test_failures_do_not_move_average() {
        let tracker = StatsTracker::new();
        tracker.record_success(50.0);
        tracker.record_failure();
        tracker.record_cache_hit();

        let stats = tracker.snapshot();
        assert_eq!(stats.failed, 1);
        assert_eq!(stats.cache_hits, 1);
        assert!((stats.average_response_time_ms - 50.0).abs() < 1e-9);
    }

    #[test]
    fn test_concurrent_request_counting() {
        let tracker = Arc::new(StatsTracker::new());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let tracker = tracker.clone();
                std::thread::spawn(move || {
                    for _ in 0..250 {
                        tracker.record_request();
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(tracker.snapshot().total_requests, 2000);
    }
}
