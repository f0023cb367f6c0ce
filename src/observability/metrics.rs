//! Engine counters
//!
//! Monotonic counters only. A registry lives for one engine; callers read a
//! snapshot after `run`.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

/// Atomic counters for one engine
#[derive(Debug, Default)]
pub struct MetricsRegistry {
    timesteps: AtomicU64,
    rules_evaluated: AtomicU64,
    rules_skipped: AtomicU64,
    groundings: AtomicU64,
    heads_rejected: AtomicU64,
    updates_scheduled: AtomicU64,
    updates_applied: AtomicU64,
    static_skips: AtomicU64,
    aggregator_failures: AtomicU64,
    inconsistencies: AtomicU64,
}

impl MetricsRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn increment_timesteps(&self) {
        self.timesteps.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_rules_evaluated(&self) {
        self.rules_evaluated.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_rules_skipped(&self) {
        self.rules_skipped.fetch_add(1, Ordering::Relaxed);
    }

    pub fn add_groundings(&self, n: u64) {
        self.groundings.fetch_add(n, Ordering::Relaxed);
    }

    /// A head group failed a clause threshold
    pub fn increment_heads_rejected(&self) {
        self.heads_rejected.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_updates_scheduled(&self) {
        self.updates_scheduled.fetch_add(1, Ordering::Relaxed);
    }

    pub fn add_updates_applied(&self, n: u64) {
        self.updates_applied.fetch_add(n, Ordering::Relaxed);
    }

    pub fn add_static_skips(&self, n: u64) {
        self.static_skips.fetch_add(n, Ordering::Relaxed);
    }

    pub fn increment_aggregator_failures(&self) {
        self.aggregator_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn add_inconsistencies(&self, n: u64) {
        self.inconsistencies.fetch_add(n, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            timesteps: self.timesteps.load(Ordering::Relaxed),
            rules_evaluated: self.rules_evaluated.load(Ordering::Relaxed),
            rules_skipped: self.rules_skipped.load(Ordering::Relaxed),
            groundings: self.groundings.load(Ordering::Relaxed),
            heads_rejected: self.heads_rejected.load(Ordering::Relaxed),
            updates_scheduled: self.updates_scheduled.load(Ordering::Relaxed),
            updates_applied: self.updates_applied.load(Ordering::Relaxed),
            static_skips: self.static_skips.load(Ordering::Relaxed),
            aggregator_failures: self.aggregator_failures.load(Ordering::Relaxed),
            inconsistencies: self.inconsistencies.load(Ordering::Relaxed),
        }
    }

    /// Snapshot as a JSON object string, keys in declaration order
    pub fn to_json(&self) -> String {
        serde_json::to_string(&self.snapshot()).unwrap_or_else(|_| "{}".to_string())
    }
}

/// A point-in-time copy of every counter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct MetricsSnapshot {
    pub timesteps: u64,
    pub rules_evaluated: u64,
    pub rules_skipped: u64,
    pub groundings: u64,
    pub heads_rejected: u64,
    pub updates_scheduled: u64,
    pub updates_applied: u64,
    pub static_skips: u64,
    pub aggregator_failures: u64,
    pub inconsistencies: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_registry_zeroed() {
        assert_eq!(MetricsRegistry::new().snapshot(), MetricsSnapshot::default());
    }

    #[test]
    fn test_counters() {
        let registry = MetricsRegistry::new();
        registry.increment_timesteps();
        registry.increment_timesteps();
        registry.increment_rules_evaluated();
        registry.increment_rules_skipped();
        registry.add_groundings(7);
        registry.increment_updates_scheduled();
        registry.add_updates_applied(3);
        registry.add_static_skips(2);
        registry.increment_aggregator_failures();

        let snap = registry.snapshot();
        assert_eq!(snap.timesteps, 2);
        assert_eq!(snap.rules_evaluated, 1);
        assert_eq!(snap.rules_skipped, 1);
        assert_eq!(snap.groundings, 7);
        assert_eq!(snap.updates_applied, 3);
        assert_eq!(snap.static_skips, 2);
        assert_eq!(snap.aggregator_failures, 1);
        assert_eq!(snap.inconsistencies, 0);
    }

    #[test]
    fn test_to_json() {
        let registry = MetricsRegistry::new();
        registry.add_groundings(12);
        let parsed: serde_json::Value = serde_json::from_str(&registry.to_json()).unwrap();
        assert_eq!(parsed["groundings"], 12);
        assert_eq!(parsed["timesteps"], 0);
    }

    #[test]
    fn test_thread_safety() {
        use std::sync::Arc;
        use std::thread;

        let registry = Arc::new(MetricsRegistry::new());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let reg = Arc::clone(&registry);
                thread::spawn(move || {
                    for _ in 0..100 {
                        reg.increment_updates_scheduled();
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(registry.snapshot().updates_scheduled, 800);
    }
}
