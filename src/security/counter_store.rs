//! Fixed-window request counters.
//!
//! # Design Decisions
//! - The store is constructed explicitly and injected; nothing is global
//! - `hit` is a single increment-and-get under the key's shard lock, so
//!   concurrent requests of one key never lose an increment
//! - Expired records are replaced, not incremented
//! - Records are only removed by `sweep`, `clear` or `dispose`

use std::time::{Duration, SystemTime};

use dashmap::DashMap;

use crate::security::clock::deadline;

/// Counting window for one key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateRecord {
    pub count: u32,
    pub reset_time: SystemTime,
}

/// Outcome of one counted request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateDecision {
    pub allowed: bool,
    pub limit: u32,
    pub remaining: u32,
    pub reset_time: SystemTime,
}

/// Storage for [`RateRecord`]s.
///
/// Implementations must make `hit` atomic per key.
pub trait CounterStore: Send + Sync {
    /// Count one request for `key` against `limit` per `window`.
    fn hit(&self, key: &str, limit: u32, window: Duration, now: SystemTime) -> RateDecision;

    /// Drop records whose window has ended. Returns how many were removed.
    fn sweep(&self, now: SystemTime) -> usize;

    /// Drop every record.
    fn clear(&self);

    /// Number of tracked keys.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Process-local [`CounterStore`].
#[derive(Debug, Default)]
pub struct InMemoryCounterStore {
    records: DashMap<String, RateRecord>,
}

impl InMemoryCounterStore {
    pub fn new() -> Self {
        Self {
            records: DashMap::new(),
        }
    }

    /// Release all records at the end of the store's life.
    pub fn dispose(&self) {
        let dropped = self.records.len();
        self.records.clear();
        tracing::debug!(dropped, "Counter store disposed");
    }

    pub fn get(&self, key: &str) -> Option<RateRecord> {
        self.records.get(key).map(|r| *r.value())
    }
}

impl CounterStore for InMemoryCounterStore {
    fn hit(&self, key: &str, limit: u32, window: Duration, now: SystemTime) -> RateDecision {
        let mut entry = self
            .records
            .entry(key.to_string())
            .or_insert_with(|| RateRecord {
                count: 0,
                reset_time: deadline(now, window),
            });
        let record = entry.value_mut();

        if now >= record.reset_time {
            *record = RateRecord {
                count: 0,
                reset_time: deadline(now, window),
            };
        }

        if record.count >= limit {
            return RateDecision {
                allowed: false,
                limit,
                remaining: 0,
                reset_time: record.reset_time,
            };
        }

        record.count += 1;
        RateDecision {
            allowed: true,
            limit,
            remaining: limit - record.count,
            reset_time: record.reset_time,
        }
    }

    fn sweep(&self, now: SystemTime) -> usize {
        let before = self.records.len();
        self.records.retain(|_, record| now < record.reset_time);
        before.saturating_sub(self.records.len())
    }

    fn clear(&self) {
        self.records.clear();
    }

    fn len(&self) -> usize {
        self.records.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::time::UNIX_EPOCH;

    const WINDOW: Duration = Duration::from_secs(900);

    fn t(secs: u64) -> SystemTime {
        UNIX_EPOCH + Duration::from_secs(1_700_000_000 + secs)
    }

    #[test]
    fn test_remaining_counts_down_then_rejects() {
        let store = InMemoryCounterStore::new();
        for expected in (0..3).rev() {
            let d = store.hit("k", 3, WINDOW, t(0));
            assert!(d.allowed);
            assert_eq!(d.remaining, expected);
        }

        let d = store.hit("k", 3, WINDOW, t(1));
        assert!(!d.allowed);
        assert_eq!(d.remaining, 0);
        assert_eq!(d.reset_time, t(900));
        // Rejected requests do not extend the count.
        assert_eq!(store.get("k").unwrap().count, 3);
    }

    #[test]
    fn test_window_expiry_replaces_record() {
        let store = InMemoryCounterStore::new();
        store.hit("k", 1, WINDOW, t(0));
        assert!(!store.hit("k", 1, WINDOW, t(899)).allowed);

        let d = store.hit("k", 1, WINDOW, t(900));
        assert!(d.allowed);
        assert_eq!(d.reset_time, t(1800));
        assert_eq!(store.get("k").unwrap().count, 1);
    }

    #[test]
    fn test_keys_are_independent() {
        let store = InMemoryCounterStore::new();
        store.hit("a", 1, WINDOW, t(0));
        assert!(!store.hit("a", 1, WINDOW, t(0)).allowed);
        assert!(store.hit("b", 1, WINDOW, t(0)).allowed);
    }

    #[test]
    fn test_sweep_and_dispose() {
        let store = InMemoryCounterStore::new();
        store.hit("old", 5, Duration::from_secs(10), t(0));
        store.hit("new", 5, WINDOW, t(0));

        assert_eq!(store.sweep(t(10)), 1);
        assert!(store.get("old").is_none());
        assert_eq!(store.len(), 1);

        store.dispose();
        assert!(store.is_empty());
    }

    #[test]
    fn test_concurrent_hits_are_exact() {
        let store = Arc::new(InMemoryCounterStore::new());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let store = store.clone();
                std::thread::spawn(move || {
                    (0..50)
                        .filter(|_| store.hit("shared", 300, WINDOW, t(0)).allowed)
                        .count()
                })
            })
            .collect();

        let allowed: usize = handles.into_iter().map(|h| h.join().unwrap()).sum();
        assert_eq!(allowed, 300);
        assert_eq!(store.get("shared").unwrap().count, 300);
    }

    #[test]
    fn test_huge_window_does_not_overflow() {
        let store = InMemoryCounterStore::new();
        let decision = store.hit("k", 1, Duration::from_secs(u64::MAX), t(0));
        assert!(decision.allowed);
        assert!(decision.reset_time > t(0));
    }
}
