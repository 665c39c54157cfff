// Fixed-window submission quota. The window is anchored to the first attempt
// after the previous one expired, not to a calendar boundary.

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info};

use crate::clock::Clock;
use crate::error::RateLimitError;
use crate::metrics::RATE_LIMITED_TOTAL;
use crate::storage::KeyValueStore;

// attempts allowed per window
pub const RATE_LIMIT: u64 = 10;
pub const RATE_WINDOW_MS: i64 = 86_400_000;
pub const STORAGE_KEY: &str = "rateLimitData";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quota {
    pub limit: u64,
    pub window_ms: i64,
}

impl Default for Quota {
    fn default() -> Self {
        Self {
            limit: RATE_LIMIT,
            window_ms: RATE_WINDOW_MS,
        }
    }
}

// Persisted shape: exactly {"count": n, "windowStart": ms}
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct RateLimitRecord {
    pub count: u64,
    pub window_start: i64,
}

impl RateLimitRecord {
    pub fn fresh(now: i64) -> Self {
        Self {
            count: 0,
            window_start: now,
        }
    }
}

// Read-only projection for display
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RateLimitStatus {
    pub remaining: u64,
    pub reset_at: i64,
}

pub struct RateLimiter {
    store: Arc<dyn KeyValueStore>,
    clock: Arc<dyn Clock>,
    quota: Quota,
    // serializes read-modify-write inside this process
    consume_lock: Mutex<()>,
}

impl RateLimiter {
    pub fn new(store: Arc<dyn KeyValueStore>, clock: Arc<dyn Clock>, quota: Quota) -> Self {
        Self {
            store,
            clock,
            quota,
            consume_lock: Mutex::new(()),
        }
    }

    // Nothing is written on the failure path: rejected attempts neither
    // extend the window nor push the count further.
    pub fn check_and_consume(&self) -> Result<(), RateLimitError> {
        let _guard = self.consume_lock.lock();
        let now = self.clock.now_ms();
        let mut record = self.current_record(now);

        if record.count >= self.quota.limit {
            RATE_LIMITED_TOTAL.inc();
            let reset_at = self.reset_at(&record);
            info!(count = record.count, reset_at, "Rate limit exceeded");
            return Err(RateLimitError::QuotaExceeded { reset_at });
        }

        record.count += 1;
        self.save(&record);
        debug!(
            count = record.count,
            limit = self.quota.limit,
            "Attempt recorded"
        );
        Ok(())
    }

    // Never writes
    pub fn inspect(&self) -> RateLimitStatus {
        let now = self.clock.now_ms();
        let record = self.current_record(now);
        RateLimitStatus {
            remaining: self.quota.limit.saturating_sub(record.count),
            reset_at: self.reset_at(&record),
        }
    }

    fn reset_at(&self, record: &RateLimitRecord) -> i64 {
        record.window_start.saturating_add(self.quota.window_ms)
    }

    // Stored record, or a fresh window when absent, malformed or expired
    fn current_record(&self, now: i64) -> RateLimitRecord {
        let record = match self.load(now) {
            Some(record) => record,
            None => RateLimitRecord::fresh(now),
        };

        // saturating: an ancient windowStart must read as expired, not wrap
        if now.saturating_sub(record.window_start) > self.quota.window_ms {
            debug!(window_start = record.window_start, "Window expired, starting a new one");
            return RateLimitRecord::fresh(now);
        }
        record
    }

    fn load(&self, now: i64) -> Option<RateLimitRecord> {
        let raw = self.store.get(STORAGE_KEY)?;
        match decode_record(&raw, now) {
            Ok(record) => Some(record),
            Err(reason) => {
                debug!(%reason, "Discarding malformed rate limit record");
                None
            }
        }
    }

    fn save(&self, record: &RateLimitRecord) {
        match serde_json::to_string(record) {
            Ok(json) => self.store.set(STORAGE_KEY, json),
            Err(e) => debug!(error = %e, "Failed to encode rate limit record"),
        }
    }
}

fn decode_record(raw: &str, now: i64) -> Result<RateLimitRecord, String> {
    let record: RateLimitRecord = serde_json::from_str(raw).map_err(|e| e.to_string())?;
    if record.window_start > now {
        return Err(format!("windowStart {} is in the future", record.window_start));
    }
    Ok(record)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::storage::MemoryStore;

    const T0: i64 = 1_700_000_000_000;

    fn limiter() -> (RateLimiter, Arc<MemoryStore>, Arc<ManualClock>) {
        let store = Arc::new(MemoryStore::new());
        let clock = Arc::new(ManualClock::new(T0));
        let limiter = RateLimiter::new(store.clone(), clock.clone(), Quota::default());
        (limiter, store, clock)
    }

    fn stored(store: &MemoryStore) -> RateLimitRecord {
        serde_json::from_str(&store.get(STORAGE_KEY).unwrap()).unwrap()
    }

    #[test]
    fn fresh_state_reports_full_quota() {
        let (limiter, store, _) = limiter();
        let status = limiter.inspect();
        assert_eq!(status.remaining, RATE_LIMIT);
        assert_eq!(status.reset_at, T0 + RATE_WINDOW_MS);
        // inspecting never creates the record
        assert!(store.get(STORAGE_KEY).is_none());
    }

    #[test]
    fn limit_calls_succeed_then_next_fails() {
        let (limiter, _, _) = limiter();
        for _ in 0..RATE_LIMIT {
            limiter.check_and_consume().unwrap();
        }
        assert_eq!(
            limiter.check_and_consume(),
            Err(RateLimitError::QuotaExceeded {
                reset_at: T0 + RATE_WINDOW_MS
            })
        );
    }

    #[test]
    fn rejected_attempt_does_not_touch_state() {
        let (limiter, store, clock) = limiter();
        for _ in 0..RATE_LIMIT {
            limiter.check_and_consume().unwrap();
        }
        let before = limiter.inspect();
        let raw_before = store.get(STORAGE_KEY);

        clock.advance(5_000);
        assert!(limiter.check_and_consume().is_err());

        assert_eq!(limiter.inspect(), before);
        assert_eq!(before.remaining, 0);
        assert_eq!(store.get(STORAGE_KEY), raw_before);
    }

    #[test]
    fn expired_window_grants_capacity_and_counts_the_call() {
        let (limiter, store, _) = limiter();
        let stale = RateLimitRecord {
            count: RATE_LIMIT,
            window_start: T0 - RATE_WINDOW_MS - 1,
        };
        store.set(STORAGE_KEY, serde_json::to_string(&stale).unwrap());

        limiter.check_and_consume().unwrap();

        let status = limiter.inspect();
        assert_eq!(status.remaining, RATE_LIMIT - 1);
        assert_eq!(status.reset_at, T0 + RATE_WINDOW_MS);
        assert_eq!(stored(&store), RateLimitRecord { count: 1, window_start: T0 });
    }

    #[test]
    fn window_is_still_open_at_exact_boundary() {
        let (limiter, store, clock) = limiter();
        let full = RateLimitRecord {
            count: RATE_LIMIT,
            window_start: T0,
        };
        store.set(STORAGE_KEY, serde_json::to_string(&full).unwrap());

        clock.set(T0 + RATE_WINDOW_MS);
        assert!(limiter.check_and_consume().is_err());
        clock.advance(1);
        assert!(limiter.check_and_consume().is_ok());
    }

    #[test]
    fn inspect_does_not_persist_expired_reset() {
        let (limiter, store, _) = limiter();
        let stale = r#"{"count":7,"windowStart":1}"#.to_string();
        store.set(STORAGE_KEY, stale.clone());

        let status = limiter.inspect();
        assert_eq!(status.remaining, RATE_LIMIT);
        assert_eq!(status.reset_at, T0 + RATE_WINDOW_MS);
        assert_eq!(store.get(STORAGE_KEY), Some(stale));
    }

    #[test]
    fn malformed_records_behave_like_fresh_state() {
        let cases = [
            "not json",
            "",
            "null",
            "[]",
            r#"{"count":3}"#,
            r#"{"windowStart":3}"#,
            r#"{"count":"3","windowStart":1}"#,
            r#"{"count":-1,"windowStart":1}"#,
            r#"{"count":1,"windowStart":1,"extra":true}"#,
            r#"{"count":1,"timestamp":1}"#,
        ];

        for raw in cases {
            let (limiter, store, _) = limiter();
            store.set(STORAGE_KEY, raw.to_string());
            assert!(limiter.check_and_consume().is_ok(), "case {raw:?}");
            assert_eq!(
                stored(&store),
                RateLimitRecord { count: 1, window_start: T0 },
                "case {raw:?}"
            );
        }
    }

    #[test]
    fn future_window_start_is_treated_as_corrupt() {
        let (limiter, store, _) = limiter();
        let future = RateLimitRecord {
            count: RATE_LIMIT,
            window_start: T0 + 60_000,
        };
        store.set(STORAGE_KEY, serde_json::to_string(&future).unwrap());

        assert!(limiter.check_and_consume().is_ok());
        assert_eq!(stored(&store), RateLimitRecord { count: 1, window_start: T0 });
    }

    #[test]
    fn ancient_window_start_is_expired() {
        let (limiter, store, _) = limiter();
        let ancient = RateLimitRecord {
            count: RATE_LIMIT,
            window_start: i64::MIN,
        };
        store.set(STORAGE_KEY, serde_json::to_string(&ancient).unwrap());

        let status = limiter.inspect();
        assert_eq!(status.remaining, RATE_LIMIT);
        assert_eq!(status.reset_at, T0 + RATE_WINDOW_MS);

        assert!(limiter.check_and_consume().is_ok());
        assert_eq!(stored(&store), RateLimitRecord { count: 1, window_start: T0 });
    }

    #[test]
    fn reset_time_saturates_near_i64_max() {
        let store = Arc::new(MemoryStore::new());
        let clock = Arc::new(ManualClock::new(i64::MAX));
        let limiter = RateLimiter::new(store.clone(), clock, Quota::default());

        limiter.check_and_consume().unwrap();
        assert_eq!(limiter.inspect().reset_at, i64::MAX);
    }

    #[test]
    fn repeated_inspect_is_stable() {
        let (limiter, _, clock) = limiter();
        limiter.check_and_consume().unwrap();
        let first = limiter.inspect();
        for _ in 0..5 {
            clock.advance(10);
            assert_eq!(limiter.inspect(), first);
        }
    }

    #[test]
    fn persisted_layout_uses_window_start_key() {
        let (limiter, store, _) = limiter();
        limiter.check_and_consume().unwrap();
        let raw: serde_json::Value = serde_json::from_str(&store.get(STORAGE_KEY).unwrap()).unwrap();
        assert_eq!(raw, serde_json::json!({"count": 1, "windowStart": T0}));
    }
}
