//! # Sliding-Window Rate Limiter
//!
//! Per-client request counting over a fixed 60-second window. The
//! limiter is pure with respect to time: callers pass the current
//! timestamp in milliseconds, so tests never need a clock.
//!
//! The decision is modelled as a three-state enum and the caller
//! (the HTTP middleware) decides what to do with it; the limiter
//! itself never touches responses or logging.

use std::collections::HashMap;

/// Counting window, in milliseconds.
pub const WINDOW_MS: u64 = 60_000;

/// Requests allowed per client key per window.
pub const MAX_REQUESTS: u32 = 100;

/// Record count at which the stale-key sweep kicks in.
pub const DEFAULT_CAPACITY: usize = 4096;

/// Per-key counting state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateRecord {
    pub count: u32,
    pub window_start_ms: u64,
}

/// Outcome of a single request against the limiter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateDecision {
    /// First request from this key, or first after the window elapsed.
    /// The record was reset to count 1.
    Fresh,
    /// Within the window and under the threshold.
    WithinWindow { count: u32 },
    /// Within the window and over the threshold. The caller should
    /// terminate the request with a 429-equivalent outcome.
    Exceeded { count: u32 },
}

impl RateDecision {
    /// The count recorded for the request that produced this decision.
    pub fn count(&self) -> u32 {
        match self {
            RateDecision::Fresh => 1,
            RateDecision::WithinWindow { count } | RateDecision::Exceeded { count } => *count,
        }
    }

    pub fn is_exceeded(&self) -> bool {
        matches!(self, RateDecision::Exceeded { .. })
    }
}

/// Tracks one [`RateRecord`] per client key.
///
/// Stale keys are swept once the map grows past `capacity`, so memory
/// stays bounded even when client addresses never repeat.
#[derive(Debug)]
pub struct RateLimiter {
    records: HashMap<String, RateRecord>,
    capacity: usize,
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

impl RateLimiter {
    pub fn new(capacity: usize) -> Self {
        Self {
            records: HashMap::new(),
            capacity,
        }
    }

    /// Records one request for `key` at `now_ms` and decides its fate.
    ///
    /// Transition table:
    /// 1. no record                      -> reset to count 1, `Fresh`
    /// 2. window elapsed (> [`WINDOW_MS`]) -> reset to count 1, `Fresh`
    /// 3. otherwise                      -> increment; `Exceeded` once
    ///    the count passes [`MAX_REQUESTS`], else `WithinWindow`
    pub fn check(&mut self, key: &str, now_ms: u64) -> RateDecision {
        if let Some(record) = self.records.get_mut(key) {
            let elapsed = now_ms.saturating_sub(record.window_start_ms);
            if elapsed > WINDOW_MS {
                record.count = 1;
                record.window_start_ms = now_ms;
                return RateDecision::Fresh;
            }
            record.count += 1;
            if record.count > MAX_REQUESTS {
                return RateDecision::Exceeded { count: record.count };
            }
            return RateDecision::WithinWindow { count: record.count };
        }

        if self.records.len() >= self.capacity {
            self.evict_expired(now_ms);
        }
        self.records.insert(
            key.to_string(),
            RateRecord {
                count: 1,
                window_start_ms: now_ms,
            },
        );
        RateDecision::Fresh
    }

    /// Drops every record whose window has elapsed. Decisions are
    /// unaffected: an elapsed record would have been reset anyway.
    fn evict_expired(&mut self, now_ms: u64) {
        self.records
            .retain(|_, record| now_ms.saturating_sub(record.window_start_ms) <= WINDOW_MS);
    }

    /// Number of keys currently tracked.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
