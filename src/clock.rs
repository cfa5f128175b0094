//! Time Source Module
//!
//! Millisecond clocks used by the cache to stamp and compare expiry times.

use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;

// == Time Source ==
/// Supplies the current time in milliseconds.
///
/// Implementations must be monotonically non-decreasing; expiry comparisons
/// assume time never goes backwards.
pub trait TimeSource {
    /// Returns the current time in milliseconds.
    fn now_millis(&self) -> i64;
}

// == Wall Clock ==
/// Reads the real wall clock (Unix milliseconds).
#[derive(Debug, Clone, Copy, Default)]
pub struct WallClock;

impl TimeSource for WallClock {
    fn now_millis(&self) -> i64 {
        chrono::Utc::now().timestamp_millis()
    }
}

// == Manual Clock ==
/// Deterministic clock for tests.
///
/// Every read advances the clock by one millisecond, so consecutive reads are
/// strictly increasing. Clones share the same counter, which lets a test keep
/// a handle and move time forward with [`ManualClock::advance`] while the
/// cache owns another.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    tick: Arc<AtomicI64>,
}

impl ManualClock {
    /// Creates a clock starting at zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a clock starting at `start` milliseconds.
    pub fn starting_at(start: i64) -> Self {
        Self {
            tick: Arc::new(AtomicI64::new(start)),
        }
    }

    /// Moves the clock forward by `millis`.
    pub fn advance(&self, millis: i64) {
        self.tick.fetch_add(millis, Ordering::SeqCst);
    }

    /// Moves the clock forward by whole seconds.
    pub fn advance_secs(&self, secs: i64) {
        self.advance(secs.saturating_mul(1000));
    }

    /// Returns the current tick without advancing it.
    pub fn current(&self) -> i64 {
        self.tick.load(Ordering::SeqCst)
    }
}

impl TimeSource for ManualClock {
    fn now_millis(&self) -> i64 {
        self.tick.fetch_add(1, Ordering::SeqCst) + 1
    }
}
