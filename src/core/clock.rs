//! Wall-clock abstraction.
//!
//! Every component takes an `Arc<dyn Clock>` so elapsed-time arithmetic can
//! be driven by a [`ManualClock`] in tests.

use std::fmt;
use std::sync::atomic::{AtomicI64, Ordering};

use chrono::{DateTime, TimeZone, Utc};

/// Source of "now" in milliseconds since the UNIX epoch.
pub trait Clock: Send + Sync + fmt::Debug {
    /// Current wall-clock time in epoch milliseconds.
    fn now_ms(&self) -> i64;

    /// Current wall-clock time as a `DateTime`.
    fn now(&self) -> DateTime<Utc> {
        millis_to_datetime(self.now_ms())
    }
}

/// Production clock backed by `chrono::Utc::now`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_ms(&self) -> i64 {
        Utc::now().timestamp_millis()
    }
}

/// A clock that only moves when told to.
#[derive(Debug, Default)]
pub struct ManualClock {
    millis: AtomicI64,
}

impl ManualClock {
    /// Create a clock frozen at `start_ms`.
    #[must_use]
    pub const fn new(start_ms: i64) -> Self {
        Self {
            millis: AtomicI64::new(start_ms),
        }
    }

    /// Move the clock forward by `ms` milliseconds.
    pub fn advance_ms(&self, ms: i64) {
        self.millis.fetch_add(ms, Ordering::SeqCst);
    }

    /// Jump to an absolute time.
    pub fn set_ms(&self, ms: i64) {
        self.millis.store(ms, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> i64 {
        self.millis.load(Ordering::SeqCst)
    }
}

/// Convert epoch milliseconds to a UTC `DateTime`, clamping unrepresentable
/// values to the epoch.
#[must_use]
pub fn millis_to_datetime(ms: i64) -> DateTime<Utc> {
    Utc.timestamp_millis_opt(ms)
        .single()
        .unwrap_or(DateTime::UNIX_EPOCH)
}
