//! Clock capability.
//!
//! Every component that measures time receives a `Clock` instead of reading
//! a global timer, so tests can substitute a virtual one.
//!
//! # Design Decisions
//! - Instants come from `tokio::time`, so `SystemClock` follows tokio's
//!   paused test clock as well
//! - `ManualClock` can move backwards to model clock anomalies; a shift
//!   past the range of `Instant` is dropped rather than clamped to the base

use std::sync::Mutex;
use std::time::Duration;

use serde::Serializer;
use tokio::time::Instant;

/// Source of the current time.
pub trait Clock: Send + Sync + 'static {
    fn now(&self) -> Instant;
}

/// Wall clock backed by the tokio timer.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Virtual clock moved explicitly by the caller.
#[derive(Debug)]
pub struct ManualClock {
    base: Instant,
    /// Signed offset from `base` in microseconds.
    offset_us: Mutex<i64>,
}

impl ManualClock {
    /// Create a clock frozen at the current tokio instant.
    pub fn new() -> Self {
        Self::starting_at(Instant::now())
    }

    pub fn starting_at(base: Instant) -> Self {
        Self {
            base,
            offset_us: Mutex::new(0),
        }
    }

    /// Move the clock forward.
    pub fn advance(&self, by: Duration) {
        self.shift(micros(by));
    }

    /// Move the clock backward.
    pub fn rewind(&self, by: Duration) {
        self.shift(-micros(by));
    }

    /// Apply `delta_us`, ignoring shifts that would leave the range of
    /// `Instant`; the clock then keeps its last representable reading.
    fn shift(&self, delta_us: i64) {
        let mut offset = self.offset_us.lock().unwrap_or_else(|e| e.into_inner());
        let target = offset.saturating_add(delta_us);
        if self.instant_at(target).is_some() {
            *offset = target;
        } else {
            tracing::debug!(offset_us = *offset, delta_us, "Manual clock shift out of range, ignored");
        }
    }

    fn instant_at(&self, offset_us: i64) -> Option<Instant> {
        let magnitude = Duration::from_micros(offset_us.unsigned_abs());
        if offset_us >= 0 {
            self.base.checked_add(magnitude)
        } else {
            self.base.checked_sub(magnitude)
        }
    }
}

/// Whole microseconds of `by`, saturating at `i64::MAX`.
fn micros(by: Duration) -> i64 {
    i64::try_from(by.as_micros()).unwrap_or(i64::MAX)
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        let offset = *self.offset_us.lock().unwrap_or_else(|e| e.into_inner());
        // shift only stores representable offsets
        self.instant_at(offset).unwrap_or(self.base)
    }
}

/// Serialize a duration as fractional milliseconds.
pub(crate) fn serialize_millis<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_f64(duration.as_secs_f64() * 1000.0)
}
