use chrono::{DateTime, Duration, Utc};
use parking_lot::Mutex;
use std::sync::Arc;

/// Source of the current time for deadline checks
///
/// Phases are re-derived from this clock on every call, so the engine never
/// caches a phase that could go stale.
pub trait ClockSource {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall clock for production use
#[derive(Debug, Clone, Default)]
pub struct SystemClock;

impl ClockSource for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Settable clock for tests and simulations
///
/// Clones share the same underlying instant, so a handle kept by the caller
/// can advance time for an engine that owns another handle.
#[derive(Debug, Clone)]
pub struct ManualClock {
    now: Arc<Mutex<DateTime<Utc>>>,
}

impl ManualClock {
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            now: Arc::new(Mutex::new(start)),
        }
    }

    pub fn set(&self, to: DateTime<Utc>) {
        *self.now.lock() = to;
    }

    pub fn advance(&self, by: Duration) {
        let mut now = self.now.lock();
        *now += by;
    }

    pub fn advance_secs(&self, secs: i64) {
        self.advance(Duration::seconds(secs));
    }
}

impl ClockSource for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manual_clock_handles_share_time() {
        let clock = ManualClock::new(Utc::now());
        let handle = clock.clone();

        let before = clock.now();
        handle.advance_secs(120);

        assert_eq!(clock.now(), before + Duration::seconds(120));
        assert_eq!(clock.now(), handle.now());
    }
}
