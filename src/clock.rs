//! Time source abstraction for the workflow layer.
//!
//! Milestone dates and completion stamps are business state, so the current
//! time is injected rather than read ambiently. Production uses
//! [`SystemClock`]; tests inject a [`FixedClock`] for deterministic output.

use chrono::{DateTime, FixedOffset, Utc};

/// Source of the current time for timeline and lifecycle stamping.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<FixedOffset>;
}

/// Wall-clock time.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<FixedOffset> {
        Utc::now().fixed_offset()
    }
}

/// Clock pinned to a single instant, for tests.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<FixedOffset>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<FixedOffset> {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_clock_is_stable() {
        let instant = "2025-06-01T12:00:00+00:00"
            .parse::<DateTime<FixedOffset>>()
            .unwrap();
        let clock = FixedClock(instant);
        assert_eq!(clock.now(), instant);
        assert_eq!(clock.now(), clock.now());
    }
}
