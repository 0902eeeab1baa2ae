//! Time and id sources injected into the service.
//!
//! Production code uses [`SystemClock`] and [`RandomIds`]. Tests swap in
//! [`StepClock`] and [`SequentialIds`] to get reproducible timestamps and
//! version ids.

use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;

use crate::types::VersionId;

/// Source of "now" for timestamps.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Source of fresh, unique version ids.
pub trait IdSource: Send + Sync {
    fn next_version_id(&self) -> VersionId;
}

/// Wall-clock time.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// UUID v4 version ids.
#[derive(Debug, Default, Clone, Copy)]
pub struct RandomIds;

impl IdSource for RandomIds {
    fn next_version_id(&self) -> VersionId {
        VersionId::new()
    }
}

/// A clock that starts at a fixed instant and advances by `step` on every read.
///
/// Meant for tests. Once the offset no longer fits a `DateTime` it stays at
/// [`DateTime::<Utc>::MAX_UTC`].
#[derive(Debug)]
pub struct StepClock {
    start: DateTime<Utc>,
    step: Duration,
    ticks: AtomicU64,
}

impl StepClock {
    pub fn new(start: DateTime<Utc>, step: Duration) -> Self {
        Self {
            start,
            step,
            ticks: AtomicU64::new(0),
        }
    }
}

impl Clock for StepClock {
    fn now(&self) -> DateTime<Utc> {
        let tick = self.ticks.fetch_add(1, Ordering::SeqCst);
        i32::try_from(tick)
            .ok()
            .and_then(|tick| self.step.checked_mul(tick))
            .and_then(|offset| self.start.checked_add_signed(offset))
            .unwrap_or(DateTime::<Utc>::MAX_UTC)
    }
}

/// Version ids built from a counter: 1, 2, 3, ...
#[derive(Debug, Default)]
pub struct SequentialIds {
    next: AtomicU64,
}

impl IdSource for SequentialIds {
    fn next_version_id(&self) -> VersionId {
        let n = self.next.fetch_add(1, Ordering::SeqCst) + 1;
        VersionId::from_uuid(Uuid::from_u128(u128::from(n)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn step_clock_advances() {
        let start = Utc::now();
        let clock = StepClock::new(start, Duration::seconds(1));
        assert_eq!(clock.now(), start);
        assert_eq!(clock.now(), start + Duration::seconds(1));
    }

    #[test]
    fn step_clock_saturates_instead_of_overflowing() {
        let start = Utc::now();
        let clock = StepClock::new(start, Duration::days(1_000_000));
        let readings: Vec<_> = (0..200).map(|_| clock.now()).collect();

        assert_eq!(readings[0], start);
        assert!(readings.windows(2).all(|pair| pair[0] <= pair[1]));
        assert_eq!(readings[199], DateTime::<Utc>::MAX_UTC);
    }

    #[test]
    fn sequential_ids_are_distinct() {
        let ids = SequentialIds::default();
        let a = ids.next_version_id();
        let b = ids.next_version_id();
        assert_ne!(a, b);
        assert_eq!(a.as_uuid().as_u128(), 1);
    }
}
