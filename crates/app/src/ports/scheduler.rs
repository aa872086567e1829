//! Scheduling ports: wall clock, one-shot timers and daily callbacks.

use std::sync::Arc;
use std::time::Duration;

use chrono::{NaiveDateTime, NaiveTime};

use automoli_domain::id::TimerId;

use crate::zone::ZoneEvent;

/// Source of local wall-clock time.
pub trait Clock: Send + Sync {
    fn now(&self) -> NaiveDateTime;
}

/// Delivers timed [`ZoneEvent`]s back to the zone that scheduled them.
pub trait Scheduler: Send + Sync {
    /// Schedule a one-shot timer. When it elapses the zone receives
    /// [`ZoneEvent::TimerFired`] carrying the returned id.
    fn run_after(&self, delay: Duration) -> TimerId;

    /// Cancel a timer. Cancelling an unknown or already fired timer is a no-op.
    fn cancel(&self, timer: TimerId);

    /// Deliver `event` every day at `at`, up to `jitter` early.
    fn run_daily(&self, at: NaiveTime, jitter: Duration, event: ZoneEvent);
}

impl<T: Clock> Clock for Arc<T> {
    fn now(&self) -> NaiveDateTime {
        (**self).now()
    }
}

impl<T: Scheduler> Scheduler for Arc<T> {
    fn run_after(&self, delay: Duration) -> TimerId {
        (**self).run_after(delay)
    }

    fn cancel(&self, timer: TimerId) {
        (**self).cancel(timer);
    }

    fn run_daily(&self, at: NaiveTime, jitter: Duration, event: ZoneEvent) {
        (**self).run_daily(at, jitter, event);
    }
}
