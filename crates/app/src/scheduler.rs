//! Tokio-backed scheduling: timers and daily callbacks delivered as
//! [`ZoneEvent`]s on the zone's channel.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime, TimeDelta};
use rand::Rng;
use tokio::sync::mpsc;
use tokio::task::AbortHandle;

use automoli_domain::id::TimerId;
use automoli_domain::time::next_occurrence;

use crate::ports::{Clock, Scheduler};
use crate::zone::ZoneEvent;

/// [`Clock`] reading the local system time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        automoli_domain::time::now().naive_local()
    }
}

/// [`Scheduler`] spawning one tokio task per timer.
///
/// Must be used from within a tokio runtime. Dropping the scheduler aborts
/// every task it spawned.
pub struct TokioScheduler<C> {
    events: mpsc::UnboundedSender<ZoneEvent>,
    clock: C,
    timers: Mutex<HashMap<TimerId, AbortHandle>>,
    daily: Mutex<Vec<AbortHandle>>,
}

impl<C: Clock + Clone + 'static> TokioScheduler<C> {
    /// Create a scheduler delivering to `events`.
    #[must_use]
    pub fn new(events: mpsc::UnboundedSender<ZoneEvent>, clock: C) -> Self {
        Self {
            events,
            clock,
            timers: Mutex::new(HashMap::new()),
            daily: Mutex::new(Vec::new()),
        }
    }

    fn lock_timers(&self) -> MutexGuard<'_, HashMap<TimerId, AbortHandle>> {
        self.timers.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<C: Clock + Clone + 'static> Scheduler for TokioScheduler<C> {
    fn run_after(&self, delay: Duration) -> TimerId {
        let id = TimerId::new();
        let events = self.events.clone();
        let task = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let _ = events.send(ZoneEvent::TimerFired(id));
        });

        let mut timers = self.lock_timers();
        timers.retain(|_, handle| !handle.is_finished());
        timers.insert(id, task.abort_handle());
        id
    }

    fn cancel(&self, timer: TimerId) {
        if let Some(handle) = self.lock_timers().remove(&timer) {
            handle.abort();
        }
    }

    fn run_daily(&self, at: NaiveTime, jitter: Duration, event: ZoneEvent) {
        let events = self.events.clone();
        let clock = self.clock.clone();
        let task = tokio::spawn(async move {
            let mut last_fired: Option<NaiveDate> = None;
            loop {
                let now = clock.now();
                let mut target = next_occurrence(now, at);
                if last_fired == Some(target.date()) {
                    target += TimeDelta::days(1);
                }
                let fire_at = target - sample_jitter(jitter);
                let wait = (fire_at - now).to_std().unwrap_or(Duration::ZERO);
                tokio::time::sleep(wait).await;

                if events.send(event.clone()).is_err() {
                    break;
                }
                last_fired = Some(target.date());
            }
        });
        self.daily
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(task.abort_handle());
    }
}

impl<C> Drop for TokioScheduler<C> {
    fn drop(&mut self) {
        let timers = self.timers.get_mut().unwrap_or_else(PoisonError::into_inner);
        for handle in timers.values() {
            handle.abort();
        }
        let daily = self.daily.get_mut().unwrap_or_else(PoisonError::into_inner);
        for handle in daily.iter() {
            handle.abort();
        }
    }
}

/// A random offset in `[0, jitter]`, millisecond resolution.
fn sample_jitter(jitter: Duration) -> TimeDelta {
    let max = u64::try_from(jitter.as_millis()).unwrap_or(u64::MAX);
    if max == 0 {
        return TimeDelta::zero();
    }
    let millis = rand::thread_rng().gen_range(0..=max);
    TimeDelta::milliseconds(i64::try_from(millis).unwrap_or(i64::MAX))
}
