//! Daytime scheduling: which profile is active now, and when the next
//! transition happens.

use std::time::Duration;

use chrono::NaiveDateTime;

use automoli_domain::profile::ProfileSet;

use crate::ports::Scheduler;
use crate::zone::ZoneEvent;

/// Upper bound of the random advance applied to every daily transition, so
/// many zones sharing a start time do not all fire in the same instant.
pub const TRANSITION_JITTER: Duration = Duration::from_secs(10);

/// Registers the daily profile transitions of one zone.
#[derive(Debug, Clone, Copy)]
pub struct DaytimeScheduler {
    jitter: Duration,
}

impl Default for DaytimeScheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl DaytimeScheduler {
    #[must_use]
    pub fn new() -> Self {
        Self {
            jitter: TRANSITION_JITTER,
        }
    }

    /// Index of the profile active at `now`.
    #[must_use]
    pub fn initial(&self, profiles: &ProfileSet, now: NaiveDateTime) -> usize {
        profiles.active_at(now.time())
    }

    /// One daily callback per profile, delivering
    /// [`ZoneEvent::DaytimeSwitch`] with the profile's index.
    pub fn schedule<S: Scheduler>(&self, profiles: &ProfileSet, scheduler: &S) {
        for (idx, profile) in profiles.iter().enumerate() {
            scheduler.run_daily(profile.start, self.jitter, ZoneEvent::DaytimeSwitch(idx));
        }
    }
}
