//! Room state: the live runtime state of one zone.
//!
//! Only the zone's reactive core writes to a [`RoomState`]; fade tasks never
//! touch it. That single-writer discipline is what lets it live without locks.

use std::collections::BTreeSet;

use crate::id::TimerId;
use crate::profile::{DaytimeProfile, ProfileSet};

/// Numeric limits for the environmental blockers.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Thresholds {
    /// Readings at or above this keep the lights on.
    pub humidity: Option<f64>,
    /// Readings at or above this keep the lights off.
    pub illuminance: Option<f64>,
}

/// Live state of one zone.
#[derive(Debug, Clone)]
pub struct RoomState {
    pub name: String,
    pub lights: BTreeSet<String>,
    pub motion_sensors: BTreeSet<String>,
    pub humidity_sensors: BTreeSet<String>,
    pub illuminance_sensors: BTreeSet<String>,
    pub thresholds: Thresholds,
    profiles: ProfileSet,
    active: usize,
    /// The pending auto-off timer. At most one per zone.
    pub timer: Option<TimerId>,
}

impl RoomState {
    /// Assemble the state of a zone. The first profile is active until the
    /// daytime scheduler resolves the real one.
    #[must_use]
    pub fn new(name: impl Into<String>, profiles: ProfileSet) -> Self {
        Self {
            name: name.into(),
            lights: BTreeSet::new(),
            motion_sensors: BTreeSet::new(),
            humidity_sensors: BTreeSet::new(),
            illuminance_sensors: BTreeSet::new(),
            thresholds: Thresholds::default(),
            profiles,
            active: 0,
            timer: None,
        }
    }

    /// The profile currently in effect.
    #[must_use]
    pub fn active_profile(&self) -> &DaytimeProfile {
        &self.profiles[self.active]
    }

    /// Index of the profile currently in effect.
    #[must_use]
    pub fn active_index(&self) -> usize {
        self.active
    }

    #[must_use]
    pub fn profiles(&self) -> &ProfileSet {
        &self.profiles
    }

    /// Replace the active profile. Returns the new profile, or `None` when
    /// `index` is out of range (the active profile is then left untouched).
    pub fn activate(&mut self, index: usize) -> Option<&DaytimeProfile> {
        if index >= self.profiles.len() {
            return None;
        }
        self.active = index;
        Some(self.active_profile())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::ProfileDefinition;

    fn room() -> RoomState {
        let profiles = ProfileSet::build(
            &[
                ProfileDefinition::new("07:00", "day", 100),
                ProfileDefinition::new("21:00", "night", 10),
            ],
            150,
            false,
        )
        .unwrap();
        RoomState::new("kitchen", profiles)
    }

    #[test]
    fn should_start_without_timer_on_first_profile() {
        let room = room();
        assert!(room.timer.is_none());
        assert_eq!(room.active_profile().name, "day");
    }

    #[test]
    fn should_switch_active_profile() {
        let mut room = room();
        assert_eq!(room.activate(1).map(|p| p.name.clone()), Some("night".into()));
        assert_eq!(room.active_index(), 1);
    }

    #[test]
    fn should_ignore_out_of_range_activation() {
        let mut room = room();
        assert!(room.activate(7).is_none());
        assert_eq!(room.active_index(), 0);
    }
}
