//! Zone configuration: the already-parsed settings of one room.

use std::collections::BTreeSet;
use std::time::Duration;

use serde::Deserialize;

use crate::disable_rule::DisableRule;
use crate::error::ConfigError;
use crate::profile::ProfileDefinition;

/// Inactivity delay, in seconds, applied when neither zone nor profile sets one.
pub const DEFAULT_DELAY: u64 = 150;
/// Fade duration, in seconds, for both directions.
pub const DEFAULT_FADE_DURATION: f64 = 3.0;

/// The profile table used when a zone defines none.
#[must_use]
pub fn default_daytimes() -> Vec<ProfileDefinition> {
    vec![
        ProfileDefinition::new("05:30", "morning", 25),
        ProfileDefinition::new("07:30", "day", 100),
        ProfileDefinition::new("20:30", "evening", 90),
        ProfileDefinition::new("22:30", "night", 0),
    ]
}

/// Settings of one zone.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ZoneConfig {
    /// Room token, also used for discovery.
    pub room: String,
    /// Explicit lights; discovered when empty.
    pub lights: BTreeSet<String>,
    /// Explicit motion sensors; discovered when empty.
    pub motion: BTreeSet<String>,
    pub humidity: BTreeSet<String>,
    pub illuminance: BTreeSet<String>,
    /// State reported by continuous motion sensors while motion is detected.
    pub motion_state_on: Option<String>,
    /// State reported by continuous motion sensors once motion cleared.
    pub motion_state_off: Option<String>,
    pub humidity_threshold: Option<f64>,
    pub illuminance_threshold: Option<f64>,
    /// Disable rule lines, `entity, state[; attribute, value]*`.
    pub disable_switch_entities: Vec<String>,
    /// Fade-up duration in seconds.
    pub fade_on: f64,
    /// Fade-down duration in seconds.
    pub fade_off: f64,
    /// Default inactivity delay in seconds.
    pub delay: u64,
    pub daytimes: Vec<ProfileDefinition>,
}

impl Default for ZoneConfig {
    fn default() -> Self {
        Self {
            room: String::new(),
            lights: BTreeSet::new(),
            motion: BTreeSet::new(),
            humidity: BTreeSet::new(),
            illuminance: BTreeSet::new(),
            motion_state_on: None,
            motion_state_off: None,
            humidity_threshold: None,
            illuminance_threshold: None,
            disable_switch_entities: Vec::new(),
            fade_on: DEFAULT_FADE_DURATION,
            fade_off: DEFAULT_FADE_DURATION,
            delay: DEFAULT_DELAY,
            daytimes: default_daytimes(),
        }
    }
}

/// How the zone's motion sensors report movement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MotionMode {
    /// One host event per detected movement.
    Pulse,
    /// On/off state sensors.
    States { on: String, off: String },
}

impl ZoneConfig {
    /// Create a config for `room` with every other field defaulted.
    #[must_use]
    pub fn for_room(room: impl Into<String>) -> Self {
        Self {
            room: room.into(),
            ..Self::default()
        }
    }

    /// The motion mode implied by the configured on/off states.
    ///
    /// Both states set selects state sensors; otherwise sensors are treated
    /// as pulse emitters.
    #[must_use]
    pub fn motion_mode(&self) -> MotionMode {
        match (&self.motion_state_on, &self.motion_state_off) {
            (Some(on), Some(off)) => MotionMode::States {
                on: on.clone(),
                off: off.clone(),
            },
            _ => MotionMode::Pulse,
        }
    }

    /// Parse the disable rule lines.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidDisableRule`] for the first malformed line.
    pub fn disable_rules(&self) -> Result<Vec<DisableRule>, ConfigError> {
        self.disable_switch_entities
            .iter()
            .map(|line| line.parse())
            .collect()
    }

    /// Fade-up and fade-down durations.
    #[must_use]
    pub fn fade_durations(&self) -> FadeDurations {
        FadeDurations {
            on: seconds(self.fade_on),
            off: seconds(self.fade_off),
        }
    }
}

/// Configured fade durations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FadeDurations {
    pub on: Duration,
    pub off: Duration,
}

fn seconds(value: f64) -> Duration {
    Duration::try_from_secs_f64(value).unwrap_or(Duration::ZERO)
}
