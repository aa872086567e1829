//! Daytime profiles: time-of-day lighting configurations.
//!
//! A zone carries a [`ProfileSet`]: profiles ordered by start time and
//! treated as a circular sequence. The active profile is the one with the
//! latest start time at or before now, wrapping to the last one before the
//! first start of the day.

use std::collections::HashSet;
use std::time::Duration;

use chrono::NaiveTime;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::time::{is_time_between, parse_time_of_day};

/// Brightness used when a profile does not say.
pub const DEFAULT_LIGHT_SETTING: u8 = 100;

/// What a profile turns the lights into.
///
/// Resolved once when the profile is built, never re-inspected from raw
/// configuration at dispatch time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum LightTarget {
    /// A host scene reference (`scene.reading`), activated once per light.
    Scene(String),
    /// A scene of a vendor scene group, activated on lights supporting it.
    GroupScene(String),
    /// A name that is neither a scene nor a group scene; lights are simply turned on.
    Named(String),
    /// Brightness 0: selecting this profile turns the lights off.
    Off,
    /// Brightness percentage, 1–100.
    Brightness(u8),
}

impl LightTarget {
    /// Resolve a raw configuration value.
    ///
    /// `group_capable` tells whether any light of the zone is a scene group,
    /// which turns a plain string into a [`GroupScene`](Self::GroupScene).
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidLightTarget`] for integers outside 0–100
    /// and for any value that is neither an integer nor a string.
    pub fn resolve(
        profile: &str,
        raw: Option<&serde_json::Value>,
        group_capable: bool,
    ) -> Result<Self, ConfigError> {
        let invalid = |value: &serde_json::Value| ConfigError::InvalidLightTarget {
            profile: profile.to_string(),
            value: value.to_string(),
        };

        match raw {
            None => Ok(Self::Brightness(DEFAULT_LIGHT_SETTING)),
            Some(serde_json::Value::String(name)) if name.starts_with("scene.") => {
                Ok(Self::Scene(name.clone()))
            }
            Some(serde_json::Value::String(name)) if group_capable => {
                Ok(Self::GroupScene(name.clone()))
            }
            Some(serde_json::Value::String(name)) => Ok(Self::Named(name.clone())),
            Some(value @ serde_json::Value::Number(number)) => match number.as_u64() {
                Some(0) => Ok(Self::Off),
                Some(pct @ 1..=100) => u8::try_from(pct)
                    .map(Self::Brightness)
                    .map_err(|_| invalid(value)),
                _ => Err(invalid(value)),
            },
            Some(value) => Err(invalid(value)),
        }
    }
}

impl std::fmt::Display for LightTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Scene(name) => write!(f, "scene: {}", name.trim_start_matches("scene.")),
            Self::GroupScene(name) => write!(f, "group scene: {name}"),
            Self::Named(name) => write!(f, "scene: {name}"),
            Self::Off => f.write_str("brightness: 0%"),
            Self::Brightness(pct) => write!(f, "brightness: {pct}%"),
        }
    }
}

/// One profile definition as written in configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProfileDefinition {
    /// `HH:MM` or `HH:MM:SS`.
    pub starttime: Option<String>,
    pub name: Option<String>,
    /// Integer brightness percentage or a scene name.
    pub light: Option<serde_json::Value>,
    /// Inactivity delay in seconds; the zone default applies when absent.
    pub delay: Option<u64>,
}

impl ProfileDefinition {
    /// Shorthand used by the built-in defaults and tests.
    #[must_use]
    pub fn new(starttime: &str, name: &str, light: impl Into<serde_json::Value>) -> Self {
        Self {
            starttime: Some(starttime.to_string()),
            name: Some(name.to_string()),
            light: Some(light.into()),
            delay: None,
        }
    }

    #[must_use]
    pub fn with_delay(mut self, seconds: u64) -> Self {
        self.delay = Some(seconds);
        self
    }
}

/// A fully resolved time-of-day lighting configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DaytimeProfile {
    pub name: String,
    pub start: NaiveTime,
    /// Inactivity timeout before auto-off; zero means never auto-off.
    pub delay: Duration,
    pub target: LightTarget,
}

/// The profiles of one zone, ordered by start time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileSet {
    profiles: Vec<DaytimeProfile>,
}

impl ProfileSet {
    /// Build and validate the profiles of a zone.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] when the list is empty, a start time is
    /// missing, unparsable or duplicated, or a light target is invalid.
    pub fn build(
        definitions: &[ProfileDefinition],
        default_delay: u64,
        group_capable: bool,
    ) -> Result<Self, ConfigError> {
        if definitions.is_empty() {
            return Err(ConfigError::NoProfiles);
        }

        let mut starts = HashSet::new();
        let mut profiles = Vec::with_capacity(definitions.len());

        for (idx, definition) in definitions.iter().enumerate() {
            let name = definition
                .name
                .clone()
                .unwrap_or_else(|| format!("daytime_{idx}"));

            let raw_start = definition
                .starttime
                .as_deref()
                .ok_or_else(|| ConfigError::MissingStartTime {
                    profile: name.clone(),
                })?;
            let start =
                parse_time_of_day(raw_start).ok_or_else(|| ConfigError::InvalidStartTime {
                    profile: name.clone(),
                    value: raw_start.to_string(),
                })?;
            if !starts.insert(start) {
                return Err(ConfigError::DuplicateStartTime { start });
            }

            let target = LightTarget::resolve(&name, definition.light.as_ref(), group_capable)?;

            profiles.push(DaytimeProfile {
                name,
                start,
                delay: Duration::from_secs(definition.delay.unwrap_or(default_delay)),
                target,
            });
        }

        profiles.sort_by_key(|profile| profile.start);
        Ok(Self { profiles })
    }

    /// Index of the profile active at `now`.
    #[must_use]
    pub fn active_at(&self, now: NaiveTime) -> usize {
        let count = self.profiles.len();
        (0..count)
            .find(|&idx| {
                let next = (idx + 1) % count;
                is_time_between(now, self.profiles[idx].start, self.profiles[next].start)
            })
            .unwrap_or(count - 1)
    }

    /// Profile at `index`, if any.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&DaytimeProfile> {
        self.profiles.get(index)
    }

    /// Iterate profiles in start-time order.
    pub fn iter(&self) -> impl Iterator<Item = &DaytimeProfile> {
        self.profiles.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }
}

impl std::ops::Index<usize> for ProfileSet {
    type Output = DaytimeProfile;

    fn index(&self, index: usize) -> &Self::Output {
        &self.profiles[index]
    }
}
