//! Entity state: the current operational state of an entity.

use serde::{Deserialize, Serialize};

/// State of a host entity.
///
/// Lights and switches report `on`/`off`; sensors report free-form values
/// such as `"21.5"` or `"detected"` which land in [`Custom`](Self::Custom).
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum EntityState {
    On,
    Off,
    #[default]
    Unknown,
    Unavailable,
    Custom(String),
}

impl EntityState {
    /// The textual form as reported by the host.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::On => "on",
            Self::Off => "off",
            Self::Unknown => "unknown",
            Self::Unavailable => "unavailable",
            Self::Custom(value) => value,
        }
    }
}

impl From<&str> for EntityState {
    fn from(value: &str) -> Self {
        match value {
            "on" => Self::On,
            "off" => Self::Off,
            "unknown" => Self::Unknown,
            "unavailable" => Self::Unavailable,
            other => Self::Custom(other.to_string()),
        }
    }
}

impl From<String> for EntityState {
    fn from(value: String) -> Self {
        Self::from(value.as_str())
    }
}

impl From<EntityState> for String {
    fn from(state: EntityState) -> Self {
        match state {
            EntityState::Custom(value) => value,
            other => other.as_str().to_string(),
        }
    }
}

impl std::fmt::Display for EntityState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
