//! Common error types used across the workspace.
//!
//! Each layer defines its own typed errors and converts into
//! [`AutomoliError`] via `#[from]`.

use chrono::NaiveTime;

/// Top-level error for zone setup and runtime operations.
#[derive(Debug, thiserror::Error)]
pub enum AutomoliError {
    /// The zone configuration is unusable; the zone does not start.
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),

    /// A referenced entity does not exist on the host.
    #[error(transparent)]
    NotFound(#[from] NotFoundError),

    /// The host rejected or failed to deliver a service call.
    #[error("command dispatch failed: {0}")]
    Command(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// Configuration errors. All of them are fatal at zone initialisation.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum ConfigError {
    #[error("no lights available for room '{room}' (keyword '{keyword}')")]
    NoLights { room: String, keyword: &'static str },

    #[error("no motion sensors given or found for room '{room}' (keyword '{keyword}')")]
    NoMotionSensors { room: String, keyword: &'static str },

    #[error("missing start time in daytime '{profile}'")]
    MissingStartTime { profile: String },

    #[error("invalid start time '{value}' in daytime '{profile}'")]
    InvalidStartTime { profile: String, value: String },

    #[error("start times of all daytimes have to be unique, duplicate found: {start}")]
    DuplicateStartTime { start: NaiveTime },

    #[error("invalid brightness/scene '{value}' in daytime '{profile}'")]
    InvalidLightTarget { profile: String, value: String },

    #[error("invalid disable rule '{line}', expected 'entity, state[; attribute, value]*'")]
    InvalidDisableRule { line: String },

    #[error("at least one daytime is required")]
    NoProfiles,
}

/// A lookup that found nothing.
#[derive(Debug, thiserror::Error)]
#[error("{entity} '{id}' not found")]
pub struct NotFoundError {
    pub entity: &'static str,
    pub id: String,
}
