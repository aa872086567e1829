//! Service call: a command sent to the automation host.
//!
//! Examples: `homeassistant/turn_on` with a brightness, `hue/hue_activate_scene`.

use serde::{Deserialize, Serialize};

/// Generic turn-on; also activates scenes when aimed at a `scene.` entity.
pub const TURN_ON: &str = "homeassistant/turn_on";
/// Generic turn-off.
pub const TURN_OFF: &str = "homeassistant/turn_off";
/// Vendor group-scene activation.
pub const ACTIVATE_GROUP_SCENE: &str = "hue/hue_activate_scene";

/// A single service invocation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceCall {
    /// `domain/service`, e.g. `homeassistant/turn_on`.
    pub service: String,
    /// Target entity, absent for services addressing something else (group scenes).
    pub entity_id: Option<String>,
    /// Additional parameters.
    #[serde(default)]
    pub data: serde_json::Map<String, serde_json::Value>,
}

impl ServiceCall {
    /// Build a call targeting one entity.
    #[must_use]
    pub fn new(service: impl Into<String>, entity_id: impl Into<String>) -> Self {
        Self {
            service: service.into(),
            entity_id: Some(entity_id.into()),
            data: serde_json::Map::new(),
        }
    }

    /// Plain turn-on (lights, switches, scenes).
    #[must_use]
    pub fn turn_on(entity_id: impl Into<String>) -> Self {
        Self::new(TURN_ON, entity_id)
    }

    /// Plain turn-off.
    #[must_use]
    pub fn turn_off(entity_id: impl Into<String>) -> Self {
        Self::new(TURN_OFF, entity_id)
    }

    /// Turn-on with a brightness on the 0–255 scale.
    #[must_use]
    pub fn set_brightness(entity_id: impl Into<String>, brightness: u8) -> Self {
        Self::turn_on(entity_id).with("brightness", brightness)
    }

    /// Activate the named scene of a vendor scene group.
    #[must_use]
    pub fn activate_group_scene(group_name: impl Into<String>, scene_name: impl Into<String>) -> Self {
        Self {
            service: ACTIVATE_GROUP_SCENE.to_string(),
            entity_id: None,
            data: serde_json::Map::new(),
        }
        .with("group_name", group_name.into())
        .with("scene_name", scene_name.into())
    }

    /// Attach a parameter.
    #[must_use]
    pub fn with(mut self, key: &str, value: impl Into<serde_json::Value>) -> Self {
        self.data.insert(key.to_string(), value.into());
        self
    }

    /// The `brightness` parameter, if any.
    #[must_use]
    pub fn brightness(&self) -> Option<u8> {
        self.data
            .get("brightness")
            .and_then(serde_json::Value::as_u64)
            .and_then(|b| u8::try_from(b).ok())
    }
}

impl std::fmt::Display for ServiceCall {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.entity_id {
            Some(entity_id) => write!(f, "{}({entity_id})", self.service),
            None => write!(f, "{}", self.service),
        }
    }
}
