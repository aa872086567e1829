//! Host events: things the automation host reports to the controller.

use serde::{Deserialize, Serialize};

use crate::entity::EntityState;

/// An event emitted by the host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum HostEvent {
    /// A discrete motion pulse from an event-style sensor.
    Motion { entity_id: String },
    /// An entity changed state.
    StateChanged {
        entity_id: String,
        old: Option<EntityState>,
        new: EntityState,
    },
}

impl HostEvent {
    /// The entity this event originates from.
    #[must_use]
    pub fn entity_id(&self) -> &str {
        match self {
            Self::Motion { entity_id } | Self::StateChanged { entity_id, .. } => entity_id,
        }
    }
}

impl std::fmt::Display for HostEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Motion { entity_id } => write!(f, "motion({entity_id})"),
            Self::StateChanged { entity_id, new, .. } => {
                write!(f, "state_changed({entity_id} -> {new})")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_expose_entity_id_of_every_variant() {
        let motion = HostEvent::Motion {
            entity_id: "binary_sensor.hall".into(),
        };
        let change = HostEvent::StateChanged {
            entity_id: "sensor.humidity_bath".into(),
            old: None,
            new: EntityState::Custom("61".into()),
        };
        assert_eq!(motion.entity_id(), "binary_sensor.hall");
        assert_eq!(change.entity_id(), "sensor.humidity_bath");
    }

    #[test]
    fn should_display_state_change() {
        let change = HostEvent::StateChanged {
            entity_id: "binary_sensor.hall".into(),
            old: Some(EntityState::Off),
            new: EntityState::On,
        };
        assert_eq!(change.to_string(), "state_changed(binary_sensor.hall -> on)");
    }

    #[test]
    fn should_deserialize_from_tagged_json() {
        let json = serde_json::json!({"type": "motion", "entity_id": "binary_sensor.x"});
        let event: HostEvent = serde_json::from_value(json).unwrap();
        assert!(matches!(event, HostEvent::Motion { entity_id } if entity_id == "binary_sensor.x"));
    }
}
