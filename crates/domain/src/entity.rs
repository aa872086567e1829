//! Entity: a single observable/controllable thing on the automation host.
//!
//! Entities are addressed by their host identifier (`light.kitchen`,
//! `binary_sensor.motion_sensor_kitchen`, …). The domain prefix before the
//! dot tells what kind of thing it is.

mod attribute_value;
mod state;

pub use attribute_value::AttributeValue;
pub use state::EntityState;

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::time::{Timestamp, now};

/// Attribute carrying the human-readable name.
pub const FRIENDLY_NAME: &str = "friendly_name";
/// Attribute carrying a light's brightness on the 0–255 scale.
pub const BRIGHTNESS: &str = "brightness";
/// Attribute set on lights that are vendor scene groups.
pub const IS_HUE_GROUP: &str = "is_hue_group";

/// Snapshot of an entity as held by the host.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Entity {
    pub entity_id: String,
    pub friendly_name: Option<String>,
    pub state: EntityState,
    pub attributes: HashMap<String, AttributeValue>,
    pub last_changed: Timestamp,
}

impl Entity {
    /// Create a builder for constructing an [`Entity`].
    #[must_use]
    pub fn builder() -> EntityBuilder {
        EntityBuilder::default()
    }

    /// The domain prefix of the entity id (`light` for `light.kitchen`).
    #[must_use]
    pub fn domain(&self) -> &str {
        entity_domain(&self.entity_id)
    }

    /// Look up an attribute by key. The friendly name is exposed as an
    /// attribute too.
    #[must_use]
    pub fn attribute(&self, key: &str) -> Option<AttributeValue> {
        if key == FRIENDLY_NAME {
            return self.friendly_name.clone().map(AttributeValue::String);
        }
        self.attributes.get(key).cloned()
    }

    /// Apply a new state, bumping `last_changed` only when it differs.
    pub fn update_state(&mut self, state: EntityState, ts: Timestamp) {
        if self.state != state {
            self.state = state;
            self.last_changed = ts;
        }
    }
}

/// The domain prefix of an entity id.
#[must_use]
pub fn entity_domain(entity_id: &str) -> &str {
    entity_id.split_once('.').map_or(entity_id, |(domain, _)| domain)
}

/// Whether the entity is a binary (switch-like, non-dimmable) light.
#[must_use]
pub fn is_binary_light(entity_id: &str) -> bool {
    entity_domain(entity_id) == "switch"
}

/// Step-by-step builder for [`Entity`].
#[derive(Debug, Default)]
pub struct EntityBuilder {
    entity_id: Option<String>,
    friendly_name: Option<String>,
    state: Option<EntityState>,
    attributes: HashMap<String, AttributeValue>,
}

impl EntityBuilder {
    #[must_use]
    pub fn entity_id(mut self, entity_id: impl Into<String>) -> Self {
        self.entity_id = Some(entity_id.into());
        self
    }

    #[must_use]
    pub fn friendly_name(mut self, name: impl Into<String>) -> Self {
        self.friendly_name = Some(name.into());
        self
    }

    #[must_use]
    pub fn state(mut self, state: impl Into<EntityState>) -> Self {
        self.state = Some(state.into());
        self
    }

    #[must_use]
    pub fn attribute(mut self, key: impl Into<String>, value: AttributeValue) -> Self {
        self.attributes.insert(key.into(), value);
        self
    }

    /// Consume the builder and return an [`Entity`].
    #[must_use]
    pub fn build(self) -> Entity {
        Entity {
            entity_id: self.entity_id.unwrap_or_default(),
            friendly_name: self.friendly_name,
            state: self.state.unwrap_or_default(),
            attributes: self.attributes,
            last_changed: now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_extract_domain_from_entity_id() {
        assert_eq!(entity_domain("light.kitchen"), "light");
        assert_eq!(entity_domain("noprefix"), "noprefix");
    }

    #[test]
    fn should_detect_binary_lights() {
        assert!(is_binary_light("switch.fan"));
        assert!(!is_binary_light("light.ceiling"));
    }

    #[test]
    fn should_expose_friendly_name_as_attribute() {
        let entity = Entity::builder()
            .entity_id("light.bath")
            .friendly_name("Bathroom")
            .build();
        assert_eq!(
            entity.attribute(FRIENDLY_NAME),
            Some(AttributeValue::String("Bathroom".into()))
        );
        assert_eq!(entity.attribute(BRIGHTNESS), None);
    }

    #[test]
    fn should_keep_last_changed_when_state_is_unchanged() {
        let mut entity = Entity::builder().entity_id("light.a").state("on").build();
        let before = entity.last_changed;
        entity.update_state(EntityState::On, now());
        assert_eq!(entity.last_changed, before);
    }

    #[test]
    fn should_bump_last_changed_on_transition() {
        let mut entity = Entity::builder().entity_id("light.a").state("off").build();
        let later = now() + chrono::TimeDelta::seconds(5);
        entity.update_state(EntityState::On, later);
        assert_eq!(entity.state, EntityState::On);
        assert_eq!(entity.last_changed, later);
    }
}
