//! Virtual device implementations: light, switch, scene, sensor.
//!
//! Every device wraps the [`Entity`] snapshot the host exposes and mutates
//! it in response to service calls.

mod light;
mod scene;
mod sensor;
mod switch;

pub use light::VirtualLight;
pub use scene::VirtualScene;
pub use sensor::VirtualSensor;
pub use switch::VirtualSwitch;

use automoli_domain::entity::{Entity, EntityState};
use automoli_domain::service::ServiceCall;

/// Wrapper enum for the concrete virtual device types.
#[derive(Debug, Clone)]
pub enum VirtualDevice {
    Light(VirtualLight),
    Switch(VirtualSwitch),
    Scene(VirtualScene),
    Sensor(VirtualSensor),
}

impl VirtualDevice {
    /// Pick the device type from the entity's domain. Anything that is not a
    /// light, switch or scene is a read-only sensor.
    #[must_use]
    pub fn from_entity(entity: Entity) -> Self {
        match entity.domain() {
            "light" => Self::Light(VirtualLight::new(entity)),
            "switch" => Self::Switch(VirtualSwitch::new(entity)),
            "scene" => Self::Scene(VirtualScene::new(entity)),
            _ => Self::Sensor(VirtualSensor::new(entity)),
        }
    }

    #[must_use]
    pub fn entity(&self) -> &Entity {
        match self {
            Self::Light(d) => d.entity(),
            Self::Switch(d) => d.entity(),
            Self::Scene(d) => d.entity(),
            Self::Sensor(d) => d.entity(),
        }
    }

    /// Apply a service call. Returns the previous state when the state changed.
    pub fn handle_service(&mut self, call: &ServiceCall) -> Option<EntityState> {
        match self {
            Self::Light(d) => d.handle_service(call),
            Self::Switch(d) => d.handle_service(call),
            Self::Scene(d) => d.handle_service(call),
            Self::Sensor(_) => None,
        }
    }

    /// Force a state from outside, as a physical sensor would. Returns the
    /// previous state when it changed.
    pub fn force_state(&mut self, state: EntityState) -> Option<EntityState> {
        let entity = match self {
            Self::Light(d) => d.entity_mut(),
            Self::Switch(d) => d.entity_mut(),
            Self::Scene(d) => d.entity_mut(),
            Self::Sensor(d) => d.entity_mut(),
        };
        transition(entity, state)
    }
}

/// Move `entity` to `state`, returning the old state when it differs.
pub(crate) fn transition(entity: &mut Entity, state: EntityState) -> Option<EntityState> {
    if entity.state == state {
        return None;
    }
    let old = entity.state.clone();
    entity.update_state(state, automoli_domain::time::now());
    Some(old)
}
