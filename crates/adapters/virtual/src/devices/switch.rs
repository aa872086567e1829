//! Virtual switch: responds to `turn_on`, `turn_off`, `toggle`.

use automoli_domain::entity::{Entity, EntityState};
use automoli_domain::service::ServiceCall;

use super::transition;

/// A simulated binary switch. Any non-zero brightness counts as on.
#[derive(Debug, Clone)]
pub struct VirtualSwitch {
    entity: Entity,
}

impl VirtualSwitch {
    #[must_use]
    pub fn new(entity: Entity) -> Self {
        Self { entity }
    }

    #[must_use]
    pub fn entity(&self) -> &Entity {
        &self.entity
    }

    pub(crate) fn entity_mut(&mut self) -> &mut Entity {
        &mut self.entity
    }

    /// Apply a service call, returning the previous state when it changed.
    pub fn handle_service(&mut self, call: &ServiceCall) -> Option<EntityState> {
        let service = call.service.rsplit('/').next().unwrap_or_default();
        let next = match (service, call.brightness()) {
            ("turn_on", Some(0)) | ("turn_off", _) => EntityState::Off,
            ("turn_on", _) => EntityState::On,
            ("toggle", _) if self.entity.state == EntityState::On => EntityState::Off,
            ("toggle", _) => EntityState::On,
            _ => return None,
        };
        transition(&mut self.entity, next)
    }
}
