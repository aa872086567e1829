//! Virtual scene: remembers when it was last activated.

use automoli_domain::entity::{Entity, EntityState};
use automoli_domain::service::ServiceCall;
use automoli_domain::time::now;

use super::transition;

/// A simulated scene. Its state is the time of the last activation.
#[derive(Debug, Clone)]
pub struct VirtualScene {
    entity: Entity,
    activations: u32,
}

impl VirtualScene {
    #[must_use]
    pub fn new(entity: Entity) -> Self {
        Self {
            entity,
            activations: 0,
        }
    }

    #[must_use]
    pub fn entity(&self) -> &Entity {
        &self.entity
    }

    pub(crate) fn entity_mut(&mut self) -> &mut Entity {
        &mut self.entity
    }

    #[must_use]
    pub fn activations(&self) -> u32 {
        self.activations
    }

    /// Activate on `turn_on`; everything else is ignored.
    pub fn handle_service(&mut self, call: &ServiceCall) -> Option<EntityState> {
        if !call.service.ends_with("/turn_on") {
            return None;
        }
        self.activations += 1;
        transition(
            &mut self.entity,
            EntityState::Custom(now().to_rfc3339()),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_count_activations() {
        let mut scene = VirtualScene::new(Entity::builder().entity_id("scene.reading").build());
        assert!(scene.handle_service(&ServiceCall::turn_on("scene.reading")).is_some());
        scene.handle_service(&ServiceCall::turn_off("scene.reading"));
        assert_eq!(scene.activations(), 1);
        assert!(matches!(scene.entity().state, EntityState::Custom(_)));
    }
}
