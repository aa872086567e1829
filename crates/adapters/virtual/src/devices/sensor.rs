//! Virtual sensor: motion, humidity, illuminance or anything else read-only.

use automoli_domain::entity::Entity;

/// A simulated read-only sensor.
///
/// Sensors do not respond to service calls; their state changes only when
/// forced from outside (the demo driver or a test).
#[derive(Debug, Clone)]
pub struct VirtualSensor {
    entity: Entity,
}

impl VirtualSensor {
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
}
