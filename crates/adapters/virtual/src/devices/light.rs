//! Virtual light: dimmable, responds to `turn_on` (with an optional
//! brightness), `turn_off` and `toggle`.

use automoli_domain::entity::{AttributeValue, BRIGHTNESS, Entity, EntityState};
use automoli_domain::service::ServiceCall;

use super::transition;

/// Brightness applied by a plain `turn_on` when the light has none yet.
const FULL_BRIGHTNESS: i64 = 255;

/// A simulated dimmable light.
#[derive(Debug, Clone)]
pub struct VirtualLight {
    entity: Entity,
    /// Last non-zero brightness, restored by a plain `turn_on`.
    last_brightness: i64,
}

impl VirtualLight {
    #[must_use]
    pub fn new(entity: Entity) -> Self {
        #[allow(clippy::cast_possible_truncation)]
        let last_brightness = entity
            .attributes
            .get(BRIGHTNESS)
            .and_then(AttributeValue::as_f64)
            .filter(|b| *b > 0.0)
            .map_or(FULL_BRIGHTNESS, |b| b as i64);
        Self {
            entity,
            last_brightness,
        }
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
        let brightness = match (service, call.brightness()) {
            ("turn_on", Some(b)) => i64::from(b),
            ("turn_on", None) => self.last_brightness,
            ("turn_off", _) => 0,
            ("toggle", _) if self.entity.state == EntityState::On => 0,
            ("toggle", _) => self.last_brightness,
            _ => return None,
        };
        self.set_brightness(brightness)
    }

    fn set_brightness(&mut self, brightness: i64) -> Option<EntityState> {
        self.entity
            .attributes
            .insert(BRIGHTNESS.to_string(), AttributeValue::Int(brightness));
        if brightness > 0 {
            self.last_brightness = brightness;
            transition(&mut self.entity, EntityState::On)
        } else {
            transition(&mut self.entity, EntityState::Off)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn light() -> VirtualLight {
        VirtualLight::new(
            Entity::builder()
                .entity_id("light.kitchen")
                .state(EntityState::Off)
                .build(),
        )
    }

    fn brightness(light: &VirtualLight) -> Option<AttributeValue> {
        light.entity().attribute(BRIGHTNESS)
    }

    #[test]
    fn should_turn_on_at_requested_brightness() {
        let mut light = light();
        let old = light.handle_service(&ServiceCall::set_brightness("light.kitchen", 120));
        assert_eq!(old, Some(EntityState::Off));
        assert_eq!(light.entity().state, EntityState::On);
        assert_eq!(brightness(&light), Some(AttributeValue::Int(120)));
    }

    #[test]
    fn should_turn_off_on_zero_brightness() {
        let mut light = light();
        light.handle_service(&ServiceCall::set_brightness("light.kitchen", 120));
        light.handle_service(&ServiceCall::set_brightness("light.kitchen", 0));
        assert_eq!(light.entity().state, EntityState::Off);
        assert_eq!(brightness(&light), Some(AttributeValue::Int(0)));
    }

    #[test]
    fn should_report_no_transition_while_dimming() {
        let mut light = light();
        light.handle_service(&ServiceCall::set_brightness("light.kitchen", 10));
        let old = light.handle_service(&ServiceCall::set_brightness("light.kitchen", 20));
        assert_eq!(old, None);
    }

    #[test]
    fn should_restore_last_brightness_on_plain_turn_on() {
        let mut light = light();
        light.handle_service(&ServiceCall::set_brightness("light.kitchen", 77));
        light.handle_service(&ServiceCall::turn_off("light.kitchen"));
        light.handle_service(&ServiceCall::turn_on("light.kitchen"));
        assert_eq!(brightness(&light), Some(AttributeValue::Int(77)));
    }

    #[test]
    fn should_toggle() {
        let mut light = light();
        light.handle_service(&ServiceCall::new("homeassistant/toggle", "light.kitchen"));
        assert_eq!(light.entity().state, EntityState::On);
        light.handle_service(&ServiceCall::new("homeassistant/toggle", "light.kitchen"));
        assert_eq!(light.entity().state, EntityState::Off);
    }

    #[test]
    fn should_ignore_unknown_service() {
        let mut light = light();
        assert_eq!(
            light.handle_service(&ServiceCall::new("light/set_color", "light.kitchen")),
            None
        );
        assert_eq!(light.entity().state, EntityState::Off);
    }
}
