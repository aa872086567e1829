//! # automoli-adapter-virtual
//!
//! In-memory automation host providing simulated devices for demos and
//! end-to-end tests. It implements every host port of `automoli-app`.
//!
//! ## Device semantics
//!
//! | Domain | Device | Behaviour |
//! |--------|--------|-----------|
//! | `light.` | [`VirtualLight`](devices::VirtualLight) | `turn_on` with optional `brightness` (0–255, 0 turns off), `turn_off`, `toggle` |
//! | `switch.` | [`VirtualSwitch`](devices::VirtualSwitch) | `turn_on` / `turn_off` / `toggle`, `brightness=0` turns off |
//! | `scene.` | [`VirtualScene`](devices::VirtualScene) | `turn_on` activates, state is the activation time |
//! | anything else | [`VirtualSensor`](devices::VirtualSensor) | read-only, state forced from outside |
//!
//! Group-scene activations turn on the light whose friendly name matches
//! the `group_name` parameter. Every state change is published as
//! [`HostEvent::StateChanged`].
//!
//! ## Dependency rule
//!
//! Depends on `automoli-app` (port traits) and `automoli-domain` only.

pub mod devices;

use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use tracing::debug;

use automoli_app::ports::{CommandSink, EntityDiscovery, EventPublisher, StateReader};
use automoli_domain::entity::{AttributeValue, Entity, EntityState};
use automoli_domain::error::{AutomoliError, NotFoundError};
use automoli_domain::event::HostEvent;
use automoli_domain::service::{ACTIVATE_GROUP_SCENE, ServiceCall};

use devices::VirtualDevice;

/// A state change produced by a service call or an outside stimulus.
struct Change {
    entity_id: String,
    old: EntityState,
    new: EntityState,
}

/// Simulated automation host.
pub struct VirtualHost<P> {
    devices: Mutex<BTreeMap<String, VirtualDevice>>,
    history: Mutex<Vec<ServiceCall>>,
    publisher: P,
}

impl<P> VirtualHost<P>
where
    P: EventPublisher + Send + Sync,
{
    /// Create an empty host publishing its events to `publisher`.
    #[must_use]
    pub fn new(publisher: P) -> Self {
        Self {
            devices: Mutex::new(BTreeMap::new()),
            history: Mutex::new(Vec::new()),
            publisher,
        }
    }

    /// Seed an entity.
    #[must_use]
    pub fn with_entity(self, entity: Entity) -> Self {
        self.insert(entity);
        self
    }

    /// Add or replace an entity without publishing anything.
    pub fn insert(&self, entity: Entity) {
        self.lock_devices()
            .insert(entity.entity_id.clone(), VirtualDevice::from_entity(entity));
    }

    /// Snapshot of one entity.
    #[must_use]
    pub fn entity(&self, entity_id: &str) -> Option<Entity> {
        self.lock_devices()
            .get(entity_id)
            .map(|device| device.entity().clone())
    }

    /// Snapshot of every entity, ordered by entity id.
    #[must_use]
    pub fn entities(&self) -> Vec<Entity> {
        self.lock_devices()
            .values()
            .map(|device| device.entity().clone())
            .collect()
    }

    /// Every service call received so far, in order.
    #[must_use]
    pub fn history(&self) -> Vec<ServiceCall> {
        self.history
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Force an entity's state from outside, as a physical sensor would.
    ///
    /// # Errors
    ///
    /// Returns [`AutomoliError::NotFound`] for unknown entities.
    pub async fn set_state(
        &self,
        entity_id: &str,
        state: impl Into<EntityState>,
    ) -> Result<(), AutomoliError> {
        let state = state.into();
        let change = {
            let mut devices = self.lock_devices();
            let device = devices.get_mut(entity_id).ok_or_else(|| not_found(entity_id))?;
            device.force_state(state.clone()).map(|old| Change {
                entity_id: entity_id.to_string(),
                old,
                new: state,
            })
        };
        self.publish(change.into_iter().collect()).await
    }

    /// Report a discrete motion pulse from `entity_id`.
    ///
    /// # Errors
    ///
    /// Returns [`AutomoliError::NotFound`] for unknown entities.
    pub async fn motion(&self, entity_id: &str) -> Result<(), AutomoliError> {
        if !self.lock_devices().contains_key(entity_id) {
            return Err(not_found(entity_id));
        }
        self.publisher
            .publish(HostEvent::Motion {
                entity_id: entity_id.to_string(),
            })
            .await
    }

    fn apply(&self, call: &ServiceCall) -> Result<Vec<Change>, AutomoliError> {
        let mut devices = self.lock_devices();

        let target = match (&call.entity_id, call.service.as_str()) {
            (Some(entity_id), _) => entity_id.clone(),
            (None, ACTIVATE_GROUP_SCENE) => {
                let group = call
                    .data
                    .get("group_name")
                    .and_then(|value| value.as_str())
                    .unwrap_or_default();
                devices
                    .iter()
                    .find(|(_, device)| {
                        matches!(device, VirtualDevice::Light(_))
                            && device.entity().friendly_name.as_deref() == Some(group)
                    })
                    .map(|(entity_id, _)| entity_id.clone())
                    .ok_or_else(|| NotFoundError {
                        entity: "Scene group",
                        id: group.to_string(),
                    })?
            }
            (None, service) => {
                debug!(service, "ignoring untargeted service call");
                return Ok(Vec::new());
            }
        };

        let device = devices.get_mut(&target).ok_or_else(|| not_found(&target))?;
        let effective = match &call.entity_id {
            Some(_) => call.clone(),
            None => ServiceCall::turn_on(target.clone()),
        };
        let change = device.handle_service(&effective).map(|old| Change {
            entity_id: target,
            old,
            new: device.entity().state.clone(),
        });
        Ok(change.into_iter().collect())
    }

    async fn publish(&self, changes: Vec<Change>) -> Result<(), AutomoliError> {
        for change in changes {
            debug!(entity = %change.entity_id, old = %change.old, new = %change.new, "state changed");
            self.publisher
                .publish(HostEvent::StateChanged {
                    entity_id: change.entity_id,
                    old: Some(change.old),
                    new: change.new,
                })
                .await?;
        }
        Ok(())
    }

    fn lock_devices(&self) -> MutexGuard<'_, BTreeMap<String, VirtualDevice>> {
        self.devices.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn not_found(entity_id: &str) -> AutomoliError {
    NotFoundError {
        entity: "Entity",
        id: entity_id.to_string(),
    }
    .into()
}

impl<P> StateReader for VirtualHost<P>
where
    P: EventPublisher + Send + Sync,
{
    fn state(&self, entity_id: &str) -> Option<EntityState> {
        self.lock_devices()
            .get(entity_id)
            .map(|device| device.entity().state.clone())
    }

    fn attribute(&self, entity_id: &str, attribute: &str) -> Option<AttributeValue> {
        self.lock_devices()
            .get(entity_id)
            .and_then(|device| device.entity().attribute(attribute))
    }
}

impl<P> EntityDiscovery for VirtualHost<P>
where
    P: EventPublisher + Send + Sync,
{
    fn entity_ids(&self) -> Vec<String> {
        self.lock_devices().keys().cloned().collect()
    }
}

impl<P> CommandSink for VirtualHost<P>
where
    P: EventPublisher + Send + Sync,
{
    async fn invoke(&self, call: ServiceCall) -> Result<(), AutomoliError> {
        debug!(%call, "service call");
        self.history
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(call.clone());
        let changes = self.apply(&call)?;
        self.publish(changes).await
    }
}
