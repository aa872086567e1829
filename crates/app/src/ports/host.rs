//! Host ports: reading entity state and sending commands to the
//! automation host.
//!
//! State reads are synchronous: the host keeps a state cache and the
//! controller never suspends while evaluating blockers. Commands are
//! asynchronous and fire-and-forget from the controller's point of view;
//! their errors propagate to the caller and are logged there.

use std::future::Future;
use std::sync::Arc;

use automoli_domain::entity::{AttributeValue, EntityState};
use automoli_domain::error::AutomoliError;
use automoli_domain::service::ServiceCall;

/// Read access to the host's entity states.
pub trait StateReader: Send + Sync {
    /// Current state of an entity; `None` for unknown entities.
    fn state(&self, entity_id: &str) -> Option<EntityState>;

    /// Current value of an entity attribute; `None` when the entity or the
    /// attribute is absent.
    fn attribute(&self, entity_id: &str, attribute: &str) -> Option<AttributeValue>;

    /// Whether the host knows the entity.
    fn exists(&self, entity_id: &str) -> bool {
        self.state(entity_id).is_some()
    }
}

/// Delivers service calls to the host.
pub trait CommandSink: Send + Sync {
    /// Invoke a service.
    fn invoke(&self, call: ServiceCall) -> impl Future<Output = Result<(), AutomoliError>> + Send;
}

/// Lists the entities known to the host, for discovery by naming convention.
pub trait EntityDiscovery: Send + Sync {
    /// Every entity id the host knows.
    fn entity_ids(&self) -> Vec<String>;
}

impl<T: StateReader> StateReader for Arc<T> {
    fn state(&self, entity_id: &str) -> Option<EntityState> {
        (**self).state(entity_id)
    }

    fn attribute(&self, entity_id: &str, attribute: &str) -> Option<AttributeValue> {
        (**self).attribute(entity_id, attribute)
    }
}

impl<T: CommandSink> CommandSink for Arc<T> {
    fn invoke(&self, call: ServiceCall) -> impl Future<Output = Result<(), AutomoliError>> + Send {
        (**self).invoke(call)
    }
}

impl<T: EntityDiscovery> EntityDiscovery for Arc<T> {
    fn entity_ids(&self) -> Vec<String> {
        (**self).entity_ids()
    }
}
