//! Event bus port: publish/subscribe for host events.

use std::future::Future;

use automoli_domain::error::AutomoliError;
use automoli_domain::event::HostEvent;

/// Publishes host events to interested subscribers.
pub trait EventPublisher {
    /// Publish an event to all current subscribers.
    fn publish(&self, event: HostEvent) -> impl Future<Output = Result<(), AutomoliError>> + Send;
}

impl<T: EventPublisher + Send + Sync> EventPublisher for std::sync::Arc<T> {
    fn publish(&self, event: HostEvent) -> impl Future<Output = Result<(), AutomoliError>> + Send {
        (**self).publish(event)
    }
}
