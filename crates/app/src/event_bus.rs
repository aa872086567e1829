//! In-process event bus backed by a tokio broadcast channel.

use std::future::Future;

use tokio::sync::broadcast;

use automoli_domain::error::AutomoliError;
use automoli_domain::event::HostEvent;

use crate::ports::EventPublisher;

/// In-process event bus using a tokio [`broadcast`] channel.
///
/// Publishing succeeds even when there are no active subscribers
/// (the event is simply dropped).
pub struct InProcessEventBus {
    sender: broadcast::Sender<HostEvent>,
}

impl InProcessEventBus {
    /// Create a new event bus with the given channel capacity.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Subscribe to events on this bus.
    ///
    /// Returns a receiver that will get all events published *after*
    /// the subscription is created.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<HostEvent> {
        self.sender.subscribe()
    }
}

impl EventPublisher for InProcessEventBus {
    fn publish(&self, event: HostEvent) -> impl Future<Output = Result<(), AutomoliError>> + Send {
        // broadcast::send fails only when there are zero receivers.
        let _ = self.sender.send(event);
        async { Ok(()) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn motion(entity_id: &str) -> HostEvent {
        HostEvent::Motion {
            entity_id: entity_id.to_string(),
        }
    }

    #[tokio::test]
    async fn should_deliver_event_to_multiple_subscribers() {
        let bus = InProcessEventBus::new(16);
        let mut rx1 = bus.subscribe();
        let mut rx2 = bus.subscribe();

        bus.publish(motion("binary_sensor.hall")).await.unwrap();

        assert_eq!(rx1.recv().await.unwrap(), motion("binary_sensor.hall"));
        assert_eq!(rx2.recv().await.unwrap(), motion("binary_sensor.hall"));
    }

    #[tokio::test]
    async fn should_succeed_when_no_subscribers() {
        let bus = InProcessEventBus::new(16);
        assert!(bus.publish(motion("binary_sensor.hall")).await.is_ok());
    }

    #[tokio::test]
    async fn should_not_deliver_events_published_before_subscription() {
        let bus = InProcessEventBus::new(16);
        bus.publish(motion("binary_sensor.early")).await.unwrap();

        let mut rx = bus.subscribe();
        bus.publish(motion("binary_sensor.late")).await.unwrap();

        assert_eq!(rx.recv().await.unwrap(), motion("binary_sensor.late"));
    }
}
