//! Zone runtime: one reactive loop per room.
//!
//! Each zone owns an [`OccupancyController`] and an unbounded event channel.
//! Host events, timer expiries and daytime transitions all arrive on that
//! channel and are handled strictly one after the other, so the controller
//! never needs a lock. Zones share nothing with each other.

use std::collections::BTreeSet;

use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;
use tokio_stream::StreamExt;
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::wrappers::errors::BroadcastStreamRecvError;
use tracing::{debug, error, info, warn};

use automoli_domain::error::AutomoliError;
use automoli_domain::event::HostEvent;
use automoli_domain::id::TimerId;
use automoli_domain::zone::ZoneConfig;

use crate::blockers::DisableRuleEvaluator;
use crate::controller::OccupancyController;
use crate::discovery::resolve_room;
use crate::ports::{Clock, CommandSink, EntityDiscovery, Scheduler, StateReader};
use crate::scheduler::TokioScheduler;

/// Everything a zone reacts to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ZoneEvent {
    /// An event reported by the host.
    Host(HostEvent),
    /// The inactivity timer with this id elapsed.
    TimerFired(TimerId),
    /// The daily transition to the profile at this index is due.
    DaytimeSwitch(usize),
    /// Stop the zone loop.
    Shutdown,
}

/// Handle to a running zone.
#[derive(Debug)]
pub struct ZoneHandle {
    name: String,
    sender: mpsc::UnboundedSender<ZoneEvent>,
    motion_sensors: BTreeSet<String>,
    task: JoinHandle<()>,
}

impl ZoneHandle {
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether `entity_id` is one of the zone's motion sensors.
    #[must_use]
    pub fn watches(&self, entity_id: &str) -> bool {
        self.motion_sensors.contains(entity_id)
    }

    /// Queue an event for the zone. Returns `false` once the zone stopped.
    pub fn send(&self, event: ZoneEvent) -> bool {
        self.sender.send(event).is_ok()
    }

    /// Forward a host event when it comes from one of the zone's sensors.
    pub fn forward(&self, event: &HostEvent) -> bool {
        if !self.watches(event.entity_id()) {
            return false;
        }
        self.send(ZoneEvent::Host(event.clone()))
    }

    /// Stop the zone and wait for its loop to finish.
    pub async fn shutdown(self) {
        self.send(ZoneEvent::Shutdown);
        if let Err(err) = self.task.await {
            error!(zone = %self.name, error = %err, "zone task failed");
        }
    }
}

/// Resolve a zone against the host and start its loop.
///
/// Must be called from within a tokio runtime.
///
/// # Errors
///
/// Returns [`AutomoliError::Config`] when the zone cannot be resolved: no
/// lights, no motion sensors, invalid profiles or disable rules. The zone
/// is not started in that case.
pub fn spawn_zone<H, C>(config: &ZoneConfig, host: H, clock: C) -> Result<ZoneHandle, AutomoliError>
where
    H: StateReader + CommandSink + EntityDiscovery + Clone + 'static,
    C: Clock + Clone + 'static,
{
    let room = resolve_room(config, &host)?;
    let rules = DisableRuleEvaluator::new(config.disable_rules()?);

    let (sender, receiver) = mpsc::unbounded_channel();
    let scheduler = TokioScheduler::new(sender.clone(), clock.clone());

    let name = room.name.clone();
    let motion_sensors = room.motion_sensors.clone();
    info!(
        zone = %name,
        lights = ?room.lights,
        motion = ?room.motion_sensors,
        humidity = ?room.humidity_sensors,
        illuminance = ?room.illuminance_sensors,
        rules = config.disable_switch_entities.len(),
        "zone resolved"
    );

    let mut controller = OccupancyController::new(room, host, scheduler)
        .with_rules(rules)
        .with_motion_mode(config.motion_mode())
        .with_fade_durations(config.fade_durations());
    controller.start(clock.now());

    let task = tokio::spawn(run(controller, receiver));
    Ok(ZoneHandle {
        name,
        sender,
        motion_sensors,
        task,
    })
}

async fn run<H, S>(
    mut controller: OccupancyController<H, S>,
    mut receiver: mpsc::UnboundedReceiver<ZoneEvent>,
) where
    H: StateReader + CommandSink + Clone + 'static,
    S: Scheduler,
{
    let zone = controller.room().name.clone();
    while let Some(event) = receiver.recv().await {
        if event == ZoneEvent::Shutdown {
            break;
        }
        debug!(zone = %zone, ?event, "zone event");
        if let Err(err) = controller.handle(event).await {
            error!(zone = %zone, error = %err, "failed to handle zone event");
        }
    }
    info!(zone = %zone, "zone stopped");
}

/// Fan host events out to the zones watching them, until the bus closes.
pub async fn route(receiver: broadcast::Receiver<HostEvent>, zones: &[ZoneHandle]) {
    let mut stream = BroadcastStream::new(receiver);
    while let Some(item) = stream.next().await {
        match item {
            Ok(event) => {
                for zone in zones {
                    zone.forward(&event);
                }
            }
            Err(BroadcastStreamRecvError::Lagged(skipped)) => {
                warn!(skipped, "event router lagged behind");
            }
        }
    }
}
