//! In-memory fakes of the ports, shared by the unit tests.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::future::Future;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::NaiveTime;

use automoli_domain::entity::{AttributeValue, BRIGHTNESS, EntityState, FRIENDLY_NAME};
use automoli_domain::error::{AutomoliError, NotFoundError};
use automoli_domain::id::TimerId;
use automoli_domain::profile::{ProfileDefinition, ProfileSet};
use automoli_domain::room::RoomState;
use automoli_domain::service::{ServiceCall, TURN_OFF, TURN_ON};

use crate::ports::{CommandSink, EntityDiscovery, Scheduler, StateReader};
use crate::zone::ZoneEvent;

// ── Fake host ──────────────────────────────────────────────────────

#[derive(Default)]
struct HostInner {
    states: BTreeMap<String, EntityState>,
    attributes: HashMap<(String, String), AttributeValue>,
    calls: Vec<ServiceCall>,
    fail_commands: bool,
}

/// Entity store + command recorder. Clones share the same store.
#[derive(Clone, Default)]
pub struct FakeHost {
    inner: Arc<Mutex<HostInner>>,
}

impl FakeHost {
    pub fn add(&self, entity_id: &str, state: &str, friendly_name: Option<&str>) {
        let mut inner = self.inner.lock().unwrap();
        inner
            .states
            .insert(entity_id.to_string(), EntityState::from(state));
        if let Some(name) = friendly_name {
            inner.attributes.insert(
                (entity_id.to_string(), FRIENDLY_NAME.to_string()),
                AttributeValue::String(name.to_string()),
            );
        }
    }

    pub fn set_state(&self, entity_id: &str, state: &str) {
        self.inner
            .lock()
            .unwrap()
            .states
            .insert(entity_id.to_string(), EntityState::from(state));
    }

    pub fn set_attribute(&self, entity_id: &str, attribute: &str, value: AttributeValue) {
        self.inner
            .lock()
            .unwrap()
            .attributes
            .insert((entity_id.to_string(), attribute.to_string()), value);
    }

    pub fn fail_commands(&self) {
        self.inner.lock().unwrap().fail_commands = true;
    }

    pub fn calls(&self) -> Vec<ServiceCall> {
        self.inner.lock().unwrap().calls.clone()
    }

    pub fn calls_for(&self, entity_id: &str) -> Vec<ServiceCall> {
        self.calls()
            .into_iter()
            .filter(|call| call.entity_id.as_deref() == Some(entity_id))
            .collect()
    }

    pub fn brightness(&self, entity_id: &str) -> Option<f64> {
        self.attribute(entity_id, BRIGHTNESS)
            .and_then(|value| value.as_f64())
    }
}

impl StateReader for FakeHost {
    fn state(&self, entity_id: &str) -> Option<EntityState> {
        self.inner.lock().unwrap().states.get(entity_id).cloned()
    }

    fn attribute(&self, entity_id: &str, attribute: &str) -> Option<AttributeValue> {
        self.inner
            .lock()
            .unwrap()
            .attributes
            .get(&(entity_id.to_string(), attribute.to_string()))
            .cloned()
    }
}

impl EntityDiscovery for FakeHost {
    fn entity_ids(&self) -> Vec<String> {
        self.inner.lock().unwrap().states.keys().cloned().collect()
    }
}

impl CommandSink for FakeHost {
    fn invoke(&self, call: ServiceCall) -> impl Future<Output = Result<(), AutomoliError>> + Send {
        let mut inner = self.inner.lock().unwrap();
        let result = if inner.fail_commands {
            Err(AutomoliError::NotFound(NotFoundError {
                entity: "Service",
                id: call.service.clone(),
            }))
        } else {
            if let Some(entity_id) = call.entity_id.clone() {
                let brightness = call.brightness();
                let state = match (call.service.as_str(), brightness) {
                    (TURN_ON, Some(0)) | (TURN_OFF, _) => Some(EntityState::Off),
                    (TURN_ON, _) => Some(EntityState::On),
                    _ => None,
                };
                if let Some(state) = state {
                    inner.states.insert(entity_id.clone(), state);
                }
                if let Some(b) = brightness {
                    inner.attributes.insert(
                        (entity_id, BRIGHTNESS.to_string()),
                        AttributeValue::Int(i64::from(b)),
                    );
                }
            }
            Ok(())
        };
        inner.calls.push(call);
        async move { result }
    }
}

// ── Fake scheduler ─────────────────────────────────────────────────

#[derive(Default)]
struct SchedulerInner {
    pending: HashSet<TimerId>,
    scheduled: Vec<(TimerId, Duration)>,
    daily: Vec<(NaiveTime, Duration, ZoneEvent)>,
    max_pending: usize,
}

/// Records timers instead of running them; tests fire them by hand.
#[derive(Clone, Default)]
pub struct FakeScheduler {
    inner: Arc<Mutex<SchedulerInner>>,
}

impl FakeScheduler {
    pub fn pending(&self) -> Vec<TimerId> {
        self.inner.lock().unwrap().pending.iter().copied().collect()
    }

    pub fn scheduled(&self) -> Vec<(TimerId, Duration)> {
        self.inner.lock().unwrap().scheduled.clone()
    }

    pub fn daily(&self) -> Vec<(NaiveTime, Duration, ZoneEvent)> {
        self.inner.lock().unwrap().daily.clone()
    }

    /// Highest number of simultaneously pending timers ever observed.
    pub fn max_pending(&self) -> usize {
        self.inner.lock().unwrap().max_pending
    }

    /// Mark a timer as fired and hand back the event the zone would receive.
    pub fn fire(&self, timer: TimerId) -> ZoneEvent {
        self.inner.lock().unwrap().pending.remove(&timer);
        ZoneEvent::TimerFired(timer)
    }
}

impl Scheduler for FakeScheduler {
    fn run_after(&self, delay: Duration) -> TimerId {
        let id = TimerId::new();
        let mut inner = self.inner.lock().unwrap();
        inner.pending.insert(id);
        inner.scheduled.push((id, delay));
        inner.max_pending = inner.max_pending.max(inner.pending.len());
        id
    }

    fn cancel(&self, timer: TimerId) {
        self.inner.lock().unwrap().pending.remove(&timer);
    }

    fn run_daily(&self, at: NaiveTime, jitter: Duration, event: ZoneEvent) {
        self.inner.lock().unwrap().daily.push((at, jitter, event));
    }
}

// ── Helpers ────────────────────────────────────────────────────────

/// A room named `test` with the given `(start, brightness, delay)` profiles.
pub fn room_with(profiles: &[(&str, u8, u64)]) -> RoomState {
    let definitions: Vec<_> = profiles
        .iter()
        .enumerate()
        .map(|(idx, (start, light, delay))| {
            ProfileDefinition::new(start, &format!("profile_{idx}"), *light).with_delay(*delay)
        })
        .collect();
    RoomState::new("test", ProfileSet::build(&definitions, 150, false).unwrap())
}
