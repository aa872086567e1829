//! Occupancy controller: the per-zone state machine.
//!
//! Motion turns the lights on according to the active daytime profile and
//! (re)arms the inactivity timer; the timer firing turns them off again.
//! Disable rules veto both directions, illuminance vetoes turning on and
//! humidity postpones turning off.
//!
//! The controller is the only writer of its [`RoomState`]. Every handler runs
//! to completion before the zone loop hands it the next [`ZoneEvent`]; fades
//! are detached tasks that only talk to the host.

use chrono::NaiveDateTime;
use tracing::{debug, info, warn};

use automoli_domain::entity::{
    AttributeValue, EntityState, FRIENDLY_NAME, IS_HUE_GROUP, is_binary_light,
};
use automoli_domain::error::AutomoliError;
use automoli_domain::event::HostEvent;
use automoli_domain::id::TimerId;
use automoli_domain::profile::LightTarget;
use automoli_domain::room::RoomState;
use automoli_domain::service::ServiceCall;
use automoli_domain::zone::{DEFAULT_FADE_DURATION, FadeDurations, MotionMode};

use crate::blockers::{DisableRuleEvaluator, threshold};
use crate::daytime::DaytimeScheduler;
use crate::fade::{FadeDirection, FadeExecutor};
use crate::ports::{CommandSink, Scheduler, StateReader};
use crate::zone::ZoneEvent;

/// Where a motion notification came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Trigger {
    /// A discrete motion event.
    Pulse,
    /// A continuous sensor switching to its "detected" state.
    Detected,
}

/// Drives the lights of one zone.
pub struct OccupancyController<H, S> {
    room: RoomState,
    rules: DisableRuleEvaluator,
    motion: MotionMode,
    fade: FadeDurations,
    daytime: DaytimeScheduler,
    fades: FadeExecutor<H>,
    host: H,
    scheduler: S,
}

impl<H, S> OccupancyController<H, S>
where
    H: StateReader + CommandSink + Clone + 'static,
    S: Scheduler,
{
    /// Controller in pulse mode with no disable rules and default fades.
    #[must_use]
    pub fn new(room: RoomState, host: H, scheduler: S) -> Self {
        let fade = std::time::Duration::from_secs_f64(DEFAULT_FADE_DURATION);
        Self {
            room,
            rules: DisableRuleEvaluator::default(),
            motion: MotionMode::Pulse,
            fade: FadeDurations { on: fade, off: fade },
            daytime: DaytimeScheduler::new(),
            fades: FadeExecutor::new(host.clone()),
            host,
            scheduler,
        }
    }

    #[must_use]
    pub fn with_rules(mut self, rules: DisableRuleEvaluator) -> Self {
        self.rules = rules;
        self
    }

    #[must_use]
    pub fn with_motion_mode(mut self, motion: MotionMode) -> Self {
        self.motion = motion;
        self
    }

    #[must_use]
    pub fn with_fade_durations(mut self, fade: FadeDurations) -> Self {
        self.fade = fade;
        self
    }

    #[must_use]
    pub fn room(&self) -> &RoomState {
        &self.room
    }

    /// Resolve and apply the profile active at `now`, register the daily
    /// transitions and, for pulse sensors, arm the timer so lights left on
    /// eventually go off.
    pub fn start(&mut self, now: NaiveDateTime) {
        let initial = self.daytime.initial(self.room.profiles(), now);
        self.switch_daytime(initial, true);
        self.daytime.schedule(self.room.profiles(), &self.scheduler);
        if self.motion == MotionMode::Pulse {
            self.refresh_timer();
        }
    }

    /// Process one zone event.
    ///
    /// # Errors
    ///
    /// Returns the first failed host command. The zone state stays
    /// consistent; the next event re-evaluates from scratch.
    pub async fn handle(&mut self, event: ZoneEvent) -> Result<(), AutomoliError> {
        match event {
            ZoneEvent::Host(HostEvent::Motion { entity_id }) => {
                if self.motion == MotionMode::Pulse && self.room.motion_sensors.contains(&entity_id)
                {
                    self.on_motion_event(&entity_id, Trigger::Pulse).await?;
                }
                Ok(())
            }
            ZoneEvent::Host(HostEvent::StateChanged { entity_id, new, .. }) => {
                self.on_state_changed(&entity_id, &new).await
            }
            ZoneEvent::TimerFired(timer) => self.on_timer_fired(timer).await,
            ZoneEvent::DaytimeSwitch(index) => {
                self.switch_daytime(index, false);
                Ok(())
            }
            ZoneEvent::Shutdown => Ok(()),
        }
    }

    async fn on_state_changed(
        &mut self,
        entity_id: &str,
        new: &EntityState,
    ) -> Result<(), AutomoliError> {
        let (detected, cleared) = match &self.motion {
            MotionMode::States { on, off } => (new.as_str() == on, new.as_str() == off),
            MotionMode::Pulse => return Ok(()),
        };
        if !self.room.motion_sensors.contains(entity_id) {
            return Ok(());
        }
        if detected {
            self.on_motion_detected(entity_id).await
        } else {
            if cleared {
                self.on_motion_cleared();
            }
            Ok(())
        }
    }

    /// Shared motion handler. Returns `false` when a disable rule vetoed it.
    async fn on_motion_event(
        &mut self,
        sensor: &str,
        trigger: Trigger,
    ) -> Result<bool, AutomoliError> {
        debug!(zone = %self.room.name, sensor, ?trigger, "motion");

        if let Some(rule) = self.rules.first_firing(&self.host) {
            info!(zone = %self.room.name, rule = %rule, "disabled by rule");
            return Ok(false);
        }

        if self.any_light_on() {
            debug!(zone = %self.room.name, "light already on, refreshing the timer");
        } else {
            self.lights_on().await?;
        }

        if trigger == Trigger::Pulse {
            self.refresh_timer();
        }
        Ok(true)
    }

    async fn on_motion_detected(&mut self, sensor: &str) -> Result<(), AutomoliError> {
        self.cancel_timer();
        if self.on_motion_event(sensor, Trigger::Detected).await? {
            self.refresh_timer();
        }
        Ok(())
    }

    fn on_motion_cleared(&mut self) {
        let MotionMode::States { off, .. } = &self.motion else {
            return;
        };
        let all_clear = self.room.motion_sensors.iter().all(|sensor| {
            self.host
                .state(sensor)
                .is_some_and(|state| state.as_str() == off)
        });
        if all_clear {
            self.refresh_timer();
        } else {
            self.cancel_timer();
        }
    }

    async fn on_timer_fired(&mut self, timer: TimerId) -> Result<(), AutomoliError> {
        if self.room.timer != Some(timer) {
            debug!(zone = %self.room.name, %timer, "ignoring stale timer");
            return Ok(());
        }
        self.room.timer = None;
        self.lights_off().await
    }

    fn switch_daytime(&mut self, index: usize, initial: bool) {
        let zone = self.room.name.clone();
        let Some(profile) = self.room.activate(index) else {
            warn!(zone = %zone, index, "no such daytime profile");
            return;
        };
        if initial {
            debug!(zone = %zone, profile = %profile.name, target = %profile.target, "initial daytime");
        } else {
            info!(
                zone = %zone,
                profile = %profile.name,
                target = %profile.target,
                delay = profile.delay.as_secs(),
                "daytime switched"
            );
        }
    }

    async fn lights_on(&mut self) -> Result<(), AutomoliError> {
        if threshold::blocks_on(&self.room, &self.host) {
            return Ok(());
        }

        let target = self.room.active_profile().target.clone();
        match &target {
            LightTarget::Scene(_) | LightTarget::GroupScene(_) | LightTarget::Named(_) => {
                for light in &self.room.lights {
                    self.host.invoke(self.scene_call(light, &target)).await?;
                }
                info!(zone = %self.room.name, %target, "turned on");
            }
            LightTarget::Off => self.lights_off().await?,
            LightTarget::Brightness(pct) => {
                for light in &self.room.lights {
                    if is_binary_light(light) {
                        self.host.invoke(ServiceCall::turn_on(light)).await?;
                    } else {
                        self.fades
                            .launch(light, FadeDirection::Up, *pct, self.fade.on);
                    }
                }
                info!(zone = %self.room.name, %target, "turned on");
            }
        }
        Ok(())
    }

    /// The call activating a string target on one light.
    fn scene_call(&self, light: &str, target: &LightTarget) -> ServiceCall {
        match target {
            LightTarget::GroupScene(scene) if self.is_scene_group(light) => {
                let group = match self.host.attribute(light, FRIENDLY_NAME) {
                    Some(AttributeValue::String(name)) => name,
                    _ => light.to_string(),
                };
                ServiceCall::activate_group_scene(group, scene.clone())
            }
            LightTarget::Scene(scene) => ServiceCall::turn_on(scene.clone()),
            _ => ServiceCall::turn_on(light),
        }
    }

    fn is_scene_group(&self, light: &str) -> bool {
        self.host
            .attribute(light, IS_HUE_GROUP)
            .is_some_and(|value| value.is_truthy())
    }

    async fn lights_off(&mut self) -> Result<(), AutomoliError> {
        if let Some(rule) = self.rules.first_firing(&self.host) {
            info!(zone = %self.room.name, rule = %rule, "disabled by rule");
            return Ok(());
        }

        if let Some(block) = threshold::blocks_off(&self.room, &self.host) {
            self.refresh_timer();
            info!(
                zone = %self.room.name,
                sensor = %block.sensor,
                reading = block.reading,
                "no motion but too humid, keeping lights on"
            );
            return Ok(());
        }

        self.cancel_timer();
        if self.any_light_on() {
            for light in &self.room.lights {
                if is_binary_light(light) {
                    self.host.invoke(ServiceCall::turn_off(light)).await?;
                } else {
                    self.fades
                        .launch(light, FadeDirection::Down, 0, self.fade.off);
                }
            }
            info!(
                zone = %self.room.name,
                delay = self.room.active_profile().delay.as_secs(),
                "no motion, turned off"
            );
        }
        Ok(())
    }

    /// Restart the inactivity timer. A zero delay leaves no timer at all.
    fn refresh_timer(&mut self) {
        self.cancel_timer();
        let delay = self.room.active_profile().delay;
        if !delay.is_zero() {
            self.room.timer = Some(self.scheduler.run_after(delay));
        }
    }

    fn cancel_timer(&mut self) {
        if let Some(timer) = self.room.timer.take() {
            self.scheduler.cancel(timer);
        }
    }

    fn any_light_on(&self) -> bool {
        self.room
            .lights
            .iter()
            .any(|light| self.host.state(light) == Some(EntityState::On))
    }
}
