//! Brightness ramps.
//!
//! A fade converts a percentage into the 0–255 scale, walks toward it in
//! fixed-size steps every [`STEP_INTERVAL`], and always finishes with one
//! command at the exact target. Fades run as detached tasks: they are never
//! cancelled, and two fades on the same light simply interleave (last
//! command wins).

use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, error};

use automoli_domain::entity::BRIGHTNESS;
use automoli_domain::error::AutomoliError;
use automoli_domain::service::ServiceCall;

use crate::ports::{CommandSink, StateReader};

/// Pause between two intermediate brightness commands.
pub const STEP_INTERVAL: Duration = Duration::from_millis(200);

/// Direction of a ramp. Decides how the step size is derived.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FadeDirection {
    Up,
    Down,
}

impl std::fmt::Display for FadeDirection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Up => f.write_str("up"),
            Self::Down => f.write_str("down"),
        }
    }
}

/// The commands of one ramp, computed up front.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FadePlan {
    start: i64,
    end: i64,
    step: i64,
    target: u8,
}

impl FadePlan {
    /// Plan a ramp from `current` (0–255) to `target_pct` (0–100).
    #[must_use]
    pub fn new(current: f64, direction: FadeDirection, target_pct: u8, duration: Duration) -> Self {
        let target = f64::from(target_pct.min(100)) * 255.0 / 100.0;
        let points = duration.as_secs_f64() / STEP_INTERVAL.as_secs_f64();
        let delta = match direction {
            FadeDirection::Up => target - current,
            FadeDirection::Down => -current,
        };
        #[allow(clippy::cast_possible_truncation)]
        let step = if points > 0.0 {
            (delta / points).ceil() as i64
        } else {
            0
        };

        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let (start, end, last) = (
            current.trunc() as i64,
            target.trunc() as i64,
            target.round().clamp(0.0, 255.0) as u8,
        );
        Self {
            start,
            end,
            step,
            target: last,
        }
    }

    /// Intermediate brightness values, in issue order.
    pub fn steps(&self) -> impl Iterator<Item = u8> + '_ {
        let mut value = self.start;
        std::iter::from_fn(move || {
            let more = match self.step {
                0 => false,
                s if s > 0 => value < self.end,
                _ => value > self.end,
            };
            if !more {
                return None;
            }
            let current = value;
            value += self.step;
            Some(u8::try_from(current.clamp(0, 255)).unwrap_or(u8::MAX))
        })
    }

    /// The final brightness, always sent.
    #[must_use]
    pub fn target(&self) -> u8 {
        self.target
    }
}

/// Ramp `light` toward `target_pct`, starting from its current brightness.
///
/// # Errors
///
/// Returns the first command error; the remaining steps are skipped.
pub async fn ramp_brightness<H>(
    host: &H,
    light: &str,
    direction: FadeDirection,
    target_pct: u8,
    duration: Duration,
) -> Result<(), AutomoliError>
where
    H: CommandSink + StateReader,
{
    let current = host
        .attribute(light, BRIGHTNESS)
        .and_then(|value| value.as_f64())
        .unwrap_or(0.0);
    let plan = FadePlan::new(current, direction, target_pct, duration);
    debug!(light, %direction, current, target = plan.target(), step = plan.step, "fading");

    for brightness in plan.steps() {
        host.invoke(ServiceCall::set_brightness(light, brightness))
            .await?;
        tokio::time::sleep(STEP_INTERVAL).await;
    }
    host.invoke(ServiceCall::set_brightness(light, plan.target()))
        .await
}

/// Launches fades as independent tasks.
#[derive(Debug, Clone)]
pub struct FadeExecutor<H> {
    host: H,
}

impl<H> FadeExecutor<H>
where
    H: CommandSink + StateReader + Clone + 'static,
{
    #[must_use]
    pub fn new(host: H) -> Self {
        Self { host }
    }

    /// Start a fade without waiting for it. Errors are logged by the task.
    pub fn launch(
        &self,
        light: &str,
        direction: FadeDirection,
        target_pct: u8,
        duration: Duration,
    ) -> JoinHandle<()> {
        let host = self.host.clone();
        let light = light.to_string();
        tokio::spawn(async move {
            if let Err(err) = ramp_brightness(&host, &light, direction, target_pct, duration).await
            {
                error!(light = %light, %direction, error = %err, "fade failed");
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::FakeHost;
    use automoli_domain::entity::AttributeValue;

    fn plan(current: f64, direction: FadeDirection, pct: u8, secs: f64) -> FadePlan {
        FadePlan::new(current, direction, pct, Duration::from_secs_f64(secs))
    }

    #[test]
    fn should_ramp_up_from_zero_in_fixed_steps() {
        let plan = plan(0.0, FadeDirection::Up, 100, 3.0);
        let steps: Vec<u8> = plan.steps().collect();
        // 255 over 15 points
        assert_eq!(steps.len(), 15);
        assert_eq!(steps.first(), Some(&0));
        assert_eq!(steps.last(), Some(&238));
        assert_eq!(plan.target(), 255);
    }

    #[test]
    fn should_ramp_down_toward_zero() {
        let plan = plan(200.0, FadeDirection::Down, 0, 1.0);
        let steps: Vec<u8> = plan.steps().collect();
        assert_eq!(steps, [200, 160, 120, 80, 40]);
        assert_eq!(plan.target(), 0);
    }

    #[test]
    fn should_skip_intermediate_steps_when_step_is_zero() {
        let plan = plan(128.0, FadeDirection::Up, 50, 3.0);
        // ceil((127.5 - 128) / 15) == 0
        assert_eq!(plan.steps().count(), 0);
        assert_eq!(plan.target(), 128);
    }

    #[test]
    fn should_send_only_final_command_for_zero_duration() {
        let plan = plan(0.0, FadeDirection::Up, 100, 0.0);
        assert_eq!(plan.steps().count(), 0);
        assert_eq!(plan.target(), 255);
    }

    #[test]
    fn should_round_final_target() {
        for pct in 0..=100 {
            let plan = plan(0.0, FadeDirection::Up, pct, 1.0);
            let expected = (f64::from(pct) * 255.0 / 100.0).round();
            assert_eq!(f64::from(plan.target()), expected, "pct {pct}");
        }
    }

    #[test]
    fn should_walk_down_when_fading_up_to_a_dimmer_target() {
        let plan = plan(255.0, FadeDirection::Up, 50, 1.0);
        let steps: Vec<u8> = plan.steps().collect();
        assert!(steps.windows(2).all(|w| w[0] > w[1]));
        assert!(steps.iter().all(|&b| b > 127));
    }

    #[tokio::test(start_paused = true)]
    async fn should_finish_with_exact_target_command() {
        let host = FakeHost::default();
        host.add("light.a", "on", None);
        host.set_attribute("light.a", BRIGHTNESS, AttributeValue::Int(13));

        ramp_brightness(&host, "light.a", FadeDirection::Up, 37, Duration::from_secs(1))
            .await
            .unwrap();

        let calls = host.calls_for("light.a");
        assert!(calls.len() > 1);
        assert_eq!(calls.last().unwrap().brightness(), Some(94));
    }

    #[tokio::test(start_paused = true)]
    async fn should_treat_unknown_brightness_as_zero() {
        let host = FakeHost::default();
        host.add("light.a", "off", None);

        ramp_brightness(&host, "light.a", FadeDirection::Up, 100, Duration::from_secs(1))
            .await
            .unwrap();

        let calls = host.calls_for("light.a");
        assert_eq!(calls.first().unwrap().brightness(), Some(0));
        assert_eq!(calls.last().unwrap().brightness(), Some(255));
    }

    #[tokio::test(start_paused = true)]
    async fn should_stop_on_first_command_error() {
        let host = FakeHost::default();
        host.fail_commands();

        let result =
            ramp_brightness(&host, "light.a", FadeDirection::Up, 100, Duration::from_secs(1)).await;

        assert!(result.is_err());
        assert_eq!(host.calls().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn should_not_block_caller_when_launched() {
        let host = FakeHost::default();
        host.add("light.a", "off", None);
        let executor = FadeExecutor::new(host.clone());

        let task = executor.launch("light.a", FadeDirection::Up, 100, Duration::from_secs(3));
        assert!(host.calls().len() <= 1);

        task.await.unwrap();
        assert_eq!(host.brightness("light.a"), Some(255.0));
    }
}
