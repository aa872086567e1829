//! Entity discovery by naming convention and room resolution.
//!
//! A zone may list its lights and sensors explicitly; anything left empty is
//! discovered from the host by entity-id keyword and room token.

use std::collections::BTreeSet;

use tracing::warn;

use automoli_domain::entity::{AttributeValue, FRIENDLY_NAME, IS_HUE_GROUP};
use automoli_domain::error::ConfigError;
use automoli_domain::profile::ProfileSet;
use automoli_domain::room::{RoomState, Thresholds};
use automoli_domain::zone::ZoneConfig;

use crate::ports::{EntityDiscovery, StateReader};

pub const KEYWORD_LIGHTS: &str = "light.";
pub const KEYWORD_MOTION: &str = "binary_sensor.motion_sensor_";
pub const KEYWORD_HUMIDITY: &str = "sensor.humidity_";
pub const KEYWORD_ILLUMINANCE: &str = "sensor.illumination_";

/// Lower-case and fold `ü` so `Büro` matches the room token `buro`.
fn normalize(name: &str) -> String {
    name.to_lowercase().replace('ü', "u")
}

/// Entities whose id contains `keyword` and whose friendly name contains
/// the room token.
pub fn find_entities<H>(host: &H, room: &str, keyword: &str) -> BTreeSet<String>
where
    H: EntityDiscovery + StateReader,
{
    let room = normalize(room);
    host.entity_ids()
        .into_iter()
        .filter(|entity_id| entity_id.contains(keyword))
        .filter(|entity_id| {
            matches!(
                host.attribute(entity_id, FRIENDLY_NAME),
                Some(AttributeValue::String(name)) if normalize(&name).contains(&room)
            )
        })
        .collect()
}

/// Optional sensor family: explicit set, else discovered when a threshold is
/// configured. No sensors at all disables the threshold.
fn resolve_sensors<H>(
    host: &H,
    config: &ZoneConfig,
    explicit: &BTreeSet<String>,
    threshold: Option<f64>,
    keyword: &str,
    family: &'static str,
) -> (BTreeSet<String>, Option<f64>)
where
    H: EntityDiscovery + StateReader,
{
    let Some(threshold) = threshold else {
        return (explicit.clone(), None);
    };
    if !explicit.is_empty() {
        return (explicit.clone(), Some(threshold));
    }
    let found = find_entities(host, &config.room, keyword);
    if found.is_empty() {
        warn!(zone = %config.room, family, keyword, "no sensors available, disabling blocker");
        return (found, None);
    }
    (found, Some(threshold))
}

/// Build the [`RoomState`] of a zone from its configuration and the host.
///
/// # Errors
///
/// Returns [`ConfigError::NoLights`] / [`ConfigError::NoMotionSensors`] when
/// neither configuration nor discovery yields any, and any error from
/// building the profile set.
pub fn resolve_room<H>(config: &ZoneConfig, host: &H) -> Result<RoomState, ConfigError>
where
    H: EntityDiscovery + StateReader,
{
    let mut lights = config.lights.clone();
    if lights.is_empty() {
        let room_group = format!("light.{}", config.room);
        if host.exists(&room_group) {
            lights.insert(room_group);
        } else {
            lights = find_entities(host, &config.room, KEYWORD_LIGHTS);
        }
    }
    if lights.is_empty() {
        return Err(ConfigError::NoLights {
            room: config.room.clone(),
            keyword: KEYWORD_LIGHTS,
        });
    }

    let mut motion_sensors = config.motion.clone();
    if motion_sensors.is_empty() {
        motion_sensors = find_entities(host, &config.room, KEYWORD_MOTION);
    }
    if motion_sensors.is_empty() {
        return Err(ConfigError::NoMotionSensors {
            room: config.room.clone(),
            keyword: KEYWORD_MOTION,
        });
    }

    let (humidity_sensors, humidity) = resolve_sensors(
        host,
        config,
        &config.humidity,
        config.humidity_threshold,
        KEYWORD_HUMIDITY,
        "humidity",
    );
    let (illuminance_sensors, illuminance) = resolve_sensors(
        host,
        config,
        &config.illuminance,
        config.illuminance_threshold,
        KEYWORD_ILLUMINANCE,
        "illuminance",
    );

    let group_capable = lights.iter().any(|light| {
        host.attribute(light, IS_HUE_GROUP)
            .is_some_and(|value| value.is_truthy())
    });
    let profiles = ProfileSet::build(&config.daytimes, config.delay, group_capable)?;

    let mut room = RoomState::new(config.room.clone(), profiles);
    room.lights = lights;
    room.motion_sensors = motion_sensors;
    room.humidity_sensors = humidity_sensors;
    room.illuminance_sensors = illuminance_sensors;
    room.thresholds = Thresholds {
        humidity,
        illuminance,
    };
    Ok(room)
}
