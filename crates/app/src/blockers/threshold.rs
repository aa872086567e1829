//! Environmental threshold blockers.
//!
//! Illuminance vetoes turning on ("already bright enough"); humidity vetoes
//! turning off ("too humid, keep going"). A family without a configured
//! threshold never blocks.

use tracing::{info, warn};

use automoli_domain::room::RoomState;

use crate::ports::StateReader;

/// A humidity sensor holding the lights on.
#[derive(Debug, Clone, PartialEq)]
pub struct HumidityBlock {
    pub sensor: String,
    pub reading: f64,
}

enum Reading {
    Value(f64),
    Unreadable(Option<String>),
}

fn read<R: StateReader>(reader: &R, sensor: &str) -> Reading {
    let Some(state) = reader.state(sensor) else {
        return Reading::Unreadable(None);
    };
    match state.as_str().trim().parse::<f64>() {
        Ok(value) => Reading::Value(value),
        Err(_) => Reading::Unreadable(Some(state.to_string())),
    }
}

/// Whether the on-path must abort.
///
/// True when any illuminance sensor reads at or above the threshold, or when
/// any reading cannot be parsed (do not turn on blind).
pub fn blocks_on<R: StateReader>(room: &RoomState, reader: &R) -> bool {
    let Some(threshold) = room.thresholds.illuminance else {
        return false;
    };

    let mut blockers = Vec::new();
    for sensor in &room.illuminance_sensors {
        match read(reader, sensor) {
            Reading::Value(value) if value >= threshold => blockers.push(sensor.as_str()),
            Reading::Value(_) => {}
            Reading::Unreadable(raw) => {
                warn!(zone = %room.name, sensor = %sensor, reading = ?raw, "could not parse illuminance");
                return true;
            }
        }
    }

    if blockers.is_empty() {
        return false;
    }
    info!(zone = %room.name, sensors = ?blockers, threshold, "already bright enough");
    true
}

/// The first humidity sensor at or above the threshold, if any.
///
/// Unreadable sensors never block.
pub fn blocks_off<R: StateReader>(room: &RoomState, reader: &R) -> Option<HumidityBlock> {
    let threshold = room.thresholds.humidity?;
    room.humidity_sensors
        .iter()
        .find_map(|sensor| match read(reader, sensor) {
            Reading::Value(reading) if reading >= threshold => Some(HumidityBlock {
                sensor: sensor.clone(),
                reading,
            }),
            _ => None,
        })
}
