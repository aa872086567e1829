//! Configuration loading: TOML file with environment variable overrides.
//!
//! Looks for `automoli.toml` in the working directory, or at the path in
//! `AUTOMOLI_CONFIG`. Every field has a default so the file is optional.
//! Environment variables take precedence over file values.

use std::collections::{HashMap, HashSet};

use serde::Deserialize;

use automoli_domain::entity::{AttributeValue, Entity};
use automoli_domain::zone::ZoneConfig;

/// Default configuration file name.
const CONFIG_FILE: &str = "automoli.toml";

/// Top-level configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Logging settings.
    pub logging: LoggingConfig,
    /// Entities the virtual host starts with.
    pub entities: Vec<EntitySeed>,
    /// One entry per controlled room.
    pub zones: Vec<ZoneConfig>,
}

/// Logging configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive (`RUST_LOG` syntax).
    pub filter: String,
}

/// An entity seeded into the virtual host.
#[derive(Debug, Deserialize)]
pub struct EntitySeed {
    pub entity_id: String,
    #[serde(default)]
    pub friendly_name: Option<String>,
    #[serde(default = "default_state")]
    pub state: String,
    #[serde(default)]
    pub attributes: HashMap<String, AttributeValue>,
}

fn default_state() -> String {
    "off".to_string()
}

impl EntitySeed {
    #[must_use]
    pub fn to_entity(&self) -> Entity {
        let mut builder = Entity::builder()
            .entity_id(self.entity_id.clone())
            .state(self.state.as_str());
        if let Some(name) = &self.friendly_name {
            builder = builder.friendly_name(name.clone());
        }
        for (key, value) in &self.attributes {
            builder = builder.attribute(key.clone(), value.clone());
        }
        builder.build()
    }
}

impl Config {
    /// Load configuration from `AUTOMOLI_CONFIG` or `automoli.toml` (if
    /// present) then apply environment-variable overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but is unreadable or malformed,
    /// or if validation fails.
    pub fn load() -> Result<Self, LoadError> {
        let path = std::env::var("AUTOMOLI_CONFIG").unwrap_or_else(|_| CONFIG_FILE.to_string());
        let mut config = Self::from_file(&path)?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    fn from_file(path: &str) -> Result<Self, LoadError> {
        match std::fs::read_to_string(path) {
            Ok(content) => toml::from_str(&content).map_err(LoadError::Parse),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(err) => Err(LoadError::Io(err)),
        }
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(val) = std::env::var("AUTOMOLI_LOG") {
            self.logging.filter = val;
        }
        if let Ok(val) = std::env::var("RUST_LOG") {
            self.logging.filter = val;
        }
    }

    fn validate(&self) -> Result<(), LoadError> {
        let mut rooms = HashSet::new();
        for zone in &self.zones {
            if zone.room.trim().is_empty() {
                return Err(LoadError::Validation("zone room must not be empty".into()));
            }
            if !rooms.insert(zone.room.as_str()) {
                return Err(LoadError::Validation(format!(
                    "zone '{}' is configured twice",
                    zone.room
                )));
            }
        }
        for seed in &self.entities {
            if !seed.entity_id.contains('.') {
                return Err(LoadError::Validation(format!(
                    "entity id '{}' has no domain prefix",
                    seed.entity_id
                )));
            }
        }
        Ok(())
    }

    /// The seeded entities, ready for the virtual host.
    #[must_use]
    pub fn seed_entities(&self) -> Vec<Entity> {
        self.entities.iter().map(EntitySeed::to_entity).collect()
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "automolid=info,automoli=info".to_string(),
        }
    }
}

/// Configuration loading errors.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    /// TOML parse failure.
    #[error("failed to parse config file")]
    Parse(#[from] toml::de::Error),
    /// File I/O failure.
    #[error("failed to read config file")]
    Io(#[from] std::io::Error),
    /// Semantic validation failure.
    #[error("invalid configuration: {0}")]
    Validation(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use automoli_domain::entity::{EntityState, IS_HUE_GROUP};

    #[test]
    fn should_produce_sensible_defaults() {
        let config = Config::default();
        assert_eq!(config.logging.filter, "automolid=info,automoli=info");
        assert!(config.entities.is_empty());
        assert!(config.zones.is_empty());
    }

    #[test]
    fn should_parse_minimal_toml() {
        let config: Config = toml::from_str("").unwrap();
        assert!(config.zones.is_empty());
    }

    #[test]
    fn should_parse_full_toml() {
        let toml = r#"
            [logging]
            filter = "debug"

            [[entities]]
            entity_id = "light.kitchen"
            friendly_name = "Kitchen Light"
            attributes = { is_hue_group = true }

            [[entities]]
            entity_id = "sensor.humidity_kitchen"
            state = "45"

            [[zones]]
            room = "kitchen"
            humidity_threshold = 70.0
            disable_switch_entities = ["input_boolean.guest, on"]

            [[zones.daytimes]]
            starttime = "06:00"
            name = "day"
            light = 80
        "#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.logging.filter, "debug");
        assert_eq!(config.entities.len(), 2);
        assert_eq!(config.entities[0].state, "off");
        assert_eq!(config.zones[0].room, "kitchen");
        assert_eq!(config.zones[0].delay, 150);
        assert_eq!(config.zones[0].daytimes.len(), 1);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn should_build_seeded_entities() {
        let toml = r#"
            [[entities]]
            entity_id = "light.kitchen"
            friendly_name = "Kitchen Light"
            state = "on"
            attributes = { is_hue_group = true }
        "#;
        let config: Config = toml::from_str(toml).unwrap();
        let entities = config.seed_entities();
        assert_eq!(entities[0].entity_id, "light.kitchen");
        assert_eq!(entities[0].state, EntityState::On);
        assert_eq!(
            entities[0].attribute(IS_HUE_GROUP),
            Some(AttributeValue::Bool(true))
        );
    }

    #[test]
    fn should_return_default_when_file_not_found() {
        let config = Config::from_file("nonexistent.toml").unwrap();
        assert!(config.zones.is_empty());
    }

    #[test]
    fn should_reject_duplicate_rooms() {
        let config = Config {
            zones: vec![ZoneConfig::for_room("hall"), ZoneConfig::for_room("hall")],
            ..Config::default()
        };
        assert!(matches!(config.validate(), Err(LoadError::Validation(_))));
    }

    #[test]
    fn should_reject_empty_room() {
        let config = Config {
            zones: vec![ZoneConfig::default()],
            ..Config::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn should_reject_entity_without_domain() {
        let config: Config = toml::from_str("[[entities]]\nentity_id = 'kitchen'").unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn should_report_parse_error_for_invalid_toml() {
        let result: Result<Config, _> = toml::from_str("invalid {{{");
        assert!(result.is_err());
    }
}
