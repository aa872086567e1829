//! Disable rules: user-defined veto predicates over host entity state.
//!
//! Written in configuration as `entity, expected_state[; attribute, expected_value]*`
//! and parsed once at startup.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::entity::{AttributeValue, EntityState};
use crate::error::ConfigError;

/// Expected attribute value meaning "the attribute is absent".
pub const ABSENT: &str = "None";

/// One attribute condition of a [`DisableRule`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeCondition {
    pub attribute: String,
    pub expected: String,
}

impl AttributeCondition {
    fn matches(&self, current: Option<&AttributeValue>) -> bool {
        match current {
            Some(value) => value.matches_text(&self.expected),
            None => self.expected == ABSENT,
        }
    }
}

/// A veto predicate over one host entity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisableRule {
    pub entity_id: String,
    pub expected_state: String,
    pub conditions: Vec<AttributeCondition>,
}

impl DisableRule {
    /// Evaluate the rule against the entity's current state.
    ///
    /// Fires when the state equals the expected one and either there are no
    /// attribute conditions or at least one of them matches.
    pub fn fires<F>(&self, state: Option<&EntityState>, mut attribute: F) -> bool
    where
        F: FnMut(&str) -> Option<AttributeValue>,
    {
        if state.map(EntityState::as_str) != Some(self.expected_state.as_str()) {
            return false;
        }
        self.conditions.is_empty()
            || self
                .conditions
                .iter()
                .any(|condition| condition.matches(attribute(&condition.attribute).as_ref()))
    }
}

fn split_pair(part: &str) -> Option<(String, String)> {
    let (left, right) = part.split_once(',')?;
    let (left, right) = (left.trim(), right.trim());
    if left.is_empty() || right.is_empty() || right.contains(',') {
        return None;
    }
    Some((left.to_string(), right.to_string()))
}

impl FromStr for DisableRule {
    type Err = ConfigError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let invalid = || ConfigError::InvalidDisableRule {
            line: line.to_string(),
        };

        let mut parts = line.split(';');
        let (entity_id, expected_state) =
            parts.next().and_then(split_pair).ok_or_else(invalid)?;

        let conditions = parts
            .filter(|part| !part.trim().is_empty())
            .map(|part| {
                split_pair(part).map(|(attribute, expected)| AttributeCondition {
                    attribute,
                    expected,
                })
            })
            .collect::<Option<Vec<_>>>()
            .ok_or_else(invalid)?;

        Ok(Self {
            entity_id,
            expected_state,
            conditions,
        })
    }
}

impl std::fmt::Display for DisableRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}, {}", self.entity_id, self.expected_state)?;
        for condition in &self.conditions {
            write!(f, "; {}, {}", condition.attribute, condition.expected)?;
        }
        Ok(())
    }
}
