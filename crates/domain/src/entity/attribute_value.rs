//! Typed attribute values attached to entities.

use serde::{Deserialize, Serialize};

/// A single typed attribute value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttributeValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    Json(serde_json::Value),
}

impl AttributeValue {
    /// Numeric view of the value, if it has one.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Int(v) => Some(*v as f64),
            Self::Float(v) => Some(*v),
            Self::String(s) => s.trim().parse().ok(),
            Self::Bool(_) | Self::Json(_) => None,
        }
    }

    /// Truthiness as the host would evaluate it.
    #[must_use]
    pub fn is_truthy(&self) -> bool {
        match self {
            Self::Bool(v) => *v,
            Self::Int(v) => *v != 0,
            Self::Float(v) => *v != 0.0,
            Self::String(s) => !s.is_empty(),
            Self::Json(v) => !v.is_null(),
        }
    }

    /// Compare against a value written as text in configuration.
    #[must_use]
    pub fn matches_text(&self, expected: &str) -> bool {
        match self {
            Self::String(s) => s == expected,
            Self::Bool(v) => v.to_string() == expected.to_ascii_lowercase(),
            Self::Int(v) => v.to_string() == expected,
            Self::Float(v) => expected.parse::<f64>().is_ok_and(|e| e == *v),
            Self::Json(v) => v.to_string() == expected,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_serialize_int_variant_as_number() {
        let json = serde_json::to_string(&AttributeValue::Int(42)).unwrap();
        assert_eq!(json, "42");
    }

    #[test]
    fn should_deserialize_json_object_as_json_variant() {
        let val: AttributeValue = serde_json::from_str(r#"{"nested": "value"}"#).unwrap();
        assert!(matches!(val, AttributeValue::Json(_)));
    }

    #[test]
    fn should_expose_numeric_view() {
        assert_eq!(AttributeValue::Int(128).as_f64(), Some(128.0));
        assert_eq!(AttributeValue::String(" 3.5".into()).as_f64(), Some(3.5));
        assert_eq!(AttributeValue::Bool(true).as_f64(), None);
    }

    #[test]
    fn should_evaluate_truthiness() {
        assert!(AttributeValue::Bool(true).is_truthy());
        assert!(!AttributeValue::Bool(false).is_truthy());
        assert!(!AttributeValue::String(String::new()).is_truthy());
    }

    #[test]
    fn should_match_text_across_types() {
        assert!(AttributeValue::String("HDMI 1".into()).matches_text("HDMI 1"));
        assert!(AttributeValue::Int(3).matches_text("3"));
        assert!(AttributeValue::Float(2.5).matches_text("2.5"));
        assert!(AttributeValue::Bool(true).matches_text("True"));
        assert!(!AttributeValue::Int(3).matches_text("three"));
    }
}
