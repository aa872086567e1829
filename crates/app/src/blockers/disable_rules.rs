//! Disable rule evaluation against live host state.

use automoli_domain::disable_rule::DisableRule;

use crate::ports::StateReader;

/// Evaluates a zone's disable rules in configuration order.
#[derive(Debug, Clone, Default)]
pub struct DisableRuleEvaluator {
    rules: Vec<DisableRule>,
}

impl DisableRuleEvaluator {
    #[must_use]
    pub fn new(rules: Vec<DisableRule>) -> Self {
        Self { rules }
    }

    /// The first rule that fires, if any. Evaluation stops there.
    pub fn first_firing<R: StateReader>(&self, reader: &R) -> Option<&DisableRule> {
        self.rules.iter().find(|rule| {
            let state = reader.state(&rule.entity_id);
            rule.fires(state.as_ref(), |attribute| {
                reader.attribute(&rule.entity_id, attribute)
            })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::FakeHost;
    use automoli_domain::entity::AttributeValue;

    fn evaluator(lines: &[&str]) -> DisableRuleEvaluator {
        DisableRuleEvaluator::new(lines.iter().map(|l| l.parse().unwrap()).collect())
    }

    #[test]
    fn should_not_disable_without_rules() {
        let host = FakeHost::default();
        assert!(DisableRuleEvaluator::default().first_firing(&host).is_none());
    }

    #[test]
    fn should_disable_when_guard_switch_is_on() {
        let host = FakeHost::default();
        host.add("switch.guard", "on", None);
        assert!(evaluator(&["switch.guard, on"]).first_firing(&host).is_some());

        host.set_state("switch.guard", "off");
        assert!(evaluator(&["switch.guard, on"]).first_firing(&host).is_none());
    }

    #[test]
    fn should_not_disable_for_unknown_entity() {
        let host = FakeHost::default();
        assert!(evaluator(&["switch.ghost, on"]).first_firing(&host).is_none());
    }

    #[test]
    fn should_report_first_firing_rule() {
        let host = FakeHost::default();
        host.add("input_boolean.guest", "on", None);
        host.add("media_player.tv", "playing", None);
        host.set_attribute("media_player.tv", "source", AttributeValue::String("HDMI".into()));

        let rules = evaluator(&[
            "input_boolean.guest, off",
            "media_player.tv, playing; source, HDMI",
            "input_boolean.guest, on",
        ]);
        let rule = rules.first_firing(&host).unwrap();
        assert_eq!(rule.entity_id, "media_player.tv");
    }
}
