//! Blockers: conditions that veto an otherwise triggered light action.
//!
//! - [`DisableRuleEvaluator`] checks user-defined disable rules; it is the
//!   first gate of both the on and the off path.
//! - [`threshold`] compares humidity and illuminance readings against the
//!   zone's limits.

pub mod disable_rules;
pub mod threshold;

pub use disable_rules::DisableRuleEvaluator;
pub use threshold::HumidityBlock;
