//! # automoli-domain
//!
//! Pure domain model for the automoli occupancy-driven lighting controller.
//!
//! ## Responsibilities
//! - Foundational types: typed identifiers, error conventions, time-of-day helpers
//! - Define **Entities** as seen from the automation host (state + attributes)
//! - Define **Service calls** (commands sent to the host: `turn_on`, scene activation, …)
//! - Define **Host events** (motion pulses and state changes)
//! - Define **Daytime profiles** and their resolution against the wall clock
//! - Define **Disable rules** (veto predicates parsed once from configuration)
//! - Define the **Zone configuration** and the live **Room state**
//!
//! ## Dependency rule
//! This crate has **no internal dependencies**.
//! It must never import anything from `app`, adapters, or external IO crates.
//! All IO boundaries are expressed as traits in the `app` crate (ports).

pub mod error;
pub mod id;
pub mod time;

pub mod disable_rule;
pub mod entity;
pub mod event;
pub mod profile;
pub mod room;
pub mod service;
pub mod zone;
