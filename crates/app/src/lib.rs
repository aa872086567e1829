//! # automoli-app
//!
//! Application layer: the occupancy logic and the **port definitions**
//! (traits) the host adapters implement.
//!
//! ## Responsibilities
//! - Define **port traits** for the automation host:
//!   - `StateReader`: entity states and attributes
//!   - `CommandSink`: service calls
//!   - `EntityDiscovery`: entity listing for discovery by naming convention
//!   - `Scheduler` / `Clock`: one-shot timers, daily callbacks, wall time
//!   - `EventPublisher`: host event publication
//! - Resolve a zone configuration into a live `RoomState` (discovery)
//! - Evaluate blockers (disable rules, humidity and illuminance thresholds)
//! - Run the `OccupancyController` state machine, the `DaytimeScheduler`
//!   and detached brightness fades
//! - Provide **in-process infrastructure** (event bus, tokio scheduler,
//!   per-zone event loop and router) that doesn't need IO
//!
//! ## Dependency rule
//! Depends on `automoli-domain` only (plus `tokio` for tasks, channels and
//! timers). Never imports adapter crates.

pub mod blockers;
pub mod controller;
pub mod daytime;
pub mod discovery;
pub mod event_bus;
pub mod fade;
pub mod ports;
pub mod scheduler;
pub mod zone;

#[cfg(test)]
mod test_support;
