//! # automolid: automoli daemon
//!
//! Composition root that wires the zones to a host and runs them.
//!
//! ## Responsibilities
//! - Parse configuration (env vars, config file)
//! - Initialize structured logging
//! - Seed the virtual host with the configured entities
//! - Resolve and start one zone loop per configured room
//! - Route host events to the zones and feed stdin commands to the host
//! - Handle graceful shutdown (Ctrl-C, `quit`, end of input)
//!
//! ## Dependency rule
//! This is the **only** crate that depends on all other crates.
//! It is the wiring layer: no domain logic belongs here.

mod config;
mod driver;

use std::sync::Arc;

use anyhow::Context;
use tokio::io::BufReader;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use automoli_adapter_virtual::VirtualHost;
use automoli_app::event_bus::InProcessEventBus;
use automoli_app::scheduler::SystemClock;
use automoli_app::zone::{route, spawn_zone};

use config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::load().context("failed to load configuration")?;

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(&config.logging.filter))
        .init();

    // Host
    let bus = Arc::new(InProcessEventBus::new(256));
    let host = Arc::new(VirtualHost::new(Arc::clone(&bus)));
    for entity in config.seed_entities() {
        host.insert(entity);
    }
    info!(entities = host.entities().len(), "virtual host ready");

    // Zones
    let events = bus.subscribe();
    let mut zones = Vec::with_capacity(config.zones.len());
    for zone in &config.zones {
        match spawn_zone(zone, Arc::clone(&host), SystemClock) {
            Ok(handle) => zones.push(handle),
            Err(err) => error!(zone = %zone.room, error = %err, "zone not started"),
        }
    }
    if zones.is_empty() {
        warn!("no zone is running");
    }
    info!(zones = zones.len(), "automolid running, type 'help' for commands");

    let stdin = BufReader::new(tokio::io::stdin());
    tokio::select! {
        () = route(events, &zones) => warn!("event bus closed"),
        result = driver::run(host.as_ref(), stdin) => result.context("failed to read commands")?,
        result = tokio::signal::ctrl_c() => result.context("failed to listen for ctrl-c")?,
    }

    info!("shutting down");
    for zone in zones {
        zone.shutdown().await;
    }
    Ok(())
}
