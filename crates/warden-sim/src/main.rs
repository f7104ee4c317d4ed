//! # Warden
//!
//! Runs a guard scenario headlessly and prints the run report as JSON.
//!
//! Usage: `warden [config.toml]` (defaults to `warden.toml` in the working
//! directory).

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(clippy::unwrap_used)]

use anyhow::Result;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};
use warden_sim::{SimConfig, Simulation, CONFIG_FILE};

/// Main entry point.
fn main() -> Result<()> {
    // Logs go to stderr so stdout carries only the report.
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::from_default_env().add_directive("warden=info".parse()?))
        .init();

    info!("Warden starting...");
    info!("Version: {}", env!("CARGO_PKG_VERSION"));

    let path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| CONFIG_FILE.to_string());
    let config = SimConfig::load_from(&path);

    let mut sim = Simulation::new(config)?;
    let report = sim.run();

    info!(
        "Run complete: {} ticks, {} escalations, {} backup agents, {} caught",
        report.ticks, report.escalations, report.spawned, report.caught
    );

    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
