//! # Warden Sim
//!
//! Headless host for Warden guards.
//!
//! This crate provides everything needed to run guards without an engine:
//! - Scenario configuration loaded from TOML
//! - Kinematic bodies and scripted intruders behind the agent traits
//! - Proximity zone emulation
//! - A fixed-step runner producing a JSON-serializable report

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(clippy::unwrap_used)]

pub mod config;
pub mod error;
pub mod runner;
pub mod world;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::config::*;
    pub use crate::error::*;
    pub use crate::runner::*;
    pub use crate::world::*;
}

pub use prelude::*;
