//! Error types for the simulation host.

use thiserror::Error;
use warden_common::{ConfigError, WardenError};

/// Errors raised while loading or validating a simulation.
#[derive(Debug, Error)]
pub enum SimError {
    /// Shared Warden errors (I/O, serialization)
    #[error(transparent)]
    Warden(#[from] WardenError),

    /// Config file is not valid TOML for a `SimConfig`
    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    /// The shared guard or backup configuration is unusable
    #[error("Invalid guard config: {0}")]
    Config(#[from] ConfigError),

    /// A per-guard override is unusable
    #[error("Guard {index}: {source}")]
    Guard {
        /// Index into `guards`
        index: usize,
        /// What is wrong with it
        source: ConfigError,
    },

    /// A scenario-level value is unusable
    #[error("Invalid scenario: {0}")]
    Scenario(String),
}

impl From<std::io::Error> for SimError {
    fn from(err: std::io::Error) -> Self {
        Self::Warden(WardenError::Io(err))
    }
}

/// Result type alias for simulation operations.
pub type SimResult<T> = Result<T, SimError>;
