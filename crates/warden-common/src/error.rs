//! Error types for Warden.
//!
//! The agent runtime itself never fails; these cover configuration and the
//! I/O edges around it.

use thiserror::Error;

/// Top-level error type for Warden operations.
#[derive(Debug, Error)]
pub enum WardenError {
    /// Invalid agent configuration
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    /// Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Agent configuration errors.
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    /// A duration, radius or threshold must be a positive finite number
    #[error("{field} must be positive and finite, got {value}")]
    NotPositive {
        /// Field name
        field: &'static str,
        /// Offending value
        value: f32,
    },

    /// Maximum strikes of zero would escalate on nothing
    #[error("max_strikes must be at least 1")]
    ZeroMaxStrikes,

    /// Hearing cone outside (0, 360]
    #[error("hearing_angle must be within (0, 360], got {0}")]
    HearingAngle(f32),

    /// Spawn annulus is inverted or negative
    #[error("invalid spawn radius range [{min}, {max}]")]
    SpawnRadius {
        /// Inner radius
        min: f32,
        /// Outer radius
        max: f32,
    },
}
