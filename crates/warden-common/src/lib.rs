//! # Warden Common
//!
//! Common types, utilities, and shared abstractions for Warden.
//!
//! This crate provides foundational types used across all Warden crates:
//! - ID types (AgentId, SubjectId, PrefabKind)
//! - Ground-plane geometry over `glam::Vec3`
//! - Common error types
//! - Prelude for convenient imports

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(clippy::unwrap_used)]

pub mod coords;
pub mod error;
pub mod ids;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::coords::*;
    pub use crate::error::*;
    pub use crate::ids::*;
    pub use glam::Vec3;
}

pub use prelude::*;

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_agent_id_validity() {
        let id = AgentId::from_raw(7);
        assert_eq!(id.raw(), 7);
        assert!(id.is_valid());
        assert!(!AgentId::NULL.is_valid());
        assert_eq!(id.to_string(), "agent#7");
    }

    #[test]
    fn test_config_error_wraps() {
        let err: WardenError = ConfigError::ZeroMaxStrikes.into();
        assert!(err.to_string().contains("max_strikes"));
    }

    proptest! {
        #[test]
        fn prop_facing_angle_in_range(
            fx in -10.0f32..10.0, fz in -10.0f32..10.0,
            tx in -10.0f32..10.0, tz in -10.0f32..10.0,
        ) {
            let angle = facing_angle_deg(Vec3::new(fx, 0.0, fz), Vec3::new(tx, 0.0, tz));
            prop_assert!((0.0..=180.0).contains(&angle));
        }
    }
}
