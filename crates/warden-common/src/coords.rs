//! Ground-plane geometry helpers.
//!
//! Positions are `glam::Vec3` with +Y up; the walkable ground plane is XZ.

use glam::{Quat, Vec3};

/// Vectors shorter than this are treated as zero-length.
const DEGENERATE_EPSILON: f32 = 1e-5;

/// Drops the vertical component of a vector.
#[must_use]
pub fn flatten(v: Vec3) -> Vec3 {
    Vec3::new(v.x, 0.0, v.z)
}

/// Straight-line distance between two points.
#[must_use]
pub fn distance(a: Vec3, b: Vec3) -> f32 {
    a.distance(b)
}

/// Unsigned angle in degrees between `forward` and `to`.
///
/// Returns 0 when either vector is degenerate, so a subject standing exactly
/// on the observer counts as straight ahead.
#[must_use]
pub fn facing_angle_deg(forward: Vec3, to: Vec3) -> f32 {
    let denom = (forward.length_squared() * to.length_squared()).sqrt();
    if denom < DEGENERATE_EPSILON {
        return 0.0;
    }
    let cos = (forward.dot(to) / denom).clamp(-1.0, 1.0);
    cos.acos().to_degrees()
}

/// Point on the XZ circle of `radius` at `angle_rad` (measured from +X toward +Z).
#[must_use]
pub fn planar_offset(angle_rad: f32, radius: f32) -> Vec3 {
    Vec3::new(angle_rad.cos() * radius, 0.0, angle_rad.sin() * radius)
}

/// Rotates a facing vector about +Y by `degrees`.
#[must_use]
pub fn rotate_yaw(forward: Vec3, degrees: f32) -> Vec3 {
    Quat::from_rotation_y(degrees.to_radians()) * forward
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flatten_drops_height() {
        assert_eq!(flatten(Vec3::new(1.0, 7.0, -2.0)), Vec3::new(1.0, 0.0, -2.0));
    }

    #[test]
    fn test_facing_angle() {
        let forward = Vec3::Z;
        assert!(facing_angle_deg(forward, Vec3::Z * 3.0).abs() < 1e-3);
        assert!((facing_angle_deg(forward, Vec3::X) - 90.0).abs() < 1e-3);
        assert!((facing_angle_deg(forward, -Vec3::Z) - 180.0).abs() < 1e-3);
    }

    #[test]
    fn test_facing_angle_degenerate() {
        assert_eq!(facing_angle_deg(Vec3::Z, Vec3::ZERO), 0.0);
        assert_eq!(facing_angle_deg(Vec3::ZERO, Vec3::X), 0.0);
    }

    #[test]
    fn test_planar_offset_radius() {
        let p = planar_offset(1.234, 1.5);
        assert_eq!(p.y, 0.0);
        assert!((p.length() - 1.5).abs() < 1e-5);
    }

    #[test]
    fn test_rotate_yaw_quarter_turn() {
        let turned = rotate_yaw(Vec3::Z, 90.0);
        assert!((turned - Vec3::X).length() < 1e-5);
        assert!((turned.length() - 1.0).abs() < 1e-5);
    }
}
