//! Path-following capability consumed by agents.

use glam::Vec3;
use warden_common::{distance, flatten, rotate_yaw};

/// Host-side body and path follower for one agent.
///
/// Pathfinding and locomotion live on the host; the agent only issues
/// destinations and reads progress.
pub trait Navigator {
    /// Current body position.
    fn position(&self) -> Vec3;
    /// Current facing (need not be normalized).
    fn forward(&self) -> Vec3;
    /// Starts travelling toward `point`.
    fn set_destination(&mut self, point: Vec3);
    /// Whether a path request is still being computed.
    fn has_pending_path(&self) -> bool;
    /// Distance left along the current path.
    fn remaining_distance(&self) -> f32;
    /// Turns the body in place about the vertical axis.
    fn turn(&mut self, degrees: f32);
}

/// Whether the navigator has settled within `threshold` of its destination.
pub fn has_arrived(nav: &dyn Navigator, threshold: f32) -> bool {
    !nav.has_pending_path() && nav.remaining_distance() < threshold
}

/// Mock navigator for testing.
///
/// Destinations are recorded but never travelled automatically; call
/// [`MockNavigator::arrive`] or [`MockNavigator::teleport`] to move.
#[derive(Debug, Clone)]
pub struct MockNavigator {
    position: Vec3,
    forward: Vec3,
    destination: Option<Vec3>,
    pending: bool,
    /// Every destination issued, oldest first
    pub issued: Vec<Vec3>,
    /// Total degrees turned
    pub turned: f32,
}

impl MockNavigator {
    /// Creates a navigator at `position` facing +Z.
    #[must_use]
    pub fn new(position: Vec3) -> Self {
        Self {
            position,
            forward: Vec3::Z,
            destination: None,
            pending: false,
            issued: Vec::new(),
            turned: 0.0,
        }
    }

    /// Sets the facing.
    #[must_use]
    pub fn facing(mut self, forward: Vec3) -> Self {
        self.forward = forward;
        self
    }

    /// Marks path computation as in-flight (or done).
    pub fn set_pending(&mut self, pending: bool) {
        self.pending = pending;
    }

    /// Jumps to the current destination.
    pub fn arrive(&mut self) {
        if let Some(dest) = self.destination {
            self.position = dest;
        }
        self.pending = false;
    }

    /// Moves without touching the destination.
    pub fn teleport(&mut self, position: Vec3) {
        self.position = position;
    }

    /// Last destination issued.
    #[must_use]
    pub fn destination(&self) -> Option<Vec3> {
        self.destination
    }
}

impl Navigator for MockNavigator {
    fn position(&self) -> Vec3 {
        self.position
    }

    fn forward(&self) -> Vec3 {
        self.forward
    }

    fn set_destination(&mut self, point: Vec3) {
        self.destination = Some(point);
        self.issued.push(point);
    }

    fn has_pending_path(&self) -> bool {
        self.pending
    }

    fn remaining_distance(&self) -> f32 {
        self.destination
            .map_or(0.0, |dest| distance(flatten(self.position), flatten(dest)))
    }

    fn turn(&mut self, degrees: f32) {
        self.forward = rotate_yaw(self.forward, degrees);
        self.turned += degrees;
    }
}
