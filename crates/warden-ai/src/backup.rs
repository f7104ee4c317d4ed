//! Backup calls: rate limiting and spawn placement.

use glam::Vec3;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::config::ChaserConfig;
use warden_common::{planar_offset, AgentId, PrefabKind};

/// A queued request for the host to create a backup agent.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpawnRequest {
    /// Prefab to instantiate
    pub prefab: PrefabKind,
    /// Where to place it
    pub position: Vec3,
    /// Agent that called for backup
    pub called_by: AgentId,
}

/// Result of a backup call.
#[derive(Debug, Clone, PartialEq)]
pub enum BackupOutcome {
    /// Refused: previous call was less than the cooldown ago
    Throttled,
    /// Accepted, with the spawn requests to hand to the host
    Called(Vec<SpawnRequest>),
}

/// Per-agent backup call state.
#[derive(Debug, Clone)]
pub struct BackupCaller {
    /// Time of the last accepted call
    last_call: Option<f64>,
    /// Placement and prefab RNG
    rng: fastrand::Rng,
}

impl BackupCaller {
    /// Creates a caller that has never called.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            last_call: None,
            rng: fastrand::Rng::with_seed(seed),
        }
    }

    /// Time of the last accepted call.
    #[must_use]
    pub const fn last_call(&self) -> Option<f64> {
        self.last_call
    }

    /// Whether a call at `now` would be throttled.
    #[must_use]
    pub fn is_throttled(&self, now: f64, cooldown: f32) -> bool {
        self.last_call
            .is_some_and(|last| now - last < f64::from(cooldown))
    }

    /// Calls for backup around `origin`.
    pub fn call(
        &mut self,
        caller: AgentId,
        now: f64,
        origin: Vec3,
        config: &ChaserConfig,
    ) -> BackupOutcome {
        if self.is_throttled(now, config.backup_cooldown) {
            return BackupOutcome::Throttled;
        }
        self.last_call = Some(now);

        if config.backup_prefabs.is_empty() {
            warn!(agent = %caller, "Backup called with no prefabs configured");
            return BackupOutcome::Called(Vec::new());
        }

        let requests = (0..config.backup_agent_count)
            .map(|_| SpawnRequest {
                prefab: self.pick_prefab(&config.backup_prefabs),
                position: origin
                    + self.sample_offset(config.spawn_radius_min, config.spawn_radius_max),
                called_by: caller,
            })
            .collect();

        BackupOutcome::Called(requests)
    }

    /// Uniform direction on the ground plane, uniform radius in `[min, max]`.
    fn sample_offset(&mut self, min: f32, max: f32) -> Vec3 {
        let angle = self.rng.f32() * std::f32::consts::TAU;
        let radius = min + self.rng.f32() * (max - min);
        planar_offset(angle, radius)
    }

    fn pick_prefab(&mut self, prefabs: &[PrefabKind]) -> PrefabKind {
        prefabs[self.rng.usize(..prefabs.len())]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn caller() -> BackupCaller {
        BackupCaller::new(42)
    }

    #[test]
    fn test_first_call_never_throttled() {
        let mut backup = caller();
        let config = ChaserConfig::default();
        let outcome = backup.call(AgentId::from_raw(1), 0.0, Vec3::ZERO, &config);
        assert!(matches!(outcome, BackupOutcome::Called(ref r) if r.len() == 1));
        assert_eq!(backup.last_call(), Some(0.0));
    }

    #[test]
    fn test_second_call_within_cooldown_throttled() {
        let mut backup = caller();
        let config = ChaserConfig::default();
        let id = AgentId::from_raw(1);

        backup.call(id, 10.0, Vec3::ZERO, &config);
        assert_eq!(
            backup.call(id, 14.9, Vec3::ZERO, &config),
            BackupOutcome::Throttled
        );
        // Throttled calls do not move the window.
        assert_eq!(backup.last_call(), Some(10.0));
        assert!(matches!(
            backup.call(id, 15.0, Vec3::ZERO, &config),
            BackupOutcome::Called(_)
        ));
    }

    #[test]
    fn test_spawn_positions_inside_ring() {
        let mut backup = caller();
        let origin = Vec3::new(10.0, 2.0, -4.0);
        let config = ChaserConfig::default()
            .with_backup(50, 5.0)
            .with_spawn_radius(1.0, 2.0);

        let BackupOutcome::Called(requests) =
            backup.call(AgentId::from_raw(1), 0.0, origin, &config)
        else {
            panic!("expected a call");
        };

        assert_eq!(requests.len(), 50);
        for request in requests {
            let offset = request.position - origin;
            assert!(offset.y.abs() < f32::EPSILON);
            let r = offset.length();
            assert!((1.0 - 1e-4..=2.0 + 1e-4).contains(&r), "radius {r}");
            assert_eq!(request.called_by, AgentId::from_raw(1));
        }
    }

    #[test]
    fn test_prefab_choice_from_list() {
        let mut backup = caller();
        let prefabs = vec![PrefabKind::GUARD, PrefabKind::SENTRY];
        let config = ChaserConfig::default()
            .with_backup(40, 5.0)
            .with_backup_prefabs(prefabs.clone());

        let BackupOutcome::Called(requests) =
            backup.call(AgentId::from_raw(1), 0.0, Vec3::ZERO, &config)
        else {
            panic!("expected a call");
        };
        assert!(requests.iter().all(|r| prefabs.contains(&r.prefab)));
    }

    #[test]
    fn test_empty_prefab_list_spawns_nothing() {
        let mut backup = caller();
        let config = ChaserConfig::default().with_backup_prefabs(Vec::new());
        assert_eq!(
            backup.call(AgentId::from_raw(1), 0.0, Vec3::ZERO, &config),
            BackupOutcome::Called(Vec::new())
        );
    }

    #[test]
    fn test_same_seed_same_placement() {
        let config = ChaserConfig::default().with_backup(3, 5.0);
        let a = BackupCaller::new(7).call(AgentId::from_raw(1), 0.0, Vec3::ZERO, &config);
        let b = BackupCaller::new(7).call(AgentId::from_raw(1), 0.0, Vec3::ZERO, &config);
        assert_eq!(a, b);
    }
}
