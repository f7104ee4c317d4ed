//! Scenario configuration.
//!
//! Describes the guards, intruders and timing of a headless run.
//! Configuration is loaded from and saved to a TOML file.

use glam::Vec3;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::{Read, Write};
use std::path::Path;
use tracing::{info, warn};
use warden_ai::ChaserConfig;
use warden_common::{PrefabKind, WardenError};

use crate::error::{SimError, SimResult};

/// Config file name.
pub const CONFIG_FILE: &str = "warden.toml";

/// A guard placed at scenario start.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GuardSpec {
    /// Starting position
    pub position: Vec3,
    /// Patrol route
    pub route: Vec<Vec3>,
    /// Overrides the scenario-wide guard config
    pub config: Option<ChaserConfig>,
}

impl Default for GuardSpec {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            route: vec![
                Vec3::new(0.0, 0.0, 8.0),
                Vec3::new(8.0, 0.0, 8.0),
                Vec3::new(8.0, 0.0, 0.0),
                Vec3::ZERO,
            ],
            config: None,
        }
    }
}

/// A scripted intruder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IntruderSpec {
    /// Starting position
    pub start: Vec3,
    /// Waypoints walked in a loop
    pub path: Vec<Vec3>,
    /// Walking speed in units per second
    pub speed: f32,
    /// Where the intruder is sent when caught
    pub respawn: Vec3,
    /// Seconds after start at which the intruder hides
    pub hide_at: Option<f32>,
    /// Seconds spent hidden
    pub hide_for: f32,
}

impl Default for IntruderSpec {
    fn default() -> Self {
        Self {
            start: Vec3::new(-6.0, 0.0, 4.0),
            path: vec![Vec3::new(6.0, 0.0, 4.0), Vec3::new(-6.0, 0.0, 4.0)],
            speed: 1.5,
            respawn: Vec3::new(-20.0, 0.0, -20.0),
            hide_at: None,
            hide_for: 0.0,
        }
    }
}

/// How backup agents are configured.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TemplateSpec {
    /// Prefab the template applies to
    pub prefab: PrefabKind,
    /// Agent configuration
    pub config: ChaserConfig,
    /// Patrol route
    pub route: Vec<Vec3>,
}

impl Default for TemplateSpec {
    fn default() -> Self {
        Self {
            prefab: PrefabKind::GUARD,
            config: ChaserConfig::default(),
            route: Vec::new(),
        }
    }
}

/// Simulation configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// World seed all agent RNGs derive from
    pub seed: u64,
    /// Ticks per second
    pub tick_rate: f32,
    /// Run length in seconds
    pub duration_secs: f32,
    /// Guard speed in units per second
    pub move_speed: f32,
    /// Radius of each guard's proximity zone
    pub proximity_radius: f32,
    /// Config for every guard without an override
    pub guard: ChaserConfig,
    /// Guards placed at start
    pub guards: Vec<GuardSpec>,
    /// Template for backup agents; defaults to `guard` with no route
    pub backup_template: Option<TemplateSpec>,
    /// Scripted intruders
    pub intruders: Vec<IntruderSpec>,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            seed: 0x5EED,
            tick_rate: 30.0,
            duration_secs: 60.0,
            move_speed: 3.5,
            proximity_radius: 1.5,
            guard: ChaserConfig::default(),
            guards: vec![GuardSpec::default()],
            backup_template: None,
            intruders: vec![IntruderSpec::default()],
        }
    }
}

impl SimConfig {
    /// Load configuration from a specific path.
    /// Returns default config if file doesn't exist or is invalid.
    pub fn load_from<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref();

        if !path.exists() {
            info!("Config file not found, using defaults");
            return Self::default();
        }

        match Self::try_load_from(path) {
            Ok(config) => {
                info!("Loaded config from {}", path.display());
                config
            },
            Err(e) => {
                warn!("Failed to load config file: {e}");
                Self::default()
            },
        }
    }

    /// Load and validate configuration, reporting why it failed.
    pub fn try_load_from<P: AsRef<Path>>(path: P) -> SimResult<Self> {
        let mut contents = String::new();
        fs::File::open(path.as_ref())?.read_to_string(&mut contents)?;

        let config: Self = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a specific path.
    pub fn save_to<P: AsRef<Path>>(&self, path: P) -> SimResult<()> {
        let path = path.as_ref();

        // Create parent directories if needed
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)
            .map_err(|e| WardenError::Serialization(e.to_string()))?;

        let mut file = fs::File::create(path)?;
        file.write_all(contents.as_bytes())?;

        info!("Saved config to {}", path.display());
        Ok(())
    }

    /// Seconds per tick.
    #[must_use]
    pub fn tick_dt(&self) -> f32 {
        1.0 / self.tick_rate
    }

    /// Number of ticks in a full run.
    #[must_use]
    pub fn total_ticks(&self) -> u64 {
        (self.duration_secs * self.tick_rate).round() as u64
    }

    /// Config used by the guard at `index`.
    #[must_use]
    pub fn guard_config(&self, index: usize) -> &ChaserConfig {
        self.guards
            .get(index)
            .and_then(|spec| spec.config.as_ref())
            .unwrap_or(&self.guard)
    }

    /// Template used for backup spawns.
    #[must_use]
    pub fn backup(&self) -> TemplateSpec {
        self.backup_template.clone().unwrap_or_else(|| TemplateSpec {
            prefab: PrefabKind::GUARD,
            config: self.guard.clone(),
            route: Vec::new(),
        })
    }

    /// Checks timing, geometry and every agent config.
    pub fn validate(&self) -> SimResult<()> {
        if !(self.tick_rate.is_finite() && self.tick_rate > 0.0) {
            return Err(SimError::Scenario(format!(
                "tick_rate must be positive, got {}",
                self.tick_rate
            )));
        }
        if !(self.duration_secs.is_finite() && self.duration_secs >= 0.0) {
            return Err(SimError::Scenario(format!(
                "duration_secs must not be negative, got {}",
                self.duration_secs
            )));
        }
        if !(self.move_speed.is_finite() && self.move_speed > 0.0) {
            return Err(SimError::Scenario(format!(
                "move_speed must be positive, got {}",
                self.move_speed
            )));
        }
        if !(self.proximity_radius.is_finite() && self.proximity_radius >= 0.0) {
            return Err(SimError::Scenario(format!(
                "proximity_radius must not be negative, got {}",
                self.proximity_radius
            )));
        }

        self.guard.validate()?;
        for (index, spec) in self.guards.iter().enumerate() {
            if let Some(config) = &spec.config {
                config
                    .validate()
                    .map_err(|source| SimError::Guard { index, source })?;
            }
        }
        if let Some(template) = &self.backup_template {
            template.config.validate()?;
        }

        Ok(())
    }
}
