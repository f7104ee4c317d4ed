//! Tunable parameters for a guard agent.

use serde::{Deserialize, Serialize};
use warden_common::{ConfigError, PrefabKind};

/// Default seconds spent idling before resuming the patrol.
const DEFAULT_IDLE_TIME: f32 = 2.0;

/// Default strike cap that triggers escalation.
const DEFAULT_MAX_STRIKES: u32 = 3;

/// Default seconds of quiet before one strike decays.
const DEFAULT_STRIKE_DECAY_PERIOD: f32 = 30.0;

/// Default hearing radius in world units.
const DEFAULT_HEARING_RADIUS: f32 = 5.0;

/// Default full hearing cone in degrees.
const DEFAULT_HEARING_ANGLE: f32 = 90.0;

/// Default seconds between two hearing strikes.
const DEFAULT_STRIKE_REGISTER_COOLDOWN: f32 = 2.0;

/// Default seconds spent looking around at an investigation point.
const DEFAULT_INVESTIGATE_WAIT_TIME: f32 = 3.0;

/// Default look-around turn rate in degrees per second.
const DEFAULT_LOOK_AROUND_SPEED: f32 = 120.0;

/// Default extra distance past the hearing radius before a chase is dropped.
const DEFAULT_CHASE_GIVE_UP_MARGIN: f32 = 5.0;

/// Default seconds between two backup calls.
const DEFAULT_BACKUP_COOLDOWN: f32 = 5.0;

/// Default distance at which a destination counts as reached.
const DEFAULT_ARRIVAL_THRESHOLD: f32 = 0.5;

/// Configuration for a single guard agent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChaserConfig {
    /// Seconds to idle before patrolling
    pub idle_time: f32,
    /// Strike cap; reaching it escalates
    pub max_strikes: u32,
    /// Seconds of inactivity before one strike decays
    pub strike_decay_period: f32,
    /// Hearing radius
    pub hearing_radius: f32,
    /// Full hearing cone in degrees, centred on the facing
    pub hearing_angle: f32,
    /// Seconds after a hearing strike before another can register
    pub strike_register_cooldown: f32,
    /// Seconds spent looking around at an investigation point
    pub investigate_wait_time: f32,
    /// Look-around turn rate in degrees per second
    pub look_around_speed: f32,
    /// Added to the hearing radius to get the chase give-up distance
    pub chase_give_up_margin: f32,
    /// Seconds between two backup calls
    pub backup_cooldown: f32,
    /// Agents requested per backup call
    pub backup_agent_count: u32,
    /// Inner radius of the backup spawn ring
    pub spawn_radius_min: f32,
    /// Outer radius of the backup spawn ring
    pub spawn_radius_max: f32,
    /// Remaining distance under which a destination counts as reached
    pub arrival_threshold: f32,
    /// Prefabs a backup call picks from
    pub backup_prefabs: Vec<PrefabKind>,
    /// Whether the hearing scan runs
    pub hearing_enabled: bool,
    /// Whether proximity zone enter/leave is acted on
    pub proximity_enabled: bool,
    /// Ask the host to return the culprit to its respawn point on escalation
    pub send_subject_to_respawn: bool,
}

impl Default for ChaserConfig {
    fn default() -> Self {
        Self {
            idle_time: DEFAULT_IDLE_TIME,
            max_strikes: DEFAULT_MAX_STRIKES,
            strike_decay_period: DEFAULT_STRIKE_DECAY_PERIOD,
            hearing_radius: DEFAULT_HEARING_RADIUS,
            hearing_angle: DEFAULT_HEARING_ANGLE,
            strike_register_cooldown: DEFAULT_STRIKE_REGISTER_COOLDOWN,
            investigate_wait_time: DEFAULT_INVESTIGATE_WAIT_TIME,
            look_around_speed: DEFAULT_LOOK_AROUND_SPEED,
            chase_give_up_margin: DEFAULT_CHASE_GIVE_UP_MARGIN,
            backup_cooldown: DEFAULT_BACKUP_COOLDOWN,
            backup_agent_count: 1,
            spawn_radius_min: 1.0,
            spawn_radius_max: 2.0,
            arrival_threshold: DEFAULT_ARRIVAL_THRESHOLD,
            backup_prefabs: vec![PrefabKind::GUARD],
            hearing_enabled: true,
            proximity_enabled: true,
            send_subject_to_respawn: true,
        }
    }
}

impl ChaserConfig {
    /// Idle/patrol-only preset: never hears, never reacts to proximity, never calls backup.
    #[must_use]
    pub fn wanderer() -> Self {
        Self {
            hearing_enabled: false,
            proximity_enabled: false,
            backup_agent_count: 0,
            send_subject_to_respawn: false,
            ..Self::default()
        }
    }

    /// Sets the idle duration.
    #[must_use]
    pub fn with_idle_time(mut self, seconds: f32) -> Self {
        self.idle_time = seconds;
        self
    }

    /// Sets the strike cap.
    #[must_use]
    pub fn with_max_strikes(mut self, max: u32) -> Self {
        self.max_strikes = max;
        self
    }

    /// Sets the strike decay period.
    #[must_use]
    pub fn with_strike_decay_period(mut self, seconds: f32) -> Self {
        self.strike_decay_period = seconds;
        self
    }

    /// Sets the hearing cone.
    #[must_use]
    pub fn with_hearing(mut self, radius: f32, angle_deg: f32) -> Self {
        self.hearing_radius = radius;
        self.hearing_angle = angle_deg;
        self
    }

    /// Sets the cooldown between hearing strikes.
    #[must_use]
    pub fn with_strike_register_cooldown(mut self, seconds: f32) -> Self {
        self.strike_register_cooldown = seconds;
        self
    }

    /// Sets the investigation look-around duration.
    #[must_use]
    pub fn with_investigate_wait_time(mut self, seconds: f32) -> Self {
        self.investigate_wait_time = seconds;
        self
    }

    /// Sets the backup call parameters.
    #[must_use]
    pub fn with_backup(mut self, count: u32, cooldown: f32) -> Self {
        self.backup_agent_count = count;
        self.backup_cooldown = cooldown;
        self
    }

    /// Sets the backup spawn ring.
    #[must_use]
    pub fn with_spawn_radius(mut self, min: f32, max: f32) -> Self {
        self.spawn_radius_min = min;
        self.spawn_radius_max = max;
        self
    }

    /// Sets the prefabs backup calls choose from.
    #[must_use]
    pub fn with_backup_prefabs(mut self, prefabs: Vec<PrefabKind>) -> Self {
        self.backup_prefabs = prefabs;
        self
    }

    /// Distance past which a chase is abandoned.
    #[must_use]
    pub fn chase_give_up_distance(&self) -> f32 {
        self.hearing_radius + self.chase_give_up_margin
    }

    /// Checks every field for values the state machine cannot work with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_strikes == 0 {
            return Err(ConfigError::ZeroMaxStrikes);
        }

        let positive = [
            ("idle_time", self.idle_time),
            ("strike_decay_period", self.strike_decay_period),
            ("hearing_radius", self.hearing_radius),
            ("strike_register_cooldown", self.strike_register_cooldown),
            ("investigate_wait_time", self.investigate_wait_time),
            ("look_around_speed", self.look_around_speed),
            ("backup_cooldown", self.backup_cooldown),
            ("arrival_threshold", self.arrival_threshold),
        ];
        for (field, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(ConfigError::NotPositive { field, value });
            }
        }

        if !(self.chase_give_up_margin.is_finite() && self.chase_give_up_margin >= 0.0) {
            return Err(ConfigError::NotPositive {
                field: "chase_give_up_margin",
                value: self.chase_give_up_margin,
            });
        }

        if !(self.hearing_angle > 0.0 && self.hearing_angle <= 360.0) {
            return Err(ConfigError::HearingAngle(self.hearing_angle));
        }

        if !(self.spawn_radius_min >= 0.0 && self.spawn_radius_min <= self.spawn_radius_max)
            || !self.spawn_radius_max.is_finite()
        {
            return Err(ConfigError::SpawnRadius {
                min: self.spawn_radius_min,
                max: self.spawn_radius_max,
            });
        }

        Ok(())
    }
}
