//! Fixed-step simulation loop and run report.

use glam::Vec3;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use warden_ai::{
    AgentDirector, AgentHost, AgentState, AgentTemplate, AlertEvent, Clock, EventBus, ManualClock,
    Navigator,
};
use warden_common::{AgentId, PrefabKind};

use crate::config::SimConfig;
use crate::error::SimResult;
use crate::world::SimWorld;

/// Event bus capacity; sized so a busy tick never drops events.
const EVENT_CAPACITY: usize = 8192;

/// Final snapshot of one agent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentSummary {
    /// Agent
    pub agent: AgentId,
    /// Behavior state at the end of the run
    pub state: AgentState,
    /// Strikes at the end of the run
    pub strikes: u32,
    /// Body position at the end of the run
    pub position: Vec3,
}

/// What happened during a run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunReport {
    /// Ticks simulated
    pub ticks: u64,
    /// Seconds simulated
    pub elapsed_secs: f64,
    /// Final agent snapshots, in agent order
    pub agents: Vec<AgentSummary>,
    /// Times any agent hit its strike cap
    pub escalations: usize,
    /// Backup agents spawned
    pub spawned: usize,
    /// Backup calls refused by the cooldown
    pub throttled: usize,
    /// Intruders sent back to their respawn point
    pub caught: usize,
    /// Every event, in publish order
    pub events: Vec<AlertEvent>,
}

impl RunReport {
    /// Counts an event and appends it to the log.
    pub fn record(&mut self, event: AlertEvent) {
        match event {
            AlertEvent::MaxStrikesReached { .. } => self.escalations += 1,
            AlertEvent::AgentSpawned { .. } => self.spawned += 1,
            AlertEvent::BackupThrottled { .. } => self.throttled += 1,
            _ => {},
        }
        self.events.push(event);
    }
}

/// A scenario in progress.
#[derive(Debug)]
pub struct Simulation {
    config: SimConfig,
    world: SimWorld,
    director: AgentDirector,
    bus: EventBus,
    clock: ManualClock,
    report: RunReport,
}

impl Simulation {
    /// Builds the world and places every guard.
    pub fn new(config: SimConfig) -> SimResult<Self> {
        config.validate()?;

        let mut world = SimWorld::new(config.move_speed, config.proximity_radius, &config.intruders);
        let mut director = AgentDirector::new(config.seed);

        let backup = config.backup();
        director.register_template(backup.prefab, AgentTemplate::new(backup.config, backup.route));

        for (index, spec) in config.guards.iter().enumerate() {
            let (bodies, _) = world.split_mut();
            let id = bodies.spawn_body(PrefabKind::GUARD, spec.position);
            director.add_agent(id, config.guard_config(index).clone(), spec.route.clone());
            debug!(agent = %id, "Guard placed at {}", spec.position);
        }

        info!(
            "Simulation ready: {} guards, {} intruders, {} ticks",
            director.len(),
            config.intruders.len(),
            config.total_ticks()
        );

        Ok(Self {
            clock: ManualClock::new(config.tick_dt()),
            config,
            world,
            director,
            bus: EventBus::new(EVENT_CAPACITY),
            report: RunReport::default(),
        })
    }

    /// The world.
    #[must_use]
    pub const fn world(&self) -> &SimWorld {
        &self.world
    }

    /// The agents.
    #[must_use]
    pub const fn director(&self) -> &AgentDirector {
        &self.director
    }

    /// Mutable agents, e.g. to force a backup call from a test or script.
    pub fn director_mut(&mut self) -> &mut AgentDirector {
        &mut self.director
    }

    /// Ticks taken so far.
    #[must_use]
    pub const fn ticks(&self) -> u64 {
        self.clock.ticks()
    }

    /// Advances the scenario by one tick.
    pub fn step(&mut self) {
        self.clock.step();
        let dt = self.clock.delta_time();
        let now = self.clock.now();

        self.world.advance_intruders(dt);

        for change in self.world.proximity_changes() {
            let (bodies, intruders) = self.world.split_mut();
            if change.entered {
                self.director
                    .subject_entered(change.agent, change.subject, now, bodies, intruders, &self.bus);
            } else {
                self.director
                    .subject_left(change.agent, change.subject, now, bodies, intruders, &self.bus);
            }
        }

        let (bodies, intruders) = self.world.split_mut();
        self.director.update(&self.clock, bodies, intruders, &self.bus);

        self.world.move_bodies(dt);

        for event in self.bus.drain() {
            if self.world.apply_event(&event) {
                self.report.caught += 1;
            }
            self.report.record(event);
        }
    }

    /// Runs the configured duration and returns the report.
    pub fn run(&mut self) -> RunReport {
        for _ in 0..self.config.total_ticks() {
            self.step();
        }
        self.report()
    }

    /// Report so far, with a fresh agent snapshot.
    #[must_use]
    pub fn report(&self) -> RunReport {
        let agents = self
            .director
            .iter()
            .map(|(id, agent)| AgentSummary {
                agent: id,
                state: agent.state(),
                strikes: agent.strikes(),
                position: self
                    .world
                    .bodies()
                    .get(id)
                    .map_or(Vec3::ZERO, Navigator::position),
            })
            .collect();

        RunReport {
            ticks: self.clock.ticks(),
            elapsed_secs: self.clock.now(),
            agents,
            ..self.report.clone()
        }
    }
}
