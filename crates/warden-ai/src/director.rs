//! Agent director: owns every guard, ticks them, and spawns backup.

use std::collections::BTreeMap;

use glam::Vec3;
use tracing::{debug, info, warn};

use crate::agent::{PatrolAgent, TickContext};
use crate::backup::SpawnRequest;
use crate::clock::Clock;
use crate::config::ChaserConfig;
use crate::events::{AlertEvent, EventSink};
use crate::navigation::{MockNavigator, Navigator};
use crate::senses::SubjectQuery;
use warden_common::{AgentId, PrefabKind, SubjectId};

/// Golden-ratio constant used to spread per-agent seeds.
const SEED_MIX: u64 = 0x9E37_79B9_7F4A_7C15;

/// How agents built from a prefab are configured.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AgentTemplate {
    /// Agent configuration
    pub config: ChaserConfig,
    /// Patrol route (may be empty)
    pub route: Vec<Vec3>,
}

impl AgentTemplate {
    /// Creates a template.
    #[must_use]
    pub fn new(config: ChaserConfig, route: Vec<Vec3>) -> Self {
        Self { config, route }
    }
}

/// Host-side bodies the director drives.
pub trait AgentHost {
    /// The path follower for an agent's body.
    fn navigator(&mut self, agent: AgentId) -> Option<&mut dyn Navigator>;
    /// Instantiates a body and returns the id of the agent it belongs to.
    fn spawn_body(&mut self, prefab: PrefabKind, position: Vec3) -> AgentId;
}

/// Derives an agent's RNG seed from the world seed.
#[must_use]
pub const fn agent_seed(world_seed: u64, agent: AgentId) -> u64 {
    (world_seed ^ agent.raw()).wrapping_mul(SEED_MIX)
}

/// Which way a subject crossed a proximity zone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Crossing {
    Entered,
    Left,
}

/// Owns and updates all guard agents.
#[derive(Debug, Default)]
pub struct AgentDirector {
    /// Agents in deterministic tick order
    agents: BTreeMap<AgentId, PatrolAgent>,
    /// Templates for backup spawns
    templates: BTreeMap<PrefabKind, AgentTemplate>,
    /// Seed all agent RNGs derive from
    world_seed: u64,
}

impl AgentDirector {
    /// Creates an empty director.
    #[must_use]
    pub fn new(world_seed: u64) -> Self {
        Self {
            agents: BTreeMap::new(),
            templates: BTreeMap::new(),
            world_seed,
        }
    }

    /// Registers how agents spawned from `prefab` are configured.
    pub fn register_template(&mut self, prefab: PrefabKind, template: AgentTemplate) {
        self.templates.insert(prefab, template);
    }

    /// Template for a prefab, if registered.
    #[must_use]
    pub fn template(&self, prefab: PrefabKind) -> Option<&AgentTemplate> {
        self.templates.get(&prefab)
    }

    /// Adds an agent for an existing body. Replaces any agent with the same id.
    pub fn add_agent(&mut self, id: AgentId, config: ChaserConfig, route: Vec<Vec3>) {
        let agent = PatrolAgent::new(id, config, route, agent_seed(self.world_seed, id));
        self.agents.insert(id, agent);
    }

    /// Removes an agent.
    pub fn remove_agent(&mut self, id: AgentId) -> Option<PatrolAgent> {
        self.agents.remove(&id)
    }

    /// Returns the number of agents.
    #[must_use]
    pub fn len(&self) -> usize {
        self.agents.len()
    }

    /// Returns whether there are no agents.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }

    /// Gets an agent.
    #[must_use]
    pub fn get(&self, id: AgentId) -> Option<&PatrolAgent> {
        self.agents.get(&id)
    }

    /// Gets a mutable agent.
    pub fn get_mut(&mut self, id: AgentId) -> Option<&mut PatrolAgent> {
        self.agents.get_mut(&id)
    }

    /// Iterates agents in tick order.
    pub fn iter(&self) -> impl Iterator<Item = (AgentId, &PatrolAgent)> {
        self.agents.iter().map(|(&id, agent)| (id, agent))
    }

    /// Ticks every agent once, then spawns any requested backup.
    ///
    /// Returns the ids of agents spawned this pass. They are not ticked until
    /// the next call.
    pub fn update<H: AgentHost>(
        &mut self,
        clock: &dyn Clock,
        host: &mut H,
        subjects: &dyn SubjectQuery,
        events: &dyn EventSink,
    ) -> Vec<AgentId> {
        let dt = clock.delta_time();
        let now = clock.now();
        let mut spawns = Vec::new();

        for (&id, agent) in &mut self.agents {
            let Some(navigator) = host.navigator(id) else {
                warn!(agent = %id, "No body for agent, skipping tick");
                continue;
            };

            let mut ctx = TickContext {
                dt,
                now,
                navigator,
                subjects,
                events,
                spawns: &mut spawns,
            };
            agent.tick(&mut ctx);
        }

        self.apply_spawns(spawns, host, events)
    }

    /// Routes a proximity-zone entry to an agent.
    pub fn subject_entered<H: AgentHost>(
        &mut self,
        agent: AgentId,
        subject: SubjectId,
        now: f64,
        host: &mut H,
        subjects: &dyn SubjectQuery,
        events: &dyn EventSink,
    ) -> Vec<AgentId> {
        self.route_crossing(agent, subject, Crossing::Entered, now, host, subjects, events)
    }

    /// Routes a proximity-zone exit to an agent.
    pub fn subject_left<H: AgentHost>(
        &mut self,
        agent: AgentId,
        subject: SubjectId,
        now: f64,
        host: &mut H,
        subjects: &dyn SubjectQuery,
        events: &dyn EventSink,
    ) -> Vec<AgentId> {
        self.route_crossing(agent, subject, Crossing::Left, now, host, subjects, events)
    }

    #[allow(clippy::too_many_arguments)]
    fn route_crossing<H: AgentHost>(
        &mut self,
        agent: AgentId,
        subject: SubjectId,
        crossing: Crossing,
        now: f64,
        host: &mut H,
        subjects: &dyn SubjectQuery,
        events: &dyn EventSink,
    ) -> Vec<AgentId> {
        let Some(patrol) = self.agents.get_mut(&agent) else {
            debug!(agent = %agent, "Proximity event for unknown agent");
            return Vec::new();
        };
        let Some(navigator) = host.navigator(agent) else {
            warn!(agent = %agent, "No body for agent, dropping proximity event");
            return Vec::new();
        };

        let mut spawns = Vec::new();
        let mut ctx = TickContext {
            dt: 0.0,
            now,
            navigator,
            subjects,
            events,
            spawns: &mut spawns,
        };
        match crossing {
            Crossing::Entered => patrol.on_subject_entered(subject, &mut ctx),
            Crossing::Left => patrol.on_subject_left(subject, &mut ctx),
        }

        self.apply_spawns(spawns, host, events)
    }

    fn apply_spawns<H: AgentHost>(
        &mut self,
        spawns: Vec<SpawnRequest>,
        host: &mut H,
        events: &dyn EventSink,
    ) -> Vec<AgentId> {
        let mut spawned = Vec::with_capacity(spawns.len());

        for request in spawns {
            let id = host.spawn_body(request.prefab, request.position);
            let template = self.templates.get(&request.prefab).cloned().unwrap_or_else(|| {
                warn!(prefab = request.prefab.raw(), "No template for prefab, using defaults");
                AgentTemplate::default()
            });

            self.add_agent(id, template.config, template.route);
            info!(agent = %id, called_by = %request.called_by, "Backup agent spawned at {}", request.position);
            events.publish(AlertEvent::AgentSpawned {
                agent: id,
                prefab: request.prefab,
                position: request.position,
                called_by: request.called_by,
            });
            spawned.push(id);
        }

        spawned
    }
}

/// Mock host for testing: a navigator per agent, spawned bodies get fresh ids.
#[derive(Debug, Default)]
pub struct MockAgentHost {
    /// Bodies by agent
    pub bodies: BTreeMap<AgentId, MockNavigator>,
    /// Every spawn, in order
    pub spawned: Vec<(AgentId, PrefabKind, Vec3)>,
    /// Next raw id handed out by `spawn_body`
    next_id: u64,
}

impl MockAgentHost {
    /// Creates a host whose spawned ids start at `first_spawn_id`.
    #[must_use]
    pub fn new(first_spawn_id: u64) -> Self {
        Self {
            bodies: BTreeMap::new(),
            spawned: Vec::new(),
            next_id: first_spawn_id,
        }
    }

    /// Adds a body for an agent.
    pub fn add_body(&mut self, agent: AgentId, position: Vec3) {
        self.bodies
            .insert(agent, MockNavigator::new(position));
    }
}

impl AgentHost for MockAgentHost {
    fn navigator(&mut self, agent: AgentId) -> Option<&mut dyn Navigator> {
        self.bodies
            .get_mut(&agent)
            .map(|nav| nav as &mut dyn Navigator)
    }

    fn spawn_body(&mut self, prefab: PrefabKind, position: Vec3) -> AgentId {
        let id = AgentId::from_raw(self.next_id);
        self.next_id += 1;
        self.add_body(id, position);
        self.spawned.push((id, prefab, position));
        id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::AgentState;
    use crate::clock::ManualClock;
    use crate::events::EventBus;
    use crate::senses::{MockSubject, MockSubjects};

    fn guard() -> AgentId {
        AgentId::from_raw(1)
    }

    fn setup() -> (AgentDirector, MockAgentHost, MockSubjects, EventBus) {
        let mut director = AgentDirector::new(1234);
        director.add_agent(guard(), ChaserConfig::default(), Vec::new());

        let mut host = MockAgentHost::new(100);
        host.add_body(guard(), Vec3::ZERO);

        (director, host, MockSubjects::new(), EventBus::new(4096))
    }

    #[test]
    fn test_update_ticks_agents() {
        let (mut director, mut host, subjects, bus) = setup();
        let mut clock = ManualClock::new(0.5);

        for _ in 0..4 {
            clock.step();
            director.update(&clock, &mut host, &subjects, &bus);
        }
        assert_eq!(
            director.get(guard()).map(PatrolAgent::state),
            Some(AgentState::Patrol)
        );
    }

    #[test]
    fn test_missing_body_is_skipped() {
        let (mut director, mut host, subjects, bus) = setup();
        director.add_agent(AgentId::from_raw(2), ChaserConfig::default(), Vec::new());
        let clock = ManualClock::new(5.0);

        director.update(&clock, &mut host, &subjects, &bus);
        assert_eq!(
            director.get(AgentId::from_raw(2)).map(PatrolAgent::state),
            Some(AgentState::Idle)
        );
        assert_eq!(
            director.get(guard()).map(PatrolAgent::state),
            Some(AgentState::Patrol)
        );
    }

    #[test]
    fn test_escalation_spawns_backup_from_template() {
        let (mut director, mut host, mut subjects, bus) = setup();
        let sentry_route = vec![Vec3::new(4.0, 0.0, 4.0)];
        director.register_template(
            PrefabKind::GUARD,
            AgentTemplate::new(ChaserConfig::wanderer(), sentry_route.clone()),
        );
        director.add_agent(guard(), ChaserConfig::default().with_max_strikes(1), Vec::new());
        subjects.add(
            MockSubject::new(SubjectId::from_raw(9), Vec3::new(0.0, 0.0, 3.0)).noisy(true),
        );

        let clock = ManualClock::new(0.5);
        let new_ids = director.update(&clock, &mut host, &subjects, &bus);
        assert_eq!(new_ids.len(), 1);
        assert_eq!(director.len(), 2);

        let backup = director.get(new_ids[0]).expect("spawned agent");
        assert_eq!(backup.route(), sentry_route.as_slice());
        assert!(!backup.config().hearing_enabled);
        assert_eq!(host.spawned.len(), 1);

        let (_, prefab, position) = host.spawned[0];
        assert_eq!(prefab, PrefabKind::GUARD);
        let ring = position.length();
        assert!((1.0 - 1e-4..=2.0 + 1e-4).contains(&ring));

        let events = bus.drain();
        assert!(events.iter().any(|e| matches!(
            e,
            AlertEvent::AgentSpawned { called_by, .. } if *called_by == guard()
        )));
    }

    #[test]
    fn test_spawned_agents_wait_for_next_pass() {
        let (mut director, mut host, mut subjects, bus) = setup();
        let config = ChaserConfig::default().with_max_strikes(1);
        director.add_agent(guard(), config, Vec::new());
        subjects.add(
            MockSubject::new(SubjectId::from_raw(9), Vec3::new(0.0, 0.0, 3.0)).noisy(true),
        );

        let mut clock = ManualClock::new(0.5);
        clock.step();
        let spawned = director.update(&clock, &mut host, &subjects, &bus);
        assert_eq!(spawned.len(), 1);

        // Only the caller ticked: one StateChanged, and it belongs to the guard.
        let changes: Vec<AgentId> = bus
            .drain()
            .iter()
            .filter(|e| matches!(e, AlertEvent::StateChanged { .. }))
            .map(AlertEvent::agent)
            .collect();
        assert_eq!(changes, vec![guard()]);
        assert_eq!(
            director.get(spawned[0]).map(PatrolAgent::state),
            Some(AgentState::Idle)
        );
    }

    #[test]
    fn test_missing_template_uses_defaults() {
        let (mut director, mut host, _subjects, bus) = setup();
        let request = SpawnRequest {
            prefab: PrefabKind::SENTRY,
            position: Vec3::new(1.0, 0.0, 0.0),
            called_by: guard(),
        };
        let ids = director.apply_spawns(vec![request], &mut host, &bus);
        let agent = director.get(ids[0]).expect("spawned agent");
        assert_eq!(agent.config(), &ChaserConfig::default());
        assert!(agent.route().is_empty());
    }

    #[test]
    fn test_proximity_routing() {
        let (mut director, mut host, mut subjects, bus) = setup();
        let intruder = SubjectId::from_raw(5);
        subjects.add(MockSubject::new(intruder, Vec3::new(0.0, 0.0, 1.0)));

        director.subject_entered(guard(), intruder, 0.0, &mut host, &subjects, &bus);
        assert_eq!(
            director.get(guard()).map(PatrolAgent::state),
            Some(AgentState::Chase)
        );

        director.subject_left(guard(), intruder, 0.0, &mut host, &subjects, &bus);
        assert_eq!(
            director.get(guard()).map(PatrolAgent::state),
            Some(AgentState::Idle)
        );

        let spawned = director.subject_entered(
            AgentId::from_raw(77),
            intruder,
            0.0,
            &mut host,
            &subjects,
            &bus,
        );
        assert!(spawned.is_empty());
    }

    #[test]
    fn test_seeds_differ_per_agent() {
        assert_ne!(
            agent_seed(1, AgentId::from_raw(1)),
            agent_seed(1, AgentId::from_raw(2))
        );
        assert_eq!(
            agent_seed(1, AgentId::from_raw(3)),
            agent_seed(1, AgentId::from_raw(3))
        );
    }

    #[test]
    fn test_remove_agent() {
        let (mut director, ..) = setup();
        assert!(director.remove_agent(guard()).is_some());
        assert!(director.is_empty());
        assert!(director.remove_agent(guard()).is_none());
    }
}
