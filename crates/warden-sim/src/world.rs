//! Headless world: kinematic guard bodies and scripted intruders.
//!
//! Bodies stand in for a navmesh agent: a new destination takes one tick to
//! "path", then the body walks straight at it. Intruders loop over their
//! waypoints and make noise while walking.

use std::collections::{BTreeMap, BTreeSet};

use glam::Vec3;
use tracing::{debug, info};
use warden_ai::{AgentHost, AlertEvent, Navigator, Subject, SubjectQuery};
use warden_common::{distance, flatten, rotate_yaw, AgentId, PrefabKind, SubjectId};

use crate::config::IntruderSpec;

/// Kinematic stand-in for a navmesh agent.
#[derive(Debug, Clone)]
pub struct Body {
    /// Current position
    position: Vec3,
    /// Facing on the ground plane
    forward: Vec3,
    /// Current destination
    destination: Option<Vec3>,
    /// Path is still being "computed"
    pending: bool,
    /// Prefab the body was built from
    prefab: PrefabKind,
}

impl Body {
    /// Creates a body at rest facing +Z.
    #[must_use]
    pub fn new(prefab: PrefabKind, position: Vec3) -> Self {
        Self {
            position,
            forward: Vec3::Z,
            destination: None,
            pending: false,
            prefab,
        }
    }

    /// Prefab the body was built from.
    #[must_use]
    pub const fn prefab(&self) -> PrefabKind {
        self.prefab
    }

    /// Walks toward the destination at `speed`.
    pub fn advance(&mut self, dt: f32, speed: f32) {
        if self.pending {
            self.pending = false;
            return;
        }
        let Some(destination) = self.destination else {
            return;
        };

        let to_target = flatten(destination - self.position);
        let remaining = to_target.length();
        if remaining <= f32::EPSILON {
            return;
        }

        let step = (speed * dt).min(remaining);
        let direction = to_target / remaining;
        self.position += direction * step;
        self.forward = direction;
    }
}

impl Navigator for Body {
    fn position(&self) -> Vec3 {
        self.position
    }

    fn forward(&self) -> Vec3 {
        self.forward
    }

    fn set_destination(&mut self, point: Vec3) {
        self.destination = Some(point);
        self.pending = true;
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
    }
}

/// All guard bodies, keyed by the agent that drives them.
#[derive(Debug, Clone)]
pub struct BodyPool {
    bodies: BTreeMap<AgentId, Body>,
    move_speed: f32,
    next_id: u64,
}

impl BodyPool {
    /// Creates an empty pool.
    #[must_use]
    pub fn new(move_speed: f32) -> Self {
        Self {
            bodies: BTreeMap::new(),
            move_speed,
            next_id: 1,
        }
    }

    /// Gets a body.
    #[must_use]
    pub fn get(&self, agent: AgentId) -> Option<&Body> {
        self.bodies.get(&agent)
    }

    /// Returns the number of bodies.
    #[must_use]
    pub fn len(&self) -> usize {
        self.bodies.len()
    }

    /// Returns whether there are no bodies.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bodies.is_empty()
    }

    /// Iterates bodies in agent order.
    pub fn iter(&self) -> impl Iterator<Item = (AgentId, &Body)> {
        self.bodies.iter().map(|(&id, body)| (id, body))
    }

    /// Moves every body one step.
    pub fn advance(&mut self, dt: f32) {
        let speed = self.move_speed;
        for body in self.bodies.values_mut() {
            body.advance(dt, speed);
        }
    }
}

impl AgentHost for BodyPool {
    fn navigator(&mut self, agent: AgentId) -> Option<&mut dyn Navigator> {
        self.bodies
            .get_mut(&agent)
            .map(|body| body as &mut dyn Navigator)
    }

    fn spawn_body(&mut self, prefab: PrefabKind, position: Vec3) -> AgentId {
        let id = AgentId::from_raw(self.next_id);
        self.next_id += 1;
        self.bodies.insert(id, Body::new(prefab, position));
        id
    }
}

/// A scripted intruder.
#[derive(Debug, Clone)]
pub struct Intruder {
    id: SubjectId,
    position: Vec3,
    path: Vec<Vec3>,
    waypoint: usize,
    speed: f32,
    respawn: Vec3,
    hide_window: Option<(f32, f32)>,
    moving: bool,
    hidden: bool,
}

impl Intruder {
    /// Creates an intruder from its scenario entry.
    #[must_use]
    pub fn from_spec(id: SubjectId, spec: &IntruderSpec) -> Self {
        Self {
            id,
            position: spec.start,
            path: spec.path.clone(),
            waypoint: 0,
            speed: spec.speed,
            respawn: spec.respawn,
            hide_window: spec.hide_at.map(|at| (at, at + spec.hide_for)),
            moving: false,
            hidden: false,
        }
    }

    /// Walks the path, or hides while inside the hide window.
    pub fn advance(&mut self, dt: f32, elapsed: f32) {
        self.hidden = self
            .hide_window
            .is_some_and(|(from, until)| (from..until).contains(&elapsed));
        self.moving = false;
        if self.hidden || self.path.is_empty() {
            return;
        }

        let target = self.path[self.waypoint % self.path.len()];
        let to_target = target - self.position;
        let remaining = to_target.length();
        let step = self.speed * dt;

        if remaining <= step {
            self.position = target;
            self.waypoint = (self.waypoint + 1) % self.path.len();
        } else {
            self.position += to_target / remaining * step;
        }
        self.moving = step > 0.0;
    }

    /// Sends the intruder back to its respawn point and restarts its path.
    pub fn respawn(&mut self) {
        self.position = self.respawn;
        self.waypoint = 0;
        self.moving = false;
    }
}

impl Subject for Intruder {
    fn id(&self) -> SubjectId {
        self.id
    }

    fn position(&self) -> Vec3 {
        self.position
    }

    fn is_emitting_noise(&self) -> bool {
        self.moving
    }

    fn is_concealed(&self) -> bool {
        self.hidden
    }
}

/// Intruders in scan order.
#[derive(Debug, Clone, Default)]
pub struct IntruderSet {
    intruders: Vec<Intruder>,
}

impl IntruderSet {
    /// Builds the set from scenario entries. Ids start at 1.
    #[must_use]
    pub fn from_specs(specs: &[IntruderSpec]) -> Self {
        let intruders = specs
            .iter()
            .zip(1u64..)
            .map(|(spec, raw)| Intruder::from_spec(SubjectId::from_raw(raw), spec))
            .collect();
        Self { intruders }
    }

    /// Iterates intruders in scan order.
    pub fn iter(&self) -> impl Iterator<Item = &Intruder> {
        self.intruders.iter()
    }

    /// Advances every intruder.
    pub fn advance(&mut self, dt: f32, elapsed: f32) {
        for intruder in &mut self.intruders {
            intruder.advance(dt, elapsed);
        }
    }

    /// Respawns an intruder. Returns whether it exists.
    pub fn respawn(&mut self, id: SubjectId) -> bool {
        match self.intruders.iter_mut().find(|i| i.id == id) {
            Some(intruder) => {
                intruder.respawn();
                true
            },
            None => false,
        }
    }
}

impl SubjectQuery for IntruderSet {
    fn subjects_within(&self, center: Vec3, radius: f32) -> Vec<&dyn Subject> {
        self.intruders
            .iter()
            .filter(|i| distance(i.position, center) <= radius)
            .map(|i| i as &dyn Subject)
            .collect()
    }

    fn subject(&self, id: SubjectId) -> Option<&dyn Subject> {
        self.intruders
            .iter()
            .find(|i| i.id == id)
            .map(|i| i as &dyn Subject)
    }
}

/// A subject crossing a guard's proximity zone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProximityChange {
    /// Guard whose zone was crossed
    pub agent: AgentId,
    /// Who crossed it
    pub subject: SubjectId,
    /// `true` on entry, `false` on exit
    pub entered: bool,
}

/// Bodies, intruders and proximity bookkeeping.
#[derive(Debug, Clone)]
pub struct SimWorld {
    bodies: BodyPool,
    intruders: IntruderSet,
    proximity_radius: f32,
    /// Pairs inside a zone as of the last `proximity_changes`
    inside: BTreeSet<(AgentId, SubjectId)>,
    elapsed: f32,
}

impl SimWorld {
    /// Creates a world with no guards.
    #[must_use]
    pub fn new(move_speed: f32, proximity_radius: f32, intruders: &[IntruderSpec]) -> Self {
        Self {
            bodies: BodyPool::new(move_speed),
            intruders: IntruderSet::from_specs(intruders),
            proximity_radius,
            inside: BTreeSet::new(),
            elapsed: 0.0,
        }
    }

    /// Guard bodies.
    #[must_use]
    pub const fn bodies(&self) -> &BodyPool {
        &self.bodies
    }

    /// Intruders.
    #[must_use]
    pub const fn intruders(&self) -> &IntruderSet {
        &self.intruders
    }

    /// Seconds simulated so far.
    #[must_use]
    pub const fn elapsed(&self) -> f32 {
        self.elapsed
    }

    /// Host and subject views, borrowed together for a director pass.
    pub fn split_mut(&mut self) -> (&mut BodyPool, &IntruderSet) {
        (&mut self.bodies, &self.intruders)
    }

    /// Advances intruders by one tick.
    pub fn advance_intruders(&mut self, dt: f32) {
        self.elapsed += dt;
        self.intruders.advance(dt, self.elapsed);
    }

    /// Moves guard bodies by one tick.
    pub fn move_bodies(&mut self, dt: f32) {
        self.bodies.advance(dt);
    }

    /// Enter/leave pairs since the previous call.
    ///
    /// Zones are spheres, measured like the chase give-up range.
    /// Hidden intruders do not trip zones.
    pub fn proximity_changes(&mut self) -> Vec<ProximityChange> {
        let mut now_inside = BTreeSet::new();
        for (agent, body) in self.bodies.iter() {
            for intruder in self.intruders.iter() {
                let close = distance(body.position(), intruder.position()) <= self.proximity_radius;
                if close && !intruder.is_concealed() {
                    now_inside.insert((agent, intruder.id()));
                }
            }
        }

        let left = self.inside.difference(&now_inside).map(|&(agent, subject)| {
            ProximityChange {
                agent,
                subject,
                entered: false,
            }
        });
        let entered = now_inside.difference(&self.inside).map(|&(agent, subject)| {
            ProximityChange {
                agent,
                subject,
                entered: true,
            }
        });
        let changes = left.chain(entered).collect();

        self.inside = now_inside;
        changes
    }

    /// Applies the world side of an event. Returns whether anything changed.
    pub fn apply_event(&mut self, event: &AlertEvent) -> bool {
        match event {
            AlertEvent::SubjectCaught { agent, subject } => {
                let respawned = self.intruders.respawn(*subject);
                if respawned {
                    info!(agent = %agent, "{subject} caught, sent to respawn");
                    self.inside.retain(|&(_, s)| s != *subject);
                }
                respawned
            },
            AlertEvent::AgentSpawned { agent, position, .. } => {
                debug!(agent = %agent, "Backup body placed at {position}");
                false
            },
            _ => false,
        }
    }
}
