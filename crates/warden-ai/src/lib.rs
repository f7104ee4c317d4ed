//! # Warden AI
//!
//! Guard behavior for Warden.
//!
//! This crate provides the guard brain and everything it talks to:
//! - The patrol agent state machine (Idle, Patrol, Chase, Investigate)
//! - Strike escalation with decay and a hearing cooldown
//! - Rate-limited backup calls with ring spawn placement
//! - Capability traits for navigation, perception, time and events
//! - The agent director that ticks many agents and spawns backup
//! - Mock collaborators for tests and headless hosts

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(clippy::unwrap_used)]

pub mod agent;
pub mod backup;
pub mod clock;
pub mod config;
pub mod director;
pub mod events;
pub mod navigation;
pub mod senses;
pub mod strikes;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::agent::*;
    pub use crate::backup::*;
    pub use crate::clock::*;
    pub use crate::config::*;
    pub use crate::director::*;
    pub use crate::events::*;
    pub use crate::navigation::*;
    pub use crate::senses::*;
    pub use crate::strikes::*;
}

pub use prelude::*;

#[cfg(test)]
mod tests {
    use super::*;
    use warden_common::{AgentId, SubjectId, Vec3};

    #[test]
    fn test_guard_walks_its_route() {
        let route = vec![Vec3::new(0.0, 0.0, 5.0), Vec3::new(5.0, 0.0, 5.0)];
        let mut director = AgentDirector::new(7);
        let guard = AgentId::from_raw(1);
        director.add_agent(guard, ChaserConfig::wanderer(), route.clone());

        let mut host = MockAgentHost::new(100);
        host.add_body(guard, Vec3::ZERO);
        let subjects = MockSubjects::new();
        let mut clock = ManualClock::new(0.5);

        for _ in 0..4 {
            clock.step();
            director.update(&clock, &mut host, &subjects, &NullSink);
        }
        assert_eq!(host.bodies[&guard].destination(), Some(route[0]));

        if let Some(body) = host.bodies.get_mut(&guard) {
            body.arrive();
        }
        clock.step();
        director.update(&clock, &mut host, &subjects, &NullSink);
        assert_eq!(director.get(guard).map(PatrolAgent::patrol_index), Some(1));
    }

    #[test]
    fn test_intruder_escalation_end_to_end() {
        let mut director = AgentDirector::new(7);
        let guard = AgentId::from_raw(1);
        director.add_agent(guard, ChaserConfig::default(), Vec::new());

        let mut host = MockAgentHost::new(100);
        host.add_body(guard, Vec3::ZERO);

        let intruder = SubjectId::from_raw(1);
        let mut subjects = MockSubjects::new();
        subjects.add(MockSubject::new(intruder, Vec3::new(0.0, 0.0, 2.0)).noisy(true));

        let bus = EventBus::default();
        let mut clock = ManualClock::new(0.5);
        let mut spawned = Vec::new();
        for _ in 0..20 {
            clock.step();
            spawned.extend(director.update(&clock, &mut host, &subjects, &bus));
        }

        let events = bus.drain();
        assert_eq!(director.get(guard).map(PatrolAgent::strikes), Some(3));
        assert!(events.contains(&AlertEvent::SubjectCaught {
            agent: guard,
            subject: intruder,
        }));
        assert!(!spawned.is_empty());
        assert_eq!(host.spawned.len(), spawned.len());
    }
}
