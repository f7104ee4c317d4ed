//! Alert events and the bus that carries them out of the agents.

use crossbeam_channel::{bounded, Receiver, Sender};
use glam::Vec3;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::agent::AgentState;
use warden_common::{AgentId, PrefabKind, SubjectId};

/// Events published by agents and the director.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum AlertEvent {
    /// Agent changed behavior state
    StateChanged {
        /// Agent
        agent: AgentId,
        /// Previous state
        from: AgentState,
        /// New state
        to: AgentState,
    },
    /// A strike was added
    StrikeRegistered {
        /// Agent
        agent: AgentId,
        /// Count after the strike
        strikes: u32,
    },
    /// A strike decayed
    StrikeReduced {
        /// Agent
        agent: AgentId,
        /// Count after the decay
        strikes: u32,
    },
    /// Strikes just reached the cap. Fires once per crossing.
    MaxStrikesReached {
        /// Agent
        agent: AgentId,
        /// Agent position at the time
        position: Vec3,
    },
    /// Backup was requested
    BackupCalled {
        /// Calling agent
        agent: AgentId,
        /// Number of spawn requests queued
        requested: usize,
    },
    /// Backup was refused because the previous call was too recent
    BackupThrottled {
        /// Calling agent
        agent: AgentId,
    },
    /// The subject behind an escalation should be sent back to its respawn point
    SubjectCaught {
        /// Agent that escalated
        agent: AgentId,
        /// Subject to respawn
        subject: SubjectId,
    },
    /// A backup agent entered the world
    AgentSpawned {
        /// New agent
        agent: AgentId,
        /// Prefab it was built from
        prefab: PrefabKind,
        /// Spawn position
        position: Vec3,
        /// Agent whose backup call produced it
        called_by: AgentId,
    },
}

impl AlertEvent {
    /// Agent the event concerns.
    #[must_use]
    pub const fn agent(&self) -> AgentId {
        match self {
            Self::StateChanged { agent, .. }
            | Self::StrikeRegistered { agent, .. }
            | Self::StrikeReduced { agent, .. }
            | Self::MaxStrikesReached { agent, .. }
            | Self::BackupCalled { agent, .. }
            | Self::BackupThrottled { agent }
            | Self::SubjectCaught { agent, .. }
            | Self::AgentSpawned { agent, .. } => *agent,
        }
    }
}

/// Receiver of agent notifications, injected per agent tick.
pub trait EventSink {
    /// Publishes an event. Must not block.
    fn publish(&self, event: AlertEvent);
}

/// Sink that discards everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl EventSink for NullSink {
    fn publish(&self, _event: AlertEvent) {}
}

/// Event bus for broadcasting events to subscribers.
#[derive(Debug)]
pub struct EventBus {
    /// Sender for broadcasting events
    sender: Sender<AlertEvent>,
    /// Receiver for collecting events
    receiver: Receiver<AlertEvent>,
    /// Channel capacity
    capacity: usize,
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(1024)
    }
}

impl EventBus {
    /// Creates a new event bus with the given capacity.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (sender, receiver) = bounded(capacity);
        Self {
            sender,
            receiver,
            capacity,
        }
    }

    /// Publishes an event to the bus.
    pub fn publish(&self, event: AlertEvent) {
        // Non-blocking send - if full, event is dropped
        if let Err(e) = self.sender.try_send(event) {
            warn!("Event bus full, dropped {:?}", e.into_inner());
        }
    }

    /// Drains all pending events.
    pub fn drain(&self) -> Vec<AlertEvent> {
        let mut events = Vec::new();
        while let Ok(event) = self.receiver.try_recv() {
            events.push(event);
        }
        events
    }

    /// Returns the number of pending events.
    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.receiver.len()
    }

    /// Returns the channel capacity.
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// Creates a new sender handle for publishing events.
    #[must_use]
    pub fn sender(&self) -> Sender<AlertEvent> {
        self.sender.clone()
    }
}

impl EventSink for EventBus {
    fn publish(&self, event: AlertEvent) {
        EventBus::publish(self, event);
    }
}

impl EventSink for Sender<AlertEvent> {
    fn publish(&self, event: AlertEvent) {
        if let Err(e) = self.try_send(event) {
            warn!("Event sender full or closed, dropped {:?}", e.into_inner());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn throttled(raw: u64) -> AlertEvent {
        AlertEvent::BackupThrottled {
            agent: AgentId::from_raw(raw),
        }
    }

    #[test]
    fn test_publish_and_drain() {
        let bus = EventBus::new(8);
        bus.publish(throttled(1));
        bus.publish(throttled(2));
        assert_eq!(bus.pending_count(), 2);

        let events = bus.drain();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].agent(), AgentId::from_raw(1));
        assert_eq!(bus.pending_count(), 0);
    }

    #[test]
    fn test_full_bus_drops() {
        let bus = EventBus::new(1);
        bus.publish(throttled(1));
        bus.publish(throttled(2));
        assert_eq!(bus.drain(), vec![throttled(1)]);

        // A drop is logged, not fatal; the bus keeps accepting once drained.
        bus.publish(throttled(3));
        assert_eq!(bus.drain(), vec![throttled(3)]);
    }

    #[test]
    fn test_sender_handle_is_a_sink() {
        let bus = EventBus::default();
        let sender = bus.sender();
        let sink: &dyn EventSink = &sender;
        sink.publish(throttled(3));
        assert_eq!(bus.drain().len(), 1);
    }

    #[test]
    fn test_event_serializes() {
        let event = AlertEvent::StateChanged {
            agent: AgentId::from_raw(4),
            from: AgentState::Idle,
            to: AgentState::Patrol,
        };
        let json = serde_json::to_string(&event).expect("serialize");
        let back: AlertEvent = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back, event);
    }
}
