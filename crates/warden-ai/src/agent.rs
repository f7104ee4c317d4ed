//! The guard agent: Idle → Patrol → Chase → Investigate state machine with
//! strike escalation and backup calls.
//!
//! Each state keeps its local progress in a [`StateContext`] that is rebuilt
//! on every entry, so abandoning a state drops its timers with it. One call to
//! [`PatrolAgent::tick`] runs the always-on strike bookkeeping and the hearing
//! scan, then exactly one state's step. Proximity sensing arrives separately
//! through [`PatrolAgent::on_subject_entered`] / [`PatrolAgent::on_subject_left`].

use glam::Vec3;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::backup::{BackupCaller, BackupOutcome, SpawnRequest};
use crate::config::ChaserConfig;
use crate::events::{AlertEvent, EventSink};
use crate::navigation::{has_arrived, Navigator};
use crate::senses::{hear, SubjectQuery};
use crate::strikes::{StrikeOutcome, StrikeTracker};
use warden_common::{distance, AgentId, SubjectId};

/// Observable behavior state of an agent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AgentState {
    /// Standing still before the next patrol leg
    Idle,
    /// Walking to the next route point
    Patrol,
    /// Pursuing a sensed subject
    Chase,
    /// Checking out where a noise came from
    Investigate,
}

impl AgentState {
    /// Get display name.
    #[must_use]
    pub fn display_name(self) -> &'static str {
        match self {
            Self::Idle => "Idle",
            Self::Patrol => "Patrol",
            Self::Chase => "Chase",
            Self::Investigate => "Investigate",
        }
    }
}

/// Progress of an investigation.
#[derive(Debug, Clone, Copy, PartialEq)]
enum InvestigatePhase {
    /// Walking to the last heard position
    Travel,
    /// At the spot, turning in place
    LookAround {
        /// Seconds spent looking so far
        timer: f32,
    },
}

/// Per-state locals. Rebuilt on every state entry.
#[derive(Debug, Clone, Copy, PartialEq)]
enum StateContext {
    Idle { timer: f32 },
    Patrol,
    Chase,
    Investigate { phase: InvestigatePhase },
}

impl StateContext {
    fn fresh(state: AgentState) -> Self {
        match state {
            AgentState::Idle => Self::Idle { timer: 0.0 },
            AgentState::Patrol => Self::Patrol,
            AgentState::Chase => Self::Chase,
            AgentState::Investigate => Self::Investigate {
                phase: InvestigatePhase::Travel,
            },
        }
    }

    fn state(&self) -> AgentState {
        match self {
            Self::Idle { .. } => AgentState::Idle,
            Self::Patrol => AgentState::Patrol,
            Self::Chase => AgentState::Chase,
            Self::Investigate { .. } => AgentState::Investigate,
        }
    }
}

/// Everything an agent may touch during one tick.
pub struct TickContext<'a> {
    /// Seconds since the previous tick
    pub dt: f32,
    /// Monotonic time in seconds
    pub now: f64,
    /// This agent's body
    pub navigator: &'a mut dyn Navigator,
    /// Perceivable subjects
    pub subjects: &'a dyn SubjectQuery,
    /// Outgoing notifications
    pub events: &'a dyn EventSink,
    /// Deferred backup spawns, applied after the tick pass
    pub spawns: &'a mut Vec<SpawnRequest>,
}

/// One guard NPC's brain.
#[derive(Debug, Clone)]
pub struct PatrolAgent {
    id: AgentId,
    config: ChaserConfig,
    route: Vec<Vec3>,
    patrol_index: usize,
    context: StateContext,
    /// Bumped on every real state change
    transitions: u64,
    target: Option<SubjectId>,
    last_heard_position: Vec3,
    strikes: StrikeTracker,
    backup: BackupCaller,
}

impl PatrolAgent {
    /// Creates an agent in Idle with the given route.
    #[must_use]
    pub fn new(id: AgentId, config: ChaserConfig, route: Vec<Vec3>, seed: u64) -> Self {
        let strikes = StrikeTracker::new(
            config.max_strikes,
            config.strike_decay_period,
            config.strike_register_cooldown,
        );
        Self {
            id,
            config,
            route,
            patrol_index: 0,
            context: StateContext::fresh(AgentState::Idle),
            transitions: 0,
            target: None,
            last_heard_position: Vec3::ZERO,
            strikes,
            backup: BackupCaller::new(seed),
        }
    }

    /// Agent identity.
    #[must_use]
    pub const fn id(&self) -> AgentId {
        self.id
    }

    /// Current behavior state.
    #[must_use]
    pub fn state(&self) -> AgentState {
        self.context.state()
    }

    /// Configuration in use.
    #[must_use]
    pub const fn config(&self) -> &ChaserConfig {
        &self.config
    }

    /// Patrol route.
    #[must_use]
    pub fn route(&self) -> &[Vec3] {
        &self.route
    }

    /// Index of the route point the next patrol leg heads to.
    #[must_use]
    pub const fn patrol_index(&self) -> usize {
        self.patrol_index
    }

    /// Subject being chased, if any.
    #[must_use]
    pub const fn target(&self) -> Option<SubjectId> {
        self.target
    }

    /// Where the last heard noise came from.
    #[must_use]
    pub const fn last_heard_position(&self) -> Vec3 {
        self.last_heard_position
    }

    /// Current strike count.
    #[must_use]
    pub const fn strikes(&self) -> u32 {
        self.strikes.count()
    }

    /// Time of the last accepted backup call.
    #[must_use]
    pub const fn last_backup_call(&self) -> Option<f64> {
        self.backup.last_call()
    }

    /// Runs one simulation step.
    pub fn tick(&mut self, ctx: &mut TickContext<'_>) {
        let transitions = self.transitions;

        if let Some(strikes) = self.strikes.tick(ctx.dt) {
            info!(agent = %self.id, "Strike reduced: {strikes}/{} remaining", self.strikes.max());
            ctx.events.publish(AlertEvent::StrikeReduced {
                agent: self.id,
                strikes,
            });
        }

        if self.config.hearing_enabled
            && self.state() != AgentState::Chase
            && self.strikes.can_register()
        {
            self.listen(ctx);
        }

        // A switch during bookkeeping already ran the new state's entry action.
        if self.transitions == transitions {
            self.step(ctx);
        }
    }

    /// A subject walked into this agent's proximity zone.
    pub fn on_subject_entered(&mut self, subject: SubjectId, ctx: &mut TickContext<'_>) {
        if !self.config.proximity_enabled {
            return;
        }
        debug!(agent = %self.id, %subject, "Subject entered proximity zone");
        self.target = Some(subject);
        self.switch_state(AgentState::Chase, ctx);
    }

    /// A subject walked out of this agent's proximity zone.
    pub fn on_subject_left(&mut self, subject: SubjectId, ctx: &mut TickContext<'_>) {
        if !self.config.proximity_enabled {
            return;
        }
        debug!(agent = %self.id, %subject, "Subject left proximity zone");
        if self.target == Some(subject) {
            self.target = None;
        }
        self.switch_state(AgentState::Idle, ctx);
    }

    /// Changes state, running the new state's entry action.
    ///
    /// Switching to the active state is a no-op.
    pub fn switch_state(&mut self, next: AgentState, ctx: &mut TickContext<'_>) {
        let from = self.state();
        if from == next {
            return;
        }

        self.context = StateContext::fresh(next);
        self.transitions = self.transitions.wrapping_add(1);
        debug!(agent = %self.id, "{} -> {}", from.display_name(), next.display_name());
        ctx.events.publish(AlertEvent::StateChanged {
            agent: self.id,
            from,
            to: next,
        });

        match next {
            AgentState::Idle | AgentState::Chase => {},
            AgentState::Patrol => {
                if let Some(&point) = self.route.get(self.patrol_index) {
                    ctx.navigator.set_destination(point);
                }
            },
            AgentState::Investigate => {
                debug!(agent = %self.id, "Investigating last heard position: {}", self.last_heard_position);
                ctx.navigator.set_destination(self.last_heard_position);
            },
        }
    }

    /// Adds a detection strike; escalates when the cap is hit.
    pub fn register_strike(&mut self, culprit: Option<SubjectId>, ctx: &mut TickContext<'_>) {
        let outcome = self.strikes.register();
        let Some(strikes) = outcome.count() else {
            return;
        };

        info!(agent = %self.id, "Strike {strikes}/{} registered", self.strikes.max());
        ctx.events.publish(AlertEvent::StrikeRegistered {
            agent: self.id,
            strikes,
        });

        if let StrikeOutcome::MaxReached { .. } = outcome {
            info!(agent = %self.id, "Max strikes reached. Calling for backup!");
            ctx.events.publish(AlertEvent::MaxStrikesReached {
                agent: self.id,
                position: ctx.navigator.position(),
            });

            if self.config.send_subject_to_respawn {
                if let Some(subject) = culprit {
                    ctx.events.publish(AlertEvent::SubjectCaught {
                        agent: self.id,
                        subject,
                    });
                }
            }

            self.call_for_backup(ctx);
        }
    }

    /// Removes one strike, if any.
    pub fn reduce_strike(&mut self, ctx: &mut TickContext<'_>) {
        if let Some(strikes) = self.strikes.reduce() {
            ctx.events.publish(AlertEvent::StrikeReduced {
                agent: self.id,
                strikes,
            });
        }
    }

    /// Requests backup agents around this agent, subject to the cooldown.
    ///
    /// A throttled call drops the agent back to Idle.
    pub fn call_for_backup(&mut self, ctx: &mut TickContext<'_>) {
        let origin = ctx.navigator.position();
        match self.backup.call(self.id, ctx.now, origin, &self.config) {
            BackupOutcome::Throttled => {
                debug!(agent = %self.id, "Backup call throttled");
                ctx.events.publish(AlertEvent::BackupThrottled { agent: self.id });
                self.switch_state(AgentState::Idle, ctx);
            },
            BackupOutcome::Called(requests) => {
                for request in &requests {
                    debug!(agent = %self.id, "Backup requested at: {}", request.position);
                }
                ctx.events.publish(AlertEvent::BackupCalled {
                    agent: self.id,
                    requested: requests.len(),
                });
                ctx.spawns.extend(requests);
            },
        }
    }

    fn listen(&mut self, ctx: &mut TickContext<'_>) {
        let Some(heard) = hear(
            ctx.subjects,
            ctx.navigator.position(),
            ctx.navigator.forward(),
            self.config.hearing_radius,
            self.config.hearing_angle,
        ) else {
            return;
        };

        info!(
            agent = %self.id,
            "Heard subject! Distance: {:.2}, Angle: {:.2}",
            heard.distance,
            heard.angle
        );
        self.last_heard_position = heard.position;
        // A throttled escalation may drop to Idle; the investigation still wins.
        self.register_strike(Some(heard.subject), ctx);
        self.switch_state(AgentState::Investigate, ctx);
        self.strikes.arm_cooldown();
    }

    fn step(&mut self, ctx: &mut TickContext<'_>) {
        match self.context {
            StateContext::Idle { timer } => self.step_idle(timer, ctx),
            StateContext::Patrol => self.step_patrol(ctx),
            StateContext::Chase => self.step_chase(ctx),
            StateContext::Investigate { phase } => self.step_investigate(phase, ctx),
        }
    }

    fn step_idle(&mut self, timer: f32, ctx: &mut TickContext<'_>) {
        let timer = timer + ctx.dt;
        self.context = StateContext::Idle { timer };

        if self.target.is_some() {
            self.switch_state(AgentState::Chase, ctx);
        } else if timer >= self.config.idle_time {
            self.switch_state(AgentState::Patrol, ctx);
        }
    }

    fn step_patrol(&mut self, ctx: &mut TickContext<'_>) {
        if self.target.is_some() {
            self.switch_state(AgentState::Chase, ctx);
            return;
        }

        // No route: nothing was issued, so there is nothing to arrive at.
        if self.route.is_empty() {
            return;
        }

        if has_arrived(&*ctx.navigator, self.config.arrival_threshold) {
            self.patrol_index = (self.patrol_index + 1) % self.route.len();
            self.switch_state(AgentState::Idle, ctx);
        }
    }

    fn step_chase(&mut self, ctx: &mut TickContext<'_>) {
        let Some(target) = self.target else {
            debug!(agent = %self.id, "Subject lost. Returning to Idle.");
            self.switch_state(AgentState::Idle, ctx);
            return;
        };

        let Some(subject) = ctx.subjects.subject(target) else {
            debug!(agent = %self.id, "Subject gone. Returning to Idle.");
            self.drop_target(ctx);
            return;
        };

        let position = subject.position();
        let concealed = subject.is_concealed();
        let dist = distance(ctx.navigator.position(), position);
        if dist > self.config.chase_give_up_distance() {
            debug!(agent = %self.id, "Subject too far ({dist:.2}). Stopping chase.");
            self.drop_target(ctx);
            return;
        }

        if concealed {
            debug!(agent = %self.id, "Subject is hiding. Giving up.");
            self.drop_target(ctx);
            return;
        }

        ctx.navigator.set_destination(position);
    }

    fn step_investigate(&mut self, phase: InvestigatePhase, ctx: &mut TickContext<'_>) {
        if self.target.is_some() {
            debug!(agent = %self.id, "Subject detected during investigation. Switching to Chase.");
            self.switch_state(AgentState::Chase, ctx);
            return;
        }

        match phase {
            InvestigatePhase::Travel => {
                if has_arrived(&*ctx.navigator, self.config.arrival_threshold) {
                    debug!(agent = %self.id, "Reached investigation point. Waiting...");
                    self.context = StateContext::Investigate {
                        phase: InvestigatePhase::LookAround { timer: 0.0 },
                    };
                }
            },
            InvestigatePhase::LookAround { timer } => {
                ctx.navigator.turn(self.config.look_around_speed * ctx.dt);
                let timer = timer + ctx.dt;
                if timer >= self.config.investigate_wait_time {
                    debug!(agent = %self.id, "Investigation complete. Returning to Patrol.");
                    self.switch_state(AgentState::Patrol, ctx);
                } else {
                    self.context = StateContext::Investigate {
                        phase: InvestigatePhase::LookAround { timer },
                    };
                }
            },
        }
    }

    fn drop_target(&mut self, ctx: &mut TickContext<'_>) {
        self.target = None;
        self.switch_state(AgentState::Idle, ctx);
    }
}
