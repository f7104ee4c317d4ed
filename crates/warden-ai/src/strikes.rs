//! Strike bookkeeping: escalation counter, decay timer and hearing cooldown.

use serde::{Deserialize, Serialize};

/// Result of trying to register a strike.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StrikeOutcome {
    /// Already at the cap; nothing changed
    Ignored,
    /// Count went up but is still below the cap
    Registered {
        /// New count
        count: u32,
    },
    /// Count just reached the cap
    MaxReached {
        /// New count (equal to the cap)
        count: u32,
    },
}

impl StrikeOutcome {
    /// Returns the new count if a strike was added.
    #[must_use]
    pub const fn count(self) -> Option<u32> {
        match self {
            Self::Ignored => None,
            Self::Registered { count } | Self::MaxReached { count } => Some(count),
        }
    }
}

/// Strike counter with time-based decay.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StrikeTracker {
    /// Current strike count, in `[0, max]`
    count: u32,
    /// Strike cap
    max: u32,
    /// Seconds until the next decay step
    decay_timer: f32,
    /// Full decay period
    decay_period: f32,
    /// Seconds until hearing may register again
    register_cooldown: f32,
    /// Full register cooldown
    cooldown_period: f32,
}

impl StrikeTracker {
    /// Creates a tracker with no strikes and an open cooldown.
    #[must_use]
    pub fn new(max: u32, decay_period: f32, cooldown_period: f32) -> Self {
        Self {
            count: 0,
            max,
            decay_timer: decay_period,
            decay_period,
            register_cooldown: 0.0,
            cooldown_period,
        }
    }

    /// Current strike count.
    #[must_use]
    pub const fn count(&self) -> u32 {
        self.count
    }

    /// Strike cap.
    #[must_use]
    pub const fn max(&self) -> u32 {
        self.max
    }

    /// Whether the cap has been reached.
    #[must_use]
    pub const fn is_maxed(&self) -> bool {
        self.count >= self.max
    }

    /// Seconds until the next decay step.
    #[must_use]
    pub const fn decay_remaining(&self) -> f32 {
        self.decay_timer
    }

    /// Whether hearing may register a strike now.
    #[must_use]
    pub fn can_register(&self) -> bool {
        self.register_cooldown <= 0.0
    }

    /// Advances both timers. Returns the new count if a strike decayed.
    pub fn tick(&mut self, dt: f32) -> Option<u32> {
        let mut decayed = None;

        self.decay_timer -= dt;
        if self.decay_timer <= 0.0 {
            decayed = self.reduce();
            self.decay_timer = self.decay_period;
        }

        if self.register_cooldown > 0.0 {
            self.register_cooldown -= dt;
        }

        decayed
    }

    /// Adds one strike unless already at the cap.
    pub fn register(&mut self) -> StrikeOutcome {
        if self.is_maxed() {
            return StrikeOutcome::Ignored;
        }

        self.count += 1;
        self.decay_timer = self.decay_period;

        if self.is_maxed() {
            StrikeOutcome::MaxReached { count: self.count }
        } else {
            StrikeOutcome::Registered { count: self.count }
        }
    }

    /// Removes one strike. Returns the new count, or `None` if already at zero.
    pub fn reduce(&mut self) -> Option<u32> {
        if self.count == 0 {
            return None;
        }
        self.count -= 1;
        self.decay_timer = self.decay_period;
        Some(self.count)
    }

    /// Restarts the hearing cooldown.
    pub fn arm_cooldown(&mut self) {
        self.register_cooldown = self.cooldown_period;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn tracker() -> StrikeTracker {
        StrikeTracker::new(3, 30.0, 2.0)
    }

    #[test]
    fn test_register_until_max() {
        let mut strikes = tracker();
        assert_eq!(strikes.register(), StrikeOutcome::Registered { count: 1 });
        assert_eq!(strikes.register(), StrikeOutcome::Registered { count: 2 });
        assert_eq!(strikes.register(), StrikeOutcome::MaxReached { count: 3 });
        assert_eq!(strikes.register(), StrikeOutcome::Ignored);
        assert_eq!(strikes.count(), 3);
    }

    #[test]
    fn test_reduce_at_zero_is_noop() {
        let mut strikes = tracker();
        assert_eq!(strikes.reduce(), None);
        assert_eq!(strikes.count(), 0);
    }

    #[test]
    fn test_decay_one_per_period() {
        let mut strikes = tracker();
        strikes.register();
        strikes.register();

        // Just short of a full period: nothing decays.
        for _ in 0..29 {
            assert_eq!(strikes.tick(1.0), None);
        }
        assert_eq!(strikes.count(), 2);

        assert_eq!(strikes.tick(1.0), Some(1));
        assert!((strikes.decay_remaining() - 30.0).abs() < f32::EPSILON);

        for _ in 0..30 {
            strikes.tick(1.0);
        }
        assert_eq!(strikes.count(), 0);

        for _ in 0..90 {
            strikes.tick(1.0);
        }
        assert_eq!(strikes.count(), 0);
    }

    #[test]
    fn test_register_resets_decay_timer() {
        let mut strikes = tracker();
        strikes.register();
        for _ in 0..20 {
            strikes.tick(1.0);
        }
        strikes.register();
        assert!((strikes.decay_remaining() - 30.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_cooldown_gate() {
        let mut strikes = tracker();
        assert!(strikes.can_register());
        strikes.arm_cooldown();
        assert!(!strikes.can_register());
        strikes.tick(1.0);
        assert!(!strikes.can_register());
        strikes.tick(1.0);
        assert!(strikes.can_register());
    }

    #[test]
    fn test_max_reached_again_after_decay() {
        let mut strikes = tracker();
        for _ in 0..3 {
            strikes.register();
        }
        assert!(strikes.reduce().is_some());
        assert_eq!(strikes.register(), StrikeOutcome::MaxReached { count: 3 });
    }

    proptest! {
        #[test]
        fn prop_count_stays_in_bounds(
            max in 1u32..6,
            ops in proptest::collection::vec((any::<bool>(), 0.0f32..5.0), 0..200),
        ) {
            let mut strikes = StrikeTracker::new(max, 10.0, 2.0);
            for (register, dt) in ops {
                let before = strikes.count();
                if register {
                    match strikes.register() {
                        StrikeOutcome::MaxReached { count } => {
                            prop_assert_eq!(before, max - 1);
                            prop_assert_eq!(count, max);
                        },
                        StrikeOutcome::Ignored => prop_assert_eq!(before, max),
                        StrikeOutcome::Registered { count } => prop_assert_eq!(count, before + 1),
                    }
                } else if let Some(after) = strikes.tick(dt) {
                    prop_assert_eq!(after + 1, before);
                }
                prop_assert!(strikes.count() <= max);
            }
        }
    }
}
