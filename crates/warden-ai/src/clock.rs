//! Simulation time source.

/// Per-tick timing supplied by the host loop.
pub trait Clock {
    /// Seconds elapsed since the previous tick.
    fn delta_time(&self) -> f32;
    /// Monotonic timestamp in seconds.
    fn now(&self) -> f64;
}

/// Fixed-step clock advanced explicitly by the host.
#[derive(Debug, Clone)]
pub struct ManualClock {
    /// Step length in seconds
    dt: f32,
    /// Accumulated time
    now: f64,
    /// Ticks taken
    ticks: u64,
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new(1.0 / 60.0)
    }
}

impl ManualClock {
    /// Creates a clock at t = 0 with the given step.
    #[must_use]
    pub fn new(dt: f32) -> Self {
        Self {
            dt: dt.max(0.0),
            now: 0.0,
            ticks: 0,
        }
    }

    /// Creates a clock stepping at `hz` ticks per second.
    #[must_use]
    pub fn from_hz(hz: f32) -> Self {
        Self::new(1.0 / hz.max(1.0))
    }

    /// Advances by one step.
    pub fn step(&mut self) {
        self.now += f64::from(self.dt);
        self.ticks += 1;
    }

    /// Advances by an arbitrary amount, which also becomes the next delta.
    pub fn advance(&mut self, dt: f32) {
        self.dt = dt.max(0.0);
        self.step();
    }

    /// Ticks taken so far.
    #[must_use]
    pub const fn ticks(&self) -> u64 {
        self.ticks
    }
}

impl Clock for ManualClock {
    fn delta_time(&self) -> f32 {
        self.dt
    }

    fn now(&self) -> f64 {
        self.now
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manual_clock_steps() {
        let mut clock = ManualClock::new(0.5);
        clock.step();
        clock.step();
        assert!((clock.now() - 1.0).abs() < 1e-9);
        assert_eq!(clock.ticks(), 2);
    }

    #[test]
    fn test_advance_sets_delta() {
        let mut clock = ManualClock::default();
        clock.advance(2.0);
        assert!((clock.delta_time() - 2.0).abs() < f32::EPSILON);
        assert!((clock.now() - 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_from_hz() {
        let clock = ManualClock::from_hz(10.0);
        assert!((clock.delta_time() - 0.1).abs() < 1e-6);
    }
}
