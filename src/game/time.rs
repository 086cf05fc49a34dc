//! Simulation timers
//!
//! Countdown primitives advanced by the frame delta. Abilities poll them
//! instead of waiting on scheduler callbacks.

/// One-shot countdown gating an ability.
///
/// A fresh cooldown is ready. `start` arms it; it becomes ready again once
/// the full duration has been ticked away and stays ready until restarted.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Cooldown {
    /// Duration used by `restart`
    duration: f32,
    /// Time left before the cooldown is ready again
    remaining: f32,
    /// Whether a countdown is in progress
    running: bool,
}

impl Cooldown {
    /// Create a ready cooldown with the given restart duration
    pub fn new(duration: f32) -> Self {
        Self {
            duration,
            remaining: 0.0,
            running: false,
        }
    }

    /// Begin a countdown of `duration`. Non-positive durations are ready at once.
    pub fn start(&mut self, duration: f32) {
        if duration <= 0.0 {
            self.remaining = 0.0;
            self.running = false;
        } else {
            self.remaining = duration;
            self.running = true;
        }
    }

    /// Begin a countdown of the configured duration
    pub fn restart(&mut self) {
        self.start(self.duration);
    }

    /// Advance the countdown. Returns true on the tick it elapses.
    pub fn tick(&mut self, dt: f32) -> bool {
        if !self.running {
            return false;
        }
        self.remaining -= dt;
        if self.remaining <= 0.0 {
            self.remaining = 0.0;
            self.running = false;
            true
        } else {
            false
        }
    }

    pub fn is_ready(&self) -> bool {
        !self.running
    }

    /// Change the duration used by future restarts (the running countdown is untouched)
    pub fn set_duration(&mut self, duration: f32) {
        self.duration = duration;
    }

    pub fn duration(&self) -> f32 {
        self.duration
    }

    pub fn remaining(&self) -> f32 {
        self.remaining
    }

    /// Abort a running countdown without firing
    pub fn stop(&mut self) {
        self.remaining = 0.0;
        self.running = false;
    }
}

impl Default for Cooldown {
    fn default() -> Self {
        Self::new(1.0)
    }
}

/// Repeating interval for periodic effects (drain ticks, pattern cycling, trails)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Interval {
    /// Seconds between ticks
    period: f32,
    /// Time since the last tick
    since_last_tick: f32,
}

impl Interval {
    pub fn new(period: f32) -> Self {
        Self {
            period,
            since_last_tick: 0.0,
        }
    }

    /// Update time and return true if a tick should occur
    pub fn update(&mut self, dt: f32) -> bool {
        self.since_last_tick += dt;

        if self.period <= 0.0 {
            self.since_last_tick = 0.0;
            return true;
        }

        if self.since_last_tick >= self.period {
            self.since_last_tick -= self.period;
            true
        } else {
            false
        }
    }

    pub fn period(&self) -> f32 {
        self.period
    }

    pub fn set_period(&mut self, period: f32) {
        self.period = period;
    }

    /// Restart the phase of the interval
    pub fn reset(&mut self) {
        self.since_last_tick = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fresh_cooldown_is_ready() {
        let cd = Cooldown::new(2.0);
        assert!(cd.is_ready());
    }

    #[test]
    fn test_cooldown_fires_once() {
        let mut cd = Cooldown::new(1.0);
        cd.restart();
        assert!(!cd.is_ready());
        assert!(!cd.tick(0.5));
        assert!(cd.tick(0.6));
        assert!(cd.is_ready());
        // Stays ready, no second completion
        assert!(!cd.tick(1.0));
        assert!(cd.is_ready());
    }

    #[test]
    fn test_non_positive_start_is_ready() {
        let mut cd = Cooldown::new(1.0);
        cd.start(0.0);
        assert!(cd.is_ready());
        cd.start(-3.0);
        assert!(cd.is_ready());
    }

    #[test]
    fn test_set_duration_affects_restart() {
        let mut cd = Cooldown::new(5.0);
        cd.set_duration(2.0);
        cd.restart();
        assert_eq!(cd.remaining(), 2.0);
    }

    #[test]
    fn test_interval_repeats() {
        let mut iv = Interval::new(1.0);
        assert!(!iv.update(0.5));
        assert!(iv.update(0.5));
        assert!(!iv.update(0.9));
        assert!(iv.update(0.2));
    }
}
