use std::time::{Duration, Instant};

/// Shortest interval the timer will run at
const MIN_INTERVAL: Duration = Duration::from_millis(1);

/// Fixed-interval tick schedule. Time is always passed in, so the owner
/// decides what drives it (a ui frame loop, a thread with sleep, tests).
#[derive(Debug, Clone)]
pub struct FrameTimer {
    interval: Duration,
    next_tick: Instant,
}

impl FrameTimer {
    /// Arm the timer; the first tick is one interval after `now`
    pub fn new(interval: Duration, now: Instant) -> Self {
        let interval = interval.max(MIN_INTERVAL);
        Self {
            interval,
            next_tick: now + interval,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn next_tick(&self) -> Instant {
        self.next_tick
    }

    pub fn is_due(&self, now: Instant) -> bool {
        now >= self.next_tick
    }

    /// Mark a tick as performed. Missed ticks are dropped rather than
    /// replayed in a burst.
    pub fn fire(&mut self, now: Instant) {
        self.next_tick += self.interval;
        if self.next_tick <= now {
            self.next_tick = now + self.interval;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MS: Duration = Duration::from_millis(1);

    #[test]
    fn first_tick_is_one_interval_out() {
        let t0 = Instant::now();
        let timer = FrameTimer::new(100 * MS, t0);
        assert!(!timer.is_due(t0));
        assert!(!timer.is_due(t0 + 99 * MS));
        assert!(timer.is_due(t0 + 100 * MS));
    }

    #[test]
    fn fire_keeps_cadence() {
        let t0 = Instant::now();
        let mut timer = FrameTimer::new(100 * MS, t0);

        timer.fire(t0 + 103 * MS);
        assert_eq!(timer.next_tick(), t0 + 200 * MS);
    }

    #[test]
    fn late_fire_skips_missed_ticks() {
        let t0 = Instant::now();
        let mut timer = FrameTimer::new(100 * MS, t0);

        timer.fire(t0 + 450 * MS);
        assert_eq!(timer.next_tick(), t0 + 550 * MS);
        assert!(!timer.is_due(t0 + 500 * MS));
    }

    #[test]
    fn zero_interval_is_clamped() {
        let timer = FrameTimer::new(Duration::ZERO, Instant::now());
        assert_eq!(timer.interval(), MIN_INTERVAL);
    }
}
