/// Frame clock: decides when the next tick is due and whether the loop
/// should keep going at all.
///
/// Ticks never overlap: the driver asks `due()`, runs a whole frame, then
/// calls `mark()`. Stopping is just clearing the flag; the loop checks it
/// before every iteration.

use std::time::{Duration, Instant};

pub struct FrameClock {
    tick_rate: Duration,
    last_tick: Instant,
    running: bool,
}

impl FrameClock {
    pub fn new(tick_rate: Duration) -> Self {
        FrameClock {
            tick_rate,
            // First frame is due immediately
            last_tick: Instant::now().checked_sub(tick_rate).unwrap_or_else(Instant::now),
            running: true,
        }
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn stop(&mut self) {
        self.running = false;
    }

    /// A tick is due when running and a full tick period has elapsed.
    pub fn due(&self) -> bool {
        self.running && self.last_tick.elapsed() >= self.tick_rate
    }

    pub fn mark(&mut self) {
        self.last_tick = Instant::now();
    }

    pub fn tick_rate(&self) -> Duration {
        self.tick_rate
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_tick_is_due_immediately() {
        let clock = FrameClock::new(Duration::from_millis(50));
        assert!(clock.due());
    }

    #[test]
    fn mark_defers_next_tick() {
        let mut clock = FrameClock::new(Duration::from_secs(60));
        clock.mark();
        assert!(!clock.due());
    }

    #[test]
    fn stopped_clock_is_never_due() {
        let mut clock = FrameClock::new(Duration::ZERO);
        clock.stop();
        assert!(!clock.is_running());
        assert!(!clock.due());
    }
}
