use crate::constants::{MAX_CATCH_UP_TICKS, TICK_RATE_HZ};

/// Converts irregular frame-callback timestamps into a deterministic count of
/// fixed-duration simulation ticks, with bounded catch-up after a stall.
pub struct TickClock {
    previous_deadline: f64,
    tick_duration_ms: f64,
    max_catch_up_ticks: u32,
    slack_ms: f64,
}

impl TickClock {
    pub fn new(now_ms: f64) -> Self {
        Self::with_rate(now_ms, TICK_RATE_HZ, MAX_CATCH_UP_TICKS)
    }

    pub fn with_rate(now_ms: f64, rate_hz: f64, max_catch_up_ticks: u32) -> Self {
        assert!(rate_hz > 0.0);
        assert!(max_catch_up_ticks >= 1);
        let tick_duration_ms = 1000.0 / rate_hz;
        Self {
            previous_deadline: now_ms,
            tick_duration_ms,
            max_catch_up_ticks,
            // absorbs sub-tick timer jitter so a frame arriving a hair early
            // still produces its tick
            slack_ms: tick_duration_ms / 8.0,
        }
    }

    pub fn tick_duration_ms(&self) -> f64 {
        self.tick_duration_ms
    }

    /// Number of ticks due at `now_ms`, advancing the internal deadline.
    /// Falling more than `max_catch_up_ticks` behind drops the backlog and
    /// re-anchors the deadline at `now_ms` instead of spiraling.
    pub fn ticks_due(&mut self, now_ms: f64) -> u32 {
        let elapsed = now_ms - self.previous_deadline;
        let due = ((elapsed + self.slack_ms) / self.tick_duration_ms).floor();
        if due <= 0.0 {
            return 0;
        }
        let due = due as u32;
        if due <= self.max_catch_up_ticks {
            self.previous_deadline += f64::from(due) * self.tick_duration_ms;
            due
        } else {
            self.previous_deadline = now_ms;
            self.max_catch_up_ticks
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::TICK_DURATION_MS;

    #[test]
    fn test_no_tick_before_first_deadline() {
        let mut clock = TickClock::new(0.0);
        assert_eq!(clock.ticks_due(1.0), 0);
        assert_eq!(clock.ticks_due(10.0), 0);
        // deadline untouched, so the full interval still counts
        assert_eq!(clock.ticks_due(TICK_DURATION_MS), 1);
    }

    #[test]
    fn test_single_tick_per_frame_at_nominal_rate() {
        let mut clock = TickClock::new(0.0);
        let mut now = 0.0;
        for _ in 0..100 {
            now += TICK_DURATION_MS;
            assert_eq!(clock.ticks_due(now), 1);
        }
        assert!((clock.previous_deadline - now).abs() < 1e-6);
    }

    #[test]
    fn test_slack_absorbs_early_callback() {
        let mut clock = TickClock::new(0.0);
        // frame arrives 1 ms early; within the tick/8 slack window
        assert_eq!(clock.ticks_due(TICK_DURATION_MS - 1.0), 1);
        // but not a full slack-width early
        let mut clock = TickClock::new(0.0);
        assert_eq!(clock.ticks_due(TICK_DURATION_MS - 3.0), 0);
    }

    #[test]
    fn test_two_ticks_after_skipped_frame() {
        // worked example: tick 16.667ms, slack 2.08ms, deadline 0
        let mut clock = TickClock::new(0.0);
        assert_eq!(clock.ticks_due(33.4), 2);
        assert!((clock.previous_deadline - 2.0 * TICK_DURATION_MS).abs() < 1e-9);
    }

    #[test]
    fn test_deadline_advances_by_ticks_run() {
        let mut clock = TickClock::new(100.0);
        let n = clock.ticks_due(100.0 + 3.2 * TICK_DURATION_MS);
        assert_eq!(n, 3);
        assert!((clock.previous_deadline - (100.0 + 3.0 * TICK_DURATION_MS)).abs() < 1e-9);
    }

    #[test]
    fn test_catch_up_clamp_resets_deadline() {
        let mut clock = TickClock::new(0.0);
        // a long stall, e.g. a backgrounded tab
        let now = 100.0 * TICK_DURATION_MS;
        assert_eq!(clock.ticks_due(now), MAX_CATCH_UP_TICKS);
        assert!((clock.previous_deadline - now).abs() < f64::EPSILON);
        // next frame at nominal pace runs exactly one tick again
        assert_eq!(clock.ticks_due(now + TICK_DURATION_MS), 1);
    }

    #[test]
    fn test_tick_count_formula() {
        for &(elapsed_ticks, expected) in &[(0.5, 0), (1.0, 1), (2.5, 2), (4.5, 4), (5.0, 5), (7.0, 5)] {
            let mut clock = TickClock::new(0.0);
            let n = clock.ticks_due(elapsed_ticks * TICK_DURATION_MS);
            assert_eq!(n, expected, "elapsed = {} ticks", elapsed_ticks);
        }
    }

    #[test]
    fn test_custom_rate() {
        let mut clock = TickClock::with_rate(0.0, 30.0, 5);
        assert!((clock.tick_duration_ms() - 1000.0 / 30.0).abs() < 1e-9);
        assert_eq!(clock.ticks_due(1000.0 / 30.0), 1);
    }
}
