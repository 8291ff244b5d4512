use std::time::{Duration, Instant};

/// Frame tick snapshot handed to the render path.
#[derive(Debug, Copy, Clone)]
pub struct FrameTick {
    /// Monotonic timestamp of the tick, in nanoseconds since clock start.
    pub timestamp_ns: u64,

    /// Time elapsed since the previous tick, in seconds.
    pub dt: f32,

    /// Monotonic frame counter.
    pub frame_index: u64,
}

/// Clock producing `FrameTick` snapshots.
///
/// One clock exists per render loop so delta-time state is not shared.
/// Delta time is clamped to avoid pathological values when the application
/// is paused by the debugger, minimized, or stalls.
#[derive(Debug, Clone)]
pub struct FrameClock {
    start: Instant,
    last: Instant,
    frame_index: u64,
    dt_min: Duration,
    dt_max: Duration,
}

impl FrameClock {
    /// Creates a new clock with default clamps.
    ///
    /// Clamp rationale:
    /// - minimum prevents zero-dt behavior from tight loops on some platforms
    /// - maximum prevents animation jumps after long stalls
    pub fn new() -> Self {
        let now = Instant::now();
        Self {
            start: now,
            last: now,
            frame_index: 0,
            dt_min: Duration::from_micros(100), // 0.0001s
            dt_max: Duration::from_millis(250), // 0.25s
        }
    }

    /// Resets the delta-time baseline.
    ///
    /// Used when frame delivery resumes after the window was hidden, so the
    /// first visible frame does not see the whole hidden interval as dt.
    pub fn reset_baseline(&mut self) {
        self.last = Instant::now();
    }

    /// Advances the clock and returns a new `FrameTick`.
    pub fn tick(&mut self) -> FrameTick {
        let now = Instant::now();
        let mut dt = now.saturating_duration_since(self.last);

        if dt < self.dt_min {
            dt = self.dt_min;
        } else if dt > self.dt_max {
            dt = self.dt_max;
        }

        self.last = now;

        let tick = FrameTick {
            timestamp_ns: now.saturating_duration_since(self.start).as_nanos() as u64,
            dt: dt.as_secs_f32(),
            frame_index: self.frame_index,
        };

        self.frame_index = self.frame_index.wrapping_add(1);

        tick
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dt_is_clamped_to_minimum() {
        let mut clock = FrameClock::new();
        // Two immediate ticks cannot produce a dt below the clamp floor.
        let a = clock.tick();
        let b = clock.tick();
        assert!(a.dt >= 0.0001);
        assert!(b.dt >= 0.0001);
    }

    #[test]
    fn frame_index_increments() {
        let mut clock = FrameClock::new();
        assert_eq!(clock.tick().frame_index, 0);
        assert_eq!(clock.tick().frame_index, 1);
        assert_eq!(clock.tick().frame_index, 2);
    }

    #[test]
    fn timestamps_are_monotonic() {
        let mut clock = FrameClock::new();
        let a = clock.tick();
        let b = clock.tick();
        let c = clock.tick();
        assert!(a.timestamp_ns <= b.timestamp_ns);
        assert!(b.timestamp_ns <= c.timestamp_ns);
    }

    #[test]
    fn baseline_reset_keeps_timestamp_origin() {
        let mut clock = FrameClock::new();
        let before = clock.tick().timestamp_ns;
        clock.reset_baseline();
        // Timestamps stay relative to clock start, not to the reset point.
        assert!(clock.tick().timestamp_ns >= before);
    }
}
