use super::clock::{FrameClock, FrameTick};

/// Source of frame callbacks.
///
/// `request_frame` schedules one future callback; sources are allowed to
/// coalesce multiple requests into a single callback (winit does). The
/// runtime implements this for the window via `request_redraw`; tests use a
/// counting stub.
pub trait FrameSource {
    fn request_frame(&self);
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
enum DriverState {
    Registered,
    Unregistered,
}

/// Owns the per-frame callback registration across visibility changes.
///
/// Two states: while `Registered`, every delivered callback re-arms the
/// source for the next frame (continuous self-resubmission) and yields a
/// stamped tick; while `Unregistered`, callbacks are ignored and nothing is
/// re-armed, so stale callbacks drain without rendering.
///
/// `activate`/`deactivate` are both idempotent: rapid visibility toggling
/// leaves at most one pending frame request and never leaks a registration.
#[derive(Debug)]
pub struct FrameDriver {
    state: DriverState,
    clock: FrameClock,
}

impl FrameDriver {
    pub fn new() -> Self {
        Self {
            state: DriverState::Unregistered,
            clock: FrameClock::new(),
        }
    }

    /// True while the driver is registered for frame callbacks.
    pub fn is_registered(&self) -> bool {
        self.state == DriverState::Registered
    }

    /// Enters the registered state and arms the source once.
    ///
    /// No-op when already registered.
    pub fn activate(&mut self, source: &dyn FrameSource) {
        if self.state == DriverState::Registered {
            return;
        }
        self.state = DriverState::Registered;
        self.clock.reset_baseline();
        source.request_frame();
    }

    /// Enters the unregistered state.
    ///
    /// Already-delivered callbacks arriving after this point are dropped by
    /// [`tick`](Self::tick).
    pub fn deactivate(&mut self) {
        self.state = DriverState::Unregistered;
    }

    /// Handles one delivered frame callback.
    ///
    /// While registered, re-arms the source and returns the stamped tick;
    /// otherwise returns `None` and does not re-arm.
    pub fn tick(&mut self, source: &dyn FrameSource) -> Option<FrameTick> {
        if self.state != DriverState::Registered {
            return None;
        }
        source.request_frame();
        Some(self.clock.tick())
    }
}

impl Default for FrameDriver {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use super::*;

    #[derive(Default)]
    struct CountingSource {
        requests: Cell<u32>,
    }

    impl FrameSource for CountingSource {
        fn request_frame(&self) {
            self.requests.set(self.requests.get() + 1);
        }
    }

    #[test]
    fn starts_unregistered_and_ignores_ticks() {
        let source = CountingSource::default();
        let mut driver = FrameDriver::new();

        assert!(!driver.is_registered());
        assert!(driver.tick(&source).is_none());
        assert_eq!(source.requests.get(), 0);
    }

    #[test]
    fn activate_arms_exactly_once() {
        let source = CountingSource::default();
        let mut driver = FrameDriver::new();

        driver.activate(&source);
        driver.activate(&source);
        driver.activate(&source);

        assert!(driver.is_registered());
        assert_eq!(source.requests.get(), 1);
    }

    #[test]
    fn tick_rearms_while_registered() {
        let source = CountingSource::default();
        let mut driver = FrameDriver::new();

        driver.activate(&source);
        assert!(driver.tick(&source).is_some());
        assert!(driver.tick(&source).is_some());

        // One arm from activate plus one re-arm per tick.
        assert_eq!(source.requests.get(), 3);
    }

    #[test]
    fn deactivate_stops_rearming() {
        let source = CountingSource::default();
        let mut driver = FrameDriver::new();

        driver.activate(&source);
        driver.deactivate();
        driver.deactivate();

        assert!(!driver.is_registered());
        // The stale callback from activate is dropped without re-arming.
        assert!(driver.tick(&source).is_none());
        assert_eq!(source.requests.get(), 1);
    }

    #[test]
    fn visibility_toggling_never_leaks_registrations() {
        let source = CountingSource::default();
        let mut driver = FrameDriver::new();

        // visible -> hidden -> visible -> hidden -> visible
        driver.activate(&source);
        driver.deactivate();
        driver.activate(&source);
        driver.deactivate();
        driver.activate(&source);

        assert!(driver.is_registered());

        // Each callback delivery yields exactly one tick while visible.
        let arms_before = source.requests.get();
        assert!(driver.tick(&source).is_some());
        assert_eq!(source.requests.get(), arms_before + 1);

        driver.deactivate();
        assert!(driver.tick(&source).is_none());
        assert_eq!(source.requests.get(), arms_before + 1);
    }

    #[test]
    fn registered_iff_visible() {
        let source = CountingSource::default();
        let mut driver = FrameDriver::new();

        for _ in 0..4 {
            driver.activate(&source);
            assert!(driver.is_registered());
            driver.deactivate();
            assert!(!driver.is_registered());
        }
    }

    #[test]
    fn ticks_carry_increasing_frame_indices() {
        let source = CountingSource::default();
        let mut driver = FrameDriver::new();

        driver.activate(&source);
        let a = driver.tick(&source).unwrap();
        let b = driver.tick(&source).unwrap();
        assert!(b.frame_index > a.frame_index);
        assert!(b.timestamp_ns >= a.timestamp_ns);
    }
}
