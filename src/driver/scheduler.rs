//! Frame pacing

use std::time::{Duration, Instant};

/// Decides when the next tick may start
pub trait FrameScheduler {
    /// Block until the next frame is due and return the time since the last one.
    ///
    /// The first call returns without waiting.
    fn next_frame(&mut self) -> Duration;
}

/// Sleeps to hold a target frame rate and reports measured deltas
#[derive(Debug, Clone)]
pub struct FixedRateScheduler {
    frame: Duration,
    last: Option<Instant>,
}

impl FixedRateScheduler {
    pub fn new(frame: Duration) -> Self {
        Self { frame, last: None }
    }

    pub fn from_fps(fps: u32) -> Self {
        if fps == 0 {
            Self::new(Duration::ZERO)
        } else {
            Self::new(Duration::from_secs_f64(1.0 / fps as f64))
        }
    }
}

impl FrameScheduler for FixedRateScheduler {
    fn next_frame(&mut self) -> Duration {
        let Some(last) = self.last else {
            self.last = Some(Instant::now());
            return Duration::ZERO;
        };

        let elapsed = last.elapsed();
        if elapsed < self.frame {
            std::thread::sleep(self.frame - elapsed);
        }

        let now = Instant::now();
        self.last = Some(now);
        now - last
    }
}

/// Never waits; every frame after the first reports the same nominal delta
#[derive(Debug, Clone)]
pub struct ImmediateScheduler {
    delta: Duration,
    started: bool,
}

impl ImmediateScheduler {
    pub fn new(delta: Duration) -> Self {
        Self { delta, started: false }
    }
}

impl Default for ImmediateScheduler {
    fn default() -> Self {
        Self::new(Duration::from_secs_f64(1.0 / crate::consts::DEFAULT_TARGET_FPS as f64))
    }
}

impl FrameScheduler for ImmediateScheduler {
    fn next_frame(&mut self) -> Duration {
        if !self.started {
            self.started = true;
            return Duration::ZERO;
        }
        self.delta
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_immediate_deltas() {
        let mut scheduler = ImmediateScheduler::new(Duration::from_millis(16));
        assert_eq!(scheduler.next_frame(), Duration::ZERO);
        assert_eq!(scheduler.next_frame(), Duration::from_millis(16));
        assert_eq!(scheduler.next_frame(), Duration::from_millis(16));
    }

    #[test]
    fn test_fixed_rate_waits_for_frame() {
        let mut scheduler = FixedRateScheduler::new(Duration::from_millis(5));
        assert_eq!(scheduler.next_frame(), Duration::ZERO);
        let delta = scheduler.next_frame();
        assert!(delta >= Duration::from_millis(5), "delta {:?}", delta);
    }

    #[test]
    fn test_zero_fps_does_not_sleep() {
        let mut scheduler = FixedRateScheduler::from_fps(0);
        scheduler.next_frame();
        assert!(scheduler.next_frame() < Duration::from_secs(1));
    }
}
