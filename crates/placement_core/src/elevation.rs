//! Low-frequency elevation reconciliation.
//!
//! Runs on wall-clock time rather than simulation ticks. The scheduler starts
//! it when an attempt is promoted from an idle state and stops it the moment
//! the queue drains, so no firing can land after the last record finishes.

use std::time::Duration;

use bevy::time::{Timer, TimerMode};

/// Repeating wall-clock task that re-grounds the active candidate.
#[derive(Debug, Clone)]
pub struct ElevationSync {
    timer: Timer,
    running: bool,
    firings: u64,
}

impl ElevationSync {
    /// Create a stopped task with the given period.
    #[must_use]
    pub fn new(interval: Duration) -> Self {
        Self {
            timer: Timer::new(interval, TimerMode::Repeating),
            running: false,
            firings: 0,
        }
    }

    /// Start (or restart) the task from a fresh period.
    pub fn start(&mut self) {
        self.timer.reset();
        self.running = true;
    }

    /// Stop the task. Pending elapsed time is discarded.
    pub fn stop(&mut self) {
        self.timer.reset();
        self.running = false;
    }

    /// Whether the task is scheduled.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Total firings since creation.
    #[must_use]
    pub fn firings(&self) -> u64 {
        self.firings
    }

    /// Advance by `elapsed` wall-clock time. Returns `true` if the task fired
    /// at least once; several periods elapsing at once collapse into one
    /// firing since only the latest terrain height matters.
    pub fn advance(&mut self, elapsed: Duration) -> bool {
        if !self.running {
            return false;
        }

        self.timer.tick(elapsed);
        if self.timer.times_finished_this_tick() == 0 {
            return false;
        }

        self.firings += 1;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stopped_task_never_fires() {
        let mut sync = ElevationSync::new(Duration::from_millis(100));
        assert!(!sync.advance(Duration::from_secs(10)));
        assert_eq!(sync.firings(), 0);
    }

    #[test]
    fn test_fires_on_interval() {
        let mut sync = ElevationSync::new(Duration::from_millis(100));
        sync.start();

        assert!(!sync.advance(Duration::from_millis(60)));
        assert!(sync.advance(Duration::from_millis(60)));
        assert!(!sync.advance(Duration::from_millis(60)));
        assert!(sync.advance(Duration::from_millis(60)));
        assert_eq!(sync.firings(), 2);
    }

    #[test]
    fn test_multiple_periods_collapse() {
        let mut sync = ElevationSync::new(Duration::from_millis(100));
        sync.start();

        assert!(sync.advance(Duration::from_millis(450)));
        assert_eq!(sync.firings(), 1);
    }

    #[test]
    fn test_stop_discards_progress() {
        let mut sync = ElevationSync::new(Duration::from_millis(100));
        sync.start();
        sync.advance(Duration::from_millis(90));
        sync.stop();
        sync.start();

        assert!(!sync.advance(Duration::from_millis(20)));
        assert_eq!(sync.firings(), 0);
    }
}
