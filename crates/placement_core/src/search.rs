//! Per-attempt search timers.
//!
//! Each active attempt carries a [`SearchController`] holding its grace
//! delay and escalation countdowns. The scheduler drives it once per
//! simulation tick and applies the resulting motion to the candidate.
//!
//! Escalation intervals grow by `increment` per firing, so successive pushes
//! outward get further apart and the candidate spirals away from the pivot
//! in a non-periodic pattern.

use bevy::math::Vec3;
use bevy::transform::components::Transform;
use rand::Rng;

use crate::config::PlacementConfig;
use crate::math::outward_direction;

/// One escalation firing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Escalation {
    /// How far to push the candidate outward.
    pub step: f32,
    /// Number of escalations fired so far in this attempt, including this one.
    pub count: u32,
    /// Countdown until the next firing.
    pub next_interval: f32,
}

/// Timer state for the active attempt.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SearchController {
    grace_remaining: f32,
    escalation_remaining: f32,
    escalation_count: u32,
    last_interval: f32,
}

impl SearchController {
    /// Fresh timers for a newly activated attempt.
    pub fn start<R: Rng>(config: &PlacementConfig, rng: &mut R) -> Self {
        let interval = config.escalation_interval.sample(rng);
        Self {
            grace_remaining: config.grace_delay.sample(rng),
            escalation_remaining: interval,
            escalation_count: 0,
            last_interval: interval,
        }
    }

    /// Count down the grace delay. Returns `true` once it has elapsed.
    pub fn advance_grace(&mut self, dt: f32) -> bool {
        if self.grace_remaining > 0.0 {
            self.grace_remaining -= dt;
        }
        self.grace_remaining <= 0.0
    }

    /// Count down the escalation timer, firing at most once per call.
    pub fn advance_escalation<R: Rng>(
        &mut self,
        dt: f32,
        config: &PlacementConfig,
        rng: &mut R,
    ) -> Option<Escalation> {
        self.escalation_remaining -= dt;
        if self.escalation_remaining > 0.0 {
            return None;
        }

        self.escalation_count += 1;
        let interval = config.escalation_interval.sample(rng)
            + config.escalation_increment * self.escalation_count as f32;
        self.escalation_remaining = interval;
        self.last_interval = interval;

        Some(Escalation {
            step: config.escalation_step.sample(rng),
            count: self.escalation_count,
            next_interval: interval,
        })
    }

    /// Whether the validator may be consulted.
    #[must_use]
    pub fn grace_elapsed(&self) -> bool {
        self.grace_remaining <= 0.0
    }

    /// Seconds left in the grace delay (zero once elapsed).
    #[must_use]
    pub fn grace_remaining(&self) -> f32 {
        self.grace_remaining.max(0.0)
    }

    /// Seconds until the next escalation.
    #[must_use]
    pub fn escalation_remaining(&self) -> f32 {
        self.escalation_remaining
    }

    /// Escalations fired in this attempt.
    #[must_use]
    pub fn escalation_count(&self) -> u32 {
        self.escalation_count
    }

    /// Interval the escalation timer was last reset to.
    #[must_use]
    pub fn last_interval(&self) -> f32 {
        self.last_interval
    }
}

/// Push a transform away from `pivot` by `distance` in the horizontal plane.
pub fn nudge_outward(transform: &mut Transform, pivot: Vec3, distance: f32, fallback: Vec3) {
    let direction = outward_direction(pivot, transform.translation, fallback);
    transform.translation += direction * distance;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Span;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn fixed_config() -> PlacementConfig {
        PlacementConfig {
            grace_delay: Span::fixed(1.0),
            escalation_interval: Span::fixed(2.0),
            escalation_increment: 0.5,
            escalation_step: Span::fixed(1.5),
            ..PlacementConfig::default()
        }
    }

    #[test]
    fn test_grace_counts_down() {
        let config = fixed_config();
        let mut rng = StdRng::seed_from_u64(0);
        let mut search = SearchController::start(&config, &mut rng);

        assert!(!search.advance_grace(0.4));
        assert!(!search.advance_grace(0.4));
        assert!(search.advance_grace(0.4));
        assert!(search.grace_elapsed());
        assert_eq!(search.grace_remaining(), 0.0);
    }

    #[test]
    fn test_escalation_interval_grows() {
        let config = fixed_config();
        let mut rng = StdRng::seed_from_u64(0);
        let mut search = SearchController::start(&config, &mut rng);

        assert!(search.advance_escalation(1.5, &config, &mut rng).is_none());
        let first = search.advance_escalation(0.5, &config, &mut rng).unwrap();
        assert_eq!(first.count, 1);
        assert_eq!(first.step, 1.5);
        assert_eq!(first.next_interval, 2.5);

        assert!(search.advance_escalation(2.0, &config, &mut rng).is_none());
        let second = search.advance_escalation(0.5, &config, &mut rng).unwrap();
        assert_eq!(second.count, 2);
        assert_eq!(second.next_interval, 3.0);
        assert_eq!(search.last_interval(), 3.0);
    }

    #[test]
    fn test_escalation_fires_once_per_call() {
        let config = fixed_config();
        let mut rng = StdRng::seed_from_u64(0);
        let mut search = SearchController::start(&config, &mut rng);

        let fired = search.advance_escalation(100.0, &config, &mut rng);
        assert_eq!(fired.map(|e| e.count), Some(1));
        assert_eq!(search.escalation_count(), 1);
    }

    #[test]
    fn test_nudge_outward_moves_away_from_pivot() {
        let mut transform = Transform::from_xyz(3.0, 1.0, 4.0);
        nudge_outward(&mut transform, Vec3::ZERO, 5.0, Vec3::X);
        assert!((transform.translation - Vec3::new(6.0, 1.0, 8.0)).length() < 1.0e-4);
    }

    #[test]
    fn test_nudge_outward_on_pivot_uses_fallback() {
        let mut transform = Transform::from_xyz(2.0, 0.0, 2.0);
        nudge_outward(&mut transform, Vec3::new(2.0, 0.0, 2.0), 1.0, Vec3::NEG_Z);
        assert_eq!(transform.translation, Vec3::new(2.0, 0.0, 1.0));
    }
}
