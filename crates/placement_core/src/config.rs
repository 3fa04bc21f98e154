//! Tuning for the placement search.
//!
//! Loaded from RON by the host, e.g.
//!
//! ```ron
//! PlacementConfig(
//!     grace_delay: (min: 0.5, max: 1.5),
//!     escalation_interval: (min: 1.0, max: 2.0),
//!     escalation_increment: 0.5,
//!     escalation_step: (min: 1.0, max: 3.0),
//!     max_escalations: None,
//!     orbit_degrees_per_second: 30.0,
//!     elevation_interval_secs: 0.25,
//!     elevation_offset: 0.0,
//!     terrain_layer: 1,
//!     spawn_axis: (0.0, 0.0, 1.0),
//!     fallback_direction: (1.0, 0.0, 0.0),
//! )
//! ```
//!
//! Missing fields take their defaults.

use std::time::Duration;

use bevy::math::Vec3;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::{PlacementError, Result};

/// Inclusive `[min, max]` range sampled uniformly.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Span {
    /// Lower bound.
    pub min: f32,
    /// Upper bound.
    pub max: f32,
}

impl Span {
    /// Create a new span.
    #[must_use]
    pub const fn new(min: f32, max: f32) -> Self {
        Self { min, max }
    }

    /// A span that always yields `value`.
    #[must_use]
    pub const fn fixed(value: f32) -> Self {
        Self::new(value, value)
    }

    /// Draw a value in `[min, max]`.
    pub fn sample<R: Rng>(&self, rng: &mut R) -> f32 {
        if self.max <= self.min {
            self.min
        } else {
            rng.random_range(self.min..=self.max)
        }
    }

    fn validate(&self, field: &'static str) -> Result<()> {
        if !self.min.is_finite() || !self.max.is_finite() {
            return Err(invalid(field, "bounds must be finite"));
        }
        if self.min < 0.0 {
            return Err(invalid(field, format!("min {} is negative", self.min)));
        }
        if self.min > self.max {
            return Err(invalid(
                field,
                format!("min {} exceeds max {}", self.min, self.max),
            ));
        }
        Ok(())
    }
}

/// Tuning values for one faction's placement scheduler.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlacementConfig {
    /// Seconds an attempt must search before the validator is consulted.
    pub grace_delay: Span,
    /// Base seconds between escalations.
    pub escalation_interval: Span,
    /// Seconds added to the interval per escalation already fired.
    pub escalation_increment: f32,
    /// Distance the candidate is pushed outward on each escalation.
    pub escalation_step: Span,
    /// Abort after this many escalations. `None` searches forever.
    pub max_escalations: Option<u32>,
    /// Orbital angular rate around the pivot.
    pub orbit_degrees_per_second: f32,
    /// Wall-clock period of the elevation sync.
    pub elevation_interval_secs: f32,
    /// Added to the sampled terrain height.
    pub elevation_offset: f32,
    /// Layer mask handed to the terrain sampler.
    pub terrain_layer: u32,
    /// Axis along which a new candidate is offset from its pivot.
    pub spawn_axis: (f32, f32, f32),
    /// Escalation direction when a candidate sits exactly on its pivot.
    pub fallback_direction: (f32, f32, f32),
}

impl Default for PlacementConfig {
    fn default() -> Self {
        Self {
            grace_delay: Span::new(0.5, 1.5),
            escalation_interval: Span::new(1.0, 2.0),
            escalation_increment: 0.5,
            escalation_step: Span::new(1.0, 3.0),
            max_escalations: None,
            orbit_degrees_per_second: 30.0,
            elevation_interval_secs: 0.25,
            elevation_offset: 0.0,
            terrain_layer: 1,
            spawn_axis: (0.0, 0.0, 1.0),
            fallback_direction: (1.0, 0.0, 0.0),
        }
    }
}

impl PlacementConfig {
    /// Parse and validate a config from RON text.
    pub fn from_ron(text: &str) -> Result<Self> {
        let config: Self = ron::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Check every field is in range.
    pub fn validate(&self) -> Result<()> {
        self.grace_delay.validate("grace_delay")?;
        self.escalation_interval.validate("escalation_interval")?;
        self.escalation_step.validate("escalation_step")?;

        if !self.escalation_increment.is_finite() || self.escalation_increment < 0.0 {
            return Err(invalid(
                "escalation_increment",
                "must be finite and non-negative",
            ));
        }
        if !self.orbit_degrees_per_second.is_finite() {
            return Err(invalid("orbit_degrees_per_second", "must be finite"));
        }
        self.elevation_interval()?;
        if !self.elevation_offset.is_finite() {
            return Err(invalid("elevation_offset", "must be finite"));
        }
        if self.spawn_axis().length_squared() == 0.0 || !self.spawn_axis().is_finite() {
            return Err(invalid("spawn_axis", "must be a finite non-zero vector"));
        }
        if !self.fallback_direction().is_finite() {
            return Err(invalid("fallback_direction", "must be finite"));
        }
        Ok(())
    }

    /// Normalized spawn axis.
    #[must_use]
    pub fn spawn_axis(&self) -> Vec3 {
        let (x, y, z) = self.spawn_axis;
        Vec3::new(x, y, z).normalize_or_zero()
    }

    /// Escalation fallback direction (not normalized).
    #[must_use]
    pub fn fallback_direction(&self) -> Vec3 {
        let (x, y, z) = self.fallback_direction;
        Vec3::new(x, y, z)
    }

    /// Orbital rate in radians per second.
    #[must_use]
    pub fn orbit_radians_per_second(&self) -> f32 {
        self.orbit_degrees_per_second.to_radians()
    }

    /// Elevation sync period.
    ///
    /// # Errors
    ///
    /// Returns an error if the interval is not a positive, representable
    /// duration.
    pub fn elevation_interval(&self) -> Result<Duration> {
        match Duration::try_from_secs_f32(self.elevation_interval_secs) {
            Ok(interval) if !interval.is_zero() => Ok(interval),
            Ok(_) => Err(invalid("elevation_interval_secs", "must be positive")),
            Err(e) => Err(invalid("elevation_interval_secs", e.to_string())),
        }
    }
}

fn invalid(field: &'static str, reason: impl Into<String>) -> PlacementError {
    PlacementError::InvalidConfig {
        field,
        reason: reason.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_default_config_is_valid() {
        assert!(PlacementConfig::default().validate().is_ok());
    }

    #[test]
    fn test_span_sample_stays_in_bounds() {
        let mut rng = StdRng::seed_from_u64(42);
        let span = Span::new(2.0, 3.0);
        for _ in 0..1000 {
            let v = span.sample(&mut rng);
            assert!((2.0..=3.0).contains(&v), "sample {v} out of range");
        }
    }

    #[test]
    fn test_fixed_span_is_constant() {
        let mut rng = StdRng::seed_from_u64(1);
        assert_eq!(Span::fixed(1.25).sample(&mut rng), 1.25);
    }

    #[test]
    fn test_inverted_span_rejected() {
        let config = PlacementConfig {
            escalation_step: Span::new(3.0, 1.0),
            ..PlacementConfig::default()
        };
        let err = config.validate().unwrap_err();
        assert!(matches!(
            err,
            PlacementError::InvalidConfig {
                field: "escalation_step",
                ..
            }
        ));
    }

    #[test]
    fn test_zero_elevation_interval_rejected() {
        let config = PlacementConfig {
            elevation_interval_secs: 0.0,
            ..PlacementConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_huge_elevation_interval_rejected() {
        let config = PlacementConfig {
            elevation_interval_secs: 1.0e30,
            ..PlacementConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(PlacementError::InvalidConfig {
                field: "elevation_interval_secs",
                ..
            })
        ));
        assert!(config.elevation_interval().is_err());
        assert!(PlacementConfig::from_ron("(elevation_interval_secs: 1e30)").is_err());
    }

    #[test]
    fn test_elevation_interval_converts() {
        let config = PlacementConfig::default();
        assert_eq!(
            config.elevation_interval().unwrap(),
            Duration::from_millis(250)
        );
    }

    #[test]
    fn test_from_ron_partial_uses_defaults() {
        let config = PlacementConfig::from_ron(
            "(grace_delay: (min: 0.0, max: 0.0), max_escalations: Some(12))",
        )
        .unwrap();

        assert_eq!(config.grace_delay, Span::fixed(0.0));
        assert_eq!(config.max_escalations, Some(12));
        assert_eq!(config.escalation_increment, 0.5);
        assert_eq!(config.spawn_axis(), Vec3::Z);
    }

    #[test]
    fn test_from_ron_rejects_garbage() {
        let err = PlacementConfig::from_ron("(grace_delay: nope)").unwrap_err();
        assert!(matches!(err, PlacementError::ConfigParse(_)));
    }

    #[test]
    fn test_from_ron_rejects_invalid_values() {
        let err = PlacementConfig::from_ron("(escalation_increment: -1.0)").unwrap_err();
        assert!(matches!(err, PlacementError::InvalidConfig { .. }));
    }
}
