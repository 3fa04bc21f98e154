//! Error types for the placement scheduler.

use thiserror::Error;

/// Result type alias using [`PlacementError`].
pub type Result<T> = std::result::Result<T, PlacementError>;

/// Top-level error type for placement requests and configuration.
///
/// Only synchronous rejections surface here. Losing a territory or a
/// candidate mid-search is a normal abort outcome, not an error.
#[derive(Debug, Error)]
pub enum PlacementError {
    /// Placement request carried no pivot anchor.
    #[error("Placement request for blueprint {0} has no pivot anchor")]
    MissingPivot(u32),

    /// Placement request carried no owning territory.
    #[error("Placement request for blueprint {0} has no owning territory")]
    MissingTerritory(u32),

    /// Placement request asked for a negative or non-finite pivot distance.
    #[error("Invalid pivot distance {distance} for blueprint {blueprint}")]
    InvalidDistance {
        /// Blueprint of the rejected request.
        blueprint: u32,
        /// The offending distance.
        distance: f32,
    },

    /// A configuration value is out of range.
    #[error("Invalid placement config field '{field}': {reason}")]
    InvalidConfig {
        /// Name of the offending field.
        field: &'static str,
        /// Why the value was rejected.
        reason: String,
    },

    /// Configuration text could not be parsed.
    #[error("Failed to parse placement config: {0}")]
    ConfigParse(#[from] ron::error::SpannedError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        assert_eq!(
            PlacementError::MissingPivot(7).to_string(),
            "Placement request for blueprint 7 has no pivot anchor"
        );
        assert_eq!(
            PlacementError::MissingTerritory(3).to_string(),
            "Placement request for blueprint 3 has no owning territory"
        );
        assert_eq!(
            PlacementError::InvalidConfig {
                field: "grace_delay",
                reason: "min exceeds max".into(),
            }
            .to_string(),
            "Invalid placement config field 'grace_delay': min exceeds max"
        );
    }
}
