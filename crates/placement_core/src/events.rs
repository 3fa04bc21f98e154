//! Notifications fired on attempt start and end.
//!
//! Exactly one `Started` and one `Ended` is produced per attempt. Listeners
//! (rendering, UI, logging) consume them after draining the scheduler.

use bevy::math::Vec3;

use crate::ids::{BlueprintId, CandidateId, FactionId};

/// Why an attempt was abandoned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AbortReason {
    /// The candidate instance was destroyed by someone else.
    CandidateLost,
    /// The owning territory no longer exists.
    TerritoryLost,
    /// The candidate drifted outside the territory radius.
    OutOfTerritory,
    /// The escalation cap was exceeded.
    SearchExhausted,
    /// The host cancelled all pending placements.
    Cancelled,
}

/// How an attempt ended.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PlacementOutcome {
    /// The building was created.
    Committed {
        /// Final position handed to the building factory.
        position: Vec3,
        /// Final yaw (radians) handed to the building factory.
        yaw: f32,
    },
    /// The attempt was abandoned.
    Aborted(AbortReason),
}

impl PlacementOutcome {
    /// Whether the building was created.
    #[must_use]
    pub const fn is_committed(&self) -> bool {
        matches!(self, Self::Committed { .. })
    }
}

/// Events generated by a placement scheduler.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PlacementEvent {
    /// A record became active and its candidate is now searching.
    Started {
        /// Owning faction.
        faction: FactionId,
        /// Building type being placed.
        blueprint: BlueprintId,
        /// Candidate instance.
        candidate: CandidateId,
    },
    /// The active attempt finished.
    Ended {
        /// Owning faction.
        faction: FactionId,
        /// Building type being placed.
        blueprint: BlueprintId,
        /// Candidate instance (already destroyed).
        candidate: CandidateId,
        /// Result of the attempt.
        outcome: PlacementOutcome,
    },
}

impl PlacementEvent {
    /// Candidate the event refers to.
    #[must_use]
    pub const fn candidate(&self) -> CandidateId {
        match self {
            Self::Started { candidate, .. } | Self::Ended { candidate, .. } => *candidate,
        }
    }
}
