//! Placement requests and the pending stack.
//!
//! Requests are served newest first: a fresh request preempts everything
//! that was already waiting. Only the scheduler moves records between the
//! stack and the active slot.

use bevy::math::Vec3;

use crate::ids::{BlueprintId, CandidateId, CostSet, TerritoryId};

/// A request to place a building near a pivot.
///
/// Pivot and territory are optional so a caller can forward whatever it has;
/// the scheduler rejects the request if either is missing.
#[derive(Debug, Clone, PartialEq)]
pub struct PlacementRequest {
    /// Building type to place.
    pub blueprint: BlueprintId,
    /// Point the search orbits around.
    pub pivot: Option<Vec3>,
    /// Territory the finished building must belong to.
    pub territory: Option<TerritoryId>,
    /// Spawn distance from the pivot.
    pub distance: f32,
    /// Keep the candidate facing the pivot while it orbits.
    pub track_rotation: bool,
}

impl PlacementRequest {
    /// Create a request with no pivot or territory yet.
    #[must_use]
    pub const fn new(blueprint: BlueprintId) -> Self {
        Self {
            blueprint,
            pivot: None,
            territory: None,
            distance: 0.0,
            track_rotation: false,
        }
    }

    /// Set the pivot.
    #[must_use]
    pub fn with_pivot(mut self, pivot: Vec3) -> Self {
        self.pivot = Some(pivot);
        self
    }

    /// Set the owning territory.
    #[must_use]
    pub fn with_territory(mut self, territory: TerritoryId) -> Self {
        self.territory = Some(territory);
        self
    }

    /// Set the spawn distance from the pivot.
    #[must_use]
    pub fn with_distance(mut self, distance: f32) -> Self {
        self.distance = distance;
        self
    }

    /// Enable or disable facing the pivot while orbiting.
    #[must_use]
    pub fn with_rotation_tracking(mut self, track: bool) -> Self {
        self.track_rotation = track;
        self
    }
}

/// One accepted request, queued or active.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingPlacement {
    /// Building type to place.
    pub blueprint: BlueprintId,
    /// Transient candidate owned by this record.
    pub candidate: CandidateId,
    /// Point the search orbits around.
    pub pivot: Vec3,
    /// Spawn distance from the pivot. Escalation pushes past it.
    pub pivot_radius: f32,
    /// Territory the finished building must belong to.
    pub territory: TerritoryId,
    /// Keep the candidate facing the pivot while it orbits.
    pub track_rotation: bool,
    /// Cost taken from the ledger at enqueue time.
    pub reserved_cost: CostSet,
}

/// LIFO stack of records waiting for their turn.
#[derive(Debug, Clone, Default)]
pub struct PendingQueue {
    records: Vec<PendingPlacement>,
}

impl PendingQueue {
    /// Create an empty queue.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Push a record on top.
    pub fn push(&mut self, record: PendingPlacement) {
        self.records.push(record);
    }

    /// Pop the most recently pushed record.
    pub fn pop(&mut self) -> Option<PendingPlacement> {
        self.records.pop()
    }

    /// Record that would be popped next.
    #[must_use]
    pub fn peek(&self) -> Option<&PendingPlacement> {
        self.records.last()
    }

    /// Number of waiting records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether nothing is waiting.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Whether a candidate belongs to a waiting record.
    #[must_use]
    pub fn contains_candidate(&self, candidate: CandidateId) -> bool {
        self.records.iter().any(|r| r.candidate == candidate)
    }

    /// Remove every waiting record, newest first.
    pub fn drain(&mut self) -> impl Iterator<Item = PendingPlacement> + '_ {
        self.records.drain(..).rev()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(candidate: u64) -> PendingPlacement {
        PendingPlacement {
            blueprint: BlueprintId(1),
            candidate: CandidateId(candidate),
            pivot: Vec3::ZERO,
            pivot_radius: 5.0,
            territory: TerritoryId(1),
            track_rotation: false,
            reserved_cost: CostSet::free(),
        }
    }

    #[test]
    fn test_queue_pops_newest_first() {
        let mut queue = PendingQueue::new();
        queue.push(record(1));
        queue.push(record(2));
        queue.push(record(3));

        assert_eq!(queue.len(), 3);
        assert_eq!(queue.peek().map(|r| r.candidate), Some(CandidateId(3)));
        assert_eq!(queue.pop().map(|r| r.candidate), Some(CandidateId(3)));
        assert_eq!(queue.pop().map(|r| r.candidate), Some(CandidateId(2)));
        assert_eq!(queue.pop().map(|r| r.candidate), Some(CandidateId(1)));
        assert!(queue.pop().is_none());
        assert!(queue.is_empty());
    }

    #[test]
    fn test_queue_drain_newest_first() {
        let mut queue = PendingQueue::new();
        queue.push(record(1));
        queue.push(record(2));

        let drained: Vec<_> = queue.drain().map(|r| r.candidate).collect();
        assert_eq!(drained, vec![CandidateId(2), CandidateId(1)]);
        assert!(queue.is_empty());
    }

    #[test]
    fn test_contains_candidate() {
        let mut queue = PendingQueue::new();
        queue.push(record(4));
        assert!(queue.contains_candidate(CandidateId(4)));
        assert!(!queue.contains_candidate(CandidateId(5)));
    }

    #[test]
    fn test_request_builder() {
        let request = PlacementRequest::new(BlueprintId(9))
            .with_pivot(Vec3::new(1.0, 2.0, 3.0))
            .with_territory(TerritoryId(4))
            .with_distance(6.0)
            .with_rotation_tracking(true);

        assert_eq!(request.pivot, Some(Vec3::new(1.0, 2.0, 3.0)));
        assert_eq!(request.territory, Some(TerritoryId(4)));
        assert_eq!(request.distance, 6.0);
        assert!(request.track_rotation);
    }
}
