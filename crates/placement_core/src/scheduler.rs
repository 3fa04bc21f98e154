//! The per-faction placement scheduler.
//!
//! Owns the pending stack, the single active attempt and the elevation task.
//! The host calls [`PlacementScheduler::tick`] every simulation step and
//! [`PlacementScheduler::sync_elevation`] with wall-clock time; everything
//! else happens inside those two calls and [`PlacementScheduler::enqueue`].
//!
//! # Tick order
//!
//! 1. Liveness: a vanished candidate aborts the attempt.
//! 2. Containment: unless the candidate is exempt, the territory must exist
//!    and contain the candidate.
//! 3. Escalation: on timer expiry, push the candidate outward.
//! 4. Orbit: revolve around the pivot.
//! 5. Validity: once the grace delay has elapsed, ask the host and commit on
//!    a positive answer.

use std::f32::consts::TAU;
use std::time::Duration;

use bevy::math::Quat;
use bevy::transform::components::Transform;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::config::PlacementConfig;
use crate::elevation::ElevationSync;
use crate::error::{PlacementError, Result};
use crate::events::{AbortReason, PlacementEvent, PlacementOutcome};
use crate::ids::{CandidateId, FactionId};
use crate::math::{orbit_around, yaw_of};
use crate::queue::{PendingPlacement, PendingQueue, PlacementRequest};
use crate::search::{nudge_outward, SearchController};
use crate::world::{LedgerOp, PlacementHost};

/// Scheduler state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SchedulerStatus {
    /// Nothing active, nothing queued, elevation task stopped.
    #[default]
    Idle,
    /// An attempt is moving but its grace delay has not elapsed.
    Searching,
    /// An attempt is moving and the validator is consulted every tick.
    Active,
}

/// The attempt currently being searched.
#[derive(Debug, Clone)]
struct ActivePlacement {
    record: PendingPlacement,
    search: SearchController,
}

/// What one tick decided for the active attempt.
enum SearchStep {
    Continue,
    Commit(Transform),
    Abort(AbortReason),
}

/// Places buildings for one AI faction, one at a time.
#[derive(Debug, Clone)]
pub struct PlacementScheduler {
    faction: FactionId,
    config: PlacementConfig,
    rng: StdRng,
    queue: PendingQueue,
    active: Option<ActivePlacement>,
    status: SchedulerStatus,
    elevation: ElevationSync,
    events: Vec<PlacementEvent>,
}

impl PlacementScheduler {
    /// Create an idle scheduler. `seed` drives every randomized interval,
    /// distance and spawn angle.
    pub fn new(faction: FactionId, config: PlacementConfig, seed: u64) -> Result<Self> {
        config.validate()?;
        let elevation = ElevationSync::new(config.elevation_interval()?);

        Ok(Self {
            faction,
            config,
            rng: StdRng::seed_from_u64(seed),
            queue: PendingQueue::new(),
            active: None,
            status: SchedulerStatus::Idle,
            elevation,
            events: Vec::new(),
        })
    }

    /// Accept a placement request.
    ///
    /// Reserves the building's cost, spawns a hidden candidate offset from
    /// the pivot at a random orbital angle, and pushes it on the stack. If
    /// nothing is active the new record is promoted immediately.
    ///
    /// A request without a pivot or territory is rejected before anything
    /// is touched.
    pub fn enqueue<H>(&mut self, request: PlacementRequest, host: &mut H) -> Result<CandidateId>
    where
        H: PlacementHost + ?Sized,
    {
        let blueprint = request.blueprint;
        let Some(pivot) = request.pivot else {
            tracing::warn!(
                "Faction {:?} placement of {:?} rejected: no pivot",
                self.faction,
                blueprint
            );
            return Err(PlacementError::MissingPivot(blueprint.0));
        };
        let Some(territory) = request.territory else {
            tracing::warn!(
                "Faction {:?} placement of {:?} rejected: no territory",
                self.faction,
                blueprint
            );
            return Err(PlacementError::MissingTerritory(blueprint.0));
        };
        if !request.distance.is_finite() || request.distance < 0.0 {
            tracing::warn!(
                "Faction {:?} placement of {:?} rejected: distance {}",
                self.faction,
                blueprint,
                request.distance
            );
            return Err(PlacementError::InvalidDistance {
                blueprint: blueprint.0,
                distance: request.distance,
            });
        }

        let mut spawn =
            Transform::from_translation(pivot + self.config.spawn_axis() * request.distance);
        let angle = self.rng.random_range(0.0..TAU);
        spawn.rotate_around(pivot, Quat::from_rotation_y(angle));

        let candidate = host.spawn_candidate(blueprint, spawn);
        let cost = host.cost(candidate);
        host.transact(self.faction, &cost, LedgerOp::Reserve);
        host.set_visible(candidate, false);

        self.queue.push(PendingPlacement {
            blueprint,
            candidate,
            pivot,
            pivot_radius: request.distance,
            territory,
            track_rotation: request.track_rotation,
            reserved_cost: cost,
        });

        tracing::debug!(
            "Faction {:?} queued {:?} as {:?} ({} pending)",
            self.faction,
            blueprint,
            candidate,
            self.queue.len()
        );

        if self.active.is_none() {
            self.elevation.start();
            self.dequeue_next(host);
        }

        Ok(candidate)
    }

    /// Promote the newest pending record, or go idle if there is none.
    ///
    /// Does nothing while an attempt is active; the scheduler advances on
    /// its own when that attempt commits or aborts.
    pub fn dequeue_next<H>(&mut self, host: &mut H)
    where
        H: PlacementHost + ?Sized,
    {
        if self.active.is_some() {
            return;
        }

        let Some(record) = self.queue.pop() else {
            self.elevation.stop();
            self.status = SchedulerStatus::Idle;
            tracing::debug!("Faction {:?} placement queue drained", self.faction);
            return;
        };

        if !self.elevation.is_running() {
            self.elevation.start();
        }

        host.set_visible(record.candidate, true);
        let search = SearchController::start(&self.config, &mut self.rng);
        self.status = if search.grace_elapsed() {
            SchedulerStatus::Active
        } else {
            SchedulerStatus::Searching
        };

        tracing::debug!(
            "Faction {:?} searching for {:?} around {:?}",
            self.faction,
            record.blueprint,
            record.pivot
        );

        self.events.push(PlacementEvent::Started {
            faction: self.faction,
            blueprint: record.blueprint,
            candidate: record.candidate,
        });
        self.active = Some(ActivePlacement { record, search });

        #[cfg(feature = "debug-validation")]
        self.check_invariants();
    }

    /// Advance the active search by `dt` simulation seconds.
    pub fn tick<H>(&mut self, dt: f32, host: &mut H)
    where
        H: PlacementHost + ?Sized,
    {
        let Some(mut active) = self.active.take() else {
            return;
        };

        match self.step(&mut active, dt, host) {
            SearchStep::Continue => self.active = Some(active),
            SearchStep::Commit(transform) => self.commit(active, transform, host),
            SearchStep::Abort(reason) => self.abort(active, reason, host),
        }
    }

    /// Advance the elevation task by `elapsed` wall-clock time, re-grounding
    /// the active candidate if it fires.
    pub fn sync_elevation<H>(&mut self, elapsed: Duration, host: &mut H)
    where
        H: PlacementHost + ?Sized,
    {
        if !self.elevation.advance(elapsed) {
            return;
        }
        let Some(active) = &self.active else {
            return;
        };

        let candidate = active.record.candidate;
        let Some(mut transform) = host.transform(candidate) else {
            // The next tick aborts it.
            return;
        };

        let radius = host.bounding_radius(candidate);
        let ground = host.sample_height(transform.translation, radius, self.config.terrain_layer);
        transform.translation.y = ground + self.config.elevation_offset;
        host.set_transform(candidate, transform);

        tracing::trace!(
            "Faction {:?} {:?} grounded at {}",
            self.faction,
            candidate,
            transform.translation.y
        );
    }

    /// Abort everything: the active attempt and every queued record are
    /// refunded and their candidates destroyed. Only the active attempt
    /// fires an `Ended` event, since queued records never started.
    pub fn cancel_all<H>(&mut self, host: &mut H)
    where
        H: PlacementHost + ?Sized,
    {
        let queued: Vec<PendingPlacement> = self.queue.drain().collect();
        for record in &queued {
            self.release(record, host);
        }

        match self.active.take() {
            Some(active) => self.abort(active, AbortReason::Cancelled, host),
            None => self.dequeue_next(host),
        }

        tracing::debug!(
            "Faction {:?} cancelled {} queued placements",
            self.faction,
            queued.len()
        );
    }

    /// Take every event produced since the last drain.
    pub fn drain_events(&mut self) -> Vec<PlacementEvent> {
        std::mem::take(&mut self.events)
    }

    /// Events produced since the last drain.
    #[must_use]
    pub fn events(&self) -> &[PlacementEvent] {
        &self.events
    }

    /// Owning faction.
    #[must_use]
    pub fn faction(&self) -> FactionId {
        self.faction
    }

    /// Active configuration.
    #[must_use]
    pub fn config(&self) -> &PlacementConfig {
        &self.config
    }

    /// Current state.
    #[must_use]
    pub fn status(&self) -> SchedulerStatus {
        self.status
    }

    /// Whether nothing is active.
    #[must_use]
    pub fn is_idle(&self) -> bool {
        self.active.is_none()
    }

    /// The record being searched, if any.
    #[must_use]
    pub fn active(&self) -> Option<&PendingPlacement> {
        self.active.as_ref().map(|a| &a.record)
    }

    /// Timer state of the active attempt.
    #[must_use]
    pub fn search_progress(&self) -> Option<SearchController> {
        self.active.as_ref().map(|a| a.search)
    }

    /// Records waiting behind the active one.
    #[must_use]
    pub fn pending_len(&self) -> usize {
        self.queue.len()
    }

    /// The record that would be promoted next.
    #[must_use]
    pub fn next_pending(&self) -> Option<&PendingPlacement> {
        self.queue.peek()
    }

    /// Whether the elevation task is scheduled.
    #[must_use]
    pub fn elevation_running(&self) -> bool {
        self.elevation.is_running()
    }

    /// Total elevation firings so far.
    #[must_use]
    pub fn elevation_firings(&self) -> u64 {
        self.elevation.firings()
    }

    fn step<H>(&mut self, active: &mut ActivePlacement, dt: f32, host: &mut H) -> SearchStep
    where
        H: PlacementHost + ?Sized,
    {
        let record = &active.record;
        let candidate = record.candidate;

        if !host.is_alive(candidate) {
            return SearchStep::Abort(AbortReason::CandidateLost);
        }
        let Some(mut transform) = host.transform(candidate) else {
            return SearchStep::Abort(AbortReason::CandidateLost);
        };

        // Exempt candidates skip the whole branch, territory lookup included.
        if !host.is_containment_exempt(candidate) {
            match host.territory(record.territory) {
                None => return SearchStep::Abort(AbortReason::TerritoryLost),
                Some(bounds) if !bounds.contains(transform.translation) => {
                    return SearchStep::Abort(AbortReason::OutOfTerritory);
                }
                Some(_) => {}
            }
        }

        if let Some(escalation) = active
            .search
            .advance_escalation(dt, &self.config, &mut self.rng)
        {
            if self
                .config
                .max_escalations
                .is_some_and(|cap| escalation.count > cap)
            {
                return SearchStep::Abort(AbortReason::SearchExhausted);
            }

            nudge_outward(
                &mut transform,
                record.pivot,
                escalation.step,
                self.config.fallback_direction(),
            );
            tracing::debug!(
                "Faction {:?} {:?} escalation {} (+{:.2} from base {:.2}, next in {:.2}s)",
                self.faction,
                candidate,
                escalation.count,
                escalation.step,
                record.pivot_radius,
                escalation.next_interval
            );
        }

        orbit_around(
            &mut transform,
            record.pivot,
            self.config.orbit_radians_per_second() * dt,
            record.track_rotation,
        );
        host.set_transform(candidate, transform);

        if !active.search.advance_grace(dt) {
            return SearchStep::Continue;
        }
        self.status = SchedulerStatus::Active;

        host.refresh_validity(candidate);
        if host.is_placement_valid(candidate) {
            SearchStep::Commit(transform)
        } else {
            SearchStep::Continue
        }
    }

    fn commit<H>(&mut self, active: ActivePlacement, transform: Transform, host: &mut H)
    where
        H: PlacementHost + ?Sized,
    {
        let record = active.record;
        let position = transform.translation;
        let yaw = yaw_of(transform.rotation);

        host.destroy(record.candidate);
        host.create_placed_instance(record.blueprint, position, yaw, record.territory, self.faction);

        tracing::info!(
            "Faction {:?} placed {:?} at {:?} after {} escalations",
            self.faction,
            record.blueprint,
            position,
            active.search.escalation_count()
        );

        self.finish(&record, PlacementOutcome::Committed { position, yaw });
        self.dequeue_next(host);
    }

    fn abort<H>(&mut self, active: ActivePlacement, reason: AbortReason, host: &mut H)
    where
        H: PlacementHost + ?Sized,
    {
        let record = active.record;
        self.release(&record, host);

        tracing::warn!(
            "Faction {:?} abandoned {:?} ({:?})",
            self.faction,
            record.blueprint,
            reason
        );

        self.finish(&record, PlacementOutcome::Aborted(reason));
        self.dequeue_next(host);
    }

    /// Refund and destroy a record's candidate if it still exists.
    fn release<H>(&self, record: &PendingPlacement, host: &mut H)
    where
        H: PlacementHost + ?Sized,
    {
        if host.is_alive(record.candidate) {
            host.transact(self.faction, &record.reserved_cost, LedgerOp::Refund);
            host.destroy(record.candidate);
        }
    }

    fn finish(&mut self, record: &PendingPlacement, outcome: PlacementOutcome) {
        self.events.push(PlacementEvent::Ended {
            faction: self.faction,
            blueprint: record.blueprint,
            candidate: record.candidate,
            outcome,
        });
    }

    #[cfg(feature = "debug-validation")]
    fn check_invariants(&self) {
        if let Some(active) = &self.active {
            assert!(
                !self.queue.contains_candidate(active.record.candidate),
                "active candidate {:?} is also queued",
                active.record.candidate
            );
        }
        assert_eq!(
            self.active.is_some(),
            self.elevation.is_running(),
            "elevation task must run exactly while an attempt is active"
        );
    }
}
