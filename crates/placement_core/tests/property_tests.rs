//! Property tests over randomized requests and tuning.

use bevy::math::Vec3;
use placement_core::config::{PlacementConfig, Span};
use placement_core::events::PlacementEvent;
use placement_core::ids::{BlueprintId, CandidateId};
use placement_core::scheduler::PlacementScheduler;
use placement_test_utils::determinism::{placement_hash, verify_determinism};
use placement_test_utils::fixtures::{request, standard_cost, AI_FACTION, ALLOYS, FEEDSTOCK, HOME};
use placement_test_utils::strategies::{arb_config, arb_dt, arb_request, arb_request_list};
use placement_test_utils::{FakeWorld, ValidityRule};
use proptest::prelude::*;

fn costly_world() -> FakeWorld {
    let mut world = FakeWorld::new().with_territory(HOME, Vec3::ZERO, 1000.0);
    for blueprint in 1..8 {
        world = world.with_cost(BlueprintId(blueprint), standard_cost());
    }
    world
}

fn started(events: &[PlacementEvent]) -> Vec<CandidateId> {
    events
        .iter()
        .filter_map(|e| match e {
            PlacementEvent::Started { candidate, .. } => Some(*candidate),
            PlacementEvent::Ended { .. } => None,
        })
        .collect()
}

proptest! {
    /// Records queued behind an active attempt are served newest first.
    #[test]
    fn prop_queued_records_are_served_lifo(
        requests in arb_request_list(8),
        seed in any::<u64>(),
    ) {
        let mut world = costly_world();
        let mut scheduler =
            PlacementScheduler::new(AI_FACTION, PlacementConfig::default(), seed).unwrap();

        let blocker = scheduler.enqueue(request(BlueprintId(1)), &mut world).unwrap();
        let mut queued = Vec::new();
        for r in requests {
            queued.push(scheduler.enqueue(r, &mut world).unwrap());
        }

        while let Some(active) = scheduler.active() {
            let candidate = active.candidate;
            world.kill_candidate(candidate);
            scheduler.tick(0.1, &mut world);
        }

        let mut expected = vec![blocker];
        expected.extend(queued.iter().rev());
        prop_assert_eq!(started(scheduler.events()), expected);
    }

    /// Aborted attempts refund exactly what they reserved and every
    /// candidate is destroyed exactly once.
    #[test]
    fn prop_abort_refunds_reservation(
        config in arb_config(),
        requests in arb_request_list(6),
        ticks in 0usize..40,
        dt in arb_dt(),
        seed in any::<u64>(),
    ) {
        let mut world = costly_world().with_validity(ValidityRule::Never);
        let mut scheduler = PlacementScheduler::new(AI_FACTION, config, seed).unwrap();

        for r in requests {
            scheduler.enqueue(r, &mut world).unwrap();
        }
        for _ in 0..ticks {
            scheduler.tick(dt, &mut world);
        }
        scheduler.cancel_all(&mut world);

        prop_assert!(scheduler.is_idle());
        prop_assert!(!scheduler.elevation_running());
        prop_assert_eq!(world.reserved(AI_FACTION, FEEDSTOCK), world.refunded(AI_FACTION, FEEDSTOCK));
        prop_assert_eq!(world.reserved(AI_FACTION, ALLOYS), world.refunded(AI_FACTION, ALLOYS));
        for candidate in world.spawned.clone() {
            prop_assert_eq!(world.destroy_count(candidate), 1);
        }
    }

    /// Committed or aborted, a candidate is destroyed once and only once.
    #[test]
    fn prop_candidates_destroyed_exactly_once(
        requests in arb_request_list(6),
        seed in any::<u64>(),
    ) {
        let mut world = costly_world().with_validity(ValidityRule::OutsideRadius {
            center: Vec3::ZERO,
            radius: 30.0,
        });
        let config = PlacementConfig {
            max_escalations: Some(12),
            ..PlacementConfig::default()
        };
        let mut scheduler = PlacementScheduler::new(AI_FACTION, config, seed).unwrap();

        for r in requests {
            scheduler.enqueue(r, &mut world).unwrap();
        }
        for _ in 0..5000 {
            if scheduler.is_idle() {
                break;
            }
            scheduler.tick(0.1, &mut world);
        }

        prop_assert!(scheduler.is_idle());
        for candidate in world.spawned.clone() {
            prop_assert_eq!(world.destroy_count(candidate), 1);
        }
        let ends = scheduler
            .events()
            .iter()
            .filter(|e| matches!(e, PlacementEvent::Ended { .. }))
            .count();
        prop_assert_eq!(ends, world.spawned.len());
    }

    /// Without rotation tracking a tick never changes the candidate's
    /// orientation.
    #[test]
    fn prop_orientation_fixed_without_tracking(
        config in arb_config(),
        r in arb_request(),
        dts in proptest::collection::vec(arb_dt(), 1..30),
        seed in any::<u64>(),
    ) {
        let mut world = costly_world();
        let mut scheduler = PlacementScheduler::new(AI_FACTION, config, seed).unwrap();
        let candidate = scheduler
            .enqueue(r.with_rotation_tracking(false), &mut world)
            .unwrap();

        for dt in dts {
            let Some(before) = world.candidate(candidate).map(|c| c.transform.rotation) else {
                break;
            };
            scheduler.tick(dt, &mut world);
            if let Some(after) = world.candidate(candidate) {
                prop_assert_eq!(after.transform.rotation, before);
            }
        }
    }

    /// With a fixed base interval, each escalation waits longer than the
    /// last.
    #[test]
    fn prop_escalation_intervals_increase(
        base in 0.1f32..2.0,
        increment in 0.05f32..1.0,
        dt in arb_dt(),
        seed in any::<u64>(),
    ) {
        let config = PlacementConfig {
            escalation_interval: Span::fixed(base),
            escalation_increment: increment,
            ..PlacementConfig::default()
        };
        let mut world = costly_world();
        let mut scheduler = PlacementScheduler::new(AI_FACTION, config, seed).unwrap();
        scheduler.enqueue(request(BlueprintId(2)), &mut world).unwrap();

        let mut intervals = Vec::new();
        let mut count = 0;
        for _ in 0..400 {
            scheduler.tick(dt, &mut world);
            let Some(progress) = scheduler.search_progress() else {
                break;
            };
            if progress.escalation_count() != count {
                count = progress.escalation_count();
                intervals.push(progress.last_interval());
            }
        }

        prop_assert!(intervals.windows(2).all(|w| w[0] < w[1]), "{:?}", intervals);
    }
}

#[test]
fn test_same_seed_replays_identically() {
    let result = verify_determinism(
        3,
        200,
        || {
            let mut world = costly_world().with_validity(ValidityRule::OutsideRadius {
                center: Vec3::ZERO,
                radius: 12.0,
            });
            let mut scheduler =
                PlacementScheduler::new(AI_FACTION, PlacementConfig::default(), 99).unwrap();
            for blueprint in 1..4 {
                scheduler
                    .enqueue(request(BlueprintId(blueprint)), &mut world)
                    .unwrap();
            }
            (scheduler, world)
        },
        |(scheduler, world)| scheduler.tick(0.05, world),
        |(scheduler, world)| placement_hash(scheduler, world),
    );

    result.assert_deterministic();
}
