//! Property tests: the engine invariants hold over seeded random snapshots.
//!
//! Every snapshot is generated from a fixed seed, so a failure names the seed
//! that reproduces it.

use affordance_core::test_fixtures::base_rules;
use affordance_core::{
    audit, audit_progression, evaluate, Affordance, Context, Registry, SnapshotPermissions,
};
use affordance_world::seeded_snapshot;

const SEEDS: u64 = 300;
const NOW: u64 = 1_700_000_000;

#[test]
fn audit_finds_nothing_on_random_snapshots() {
    let registry = Registry::standard();
    let rules = base_rules();
    for seed in 0..SEEDS {
        let snapshot = seeded_snapshot(seed, NOW);
        let oracle = SnapshotPermissions::new(&snapshot);
        let ctx = Context::new(&snapshot, &rules, &oracle).expect("generated snapshot is valid");
        let violations = audit(&registry, &ctx);
        assert!(violations.is_empty(), "seed {seed}: {violations:?}");
    }
}

#[test]
fn readiness_never_regresses_as_time_passes() {
    let registry = Registry::standard();
    let rules = base_rules();
    for seed in 0..SEEDS {
        let earlier = seeded_snapshot(seed, NOW);
        for step in [1, 600, 3_600, 86_400] {
            let later = earlier.at(NOW + step);
            let earlier_oracle = SnapshotPermissions::new(&earlier);
            let later_oracle = SnapshotPermissions::new(&later);
            let before = Context::new(&earlier, &rules, &earlier_oracle).expect("valid");
            let after = Context::new(&later, &rules, &later_oracle).expect("valid");
            let violations = audit_progression(&registry, &before, &after);
            assert!(
                violations.is_empty(),
                "seed {seed} step {step}: {violations:?}"
            );
        }
    }
}

#[test]
fn busy_and_scheduled_are_exclusive_on_random_snapshots() {
    let registry = Registry::standard();
    let rules = base_rules();
    for seed in 0..SEEDS {
        let snapshot = seeded_snapshot(seed, NOW);
        let oracle = SnapshotPermissions::new(&snapshot);
        let ctx = Context::new(&snapshot, &rules, &oracle).expect("valid");
        for affordance in evaluate(&registry, &ctx) {
            let descriptor = affordance.primary();
            if descriptor.scheduled_for.is_some() {
                assert!(
                    !descriptor.flags.disabled,
                    "seed {seed}: {} disabled yet scheduled",
                    descriptor.kind
                );
            }
        }
    }
}

#[test]
fn stack_summaries_count_their_rows() {
    let registry = Registry::standard();
    let rules = base_rules();
    for seed in 0..SEEDS {
        let snapshot = seeded_snapshot(seed, NOW);
        let oracle = SnapshotPermissions::new(&snapshot);
        let ctx = Context::new(&snapshot, &rules, &oracle).expect("valid");
        for affordance in evaluate(&registry, &ctx) {
            if let Affordance::Stack(stack) = affordance {
                assert!(stack.items.len() >= 2, "seed {seed}: stack of one");
                assert_eq!(stack.summary.flags.tally, Some(stack.items.len()));
                assert_eq!(stack.summary.on_click, stack.items[0].on_click);
            }
        }
    }
}
