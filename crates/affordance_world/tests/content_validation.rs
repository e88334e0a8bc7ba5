//! Content validation tests for the shipped rule files and scenarios.
//!
//! These tests load the actual `content/*.json` files and check:
//! 1. Schema validity: every file deserializes
//! 2. Range constraints on the tunable constants
//! 3. Scenario consistency: every snapshot passes the stale-reference check
//! 4. Scenario behavior: each scenario shows the controls it was written for

use affordance_core::{
    evaluate_snapshot, validate, ActionKind, ActionStatus, Affordance, Descriptor,
    DisabledReason, Registry, RuleSet, Snapshot, SnapshotPermissions,
};
use affordance_world::{load_rules, load_snapshot};
use std::path::PathBuf;
use std::sync::OnceLock;

/// Integration tests run from the crate directory, so go up two levels.
fn content_dir() -> String {
    let manifest = std::env::var("CARGO_MANIFEST_DIR").expect("CARGO_MANIFEST_DIR not set");
    format!("{manifest}/../../content")
}

fn scenario_path(name: &str) -> PathBuf {
    PathBuf::from(content_dir())
        .join("scenarios")
        .join(format!("{name}.json"))
}

/// Shared rules loaded once across all tests in this module.
fn load_test_rules() -> &'static RuleSet {
    static RULES: OnceLock<RuleSet> = OnceLock::new();
    RULES.get_or_init(|| {
        load_rules(&content_dir()).expect("load_rules should succeed for shipped content")
    })
}

fn evaluate_scenario(name: &str) -> (Snapshot, Vec<Affordance>) {
    let snapshot = load_snapshot(&scenario_path(name)).expect("scenario should load");
    let oracle = SnapshotPermissions::new(&snapshot);
    let affordances =
        evaluate_snapshot(&Registry::standard(), &snapshot, load_test_rules(), &oracle);
    (snapshot, affordances)
}

fn find(affordances: &[Affordance], kind: ActionKind) -> &Descriptor {
    affordances
        .iter()
        .find(|affordance| affordance.kind() == kind)
        .map(Affordance::primary)
        .unwrap_or_else(|| panic!("{kind} should be offered"))
}

// =========================================================================
// 1. Schema validation
// =========================================================================

#[test]
fn rules_load_successfully() {
    let rules = load_test_rules();
    assert!(!rules.content_version.is_empty());
}

#[test]
fn every_scenario_loads_and_is_consistent() {
    let dir = PathBuf::from(content_dir()).join("scenarios");
    let mut count = 0;
    for entry in std::fs::read_dir(&dir).expect("scenarios dir should exist") {
        let path = entry.expect("dir entry").path();
        if path.extension().is_some_and(|ext| ext == "json") {
            let snapshot = load_snapshot(&path)
                .unwrap_or_else(|err| panic!("{} failed to load: {err:#}", path.display()));
            assert!(
                validate(&snapshot).is_ok(),
                "{} has stale references",
                path.display()
            );
            assert!(snapshot.crew.is_some(), "{} has no crew", path.display());
            count += 1;
        }
    }
    assert!(count > 0, "no scenarios found in {}", dir.display());
}

// =========================================================================
// 2. Range constraints
// =========================================================================

#[test]
fn schedule_buffer_is_at_least_an_hour() {
    let rules = load_test_rules();
    assert!(
        rules.constants.crew_schedule_buffer_secs >= 3_600,
        "buffer of {}s would make most sequenced actions read fully scheduled",
        rules.constants.crew_schedule_buffer_secs
    );
}

#[test]
fn simulation_allows_the_opening_actions() {
    let rules = load_test_rules();
    for kind in [ActionKind::ScanSurface, ActionKind::ScanResources] {
        assert!(
            rules.simulation.allows(kind),
            "simulation mode should allow {kind}"
        );
    }
}

// =========================================================================
// 3. Scenario behavior
// =========================================================================

#[test]
fn idle_extractor_can_extract_now() {
    let (_, affordances) = evaluate_scenario("extractor_idle");
    let extract = find(&affordances, ActionKind::Extract);
    assert_eq!(extract.disabled_reason, None);
    assert_eq!(extract.scheduled_for, None);
    assert_eq!(extract.status, ActionStatus::Ready);
}

#[test]
fn busy_crew_queues_sampling_but_cannot_recruit() {
    let (snapshot, affordances) = evaluate_scenario("busy_crew");
    let ready_at = snapshot.crew.as_ref().map(|crew| crew.ready_at);

    let sample = find(&affordances, ActionKind::NewCoreSample);
    assert_eq!(sample.disabled_reason, None);
    assert_eq!(sample.scheduled_for, ready_at);

    let recruit = find(&affordances, ActionKind::RecruitCrewmate);
    assert_eq!(recruit.disabled_reason, Some(DisabledReason::CrewBusy));
    assert_eq!(recruit.scheduled_for, None);
}

#[test]
fn warehouse_stacks_incoming_deliveries() {
    let (_, affordances) = evaluate_scenario("deliveries");
    let stack = affordances
        .iter()
        .find_map(|affordance| match affordance {
            Affordance::Stack(stack) if stack.summary.kind == ActionKind::SurfaceTransferIncoming => {
                Some(stack)
            }
            _ => None,
        })
        .expect("incoming deliveries should stack");

    assert_eq!(stack.summary.flags.tally, Some(3));
    let statuses: Vec<ActionStatus> = stack.items.iter().map(|item| item.status).collect();
    assert_eq!(
        statuses,
        vec![
            ActionStatus::Finishing,
            ActionStatus::InProgress,
            ActionStatus::Ready,
        ]
    );
    assert_eq!(stack.summary.status, ActionStatus::InProgress);
}

#[test]
fn low_tank_blocks_course_but_allows_emergency_mode() {
    let (_, affordances) = evaluate_scenario("ship_in_orbit");
    let course = find(&affordances, ActionKind::SetCourse);
    assert_eq!(
        course.disabled_reason,
        Some(DisabledReason::InsufficientPropellant)
    );
    let emergency = find(&affordances, ActionKind::EmergencyModeToggle);
    assert_eq!(emergency.disabled_reason, None);
}
