use super::*;
use crate::test_fixtures::{asteroid_id, lot_id, other_crew_id};

#[test]
fn busy_crew_disables_non_sequenceable_action() {
    let snapshot = busy_snapshot(500, 1_000);
    let subject = lot_action(ActionKind::RecruitCrewmate).requires(Requirement::start());
    assert_eq!(
        reason_for(&snapshot, &subject),
        Some(DisabledReason::CrewBusy)
    );
    assert_eq!(scheduled_for(&snapshot, &subject), None);
}

#[test]
fn schedule_past_buffer_is_fully_scheduled() {
    // Buffer is one hour: booked until exactly now + buffer is too far.
    let snapshot = busy_snapshot(500, 4_100);
    let subject = lot_action(ActionKind::Extract).requires(Requirement::start().sequenceable());
    assert_eq!(
        reason_for(&snapshot, &subject),
        Some(DisabledReason::FullyScheduled)
    );
    assert_eq!(scheduled_for(&snapshot, &subject), None);
}

#[test]
fn permission_denial_wins_over_readiness() {
    let mut snapshot = busy_snapshot(500, 1_000);
    snapshot.lot.as_mut().unwrap().controller = Some(other_crew_id());
    let subject = lot_action(ActionKind::PlanBuilding).requires(
        Requirement::start().permission(Permission::UseLot, EntityRef::Lot(lot_id())),
    );
    assert_eq!(
        reason_for(&snapshot, &subject),
        Some(DisabledReason::AccessRestricted)
    );

    snapshot.crew.as_mut().unwrap().ready_at = 0;
    assert_eq!(
        reason_for(&snapshot, &subject),
        Some(DisabledReason::AccessRestricted)
    );
}

#[test]
fn simulation_blocks_kinds_outside_the_allow_list() {
    let mut snapshot = base_snapshot();
    snapshot.crew.as_mut().unwrap().simulation = true;

    let restricted = lot_action(ActionKind::PlanBuilding).requires(Requirement::start());
    assert_eq!(
        reason_for(&snapshot, &restricted),
        Some(DisabledReason::SimulationRestricted)
    );

    let allowed = lot_action(ActionKind::Extract).requires(Requirement::start());
    assert_eq!(reason_for(&snapshot, &allowed), None);
}

#[test]
fn loading_precedes_everything() {
    let mut snapshot = busy_snapshot(500, 1_000);
    snapshot.loading = true;
    snapshot.launched = false;
    snapshot.lot.as_mut().unwrap().controller = Some(other_crew_id());
    let subject = lot_action(ActionKind::PlanBuilding).requires(
        Requirement::start().permission(Permission::UseLot, EntityRef::Lot(lot_id())),
    );
    assert_eq!(
        reason_for(&snapshot, &subject),
        Some(DisabledReason::Loading)
    );
}

#[test]
fn pending_transaction_on_the_instance_is_loading() {
    let mut snapshot = base_snapshot();
    snapshot.pending.push(test_fixtures::pending(
        ActionKind::PlanBuilding,
        Stage::Start,
        EntityRef::Lot(lot_id()),
        None,
    ));
    let subject = lot_action(ActionKind::PlanBuilding).requires(Requirement::start());
    assert_eq!(
        reason_for(&snapshot, &subject),
        Some(DisabledReason::Loading)
    );
    // A different kind on the same target is not this instance.
    let other = lot_action(ActionKind::NewCoreSample).requires(Requirement::start());
    assert_eq!(reason_for(&snapshot, &other), None);
}

#[test]
fn not_launched_sits_between_loading_and_permission() {
    let mut snapshot = base_snapshot();
    snapshot.launched = false;
    snapshot.lot.as_mut().unwrap().controller = Some(other_crew_id());
    let subject = lot_action(ActionKind::PlanBuilding).requires(
        Requirement::start().permission(Permission::UseLot, EntityRef::Lot(lot_id())),
    );
    assert_eq!(
        reason_for(&snapshot, &subject),
        Some(DisabledReason::NotYetLaunched)
    );
}

#[test]
fn presence_checks_asteroid_then_surface() {
    let mut snapshot = base_snapshot();
    let subject = lot_action(ActionKind::Extract).requires(
        Requirement::start()
            .on_asteroid(Some(&asteroid_id()))
            .on_surface(),
    );

    snapshot.crew.as_mut().unwrap().location.lot = None;
    assert_eq!(
        reason_for(&snapshot, &subject),
        Some(DisabledReason::CrewInOrbit)
    );

    snapshot.crew.as_mut().unwrap().location.asteroid =
        Some(AsteroidId("asteroid_0042".to_string()));
    assert_eq!(
        reason_for(&snapshot, &subject),
        Some(DisabledReason::CrewAway)
    );
}

#[test]
fn unresolved_event_blocks_other_kinds_only() {
    let mut snapshot = base_snapshot();
    snapshot.crew.as_mut().unwrap().pending_event = Some(CrewEvent {
        triggered_by: ActionKind::Extract,
        resolved: false,
    });

    let other = lot_action(ActionKind::NewCoreSample).requires(Requirement::start());
    assert_eq!(
        reason_for(&snapshot, &other),
        Some(DisabledReason::EventPending)
    );
    let same = lot_action(ActionKind::Extract).requires(Requirement::start());
    assert_eq!(reason_for(&snapshot, &same), None);

    // Finishing an in-flight action does not need the crew.
    let finish = lot_action(ActionKind::NewCoreSample).requires(Requirement::none());
    assert_eq!(reason_for(&snapshot, &finish), None);

    snapshot.crew.as_mut().unwrap().pending_event = Some(CrewEvent {
        triggered_by: ActionKind::Extract,
        resolved: true,
    });
    assert_eq!(reason_for(&snapshot, &other), None);
}

#[test]
fn domain_reason_precedes_generic_chain() {
    let snapshot = busy_snapshot(500, 1_000);
    let subject = lot_action(ActionKind::Deconstruct)
        .requires(Requirement::start())
        .reason(Some(DisabledReason::NotEmpty));
    assert_eq!(
        reason_for(&snapshot, &subject),
        Some(DisabledReason::NotEmpty)
    );
}

struct Unreachable;

impl PermissionOracle for Unreachable {
    fn is_permitted(
        &self,
        _crew: &CrewState,
        _permission: Permission,
        _target: &EntityRef,
        _at: u64,
    ) -> Result<bool, PermissionError> {
        Err(PermissionError::Unavailable("timeout".to_string()))
    }
}

#[test]
fn undetermined_permission_fails_closed() {
    let snapshot = base_snapshot();
    let rules = base_rules();
    let ctx = Context::new(&snapshot, &rules, &Unreachable).unwrap();
    let subject = lot_action(ActionKind::PlanBuilding).requires(
        Requirement::start().permission(Permission::UseLot, EntityRef::Lot(lot_id())),
    );
    assert_eq!(
        resolve_disabled_reason(&ctx, &subject),
        Some(DisabledReason::AccessRestricted)
    );
}

#[test]
fn resolution_is_idempotent() {
    let snapshot = busy_snapshot(500, 1_000);
    let subject = lot_action(ActionKind::Extract).requires(Requirement::start().sequenceable());
    let first = reason_for(&snapshot, &subject);
    assert_eq!(first, reason_for(&snapshot, &subject));
    assert_eq!(first, None);
}

#[test]
fn stale_snapshot_is_rejected() {
    let mut snapshot = base_snapshot();
    snapshot.building.as_mut().unwrap().lot = LotId("lot_0099".to_string());
    assert!(matches!(
        validate(&snapshot),
        Err(SnapshotError::Stale { .. })
    ));

    let rules = base_rules();
    let oracle = SnapshotPermissions::new(&snapshot);
    assert!(evaluate_snapshot(&Registry::standard(), &snapshot, &rules, &oracle).is_empty());
}

#[test]
fn snapshot_without_crew_is_rejected() {
    let mut snapshot = base_snapshot();
    snapshot.crew = None;
    let rules = base_rules();
    let oracle = SnapshotPermissions::new(&snapshot);
    assert!(matches!(
        Context::new(&snapshot, &rules, &oracle),
        Err(SnapshotError::MissingCrew)
    ));
}
