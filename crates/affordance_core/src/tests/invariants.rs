use super::*;
use crate::test_fixtures::{incoming_delivery, sample, ship_in_orbit};

fn audit_snapshot(snapshot: &Snapshot) -> Vec<Violation> {
    let rules = base_rules();
    let oracle = SnapshotPermissions::new(snapshot);
    let ctx = Context::new(snapshot, &rules, &oracle).unwrap();
    audit(&Registry::standard(), &ctx)
}

#[test]
fn base_snapshot_is_clean() {
    assert_eq!(audit_snapshot(&base_snapshot()), vec![]);
}

#[test]
fn busy_crew_with_stacks_is_clean() {
    let mut snapshot = base_snapshot().at(250);
    snapshot.deliveries = vec![
        incoming_delivery("delivery_0001", 1, Some(100)),
        incoming_delivery("delivery_0002", 0, None),
    ];
    snapshot.samples.push(sample("sample_0002", 1, Some(200)));
    snapshot.samples.push(sample("sample_0003", 1, Some(900)));
    snapshot.ship = Some(ship_in_orbit());
    assert_eq!(audit_snapshot(&snapshot), vec![]);
}

struct Wayward;

impl ActionRule for Wayward {
    fn kind(&self) -> ActionKind {
        ActionKind::Extract
    }

    fn icon(&self) -> Icon {
        Icon::Extract
    }

    fn states(&self) -> &'static [ActionStatus] {
        &[ActionStatus::Ready]
    }

    fn is_visible(&self, _ctx: &Context<'_>) -> bool {
        true
    }

    fn subject(&self, ctx: &Context<'_>) -> Option<Subject> {
        let target = EntityRef::Lot(test_fixtures::lot_id());
        Some(Subject::new(self.kind(), target, timed(ctx.now(), Some(0))))
    }
}

#[test]
fn status_outside_the_state_set_is_reported() {
    let snapshot = base_snapshot();
    let rules = base_rules();
    let oracle = SnapshotPermissions::new(&snapshot);
    let ctx = Context::new(&snapshot, &rules, &oracle).unwrap();
    let mut registry = Registry::empty();
    registry.register(Wayward);

    assert_eq!(
        audit(&registry, &ctx),
        vec![Violation::UnknownState {
            kind: ActionKind::Extract,
            status: ActionStatus::ReadyToFinish,
        }]
    );
}

/// Claims to be visible but offers nothing to show.
struct Hollow;

impl ActionRule for Hollow {
    fn kind(&self) -> ActionKind {
        ActionKind::SurfaceTransferIncoming
    }

    fn icon(&self) -> Icon {
        Icon::Transfer
    }

    fn states(&self) -> &'static [ActionStatus] {
        &[ActionStatus::Ready]
    }

    fn is_visible(&self, _ctx: &Context<'_>) -> bool {
        true
    }

    fn subject(&self, _ctx: &Context<'_>) -> Option<Subject> {
        None
    }
}

#[test]
fn visible_kind_without_a_status_is_reported() {
    let snapshot = base_snapshot();
    let rules = base_rules();
    let oracle = SnapshotPermissions::new(&snapshot);
    let ctx = Context::new(&snapshot, &rules, &oracle).unwrap();
    let mut registry = Registry::empty();
    registry.register(Hollow);

    assert_eq!(
        audit(&registry, &ctx),
        vec![Violation::Statusless {
            kind: ActionKind::SurfaceTransferIncoming,
        }]
    );
}

#[test]
fn incoming_deliveries_alone_pass_the_audit() {
    let mut snapshot = base_snapshot();
    snapshot.deliveries = vec![incoming_delivery("delivery_0001", 1, Some(12_000))];
    assert_eq!(audit_snapshot(&snapshot), vec![]);
}

#[test]
fn ready_to_finish_never_regresses_as_time_passes() {
    let mut snapshot = base_snapshot();
    let slot = snapshot.building.as_mut().unwrap().slot.as_mut().unwrap();
    slot.status = 1;
    slot.finish_time = Some(9_500);
    snapshot.samples.push(sample("sample_0002", 1, Some(9_800)));

    let later = snapshot.at(50_000);
    let rules = base_rules();
    let earlier_oracle = SnapshotPermissions::new(&snapshot);
    let later_oracle = SnapshotPermissions::new(&later);
    let earlier_ctx = Context::new(&snapshot, &rules, &earlier_oracle).unwrap();
    let later_ctx = Context::new(&later, &rules, &later_oracle).unwrap();

    assert_eq!(
        audit_progression(&Registry::standard(), &earlier_ctx, &later_ctx),
        vec![]
    );
}

#[test]
fn clock_running_backwards_is_caught() {
    let mut snapshot = base_snapshot();
    let slot = snapshot.building.as_mut().unwrap().slot.as_mut().unwrap();
    slot.status = 1;
    slot.finish_time = Some(9_500);

    let earlier = snapshot.at(9_000);
    let rules = base_rules();
    let later_oracle = SnapshotPermissions::new(&snapshot);
    let earlier_oracle = SnapshotPermissions::new(&earlier);
    let ready_ctx = Context::new(&snapshot, &rules, &later_oracle).unwrap();
    let rewound_ctx = Context::new(&earlier, &rules, &earlier_oracle).unwrap();

    let violations = audit_progression(&Registry::standard(), &ready_ctx, &rewound_ctx);
    assert!(matches!(
        violations.as_slice(),
        [Violation::Regressed {
            kind: ActionKind::Extract,
            from: ActionStatus::ReadyToFinish,
            to: ActionStatus::InProgress,
            ..
        }]
    ));
}
