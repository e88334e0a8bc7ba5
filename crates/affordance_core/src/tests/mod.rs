use super::*;
use crate::test_fixtures::{base_rules, base_snapshot, describe_kind, primary};

mod invariants;
mod resolver;

// --- Shared test helpers ------------------------------------------------

/// Resolve `subject` against `snapshot` with the base rules and the
/// snapshot's own permissions.
fn reason_for(snapshot: &Snapshot, subject: &Subject) -> Option<DisabledReason> {
    let rules = base_rules();
    let oracle = SnapshotPermissions::new(snapshot);
    let ctx = Context::new(snapshot, &rules, &oracle).unwrap();
    resolve_disabled_reason(&ctx, subject)
}

fn scheduled_for(snapshot: &Snapshot, subject: &Subject) -> Option<u64> {
    let rules = base_rules();
    let oracle = SnapshotPermissions::new(snapshot);
    let ctx = Context::new(snapshot, &rules, &oracle).unwrap();
    let reason = resolve_disabled_reason(&ctx, subject);
    deferred_start(&ctx, subject, reason)
}

/// A generic crew action aimed at the base lot.
fn lot_action(kind: ActionKind) -> Subject {
    Subject::new(
        kind,
        EntityRef::Lot(test_fixtures::lot_id()),
        ActionStatus::Ready,
    )
}

fn descriptor(snapshot: &Snapshot, kind: ActionKind) -> Descriptor {
    primary(snapshot, &base_rules(), kind)
        .unwrap_or_else(|| panic!("{kind} should have a primary control"))
}

fn visible(snapshot: &Snapshot, kind: ActionKind) -> bool {
    !describe_kind(snapshot, &base_rules(), kind).is_empty()
}

fn busy_snapshot(now: u64, ready_at: u64) -> Snapshot {
    let mut snapshot = base_snapshot().at(now);
    snapshot.crew.as_mut().unwrap().ready_at = ready_at;
    snapshot
}
