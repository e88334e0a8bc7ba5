use super::{focus_asteroid, operational, rule_identity};
use crate::context::Context;
use crate::reason::{DisabledReason, Requirement};
use crate::registry::{ActionRule, Registry};
use crate::status::{decode, ActionStatus, SlotStatus};
use crate::{ActionKind, BuildingKind, BuildingState, EntityRef, Permission, Subject};

pub(crate) fn register(registry: &mut Registry) {
    registry.register(Process);
    registry.register(AssembleShip);
}

/// Focused building of `kinds` with a single job slot, and the slot's
/// decoded state.
pub(crate) fn slot_building<'a>(
    ctx: &Context<'a>,
    kinds: &[BuildingKind],
) -> Option<(&'a BuildingState, SlotStatus)> {
    let building = operational(ctx, kinds)?;
    let slot = building.slot.as_ref()?;
    Some((building, decode(slot.status, &building.id)?))
}

/// Subject for a building's job slot: idle slots can start a job, running
/// slots count down to `finish_time` and show what they produce.
///
/// `idle_reason` is only consulted for an idle slot.
pub(crate) fn slot_subject(
    ctx: &Context<'_>,
    kind: ActionKind,
    building: &BuildingState,
    slot_status: SlotStatus,
    permission: Permission,
    idle_reason: Option<DisabledReason>,
) -> Option<Subject> {
    let slot = building.slot.as_ref()?;
    let target = EntityRef::Building(building.id.clone());

    match slot_status {
        SlotStatus::Idle => {
            let requirement = Requirement::start()
                .permission(permission, target.clone())
                .on_asteroid(focus_asteroid(ctx))
                .on_surface()
                .sequenceable();
            Some(
                Subject::new(kind, target, ActionStatus::Ready)
                    .requires(requirement)
                    .reason(idle_reason),
            )
        }
        SlotStatus::Running => {
            let progress = ctx.progress(kind, &target, None, slot.finish_time);
            let requirement = Requirement::none().permission(permission, target.clone());
            Some(
                Subject::new(kind, target, progress)
                    .addendum(slot.output.clone())
                    .finish_time(slot.finish_time)
                    .requires(requirement),
            )
        }
    }
}

/// Inputs come from the building's own inventory.
fn inputs_reason(building: &BuildingState) -> Option<DisabledReason> {
    match &building.inventory {
        Some(inventory) if inventory.locked => Some(DisabledReason::InUse),
        Some(inventory) if !inventory.is_empty() => None,
        _ => Some(DisabledReason::InventoryEmpty),
    }
}

pub struct Process;

const PROCESSORS: &[BuildingKind] = &[
    BuildingKind::Refinery,
    BuildingKind::Bioreactor,
    BuildingKind::Factory,
];

impl ActionRule for Process {
    rule_identity!(Process, Process, super::TIMED);

    fn is_visible(&self, ctx: &Context<'_>) -> bool {
        slot_building(ctx, PROCESSORS).is_some()
    }

    fn subject(&self, ctx: &Context<'_>) -> Option<Subject> {
        let (building, status) = slot_building(ctx, PROCESSORS)?;
        let subject = slot_subject(
            ctx,
            self.kind(),
            building,
            status,
            Permission::RunProcess,
            inputs_reason(building),
        )?;
        Some(subject.label(format!("Process at {}", building.kind.name())))
    }
}

pub struct AssembleShip;

impl ActionRule for AssembleShip {
    rule_identity!(AssembleShip, Shipyard, super::TIMED);

    fn is_visible(&self, ctx: &Context<'_>) -> bool {
        slot_building(ctx, &[BuildingKind::Shipyard]).is_some()
    }

    fn subject(&self, ctx: &Context<'_>) -> Option<Subject> {
        let (building, status) = slot_building(ctx, &[BuildingKind::Shipyard])?;
        slot_subject(
            ctx,
            self.kind(),
            building,
            status,
            Permission::AssembleShip,
            inputs_reason(building),
        )
    }
}
