use super::{construction_of, focus_asteroid, rule_identity};
use crate::context::Context;
use crate::reason::{DisabledReason, Requirement};
use crate::registry::{ActionRule, Registry};
use crate::status::{decode, ActionStatus, ConstructionStatus, SlotStatus};
use crate::{ActionKind, BuildingState, EntityRef, LotState, Permission, Subject};

pub(crate) fn register(registry: &mut Registry) {
    registry.register(PlanBuilding);
    registry.register(UnplanBuilding);
    registry.register(Construct);
    registry.register(Deconstruct);
}

/// Focused building controlled by the crew, with its decoded construction
/// stage.
fn controlled_site<'a>(ctx: &Context<'a>) -> Option<(&'a BuildingState, ConstructionStatus)> {
    let building = ctx.building()?;
    if !ctx.controls(building.controller.as_ref()) {
        return None;
    }
    Some((building, construction_of(building)?))
}

/// Building-on-site requirement: crew physically on the lot's asteroid and
/// on the surface.
fn on_site(ctx: &Context<'_>) -> Requirement {
    Requirement::start()
        .on_asteroid(focus_asteroid(ctx))
        .on_surface()
}

/// Another kind's transaction on the site has not been confirmed yet.
fn site_reason(ctx: &Context<'_>, kind: ActionKind, target: &EntityRef) -> Option<DisabledReason> {
    ctx.updating(kind, target).then_some(DisabledReason::Updating)
}

pub struct PlanBuilding;

impl PlanBuilding {
    /// An empty lot, or one whose site record was cleared back to unplanned.
    fn open_lot<'a>(ctx: &Context<'a>) -> Option<&'a LotState> {
        let lot = ctx.lot()?;
        match ctx.building() {
            None => Some(lot),
            Some(building) => {
                (construction_of(building)? == ConstructionStatus::Unplanned).then_some(lot)
            }
        }
    }
}

impl ActionRule for PlanBuilding {
    rule_identity!(PlanBuilding, Plan, [Ready]);

    fn is_visible(&self, ctx: &Context<'_>) -> bool {
        Self::open_lot(ctx).is_some()
    }

    fn subject(&self, ctx: &Context<'_>) -> Option<Subject> {
        let lot = Self::open_lot(ctx)?;
        let target = EntityRef::Lot(lot.id.clone());
        let occupied = lot.parked_ship.is_some().then_some(DisabledReason::InUse);
        let requirement = on_site(ctx)
            .permission(Permission::UseLot, target.clone())
            .sequenceable();
        Some(
            Subject::new(self.kind(), target, ActionStatus::Ready)
                .requires(requirement)
                .reason(occupied),
        )
    }
}

pub struct UnplanBuilding;

impl ActionRule for UnplanBuilding {
    rule_identity!(UnplanBuilding, Unplan, [Ready]);

    fn is_visible(&self, ctx: &Context<'_>) -> bool {
        controlled_site(ctx).is_some_and(|(_, status)| status == ConstructionStatus::Planned)
    }

    fn subject(&self, ctx: &Context<'_>) -> Option<Subject> {
        let (building, status) = controlled_site(ctx)?;
        if status != ConstructionStatus::Planned {
            return None;
        }
        let target = EntityRef::Building(building.id.clone());
        let stocked = building
            .inventory
            .as_ref()
            .is_some_and(|inventory| !inventory.is_empty())
            .then_some(DisabledReason::NotEmpty);
        let reason = stocked.or_else(|| site_reason(ctx, self.kind(), &target));
        Some(
            Subject::new(self.kind(), target, ActionStatus::Ready)
                .label(format!("Unplan {}", building.kind.name()))
                .requires(on_site(ctx))
                .reason(reason),
        )
    }
}

pub struct Construct;

impl ActionRule for Construct {
    rule_identity!(
        Construct,
        Construct,
        [Planned, InProgress, ReadyToFinish, Finishing, Canceling]
    );

    fn is_visible(&self, ctx: &Context<'_>) -> bool {
        controlled_site(ctx).is_some_and(|(_, status)| {
            matches!(
                status,
                ConstructionStatus::Planned | ConstructionStatus::UnderConstruction
            )
        })
    }

    fn subject(&self, ctx: &Context<'_>) -> Option<Subject> {
        let (building, status) = controlled_site(ctx)?;
        let target = EntityRef::Building(building.id.clone());
        let label = format!("Construct {}", building.kind.name());

        match status {
            ConstructionStatus::Planned => {
                let awaiting = (!building.construction.materials_ready)
                    .then_some(DisabledReason::AwaitingMaterials);
                let reason = awaiting.or_else(|| site_reason(ctx, self.kind(), &target));
                Some(
                    Subject::new(self.kind(), target, ActionStatus::Planned)
                        .label(label)
                        .requires(on_site(ctx).sequenceable())
                        .reason(reason),
                )
            }
            ConstructionStatus::UnderConstruction => {
                let finish_time = building.construction.finish_time;
                let progress = ctx.progress(self.kind(), &target, None, finish_time);
                Some(
                    Subject::new(self.kind(), target, progress)
                        .label(label)
                        .finish_time(finish_time),
                )
            }
            ConstructionStatus::Unplanned | ConstructionStatus::Operational => None,
        }
    }
}

pub struct Deconstruct;

impl Deconstruct {
    /// Operational site whose job slot, if any, decodes. Yields whether the
    /// slot is running.
    fn teardown_site<'a>(ctx: &Context<'a>) -> Option<(&'a BuildingState, bool)> {
        let (building, status) = controlled_site(ctx)?;
        if status != ConstructionStatus::Operational {
            return None;
        }
        let slot_running = match &building.slot {
            Some(slot) => decode::<SlotStatus>(slot.status, &building.id)? == SlotStatus::Running,
            None => false,
        };
        Some((building, slot_running))
    }

    /// Anything still running or stored in the building blocks teardown.
    fn occupied(building: &BuildingState, slot_running: bool) -> Option<DisabledReason> {
        if building
            .inventory
            .as_ref()
            .is_some_and(|inventory| !inventory.is_empty())
        {
            return Some(DisabledReason::NotEmpty);
        }
        let docked = building.dock.is_some_and(|dock| dock.docked > 0);
        let stationed = building.station.is_some_and(|station| station.population > 0);
        (slot_running || docked || stationed).then_some(DisabledReason::InUse)
    }
}

impl ActionRule for Deconstruct {
    rule_identity!(Deconstruct, Deconstruct, [Ready]);

    fn is_visible(&self, ctx: &Context<'_>) -> bool {
        Self::teardown_site(ctx).is_some()
    }

    fn subject(&self, ctx: &Context<'_>) -> Option<Subject> {
        let (building, slot_running) = Self::teardown_site(ctx)?;
        let target = EntityRef::Building(building.id.clone());
        let reason = Self::occupied(building, slot_running)
            .or_else(|| site_reason(ctx, self.kind(), &target));
        Some(
            Subject::new(self.kind(), target, ActionStatus::Ready)
                .label(format!("Deconstruct {}", building.kind.name()))
                .requires(on_site(ctx).sequenceable())
                .reason(reason),
        )
    }
}
