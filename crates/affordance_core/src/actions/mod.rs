//! Built-in action rules, one module per action family.

use crate::context::Context;
use crate::registry::Registry;
use crate::status::{decode, ActionStatus, ConstructionStatus};
use crate::{
    AsteroidId, BuildingKind, BuildingState, CrewId, EntityRef, InventoryState, StationState,
};

/// Expands to the identity methods of an [`ActionRule`](crate::ActionRule)
/// impl: kind, icon and reachable status set.
macro_rules! rule_identity {
    ($kind:ident, $icon:ident, [$($state:ident),+ $(,)?]) => {
        fn kind(&self) -> crate::ActionKind {
            crate::ActionKind::$kind
        }

        fn icon(&self) -> crate::Icon {
            crate::Icon::$icon
        }

        fn states(&self) -> &'static [crate::ActionStatus] {
            &[$(crate::ActionStatus::$state),+]
        }
    };
    ($kind:ident, $icon:ident, $states:expr) => {
        fn kind(&self) -> crate::ActionKind {
            crate::ActionKind::$kind
        }

        fn icon(&self) -> crate::Icon {
            crate::Icon::$icon
        }

        fn states(&self) -> &'static [crate::ActionStatus] {
            $states
        }
    };
}
pub(crate) use rule_identity;

mod agreements;
mod construction;
mod crew;
mod extraction;
mod market;
mod processing;
mod sampling;
mod scanning;
mod ships;
mod transfer;

/// Register every family in display order.
pub(crate) fn register_all(registry: &mut Registry) {
    scanning::register(registry);
    construction::register(registry);
    sampling::register(registry);
    extraction::register(registry);
    processing::register(registry);
    transfer::register(registry);
    ships::register(registry);
    crew::register(registry);
    market::register(registry);
    agreements::register(registry);
}

// ---------------------------------------------------------------------------
// Shared lookups
// ---------------------------------------------------------------------------

/// Asteroid the focused entities sit on.
pub(crate) fn focus_asteroid<'a>(ctx: &Context<'a>) -> Option<&'a AsteroidId> {
    ctx.lot()
        .map(|lot| &lot.asteroid)
        .or_else(|| ctx.asteroid().map(|asteroid| &asteroid.id))
}

pub(crate) fn construction_of(building: &BuildingState) -> Option<ConstructionStatus> {
    decode(building.construction.status, &building.id)
}

/// The focused building, if it is operational and one of `kinds`.
pub(crate) fn operational<'a>(
    ctx: &Context<'a>,
    kinds: &[BuildingKind],
) -> Option<&'a BuildingState> {
    let building = ctx.building()?;
    if !kinds.contains(&building.kind) {
        return None;
    }
    (construction_of(building)? == ConstructionStatus::Operational).then_some(building)
}

/// Entity whose inventory products move in and out of: the focused building,
/// else the focused ship.
pub(crate) fn inventory_holder<'a>(ctx: &Context<'a>) -> Option<(EntityRef, &'a InventoryState)> {
    if let Some(building) = ctx.building() {
        if let Some(inventory) = &building.inventory {
            return Some((EntityRef::Building(building.id.clone()), inventory));
        }
    }
    let ship = ctx.ship()?;
    let inventory = ship.inventory.as_ref()?;
    Some((EntityRef::Ship(ship.id.clone()), inventory))
}

/// A building or ship that crews can be stationed on.
pub(crate) struct Station<'a> {
    pub target: EntityRef,
    pub state: &'a StationState,
    pub controller: Option<&'a CrewId>,
    /// Asteroid the station sits on; `None` for a ship off the surface.
    pub asteroid: Option<&'a AsteroidId>,
}

/// The focused operational building with quarters, else the focused ship.
pub(crate) fn station_target<'a>(ctx: &Context<'a>) -> Option<Station<'a>> {
    if let Some(building) = ctx.building() {
        if let Some(state) = &building.station {
            if construction_of(building)? != ConstructionStatus::Operational {
                return None;
            }
            return Some(Station {
                target: EntityRef::Building(building.id.clone()),
                state,
                controller: building.controller.as_ref(),
                asteroid: focus_asteroid(ctx),
            });
        }
    }
    let ship = ctx.ship()?;
    let state = ship.station.as_ref()?;
    let landed = ship.location.lot.is_some() || ship.location.building.is_some();
    Some(Station {
        target: EntityRef::Ship(ship.id.clone()),
        state,
        controller: ship.controller.as_ref(),
        asteroid: if landed { focus_asteroid(ctx) } else { None },
    })
}

/// The evaluating crew is stationed on `target`.
pub(crate) fn stationed_on(ctx: &Context<'_>, target: &EntityRef) -> bool {
    let location = &ctx.crew.location;
    match target {
        EntityRef::Building(id) => location.building.as_ref() == Some(id),
        EntityRef::Ship(id) => location.ship.as_ref() == Some(id),
        _ => false,
    }
}

/// Statuses of a timed action that finishes through a separate transaction.
pub(crate) const TIMED: &[ActionStatus] = &[
    ActionStatus::Ready,
    ActionStatus::InProgress,
    ActionStatus::ReadyToFinish,
    ActionStatus::Finishing,
    ActionStatus::Canceling,
];
