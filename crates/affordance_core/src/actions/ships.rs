use super::{focus_asteroid, operational, rule_identity};
use crate::context::Context;
use crate::reason::{DisabledReason, Requirement};
use crate::registry::{ActionRule, Registry};
use crate::status::{decode, ActionStatus, ShipStatus};
use crate::{BuildingKind, EntityRef, Permission, ShipState, Subject};

pub(crate) fn register(registry: &mut Registry) {
    registry.register(LaunchShip);
    registry.register(DockShip);
    registry.register(UndockShip);
    registry.register(SetCourse);
    registry.register(EmergencyModeToggle);
    registry.register(EmergencyModeCollect);
}

/// Focused ship, flown by the crew and fit to fly.
fn flyable<'a>(ctx: &Context<'a>) -> Option<&'a ShipState> {
    let ship = ctx.ship()?;
    if !ctx.controls(ship.controller.as_ref()) {
        return None;
    }
    (decode::<ShipStatus>(ship.status, &ship.id)? == ShipStatus::Available).then_some(ship)
}

fn on_surface(ship: &ShipState) -> bool {
    !ship.in_flight() && (ship.location.lot.is_some() || ship.location.building.is_some())
}

/// Propellant the crew can actually burn.
fn usable_propellant(ctx: &Context<'_>, ship: &ShipState) -> f32 {
    ship.propellant_kg * ctx.crew.bonuses.propellant
}

/// Tank level at or below which emergency mode may be used.
fn emergency_threshold(ctx: &Context<'_>, ship: &ShipState) -> f32 {
    ship.propellant_capacity_kg * ctx.rules.constants.emergency_propellant_fraction
}

fn ship_target(ship: &ShipState) -> EntityRef {
    EntityRef::Ship(ship.id.clone())
}

pub struct LaunchShip;

impl ActionRule for LaunchShip {
    rule_identity!(LaunchShip, Launch, [Ready]);

    fn is_visible(&self, ctx: &Context<'_>) -> bool {
        flyable(ctx).is_some_and(on_surface)
    }

    fn subject(&self, ctx: &Context<'_>) -> Option<Subject> {
        let ship = flyable(ctx).filter(|ship| on_surface(ship))?;
        let reason = if ship.emergency_at.is_some() {
            Some(DisabledReason::EmergencyMode)
        } else if usable_propellant(ctx, ship) <= 0.0 {
            Some(DisabledReason::InsufficientPropellant)
        } else {
            None
        };
        Some(
            Subject::new(self.kind(), ship_target(ship), ActionStatus::Ready)
                .requires(Requirement::start().on_asteroid(focus_asteroid(ctx)))
                .reason(reason),
        )
    }
}

pub struct DockShip;

impl DockShip {
    /// Where the ship would set down: a spaceport if one is focused, else the
    /// bare lot.
    fn landing(ctx: &Context<'_>) -> Option<(EntityRef, Permission, Option<DisabledReason>)> {
        if let Some(port) = operational(ctx, &[BuildingKind::Spaceport]) {
            let dock = port.dock?;
            let full = (dock.docked >= dock.capacity).then_some(DisabledReason::DockFull);
            return Some((EntityRef::Building(port.id.clone()), Permission::DockShip, full));
        }
        let lot = ctx.lot()?;
        if ctx.building().is_some() {
            return None;
        }
        let taken = lot.parked_ship.is_some().then_some(DisabledReason::InUse);
        Some((EntityRef::Lot(lot.id.clone()), Permission::UseLot, taken))
    }
}

impl ActionRule for DockShip {
    rule_identity!(DockShip, Dock, [Ready]);

    fn is_visible(&self, ctx: &Context<'_>) -> bool {
        flyable(ctx).is_some_and(ShipState::in_orbit) && Self::landing(ctx).is_some()
    }

    fn subject(&self, ctx: &Context<'_>) -> Option<Subject> {
        let ship = flyable(ctx).filter(|ship| ship.in_orbit())?;
        let (target, permission, occupied) = Self::landing(ctx)?;
        let reason = occupied.or_else(|| {
            ship.emergency_at
                .is_some()
                .then_some(DisabledReason::EmergencyMode)
        });
        let requirement = Requirement::start()
            .permission(permission, target)
            .on_asteroid(focus_asteroid(ctx));
        Some(
            Subject::new(self.kind(), ship_target(ship), ActionStatus::Ready)
                .requires(requirement)
                .reason(reason),
        )
    }
}

pub struct UndockShip;

impl ActionRule for UndockShip {
    rule_identity!(UndockShip, Undock, [Ready]);

    fn is_visible(&self, ctx: &Context<'_>) -> bool {
        flyable(ctx).is_some_and(on_surface)
    }

    fn subject(&self, ctx: &Context<'_>) -> Option<Subject> {
        let ship = flyable(ctx).filter(|ship| on_surface(ship))?;
        // Lifting off a bare lot burns propellant; a spaceport launches for free.
        let reason = (ship.location.building.is_none() && usable_propellant(ctx, ship) <= 0.0)
            .then_some(DisabledReason::InsufficientPropellant);
        Some(
            Subject::new(self.kind(), ship_target(ship), ActionStatus::Ready)
                .requires(Requirement::start().on_asteroid(focus_asteroid(ctx)))
                .reason(reason),
        )
    }
}

pub struct SetCourse;

impl ActionRule for SetCourse {
    rule_identity!(SetCourse, SetCourse, super::TIMED);

    fn is_visible(&self, ctx: &Context<'_>) -> bool {
        flyable(ctx).is_some_and(|ship| ship.in_orbit() || ship.in_flight())
    }

    fn subject(&self, ctx: &Context<'_>) -> Option<Subject> {
        let ship = flyable(ctx)?;
        let target = ship_target(ship);

        if let Some(transit) = &ship.transit {
            let arrival = Some(transit.arrival);
            let progress = ctx.progress(self.kind(), &target, None, arrival);
            return Some(
                Subject::new(self.kind(), target, progress)
                    .label(format!("En route to {}", transit.destination))
                    .finish_time(arrival),
            );
        }
        if !ship.in_orbit() {
            return None;
        }
        let reason = if ship.emergency_at.is_some() {
            Some(DisabledReason::EmergencyMode)
        } else if usable_propellant(ctx, ship) < ctx.rules.constants.min_course_propellant_kg {
            Some(DisabledReason::InsufficientPropellant)
        } else {
            None
        };
        Some(
            Subject::new(self.kind(), target, ActionStatus::Ready)
                .requires(Requirement::start())
                .reason(reason),
        )
    }
}

pub struct EmergencyModeToggle;

impl ActionRule for EmergencyModeToggle {
    rule_identity!(EmergencyModeToggle, Emergency, [Ready]);

    fn is_visible(&self, ctx: &Context<'_>) -> bool {
        flyable(ctx).is_some_and(ShipState::in_orbit)
    }

    fn subject(&self, ctx: &Context<'_>) -> Option<Subject> {
        let ship = flyable(ctx).filter(|ship| ship.in_orbit())?;
        let (label, reason) = match ship.emergency_at {
            Some(_) => ("Deactivate Emergency Mode", None),
            None => {
                let above = ship.propellant_kg > emergency_threshold(ctx, ship);
                (
                    "Activate Emergency Mode",
                    above.then_some(DisabledReason::PropellantAboveThreshold),
                )
            }
        };
        Some(
            Subject::new(self.kind(), ship_target(ship), ActionStatus::Ready)
                .label(label)
                .requires(Requirement::start())
                .reason(reason),
        )
    }
}

pub struct EmergencyModeCollect;

impl ActionRule for EmergencyModeCollect {
    rule_identity!(EmergencyModeCollect, Propellant, [Ready]);

    fn is_visible(&self, ctx: &Context<'_>) -> bool {
        flyable(ctx).is_some_and(|ship| ship.emergency_at.is_some())
    }

    fn subject(&self, ctx: &Context<'_>) -> Option<Subject> {
        let ship = flyable(ctx).filter(|ship| ship.emergency_at.is_some())?;
        // Emergency generation tops out at the activation threshold.
        let full = (ship.propellant_kg >= emergency_threshold(ctx, ship))
            .then_some(DisabledReason::TankFull);
        Some(
            Subject::new(self.kind(), ship_target(ship), ActionStatus::Ready)
                .requires(Requirement::start())
                .reason(full),
        )
    }
}
