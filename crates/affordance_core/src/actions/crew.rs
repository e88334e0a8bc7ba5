use super::{focus_asteroid, operational, rule_identity, station_target, stationed_on, Station};
use crate::context::Context;
use crate::reason::{DisabledReason, Requirement};
use crate::registry::{ActionRule, Registry};
use crate::status::ActionStatus;
use crate::{BuildingKind, EntityRef, Permission, Subject};

pub(crate) fn register(registry: &mut Registry) {
    registry.register(StationCrew);
    registry.register(EjectCrew);
    registry.register(EjectGuestCrew);
    registry.register(RecruitCrewmate);
}

fn starving(ctx: &Context<'_>) -> Option<DisabledReason> {
    (ctx.crew.bonuses.food <= 0.0).then_some(DisabledReason::Starving)
}

pub struct StationCrew;

impl StationCrew {
    /// A station the crew is not already on.
    fn destination<'a>(ctx: &Context<'a>) -> Option<Station<'a>> {
        station_target(ctx).filter(|station| !stationed_on(ctx, &station.target))
    }
}

impl ActionRule for StationCrew {
    rule_identity!(StationCrew, Station, [Ready]);

    fn is_visible(&self, ctx: &Context<'_>) -> bool {
        Self::destination(ctx).is_some()
    }

    fn subject(&self, ctx: &Context<'_>) -> Option<Subject> {
        let station = Self::destination(ctx)?;
        let arriving = u32::from(ctx.crew.roster_size);
        let full = station
            .state
            .population
            .checked_add(arriving)
            .is_none_or(|total| total > station.state.capacity)
            .then_some(DisabledReason::StationFull);
        let requirement = Requirement::start()
            .permission(Permission::StationCrew, station.target.clone())
            .on_asteroid(station.asteroid);
        Some(
            Subject::new(self.kind(), station.target, ActionStatus::Ready)
                .requires(requirement)
                .reason(full),
        )
    }
}

pub struct EjectCrew;

impl EjectCrew {
    fn current<'a>(ctx: &Context<'a>) -> Option<Station<'a>> {
        station_target(ctx).filter(|station| stationed_on(ctx, &station.target))
    }
}

impl ActionRule for EjectCrew {
    rule_identity!(EjectCrew, Eject, [Ready]);

    fn is_visible(&self, ctx: &Context<'_>) -> bool {
        Self::current(ctx).is_some()
    }

    fn subject(&self, ctx: &Context<'_>) -> Option<Subject> {
        Self::current(ctx)?;
        Some(
            Subject::new(
                self.kind(),
                EntityRef::Crew(ctx.crew.id.clone()),
                ActionStatus::Ready,
            )
            .requires(Requirement::start()),
        )
    }
}

pub struct EjectGuestCrew;

impl EjectGuestCrew {
    /// A station the crew controls that is hosting other crews.
    fn hosting<'a>(ctx: &Context<'a>) -> Option<Station<'a>> {
        station_target(ctx)
            .filter(|station| ctx.controls(station.controller) && station.state.guests > 0)
    }
}

impl ActionRule for EjectGuestCrew {
    rule_identity!(EjectGuestCrew, Eject, [Ready]);

    fn is_visible(&self, ctx: &Context<'_>) -> bool {
        Self::hosting(ctx).is_some()
    }

    fn subject(&self, ctx: &Context<'_>) -> Option<Subject> {
        let station = Self::hosting(ctx)?;
        let guests = station.state.guests;
        Some(
            Subject::new(self.kind(), station.target, ActionStatus::Ready)
                .badge(guests)
                .requires(Requirement::start()),
        )
    }
}

pub struct RecruitCrewmate;

impl ActionRule for RecruitCrewmate {
    rule_identity!(RecruitCrewmate, Recruit, [Ready]);

    fn is_visible(&self, ctx: &Context<'_>) -> bool {
        operational(ctx, &[BuildingKind::Habitat]).is_some()
    }

    fn subject(&self, ctx: &Context<'_>) -> Option<Subject> {
        let habitat = operational(ctx, &[BuildingKind::Habitat])?;
        let target = EntityRef::Building(habitat.id.clone());
        let full = (ctx.crew.roster_size >= ctx.rules.constants.max_crew_roster)
            .then_some(DisabledReason::CrewFull);
        let requirement = Requirement::start()
            .permission(Permission::StationCrew, target.clone())
            .on_asteroid(focus_asteroid(ctx))
            .on_surface();
        Some(
            Subject::new(self.kind(), target, ActionStatus::Ready)
                .requires(requirement)
                .reason(full.or_else(|| starving(ctx))),
        )
    }
}
