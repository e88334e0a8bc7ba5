//! Disablement resolver.
//!
//! Kind-specific reasons are checked first; the generic chain below is always
//! the fallback:
//!
//! 1. upstream loading (global flag or a pending transaction on this instance)
//! 2. game not yet launched
//! 3. permission not held on the named target
//! 4. crew not on the required asteroid
//! 5. crew not on the surface
//! 6. unresolved crew event from another action
//! 7. readiness: "fully scheduled" for sequenceable actions, "busy" otherwise
//! 8. simulation allow-list
//!
//! The first reason that applies wins and later checks are not evaluated.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::context::Context;
use crate::{ActionKind, AsteroidId, EntityRef, Permission, Subject};

/// Closed vocabulary of reasons an otherwise visible action cannot be invoked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DisabledReason {
    Loading,
    NotYetLaunched,
    AccessRestricted,
    CrewAway,
    CrewInOrbit,
    EventPending,
    FullyScheduled,
    CrewBusy,
    SimulationRestricted,
    InUse,
    Updating,
    NotEmpty,
    InventoryEmpty,
    DockFull,
    StationFull,
    CrewFull,
    Starving,
    AwaitingMaterials,
    NoCoreSample,
    InsufficientPropellant,
    EmergencyMode,
    PropellantAboveThreshold,
    TankFull,
}

impl DisabledReason {
    pub fn text(self) -> &'static str {
        match self {
            DisabledReason::Loading => "loading…",
            DisabledReason::NotYetLaunched => "not yet launched",
            DisabledReason::AccessRestricted => "access restricted",
            DisabledReason::CrewAway => "crew is away",
            DisabledReason::CrewInOrbit => "crew is in orbit",
            DisabledReason::EventPending => "crew event pending",
            DisabledReason::FullyScheduled => "crew is fully scheduled",
            DisabledReason::CrewBusy => "crew is busy",
            DisabledReason::SimulationRestricted => "simulation restricted",
            DisabledReason::InUse => "in use",
            DisabledReason::Updating => "updating…",
            DisabledReason::NotEmpty => "not empty",
            DisabledReason::InventoryEmpty => "inventory empty",
            DisabledReason::DockFull => "dock is full",
            DisabledReason::StationFull => "station is full",
            DisabledReason::CrewFull => "crew is full",
            DisabledReason::Starving => "crew is starving",
            DisabledReason::AwaitingMaterials => "awaiting materials",
            DisabledReason::NoCoreSample => "no core sample",
            DisabledReason::InsufficientPropellant => "insufficient propellant",
            DisabledReason::EmergencyMode => "emergency mode",
            DisabledReason::PropellantAboveThreshold => "propellant above threshold",
            DisabledReason::TankFull => "tank full",
        }
    }
}

impl fmt::Display for DisabledReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.text())
    }
}

/// What the generic chain checks for one action instance.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Requirement {
    pub permission: Option<(Permission, EntityRef)>,
    /// Crew must currently be on this asteroid.
    pub asteroid: Option<AsteroidId>,
    /// Crew must be on a lot rather than in orbit.
    pub surface: bool,
    pub ready: bool,
    /// A busy crew may queue the action behind its current schedule.
    pub sequenceable: bool,
}

impl Requirement {
    /// No presence, permission or readiness constraints.
    pub fn none() -> Self {
        Self::default()
    }

    /// Starting a new action occupies the crew.
    pub fn start() -> Self {
        Self {
            ready: true,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn permission(mut self, permission: Permission, target: EntityRef) -> Self {
        self.permission = Some((permission, target));
        self
    }

    #[must_use]
    pub fn on_asteroid(mut self, asteroid: Option<&AsteroidId>) -> Self {
        self.asteroid = asteroid.cloned();
        self
    }

    #[must_use]
    pub fn on_surface(mut self) -> Self {
        self.surface = true;
        self
    }

    #[must_use]
    pub fn sequenceable(mut self) -> Self {
        self.sequenceable = true;
        self
    }
}

/// Resolve the single surfaced reason for `subject`, or `None` if it can be
/// invoked.
pub fn resolve_disabled_reason(ctx: &Context<'_>, subject: &Subject) -> Option<DisabledReason> {
    subject
        .domain_reason
        .or_else(|| generic_reason(ctx, subject))
}

fn generic_reason(ctx: &Context<'_>, subject: &Subject) -> Option<DisabledReason> {
    let requirement = &subject.requirement;
    let crew = ctx.crew;

    if ctx.snapshot.loading
        || ctx
            .pending(subject.kind, &subject.target, subject.instance.as_deref())
            .is_some()
    {
        return Some(DisabledReason::Loading);
    }
    if !ctx.snapshot.launched {
        return Some(DisabledReason::NotYetLaunched);
    }
    if let Some((permission, target)) = &requirement.permission {
        if !ctx.permitted(*permission, target) {
            return Some(DisabledReason::AccessRestricted);
        }
    }
    if let Some(asteroid) = &requirement.asteroid {
        if crew.location.asteroid.as_ref() != Some(asteroid) {
            return Some(DisabledReason::CrewAway);
        }
    }
    if requirement.surface && crew.location.lot.is_none() {
        return Some(DisabledReason::CrewInOrbit);
    }
    if requirement.ready && event_conflicts(ctx, subject.kind) {
        return Some(DisabledReason::EventPending);
    }
    if requirement.ready && !ctx.crew_ready() {
        if !requirement.sequenceable {
            return Some(DisabledReason::CrewBusy);
        }
        if !ctx.crew_can_sequence() {
            return Some(DisabledReason::FullyScheduled);
        }
    }
    if ctx.simulation_active() && !ctx.rules.simulation.allows(subject.kind) {
        return Some(DisabledReason::SimulationRestricted);
    }
    None
}

/// An unresolved event blocks every action except the one that raised it.
fn event_conflicts(ctx: &Context<'_>, kind: ActionKind) -> bool {
    ctx.crew
        .pending_event
        .as_ref()
        .is_some_and(|event| !event.resolved && event.triggered_by != kind)
}
