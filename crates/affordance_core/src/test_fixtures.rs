//! Shared test fixtures for affordance_core and downstream crates.
//!
//! `base_snapshot()` is a crew standing on its own lot, next to its own
//! operational extractor with an idle slot and one finished core sample.
//! Every fixture entity references every other consistently.

use ahash::AHashSet;

use crate::{
    ActionKind, Affordance, AsteroidId, AsteroidState, BuildingId, BuildingKind, BuildingState,
    ConstructionInfo, Constants, Context, CrewBonuses, CrewId, CrewLocation, CrewState,
    DeliveryId, DeliveryState, Descriptor, EntityRef, InventoryState, LotId, LotState,
    PendingAction, ProcessSlot, Registry, RuleSet, SampleId, SampleState, ScanInfo, ShipId,
    ShipLocation, ShipState, SimulationRules, Snapshot, SnapshotPermissions, Stage,
};

pub fn crew_id() -> CrewId {
    CrewId("crew_0001".to_string())
}

pub fn other_crew_id() -> CrewId {
    CrewId("crew_0002".to_string())
}

pub fn asteroid_id() -> AsteroidId {
    AsteroidId("asteroid_0001".to_string())
}

pub fn lot_id() -> LotId {
    LotId("lot_0001".to_string())
}

pub fn building_id() -> BuildingId {
    BuildingId("building_0001".to_string())
}

pub fn ship_id() -> ShipId {
    ShipId("ship_0001".to_string())
}

/// Compressed constants: a one-hour scheduling buffer and a five-seat roster.
pub fn base_rules() -> RuleSet {
    RuleSet {
        content_version: "test".to_string(),
        constants: Constants {
            crew_schedule_buffer_secs: 3_600,
            max_crew_roster: 5,
            min_course_propellant_kg: 100.0,
            emergency_propellant_fraction: 0.1,
        },
        simulation: SimulationRules {
            allowed: AHashSet::from_iter([
                ActionKind::ScanSurface,
                ActionKind::ScanResources,
                ActionKind::NewCoreSample,
                ActionKind::Extract,
            ]),
        },
    }
}

pub fn base_crew() -> CrewState {
    CrewState {
        id: crew_id(),
        location: CrewLocation {
            asteroid: Some(asteroid_id()),
            lot: Some(lot_id()),
            building: None,
            ship: None,
        },
        ready_at: 9_000,
        roster_size: 3,
        grants: vec![],
        bonuses: CrewBonuses::default(),
        simulation: false,
        pending_event: None,
    }
}

pub fn base_snapshot() -> Snapshot {
    Snapshot {
        now: 10_000,
        loading: false,
        launched: true,
        crew: Some(base_crew()),
        asteroid: Some(AsteroidState {
            id: asteroid_id(),
            controller: Some(crew_id()),
            scan: ScanInfo {
                status: 4,
                finish_time: None,
            },
            policies: vec![],
        }),
        lot: Some(LotState {
            id: lot_id(),
            asteroid: asteroid_id(),
            controller: Some(crew_id()),
            policies: vec![],
            parked_ship: None,
        }),
        building: Some(extractor()),
        ship: None,
        deliveries: vec![],
        samples: vec![sample("sample_0001", 2, None)],
        pending: vec![],
    }
}

/// Operational extractor on the base lot with an idle slot and an empty bin.
pub fn extractor() -> BuildingState {
    BuildingState {
        id: building_id(),
        lot: lot_id(),
        kind: BuildingKind::Extractor,
        controller: Some(crew_id()),
        construction: ConstructionInfo {
            status: 3,
            finish_time: None,
            materials_ready: true,
        },
        inventory: Some(InventoryState {
            mass_kg: 0.0,
            capacity_kg: 1_000.0,
            locked: false,
        }),
        slot: Some(ProcessSlot {
            status: 0,
            finish_time: None,
            output: None,
        }),
        dock: None,
        station: None,
        policies: vec![],
    }
}

/// The crew's own sample on the base lot.
pub fn sample(id: &str, status: u8, finish_time: Option<u64>) -> SampleState {
    SampleState {
        id: SampleId(id.to_string()),
        lot: lot_id(),
        owner: crew_id(),
        resource: "Water".to_string(),
        status,
        finish_time,
        remaining_yield: 100.0,
        improved: false,
    }
}

/// A crew-controlled, available ship in orbit over the base asteroid.
pub fn ship_in_orbit() -> ShipState {
    ShipState {
        id: ship_id(),
        controller: Some(crew_id()),
        status: 1,
        location: ShipLocation::default(),
        transit: None,
        propellant_kg: 500.0,
        propellant_capacity_kg: 2_000.0,
        emergency_at: None,
        inventory: None,
        station: None,
        policies: vec![],
    }
}

/// A delivery from somewhere else into the base extractor.
pub fn incoming_delivery(id: &str, status: u8, finish_time: Option<u64>) -> DeliveryState {
    DeliveryState {
        id: DeliveryId(id.to_string()),
        status,
        origin: EntityRef::Building(BuildingId("building_0009".to_string())),
        dest: EntityRef::Building(building_id()),
        finish_time,
    }
}

pub fn pending(
    kind: ActionKind,
    stage: Stage,
    target: EntityRef,
    instance: Option<&str>,
) -> PendingAction {
    PendingAction {
        kind,
        stage,
        target,
        instance: instance.map(str::to_string),
    }
}

/// Evaluate one action kind of the standard registry against `snapshot`,
/// using the snapshot's own permissions.
///
/// # Panics
/// If the snapshot is not internally consistent or `kind` is unregistered.
pub fn describe_kind(snapshot: &Snapshot, rules: &RuleSet, kind: ActionKind) -> Vec<Affordance> {
    let oracle = SnapshotPermissions::new(snapshot);
    let ctx = Context::new(snapshot, rules, &oracle).expect("fixture snapshot should be valid");
    let registry = Registry::standard();
    let rule = registry.get(kind).expect("kind should be registered");
    rule.describe(&ctx)
}

/// The primary control of `kind`, if it is offered.
pub fn primary(snapshot: &Snapshot, rules: &RuleSet, kind: ActionKind) -> Option<Descriptor> {
    describe_kind(snapshot, rules, kind)
        .into_iter()
        .find_map(|affordance| match affordance {
            Affordance::Action(descriptor) if descriptor.on_click.instance.is_none() => {
                Some(descriptor)
            }
            _ => None,
        })
}
