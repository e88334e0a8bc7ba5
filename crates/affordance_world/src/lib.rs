//! Rule content and snapshot loading, plus seeded random snapshots shared
//! between affordance_cli and the property tests.

use affordance_core::{
    ActionKind, AsteroidId, AsteroidState, BuildingId, BuildingKind, BuildingState,
    ConstructionInfo, Constants, CrewBonuses, CrewEvent, CrewId, CrewLocation, CrewState,
    DeliveryId, DeliveryState, DockState, EntityRef, InventoryState, LotId, LotState,
    PendingAction, Permission, PermissionGrant, Policy, PolicyKind, ProcessSlot, RuleSet,
    SampleId, SampleState, ScanInfo, ShipId, ShipLocation, ShipState, SimulationRules, Snapshot,
    Stage, StationState, Transit,
};
use anyhow::{Context, Result};
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::Deserialize;
use std::path::Path;

#[derive(Deserialize)]
struct SimulationFile {
    content_version: String,
    allowed: Vec<ActionKind>,
}

/// Validates loaded rule content, panicking on any authoring error.
///
/// Catches mistakes like a zero scheduling buffer (every sequenced action
/// would read "fully scheduled"), an empty simulation allow-list, or an
/// emergency fraction that can never be reached.
pub fn validate_rules(rules: &RuleSet) {
    let c = &rules.constants;
    assert!(
        !rules.content_version.is_empty(),
        "rule content has an empty content_version"
    );
    assert!(
        c.crew_schedule_buffer_secs > 0,
        "crew_schedule_buffer_secs must be positive"
    );
    assert!(c.max_crew_roster > 0, "max_crew_roster must be positive");
    assert!(
        c.min_course_propellant_kg >= 0.0,
        "min_course_propellant_kg must not be negative: {}",
        c.min_course_propellant_kg,
    );
    assert!(
        c.emergency_propellant_fraction > 0.0 && c.emergency_propellant_fraction <= 1.0,
        "emergency_propellant_fraction must be in (0, 1]: {}",
        c.emergency_propellant_fraction,
    );
    assert!(
        !rules.simulation.allowed.is_empty(),
        "simulation allow-list is empty"
    );
}

pub fn load_rules(content_dir: &str) -> Result<RuleSet> {
    let dir = Path::new(content_dir);
    let constants: Constants = serde_json::from_str(
        &std::fs::read_to_string(dir.join("constants.json")).context("reading constants.json")?,
    )
    .context("parsing constants.json")?;
    let simulation: SimulationFile = serde_json::from_str(
        &std::fs::read_to_string(dir.join("simulation.json"))
            .context("reading simulation.json")?,
    )
    .context("parsing simulation.json")?;
    let rules = RuleSet {
        content_version: simulation.content_version,
        constants,
        simulation: SimulationRules {
            allowed: simulation.allowed.into_iter().collect(),
        },
    };
    validate_rules(&rules);
    Ok(rules)
}

pub fn load_snapshot(path: &Path) -> Result<Snapshot> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("reading snapshot {}", path.display()))?;
    serde_json::from_str(&json).with_context(|| format!("parsing snapshot {}", path.display()))
}

// ---------------------------------------------------------------------------
// Random snapshots
// ---------------------------------------------------------------------------

const CREW: &str = "crew_0001";
const RIVAL: &str = "crew_0002";
const ASTEROID: &str = "asteroid_0001";
const LOT: &str = "lot_0001";
const BUILDING: &str = "building_0001";
const NEIGHBOUR: &str = "building_0009";
const SHIP: &str = "ship_0001";

const BUILDING_KINDS: &[BuildingKind] = &[
    BuildingKind::Warehouse,
    BuildingKind::Extractor,
    BuildingKind::Refinery,
    BuildingKind::Bioreactor,
    BuildingKind::Factory,
    BuildingKind::Shipyard,
    BuildingKind::Spaceport,
    BuildingKind::Marketplace,
    BuildingKind::Habitat,
    BuildingKind::TankFarm,
];

const PERMISSIONS: &[Permission] = &[
    Permission::UseLot,
    Permission::RunProcess,
    Permission::ExtractResources,
    Permission::AssembleShip,
    Permission::DockShip,
    Permission::StationCrew,
    Permission::AddProducts,
    Permission::RemoveProducts,
    Permission::Buy,
    Permission::Sell,
];

const POLICY_KINDS: &[PolicyKind] = &[
    PolicyKind::Private,
    PolicyKind::Public,
    PolicyKind::Prepaid,
    PolicyKind::Contract,
];

/// Random snapshot with the same seed always yields the same facts.
pub fn seeded_snapshot(seed: u64, now: u64) -> Snapshot {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    random_snapshot(&mut rng, now)
}

/// A random but internally consistent snapshot around one lot: every
/// entity references the others the way a live data provider would.
///
/// Domain status codes stay within their known ranges; timers land on both
/// sides of `now`.
pub fn random_snapshot(rng: &mut impl Rng, now: u64) -> Snapshot {
    let mut lot = rng.gen_bool(0.85).then(|| random_lot(rng));
    let building = match &lot {
        Some(_) if rng.gen_bool(0.75) => Some(random_building(rng, now)),
        _ => None,
    };
    let ship = rng.gen_bool(0.5).then(|| random_ship(rng, now, lot.is_some()));
    if let (Some(lot), Some(ship)) = (&mut lot, &ship) {
        if ship.location.lot.is_some() && building.is_none() {
            lot.parked_ship = Some(ship.id.clone());
        }
    }

    let samples = match &lot {
        Some(_) => (0..rng.gen_range(0..4))
            .map(|i| random_sample(rng, now, i))
            .collect(),
        None => Vec::new(),
    };
    let deliveries = match &building {
        Some(_) => (0..rng.gen_range(0..4))
            .map(|i| random_delivery(rng, now, i))
            .collect(),
        None => Vec::new(),
    };
    let pending = (0..rng.gen_range(0..3))
        .map(|_| random_pending(rng, &samples, &deliveries))
        .collect();

    Snapshot {
        now,
        loading: rng.gen_bool(0.05),
        launched: rng.gen_bool(0.95),
        crew: Some(random_crew(rng, now, ship.as_ref())),
        asteroid: Some(random_asteroid(rng, now)),
        lot,
        building,
        ship,
        deliveries,
        samples,
        pending,
    }
}

fn controller(rng: &mut impl Rng) -> Option<CrewId> {
    match rng.gen_range(0..10) {
        0..=6 => Some(CrewId(CREW.to_string())),
        7 | 8 => Some(CrewId(RIVAL.to_string())),
        _ => None,
    }
}

/// Finish time within two hours either side of `now`, occasionally unknown.
fn timer(rng: &mut impl Rng, now: u64) -> Option<u64> {
    rng.gen_bool(0.9)
        .then(|| (now + rng.gen_range(0..7_200)).saturating_sub(3_600))
}

fn policies(rng: &mut impl Rng) -> Vec<Policy> {
    (0..rng.gen_range(0..3))
        .filter_map(|_| {
            Some(Policy {
                permission: *PERMISSIONS.choose(rng)?,
                kind: *POLICY_KINDS.choose(rng)?,
            })
        })
        .collect()
}

fn inventory(rng: &mut impl Rng) -> InventoryState {
    let capacity_kg = 1_000.0;
    InventoryState {
        mass_kg: if rng.gen_bool(0.4) {
            0.0
        } else {
            rng.gen_range(1.0..capacity_kg)
        },
        capacity_kg,
        locked: rng.gen_bool(0.1),
    }
}

fn random_crew(rng: &mut impl Rng, now: u64, ship: Option<&ShipState>) -> CrewState {
    let on_asteroid = rng.gen_bool(0.8);
    let location = CrewLocation {
        asteroid: on_asteroid.then(|| AsteroidId(ASTEROID.to_string())),
        lot: (on_asteroid && rng.gen_bool(0.7)).then(|| LotId(LOT.to_string())),
        building: (on_asteroid && rng.gen_bool(0.2)).then(|| BuildingId(BUILDING.to_string())),
        ship: ship
            .filter(|_| rng.gen_bool(0.3))
            .map(|ship| ship.id.clone()),
    };
    let grants = (0..rng.gen_range(0..3))
        .filter_map(|_| {
            Some(PermissionGrant {
                permission: *PERMISSIONS.choose(rng)?,
                target: EntityRef::Building(BuildingId(BUILDING.to_string())),
                expires_at: rng
                    .gen_bool(0.5)
                    .then(|| (now + rng.gen_range(0..7_200)).saturating_sub(3_600)),
            })
        })
        .collect();
    CrewState {
        id: CrewId(CREW.to_string()),
        location,
        ready_at: (now + rng.gen_range(0..9_000)).saturating_sub(1_800),
        roster_size: rng.gen_range(1..=5),
        grants,
        bonuses: CrewBonuses {
            food: if rng.gen_bool(0.1) { 0.0 } else { rng.gen_range(0.1..=1.0) },
            propellant: rng.gen_range(0.8..=1.2),
        },
        simulation: rng.gen_bool(0.1),
        pending_event: rng.gen_bool(0.1).then(|| CrewEvent {
            triggered_by: *ActionKind::ALL.choose(rng).unwrap_or(&ActionKind::Extract),
            resolved: rng.gen_bool(0.3),
        }),
    }
}

fn random_asteroid(rng: &mut impl Rng, now: u64) -> AsteroidState {
    let status = rng.gen_range(0..=4);
    AsteroidState {
        id: AsteroidId(ASTEROID.to_string()),
        controller: controller(rng),
        scan: ScanInfo {
            status,
            finish_time: matches!(status, 1 | 3).then(|| timer(rng, now)).flatten(),
        },
        policies: policies(rng),
    }
}

fn random_lot(rng: &mut impl Rng) -> LotState {
    LotState {
        id: LotId(LOT.to_string()),
        asteroid: AsteroidId(ASTEROID.to_string()),
        controller: controller(rng),
        policies: policies(rng),
        parked_ship: None,
    }
}

fn random_building(rng: &mut impl Rng, now: u64) -> BuildingState {
    let kind = *BUILDING_KINDS.choose(rng).unwrap_or(&BuildingKind::Warehouse);
    let status = rng.gen_range(0..=3);
    let slotted = matches!(
        kind,
        BuildingKind::Extractor
            | BuildingKind::Refinery
            | BuildingKind::Bioreactor
            | BuildingKind::Factory
            | BuildingKind::Shipyard
    );
    let slot = slotted.then(|| {
        let running = rng.gen_bool(0.5);
        ProcessSlot {
            status: u8::from(running),
            finish_time: running.then(|| timer(rng, now)).flatten(),
            output: running.then(|| "Water".to_string()),
        }
    });
    let stocked = kind != BuildingKind::Habitat && kind != BuildingKind::Marketplace;
    BuildingState {
        id: BuildingId(BUILDING.to_string()),
        lot: LotId(LOT.to_string()),
        kind,
        controller: controller(rng),
        construction: ConstructionInfo {
            status,
            finish_time: (status == 2).then(|| timer(rng, now)).flatten(),
            materials_ready: rng.gen_bool(0.7),
        },
        inventory: stocked.then(|| inventory(rng)),
        slot,
        dock: (kind == BuildingKind::Spaceport).then(|| DockState {
            docked: rng.gen_range(0..=3),
            capacity: 3,
        }),
        station: (kind == BuildingKind::Habitat).then(|| StationState {
            population: rng.gen_range(0..=10),
            capacity: 10,
            guests: rng.gen_range(0..=2),
        }),
        policies: policies(rng),
    }
}

fn random_ship(rng: &mut impl Rng, now: u64, landable: bool) -> ShipState {
    let capacity = 2_000.0;
    let (location, transit) = match rng.gen_range(0..3) {
        0 if landable => (
            ShipLocation {
                lot: Some(LotId(LOT.to_string())),
                building: None,
            },
            None,
        ),
        1 => (
            ShipLocation::default(),
            Some(Transit {
                destination: AsteroidId("asteroid_0002".to_string()),
                departure: now.saturating_sub(3_600),
                arrival: (now + rng.gen_range(0..7_200)).saturating_sub(3_600),
            }),
        ),
        _ => (ShipLocation::default(), None),
    };
    ShipState {
        id: ShipId(SHIP.to_string()),
        controller: controller(rng),
        status: rng.gen_range(0..=2),
        location,
        transit,
        propellant_kg: rng.gen_range(0.0..=capacity),
        propellant_capacity_kg: capacity,
        emergency_at: rng.gen_bool(0.15).then(|| now.saturating_sub(600)),
        inventory: rng.gen_bool(0.5).then(|| inventory(rng)),
        station: rng.gen_bool(0.3).then(|| StationState {
            population: rng.gen_range(0..=5),
            capacity: 5,
            guests: rng.gen_range(0..=1),
        }),
        policies: policies(rng),
    }
}

fn random_sample(rng: &mut impl Rng, now: u64, index: u32) -> SampleState {
    let status = rng.gen_range(0..=3);
    SampleState {
        id: SampleId(format!("sample_{:04}", index + 1)),
        lot: LotId(LOT.to_string()),
        owner: if rng.gen_bool(0.8) {
            CrewId(CREW.to_string())
        } else {
            CrewId(RIVAL.to_string())
        },
        resource: "Water".to_string(),
        status,
        finish_time: (status == 1).then(|| timer(rng, now)).flatten(),
        remaining_yield: if rng.gen_bool(0.2) { 0.0 } else { rng.gen_range(1.0..500.0) },
        improved: rng.gen_bool(0.3),
    }
}

fn random_delivery(rng: &mut impl Rng, now: u64, index: u32) -> DeliveryState {
    let here = EntityRef::Building(BuildingId(BUILDING.to_string()));
    let there = EntityRef::Building(BuildingId(NEIGHBOUR.to_string()));
    let (origin, dest) = if rng.gen_bool(0.5) {
        (here, there)
    } else {
        (there, here)
    };
    let status = rng.gen_range(0..=3);
    DeliveryState {
        id: DeliveryId(format!("delivery_{:04}", index + 1)),
        status,
        origin,
        dest,
        finish_time: (status == 1).then(|| timer(rng, now)).flatten(),
    }
}

/// A pending transaction aimed at one of the generated entities.
fn random_pending(
    rng: &mut impl Rng,
    samples: &[SampleState],
    deliveries: &[DeliveryState],
) -> PendingAction {
    let stage = *[Stage::Start, Stage::Finish, Stage::Cancel]
        .choose(rng)
        .unwrap_or(&Stage::Start);
    match rng.gen_range(0..4) {
        0 if !samples.is_empty() => PendingAction {
            kind: ActionKind::NewCoreSample,
            stage,
            target: EntityRef::Lot(LotId(LOT.to_string())),
            instance: samples.choose(rng).map(|sample| sample.id.0.clone()),
        },
        1 if !deliveries.is_empty() => {
            let delivery = &deliveries[rng.gen_range(0..deliveries.len())];
            let incoming =
                delivery.dest == EntityRef::Building(BuildingId(BUILDING.to_string()));
            PendingAction {
                kind: if incoming {
                    ActionKind::SurfaceTransferIncoming
                } else {
                    ActionKind::SurfaceTransferOutgoing
                },
                stage,
                target: if incoming {
                    delivery.dest.clone()
                } else {
                    delivery.origin.clone()
                },
                instance: Some(delivery.id.0.clone()),
            }
        }
        _ => PendingAction {
            kind: *ActionKind::ALL.choose(rng).unwrap_or(&ActionKind::Construct),
            stage,
            target: EntityRef::Building(BuildingId(BUILDING.to_string())),
            instance: None,
        },
    }
}
