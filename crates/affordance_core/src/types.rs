//! Type definitions for `affordance_core`.
//!
//! The snapshot entities handed to the engine by the data providers, plus the
//! ID newtypes and the closed `ActionKind` enumeration.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// ID newtypes
// ---------------------------------------------------------------------------

macro_rules! string_id {
    ($name:ident) => {
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub struct $name(pub String);

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

string_id!(CrewId);
string_id!(AsteroidId);
string_id!(LotId);
string_id!(BuildingId);
string_id!(ShipId);
string_id!(DeliveryId);
string_id!(SampleId);

/// Any entity an action can be aimed at or a permission can be held on.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityRef {
    Asteroid(AsteroidId),
    Lot(LotId),
    Building(BuildingId),
    Ship(ShipId),
    Crew(CrewId),
}

impl fmt::Display for EntityRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityRef::Asteroid(id) => write!(f, "asteroid:{id}"),
            EntityRef::Lot(id) => write!(f, "lot:{id}"),
            EntityRef::Building(id) => write!(f, "building:{id}"),
            EntityRef::Ship(id) => write!(f, "ship:{id}"),
            EntityRef::Crew(id) => write!(f, "crew:{id}"),
        }
    }
}

// ---------------------------------------------------------------------------
// Action kinds
// ---------------------------------------------------------------------------

macro_rules! action_kinds {
    ($($kind:ident => $name:literal),+ $(,)?) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub enum ActionKind {
            $($kind),+
        }

        impl ActionKind {
            pub const ALL: &'static [ActionKind] = &[$(ActionKind::$kind),+];

            /// Human-readable name, used in logs and CLI output.
            pub fn name(self) -> &'static str {
                match self {
                    $(ActionKind::$kind => $name),+
                }
            }

            /// Identifier as written in rule content and on the command line.
            pub fn ident(self) -> &'static str {
                match self {
                    $(ActionKind::$kind => stringify!($kind)),+
                }
            }
        }
    };
}

action_kinds! {
    ScanSurface => "Scan Surface",
    ScanResources => "Scan Resources",
    PlanBuilding => "Plan Building",
    UnplanBuilding => "Unplan Building",
    Construct => "Construct",
    Deconstruct => "Deconstruct",
    NewCoreSample => "New Core Sample",
    ImproveCoreSample => "Improve Core Sample",
    Extract => "Extract",
    Process => "Process",
    AssembleShip => "Assemble Ship",
    SurfaceTransferOutgoing => "Surface Transfer",
    SurfaceTransferIncoming => "Incoming Transfer",
    LaunchShip => "Launch Ship",
    DockShip => "Dock Ship",
    UndockShip => "Undock Ship",
    SetCourse => "Set Course",
    EmergencyModeToggle => "Emergency Mode",
    EmergencyModeCollect => "Collect Propellant",
    StationCrew => "Station Crew",
    EjectCrew => "Eject Crew",
    EjectGuestCrew => "Eject Guest Crew",
    RecruitCrewmate => "Recruit Crewmate",
    MarketBuy => "Buy",
    MarketSell => "Sell",
    FormAgreement => "Form Agreement",
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown action kind '{0}'")]
pub struct UnknownActionKind(pub String);

impl FromStr for ActionKind {
    type Err = UnknownActionKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ActionKind::ALL
            .iter()
            .copied()
            .find(|kind| kind.ident().eq_ignore_ascii_case(s))
            .ok_or_else(|| UnknownActionKind(s.to_string()))
    }
}

/// Which half of an action a request or a pending transaction refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Stage {
    Start,
    Finish,
    Cancel,
    /// Opens the in-progress view; never submitted as a transaction.
    Inspect,
}

// ---------------------------------------------------------------------------
// Permissions
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Permission {
    UseLot,
    RunProcess,
    ExtractResources,
    AssembleShip,
    DockShip,
    StationCrew,
    AddProducts,
    RemoveProducts,
    Buy,
    Sell,
}

impl Permission {
    pub fn name(self) -> &'static str {
        match self {
            Permission::UseLot => "Use Lot",
            Permission::RunProcess => "Run Process",
            Permission::ExtractResources => "Extract Resources",
            Permission::AssembleShip => "Assemble Ship",
            Permission::DockShip => "Dock Ship",
            Permission::StationCrew => "Station Crew",
            Permission::AddProducts => "Add Products",
            Permission::RemoveProducts => "Remove Products",
            Permission::Buy => "Buy",
            Permission::Sell => "Sell",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PolicyKind {
    Private,
    Public,
    Prepaid,
    Contract,
}

/// How the controller of an entity exposes one permission to other crews.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Policy {
    pub permission: Permission,
    pub kind: PolicyKind,
}

/// A permission a crew holds on an entity it does not control.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionGrant {
    pub permission: Permission,
    pub target: EntityRef,
    /// Grant lapses at this time. `None` never expires.
    #[serde(default)]
    pub expires_at: Option<u64>,
}

// ---------------------------------------------------------------------------
// Crew
// ---------------------------------------------------------------------------

/// Where the crew is. All `None` means in orbit or in transit.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrewLocation {
    #[serde(default)]
    pub asteroid: Option<AsteroidId>,
    #[serde(default)]
    pub lot: Option<LotId>,
    #[serde(default)]
    pub building: Option<BuildingId>,
    #[serde(default)]
    pub ship: Option<ShipId>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrewBonuses {
    /// Remaining food as a fraction of full rations.
    pub food: f32,
    /// Multiplier applied to usable propellant.
    pub propellant: f32,
}

impl Default for CrewBonuses {
    fn default() -> Self {
        Self {
            food: 1.0,
            propellant: 1.0,
        }
    }
}

/// A random crew event awaiting resolution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrewEvent {
    /// The action whose completion triggered the event.
    pub triggered_by: ActionKind,
    #[serde(default)]
    pub resolved: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrewState {
    pub id: CrewId,
    #[serde(default)]
    pub location: CrewLocation,
    /// Epoch seconds. The crew is ready iff `now >= ready_at`.
    pub ready_at: u64,
    pub roster_size: u8,
    #[serde(default)]
    pub grants: Vec<PermissionGrant>,
    #[serde(default)]
    pub bonuses: CrewBonuses,
    /// Crew is playing the restricted simulation (tutorial) mode.
    #[serde(default)]
    pub simulation: bool,
    #[serde(default)]
    pub pending_event: Option<CrewEvent>,
}

// ---------------------------------------------------------------------------
// Target entities
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanInfo {
    pub status: u8,
    #[serde(default)]
    pub finish_time: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AsteroidState {
    pub id: AsteroidId,
    #[serde(default)]
    pub controller: Option<CrewId>,
    pub scan: ScanInfo,
    #[serde(default)]
    pub policies: Vec<Policy>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LotState {
    pub id: LotId,
    pub asteroid: AsteroidId,
    /// Lessee, if any. An unleased lot is managed by the asteroid controller.
    #[serde(default)]
    pub controller: Option<CrewId>,
    #[serde(default)]
    pub policies: Vec<Policy>,
    /// A ship landed directly on the lot occupies it.
    #[serde(default)]
    pub parked_ship: Option<ShipId>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BuildingKind {
    Warehouse,
    Extractor,
    Refinery,
    Bioreactor,
    Factory,
    Shipyard,
    Spaceport,
    Marketplace,
    Habitat,
    TankFarm,
}

impl BuildingKind {
    pub fn name(self) -> &'static str {
        match self {
            BuildingKind::Warehouse => "Warehouse",
            BuildingKind::Extractor => "Extractor",
            BuildingKind::Refinery => "Refinery",
            BuildingKind::Bioreactor => "Bioreactor",
            BuildingKind::Factory => "Factory",
            BuildingKind::Shipyard => "Shipyard",
            BuildingKind::Spaceport => "Spaceport",
            BuildingKind::Marketplace => "Marketplace",
            BuildingKind::Habitat => "Habitat",
            BuildingKind::TankFarm => "Tank Farm",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConstructionInfo {
    pub status: u8,
    #[serde(default)]
    pub finish_time: Option<u64>,
    /// All construction materials have arrived at the site.
    #[serde(default)]
    pub materials_ready: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InventoryState {
    pub mass_kg: f32,
    pub capacity_kg: f32,
    /// Inventory is locked by an in-flight operation.
    #[serde(default)]
    pub locked: bool,
}

impl InventoryState {
    pub fn is_empty(&self) -> bool {
        self.mass_kg <= 0.0
    }
}

/// A single extractor, processor or dry-dock slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessSlot {
    pub status: u8,
    #[serde(default)]
    pub finish_time: Option<u64>,
    /// What the running job produces, shown next to the label.
    #[serde(default)]
    pub output: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DockState {
    pub docked: u32,
    pub capacity: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StationState {
    pub population: u32,
    pub capacity: u32,
    /// Crews stationed here that the controller does not own.
    #[serde(default)]
    pub guests: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuildingState {
    pub id: BuildingId,
    pub lot: LotId,
    pub kind: BuildingKind,
    #[serde(default)]
    pub controller: Option<CrewId>,
    pub construction: ConstructionInfo,
    #[serde(default)]
    pub inventory: Option<InventoryState>,
    #[serde(default)]
    pub slot: Option<ProcessSlot>,
    #[serde(default)]
    pub dock: Option<DockState>,
    #[serde(default)]
    pub station: Option<StationState>,
    #[serde(default)]
    pub policies: Vec<Policy>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShipLocation {
    #[serde(default)]
    pub lot: Option<LotId>,
    #[serde(default)]
    pub building: Option<BuildingId>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transit {
    pub destination: AsteroidId,
    pub departure: u64,
    pub arrival: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShipState {
    pub id: ShipId,
    #[serde(default)]
    pub controller: Option<CrewId>,
    pub status: u8,
    #[serde(default)]
    pub location: ShipLocation,
    #[serde(default)]
    pub transit: Option<Transit>,
    pub propellant_kg: f32,
    pub propellant_capacity_kg: f32,
    /// Emergency mode was activated at this time.
    #[serde(default)]
    pub emergency_at: Option<u64>,
    #[serde(default)]
    pub inventory: Option<InventoryState>,
    #[serde(default)]
    pub station: Option<StationState>,
    #[serde(default)]
    pub policies: Vec<Policy>,
}

impl ShipState {
    pub fn in_flight(&self) -> bool {
        self.transit.is_some()
    }

    pub fn in_orbit(&self) -> bool {
        self.transit.is_none() && self.location.lot.is_none() && self.location.building.is_none()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeliveryState {
    pub id: DeliveryId,
    pub status: u8,
    pub origin: EntityRef,
    pub dest: EntityRef,
    #[serde(default)]
    pub finish_time: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SampleState {
    pub id: SampleId,
    pub lot: LotId,
    pub owner: CrewId,
    pub resource: String,
    pub status: u8,
    #[serde(default)]
    pub finish_time: Option<u64>,
    pub remaining_yield: f32,
    #[serde(default)]
    pub improved: bool,
}

/// A submitted transaction whose outcome has not been observed yet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingAction {
    pub kind: ActionKind,
    pub stage: Stage,
    pub target: EntityRef,
    #[serde(default)]
    pub instance: Option<String>,
}

// ---------------------------------------------------------------------------
// Snapshot
// ---------------------------------------------------------------------------

/// Immutable facts for one evaluation pass. Built by the caller from
/// already-resolved entities; the engine never re-reads live state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Synced block time, epoch seconds.
    pub now: u64,
    /// Upstream data is still resolving.
    #[serde(default)]
    pub loading: bool,
    #[serde(default = "default_launched")]
    pub launched: bool,
    #[serde(default)]
    pub crew: Option<CrewState>,
    #[serde(default)]
    pub asteroid: Option<AsteroidState>,
    #[serde(default)]
    pub lot: Option<LotState>,
    #[serde(default)]
    pub building: Option<BuildingState>,
    #[serde(default)]
    pub ship: Option<ShipState>,
    #[serde(default)]
    pub deliveries: Vec<DeliveryState>,
    #[serde(default)]
    pub samples: Vec<SampleState>,
    #[serde(default)]
    pub pending: Vec<PendingAction>,
}

fn default_launched() -> bool {
    true
}

impl Snapshot {
    /// The same snapshot observed at a later (or earlier) clock tick.
    #[must_use]
    pub fn at(&self, now: u64) -> Snapshot {
        Snapshot {
            now,
            ..self.clone()
        }
    }
}
