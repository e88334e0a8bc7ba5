//! Rule content: tunable constants and the simulation allow-list.

use ahash::AHashSet;
use serde::{Deserialize, Serialize};

use crate::ActionKind;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleSet {
    pub content_version: String,
    pub constants: Constants,
    pub simulation: SimulationRules,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Constants {
    /// How far past `now` a crew may already be booked and still accept a
    /// sequenced action.
    pub crew_schedule_buffer_secs: u64,
    pub max_crew_roster: u8,
    /// Usable propellant below which no course can be set.
    pub min_course_propellant_kg: f32,
    /// Emergency mode may only be activated at or below this tank fraction.
    pub emergency_propellant_fraction: f32,
}

/// Action kinds a crew in simulation mode may perform.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimulationRules {
    pub allowed: AHashSet<ActionKind>,
}

impl SimulationRules {
    pub fn allows(&self, kind: ActionKind) -> bool {
        self.allowed.contains(&kind)
    }
}
