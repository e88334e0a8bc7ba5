//! `affordance_core`: action affordance engine.
//!
//! Pure decision logic: given one immutable snapshot, decide which actions a
//! crew is offered, in what state, and why any of them cannot be invoked.
//! No IO, no clock, no hidden state.

mod actions;
pub mod audit;
mod context;
mod descriptor;
mod engine;
mod permission;
mod reason;
mod registry;
mod rules;
mod sequence;
mod stack;
mod status;
mod types;

pub use audit::{audit, audit_progression, Violation};
pub use context::{validate, Context, SnapshotError};
pub use descriptor::{ActionRequest, Affordance, Descriptor, Flags, Icon, Stack, Subject};
pub use engine::{build, evaluate, evaluate_snapshot};
pub use permission::{PermissionError, PermissionOracle, SnapshotPermissions};
pub use reason::{resolve_disabled_reason, DisabledReason, Requirement};
pub use registry::{ActionRule, Registry};
pub use rules::{Constants, RuleSet, SimulationRules};
pub use sequence::deferred_start;
pub use stack::{aggregate, next_index};
pub use status::{
    timed, ActionStatus, ConstructionStatus, DeliveryStatus, DomainStatus, SampleStatus,
    ScanStatus, ShipStatus, SlotStatus,
};
pub use types::*;

#[cfg(any(test, feature = "test-support"))]
pub mod test_fixtures;

#[cfg(test)]
mod tests;
