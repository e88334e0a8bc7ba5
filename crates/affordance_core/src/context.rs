//! Per-pass evaluation context.
//!
//! Bundles the immutable snapshot with the crew it is evaluated for, the rule
//! content and the permission provider, so every resolver in one pass sees the
//! same `now` and the same entity references.

use crate::permission::PermissionOracle;
use crate::status::{timed, ActionStatus};
use crate::{
    ActionKind, AsteroidState, BuildingState, CrewId, CrewState, EntityRef, LotState,
    PendingAction, Permission, RuleSet, ShipState, Snapshot, Stage,
};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SnapshotError {
    #[error("snapshot has no crew")]
    MissingCrew,
    #[error("stale snapshot: {entity} references {expected}, found {found}")]
    Stale {
        entity: String,
        expected: String,
        found: String,
    },
}

pub struct Context<'a> {
    pub snapshot: &'a Snapshot,
    pub crew: &'a CrewState,
    pub rules: &'a RuleSet,
    pub permissions: &'a dyn PermissionOracle,
}

impl<'a> Context<'a> {
    /// Build a context, rejecting snapshots whose entity references disagree.
    pub fn new(
        snapshot: &'a Snapshot,
        rules: &'a RuleSet,
        permissions: &'a dyn PermissionOracle,
    ) -> Result<Self, SnapshotError> {
        validate(snapshot)?;
        let crew = snapshot.crew.as_ref().ok_or(SnapshotError::MissingCrew)?;
        Ok(Self {
            snapshot,
            crew,
            rules,
            permissions,
        })
    }

    pub fn now(&self) -> u64 {
        self.snapshot.now
    }

    pub fn asteroid(&self) -> Option<&'a AsteroidState> {
        self.snapshot.asteroid.as_ref()
    }

    pub fn lot(&self) -> Option<&'a LotState> {
        self.snapshot.lot.as_ref()
    }

    pub fn building(&self) -> Option<&'a BuildingState> {
        self.snapshot.building.as_ref()
    }

    pub fn ship(&self) -> Option<&'a ShipState> {
        self.snapshot.ship.as_ref()
    }

    /// True if the evaluating crew is `controller`.
    pub fn controls(&self, controller: Option<&CrewId>) -> bool {
        controller == Some(&self.crew.id)
    }

    pub fn crew_ready(&self) -> bool {
        self.now() >= self.crew.ready_at
    }

    /// A busy crew can still take a sequenced action while its schedule ends
    /// inside the buffer window.
    pub fn crew_can_sequence(&self) -> bool {
        let horizon = self
            .now()
            .saturating_add(self.rules.constants.crew_schedule_buffer_secs);
        self.crew.ready_at < horizon
    }

    pub fn simulation_active(&self) -> bool {
        self.crew.simulation
    }

    /// Permission check that fails closed: a provider error denies.
    pub fn permitted(&self, permission: Permission, target: &EntityRef) -> bool {
        match self
            .permissions
            .is_permitted(self.crew, permission, target, self.now())
        {
            Ok(permitted) => permitted,
            Err(err) => {
                tracing::debug!(?permission, %target, %err, "permission check undetermined");
                false
            }
        }
    }

    /// Pending transaction for exactly this action instance.
    pub fn pending(
        &self,
        kind: ActionKind,
        target: &EntityRef,
        instance: Option<&str>,
    ) -> Option<&'a PendingAction> {
        self.snapshot.pending.iter().find(|p| {
            p.kind == kind && &p.target == target && p.instance.as_deref() == instance
        })
    }

    /// Another action kind has an unconfirmed transaction on `target`.
    pub fn updating(&self, kind: ActionKind, target: &EntityRef) -> bool {
        self.snapshot
            .pending
            .iter()
            .any(|p| p.kind != kind && &p.target == target)
    }

    /// Fold pending finish/cancel transactions into a raw status.
    pub fn settle(
        &self,
        kind: ActionKind,
        target: &EntityRef,
        instance: Option<&str>,
        status: ActionStatus,
    ) -> ActionStatus {
        match self.pending(kind, target, instance).map(|p| p.stage) {
            Some(Stage::Finish) if status == ActionStatus::ReadyToFinish => ActionStatus::Finishing,
            Some(Stage::Cancel) => ActionStatus::Canceling,
            _ => status,
        }
    }

    /// Status of a running timed action, pending transactions included.
    pub fn progress(
        &self,
        kind: ActionKind,
        target: &EntityRef,
        instance: Option<&str>,
        finish_time: Option<u64>,
    ) -> ActionStatus {
        self.settle(kind, target, instance, timed(self.now(), finish_time))
    }
}

/// Reject snapshots whose entities do not reference each other consistently.
pub fn validate(snapshot: &Snapshot) -> Result<(), SnapshotError> {
    if let (Some(asteroid), Some(lot)) = (&snapshot.asteroid, &snapshot.lot) {
        if lot.asteroid != asteroid.id {
            return Err(stale(format!("lot {}", lot.id), &asteroid.id, &lot.asteroid));
        }
    }
    if let (Some(lot), Some(building)) = (&snapshot.lot, &snapshot.building) {
        if building.lot != lot.id {
            return Err(stale(format!("building {}", building.id), &lot.id, &building.lot));
        }
    }
    if let (Some(lot), Some(ship)) = (&snapshot.lot, &snapshot.ship) {
        if let Some(parked) = &lot.parked_ship {
            if parked == &ship.id && ship.location.lot.as_ref() != Some(&lot.id) {
                return Err(stale(format!("ship {}", ship.id), &lot.id, &"no lot"));
            }
        }
    }
    Ok(())
}

fn stale(
    entity: String,
    expected: &dyn std::fmt::Display,
    found: &dyn std::fmt::Display,
) -> SnapshotError {
    SnapshotError::Stale {
        entity,
        expected: expected.to_string(),
        found: found.to_string(),
    }
}
