//! Permission checks.
//!
//! The engine asks a [`PermissionOracle`] whether the crew may act on a target.
//! A failed check is never propagated: the resolver turns it into
//! "access restricted".

use crate::{CrewState, EntityRef, Permission, Policy, PolicyKind, Snapshot};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PermissionError {
    #[error("permission target {0} is not part of the snapshot")]
    UnknownTarget(EntityRef),
    #[error("permission provider unavailable: {0}")]
    Unavailable(String),
}

/// Answers "does crew X hold permission P on entity Y at time T".
pub trait PermissionOracle {
    fn is_permitted(
        &self,
        crew: &CrewState,
        permission: Permission,
        target: &EntityRef,
        at: u64,
    ) -> Result<bool, PermissionError>;
}

/// Resolves permissions from controllers, policies and grants carried by the
/// snapshot itself.
#[derive(Debug, Clone, Copy)]
pub struct SnapshotPermissions<'a> {
    snapshot: &'a Snapshot,
}

impl<'a> SnapshotPermissions<'a> {
    pub fn new(snapshot: &'a Snapshot) -> Self {
        Self { snapshot }
    }

    /// Controller and policies of `target`, or `None` if the snapshot does
    /// not carry it.
    fn control_of(&self, target: &EntityRef) -> Option<(Option<&'a crate::CrewId>, &'a [Policy])> {
        let snapshot = self.snapshot;
        match target {
            EntityRef::Asteroid(id) => snapshot
                .asteroid
                .as_ref()
                .filter(|a| &a.id == id)
                .map(|a| (a.controller.as_ref(), a.policies.as_slice())),
            EntityRef::Lot(id) => snapshot.lot.as_ref().filter(|l| &l.id == id).map(|lot| {
                // An unleased lot is managed by the asteroid controller.
                let controller = lot.controller.as_ref().or_else(|| {
                    snapshot
                        .asteroid
                        .as_ref()
                        .filter(|a| a.id == lot.asteroid)
                        .and_then(|a| a.controller.as_ref())
                });
                (controller, lot.policies.as_slice())
            }),
            EntityRef::Building(id) => snapshot
                .building
                .as_ref()
                .filter(|b| &b.id == id)
                .map(|b| (b.controller.as_ref(), b.policies.as_slice())),
            EntityRef::Ship(id) => snapshot
                .ship
                .as_ref()
                .filter(|s| &s.id == id)
                .map(|s| (s.controller.as_ref(), s.policies.as_slice())),
            EntityRef::Crew(_) => None,
        }
    }
}

impl PermissionOracle for SnapshotPermissions<'_> {
    fn is_permitted(
        &self,
        crew: &CrewState,
        permission: Permission,
        target: &EntityRef,
        at: u64,
    ) -> Result<bool, PermissionError> {
        let (controller, policies) = self
            .control_of(target)
            .ok_or_else(|| PermissionError::UnknownTarget(target.clone()))?;

        if controller == Some(&crew.id) {
            return Ok(true);
        }
        if policies
            .iter()
            .any(|p| p.permission == permission && p.kind == PolicyKind::Public)
        {
            return Ok(true);
        }
        Ok(crew.grants.iter().any(|grant| {
            grant.permission == permission
                && &grant.target == target
                && grant.expires_at.is_none_or(|expiry| at < expiry)
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_fixtures::{base_snapshot, crew_id, lot_id, other_crew_id};
    use crate::{PermissionGrant, PolicyKind};

    #[test]
    fn controller_holds_every_permission() {
        let snapshot = base_snapshot();
        let oracle = SnapshotPermissions::new(&snapshot);
        let crew = snapshot.crew.as_ref().unwrap();
        let lot = EntityRef::Lot(lot_id());
        assert_eq!(
            oracle.is_permitted(crew, Permission::UseLot, &lot, snapshot.now),
            Ok(true)
        );
    }

    #[test]
    fn unleased_lot_defers_to_asteroid_controller() {
        let mut snapshot = base_snapshot();
        snapshot.lot.as_mut().unwrap().controller = None;
        snapshot.asteroid.as_mut().unwrap().controller = Some(crew_id());
        let oracle = SnapshotPermissions::new(&snapshot);
        let crew = snapshot.crew.as_ref().unwrap();
        assert_eq!(
            oracle.is_permitted(crew, Permission::UseLot, &EntityRef::Lot(lot_id()), 0),
            Ok(true)
        );
    }

    #[test]
    fn public_policy_admits_other_crews() {
        let mut snapshot = base_snapshot();
        let lot = snapshot.lot.as_mut().unwrap();
        lot.controller = Some(other_crew_id());
        lot.policies.push(Policy {
            permission: Permission::UseLot,
            kind: PolicyKind::Public,
        });
        let oracle = SnapshotPermissions::new(&snapshot);
        let crew = snapshot.crew.as_ref().unwrap();
        let target = EntityRef::Lot(lot_id());
        assert_eq!(oracle.is_permitted(crew, Permission::UseLot, &target, 0), Ok(true));
        assert_eq!(oracle.is_permitted(crew, Permission::Sell, &target, 0), Ok(false));
    }

    #[test]
    fn expired_grant_is_ignored() {
        let mut snapshot = base_snapshot();
        snapshot.lot.as_mut().unwrap().controller = Some(other_crew_id());
        snapshot.crew.as_mut().unwrap().grants.push(PermissionGrant {
            permission: Permission::UseLot,
            target: EntityRef::Lot(lot_id()),
            expires_at: Some(1_000),
        });
        let oracle = SnapshotPermissions::new(&snapshot);
        let crew = snapshot.crew.as_ref().unwrap();
        let target = EntityRef::Lot(lot_id());
        assert_eq!(oracle.is_permitted(crew, Permission::UseLot, &target, 999), Ok(true));
        assert_eq!(oracle.is_permitted(crew, Permission::UseLot, &target, 1_000), Ok(false));
    }

    #[test]
    fn target_outside_snapshot_is_an_error() {
        let snapshot = base_snapshot();
        let oracle = SnapshotPermissions::new(&snapshot);
        let crew = snapshot.crew.as_ref().unwrap();
        let stranger = EntityRef::Ship(crate::ShipId("ship_unknown".to_string()));
        assert!(matches!(
            oracle.is_permitted(crew, Permission::DockShip, &stranger, 0),
            Err(PermissionError::UnknownTarget(_))
        ));
    }
}
