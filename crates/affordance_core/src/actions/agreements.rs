use super::rule_identity;
use crate::context::Context;
use crate::reason::Requirement;
use crate::registry::{ActionRule, Registry};
use crate::status::ActionStatus;
use crate::{EntityRef, Permission, Policy, PolicyKind, Subject};

pub(crate) fn register(registry: &mut Registry) {
    registry.register(FormAgreement);
}

pub struct FormAgreement;

impl FormAgreement {
    /// First permission another crew offers on the focused building (else
    /// lot) under terms, that this crew does not already hold.
    fn offer(ctx: &Context<'_>) -> Option<(EntityRef, Permission)> {
        let (target, controller, policies) = match (ctx.building(), ctx.lot()) {
            (Some(building), _) => (
                EntityRef::Building(building.id.clone()),
                building.controller.as_ref(),
                building.policies.as_slice(),
            ),
            (None, Some(lot)) => (
                EntityRef::Lot(lot.id.clone()),
                lot.controller.as_ref(),
                lot.policies.as_slice(),
            ),
            (None, None) => return None,
        };
        if controller.is_none() || ctx.controls(controller) {
            return None;
        }
        let permission = policies
            .iter()
            .filter(|policy| is_offered(policy))
            .map(|policy| policy.permission)
            .find(|permission| !holds_grant(ctx, *permission, &target))?;
        Some((target, permission))
    }
}

fn is_offered(policy: &Policy) -> bool {
    matches!(policy.kind, PolicyKind::Prepaid | PolicyKind::Contract)
}

fn holds_grant(ctx: &Context<'_>, permission: Permission, target: &EntityRef) -> bool {
    ctx.crew.grants.iter().any(|grant| {
        grant.permission == permission
            && &grant.target == target
            && grant.expires_at.is_none_or(|expiry| ctx.now() < expiry)
    })
}

impl ActionRule for FormAgreement {
    rule_identity!(FormAgreement, Agreement, [Ready]);

    fn is_visible(&self, ctx: &Context<'_>) -> bool {
        Self::offer(ctx).is_some()
    }

    fn subject(&self, ctx: &Context<'_>) -> Option<Subject> {
        let (target, permission) = Self::offer(ctx)?;
        Some(
            Subject::new(self.kind(), target, ActionStatus::Ready)
                .addendum(Some(permission.name().to_string()))
                .requires(Requirement::none()),
        )
    }
}
