//! Evaluation entry points: one pass over the registry per snapshot.

use crate::context::Context;
use crate::descriptor::{ActionRequest, Affordance, Descriptor, Flags, Icon, Subject};
use crate::permission::PermissionOracle;
use crate::reason::{resolve_disabled_reason, DisabledReason};
use crate::registry::{ActionRule, Registry};
use crate::sequence::deferred_start;
use crate::status::ActionStatus;
use crate::{stack, RuleSet, Snapshot};

/// Evaluate every registered action kind against one context.
///
/// Order of the output follows registry order. Each visible kind contributes
/// its primary control (if any) followed by its aggregated instances (if any).
pub fn evaluate(registry: &Registry, ctx: &Context<'_>) -> Vec<Affordance> {
    registry
        .rules()
        .flat_map(|rule| rule.describe(ctx))
        .collect()
}

/// Build a context from `snapshot` and evaluate it.
///
/// A snapshot that cannot be evaluated safely yields no affordances; the
/// caller re-evaluates on its next pass.
pub fn evaluate_snapshot(
    registry: &Registry,
    snapshot: &Snapshot,
    rules: &RuleSet,
    permissions: &dyn PermissionOracle,
) -> Vec<Affordance> {
    match Context::new(snapshot, rules, permissions) {
        Ok(ctx) => evaluate(registry, &ctx),
        Err(err) => {
            tracing::warn!(now = snapshot.now, %err, "discarding snapshot");
            Vec::new()
        }
    }
}

pub(crate) fn describe<R: ActionRule + ?Sized>(rule: &R, ctx: &Context<'_>) -> Vec<Affordance> {
    if !rule.is_visible(ctx) {
        return Vec::new();
    }
    let icon = rule.icon();
    let mut affordances = Vec::new();

    if let Some(subject) = rule.subject(ctx) {
        affordances.push(Affordance::Action(build(ctx, icon, &subject)));
    }
    let items: Vec<Descriptor> = rule
        .instances(ctx)
        .iter()
        .map(|subject| build(ctx, icon, subject))
        .collect();
    if let Some(stacked) = stack::aggregate(rule.stack_label(), items) {
        affordances.push(stacked);
    }
    affordances
}

/// Resolve one subject into its renderable descriptor.
pub fn build(ctx: &Context<'_>, icon: Icon, subject: &Subject) -> Descriptor {
    let reason = resolve_disabled_reason(ctx, subject);
    let scheduled_for = deferred_start(ctx, subject, reason);
    let status = subject.status;

    Descriptor {
        kind: subject.kind,
        label: subject.label.clone(),
        label_addendum: subject.label_addendum.clone(),
        icon,
        status,
        flags: Flags {
            disabled: reason.is_some(),
            attention: status == ActionStatus::ReadyToFinish && reason.is_none(),
            loading: status.in_flight() || reason == Some(DisabledReason::Loading),
            badge: subject.badge,
            tally: None,
            finish_time: subject.finish_time,
        },
        disabled_reason: reason,
        scheduled_for,
        on_click: ActionRequest {
            kind: subject.kind,
            stage: subject.stage,
            target: subject.target.clone(),
            instance: subject.instance.clone(),
        },
    }
}
