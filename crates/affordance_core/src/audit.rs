//! Invariant audit over one evaluation pass.
//!
//! Used by the sweep command and the property tests; never on the hot path.

use ahash::AHashMap;

use crate::context::Context;
use crate::descriptor::{Affordance, Descriptor};
use crate::reason::DisabledReason;
use crate::registry::{ActionRule, Registry};
use crate::status::ActionStatus;
use crate::{engine, stack, ActionKind, EntityRef};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Violation {
    #[error("{kind}: status '{status}' is outside its state set")]
    UnknownState {
        kind: ActionKind,
        status: ActionStatus,
    },
    #[error("{kind}: visible but reports no status")]
    Statusless { kind: ActionKind },
    #[error("{kind}: reported both busy and scheduled for {scheduled_for}")]
    BusyAndScheduled { kind: ActionKind, scheduled_for: u64 },
    #[error("{kind}: a single instance aggregated into something other than itself")]
    SingletonStacked { kind: ActionKind },
    #[error("{kind}: repeated evaluation produced different affordances")]
    Nondeterministic { kind: ActionKind },
    #[error("{kind} on {target}: regressed from {from} to {to}")]
    Regressed {
        kind: ActionKind,
        target: EntityRef,
        from: ActionStatus,
        to: ActionStatus,
    },
}

/// Check every visible rule against the single-pass invariants.
pub fn audit(registry: &Registry, ctx: &Context<'_>) -> Vec<Violation> {
    let mut violations = Vec::new();
    for rule in registry.rules() {
        if rule.is_visible(ctx) {
            audit_rule(rule, ctx, &mut violations);
        }
    }
    violations
}

fn audit_rule(rule: &dyn ActionRule, ctx: &Context<'_>, violations: &mut Vec<Violation>) {
    let kind = rule.kind();
    let states = rule.states();
    let instances = rule.instances(ctx);
    let primary = rule.subject(ctx);

    match (rule.status(ctx), &primary) {
        (None, _) => violations.push(Violation::Statusless { kind }),
        // Stack-only kinds report the aggregate; members are checked below.
        (Some(status), None) if !states.contains(&status) => {
            violations.push(Violation::UnknownState { kind, status });
        }
        _ => {}
    }
    for subject in primary.iter().chain(&instances) {
        if !states.contains(&subject.status) {
            violations.push(Violation::UnknownState {
                kind,
                status: subject.status,
            });
        }
    }

    let affordances = rule.describe(ctx);
    for descriptor in flatten(&affordances) {
        if let (Some(DisabledReason::CrewBusy), Some(scheduled_for)) =
            (descriptor.disabled_reason, descriptor.scheduled_for)
        {
            violations.push(Violation::BusyAndScheduled {
                kind,
                scheduled_for,
            });
        }
    }
    if rule.describe(ctx) != affordances {
        violations.push(Violation::Nondeterministic { kind });
    }

    let items: Vec<Descriptor> = instances
        .iter()
        .map(|subject| engine::build(ctx, rule.icon(), subject))
        .collect();
    match items.as_slice() {
        [] => {}
        [single] => {
            let stacked = stack::aggregate(rule.stack_label(), items.clone());
            if stacked != Some(Affordance::Action(single.clone())) {
                violations.push(Violation::SingletonStacked { kind });
            }
        }
        _ => {
            let first = stack::aggregate(rule.stack_label(), items.clone());
            let second = stack::aggregate(rule.stack_label(), items);
            if first != second {
                violations.push(Violation::Nondeterministic { kind });
            }
        }
    }
}

/// Check that nothing `ReadyToFinish` in `earlier` moved backwards in
/// `later`. The two contexts should differ only in `now`.
pub fn audit_progression(
    registry: &Registry,
    earlier: &Context<'_>,
    later: &Context<'_>,
) -> Vec<Violation> {
    let mut violations = Vec::new();
    for rule in registry.rules() {
        let before = rule.describe(earlier);
        let after = rule.describe(later);
        let now_status: AHashMap<_, ActionStatus> = flatten(&after)
            .map(|descriptor| (instance_key(descriptor), descriptor.status))
            .collect();

        for descriptor in flatten(&before) {
            if descriptor.status != ActionStatus::ReadyToFinish {
                continue;
            }
            let Some(&to) = now_status.get(&instance_key(descriptor)) else {
                continue;
            };
            if to.rank() < descriptor.status.rank() && to != ActionStatus::Canceling {
                violations.push(Violation::Regressed {
                    kind: descriptor.kind,
                    target: descriptor.on_click.target.clone(),
                    from: descriptor.status,
                    to,
                });
            }
        }
    }
    violations
}

/// Per-instance descriptors: plain actions and expanded stack rows.
fn flatten(affordances: &[Affordance]) -> impl Iterator<Item = &Descriptor> {
    affordances.iter().flat_map(|affordance| match affordance {
        Affordance::Action(descriptor) => std::slice::from_ref(descriptor),
        Affordance::Stack(stack) => stack.items.as_slice(),
    })
}

fn instance_key(descriptor: &Descriptor) -> (ActionKind, &EntityRef, Option<&str>) {
    (
        descriptor.kind,
        &descriptor.on_click.target,
        descriptor.on_click.instance.as_deref(),
    )
}
