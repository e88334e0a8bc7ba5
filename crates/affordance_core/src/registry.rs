//! Action descriptor registry.
//!
//! Every action kind is one [`ActionRule`]. Adding a kind means registering a
//! rule; the engine never special-cases kinds.

use crate::context::Context;
use crate::descriptor::{Affordance, Icon, Subject};
use crate::reason::{resolve_disabled_reason, DisabledReason};
use crate::status::ActionStatus;
use crate::{actions, engine, stack, ActionKind};

pub trait ActionRule: Send + Sync {
    fn kind(&self) -> ActionKind;

    fn icon(&self) -> Icon;

    /// Every status this kind can report.
    fn states(&self) -> &'static [ActionStatus];

    /// Cheap, side-effect-free gate run for every candidate on every pass.
    fn is_visible(&self, ctx: &Context<'_>) -> bool;

    /// The primary control. `None` for stack-only kinds, or when the domain
    /// state cannot be classified.
    fn subject(&self, ctx: &Context<'_>) -> Option<Subject>;

    /// Concurrent instances collapsed by the stack aggregator.
    fn instances(&self, _ctx: &Context<'_>) -> Vec<Subject> {
        Vec::new()
    }

    fn stack_label(&self) -> &'static str {
        self.kind().name()
    }

    /// Status of the primary control; for stack-only kinds, the status the
    /// aggregated instances show. `None` only when nothing is offered.
    fn status(&self, ctx: &Context<'_>) -> Option<ActionStatus> {
        if let Some(subject) = self.subject(ctx) {
            return Some(subject.status);
        }
        let statuses: Vec<ActionStatus> = self
            .instances(ctx)
            .iter()
            .map(|subject| subject.status)
            .collect();
        match statuses.as_slice() {
            [] => None,
            [single] => Some(*single),
            many => Some(stack::combined_status(many)),
        }
    }

    fn disabled_reason(&self, ctx: &Context<'_>) -> Option<DisabledReason> {
        self.subject(ctx)
            .and_then(|subject| resolve_disabled_reason(ctx, &subject))
    }

    /// Renderable affordances for this kind: the primary control followed by
    /// the aggregated instances. Empty when not visible.
    fn describe(&self, ctx: &Context<'_>) -> Vec<Affordance> {
        engine::describe(self, ctx)
    }
}

/// Ordered set of rules. Order is on-screen order only.
pub struct Registry {
    rules: Vec<Box<dyn ActionRule>>,
}

impl Registry {
    pub fn empty() -> Self {
        Self { rules: Vec::new() }
    }

    /// Every built-in action kind in display order.
    pub fn standard() -> Self {
        let mut registry = Self::empty();
        actions::register_all(&mut registry);
        registry
    }

    pub fn register(&mut self, rule: impl ActionRule + 'static) {
        self.rules.push(Box::new(rule));
    }

    pub fn rules(&self) -> impl Iterator<Item = &dyn ActionRule> {
        self.rules.iter().map(AsRef::as_ref)
    }

    pub fn get(&self, kind: ActionKind) -> Option<&dyn ActionRule> {
        self.rules().find(|rule| rule.kind() == kind)
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::standard()
    }
}
