use super::{focus_asteroid, inventory_holder, rule_identity};
use crate::context::Context;
use crate::reason::{DisabledReason, Requirement};
use crate::registry::{ActionRule, Registry};
use crate::status::{decode, ActionStatus, DeliveryStatus};
use crate::{ActionKind, DeliveryState, EntityRef, Permission, Stage, Subject};

pub(crate) fn register(registry: &mut Registry) {
    registry.register(SurfaceTransferOutgoing);
    registry.register(SurfaceTransferIncoming);
}

fn origin(delivery: &DeliveryState) -> &EntityRef {
    &delivery.origin
}

fn dest(delivery: &DeliveryState) -> &EntityRef {
    &delivery.dest
}

/// Deliveries touching `holder` on the side picked by `side`, still open.
fn open_deliveries<'a>(
    ctx: &Context<'a>,
    holder: &'a EntityRef,
    side: fn(&DeliveryState) -> &EntityRef,
) -> impl Iterator<Item = (&'a DeliveryState, DeliveryStatus)> + 'a {
    ctx.snapshot
        .deliveries
        .iter()
        .filter(move |delivery| side(delivery) == holder)
        .filter_map(|delivery| Some((delivery, decode(delivery.status, &delivery.id)?)))
        .filter(|(_, status)| matches!(status, DeliveryStatus::Packaged | DeliveryStatus::Sent))
}

/// One open delivery as a stack member. `proposal` is the status and stage a
/// packaged (not yet accepted) delivery takes on this side.
fn delivery_subject(
    ctx: &Context<'_>,
    kind: ActionKind,
    delivery: &DeliveryState,
    status: DeliveryStatus,
    proposal: (ActionStatus, Stage),
    requirement: Requirement,
) -> Subject {
    let instance = delivery.id.0.as_str();
    let target = match kind {
        ActionKind::SurfaceTransferIncoming => dest(delivery).clone(),
        _ => origin(delivery).clone(),
    };
    match status {
        DeliveryStatus::Packaged => {
            let (raw, stage) = proposal;
            let settled = ctx.settle(kind, &target, Some(instance), raw);
            Subject::new(kind, target, settled)
                .instance(instance)
                .label(format!("Proposal {}", delivery.id))
                .stage(stage)
                .requires(requirement)
        }
        _ => {
            let progress = ctx.progress(kind, &target, Some(instance), delivery.finish_time);
            Subject::new(kind, target, progress)
                .instance(instance)
                .label(format!("Delivery {}", delivery.id))
                .finish_time(delivery.finish_time)
                .requires(requirement)
        }
    }
}

pub struct SurfaceTransferOutgoing;

impl ActionRule for SurfaceTransferOutgoing {
    rule_identity!(
        SurfaceTransferOutgoing,
        Transfer,
        [Ready, InProgress, ReadyToFinish, Finishing, Canceling]
    );

    fn is_visible(&self, ctx: &Context<'_>) -> bool {
        inventory_holder(ctx).is_some()
    }

    fn subject(&self, ctx: &Context<'_>) -> Option<Subject> {
        let (holder, inventory) = inventory_holder(ctx)?;
        let reason = if inventory.locked {
            Some(DisabledReason::InUse)
        } else if inventory.is_empty() {
            Some(DisabledReason::InventoryEmpty)
        } else {
            None
        };
        let requirement = Requirement::start()
            .permission(Permission::RemoveProducts, holder.clone())
            .on_asteroid(focus_asteroid(ctx))
            .on_surface()
            .sequenceable();
        Some(
            Subject::new(self.kind(), holder, ActionStatus::Ready)
                .requires(requirement)
                .reason(reason),
        )
    }

    /// Sent deliveries and proposals awaiting the receiver. The sender may
    /// withdraw a proposal.
    fn instances(&self, ctx: &Context<'_>) -> Vec<Subject> {
        let Some((holder, _)) = inventory_holder(ctx) else {
            return Vec::new();
        };
        open_deliveries(ctx, &holder, origin)
            .map(|(delivery, status)| {
                delivery_subject(
                    ctx,
                    self.kind(),
                    delivery,
                    status,
                    (ActionStatus::InProgress, Stage::Cancel),
                    Requirement::none(),
                )
            })
            .collect()
    }

    fn stack_label(&self) -> &'static str {
        "Outgoing Deliveries"
    }
}

pub struct SurfaceTransferIncoming;

impl ActionRule for SurfaceTransferIncoming {
    rule_identity!(
        SurfaceTransferIncoming,
        Transfer,
        [Ready, InProgress, ReadyToFinish, Finishing, Canceling]
    );

    fn is_visible(&self, ctx: &Context<'_>) -> bool {
        inventory_holder(ctx).is_some_and(|(holder, _)| {
            open_deliveries(ctx, &holder, dest).next().is_some()
        })
    }

    /// Incoming transfers have no primary control, only the stack.
    fn subject(&self, _ctx: &Context<'_>) -> Option<Subject> {
        None
    }

    /// Deliveries en route to the holder plus proposals it can accept.
    fn instances(&self, ctx: &Context<'_>) -> Vec<Subject> {
        let Some((holder, _)) = inventory_holder(ctx) else {
            return Vec::new();
        };
        let requirement = Requirement::none().permission(Permission::AddProducts, holder.clone());
        open_deliveries(ctx, &holder, dest)
            .map(|(delivery, status)| {
                delivery_subject(
                    ctx,
                    self.kind(),
                    delivery,
                    status,
                    (ActionStatus::Ready, Stage::Start),
                    requirement.clone(),
                )
            })
            .collect()
    }

    fn stack_label(&self) -> &'static str {
        "Incoming Deliveries"
    }
}
