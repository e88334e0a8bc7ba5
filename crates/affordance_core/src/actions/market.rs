use super::{focus_asteroid, operational, rule_identity};
use crate::context::Context;
use crate::reason::{DisabledReason, Requirement};
use crate::registry::{ActionRule, Registry};
use crate::status::ActionStatus;
use crate::{BuildingKind, BuildingState, EntityRef, Permission, Subject};

pub(crate) fn register(registry: &mut Registry) {
    registry.register(MarketBuy);
    registry.register(MarketSell);
}

fn marketplace<'a>(ctx: &Context<'a>) -> Option<&'a BuildingState> {
    operational(ctx, &[BuildingKind::Marketplace])
}

fn order(ctx: &Context<'_>, market: &BuildingState, permission: Permission) -> Requirement {
    Requirement::start()
        .permission(permission, EntityRef::Building(market.id.clone()))
        .on_asteroid(focus_asteroid(ctx))
}

pub struct MarketBuy;

impl ActionRule for MarketBuy {
    rule_identity!(MarketBuy, Market, [Ready]);

    fn is_visible(&self, ctx: &Context<'_>) -> bool {
        marketplace(ctx).is_some()
    }

    fn subject(&self, ctx: &Context<'_>) -> Option<Subject> {
        let market = marketplace(ctx)?;
        Some(
            Subject::new(
                self.kind(),
                EntityRef::Building(market.id.clone()),
                ActionStatus::Ready,
            )
            .requires(order(ctx, market, Permission::Buy)),
        )
    }
}

pub struct MarketSell;

impl MarketSell {
    /// Goods are sold out of the crew's own ship.
    fn stock_reason(ctx: &Context<'_>) -> Option<DisabledReason> {
        let stocked = ctx
            .ship()
            .filter(|ship| ctx.controls(ship.controller.as_ref()))
            .and_then(|ship| ship.inventory.as_ref())
            .is_some_and(|inventory| !inventory.is_empty());
        (!stocked).then_some(DisabledReason::InventoryEmpty)
    }
}

impl ActionRule for MarketSell {
    rule_identity!(MarketSell, Market, [Ready]);

    fn is_visible(&self, ctx: &Context<'_>) -> bool {
        marketplace(ctx).is_some()
    }

    fn subject(&self, ctx: &Context<'_>) -> Option<Subject> {
        let market = marketplace(ctx)?;
        Some(
            Subject::new(
                self.kind(),
                EntityRef::Building(market.id.clone()),
                ActionStatus::Ready,
            )
            .requires(order(ctx, market, Permission::Sell))
            .reason(Self::stock_reason(ctx)),
        )
    }
}
