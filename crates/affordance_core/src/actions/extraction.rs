use super::processing::{slot_building, slot_subject};
use super::rule_identity;
use super::sampling::own_samples;
use crate::context::Context;
use crate::reason::DisabledReason;
use crate::registry::{ActionRule, Registry};
use crate::status::SampleStatus;
use crate::{BuildingKind, Permission, Subject};

pub(crate) fn register(registry: &mut Registry) {
    registry.register(Extract);
}

pub struct Extract;

impl Extract {
    /// Extraction draws down one of the crew's finished samples on the lot.
    fn sample_reason(ctx: &Context<'_>) -> Option<DisabledReason> {
        let Some(lot) = ctx.lot() else {
            return Some(DisabledReason::NoCoreSample);
        };
        let usable = own_samples(ctx, lot).any(|(sample, status)| {
            status == SampleStatus::Sampled && sample.remaining_yield > 0.0
        });
        (!usable).then_some(DisabledReason::NoCoreSample)
    }
}

impl ActionRule for Extract {
    rule_identity!(Extract, Extract, super::TIMED);

    fn is_visible(&self, ctx: &Context<'_>) -> bool {
        slot_building(ctx, &[BuildingKind::Extractor]).is_some()
    }

    fn subject(&self, ctx: &Context<'_>) -> Option<Subject> {
        let (building, status) = slot_building(ctx, &[BuildingKind::Extractor])?;
        slot_subject(
            ctx,
            self.kind(),
            building,
            status,
            Permission::ExtractResources,
            Self::sample_reason(ctx),
        )
    }
}
