use super::{focus_asteroid, rule_identity};
use crate::context::Context;
use crate::reason::{DisabledReason, Requirement};
use crate::registry::{ActionRule, Registry};
use crate::status::{decode, ActionStatus, SampleStatus, ScanStatus};
use crate::{EntityRef, LotState, Permission, SampleState, Subject};

pub(crate) fn register(registry: &mut Registry) {
    registry.register(NewCoreSample);
    registry.register(ImproveCoreSample);
}

/// Focused lot on a fully scanned asteroid.
fn sampleable_lot<'a>(ctx: &Context<'a>) -> Option<&'a LotState> {
    let lot = ctx.lot()?;
    let asteroid = ctx.asteroid()?;
    let scan = decode::<ScanStatus>(asteroid.scan.status, &asteroid.id)?;
    (scan == ScanStatus::ResourceScanned).then_some(lot)
}

/// The crew's own samples on `lot` with a recognized status.
pub(crate) fn own_samples<'a>(
    ctx: &Context<'a>,
    lot: &'a LotState,
) -> impl Iterator<Item = (&'a SampleState, SampleStatus)> + 'a {
    let crew = &ctx.crew.id;
    ctx.snapshot
        .samples
        .iter()
        .filter(move |sample| sample.lot == lot.id && &sample.owner == crew)
        .filter_map(|sample| Some((sample, decode(sample.status, &sample.id)?)))
}

/// Samples the crew could drill further: finished, not yet improved and not
/// depleted.
fn improvable(sample: &SampleState, status: SampleStatus) -> bool {
    status == SampleStatus::Sampled && !sample.improved && sample.remaining_yield > 0.0
}

fn drilling(ctx: &Context<'_>, lot: &LotState) -> Requirement {
    Requirement::start()
        .permission(Permission::UseLot, EntityRef::Lot(lot.id.clone()))
        .on_asteroid(focus_asteroid(ctx))
        .on_surface()
        .sequenceable()
}

pub struct NewCoreSample;

impl ActionRule for NewCoreSample {
    rule_identity!(NewCoreSample, CoreSample, super::TIMED);

    fn is_visible(&self, ctx: &Context<'_>) -> bool {
        sampleable_lot(ctx).is_some()
    }

    fn subject(&self, ctx: &Context<'_>) -> Option<Subject> {
        let lot = sampleable_lot(ctx)?;
        let target = EntityRef::Lot(lot.id.clone());
        Some(Subject::new(self.kind(), target, ActionStatus::Ready).requires(drilling(ctx, lot)))
    }

    /// Samples still being drilled.
    fn instances(&self, ctx: &Context<'_>) -> Vec<Subject> {
        let Some(lot) = sampleable_lot(ctx) else {
            return Vec::new();
        };
        let target = EntityRef::Lot(lot.id.clone());
        own_samples(ctx, lot)
            .filter(|(_, status)| *status == SampleStatus::Sampling)
            .map(|(sample, _)| {
                let instance = sample.id.0.as_str();
                let progress =
                    ctx.progress(self.kind(), &target, Some(instance), sample.finish_time);
                Subject::new(self.kind(), target.clone(), progress)
                    .instance(instance)
                    .label(format!("{} Sample", sample.resource))
                    .finish_time(sample.finish_time)
            })
            .collect()
    }

    fn stack_label(&self) -> &'static str {
        "Core Samples"
    }
}

pub struct ImproveCoreSample;

impl ActionRule for ImproveCoreSample {
    rule_identity!(ImproveCoreSample, ImproveSample, [Ready]);

    fn is_visible(&self, ctx: &Context<'_>) -> bool {
        sampleable_lot(ctx).is_some()
    }

    fn subject(&self, ctx: &Context<'_>) -> Option<Subject> {
        let lot = sampleable_lot(ctx)?;
        let count = own_samples(ctx, lot)
            .filter(|(sample, status)| improvable(sample, *status))
            .count();
        let target = EntityRef::Lot(lot.id.clone());
        let subject = Subject::new(self.kind(), target, ActionStatus::Ready)
            .requires(drilling(ctx, lot))
            .reason((count == 0).then_some(DisabledReason::NoCoreSample));
        Some(match u32::try_from(count) {
            Ok(badge) if badge > 0 => subject.badge(badge),
            _ => subject,
        })
    }
}
