use super::rule_identity;
use crate::context::Context;
use crate::reason::Requirement;
use crate::registry::{ActionRule, Registry};
use crate::status::{decode, ActionStatus, ScanStatus};
use crate::{ActionKind, AsteroidState, EntityRef, Subject};

pub(crate) fn register(registry: &mut Registry) {
    registry.register(ScanSurface);
    registry.register(ScanResources);
}

/// Scan stage the asteroid is in, for a crew that controls it.
fn controlled_scan<'a>(ctx: &Context<'a>) -> Option<(&'a AsteroidState, ScanStatus)> {
    let asteroid = ctx.asteroid()?;
    if !ctx.controls(asteroid.controller.as_ref()) {
        return None;
    }
    let status = decode(asteroid.scan.status, &asteroid.id)?;
    Some((asteroid, status))
}

/// Subject for one scan pass: `idle` is the code at which it can be started,
/// `running` the code while it is underway.
fn scan_subject(
    ctx: &Context<'_>,
    kind: ActionKind,
    idle: ScanStatus,
    running: ScanStatus,
) -> Option<Subject> {
    let (asteroid, status) = controlled_scan(ctx)?;
    let target = EntityRef::Asteroid(asteroid.id.clone());

    if status == idle {
        let pre_stage = if idle == ScanStatus::Unscanned {
            ActionStatus::Unscanned
        } else {
            ActionStatus::Ready
        };
        let requirement = Requirement::start()
            .on_asteroid(Some(&asteroid.id))
            .sequenceable();
        return Some(Subject::new(kind, target, pre_stage).requires(requirement));
    }
    if status == running {
        let finish_time = asteroid.scan.finish_time;
        let progress = ctx.progress(kind, &target, None, finish_time);
        return Some(
            Subject::new(kind, target, progress)
                .label(format!("{} (scanning)", kind.name()))
                .finish_time(finish_time),
        );
    }
    None
}

pub struct ScanSurface;

impl ActionRule for ScanSurface {
    rule_identity!(
        ScanSurface,
        Scan,
        [Unscanned, InProgress, ReadyToFinish, Finishing, Canceling]
    );

    fn is_visible(&self, ctx: &Context<'_>) -> bool {
        controlled_scan(ctx).is_some_and(|(_, status)| {
            matches!(status, ScanStatus::Unscanned | ScanStatus::SurfaceScanning)
        })
    }

    fn subject(&self, ctx: &Context<'_>) -> Option<Subject> {
        scan_subject(
            ctx,
            self.kind(),
            ScanStatus::Unscanned,
            ScanStatus::SurfaceScanning,
        )
    }
}

pub struct ScanResources;

impl ActionRule for ScanResources {
    rule_identity!(ScanResources, Scan, super::TIMED);

    fn is_visible(&self, ctx: &Context<'_>) -> bool {
        controlled_scan(ctx).is_some_and(|(_, status)| {
            matches!(
                status,
                ScanStatus::SurfaceScanned | ScanStatus::ResourceScanning
            )
        })
    }

    fn subject(&self, ctx: &Context<'_>) -> Option<Subject> {
        scan_subject(
            ctx,
            self.kind(),
            ScanStatus::SurfaceScanned,
            ScanStatus::ResourceScanning,
        )
    }
}
