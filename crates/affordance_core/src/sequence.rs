//! Sequencing gate.
//!
//! A sequenceable action on a busy crew is offered instead of disabled, tagged
//! with the crew's `ready_at` as its deferred start. The submission layer is
//! responsible for honoring the deferral.

use crate::context::Context;
use crate::reason::DisabledReason;
use crate::Subject;

/// Deferred start for `subject`, given the reason the resolver settled on.
///
/// Only an enabled, sequenceable, readiness-gated action on a busy crew is
/// deferred, so a deferred start never coexists with "crew is busy".
pub fn deferred_start(
    ctx: &Context<'_>,
    subject: &Subject,
    reason: Option<DisabledReason>,
) -> Option<u64> {
    let requirement = &subject.requirement;
    let deferrable = reason.is_none()
        && requirement.ready
        && requirement.sequenceable
        && !ctx.crew_ready();
    deferrable.then_some(ctx.crew.ready_at)
}
