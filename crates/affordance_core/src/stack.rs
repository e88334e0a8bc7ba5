//! Stack aggregator.
//!
//! Collapses several concurrent instances of one action kind into a single
//! affordance. A singleton is passed through untouched; two or more become a
//! summary plus the expanded rows.

use smallvec::SmallVec;

use crate::descriptor::{Affordance, Descriptor, Flags, Stack};
use crate::status::ActionStatus;

/// Aggregate resolved instance descriptors. Returns `None` for an empty list.
pub fn aggregate(label: &str, items: Vec<Descriptor>) -> Option<Affordance> {
    match items.len() {
        0 => None,
        1 => items.into_iter().next().map(Affordance::Action),
        _ => {
            let items: SmallVec<[Descriptor; 4]> = items.into_iter().collect();
            let summary = summarize(label, &items);
            Some(Affordance::Stack(Box::new(Stack { summary, items })))
        }
    }
}

/// Summary descriptor for two or more members. Members disagree on finish
/// time, so the summary carries none.
fn summarize(label: &str, items: &[Descriptor]) -> Descriptor {
    let first = &items[0];
    let count = items.len();
    let statuses: Vec<ActionStatus> = items.iter().map(|d| d.status).collect();
    let status = combined_status(&statuses);
    let attention = items
        .iter()
        .any(|d| d.status == ActionStatus::ReadyToFinish || d.flags.finish_time.is_none());

    Descriptor {
        kind: first.kind,
        label: label.to_string(),
        label_addendum: Some(format!("{count} pending")),
        icon: first.icon,
        status,
        flags: Flags {
            disabled: items.iter().all(|d| d.flags.disabled),
            attention,
            loading: items.iter().all(|d| d.flags.loading),
            badge: None,
            tally: Some(count),
            finish_time: None,
        },
        disabled_reason: None,
        scheduled_for: None,
        on_click: first.on_click.clone(),
    }
}

/// Status a summary shows for two or more members: `ReadyToFinish` if any
/// member is, `Finishing` if all are, else `InProgress`.
pub(crate) fn combined_status(statuses: &[ActionStatus]) -> ActionStatus {
    if statuses.contains(&ActionStatus::ReadyToFinish) {
        ActionStatus::ReadyToFinish
    } else if statuses.iter().all(|status| *status == ActionStatus::Finishing) {
        ActionStatus::Finishing
    } else {
        ActionStatus::InProgress
    }
}

/// Next member to route a summary click to: the first on the initial click,
/// then round-robin.
pub fn next_index(len: usize, last_index: Option<usize>) -> usize {
    if len == 0 {
        return 0;
    }
    last_index.map_or(0, |last| (last + 1) % len)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::{ActionRequest, Icon};
    use crate::{ActionKind, BuildingId, EntityRef, Stage};

    fn delivery(id: &str, status: ActionStatus, finish_time: Option<u64>) -> Descriptor {
        Descriptor {
            kind: ActionKind::SurfaceTransferIncoming,
            label: format!("Delivery {id}"),
            label_addendum: None,
            icon: Icon::Transfer,
            status,
            flags: Flags {
                finish_time,
                attention: status == ActionStatus::ReadyToFinish,
                ..Flags::default()
            },
            disabled_reason: None,
            scheduled_for: None,
            on_click: ActionRequest {
                kind: ActionKind::SurfaceTransferIncoming,
                stage: Stage::Finish,
                target: EntityRef::Building(BuildingId("building_0001".to_string())),
                instance: Some(id.to_string()),
            },
        }
    }

    #[test]
    fn empty_list_aggregates_to_nothing() {
        assert_eq!(aggregate("Deliveries", vec![]), None);
    }

    #[test]
    fn singleton_passes_through() {
        let item = delivery("d1", ActionStatus::InProgress, Some(100));
        assert_eq!(
            aggregate("Deliveries", vec![item.clone()]),
            Some(Affordance::Action(item))
        );
    }

    #[test]
    fn summary_counts_members_and_drops_finish_time() {
        let items = vec![
            delivery("d1", ActionStatus::InProgress, Some(100)),
            delivery("d2", ActionStatus::InProgress, Some(200)),
        ];
        let Some(Affordance::Stack(stack)) = aggregate("Deliveries", items) else {
            panic!("two members should stack");
        };
        assert_eq!(stack.summary.flags.tally, Some(2));
        assert_eq!(stack.summary.flags.finish_time, None);
        assert_eq!(stack.summary.status, ActionStatus::InProgress);
        assert!(!stack.summary.flags.attention);
        assert_eq!(stack.items.len(), 2);
    }

    #[test]
    fn member_without_finish_time_draws_attention() {
        let items = vec![
            delivery("d1", ActionStatus::InProgress, Some(100)),
            delivery("d2", ActionStatus::Ready, None),
        ];
        let stacked = aggregate("Deliveries", items).unwrap();
        assert!(stacked.primary().flags.attention);
    }

    #[test]
    fn next_index_cycles_round_robin() {
        assert_eq!(next_index(3, None), 0);
        assert_eq!(next_index(3, Some(0)), 1);
        assert_eq!(next_index(3, Some(2)), 0);
        // A shrunken stack wraps instead of indexing past the end.
        assert_eq!(next_index(2, Some(4)), 1);
        assert_eq!(next_index(0, Some(1)), 0);
    }
}
