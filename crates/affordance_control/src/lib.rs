//! Caller-side state around the affordance engine: which row of a stack a
//! click lands on, and how a clicked request leaves for submission.
//!
//! The engine is pure. Anything that survives between evaluation passes
//! (stack rotation, request numbering) lives here.

use ahash::AHashMap;
use serde::{Deserialize, Serialize};

use affordance_core::{
    next_index, ActionKind, ActionRequest, Affordance, CrewId, Descriptor, DisabledReason, Stage,
    Stack,
};

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RequestId(pub String);

/// A clicked request ready for the submission layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionEnvelope {
    pub id: RequestId,
    pub issued_by: CrewId,
    pub issued_at: u64,
    /// Deferred start for a sequenced action, otherwise `issued_at`.
    pub execute_at: u64,
    pub request: ActionRequest,
}

/// Receives envelopes for submission. Execution is out of scope here.
pub trait Dispatcher {
    fn dispatch(&mut self, envelope: ActionEnvelope);
}

/// Keeps every dispatched envelope in order.
#[derive(Debug, Default)]
pub struct RecordingDispatcher {
    pub sent: Vec<ActionEnvelope>,
}

impl Dispatcher for RecordingDispatcher {
    fn dispatch(&mut self, envelope: ActionEnvelope) {
        self.sent.push(envelope);
    }
}

/// Last stack row clicked for one action kind.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StackRotation {
    pub last_index: Option<usize>,
}

impl StackRotation {
    /// Move to the next row of a stack with `len` rows and return it.
    pub fn advance(&mut self, len: usize) -> usize {
        let index = next_index(len, self.last_index);
        self.last_index = Some(index);
        index
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClickOutcome {
    Dispatched(ActionEnvelope),
    /// Disabled control; nothing was sent.
    Refused(DisabledReason),
    /// In-flight action; the click opens its details instead of submitting.
    Inspected(ActionRequest),
    /// No such control in the current pass.
    Missing,
}

/// The action bar for one crew, refreshed every evaluation pass.
pub struct ActionPanel {
    crew: CrewId,
    now: u64,
    affordances: Vec<Affordance>,
    rotations: AHashMap<ActionKind, StackRotation>,
    next_request_id: u64,
}

impl ActionPanel {
    pub fn new(crew: CrewId) -> Self {
        Self {
            crew,
            now: 0,
            affordances: Vec::new(),
            rotations: AHashMap::default(),
            next_request_id: 0,
        }
    }

    /// Replace the controls with a fresh evaluation taken at `now`.
    ///
    /// Rotation survives for kinds that are still stacked and resets for
    /// kinds whose stack disappeared.
    pub fn refresh(&mut self, now: u64, affordances: Vec<Affordance>) {
        self.now = now;
        self.affordances = affordances;
        let stacked: Vec<ActionKind> = self
            .affordances
            .iter()
            .filter(|affordance| matches!(affordance, Affordance::Stack(_)))
            .map(Affordance::kind)
            .collect();
        self.rotations.retain(|kind, _| stacked.contains(kind));
    }

    pub fn affordances(&self) -> &[Affordance] {
        &self.affordances
    }

    pub fn rotation(&self, kind: ActionKind) -> StackRotation {
        self.rotations.get(&kind).copied().unwrap_or_default()
    }

    /// Click the control of `kind` in the bar. A kind with a primary control
    /// clicks that; a stack-only kind clicks its summary.
    pub fn click(&mut self, kind: ActionKind, dispatcher: &mut dyn Dispatcher) -> ClickOutcome {
        let first = self
            .affordances
            .iter()
            .find(|affordance| affordance.kind() == kind)
            .cloned();
        match first {
            Some(Affordance::Action(descriptor)) => self.submit(&descriptor, dispatcher),
            Some(Affordance::Stack(stack)) => self.click_summary(&stack, dispatcher),
            None => ClickOutcome::Missing,
        }
    }

    /// Click the stack summary of `kind`: lands on the next row in rotation.
    pub fn click_stack(
        &mut self,
        kind: ActionKind,
        dispatcher: &mut dyn Dispatcher,
    ) -> ClickOutcome {
        match self.stack(kind).cloned() {
            Some(stack) => self.click_summary(&stack, dispatcher),
            None => ClickOutcome::Missing,
        }
    }

    /// Click instance row `index` of `kind`: a row of its expanded stack, or
    /// its lone instance when only one is in flight. Rotation is left alone.
    pub fn click_item(
        &mut self,
        kind: ActionKind,
        index: usize,
        dispatcher: &mut dyn Dispatcher,
    ) -> ClickOutcome {
        let item = self
            .affordances
            .iter()
            .filter(|affordance| affordance.kind() == kind)
            .find_map(|affordance| match affordance {
                Affordance::Stack(stack) => stack.items.get(index),
                Affordance::Action(descriptor)
                    if index == 0 && descriptor.on_click.instance.is_some() =>
                {
                    Some(descriptor)
                }
                Affordance::Action(_) => None,
            })
            .cloned();
        match item {
            Some(descriptor) => self.submit(&descriptor, dispatcher),
            None => ClickOutcome::Missing,
        }
    }

    fn stack(&self, kind: ActionKind) -> Option<&Stack> {
        self.affordances.iter().find_map(|affordance| match affordance {
            Affordance::Stack(stack) if stack.summary.kind == kind => Some(stack.as_ref()),
            _ => None,
        })
    }

    /// A disabled row is refused with its own reason; the rotation still
    /// moves past it.
    fn click_summary(&mut self, stack: &Stack, dispatcher: &mut dyn Dispatcher) -> ClickOutcome {
        let index = self
            .rotations
            .entry(stack.summary.kind)
            .or_default()
            .advance(stack.items.len());
        match stack.items.get(index) {
            Some(item) => self.submit(item, dispatcher),
            None => ClickOutcome::Missing,
        }
    }

    fn submit(&mut self, descriptor: &Descriptor, dispatcher: &mut dyn Dispatcher) -> ClickOutcome {
        if let Some(reason) = descriptor.disabled_reason {
            return ClickOutcome::Refused(reason);
        }
        if descriptor.on_click.stage == Stage::Inspect {
            return ClickOutcome::Inspected(descriptor.on_click.clone());
        }
        let envelope = ActionEnvelope {
            id: RequestId(format!("req_{:06}", self.next_request_id)),
            issued_by: self.crew.clone(),
            issued_at: self.now,
            execute_at: descriptor.scheduled_for.unwrap_or(self.now),
            request: descriptor.on_click.clone(),
        };
        self.next_request_id += 1;
        tracing::info!(
            id = %envelope.id.0,
            kind = %envelope.request.kind,
            stage = ?envelope.request.stage,
            target = %envelope.request.target,
            execute_at = envelope.execute_at,
            "dispatching action"
        );
        dispatcher.dispatch(envelope.clone());
        ClickOutcome::Dispatched(envelope)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use affordance_core::test_fixtures::{base_rules, base_snapshot, crew_id, sample};
    use affordance_core::{evaluate_snapshot, Registry, Snapshot, SnapshotPermissions};

    fn panel_for(snapshot: &Snapshot) -> ActionPanel {
        let mut panel = ActionPanel::new(crew_id());
        panel.refresh(snapshot.now, evaluate(snapshot));
        panel
    }

    fn evaluate(snapshot: &Snapshot) -> Vec<Affordance> {
        let oracle = SnapshotPermissions::new(snapshot);
        evaluate_snapshot(&Registry::standard(), snapshot, &base_rules(), &oracle)
    }

    /// Three samples being drilled; the first two are done at 10_000.
    fn drilling_snapshot() -> Snapshot {
        let mut snapshot = base_snapshot();
        snapshot.samples = vec![
            sample("sample_0001", 1, Some(9_000)),
            sample("sample_0002", 1, Some(9_500)),
            sample("sample_0003", 1, Some(12_000)),
        ];
        snapshot
    }

    #[test]
    fn rotation_starts_at_zero_and_wraps() {
        let mut rotation = StackRotation::default();
        let visited: Vec<usize> = (0..4).map(|_| rotation.advance(3)).collect();
        assert_eq!(visited, vec![0, 1, 2, 0]);
        assert_eq!(rotation.last_index, Some(0));
    }

    #[test]
    fn enabled_click_dispatches_with_now() {
        let snapshot = base_snapshot();
        let mut panel = panel_for(&snapshot);
        let mut dispatcher = RecordingDispatcher::default();

        let outcome = panel.click(ActionKind::Extract, &mut dispatcher);
        let ClickOutcome::Dispatched(envelope) = outcome else {
            panic!("expected dispatch, got {outcome:?}");
        };
        assert_eq!(envelope.id, RequestId("req_000000".to_string()));
        assert_eq!(envelope.execute_at, snapshot.now);
        assert_eq!(envelope.request.stage, Stage::Start);
        assert_eq!(dispatcher.sent, vec![envelope]);
    }

    #[test]
    fn disabled_click_is_refused_with_its_reason() {
        let mut snapshot = base_snapshot();
        snapshot.samples.clear();
        let mut panel = panel_for(&snapshot);
        let mut dispatcher = RecordingDispatcher::default();

        assert_eq!(
            panel.click(ActionKind::Extract, &mut dispatcher),
            ClickOutcome::Refused(DisabledReason::NoCoreSample)
        );
        assert!(dispatcher.sent.is_empty());
    }

    #[test]
    fn missing_kind_sends_nothing() {
        let mut panel = panel_for(&base_snapshot());
        let mut dispatcher = RecordingDispatcher::default();
        assert_eq!(
            panel.click(ActionKind::MarketBuy, &mut dispatcher),
            ClickOutcome::Missing
        );
    }

    #[test]
    fn stack_clicks_walk_every_row() {
        let snapshot = drilling_snapshot();
        let mut panel = panel_for(&snapshot);
        let mut dispatcher = RecordingDispatcher::default();

        let first = panel.click_stack(ActionKind::NewCoreSample, &mut dispatcher);
        let second = panel.click_stack(ActionKind::NewCoreSample, &mut dispatcher);
        let third = panel.click_stack(ActionKind::NewCoreSample, &mut dispatcher);
        let fourth = panel.click_stack(ActionKind::NewCoreSample, &mut dispatcher);

        let instances: Vec<Option<String>> = dispatcher
            .sent
            .iter()
            .map(|envelope| envelope.request.instance.clone())
            .collect();
        assert_eq!(
            instances,
            vec![
                Some("sample_0001".to_string()),
                Some("sample_0002".to_string()),
                Some("sample_0001".to_string()),
            ]
        );
        assert!(matches!(first, ClickOutcome::Dispatched(_)));
        assert!(matches!(second, ClickOutcome::Dispatched(_)));
        assert!(matches!(third, ClickOutcome::Inspected(_)));
        assert!(matches!(fourth, ClickOutcome::Dispatched(_)));
    }

    #[test]
    fn click_item_leaves_rotation_alone() {
        let snapshot = drilling_snapshot();
        let mut panel = panel_for(&snapshot);
        let mut dispatcher = RecordingDispatcher::default();

        let outcome = panel.click_item(ActionKind::NewCoreSample, 1, &mut dispatcher);
        assert!(matches!(outcome, ClickOutcome::Dispatched(_)));
        assert_eq!(
            panel.rotation(ActionKind::NewCoreSample),
            StackRotation::default()
        );
        assert_eq!(
            panel.click_item(ActionKind::NewCoreSample, 7, &mut dispatcher),
            ClickOutcome::Missing
        );
    }

    #[test]
    fn rotation_resets_when_the_stack_goes_away() {
        let snapshot = drilling_snapshot();
        let mut panel = panel_for(&snapshot);
        let mut dispatcher = RecordingDispatcher::default();
        panel.click_stack(ActionKind::NewCoreSample, &mut dispatcher);
        assert_eq!(panel.rotation(ActionKind::NewCoreSample).last_index, Some(0));

        panel.refresh(snapshot.now, evaluate(&snapshot));
        assert_eq!(panel.rotation(ActionKind::NewCoreSample).last_index, Some(0));

        let settled = base_snapshot();
        panel.refresh(settled.now, evaluate(&settled));
        assert_eq!(
            panel.rotation(ActionKind::NewCoreSample),
            StackRotation::default()
        );
    }

    #[test]
    fn busy_crew_envelope_executes_later() {
        let mut snapshot = base_snapshot();
        snapshot.crew.as_mut().unwrap().ready_at = 11_000;
        let mut panel = panel_for(&snapshot);
        let mut dispatcher = RecordingDispatcher::default();

        let ClickOutcome::Dispatched(envelope) = panel.click(ActionKind::Extract, &mut dispatcher)
        else {
            panic!("sequenced extraction should dispatch");
        };
        assert_eq!(envelope.issued_at, 10_000);
        assert_eq!(envelope.execute_at, 11_000);
    }

    #[test]
    fn request_ids_are_sequential() {
        let mut panel = panel_for(&base_snapshot());
        let mut dispatcher = RecordingDispatcher::default();
        panel.click(ActionKind::Extract, &mut dispatcher);
        panel.click(ActionKind::Extract, &mut dispatcher);
        let ids: Vec<&str> = dispatcher
            .sent
            .iter()
            .map(|envelope| envelope.id.0.as_str())
            .collect();
        assert_eq!(ids, vec!["req_000000", "req_000001"]);
    }
}
