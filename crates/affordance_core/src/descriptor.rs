//! Renderable output of the engine.
//!
//! A [`Subject`] is what an action rule hands the engine for one action
//! instance; the engine resolves it into a [`Descriptor`], the only thing the
//! view layer ever sees.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::reason::{DisabledReason, Requirement};
use crate::status::ActionStatus;
use crate::{ActionKind, EntityRef, Stage};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Icon {
    Scan,
    Plan,
    Unplan,
    Construct,
    Deconstruct,
    CoreSample,
    ImproveSample,
    Extract,
    Process,
    Shipyard,
    Transfer,
    Launch,
    Dock,
    Undock,
    SetCourse,
    Emergency,
    Propellant,
    Station,
    Eject,
    Recruit,
    Market,
    Agreement,
}

/// One action instance as classified by its rule, before resolution.
#[derive(Debug, Clone, PartialEq)]
pub struct Subject {
    pub kind: ActionKind,
    pub status: ActionStatus,
    pub target: EntityRef,
    /// Identifies one member of a stackable kind (delivery, sample).
    pub instance: Option<String>,
    pub label: String,
    pub label_addendum: Option<String>,
    pub finish_time: Option<u64>,
    pub badge: Option<u32>,
    pub stage: Stage,
    pub requirement: Requirement,
    /// Kind-specific reason, checked ahead of the generic chain.
    pub domain_reason: Option<DisabledReason>,
}

impl Subject {
    pub fn new(kind: ActionKind, target: EntityRef, status: ActionStatus) -> Self {
        Self {
            kind,
            status,
            target,
            instance: None,
            label: kind.name().to_string(),
            label_addendum: None,
            finish_time: None,
            badge: None,
            stage: default_stage(status),
            requirement: Requirement::none(),
            domain_reason: None,
        }
    }

    #[must_use]
    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    #[must_use]
    pub fn addendum(mut self, addendum: Option<String>) -> Self {
        self.label_addendum = addendum;
        self
    }

    #[must_use]
    pub fn instance(mut self, instance: impl Into<String>) -> Self {
        self.instance = Some(instance.into());
        self
    }

    #[must_use]
    pub fn finish_time(mut self, finish_time: Option<u64>) -> Self {
        self.finish_time = finish_time;
        self
    }

    #[must_use]
    pub fn badge(mut self, badge: u32) -> Self {
        self.badge = Some(badge);
        self
    }

    #[must_use]
    pub fn stage(mut self, stage: Stage) -> Self {
        self.stage = stage;
        self
    }

    #[must_use]
    pub fn requires(mut self, requirement: Requirement) -> Self {
        self.requirement = requirement;
        self
    }

    #[must_use]
    pub fn reason(mut self, reason: Option<DisabledReason>) -> Self {
        self.domain_reason = reason;
        self
    }
}

fn default_stage(status: ActionStatus) -> Stage {
    match status {
        ActionStatus::Unscanned | ActionStatus::Planned | ActionStatus::Ready => Stage::Start,
        ActionStatus::ReadyToFinish => Stage::Finish,
        ActionStatus::InProgress | ActionStatus::Finishing | ActionStatus::Canceling => {
            Stage::Inspect
        }
    }
}

/// What a click on a descriptor asks the submission layer to do.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ActionRequest {
    pub kind: ActionKind,
    pub stage: Stage,
    pub target: EntityRef,
    pub instance: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flags {
    pub disabled: bool,
    /// Pulses in the UI.
    pub attention: bool,
    pub loading: bool,
    pub badge: Option<u32>,
    /// Member count of a stack summary.
    pub tally: Option<usize>,
    pub finish_time: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Descriptor {
    pub kind: ActionKind,
    pub label: String,
    pub label_addendum: Option<String>,
    pub icon: Icon,
    pub status: ActionStatus,
    pub flags: Flags,
    pub disabled_reason: Option<DisabledReason>,
    /// Deferred start for a sequenced action on a busy crew.
    pub scheduled_for: Option<u64>,
    pub on_click: ActionRequest,
}

/// Several concurrent instances of one kind collapsed into one control.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stack {
    pub summary: Descriptor,
    /// Expanded rows, one per instance, in source order.
    pub items: SmallVec<[Descriptor; 4]>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Affordance {
    Action(Descriptor),
    Stack(Box<Stack>),
}

impl Affordance {
    pub fn kind(&self) -> ActionKind {
        self.primary().kind
    }

    /// The control shown in the action bar.
    pub fn primary(&self) -> &Descriptor {
        match self {
            Affordance::Action(descriptor) => descriptor,
            Affordance::Stack(stack) => &stack.summary,
        }
    }
}
