//! Status state machines.
//!
//! Domain status codes arrive as raw numbers from the entity providers and are
//! decoded per category. Decoding is the fail-closed point: a code outside the
//! known set yields `None`, is logged, and the affected action is not shown.
//! `ActionStatus` is the small closed set of UI states every category folds into.

use std::fmt;

use serde::{Deserialize, Serialize};

/// UI lifecycle state of one action instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ActionStatus {
    /// Pre-stage: the target has never been scanned.
    Unscanned,
    /// Pre-stage: a building site exists but construction has not started.
    Planned,
    Ready,
    InProgress,
    ReadyToFinish,
    Finishing,
    Canceling,
}

impl ActionStatus {
    /// Position along the forward lifecycle. Pre-stages share rank 0 with
    /// `Ready`; `Canceling` sits outside the forward path.
    pub fn rank(self) -> Option<u8> {
        match self {
            ActionStatus::Unscanned | ActionStatus::Planned | ActionStatus::Ready => Some(0),
            ActionStatus::InProgress => Some(1),
            ActionStatus::ReadyToFinish => Some(2),
            ActionStatus::Finishing => Some(3),
            ActionStatus::Canceling => None,
        }
    }

    /// True for the states in which finalization is underway.
    pub fn in_flight(self) -> bool {
        matches!(self, ActionStatus::Finishing | ActionStatus::Canceling)
    }
}

impl fmt::Display for ActionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            ActionStatus::Unscanned => "unscanned",
            ActionStatus::Planned => "planned",
            ActionStatus::Ready => "ready",
            ActionStatus::InProgress => "in progress",
            ActionStatus::ReadyToFinish => "ready to finish",
            ActionStatus::Finishing => "finishing",
            ActionStatus::Canceling => "canceling",
        };
        f.pad(text)
    }
}

/// Classify a running timed action against the snapshot clock.
///
/// A running action without a known finish time stays `InProgress`.
pub fn timed(now: u64, finish_time: Option<u64>) -> ActionStatus {
    match finish_time {
        Some(finish) if now >= finish => ActionStatus::ReadyToFinish,
        _ => ActionStatus::InProgress,
    }
}

// ---------------------------------------------------------------------------
// Domain status codes
// ---------------------------------------------------------------------------

/// A numeric domain status enumeration owned by one entity category.
pub trait DomainStatus: Sized + Copy {
    const CATEGORY: &'static str;

    fn from_code(code: u8) -> Option<Self>;
}

macro_rules! domain_status {
    ($name:ident, $category:literal { $($variant:ident = $code:literal),+ $(,)? }) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum $name {
            $($variant),+
        }

        impl DomainStatus for $name {
            const CATEGORY: &'static str = $category;

            fn from_code(code: u8) -> Option<Self> {
                match code {
                    $($code => Some($name::$variant),)+
                    _ => None,
                }
            }
        }
    };
}

domain_status!(ScanStatus, "scan" {
    Unscanned = 0,
    SurfaceScanning = 1,
    SurfaceScanned = 2,
    ResourceScanning = 3,
    ResourceScanned = 4,
});

domain_status!(ConstructionStatus, "construction" {
    Unplanned = 0,
    Planned = 1,
    UnderConstruction = 2,
    Operational = 3,
});

domain_status!(SlotStatus, "process slot" {
    Idle = 0,
    Running = 1,
});

domain_status!(DeliveryStatus, "delivery" {
    Packaged = 0,
    Sent = 1,
    Complete = 2,
    Cancelled = 3,
});

domain_status!(SampleStatus, "core sample" {
    Undisturbed = 0,
    Sampling = 1,
    Sampled = 2,
    Used = 3,
});

domain_status!(ShipStatus, "ship" {
    UnderConstruction = 0,
    Available = 1,
    Disabled = 2,
});

/// Decode a domain status code, logging codes outside the known set.
pub fn decode<S: DomainStatus>(code: u8, owner: &dyn fmt::Display) -> Option<S> {
    let status = S::from_code(code);
    if status.is_none() {
        tracing::warn!(
            category = S::CATEGORY,
            code,
            %owner,
            "unrecognized domain status; hiding dependent actions"
        );
    }
    status
}
