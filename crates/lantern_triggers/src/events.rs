//! Trigger events

use lantern_core::MapId;
use serde::{Deserialize, Serialize};

/// Snapshot of an activation or deactivation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TriggerEvent {
    /// The trigger entity
    pub trigger: MapId,
    /// The entity that (de)activated the trigger
    pub activator: MapId,
    /// Entities that receive the trigger message
    pub targets: Vec<MapId>,
    /// The trigger message
    pub message: String,
}

impl TriggerEvent {
    pub fn new(trigger: MapId, activator: MapId, targets: Vec<MapId>, message: impl Into<String>) -> Self {
        Self {
            trigger,
            activator,
            targets,
            message: message.into(),
        }
    }
}

/// Called after a successful activation
pub type TriggerActivatedListener = dyn Fn(&TriggerEvent) + Send + Sync;

/// Called when an activator leaves a collision trigger
pub type TriggerDeactivatedListener = dyn Fn(&TriggerEvent) + Send + Sync;

/// Veto predicate consulted before activation.
///
/// Returning a non-empty reason rejects the activation. The reason is sent
/// back to the activator as a message.
pub type TriggerActivatingCondition = dyn Fn(&TriggerEvent) -> Option<String> + Send + Sync;

/// Combined listener for all trigger events
pub trait TriggerListener: Send + Sync {
    fn activated(&self, _event: &TriggerEvent) {}

    fn deactivated(&self, _event: &TriggerEvent) {}

    fn can_activate(&self, _event: &TriggerEvent) -> Option<String> {
        None
    }
}
