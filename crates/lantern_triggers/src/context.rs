//! What a trigger needs from the world it lives in

use lantern_core::MapId;

/// Access to the owning entity and its environment during activation.
///
/// Implemented by the entity layer. The trigger never holds on to a context
/// beyond a single `interact`/`poll` call.
pub trait TriggerContext {
    /// Map id of the trigger entity
    fn trigger_id(&self) -> MapId;

    /// Whether the trigger entity is currently loaded in an environment
    fn is_loaded(&self) -> bool;

    /// Current time in milliseconds
    fn now(&self) -> u64;

    /// Send the trigger message to a target entity.
    ///
    /// Returns `false` if the target doesn't exist in the environment.
    fn deliver(&self, target: MapId, message: &str) -> bool;

    /// Tell the activator why its activation was rejected
    fn reply(&self, activator: MapId, reason: &str);

    /// Remove the trigger entity from its environment
    fn remove_trigger(&self);
}
