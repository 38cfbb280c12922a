//! Trigger component

use crate::context::TriggerContext;
use crate::events::{
    TriggerActivatedListener, TriggerActivatingCondition, TriggerDeactivatedListener,
    TriggerEvent, TriggerListener,
};
use crate::filter::ActivatorFilter;
use core::fmt;
use core::str::FromStr;
use lantern_core::{ListenerId, Listeners, MapId, ParseEnumError};
use parking_lot::{Mutex, RwLock};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::Arc;

/// How a trigger gets activated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum TriggerActivation {
    /// Activated by entities overlapping the trigger's collision box
    #[default]
    Collision,
    /// Activated explicitly through [`TriggerComponent::interact`]
    Interact,
}

impl TriggerActivation {
    pub const fn name(self) -> &'static str {
        match self {
            Self::Collision => "COLLISION",
            Self::Interact => "INTERACT",
        }
    }
}

impl FromStr for TriggerActivation {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            v if v.eq_ignore_ascii_case("collision") => Ok(Self::Collision),
            v if v.eq_ignore_ascii_case("interact") => Ok(Self::Interact),
            _ => Err(ParseEnumError::new("TriggerActivation", s)),
        }
    }
}

impl fmt::Display for TriggerActivation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Trigger configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TriggerInfo {
    pub activation: TriggerActivation,
    /// Message sent to every target on activation
    pub message: String,
    /// Whether the trigger removes itself after the first activation
    pub one_shot: bool,
    /// Minimum time between two activations in milliseconds (0 = none)
    pub cooldown: u64,
    pub activators: ActivatorFilter,
    /// Explicit message targets. When empty, the activator is the target.
    pub targets: Vec<MapId>,
}

impl TriggerInfo {
    pub fn new(activation: TriggerActivation, message: impl Into<String>) -> Self {
        Self {
            activation,
            message: message.into(),
            ..Default::default()
        }
    }
}

/// Runtime activation state
#[derive(Debug, Default)]
struct TriggerState {
    activated: bool,
    last_activation: Option<u64>,
    /// Activators currently overlapping a collision trigger
    in_contact: HashSet<MapId>,
}

/// Activation state machine of a trigger entity
pub struct TriggerComponent {
    info: RwLock<TriggerInfo>,
    state: Mutex<TriggerState>,
    activated_listeners: Listeners<TriggerActivatedListener>,
    deactivated_listeners: Listeners<TriggerDeactivatedListener>,
    activating_conditions: Listeners<TriggerActivatingCondition>,
}

impl TriggerComponent {
    /// Create a new trigger
    pub fn new(info: TriggerInfo) -> Self {
        Self {
            info: RwLock::new(info),
            state: Mutex::new(TriggerState::default()),
            activated_listeners: Listeners::new(),
            deactivated_listeners: Listeners::new(),
            activating_conditions: Listeners::new(),
        }
    }

    /// Make the trigger one-shot
    pub fn with_one_shot(self) -> Self {
        self.info.write().one_shot = true;
        self
    }

    /// Set cooldown in milliseconds
    pub fn with_cooldown(self, cooldown: u64) -> Self {
        self.set_cooldown(cooldown);
        self
    }

    /// Add an explicit message target
    pub fn with_target(self, target: MapId) -> Self {
        self.add_target(target);
        self
    }

    /// Restrict activation to the given entity (can be repeated)
    pub fn with_activator(self, activator: MapId) -> Self {
        self.add_activator(activator);
        self
    }

    // ==== Configuration ====

    pub fn info(&self) -> TriggerInfo {
        self.info.read().clone()
    }

    pub fn activation(&self) -> TriggerActivation {
        self.info.read().activation
    }

    pub fn message(&self) -> String {
        self.info.read().message.clone()
    }

    pub fn set_message(&self, message: impl Into<String>) {
        self.info.write().message = message.into();
    }

    pub fn is_one_shot(&self) -> bool {
        self.info.read().one_shot
    }

    pub fn cooldown(&self) -> u64 {
        self.info.read().cooldown
    }

    pub fn set_cooldown(&self, cooldown: u64) {
        self.info.write().cooldown = cooldown;
    }

    pub fn activators(&self) -> Vec<MapId> {
        self.info.read().activators.activators().to_vec()
    }

    pub fn add_activator(&self, activator: MapId) {
        self.info.write().activators.add(activator);
    }

    pub fn targets(&self) -> Vec<MapId> {
        self.info.read().targets.clone()
    }

    pub fn add_target(&self, target: MapId) {
        self.info.write().targets.push(target);
    }

    /// Check the activator allow-list
    pub fn allows(&self, activator: MapId) -> bool {
        self.info.read().activators.allows(activator)
    }

    // ==== State ====

    pub fn is_activated(&self) -> bool {
        self.state.lock().activated
    }

    /// Timestamp of the last successful activation
    pub fn last_activation(&self) -> Option<u64> {
        self.state.lock().last_activation
    }

    /// Activators currently in contact with a collision trigger
    pub fn in_contact(&self) -> Vec<MapId> {
        self.state.lock().in_contact.iter().copied().collect()
    }

    /// Forget all activation state
    pub fn reset(&self) {
        *self.state.lock() = TriggerState::default();
    }

    // ==== Listeners ====

    pub fn on_activated<F>(&self, f: F) -> ListenerId
    where
        F: Fn(&TriggerEvent) + Send + Sync + 'static,
    {
        self.activated_listeners.add(Arc::new(f))
    }

    pub fn on_deactivated<F>(&self, f: F) -> ListenerId
    where
        F: Fn(&TriggerEvent) + Send + Sync + 'static,
    {
        self.deactivated_listeners.add(Arc::new(f))
    }

    /// Register a veto condition
    pub fn on_activating<F>(&self, f: F) -> ListenerId
    where
        F: Fn(&TriggerEvent) -> Option<String> + Send + Sync + 'static,
    {
        self.activating_conditions.add(Arc::new(f))
    }

    /// Register a listener for activation, deactivation and veto at once
    pub fn add_trigger_listener(&self, listener: Arc<dyn TriggerListener>) -> ListenerId {
        let id = ListenerId::next();
        let l = listener.clone();
        self.activated_listeners
            .add_with_id(id, Arc::new(move |e: &TriggerEvent| l.activated(e)));
        let l = listener.clone();
        self.deactivated_listeners
            .add_with_id(id, Arc::new(move |e: &TriggerEvent| l.deactivated(e)));
        self.activating_conditions
            .add_with_id(id, Arc::new(move |e: &TriggerEvent| listener.can_activate(e)));
        id
    }

    /// Remove any listener or condition registered on this trigger
    pub fn remove_listener(&self, id: ListenerId) -> bool {
        let a = self.activated_listeners.remove(id);
        let d = self.deactivated_listeners.remove(id);
        let c = self.activating_conditions.remove(id);
        a || d || c
    }

    // ==== Activation ====

    /// Activate an interaction trigger on behalf of `activator`.
    ///
    /// Collision triggers ignore interactions.
    pub fn interact(&self, activator: MapId, ctx: &dyn TriggerContext) -> bool {
        if self.activation() != TriggerActivation::Interact {
            return false;
        }

        if !self.allows(activator) {
            log::debug!(
                "{} tried to activate trigger {} but is not on its list of activators",
                activator,
                ctx.trigger_id()
            );
            return false;
        }

        self.activate(activator, ctx)
    }

    /// Update a collision trigger with the entities currently overlapping it.
    ///
    /// New contacts try to activate the trigger; contacts that left fire a
    /// deactivation event.
    pub fn poll(&self, overlapping: &[MapId], ctx: &dyn TriggerContext) {
        if self.activation() != TriggerActivation::Collision || !ctx.is_loaded() {
            return;
        }

        let overlapping: Vec<MapId> = {
            let info = self.info.read();
            overlapping
                .iter()
                .copied()
                .filter(|id| info.activators.allows(*id))
                .collect()
        };

        for activator in &overlapping {
            if self.state.lock().in_contact.contains(activator) {
                continue;
            }

            self.activate(*activator, ctx);
        }

        // listeners may touch the contact set, so sweep a copy
        let in_contact = self.in_contact();
        for departed in in_contact {
            if overlapping.contains(&departed) {
                continue;
            }

            let mut targets = self.targets();
            if targets.is_empty() {
                targets.push(departed);
            }

            let event = TriggerEvent::new(ctx.trigger_id(), departed, targets, self.message());
            for listener in self.deactivated_listeners.snapshot() {
                listener(&event);
            }

            self.state.lock().in_contact.remove(&departed);
        }
    }

    fn activate(&self, activator: MapId, ctx: &dyn TriggerContext) -> bool {
        if !ctx.is_loaded() {
            return false;
        }

        let info = self.info();
        {
            let state = self.state.lock();
            if info.one_shot && state.activated {
                return false;
            }

            if info.activation == TriggerActivation::Collision
                && state.in_contact.contains(&activator)
            {
                return false;
            }

            if info.cooldown > 0 {
                if let Some(last) = state.last_activation {
                    if ctx.now().saturating_sub(last) < info.cooldown {
                        return false;
                    }
                }
            }
        }

        let mut targets = info.targets.clone();
        if targets.is_empty() && activator.is_persistent() {
            targets.push(activator);
        }

        let event = TriggerEvent::new(ctx.trigger_id(), activator, targets, info.message.clone());

        for condition in self.activating_conditions.snapshot() {
            if let Some(reason) = condition(&event).filter(|r| !r.is_empty()) {
                ctx.reply(activator, &reason);
                log::debug!(
                    "trigger {} was not activated. Reason: {}",
                    event.trigger,
                    reason
                );
                return false;
            }
        }

        {
            let mut state = self.state.lock();
            state.activated = true;
            if info.activation == TriggerActivation::Collision {
                state.in_contact.insert(activator);
            }
        }

        for target in &event.targets {
            if !ctx.deliver(*target, &event.message) {
                log::warn!(
                    "trigger {} was activated, but the trigger target {} could not be found",
                    event.trigger,
                    target
                );
            }
        }

        for listener in self.activated_listeners.snapshot() {
            listener(&event);
        }

        if info.one_shot {
            ctx.remove_trigger();
        }

        self.state.lock().last_activation = Some(ctx.now());
        true
    }
}

impl fmt::Debug for TriggerComponent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TriggerComponent")
            .field("info", &*self.info.read())
            .field("activated", &self.is_activated())
            .finish()
    }
}
