//! Lantern Triggers - Trigger Activation
//!
//! This crate provides the activation state machine behind trigger entities.
//!
//! # Features
//!
//! - Collision triggers polled against the entities overlapping them
//! - Interaction triggers activated explicitly by an entity
//! - Activator allow-lists and explicit message targets
//! - One-shot triggers and activation cooldowns
//! - Veto conditions that can reject an activation with a reason
//!
//! The component knows nothing about entities or environments. Everything it
//! needs from the outside goes through [`TriggerContext`].
//!
//! # Example
//!
//! ```ignore
//! use lantern_triggers::prelude::*;
//!
//! let trigger = TriggerComponent::new(TriggerInfo::new(TriggerActivation::Interact, "open"))
//!     .with_target(MapId::new(7));
//! trigger.on_activating(|event| (event.activator.raw() != 3).then(|| "Nope".to_string()));
//! trigger.interact(MapId::new(3), &context);
//! ```

pub mod context;
pub mod events;
pub mod filter;
pub mod trigger;

pub mod prelude {
    pub use crate::context::TriggerContext;
    pub use crate::events::{
        TriggerActivatedListener, TriggerActivatingCondition, TriggerDeactivatedListener,
        TriggerEvent, TriggerListener,
    };
    pub use crate::filter::ActivatorFilter;
    pub use crate::trigger::{TriggerActivation, TriggerComponent, TriggerInfo};
    pub use lantern_core::{ListenerId, MapId};
}

pub use prelude::*;
