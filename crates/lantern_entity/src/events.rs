//! Entity events and listener types

use crate::entity::Entity;
use crate::render::RenderType;
use lantern_core::MapId;

/// Message key whose listeners receive every message
pub const ANY_MESSAGE: &str = "";

/// A message delivered to an entity.
///
/// One event is shared by all listeners of a single delivery, so a listener
/// can leave a reply (or read the reply of an earlier listener).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityMessageEvent {
    /// The entity that sent the message, if any
    pub sender: Option<MapId>,
    /// The receiving entity
    pub receiver: MapId,
    pub message: String,
    /// Reply handed back to the sender
    pub reply: Option<String>,
}

impl EntityMessageEvent {
    pub fn new(sender: Option<MapId>, receiver: MapId, message: impl Into<String>) -> Self {
        Self {
            sender,
            receiver,
            message: message.into(),
            reply: None,
        }
    }

    pub fn set_reply(&mut self, reply: impl Into<String>) {
        self.reply = Some(reply.into());
    }
}

/// Render phase notification for one entity
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntityRenderEvent {
    pub entity: MapId,
    pub render_type: RenderType,
}

/// Called when an entity receives a message
pub type MessageListener = dyn Fn(&Entity, &mut EntityMessageEvent) + Send + Sync;

/// Called after an entity moved or was resized
pub type TransformListener = dyn Fn(&Entity) + Send + Sync;

/// Called before or after an entity is rendered
pub type RenderListener = dyn Fn(&Entity, &EntityRenderEvent) + Send + Sync;

/// Veto on rendering an entity. All vetoes must agree for it to be drawn.
pub type RenderVeto = dyn Fn(&Entity, &EntityRenderEvent) -> bool + Send + Sync;

/// Called when an entity is loaded into, or removed from, an environment
pub type LifecycleListener = dyn Fn(&Entity) + Send + Sync;

/// Called on every scheduler tick of an entity
pub type UpdateListener = dyn Fn(&Entity) + Send + Sync;
