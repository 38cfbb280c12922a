//! # lantern_entity - Runtime Entities
//!
//! Entities are placed game objects with a transform, tags and a set of
//! optional capability components (collision, combat, movement, lighting,
//! triggers, ...). Their kinds follow from the components they carry.
//!
//! ## Example
//!
//! ```ignore
//! use lantern_entity::prelude::*;
//!
//! let goblin = Entity::new_creature()
//!     .with_map_id(12)
//!     .with_name("goblin")
//!     .with_location(64.0, 32.0)
//!     .with_size(16.0, 16.0)
//!     .build();
//!
//! goblin.on_message("hello", |e, event| event.set_reply(format!("{} waves", e)));
//! ```

pub mod actions;
pub mod builder;
pub mod collision;
pub mod components;
pub mod controllers;
pub mod entity;
pub mod events;
pub mod host;
pub mod kinds;
pub mod movement;
pub mod properties;
pub mod render;
pub mod trigger;

pub use actions::*;
pub use builder::*;
pub use collision::*;
pub use components::*;
pub use controllers::*;
pub use entity::*;
pub use events::*;
pub use host::*;
pub use kinds::*;
pub use movement::*;
pub use properties::*;
pub use render::*;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::builder::EntityBuilder;
    pub use crate::collision::{CollisionInfo, CollisionType};
    pub use crate::components::*;
    pub use crate::controllers::{EntityController, EntityControllers};
    pub use crate::entity::{Entity, EntityRef};
    pub use crate::events::{EntityMessageEvent, EntityRenderEvent, ANY_MESSAGE};
    pub use crate::host::EntityHost;
    pub use crate::kinds::{EntityKind, EntityKinds};
    pub use crate::movement::{Force, ForceRef, GRAVITY_IDENTIFIER};
    pub use crate::properties::{CustomProperties, PropertyProvider};
    pub use crate::render::RenderType;
    pub use lantern_core::{ListenerId, MapId};
    pub use lantern_math::{Align, Rect, Valign, Vec2};
    pub use lantern_triggers::{TriggerActivation, TriggerEvent, TriggerInfo};
}
