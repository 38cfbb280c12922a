//! # lantern_physics - Collision Registry
//!
//! Environments register their collidable entities and static level
//! geometry here. The registry answers broad-phase queries with rectangles,
//! ellipses and polygons; collision resolution is left to the game.
//!
//! ## Example
//!
//! ```ignore
//! use lantern_physics::prelude::*;
//!
//! let physics = PhysicsWorld::new(PhysicsConfig::default());
//! physics.add(&goblin)?;
//! physics.add_static_bounds(Rect::new(0.0, 0.0, 320.0, 16.0))?;
//!
//! let hits = physics.query(&Shape::Ellipse(blast), CollisionType::Dynamic);
//! ```

pub mod config;
pub mod engine;
pub mod error;
pub mod world;

pub use config::PhysicsConfig;
pub use engine::PhysicsEngine;
pub use error::{PhysicsError, Result};
pub use world::PhysicsWorld;

/// Prelude for common imports
pub mod prelude {
    pub use crate::config::PhysicsConfig;
    pub use crate::engine::PhysicsEngine;
    pub use crate::error::{PhysicsError, Result};
    pub use crate::world::PhysicsWorld;
    pub use lantern_entity::CollisionType;
    pub use lantern_math::{Rect, Shape};
}
