//! The physics engine boundary
//!
//! Environments only register and unregister participants. Collision
//! resolution itself happens behind this trait.

use crate::error::Result;
use lantern_entity::{CollisionType, EntityRef};
use lantern_math::{Rect, Shape};

/// Services a physics engine offers to an environment.
///
/// Implementations use interior mutability so one engine can be shared
/// by an environment and the game loop.
pub trait PhysicsEngine: Send + Sync {
    /// Register a collidable entity
    fn add(&self, entity: &EntityRef) -> Result<()>;

    /// Register immovable geometry by its bounds only
    fn add_static_bounds(&self, bounds: Rect) -> Result<()>;

    /// Unregister an entity. Returns `false` if it wasn't registered.
    fn remove(&self, entity: &EntityRef) -> bool;

    /// Unregister static bounds. Returns `false` if they weren't registered.
    fn remove_static_bounds(&self, bounds: &Rect) -> bool;

    /// Drop every registration
    fn clear(&self);

    /// Restrict queries to the given area (`None` = unbounded)
    fn set_bounds(&self, bounds: Option<Rect>);

    /// Area queries are restricted to
    fn bounds(&self) -> Option<Rect>;

    /// Registered entities, in registration order
    fn collision_entities(&self) -> Vec<EntityRef>;

    /// Registered static bounds
    fn static_bounds(&self) -> Vec<Rect>;

    /// Registered entities whose collision box intersects `shape`
    fn query(&self, shape: &Shape, filter: CollisionType) -> Vec<EntityRef>;

    /// Whether `shape` hits any registered collision geometry
    fn collides(&self, shape: &Shape, filter: CollisionType) -> bool {
        !self.query(shape, filter).is_empty()
            || (filter != CollisionType::Dynamic
                && self.static_bounds().iter().any(|b| shape.intersects_rect(b)))
    }
}
