//! In-memory physics registry

use crate::config::PhysicsConfig;
use crate::engine::PhysicsEngine;
use crate::error::{PhysicsError, Result};
use lantern_core::InstanceId;
use lantern_entity::{CollisionType, EntityRef};
use lantern_math::{Rect, Shape};
use parking_lot::RwLock;

/// Registry of collision participants with a linear broad phase.
///
/// Entities are keyed by instance id, so entities with equal map ids from
/// different environments can share one world.
pub struct PhysicsWorld {
    config: RwLock<PhysicsConfig>,
    entities: RwLock<Vec<(InstanceId, EntityRef)>>,
    statics: RwLock<Vec<Rect>>,
}

impl PhysicsWorld {
    /// Create a new physics world
    pub fn new(config: PhysicsConfig) -> Self {
        Self {
            config: RwLock::new(config),
            entities: RwLock::new(Vec::new()),
            statics: RwLock::new(Vec::new()),
        }
    }

    pub fn config(&self) -> PhysicsConfig {
        self.config.read().clone()
    }

    pub fn contains(&self, entity: &EntityRef) -> bool {
        let id = entity.instance_id();
        self.entities.read().iter().any(|(i, _)| *i == id)
    }

    pub fn len(&self) -> usize {
        self.entities.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.read().is_empty() && self.statics.read().is_empty()
    }
}

impl Default for PhysicsWorld {
    fn default() -> Self {
        Self::new(PhysicsConfig::default())
    }
}

impl PhysicsEngine for PhysicsWorld {
    fn add(&self, entity: &EntityRef) -> Result<()> {
        if !entity.has_collision() {
            return Err(PhysicsError::NoCollision(entity.map_id()));
        }

        let id = entity.instance_id();
        let mut entities = self.entities.write();
        if entities.iter().any(|(i, _)| *i == id) {
            return Err(PhysicsError::AlreadyRegistered(entity.map_id()));
        }

        entities.push((id, entity.clone()));
        log::debug!("registered {} with physics", entity);
        Ok(())
    }

    fn add_static_bounds(&self, bounds: Rect) -> Result<()> {
        if bounds.is_empty() {
            return Err(PhysicsError::EmptyBounds(bounds));
        }

        self.statics.write().push(bounds);
        Ok(())
    }

    fn remove(&self, entity: &EntityRef) -> bool {
        let id = entity.instance_id();
        let mut entities = self.entities.write();
        let before = entities.len();
        entities.retain(|(i, _)| *i != id);
        before != entities.len()
    }

    fn remove_static_bounds(&self, bounds: &Rect) -> bool {
        let mut statics = self.statics.write();
        match statics.iter().position(|b| b == bounds) {
            Some(index) => {
                statics.remove(index);
                true
            }
            None => false,
        }
    }

    fn clear(&self) {
        self.entities.write().clear();
        self.statics.write().clear();
    }

    fn set_bounds(&self, bounds: Option<Rect>) {
        self.config.write().bounds = bounds;
    }

    fn bounds(&self) -> Option<Rect> {
        self.config.read().bounds
    }

    fn collision_entities(&self) -> Vec<EntityRef> {
        self.entities.read().iter().map(|(_, e)| e.clone()).collect()
    }

    fn static_bounds(&self) -> Vec<Rect> {
        self.statics.read().clone()
    }

    fn query(&self, shape: &Shape, filter: CollisionType) -> Vec<EntityRef> {
        if !self.config.read().covers(&shape.bounds()) {
            return Vec::new();
        }

        self.collision_entities()
            .into_iter()
            .filter(|e| e.collision_type().is_some_and(|t| t.matches(filter)))
            .filter(|e| e.collision_box().is_some_and(|b| shape.intersects_rect(&b)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lantern_entity::{CollisionInfo, Entity};
    use lantern_math::Vec2;

    fn crate_at(x: f64, y: f64) -> EntityRef {
        Entity::new_collision_box(false, false)
            .with_location(x, y)
            .with_size(10.0, 10.0)
            .build()
    }

    #[test]
    fn test_add_requires_collision() {
        let world = PhysicsWorld::default();
        let plain = Entity::builder().with_map_id(3).build();
        assert!(matches!(world.add(&plain), Err(PhysicsError::NoCollision(_))));

        let disabled = Entity::builder()
            .with_size(10.0, 10.0)
            .with_collision(CollisionInfo::new().with_enabled(false))
            .build();
        assert!(world.add(&disabled).is_err());

        let solid = crate_at(0.0, 0.0);
        world.add(&solid).unwrap();
        assert!(matches!(world.add(&solid), Err(PhysicsError::AlreadyRegistered(_))));
        assert_eq!(world.len(), 1);
        assert!(world.remove(&solid));
        assert!(!world.remove(&solid));
    }

    #[test]
    fn test_static_bounds() {
        let world = PhysicsWorld::default();
        let wall = Rect::new(0.0, 0.0, 32.0, 8.0);
        world.add_static_bounds(wall).unwrap();
        assert!(world.add_static_bounds(Rect::EMPTY).is_err());

        let probe = Shape::Rect(Rect::new(4.0, 4.0, 2.0, 2.0));
        assert!(world.collides(&probe, CollisionType::Any));
        assert!(world.collides(&probe, CollisionType::Static));
        assert!(!world.collides(&probe, CollisionType::Dynamic));

        assert!(world.remove_static_bounds(&wall));
        assert!(!world.remove_static_bounds(&wall));
        assert!(world.is_empty());
    }

    #[test]
    fn test_query_shapes() {
        let world = PhysicsWorld::default();
        let a = crate_at(0.0, 0.0);
        let b = crate_at(50.0, 0.0);
        world.add(&a).unwrap();
        world.add(&b).unwrap();

        let hits = world.query(&Shape::Rect(Rect::new(5.0, 5.0, 10.0, 10.0)), CollisionType::Any);
        assert_eq!(hits.len(), 1);
        assert!(hits[0].is_same(&a));

        let ellipse = Shape::Ellipse(Rect::new(0.0, 0.0, 100.0, 10.0));
        assert_eq!(world.query(&ellipse, CollisionType::Static).len(), 2);
        assert!(world.query(&ellipse, CollisionType::Dynamic).is_empty());

        let triangle = Shape::Polygon(vec![
            Vec2::new(45.0, -5.0),
            Vec2::new(70.0, -5.0),
            Vec2::new(45.0, 20.0),
        ]);
        let hits = world.query(&triangle, CollisionType::Any);
        assert_eq!(hits.len(), 1);
        assert!(hits[0].is_same(&b));
    }

    #[test]
    fn test_bounds_clip_queries() {
        let world = PhysicsWorld::new(PhysicsConfig::default().with_bounds(Rect::new(0.0, 0.0, 100.0, 100.0)));
        world.add(&crate_at(0.0, 0.0)).unwrap();
        let outside = Shape::Rect(Rect::new(200.0, 200.0, 5.0, 5.0));
        assert!(world.query(&outside, CollisionType::Any).is_empty());

        world.set_bounds(None);
        assert!(world.bounds().is_none());
    }

    #[test]
    fn test_clear() {
        let world = PhysicsWorld::default();
        world.add(&crate_at(0.0, 0.0)).unwrap();
        world.add_static_bounds(Rect::new(0.0, 0.0, 1.0, 1.0)).unwrap();
        world.clear();
        assert!(world.is_empty());
        assert!(world.collision_entities().is_empty());
    }
}
