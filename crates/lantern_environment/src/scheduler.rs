//! Per-frame update scheduling

use lantern_core::InstanceId;
use lantern_entity::EntityRef;
use parking_lot::RwLock;

/// Drives periodic ticks of attached entities
pub trait UpdateScheduler: Send + Sync {
    /// Start ticking an entity. Attaching twice has no effect.
    fn attach(&self, entity: &EntityRef);

    /// Stop ticking an entity. Returns `false` if it wasn't attached.
    fn detach(&self, entity: &EntityRef) -> bool;

    fn is_attached(&self, entity: &EntityRef) -> bool;
}

/// A scheduler ticked explicitly by the game loop
#[derive(Default)]
pub struct UpdateLoop {
    attached: RwLock<Vec<(InstanceId, EntityRef)>>,
}

impl UpdateLoop {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.attached.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.attached.read().is_empty()
    }

    /// Update every attached entity once.
    ///
    /// Entities may attach or detach others while being ticked; the
    /// changes take effect on the next tick.
    pub fn tick(&self) {
        let entities: Vec<EntityRef> = self.attached.read().iter().map(|(_, e)| e.clone()).collect();
        for entity in entities {
            entity.update();
        }
    }
}

impl UpdateScheduler for UpdateLoop {
    fn attach(&self, entity: &EntityRef) {
        let id = entity.instance_id();
        let mut attached = self.attached.write();
        if !attached.iter().any(|(i, _)| *i == id) {
            attached.push((id, entity.clone()));
        }
    }

    fn detach(&self, entity: &EntityRef) -> bool {
        let id = entity.instance_id();
        let mut attached = self.attached.write();
        let before = attached.len();
        attached.retain(|(i, _)| *i != id);
        before != attached.len()
    }

    fn is_attached(&self, entity: &EntityRef) -> bool {
        let id = entity.instance_id();
        self.attached.read().iter().any(|(i, _)| *i == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lantern_entity::Entity;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[test]
    fn test_attach_tick_detach() {
        let scheduler = Arc::new(UpdateLoop::new());
        let entity = Entity::builder().tickable().build();
        let ticks = Arc::new(AtomicUsize::new(0));
        let sink = ticks.clone();
        entity.on_update(move |_| {
            sink.fetch_add(1, Ordering::SeqCst);
        });

        scheduler.attach(&entity);
        scheduler.attach(&entity);
        assert_eq!(scheduler.len(), 1);

        scheduler.tick();
        scheduler.tick();
        assert_eq!(ticks.load(Ordering::SeqCst), 2);

        assert!(scheduler.detach(&entity));
        assert!(!scheduler.detach(&entity));
        scheduler.tick();
        assert_eq!(ticks.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_detach_during_tick() {
        let scheduler = Arc::new(UpdateLoop::new());
        let a = Entity::builder().build();
        let b = Entity::builder().build();

        let s = scheduler.clone();
        let victim = b.clone();
        a.on_update(move |_| {
            s.detach(&victim);
        });

        scheduler.attach(&a);
        scheduler.attach(&b);
        scheduler.tick();
        assert!(!scheduler.is_attached(&b));
        assert_eq!(scheduler.len(), 1);
    }
}
