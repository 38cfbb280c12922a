//! Entity controllers
//!
//! Controllers drive an entity from the outside (animation, movement,
//! behavior). The entity only attaches and detaches them.

use parking_lot::RwLock;
use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// A controller that can be attached to the update loop
pub trait EntityController: Send + Sync + 'static {
    /// Start controlling the entity
    fn attach(&self);

    /// Stop controlling the entity
    fn detach(&self);
}

type Entry = (Arc<dyn Any + Send + Sync>, Arc<dyn EntityController>);

/// The controllers of one entity, at most one per controller type
#[derive(Default)]
pub struct EntityControllers {
    controllers: RwLock<HashMap<TypeId, Entry>>,
    attached: AtomicBool,
}

impl EntityControllers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the controller of type `T`. A replaced controller is detached if
    /// the set is attached, and the new one attached.
    pub fn set<T: EntityController>(&self, controller: Arc<T>) {
        let entry: Entry = (controller.clone(), controller.clone());
        let previous = self.controllers.write().insert(TypeId::of::<T>(), entry);

        if self.is_attached() {
            if let Some((_, old)) = previous {
                old.detach();
            }
            controller.attach();
        }
    }

    pub fn get<T: EntityController>(&self) -> Option<Arc<T>> {
        let (any, _) = self.controllers.read().get(&TypeId::of::<T>())?.clone();
        any.downcast::<T>().ok()
    }

    pub fn remove<T: EntityController>(&self) -> Option<Arc<T>> {
        let (any, controller) = self.controllers.write().remove(&TypeId::of::<T>())?;
        if self.is_attached() {
            controller.detach();
        }
        any.downcast::<T>().ok()
    }

    pub fn len(&self) -> usize {
        self.controllers.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.controllers.read().is_empty()
    }

    pub fn is_attached(&self) -> bool {
        self.attached.load(Ordering::Acquire)
    }

    fn snapshot(&self) -> Vec<Arc<dyn EntityController>> {
        self.controllers.read().values().map(|(_, c)| c.clone()).collect()
    }

    /// Attach every controller. Does nothing if already attached.
    pub fn attach_all(&self) {
        if self.attached.swap(true, Ordering::AcqRel) {
            return;
        }
        for controller in self.snapshot() {
            controller.attach();
        }
    }

    /// Detach every controller. Does nothing if not attached.
    pub fn detach_all(&self) {
        if !self.attached.swap(false, Ordering::AcqRel) {
            return;
        }
        for controller in self.snapshot() {
            controller.detach();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicI32;

    #[derive(Default)]
    struct Counting {
        attached: AtomicI32,
    }

    impl EntityController for Counting {
        fn attach(&self) {
            self.attached.fetch_add(1, Ordering::SeqCst);
        }

        fn detach(&self) {
            self.attached.fetch_sub(1, Ordering::SeqCst);
        }
    }

    #[test]
    fn test_attach_idempotent() {
        let controllers = EntityControllers::new();
        let c = Arc::new(Counting::default());
        controllers.set(c.clone());

        controllers.attach_all();
        controllers.attach_all();
        assert_eq!(c.attached.load(Ordering::SeqCst), 1);

        controllers.detach_all();
        controllers.detach_all();
        assert_eq!(c.attached.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_get_by_type() {
        let controllers = EntityControllers::new();
        controllers.set(Arc::new(Counting::default()));
        assert!(controllers.get::<Counting>().is_some());
        assert!(controllers.remove::<Counting>().is_some());
        assert!(controllers.is_empty());
    }

    #[test]
    fn test_replace_while_attached() {
        let controllers = EntityControllers::new();
        let first = Arc::new(Counting::default());
        let second = Arc::new(Counting::default());
        controllers.set(first.clone());
        controllers.attach_all();
        controllers.set(second.clone());
        assert_eq!(first.attached.load(Ordering::SeqCst), 0);
        assert_eq!(second.attached.load(Ordering::SeqCst), 1);
    }
}
