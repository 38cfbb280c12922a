//! The container an entity lives in

use crate::entity::EntityRef;
use crate::render::RenderType;
use lantern_core::{InstanceId, MapId};

/// Services an environment provides to the entities it contains.
///
/// Entities hold only a weak link to their host, so a dropped environment
/// simply looks like "no host".
pub trait EntityHost: Send + Sync {
    /// Identity of the host
    fn host_id(&self) -> InstanceId;

    /// Whether the host is currently loaded
    fn is_loaded(&self) -> bool;

    /// Current game time in milliseconds
    fn now(&self) -> u64;

    /// Look up an entity by map id
    fn get(&self, id: MapId) -> Option<EntityRef>;

    /// Remove an entity from the host
    fn remove_entity(&self, entity: &EntityRef);

    /// Entities currently registered for collision
    fn collision_entities(&self) -> Vec<EntityRef>;

    /// A tag was added to a contained entity
    fn tag_added(&self, entity: &EntityRef, tag: &str);

    /// A tag was removed from a contained entity
    fn tag_removed(&self, entity: &EntityRef, tag: &str);

    /// A contained entity moved to a different render phase
    fn render_type_changed(&self, entity: &EntityRef, previous: RenderType);

    /// Unregister an entity from physics before its collision type changes
    fn detach_physics(&self, entity: &EntityRef);

    /// Register an entity with physics after its collision type changed
    fn attach_physics(&self, entity: &EntityRef);

    /// Start ticking a contained entity, e.g. an emitter that was activated
    fn attach_updates(&self, entity: &EntityRef);

    /// Stop ticking a contained entity
    fn detach_updates(&self, entity: &EntityRef);
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use parking_lot::{Mutex, RwLock};
    use std::sync::atomic::{AtomicU64, Ordering};
    use std::sync::{Arc, Weak};

    /// Minimal host keeping entities in a list
    pub(crate) struct TestHost {
        id: InstanceId,
        pub(crate) entities: RwLock<Vec<EntityRef>>,
        pub(crate) now: AtomicU64,
        pub(crate) log: Mutex<Vec<String>>,
    }

    impl TestHost {
        pub(crate) fn new() -> Arc<Self> {
            Arc::new(Self {
                id: InstanceId::next(),
                entities: RwLock::new(Vec::new()),
                now: AtomicU64::new(0),
                log: Mutex::new(Vec::new()),
            })
        }

        pub(crate) fn add(self: &Arc<Self>, entity: &EntityRef) {
            let host: Arc<dyn EntityHost> = self.clone();
            let weak: Weak<dyn EntityHost> = Arc::downgrade(&host);
            entity.set_host(Some(weak));
            self.entities.write().push(entity.clone());
            entity.loaded();
        }

        pub(crate) fn advance(&self, ms: u64) {
            self.now.fetch_add(ms, Ordering::SeqCst);
        }

        pub(crate) fn log(&self) -> Vec<String> {
            self.log.lock().clone()
        }
    }

    impl EntityHost for TestHost {
        fn host_id(&self) -> InstanceId {
            self.id
        }

        fn is_loaded(&self) -> bool {
            true
        }

        fn now(&self) -> u64 {
            self.now.load(Ordering::SeqCst)
        }

        fn get(&self, id: MapId) -> Option<EntityRef> {
            self.entities.read().iter().find(|e| e.map_id() == id).cloned()
        }

        fn remove_entity(&self, entity: &EntityRef) {
            self.entities.write().retain(|e| !e.is_same(entity));
            entity.removed();
            self.log.lock().push(format!("removed {}", entity.map_id()));
        }

        fn collision_entities(&self) -> Vec<EntityRef> {
            self.entities
                .read()
                .iter()
                .filter(|e| e.has_collision_box())
                .cloned()
                .collect()
        }

        fn tag_added(&self, entity: &EntityRef, tag: &str) {
            self.log.lock().push(format!("+{} {}", tag, entity.map_id()));
        }

        fn tag_removed(&self, entity: &EntityRef, tag: &str) {
            self.log.lock().push(format!("-{} {}", tag, entity.map_id()));
        }

        fn render_type_changed(&self, entity: &EntityRef, previous: RenderType) {
            self.log
                .lock()
                .push(format!("render {} {} -> {}", entity.map_id(), previous, entity.render_type()));
        }

        fn detach_physics(&self, entity: &EntityRef) {
            self.log.lock().push(format!("detach {}", entity.map_id()));
        }

        fn attach_physics(&self, entity: &EntityRef) {
            self.log.lock().push(format!("attach {}", entity.map_id()));
        }

        fn attach_updates(&self, entity: &EntityRef) {
            self.log.lock().push(format!("tick {}", entity.map_id()));
        }

        fn detach_updates(&self, entity: &EntityRef) {
            self.log.lock().push(format!("untick {}", entity.map_id()));
        }
    }
}
