//! Trigger entities
//!
//! Connects a [`TriggerComponent`] to the entity that owns it and to the
//! environment the entity lives in.

use crate::entity::Entity;
use crate::host::EntityHost;
use lantern_core::MapId;
use lantern_triggers::{TriggerActivation, TriggerContext};
use std::sync::Arc;

struct EntityTriggerContext<'a> {
    entity: &'a Entity,
    host: Option<Arc<dyn EntityHost>>,
}

impl TriggerContext for EntityTriggerContext<'_> {
    fn trigger_id(&self) -> MapId {
        self.entity.map_id()
    }

    fn is_loaded(&self) -> bool {
        self.host.is_some() && self.entity.is_loaded()
    }

    fn now(&self) -> u64 {
        self.host.as_ref().map_or(0, |h| h.now())
    }

    fn deliver(&self, target: MapId, message: &str) -> bool {
        match self.host.as_ref().and_then(|h| h.get(target)) {
            Some(target) => {
                target.send_message(Some(self.entity.map_id()), message);
                true
            }
            None => false,
        }
    }

    fn reply(&self, activator: MapId, reason: &str) {
        if let Some(activator) = self.host.as_ref().and_then(|h| h.get(activator)) {
            activator.send_message(Some(self.entity.map_id()), reason);
        }
    }

    fn remove_trigger(&self) {
        if let (Some(host), Some(me)) = (&self.host, self.entity.to_ref()) {
            host.remove_entity(&me);
        }
    }
}

impl Entity {
    fn trigger_context(&self) -> EntityTriggerContext<'_> {
        EntityTriggerContext {
            entity: self,
            host: self.host(),
        }
    }

    /// Activate an interaction trigger on behalf of `sender`
    pub fn interact(&self, sender: &Entity) -> bool {
        match &self.trigger {
            Some(trigger) => trigger.interact(sender.map_id(), &self.trigger_context()),
            None => false,
        }
    }

    /// Whether `other` currently overlaps this trigger's box
    pub fn can_trigger(&self, other: &Entity) -> bool {
        if !other.can_collide_with(self) {
            return false;
        }

        match (self.collision_box(), other.collision_box()) {
            (Some(trigger), Some(other)) => trigger.intersects(&other),
            _ => false,
        }
    }

    /// Forget the activation state of a trigger
    pub fn reset_trigger(&self) {
        if let Some(trigger) = &self.trigger {
            trigger.reset();
        }
    }

    pub(crate) fn poll_trigger(&self) {
        let Some(trigger) = &self.trigger else {
            return;
        };
        if trigger.activation() != TriggerActivation::Collision {
            return;
        }

        let ctx = self.trigger_context();
        let Some(host) = &ctx.host else {
            return;
        };

        let overlapping: Vec<MapId> = host
            .collision_entities()
            .iter()
            .filter(|candidate| self.can_trigger(candidate))
            .map(|candidate| candidate.map_id())
            .collect();

        trigger.poll(&overlapping, &ctx);
    }
}

#[cfg(test)]
mod tests {
    use crate::host::testing::TestHost;
    use crate::prelude::*;
    use parking_lot::Mutex;
    use std::sync::Arc;

    fn goblin(id: i32, x: f64, y: f64) -> EntityRef {
        Entity::new_creature()
            .with_map_id(id)
            .with_location(x, y)
            .with_size(16.0, 16.0)
            .build()
    }

    fn received(entity: &EntityRef) -> Arc<Mutex<Vec<String>>> {
        let messages = Arc::new(Mutex::new(Vec::new()));
        let sink = messages.clone();
        entity.on_any_message(move |_, event| sink.lock().push(event.message.clone()));
        messages
    }

    #[test]
    fn test_collision_trigger_enter_and_leave() {
        let _ = env_logger::builder().is_test(true).try_init();
        let host = TestHost::new();
        let trigger = Entity::new_trigger(TriggerActivation::Collision, "trap")
            .with_map_id(1)
            .with_size(16.0, 16.0)
            .build();
        // box of a 16x16 creature at the origin is (5, 10, 6, 6)
        let player = goblin(2, 0.0, 0.0);
        let inbox = received(&player);
        host.add(&trigger);
        host.add(&player);

        let left = Arc::new(Mutex::new(Vec::new()));
        let sink = left.clone();
        trigger
            .trigger()
            .unwrap()
            .on_deactivated(move |e| sink.lock().push(e.activator));

        trigger.update();
        assert_eq!(*inbox.lock(), vec!["trap".to_string()]);
        assert_eq!(trigger.trigger().unwrap().in_contact(), vec![MapId::new(2)]);

        // still inside: no second activation
        trigger.update();
        assert_eq!(inbox.lock().len(), 1);

        player.set_location(Vec2::new(64.0, 64.0));
        trigger.update();
        assert_eq!(*left.lock(), vec![MapId::new(2)]);
        assert!(trigger.trigger().unwrap().in_contact().is_empty());
    }

    #[test]
    fn test_collision_trigger_requires_overlap() {
        let host = TestHost::new();
        let trigger = Entity::new_trigger(TriggerActivation::Collision, "trap")
            .with_map_id(1)
            .with_size(16.0, 16.0)
            .build();
        // box starts at (13, 18), below the trigger
        let player = goblin(2, 8.0, 8.0);
        let inbox = received(&player);
        host.add(&trigger);
        host.add(&player);

        trigger.update();
        assert!(inbox.lock().is_empty());
        assert!(!trigger.can_trigger(&player));
        assert!(!trigger.can_trigger(&trigger));
    }

    #[test]
    fn test_interact_delivers_to_targets() {
        let host = TestHost::new();
        let lever = Entity::new_trigger(TriggerActivation::Interact, "open")
            .with_map_id(5)
            .build();
        lever.trigger().unwrap().add_target(MapId::new(9));
        let door = Entity::builder().with_map_id(9).build();
        let door_inbox = received(&door);
        let player = goblin(2, 0.0, 0.0);
        let player_inbox = received(&player);
        host.add(&lever);
        host.add(&door);
        host.add(&player);

        assert!(lever.interact(&player));
        assert!(lever.interact(&player));
        assert_eq!(door_inbox.lock().len(), 2);
        assert!(player_inbox.lock().is_empty());
    }

    #[test]
    fn test_one_shot_removes_trigger() {
        let host = TestHost::new();
        let mut builder = Entity::new_trigger(TriggerActivation::Interact, "once").with_map_id(6);
        if let Some(info) = builder.trigger_mut() {
            info.one_shot = true;
            info.targets.push(MapId::new(9));
        }
        let once = builder.build();
        let door = Entity::builder().with_map_id(9).build();
        let inbox = received(&door);
        let player = goblin(2, 0.0, 0.0);
        host.add(&once);
        host.add(&door);
        host.add(&player);

        assert!(once.interact(&player));
        assert_eq!(*inbox.lock(), vec!["once".to_string()]);
        assert!(host.get(MapId::new(6)).is_none());
        assert!(host.log().contains(&"removed #6".to_string()));
        assert!(!once.is_loaded());
        assert!(!once.interact(&player));
    }

    #[test]
    fn test_veto_replies_to_activator() {
        let host = TestHost::new();
        let gate = Entity::new_trigger(TriggerActivation::Interact, "pass")
            .with_map_id(3)
            .build();
        gate.trigger()
            .unwrap()
            .on_activating(|_| Some("You shall not pass!".to_string()));
        let player = goblin(2, 0.0, 0.0);
        let inbox = received(&player);
        host.add(&gate);
        host.add(&player);

        assert!(!gate.interact(&player));
        assert_eq!(*inbox.lock(), vec!["You shall not pass!".to_string()]);
        assert!(!gate.trigger().unwrap().is_activated());
    }

    #[test]
    fn test_reset_action() {
        let host = TestHost::new();
        let button = Entity::new_trigger(TriggerActivation::Interact, "press")
            .with_map_id(4)
            .build();
        let player = goblin(2, 0.0, 0.0);
        host.add(&button);
        host.add(&player);

        assert!(button.interact(&player));
        assert!(button.trigger().unwrap().is_activated());
        button.perform("reset");
        assert!(!button.trigger().unwrap().is_activated());
    }

    #[test]
    fn test_unhosted_trigger_is_inert() {
        let trigger = Entity::new_trigger(TriggerActivation::Interact, "x").build();
        let player = goblin(2, 0.0, 0.0);
        assert!(!trigger.interact(&player));
        assert!(!player.interact(&trigger));
    }
}
