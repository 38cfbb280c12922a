//! Triggers inside a loaded environment

use lantern_core::{ManualClock, MapId};
use lantern_environment::prelude::*;
use parking_lot::Mutex;
use std::sync::Arc;

struct World {
    env: Arc<Environment>,
    clock: Arc<ManualClock>,
    updates: Arc<UpdateLoop>,
}

impl World {
    fn new() -> Self {
        let _ = env_logger::builder().is_test(true).try_init();
        let clock = Arc::new(ManualClock::new(0));
        let updates = Arc::new(UpdateLoop::new());
        let env = Environment::builder()
            .with_clock(clock.clone())
            .with_scheduler(updates.clone())
            .build();
        env.load();
        Self { env, clock, updates }
    }
}

fn trigger(id: i32, configure: impl FnOnce(&mut TriggerInfo)) -> EntityRef {
    let mut builder = Entity::new_trigger(TriggerActivation::Collision, "open")
        .with_map_id(id)
        .with_location(0.0, 0.0)
        .with_size(32.0, 32.0);
    if let Some(info) = builder.trigger_mut() {
        configure(info);
    }
    builder.build()
}

fn walker(id: i32) -> EntityRef {
    Entity::new_creature()
        .with_map_id(id)
        .with_location(100.0, 100.0)
        .with_size(16.0, 16.0)
        .build()
}

fn record_messages(entity: &EntityRef) -> Arc<Mutex<Vec<String>>> {
    let log = Arc::new(Mutex::new(Vec::new()));
    let sink = log.clone();
    entity.on_any_message(move |_, event| sink.lock().push(event.message.clone()));
    log
}

const INSIDE: Vec2 = Vec2 { x: 8.0, y: 8.0 };
const OUTSIDE: Vec2 = Vec2 { x: 100.0, y: 100.0 };

#[test]
fn test_collision_trigger_targets() {
    let world = World::new();
    let t = trigger(1, |info| info.targets = vec![MapId::new(7)]);
    let a = Entity::builder().with_map_id(7).build();
    let b = walker(2);
    world.env.add_all([&t, &a, &b]);

    let received = record_messages(&a);
    let deactivated = Arc::new(Mutex::new(Vec::new()));
    let sink = deactivated.clone();
    t.trigger().unwrap().on_deactivated(move |event| sink.lock().push(event.clone()));

    world.updates.tick();
    assert!(received.lock().is_empty());

    b.set_location(INSIDE);
    world.updates.tick();
    world.updates.tick();
    assert_eq!(*received.lock(), vec!["open".to_string()]);
    assert!(t.trigger().unwrap().is_activated());
    assert_eq!(t.trigger().unwrap().in_contact(), vec![MapId::new(2)]);

    b.set_location(OUTSIDE);
    world.updates.tick();
    let events = deactivated.lock().clone();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].activator, MapId::new(2));
    assert_eq!(events[0].targets, vec![MapId::new(7)]);
    assert!(t.trigger().unwrap().in_contact().is_empty());
}

#[test]
fn test_one_shot_fires_once_and_leaves() {
    let world = World::new();
    let t = trigger(1, |info| info.one_shot = true);
    let b = walker(2);
    world.env.add_all([&t, &b]);

    let activations = Arc::new(Mutex::new(0));
    let sink = activations.clone();
    t.trigger().unwrap().on_activated(move |_| *sink.lock() += 1);
    let received = record_messages(&b);

    for _ in 0..2 {
        b.set_location(INSIDE);
        world.updates.tick();
        b.set_location(OUTSIDE);
        world.updates.tick();
    }

    assert_eq!(*activations.lock(), 1);
    assert_eq!(*received.lock(), vec!["open".to_string()]);
    assert!(!world.env.contains(&t));
    assert!(world.env.triggers().is_empty());
    assert!(!world.updates.is_attached(&t));
}

#[test]
fn test_interaction_cooldown() {
    let world = World::new();
    let mut builder = Entity::new_trigger(TriggerActivation::Interact, "lever")
        .with_map_id(1)
        .with_size(16.0, 16.0);
    if let Some(info) = builder.trigger_mut() {
        info.cooldown = 500;
    }
    let t = builder.build();
    let player = walker(2);
    world.env.add_all([&t, &player]);
    let received = record_messages(&player);

    assert!(t.interact(&player));
    world.clock.advance(100);
    assert!(!t.interact(&player));
    world.clock.advance(400);
    assert!(t.interact(&player));
    assert_eq!(received.lock().len(), 2);

    // interaction triggers are not polled
    player.set_location(INSIDE);
    world.updates.tick();
    assert_eq!(received.lock().len(), 2);
}

#[test]
fn test_veto_replies_to_activator() {
    let world = World::new();
    let t = trigger(1, |_| {});
    let b = walker(2);
    world.env.add_all([&t, &b]);
    t.trigger()
        .unwrap()
        .on_activating(|_| Some("You shall not pass!".to_string()));
    let received = record_messages(&b);

    b.set_location(INSIDE);
    world.updates.tick();
    assert!(!t.trigger().unwrap().is_activated());
    assert_eq!(*received.lock(), vec!["You shall not pass!".to_string()]);
}

#[test]
fn test_activator_allow_list() {
    let world = World::new();
    let t = trigger(1, |info| {
        info.activators.add(MapId::new(3));
    });
    let stranger = walker(2);
    let hero = walker(3);
    world.env.add_all([&t, &stranger, &hero]);

    stranger.set_location(INSIDE);
    world.updates.tick();
    assert!(!t.trigger().unwrap().is_activated());

    hero.set_location(INSIDE);
    world.updates.tick();
    assert!(t.trigger().unwrap().is_activated());
    assert_eq!(t.trigger().unwrap().in_contact(), vec![MapId::new(3)]);
}

#[test]
fn test_unloaded_trigger_is_inert() {
    let world = World::new();
    let t = trigger(1, |_| {});
    let b = walker(2);
    world.env.add_all([&t, &b]);
    world.env.unload();

    b.set_location(INSIDE);
    t.update();
    assert!(!t.trigger().unwrap().is_activated());
}
