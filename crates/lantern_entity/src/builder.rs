//! Entity construction

use crate::actions::{
    EntityActionMap, COMBAT_ACTIONS, EMITTER_ACTIONS, LIGHT_ACTIONS, TRIGGER_ACTIONS,
};
use crate::collision::{CollisionComponent, CollisionInfo, CollisionType};
use crate::components::{
    ColliderComponent, CombatComponent, CombatInfo, CreatureComponent, Direction,
    EmitterComponent, EmitterInfo, LightInfo, LightSourceComponent, PropComponent,
    SpawnpointComponent, StaticShadowComponent, StaticShadowType,
};
use crate::controllers::EntityControllers;
use crate::entity::{Entity, EntityRef, Geometry};
use crate::kinds::{EntityKind, EntityKinds};
use crate::movement::{MobileComponent, MobileInfo};
use crate::properties::CustomProperties;
use crate::render::RenderType;
use lantern_core::{InstanceId, Listeners, MapId};
use lantern_math::Vec2;
use lantern_triggers::{TriggerActivation, TriggerComponent, TriggerInfo};
use parking_lot::RwLock;
use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicBool, AtomicI32};
use std::sync::Arc;

/// Builder for [`Entity`]
#[derive(Debug, Clone, Default)]
pub struct EntityBuilder {
    map_id: MapId,
    name: Option<String>,
    location: Vec2,
    width: f64,
    height: f64,
    angle: f64,
    render_type: RenderType,
    tags: Vec<String>,
    tickable: bool,
    map_area: bool,
    properties: BTreeMap<String, String>,

    collision: Option<CollisionInfo>,
    trigger: Option<TriggerInfo>,
    combat: Option<CombatInfo>,
    mobile: Option<MobileInfo>,
    light: Option<LightInfo>,
    shadow: Option<StaticShadowComponent>,
    emitter: Option<EmitterInfo>,
    spawnpoint: Option<SpawnpointComponent>,
    collider: Option<ColliderComponent>,
    prop: Option<PropComponent>,
    creature: Option<CreatureComponent>,
}

impl EntityBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_map_id(mut self, id: impl Into<MapId>) -> Self {
        self.map_id = id.into();
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_location(mut self, x: f64, y: f64) -> Self {
        self.location = Vec2::new(x, y);
        self
    }

    pub fn with_size(mut self, width: f64, height: f64) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    pub fn with_angle(mut self, angle: f64) -> Self {
        self.angle = angle;
        self
    }

    pub fn with_render_type(mut self, render_type: RenderType) -> Self {
        self.render_type = render_type;
        self
    }

    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        let tag = tag.into();
        if !self.tags.contains(&tag) {
            self.tags.push(tag);
        }
        self
    }

    pub fn with_property(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.properties.insert(name.into(), value.into());
        self
    }

    /// Request ticks from the update scheduler while loaded
    pub fn tickable(mut self) -> Self {
        self.tickable = true;
        self
    }

    pub fn with_collision(mut self, info: CollisionInfo) -> Self {
        self.collision = Some(info);
        self
    }

    pub fn with_trigger(mut self, info: TriggerInfo) -> Self {
        self.trigger = Some(info);
        self
    }

    pub fn with_combat(mut self, info: CombatInfo) -> Self {
        self.combat = Some(info);
        self
    }

    pub fn with_mobile(mut self, info: MobileInfo) -> Self {
        self.mobile = Some(info);
        self
    }

    pub fn with_light(mut self, info: LightInfo) -> Self {
        self.light = Some(info);
        self
    }

    pub fn with_static_shadow(mut self, shadow_type: StaticShadowType, offset: i32) -> Self {
        self.shadow = Some(StaticShadowComponent::new(shadow_type, offset));
        self
    }

    pub fn with_emitter(mut self, info: EmitterInfo) -> Self {
        self.emitter = Some(info);
        self
    }

    pub fn with_spawnpoint(mut self, spawnpoint: SpawnpointComponent) -> Self {
        self.spawnpoint = Some(spawnpoint);
        self
    }

    pub fn with_collider(mut self, collider: ColliderComponent) -> Self {
        self.collider = Some(collider);
        self
    }

    pub fn with_prop(mut self, prop: PropComponent) -> Self {
        self.prop = Some(prop);
        self
    }

    pub fn with_creature(mut self, creature: CreatureComponent) -> Self {
        self.creature = Some(creature);
        self
    }

    pub fn with_map_area(mut self) -> Self {
        self.map_area = true;
        self
    }

    /// Mutable access to the collision configuration, if any
    pub fn collision_mut(&mut self) -> Option<&mut CollisionInfo> {
        self.collision.as_mut()
    }

    pub fn combat_mut(&mut self) -> Option<&mut CombatInfo> {
        self.combat.as_mut()
    }

    pub fn mobile_mut(&mut self) -> Option<&mut MobileInfo> {
        self.mobile.as_mut()
    }

    pub fn trigger_mut(&mut self) -> Option<&mut TriggerInfo> {
        self.trigger.as_mut()
    }

    fn kinds(&self) -> EntityKinds {
        let mut kinds = EntityKinds::NONE;
        let flags = [
            (self.creature.is_some(), EntityKinds::CREATURE),
            (self.prop.is_some(), EntityKinds::PROP),
            (self.trigger.is_some(), EntityKinds::TRIGGER),
            (self.light.is_some(), EntityKinds::LIGHT_SOURCE),
            (self.shadow.is_some(), EntityKinds::STATIC_SHADOW),
            (self.collider.is_some(), EntityKinds::COLLISION_BOX),
            (self.spawnpoint.is_some(), EntityKinds::SPAWNPOINT),
            (self.map_area, EntityKinds::MAP_AREA),
            (self.emitter.is_some(), EntityKinds::EMITTER),
            (self.combat.is_some(), EntityKinds::COMBAT),
            (self.mobile.is_some(), EntityKinds::MOBILE),
        ];
        for (present, flag) in flags {
            if present {
                kinds |= flag;
            }
        }
        kinds
    }

    /// Create the entity
    pub fn build(self) -> EntityRef {
        let kinds = self.kinds();
        let tickable = self.tickable || self.trigger.is_some();

        let collision = self.collision.map(|info| {
            let mut c = CollisionComponent::new(info);
            c.entity_resized(self.width, self.height);
            c
        });

        let entity = Arc::new_cyclic(|me| Entity {
            self_ref: me.clone(),
            instance: InstanceId::next(),
            map_id: AtomicI32::new(self.map_id.raw()),
            name: RwLock::new(self.name),
            geometry: RwLock::new(Geometry {
                location: self.location,
                width: self.width,
                height: self.height,
                angle: self.angle,
                collision,
            }),
            render_type: RwLock::new(self.render_type),
            tags: RwLock::new(self.tags),
            kinds,
            tickable,
            trigger: self.trigger.map(TriggerComponent::new),
            combat: self.combat.map(|i| RwLock::new(CombatComponent::new(i))),
            mobile: self.mobile.map(|i| RwLock::new(MobileComponent::new(i))),
            light: self.light.map(|i| RwLock::new(LightSourceComponent::new(i))),
            shadow: self.shadow.map(RwLock::new),
            emitter: self.emitter.map(|i| RwLock::new(EmitterComponent::new(i))),
            spawnpoint: self.spawnpoint.map(RwLock::new),
            collider: self.collider.map(RwLock::new),
            prop: self.prop.map(RwLock::new),
            creature: self.creature.map(RwLock::new),
            controllers: EntityControllers::new(),
            actions: EntityActionMap::new(),
            properties: CustomProperties::new(),
            host: RwLock::new(None),
            loaded: AtomicBool::new(false),
            location_listeners: Listeners::new(),
            size_listeners: Listeners::new(),
            message_listeners: RwLock::new(HashMap::new()),
            rendering_listeners: Listeners::new(),
            rendered_listeners: Listeners::new(),
            render_vetoes: Listeners::new(),
            loaded_listeners: Listeners::new(),
            removed_listeners: Listeners::new(),
            update_listeners: Listeners::new(),
        });

        entity.properties.extend(&self.properties);

        if kinds.has(EntityKind::Combat) {
            entity.actions.register_all(COMBAT_ACTIONS);
        }
        if kinds.has(EntityKind::LightSource) {
            entity.actions.register_all(LIGHT_ACTIONS);
            entity.on_message(LightSourceComponent::TOGGLE_MESSAGE, |e, _| e.toggle_light());
        }
        if kinds.has(EntityKind::Emitter) {
            entity.actions.register_all(EMITTER_ACTIONS);
        }
        if kinds.has(EntityKind::Trigger) {
            entity.actions.register_all(TRIGGER_ACTIONS);
        }

        entity
    }
}

// ==== Per-kind constructors ====

impl Entity {
    /// Builder for a plain entity
    pub fn builder() -> EntityBuilder {
        EntityBuilder::new()
    }

    /// A creature: combat-capable, mobile, dynamic collision
    pub fn new_creature() -> EntityBuilder {
        EntityBuilder::new()
            .with_creature(CreatureComponent::default())
            .with_combat(CombatInfo::default())
            .with_mobile(MobileInfo::default())
            .with_collision(CollisionInfo::default())
    }

    /// A prop: combat-capable, static collision
    pub fn new_prop(material: Option<String>) -> EntityBuilder {
        EntityBuilder::new()
            .with_prop(PropComponent {
                material,
                sprite_sheet: None,
            })
            .with_combat(CombatInfo::default())
            .with_collision(CollisionInfo::default().with_collision_type(CollisionType::Static))
    }

    /// A trigger whose box always covers the whole entity
    pub fn new_trigger(activation: TriggerActivation, message: impl Into<String>) -> EntityBuilder {
        EntityBuilder::new()
            .with_trigger(TriggerInfo::new(activation, message))
            .with_collision(CollisionInfo::covering())
            .with_render_type(RenderType::Overlay)
    }

    pub fn new_light_source(info: LightInfo) -> EntityBuilder {
        EntityBuilder::new()
            .with_light(info)
            .with_render_type(RenderType::Overlay)
    }

    pub fn new_static_shadow(shadow_type: StaticShadowType, offset: i32) -> EntityBuilder {
        EntityBuilder::new()
            .with_static_shadow(shadow_type, offset)
            .with_render_type(RenderType::None)
    }

    /// Level geometry blocking movement
    pub fn new_collision_box(obstacle: bool, obstructing_lights: bool) -> EntityBuilder {
        let collision = CollisionInfo {
            box_follows_size: true,
            collision_type: CollisionType::Static,
            ..CollisionInfo::default()
        };
        EntityBuilder::new()
            .with_collider(ColliderComponent {
                obstacle,
                obstructing_lights,
            })
            .with_collision(collision)
            .with_render_type(RenderType::None)
    }

    pub fn new_spawnpoint(direction: Direction, spawn_type: Option<String>) -> EntityBuilder {
        EntityBuilder::new()
            .with_spawnpoint(SpawnpointComponent {
                spawn_type,
                direction,
            })
            .with_render_type(RenderType::None)
    }

    pub fn new_map_area() -> EntityBuilder {
        EntityBuilder::new()
            .with_map_area()
            .with_render_type(RenderType::None)
    }

    pub fn new_emitter(info: EmitterInfo) -> EntityBuilder {
        EntityBuilder::new().with_emitter(info)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lantern_math::Rect;

    #[test]
    fn test_creature_kinds() {
        let e = Entity::new_creature().with_map_id(1).build();
        assert!(e.is(EntityKind::Creature));
        assert!(e.is(EntityKind::Combat));
        assert!(e.is(EntityKind::Mobile));
        assert!(!e.is(EntityKind::Trigger));
        assert!(e.actions().exists("die"));
    }

    #[test]
    fn test_trigger_box_covers_entity() {
        let e = Entity::new_trigger(TriggerActivation::Collision, "msg")
            .with_size(16.0, 16.0)
            .build();
        assert_eq!(e.collision_box(), Some(Rect::new(0.0, 0.0, 16.0, 16.0)));
        assert!(!e.has_collision());
        assert!(e.is_tickable());
        assert_eq!(e.render_type(), RenderType::Overlay);
    }

    #[test]
    fn test_collision_box_kind() {
        let e = Entity::new_collision_box(true, true)
            .with_location(10.0, 10.0)
            .with_size(32.0, 8.0)
            .build();
        assert!(e.is_obstacle());
        assert!(e.has_collision());
        assert_eq!(e.collision_box(), Some(Rect::new(10.0, 10.0, 32.0, 8.0)));
        assert_eq!(e.collision_type(), Some(CollisionType::Static));
    }

    #[test]
    fn test_properties_copied() {
        let e = EntityBuilder::new().with_property("team", "3").build();
        assert_eq!(e.properties().to_map().get("team").map(String::as_str), Some("3"));
    }

    #[test]
    fn test_light_toggle_message() {
        let e = Entity::new_light_source(LightInfo::default()).build();
        e.send_message(None, LightSourceComponent::TOGGLE_MESSAGE);
        assert!(!e.light().unwrap().read().is_active());
        e.perform("toggle");
        assert!(e.light().unwrap().read().is_active());
    }
}
