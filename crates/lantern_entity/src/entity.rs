//! The runtime entity

use crate::actions::{EntityAction, EntityActionMap};
use crate::collision::{CollisionComponent, CollisionInfo, CollisionType};
use crate::components::{
    ColliderComponent, CombatComponent, CreatureComponent, EmitterComponent,
    LightSourceComponent, PropComponent, SpawnpointComponent, StaticShadowComponent,
};
use crate::controllers::EntityControllers;
use crate::events::{
    EntityMessageEvent, EntityRenderEvent, LifecycleListener, MessageListener, RenderListener,
    RenderVeto, TransformListener, UpdateListener, ANY_MESSAGE,
};
use crate::host::EntityHost;
use crate::kinds::{EntityKind, EntityKinds};
use crate::movement::{ForceRef, MobileComponent};
use crate::properties::CustomProperties;
use crate::render::RenderType;
use lantern_core::{InstanceId, ListenerId, Listeners, MapId};
use lantern_math::{Align, Rect, Valign, Vec2};
use lantern_triggers::TriggerComponent;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicI32, Ordering};
use std::sync::{Arc, Weak};

/// Shared handle to an entity
pub type EntityRef = Arc<Entity>;

/// Transform and collision box, guarded together so the cached box can
/// never be computed from a transform that is already outdated.
#[derive(Debug, Clone)]
pub(crate) struct Geometry {
    pub(crate) location: Vec2,
    pub(crate) width: f64,
    pub(crate) height: f64,
    pub(crate) angle: f64,
    pub(crate) collision: Option<CollisionComponent>,
}

/// A placed, addressable game object.
///
/// Entities are created through [`EntityBuilder`](crate::EntityBuilder) and
/// always live behind an [`EntityRef`]. All state uses interior mutability so
/// an entity can be shared between its environment, physics and listeners.
pub struct Entity {
    pub(crate) self_ref: Weak<Entity>,
    pub(crate) instance: InstanceId,
    pub(crate) map_id: AtomicI32,
    pub(crate) name: RwLock<Option<String>>,
    pub(crate) geometry: RwLock<Geometry>,
    pub(crate) render_type: RwLock<RenderType>,
    pub(crate) tags: RwLock<Vec<String>>,
    pub(crate) kinds: EntityKinds,
    pub(crate) tickable: bool,

    // capabilities
    pub(crate) trigger: Option<TriggerComponent>,
    pub(crate) combat: Option<RwLock<CombatComponent>>,
    pub(crate) mobile: Option<RwLock<MobileComponent>>,
    pub(crate) light: Option<RwLock<LightSourceComponent>>,
    pub(crate) shadow: Option<RwLock<StaticShadowComponent>>,
    pub(crate) emitter: Option<RwLock<EmitterComponent>>,
    pub(crate) spawnpoint: Option<RwLock<SpawnpointComponent>>,
    pub(crate) collider: Option<RwLock<ColliderComponent>>,
    pub(crate) prop: Option<RwLock<PropComponent>>,
    pub(crate) creature: Option<RwLock<CreatureComponent>>,

    pub(crate) controllers: EntityControllers,
    pub(crate) actions: EntityActionMap,
    pub(crate) properties: CustomProperties,

    pub(crate) host: RwLock<Option<Weak<dyn EntityHost>>>,
    pub(crate) loaded: AtomicBool,

    // listeners
    pub(crate) location_listeners: Listeners<TransformListener>,
    pub(crate) size_listeners: Listeners<TransformListener>,
    pub(crate) message_listeners: RwLock<HashMap<String, Listeners<MessageListener>>>,
    pub(crate) rendering_listeners: Listeners<RenderListener>,
    pub(crate) rendered_listeners: Listeners<RenderListener>,
    pub(crate) render_vetoes: Listeners<RenderVeto>,
    pub(crate) loaded_listeners: Listeners<LifecycleListener>,
    pub(crate) removed_listeners: Listeners<LifecycleListener>,
    pub(crate) update_listeners: Listeners<UpdateListener>,
}

impl Entity {
    // ==== Identity ====

    /// Process-wide identity of this entity
    pub fn instance_id(&self) -> InstanceId {
        self.instance
    }

    pub fn map_id(&self) -> MapId {
        MapId::new(self.map_id.load(Ordering::Acquire))
    }

    /// Change the map id. Refused while the entity is contained, as the
    /// environment indexes it by id.
    pub fn set_map_id(&self, id: MapId) -> bool {
        if self.host().is_some() {
            log::warn!("{}: map id can't change while the entity is contained", self);
            return false;
        }
        self.map_id.store(id.raw(), Ordering::Release);
        true
    }

    pub fn name(&self) -> Option<String> {
        self.name.read().clone()
    }

    pub fn set_name(&self, name: Option<String>) {
        *self.name.write() = name;
    }

    /// An owned handle to this entity
    pub fn to_ref(&self) -> Option<EntityRef> {
        self.self_ref.upgrade()
    }

    /// Whether both handles refer to the same entity
    pub fn is_same(&self, other: &Entity) -> bool {
        self.instance == other.instance
    }

    pub fn kinds(&self) -> EntityKinds {
        self.kinds
    }

    pub fn is(&self, kind: EntityKind) -> bool {
        self.kinds.has(kind)
    }

    /// Whether the entity wants ticks from the update scheduler
    pub fn is_tickable(&self) -> bool {
        self.tickable
    }

    // ==== Transform ====

    pub fn location(&self) -> Vec2 {
        self.geometry.read().location
    }

    pub fn x(&self) -> f64 {
        self.location().x
    }

    pub fn y(&self) -> f64 {
        self.location().y
    }

    pub fn width(&self) -> f64 {
        self.geometry.read().width
    }

    pub fn height(&self) -> f64 {
        self.geometry.read().height
    }

    pub fn angle(&self) -> f64 {
        self.geometry.read().angle
    }

    pub fn set_angle(&self, angle: f64) {
        self.geometry.write().angle = angle;
    }

    pub fn bounding_box(&self) -> Rect {
        let g = self.geometry.read();
        Rect::from_location(g.location, g.width, g.height)
    }

    pub fn center(&self) -> Vec2 {
        self.bounding_box().center()
    }

    /// Move the entity. Listeners are only notified if the location changed.
    pub fn set_location(&self, location: Vec2) {
        {
            let mut g = self.geometry.write();
            if g.location == location {
                return;
            }
            g.location = location;
            if let Some(c) = g.collision.as_mut() {
                c.invalidate();
            }
        }

        for listener in self.location_listeners.snapshot() {
            listener(self);
        }
    }

    pub fn set_x(&self, x: f64) {
        self.set_location(Vec2::new(x, self.y()));
    }

    pub fn set_y(&self, y: f64) {
        self.set_location(Vec2::new(self.x(), y));
    }

    /// Resize the entity. Listeners are only notified if the size changed.
    pub fn set_size(&self, width: f64, height: f64) {
        {
            let mut g = self.geometry.write();
            if g.width == width && g.height == height {
                return;
            }
            g.width = width;
            g.height = height;
            if let Some(c) = g.collision.as_mut() {
                c.entity_resized(width, height);
            }
        }

        for listener in self.size_listeners.snapshot() {
            listener(self);
        }
    }

    pub fn set_width(&self, width: f64) {
        self.set_size(width, self.height());
    }

    pub fn set_height(&self, height: f64) {
        self.set_size(self.width(), height);
    }

    // ==== Rendering ====

    pub fn render_type(&self) -> RenderType {
        *self.render_type.read()
    }

    /// Change the render phase. A containing environment re-indexes the entity.
    pub fn set_render_type(&self, render_type: RenderType) {
        let previous = std::mem::replace(&mut *self.render_type.write(), render_type);
        if previous == render_type {
            return;
        }

        if let (Some(host), Some(me)) = (self.host(), self.to_ref()) {
            host.render_type_changed(&me, previous);
        }
    }

    /// Ask all render vetoes whether the entity may be drawn
    pub fn can_render(&self, event: &EntityRenderEvent) -> bool {
        self.render_vetoes.snapshot().iter().all(|veto| veto(self, event))
    }

    pub fn fire_rendering(&self, event: &EntityRenderEvent) {
        for listener in self.rendering_listeners.snapshot() {
            listener(self, event);
        }
    }

    pub fn fire_rendered(&self, event: &EntityRenderEvent) {
        for listener in self.rendered_listeners.snapshot() {
            listener(self, event);
        }
    }

    // ==== Tags ====

    pub fn tags(&self) -> Vec<String> {
        self.tags.read().clone()
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.read().iter().any(|t| t == tag)
    }

    pub fn add_tag(&self, tag: &str) {
        {
            let mut tags = self.tags.write();
            if tags.iter().any(|t| t == tag) {
                return;
            }
            tags.push(tag.to_string());
        }

        if let (Some(host), Some(me)) = (self.host(), self.to_ref()) {
            host.tag_added(&me, tag);
        }
    }

    pub fn remove_tag(&self, tag: &str) {
        {
            let mut tags = self.tags.write();
            let before = tags.len();
            tags.retain(|t| t != tag);
            if tags.len() == before {
                return;
            }
        }

        if let (Some(host), Some(me)) = (self.host(), self.to_ref()) {
            host.tag_removed(&me, tag);
        }
    }

    // ==== Collision ====

    pub fn has_collision_box(&self) -> bool {
        self.geometry.read().collision.is_some()
    }

    /// The current collision box, computed lazily from the transform
    pub fn collision_box(&self) -> Option<Rect> {
        let mut g = self.geometry.write();
        let Geometry {
            location,
            width,
            height,
            collision,
            ..
        } = &mut *g;
        collision
            .as_mut()
            .map(|c| c.collision_box(*location, *width, *height))
    }

    /// Collision box the entity would have at another location
    pub fn collision_box_at(&self, location: Vec2) -> Option<Rect> {
        let g = self.geometry.read();
        g.collision
            .as_ref()
            .map(|c| c.compute(location, g.width, g.height))
    }

    pub fn collision_info(&self) -> Option<CollisionInfo> {
        self.geometry.read().collision.as_ref().map(|c| c.info().clone())
    }

    /// Collision is enabled and the box has an area
    pub fn has_collision(&self) -> bool {
        let g = self.geometry.read();
        g.collision
            .as_ref()
            .is_some_and(|c| c.has_collision(g.width, g.height))
    }

    pub fn collision_type(&self) -> Option<CollisionType> {
        self.collision_info().map(|i| i.collision_type)
    }

    pub fn set_collision(&self, enabled: bool) {
        if let Some(c) = self.geometry.write().collision.as_mut() {
            c.set_enabled(enabled);
        }
    }

    pub fn set_collision_box_size(&self, width: f64, height: f64) {
        if let Some(c) = self.geometry.write().collision.as_mut() {
            c.set_box_size(width, height);
        }
    }

    pub fn set_collision_align(&self, align: Align) {
        if let Some(c) = self.geometry.write().collision.as_mut() {
            c.set_align(align);
        }
    }

    pub fn set_collision_valign(&self, valign: Valign) {
        if let Some(c) = self.geometry.write().collision.as_mut() {
            c.set_valign(valign);
        }
    }

    /// Change the collision type.
    ///
    /// `CollisionType::Any` is refused. If the entity is loaded, it is
    /// re-registered with physics so the new type takes effect.
    pub fn set_collision_type(&self, collision_type: CollisionType) -> bool {
        if !self.has_collision_box() {
            return false;
        }

        if collision_type == CollisionType::Any {
            log::warn!(
                "{}: CollisionType::Any can't be assigned to an entity, it may only be used to filter physics queries",
                self
            );
            return false;
        }

        let host = self.host().filter(|h| h.is_loaded() && self.is_loaded());
        let me = self.to_ref();
        if let (Some(host), Some(me)) = (&host, &me) {
            host.detach_physics(me);
        }

        let changed = self
            .geometry
            .write()
            .collision
            .as_mut()
            .is_some_and(|c| c.set_collision_type(collision_type));

        if let (Some(host), Some(me)) = (&host, &me) {
            host.attach_physics(me);
        }
        changed
    }

    /// Whether this entity collides with `other`
    pub fn can_collide_with(&self, other: &Entity) -> bool {
        !self.is_same(other) && self.has_collision_box() && other.has_collision_box()
    }

    // ==== Capabilities ====

    pub fn trigger(&self) -> Option<&TriggerComponent> {
        self.trigger.as_ref()
    }

    pub fn combat(&self) -> Option<&RwLock<CombatComponent>> {
        self.combat.as_ref()
    }

    pub fn mobile(&self) -> Option<&RwLock<MobileComponent>> {
        self.mobile.as_ref()
    }

    pub fn light(&self) -> Option<&RwLock<LightSourceComponent>> {
        self.light.as_ref()
    }

    pub fn static_shadow(&self) -> Option<&RwLock<StaticShadowComponent>> {
        self.shadow.as_ref()
    }

    pub fn emitter(&self) -> Option<&RwLock<EmitterComponent>> {
        self.emitter.as_ref()
    }

    pub fn spawnpoint(&self) -> Option<&RwLock<SpawnpointComponent>> {
        self.spawnpoint.as_ref()
    }

    pub fn collider(&self) -> Option<&RwLock<ColliderComponent>> {
        self.collider.as_ref()
    }

    pub fn prop(&self) -> Option<&RwLock<PropComponent>> {
        self.prop.as_ref()
    }

    pub fn creature(&self) -> Option<&RwLock<CreatureComponent>> {
        self.creature.as_ref()
    }

    /// Collision box used purely as a static obstacle
    pub fn is_obstacle(&self) -> bool {
        self.collider.as_ref().is_some_and(|c| c.read().obstacle)
    }

    pub fn is_dead(&self) -> bool {
        self.combat.as_ref().is_some_and(|c| c.read().is_dead())
    }

    pub fn hit(&self, damage: u32) -> u32 {
        self.combat.as_ref().map_or(0, |c| c.write().hit(damage))
    }

    pub fn kill(&self) {
        if let Some(c) = &self.combat {
            c.write().kill();
        }
    }

    pub fn resurrect(&self) {
        if let Some(c) = &self.combat {
            c.write().resurrect();
        }
    }

    /// Apply a force to a mobile entity. Returns `false` for immobile entities.
    pub fn apply_force(&self, force: ForceRef) -> bool {
        match &self.mobile {
            Some(m) => {
                m.write().apply(force);
                true
            }
            None => false,
        }
    }

    pub fn forces(&self) -> Vec<ForceRef> {
        self.mobile.as_ref().map(|m| m.read().forces()).unwrap_or_default()
    }

    pub fn toggle_light(&self) {
        if let Some(light) = &self.light {
            light.write().toggle();
        }
    }

    pub fn is_emitting(&self) -> bool {
        self.emitter.as_ref().is_some_and(|e| e.read().is_active())
    }

    /// Start emitting. A contained emitter is ticked while active.
    pub fn activate_emitter(&self) {
        let Some(emitter) = &self.emitter else {
            return;
        };
        let now = self.now();
        emitter.write().activate(now);

        if let (Some(host), Some(me)) = (self.host(), self.to_ref()) {
            host.attach_updates(&me);
        }
    }

    pub fn deactivate_emitter(&self) {
        let Some(emitter) = &self.emitter else {
            return;
        };
        emitter.write().deactivate();

        if let (Some(host), Some(me)) = (self.host(), self.to_ref()) {
            host.detach_updates(&me);
        }
    }

    // ==== Controllers, actions and properties ====

    pub fn controllers(&self) -> &EntityControllers {
        &self.controllers
    }

    pub fn actions(&self) -> &EntityActionMap {
        &self.actions
    }

    pub fn properties(&self) -> &CustomProperties {
        &self.properties
    }

    /// Register a named action
    pub fn register_action<F>(&self, name: impl Into<String>, action: F)
    where
        F: Fn(&Entity) + Send + Sync + 'static,
    {
        self.actions.register(EntityAction::new(name, action));
    }

    /// Perform a named action. Unknown names are logged and ignored.
    pub fn perform(&self, name: &str) {
        if name.is_empty() {
            return;
        }

        match self.actions.get(name) {
            Some(action) => action.perform(self),
            None => log::info!(
                "entity {} could not perform the action '{}' because it isn't registered",
                self,
                name
            ),
        }
    }

    // ==== Messages ====

    /// Deliver a message.
    ///
    /// Listeners on [`ANY_MESSAGE`] run first, then the listeners registered
    /// for this exact message. Returns the reply left by a listener, if any.
    pub fn send_message(&self, sender: Option<MapId>, message: &str) -> Option<String> {
        let (any, keyed) = {
            let listeners = self.message_listeners.read();
            let any = listeners
                .get(ANY_MESSAGE)
                .map(Listeners::snapshot)
                .unwrap_or_default();
            let keyed = match message {
                ANY_MESSAGE => Vec::new(),
                _ => listeners
                    .get(message)
                    .map(Listeners::snapshot)
                    .unwrap_or_default(),
            };
            (any, keyed)
        };

        let mut event = EntityMessageEvent::new(sender, self.map_id(), message);
        for listener in any.iter().chain(keyed.iter()) {
            listener(self, &mut event);
        }
        event.reply
    }

    // ==== Environment ====

    /// The environment currently holding this entity
    pub fn host(&self) -> Option<Arc<dyn EntityHost>> {
        self.host.read().as_ref().and_then(Weak::upgrade)
    }

    /// Link the entity to its environment (or unlink it)
    pub fn set_host(&self, host: Option<Weak<dyn EntityHost>>) {
        *self.host.write() = host;
    }

    /// Whether the entity is contained in `host`
    pub fn is_hosted_by(&self, host: &dyn EntityHost) -> bool {
        self.host().is_some_and(|h| h.host_id() == host.host_id())
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded.load(Ordering::Acquire)
    }

    /// Current game time of the host (0 without a host)
    pub fn now(&self) -> u64 {
        self.host().map_or(0, |h| h.now())
    }

    /// Called by the environment once the entity is fully admitted
    pub fn loaded(&self) {
        self.loaded.store(true, Ordering::Release);
        for listener in self.loaded_listeners.snapshot() {
            listener(self);
        }
    }

    /// Called by the environment after the entity was evicted
    pub fn removed(&self) {
        self.loaded.store(false, Ordering::Release);
        for listener in self.removed_listeners.snapshot() {
            listener(self);
        }
    }

    /// Called by the environment when it unloads. Removed listeners are not
    /// notified since the entity stays contained.
    pub fn unloaded(&self) {
        self.loaded.store(false, Ordering::Release);
    }

    /// Advance the entity by one scheduler tick
    pub fn update(&self) {
        for listener in self.update_listeners.snapshot() {
            listener(self);
        }

        if let Some(emitter) = &self.emitter {
            let now = self.now();
            let finished = {
                let mut emitter = emitter.write();
                let was_active = emitter.is_active();
                emitter.update(now);
                was_active && !emitter.is_active()
            };
            if finished {
                if let (Some(host), Some(me)) = (self.host(), self.to_ref()) {
                    host.detach_updates(&me);
                }
            }
        }

        if self.trigger.is_some() {
            self.poll_trigger();
        }
    }

    // ==== Listener registration ====

    pub fn on_location_changed<F>(&self, f: F) -> ListenerId
    where
        F: Fn(&Entity) + Send + Sync + 'static,
    {
        self.location_listeners.add(Arc::new(f))
    }

    pub fn on_size_changed<F>(&self, f: F) -> ListenerId
    where
        F: Fn(&Entity) + Send + Sync + 'static,
    {
        self.size_listeners.add(Arc::new(f))
    }

    /// Listen to one specific message
    pub fn on_message<F>(&self, message: &str, f: F) -> ListenerId
    where
        F: Fn(&Entity, &mut EntityMessageEvent) + Send + Sync + 'static,
    {
        self.message_listeners
            .write()
            .entry(message.to_string())
            .or_default()
            .add(Arc::new(f))
    }

    /// Listen to every message
    pub fn on_any_message<F>(&self, f: F) -> ListenerId
    where
        F: Fn(&Entity, &mut EntityMessageEvent) + Send + Sync + 'static,
    {
        self.on_message(ANY_MESSAGE, f)
    }

    pub fn on_rendering<F>(&self, f: F) -> ListenerId
    where
        F: Fn(&Entity, &EntityRenderEvent) + Send + Sync + 'static,
    {
        self.rendering_listeners.add(Arc::new(f))
    }

    pub fn on_rendered<F>(&self, f: F) -> ListenerId
    where
        F: Fn(&Entity, &EntityRenderEvent) + Send + Sync + 'static,
    {
        self.rendered_listeners.add(Arc::new(f))
    }

    pub fn add_render_veto<F>(&self, f: F) -> ListenerId
    where
        F: Fn(&Entity, &EntityRenderEvent) -> bool + Send + Sync + 'static,
    {
        self.render_vetoes.add(Arc::new(f))
    }

    pub fn on_loaded<F>(&self, f: F) -> ListenerId
    where
        F: Fn(&Entity) + Send + Sync + 'static,
    {
        self.loaded_listeners.add(Arc::new(f))
    }

    pub fn on_removed<F>(&self, f: F) -> ListenerId
    where
        F: Fn(&Entity) + Send + Sync + 'static,
    {
        self.removed_listeners.add(Arc::new(f))
    }

    pub fn on_update<F>(&self, f: F) -> ListenerId
    where
        F: Fn(&Entity) + Send + Sync + 'static,
    {
        self.update_listeners.add(Arc::new(f))
    }

    /// Remove a listener of any type
    pub fn remove_listener(&self, id: ListenerId) -> bool {
        let mut removed = false;
        for listeners in self.message_listeners.read().values() {
            removed |= listeners.remove(id);
        }

        removed |= self.location_listeners.remove(id);
        removed |= self.size_listeners.remove(id);
        removed |= self.rendering_listeners.remove(id);
        removed |= self.rendered_listeners.remove(id);
        removed |= self.render_vetoes.remove(id);
        removed |= self.loaded_listeners.remove(id);
        removed |= self.removed_listeners.remove(id);
        removed |= self.update_listeners.remove(id);
        removed
    }

    fn label(&self) -> String {
        match self.name.read().as_deref() {
            Some(name) if !name.is_empty() => name.to_string(),
            _ => self
                .kinds
                .iter()
                .next()
                .map_or("Entity", EntityKind::name)
                .to_string(),
        }
    }
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}: {}", self.map_id().raw(), self.label())
    }
}

impl fmt::Debug for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Entity")
            .field("instance", &self.instance)
            .field("map_id", &self.map_id())
            .field("name", &*self.name.read())
            .field("kinds", &self.kinds)
            .field("render_type", &self.render_type())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::EmitterInfo;
    use crate::host::testing::TestHost;
    use parking_lot::Mutex;
    use std::sync::atomic::AtomicUsize;

    fn counter() -> (Arc<AtomicUsize>, Arc<AtomicUsize>) {
        let count = Arc::new(AtomicUsize::new(0));
        (count.clone(), count)
    }

    #[test]
    fn test_transform_events_only_on_change() {
        let e = Entity::builder().with_size(10.0, 10.0).build();
        let (moved, sink) = counter();
        e.on_location_changed(move |_| {
            sink.fetch_add(1, Ordering::SeqCst);
        });
        let (resized, sink) = counter();
        e.on_size_changed(move |_| {
            sink.fetch_add(1, Ordering::SeqCst);
        });

        e.set_location(Vec2::new(5.0, 5.0));
        e.set_location(Vec2::new(5.0, 5.0));
        e.set_x(5.0);
        e.set_y(6.0);
        assert_eq!(moved.load(Ordering::SeqCst), 2);

        e.set_size(10.0, 10.0);
        e.set_width(12.0);
        assert_eq!(resized.load(Ordering::SeqCst), 1);
        assert_eq!(e.bounding_box(), Rect::new(5.0, 6.0, 12.0, 10.0));
    }

    #[test]
    fn test_collision_box_follows_transform() {
        let e = Entity::new_creature()
            .with_size(20.0, 20.0)
            .with_location(0.0, 0.0)
            .build();
        assert_eq!(e.collision_box(), Some(Rect::new(6.0, 12.0, 8.0, 8.0)));

        e.set_location(Vec2::new(100.0, 0.0));
        assert_eq!(e.collision_box(), Some(Rect::new(106.0, 12.0, 8.0, 8.0)));

        e.set_collision_valign(Valign::Top);
        assert_eq!(e.collision_box(), Some(Rect::new(106.0, 0.0, 8.0, 8.0)));

        e.set_collision_box_size(4.0, 2.0);
        assert_eq!(e.collision_box(), Some(Rect::new(108.0, 0.0, 4.0, 2.0)));
        assert_eq!(
            e.collision_box_at(Vec2::ZERO),
            Some(Rect::new(8.0, 0.0, 4.0, 2.0))
        );

        let plain = Entity::builder().build();
        assert_eq!(plain.collision_box(), None);
        assert!(!plain.has_collision());
    }

    #[test]
    fn test_message_order_and_reply() {
        let e = Entity::builder().with_map_id(3).build();
        let order = Arc::new(Mutex::new(Vec::new()));

        let sink = order.clone();
        e.on_message("greet", move |_, event| {
            sink.lock().push("keyed");
            assert_eq!(event.reply.as_deref(), Some("any"));
            event.set_reply("hello");
        });
        let sink = order.clone();
        e.on_any_message(move |_, event| {
            sink.lock().push("any");
            event.set_reply("any");
        });

        let reply = e.send_message(Some(MapId::new(1)), "greet");
        assert_eq!(reply.as_deref(), Some("hello"));
        assert_eq!(*order.lock(), vec!["any", "keyed"]);

        order.lock().clear();
        assert_eq!(e.send_message(None, "other").as_deref(), Some("any"));
        assert_eq!(e.send_message(None, ANY_MESSAGE).as_deref(), Some("any"));
        assert_eq!(*order.lock(), vec!["any", "any"]);
    }

    #[test]
    fn test_remove_listener() {
        let e = Entity::builder().build();
        let (count, sink) = counter();
        let id = e.on_message("ping", move |_, _| {
            sink.fetch_add(1, Ordering::SeqCst);
        });

        e.send_message(None, "ping");
        assert!(e.remove_listener(id));
        assert!(!e.remove_listener(id));
        e.send_message(None, "ping");
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_render_vetoes_all_must_agree() {
        let e = Entity::builder().with_map_id(1).build();
        let event = EntityRenderEvent {
            entity: e.map_id(),
            render_type: e.render_type(),
        };
        assert!(e.can_render(&event));

        e.add_render_veto(|_, _| true);
        let veto = e.add_render_veto(|_, _| false);
        assert!(!e.can_render(&event));

        e.remove_listener(veto);
        assert!(e.can_render(&event));
    }

    #[test]
    fn test_tags_notify_host() {
        let host = TestHost::new();
        let e = Entity::builder().with_map_id(7).with_tag("enemy").build();
        host.add(&e);

        e.add_tag("enemy");
        e.add_tag("boss");
        e.remove_tag("nope");
        e.remove_tag("enemy");
        assert_eq!(e.tags(), vec!["boss".to_string()]);
        assert_eq!(host.log(), vec!["+boss #7".to_string(), "-enemy #7".to_string()]);
    }

    #[test]
    fn test_render_type_change_notifies_host() {
        let host = TestHost::new();
        let e = Entity::builder().with_map_id(2).build();
        host.add(&e);

        e.set_render_type(RenderType::Normal);
        e.set_render_type(RenderType::Overlay);
        assert_eq!(host.log(), vec!["render #2 NORMAL -> OVERLAY".to_string()]);
    }

    #[test]
    fn test_collision_type_change_reattaches_physics() {
        let host = TestHost::new();
        let e = Entity::new_creature().with_map_id(4).build();
        assert!(e.set_collision_type(CollisionType::Static));
        assert!(host.log().is_empty());

        host.add(&e);
        assert!(!e.set_collision_type(CollisionType::Any));
        assert!(host.log().is_empty());

        assert!(e.set_collision_type(CollisionType::Dynamic));
        assert_eq!(host.log(), vec!["detach #4".to_string(), "attach #4".to_string()]);
        assert_eq!(e.collision_type(), Some(CollisionType::Dynamic));
    }

    #[test]
    fn test_perform_unknown_action() {
        let e = Entity::builder().build();
        e.perform("dance");

        let (count, sink) = counter();
        e.register_action("dance", move |_| {
            sink.fetch_add(1, Ordering::SeqCst);
        });
        e.perform("dance");
        e.perform("");
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_combat_actions() {
        let e = Entity::new_creature().build();
        e.perform("die");
        assert!(e.is_dead());
        e.perform("resurrect");
        assert!(!e.is_dead());
        assert_eq!(e.hit(30), 30);
    }

    #[test]
    fn test_host_link() {
        let host = TestHost::new();
        let other = TestHost::new();
        let e = Entity::builder().build();
        assert!(e.host().is_none());
        assert_eq!(e.now(), 0);

        host.add(&e);
        host.advance(250);
        assert!(e.is_hosted_by(&*host));
        assert!(!e.is_hosted_by(&*other));
        assert_eq!(e.now(), 250);
        assert!(e.is_loaded());

        drop(host);
        assert!(e.host().is_none());
    }

    #[test]
    fn test_display() {
        let named = Entity::builder().with_map_id(12).with_name("goblin").build();
        assert_eq!(named.to_string(), "#12: goblin");

        let creature = Entity::new_creature().with_map_id(3).build();
        assert_eq!(creature.to_string(), "#3: Creature");

        assert_eq!(Entity::builder().build().to_string(), "#0: Entity");
    }

    #[test]
    fn test_update_ticks_emitter() {
        let host = TestHost::new();
        let e = Entity::new_emitter(EmitterInfo {
            spawn_rate: 10,
            ..Default::default()
        })
        .build();
        host.add(&e);
        e.activate_emitter();
        e.update();
        host.advance(10);
        e.update();
        assert_eq!(e.emitter().unwrap().read().spawned(), 2);
    }

    #[test]
    fn test_map_id_is_fixed_while_hosted() {
        let host = TestHost::new();
        let e = Entity::builder().build();
        assert!(e.set_map_id(MapId::new(4)));

        host.add(&e);
        assert!(!e.set_map_id(MapId::new(9)));
        assert_eq!(e.map_id(), MapId::new(4));

        e.set_host(None);
        assert!(e.set_map_id(MapId::new(9)));
        assert_eq!(e.map_id(), MapId::new(9));
    }

    #[test]
    fn test_emitter_activation_schedules_ticks() {
        let host = TestHost::new();
        let e = Entity::new_emitter(EmitterInfo {
            activate_on_init: false,
            ..Default::default()
        })
        .with_map_id(5)
        .build();
        assert!(!e.is_tickable());
        host.add(&e);
        assert!(host.log().is_empty());

        e.activate_emitter();
        assert!(e.is_emitting());
        e.deactivate_emitter();
        assert!(!e.is_emitting());
        assert_eq!(host.log(), vec!["tick #5".to_string(), "untick #5".to_string()]);
    }

    #[test]
    fn test_finished_emitter_stops_ticking() {
        let host = TestHost::new();
        let e = Entity::new_emitter(EmitterInfo {
            spawn_rate: 10,
            duration: 50,
            ..Default::default()
        })
        .with_map_id(6)
        .build();
        host.add(&e);
        e.activate_emitter();
        e.update();
        host.advance(100);
        e.update();

        assert!(!e.is_emitting());
        assert_eq!(host.log(), vec!["tick #6".to_string(), "untick #6".to_string()]);
    }
}
