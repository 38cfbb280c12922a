//! The environment: root container of a loaded level
//!
//! An [`Environment`] owns every entity of one level. The primary index maps
//! render type to map id to entity and is authoritative: an entity is
//! contained iff it is present there. The tag and kind indices are derived
//! from it and updated in the same critical section.
//!
//! Entering and leaving a *loaded* environment runs the admission and
//! eviction procedures, which register the entity with physics, the update
//! scheduler, gravity, its controllers and the lighting layers.

use crate::config::{EnvironmentConfig, Quality};
use crate::error::{EnvironmentError, Result};
use crate::lighting::{AmbientLight, StaticShadowLayer};
use crate::loader::LoaderRegistry;
use crate::map::{MapObject, MapObjectType, TileMap};
use crate::render::{render_passes, RenderPass, RenderTarget};
use crate::scheduler::{UpdateLoop, UpdateScheduler};
use lantern_core::{Clock, InstanceId, ListenerId, Listeners, LocalIdSequence, MapId, SystemClock};
use lantern_entity::{
    Entity, EntityHost, EntityKind, EntityRef, EntityRenderEvent, Force, ForceRef, RenderType,
};
use lantern_math::{Rect, Shape};
use lantern_physics::{PhysicsEngine, PhysicsWorld};
use parking_lot::RwLock;
use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};

/// Called when an entity is added to or removed from an environment
pub type EntityListener = dyn Fn(&Environment, &EntityRef) + Send + Sync;

/// Called on environment lifecycle transitions
pub type EnvironmentListener = dyn Fn(&Environment) + Send + Sync;

/// Called after a render phase was drawn
pub type RenderPhaseListener = dyn Fn(&Environment, RenderType) + Send + Sync;

/// Normalized form of a tag, or `None` if it is blank
fn normalize_tag(tag: &str) -> Option<String> {
    let trimmed = tag.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_lowercase())
}

/// The entity indices, updated together under one lock
#[derive(Default)]
struct Indices {
    primary: BTreeMap<RenderType, BTreeMap<MapId, EntityRef>>,
    by_tag: HashMap<String, Vec<EntityRef>>,
    by_kind: HashMap<EntityKind, BTreeMap<MapId, EntityRef>>,
}

impl Indices {
    fn find(&self, id: MapId) -> Option<&EntityRef> {
        self.primary.values().find_map(|bucket| bucket.get(&id))
    }

    fn contains(&self, entity: &Entity) -> bool {
        self.find(entity.map_id()).is_some_and(|e| e.is_same(entity))
    }

    fn index_derived(&mut self, entity: &EntityRef) {
        let id = entity.map_id();
        for kind in entity.kinds().iter() {
            self.by_kind.entry(kind).or_default().insert(id, entity.clone());
        }
        for tag in entity.tags() {
            self.index_tag(entity, &tag);
        }
    }

    fn index_tag(&mut self, entity: &EntityRef, tag: &str) {
        let Some(key) = normalize_tag(tag) else {
            return;
        };
        let list = self.by_tag.entry(key).or_default();
        if !list.iter().any(|e| e.is_same(entity)) {
            list.push(entity.clone());
        }
    }

    fn unindex_tag(&mut self, entity: &Entity, tag: &str) {
        let Some(key) = normalize_tag(tag) else {
            return;
        };
        // another tag of the entity may normalize to the same key
        if entity.tags().iter().any(|t| normalize_tag(t).as_ref() == Some(&key)) {
            return;
        }
        if let Some(list) = self.by_tag.get_mut(&key) {
            list.retain(|e| !e.is_same(entity));
            if list.is_empty() {
                self.by_tag.remove(&key);
            }
        }
    }

    /// Strike an entity from every index. Returns whether it was contained.
    fn remove(&mut self, entity: &Entity) -> bool {
        let id = entity.map_id();
        let mut contained = false;
        for bucket in self.primary.values_mut() {
            if bucket.get(&id).is_some_and(|e| e.is_same(entity)) {
                bucket.remove(&id);
                contained = true;
            }
        }
        self.primary.retain(|_, bucket| !bucket.is_empty());

        self.by_tag.retain(|_, list| {
            list.retain(|e| !e.is_same(entity));
            !list.is_empty()
        });
        self.by_kind.retain(|_, entities| {
            if entities.get(&id).is_some_and(|e| e.is_same(entity)) {
                entities.remove(&id);
            }
            !entities.is_empty()
        });
        contained
    }

    fn all(&self) -> Vec<EntityRef> {
        self.primary.values().flat_map(|b| b.values().cloned()).collect()
    }
}

/// Builder for [`Environment`]
pub struct EnvironmentBuilder {
    config: EnvironmentConfig,
    map: Option<TileMap>,
    physics: Option<Arc<dyn PhysicsEngine>>,
    scheduler: Option<Arc<dyn UpdateScheduler>>,
    clock: Option<Arc<dyn Clock>>,
    loaders: Option<LoaderRegistry>,
}

impl EnvironmentBuilder {
    pub fn new() -> Self {
        Self {
            config: EnvironmentConfig::default(),
            map: None,
            physics: None,
            scheduler: None,
            clock: None,
            loaders: None,
        }
    }

    pub fn with_config(mut self, config: EnvironmentConfig) -> Self {
        self.config = config;
        self
    }

    /// Map whose objects are loaded on `init`
    pub fn with_map(mut self, map: TileMap) -> Self {
        self.map = Some(map);
        self
    }

    pub fn with_physics(mut self, physics: Arc<dyn PhysicsEngine>) -> Self {
        self.physics = Some(physics);
        self
    }

    pub fn with_scheduler(mut self, scheduler: Arc<dyn UpdateScheduler>) -> Self {
        self.scheduler = Some(scheduler);
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    /// Replace the built-in loader registry
    pub fn with_loaders(mut self, loaders: LoaderRegistry) -> Self {
        self.loaders = Some(loaders);
        self
    }

    pub fn build(self) -> Arc<Environment> {
        Arc::new_cyclic(|me| Environment {
            self_ref: me.clone(),
            id: InstanceId::next(),
            config: RwLock::new(self.config),
            map: self.map,
            physics: self
                .physics
                .unwrap_or_else(|| Arc::new(PhysicsWorld::default())),
            scheduler: self
                .scheduler
                .unwrap_or_else(|| Arc::new(UpdateLoop::new())),
            clock: self.clock.unwrap_or_else(|| Arc::new(SystemClock::new())),
            loaders: self.loaders.unwrap_or_else(LoaderRegistry::with_defaults),
            local_ids: LocalIdSequence::new(),
            initialized: AtomicBool::new(false),
            loaded: AtomicBool::new(false),
            indices: RwLock::new(Indices::default()),
            gravity_forces: RwLock::new(HashMap::new()),
            obstacles: RwLock::new(HashMap::new()),
            ambient_light: RwLock::new(None),
            static_shadows: RwLock::new(None),
            added_listeners: Listeners::new(),
            removed_listeners: Listeners::new(),
            initialized_listeners: Listeners::new(),
            loaded_listeners: Listeners::new(),
            unloaded_listeners: Listeners::new(),
            cleared_listeners: Listeners::new(),
            rendered_listeners: RwLock::new(HashMap::new()),
        })
    }
}

impl Default for EnvironmentBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Container and lifecycle root of one level.
///
/// Lifecycle: uninitialized → initialized → loaded ⇄ unloaded. `clear`
/// returns to uninitialized.
pub struct Environment {
    self_ref: Weak<Environment>,
    id: InstanceId,
    config: RwLock<EnvironmentConfig>,
    map: Option<TileMap>,
    physics: Arc<dyn PhysicsEngine>,
    scheduler: Arc<dyn UpdateScheduler>,
    clock: Arc<dyn Clock>,
    loaders: LoaderRegistry,
    local_ids: LocalIdSequence,
    initialized: AtomicBool,
    loaded: AtomicBool,

    indices: RwLock<Indices>,
    gravity_forces: RwLock<HashMap<InstanceId, ForceRef>>,
    /// Bounds registered with physics for obstacle collision boxes
    obstacles: RwLock<HashMap<InstanceId, Rect>>,
    ambient_light: RwLock<Option<Arc<AmbientLight>>>,
    static_shadows: RwLock<Option<Arc<StaticShadowLayer>>>,

    added_listeners: Listeners<EntityListener>,
    removed_listeners: Listeners<EntityListener>,
    initialized_listeners: Listeners<EnvironmentListener>,
    loaded_listeners: Listeners<EnvironmentListener>,
    unloaded_listeners: Listeners<EnvironmentListener>,
    cleared_listeners: Listeners<EnvironmentListener>,
    rendered_listeners: RwLock<HashMap<RenderType, Listeners<RenderPhaseListener>>>,
}

impl Environment {
    /// An environment without map data
    pub fn new(config: EnvironmentConfig) -> Arc<Self> {
        EnvironmentBuilder::new().with_config(config).build()
    }

    /// An environment populated from `map` on `init`
    pub fn from_map(map: TileMap) -> Arc<Self> {
        EnvironmentBuilder::new().with_map(map).build()
    }

    pub fn builder() -> EnvironmentBuilder {
        EnvironmentBuilder::new()
    }

    pub fn id(&self) -> InstanceId {
        self.id
    }

    pub fn config(&self) -> EnvironmentConfig {
        self.config.read().clone()
    }

    pub fn set_graphics_quality(&self, quality: Quality) {
        self.config.write().graphics_quality = quality;
    }

    pub fn map(&self) -> Option<&TileMap> {
        self.map.as_ref()
    }

    pub fn physics(&self) -> &Arc<dyn PhysicsEngine> {
        &self.physics
    }

    pub fn scheduler(&self) -> &Arc<dyn UpdateScheduler> {
        &self.scheduler
    }

    /// Loaders used for map objects
    pub fn loaders(&self) -> &LoaderRegistry {
        &self.loaders
    }

    /// Current game time in milliseconds
    pub fn now(&self) -> u64 {
        self.clock.now()
    }

    pub fn ambient_light(&self) -> Option<Arc<AmbientLight>> {
        self.ambient_light.read().clone()
    }

    pub fn static_shadow_layer(&self) -> Option<Arc<StaticShadowLayer>> {
        self.static_shadows.read().clone()
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized.load(Ordering::Acquire)
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded.load(Ordering::Acquire)
    }

    fn weak_host(&self) -> Weak<dyn EntityHost> {
        self.self_ref.clone()
    }

    // ==== Lifecycle ====

    /// Load the map objects and build the lighting layers. Runs once.
    pub fn init(&self) {
        if self.initialized.swap(true, Ordering::AcqRel) {
            return;
        }

        if let Some(map) = &self.map {
            for object in map.objects() {
                self.load_map_object(object);
            }
        }

        let config = self.config();
        *self.static_shadows.write() = Some(Arc::new(StaticShadowLayer::new()));
        *self.ambient_light.write() = Some(Arc::new(AmbientLight::new(
            config.ambient_color,
            config.ambient_alpha,
        )));

        log::debug!("environment {} initialized", self.id);
        for listener in self.initialized_listeners.snapshot() {
            listener(self);
        }
    }

    /// Initialize if needed, then admit every contained entity
    pub fn load(&self) {
        self.init();
        if self.is_loaded() {
            return;
        }

        if let Some(map) = &self.map {
            self.physics.set_bounds(Some(map.bounds()));
        }

        for entity in self.entities() {
            self.admit(&entity);
        }
        self.loaded.store(true, Ordering::Release);

        log::debug!("environment {} loaded", self.id);
        for listener in self.loaded_listeners.snapshot() {
            listener(self);
        }
    }

    /// Evict every contained entity. The entities stay contained.
    pub fn unload(&self) {
        if !self.is_loaded() {
            return;
        }

        for entity in self.entities() {
            self.evict(&entity);
            entity.unloaded();
        }
        self.loaded.store(false, Ordering::Release);

        log::debug!("environment {} unloaded", self.id);
        for listener in self.unloaded_listeners.snapshot() {
            listener(self);
        }
    }

    /// Dispose every entity, empty all indices and return to uninitialized.
    ///
    /// The loaded flag is kept, so a following `load` initializes again and
    /// admits the new entities right away.
    pub fn clear(&self) {
        self.physics.clear();
        self.obstacles.write().clear();

        let entities = std::mem::take(&mut *self.indices.write()).all();
        for entity in &entities {
            self.scheduler.detach(entity);
            entity.deactivate_emitter();
            entity.controllers().detach_all();
            entity.unloaded();
            entity.set_host(None);
        }

        for force in std::mem::take(&mut *self.gravity_forces.write()).into_values() {
            force.end();
        }
        *self.ambient_light.write() = None;
        *self.static_shadows.write() = None;
        self.initialized.store(false, Ordering::Release);

        log::debug!("environment {} cleared ({} entities)", self.id, entities.len());
        for listener in self.cleared_listeners.snapshot() {
            listener(self);
        }
    }

    // ==== Adding and removing ====

    /// Add an entity.
    ///
    /// An entity contained in another environment is removed there first.
    /// Entities without a map id get the next local id.
    pub fn add(&self, entity: &EntityRef) {
        if let Some(owner) = entity.host() {
            if owner.host_id() == self.id {
                if self.contains(entity) {
                    return;
                }
            } else {
                owner.remove_entity(entity);
            }
        }

        if entity.map_id().is_unset() {
            entity.set_map_id(self.local_ids.next());
        }

        let id = entity.map_id();
        if let Some(existing) = self.get(id) {
            log::warn!("{} replaces {} with the same map id", entity, existing);
            self.remove(&existing);
        }

        entity.set_host(Some(self.weak_host()));
        self.indices.write().index_derived(entity);

        if self.is_loaded() {
            self.admit(entity);
        }

        self.indices
            .write()
            .primary
            .entry(entity.render_type())
            .or_default()
            .insert(id, entity.clone());

        for listener in self.added_listeners.snapshot() {
            listener(self, entity);
        }
    }

    /// Add several entities
    pub fn add_all<'a>(&self, entities: impl IntoIterator<Item = &'a EntityRef>) {
        for entity in entities {
            self.add(entity);
        }
    }

    /// Remove an entity. Does nothing if it isn't contained.
    pub fn remove(&self, entity: &EntityRef) {
        if !self.indices.write().remove(entity) {
            return;
        }

        self.evict(entity);
        entity.removed();
        entity.set_host(None);

        for listener in self.removed_listeners.snapshot() {
            listener(self, entity);
        }
    }

    pub fn remove_by_id(&self, id: MapId) {
        match self.get(id) {
            Some(entity) => self.remove(&entity),
            None => log::info!("could not remove entity {}: not found", id),
        }
    }

    pub fn remove_by_name(&self, name: &str) {
        match self.get_by_name(name) {
            Some(entity) => self.remove(&entity),
            None => log::info!("could not remove entity '{}': not found", name),
        }
    }

    // ==== Admission and eviction ====

    fn admit(&self, entity: &EntityRef) {
        self.register_physics(entity);

        if let Some(emitter) = entity.emitter() {
            let auto_activate = emitter.read().info.activate_on_init;
            if auto_activate {
                entity.activate_emitter();
            }
            // emitters are ticked only while they emit
            if entity.is_emitting() {
                self.scheduler.attach(entity);
            }
        } else if entity.is_tickable() {
            self.scheduler.attach(entity);
        }

        let gravity = self.gravity();
        if gravity != 0.0 && entity.is(EntityKind::Mobile) {
            self.apply_gravity(entity, gravity);
        }

        entity.controllers().attach_all();
        self.invalidate_lighting(entity);

        log::debug!("admitted {}", entity);
        entity.loaded();
    }

    fn evict(&self, entity: &EntityRef) {
        self.unregister_physics(entity);

        self.scheduler.detach(entity);
        entity.deactivate_emitter();

        if let Some(force) = self.gravity_forces.write().remove(&entity.instance_id()) {
            force.end();
        }

        entity.controllers().detach_all();
        self.invalidate_lighting(entity);
        log::debug!("evicted {}", entity);
    }

    fn register_physics(&self, entity: &EntityRef) {
        if entity.is_obstacle() {
            let bounds = entity.bounding_box();
            match self.physics.add_static_bounds(bounds) {
                Ok(()) => {
                    self.obstacles.write().insert(entity.instance_id(), bounds);
                }
                Err(err) => log::warn!("{}: {}", entity, err),
            }
            return;
        }

        if entity.has_collision() {
            if let Err(err) = self.physics.add(entity) {
                log::warn!("{}: {}", entity, err);
            }
        }
    }

    fn unregister_physics(&self, entity: &EntityRef) {
        let obstacle = self.obstacles.write().remove(&entity.instance_id());
        if let Some(bounds) = obstacle {
            self.physics.remove_static_bounds(&bounds);
        }
        self.physics.remove(entity);
    }

    fn invalidate_lighting(&self, entity: &Entity) {
        if !entity.is(EntityKind::LightSource) && !entity.is(EntityKind::StaticShadow) {
            return;
        }

        let area = entity.bounding_box();
        if let Some(light) = self.ambient_light() {
            light.dirty().invalidate(area);
        }
        if let Some(shadows) = self.static_shadow_layer() {
            shadows.dirty().invalidate(area);
        }
    }

    fn invalidate_all_lighting(&self) {
        if let Some(light) = self.ambient_light() {
            light.dirty().invalidate_all();
        }
        if let Some(shadows) = self.static_shadow_layer() {
            shadows.dirty().invalidate_all();
        }
    }

    // ==== Gravity ====

    pub fn gravity(&self) -> f64 {
        self.config.read().gravity
    }

    /// Number of gravity forces currently applied
    pub fn gravity_force_count(&self) -> usize {
        self.gravity_forces.read().len()
    }

    /// The gravity force applied to an entity, if any
    pub fn gravity_force(&self, entity: &Entity) -> Option<ForceRef> {
        self.gravity_forces.read().get(&entity.instance_id()).cloned()
    }

    /// Change the gravity.
    ///
    /// If there is one force per mobile entity, the existing forces are
    /// updated in place. Otherwise every force is rebuilt.
    pub fn set_gravity(&self, gravity: f64) {
        self.config.write().gravity = gravity;

        if gravity == 0.0 {
            for force in std::mem::take(&mut *self.gravity_forces.write()).into_values() {
                force.end();
            }
            return;
        }

        let mobiles = self.mobile_entities();
        {
            let forces = self.gravity_forces.read();
            if forces.len() == mobiles.len() {
                for force in forces.values() {
                    force.set_strength(gravity);
                }
                return;
            }
        }

        log::debug!(
            "rebuilding gravity forces ({} tracked, {} mobile entities)",
            self.gravity_force_count(),
            mobiles.len()
        );
        for force in std::mem::take(&mut *self.gravity_forces.write()).into_values() {
            force.end();
        }
        for entity in &mobiles {
            self.apply_gravity(entity, gravity);
        }
    }

    fn apply_gravity(&self, entity: &EntityRef, gravity: f64) {
        let force = Arc::new(Force::gravity(gravity));
        if !entity.apply_force(force.clone()) {
            return;
        }
        if let Some(previous) = self.gravity_forces.write().insert(entity.instance_id(), force) {
            previous.end();
        }
    }

    // ==== Lookups ====

    pub fn get(&self, id: MapId) -> Option<EntityRef> {
        self.indices.read().find(id).cloned()
    }

    /// Entities for the given ids. Unknown ids are skipped.
    pub fn get_many(&self, ids: &[MapId]) -> Vec<EntityRef> {
        let indices = self.indices.read();
        ids.iter().filter_map(|id| indices.find(*id).cloned()).collect()
    }

    /// First entity with the given name
    pub fn get_by_name(&self, name: &str) -> Option<EntityRef> {
        if name.is_empty() {
            return None;
        }
        self.indices
            .read()
            .all()
            .into_iter()
            .find(|e| e.name().as_deref() == Some(name))
    }

    /// Entities of one kind, ordered by map id
    pub fn get_by_kind(&self, kind: EntityKind) -> Vec<EntityRef> {
        self.indices
            .read()
            .by_kind
            .get(&kind)
            .map(|entities| entities.values().cloned().collect())
            .unwrap_or_default()
    }

    /// Entity of one kind with the given id
    pub fn get_of_kind(&self, kind: EntityKind, id: MapId) -> Option<EntityRef> {
        self.indices.read().by_kind.get(&kind)?.get(&id).cloned()
    }

    /// Entities carrying a tag (case-insensitive)
    pub fn get_by_tag(&self, tag: &str) -> Vec<EntityRef> {
        let Some(key) = normalize_tag(tag) else {
            return Vec::new();
        };
        self.indices.read().by_tag.get(&key).cloned().unwrap_or_default()
    }

    /// Entities of one kind carrying a tag
    pub fn get_by_tag_of(&self, kind: EntityKind, tag: &str) -> Vec<EntityRef> {
        self.get_by_tag(tag).into_iter().filter(|e| e.is(kind)).collect()
    }

    /// Every tag in use
    pub fn used_tags(&self) -> Vec<String> {
        let mut tags: Vec<String> = self.indices.read().by_tag.keys().cloned().collect();
        tags.sort();
        tags
    }

    /// Every contained entity, in render order
    pub fn entities(&self) -> Vec<EntityRef> {
        self.indices.read().all()
    }

    /// Entities of one render phase
    pub fn entities_of(&self, render_type: RenderType) -> Vec<EntityRef> {
        self.indices
            .read()
            .primary
            .get(&render_type)
            .map(|bucket| bucket.values().cloned().collect())
            .unwrap_or_default()
    }

    pub fn contains(&self, entity: &Entity) -> bool {
        self.indices.read().contains(entity)
    }

    pub fn contains_id(&self, id: MapId) -> bool {
        self.indices.read().find(id).is_some()
    }

    pub fn len(&self) -> usize {
        self.indices.read().primary.values().map(BTreeMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn combat_entities(&self) -> Vec<EntityRef> {
        self.get_by_kind(EntityKind::Combat)
    }

    pub fn mobile_entities(&self) -> Vec<EntityRef> {
        self.get_by_kind(EntityKind::Mobile)
    }

    pub fn creatures(&self) -> Vec<EntityRef> {
        self.get_by_kind(EntityKind::Creature)
    }

    pub fn triggers(&self) -> Vec<EntityRef> {
        self.get_by_kind(EntityKind::Trigger)
    }

    pub fn light_sources(&self) -> Vec<EntityRef> {
        self.get_by_kind(EntityKind::LightSource)
    }

    pub fn static_shadows(&self) -> Vec<EntityRef> {
        self.get_by_kind(EntityKind::StaticShadow)
    }

    pub fn spawnpoints(&self) -> Vec<EntityRef> {
        self.get_by_kind(EntityKind::Spawnpoint)
    }

    // ==== Shape queries ====

    /// Entities whose bounding box intersects `shape`
    pub fn find_entities(&self, shape: &Shape) -> Vec<EntityRef> {
        self.entities()
            .into_iter()
            .filter(|e| Self::hits(shape, &e.bounding_box()))
            .collect()
    }

    /// Combat entities whose collision box intersects `shape` and which
    /// satisfy `condition`
    pub fn find_combat_entities<F>(&self, shape: &Shape, condition: F) -> Vec<EntityRef>
    where
        F: Fn(&Entity) -> bool,
    {
        self.combat_entities()
            .into_iter()
            .filter(|e| {
                let area = e.collision_box().unwrap_or_else(|| e.bounding_box());
                Self::hits(shape, &area) && condition(&**e)
            })
            .collect()
    }

    fn hits(shape: &Shape, area: &Rect) -> bool {
        shape.bounds().intersects(area) && (shape.is_rect() || shape.intersects_rect(area))
    }

    // ==== Map objects ====

    /// Create and add the entities described by a map object.
    ///
    /// A loader failure skips the record.
    pub fn load_map_object(&self, object: &MapObject) -> Vec<EntityRef> {
        match self.loaders.load(object) {
            Ok(entities) => {
                for entity in &entities {
                    self.add(entity);
                }
                entities
            }
            Err(err) => {
                log::warn!("skipping map object: {}", err);
                Vec::new()
            }
        }
    }

    /// Load a single object of the attached map by id
    pub fn load_from_map(&self, id: i32) -> Result<Vec<EntityRef>> {
        let map = self.map.as_ref().ok_or(EnvironmentError::NoMap)?;
        let object = map
            .object(id)
            .ok_or(EnvironmentError::UnknownMapObject(id))?;

        let entities = self.load_map_object(object);
        if matches!(
            object.object_type(),
            Some(MapObjectType::StaticShadow | MapObjectType::LightSource)
        ) {
            self.invalidate_all_lighting();
        }
        Ok(entities)
    }

    /// Remove the entity with the given id and load it again from the map
    pub fn reload_from_map(&self, id: i32) -> Result<Vec<EntityRef>> {
        if let Some(entity) = self.get(MapId::new(id)) {
            self.remove(&entity);
        }
        self.load_from_map(id)
    }

    // ==== Rendering ====

    /// Draw one frame
    pub fn render(&self, target: &mut dyn RenderTarget) {
        let quality = self.config.read().graphics_quality;
        let shadow_layer = self.static_shadow_layer();
        let ambient_light = self.ambient_light();

        let casters: Vec<EntityRef> = self
            .static_shadows()
            .into_iter()
            .filter(|e| e.static_shadow().is_some_and(|s| s.read().casts_shadow()))
            .collect();
        let draw_shadows = shadow_layer.is_some() && !casters.is_empty();
        let draw_light = ambient_light.as_ref().is_some_and(|l| l.is_visible(quality));

        for pass in render_passes(draw_shadows, draw_light) {
            match pass {
                RenderPass::Entities(phase) => self.render_phase(target, phase),
                RenderPass::StaticShadows => {
                    if let Some(layer) = &shadow_layer {
                        target.render_static_shadows(layer, &casters);
                    }
                }
                RenderPass::AmbientLight => {
                    if let Some(light) = &ambient_light {
                        target.render_ambient_light(light, &self.light_sources());
                    }
                }
            }
        }
    }

    fn render_phase(&self, target: &mut dyn RenderTarget, phase: RenderType) {
        let visible: Vec<(EntityRef, EntityRenderEvent)> = self
            .entities_of(phase)
            .into_iter()
            .map(|e| {
                let event = EntityRenderEvent {
                    entity: e.map_id(),
                    render_type: phase,
                };
                (e, event)
            })
            .filter(|(e, event)| e.can_render(event))
            .collect();

        for (entity, event) in &visible {
            entity.fire_rendering(event);
        }
        let entities: Vec<EntityRef> = visible.iter().map(|(e, _)| e.clone()).collect();
        target.render_entities(phase, &entities);
        for (entity, event) in &visible {
            entity.fire_rendered(event);
        }

        let listeners = self
            .rendered_listeners
            .read()
            .get(&phase)
            .map(Listeners::snapshot)
            .unwrap_or_default();
        for listener in listeners {
            listener(self, phase);
        }
    }

    // ==== Listeners ====

    pub fn on_entity_added<F>(&self, f: F) -> ListenerId
    where
        F: Fn(&Environment, &EntityRef) + Send + Sync + 'static,
    {
        self.added_listeners.add(Arc::new(f))
    }

    pub fn on_entity_removed<F>(&self, f: F) -> ListenerId
    where
        F: Fn(&Environment, &EntityRef) + Send + Sync + 'static,
    {
        self.removed_listeners.add(Arc::new(f))
    }

    pub fn on_initialized<F>(&self, f: F) -> ListenerId
    where
        F: Fn(&Environment) + Send + Sync + 'static,
    {
        self.initialized_listeners.add(Arc::new(f))
    }

    pub fn on_loaded<F>(&self, f: F) -> ListenerId
    where
        F: Fn(&Environment) + Send + Sync + 'static,
    {
        self.loaded_listeners.add(Arc::new(f))
    }

    pub fn on_unloaded<F>(&self, f: F) -> ListenerId
    where
        F: Fn(&Environment) + Send + Sync + 'static,
    {
        self.unloaded_listeners.add(Arc::new(f))
    }

    pub fn on_cleared<F>(&self, f: F) -> ListenerId
    where
        F: Fn(&Environment) + Send + Sync + 'static,
    {
        self.cleared_listeners.add(Arc::new(f))
    }

    /// Called after every frame's `phase` was drawn
    pub fn on_rendered<F>(&self, phase: RenderType, f: F) -> ListenerId
    where
        F: Fn(&Environment, RenderType) + Send + Sync + 'static,
    {
        self.rendered_listeners
            .write()
            .entry(phase)
            .or_default()
            .add(Arc::new(f))
    }

    /// Remove a listener of any type
    pub fn remove_listener(&self, id: ListenerId) -> bool {
        let mut removed = false;
        for listeners in self.rendered_listeners.read().values() {
            removed |= listeners.remove(id);
        }

        removed |= self.added_listeners.remove(id);
        removed |= self.removed_listeners.remove(id);
        removed |= self.initialized_listeners.remove(id);
        removed |= self.loaded_listeners.remove(id);
        removed |= self.unloaded_listeners.remove(id);
        removed |= self.cleared_listeners.remove(id);
        removed
    }
}

impl EntityHost for Environment {
    fn host_id(&self) -> InstanceId {
        self.id
    }

    fn is_loaded(&self) -> bool {
        Environment::is_loaded(self)
    }

    fn now(&self) -> u64 {
        self.clock.now()
    }

    fn get(&self, id: MapId) -> Option<EntityRef> {
        Environment::get(self, id)
    }

    fn remove_entity(&self, entity: &EntityRef) {
        self.remove(entity);
    }

    fn collision_entities(&self) -> Vec<EntityRef> {
        self.physics
            .collision_entities()
            .into_iter()
            .filter(|e| e.is_hosted_by(self))
            .collect()
    }

    fn tag_added(&self, entity: &EntityRef, tag: &str) {
        let mut indices = self.indices.write();
        if indices.contains(entity) {
            indices.index_tag(entity, tag);
        }
    }

    fn tag_removed(&self, entity: &EntityRef, tag: &str) {
        let mut indices = self.indices.write();
        if indices.contains(entity) {
            indices.unindex_tag(entity, tag);
        }
    }

    fn render_type_changed(&self, entity: &EntityRef, previous: RenderType) {
        let id = entity.map_id();
        let mut indices = self.indices.write();
        let moved = indices
            .primary
            .get_mut(&previous)
            .filter(|bucket| bucket.get(&id).is_some_and(|e| e.is_same(entity)))
            .and_then(|bucket| bucket.remove(&id));

        if let Some(entity) = moved {
            indices.primary.retain(|_, bucket| !bucket.is_empty());
            indices
                .primary
                .entry(entity.render_type())
                .or_default()
                .insert(id, entity);
        }
    }

    fn detach_physics(&self, entity: &EntityRef) {
        self.unregister_physics(entity);
    }

    fn attach_physics(&self, entity: &EntityRef) {
        self.register_physics(entity);
    }

    fn attach_updates(&self, entity: &EntityRef) {
        if self.is_loaded() && self.contains(entity) {
            self.scheduler.attach(entity);
        }
    }

    fn detach_updates(&self, entity: &EntityRef) {
        self.scheduler.detach(entity);
    }
}

impl std::fmt::Debug for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Environment")
            .field("id", &self.id)
            .field("initialized", &self.is_initialized())
            .field("loaded", &self.is_loaded())
            .field("entities", &self.len())
            .finish()
    }
}
