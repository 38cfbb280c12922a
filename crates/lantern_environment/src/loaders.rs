//! Built-in map object loaders

use crate::error::LoaderError;
use crate::loader::{apply_default_properties, LoadResult, LoaderRegistry, MapObjectLoader};
use crate::map::{keys, MapObject, MapObjectType};
use core::str::FromStr;
use lantern_core::MapId;
use lantern_entity::{
    CollisionInfo, CollisionType, CombatInfo, CreatureComponent, Direction, EmitterInfo, Entity,
    LightInfo, LightShape, MobileInfo, PropComponent, PropertyProvider, StaticShadowType,
};
use lantern_math::{Align, Valign};
use lantern_triggers::TriggerActivation;

/// Register every built-in loader
pub fn register_defaults(registry: &LoaderRegistry) {
    registry.register(CreatureLoader);
    registry.register(PropLoader);
    registry.register(TriggerLoader);
    registry.register(CollisionBoxLoader);
    registry.register(LightSourceLoader);
    registry.register(StaticShadowLoader);
    registry.register(SpawnpointLoader);
    registry.register(AreaLoader);
    registry.register(EmitterLoader);
}

/// Parse an optional property; a present but malformed value fails the record
fn parse_strict<T: FromStr>(object: &MapObject, key: &str) -> Result<Option<T>, LoaderError> {
    match object.string_value(key) {
        Some(raw) => raw.trim().parse().map(Some).map_err(|_| {
            LoaderError::cannot_interpret(
                object.id,
                object.kind.clone(),
                format!("invalid value '{}' for {}", raw, key),
            )
        }),
        None => Ok(None),
    }
}

fn collision_info(object: &MapObject, defaults: CollisionInfo) -> Result<CollisionInfo, LoaderError> {
    let mut info = defaults;
    info.enabled = object.bool_value(keys::COLLISION, info.enabled);
    info.box_width = object.f64_value(keys::COLLISIONBOX_WIDTH, info.box_width);
    info.box_height = object.f64_value(keys::COLLISIONBOX_HEIGHT, info.box_height);
    if let Some(align) = object.string_value(keys::COLLISION_ALIGN) {
        info.align = Align::parse_or_default(&align);
    }
    if let Some(valign) = object.string_value(keys::COLLISION_VALIGN) {
        info.valign = Valign::parse_or_default(&valign);
    }

    match parse_strict::<CollisionType>(object, keys::COLLISION_TYPE)? {
        Some(CollisionType::Any) => log::warn!(
            "map object #{}: CollisionType::Any can't be assigned to an entity, keeping {}",
            object.id,
            info.collision_type
        ),
        Some(collision_type) => info.collision_type = collision_type,
        None => {}
    }
    Ok(info)
}

fn combat_info(object: &MapObject) -> CombatInfo {
    let defaults = CombatInfo::default();
    CombatInfo {
        hit_points: object.u32_value(keys::COMBAT_HEALTH, defaults.hit_points),
        team: object.int_value(keys::COMBAT_TEAM, defaults.team),
        indestructible: object.bool_value(keys::COMBAT_INDESTRUCTIBLE, defaults.indestructible),
    }
}

fn mobile_info(object: &MapObject) -> MobileInfo {
    let defaults = MobileInfo::default();
    MobileInfo {
        velocity: object.f64_value(keys::MOVEMENT_VELOCITY, defaults.velocity),
        acceleration: object.u32_value(keys::MOVEMENT_ACCELERATION, defaults.acceleration),
        deceleration: object.u32_value(keys::MOVEMENT_DECELERATION, defaults.deceleration),
        turn_on_move: object.bool_value(keys::MOVEMENT_TURN_ON_MOVE, defaults.turn_on_move),
    }
}

fn map_ids(object: &MapObject, key: &str) -> Vec<MapId> {
    object
        .parsed_list::<i32>(key)
        .into_iter()
        .map(MapId::new)
        .collect()
}

/// `CREATURE`: combat, movement and dynamic collision
pub struct CreatureLoader;

impl MapObjectLoader for CreatureLoader {
    fn kind(&self) -> &str {
        MapObjectType::Creature.name()
    }

    fn load(&self, object: &MapObject) -> LoadResult {
        let builder = Entity::new_creature()
            .with_creature(CreatureComponent {
                sprite_sheet: object.string_value(keys::SPRITESHEET_NAME),
            })
            .with_combat(combat_info(object))
            .with_mobile(mobile_info(object))
            .with_collision(collision_info(object, CollisionInfo::default())?);

        Ok(vec![apply_default_properties(builder, object).build()])
    }
}

/// `PROP`: combat and static collision
pub struct PropLoader;

impl MapObjectLoader for PropLoader {
    fn kind(&self) -> &str {
        MapObjectType::Prop.name()
    }

    fn load(&self, object: &MapObject) -> LoadResult {
        let defaults = CollisionInfo::default().with_collision_type(CollisionType::Static);
        let builder = Entity::new_prop(None)
            .with_prop(PropComponent {
                material: object.string_value(keys::PROP_MATERIAL),
                sprite_sheet: object.string_value(keys::SPRITESHEET_NAME),
            })
            .with_combat(combat_info(object))
            .with_collision(collision_info(object, defaults)?);

        Ok(vec![apply_default_properties(builder, object).build()])
    }
}

/// `TRIGGER`
pub struct TriggerLoader;

impl MapObjectLoader for TriggerLoader {
    fn kind(&self) -> &str {
        MapObjectType::Trigger.name()
    }

    fn load(&self, object: &MapObject) -> LoadResult {
        let activation = parse_strict::<TriggerActivation>(object, keys::TRIGGER_ACTIVATION)?
            .unwrap_or_default();
        let message = object.property(keys::TRIGGER_MESSAGE).unwrap_or_default();

        let mut builder = Entity::new_trigger(activation, message);
        if let Some(info) = builder.trigger_mut() {
            info.one_shot = object.bool_value(keys::TRIGGER_ONETIME, false);
            info.cooldown = object.u64_value(keys::TRIGGER_COOLDOWN, 0);
            info.targets = map_ids(object, keys::TRIGGER_TARGETS);
            info.activators = map_ids(object, keys::TRIGGER_ACTIVATORS).into_iter().collect();
        }

        Ok(vec![apply_default_properties(builder, object).build()])
    }
}

/// `COLLISIONBOX`: static level geometry. Boxes that obstruct light also
/// cast a static shadow.
pub struct CollisionBoxLoader;

impl MapObjectLoader for CollisionBoxLoader {
    fn kind(&self) -> &str {
        MapObjectType::CollisionBox.name()
    }

    fn load(&self, object: &MapObject) -> LoadResult {
        let obstacle = object.bool_value(keys::COLLISIONBOX_OBSTACLE, true);
        let obstructing = object.bool_value(keys::COLLISIONBOX_OBSTRUCTING_LIGHTS, false);

        let collider = apply_default_properties(Entity::new_collision_box(obstacle, obstructing), object).build();
        if !obstructing {
            return Ok(vec![collider]);
        }

        let shadow_type = parse_strict::<StaticShadowType>(object, keys::SHADOW_TYPE)?
            .unwrap_or(StaticShadowType::Down);
        let offset = object.int_value(keys::SHADOW_OFFSET, 0);
        let mut shadow = Entity::new_static_shadow(shadow_type, offset)
            .with_size(object.width, object.height)
            .with_location(object.x, object.y);
        if let Some(name) = object.name.as_deref().filter(|n| !n.is_empty()) {
            shadow = shadow.with_name(name);
        }

        Ok(vec![collider, shadow.build()])
    }
}

/// `LIGHTSOURCE`
pub struct LightSourceLoader;

impl MapObjectLoader for LightSourceLoader {
    fn kind(&self) -> &str {
        MapObjectType::LightSource.name()
    }

    fn load(&self, object: &MapObject) -> LoadResult {
        let defaults = LightInfo::default();
        let info = LightInfo {
            brightness: object.u32_value(keys::LIGHT_BRIGHTNESS, defaults.brightness),
            intensity: object.u32_value(keys::LIGHT_INTENSITY, defaults.intensity),
            color: object.string_value(keys::LIGHT_COLOR).unwrap_or(defaults.color),
            shape: parse_strict::<LightShape>(object, keys::LIGHT_SHAPE)?.unwrap_or(defaults.shape),
            active: object.bool_value(keys::LIGHT_ACTIVE, defaults.active),
        };

        Ok(vec![apply_default_properties(Entity::new_light_source(info), object).build()])
    }
}

/// `STATICSHADOW`
pub struct StaticShadowLoader;

impl MapObjectLoader for StaticShadowLoader {
    fn kind(&self) -> &str {
        MapObjectType::StaticShadow.name()
    }

    fn load(&self, object: &MapObject) -> LoadResult {
        let shadow_type = parse_strict::<StaticShadowType>(object, keys::SHADOW_TYPE)?
            .unwrap_or(StaticShadowType::Down);
        let offset = object.int_value(keys::SHADOW_OFFSET, 0);

        Ok(vec![apply_default_properties(Entity::new_static_shadow(shadow_type, offset), object).build()])
    }
}

/// `SPAWNPOINT`
pub struct SpawnpointLoader;

impl MapObjectLoader for SpawnpointLoader {
    fn kind(&self) -> &str {
        MapObjectType::Spawnpoint.name()
    }

    fn load(&self, object: &MapObject) -> LoadResult {
        let direction = parse_strict::<Direction>(object, keys::SPAWN_DIRECTION)?.unwrap_or_default();
        let builder = Entity::new_spawnpoint(direction, object.string_value(keys::SPAWN_TYPE));

        Ok(vec![apply_default_properties(builder, object).build()])
    }
}

/// `AREA`
pub struct AreaLoader;

impl MapObjectLoader for AreaLoader {
    fn kind(&self) -> &str {
        MapObjectType::Area.name()
    }

    fn load(&self, object: &MapObject) -> LoadResult {
        Ok(vec![apply_default_properties(Entity::new_map_area(), object).build()])
    }
}

/// `EMITTER`
pub struct EmitterLoader;

impl MapObjectLoader for EmitterLoader {
    fn kind(&self) -> &str {
        MapObjectType::Emitter.name()
    }

    fn load(&self, object: &MapObject) -> LoadResult {
        let defaults = EmitterInfo::default();
        let info = EmitterInfo {
            activate_on_init: object.bool_value(keys::EMITTER_ACTIVATE_ON_INIT, defaults.activate_on_init),
            spawn_rate: object.u32_value(keys::EMITTER_SPAWN_RATE, defaults.spawn_rate),
            spawn_amount: object.u32_value(keys::EMITTER_SPAWN_AMOUNT, defaults.spawn_amount),
            max_particles: object.u32_value(keys::EMITTER_MAX_PARTICLES, defaults.max_particles),
            duration: object.u64_value(keys::EMITTER_DURATION, defaults.duration),
            particle_min_ttl: object.u32_value(keys::EMITTER_PARTICLE_MIN_TTL, defaults.particle_min_ttl),
            particle_max_ttl: object.u32_value(keys::EMITTER_PARTICLE_MAX_TTL, defaults.particle_max_ttl),
            particle_type: object
                .string_value(keys::EMITTER_PARTICLE_TYPE)
                .unwrap_or(defaults.particle_type),
            colors: object.list_value(keys::EMITTER_COLORS),
        };

        Ok(vec![apply_default_properties(Entity::new_emitter(info), object).build()])
    }
}
