//! Declarative map data
//!
//! A [`TileMap`] holds layers of [`MapObject`] records. Each record names
//! the kind of entity it describes and carries its geometry plus a bag of
//! string properties (see [`keys`]).

use crate::error::Result;
use core::fmt;
use core::str::FromStr;
use lantern_core::{MapId, ParseEnumError};
use lantern_entity::PropertyProvider;
use lantern_math::{Rect, Vec2};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Property names understood by the built-in loaders
pub mod keys {
    pub const TAGS: &str = "tags";
    pub const RENDER_TYPE: &str = "renderType";

    pub const COLLISION: &str = "collision";
    pub const COLLISION_ALIGN: &str = "collisionAlign";
    pub const COLLISION_VALIGN: &str = "collisionValign";
    pub const COLLISION_TYPE: &str = "collisionType";
    pub const COLLISIONBOX_WIDTH: &str = "collisionBoxWidth";
    pub const COLLISIONBOX_HEIGHT: &str = "collisionBoxHeight";
    pub const COLLISIONBOX_OBSTACLE: &str = "isObstacle";
    pub const COLLISIONBOX_OBSTRUCTING_LIGHTS: &str = "isObstructingLight";

    pub const COMBAT_HEALTH: &str = "health";
    pub const COMBAT_TEAM: &str = "team";
    pub const COMBAT_INDESTRUCTIBLE: &str = "indestructible";

    pub const MOVEMENT_VELOCITY: &str = "velocity";
    pub const MOVEMENT_ACCELERATION: &str = "acceleration";
    pub const MOVEMENT_DECELERATION: &str = "deceleration";
    pub const MOVEMENT_TURN_ON_MOVE: &str = "turnOnMove";

    pub const SPRITESHEET_NAME: &str = "spritesheetName";
    pub const PROP_MATERIAL: &str = "material";

    pub const LIGHT_BRIGHTNESS: &str = "lightBrightness";
    pub const LIGHT_COLOR: &str = "lightColor";
    pub const LIGHT_INTENSITY: &str = "lightIntensity";
    pub const LIGHT_SHAPE: &str = "lightShape";
    pub const LIGHT_ACTIVE: &str = "lightActive";

    pub const SHADOW_TYPE: &str = "shadowType";
    pub const SHADOW_OFFSET: &str = "shadowOffset";

    pub const SPAWN_TYPE: &str = "spawnType";
    pub const SPAWN_DIRECTION: &str = "spawnDirection";

    pub const TRIGGER_ACTIVATION: &str = "triggerActivation";
    pub const TRIGGER_MESSAGE: &str = "triggerMessage";
    pub const TRIGGER_ONETIME: &str = "triggerOneTime";
    pub const TRIGGER_ACTIVATORS: &str = "triggerActivators";
    pub const TRIGGER_TARGETS: &str = "triggerTargets";
    pub const TRIGGER_COOLDOWN: &str = "triggerCooldown";

    pub const EMITTER_ACTIVATE_ON_INIT: &str = "emitterActivateOnInit";
    pub const EMITTER_SPAWN_RATE: &str = "emitterSpawnRate";
    pub const EMITTER_SPAWN_AMOUNT: &str = "emitterSpawnAmount";
    pub const EMITTER_MAX_PARTICLES: &str = "emitterMaxParticles";
    pub const EMITTER_DURATION: &str = "emitterDuration";
    pub const EMITTER_PARTICLE_MIN_TTL: &str = "particleMinTTL";
    pub const EMITTER_PARTICLE_MAX_TTL: &str = "particleMaxTTL";
    pub const EMITTER_PARTICLE_TYPE: &str = "emitterParticleType";
    pub const EMITTER_COLORS: &str = "emitterColors";

    /// Properties consumed by the built-in loaders
    pub const RESERVED: &[&str] = &[
        TAGS,
        RENDER_TYPE,
        COLLISION,
        COLLISION_ALIGN,
        COLLISION_VALIGN,
        COLLISION_TYPE,
        COLLISIONBOX_WIDTH,
        COLLISIONBOX_HEIGHT,
        COLLISIONBOX_OBSTACLE,
        COLLISIONBOX_OBSTRUCTING_LIGHTS,
        COMBAT_HEALTH,
        COMBAT_TEAM,
        COMBAT_INDESTRUCTIBLE,
        MOVEMENT_VELOCITY,
        MOVEMENT_ACCELERATION,
        MOVEMENT_DECELERATION,
        MOVEMENT_TURN_ON_MOVE,
        SPRITESHEET_NAME,
        PROP_MATERIAL,
        LIGHT_BRIGHTNESS,
        LIGHT_COLOR,
        LIGHT_INTENSITY,
        LIGHT_SHAPE,
        LIGHT_ACTIVE,
        SHADOW_TYPE,
        SHADOW_OFFSET,
        SPAWN_TYPE,
        SPAWN_DIRECTION,
        TRIGGER_ACTIVATION,
        TRIGGER_MESSAGE,
        TRIGGER_ONETIME,
        TRIGGER_ACTIVATORS,
        TRIGGER_TARGETS,
        TRIGGER_COOLDOWN,
        EMITTER_ACTIVATE_ON_INIT,
        EMITTER_SPAWN_RATE,
        EMITTER_SPAWN_AMOUNT,
        EMITTER_MAX_PARTICLES,
        EMITTER_DURATION,
        EMITTER_PARTICLE_MIN_TTL,
        EMITTER_PARTICLE_MAX_TTL,
        EMITTER_PARTICLE_TYPE,
        EMITTER_COLORS,
    ];

    /// Whether a property is game specific and gets copied onto the entity
    pub fn is_custom(name: &str) -> bool {
        !RESERVED.iter().any(|k| k.eq_ignore_ascii_case(name))
    }
}

/// Kinds of map objects with a built-in loader
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MapObjectType {
    Creature,
    Prop,
    Trigger,
    CollisionBox,
    LightSource,
    StaticShadow,
    Spawnpoint,
    Area,
    Emitter,
}

impl MapObjectType {
    pub const ALL: [MapObjectType; 9] = [
        MapObjectType::Creature,
        MapObjectType::Prop,
        MapObjectType::Trigger,
        MapObjectType::CollisionBox,
        MapObjectType::LightSource,
        MapObjectType::StaticShadow,
        MapObjectType::Spawnpoint,
        MapObjectType::Area,
        MapObjectType::Emitter,
    ];

    /// Name used as the kind string of a map object
    pub const fn name(self) -> &'static str {
        match self {
            MapObjectType::Creature => "CREATURE",
            MapObjectType::Prop => "PROP",
            MapObjectType::Trigger => "TRIGGER",
            MapObjectType::CollisionBox => "COLLISIONBOX",
            MapObjectType::LightSource => "LIGHTSOURCE",
            MapObjectType::StaticShadow => "STATICSHADOW",
            MapObjectType::Spawnpoint => "SPAWNPOINT",
            MapObjectType::Area => "AREA",
            MapObjectType::Emitter => "EMITTER",
        }
    }
}

impl FromStr for MapObjectType {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> core::result::Result<Self, Self::Err> {
        let trimmed = s.trim();
        Self::ALL
            .into_iter()
            .find(|t| t.name().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| ParseEnumError::new("MapObjectType", s))
    }
}

impl fmt::Display for MapObjectType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A declarative description of one entity
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MapObject {
    pub id: i32,
    pub name: Option<String>,
    /// Kind string (`CREATURE`, `TRIGGER`, a custom kind, or empty)
    #[serde(rename = "type")]
    pub kind: String,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub properties: BTreeMap<String, String>,
}

impl MapObject {
    pub fn new(id: i32, kind: impl Into<String>) -> Self {
        Self {
            id,
            kind: kind.into(),
            ..Default::default()
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_bounds(mut self, x: f64, y: f64, width: f64, height: f64) -> Self {
        self.x = x;
        self.y = y;
        self.width = width;
        self.height = height;
        self
    }

    pub fn with_property(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.properties.insert(name.into(), value.into());
        self
    }

    pub fn map_id(&self) -> MapId {
        MapId::new(self.id)
    }

    pub fn location(&self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }

    pub fn bounds(&self) -> Rect {
        Rect::new(self.x, self.y, self.width, self.height)
    }

    /// The built-in kind of this record, if it has one
    pub fn object_type(&self) -> Option<MapObjectType> {
        self.kind.parse().ok()
    }

    /// Records without a kind are handled by the fallback loader
    pub fn is_untyped(&self) -> bool {
        self.kind.trim().is_empty()
    }
}

impl PropertyProvider for MapObject {
    fn property(&self, name: &str) -> Option<String> {
        self.properties.property(name)
    }
}

/// A named group of map objects
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MapObjectLayer {
    pub name: String,
    pub objects: Vec<MapObject>,
}

/// Level data an environment is initialized from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TileMap {
    pub name: String,
    /// Width in tiles
    pub width: u32,
    /// Height in tiles
    pub height: u32,
    pub tile_width: u32,
    pub tile_height: u32,
    pub layers: Vec<MapObjectLayer>,
}

impl TileMap {
    pub fn new(name: impl Into<String>, width: u32, height: u32, tile_size: u32) -> Self {
        Self {
            name: name.into(),
            width,
            height,
            tile_width: tile_size,
            tile_height: tile_size,
            layers: Vec::new(),
        }
    }

    /// Parse a map from JSON
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn with_layer(mut self, layer: MapObjectLayer) -> Self {
        self.layers.push(layer);
        self
    }

    /// Map area in pixels
    pub fn bounds(&self) -> Rect {
        Rect::new(
            0.0,
            0.0,
            f64::from(self.width * self.tile_width),
            f64::from(self.height * self.tile_height),
        )
    }

    /// Every map object across all layers
    pub fn objects(&self) -> impl Iterator<Item = &MapObject> {
        self.layers.iter().flat_map(|l| l.objects.iter())
    }

    /// Find a typed record by id
    pub fn object(&self, id: i32) -> Option<&MapObject> {
        self.objects().find(|o| o.id == id && !o.is_untyped())
    }
}

impl Default for TileMap {
    fn default() -> Self {
        Self::new("", 0, 0, 16)
    }
}
