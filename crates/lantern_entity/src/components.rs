//! Capability components
//!
//! Each component carries the configuration and runtime state of one entity
//! capability. Configuration structs (`*Info`) come with named defaults and
//! are what map loaders fill in.

use core::fmt;
use core::str::FromStr;
use lantern_core::ParseEnumError;
use serde::{Deserialize, Serialize};

macro_rules! named_enum {
    ($ty:ident, $label:literal, { $($variant:ident => $name:literal),+ $(,)? }) => {
        impl $ty {
            pub const ALL: &'static [$ty] = &[$($ty::$variant),+];

            pub const fn name(self) -> &'static str {
                match self {
                    $($ty::$variant => $name),+
                }
            }
        }

        impl FromStr for $ty {
            type Err = ParseEnumError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let trimmed = s.trim();
                Self::ALL
                    .iter()
                    .copied()
                    .find(|v| v.name().eq_ignore_ascii_case(trimmed))
                    .ok_or_else(|| ParseEnumError::new($label, s))
            }
        }

        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.name())
            }
        }
    };
}

// ==== Combat ====

/// Combat configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CombatInfo {
    pub hit_points: u32,
    pub team: i32,
    pub indestructible: bool,
}

impl CombatInfo {
    pub const DEFAULT_HIT_POINTS: u32 = 100;
}

impl Default for CombatInfo {
    fn default() -> Self {
        Self {
            hit_points: Self::DEFAULT_HIT_POINTS,
            team: 0,
            indestructible: false,
        }
    }
}

/// Hit points and team of a combat entity
#[derive(Debug, Clone)]
pub struct CombatComponent {
    pub info: CombatInfo,
    current: u32,
}

impl CombatComponent {
    pub fn new(info: CombatInfo) -> Self {
        let current = info.hit_points;
        Self { info, current }
    }

    pub fn hit_points(&self) -> u32 {
        self.current
    }

    pub fn is_dead(&self) -> bool {
        self.current == 0
    }

    /// Apply damage. Returns the damage actually taken.
    pub fn hit(&mut self, damage: u32) -> u32 {
        if self.info.indestructible || self.is_dead() {
            return 0;
        }

        let taken = damage.min(self.current);
        self.current -= taken;
        taken
    }

    pub fn kill(&mut self) {
        if !self.info.indestructible {
            self.current = 0;
        }
    }

    /// Restore full hit points
    pub fn resurrect(&mut self) {
        self.current = self.info.hit_points;
    }

    pub fn is_friendly(&self, other: &CombatComponent) -> bool {
        self.info.team == other.info.team
    }
}

// ==== Lighting ====

/// Shape of a light source
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum LightShape {
    #[default]
    Ellipse,
    Rectangle,
}

named_enum!(LightShape, "LightShape", {
    Ellipse => "ELLIPSE",
    Rectangle => "RECTANGLE",
});

/// Light source configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LightInfo {
    pub brightness: u32,
    pub intensity: u32,
    /// Hex color (`#rrggbb` or `#aarrggbb`)
    pub color: String,
    pub shape: LightShape,
    pub active: bool,
}

impl LightInfo {
    pub const DEFAULT_INTENSITY: u32 = 100;
    pub const DEFAULT_BRIGHTNESS: u32 = 100;
    pub const DEFAULT_COLOR: &'static str = "#ffffff";
}

impl Default for LightInfo {
    fn default() -> Self {
        Self {
            brightness: Self::DEFAULT_BRIGHTNESS,
            intensity: Self::DEFAULT_INTENSITY,
            color: Self::DEFAULT_COLOR.to_string(),
            shape: LightShape::Ellipse,
            active: true,
        }
    }
}

/// A light source
#[derive(Debug, Clone, Default)]
pub struct LightSourceComponent {
    pub info: LightInfo,
}

impl LightSourceComponent {
    /// Message that switches a light on or off
    pub const TOGGLE_MESSAGE: &'static str = "toggle";

    pub fn new(info: LightInfo) -> Self {
        Self { info }
    }

    pub fn is_active(&self) -> bool {
        self.info.active
    }

    pub fn toggle(&mut self) {
        self.info.active = !self.info.active;
    }
}

/// Direction a static shadow is cast in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum StaticShadowType {
    #[default]
    None,
    Down,
    DownLeft,
    DownRight,
    Left,
    LeftDown,
    LeftRight,
    Right,
    RightDown,
    RightLeft,
    NoOffset,
}

named_enum!(StaticShadowType, "StaticShadowType", {
    None => "NONE",
    Down => "DOWN",
    DownLeft => "DOWNLEFT",
    DownRight => "DOWNRIGHT",
    Left => "LEFT",
    LeftDown => "LEFTDOWN",
    LeftRight => "LEFTRIGHT",
    Right => "RIGHT",
    RightDown => "RIGHTDOWN",
    RightLeft => "RIGHTLEFT",
    NoOffset => "NOOFFSET",
});

/// A static shadow cast by level geometry
#[derive(Debug, Clone, Default)]
pub struct StaticShadowComponent {
    pub shadow_type: StaticShadowType,
    pub offset: i32,
}

impl StaticShadowComponent {
    pub fn new(shadow_type: StaticShadowType, offset: i32) -> Self {
        Self {
            shadow_type,
            offset,
        }
    }

    pub fn casts_shadow(&self) -> bool {
        self.shadow_type != StaticShadowType::None
    }
}

// ==== Emitter ====

/// Particle emitter configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmitterInfo {
    /// Start emitting as soon as the emitter is loaded
    pub activate_on_init: bool,
    /// Milliseconds between spawns
    pub spawn_rate: u32,
    pub spawn_amount: u32,
    pub max_particles: u32,
    /// Milliseconds until the emitter stops (0 = forever)
    pub duration: u64,
    pub particle_min_ttl: u32,
    pub particle_max_ttl: u32,
    pub particle_type: String,
    pub colors: Vec<String>,
}

impl EmitterInfo {
    pub const DEFAULT_SPAWN_RATE: u32 = 40;
    pub const DEFAULT_SPAWN_AMOUNT: u32 = 1;
    pub const DEFAULT_MAX_PARTICLES: u32 = 100;
}

impl Default for EmitterInfo {
    fn default() -> Self {
        Self {
            activate_on_init: true,
            spawn_rate: Self::DEFAULT_SPAWN_RATE,
            spawn_amount: Self::DEFAULT_SPAWN_AMOUNT,
            max_particles: Self::DEFAULT_MAX_PARTICLES,
            duration: 0,
            particle_min_ttl: 0,
            particle_max_ttl: 0,
            particle_type: "RECTANGLE".to_string(),
            colors: Vec::new(),
        }
    }
}

/// Emission state of a particle emitter
#[derive(Debug, Clone, Default)]
pub struct EmitterComponent {
    pub info: EmitterInfo,
    active: bool,
    activated_at: Option<u64>,
    last_spawn: Option<u64>,
    spawned: u64,
}

impl EmitterComponent {
    pub fn new(info: EmitterInfo) -> Self {
        Self {
            info,
            ..Default::default()
        }
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn activate(&mut self, now: u64) {
        if !self.active {
            self.active = true;
            self.activated_at = Some(now);
        }
    }

    pub fn deactivate(&mut self) {
        self.active = false;
        self.activated_at = None;
        self.last_spawn = None;
    }

    /// Total number of particles spawned
    pub fn spawned(&self) -> u64 {
        self.spawned
    }

    /// Advance the emitter. Returns the number of particles spawned.
    pub fn update(&mut self, now: u64) -> u32 {
        if !self.active {
            return 0;
        }

        if let Some(started) = self.activated_at {
            if self.info.duration > 0 && now.saturating_sub(started) >= self.info.duration {
                self.deactivate();
                return 0;
            }
        }

        let due = match self.last_spawn {
            Some(last) => now.saturating_sub(last) >= u64::from(self.info.spawn_rate),
            None => true,
        };
        if !due {
            return 0;
        }

        self.last_spawn = Some(now);
        self.spawned += u64::from(self.info.spawn_amount);
        self.info.spawn_amount
    }
}

// ==== Placement ====

/// Facing of a spawn point
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Direction {
    Up,
    #[default]
    Down,
    Left,
    Right,
    Undefined,
}

named_enum!(Direction, "Direction", {
    Up => "UP",
    Down => "DOWN",
    Left => "LEFT",
    Right => "RIGHT",
    Undefined => "UNDEFINED",
});

/// A point where entities get spawned
#[derive(Debug, Clone, Default)]
pub struct SpawnpointComponent {
    pub spawn_type: Option<String>,
    pub direction: Direction,
}

/// Level geometry that blocks movement and optionally light
#[derive(Debug, Clone, Default)]
pub struct ColliderComponent {
    /// Register only the static bounds with the physics engine
    pub obstacle: bool,
    pub obstructing_lights: bool,
}

/// A prop
#[derive(Debug, Clone, Default)]
pub struct PropComponent {
    pub material: Option<String>,
    pub sprite_sheet: Option<String>,
}

/// A creature
#[derive(Debug, Clone, Default)]
pub struct CreatureComponent {
    pub sprite_sheet: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_combat() {
        let mut combat = CombatComponent::new(CombatInfo {
            hit_points: 10,
            ..Default::default()
        });
        assert_eq!(combat.hit(4), 4);
        assert_eq!(combat.hit(20), 6);
        assert!(combat.is_dead());
        assert_eq!(combat.hit(1), 0);
        combat.resurrect();
        assert_eq!(combat.hit_points(), 10);
    }

    #[test]
    fn test_indestructible() {
        let mut combat = CombatComponent::new(CombatInfo {
            indestructible: true,
            ..Default::default()
        });
        combat.kill();
        assert_eq!(combat.hit(50), 0);
        assert!(!combat.is_dead());
    }

    #[test]
    fn test_emitter_duration() {
        let mut emitter = EmitterComponent::new(EmitterInfo {
            duration: 100,
            spawn_rate: 10,
            ..Default::default()
        });
        assert_eq!(emitter.update(0), 0);
        emitter.activate(0);
        assert_eq!(emitter.update(0), 1);
        assert_eq!(emitter.update(5), 0);
        assert_eq!(emitter.update(10), 1);
        assert_eq!(emitter.update(100), 0);
        assert!(!emitter.is_active());
        assert_eq!(emitter.spawned(), 2);
    }

    #[test]
    fn test_parse_enums() {
        assert_eq!("downleft".parse::<StaticShadowType>().unwrap(), StaticShadowType::DownLeft);
        assert_eq!("Rectangle".parse::<LightShape>().unwrap(), LightShape::Rectangle);
        assert_eq!("up".parse::<Direction>().unwrap(), Direction::Up);
        assert!("diagonal".parse::<Direction>().is_err());
    }

    #[test]
    fn test_light_toggle() {
        let mut light = LightSourceComponent::default();
        assert!(light.is_active());
        light.toggle();
        assert!(!light.is_active());
    }
}
