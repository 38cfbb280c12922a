//! Entity capability sets
//!
//! An entity is not a subtype of anything. It carries a set of optional
//! components, and its kinds are derived from which ones are present.
//! An entity can have several kinds at once (a creature is also a combat
//! entity and a mobile entity).

use core::fmt;
use serde::{Deserialize, Serialize};

/// A single entity category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EntityKind {
    Creature,
    Prop,
    Trigger,
    LightSource,
    StaticShadow,
    CollisionBox,
    Spawnpoint,
    MapArea,
    Emitter,
    Combat,
    Mobile,
}

impl EntityKind {
    pub const ALL: [EntityKind; 11] = [
        EntityKind::Creature,
        EntityKind::Prop,
        EntityKind::Trigger,
        EntityKind::LightSource,
        EntityKind::StaticShadow,
        EntityKind::CollisionBox,
        EntityKind::Spawnpoint,
        EntityKind::MapArea,
        EntityKind::Emitter,
        EntityKind::Combat,
        EntityKind::Mobile,
    ];

    /// The flag for this kind
    pub const fn flag(self) -> EntityKinds {
        EntityKinds(1 << self as u32)
    }

    pub const fn name(self) -> &'static str {
        match self {
            EntityKind::Creature => "Creature",
            EntityKind::Prop => "Prop",
            EntityKind::Trigger => "Trigger",
            EntityKind::LightSource => "LightSource",
            EntityKind::StaticShadow => "StaticShadow",
            EntityKind::CollisionBox => "CollisionBox",
            EntityKind::Spawnpoint => "Spawnpoint",
            EntityKind::MapArea => "MapArea",
            EntityKind::Emitter => "Emitter",
            EntityKind::Combat => "CombatEntity",
            EntityKind::Mobile => "MobileEntity",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Set of [`EntityKind`]s
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EntityKinds(u32);

impl EntityKinds {
    pub const NONE: Self = Self(0);
    pub const CREATURE: Self = EntityKind::Creature.flag();
    pub const PROP: Self = EntityKind::Prop.flag();
    pub const TRIGGER: Self = EntityKind::Trigger.flag();
    pub const LIGHT_SOURCE: Self = EntityKind::LightSource.flag();
    pub const STATIC_SHADOW: Self = EntityKind::StaticShadow.flag();
    pub const COLLISION_BOX: Self = EntityKind::CollisionBox.flag();
    pub const SPAWNPOINT: Self = EntityKind::Spawnpoint.flag();
    pub const MAP_AREA: Self = EntityKind::MapArea.flag();
    pub const EMITTER: Self = EntityKind::Emitter.flag();
    pub const COMBAT: Self = EntityKind::Combat.flag();
    pub const MOBILE: Self = EntityKind::Mobile.flag();

    /// Kinds whose placement affects the lighting layers
    pub const LIGHTING: Self = Self(Self::LIGHT_SOURCE.0 | Self::STATIC_SHADOW.0);

    #[inline]
    pub const fn bits(self) -> u32 {
        self.0
    }

    #[inline]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Check if all specified kinds are set
    #[inline]
    pub const fn contains(self, other: Self) -> bool {
        (self.0 & other.0) == other.0
    }

    /// Check if any of the specified kinds are set
    #[inline]
    pub const fn intersects(self, other: Self) -> bool {
        (self.0 & other.0) != 0
    }

    #[inline]
    pub const fn has(self, kind: EntityKind) -> bool {
        self.contains(kind.flag())
    }

    #[inline]
    pub fn insert(&mut self, other: Self) {
        self.0 |= other.0;
    }

    #[inline]
    pub fn remove(&mut self, other: Self) {
        self.0 &= !other.0;
    }

    /// Iterate over the individual kinds in the set
    pub fn iter(self) -> impl Iterator<Item = EntityKind> {
        EntityKind::ALL.into_iter().filter(move |k| self.has(*k))
    }
}

impl From<EntityKind> for EntityKinds {
    fn from(kind: EntityKind) -> Self {
        kind.flag()
    }
}

impl core::ops::BitOr for EntityKinds {
    type Output = Self;

    #[inline]
    fn bitor(self, rhs: Self) -> Self::Output {
        Self(self.0 | rhs.0)
    }
}

impl core::ops::BitOrAssign for EntityKinds {
    #[inline]
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

impl core::ops::BitAnd for EntityKinds {
    type Output = Self;

    #[inline]
    fn bitand(self, rhs: Self) -> Self::Output {
        Self(self.0 & rhs.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags() {
        let kinds = EntityKinds::CREATURE | EntityKinds::COMBAT | EntityKinds::MOBILE;
        assert!(kinds.has(EntityKind::Creature));
        assert!(kinds.contains(EntityKinds::COMBAT | EntityKinds::MOBILE));
        assert!(!kinds.has(EntityKind::Trigger));
        assert!(!kinds.intersects(EntityKinds::LIGHTING));
        assert_eq!(
            kinds.iter().collect::<Vec<_>>(),
            vec![EntityKind::Creature, EntityKind::Combat, EntityKind::Mobile]
        );
    }

    #[test]
    fn test_remove() {
        let mut kinds = EntityKinds::PROP | EntityKinds::COMBAT;
        kinds.remove(EntityKinds::COMBAT);
        assert_eq!(kinds, EntityKinds::PROP);
        assert!(EntityKinds::NONE.is_empty());
    }
}
