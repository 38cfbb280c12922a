//! Identifiers for entities and engine objects

use core::fmt;
use core::sync::atomic::{AtomicI32, AtomicU64, Ordering};

/// Identifier of an entity inside one environment.
///
/// Positive ids originate from map data and stay unique within a map.
/// Negative ids are handed out by the environment for entities created at
/// runtime and are never persisted. Zero means "not assigned yet".
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize), serde(transparent))]
pub struct MapId(i32);

impl MapId {
    /// The "unset" sentinel
    pub const UNSET: Self = Self(0);

    /// Create a map id from its raw value
    #[inline]
    pub const fn new(raw: i32) -> Self {
        Self(raw)
    }

    /// Get the raw value
    #[inline]
    pub const fn raw(&self) -> i32 {
        self.0
    }

    /// Check if no id has been assigned
    #[inline]
    pub const fn is_unset(&self) -> bool {
        self.0 == 0
    }

    /// Check if this id was assigned by an environment at runtime
    #[inline]
    pub const fn is_local(&self) -> bool {
        self.0 < 0
    }

    /// Check if this id originates from map data
    #[inline]
    pub const fn is_persistent(&self) -> bool {
        self.0 > 0
    }
}

impl From<i32> for MapId {
    fn from(raw: i32) -> Self {
        Self(raw)
    }
}

impl fmt::Debug for MapId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "MapId({})", self.0)
    }
}

impl fmt::Display for MapId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Thread-safe generator of environment-local map ids (-1, -2, ...)
pub struct LocalIdSequence {
    next: AtomicI32,
}

impl LocalIdSequence {
    /// Create a new sequence
    pub const fn new() -> Self {
        Self {
            next: AtomicI32::new(0),
        }
    }

    /// Generate the next local id
    pub fn next(&self) -> MapId {
        MapId(self.next.fetch_sub(1, Ordering::Relaxed) - 1)
    }

    /// The most recently generated id, or `UNSET` if none was generated
    pub fn current(&self) -> MapId {
        MapId(self.next.load(Ordering::Relaxed))
    }
}

impl Default for LocalIdSequence {
    fn default() -> Self {
        Self::new()
    }
}

/// Process-wide object identity.
///
/// Map ids can repeat across environments, so registries that may be shared
/// between environments (physics, update scheduling) key by instance id.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct InstanceId(u64);

static NEXT_INSTANCE: AtomicU64 = AtomicU64::new(1);

impl InstanceId {
    /// Allocate a new unique instance id
    pub fn next() -> Self {
        Self(NEXT_INSTANCE.fetch_add(1, Ordering::Relaxed))
    }

    /// Get the raw bits
    #[inline]
    pub const fn to_bits(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for InstanceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "@{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_map_id_classification() {
        assert!(MapId::UNSET.is_unset());
        assert!(MapId::new(-3).is_local());
        assert!(MapId::new(7).is_persistent());
        assert!(!MapId::new(7).is_local());
    }

    #[test]
    fn test_local_sequence() {
        let seq = LocalIdSequence::new();
        assert_eq!(seq.current(), MapId::UNSET);
        assert_eq!(seq.next(), MapId::new(-1));
        assert_eq!(seq.next(), MapId::new(-2));
        assert_eq!(seq.current(), MapId::new(-2));
    }

    #[test]
    fn test_instance_ids_unique() {
        let a = InstanceId::next();
        let b = InstanceId::next();
        assert_ne!(a, b);
    }
}
