//! Activator allow-list

use lantern_core::MapId;
use serde::{Deserialize, Serialize};

/// Restricts which entities may activate a trigger.
///
/// An empty filter lets anyone through.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivatorFilter {
    allowed: Vec<MapId>,
}

impl ActivatorFilter {
    /// Create a filter that accepts everything
    pub fn new() -> Self {
        Self::default()
    }

    /// Allow a specific activator
    pub fn with_activator(mut self, id: MapId) -> Self {
        self.add(id);
        self
    }

    pub fn add(&mut self, id: MapId) {
        if !self.allowed.contains(&id) {
            self.allowed.push(id);
        }
    }

    pub fn remove(&mut self, id: MapId) {
        self.allowed.retain(|a| *a != id);
    }

    /// Check if an entity may activate the trigger
    pub fn allows(&self, id: MapId) -> bool {
        self.allowed.is_empty() || self.allowed.contains(&id)
    }

    pub fn is_empty(&self) -> bool {
        self.allowed.is_empty()
    }

    pub fn activators(&self) -> &[MapId] {
        &self.allowed
    }
}

impl FromIterator<MapId> for ActivatorFilter {
    fn from_iter<I: IntoIterator<Item = MapId>>(iter: I) -> Self {
        let mut filter = Self::new();
        for id in iter {
            filter.add(id);
        }
        filter
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_allows_all() {
        let filter = ActivatorFilter::new();
        assert!(filter.allows(MapId::new(1)));
        assert!(filter.allows(MapId::new(-4)));
    }

    #[test]
    fn test_allow_list() {
        let filter = ActivatorFilter::new()
            .with_activator(MapId::new(3))
            .with_activator(MapId::new(3));
        assert_eq!(filter.activators(), &[MapId::new(3)]);
        assert!(filter.allows(MapId::new(3)));
        assert!(!filter.allows(MapId::new(4)));
    }
}
